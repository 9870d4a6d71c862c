//! Client library for the RANS shop API and its database setup.

pub mod api;
pub mod bootstrap;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod routes;
pub mod schemas;
pub mod session;
pub mod storage;
pub mod stores;
pub mod structs;
pub mod utils;
