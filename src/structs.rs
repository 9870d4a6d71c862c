use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Customer,
    Vendor,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_key")]
    pub id: String,
    #[serde(rename = "_id", default)]
    pub handle: String,
    #[serde(rename = "_rev", default)]
    pub rev: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Item {
    #[serde(rename = "_key")]
    pub id: String,
    #[serde(rename = "_id", default)]
    pub handle: String,
    #[serde(rename = "_rev", default)]
    pub rev: String,
    pub name: String,
    pub description: String,
    pub quantity: i64,
    pub price: f64,
    pub user_id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Order {
    #[serde(rename = "_key")]
    pub id: String,
    #[serde(rename = "_id", default)]
    pub handle: String,
    #[serde(rename = "_rev", default)]
    pub rev: String,
    pub user_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub price: f64,
    pub date: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AuthRes {
    pub user: User,
    pub token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SignUp {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AddItemReq {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i64,
}

/// Partial update; absent fields are left untouched by the server.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct UpdateItemReq {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeleteItemReq {
    pub id: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DeleteItemRes {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AddOrderReq {
    pub user_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub quantity_diff: i64,
    pub price: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeleteOrderReq {
    pub user_id: String,
}
