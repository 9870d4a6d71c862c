//! Stub REST API served by actix-web on an ephemeral port.

#![allow(dead_code)]

use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use actix_web::{
    dev::ServerHandle, http::header, web, App, HttpRequest, HttpResponse, HttpServer,
};
use parking_lot::Mutex;
use rans_client::{
    client::ApiClient,
    session::{Navigator, SessionManager},
    storage::MemoryStorage,
};
use serde_json::{json, Value};
use url::Url;

pub const PASSWORD: &str = "x";

#[derive(Default)]
pub struct StubApi {
    issued: AtomicUsize,
    valid_token: Mutex<Option<String>>,
    pub refresh_calls: AtomicUsize,
    pub fail_refresh: AtomicBool,
    pub empty_refresh: AtomicBool,
    pub always_unauthorized: AtomicBool,
    pub seen_tokens: Mutex<Vec<Option<String>>>,
}

impl StubApi {
    /// Invalidates whatever token is currently accepted.
    pub fn expire(&self) {
        *self.valid_token.lock() = None;
    }

    fn issue(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("T{n}");
        *self.valid_token.lock() = Some(token.clone());
        token
    }

    fn authorized(&self, req: &HttpRequest) -> bool {
        let bearer = bearer(req);
        self.seen_tokens.lock().push(bearer.clone());
        !self.always_unauthorized.load(Ordering::SeqCst)
            && bearer.is_some()
            && bearer == *self.valid_token.lock()
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub visits: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.lock().push(path.to_owned());
    }
}

fn bearer(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

pub fn user_json(email: &str) -> Value {
    json!({
        "_key": "7",
        "_id": "User/7",
        "_rev": "_r",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "email": email,
        "password": "$argon2id$hash",
        "role": "VENDOR"
    })
}

pub fn item_json(id: &str, name: &str, quantity: i64) -> Value {
    json!({
        "_key": id,
        "_id": format!("Item/{id}"),
        "_rev": "_r",
        "name": name,
        "description": "a thing",
        "quantity": quantity,
        "price": 2.5,
        "user_id": "7"
    })
}

fn success(content: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "result": "success", "content": content }))
}

fn failure(mut builder: actix_web::HttpResponseBuilder, msg: &str) -> HttpResponse {
    builder.json(json!({ "result": "error", "content": { "error_msg": msg } }))
}

fn unauthorized() -> HttpResponse {
    failure(HttpResponse::Unauthorized(), "Invalid JWT Token")
}

async fn sign_in(api: web::Data<StubApi>, body: web::Json<Value>) -> HttpResponse {
    if body["password"] != PASSWORD {
        return failure(HttpResponse::BadRequest(), "Email and/or password are wrong");
    }
    let email = body["email"].as_str().unwrap_or_default();
    success(json!({ "user": user_json(email), "token": api.issue() }))
}

async fn sign_up(api: web::Data<StubApi>, body: web::Json<Value>) -> HttpResponse {
    let email = body["email"].as_str().unwrap_or_default();
    if email == "taken@b.com" {
        return failure(
            HttpResponse::BadRequest(),
            "Email is already associated with another user",
        );
    }
    success(json!({ "user": user_json(email), "token": api.issue() }))
}

async fn refresh(api: web::Data<StubApi>, email: web::Path<String>) -> HttpResponse {
    api.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if api.fail_refresh.load(Ordering::SeqCst) {
        return failure(
            HttpResponse::InternalServerError(),
            "Error generating token: no user found",
        );
    }
    if api.empty_refresh.load(Ordering::SeqCst) {
        return success(Value::Null);
    }
    success(json!({ "user": user_json(&email), "token": api.issue() }))
}

async fn get_items(api: web::Data<StubApi>, req: HttpRequest) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    success(json!([item_json("1", "Lamp", 4), item_json("2", "Desk", 1)]))
}

async fn get_item(api: web::Data<StubApi>, req: HttpRequest, name: web::Path<String>) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    success(json!([item_json("9", &name, 1)]))
}

async fn add_item(api: web::Data<StubApi>, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    let name = body["name"].as_str().unwrap_or_default();
    if name == "Lamp" {
        return failure(HttpResponse::BadRequest(), "Error creating item: unique constraint violated");
    }
    success(item_json("3", name, body["quantity"].as_i64().unwrap_or_default()))
}

async fn edit_item(api: web::Data<StubApi>, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    let id = body["id"].as_str().unwrap_or_default();
    let name = body["name"].as_str().unwrap_or("Lamp");
    success(item_json(id, name, 4))
}

async fn delete_item(api: web::Data<StubApi>, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    match body["id"].as_str() {
        Some("1") => success(json!({ "name": "Lamp" })),
        _ => failure(HttpResponse::NotFound(), "No item found"),
    }
}

async fn get_orders(api: web::Data<StubApi>, req: HttpRequest) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    failure(HttpResponse::NotFound(), "No orders found")
}

async fn add_order(api: web::Data<StubApi>, req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    success(json!({
        "_key": "o1",
        "_id": "Order/o1",
        "_rev": "_r",
        "user_id": body["user_id"],
        "item_id": body["item_id"],
        "item_name": body["item_name"],
        "quantity": body["quantity"],
        "price": body["price"],
        "date": "2024-03-01T12:30:00"
    }))
}

async fn delete_order(api: web::Data<StubApi>, req: HttpRequest) -> HttpResponse {
    if !api.authorized(&req) {
        return unauthorized();
    }
    success(json!([]))
}

pub async fn spawn_api(api: web::Data<StubApi>) -> (Url, ServerHandle) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(api.clone())
            .route("/api/auth/signin", web::post().to(sign_in))
            .route("/api/auth/signup", web::post().to(sign_up))
            .route("/api/auth/refresh/{email}", web::get().to(refresh))
            .route("/api/get_items", web::get().to(get_items))
            .route("/api/get_item/{name}", web::get().to(get_item))
            .route("/api/add_item", web::post().to(add_item))
            .route("/api/edit_item", web::put().to(edit_item))
            .route("/api/delete_item", web::delete().to(delete_item))
            .route("/api/get_orders/{user_id}", web::get().to(get_orders))
            .route("/api/add_order", web::post().to(add_order))
            .route("/api/delete_order", web::delete().to(delete_order))
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("bind test server")
    .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    let url = Url::parse(&format!("http://{addr}")).expect("server url");
    (url, handle)
}

pub struct Harness {
    pub api: web::Data<StubApi>,
    pub client: ApiClient,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
    pub server: ServerHandle,
}

pub fn client_for(url: Url) -> (ApiClient, Arc<MemoryStorage>, Arc<RecordingNavigator>) {
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let session = SessionManager::new(storage.clone(), navigator.clone());
    let client = ApiClient::new(url, Arc::new(session)).expect("client");
    (client, storage, navigator)
}

pub async fn harness() -> Harness {
    let api = web::Data::new(StubApi::default());
    let (url, server) = spawn_api(api.clone()).await;
    let (client, storage, navigator) = client_for(url);
    Harness {
        api,
        client,
        storage,
        navigator,
        server,
    }
}
