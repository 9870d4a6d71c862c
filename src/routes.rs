use reqwest::Method;

use crate::{
    api::ApiResult,
    client::ApiClient,
    errors::AppError,
    structs::{
        AddItemReq, AddOrderReq, AuthRes, DeleteItemReq, DeleteItemRes, DeleteOrderReq, Item,
        Order, SignIn, SignUp, UpdateItemReq,
    },
    utils::split_endpoint,
};

fn path(endpoint: &str, param: Option<&str>) -> Vec<String> {
    let mut segments = split_endpoint(endpoint);
    if let Some(param) = param {
        segments.push(param.to_owned());
    }
    segments
}

impl ApiClient {
    pub async fn sign_in(&self, credentials: &SignIn) -> ApiResult<AuthRes> {
        let result: ApiResult<AuthRes> = self
            .call(Method::POST, path("/api/auth/signin", None), Some(credentials))
            .await;
        if let Ok(auth) = &result.outcome {
            self.install(auth);
        }
        result
    }

    pub async fn sign_up(&self, details: &SignUp) -> ApiResult<AuthRes> {
        let result: ApiResult<AuthRes> = self
            .call(Method::POST, path("/api/auth/signup", None), Some(details))
            .await;
        if let Ok(auth) = &result.outcome {
            self.install(auth);
        }
        result
    }

    pub fn sign_out(&self) -> Result<(), AppError> {
        self.items().set(Vec::new());
        self.orders().set(Vec::new());
        self.session().sign_out()
    }

    pub async fn get_item(&self, name: &str) -> ApiResult<Vec<Item>> {
        self.call::<(), _>(Method::GET, path("/api/get_item", Some(name)), None)
            .await
    }

    pub async fn get_items(&self) -> ApiResult<Vec<Item>> {
        let result: ApiResult<Vec<Item>> = self
            .call::<(), _>(Method::GET, path("/api/get_items", None), None)
            .await;
        if let Ok(items) = &result.outcome {
            self.items().set(items.clone());
        }
        result
    }

    pub async fn add_item(&self, req: &AddItemReq) -> ApiResult<Item> {
        let result: ApiResult<Item> = self
            .call(Method::POST, path("/api/add_item", None), Some(req))
            .await;
        if let Ok(item) = &result.outcome {
            self.items().update(|items| items.push(item.clone()));
        }
        result
    }

    pub async fn edit_item(&self, req: &UpdateItemReq) -> ApiResult<Item> {
        let result: ApiResult<Item> = self
            .call(Method::PUT, path("/api/edit_item", None), Some(req))
            .await;
        if let Ok(updated) = &result.outcome {
            self.items().update(|items| {
                if let Some(slot) = items.iter_mut().find(|item| item.id == updated.id) {
                    *slot = updated.clone();
                }
            });
        }
        result
    }

    pub async fn delete_item(&self, id: &str) -> ApiResult<DeleteItemRes> {
        let req = DeleteItemReq { id: id.to_owned() };
        let result: ApiResult<DeleteItemRes> = self
            .call(Method::DELETE, path("/api/delete_item", None), Some(&req))
            .await;
        if result.is_ok() {
            self.items().update(|items| items.retain(|item| item.id != id));
        }
        result
    }

    pub async fn get_orders(&self, user_id: &str) -> ApiResult<Vec<Order>> {
        let result: ApiResult<Vec<Order>> = self
            .call::<(), _>(Method::GET, path("/api/get_orders", Some(user_id)), None)
            .await;
        if let Ok(orders) = &result.outcome {
            self.orders().set(orders.clone());
        }
        result
    }

    /// Places an order; the ordered item's stock becomes `quantity_diff`.
    pub async fn add_order(&self, req: &AddOrderReq) -> ApiResult<Order> {
        let result: ApiResult<Order> = self
            .call(Method::POST, path("/api/add_order", None), Some(req))
            .await;
        if let Ok(order) = &result.outcome {
            self.orders().update(|orders| orders.push(order.clone()));
            self.items().update(|items| {
                if let Some(item) = items.iter_mut().find(|item| item.id == req.item_id) {
                    item.quantity = req.quantity_diff;
                }
            });
        }
        result
    }

    pub async fn delete_orders(&self, user_id: &str) -> ApiResult<Vec<Order>> {
        let req = DeleteOrderReq {
            user_id: user_id.to_owned(),
        };
        let result: ApiResult<Vec<Order>> = self
            .call(Method::DELETE, path("/api/delete_order", None), Some(&req))
            .await;
        if result.is_ok() {
            self.orders().set(Vec::new());
        }
        result
    }
}
