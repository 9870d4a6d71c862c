use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const USER_COLLECTION: &str = "User";
pub const ITEM_COLLECTION: &str = "Item";
pub const ORDER_COLLECTION: &str = "Order";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub rule: Value,
    pub level: String,
    pub message: String,
}

impl CollectionSchema {
    fn strict(collection: &str, properties: Value, required: &[&str]) -> Self {
        Self {
            rule: json!({
                "type": "object",
                "properties": properties,
                "required": required,
                "additionalProperties": false,
            }),
            level: "strict".to_owned(),
            message: format!("Document does not match the {collection} schema"),
        }
    }

    pub fn required(&self) -> Vec<&str> {
        self.rule
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

pub fn user_schema() -> CollectionSchema {
    CollectionSchema::strict(
        USER_COLLECTION,
        json!({
            "first_name": { "type": "string" },
            "last_name": { "type": "string" },
            "email": { "type": "string" },
            "password": { "type": "string" },
            "role": { "type": "string", "enum": ["CUSTOMER", "VENDOR"] },
        }),
        &["first_name", "last_name", "email", "password"],
    )
}

pub fn item_schema() -> CollectionSchema {
    CollectionSchema::strict(
        ITEM_COLLECTION,
        json!({
            "name": { "type": "string" },
            "description": { "type": "string" },
            "quantity": { "type": "integer", "minimum": 0 },
            "price": { "type": "number", "minimum": 0 },
            "user_id": { "type": "string" },
        }),
        &["name", "description", "quantity", "price", "user_id"],
    )
}

pub fn order_schema() -> CollectionSchema {
    CollectionSchema::strict(
        ORDER_COLLECTION,
        json!({
            "user_id": { "type": "string" },
            "item_id": { "type": "string" },
            "item_name": { "type": "string" },
            "quantity": { "type": "integer", "minimum": 1 },
            "price": { "type": "number", "minimum": 0 },
            "date": { "type": "string" },
        }),
        &["user_id", "item_id", "item_name", "quantity", "price", "date"],
    )
}
