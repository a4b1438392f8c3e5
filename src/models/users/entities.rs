use serde::Serialize;
use serde_json::Value;

use crate::utils::normalize::string_field;

pub(crate) mod fields {
    pub const FIRST_NAME: &str = "userFirstName";
    pub const LAST_NAME: &str = "userLastName";
    pub const EMAIL: &str = "userEmail";
    pub const USER_TYPE: &str = "userType";
}

/// `users/<id>` 节点，仅用于单次查询，不做订阅
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub user_type: Option<String>,
}

impl UserRecord {
    pub fn from_raw(id: &str, value: &Value) -> Option<Self> {
        let raw = value.as_object()?;
        Some(Self {
            id: id.to_string(),
            first_name: string_field(raw, fields::FIRST_NAME),
            last_name: string_field(raw, fields::LAST_NAME),
            email: string_field(raw, fields::EMAIL),
            user_type: string_field(raw, fields::USER_TYPE),
        })
    }
}
