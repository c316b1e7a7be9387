use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::wire;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "wire::de_opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub cpf: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Overlay the fields of a profile update response onto this user.
    pub fn merged(&self, patch: &Value) -> Result<User, serde_json::Error> {
        let mut base = serde_json::to_value(self)?;
        if let (Some(target), Some(fields)) = (base.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginCodeRequest<'a> {
    pub identifier: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, deserialize_with = "wire::de_opt_text")]
    pub message: Option<String>,
}
