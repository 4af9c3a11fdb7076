use keystone::prelude::*;
use axum::http::Method;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reads are public; anything that changes state needs the API key.
pub struct ApiKeyGuard {
    key: String,
}

impl ApiKeyGuard {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

#[async_trait]
impl Guard for ApiKeyGuard {
    async fn can_activate(&self, parts: &Parts) -> GuardResult {
        if parts.method == Method::GET {
            return Ok(());
        }
        match parts.headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
            None => Err(GuardError::Unauthorized(format!("missing {API_KEY_HEADER}"))),
            Some(key) if key == self.key => Ok(()),
            Some(_) => Err(GuardError::Forbidden("api key rejected".to_string())),
        }
    }
}
