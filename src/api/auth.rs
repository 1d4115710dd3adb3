use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::api::response::ApiError;
use crate::AppState;

/// Decides whether a presented credential grants admin rights.
pub trait AdminCheck: Send + Sync {
    fn is_admin(&self, credential: Option<&str>) -> bool;
}

/// Admin rights for whoever presents the configured password.
/// With no password configured nobody is admin.
pub struct SharedSecret {
    secret: Option<String>,
}

impl SharedSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

impl AdminCheck for SharedSecret {
    fn is_admin(&self, credential: Option<&str>) -> bool {
        match (self.secret.as_deref(), credential) {
            (Some(secret), Some(given)) => constant_time_eq(secret.as_bytes(), given.as_bytes()),
            _ => false,
        }
    }
}

/// Byte comparison whose timing depends only on the lengths.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// The caller's admin verdict, from `Authorization: Bearer <password>`.
#[derive(Debug, Clone, Copy)]
pub struct IsAdmin(pub bool);

impl IsAdmin {
    pub fn require(self) -> Result<(), ApiError> {
        if self.0 {
            Ok(())
        } else {
            Err(ApiError::unauthorized())
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for IsAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        Ok(IsAdmin(state.admin.is_admin(credential)))
    }
}
