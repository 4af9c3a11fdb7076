use crate::common::{LogLevel, Status, ViewLevel};
use crate::exception::{Fault, FaultKind, FaultOptions, StackTrace};
use async_trait::async_trait;
use axum::http::request::Parts;

mod layer;

pub use layer::{GuardMiddleware, SharedGuardLayer};

/// Standard Result type for Guard
/// Ok(()) means allowed
/// Err(GuardError) means denied
pub type GuardResult = Result<(), GuardError>;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl GuardError {
    pub fn status(&self) -> Status {
        match self {
            GuardError::Forbidden(_) => Status::FORBIDDEN,
            GuardError::Unauthorized(_) => Status::UNAUTHORIZED,
        }
    }
}

/// A denial is an expected outcome: a business fault reported with the catalog status
/// and reason, logged at warn.
impl From<GuardError> for Fault {
    fn from(denied: GuardError) -> Self {
        let status = denied.status();
        Fault::with_options(
            FaultKind::Business,
            FaultOptions {
                message: Some(denied.to_string()),
                view_message: Some(status.reason().to_owned()),
                stack_trace: Some(StackTrace::Suppressed),
                log_level: Some(LogLevel::Warn),
                view_level: Some(ViewLevel::Warn),
                status: Some(status),
                ..Default::default()
            },
        )
    }
}

/// The Guard trait
/// Implement this to protect routes
///
/// Guards see the request head only; the body is untouched until the handler runs.
#[async_trait]
pub trait Guard: Send + Sync + 'static {
    async fn can_activate(&self, parts: &Parts) -> GuardResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_maps_to_catalog() {
        let fault: Fault = GuardError::Unauthorized("missing token".into()).into();
        assert_eq!(fault.kind(), FaultKind::Business);
        assert_eq!(fault.message(), "Unauthorized: missing token");
        assert_eq!(fault.view_message(), "未认证");
        assert_eq!(fault.status(), Some(&Status::UNAUTHORIZED));
        assert_eq!(fault.log_level(), LogLevel::Warn);

        let fault: Fault = GuardError::Forbidden("admin only".into()).into();
        assert_eq!(fault.status(), Some(&Status::FORBIDDEN));
        assert_eq!(fault.view_level(), ViewLevel::Warn);
    }
}
