use axum::{
    http::{Method, Request, Uri},
    response::{IntoResponse, Response},
};

pub mod fault;
pub mod http;
pub mod layer;
pub mod validation;

pub use fault::{
    BASE_VIEW_MESSAGE, BUSINESS_VIEW_MESSAGE, BoxError, Fault, FaultKind, FaultOptions,
    InternalViewMessage, StackTrace, internal_view_message, set_internal_view_message,
};
pub use http::{UNKNOWN_VIEW_MESSAGE, WebExceptionHandler};
pub use layer::{ExceptionFilterLayer, ExceptionFilterMiddleware, dispatch};
pub use validation::{BindingResult, FieldError, MESSAGE_DELIMITER, ValidationFault};

use crate::guard::GuardError;

/// Request context available to an exception filter.
///
/// Only present when the filter bridge is mounted; it records the request line.
#[derive(Debug, Clone)]
pub struct ArgumentsHost {
    pub method: Method,
    pub uri: Uri,
}

impl ArgumentsHost {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
        }
    }
}

/// Every failure that can reach an exception filter, classified.
#[derive(Debug)]
pub enum Exception {
    Fault(Fault),
    Validation(ValidationFault),
    /// Anything else. Logged in full, never shown.
    Unclassified(BoxError),
}

impl Exception {
    /// Recover the concrete fault type from a type-erased error.
    pub fn classify(error: BoxError) -> Self {
        let error = match error.downcast::<Fault>() {
            Ok(fault) => return Exception::Fault(*fault),
            Err(error) => error,
        };
        let error = match error.downcast::<ValidationFault>() {
            Ok(fault) => return Exception::Validation(*fault),
            Err(error) => error,
        };
        match error.downcast::<GuardError>() {
            Ok(denied) => Exception::Fault((*denied).into()),
            Err(error) => Exception::Unclassified(error),
        }
    }
}

impl From<Fault> for Exception {
    fn from(fault: Fault) -> Self {
        Exception::Fault(fault)
    }
}

impl From<ValidationFault> for Exception {
    fn from(fault: ValidationFault) -> Self {
        Exception::Validation(fault)
    }
}

impl From<GuardError> for Exception {
    fn from(denied: GuardError) -> Self {
        Exception::Fault(denied.into())
    }
}

impl From<BoxError> for Exception {
    fn from(error: BoxError) -> Self {
        Exception::classify(error)
    }
}

impl From<anyhow::Error> for Exception {
    fn from(error: anyhow::Error) -> Self {
        let error = match error.downcast::<Fault>() {
            Ok(fault) => return Exception::Fault(fault),
            Err(error) => error,
        };
        let error = match error.downcast::<ValidationFault>() {
            Ok(fault) => return Exception::Validation(fault),
            Err(error) => error,
        };
        match error.downcast::<GuardError>() {
            Ok(denied) => Exception::Fault(denied.into()),
            Err(error) => Exception::Unclassified(error.into()),
        }
    }
}

/// The ExceptionFilter trait
///
/// Filters turn a failure raised during request processing into the response sent back.
/// They must always produce a valid response.
pub trait ExceptionFilter: Send + Sync + 'static {
    fn catch(&self, exception: Exception, host: Option<&ArgumentsHost>) -> Response;
}

impl IntoResponse for Exception {
    fn into_response(self) -> Response {
        layer::dispatch(self)
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        Exception::Fault(self).into_response()
    }
}

impl IntoResponse for ValidationFault {
    fn into_response(self) -> Response {
        Exception::Validation(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_recovers_faults() {
        let boxed: BoxError = Box::new(Fault::business("nope"));
        assert!(matches!(Exception::classify(boxed), Exception::Fault(f) if f.message() == "nope"));

        let boxed: BoxError = Box::new(ValidationFault::single("id", "bad id"));
        assert!(matches!(Exception::classify(boxed), Exception::Validation(_)));
    }

    #[test]
    fn test_classify_guard_denial() {
        let boxed: BoxError = Box::new(GuardError::Forbidden("admin only".into()));
        match Exception::classify(boxed) {
            Exception::Fault(fault) => assert_eq!(fault.kind(), FaultKind::Business),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown() {
        let boxed: BoxError = "socket closed".into();
        assert!(matches!(Exception::classify(boxed), Exception::Unclassified(_)));

        let exception: Exception = anyhow::anyhow!("parse error").into();
        assert!(matches!(exception, Exception::Unclassified(_)));
    }

    #[test]
    fn test_anyhow_wrapping_a_fault_is_recognised() {
        let exception: Exception = anyhow::Error::new(Fault::business("sold out")).into();
        assert!(matches!(exception, Exception::Fault(_)));
    }
}
