use crate::common::{ApiResponse, Status};
use crate::exception::{ArgumentsHost, Exception, ExceptionFilter, Fault, ValidationFault};
use axum::response::{IntoResponse, Response};
use std::error::Error;

/// Shown for every unclassified failure, whatever it says internally.
pub const UNKNOWN_VIEW_MESSAGE: &str = "系统繁忙，请稍后再试";

/// The global exception handler
///
/// Classifies, logs and maps every failure into an [`ApiResponse`]. The transport
/// status is always `200 OK`; the envelope `code` carries the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebExceptionHandler;

impl WebExceptionHandler {
    /// Map an exception to its envelope, logging it on the way.
    pub fn resolve(&self, exception: Exception, host: Option<&ArgumentsHost>) -> ApiResponse<()> {
        let span = tracing::info_span!(
            "exception",
            method = host.map(|h| h.method.as_str()),
            uri = host.map(|h| tracing::field::display(&h.uri)),
        );
        let _entered = span.enter();

        match exception {
            Exception::Validation(fault) => self.method_argument_not_valid(&fault),
            Exception::Fault(fault) => self.fault(&fault),
            Exception::Unclassified(error) => self.unknown_exception(error.as_ref()),
        }
    }

    /// Binding and validation failures: every field message is reported back.
    pub fn method_argument_not_valid(&self, fault: &ValidationFault) -> ApiResponse<()> {
        tracing::warn!(errors = ?fault.errors(), "request validation failed");
        ApiResponse::fail_status_with_reason(&Status::BAD_REQUEST, fault.joined_messages())
    }

    pub fn fault(&self, fault: &Fault) -> ApiResponse<()> {
        fault.log();
        let status = fault.status().cloned().unwrap_or(Status::INTERNAL_SERVER_ERROR);
        ApiResponse::fail_status_with_reason(&status, fault.view_message())
            .with_level(fault.view_level())
    }

    pub fn unknown_exception(&self, error: &(dyn Error + Send + Sync + 'static)) -> ApiResponse<()> {
        tracing::error!(error = ?error, "unhandled exception: {}", error);
        ApiResponse::fail_with_reason(UNKNOWN_VIEW_MESSAGE)
    }
}

impl ExceptionFilter for WebExceptionHandler {
    fn catch(&self, exception: Exception, host: Option<&ArgumentsHost>) -> Response {
        self.resolve(exception, host).into_response()
    }
}
