use crate::common::{Status, ViewLevel};
use crate::error::Result;
use axum::{
    Json,
    http::StatusCode as HttpStatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Standard response envelope
///
/// Every endpoint answers with the same shape. Failures are business payloads, not
/// transport errors: the HTTP status is always `200 OK` and callers inspect `code`.
///
/// ```json
/// { "code": "web.ok", "reason": "处理成功", "level": "INFO", "data": { ... } }
/// ```
///
/// Instances are only built through the named factories, so `code` is always set.
///
/// # Example
/// ```
/// use keystone::common::{ApiResponse, Status};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User {
///     id: String,
/// }
///
/// fn get_user(id: &str) -> ApiResponse<User> {
///     if id == "1" {
///         ApiResponse::ok(User { id: id.to_string() })
///     } else {
///         ApiResponse::fail_status(&Status::NOT_FOUND)
///     }
/// }
///
/// assert_eq!(get_user("2").code(), "web.notFound");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    code: String,

    reason: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<ViewLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

pub const DEFAULT_OK_LEVEL: ViewLevel = ViewLevel::Info;
pub const DEFAULT_FAIL_LEVEL: ViewLevel = ViewLevel::Error;

impl<T> ApiResponse<T> {
    fn new(code: &str, reason: &str, level: Option<ViewLevel>, data: Option<T>) -> Self {
        Self {
            code: code.to_owned(),
            reason: reason.to_owned(),
            level,
            data,
        }
    }

    /// Build a response from a catalog status.
    pub fn of(status: &Status, level: ViewLevel, data: Option<T>) -> Self {
        Self::new(status.code(), status.reason(), Some(level), data)
    }

    /// Build a response from a raw code and reason.
    pub fn of_parts(
        code: impl AsRef<str>,
        reason: impl AsRef<str>,
        level: ViewLevel,
        data: Option<T>,
    ) -> Self {
        Self::new(code.as_ref(), reason.as_ref(), Some(level), data)
    }

    pub fn ok(data: T) -> Self {
        Self::of(&Status::OK, DEFAULT_OK_LEVEL, Some(data))
    }

    pub fn ok_empty() -> Self {
        Self::of(&Status::OK, DEFAULT_OK_LEVEL, None)
    }

    pub fn ok_with_reason(reason: impl AsRef<str>, data: T) -> Self {
        Self::of_parts(Status::OK.code(), reason, DEFAULT_OK_LEVEL, Some(data))
    }

    /// `web.unknown` with its catalog reason.
    pub fn fail() -> Self {
        Self::of(&Status::INTERNAL_SERVER_ERROR, DEFAULT_FAIL_LEVEL, None)
    }

    /// `web.unknown` with a custom reason.
    pub fn fail_with_reason(reason: impl AsRef<str>) -> Self {
        Self::fail_with_level(reason, DEFAULT_FAIL_LEVEL)
    }

    pub fn fail_with_level(reason: impl AsRef<str>, level: ViewLevel) -> Self {
        Self::of_parts(Status::INTERNAL_SERVER_ERROR.code(), reason, level, None)
    }

    pub fn fail_status(status: &Status) -> Self {
        Self::of(status, DEFAULT_FAIL_LEVEL, None)
    }

    pub fn fail_status_with_reason(status: &Status, reason: impl AsRef<str>) -> Self {
        Self::of_parts(status.code(), reason, DEFAULT_FAIL_LEVEL, None)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn level(&self) -> Option<ViewLevel> {
        self.level
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn status(&self) -> Status {
        Status::new(self.code.clone(), self.reason.clone())
    }

    pub fn is_ok(&self) -> bool {
        self.code == Status::OK.code()
    }

    /// Same envelope with a different view level.
    pub fn with_level(mut self, level: ViewLevel) -> Self {
        self.level = Some(level);
        self
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Serialize the envelope as JSON into `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (HttpStatusCode::OK, Json(self)).into_response()
    }
}
