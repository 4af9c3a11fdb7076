use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use serde::Serialize;
use std::fmt;

/// Separator used when field messages are reported as a single reason.
pub const MESSAGE_DELIMITER: &str = ",";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Field errors collected while binding a request, in the order they were found.
#[derive(Debug, Clone, Default)]
pub struct BindingResult {
    errors: Vec<FieldError>,
}

impl BindingResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    /// Reject `field` when `condition` holds.
    pub fn reject_if(
        &mut self,
        condition: bool,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut Self {
        if condition {
            self.reject(field, message);
        }
        self
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_result(self) -> Result<(), ValidationFault> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationFault::new(self.errors))
        }
    }
}

/// Request input did not bind or validate.
///
/// This is the one fault whose detail is shown to the user: every field message ends up
/// in the envelope's `reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFault {
    errors: Vec<FieldError>,
}

impl ValidationFault {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// All field messages joined with [`MESSAGE_DELIMITER`], binding order preserved.
    pub fn joined_messages(&self) -> String {
        self.errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join(MESSAGE_DELIMITER)
    }
}

impl fmt::Display for ValidationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: {}", self.joined_messages())
    }
}

impl std::error::Error for ValidationFault {}

impl From<JsonRejection> for ValidationFault {
    fn from(rejection: JsonRejection) -> Self {
        Self::single("body", rejection.body_text())
    }
}

impl From<FormRejection> for ValidationFault {
    fn from(rejection: FormRejection) -> Self {
        Self::single("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ValidationFault {
    fn from(rejection: QueryRejection) -> Self {
        Self::single("query", rejection.body_text())
    }
}

impl From<PathRejection> for ValidationFault {
    fn from(rejection: PathRejection) -> Self {
        Self::single("path", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_result_keeps_order() {
        let mut result = BindingResult::new();
        result
            .reject("name", "名称不能为空")
            .reject_if(false, "age", "never")
            .reject_if(true, "email", "邮箱格式错误");

        assert!(result.has_errors());
        let fault = result.into_result().unwrap_err();
        assert_eq!(fault.errors().len(), 2);
        assert_eq!(fault.joined_messages(), "名称不能为空,邮箱格式错误");
    }

    #[test]
    fn test_empty_binding_result_is_ok() {
        assert!(BindingResult::new().into_result().is_ok());
    }

    #[test]
    fn test_display() {
        let fault = ValidationFault::single("page", "must be positive");
        assert_eq!(fault.to_string(), "Validation failed: must be positive");
    }
}
