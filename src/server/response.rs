use serde::Serialize;

use crate::error::FieldErrors;

/// The envelope every API answer is wrapped in.
///
/// `success` is always present; the other fields only when set.
#[derive(Serialize, Clone, Debug)]
pub struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<FieldErrors>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

impl ApiResponse<()> {
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data: None,
            errors: None,
        }
    }

    pub fn error(message: &str, errors: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
            data: None,
            errors,
        }
    }
}
