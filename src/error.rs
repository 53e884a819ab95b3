use serde::Serialize;

/// Phrase shown when a request never got a response.
pub const NETWORK_ERROR: &str = "Network connection failed, please check your network";

/// All errors that can surface from the office client.
#[derive(Debug, thiserror::Error)]
pub enum OfficeError {
    /// Transport failure: the request was sent but no usable response came back.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("Service returned {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Status { status: u16, message: Option<String> },

    /// Rejected locally before anything reached the network.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

impl OfficeError {
    pub fn status(status: u16, message: Option<String>) -> Self {
        OfficeError::Status { status, message }
    }

    /// HTTP status for service rejections, `None` otherwise.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OfficeError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The single human-readable line a UI shows for this error.
    ///
    /// A message supplied by the service wins over the fixed phrase for its
    /// status code.
    pub fn user_message(&self) -> String {
        match self {
            OfficeError::Status { status, message } => match message {
                Some(m) if !m.trim().is_empty() => m.clone(),
                _ => status_phrase(*status),
            },
            OfficeError::Network(e) if e.is_decode() || e.is_builder() => {
                format!("Request error: {e}")
            }
            OfficeError::Network(_) => NETWORK_ERROR.to_string(),
            OfficeError::Validation(m) | OfficeError::Custom(m) => m.clone(),
            other => other.to_string(),
        }
    }
}

/// Fixed phrase for a rejected request with no message of its own.
pub fn status_phrase(status: u16) -> String {
    match status {
        400 => "Invalid request parameters".into(),
        401 => "Unauthorized, please log in again".into(),
        403 => "You do not have permission to perform this action".into(),
        404 => "The requested resource does not exist".into(),
        409 => "Resource conflict, please check and retry".into(),
        500 => "Internal server error".into(),
        other => format!("Request failed with status {other}"),
    }
}

// Host UIs receive errors over IPC as the display string.
impl Serialize for OfficeError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.user_message())
    }
}

pub type Result<T> = std::result::Result<T, OfficeError>;
