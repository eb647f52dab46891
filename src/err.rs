use serde::Deserialize;

/// Envelope shared by the user-management endpoints:
/// `{ success, data?, message?, error? }`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> Reply<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Server supplied failure text, `message` first then `error`.
    pub fn failure_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|text| !text.is_empty())
    }

    pub fn into_data(self) -> Result<T, Error> {
        let message = self.failure_text().map(str::to_string);
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(Error::ApplicationError { message }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("network failure: {message}")]
    NetworkFailure { message: String },
    #[error("could not decode response: {message}")]
    Decode { message: String },
    #[error("request rejected: {}", message.as_deref().unwrap_or("no message"))]
    ApplicationError { message: Option<String> },
    #[error("{message}")]
    BusinessRuleBlock { message: String },
    #[error("{message}")]
    ValidationError { message: String },
    #[error("{kind}: {message}")]
    InternalError { kind: &'static str, message: String },
}

impl Error {
    pub fn validation<S: Into<String>>(msg: S) -> Error {
        Error::ValidationError {
            message: msg.into(),
        }
    }

    pub fn network<S: Into<String>>(msg: S) -> Error {
        Error::NetworkFailure {
            message: msg.into(),
        }
    }

    /// Text to put in front of the user. Transport and internal failures get
    /// the call site's generic fallback instead of their diagnostics.
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Error::ApplicationError {
                message: Some(message),
            } if !message.is_empty() => message,
            Error::BusinessRuleBlock { message } | Error::ValidationError { message } => message,
            _ => fallback,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode {
                message: err.to_string(),
            }
        } else {
            Self::NetworkFailure {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InternalError {
            kind: "UrlError",
            message: err.to_string(),
        }
    }
}
