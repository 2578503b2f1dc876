use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid credentials")]
    AuthFailure,

    #[error("Resource not found")]
    NotFound,

    #[error("Authorization denied: {0}")]
    Authorization(String),

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Server error {status}: {body}")]
    Server {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Transient failure: {0}")]
    Transient(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback shown when an add-record failure carries no server message
pub const GENERIC_ADD_ERROR: &str = "Erro ao adicionar agente.";

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull the `message` field out of a JSON error body, if there is one.
    pub fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    /// Map a non-success status from a read or write endpoint.
    ///
    /// 401/403 mean the bearer token was missing, expired or invalid; 404 is a
    /// negative lookup; 5xx is a server failure unrelated to the request; any
    /// other 4xx is the server rejecting the submitted data. The server's
    /// `message` is kept in every case that has one.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::server_message(body);
        match status.as_u16() {
            401 | 403 => ApiError::Authorization(
                message.unwrap_or_else(|| "Token inválido.".to_string()),
            ),
            404 => ApiError::NotFound,
            500..=599 => ApiError::Server {
                status: status.as_u16(),
                message,
                body: Self::truncate_body(body),
            },
            _ => ApiError::Validation(message.unwrap_or_else(|| GENERIC_ADD_ERROR.to_string())),
        }
    }

    /// Text shown to the user after a failed add-record call.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Authorization(msg) | ApiError::Validation(msg) => msg.clone(),
            ApiError::Server { message, .. } => message
                .clone()
                .unwrap_or_else(|| GENERIC_ADD_ERROR.to_string()),
            ApiError::Transient(_) => GENERIC_ADD_ERROR.to_string(),
            ApiError::AuthFailure => "Credenciais inválidas.".to_string(),
            ApiError::NotFound => GENERIC_ADD_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transient(format!("Network error: {}", err))
    }
}
