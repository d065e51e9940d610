use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Per-field validation messages, as returned by the back office serializers.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A failed API call, already classified.
///
/// `Display` yields the message shown to the operator; the variants carry
/// enough context for callers that need to branch on the failure class.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Erreur de connexion. Vérifiez votre connexion internet.")]
    Network(String),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: FieldErrors,
    },

    #[error("Session expirée. Veuillez vous reconnecter.")]
    Unauthorized,

    #[error("Accès refusé")]
    Forbidden,

    #[error("Ressource non trouvée")]
    NotFound,

    #[error("Le serveur est temporairement indisponible")]
    Unavailable(u16),

    #[error("Erreur serveur. Réessayez plus tard.")]
    ServerError(u16),

    #[error("{message}")]
    Unexpected { status: u16, message: String },

    #[error("Une erreur est survenue")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies kept for logging
const MAX_ERROR_BODY_LENGTH: usize = 500;

const DEFAULT_VALIDATION_MESSAGE: &str = "Requête invalide";
const DEFAULT_MESSAGE: &str = "Une erreur est survenue";

/// Keys of an error body that carry a message rather than a field error.
const MESSAGE_KEYS: [&str; 4] = ["message", "error", "detail", "errors"];

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
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

    /// Classify a non-success response from its status and raw body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let message = parsed.as_ref().and_then(server_message);

        match status.as_u16() {
            400 => ApiError::Validation {
                message: message.unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string()),
                field_errors: parsed.as_ref().map(field_errors).unwrap_or_default(),
            },
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            code @ (502 | 503) => ApiError::Unavailable(code),
            code @ 500..=599 => ApiError::ServerError(code),
            code => ApiError::Unexpected {
                status: code,
                message: message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            },
        }
    }

    /// Build a client-side validation failure for a single field.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), vec![message.to_string()]);
        ApiError::Validation {
            message: message.to_string(),
            field_errors,
        }
    }

    /// HTTP status behind this error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden => Some(403),
            ApiError::NotFound => Some(404),
            ApiError::Unavailable(code) | ApiError::ServerError(code) => Some(*code),
            ApiError::Unexpected { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_permission_error(&self) -> bool {
        matches!(self, ApiError::Forbidden)
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|code| code >= 500)
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Per-field messages of a validation failure; empty for anything else.
    pub fn validation_errors(&self) -> FieldErrors {
        match self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => FieldErrors::new(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            // Connect failures, timeouts, DNS, TLS: no usable response
            ApiError::Network(err.to_string())
        }
    }
}

/// First non-empty of `message`, `error`, `detail`.
fn server_message(body: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Field errors come either under `errors` or as top-level
/// `field -> [messages]` entries.
fn field_errors(body: &Value) -> FieldErrors {
    let source = match body.get("errors") {
        Some(Value::Object(map)) => map,
        _ => match body {
            Value::Object(map) => map,
            _ => return FieldErrors::new(),
        },
    };

    source
        .iter()
        .filter(|(key, _)| !MESSAGE_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| {
            let messages: Vec<String> = match value {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (key.clone(), messages))
        })
        .collect()
}
