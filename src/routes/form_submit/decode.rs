use actix_web::http::header::HeaderMap;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::web;
use serde::Deserialize;

use crate::domain::FieldValue;
use crate::domain::SignupForm;

/// Same as the default limit of actix's `web::Bytes` extractor
pub const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum BodyParseError {
    #[error("request body exceeds {} bytes", MAX_BODY_BYTES)]
    TooLarge,
    #[error("could not read request body")]
    Read(#[source] actix_web::Error),
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid form body: {0}")]
    UrlEncoded(#[from] serde_urlencoded::de::Error),
}

/// Collect at most `MAX_BODY_BYTES` of request body. Oversized and unreadable
/// bodies are both `BodyParseError`s.
pub async fn read_body(payload: web::Payload) -> Result<web::Bytes, BodyParseError> {
    payload
        .to_bytes_limited(MAX_BODY_BYTES)
        .await
        .map_err(|_| BodyParseError::TooLarge)?
        .map_err(BodyParseError::Read)
}

/// The wire formats a submission can arrive in. A plain html `<form>` posts
/// `application/x-www-form-urlencoded`; the signup page's script posts json.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    UrlEncoded,
}

/// Unknown keys are ignored
#[derive(Deserialize)]
struct UrlEncodedBody {
    name: Option<String>,
    email: Option<String>,
    uses_claude_code: Option<String>,
    consent_emails: Option<String>,
}

impl BodyFormat {
    /// Anything that isn't explicitly form-encoded (including a missing
    /// `Content-Type`) is treated as json. Parameters such as `charset` are
    /// ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mime = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/x-www-form-urlencoded") => Self::UrlEncoded,
            _ => Self::Json,
        }
    }

    pub fn decode(
        &self,
        body: &[u8],
    ) -> Result<SignupForm, BodyParseError> {
        match self {
            Self::Json => {
                // a map rather than a struct: serde would otherwise also accept a
                // json array, matched positionally
                let mut obj: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_slice(body)?;
                let mut field = |key: &str| obj.remove(key).and_then(FieldValue::from_json);
                Ok(SignupForm {
                    name: field("name"),
                    email: field("email"),
                    uses_claude_code: field("uses_claude_code"),
                    consent_emails: field("consent_emails"),
                })
            }
            Self::UrlEncoded => {
                let form: UrlEncodedBody = serde_urlencoded::from_bytes(body)?;
                Ok(SignupForm {
                    name: form.name.map(FieldValue::Text),
                    email: form.email.map(FieldValue::Text),
                    uses_claude_code: form.uses_claude_code.map(FieldValue::Text),
                    consent_emails: form.consent_emails.map(FieldValue::Text),
                })
            }
        }
    }
}
