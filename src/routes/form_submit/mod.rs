mod decode;
mod post;
pub use decode::*;
pub use post::*;

use std::fmt::Debug;

use actix_web::http::header::ALLOW;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;

use crate::configuration::ApplicationSettings;
use crate::configuration::SuccessStyle;
use crate::domain::SignupRejection;
use crate::email_client::EmailClientError;
use crate::routes::error_chain_fmt;
use crate::utils::redirect;

/// Everything that can stop a submission from going through. Contact
/// registration is deliberately absent: see `ContactRegistrationError`.
#[derive(thiserror::Error)]
pub enum SubmitError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Could not parse request body")]
    BodyParseError(#[source] BodyParseError),
    // these two error strings are returned to the client as-is
    #[error("Missing required fields")]
    ValidationError,
    #[error("Email consent is required")]
    ConsentError,
    #[error("Could not send {email}")]
    DeliveryError {
        email: &'static str,
        #[source]
        source: EmailClientError,
    },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for SubmitError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<SignupRejection> for SubmitError {
    fn from(value: SignupRejection) -> Self {
        match value {
            SignupRejection::MissingFields => Self::ValidationError,
            SignupRejection::ConsentRequired => Self::ConsentError,
        }
    }
}

/// Json body of every non-2xx response
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl SubmitError {
    /// The underlying message, shown to the client on 500
    fn details(&self) -> Option<String> {
        match self {
            Self::BodyParseError(e) => Some(e.to_string()),
            Self::DeliveryError { source, .. } => Some(source.to_string()),
            Self::UnexpectedError(e) => Some(format!("{e:#}")),
            _ => None,
        }
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ValidationError | Self::ConsentError => StatusCode::BAD_REQUEST,
            Self::BodyParseError(_) | Self::DeliveryError { .. } | Self::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let status = self.status_code();
        let body = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(
                    error.cause_chain = ?self,
                    error.message = %self,
                    "Form submission error"
                );
                ErrorBody {
                    error: "Failed to process form submission".to_string(),
                    details: self.details(),
                }
            }
            _ => ErrorBody {
                error: self.to_string(),
                details: None,
            },
        };

        let mut resp = HttpResponse::build(status);
        if let Self::MethodNotAllowed = self {
            resp.insert_header((ALLOW, "POST"));
        }
        resp.json(body)
    }
}

/// Any method other than `POST` on `/form-submit`
pub async fn method_not_allowed() -> Result<HttpResponse, SubmitError> { Err(SubmitError::MethodNotAllowed) }

/// How a successful submission is acknowledged; see `SuccessStyle`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuccessResponse {
    Json,
    Redirect(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitSuccess<'a> {
    message: &'a str,
    welcome_email_id: &'a str,
    admin_email_id: &'a str,
}

impl SuccessResponse {
    pub fn from_settings(cfg: &ApplicationSettings) -> Self {
        match cfg.success_style {
            SuccessStyle::Json => Self::Json,
            SuccessStyle::Redirect => Self::Redirect(cfg.success_redirect.clone()),
        }
    }

    pub fn respond(
        &self,
        welcome_email_id: &str,
        admin_email_id: &str,
    ) -> HttpResponse {
        match self {
            Self::Json => HttpResponse::Ok().json(SubmitSuccess {
                message: "Form submitted successfully",
                welcome_email_id,
                admin_email_id,
            }),
            Self::Redirect(location) => redirect(location),
        }
    }
}
