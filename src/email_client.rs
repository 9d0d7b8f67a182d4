use std::time::Duration;

use reqwest::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

// establishing a HTTP connection is expensive, so the `Client` is built once at
// startup and shared by every request (via `web::Data`); `reqwest` pools
// connections internally

/// Client for a Resend-compatible email api: transactional sends, and contacts
/// in audiences.
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    authorization_token: Secret<String>,
}

/// A single transactional email. `from` is a full mailbox, e.g. `Name
/// <addr@domain>`.
#[derive(Debug, Serialize)]
pub struct OutgoingEmail<'a> {
    pub from: &'a str,
    pub to: [&'a str; 1],
    pub subject: &'a str,
    pub html: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Contact<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub unsubscribed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatedContact {
    pub id: String,
}

/// Shape of the api's error responses; only `message` is of interest
#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    /// Connection failure, timeout, or an unreadable response
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// The api answered, but not with 2xx
    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

impl EmailClient {
    /// Every call made by this client is bounded by `timeout`
    pub fn new(
        base_url: String,
        authorization_token: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            authorization_token,
        })
    }

    /// `POST /emails`
    #[tracing::instrument(
        name = "Sending email",
        skip(self, email),
        fields(
            recipient = %email.to[0],
            subject = %email.subject,
        )
    )]
    pub async fn send_email(
        &self,
        email: &OutgoingEmail<'_>,
    ) -> Result<SentEmail, EmailClientError> {
        let url = format!("{}/emails", self.base_url);
        self.post(&url, email).await
    }

    /// `POST /audiences/{audience_id}/contacts`
    #[tracing::instrument(name = "Creating contact", skip(self, contact))]
    pub async fn create_contact(
        &self,
        audience_id: &str,
        contact: &Contact<'_>,
    ) -> Result<CreatedContact, EmailClientError> {
        let url = format!("{}/audiences/{audience_id}/contacts", self.base_url);
        self.post(&url, contact).await
    }

    async fn post<B, R>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, EmailClientError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let resp = self
            .http_client
            .post(url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await?;
            // fall back to the raw body if the api didn't send its usual json
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or_else(|_| match text.is_empty() {
                    true => format!("email api responded with {status}"),
                    false => text,
                });
            return Err(EmailClientError::Api { status, message });
        }

        Ok(resp.json().await?)
    }
}
