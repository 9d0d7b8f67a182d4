use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use chrono::Utc;

use super::read_body;
use super::BodyFormat;
use super::SubmitError;
use super::SuccessResponse;
use crate::configuration::WaitlistSettings;
use crate::domain::NewSignup;
use crate::email_client::Contact;
use crate::email_client::CreatedContact;
use crate::email_client::EmailClient;
use crate::email_client::EmailClientError;
use crate::email_client::OutgoingEmail;
use crate::email_templates::admin_notification_subject;
use crate::email_templates::EmailTemplates;
use crate::email_templates::WELCOME_SUBJECT;
use crate::rate_limit::RateLimiter;

/// Never returned to the client; the signup has already succeeded by the time
/// a contact is registered.
#[derive(thiserror::Error, Debug)]
#[error("Could not register contact in audience {audience_id}")]
pub struct ContactRegistrationError {
    audience_id: String,
    #[source]
    source: EmailClientError,
}

/// `POST /form-submit`
///
/// Accepts a waitlist signup, either as json or as a url-encoded form (see
/// `BodyFormat`), and:
///
/// 1. sends a welcome email to the submitter
/// 2. sends a notification to the admin
/// 3. if an audience is configured, adds the submitter as a contact
///
/// Steps 1 and 2 must both succeed; step 3 may fail silently. Nothing is
/// retried, and resubmitting the form sends everything again.
///
/// # Request example
///
/// ```sh
///     curl -v --data 'name=Ada%20Lovelace&email=ada%40example.com&uses_claude_code=yes&consent_emails=true' http://127.0.0.1:8000/form-submit
///     curl -v --json '{"name": "Ada", "email": "ada@example.com", "uses_claude_code": "no", "consent_emails": "true"}' http://127.0.0.1:8000/form-submit
/// ```
#[tracing::instrument(
    name = "Processing waitlist signup",
    skip_all,
    fields(
        signup_email = tracing::field::Empty,
        signup_name = tracing::field::Empty,
        claude_code_user = tracing::field::Empty,
    )
)]
pub async fn form_submit(
    request: HttpRequest,
    payload: web::Payload,
    email_client: web::Data<EmailClient>,
    templates: web::Data<EmailTemplates>,
    waitlist: web::Data<WaitlistSettings>,
    success: web::Data<SuccessResponse>,
    rate_limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, SubmitError> {
    let body = read_body(payload)
        .await
        .map_err(SubmitError::BodyParseError)?;
    let form = BodyFormat::from_headers(request.headers())
        .decode(&body)
        .map_err(SubmitError::BodyParseError)?;

    // all validation happens here, before any email is sent
    let signup: NewSignup = form.try_into()?;

    tracing::Span::current()
        .record("signup_email", tracing::field::display(&signup.email))
        .record("signup_name", signup.name.as_ref())
        .record("claude_code_user", signup.tool_usage.is_existing_user());

    let welcome_html = templates.welcome_email(&signup)?;
    let admin_html = templates.admin_notification(&signup, Utc::now())?;

    let mut pacer = rate_limiter.pacer();

    let welcome = email_client
        .send_email(&OutgoingEmail {
            from: &waitlist.welcome_sender,
            to: [signup.email.as_ref()],
            subject: WELCOME_SUBJECT,
            html: &welcome_html,
        })
        .await
        .map_err(|source| SubmitError::DeliveryError {
            email: "welcome email",
            source,
        })?;
    pacer.record_call();
    tracing::info!(email_id = %welcome.id, "Welcome email sent");

    let admin_subject = admin_notification_subject(signup.email.as_ref());
    let admin = email_client
        .send_email(&OutgoingEmail {
            from: &waitlist.admin_sender,
            to: [waitlist.admin_recipient.as_str()],
            subject: &admin_subject,
            html: &admin_html,
        })
        .await
        .map_err(|source| SubmitError::DeliveryError {
            email: "admin notification",
            source,
        })?;
    pacer.record_call();
    tracing::info!(email_id = %admin.id, "Admin notification sent");

    if let Some(audience_id) = waitlist.audience_id() {
        pacer.ready().await;
        // a failure here must not fail the signup
        if let Err(e) = register_contact(&email_client, audience_id, &signup).await {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Contact registration failed; continuing"
            );
        }
    }

    Ok(success.respond(&welcome.id, &admin.id))
}

#[tracing::instrument(name = "Registering contact", skip(email_client, signup))]
async fn register_contact(
    email_client: &EmailClient,
    audience_id: &str,
    signup: &NewSignup,
) -> Result<CreatedContact, ContactRegistrationError> {
    let last_name = signup.name.last_name();
    let contact = Contact {
        email: signup.email.as_ref(),
        first_name: signup.name.first_name(),
        last_name: &last_name,
        unsubscribed: false,
    };
    let created = email_client
        .create_contact(audience_id, &contact)
        .await
        .map_err(|source| ContactRegistrationError {
            audience_id: audience_id.to_string(),
            source,
        })?;
    tracing::info!(contact_id = %created.id, "Contact registered");
    Ok(created)
}
