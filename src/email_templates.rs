use anyhow::Context;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use tera::Tera;

use crate::domain::NewSignup;

const WELCOME: &str = "welcome.html";
const ADMIN_NOTIFICATION: &str = "admin_notification.html";

pub const WELCOME_SUBJECT: &str = "🧠 Welcome to NeoCortex AI Early Access!";

pub fn admin_notification_subject(email: &str) -> String { format!("🎯 New Waitlist Signup: {email}") }

/// `Hi {name}!`, or a generic `Hello!` if there is no name to greet
pub fn greeting(name: &str) -> String {
    match name.is_empty() {
        true => "Hello!".to_string(),
        false => format!("Hi {name}!"),
    }
}

/// Both email bodies, compiled once at startup. The templates are embedded in
/// the binary, so a deployment never depends on the working directory.
///
/// Templates ending in `.html` are autoescaped by tera; user input can't inject
/// markup into either email.
pub struct EmailTemplates {
    tera: Tera,
}

impl EmailTemplates {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (WELCOME, include_str!("../templates/welcome.html")),
            (
                ADMIN_NOTIFICATION,
                include_str!("../templates/admin_notification.html"),
            ),
        ])?;
        Ok(Self { tera })
    }

    pub fn welcome_email(
        &self,
        signup: &NewSignup,
    ) -> Result<String, anyhow::Error> {
        let mut ctx = tera::Context::new();
        ctx.insert("greeting", &greeting(signup.name.as_ref()));
        ctx.insert("existing_user", &signup.tool_usage.is_existing_user());
        ctx.insert(
            "unsubscribe_email",
            &urlencoding::encode(signup.email.as_ref()),
        );
        self.tera
            .render(WELCOME, &ctx)
            .context("could not render welcome email")
    }

    pub fn admin_notification(
        &self,
        signup: &NewSignup,
        processed_at: DateTime<Utc>,
    ) -> Result<String, anyhow::Error> {
        let mut ctx = tera::Context::new();
        ctx.insert("name", signup.name.as_ref());
        ctx.insert("email", signup.email.as_ref());
        ctx.insert("claude_code_user", signup.tool_usage.yes_no());
        ctx.insert(
            "timestamp",
            &processed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        self.tera
            .render(ADMIN_NOTIFICATION, &ctx)
            .context("could not render admin notification")
    }
}
