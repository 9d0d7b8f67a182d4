use std::env;
use std::env::current_dir;
use std::fmt::Display;
use std::time::Duration;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::email_client::EmailClient;
use crate::rate_limit::RateLimiter;

/// Global configuration, loaded from `configuration/*.yaml` and the
/// environment. See `get_configuration`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub waitlist: WaitlistSettings,
}

/// Server configuration
#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,

    /// Shape of the response returned after a successful submission
    pub success_style: SuccessStyle,

    /// Only used when `success_style` is `redirect`
    pub success_redirect: String,
}

/// A submission can be acknowledged either with a JSON body (for `fetch`
/// callers), or with a redirect (for plain html forms).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuccessStyle {
    Json,
    Redirect,
}

#[derive(Clone, Deserialize)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_milliseconds) }

    pub fn client(&self) -> Result<EmailClient, reqwest::Error> {
        EmailClient::new(
            self.base_url.clone(),
            self.authorization_token.clone(),
            self.timeout(),
        )
    }
}

/// Everything that is specific to the waitlist itself: who the emails come
/// from, who gets notified, and where contacts end up.
#[derive(Clone, Debug, Deserialize)]
pub struct WaitlistSettings {
    pub welcome_sender: String,
    pub admin_sender: String,

    #[serde(default = "default_admin_recipient")]
    pub admin_recipient: String,

    /// Contact registration is only attempted when this is set
    #[serde(default)]
    pub audience_id: Option<String>,

    /// Minimum gap between the admin notification and the next call to the
    /// email api
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub rate_limit_milliseconds: u64,
}

fn default_admin_recipient() -> String { "chris@neocortexai.dev".to_string() }

impl WaitlistSettings {
    /// An empty audience id (e.g. `RESEND_AUDIENCE_ID=`) is treated as unset
    pub fn audience_id(&self) -> Option<&str> {
        self.audience_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(Duration::from_millis(self.rate_limit_milliseconds))
    }
}

#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("{e} is not a supported environment; use `local` or `production`")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then apply
/// environment overrides.
///
/// Precedence (lowest to highest):
///
/// 1. `base.yaml`
/// 2. `{local,production}.yaml`, selected by `APP_ENVIRONMENT`
/// 3. `APP_`-prefixed env vars, e.g. `APP_APPLICATION__PORT=5001` ->
///    `Settings.application.port`
/// 4. `RESEND_API_KEY`, `ADMIN_EMAIL`, `RESEND_AUDIENCE_ID`, which are the
///    names the hosting platform usually provisions
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Foreign(Box::new(e)))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for numbers
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option(
            "email_client.authorization_token",
            env::var("RESEND_API_KEY").ok(),
        )?
        .set_override_option("waitlist.admin_recipient", env::var("ADMIN_EMAIL").ok())?
        .set_override_option("waitlist.audience_id", env::var("RESEND_AUDIENCE_ID").ok())?
        .build()?;

    settings.try_deserialize::<Settings>()
}
