use anyhow::Context;
use waitlist_signup::configuration::get_configuration;
use waitlist_signup::startup::Application;
use waitlist_signup::telemetry::get_subscriber;
use waitlist_signup::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("waitlist-signup", "info", std::io::stdout);
    init_subscriber(subscriber);

    let cfg = get_configuration().context("could not load configuration")?;
    tracing::info!(
        host = %cfg.application.host,
        port = cfg.application.port,
        success_style = ?cfg.application.success_style,
        contacts_enabled = cfg.waitlist.audience_id().is_some(),
        rate_limit_ms = cfg.waitlist.rate_limiter().interval().as_millis() as u64,
        "starting waitlist signup server"
    );

    let app = Application::build(cfg).await?;
    app.run_until_stopped().await?;

    Ok(())
}
