use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::configuration::WaitlistSettings;
use crate::email_client::EmailClient;
use crate::email_templates::EmailTemplates;
use crate::rate_limit::RateLimiter;
use crate::routes::form_submit;
use crate::routes::health_check;
use crate::routes::method_not_allowed;
use crate::routes::SuccessResponse;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Build every long-lived dependency (email client, templates) once, then
    /// bind the listener
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(&addr).with_context(|| format!("could not bind {addr}"))?;

        // port 0 means the OS picked one; this is what tests connect to
        let port = listener.local_addr()?.port();

        let email_client = cfg
            .email_client
            .client()
            .context("could not build email client")?;
        let templates = EmailTemplates::new().context("could not compile email templates")?;
        let success = SuccessResponse::from_settings(&cfg.application);
        let rate_limiter = cfg.waitlist.rate_limiter();

        let server = run(
            listener,
            email_client,
            templates,
            cfg.waitlist,
            success,
            rate_limiter,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    templates: EmailTemplates,
    waitlist: WaitlistSettings,
    success: SuccessResponse,
    rate_limiter: RateLimiter,
) -> Result<Server, std::io::Error> {
    // `Data` is externally an `Arc`, so every worker shares the same client (and
    // its connection pool)
    let email_client = Data::new(email_client);
    let templates = Data::new(templates);
    let waitlist = Data::new(waitlist);
    let success = Data::new(success);
    let rate_limiter = Data::new(rate_limiter);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/form-submit")
                    .route(web::post().to(form_submit))
                    // every other method
                    .default_service(web::to(method_not_allowed)),
            )
            .app_data(email_client.clone())
            .app_data(templates.clone())
            .app_data(waitlist.clone())
            .app_data(success.clone())
            .app_data(rate_limiter.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
