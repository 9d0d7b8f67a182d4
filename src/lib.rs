pub mod configuration;
pub mod domain;
pub mod email_client;
pub mod email_templates;
pub mod rate_limit;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
