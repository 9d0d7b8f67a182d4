use actix_web::HttpResponse;

/// `GET /health_check`
///
/// For the hosting platform's liveness probe. Does not touch the email api.
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
