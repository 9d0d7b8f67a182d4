use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;

/// `302 Found`, with an empty body. Unlike `303`, this is what static-site
/// form handlers conventionally answer with, and every browser follows it with
/// a `GET`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((LOCATION, location))
        .finish()
}
