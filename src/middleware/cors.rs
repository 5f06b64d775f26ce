use actix_cors::Cors;
use actix_web::http::header;

/// Any origin when `allowed_origins` is empty, otherwise only the listed ones.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ])
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600)
}
