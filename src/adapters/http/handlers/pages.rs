use actix_web::{HttpResponse, http::header};

use crate::domain::invoice::INVOICES_PATH;

/// Send the bare root to the invoice listing
pub async fn index() -> HttpResponse {
  HttpResponse::SeeOther()
    .insert_header((header::LOCATION, INVOICES_PATH))
    .finish()
}

/// Liveness check
pub async fn health() -> HttpResponse {
  HttpResponse::Ok().content_type("text/plain").body("OK")
}
