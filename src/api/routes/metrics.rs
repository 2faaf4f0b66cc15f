//! Prometheus scrape endpoint.
//!
//! `/metrics` returns every registered relay metric in the Prometheus text exposition format.
use actix_web::{get, web, HttpResponse, Responder};

use crate::metrics::gather_metrics;

#[get("/metrics")]
async fn scrape_metrics() -> impl Responder {
    match gather_metrics() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error: {e}")),
    }
}

/// Initializes the HTTP services for the metrics module.
pub fn init(cfg: &mut web::ServiceConfig) {
    cfg.service(scrape_metrics);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ADMISSIONS_TOTAL;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_scrape_exposes_relay_metrics() {
        ADMISSIONS_TOTAL
            .with_label_values(&["accepted", "none"])
            .inc();

        let app = test::init_service(App::new().configure(init)).await;
        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("admissions_total"));
    }
}
