use actix_web::{web, HttpResponse, Responder};

use crate::handlers::shared::{json_config, query_config};

pub mod locations;
pub mod shifts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            .configure(shifts::configure)
            .configure(locations::configure),
    );
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}
