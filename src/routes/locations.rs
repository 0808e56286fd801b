use actix_web::web;

use crate::handlers::locations;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/locations").route("", web::get().to(locations::get_locations)));
}
