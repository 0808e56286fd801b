use actix_web::web;

use crate::handlers::shifts;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shifts")
            .route("", web::get().to(shifts::get_shifts))
            .route("", web::post().to(shifts::create_shift))
            // Registered ahead of `/{id}` so "batch" is never read as a shift id.
            .route("/batch", web::post().to(shifts::bulk_create_shifts))
            .route("/batch", web::put().to(shifts::bulk_update_shifts))
            .route("/{id}", web::get().to(shifts::get_shift))
            .route("/{id}", web::put().to(shifts::update_shift))
            .route("/{id}", web::delete().to(shifts::delete_shift))
            .route("/{id}/clock-window", web::get().to(shifts::get_clock_window))
            .route("/{id}/clock-in", web::post().to(shifts::clock_in))
            .route("/{id}/clock-out", web::post().to(shifts::clock_out)),
    );
}
