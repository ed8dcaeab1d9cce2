//! app.rs
use crate::handlers::{campaign_handler, scrape_handler, task_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/scraping")
                    .route("/start", web::post().to(scrape_handler::start_scraping_endpoint)),
            )
            .service(
                web::scope("/campaigns")
                    .route(
                        "/email/start",
                        web::post().to(campaign_handler::start_email_campaign_endpoint),
                    )
                    .route(
                        "/whatsapp/start",
                        web::post().to(campaign_handler::start_whatsapp_campaign_endpoint),
                    ),
            )
            .service(
                web::scope("/tasks").route(
                    "/{task_id}",
                    web::get().to(task_handler::task_status_endpoint),
                ),
            ),
    );
}
