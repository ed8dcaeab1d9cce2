//! handlers/scrape_handler.rs
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::app_config::AppConfig;
use crate::models::task_model::{JobCombination, StartScrapingRequest};
use crate::services::apify_service::ApifyService;
use crate::services::scrape_service::ScrapeService;
use crate::services::sheets_service::{RowStore, SheetsService};
use crate::services::task_service::TaskRegistry;

/// POST /api/scraping/start
pub async fn start_scraping_endpoint(
    config: web::Data<AppConfig>,
    registry: web::Data<TaskRegistry>,
    body: web::Json<StartScrapingRequest>,
) -> HttpResponse {
    let req = body.into_inner();

    let countries = req.country.map(|c| c.into_vec()).unwrap_or_default();
    let jobs = req.job.map(|j| j.into_vec()).unwrap_or_default();

    if countries.is_empty() || jobs.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "'country' and 'job' fields are required."
        }));
    }

    let combinations: Vec<JobCombination> = countries
        .iter()
        .flat_map(|country| {
            jobs.iter().map(move |job| JobCombination {
                job: job.clone(),
                country: country.clone(),
            })
        })
        .filter(|c| !c.job.is_empty() && !c.country.is_empty())
        .collect();

    if combinations.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "No valid country/job combinations provided."
        }));
    }

    let max_results = req.max_results.unwrap_or(30);
    let proxy_type = req.proxy_type.unwrap_or_else(|| "RESIDENTIAL".to_string());

    // Los colaboradores se construyen acá para que un fallo de credenciales
    // se reporte en la respuesta y no recién dentro del worker.
    let store: Arc<dyn RowStore> = match SheetsService::new(
        config.spreadsheet_id.clone(),
        config.google_api_token.clone(),
    ) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            }))
        }
    };
    let apify = match ApifyService::new(
        config.apify_api_token.clone(),
        config.linkedin_actor_id.clone(),
        config.contact_scraper_actor_id.clone(),
    ) {
        Ok(a) => a,
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": e.to_string()
            }))
        }
    };

    let task_id = match registry.create("Scraping", false) {
        Ok(id) => id,
        Err(e) => return HttpResponse::Conflict().json(json!({ "error": e.to_string() })),
    };

    let service = ScrapeService::new(
        store,
        apify,
        registry.get_ref().clone(),
        config.get_ref().clone(),
    );
    let task_id_clone = task_id.clone();
    tokio::spawn(async move {
        service
            .run(&task_id_clone, combinations, max_results, &proxy_type)
            .await;
    });

    HttpResponse::Accepted().json(json!({
        "message": "Scraping task has been successfully started.",
        "task_id": task_id
    }))
}
