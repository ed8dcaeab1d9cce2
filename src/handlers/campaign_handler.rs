//! handlers/campaign_handler.rs
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::config::app_config::AppConfig;
use crate::services::campaign_service::{
    CampaignEngine, ChannelAdapter, EmailChannel, WhatsappChannel,
};
use crate::services::sheets_service::{RowStore, SheetsService};
use crate::services::task_service::TaskRegistry;

/// POST /api/campaigns/email/start
pub async fn start_email_campaign_endpoint(
    config: web::Data<AppConfig>,
    registry: web::Data<TaskRegistry>,
) -> HttpResponse {
    let adapter: Box<dyn ChannelAdapter> = Box::new(EmailChannel::new(&config));
    start_campaign(
        config,
        registry,
        "Email Campaign",
        adapter,
        "Email campaign has been successfully started.",
    )
    .await
}

/// POST /api/campaigns/whatsapp/start
pub async fn start_whatsapp_campaign_endpoint(
    config: web::Data<AppConfig>,
    registry: web::Data<TaskRegistry>,
) -> HttpResponse {
    let adapter: Box<dyn ChannelAdapter> = Box::new(WhatsappChannel::new(&config));
    start_campaign(
        config,
        registry,
        "WhatsApp Campaign",
        adapter,
        "WhatsApp campaign has been successfully started.",
    )
    .await
}

async fn start_campaign(
    config: web::Data<AppConfig>,
    registry: web::Data<TaskRegistry>,
    task_type: &str,
    adapter: Box<dyn ChannelAdapter>,
    started_message: &str,
) -> HttpResponse {
    let store: Arc<dyn RowStore> = match SheetsService::new(
        config.spreadsheet_id.clone(),
        config.google_api_token.clone(),
    ) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    };

    // Una sola campaña activa por canal: dos corridas simultáneas
    // compartirían la ventana de uso y podrían exceder los límites.
    let task_id = match registry.create(task_type, true) {
        Ok(id) => id,
        Err(e) => {
            return HttpResponse::Conflict().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    };

    let engine = CampaignEngine::new(store, registry.get_ref().clone(), config.get_ref().clone());
    let task_id_clone = task_id.clone();
    tokio::spawn(async move {
        engine.run(&task_id_clone, adapter.as_ref()).await;
    });

    HttpResponse::Accepted().json(json!({
        "message": started_message,
        "task_id": task_id
    }))
}
