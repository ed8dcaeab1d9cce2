use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::app_config::AppConfig;
use crate::logger::init_logger;
use crate::services::task_service::TaskRegistry;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    // Configuración global: hojas, columnas, límites diarios, SMTP, APIs.
    let config = AppConfig::from_env();
    log::info!(
        "Configuración cargada: hoja '{}', límites diarios email={} whatsapp={}",
        config.data_sheet_name,
        config.email_daily_limit,
        config.whatsapp_daily_limit
    );

    // Registro de tareas en memoria (task_id -> estado). No se persiste:
    // se pierde al reiniciar el proceso.
    let registry = TaskRegistry::new();

    log::info!("Levantando servidor en 0.0.0.0:5022");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(registry.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(("0.0.0.0", 5022))?
    .run()
    .await
}
