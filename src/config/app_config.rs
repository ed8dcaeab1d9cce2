//! config/app_config.rs
//! Configuración global del servicio, leída del entorno (.env).

use serde::{Deserialize, Serialize};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.as_str(), "True" | "true" | "1"))
        .unwrap_or(false)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Hoja de cálculo compartida
    pub spreadsheet_id: String,
    pub google_api_token: String,
    pub data_sheet_name: String,
    pub senders_pool_sheet_name: String,
    pub senders_log_sheet_name: String,

    // Columnas requeridas por el núcleo de campañas
    pub email_column_name: String,
    pub phone_column_name: String,
    pub email_status_column: String,
    pub whatsapp_status_column: String,
    pub link_column_name: String,
    pub pending_status: String,

    // Límites diarios por canal (mensajes por sender en 24h móviles)
    pub email_daily_limit: usize,
    pub whatsapp_daily_limit: usize,

    // Email: modo de cifrado a nivel de proceso, no por sender
    pub mail_use_tls: bool,
    pub mail_use_ssl: bool,
    pub mail_from_name: String,

    // API de mensajería de WhatsApp
    pub whatsapp_api_url: String,
    pub whatsapp_upload_url: String,
    pub whatsapp_message_content: String,

    // API de actores (scraping)
    pub apify_api_token: String,
    pub linkedin_actor_id: String,
    pub contact_scraper_actor_id: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            spreadsheet_id: env_or("GOOGLE_SHEET_ID", ""),
            google_api_token: env_or("GOOGLE_API_TOKEN", ""),
            data_sheet_name: env_or("DATA_SHEET_NAME", "Sheet1"),
            senders_pool_sheet_name: env_or("SENDERS_POOL_SHEET_NAME", "Senders Pool"),
            senders_log_sheet_name: env_or("SENDERS_LOG_SHEET_NAME", "Senders Log"),

            email_column_name: env_or("EMAIL_COLUMN_NAME", "emails"),
            phone_column_name: env_or("PHONE_COLUMN_NAME", "phones"),
            email_status_column: env_or("EMAIL_STATUS_COLUMN", "email_status"),
            whatsapp_status_column: env_or("WHATSAPP_STATUS_COLUMN", "whatsapp_status"),
            link_column_name: env_or("LINK_COLUMN_NAME", "link"),
            pending_status: "Pending".to_string(),

            email_daily_limit: env_usize("EMAIL_DAILY_LIMIT", 30),
            whatsapp_daily_limit: env_usize("WHATSAPP_DAILY_LIMIT", 200),

            // Para Gmail en el puerto 587, TLS (STARTTLS) debe ir en True
            // y SSL en False.
            mail_use_tls: env_flag("MAIL_USE_TLS"),
            mail_use_ssl: env_flag("MAIL_USE_SSL"),
            mail_from_name: env_or("MAIL_FROM_NAME", "Mirza Agency"),

            whatsapp_api_url: env_or(
                "WHATSAPP_API_URL",
                "https://back.inboxino.com/api/access-api/message/send",
            ),
            whatsapp_upload_url: env_or(
                "WHATSAPP_UPLOAD_URL",
                "https://dl2.inboxino.com/api/upload/file",
            ),
            whatsapp_message_content: env_or(
                "WHATSAPP_MESSAGE_CONTENT",
                "Hello, my name is Milad. I'm a software developer, and this file contains my resume. I would be glad to collaborate with your company.",
            ),

            apify_api_token: env_or("APIFY_API_TOKEN", ""),
            linkedin_actor_id: env_or("LINKEDIN_ACTOR_ID", ""),
            contact_scraper_actor_id: env_or("CONTACT_SCRAPER_ACTOR_ID", ""),
        }
    }
}

impl Default for AppConfig {
    /// Valores de desarrollo/test, sin credenciales.
    fn default() -> Self {
        AppConfig {
            spreadsheet_id: String::new(),
            google_api_token: String::new(),
            data_sheet_name: "Sheet1".to_string(),
            senders_pool_sheet_name: "Senders Pool".to_string(),
            senders_log_sheet_name: "Senders Log".to_string(),

            email_column_name: "emails".to_string(),
            phone_column_name: "phones".to_string(),
            email_status_column: "email_status".to_string(),
            whatsapp_status_column: "whatsapp_status".to_string(),
            link_column_name: "link".to_string(),
            pending_status: "Pending".to_string(),

            email_daily_limit: 30,
            whatsapp_daily_limit: 200,

            mail_use_tls: false,
            mail_use_ssl: false,
            mail_from_name: "Mirza Agency".to_string(),

            whatsapp_api_url: String::new(),
            whatsapp_upload_url: String::new(),
            whatsapp_message_content: String::new(),

            apify_api_token: String::new(),
            linkedin_actor_id: String::new(),
            contact_scraper_actor_id: String::new(),
        }
    }
}
