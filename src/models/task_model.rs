use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estado de una tarea en background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Queued,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Registro en memoria de una tarea (scraping o campaña).
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    pub id: String,
    // "Scraping", "Email Campaign", "WhatsApp Campaign"
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    pub progress: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Request para iniciar scraping. `country` y `job` aceptan un valor único
/// o una lista; se genera el producto cartesiano.
#[derive(Debug, Clone, Deserialize)]
pub struct StartScrapingRequest {
    pub country: Option<OneOrMany>,
    pub job: Option<OneOrMany>,
    pub max_results: Option<u32>,
    pub proxy_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Una combinación empleo/país a scrapear.
#[derive(Debug, Clone)]
pub struct JobCombination {
    pub job: String,
    pub country: String,
}
