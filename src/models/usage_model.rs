use chrono::{DateTime, Utc};

use crate::models::sender_model::Channel;

/// Formato de timestamp usado en la hoja de log de envíos.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Un envío exitoso registrado en el "Senders Log". Se crea si y solo si
/// el transporte del canal reportó éxito.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub sender_id: String,
    pub channel: Channel,
    pub recipient: String,
    pub timestamp: DateTime<Utc>,
}

impl UsageRecord {
    /// Fila tal como se persiste: [sender_id, channel, recipient, timestamp].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.sender_id.clone(),
            self.channel.as_str().to_string(),
            self.recipient.clone(),
            self.timestamp.format(LOG_TIMESTAMP_FORMAT).to_string(),
        ]
    }
}
