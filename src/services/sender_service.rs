//! services/sender_service.rs
//! Directorio de senders: carga el "Senders Pool" y resuelve la secuencia
//! de envío de un canal.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::sender_model::{Channel, SenderIdentity};
use crate::services::sheets_service::RowStore;

pub struct SenderDirectory {
    store: Arc<dyn RowStore>,
    pool_sheet_name: String,
}

impl SenderDirectory {
    pub fn new(store: Arc<dyn RowStore>, pool_sheet_name: String) -> Self {
        SenderDirectory {
            store,
            pool_sheet_name,
        }
    }

    /// Devuelve la secuencia ORDENADA de senders activos del canal. El
    /// orden de la hoja se preserva: define la secuencia de envío que cada
    /// target recibirá durante toda la campaña. Si la hoja no se puede
    /// leer devuelve lista vacía (el caller decide si eso es fatal).
    pub async fn list_active_senders(&self, channel: Channel) -> Vec<SenderIdentity> {
        let rows = match self.store.get_all_values(&self.pool_sheet_name).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("No se pudo leer la hoja '{}': {}", self.pool_sheet_name, e);
                return Vec::new();
            }
        };

        if rows.is_empty() {
            log::warn!("La hoja '{}' está vacía", self.pool_sheet_name);
            return Vec::new();
        }

        let header_map: HashMap<String, usize> = rows[0]
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i + 1))
            .collect();

        let senders: Vec<SenderIdentity> = rows[1..]
            .iter()
            .filter_map(|row| SenderIdentity::from_row(&header_map, row))
            .filter(|s| s.channel == channel && s.active)
            .collect();

        log::info!(
            "Se encontraron {} sender(s) activos para el canal '{}'",
            senders.len(),
            channel
        );
        for (idx, sender) in senders.iter().enumerate() {
            log::info!("   {}. Cuenta: {}", idx + 1, sender.id);
        }

        senders
    }
}
