//! services/usage_service.rs
//! Ledger de uso: historial de envíos del "Senders Log" con un snapshot en
//! memoria. El snapshot es válido solo durante UNA campaña de un canal; no
//! se comparte entre workers.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::models::sender_model::Channel;
use crate::models::usage_model::{UsageRecord, LOG_TIMESTAMP_FORMAT};
use crate::services::sheets_service::RowStore;

pub struct UsageLedger {
    store: Arc<dyn RowStore>,
    log_sheet_name: String,
    snapshot: Vec<UsageRecord>,
}

impl UsageLedger {
    /// Crea el ledger y carga el historial completo una única vez. Si la
    /// hoja no se puede leer arranca con snapshot vacío: un log ausente
    /// equivale a "sin historial".
    pub async fn load_recent(store: Arc<dyn RowStore>, log_sheet_name: String) -> Self {
        let mut ledger = UsageLedger {
            store,
            log_sheet_name,
            snapshot: Vec::new(),
        };
        ledger.refresh().await;
        ledger
    }

    /// Recarga completa del snapshot desde la hoja. Filas con timestamp
    /// inválido se descartan.
    pub async fn refresh(&mut self) {
        self.snapshot.clear();

        let rows = match self.store.get_all_values(&self.log_sheet_name).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("No se pudo leer la hoja '{}': {}", self.log_sheet_name, e);
                return;
            }
        };

        // Filas: [sender_id, channel, recipient, timestamp]; fila 1 es encabezado.
        for row in rows.into_iter().skip(1) {
            if let Some(record) = parse_log_row(&row) {
                self.snapshot.push(record);
            }
        }

        let window_start = Utc::now() - Duration::hours(24);
        let recent = self
            .snapshot
            .iter()
            .filter(|r| r.timestamp >= window_start)
            .count();
        log::info!(
            "Historial de envíos cargado: {} registro(s), {} en las últimas 24h",
            self.snapshot.len(),
            recent
        );
    }

    /// Envíos del sender en el canal dentro de la ventana móvil de 24
    /// horas que termina en `now`.
    pub fn count_in_window(&self, channel: Channel, sender_id: &str, now: DateTime<Utc>) -> usize {
        let window_start = now - Duration::hours(24);
        self.snapshot
            .iter()
            .filter(|r| {
                r.sender_id == sender_id && r.channel == channel && r.timestamp >= window_start
            })
            .count()
    }

    /// Registra un envío exitoso: apéndice en la hoja Y alta en el
    /// snapshot. La doble escritura es lo que mantiene el conteo correcto
    /// dentro de la misma corrida sin releer la hoja. Si la persistencia
    /// falla solo queda un warning: el mensaje ya fue entregado y ese hecho
    /// no se degrada, pero el historial durable queda incompleto.
    pub async fn record(&mut self, record: UsageRecord) {
        if let Err(e) = self
            .store
            .append_row(&self.log_sheet_name, record.to_row())
            .await
        {
            log::warn!(
                "No se pudo persistir el log de envío de '{}' en '{}': {}",
                record.sender_id,
                self.log_sheet_name,
                e
            );
        }
        self.snapshot.push(record);
    }
}

fn parse_log_row(row: &[String]) -> Option<UsageRecord> {
    let sender_id = row.first()?.trim().to_string();
    let channel = match row.get(1)?.trim().to_lowercase().as_str() {
        "email" => Channel::Email,
        "whatsapp" => Channel::Whatsapp,
        _ => return None,
    };
    let recipient = row.get(2).map(|v| v.trim().to_string()).unwrap_or_default();
    let naive = NaiveDateTime::parse_from_str(row.get(3)?.trim(), LOG_TIMESTAMP_FORMAT).ok()?;
    Some(UsageRecord {
        sender_id,
        channel,
        recipient,
        timestamp: DateTime::from_naive_utc_and_offset(naive, Utc),
    })
}
