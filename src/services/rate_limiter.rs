//! services/rate_limiter.rs
//! Decide si un sender puede enviar un mensaje más, contra la ventana
//! móvil de 24 horas del ledger. No tiene locking propio: el limitador es
//! propiedad exclusiva del worker de UNA campaña de un canal.

use chrono::Utc;

use crate::models::sender_model::Channel;
use crate::models::usage_model::UsageRecord;
use crate::services::usage_service::UsageLedger;

/// Límites diarios por canal (mensajes por sender).
#[derive(Debug, Clone, Copy)]
pub struct DailyLimits {
    pub email: usize,
    pub whatsapp: usize,
}

impl DailyLimits {
    pub fn for_channel(&self, channel: Channel) -> usize {
        match channel {
            Channel::Email => self.email,
            Channel::Whatsapp => self.whatsapp,
        }
    }
}

pub struct RateLimiter {
    limits: DailyLimits,
    ledger: UsageLedger,
}

impl RateLimiter {
    pub fn new(limits: DailyLimits, ledger: UsageLedger) -> Self {
        log::info!(
            "Rate limiter inicializado: email={} whatsapp={} mensajes/día por sender",
            limits.email,
            limits.whatsapp
        );
        RateLimiter { limits, ledger }
    }

    /// ¿Puede este sender enviar un mensaje más de este canal ahora mismo?
    /// Un sender_id vacío nunca está disponible.
    pub fn is_available(&self, channel: Channel, sender_id: &str) -> bool {
        if sender_id.is_empty() {
            log::warn!("Chequeo de disponibilidad sin sender_id");
            return false;
        }

        let limit = self.limits.for_channel(channel);
        let used = self.ledger.count_in_window(channel, sender_id, Utc::now());

        if used < limit {
            log::info!(
                "   Disponible: {} ({}/{}, quedan {})",
                sender_id,
                used,
                limit,
                limit - used
            );
            true
        } else {
            log::warn!("   Límite alcanzado: {} ({}/{})", sender_id, used, limit);
            false
        }
    }

    /// Registra un envío exitoso en el ledger (hoja + snapshot).
    pub async fn log_send(&mut self, sender_id: &str, recipient: &str, channel: Channel) {
        self.ledger
            .record(UsageRecord {
                sender_id: sender_id.to_string(),
                channel,
                recipient: recipient.to_string(),
                timestamp: Utc::now(),
            })
            .await;
    }
}
