//! services/campaign_service.rs
//! Motor de campañas secuenciales: para cada target pendiente intenta la
//! secuencia COMPLETA de senders del canal, consultando el rate limiter
//! antes de cada envío, registrando cada éxito en el ledger y consolidando
//! un único estado por target en la hoja.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::config::app_config::AppConfig;
use crate::models::outcome_model::{SendOutcome, TargetReport};
use crate::models::sender_model::{Channel, SenderIdentity};
use crate::services::email_service::EmailService;
use crate::services::rate_limiter::{DailyLimits, RateLimiter};
use crate::services::sender_service::SenderDirectory;
use crate::services::sheets_service::RowStore;
use crate::services::task_service::TaskRegistry;
use crate::services::usage_service::UsageLedger;
use crate::services::whatsapp_service::WhatsappService;

/// Comportamiento específico de cada canal dentro del motor: columnas,
/// validación de contactos, chequeo de configuración y entrega.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> Channel;

    /// Columna con los contactos del target (emails o teléfonos).
    fn contact_column(&self) -> &str;
    /// Columna de estado del canal.
    fn status_column(&self) -> &str;

    /// Estado terminal cuando la celda de contactos está vacía.
    fn empty_contact_status(&self) -> &'static str;
    /// Estado terminal cuando ningún contacto pasa la validación.
    fn invalid_contact_status(&self) -> &'static str;

    /// Extrae, valida y deduplica los contactos de la celda cruda.
    fn validate_contacts(&self, raw: &str) -> Vec<String>;

    /// ¿Tiene el sender toda la configuración que exige este canal?
    fn sender_ready(&self, sender: &SenderIdentity) -> bool;

    /// Etiqueta de destinatario que se registra en el ledger.
    fn recipient_label(&self, contacts: &[String]) -> String;

    /// Entrega un mensaje. Devuelve Sent o Failed; nunca propaga error.
    async fn deliver(&self, sender: &SenderIdentity, contacts: &[String]) -> SendOutcome;
}

// ==========================================================================
// Canal de email
// ==========================================================================

pub struct EmailChannel {
    transport: EmailService,
    contact_column: String,
    status_column: String,
}

impl EmailChannel {
    pub fn new(config: &AppConfig) -> Self {
        EmailChannel {
            transport: EmailService::new(
                config.mail_use_tls,
                config.mail_use_ssl,
                config.mail_from_name.clone(),
            ),
            contact_column: config.email_column_name.clone(),
            status_column: config.email_status_column.clone(),
        }
    }
}

#[async_trait]
impl ChannelAdapter for EmailChannel {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn contact_column(&self) -> &str {
        &self.contact_column
    }

    fn status_column(&self) -> &str {
        &self.status_column
    }

    fn empty_contact_status(&self) -> &'static str {
        "No Email Found"
    }

    fn invalid_contact_status(&self) -> &'static str {
        "No Valid Email"
    }

    fn validate_contacts(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty() && e.contains('@'))
            .filter(|e| seen.insert(e.clone()))
            .collect()
    }

    fn sender_ready(&self, sender: &SenderIdentity) -> bool {
        !sender.id.is_empty()
            && sender.password.is_some()
            && sender.host.is_some()
            && sender.port.is_some()
            && sender.resume_filename.is_some()
            && sender.email_subject.is_some()
    }

    fn recipient_label(&self, contacts: &[String]) -> String {
        contacts.first().cloned().unwrap_or_default()
    }

    async fn deliver(&self, sender: &SenderIdentity, contacts: &[String]) -> SendOutcome {
        // Para email se envía solo al primer contacto válido.
        match contacts.first() {
            Some(recipient) => self.transport.send(recipient, sender).await,
            None => SendOutcome::Failed {
                reason: "No Valid Email Found".to_string(),
            },
        }
    }
}

// ==========================================================================
// Canal de WhatsApp
// ==========================================================================

pub struct WhatsappChannel {
    transport: WhatsappService,
    contact_column: String,
    status_column: String,
}

impl WhatsappChannel {
    pub fn new(config: &AppConfig) -> Self {
        WhatsappChannel {
            transport: WhatsappService::new(
                config.whatsapp_api_url.clone(),
                config.whatsapp_upload_url.clone(),
                config.whatsapp_message_content.clone(),
            ),
            contact_column: config.phone_column_name.clone(),
            status_column: config.whatsapp_status_column.clone(),
        }
    }
}

#[async_trait]
impl ChannelAdapter for WhatsappChannel {
    fn channel(&self) -> Channel {
        Channel::Whatsapp
    }

    fn contact_column(&self) -> &str {
        &self.contact_column
    }

    fn status_column(&self) -> &str {
        &self.status_column
    }

    fn empty_contact_status(&self) -> &'static str {
        "No Phone Found"
    }

    fn invalid_contact_status(&self) -> &'static str {
        "No Valid Phone"
    }

    fn validate_contacts(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .map(|p| format!("+{}", p))
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }

    fn sender_ready(&self, sender: &SenderIdentity) -> bool {
        !sender.id.is_empty() && sender.api_key.is_some() && sender.resume_filename.is_some()
    }

    fn recipient_label(&self, contacts: &[String]) -> String {
        contacts.join(",")
    }

    async fn deliver(&self, sender: &SenderIdentity, contacts: &[String]) -> SendOutcome {
        let resume_filename = sender.resume_filename.clone().unwrap_or_default();
        let api_key = sender.api_key.clone().unwrap_or_default();

        // El adjunto se sube en cada envío: el identificador es temporal.
        let attachment_id = match self
            .transport
            .upload_resume(&api_key, &resume_filename)
            .await
        {
            Some(id) => id,
            None => {
                return SendOutcome::Failed {
                    reason: format!("Upload error for {}", resume_filename),
                }
            }
        };

        self.transport
            .send(contacts, &attachment_id, sender, &resume_filename)
            .await
    }
}

// ==========================================================================
// Motor
// ==========================================================================

struct CampaignContext {
    senders: Vec<SenderIdentity>,
    limiter: RateLimiter,
    // (índice 0-indexado de la fila en memoria, celda cruda de contactos)
    targets: Vec<(usize, String)>,
    status_col: usize, // 0-indexado
}

pub struct CampaignEngine {
    store: Arc<dyn RowStore>,
    registry: TaskRegistry,
    config: AppConfig,
}

impl CampaignEngine {
    pub fn new(store: Arc<dyn RowStore>, registry: TaskRegistry, config: AppConfig) -> Self {
        CampaignEngine {
            store,
            registry,
            config,
        }
    }

    /// Ejecuta una campaña completa para el canal del adapter. Un fallo de
    /// inicialización marca la tarea como failed sin procesar targets; a
    /// partir del loop de targets la corrida siempre termina en completed y
    /// cada anomalía queda en el estado consolidado de su fila.
    pub async fn run(&self, task_id: &str, adapter: &dyn ChannelAdapter) {
        log::info!(
            "Campaña de {} iniciada - Task ID: {}",
            adapter.channel(),
            task_id
        );
        self.registry.mark_running(task_id);

        let ctx = match self.initialize(adapter).await {
            Ok(ctx) => ctx,
            Err(e) => {
                let message = format!("Initialization failed: {:#}", e);
                log::error!("Fallo la inicialización de la campaña: {:#}", e);
                self.registry.mark_failed(task_id, &message);
                return;
            }
        };

        let CampaignContext {
            senders,
            mut limiter,
            targets,
            status_col,
        } = ctx;

        let total_targets = targets.len();
        log::info!(
            "Campaña de {}: {} target(s) pendientes, {} sender(s), máximo {} envíos",
            adapter.channel(),
            total_targets,
            senders.len(),
            total_targets * senders.len()
        );

        for (position, (row_index, raw_contacts)) in targets.iter().enumerate() {
            log::info!("Target {}/{}", position + 1, total_targets);
            self.registry.update_progress(
                task_id,
                &format!("Processing Target {}/{}", position + 1, total_targets),
            );

            self.process_target(
                adapter,
                &mut limiter,
                *row_index,
                raw_contacts,
                &senders,
                status_col,
            )
            .await;
        }

        log::info!(
            "Campaña de {} finalizada: {} target(s) procesados",
            adapter.channel(),
            total_targets
        );
        self.registry.mark_completed(
            task_id,
            &format!("Campaign finished: {} target(s) processed.", total_targets),
        );
    }

    async fn initialize(&self, adapter: &dyn ChannelAdapter) -> Result<CampaignContext> {
        // 1) Datos de la hoja principal
        let all_data = self
            .store
            .get_all_values(&self.config.data_sheet_name)
            .await
            .context("No se pudo leer la hoja de datos")?;

        if all_data.is_empty() {
            return Err(anyhow!(
                "La hoja '{}' está vacía",
                self.config.data_sheet_name
            ));
        }

        // El mapa de encabezados se arma de la fila 1 (0-indexado en memoria).
        let header_map: HashMap<String, usize> = all_data[0]
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i))
            .collect();

        let contact_col = header_map.get(adapter.contact_column()).copied();
        let status_col = header_map.get(adapter.status_column()).copied();
        let (contact_col, status_col) = match (contact_col, status_col) {
            (Some(c), Some(s)) => (c, s),
            _ => {
                return Err(anyhow!(
                    "Columnas '{}' o '{}' no encontradas en la hoja",
                    adapter.contact_column(),
                    adapter.status_column()
                ))
            }
        };

        // 2) Secuencia de senders del canal
        let directory = SenderDirectory::new(
            self.store.clone(),
            self.config.senders_pool_sheet_name.clone(),
        );
        let senders = directory.list_active_senders(adapter.channel()).await;
        if senders.is_empty() {
            return Err(anyhow!(
                "No hay senders activos de {} en la hoja '{}'",
                adapter.channel(),
                self.config.senders_pool_sheet_name
            ));
        }

        // 3) Ledger + rate limiter: el snapshot es de esta corrida nada más
        let ledger = UsageLedger::load_recent(
            self.store.clone(),
            self.config.senders_log_sheet_name.clone(),
        )
        .await;
        let limiter = RateLimiter::new(
            DailyLimits {
                email: self.config.email_daily_limit,
                whatsapp: self.config.whatsapp_daily_limit,
            },
            ledger,
        );

        // 4) Targets pendientes, en el orden natural de la hoja
        let targets: Vec<(usize, String)> = all_data
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, row)| {
                row.get(status_col).map(|s| s.as_str()) == Some(self.config.pending_status.as_str())
            })
            .map(|(i, row)| (i, row.get(contact_col).cloned().unwrap_or_default()))
            .collect();

        Ok(CampaignContext {
            senders,
            limiter,
            targets,
            status_col,
        })
    }

    async fn process_target(
        &self,
        adapter: &dyn ChannelAdapter,
        limiter: &mut RateLimiter,
        row_index: usize,
        raw_contacts: &str,
        senders: &[SenderIdentity],
        status_col: usize,
    ) {
        // En la hoja las filas y columnas son 1-indexadas.
        let sheet_row = row_index + 1;
        let sheet_col = status_col + 1;

        if raw_contacts.trim().is_empty() {
            log::warn!("Fila {}: sin contacto", sheet_row);
            self.write_status(sheet_row, sheet_col, adapter.empty_contact_status())
                .await;
            return;
        }

        let contacts = adapter.validate_contacts(raw_contacts);
        if contacts.is_empty() {
            log::warn!(
                "Fila {}: ningún contacto válido en '{}'",
                sheet_row,
                raw_contacts
            );
            self.write_status(sheet_row, sheet_col, adapter.invalid_contact_status())
                .await;
            return;
        }

        log::info!("Destinatario(s): {}", contacts.join(", "));

        let mut report = TargetReport::new(senders.len());

        for (sender_index, sender) in senders.iter().enumerate() {
            log::info!("   -> Sender #{}: {}", sender_index + 1, sender.id);

            // Sin configuración completa no hay intento ni consumo de cupo.
            if !adapter.sender_ready(sender) {
                log::warn!(
                    "   Sender '{}' sin configuración completa, se omite",
                    sender.id
                );
                report.push(SendOutcome::MissingConfig {
                    sender_id: if sender.id.is_empty() {
                        "sender".to_string()
                    } else {
                        sender.id.clone()
                    },
                });
                continue;
            }

            if !limiter.is_available(adapter.channel(), &sender.id) {
                report.push(SendOutcome::RateLimited {
                    sender_id: sender.id.clone(),
                });
                continue;
            }

            let outcome = adapter.deliver(sender, &contacts).await;
            if outcome.is_sent() {
                // Registro inmediato: el siguiente target de esta misma
                // corrida ya ve este envío en el snapshot.
                limiter
                    .log_send(
                        &sender.id,
                        &adapter.recipient_label(&contacts),
                        adapter.channel(),
                    )
                    .await;
            } else {
                log::error!("   {}", outcome);
            }
            report.push(outcome);
        }

        log::info!(
            "Resumen para {}: {}/{} envíos exitosos",
            adapter.recipient_label(&contacts),
            report.sent_count(),
            report.sequence_len
        );

        // Única mutación de la fila en toda la corrida.
        self.write_status(sheet_row, sheet_col, &report.to_status_string())
            .await;
    }

    async fn write_status(&self, row: usize, col: usize, value: &str) {
        if let Err(e) = self
            .store
            .update_cell(&self.config.data_sheet_name, row, col, value)
            .await
        {
            log::error!("No se pudo actualizar el estado de la fila {}: {}", row, e);
        }
    }
}
