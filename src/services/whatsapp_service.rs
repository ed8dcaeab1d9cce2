//! services/whatsapp_service.rs
//! Transporte de WhatsApp (API de mensajería tipo Inboxino): sube el CV
//! para obtener un adjunto temporal y luego envía el mensaje con él.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::json;

use crate::models::outcome_model::SendOutcome;
use crate::models::sender_model::SenderIdentity;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(45);
const SEND_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct WhatsappService {
    http_client: Client,
    api_url: String,
    upload_url: String,
    message_content: String,
}

impl WhatsappService {
    pub fn new(api_url: String, upload_url: String, message_content: String) -> Self {
        Self {
            http_client: Client::new(),
            api_url,
            upload_url,
            message_content,
        }
    }

    /// Sube el CV del sender y devuelve el identificador temporal del
    /// adjunto, o None si algo falla. El fallo se loguea, no se propaga:
    /// el caller lo convierte en un outcome de fallo sin consumir cupo.
    pub async fn upload_resume(&self, api_key: &str, resume_filename: &str) -> Option<String> {
        if api_key.is_empty() {
            log::error!("Se requiere la API key para subir el archivo");
            return None;
        }
        if resume_filename.is_empty() {
            log::error!("Se requiere el nombre del CV para subir");
            return None;
        }
        if !Path::new(resume_filename).exists() {
            log::error!(
                "El CV '{}' no existe en la raíz del proyecto",
                resume_filename
            );
            return None;
        }

        log::info!("Subiendo '{}' al servidor de mensajería...", resume_filename);

        match self.do_upload(api_key, resume_filename).await {
            Ok(attachment_id) => {
                log::info!(
                    "CV '{}' subido. Attachment: {}",
                    resume_filename,
                    attachment_id
                );
                Some(attachment_id)
            }
            Err(e) => {
                log::error!("Fallo la subida de '{}': {:#}", resume_filename, e);
                None
            }
        }
    }

    async fn do_upload(&self, api_key: &str, resume_filename: &str) -> Result<String> {
        let data = std::fs::read(resume_filename)
            .with_context(|| format!("No se pudo leer '{}'", resume_filename))?;

        // La API acepta el archivo como base64 dentro del JSON.
        let payload = json!({
            "file": base64::encode(&data),
            "file_name": resume_filename,
            "mime_type": "application/pdf",
        });

        let resp = self
            .http_client
            .post(&self.upload_url)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .timeout(UPLOAD_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .context("Error de red en la subida")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Upload API respondió {}: {}", status, body));
        }

        let json_val = resp.json::<serde_json::Value>().await?;
        json_val
            .get("data")
            .and_then(|d| d.get("path"))
            .and_then(|p| p.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("la respuesta del upload no contiene 'data.path'"))
    }

    /// Envía el mensaje de WhatsApp con el adjunto ya subido a todos los
    /// números del target.
    pub async fn send(
        &self,
        phone_numbers: &[String],
        attachment_file_id: &str,
        sender: &SenderIdentity,
        resume_filename: &str,
    ) -> SendOutcome {
        if phone_numbers.is_empty() {
            return SendOutcome::Failed {
                reason: "No Valid Phone Found".to_string(),
            };
        }
        if attachment_file_id.is_empty() {
            return SendOutcome::Failed {
                reason: "Missing Attachment ID".to_string(),
            };
        }
        let api_key = match sender.api_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                return SendOutcome::Failed {
                    reason: "Invalid Sender Config".to_string(),
                }
            }
        };

        log::info!(
            "Enviando WhatsApp vía '{}' a: {}",
            sender.id,
            phone_numbers.join(", ")
        );

        let payload = json!({
            "messages": [{
                "message_type": "file",
                "attachment_file": attachment_file_id,
                "origin_file_name": resume_filename,
                "message": self.message_content,
            }],
            "type": "notification",
            "recipients": phone_numbers,
            "platforms": ["whatsapp"],
            "with_country_code": "0",
        });

        let result = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .timeout(SEND_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => SendOutcome::Sent {
                sender_id: sender.id.clone(),
            },
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                log::error!(
                    "Fallo el envío de WhatsApp vía '{}': {} {}",
                    sender.id,
                    status,
                    body
                );
                SendOutcome::Failed {
                    reason: format!("Sending Error ({})", sender.id),
                }
            }
            Err(e) => {
                log::error!("Fallo el envío de WhatsApp vía '{}': {}", sender.id, e);
                SendOutcome::Failed {
                    reason: format!("Sending Error ({})", sender.id),
                }
            }
        }
    }
}
