use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Canal de salida de una campaña. Cada canal tiene su propio pool de
/// senders y su propio límite diario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Whatsapp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Una identidad de envío del "Senders Pool": una casilla de correo o una
/// cuenta de la API de mensajería, con sus credenciales, su CV adjunto y
/// su asunto propios. De solo lectura durante una campaña.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub id: String,
    pub channel: Channel,
    pub active: bool,
    // Credenciales de email
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    // Credencial de WhatsApp
    pub api_key: Option<String>,
    // Adjunto y asunto por cuenta
    pub resume_filename: Option<String>,
    pub email_subject: Option<String>,
}

impl SenderIdentity {
    /// Construye una identidad desde una fila de la hoja del pool, usando
    /// el mapa de encabezados (posiciones 1-indexadas). Filas sin columna
    /// `type` reconocible se descartan.
    pub fn from_row(header_map: &HashMap<String, usize>, row: &[String]) -> Option<Self> {
        let cell = |name: &str| -> Option<String> {
            header_map
                .get(name)
                .and_then(|idx| row.get(idx - 1))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let channel = match cell("type")?.to_lowercase().as_str() {
            "email" => Channel::Email,
            "whatsapp" => Channel::Whatsapp,
            _ => return None,
        };

        let active = cell("is_active")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Some(SenderIdentity {
            id: cell("id").unwrap_or_default(),
            channel,
            active,
            password: cell("password"),
            host: cell("host"),
            port: cell("port").and_then(|v| v.parse().ok()),
            api_key: cell("api_key"),
            resume_filename: cell("resume_filename"),
            email_subject: cell("email_subject"),
        })
    }
}
