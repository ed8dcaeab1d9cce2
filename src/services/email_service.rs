//! services/email_service.rs
//! Transporte de email: SMTP por sender vía lettre, con el CV adjunto desde
//! disco y cuerpo HTML más alternativa de texto plano.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use lettre::{
    message::{
        header::{ContentDisposition, ContentType},
        Body, Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::models::outcome_model::SendOutcome;
use crate::models::sender_model::SenderIdentity;

/// Tiempo máximo por envío SMTP.
const SMTP_SEND_TIMEOUT: Duration = Duration::from_secs(30);

const HTML_BODY: &str = r#"<div style="font-family: 'Segoe UI', Arial, sans-serif; color: #333;">
  <p>Dear Hiring Manager,</p>
  <p>I am writing to express my interest in a software development role at your company. My experience in backend systems and automation aligns with the kind of innovative work you are doing.</p>
  <p>Please find my resume attached for your consideration. I am confident that my skills would be a valuable asset to your team.</p>
  <p>Thank you for your time.</p>
  <p>Sincerely,</p>
  <p>A Professional Developer</p>
</div>"#;

const PLAIN_BODY: &str = "Please find my resume attached.";

#[derive(Debug, Clone)]
pub struct EmailService {
    use_tls: bool,
    use_ssl: bool,
    from_name: String,
}

impl EmailService {
    pub fn new(use_tls: bool, use_ssl: bool, from_name: String) -> Self {
        Self {
            use_tls,
            use_ssl,
            from_name,
        }
    }

    /// Envía un correo con el CV del sender adjunto. Nunca propaga error:
    /// el resultado (éxito o fallo descriptivo) queda en el SendOutcome.
    pub async fn send(&self, recipient: &str, sender: &SenderIdentity) -> SendOutcome {
        let resume_filename = sender.resume_filename.clone().unwrap_or_default();
        let subject = sender.email_subject.clone().unwrap_or_default();

        // El adjunto se valida en cada envío: puede desaparecer del disco
        // entre un target y el siguiente.
        if !Path::new(&resume_filename).exists() {
            log::error!(
                "Adjunto no encontrado en '{}'. Debe estar en la raíz del proyecto.",
                resume_filename
            );
            return SendOutcome::Failed {
                reason: format!("Attachment '{}' not found", resume_filename),
            };
        }

        log::info!(
            "Preparando email de '{}' a '{}' con CV '{}' y asunto '{}'",
            sender.id,
            recipient,
            resume_filename,
            subject
        );

        match self
            .send_via_smtp(recipient, sender, &resume_filename, &subject)
            .await
        {
            Ok(_) => {
                log::info!("Email enviado de '{}' a '{}'", sender.id, recipient);
                SendOutcome::Sent {
                    sender_id: sender.id.clone(),
                }
            }
            Err(e) => {
                log::error!(
                    "Fallo el envío de '{}' a '{}': {:#}",
                    sender.id,
                    recipient,
                    e
                );
                SendOutcome::Failed {
                    reason: format!("Sending Error ({})", sender.id),
                }
            }
        }
    }

    async fn send_via_smtp(
        &self,
        recipient: &str,
        sender: &SenderIdentity,
        resume_path: &str,
        subject: &str,
    ) -> Result<()> {
        let host = sender
            .host
            .clone()
            .ok_or_else(|| anyhow!("sender sin host"))?;
        let port = sender.port.ok_or_else(|| anyhow!("sender sin port"))?;
        let password = sender
            .password
            .clone()
            .ok_or_else(|| anyhow!("sender sin password"))?;

        let from: Mailbox = format!("{} <{}>", self.from_name, sender.id)
            .parse()
            .context("Invalid from address")?;
        let to: Mailbox = recipient.parse().context("Invalid recipient address")?;

        // Modo de cifrado a nivel de proceso: STARTTLS (587) o SSL (465).
        let tls_params = TlsParameters::new(host.clone())?;
        let tls = if self.use_ssl {
            Tls::Wrapper(tls_params)
        } else if self.use_tls {
            Tls::Required(tls_params)
        } else {
            Tls::None
        };

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .credentials(Credentials::new(sender.id.clone(), password))
            .tls(tls)
            .build();

        let attachment_data = std::fs::read(resume_path)
            .with_context(|| format!("No se pudo leer el adjunto '{}'", resume_path))?;

        let attachment = SinglePart::builder()
            .header(ContentType::parse("application/pdf")?)
            .header(ContentDisposition::attachment(resume_path))
            .body(Body::new(attachment_data));

        let multipart = MultiPart::mixed()
            .multipart(MultiPart::alternative_plain_html(
                PLAIN_BODY.to_string(),
                HTML_BODY.to_string(),
            ))
            .singlepart(attachment);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(multipart)?;

        tokio::time::timeout(SMTP_SEND_TIMEOUT, mailer.send(message)).await??;
        Ok(())
    }
}
