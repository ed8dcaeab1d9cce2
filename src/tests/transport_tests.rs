//! tests/transport_tests.rs
//! Pruebas de los transportes de canal, sin depender de servidores reales:
//! validación de adjuntos y degradación a outcomes de fallo.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use actix_rt::test;
    use tempfile::NamedTempFile;

    use crate::models::outcome_model::SendOutcome;
    use crate::services::email_service::EmailService;
    use crate::services::whatsapp_service::WhatsappService;
    use crate::tests::support::test_sender;

    #[test]
    async fn test_email_send_reports_missing_attachment() {
        let service = EmailService::new(false, false, "Test Agency".to_string());
        let mut sender = test_sender("a@mail.com");
        sender.resume_filename = Some("definitely-missing-resume.pdf".to_string());

        let outcome = service.send("target@x.com", &sender).await;
        assert_eq!(
            outcome,
            SendOutcome::Failed {
                reason: "Attachment 'definitely-missing-resume.pdf' not found".to_string()
            }
        );
    }

    #[test]
    async fn test_email_send_failure_becomes_descriptive_outcome() {
        // El adjunto existe pero el host SMTP (puerto 9 local) no responde:
        // el error de transporte se degrada a un outcome, nunca a un panic.
        let mut resume = NamedTempFile::new().expect("temp file");
        resume.write_all(b"%PDF-1.4 test").expect("write");

        let service = EmailService::new(false, false, "Test Agency".to_string());
        let mut sender = test_sender("a@mail.com");
        sender.resume_filename = Some(resume.path().to_string_lossy().to_string());

        let outcome = service.send("target@x.com", &sender).await;
        assert_eq!(
            outcome,
            SendOutcome::Failed {
                reason: "Sending Error (a@mail.com)".to_string()
            }
        );
    }

    #[test]
    async fn test_whatsapp_upload_requires_key_and_existing_file() {
        let service = WhatsappService::new(
            "http://127.0.0.1:9/send".to_string(),
            "http://127.0.0.1:9/upload".to_string(),
            "hola".to_string(),
        );

        assert!(service.upload_resume("", "resume.pdf").await.is_none());
        assert!(service
            .upload_resume("key", "definitely-missing-resume.pdf")
            .await
            .is_none());
    }

    #[test]
    async fn test_whatsapp_send_rejects_incomplete_input() {
        let service = WhatsappService::new(
            "http://127.0.0.1:9/send".to_string(),
            "http://127.0.0.1:9/upload".to_string(),
            "hola".to_string(),
        );

        let mut sender = test_sender("w1");
        sender.api_key = Some("key".to_string());
        let numbers = vec!["+15551234567".to_string()];

        let no_numbers = service.send(&[], "file-id", &sender, "cv.pdf").await;
        assert_eq!(
            no_numbers,
            SendOutcome::Failed {
                reason: "No Valid Phone Found".to_string()
            }
        );

        let no_attachment = service.send(&numbers, "", &sender, "cv.pdf").await;
        assert_eq!(
            no_attachment,
            SendOutcome::Failed {
                reason: "Missing Attachment ID".to_string()
            }
        );

        sender.api_key = None;
        let no_key = service.send(&numbers, "file-id", &sender, "cv.pdf").await;
        assert_eq!(
            no_key,
            SendOutcome::Failed {
                reason: "Invalid Sender Config".to_string()
            }
        );
    }
}
