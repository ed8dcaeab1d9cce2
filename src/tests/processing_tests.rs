//! tests/processing_tests.rs
//! Pruebas de la capa de procesamiento: URLs de búsqueda, limpieza de
//! contactos, parsing del pool de senders y render del estado consolidado.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::config::app_config::AppConfig;
    use crate::models::lead_model::ContactDetailRecord;
    use crate::models::outcome_model::{SendOutcome, TargetReport};
    use crate::models::sender_model::{Channel, SenderIdentity};
    use crate::services::campaign_service::{ChannelAdapter, EmailChannel, WhatsappChannel};
    use crate::services::processing_service::{build_linkedin_url, process_contact_data};

    #[test]
    fn test_build_linkedin_url_encodes_parameters() {
        let url = build_linkedin_url("Software Engineer", "United States");
        assert_eq!(
            url,
            "https://www.linkedin.com/jobs/search/?keywords=Software%20Engineer&location=United%20States&f_WT=2&f_TPR=r86400"
        );
    }

    #[test]
    fn test_process_contact_data_cleans_and_deduplicates() {
        let records = vec![
            ContactDetailRecord {
                domain: Some("acme.com".to_string()),
                emails: vec![" Info@Acme.com ".to_string(), "sales@acme.com".to_string()],
                phones: vec!["+1 (555) 123-4567".to_string()],
                phones_uncertain: vec!["15551234567".to_string()],
                linkedins: vec!["https://linkedin.com/company/acme".to_string()],
                ..Default::default()
            },
            ContactDetailRecord {
                emails: vec!["info@acme.com".to_string()],
                linkedins: vec!["https://linkedin.com/company/acme-2".to_string()],
                ..Default::default()
            },
        ];

        let info = process_contact_data(records);
        assert_eq!(info.domain, "acme.com");
        assert_eq!(info.emails, "info@acme.com, sales@acme.com");
        // Los dos teléfonos normalizan al mismo número.
        assert_eq!(info.phones, "15551234567");
        // Se queda con el primer link de cada red.
        assert_eq!(info.linkedin, "https://linkedin.com/company/acme");
    }

    #[test]
    fn test_process_contact_data_empty_input() {
        let info = process_contact_data(Vec::new());
        assert_eq!(info.emails, "");
        assert_eq!(info.phones, "");
    }

    fn pool_header_map() -> HashMap<String, usize> {
        ["type", "id", "is_active", "password", "host", "port", "api_key", "resume_filename", "email_subject"]
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i + 1))
            .collect()
    }

    #[test]
    fn test_sender_identity_from_row() {
        let header_map = pool_header_map();
        let row: Vec<String> = vec![
            "email", "a@mail.com", "TRUE", "pw", "smtp.mail.com", "587", "", "resume_a.pdf",
            "Backend Developer",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let sender = SenderIdentity::from_row(&header_map, &row).expect("sender");
        assert_eq!(sender.id, "a@mail.com");
        assert_eq!(sender.channel, Channel::Email);
        assert!(sender.active);
        assert_eq!(sender.port, Some(587));
        assert_eq!(sender.api_key, None);
        assert_eq!(sender.resume_filename.as_deref(), Some("resume_a.pdf"));
    }

    #[test]
    fn test_sender_identity_inactive_and_unknown_type() {
        let header_map = pool_header_map();

        let inactive: Vec<String> = vec!["whatsapp", "w1", "FALSE", "", "", "", "key", "cv.pdf", ""]
            .into_iter()
            .map(String::from)
            .collect();
        let sender = SenderIdentity::from_row(&header_map, &inactive).expect("sender");
        assert!(!sender.active);

        let unknown: Vec<String> = vec!["telegram", "t1", "TRUE"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(SenderIdentity::from_row(&header_map, &unknown).is_none());

        // Sin columna type parseable no hay identidad.
        assert!(SenderIdentity::from_row(&header_map, &[]).is_none());
    }

    #[test]
    fn test_email_channel_validation_normalizes_and_deduplicates() {
        let adapter = EmailChannel::new(&AppConfig::default());

        let contacts = adapter.validate_contacts("Bob@Example.com, not-an-email, alice@x.com");
        assert_eq!(contacts, vec!["bob@example.com", "alice@x.com"]);

        let duplicated = adapter.validate_contacts("A@x.com, a@x.com");
        assert_eq!(duplicated, vec!["a@x.com"]);

        assert!(adapter.validate_contacts("garbage, more-garbage").is_empty());
        assert!(adapter.validate_contacts("").is_empty());
    }

    #[test]
    fn test_whatsapp_channel_validation_requires_digits_and_prefixes_plus() {
        let adapter = WhatsappChannel::new(&AppConfig::default());

        let contacts = adapter.validate_contacts("15551234567, abc123, 4930123456");
        assert_eq!(contacts, vec!["+15551234567", "+4930123456"]);

        let duplicated = adapter.validate_contacts("123, 123");
        assert_eq!(duplicated, vec!["+123"]);

        assert!(adapter.validate_contacts("+123").is_empty()); // el '+' no es dígito
    }

    #[test]
    fn test_target_report_renders_consolidated_status() {
        let mut report = TargetReport::new(3);
        report.push(SendOutcome::Sent {
            sender_id: "A".to_string(),
        });
        report.push(SendOutcome::Failed {
            reason: "Sending Error (B)".to_string(),
        });
        report.push(SendOutcome::RateLimited {
            sender_id: "C".to_string(),
        });

        assert_eq!(report.sent_count(), 1);
        assert_eq!(
            report.to_status_string(),
            "Completed: Sent 1/3. Details: [Sent via A, Failed: Sending Error (B), Skipped: C rate-limited]"
        );
    }
}
