//! services/processing_service.rs
//! Construcción de URLs de búsqueda y limpieza/agregación de los datos de
//! contacto scrapeados.

use std::collections::HashSet;

use crate::models::lead_model::{ContactDetailRecord, ContactInfo};

/// Construye la URL de búsqueda de empleos de LinkedIn con los parámetros
/// principales. Los filtros fijos del sufijo: remoto (f_WT=2) y publicados
/// en las últimas 24 horas (f_TPR=r86400).
pub fn build_linkedin_url(keyword: &str, location_name: &str) -> String {
    let base_url = "https://www.linkedin.com/jobs/search/";
    let query = format!(
        "keywords={}&location={}",
        urlencoding::encode(keyword),
        urlencoding::encode(location_name)
    );
    format!("{}?{}&f_WT=2&f_TPR=r86400", base_url, query)
}

/// Deduplica preservando el orden de la primera aparición; descarta vacíos.
fn unique_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

/// Normaliza teléfonos: solo dígitos, deduplicados.
fn clean_phones(phones: Vec<String>) -> Vec<String> {
    let digits_only = phones
        .into_iter()
        .map(|p| p.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .collect();
    unique_preserving_order(digits_only)
}

/// Normaliza emails: trim, minúsculas, deduplicados.
fn clean_emails(emails: Vec<String>) -> Vec<String> {
    let normalized = emails
        .into_iter()
        .map(|e| e.trim().to_lowercase())
        .collect();
    unique_preserving_order(normalized)
}

fn first_unique_link(links: Vec<String>) -> String {
    unique_preserving_order(links)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Agrega y limpia los registros crudos del scraper de contactos en una
/// única estructura lista para la hoja.
pub fn process_contact_data(scraped_items: Vec<ContactDetailRecord>) -> ContactInfo {
    if scraped_items.is_empty() {
        return ContactInfo::default();
    }

    let domain = scraped_items[0].domain.clone().unwrap_or_default();

    let mut all_emails = Vec::new();
    let mut all_phones = Vec::new();
    let mut all_linkedins = Vec::new();
    let mut all_twitters = Vec::new();
    let mut all_instagrams = Vec::new();
    let mut all_facebooks = Vec::new();
    let mut all_youtubes = Vec::new();
    let mut all_tiktoks = Vec::new();
    let mut all_pinterests = Vec::new();
    let mut all_discords = Vec::new();

    for item in scraped_items {
        all_emails.extend(item.emails);
        all_phones.extend(item.phones);
        all_phones.extend(item.phones_uncertain);
        all_linkedins.extend(item.linkedins);
        all_twitters.extend(item.twitters);
        all_instagrams.extend(item.instagrams);
        all_facebooks.extend(item.facebooks);
        all_youtubes.extend(item.youtubes);
        all_tiktoks.extend(item.tiktoks);
        all_pinterests.extend(item.pinterests);
        all_discords.extend(item.discords);
    }

    ContactInfo {
        domain,
        emails: clean_emails(all_emails).join(", "),
        phones: clean_phones(all_phones).join(", "),
        linkedin: first_unique_link(all_linkedins),
        twitter: first_unique_link(all_twitters),
        instagram: first_unique_link(all_instagrams),
        facebook: first_unique_link(all_facebooks),
        youtube: first_unique_link(all_youtubes),
        tiktok: first_unique_link(all_tiktoks),
        pinterest: first_unique_link(all_pinterests),
        discord: first_unique_link(all_discords),
    }
}
