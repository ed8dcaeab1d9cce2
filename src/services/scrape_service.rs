//! services/scrape_service.rs
//! Worker de scraping: por cada combinación empleo/país ejecuta el actor de
//! búsqueda, enriquece cada empleo con datos de contacto de la empresa y
//! agrega la fila a la hoja con ambos estados de campaña en "Pending".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::config::app_config::AppConfig;
use crate::models::lead_model::{ContactDetailRecord, ContactInfo, ScrapedJob};
use crate::models::task_model::JobCombination;
use crate::services::apify_service::ApifyService;
use crate::services::processing_service::{build_linkedin_url, process_contact_data};
use crate::services::sheets_service::RowStore;
use crate::services::task_service::TaskRegistry;

/// Pausa entre scrapes de contacto, para no golpear al tercero.
const CONTACT_SCRAPE_DELAY: Duration = Duration::from_secs(2);
/// Pausa entre combinaciones de búsqueda.
const COMBINATION_DELAY: Duration = Duration::from_secs(5);

pub struct ScrapeService {
    store: Arc<dyn RowStore>,
    apify: ApifyService,
    registry: TaskRegistry,
    config: AppConfig,
}

impl ScrapeService {
    pub fn new(
        store: Arc<dyn RowStore>,
        apify: ApifyService,
        registry: TaskRegistry,
        config: AppConfig,
    ) -> Self {
        ScrapeService {
            store,
            apify,
            registry,
            config,
        }
    }

    pub async fn run(
        &self,
        task_id: &str,
        combinations: Vec<JobCombination>,
        max_results: u32,
        proxy_type: &str,
    ) {
        self.registry.mark_running(task_id);
        let total = combinations.len();
        log::info!(
            "Task [{}]: iniciando scraping de {} combinaciones",
            task_id,
            total
        );

        let mut existing_links = match self.initialize().await {
            Ok(v) => v,
            Err(e) => {
                let message = format!("Initialization failed: {:#}", e);
                log::error!("Task [{}]: {}", task_id, message);
                self.registry.mark_failed(task_id, &message);
                return;
            }
        };

        for (index, combo) in combinations.iter().enumerate() {
            self.registry.update_progress(
                task_id,
                &format!(
                    "Processing combination {}/{}: '{}' in '{}'",
                    index + 1,
                    total,
                    combo.job,
                    combo.country
                ),
            );

            let search_url = build_linkedin_url(&combo.job, &combo.country);
            log::info!(
                "Task [{}]: buscando '{}' en '{}'",
                task_id,
                combo.job,
                combo.country
            );

            let jobs = self
                .apify
                .run_job_search_scraper(&search_url, max_results, proxy_type, 1)
                .await;

            let mut jobs_processed = 0usize;
            for raw_job in jobs {
                let job: ScrapedJob = match serde_json::from_value(raw_job) {
                    Ok(job) => job,
                    Err(e) => {
                        log::error!(
                            "Task [{}]: item de empleo no parseable: {}. Se continúa.",
                            task_id,
                            e
                        );
                        continue;
                    }
                };

                // Los links ya presentes en la hoja se omiten.
                let job_link = match job.job_url.clone() {
                    Some(link) if !existing_links.contains(&link) => link,
                    _ => continue,
                };

                let contact_info = self.enrich_with_contacts(task_id, &job).await;

                let row = self.build_row(&job, combo, &contact_info);
                if let Err(e) = self.store.append_row(&self.config.data_sheet_name, row).await {
                    log::error!(
                        "Task [{}]: error agregando la fila de '{}': {}. Se continúa.",
                        task_id,
                        job.title.as_deref().unwrap_or("?"),
                        e
                    );
                    continue;
                }

                existing_links.insert(job_link);
                jobs_processed += 1;
                log::info!(
                    "Task [{}]: empleo #{} guardado: {} en {}",
                    task_id,
                    jobs_processed,
                    job.title.as_deref().unwrap_or("Unknown"),
                    job.company_name.as_deref().unwrap_or("Unknown")
                );
            }

            log::info!(
                "Task [{}]: combinación {}/{} completada ({} empleos)",
                task_id,
                index + 1,
                total,
                jobs_processed
            );

            if index + 1 < total {
                tokio::time::sleep(COMBINATION_DELAY).await;
            }
        }

        self.registry
            .mark_completed(task_id, &format!("Completed all {} combinations.", total));
        log::info!("Task [{}]: scraping finalizado", task_id);
    }

    async fn initialize(&self) -> Result<HashSet<String>> {
        let header_map = self
            .store
            .get_header_map(&self.config.data_sheet_name)
            .await
            .context("No se pudo leer el encabezado de la hoja")?;

        let link_col = *header_map
            .get(self.config.link_column_name.as_str())
            .ok_or_else(|| {
                anyhow!(
                    "Columna '{}' no encontrada en la hoja",
                    self.config.link_column_name
                )
            })?;

        self.store
            .get_column_values(&self.config.data_sheet_name, link_col)
            .await
            .context("No se pudieron leer los links existentes")
    }

    async fn enrich_with_contacts(&self, task_id: &str, job: &ScrapedJob) -> ContactInfo {
        let website = match job.company_website.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => return ContactInfo::default(),
        };

        log::info!(
            "Task [{}]: buscando contactos de {} - {}",
            task_id,
            job.company_name.as_deref().unwrap_or("Unknown"),
            website
        );

        let raw_items = self.apify.run_contact_detail_scraper(website, 2, 5, 1).await;
        if raw_items.is_empty() {
            log::warn!("Task [{}]: sin datos de contacto para {}", task_id, website);
            return ContactInfo::default();
        }

        let records: Vec<ContactDetailRecord> = raw_items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();

        let info = process_contact_data(records);

        tokio::time::sleep(CONTACT_SCRAPE_DELAY).await;

        info
    }

    /// Arma la fila en el orden de los encabezados de la hoja; las dos
    /// últimas celdas son los estados de campaña, que nacen en "Pending".
    fn build_row(
        &self,
        job: &ScrapedJob,
        combo: &JobCombination,
        contacts: &ContactInfo,
    ) -> Vec<String> {
        let full_address = format!(
            "{}, {}",
            job.company_street.as_deref().unwrap_or_default(),
            job.company_locality.as_deref().unwrap_or_default()
        );

        vec![
            job.employment_type.clone().unwrap_or_default(),
            job.company_name.clone().unwrap_or_default(),
            combo.country.clone(),
            job.company_website.clone().unwrap_or_default(),
            job.posted_datetime.clone().unwrap_or_default(),
            contacts.phones.clone(),
            contacts.emails.clone(),
            job.title.clone().unwrap_or_default(),
            contacts.linkedin.clone(),
            job.job_url.clone().unwrap_or_default(),
            full_address,
            contacts.twitter.clone(),
            contacts.instagram.clone(),
            contacts.facebook.clone(),
            contacts.youtube.clone(),
            contacts.tiktok.clone(),
            contacts.pinterest.clone(),
            contacts.discord.clone(),
            self.config.pending_status.clone(),
            self.config.pending_status.clone(),
        ]
    }
}
