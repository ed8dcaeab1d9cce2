//! services/apify_service.rs
//! Cliente de la API de actores (Apify): lanzar un actor, esperar su run y
//! descargar los items del dataset, con reintentos ante errores transitorios.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;

const APIFY_API_BASE: &str = "https://api.apify.com/v2";
const MAX_RETRIES: u32 = 3;
/// Tiempo máximo de ejecución de un actor, en segundos.
const ACTOR_TIMEOUT_SECS: u32 = 600;
/// Memoria asignada a cada run del actor.
const ACTOR_MEMORY_MB: u32 = 512;

#[derive(Clone)]
pub struct ApifyService {
    http_client: Client,
    api_token: String,
    linkedin_actor_id: String,
    contact_scraper_actor_id: String,
}

impl ApifyService {
    pub fn new(
        api_token: String,
        linkedin_actor_id: String,
        contact_scraper_actor_id: String,
    ) -> Result<Self> {
        if api_token.is_empty() {
            return Err(anyhow!("APIFY_API_TOKEN es requerido"));
        }
        if linkedin_actor_id.is_empty() || contact_scraper_actor_id.is_empty() {
            return Err(anyhow!(
                "LINKEDIN_ACTOR_ID y CONTACT_SCRAPER_ACTOR_ID deben estar definidos en el .env"
            ));
        }
        Ok(Self {
            http_client: Client::new(),
            api_token,
            linkedin_actor_id,
            contact_scraper_actor_id,
        })
    }

    /// Ejecuta el actor de búsqueda de empleos.
    pub async fn run_job_search_scraper(
        &self,
        search_url: &str,
        max_results: u32,
        proxy_group: &str,
        max_concurrency: u32,
    ) -> Vec<Value> {
        let run_input = serde_json::json!({
            "search_url": search_url,
            "include_company_details": true,
            "max_results": max_results,
            "proxy_group": proxy_group.to_uppercase(),
            "maxConcurrency": max_concurrency,
            "headless": true,
            "debugMode": false,
            "saveScreenshots": false,
            "saveHtml": false,
            "useChrome": false,
            "useApifyProxy": true,
        });
        self.run_actor_with_retry(&self.linkedin_actor_id, run_input)
            .await
    }

    /// Ejecuta el actor que extrae datos de contacto de un sitio web.
    pub async fn run_contact_detail_scraper(
        &self,
        website_url: &str,
        max_depth: u32,
        max_requests: u32,
        max_concurrency: u32,
    ) -> Vec<Value> {
        let run_input = serde_json::json!({
            "startUrls": [{ "url": website_url, "method": "GET" }],
            "maxDepth": max_depth,
            "maxRequests": max_requests,
            "sameDomain": true,
            "considerChildFrames": true,
            "maxConcurrency": max_concurrency,
            "saveScreenshots": false,
            "debugMode": false,
            "ignoreSslErrors": true,
            "maxRequestRetries": 3,
        });
        self.run_actor_with_retry(&self.contact_scraper_actor_id, run_input)
            .await
    }

    /// Ejecuta un actor y devuelve los items de su dataset. Reintenta con
    /// backoff exponencial (5s, 10s, 20s) ante errores transitorios; si se
    /// agotan los reintentos o el error no es transitorio devuelve un
    /// vector vacío.
    async fn run_actor_with_retry(&self, actor_id: &str, run_input: Value) -> Vec<Value> {
        for attempt in 1..=MAX_RETRIES {
            if attempt > 1 {
                let wait_secs = 5u64 * 2u64.pow(attempt - 2);
                log::info!(
                    "(run_actor) Reintento {}/{} para el actor {}, esperando {}s...",
                    attempt,
                    MAX_RETRIES,
                    actor_id,
                    wait_secs
                );
                tokio::time::sleep(Duration::from_secs(wait_secs)).await;
            }

            match self.run_actor_once(actor_id, &run_input).await {
                Ok(items) => {
                    log::info!(
                        "(run_actor) El actor {} devolvió {} item(s)",
                        actor_id,
                        items.len()
                    );
                    return items;
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    log::error!(
                        "(run_actor) Fallo la ejecución del actor {} (intento {}/{}): {}",
                        actor_id,
                        attempt,
                        MAX_RETRIES,
                        msg
                    );
                    if attempt < MAX_RETRIES && is_transient_error(&msg) {
                        log::warn!("(run_actor) Error transitorio, se reintentará.");
                        continue;
                    }
                    return Vec::new();
                }
            }
        }
        Vec::new()
    }

    async fn run_actor_once(&self, actor_id: &str, run_input: &Value) -> Result<Vec<Value>> {
        // 1) Lanzar el run
        let url = format!(
            "{}/acts/{}/runs?timeout={}&memory={}",
            APIFY_API_BASE, actor_id, ACTOR_TIMEOUT_SECS, ACTOR_MEMORY_MB
        );
        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(run_input)
            .send()
            .await
            .context("connection error al iniciar el actor")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("actor start respondió {}: {}", status, body));
        }

        let run: Value = resp.json().await?;
        let run_id = run["data"]["id"].as_str().unwrap_or_default().to_string();
        let dataset_id = run["data"]["defaultDatasetId"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        if run_id.is_empty() || dataset_id.is_empty() {
            return Err(anyhow!("respuesta de run sin id/defaultDatasetId"));
        }

        // 2) Esperar a que termine (long-poll con waitForFinish)
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", APIFY_API_BASE, run_id);
            let resp = self
                .http_client
                .get(&url)
                .bearer_auth(&self.api_token)
                .send()
                .await
                .context("connection error consultando el run")?;

            if !resp.status().is_success() {
                return Err(anyhow!("poll del run respondió {}", resp.status()));
            }

            let poll: Value = resp.json().await?;
            match poll["data"]["status"].as_str().unwrap_or_default() {
                "SUCCEEDED" => break,
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(anyhow!(
                        "el run del actor terminó en {}",
                        poll["data"]["status"]
                    ));
                }
                other => {
                    log::debug!("(run_actor) Run {} sigue en estado {}", run_id, other);
                }
            }
        }

        // 3) Descargar los items del dataset
        let url = format!(
            "{}/datasets/{}/items?format=json&clean=true",
            APIFY_API_BASE, dataset_id
        );
        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("connection error descargando el dataset")?;

        if !resp.status().is_success() {
            return Err(anyhow!("descarga de dataset respondió {}", resp.status()));
        }

        let items: Vec<Value> = resp.json().await?;
        Ok(items)
    }
}

/// Heurística de errores transitorios (timeouts, red, rate limits).
fn is_transient_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    [
        "timeout",
        "connection",
        "network",
        "temporary",
        "rate limit",
        "429",
        "502",
        "503",
    ]
    .iter()
    .any(|kw| lower.contains(kw))
}
