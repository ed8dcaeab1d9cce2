//! services/sheets_service.rs
//! Acceso a la hoja de cálculo (Google Sheets API v4) detrás del trait
//! `RowStore`, para poder sustituirla en pruebas.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Operaciones mínimas sobre un almacén de filas/columnas con encabezados.
/// La fila 1 siempre es el encabezado; filas y columnas son 1-indexadas.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn get_header_map(&self, sheet: &str) -> Result<HashMap<String, usize>>;
    async fn get_all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>>;
    async fn get_column_values(&self, sheet: &str, column_index: usize) -> Result<HashSet<String>>;
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()>;
    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()>;
}

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Implementación contra la API REST de Google Sheets, autenticada con un
/// token bearer del entorno.
#[derive(Clone)]
pub struct SheetsService {
    http_client: Client,
    spreadsheet_id: String,
    api_token: String,
}

impl SheetsService {
    pub fn new(spreadsheet_id: String, api_token: String) -> Result<Self> {
        if spreadsheet_id.is_empty() {
            return Err(anyhow!("GOOGLE_SHEET_ID no está definido"));
        }
        if api_token.is_empty() {
            return Err(anyhow!("GOOGLE_API_TOKEN no está definido"));
        }
        Ok(Self {
            http_client: Client::new(),
            spreadsheet_id,
            api_token,
        })
    }

    async fn fetch_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/{}/values/{}",
            SHEETS_API_BASE,
            self.spreadsheet_id,
            urlencoding::encode(range)
        );
        let resp = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .context("Fallo el GET de valores a la API de Sheets")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets API respondió {}: {}", status, body));
        }

        let json_val = resp.json::<serde_json::Value>().await?;
        let mut rows = Vec::new();
        if let Some(values) = json_val.get("values").and_then(|v| v.as_array()) {
            for raw_row in values {
                let row = raw_row
                    .as_array()
                    .map(|cells| {
                        cells
                            .iter()
                            .map(|c| c.as_str().unwrap_or_default().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

/// Convierte un índice de columna 1-indexado a letras A1 ("A", "Z", "AA").
pub fn column_letter(mut col: usize) -> String {
    let mut letters = String::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.insert(0, (b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters
}

#[async_trait]
impl RowStore for SheetsService {
    async fn get_header_map(&self, sheet: &str) -> Result<HashMap<String, usize>> {
        let rows = self.fetch_values(&format!("{}!1:1", sheet)).await?;
        let headers = rows.into_iter().next().unwrap_or_default();
        Ok(headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_string(), i + 1))
            .collect())
    }

    async fn get_all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        self.fetch_values(sheet).await
    }

    async fn get_column_values(&self, sheet: &str, column_index: usize) -> Result<HashSet<String>> {
        let letter = column_letter(column_index);
        let rows = self.fetch_values(&format!("{}!{}:{}", sheet, letter, letter)).await?;
        // La primera celda es el encabezado; se descarta.
        Ok(rows
            .into_iter()
            .skip(1)
            .filter_map(|row| row.into_iter().next())
            .filter(|v| !v.is_empty())
            .collect())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()> {
        let url = format!(
            "{}/{}/values/{}:append?valueInputOption=USER_ENTERED",
            SHEETS_API_BASE,
            self.spreadsheet_id,
            urlencoding::encode(sheet)
        );
        let resp = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .context("Fallo el append a la API de Sheets")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Sheets API (append) respondió {}: {}", status, body));
        }
        Ok(())
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()> {
        let range = format!("{}!{}{}", sheet, column_letter(col), row);
        let url = format!(
            "{}/{}/values/{}?valueInputOption=USER_ENTERED",
            SHEETS_API_BASE,
            self.spreadsheet_id,
            urlencoding::encode(&range)
        );
        let resp = self
            .http_client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&json!({ "values": [[value]] }))
            .send()
            .await;

        // Un update de celda fallido no debe tumbar toda la campaña.
        match resp {
            Ok(r) if r.status().is_success() => {
                log::debug!("Celda ({}, {}) actualizada con '{}'", row, col, value);
                Ok(())
            }
            Ok(r) => {
                let status = r.status();
                let body = r.text().await.unwrap_or_default();
                log::error!(
                    "Error actualizando la celda ({}, {}): {} {}",
                    row,
                    col,
                    status,
                    body
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Error actualizando la celda ({}, {}): {}", row, col, e);
                Ok(())
            }
        }
    }
}
