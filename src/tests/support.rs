//! tests/support.rs
//! Fakes en memoria para las pruebas: la hoja de cálculo y un canal con
//! resultados scripteados.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::outcome_model::SendOutcome;
use crate::models::sender_model::{Channel, SenderIdentity};
use crate::services::campaign_service::ChannelAdapter;
use crate::services::sheets_service::RowStore;

/// Hoja de cálculo en memoria: mapa nombre de hoja -> filas.
#[derive(Default)]
pub struct InMemoryStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    fail_reads: Mutex<HashSet<String>>,
    fail_appends: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(self, name: &str, rows: Vec<Vec<String>>) -> Self {
        self.sheets.lock().unwrap().insert(name.to_string(), rows);
        self
    }

    pub fn rows(&self, name: &str) -> Vec<Vec<String>> {
        self.sheets
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Las lecturas de esta hoja devolverán error.
    pub fn fail_reads_on(&self, name: &str) {
        self.fail_reads.lock().unwrap().insert(name.to_string());
    }

    /// Los appends a esta hoja devolverán error.
    pub fn fail_appends_on(&self, name: &str) {
        self.fail_appends.lock().unwrap().insert(name.to_string());
    }
}

#[async_trait]
impl RowStore for InMemoryStore {
    async fn get_header_map(&self, sheet: &str) -> Result<HashMap<String, usize>> {
        let rows = self.get_all_values(sheet).await?;
        Ok(rows
            .first()
            .map(|headers| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.trim().to_string(), i + 1))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_all_values(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        if self.fail_reads.lock().unwrap().contains(sheet) {
            return Err(anyhow!("simulated read failure for '{}'", sheet));
        }
        Ok(self.rows(sheet))
    }

    async fn get_column_values(&self, sheet: &str, column_index: usize) -> Result<HashSet<String>> {
        let rows = self.get_all_values(sheet).await?;
        Ok(rows
            .into_iter()
            .skip(1)
            .filter_map(|row| row.get(column_index - 1).cloned())
            .filter(|v| !v.is_empty())
            .collect())
    }

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()> {
        if self.fail_appends.lock().unwrap().contains(sheet) {
            return Err(anyhow!("simulated append failure for '{}'", sheet));
        }
        self.sheets
            .lock()
            .unwrap()
            .entry(sheet.to_string())
            .or_default()
            .push(row);
        Ok(())
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets.entry(sheet.to_string()).or_default();
        let row_vec = rows
            .get_mut(row - 1)
            .ok_or_else(|| anyhow!("row {} out of range", row))?;
        while row_vec.len() < col {
            row_vec.push(String::new());
        }
        row_vec[col - 1] = value.to_string();
        Ok(())
    }
}

/// Convierte filas de &str a String, para armar hojas de prueba.
pub fn rows(raw: Vec<Vec<&str>>) -> Vec<Vec<String>> {
    raw.into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect()
}

/// Canal de prueba: valida contactos como el canal de email y entrega según
/// un guion de resultados por sender (true = Sent, false = Failed). Sin
/// guion, toda entrega es exitosa.
pub struct ScriptedChannel {
    outcomes: Mutex<HashMap<String, Vec<bool>>>,
    delivered: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        ScriptedChannel {
            outcomes: Mutex::new(HashMap::new()),
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Define los resultados consecutivos de un sender (true = éxito).
    pub fn script(&self, sender_id: &str, results: Vec<bool>) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(sender_id.to_string(), results);
    }

    /// Entregas intentadas, en orden: (sender_id, contactos).
    pub fn attempts(&self) -> Vec<(String, Vec<String>)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelAdapter for ScriptedChannel {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn contact_column(&self) -> &str {
        "emails"
    }

    fn status_column(&self) -> &str {
        "email_status"
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
    }

    fn recipient_label(&self, contacts: &[String]) -> String {
        contacts.first().cloned().unwrap_or_default()
    }

    async fn deliver(&self, sender: &SenderIdentity, contacts: &[String]) -> SendOutcome {
        self.delivered
            .lock()
            .unwrap()
            .push((sender.id.clone(), contacts.to_vec()));

        let mut outcomes = self.outcomes.lock().unwrap();
        let ok = match outcomes.get_mut(&sender.id) {
            Some(results) if !results.is_empty() => results.remove(0),
            _ => true,
        };

        if ok {
            SendOutcome::Sent {
                sender_id: sender.id.clone(),
            }
        } else {
            SendOutcome::Failed {
                reason: format!("Sending Error ({})", sender.id),
            }
        }
    }
}

/// Identidad mínima de email para pruebas de transporte.
pub fn test_sender(id: &str) -> SenderIdentity {
    SenderIdentity {
        id: id.to_string(),
        channel: Channel::Email,
        active: true,
        password: Some("secret".to_string()),
        host: Some("127.0.0.1".to_string()),
        port: Some(9),
        api_key: None,
        resume_filename: Some("resume.pdf".to_string()),
        email_subject: Some("Hello".to_string()),
    }
}
