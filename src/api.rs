//! REST gateway to the absenteeism backend.
//!
//! The single network boundary of the application: dataset and stats
//! loading, single-record CRUD, upload batch listing/removal, employee
//! rollups and bulk overwrites. The bearer token is attached here to every
//! outgoing request instead of patching any global client state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::records::{AbsenceRecord, DatasetStats, EmployeeRollup, UploadBatch};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("http status {0}")]
    Http(u16),

    #[error("unauthorized, token missing or expired")]
    Unauthorized,

    #[error("invalid response body: {0}")]
    Parse(String),
}

/// Scope parameters for a dataset load.
#[derive(Debug, Clone, Copy)]
pub struct Scope {
    pub client_id: i64,
    pub upload_id: Option<i64>,
}

/// Payload of `GET /api/dados/todos`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSnapshot {
    #[serde(rename = "dados")]
    pub rows: Vec<AbsenceRecord>,
    #[serde(rename = "estatisticas", default)]
    pub stats: DatasetStats,
    #[serde(rename = "colunas_originais")]
    pub original_columns: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct NewRecord<'a> {
    pub client_id: i64,
    #[serde(flatten)]
    pub record: &'a AbsenceRecord,
}

const GET_RETRIES: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 250;

pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: Client,
    load_seq: AtomicU64,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        ApiClient {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: Client::new(),
            load_seq: AtomicU64::new(0),
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Http(status.as_u16()));
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// GETs are idempotent, so transport failures retry a bounded number
    /// of times with doubling backoff. HTTP errors do not retry.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut backoff = RETRY_BACKOFF_MS;
        let mut attempt = 0;
        loop {
            let result = self
                .authorize(self.client.get(url))
                .send()
                .map_err(|e| ApiError::Network(e.to_string()));
            match result {
                Ok(response) => return Self::decode(Self::check(response)?),
                Err(e) if attempt < GET_RETRIES => {
                    warn!("GET {url} failed ({e}), retrying in {backoff}ms");
                    thread::sleep(Duration::from_millis(backoff));
                    backoff *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn send_checked(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(req)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::check(response)
    }

    /// Load the full dataset plus aggregate stats for a scope. Returns the
    /// snapshot tagged with a monotonically increasing sequence number so
    /// the store can discard responses that complete out of order.
    pub fn load_dataset(&self, scope: Scope) -> Result<(u64, DatasetSnapshot), ApiError> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut url = format!(
            "{}?client_id={}",
            self.url("/api/dados/todos"),
            scope.client_id
        );
        if let Some(upload_id) = scope.upload_id {
            url = format!("{url}&upload_id={upload_id}");
        }
        debug!("Loading dataset #{seq} from {url}");
        let snapshot = self.get_json(&url)?;
        Ok((seq, snapshot))
    }

    pub fn get_record(&self, id: i64) -> Result<AbsenceRecord, ApiError> {
        self.get_json(&self.url(&format!("/api/dados/{id}")))
    }

    /// Partial update of a single field on a single record. The body is
    /// just `{field: value}`; the backend leaves everything else alone.
    pub fn update_record_field(
        &self,
        id: i64,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<(), ApiError> {
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value.clone());
        let req = self
            .client
            .put(self.url(&format!("/api/dados/{id}")))
            .json(&body);
        self.send_checked(req).map(|_| ())
    }

    pub fn create_record(&self, new: &NewRecord) -> Result<AbsenceRecord, ApiError> {
        let req = self.client.post(self.url("/api/dados")).json(new);
        Self::decode(self.send_checked(req)?)
    }

    pub fn delete_record(&self, id: i64) -> Result<(), ApiError> {
        let req = self.client.delete(self.url(&format!("/api/dados/{id}")));
        self.send_checked(req).map(|_| ())
    }

    pub fn list_uploads(&self, client_id: i64) -> Result<Vec<UploadBatch>, ApiError> {
        self.get_json(&format!(
            "{}?client_id={client_id}",
            self.url("/api/uploads")
        ))
    }

    /// Deleting a batch cascades to its records on the backend.
    pub fn delete_upload(&self, id: i64) -> Result<(), ApiError> {
        let req = self.client.delete(self.url(&format!("/api/uploads/{id}")));
        self.send_checked(req).map(|_| ())
    }

    pub fn employee_rollups(
        &self,
        client_id: i64,
        month_start: Option<&str>,
        month_end: Option<&str>,
    ) -> Result<Vec<EmployeeRollup>, ApiError> {
        let mut url = format!(
            "{}?client_id={client_id}",
            self.url("/api/analises/funcionarios")
        );
        if let Some(m) = month_start {
            url = format!("{url}&mes_inicio={m}");
        }
        if let Some(m) = month_end {
            url = format!("{url}&mes_fim={m}");
        }
        self.get_json(&url)
    }

    /// Cross-cutting overwrite of one employee's gender and unit across
    /// all of their records, keyed by name.
    pub fn update_employee(
        &self,
        name: &str,
        client_id: i64,
        gender: Option<&str>,
        unit: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut req = self.client.put(self.url("/api/funcionario/atualizar"));
        let mut query: Vec<(&str, String)> = vec![
            ("nome", name.to_string()),
            ("client_id", client_id.to_string()),
        ];
        if let Some(g) = gender {
            query.push(("genero", g.to_string()));
        }
        if let Some(s) = unit {
            query.push(("setor", s.to_string()));
        }
        req = req.query(&query);
        self.send_checked(req).map(|_| ())
    }

    /// Same overwrite for many employees at once.
    pub fn update_employees_bulk(
        &self,
        client_id: i64,
        names: &[String],
        gender: Option<&str>,
        unit: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut req = self
            .client
            .put(self.url("/api/funcionarios/atualizar-massa"));
        let mut query: Vec<(&str, String)> = vec![
            ("client_id", client_id.to_string()),
            ("nomes", names.join(",")),
        ];
        if let Some(g) = gender {
            query.push(("genero", g.to_string()));
        }
        if let Some(s) = unit {
            query.push(("setor", s.to_string()));
        }
        req = req.query(&query);
        self.send_checked(req).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_its_trailing_slash() {
        let api = ApiClient::new("http://localhost:8000/", None);
        assert_eq!(api.url("/api/dados/todos"), "http://localhost:8000/api/dados/todos");
    }

    #[test]
    fn load_sequence_numbers_are_monotonic() {
        let api = ApiClient::new("http://localhost:8000", None);
        let a = api.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let b = api.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(b > a);
    }

    #[test]
    fn dataset_snapshot_deserializes_with_optional_columns() {
        let json = r#"{
            "dados": [],
            "estatisticas": {"total_registros": 0},
            "colunas_originais": ["nome", "setor"]
        }"#;
        let snap: DatasetSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(
            snap.original_columns,
            Some(vec!["nome".to_string(), "setor".to_string()])
        );

        let json = r#"{"dados": []}"#;
        let snap: DatasetSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.original_columns.is_none());
        assert_eq!(snap.stats.total_records, 0);
    }

    #[test]
    fn upload_batch_deserializes_from_backend_payload() {
        let json = r#"{
            "id": 3,
            "nome_arquivo": "faltas_marco.xlsx",
            "mes_referencia": "2024-03",
            "data_upload": "2024-04-01T09:30:00",
            "total_registros": 120
        }"#;
        let batch: UploadBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.record_count, 120);
        assert_eq!(batch.reference_month, "2024-03");
    }
}
