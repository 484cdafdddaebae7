use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::AppError;
use crate::format;

pub const HOURS_PER_WORKDAY: f64 = 8.0;

/// Discriminator for how an absence duration is measured.
/// The backend stores the raw code; 1 is day based, 3 is hour based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum AbsenceType {
    Days,
    Hours,
}

impl From<u8> for AbsenceType {
    fn from(code: u8) -> Self {
        match code {
            3 => AbsenceType::Hours,
            _ => AbsenceType::Days,
        }
    }
}

impl From<AbsenceType> for u8 {
    fn from(t: AbsenceType) -> u8 {
        match t {
            AbsenceType::Days => 1,
            AbsenceType::Hours => 3,
        }
    }
}

impl AbsenceType {
    pub fn label(&self) -> &'static str {
        match self {
            AbsenceType::Days => "Dias",
            AbsenceType::Hours => "Horas",
        }
    }
}

/// One absenteeism event as delivered by `GET /api/dados/todos`.
/// The serde names follow the backend payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    pub cpf: String,
    #[serde(rename = "setor")]
    pub unit: String,
    #[serde(rename = "funcao")]
    pub role: String,
    #[serde(rename = "genero")]
    pub gender: Option<String>,
    #[serde(rename = "data_afastamento")]
    pub absence_start: Option<NaiveDate>,
    #[serde(rename = "data_retorno")]
    pub return_date: Option<NaiveDate>,
    #[serde(rename = "tipo_ausencia")]
    pub absence_type: AbsenceType,
    #[serde(rename = "duracao")]
    pub duration: f64,
    #[serde(rename = "cid_codigo")]
    pub cid_code: Option<String>,
    #[serde(rename = "cid_descricao")]
    pub cid_description: Option<String>,
    #[serde(rename = "dias_perdidos")]
    pub lost_days: f64,
    #[serde(rename = "horas_perdidas")]
    pub lost_hours: f64,
    pub upload_id: i64,
}

impl AbsenceRecord {
    /// Recompute the derived lost time from duration and absence type.
    /// Day based absences book a full workday of lost hours per day,
    /// hour based absences lose no whole days.
    pub fn derive_lost_time(&mut self) {
        match self.absence_type {
            AbsenceType::Days => {
                self.lost_days = self.duration;
                self.lost_hours = self.duration * HOURS_PER_WORKDAY;
            }
            AbsenceType::Hours => {
                self.lost_days = 0.0;
                self.lost_hours = self.duration;
            }
        }
    }

    /// Overwrite one field from an edited display string.
    /// Parses according to the field's value kind and re-derives lost time
    /// when the duration or the absence type changed.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        match key {
            "nome" => self.name = value.to_string(),
            "cpf" => self.cpf = format::strip_cpf(value),
            "setor" => self.unit = value.to_string(),
            "funcao" => self.role = value.to_string(),
            "genero" => {
                self.gender = if value.trim().is_empty() {
                    None
                } else {
                    Some(value.trim().to_string())
                }
            }
            "data_afastamento" => self.absence_start = format::parse_date_opt(value)?,
            "data_retorno" => self.return_date = format::parse_date_opt(value)?,
            "tipo_ausencia" => {
                self.absence_type = match value.trim() {
                    "1" | "Dias" | "dias" => AbsenceType::Days,
                    "3" | "Horas" | "horas" => AbsenceType::Hours,
                    other => return Err(AppError::InvalidNumber(other.to_string())),
                };
                self.derive_lost_time();
            }
            "duracao" => {
                self.duration = format::parse_number(value)?;
                self.derive_lost_time();
            }
            "cid_codigo" => self.cid_code = non_empty(value),
            "cid_descricao" => self.cid_description = non_empty(value),
            other => return Err(AppError::UnknownColumn(other.to_string())),
        }
        Ok(())
    }

    /// Fields scanned by the global search.
    pub fn searchable_values(&self) -> [&str; 5] {
        [
            self.name.as_str(),
            self.cpf.as_str(),
            self.unit.as_str(),
            self.cid_code.as_deref().unwrap_or(""),
            self.cid_description.as_deref().unwrap_or(""),
        ]
    }
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    if v.is_empty() { None } else { Some(v.to_string()) }
}

/// One ingested spreadsheet, scoping a set of records to a filing event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadBatch {
    pub id: i64,
    #[serde(rename = "nome_arquivo")]
    pub filename: String,
    #[serde(rename = "mes_referencia")]
    pub reference_month: String,
    #[serde(rename = "data_upload")]
    pub uploaded_at: Option<NaiveDateTime>,
    #[serde(rename = "total_registros")]
    pub record_count: u64,
}

/// Aggregate totals delivered alongside the dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    #[serde(rename = "total_registros", default)]
    pub total_records: u64,
    #[serde(rename = "total_funcionarios", default)]
    pub total_employees: u64,
    #[serde(rename = "total_dias_perdidos", default)]
    pub total_lost_days: f64,
    #[serde(rename = "total_horas_perdidas", default)]
    pub total_lost_hours: f64,
}

/// Pre-aggregated per-employee rollup from `GET /api/analises/funcionarios`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRollup {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "setor", default)]
    pub unit: Option<String>,
    #[serde(rename = "total_faltas", default)]
    pub absence_count: u64,
    #[serde(rename = "total_dias_perdidos", default)]
    pub lost_days: f64,
    #[serde(rename = "total_horas_perdidas", default)]
    pub lost_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(absence_type: AbsenceType, duration: f64) -> AbsenceRecord {
        AbsenceRecord {
            id: 1,
            name: "Maria Souza".to_string(),
            cpf: "12345678901".to_string(),
            unit: "Produção".to_string(),
            role: "Operadora".to_string(),
            gender: Some("F".to_string()),
            absence_start: NaiveDate::from_ymd_opt(2024, 3, 4),
            return_date: NaiveDate::from_ymd_opt(2024, 3, 7),
            absence_type,
            duration,
            cid_code: Some("J06".to_string()),
            cid_description: Some("Infecção aguda".to_string()),
            lost_days: 0.0,
            lost_hours: 0.0,
            upload_id: 7,
        }
    }

    #[test]
    fn day_based_absence_derives_days_and_hours() {
        let mut r = record(AbsenceType::Days, 3.0);
        r.derive_lost_time();
        assert_eq!(r.lost_days, 3.0);
        assert_eq!(r.lost_hours, 24.0);
    }

    #[test]
    fn hour_based_absence_loses_no_days() {
        let mut r = record(AbsenceType::Hours, 5.0);
        r.derive_lost_time();
        assert_eq!(r.lost_days, 0.0);
        assert_eq!(r.lost_hours, 5.0);
    }

    #[test]
    fn set_duration_rederives_lost_time() {
        let mut r = record(AbsenceType::Days, 3.0);
        r.derive_lost_time();
        r.set_field("duracao", "2").unwrap();
        assert_eq!(r.lost_days, 2.0);
        assert_eq!(r.lost_hours, 16.0);
    }

    #[test]
    fn set_absence_type_rederives_lost_time() {
        let mut r = record(AbsenceType::Days, 5.0);
        r.derive_lost_time();
        r.set_field("tipo_ausencia", "3").unwrap();
        assert_eq!(r.lost_days, 0.0);
        assert_eq!(r.lost_hours, 5.0);
    }

    #[test]
    fn set_field_rejects_unknown_and_bad_values() {
        let mut r = record(AbsenceType::Days, 1.0);
        assert!(r.set_field("no_such_field", "x").is_err());
        assert!(r.set_field("duracao", "abc").is_err());
        assert!(r.set_field("data_retorno", "31/31/2024").is_err());
    }

    #[test]
    fn absence_type_codes_round_trip() {
        assert_eq!(AbsenceType::from(1u8), AbsenceType::Days);
        assert_eq!(AbsenceType::from(3u8), AbsenceType::Hours);
        assert_eq!(u8::from(AbsenceType::Hours), 3);
    }

    #[test]
    fn record_deserializes_from_backend_payload() {
        let json = r#"{
            "id": 10,
            "nome": "João Lima",
            "cpf": "98765432100",
            "setor": "Logística",
            "funcao": "Conferente",
            "genero": null,
            "data_afastamento": "2024-05-02",
            "data_retorno": null,
            "tipo_ausencia": 3,
            "duracao": 4.0,
            "cid_codigo": null,
            "cid_descricao": null,
            "dias_perdidos": 0.0,
            "horas_perdidas": 4.0,
            "upload_id": 2
        }"#;
        let r: AbsenceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.absence_type, AbsenceType::Hours);
        assert_eq!(r.absence_start, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert!(r.return_date.is_none());
    }
}
