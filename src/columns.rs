use crate::format;
use crate::records::AbsenceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// Static per-view description of one grid column.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
    pub visible: bool,
    pub sticky: bool,
    pub editable: bool,
}

impl ColumnSpec {
    fn new(key: &str, label: &str, kind: ColumnKind) -> Self {
        ColumnSpec {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            visible: true,
            sticky: false,
            editable: false,
        }
    }

    fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

/// Canonical column set in canonical order. The employee name is the
/// sticky column; the editable set is the fixed allow-list the backend
/// accepts single-field PUTs for.
pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("nome", "Funcionário", ColumnKind::Text)
            .sticky()
            .editable(),
        ColumnSpec::new("cpf", "CPF", ColumnKind::Text).editable(),
        ColumnSpec::new("setor", "Setor", ColumnKind::Text).editable(),
        ColumnSpec::new("funcao", "Função", ColumnKind::Text).editable(),
        ColumnSpec::new("genero", "Gênero", ColumnKind::Text).editable(),
        ColumnSpec::new("data_afastamento", "Afastamento", ColumnKind::Date).editable(),
        ColumnSpec::new("data_retorno", "Retorno", ColumnKind::Date).editable(),
        ColumnSpec::new("tipo_ausencia", "Tipo", ColumnKind::Text).editable(),
        ColumnSpec::new("duracao", "Duração", ColumnKind::Number).editable(),
        ColumnSpec::new("cid_codigo", "CID", ColumnKind::Text).editable(),
        ColumnSpec::new("cid_descricao", "Descrição CID", ColumnKind::Text).editable(),
        ColumnSpec::new("dias_perdidos", "Dias perdidos", ColumnKind::Number),
        ColumnSpec::new("horas_perdidas", "Horas perdidas", ColumnKind::Number),
        ColumnSpec::new("upload_id", "Upload", ColumnKind::Number).hidden(),
    ]
}

/// Resolve the view's column order. The server declared original order is
/// authoritative when present; known columns keep their configuration,
/// unknown server columns are appended as plain read-only text. Without a
/// server order the canonical order applies.
pub fn view_columns(original_order: Option<&[String]>) -> Vec<ColumnSpec> {
    let canonical = default_columns();
    let Some(order) = original_order else {
        return canonical;
    };

    let mut out: Vec<ColumnSpec> = Vec::with_capacity(canonical.len());
    for key in order {
        match canonical.iter().find(|c| &c.key == key) {
            Some(spec) => out.push(spec.clone()),
            None => out.push(ColumnSpec::new(key, key, ColumnKind::Text)),
        }
    }
    for spec in canonical {
        if !out.iter().any(|c| c.key == spec.key) {
            out.push(spec);
        }
    }
    out
}

/// Display text for one cell, dispatching on the column kind.
/// Missing values render as the placeholder glyph.
pub fn cell_text(record: &AbsenceRecord, key: &str) -> String {
    let text = match key {
        "nome" => format::scrub(&record.name),
        "cpf" => format::format_cpf(&record.cpf),
        "setor" => format::scrub(&record.unit),
        "funcao" => format::scrub(&record.role),
        "genero" => record.gender.clone().unwrap_or_default(),
        "data_afastamento" => record
            .absence_start
            .as_ref()
            .map(format::format_date)
            .unwrap_or_default(),
        "data_retorno" => record
            .return_date
            .as_ref()
            .map(format::format_date)
            .unwrap_or_default(),
        "tipo_ausencia" => record.absence_type.label().to_string(),
        "duracao" => format::format_number(record.duration),
        "cid_codigo" => record.cid_code.clone().unwrap_or_default(),
        "cid_descricao" => record
            .cid_description
            .as_deref()
            .map(format::scrub)
            .unwrap_or_default(),
        "dias_perdidos" => format::format_number(record.lost_days),
        "horas_perdidas" => format::format_number(record.lost_hours),
        "upload_id" => record.upload_id.to_string(),
        _ => String::new(),
    };
    if text.is_empty() {
        format::PLACEHOLDER.to_string()
    } else {
        text
    }
}

/// Cell text as used by facets and column filters: like the display text
/// but empty values normalize to the sentinel label instead of the glyph.
pub fn facet_text(record: &AbsenceRecord, key: &str) -> String {
    let text = cell_text(record, key);
    if text == format::PLACEHOLDER {
        format::EMPTY_SENTINEL.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AbsenceType;
    use chrono::NaiveDate;

    fn record() -> AbsenceRecord {
        AbsenceRecord {
            id: 1,
            name: "Maria Souza".to_string(),
            cpf: "12345678901".to_string(),
            unit: "Produção".to_string(),
            role: "Operadora".to_string(),
            gender: None,
            absence_start: NaiveDate::from_ymd_opt(2024, 3, 4),
            return_date: None,
            absence_type: AbsenceType::Days,
            duration: 3.0,
            cid_code: None,
            cid_description: None,
            lost_days: 3.0,
            lost_hours: 24.0,
            upload_id: 7,
        }
    }

    #[test]
    fn canonical_order_marks_sticky_and_editable() {
        let cols = default_columns();
        assert_eq!(cols[0].key, "nome");
        assert!(cols[0].sticky);
        assert!(cols.iter().any(|c| c.key == "duracao" && c.editable));
        // Derived quantities are never editable.
        assert!(
            cols.iter()
                .all(|c| !(c.key == "dias_perdidos" && c.editable))
        );
    }

    #[test]
    fn server_order_is_authoritative_and_appends_unknowns() {
        let order = vec![
            "cpf".to_string(),
            "matricula".to_string(),
            "nome".to_string(),
        ];
        let cols = view_columns(Some(&order));
        assert_eq!(cols[0].key, "cpf");
        assert_eq!(cols[1].key, "matricula");
        assert_eq!(cols[2].key, "nome");
        // Unknown server column is read-only text.
        assert!(!cols[1].editable);
        // Remaining canonical columns follow.
        assert!(cols.iter().position(|c| c.key == "duracao").unwrap() > 2);
    }

    #[test]
    fn cell_text_dispatches_on_kind() {
        let r = record();
        assert_eq!(cell_text(&r, "cpf"), "123.456.789-01");
        assert_eq!(cell_text(&r, "data_afastamento"), "04/03/2024");
        assert_eq!(cell_text(&r, "tipo_ausencia"), "Dias");
        assert_eq!(cell_text(&r, "horas_perdidas"), "24");
        assert_eq!(cell_text(&r, "data_retorno"), "-");
    }

    #[test]
    fn facet_text_uses_the_empty_sentinel() {
        let r = record();
        assert_eq!(facet_text(&r, "cid_codigo"), "(vazio)");
        assert_eq!(facet_text(&r, "setor"), "Produção");
    }
}
