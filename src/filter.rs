use std::collections::{BTreeSet, HashMap};

use rayon::prelude::*;

use crate::columns;
use crate::records::AbsenceRecord;

/// Ephemeral filter dimensions for one view: a per-column set of accepted
/// facet values plus an optional global search term.
///
/// A column without an entry imposes no restriction. Deselecting the last
/// value of a materialized set removes the entry again, so an empty set
/// means "no restriction", never "match nothing". A set that grows back to
/// the full value universe collapses to "no restriction" as well.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    columns: HashMap<String, BTreeSet<String>>,
    search: Option<String>,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        self.search.is_some() || !self.columns.is_empty()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn set_search(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            self.search = None;
        } else {
            self.search = Some(term.to_string());
        }
    }

    pub fn accepted(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.columns.get(key)
    }

    /// Replace one column's accepted set. Empty removes the restriction.
    pub fn set_column(&mut self, key: &str, values: BTreeSet<String>) {
        if values.is_empty() {
            self.columns.remove(key);
        } else {
            self.columns.insert(key.to_string(), values);
        }
    }

    /// Toggle one facet value in or out of a column's accepted set.
    /// When the column is unrestricted, toggling a value off materializes
    /// the set as "everything but this value" from the given universe.
    pub fn toggle_value(&mut self, key: &str, value: &str, universe: &BTreeSet<String>) {
        let mut set = match self.columns.remove(key) {
            Some(set) => set,
            None => universe.clone(),
        };
        if !set.remove(value) {
            set.insert(value.to_string());
        }
        if !set.is_empty() && set != *universe {
            self.columns.insert(key.to_string(), set);
        }
    }

    pub fn clear_column(&mut self, key: &str) {
        self.columns.remove(key);
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.search = None;
    }

    fn matches(&self, record: &AbsenceRecord, term: Option<&str>) -> bool {
        if let Some(term) = term {
            let hit = record
                .searchable_values()
                .iter()
                .any(|v| v.to_lowercase().contains(term));
            if !hit {
                return false;
            }
        }
        self.columns
            .iter()
            .all(|(key, accepted)| accepted.contains(&columns::facet_text(record, key)))
    }
}

/// Compute the visible row subset as indices into the full dataset.
/// Original dataset order is preserved, no implicit sort. Dimensions
/// combine with AND, the search term is an OR across searchable fields.
pub fn apply(rows: &[AbsenceRecord], state: &FilterState) -> Vec<usize> {
    if !state.is_active() {
        return (0..rows.len()).collect();
    }
    let term = state.search_term().map(|t| t.to_lowercase());
    rows.par_iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r, term.as_deref()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Distinct facet values with counts for one column over a row subset,
/// ordered by descending count.
pub fn facet_counts(
    rows: &[AbsenceRecord],
    subset: &[usize],
    key: &str,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for &idx in subset {
        *counts
            .entry(columns::facet_text(&rows[idx], key))
            .or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AbsenceRecord, AbsenceType};
    use chrono::NaiveDate;

    fn record(id: i64, name: &str, unit: &str, cid: Option<&str>) -> AbsenceRecord {
        AbsenceRecord {
            id,
            name: name.to_string(),
            cpf: format!("{:011}", id),
            unit: unit.to_string(),
            role: "Operador".to_string(),
            gender: None,
            absence_start: NaiveDate::from_ymd_opt(2024, 1, 10),
            return_date: None,
            absence_type: AbsenceType::Days,
            duration: 1.0,
            cid_code: cid.map(|s| s.to_string()),
            cid_description: None,
            lost_days: 1.0,
            lost_hours: 8.0,
            upload_id: 1,
        }
    }

    fn dataset() -> Vec<AbsenceRecord> {
        vec![
            record(1, "Maria Souza", "Produção", Some("J06")),
            record(2, "João Lima", "Logística", Some("M54")),
            record(3, "Ana Castro", "Produção", None),
            record(4, "Pedro Alves", "Administrativo", Some("J06")),
        ]
    }

    #[test]
    fn no_active_filter_returns_everything_in_order() {
        let rows = dataset();
        let state = FilterState::default();
        assert_eq!(apply(&rows, &state), vec![0, 1, 2, 3]);
    }

    #[test]
    fn search_is_case_insensitive_and_or_across_fields() {
        let rows = dataset();
        let mut state = FilterState::default();
        state.set_search("produção");
        assert_eq!(apply(&rows, &state), vec![0, 2]);
        state.set_search("j06");
        assert_eq!(apply(&rows, &state), vec![0, 3]);
    }

    #[test]
    fn column_filters_and_search_combine_with_and() {
        let rows = dataset();
        let mut state = FilterState::default();
        state.set_search("a");
        state.set_column("setor", ["Produção".to_string()].into());
        assert_eq!(apply(&rows, &state), vec![0, 2]);
    }

    #[test]
    fn empty_sentinel_is_selectable() {
        let rows = dataset();
        let mut state = FilterState::default();
        state.set_column("cid_codigo", ["(vazio)".to_string()].into());
        assert_eq!(apply(&rows, &state), vec![2]);
    }

    #[test]
    fn apply_is_idempotent() {
        let rows = dataset();
        let mut state = FilterState::default();
        state.set_column("setor", ["Produção".to_string()].into());
        let once = apply(&rows, &state);
        let selected: Vec<AbsenceRecord> =
            once.iter().map(|&i| rows[i].clone()).collect();
        let twice = apply(&selected, &state);
        assert_eq!(twice, (0..once.len()).collect::<Vec<_>>());
    }

    #[test]
    fn clearing_everything_restores_the_original_set() {
        let rows = dataset();
        let mut state = FilterState::default();
        state.set_search("maria");
        state.set_column("setor", ["Produção".to_string()].into());
        state.clear();
        assert!(!state.is_active());
        assert_eq!(apply(&rows, &state), vec![0, 1, 2, 3]);
    }

    #[test]
    fn deselecting_the_last_value_means_no_restriction() {
        let mut state = FilterState::default();
        let universe: BTreeSet<String> =
            ["Produção".to_string(), "Logística".to_string()].into();
        state.set_column("setor", ["Produção".to_string()].into());
        state.toggle_value("setor", "Produção", &universe);
        assert!(state.accepted("setor").is_none());
        assert!(!state.is_active());
    }

    #[test]
    fn toggling_off_an_unrestricted_column_materializes_the_rest() {
        let mut state = FilterState::default();
        let universe: BTreeSet<String> =
            ["Produção".to_string(), "Logística".to_string()].into();
        state.toggle_value("setor", "Produção", &universe);
        let accepted = state.accepted("setor").unwrap();
        assert_eq!(accepted.len(), 1);
        assert!(accepted.contains("Logística"));
    }

    #[test]
    fn selecting_every_value_collapses_to_unrestricted() {
        let mut state = FilterState::default();
        let universe: BTreeSet<String> =
            ["Produção".to_string(), "Logística".to_string()].into();
        state.set_column("setor", ["Produção".to_string()].into());
        state.toggle_value("setor", "Logística", &universe);
        assert!(state.accepted("setor").is_none());
    }

    #[test]
    fn widening_equals_applying_remaining_filters_from_scratch() {
        let rows = dataset();
        let mut narrowed = FilterState::default();
        narrowed.set_column("setor", ["Produção".to_string()].into());
        narrowed.set_column("cid_codigo", ["J06".to_string()].into());
        // Widen by clearing one column.
        narrowed.clear_column("cid_codigo");

        let mut fresh = FilterState::default();
        fresh.set_column("setor", ["Produção".to_string()].into());

        assert_eq!(apply(&rows, &narrowed), apply(&rows, &fresh));
    }

    #[test]
    fn facet_counts_follow_the_filtered_subset() {
        let rows = dataset();
        let counts = facet_counts(&rows, &[0, 2, 3], "setor");
        assert_eq!(counts[0], ("Produção".to_string(), 2));
        assert_eq!(counts[1], ("Administrativo".to_string(), 1));
    }
}
