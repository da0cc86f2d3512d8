use crate::core::selection::apply_selection;
use crate::models::{SearchResult, Selection};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// Per-user form state: the latest search and the reviewer's exclusions
///
/// Sessions are plain values; the store applies operations to them one at a
/// time and hands out snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub result: Option<SearchResult>,
    pub excluded: BTreeSet<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            result: None,
            excluded: BTreeSet::new(),
        }
    }

    /// Replace the current result; exclusions made against the previous one are dropped
    pub fn record_search(&mut self, result: SearchResult) {
        self.result = Some(result);
        self.excluded.clear();
    }

    /// Deselect a city. Returns whether it was part of the current result.
    pub fn exclude(&mut self, name: &str) -> bool {
        let known = self
            .result
            .as_ref()
            .map_or(false, |result| result.contains_name(name));
        self.excluded.insert(name.to_string());
        known
    }

    /// Select a previously excluded city again
    pub fn include(&mut self, name: &str) -> bool {
        self.excluded.remove(name)
    }

    pub fn set_exclusions<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded = names.into_iter().map(Into::into).collect();
    }

    /// Confirmed cities, or `None` before the first search
    pub fn selection(&self) -> Option<Selection> {
        let excluded: Vec<&str> = self.excluded.iter().map(String::as_str).collect();
        self.result
            .as_ref()
            .map(|result| apply_selection(result, &excluded[..]))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CityMatch, CityRecord};

    fn result_of(names: &[&str]) -> SearchResult {
        SearchResult {
            origin: CityRecord::new(names[0], 48.0, 2.0),
            radius_km: 30.0,
            matches: names
                .iter()
                .map(|name| CityMatch {
                    city: CityRecord::new(*name, 48.0, 2.0),
                    distance_km: 0.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_selection_none_before_search() {
        let session = Session::new();
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_exclude_and_include() {
        let mut session = Session::new();
        session.record_search(result_of(&["Melun", "Dammarie-les-Lys", "Le Mée-sur-Seine"]));

        assert!(session.exclude("Dammarie-les-Lys"));
        assert!(!session.exclude("Brest"));
        assert_eq!(
            session.selection().unwrap().names,
            vec!["Melun", "Le Mée-sur-Seine"]
        );

        assert!(session.include("Dammarie-les-Lys"));
        assert!(!session.include("Dammarie-les-Lys"));
        assert_eq!(session.selection().unwrap().len(), 3);
    }

    #[test]
    fn test_new_search_invalidates_selection() {
        let mut session = Session::new();
        session.record_search(result_of(&["Melun", "Dammarie-les-Lys"]));
        session.exclude("Dammarie-les-Lys");

        session.record_search(result_of(&["Melun", "Dammarie-les-Lys", "Vaux-le-Pénil"]));

        assert!(session.excluded.is_empty());
        assert_eq!(session.selection().unwrap().len(), 3);
    }

    #[test]
    fn test_set_exclusions_replaces() {
        let mut session = Session::new();
        session.record_search(result_of(&["A", "B", "C"]));
        session.exclude("A");
        session.set_exclusions(["B", "C"]);

        assert_eq!(session.selection().unwrap().names, vec!["A"]);
    }

    #[test]
    fn test_excluding_duplicate_name_drops_both_entries() {
        let mut session = Session::new();
        session.record_search(result_of(&["Saint-Denis", "Stains", "Saint-Denis", "Pierrefitte"]));

        assert!(session.exclude("Saint-Denis"));
        assert_eq!(session.selection().unwrap().names, vec!["Stains", "Pierrefitte"]);

        session.include("Saint-Denis");
        assert_eq!(session.selection().unwrap().len(), 4);
    }
}
