use crate::models::{SearchResult, Selection};
use std::collections::HashSet;

/// Apply reviewer exclusions to a search result
///
/// Every name of the result is kept, in result order, unless it appears in
/// `excluded`. Excluded names absent from the result are ignored.
pub fn apply_selection<S: AsRef<str>>(result: &SearchResult, excluded: &[S]) -> Selection {
    let excluded: HashSet<&str> = excluded.iter().map(AsRef::as_ref).collect();

    Selection {
        names: result
            .names()
            .filter(|name| !excluded.contains(name))
            .map(str::to_string)
            .collect(),
    }
}
