//! Base-name grouping, a redundancy signal independent of embeddings.
//!
//! `getPrice`, `usePrice` and `formatPrice` all reduce to the base name
//! `price`. Only the first matching prefix in [`VERB_PREFIXES`] is stripped,
//! in list order, even when a longer prefix later in the list would also
//! match. Reordering the list changes results.

use crate::storage::{EmbeddingStore, IDENTIFIER_SEPARATOR};
use serde::Serialize;
use std::collections::BTreeMap;

/// Verb prefixes stripped from symbol names, first match wins.
pub const VERB_PREFIXES: &[&str] = &[
    "get", "set", "handle", "use", "fetch", "update", "validate", "format",
];

/// Default minimum group size worth reporting.
pub const DEFAULT_MIN_MEMBERS: usize = 3;

/// Default number of members shown per group.
pub const DEFAULT_DISPLAY_CAP: usize = 5;

/// Qualified names sharing one base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameGroup {
    pub base: String,
    pub members: Vec<String>,
}

/// Symbol name of an identifier: the part after the last separator.
pub fn symbol_name(identifier: &str) -> &str {
    identifier
        .rsplit(IDENTIFIER_SEPARATOR)
        .next()
        .unwrap_or(identifier)
}

/// Strip the first matching prefix (case-insensitive) and lower-case the rest.
pub fn base_name<S: AsRef<str>>(symbol: &str, prefixes: &[S]) -> String {
    let lowered = symbol.to_lowercase();
    for prefix in prefixes {
        let prefix = prefix.as_ref().to_lowercase();
        if let Some(rest) = lowered.strip_prefix(prefix.as_str()) {
            return rest.to_string();
        }
    }
    lowered
}

/// Group identifiers by base name, sorted by base name.
///
/// Members keep input order. Names that reduce to nothing (e.g. `get`) are
/// dropped.
pub fn group_by_base_name<'a, I, S>(identifiers: I, prefixes: &[S]) -> Vec<NameGroup>
where
    I: IntoIterator<Item = &'a str>,
    S: AsRef<str>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for identifier in identifiers {
        let base = base_name(symbol_name(identifier), prefixes);
        if base.is_empty() {
            continue;
        }
        groups.entry(base).or_default().push(identifier.to_string());
    }

    groups
        .into_iter()
        .map(|(base, members)| NameGroup { base, members })
        .collect()
}

/// `location:leading_name` for every record, in store order.
pub fn qualified_symbols(store: &EmbeddingStore) -> Vec<String> {
    store.iter().map(|r| r.qualified_symbol()).collect()
}

/// Name groups filtered to a minimum size, with a per-group display cap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameGroupReport {
    pub groups: Vec<NameGroup>,
    pub display_cap: usize,
}

impl NameGroupReport {
    pub fn new(groups: Vec<NameGroup>, min_members: usize, display_cap: usize) -> Self {
        Self {
            groups: groups
                .into_iter()
                .filter(|g| g.members.len() >= min_members)
                .collect(),
            display_cap,
        }
    }

    /// Group the store's symbols with default limits.
    pub fn from_store<S: AsRef<str>>(store: &EmbeddingStore, prefixes: &[S]) -> Self {
        let symbols = qualified_symbols(store);
        let groups = group_by_base_name(symbols.iter().map(String::as_str), prefixes);
        Self::new(groups, DEFAULT_MIN_MEMBERS, DEFAULT_DISPLAY_CAP)
    }

    /// Members displayed for `group`.
    pub fn shown<'g>(&self, group: &'g NameGroup) -> &'g [String] {
        &group.members[..group.members.len().min(self.display_cap)]
    }

    /// Members of `group` beyond the display cap.
    pub fn hidden(&self, group: &NameGroup) -> usize {
        group.members.len().saturating_sub(self.display_cap)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ArtifactRecord;

    #[test]
    fn test_price_family() {
        let names = ["getPrice", "setPrice", "usePrice", "formatPrice"];
        let groups = group_by_base_name(names, VERB_PREFIXES);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].base, "price");
        assert_eq!(groups[0].members, names);
    }

    #[test]
    fn test_first_prefix_in_list_wins() {
        // "use" precedes "update" but does not match "updateQuote"
        assert_eq!(base_name("updateQuote", VERB_PREFIXES), "quote");
        // "set" is checked before any longer alternative
        assert_eq!(base_name("settings", VERB_PREFIXES), "tings");
        // Order of the list, not prefix length, decides
        assert_eq!(base_name("getterValue", &["get", "getter"]), "tervalue");
        assert_eq!(base_name("getterValue", &["getter", "get"]), "value");
    }

    #[test]
    fn test_prefix_match_is_case_insensitive() {
        assert_eq!(base_name("GetPrice", VERB_PREFIXES), "price");
        assert_eq!(base_name("HANDLEClick", VERB_PREFIXES), "click");
        assert_eq!(base_name("Wallet", VERB_PREFIXES), "wallet");
    }

    #[test]
    fn test_only_one_prefix_is_stripped() {
        assert_eq!(base_name("useFetchQuote", VERB_PREFIXES), "fetchquote");
    }

    #[test]
    fn test_symbol_name_uses_last_segment() {
        assert_eq!(symbol_name("ui/stores/price.ts:getPrice"), "getPrice");
        assert_eq!(symbol_name("getPrice"), "getPrice");
        assert_eq!(symbol_name("C:/ui/price.ts:setPrice"), "setPrice");
    }

    #[test]
    fn test_bare_prefix_is_dropped() {
        let groups = group_by_base_name(["a.ts:get", "b.ts:use"], VERB_PREFIXES);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_report_filters_small_groups_and_caps_display() {
        let identifiers: Vec<String> = (0..7)
            .map(|i| format!("ui/f{i}.ts:getQuote"))
            .chain(["ui/a.ts:getWallet".to_string(), "ui/b.ts:useWallet".to_string()])
            .chain(["ui/c.ts:fetchRate", "ui/d.ts:setRate", "ui/e.ts:formatRate"].map(String::from))
            .collect();
        let groups = group_by_base_name(identifiers.iter().map(String::as_str), VERB_PREFIXES);
        let report = NameGroupReport::new(groups, DEFAULT_MIN_MEMBERS, DEFAULT_DISPLAY_CAP);

        let bases: Vec<_> = report.groups.iter().map(|g| g.base.as_str()).collect();
        assert_eq!(bases, vec!["quote", "rate"]);

        let quote = &report.groups[0];
        assert_eq!(report.shown(quote).len(), 5);
        assert_eq!(report.hidden(quote), 2);

        let rate = &report.groups[1];
        assert_eq!(report.shown(rate).len(), 3);
        assert_eq!(report.hidden(rate), 0);
    }

    #[test]
    fn test_from_store_uses_leading_name_segment() {
        let store: EmbeddingStore = [
            ("ui/a.ts", "getPrice:1"),
            ("ui/a.ts", "getPrice:2"),
            ("ui/b.ts", "usePrice"),
        ]
        .into_iter()
        .map(|(f, n)| ArtifactRecord::new(f, n, "ts", vec![]))
        .collect();

        let report = NameGroupReport::from_store(&store, VERB_PREFIXES);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(
            report.groups[0].members,
            vec!["ui/a.ts:getPrice", "ui/a.ts:getPrice", "ui/b.ts:usePrice"]
        );
    }
}
