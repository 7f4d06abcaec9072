use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Server-side validation checks, identified by stable string ids.
///
/// The check logic itself runs on the backend; the client only selects
/// which checks to run and renders their findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleId {
    DoubleEntry,
    MissingValues,
    Duplicates,
    InvalidDates,
    AccountCodes,
    GaapIfrs,
    Anomaly,
    CrossSheet,
    FormulaAudit,
}

impl RuleId {
    /// Wire id of the rule, as the backend expects it in the `rules` query.
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::DoubleEntry => "double-entry",
            RuleId::MissingValues => "missing-values",
            RuleId::Duplicates => "duplicates",
            RuleId::InvalidDates => "invalid-dates",
            RuleId::AccountCodes => "account-codes",
            RuleId::GaapIfrs => "gaap-ifrs",
            RuleId::Anomaly => "anomaly",
            RuleId::CrossSheet => "cross-sheet",
            RuleId::FormulaAudit => "formula-audit",
        }
    }

    /// Human-readable label for checkboxes.
    pub fn label(&self) -> &'static str {
        match self {
            RuleId::DoubleEntry => "Double-entry balance",
            RuleId::MissingValues => "Missing values",
            RuleId::Duplicates => "Duplicate rows",
            RuleId::InvalidDates => "Invalid dates",
            RuleId::AccountCodes => "Unknown account codes",
            RuleId::GaapIfrs => "GAAP/IFRS compliance",
            RuleId::Anomaly => "Anomaly detection",
            RuleId::CrossSheet => "Cross-sheet reconciliation",
            RuleId::FormulaAudit => "Formula audit",
        }
    }

    /// Whether the rule is enabled in a fresh selection. The advanced
    /// checks are opt-in.
    pub fn default_enabled(&self) -> bool {
        !matches!(
            self,
            RuleId::Anomaly | RuleId::CrossSheet | RuleId::FormulaAudit
        )
    }

    pub fn all() -> Vec<RuleId> {
        vec![
            RuleId::DoubleEntry,
            RuleId::MissingValues,
            RuleId::Duplicates,
            RuleId::InvalidDates,
            RuleId::AccountCodes,
            RuleId::GaapIfrs,
            RuleId::Anomaly,
            RuleId::CrossSheet,
            RuleId::FormulaAudit,
        ]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        RuleId::all().into_iter().find(|r| r.code() == code)
    }
}

/// The set of currently enabled rules. Order is irrelevant; the set may be
/// empty, which means "upload without any checks".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSelection {
    enabled: BTreeSet<RuleId>,
}

impl RuleSelection {
    /// Selection with every default-enabled rule switched on.
    pub fn defaults() -> Self {
        Self {
            enabled: RuleId::all()
                .into_iter()
                .filter(|r| r.default_enabled())
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.enabled.contains(&rule)
    }

    /// Flips one rule and returns its new state.
    pub fn toggle(&mut self, rule: RuleId) -> bool {
        if !self.enabled.remove(&rule) {
            self.enabled.insert(rule);
            true
        } else {
            false
        }
    }

    pub fn set(&mut self, rule: RuleId, on: bool) {
        if on {
            self.enabled.insert(rule);
        } else {
            self.enabled.remove(&rule);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.enabled.iter().copied()
    }

    /// Comma-joined wire form for the `rules` query parameter.
    /// URL-encoding is the transport layer's concern.
    pub fn to_query(&self) -> String {
        self.enabled
            .iter()
            .map(|r| r.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_advanced_checks() {
        let sel = RuleSelection::defaults();
        assert_eq!(sel.len(), 6);
        assert!(sel.is_enabled(RuleId::DoubleEntry));
        assert!(sel.is_enabled(RuleId::GaapIfrs));
        assert!(!sel.is_enabled(RuleId::Anomaly));
        assert!(!sel.is_enabled(RuleId::CrossSheet));
        assert!(!sel.is_enabled(RuleId::FormulaAudit));
    }

    #[test]
    fn toggle_flips_and_reports_state() {
        let mut sel = RuleSelection::empty();
        assert!(sel.toggle(RuleId::Duplicates));
        assert!(sel.is_enabled(RuleId::Duplicates));
        assert!(!sel.toggle(RuleId::Duplicates));
        assert!(sel.is_empty());
    }

    #[test]
    fn query_is_comma_joined_codes() {
        let mut sel = RuleSelection::empty();
        sel.set(RuleId::DoubleEntry, true);
        sel.set(RuleId::InvalidDates, true);
        assert_eq!(sel.to_query(), "double-entry,invalid-dates");
        assert_eq!(RuleSelection::empty().to_query(), "");
    }

    #[test]
    fn codes_round_trip() {
        for rule in RuleId::all() {
            assert_eq!(RuleId::from_code(rule.code()), Some(rule));
        }
        assert_eq!(RuleId::from_code("no-such-rule"), None);
    }
}
