use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bulk fixes the backend can apply to one sheet's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FixId {
    AutoBalance,
    FillMissing,
    RemoveDuplicates,
}

impl FixId {
    /// Wire id, as the backend expects it in the `fixes` form field.
    pub fn code(&self) -> &'static str {
        match self {
            FixId::AutoBalance => "auto-balance",
            FixId::FillMissing => "fill-missing",
            FixId::RemoveDuplicates => "remove-duplicates",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixId::AutoBalance => "Auto-balance rounding errors",
            FixId::FillMissing => "Fill missing values with 0",
            FixId::RemoveDuplicates => "Remove duplicate rows",
        }
    }

    pub fn all() -> Vec<FixId> {
        vec![FixId::AutoBalance, FixId::FillMissing, FixId::RemoveDuplicates]
    }

    pub fn from_code(code: &str) -> Option<Self> {
        FixId::all().into_iter().find(|f| f.code() == code)
    }
}

/// Which fixes to apply, and to which sheet. `sheet: None` means "the first
/// sheet of the current report" (resolved by the caller before sending).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FixSelection {
    enabled: BTreeSet<FixId>,
    pub sheet: Option<String>,
}

impl FixSelection {
    pub fn is_enabled(&self, fix: FixId) -> bool {
        self.enabled.contains(&fix)
    }

    pub fn toggle(&mut self, fix: FixId) -> bool {
        if !self.enabled.remove(&fix) {
            self.enabled.insert(fix);
            true
        } else {
            false
        }
    }

    pub fn set(&mut self, fix: FixId, on: bool) {
        if on {
            self.enabled.insert(fix);
        } else {
            self.enabled.remove(&fix);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    pub fn codes(&self) -> Vec<String> {
        self.enabled.iter().map(|f| f.code().to_string()).collect()
    }

    /// Comma-joined wire form for the `fixes` form field.
    pub fn to_form_value(&self) -> String {
        self.enabled
            .iter()
            .map(|f| f.code())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_value_is_comma_joined() {
        let mut sel = FixSelection::default();
        sel.set(FixId::AutoBalance, true);
        sel.set(FixId::RemoveDuplicates, true);
        assert_eq!(sel.to_form_value(), "auto-balance,remove-duplicates");
    }

    #[test]
    fn codes_round_trip() {
        for fix in FixId::all() {
            assert_eq!(FixId::from_code(fix.code()), Some(fix));
        }
        assert_eq!(FixId::from_code("rename-columns"), None);
    }
}
