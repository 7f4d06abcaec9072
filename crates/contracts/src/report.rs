use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Row reference in a validation finding. The backend sends a row number
/// for row-level findings, null for sheet-level ones (e.g. an out-of-balance
/// trial balance), and occasionally a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowRef {
    Num(i64),
    Text(String),
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRef::Num(n) => write!(f, "{}", n),
            RowRef::Text(s) => f.write_str(s),
        }
    }
}

/// One validation finding. No identity beyond its content; findings are not
/// deduplicated. Absent wire fields default instead of failing the decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub row: Option<RowRef>,
    #[serde(default)]
    pub issue: String,
}

impl Issue {
    /// Row column text for rendering; sheet-level findings show empty.
    pub fn row_text(&self) -> String {
        self.row.as_ref().map(|r| r.to_string()).unwrap_or_default()
    }
}

/// Deserializes a JSON object into key/value pairs in wire order.
///
/// Sheet order is meaningful (it is the backend's iteration order), so the
/// usual map types are out: they would silently re-sort or re-hash the keys.
fn ordered_pairs<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct PairsVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for PairsVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, V>()? {
                pairs.push((key, value));
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor(PhantomData))
}

/// The error aggregate: sheet name → ordered findings, in exactly the order
/// the backend supplied. A sheet with zero findings is still present with an
/// empty list. The report is replaced atomically on every validation
/// round-trip, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    sheets: Vec<(String, Vec<Issue>)>,
}

impl<'de> Deserialize<'de> for ValidationReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            sheets: ordered_pairs(deserializer)?,
        })
    }
}

impl ValidationReport {
    pub fn from_pairs(sheets: Vec<(String, Vec<Issue>)>) -> Self {
        Self { sheets }
    }

    /// Clean iff every sheet's finding list is empty. A report with zero
    /// sheets is clean.
    pub fn is_clean(&self) -> bool {
        self.sheets.iter().all(|(_, issues)| issues.is_empty())
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn issue_count(&self) -> usize {
        self.sheets.iter().map(|(_, issues)| issues.len()).sum()
    }

    /// First sheet in wire order; the bulk-fix default target.
    pub fn first_sheet(&self) -> Option<&str> {
        self.sheets.first().map(|(name, _)| name.as_str())
    }

    pub fn sheets(&self) -> impl Iterator<Item = (&str, &[Issue])> {
        self.sheets
            .iter()
            .map(|(name, issues)| (name.as_str(), issues.as_slice()))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    pub fn issues_for(&self, sheet: &str) -> Option<&[Issue]> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, issues)| issues.as_slice())
    }
}

/// Column list and sample rows the backend returns alongside the findings,
/// shown next to the error table. Sample rows stay opaque JSON records.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SheetPreview {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub sample: Vec<serde_json::Value>,
}

/// Per-sheet result of a bulk-fix call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FixSheetResult {
    #[serde(default)]
    pub summary: Vec<String>,
}

/// Bulk-fix response: sheet name → applied-fix summary, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkFixOutcome {
    sheets: Vec<(String, FixSheetResult)>,
}

impl<'de> Deserialize<'de> for BulkFixOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            sheets: ordered_pairs(deserializer)?,
        })
    }
}

impl BulkFixOutcome {
    pub fn from_pairs(sheets: Vec<(String, FixSheetResult)>) -> Self {
        Self { sheets }
    }

    /// Flattens the per-sheet summaries into `"sheet: line"` display strings,
    /// keeping wire order.
    pub fn flatten(&self) -> Vec<String> {
        self.sheets
            .iter()
            .flat_map(|(sheet, result)| {
                result
                    .summary
                    .iter()
                    .map(move |line| format!("{}: {}", sheet, line))
            })
            .collect()
    }
}

/// Deserializes the `preview` field of the upload response in wire order.
pub(crate) fn preview_pairs<'de, D>(
    deserializer: D,
) -> Result<Vec<(String, SheetPreview)>, D::Error>
where
    D: Deserializer<'de>,
{
    ordered_pairs(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(row: Option<i64>, text: &str) -> Issue {
        Issue {
            row: row.map(RowRef::Num),
            issue: text.to_string(),
        }
    }

    #[test]
    fn mixed_sheets_are_not_clean_and_keep_counts() {
        let report: ValidationReport = serde_json::from_str(
            r#"{ "Sheet1": [], "Sheet2": [{"row": 3, "issue": "dup"}] }"#,
        )
        .unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.sheet_count(), 2);
        assert_eq!(report.issues_for("Sheet1").unwrap().len(), 0);
        assert_eq!(report.issues_for("Sheet2").unwrap().len(), 1);
        assert_eq!(report.issues_for("Sheet2").unwrap()[0], issue(Some(3), "dup"));
    }

    #[test]
    fn empty_report_is_clean() {
        let report: ValidationReport = serde_json::from_str("{}").unwrap();
        assert!(report.is_clean());
        assert_eq!(report.sheet_count(), 0);
        assert_eq!(report.first_sheet(), None);
    }

    #[test]
    fn sheet_order_is_wire_order_not_sorted() {
        let report: ValidationReport = serde_json::from_str(
            r#"{ "Zulu": [], "Alpha": [], "Mike": [] }"#,
        )
        .unwrap();
        let names: Vec<&str> = report.sheet_names().collect();
        assert_eq!(names, vec!["Zulu", "Alpha", "Mike"]);
        assert_eq!(report.first_sheet(), Some("Zulu"));
    }

    #[test]
    fn missing_issue_fields_are_defaulted() {
        let report: ValidationReport =
            serde_json::from_str(r#"{ "Journal": [{}, {"row": null}, {"row": "7"}] }"#).unwrap();
        let issues = report.issues_for("Journal").unwrap();
        assert_eq!(issues[0], Issue::default());
        assert_eq!(issues[1].row_text(), "");
        assert_eq!(issues[1].issue, "");
        assert_eq!(issues[2].row, Some(RowRef::Text("7".to_string())));
        assert_eq!(issues[2].row_text(), "7");
    }

    #[test]
    fn identical_wire_bytes_decode_to_equal_reports() {
        let body = r#"{ "Trial Balance": [{"row": null, "issue": "out of balance"}] }"#;
        let a: ValidationReport = serde_json::from_str(body).unwrap();
        let b: ValidationReport = serde_json::from_str(body).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fix_outcome_flattens_in_wire_order() {
        let outcome: BulkFixOutcome = serde_json::from_str(
            r#"{
                "Journal": { "summary": ["Removed 2 duplicate rows.", "Filled 5 missing values with 0."] },
                "Accounts": { "summary": ["Removed 0 duplicate rows."] }
            }"#,
        )
        .unwrap();
        assert_eq!(
            outcome.flatten(),
            vec![
                "Journal: Removed 2 duplicate rows.",
                "Journal: Filled 5 missing values with 0.",
                "Accounts: Removed 0 duplicate rows.",
            ]
        );
    }

    #[test]
    fn fix_outcome_tolerates_missing_summary() {
        let outcome: BulkFixOutcome =
            serde_json::from_str(r#"{ "Journal": { "columns": ["A", "B"] } }"#).unwrap();
        assert!(outcome.flatten().is_empty());
    }
}
