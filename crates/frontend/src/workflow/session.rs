use contracts::api::{ApiError, UploadResponse};
use contracts::report::{SheetPreview, ValidationReport};
use contracts::rules::{RuleId, RuleSelection};
use leptos::prelude::*;

/// Wizard steps, in order. Backward navigation is always allowed; forward
/// transitions are gated by `WorkflowSession::advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectFile,
    Analyzing,
    ReviewErrors,
    Export,
}

impl WizardStep {
    pub fn index(&self) -> usize {
        match self {
            WizardStep::SelectFile => 0,
            WizardStep::Analyzing => 1,
            WizardStep::ReviewErrors => 2,
            WizardStep::Export => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectFile => "Select file",
            WizardStep::Analyzing => "Analyze",
            WizardStep::ReviewErrors => "Review errors",
            WizardStep::Export => "Export",
        }
    }

    pub fn all() -> Vec<WizardStep> {
        vec![
            WizardStep::SelectFile,
            WizardStep::Analyzing,
            WizardStep::ReviewErrors,
            WizardStep::Export,
        ]
    }
}

/// Name and size of the selected file, mirrored out of the `web_sys::File`
/// handle so the session itself stays host-testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
}

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Client-side precheck mirroring the backend's own upload limits, so the
/// obvious rejections never cost a round-trip.
pub fn check_file(name: &str, size: u64) -> Result<(), String> {
    let lower = name.to_lowercase();
    if !lower.ends_with(".csv") && !lower.ends_with(".xlsx") {
        return Err("Invalid file type. Only CSV and Excel files are allowed.".to_string());
    }
    if size > MAX_FILE_SIZE {
        return Err("File too large. Max 5MB allowed.".to_string());
    }
    Ok(())
}

/// Handle for one in-flight validation request: the sequence token plus the
/// rule selection the request was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationTicket {
    pub token: u64,
    pub rules: RuleSelection,
}

/// Session-scoped wizard state: the single source of truth for the active
/// step, the selected file, the rule selection and the current validation
/// report. Owned by the root component via a signal; no ambient globals.
#[derive(Debug, Clone)]
pub struct WorkflowSession {
    step: WizardStep,
    file: Option<FileMeta>,
    rules: RuleSelection,
    report: Option<ValidationReport>,
    preview: Vec<(String, SheetPreview)>,
    /// Rule selection snapshot that produced `report`; replayed verbatim by
    /// the refresh-after-fix call.
    validated_rules: Option<RuleSelection>,
    next_token: u64,
    latest_token: Option<u64>,
    pending_rules: Option<RuleSelection>,
    validating: bool,
    error: Option<String>,
    fix_error: Option<String>,
    fix_summary: Vec<String>,
    applied_fixes: Vec<String>,
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self {
            step: WizardStep::SelectFile,
            file: None,
            rules: RuleSelection::defaults(),
            report: None,
            preview: Vec::new(),
            validated_rules: None,
            next_token: 0,
            latest_token: None,
            pending_rules: None,
            validating: false,
            error: None,
            fix_error: None,
            fix_summary: Vec::new(),
            applied_fixes: Vec::new(),
        }
    }
}

impl WorkflowSession {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn file(&self) -> Option<&FileMeta> {
        self.file.as_ref()
    }

    pub fn rules(&self) -> &RuleSelection {
        &self.rules
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn preview(&self) -> &[(String, SheetPreview)] {
        &self.preview
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn fix_error(&self) -> Option<&str> {
        self.fix_error.as_deref()
    }

    pub fn fix_summary(&self) -> &[String] {
        &self.fix_summary
    }

    pub fn applied_fixes(&self) -> &[String] {
        &self.applied_fixes
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// Replaces the uploaded file wholesale. Any previous report belongs to
    /// the old file and is invalidated, along with any in-flight request.
    pub fn select_file(&mut self, meta: FileMeta) {
        self.file = Some(meta);
        self.report = None;
        self.preview.clear();
        self.validated_rules = None;
        self.latest_token = None;
        self.pending_rules = None;
        self.validating = false;
        self.error = None;
        self.fix_error = None;
        self.fix_summary.clear();
        self.applied_fixes.clear();
    }

    /// Gated step transition. Backward moves always succeed; forward moves
    /// require the target's precondition and are silent no-ops otherwise
    /// (the UI also disables the triggering controls).
    pub fn advance(&mut self, target: WizardStep) -> bool {
        if target.index() <= self.step.index() {
            self.step = target;
            return true;
        }
        let allowed = match target {
            WizardStep::SelectFile => true,
            WizardStep::Analyzing => self.file.is_some(),
            WizardStep::ReviewErrors => self.report.is_some(),
            WizardStep::Export => self.can_export(),
        };
        if allowed {
            self.step = target;
        }
        allowed
    }

    /// True once a successful validation left a clean report.
    pub fn can_export(&self) -> bool {
        self.report.as_ref().is_some_and(|r| r.is_clean())
    }

    pub fn toggle_rule(&mut self, rule: RuleId) -> bool {
        self.rules.toggle(rule)
    }

    /// Issues a validation request with the current rule selection. Returns
    /// `None` when no file is selected (a rule toggle without a file is a
    /// no-op). Any previously issued request becomes stale.
    pub fn begin_validation(&mut self) -> Option<ValidationTicket> {
        self.file.as_ref()?;
        let rules = self.rules.clone();
        Some(self.issue_ticket(rules))
    }

    /// Issues the refresh-after-fix request, replaying the exact rule
    /// selection that produced the current report.
    pub fn begin_refresh(&mut self) -> Option<ValidationTicket> {
        self.file.as_ref()?;
        let rules = self
            .validated_rules
            .clone()
            .unwrap_or_else(|| self.rules.clone());
        Some(self.issue_ticket(rules))
    }

    fn issue_ticket(&mut self, rules: RuleSelection) -> ValidationTicket {
        self.next_token += 1;
        self.latest_token = Some(self.next_token);
        self.pending_rules = Some(rules.clone());
        self.validating = true;
        ValidationTicket {
            token: self.next_token,
            rules,
        }
    }

    /// Reconciles a validation response with the session. Responses whose
    /// token is no longer the latest issued one are discarded: a slow reply
    /// must never overwrite the report a newer request produced. On success
    /// the report is replaced atomically; on failure the previous report and
    /// step stay untouched and a single readable message is recorded.
    pub fn apply_validation(
        &mut self,
        token: u64,
        outcome: Result<UploadResponse, ApiError>,
    ) -> bool {
        if self.latest_token != Some(token) {
            log::warn!("discarding stale validation response (token {})", token);
            return false;
        }
        self.latest_token = None;
        self.validating = false;
        match outcome {
            Ok(response) => {
                self.report = Some(response.errors);
                self.preview = response.preview;
                self.validated_rules = self.pending_rules.take();
                self.error = None;
                if self.step == WizardStep::Analyzing {
                    self.step = WizardStep::ReviewErrors;
                }
            }
            Err(err) => {
                self.pending_rules = None;
                self.error = Some(format!("Upload failed: {}", err));
            }
        }
        true
    }

    /// Resolves the bulk-fix target: the explicit sheet if one was chosen,
    /// otherwise the first sheet of the current report. With several dirty
    /// sheets only that first one is targeted per call, exactly as the
    /// original behaves; the UI names the resolved target instead of hiding
    /// the heuristic.
    pub fn fix_target(&self, explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| {
            self.report
                .as_ref()
                .and_then(|r| r.first_sheet().map(str::to_string))
        })
    }

    pub fn record_fix_applied(&mut self, fixes: Vec<String>, summary: Vec<String>) {
        self.applied_fixes = fixes;
        self.fix_summary = summary;
        self.fix_error = None;
    }

    pub fn set_fix_error(&mut self, message: String) {
        self.fix_error = Some(message);
    }
}

// Created within the root component scope rather than thread-local, so the
// state is disposed with the app.
pub fn create_session() -> RwSignal<WorkflowSession> {
    RwSignal::new(WorkflowSession::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::report::{Issue, RowRef};

    fn response(body: &str) -> UploadResponse {
        contracts::api::decode_checked(body).unwrap()
    }

    fn dirty_response() -> UploadResponse {
        response(r#"{ "errors": { "Sheet1": [], "Sheet2": [{"row": 3, "issue": "dup"}] } }"#)
    }

    fn clean_response() -> UploadResponse {
        response(r#"{ "errors": { "Sheet1": [], "Sheet2": [] } }"#)
    }

    fn with_file() -> WorkflowSession {
        let mut session = WorkflowSession::default();
        session.select_file(FileMeta {
            name: "ledger.xlsx".to_string(),
            size: 1024,
        });
        session
    }

    #[test]
    fn validation_without_file_is_a_noop() {
        let mut session = WorkflowSession::default();
        session.toggle_rule(RuleId::Anomaly);
        assert!(session.begin_validation().is_none());
        assert!(session.report().is_none());
        assert!(!session.is_validating());
    }

    #[test]
    fn successful_validation_replaces_report_and_enters_review() {
        let mut session = with_file();
        assert!(session.advance(WizardStep::Analyzing));
        let ticket = session.begin_validation().unwrap();
        assert!(session.apply_validation(ticket.token, Ok(dirty_response())));
        assert_eq!(session.step(), WizardStep::ReviewErrors);
        let report = session.report().unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.issues_for("Sheet2").unwrap().len(), 1);
        assert_eq!(
            report.issues_for("Sheet2").unwrap()[0].row,
            Some(RowRef::Num(3))
        );
    }

    #[test]
    fn empty_report_is_clean_and_permits_export() {
        let mut session = with_file();
        session.advance(WizardStep::Analyzing);
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(response(r#"{ "errors": {} }"#)));
        assert!(session.can_export());
        assert!(session.advance(WizardStep::Export));
    }

    #[test]
    fn export_is_gated_until_the_report_is_clean() {
        let mut session = with_file();
        session.advance(WizardStep::Analyzing);
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));
        assert!(!session.advance(WizardStep::Export));
        assert_eq!(session.step(), WizardStep::ReviewErrors);

        // A fix round-trip whose revalidation reports every sheet empty
        // unlocks the export step.
        let refresh = session.begin_refresh().unwrap();
        session.apply_validation(refresh.token, Ok(clean_response()));
        assert!(session.advance(WizardStep::Export));
        assert_eq!(session.step(), WizardStep::Export);
    }

    #[test]
    fn forward_steps_are_gated_and_backward_steps_are_not() {
        let mut session = WorkflowSession::default();
        assert!(!session.advance(WizardStep::Analyzing));
        assert!(!session.advance(WizardStep::ReviewErrors));
        assert_eq!(session.step(), WizardStep::SelectFile);

        session.select_file(FileMeta {
            name: "ledger.csv".to_string(),
            size: 10,
        });
        assert!(session.advance(WizardStep::Analyzing));
        // No report yet: review stays locked.
        assert!(!session.advance(WizardStep::ReviewErrors));
        // Backward is always allowed.
        assert!(session.advance(WizardStep::SelectFile));
    }

    #[test]
    fn failed_validation_keeps_report_and_step_and_records_message() {
        let mut session = with_file();
        session.advance(WizardStep::Analyzing);
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));
        let before = session.report().unwrap().clone();

        let retry = session.begin_validation().unwrap();
        assert!(session.apply_validation(retry.token, Err(ApiError::Decode)));
        assert_eq!(session.error(), Some("Upload failed: Invalid JSON response"));
        assert_eq!(session.report(), Some(&before));
        assert_eq!(session.step(), WizardStep::ReviewErrors);
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut session = with_file();
        let first = session.begin_validation().unwrap();
        let second = session.begin_validation().unwrap();
        assert!(!session.apply_validation(first.token, Ok(clean_response())));
        assert!(session.report().is_none());
        assert!(session.apply_validation(second.token, Ok(dirty_response())));
        assert!(session.report().is_some());
    }

    #[test]
    fn selecting_a_new_file_invalidates_report_and_inflight_request() {
        let mut session = with_file();
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));

        let pending = session.begin_validation().unwrap();
        session.select_file(FileMeta {
            name: "other.csv".to_string(),
            size: 99,
        });
        assert!(session.report().is_none());
        // The response for the old file arrives late and must not land.
        assert!(!session.apply_validation(pending.token, Ok(clean_response())));
        assert!(session.report().is_none());
    }

    #[test]
    fn refresh_replays_the_validated_rule_selection() {
        let mut session = with_file();
        let ticket = session.begin_validation().unwrap();
        let validated = ticket.rules.clone();
        session.apply_validation(ticket.token, Ok(dirty_response()));

        // User toggles a rule but the fix refresh must replay the selection
        // that produced the report on screen.
        session.toggle_rule(RuleId::FormulaAudit);
        let refresh = session.begin_refresh().unwrap();
        assert_eq!(refresh.rules, validated);
        assert_ne!(refresh.rules, session.rules().clone());
    }

    #[test]
    fn noop_fix_revalidation_reproduces_an_equal_report() {
        let mut session = with_file();
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));
        let before = session.report().unwrap().clone();

        session.record_fix_applied(Vec::new(), Vec::new());
        let refresh = session.begin_refresh().unwrap();
        session.apply_validation(refresh.token, Ok(dirty_response()));
        assert_eq!(session.report(), Some(&before));
    }

    #[test]
    fn fix_target_prefers_explicit_sheet_then_first_sheet() {
        let mut session = with_file();
        assert_eq!(session.fix_target(None), None);
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));
        assert_eq!(session.fix_target(None), Some("Sheet1".to_string()));
        assert_eq!(
            session.fix_target(Some("Sheet2".to_string())),
            Some("Sheet2".to_string())
        );
    }

    #[test]
    fn fix_failure_leaves_report_untouched() {
        let mut session = with_file();
        let ticket = session.begin_validation().unwrap();
        session.apply_validation(ticket.token, Ok(dirty_response()));
        let before = session.report().unwrap().clone();

        session.set_fix_error("sheet locked".to_string());
        assert_eq!(session.fix_error(), Some("sheet locked"));
        assert_eq!(session.report(), Some(&before));
        assert_eq!(session.step(), WizardStep::SelectFile);
    }

    #[test]
    fn file_precheck_mirrors_backend_limits() {
        assert!(check_file("ledger.xlsx", 1024).is_ok());
        assert!(check_file("LEDGER.CSV", 1024).is_ok());
        assert!(check_file("ledger.pdf", 1024).is_err());
        assert!(check_file("ledger.csv", MAX_FILE_SIZE + 1).is_err());
    }

    #[test]
    fn issue_defaults_render_empty_cells() {
        let issue = Issue::default();
        assert_eq!(issue.row_text(), "");
        assert_eq!(issue.issue, "");
    }
}
