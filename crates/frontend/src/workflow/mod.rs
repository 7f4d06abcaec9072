pub mod api;
pub mod session;
pub mod ui;

use contracts::fixes::FixSelection;
use leptos::prelude::*;
use leptos::task::spawn_local;
use session::WorkflowSession;

/// Kicks off one validation round-trip with the current rule selection.
/// A silent no-op when no file is selected. The issued ticket supersedes any
/// request still in flight; a late reply for the old ticket is discarded by
/// `apply_validation`.
pub fn trigger_validation(session: RwSignal<WorkflowSession>, file: web_sys::File) {
    let Some(ticket) = session.try_update(|s| s.begin_validation()).flatten() else {
        return;
    };
    spawn_local(async move {
        log::info!("validating {} (token {})", file.name(), ticket.token);
        let outcome = api::validate(&file, &ticket.rules).await;
        session.update(|s| {
            s.apply_validation(ticket.token, outcome);
        });
    });
}

/// Applies the selected fixes, then refreshes the report by replaying the
/// exact (file, rules) pair that produced the one currently on screen, so
/// fixes and displayed errors never diverge. On failure nothing changed
/// server-side and the session keeps its report and step.
pub fn trigger_fix(
    session: RwSignal<WorkflowSession>,
    file: web_sys::File,
    mut selection: FixSelection,
) {
    selection.sheet = session.with(|s| s.fix_target(selection.sheet.take()));
    spawn_local(async move {
        match api::bulk_fix(&selection).await {
            Ok(outcome) => {
                session.update(|s| s.record_fix_applied(selection.codes(), outcome.flatten()));
                let Some(ticket) = session.try_update(|s| s.begin_refresh()).flatten() else {
                    return;
                };
                let refreshed = api::validate(&file, &ticket.rules).await;
                session.update(|s| {
                    s.apply_validation(ticket.token, refreshed);
                });
            }
            Err(err) => session.update(|s| s.set_fix_error(err.to_string())),
        }
    });
}
