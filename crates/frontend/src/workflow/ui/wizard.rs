use super::export::ExportPanel;
use super::feedback::FeedbackCorner;
use super::review::ReviewPanel;
use super::rules::AnalyzePanel;
use super::select_file::SelectFilePanel;
use super::FileHandle;
use crate::workflow::session::{create_session, WizardStep, WorkflowSession};
use leptos::prelude::*;

/// Root of the cleanup wizard. Owns the session and the file handle and
/// shows exactly one step panel, driven by the session's current step.
#[component]
pub fn WorkflowWizard() -> impl IntoView {
    let session = create_session();
    provide_context(session);
    provide_context(FileHandle::new());

    view! {
        <div class="wizard">
            <WizardStepper />
            <div class="wizard__panel">
                {move || match session.with(|s| s.step()) {
                    WizardStep::SelectFile => view! { <SelectFilePanel /> }.into_any(),
                    WizardStep::Analyzing => view! { <AnalyzePanel /> }.into_any(),
                    WizardStep::ReviewErrors => view! { <ReviewPanel /> }.into_any(),
                    WizardStep::Export => view! { <ExportPanel /> }.into_any(),
                }}
            </div>
            <FeedbackCorner />
        </div>
    }
}

/// Step header. Every step is clickable; `advance` refuses forward jumps
/// whose preconditions do not hold, so a click on a locked step is a no-op.
#[component]
fn WizardStepper() -> impl IntoView {
    let session = expect_context::<RwSignal<WorkflowSession>>();

    view! {
        <div class="wizard__stepper">
            {WizardStep::all().into_iter().map(|step| {
                let class = move || {
                    let current = session.with(|s| s.step().index());
                    if step.index() == current {
                        "wizard__step wizard__step--active"
                    } else if step.index() < current {
                        "wizard__step wizard__step--done"
                    } else {
                        "wizard__step"
                    }
                };
                view! {
                    <button
                        class=class
                        on:click=move |_| {
                            session.update(|s| {
                                s.advance(step);
                            });
                        }
                    >
                        {format!("{}. {}", step.index() + 1, step.title())}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}
