use super::FileHandle;
use crate::workflow::session::WorkflowSession;
use crate::workflow::trigger_validation;
use contracts::rules::RuleId;
use leptos::prelude::*;
use thaw::*;

/// Step 2: choose validation rules and run the analysis. Toggling a rule
/// revalidates immediately with the current file; without a file the toggle
/// only mutates the selection.
#[component]
pub fn AnalyzePanel() -> impl IntoView {
    let session = expect_context::<RwSignal<WorkflowSession>>();
    let handle = expect_context::<FileHandle>();

    let revalidate = move || {
        if let Some(file) = handle.get() {
            trigger_validation(session, file);
        }
    };

    view! {
        <div class="wizard__pane">
            <h2>"Validation rules"</h2>
            {move || {
                session
                    .with(|s| s.file().map(|f| f.name.clone()))
                    .map(|name| view! {
                        <div class="file-info">"File: " <strong>{name}</strong></div>
                    })
            }}

            <div class="rule-list">
                {RuleId::all().into_iter().map(|rule| {
                    view! {
                        <label class="rule-list__item">
                            <input
                                type="checkbox"
                                prop:checked=move || session.with(|s| s.rules().is_enabled(rule))
                                on:change=move |_| {
                                    session.update(|s| {
                                        s.toggle_rule(rule);
                                    });
                                    revalidate();
                                }
                            />
                            {rule.label()}
                        </label>
                    }
                }).collect_view()}
            </div>

            {move || session.with(|s| s.error().map(str::to_string)).map(|e| view! {
                <div class="warning-box warning-box--error">
                    <span class="warning-box__icon">"⚠"</span>
                    <span class="warning-box__text">{e}</span>
                </div>
            })}

            <div class="wizard__actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| revalidate()
                    disabled=Signal::derive(move || session.with(|s| s.is_validating()))
                >
                    "Analyze file"
                </Button>
                <Show when=move || session.with(|s| s.is_validating())>
                    <Spinner />
                    <span class="loading">"Validating..."</span>
                </Show>
            </div>
        </div>
    }
}
