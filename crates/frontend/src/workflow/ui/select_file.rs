use super::FileHandle;
use crate::workflow::session::{check_file, FileMeta, WizardStep, WorkflowSession};
use leptos::prelude::*;
use thaw::*;
use wasm_bindgen::JsCast;

/// Step 1: pick or drop the spreadsheet. A new selection replaces the file
/// wholesale and invalidates any previous report.
#[component]
pub fn SelectFilePanel() -> impl IntoView {
    let session = expect_context::<RwSignal<WorkflowSession>>();
    let handle = expect_context::<FileHandle>();
    let (precheck_error, set_precheck_error) = signal(Option::<String>::None);
    let (drag_over, set_drag_over) = signal(false);

    let accept_file = move |file: web_sys::File| {
        let name = file.name();
        let size = file.size() as u64;
        match check_file(&name, size) {
            Ok(()) => {
                set_precheck_error.set(None);
                handle.set(Some(file));
                session.update(|s| s.select_file(FileMeta { name, size }));
            }
            Err(msg) => set_precheck_error.set(Some(msg)),
        }
    };

    let handle_file_select = move |ev: web_sys::Event| {
        let input = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
        if let Some(input) = input {
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                accept_file(file);
            }
        }
    };

    let handle_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        set_drag_over.set(false);
        if let Some(file) = ev
            .data_transfer()
            .and_then(|dt| dt.files())
            .and_then(|files| files.get(0))
        {
            accept_file(file);
        }
    };

    view! {
        <div class="wizard__pane">
            <h2>"Upload your spreadsheet"</h2>
            <div
                class=move || if drag_over.get() { "drop-zone drop-zone--over" } else { "drop-zone" }
                on:dragover=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    set_drag_over.set(true);
                }
                on:dragleave=move |ev: web_sys::DragEvent| {
                    ev.prevent_default();
                    set_drag_over.set(false);
                }
                on:drop=handle_drop
            >
                <label class="button button--primary" for="workflow-file-input">
                    "Choose a .csv or .xlsx file"
                </label>
                <input
                    id="workflow-file-input"
                    type="file"
                    accept=".csv,.xlsx"
                    on:change=handle_file_select
                    class="hidden"
                />
                <div class="drop-zone__hint">"or drop it here"</div>
            </div>

            {move || {
                session
                    .with(|s| s.file().map(|f| format!("{} ({:.2} KB)", f.name, f.size as f64 / 1024.0)))
                    .map(|info| view! {
                        <div class="file-info"><strong>{info}</strong></div>
                    })
            }}

            {move || precheck_error.get().map(|e| view! {
                <div class="warning-box warning-box--error">
                    <span class="warning-box__icon">"⚠"</span>
                    <span class="warning-box__text">{e}</span>
                </div>
            })}

            <div class="wizard__actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| {
                        session.update(|s| {
                            s.advance(WizardStep::Analyzing);
                        });
                    }
                    disabled=Signal::derive(move || session.with(|s| s.file().is_none()))
                >
                    "Next: Analyze"
                </Button>
            </div>
        </div>
    }
}
