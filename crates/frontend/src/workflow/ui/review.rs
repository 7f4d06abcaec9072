use super::FileHandle;
use crate::workflow::session::{WizardStep, WorkflowSession};
use crate::workflow::{api, trigger_fix};
use contracts::api::FixPreviewRequest;
use contracts::fixes::{FixId, FixSelection};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

/// Step 3: the error review table plus the bulk-fix panel. The table renders
/// straight from the current report; after a fix the report is refreshed by
/// the fix/revalidate chain, so the two can never disagree.
#[component]
pub fn ReviewPanel() -> impl IntoView {
    let session = expect_context::<RwSignal<WorkflowSession>>();
    let handle = expect_context::<FileHandle>();
    let fix_selection = RwSignal::new(FixSelection::default());
    let (preview_lines, set_preview_lines) = signal(Vec::<String>::new());
    let (preview_error, set_preview_error) = signal(Option::<String>::None);

    let dirty_sheets = move || {
        session.with(|s| {
            s.report()
                .map(|r| {
                    r.sheets()
                        .filter(|(_, issues)| !issues.is_empty())
                        .map(|(name, issues)| (name.to_string(), issues.to_vec()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        })
    };
    let sheet_names = move || {
        session.with(|s| {
            s.report()
                .map(|r| r.sheet_names().map(str::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let resolved_target = move || {
        session.with(|s| s.fix_target(fix_selection.with(|f| f.sheet.clone())))
    };

    let run_preview = move |_| {
        let request = FixPreviewRequest {
            sheet: resolved_target(),
            fixes: fix_selection.with(|f| f.codes()),
        };
        spawn_local(async move {
            match api::preview_fixes(&request).await {
                Ok(response) => {
                    set_preview_error.set(None);
                    set_preview_lines.set(response.preview);
                }
                Err(err) => set_preview_error.set(Some(err.to_string())),
            }
        });
    };

    let apply_fixes = move |_| {
        if let Some(file) = handle.get() {
            set_preview_lines.set(Vec::new());
            trigger_fix(session, file, fix_selection.get());
        }
    };

    view! {
        <div class="wizard__pane">
            <h2>"Review errors"</h2>

            {move || {
                let overview = session.with(|s| {
                    s.preview()
                        .iter()
                        .map(|(name, p)| {
                            format!("{} ({} columns, {} sample rows)", name, p.columns.len(), p.sample.len())
                        })
                        .collect::<Vec<_>>()
                });
                (!overview.is_empty()).then(|| view! {
                    <div class="sheet-overview">"Sheets: " {overview.join(", ")}</div>
                })
            }}

            <table class="table__data table--striped">
                <thead class="table__head">
                    <tr>
                        <th class="table__header-cell">"Row"</th>
                        <th class="table__header-cell">"Issue"</th>
                    </tr>
                </thead>
                <tbody>
                    {move || {
                        let sheets = dirty_sheets();
                        if sheets.is_empty() {
                            view! {
                                <tr>
                                    <td colspan="2" class="table__cell table__cell--info">
                                        "No errors found — your data is clean."
                                    </td>
                                </tr>
                            }.into_any()
                        } else {
                            sheets.into_iter().map(|(name, issues)| view! {
                                <tr class="table__row table__row--sheet">
                                    <th colspan="2" class="table__header-cell">{name}</th>
                                </tr>
                                {issues.into_iter().map(|issue| {
                                    let row = issue.row_text();
                                    let text = issue.issue;
                                    view! {
                                        <tr class="table__row">
                                            <td class="table__cell table__cell--row">{row}</td>
                                            <td class="table__cell">{text}</td>
                                        </tr>
                                    }
                                }).collect_view()}
                            }).collect_view().into_any()
                        }
                    }}
                </tbody>
            </table>

            <div class="fix-panel">
                <h3>"Bulk fixes"</h3>
                {FixId::all().into_iter().map(|fix| {
                    view! {
                        <label class="fix-panel__item">
                            <input
                                type="checkbox"
                                prop:checked=move || fix_selection.with(|f| f.is_enabled(fix))
                                on:change=move |_| {
                                    fix_selection.update(|f| {
                                        f.toggle(fix);
                                    });
                                }
                            />
                            {fix.label()}
                        </label>
                    }
                }).collect_view()}

                <div class="fix-panel__target">
                    <label for="fix-target-sheet">"Target sheet:"</label>
                    <select
                        id="fix-target-sheet"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            fix_selection.update(|f| {
                                f.sheet = if value.is_empty() { None } else { Some(value) };
                            });
                        }
                    >
                        <option value="">"First sheet of the report"</option>
                        {move || sheet_names().into_iter().map(|name| {
                            let value = name.clone();
                            view! { <option value=value>{name}</option> }
                        }).collect_view()}
                    </select>
                    // One sheet per call, exactly as the backend applies it.
                    {move || resolved_target().map(|target| view! {
                        <span class="fix-panel__hint">"Fixes will be applied to: " <strong>{target}</strong></span>
                    })}
                </div>

                <div class="wizard__actions">
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=run_preview
                        disabled=Signal::derive(move || fix_selection.with(|f| f.is_empty()))
                    >
                        "Preview fixes"
                    </Button>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=apply_fixes
                        disabled=Signal::derive(move || {
                            fix_selection.with(|f| f.is_empty())
                                || session.with(|s| s.is_validating())
                        })
                    >
                        "Apply fixes"
                    </Button>
                    <Show when=move || session.with(|s| s.is_validating())>
                        <Spinner />
                        <span class="loading">"Refreshing results..."</span>
                    </Show>
                </div>

                {move || (!preview_lines.get().is_empty()).then(|| view! {
                    <ul class="fix-panel__preview">
                        {preview_lines.get().into_iter().map(|line| view! {
                            <li>{line}</li>
                        }).collect_view()}
                    </ul>
                })}

                {move || {
                    let summary = session.with(|s| s.fix_summary().to_vec());
                    (!summary.is_empty()).then(|| view! {
                        <div class="fix-panel__summary">
                            <Badge appearance=BadgeAppearance::Tint color=BadgeColor::Success>
                                "Fixes applied"
                            </Badge>
                            <ul>
                                {summary.into_iter().map(|line| view! {
                                    <li>{line}</li>
                                }).collect_view()}
                            </ul>
                        </div>
                    })
                }}

                {move || preview_error.get().map(|e| view! {
                    <div class="warning-box warning-box--error">
                        <span class="warning-box__icon">"⚠"</span>
                        <span class="warning-box__text">{e}</span>
                    </div>
                })}

                {move || session.with(|s| s.fix_error().map(str::to_string)).map(|e| view! {
                    <div class="warning-box warning-box--error">
                        <span class="warning-box__icon">"⚠"</span>
                        <span class="warning-box__text">{e}</span>
                    </div>
                })}

                {move || session.with(|s| s.error().map(str::to_string)).map(|e| view! {
                    <div class="warning-box warning-box--error">
                        <span class="warning-box__icon">"⚠"</span>
                        <span class="warning-box__text">{e}</span>
                    </div>
                })}
            </div>

            <div class="wizard__actions">
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| {
                        session.update(|s| {
                            s.advance(WizardStep::Analyzing);
                        });
                    }
                >
                    "Back"
                </Button>
                <Button
                    appearance=ButtonAppearance::Primary
                    on_click=move |_| {
                        session.update(|s| {
                            s.advance(WizardStep::Export);
                        });
                    }
                    disabled=Signal::derive(move || session.with(|s| !s.can_export()))
                >
                    "Next: Export"
                </Button>
            </div>
        </div>
    }
}
