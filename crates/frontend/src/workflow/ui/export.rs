use crate::shared::download::download_blob;
use crate::workflow::api;
use crate::workflow::session::{WizardStep, WorkflowSession};
use chrono::Utc;
use contracts::api::{EmailRequest, ReportRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

/// Step 4: downloads and notifications. Reachable only once the report is
/// clean, so every action here works on validated data.
#[component]
pub fn ExportPanel() -> impl IntoView {
    let session = expect_context::<RwSignal<WorkflowSession>>();

    let (csv_sheet, set_csv_sheet) = signal(Option::<String>::None);
    let (action_note, set_action_note) = signal(Option::<String>::None);
    let (action_error, set_action_error) = signal(Option::<String>::None);

    let (recipient, set_recipient) = signal(String::new());
    let (subject, set_subject) = signal("LedgerLift Notification".to_string());
    let (body, set_body) = signal(String::new());
    let (sending, set_sending) = signal(false);

    let sheet_names = move || {
        session.with(|s| {
            s.report()
                .map(|r| r.sheet_names().map(str::to_string).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    let download_report = move |_| {
        let request = session.with(|s| {
            let sheet = s.fix_target(None);
            let errors = sheet
                .as_deref()
                .and_then(|name| s.report().and_then(|r| r.issues_for(name)))
                .map(<[_]>::to_vec)
                .unwrap_or_default();
            ReportRequest {
                sheet,
                errors,
                fixes: s.applied_fixes().to_vec(),
                summary: s.fix_summary().to_vec(),
            }
        });
        spawn_local(async move {
            match api::financial_report(&request).await {
                Ok(blob) => {
                    let filename =
                        format!("financial_report_{}.html", Utc::now().format("%Y%m%d_%H%M%S"));
                    if let Err(err) = download_blob(&blob, &filename) {
                        set_action_error.set(Some(err));
                    } else {
                        set_action_error.set(None);
                        set_action_note.set(Some("Report downloaded.".to_string()));
                    }
                }
                Err(err) => set_action_error.set(Some(err.to_string())),
            }
        });
    };

    let download_data = move |_| {
        let sheet = csv_sheet.get();
        spawn_local(async move {
            match api::download_csv(sheet.as_deref()).await {
                Ok(blob) => {
                    let filename = match &sheet {
                        Some(name) => format!("{}.csv", name.replace(' ', "_")),
                        None => "ledgerlift_export.zip".to_string(),
                    };
                    if let Err(err) = download_blob(&blob, &filename) {
                        set_action_error.set(Some(err));
                    } else {
                        set_action_error.set(None);
                        set_action_note.set(Some(format!("Downloaded {}", filename)));
                    }
                }
                Err(err) => set_action_error.set(Some(err.to_string())),
            }
        });
    };

    let send_email = move |_| {
        let request = EmailRequest {
            recipient: recipient.get().trim().to_string(),
            subject: subject.get(),
            body: body.get(),
        };
        if request.recipient.is_empty() || request.body.is_empty() {
            set_action_error.set(Some("Recipient and body required.".to_string()));
            return;
        }
        set_sending.set(true);
        spawn_local(async move {
            match api::send_email(&request).await {
                Ok(response) if response.success => {
                    set_action_error.set(None);
                    set_action_note.set(Some(format!("Email sent to {}.", request.recipient)));
                }
                Ok(response) => {
                    set_action_error.set(Some(
                        response
                            .error
                            .unwrap_or_else(|| "Email could not be sent.".to_string()),
                    ));
                }
                Err(err) => set_action_error.set(Some(err.to_string())),
            }
            set_sending.set(false);
        });
    };

    view! {
        <div class="wizard__pane">
            <h2>"Export"</h2>
            <div class="export-section">
                <h3>"Cleaned data"</h3>
                <div class="export-section__row">
                    <select on:change=move |ev| {
                        let value = event_target_value(&ev);
                        set_csv_sheet.set((!value.is_empty()).then_some(value));
                    }>
                        <option value="">"All sheets (zip)"</option>
                        {move || sheet_names().into_iter().map(|name| {
                            let value = name.clone();
                            view! { <option value=value>{name}</option> }
                        }).collect_view()}
                    </select>
                    <Button appearance=ButtonAppearance::Primary on_click=download_data>
                        "Download CSV"
                    </Button>
                </div>
            </div>

            <div class="export-section">
                <h3>"Financial report"</h3>
                <Button appearance=ButtonAppearance::Secondary on_click=download_report>
                    "Download report"
                </Button>
            </div>

            <div class="export-section">
                <h3>"Email notification"</h3>
                <div class="export-section__form">
                    <input
                        type="email"
                        placeholder="recipient@example.com"
                        prop:value=recipient
                        on:input=move |ev| set_recipient.set(event_target_value(&ev))
                    />
                    <input
                        type="text"
                        prop:value=subject
                        on:input=move |ev| set_subject.set(event_target_value(&ev))
                    />
                    <textarea
                        placeholder="Message"
                        prop:value=body
                        on:input=move |ev| set_body.set(event_target_value(&ev))
                    ></textarea>
                    <Button
                        appearance=ButtonAppearance::Primary
                        on_click=send_email
                        disabled=sending
                    >
                        "Send email"
                    </Button>
                </div>
            </div>

            {move || action_note.get().map(|note| view! {
                <div class="info-box">{note}</div>
            })}
            {move || action_error.get().map(|e| view! {
                <div class="warning-box warning-box--error">
                    <span class="warning-box__icon">"⚠"</span>
                    <span class="warning-box__text">{e}</span>
                </div>
            })}

            <div class="wizard__actions">
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| {
                        session.update(|s| {
                            s.advance(WizardStep::ReviewErrors);
                        });
                    }
                >
                    "Back"
                </Button>
            </div>
        </div>
    }
}
