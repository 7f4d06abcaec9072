use crate::workflow::api;
use contracts::api::FeedbackRequest;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

/// Floating feedback widget, available on every step.
#[component]
pub fn FeedbackCorner() -> impl IntoView {
    let (open, set_open) = signal(false);
    let (text, set_text) = signal(String::new());
    let (note, set_note) = signal(Option::<String>::None);

    let submit = move |_| {
        let feedback = text.get().trim().to_string();
        if feedback.is_empty() {
            return;
        }
        spawn_local(async move {
            match api::send_feedback(&FeedbackRequest { feedback }).await {
                Ok(()) => {
                    set_text.set(String::new());
                    set_note.set(Some("Thanks for the feedback!".to_string()));
                }
                Err(err) => set_note.set(Some(err.to_string())),
            }
        });
    };

    view! {
        <div class="feedback-corner">
            <Show when=move || open.get()>
                <div class="feedback-corner__form">
                    <textarea
                        placeholder="Tell us what went wrong or what you liked"
                        prop:value=text
                        on:input=move |ev| set_text.set(event_target_value(&ev))
                    ></textarea>
                    <div class="feedback-corner__actions">
                        <Button appearance=ButtonAppearance::Primary on_click=submit>
                            "Send"
                        </Button>
                        <Button
                            appearance=ButtonAppearance::Secondary
                            on_click=move |_| {
                                set_note.set(None);
                                set_open.set(false);
                            }
                        >
                            "Close"
                        </Button>
                    </div>
                    {move || note.get().map(|n| view! {
                        <div class="feedback-corner__note">{n}</div>
                    })}
                </div>
            </Show>
            <button
                class="feedback-corner__toggle"
                on:click=move |_| set_open.update(|o| *o = !*o)
            >
                "Feedback"
            </button>
        </div>
    }
}
