use crate::workflow::ui::WorkflowWizard;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <div class="app">
            <header class="app__header">
                <h1>"LedgerLift"</h1>
                <span class="app__tagline">"Spreadsheet cleanup for accountants"</span>
            </header>
            <main class="app__main">
                <WorkflowWizard />
            </main>
        </div>
    }
}
