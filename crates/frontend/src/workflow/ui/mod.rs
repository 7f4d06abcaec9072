mod export;
mod feedback;
mod review;
mod rules;
mod select_file;
mod wizard;

pub use wizard::WorkflowWizard;

use leptos::prelude::*;

/// The raw browser file handle, kept outside the session so the session
/// itself never touches `web_sys`. Provided as context by the wizard root.
#[derive(Clone, Copy)]
pub struct FileHandle(StoredValue<Option<web_sys::File>, LocalStorage>);

impl FileHandle {
    pub fn new() -> Self {
        Self(StoredValue::new_local(None))
    }

    pub fn get(&self) -> Option<web_sys::File> {
        self.0.get_value()
    }

    pub fn set(&self, file: Option<web_sys::File>) {
        self.0.set_value(file);
    }
}
