//! Helpers for constructing backend API URLs.

/// Base URL of the cleanup backend, derived from the current window
/// location. The backend listens on port 8000.
///
/// Returns an empty string if no window is available.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    format!("{}//{}:8000", protocol, hostname)
}

/// Builds a full backend URL from a path like `/upload`.
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}
