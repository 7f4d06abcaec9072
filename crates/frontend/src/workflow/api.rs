//! Fetch wrappers for the cleanup backend. One attempt per invocation, no
//! retries; every failure path resolves to a single [`ApiError`].

use crate::shared::api_utils::api_url;
use contracts::api::{
    decode_checked, decode_json, protocol_error, ApiError, EmailRequest, EmailResponse,
    FeedbackRequest, FixPreviewRequest, FixPreviewResponse, ReportRequest, UploadResponse,
};
use contracts::report::BulkFixOutcome;
use contracts::fixes::FixSelection;
use contracts::rules::RuleSelection;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, FormData, Request, RequestInit, RequestMode, Response};

fn transport(err: JsValue) -> ApiError {
    ApiError::Transport(format!("{:?}", err))
}

fn post_form(url: &str, form: &FormData) -> Result<Request, ApiError> {
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(form);
    Request::new_with_str_and_init(url, &opts).map_err(transport)
}

fn post_json<T: Serialize>(url: &str, payload: &T) -> Result<Request, ApiError> {
    let body = serde_json::to_string(payload)
        .map_err(|e| ApiError::Transport(format!("Failed to serialize request: {}", e)))?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::Cors);
    opts.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(url, &opts).map_err(transport)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(transport)?;
    Ok(request)
}

fn get(url: &str) -> Result<Request, ApiError> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);
    Request::new_with_str_and_init(url, &opts).map_err(transport)
}

async fn send(request: Request) -> Result<Response, ApiError> {
    let window =
        web_sys::window().ok_or_else(|| ApiError::Transport("No window object".to_string()))?;
    let response_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?;
    response_value
        .dyn_into()
        .map_err(|_| ApiError::Transport("Not a Response".to_string()))
}

async fn response_text(response: &Response) -> String {
    match response.text() {
        Ok(promise) => wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Sends the request and returns the 2xx body text; non-2xx responses are
/// classified through [`protocol_error`].
async fn read_body(request: Request) -> Result<String, ApiError> {
    let response = send(request).await?;
    let text = response_text(&response).await;
    if !response.ok() {
        return Err(protocol_error(
            response.status(),
            &response.status_text(),
            &text,
        ));
    }
    Ok(text)
}

async fn read_blob(request: Request) -> Result<Blob, ApiError> {
    let response = send(request).await?;
    if !response.ok() {
        let text = response_text(&response).await;
        return Err(protocol_error(
            response.status(),
            &response.status_text(),
            &text,
        ));
    }
    let blob_value =
        wasm_bindgen_futures::JsFuture::from(response.blob().map_err(transport)?)
            .await
            .map_err(transport)?;
    blob_value
        .dyn_into()
        .map_err(|_| ApiError::Transport("Not a Blob".to_string()))
}

/// Uploads the file with the enabled rules and returns the per-sheet
/// validation report.
pub async fn validate(
    file: &web_sys::File,
    rules: &RuleSelection,
) -> Result<UploadResponse, ApiError> {
    let query = rules.to_query();
    let url = if query.is_empty() {
        api_url("/upload")
    } else {
        format!("{}?rules={}", api_url("/upload"), urlencoding::encode(&query))
    };
    let form = FormData::new().map_err(transport)?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(transport)?;
    let body = read_body(post_form(&url, &form)?).await?;
    decode_checked(&body)
}

/// Applies the selected fixes on the backend. The target sheet must already
/// be resolved by the caller.
pub async fn bulk_fix(selection: &FixSelection) -> Result<BulkFixOutcome, ApiError> {
    let form = FormData::new().map_err(transport)?;
    form.append_with_str("fixes", &selection.to_form_value())
        .map_err(transport)?;
    if let Some(sheet) = &selection.sheet {
        form.append_with_str("sheet", sheet).map_err(transport)?;
    }
    let body = read_body(post_form(&api_url("/bulk-fix"), &form)?).await?;
    decode_checked(&body)
}

/// Dry run: what the selected fixes would change, without mutating anything.
pub async fn preview_fixes(
    request: &FixPreviewRequest,
) -> Result<FixPreviewResponse, ApiError> {
    let body = read_body(post_json(&api_url("/bulk-fix-preview"), request)?).await?;
    decode_checked(&body)
}

/// Generates the financial summary report and returns it as a blob.
pub async fn financial_report(request: &ReportRequest) -> Result<Blob, ApiError> {
    read_blob(post_json(&api_url("/financial-report"), request)?).await
}

/// Downloads one sheet as CSV, or every sheet as a zip archive when no sheet
/// is given.
pub async fn download_csv(sheet: Option<&str>) -> Result<Blob, ApiError> {
    let url = match sheet {
        Some(s) => format!("{}?sheet={}", api_url("/download-csv"), urlencoding::encode(s)),
        None => api_url("/download-csv"),
    };
    read_blob(get(&url)?).await
}

pub async fn send_email(request: &EmailRequest) -> Result<EmailResponse, ApiError> {
    let body = read_body(post_json(&api_url("/send-email"), request)?).await?;
    decode_json(&body)
}

/// Fire-and-forget feedback; the response body is not interpreted.
pub async fn send_feedback(request: &FeedbackRequest) -> Result<(), ApiError> {
    read_body(post_json(&api_url("/feedback"), request)?).await?;
    Ok(())
}
