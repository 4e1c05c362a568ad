//! Single-shot JSON request helper.
//!
//! Requests are sent exactly once. A failed fetch is retried by the user
//! submitting again, never automatically.

use crate::FetchError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends `request` and parses the response body as JSON.
///
/// The body is read as text first so that a parse failure can be logged
/// with the actual response content.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the request or body read fails,
/// [`FetchError::Status`] for non-2xx responses, and [`FetchError::Json`]
/// if the body is not valid JSON.
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, FetchError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if !status.is_success() {
        log::warn!("HTTP {status} from {url}");
        return Err(FetchError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|json_err| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        FetchError::Json(json_err)
    })
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] bytes on a char boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
