use axum::{extract::State, http::HeaderMap, Json};

use common::types::Ack;
use service::contact::ContactForm;

use crate::errors::JsonApiError;
use crate::state::AppState;

/// Rate-limit key: first `x-forwarded-for` hop, then `x-real-ip`, else `unknown`.
pub fn client_id(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
            .filter(|v| !v.is_empty())
    };
    header("x-forwarded-for")
        .or_else(|| header("x-real-ip"))
        .unwrap_or_else(|| "unknown".to_string())
}

#[utoipa::path(post, path = "/api/contact", tag = "contact", request_body = crate::openapi::ContactRequest, responses((status = 200, description = "Sent", body = crate::openapi::AckDoc), (status = 400, description = "Validation failed"), (status = 429, description = "Too many requests")))]
pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Result<Json<Ack>, JsonApiError> {
    state.contact.submit(&client_id(&headers), form).await?;
    Ok(Json(Ack::ok("Message sent successfully! We'll get back to you within 24 hours.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_id(&headers), "unknown");
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_id(&headers), "10.0.0.2");
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_id(&headers), "203.0.113.7");
    }
}
