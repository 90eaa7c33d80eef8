//! Invitation endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use invite_core::{EventRecord, ResponseBuffer, download};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invites", post(create_invite))
        .route("/invites/validate", post(validate_invite))
        .route("/health", get(health))
}

#[derive(Deserialize)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}

/// Result of validating a property map
#[derive(Serialize)]
pub struct ValidationResponse {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// POST /invites - Render a property map as an .ics download
async fn create_invite(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
    Json(properties): Json<Map<String, Value>>,
) -> Result<Response, AppError> {
    let event = EventRecord::from_properties(properties)?;

    let filename: String = query
        .filename
        .unwrap_or_else(|| state.config().default_filename.clone())
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    let mut buffer = ResponseBuffer::new();
    download(&event, Some(&filename), &mut buffer)?;

    tracing::info!(uid = event.uid(), %filename, "served invitation");
    into_response(buffer)
}

/// POST /invites/validate - Report validation errors without rendering
async fn validate_invite(
    Json(properties): Json<Map<String, Value>>,
) -> Result<Json<ValidationResponse>, AppError> {
    let event = EventRecord::from_properties(properties)?;
    let errors = event.validate();

    Ok(Json(ValidationResponse {
        valid: errors.is_empty(),
        errors,
    }))
}

/// GET /health
async fn health() -> &'static str {
    "ok"
}

fn into_response(buffer: ResponseBuffer) -> Result<Response, AppError> {
    let (headers, body) = buffer.into_parts();

    let mut response = (StatusCode::OK, body).into_response();
    let map = response.headers_mut();
    // The buffer holds the complete header set.
    map.clear();
    for (name, value) in headers {
        map.append(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_bytes(value.as_bytes())?,
        );
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use invite_core::InviteConfig;
    use tower::ServiceExt;

    fn app() -> Router {
        router().with_state(AppState::new(InviteConfig::default()))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const VALID: &str = r#"{
        "summary": "Review",
        "start": "2024-01-15T09:30:00Z",
        "end": "2024-01-15T10:30:00Z",
        "organiser": { "name": "Olivia", "email": "olivia@example.com" }
    }"#;

    #[tokio::test]
    async fn create_returns_ics_download() {
        let response = app()
            .oneshot(post_json("/invites?filename=review.ics", VALID))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/calendar;charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"review.ics\""
        );
        let cache_control: Vec<_> = headers.get_all(header::CACHE_CONTROL).iter().collect();
        assert_eq!(cache_control.len(), 2);

        let length: usize = headers[header::CONTENT_LENGTH].to_str().unwrap().parse().unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), length);

        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(text.contains("DTSTART:20240115T093000Z\r\n"));
        assert!(text.contains("ORGANIZER;CN=\"Olivia\":mailto:olivia@example.com\r\n"));
    }

    #[tokio::test]
    async fn create_uses_configured_filename() {
        let response = app().oneshot(post_json("/invites", VALID)).await.unwrap();

        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"invite.ics\""
        );
    }

    #[tokio::test]
    async fn invalid_event_is_unprocessable() {
        let response = app()
            .oneshot(post_json("/invites", r#"{ "start": "2024-01-15T09:30:00Z" }"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        let error = json["error"].as_str().unwrap();
        assert!(error.contains("Summary is required"));
        assert!(error.contains("Date end is required"));
    }

    #[tokio::test]
    async fn bad_date_is_unprocessable() {
        let response = app()
            .oneshot(post_json("/invites", r#"{ "summary": "x", "start": "soon" }"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn validate_reports_errors() {
        let response = app()
            .oneshot(post_json(
                "/invites/validate",
                r#"{ "summary": "x", "start": "2024-01-15T10:00:00Z", "end": "2024-01-15T09:00:00Z" }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "valid": false,
                "errors": ["Date end must be after date start."]
            })
        );
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
