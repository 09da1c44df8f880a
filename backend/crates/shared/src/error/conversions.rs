//! Conversions into [`AppError`], and the HTTP problem response

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_syntax() || err.is_data() || err.is_eof() {
            ErrorKind::BadRequest
        } else {
            ErrorKind::InternalServerError
        };
        AppError::new(kind, format!("Invalid JSON: {err}")).with_source(err)
    }
}

/// RFC 7807 problem body
#[cfg(feature = "axum")]
#[derive(serde::Serialize)]
struct Problem<'a> {
    title: &'static str,
    status: u16,
    detail: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let problem = Problem {
            title: self.kind().title(),
            status: status.as_u16(),
            detail: self.message(),
            action: self.action(),
        };

        match serde_json::to_vec(&problem) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "application/problem+json")],
                body,
            )
                .into_response(),
            Err(_) => status.into_response(),
        }
    }
}
