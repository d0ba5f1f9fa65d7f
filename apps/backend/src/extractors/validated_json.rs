use std::ops::{Deref, DerefMut};

use actix_web::dev::Payload;
use actix_web::web::BytesMut;
use actix_web::{FromRequest, HttpRequest};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::web::trace_ctx;

/// Largest request body accepted; actions and joins are tiny.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// JSON body whose parse failures render as problem details with
/// `VALIDATION_FAILED` instead of actix's plain-text 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let mut payload = payload.take();

        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        Box::pin(async move {
            let trace_id = trace_ctx::trace_id();

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    warn!(%trace_id, error = %e, "failed to read request body");
                    AppError::bad_request(ErrorCode::BadRequest, "Failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            let parsed = serde_json::from_slice::<T>(&body).map_err(|e| {
                let detail = classify_json_error(&e);

                debug!(
                    %trace_id,
                    error = %Redacted(&e.to_string()),
                    %content_type,
                    body_size = body.len(),
                    "json body rejected"
                );
                AppError::invalid(ErrorCode::ValidationFailed, detail)
            })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Client-facing message that never echoes body content.
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            let line = error.line();
            format!("Invalid JSON at line {line}")
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use serde::Deserialize;

    use super::*;
    use crate::domain::actions::PlayerAction;

    #[derive(Debug, Deserialize)]
    struct JoinBody {
        display_name: String,
    }

    #[test]
    fn classification_never_echoes_input() {
        let err = serde_json::from_str::<JoinBody>(r#"{"display_name": 7}"#).unwrap_err();
        let detail = classify_json_error(&err);
        assert!(detail.contains("wrong types"));
        assert!(!detail.contains('7'));

        let err = serde_json::from_str::<JoinBody>(r#"{"display_name": "x""#).unwrap_err();
        assert!(classify_json_error(&err).contains("unexpected end"));
    }

    #[actix_web::test]
    async fn parses_an_action_body() {
        let (req, mut payload) = TestRequest::post()
            .insert_header(("content-type", "application/json"))
            .set_payload(r#"{"type":"PlaceBet","payload":{"spot":1,"amount":50}}"#)
            .to_http_parts();
        let parsed = ValidatedJson::<PlayerAction>::from_request(&req, &mut payload)
            .await
            .unwrap();
        assert_eq!(parsed.into_inner(), PlayerAction::PlaceBet { spot: 1, amount: 50 });
    }

    #[actix_web::test]
    async fn malformed_body_is_a_validation_failure() {
        let (req, mut payload) = TestRequest::post()
            .set_payload(r#"{"type":"PlaceBet","payload":{"spot":"one"}}"#)
            .to_http_parts();
        let err = ValidatedJson::<PlayerAction>::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[actix_web::test]
    async fn oversized_body_is_rejected() {
        let big = format!(r#"{{"display_name":"{}"}}"#, "a".repeat(MAX_BODY_BYTES));
        let (req, mut payload) = TestRequest::post().set_payload(big).to_http_parts();
        let err = ValidatedJson::<JoinBody>::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
    }
}
