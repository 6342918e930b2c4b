//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value.
//! Malformed JSON is answered with 400. Well-formed JSON of the wrong shape
//! (missing or mistyped fields) and `validator` failures are answered with
//! 422 and the first offending field.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::{error_code, ErrorBody};

/// An extractor that deserializes JSON and validates it.
///
/// ```ignore
/// async fn handler(ValidatedJson(body): ValidatedJson<CreatePosRequest>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    JsonError(JsonRejection),
    ValidationError(validator::ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(JsonRejection::JsonDataError(rejection)) => {
                let detail = rejection.body_text();
                let mut body = ErrorBody::new(error_code::VALIDATION_FAILED, detail.clone());
                if let Some(field) = rejected_field(&detail) {
                    body = body.with_field(field);
                }
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            Self::JsonError(rejection) => {
                let body = ErrorBody::new(
                    error_code::INVALID_JSON,
                    format!("Invalid JSON: {}", rejection.body_text()),
                );
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::ValidationError(errors) => {
                let mut field_errors: Vec<(String, String)> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            let msg = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            (field.to_string(), msg)
                        })
                    })
                    .collect();
                field_errors.sort();

                let message = if field_errors.is_empty() {
                    "Validation failed".to_string()
                } else {
                    field_errors
                        .iter()
                        .map(|(field, msg)| format!("{}: {}", field, msg))
                        .collect::<Vec<_>>()
                        .join("; ")
                };

                let mut body = ErrorBody::new(error_code::VALIDATION_FAILED, message);
                if let Some((field, _)) = field_errors.first() {
                    body = body.with_field(field.clone());
                }
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

/// Field path of a deserialization error, e.g. `postalCode` from
/// `"Failed to deserialize ...: postalCode: invalid type: ..."` or `name`
/// from `"missing field `name`"`.
fn rejected_field(detail: &str) -> Option<String> {
    let detail = detail
        .split_once("target type: ")
        .map_or(detail, |(_, rest)| rest);
    if let Some((path, _)) = detail.split_once(": ") {
        let is_path = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
        if is_path {
            return Some(path.to_string());
        }
    }
    let (_, rest) = detail.split_once("missing field `")?;
    rest.split_once('`').map(|(name, _)| name.to_string())
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct TestBody {
        #[validate(length(min = 1, max = 10))]
        name: String,
        #[serde(default)]
        postal_code: Option<i64>,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let resp = app().oneshot(json_request(r#"{"name": "Mensa"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_json_returns_400() {
        let resp = app().oneshot(json_request("not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_failure_returns_422_with_field() {
        let resp = app().oneshot(json_request(r#"{"name": ""}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.field.as_deref(), Some("name"));
    }

    async fn error_body(resp: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn truncated_json_stays_400() {
        let resp = app().oneshot(json_request(r#"{"name": "#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(resp).await.code, error_code::INVALID_JSON);
    }

    #[tokio::test]
    async fn missing_field_returns_422_with_field() {
        let resp = app().oneshot(json_request("{}")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = error_body(resp).await;
        assert_eq!(body.code, error_code::VALIDATION_FAILED);
        assert_eq!(body.field.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn mistyped_field_returns_422_with_field() {
        let resp = app()
            .oneshot(json_request(r#"{"name": "Mensa", "postalCode": "69117"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_body(resp).await.field.as_deref(), Some("postalCode"));
    }

    #[test]
    fn rejected_field_reads_path_or_missing_name() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: \
                 postalCode: invalid type: string \"x\", expected i64 at line 1 column 20"
            )
            .as_deref(),
            Some("postalCode")
        );
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: \
                 missing field `name` at line 1 column 2"
            )
            .as_deref(),
            Some("name")
        );
        assert_eq!(rejected_field("invalid type: map, expected a string"), None);
    }
}
