//! Mapping of HTTP failures onto a closed set of error kinds.
//!
//! Blocktrail reports failures through the status code and, sometimes, a JSON
//! body shaped like `{"msg": "...", "code": 5}`. The body is untrusted: it may
//! be missing, not an object, or lack either field. Every lookup here is
//! optional, and an absent or `null` field is treated as not present.

use std::fmt;

use serde_json::Value;

pub const INVALID_CREDENTIALS: &str = "Your credentials are incorrect.";
pub const GENERIC_HTTP_ERROR: &str = "An HTTP Error has occurred!";
pub const GENERIC_SERVER_ERROR: &str = "A Server Error has occurred!";
pub const UNKNOWN_ENDPOINT_SPECIFIC_ERROR: &str = "The endpoint returned an unknown error.";
pub const MISSING_ENDPOINT: &str =
    "The endpoint you've tried to access does not exist. Check your URL.";
pub const OBJECT_NOT_FOUND: &str = "The object you've tried to access does not exist.";

/// The `msg` a 404 carries when the route itself does not exist.
const ENDPOINT_NOT_FOUND_MSG: &str = "Endpoint Not Found";

/// Placeholder used when a generic failure has no `msg`.
const NOTHING: &str = "*nothing*";

/// Category of a failed API request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401: the API key was rejected.
    InvalidCredentials,
    /// 400/403 with a `msg` from the endpoint.
    EndpointSpecificError,
    /// 400/403 without a usable `msg`.
    UnknownEndpointSpecificError,
    /// 404 because the route does not exist.
    MissingEndpoint,
    /// 404 because the addressed object does not exist.
    ObjectNotFound,
    /// 500.
    GenericServerError,
    /// Any other non-success status.
    GenericHttpError,
}

impl ErrorKind {
    /// Snake-case name of the kind, also its `Display` form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::EndpointSpecificError => "endpoint_specific_error",
            Self::UnknownEndpointSpecificError => "unknown_endpoint_specific_error",
            Self::MissingEndpoint => "missing_endpoint",
            Self::ObjectNotFound => "object_not_found",
            Self::GenericServerError => "generic_server_error",
            Self::GenericHttpError => "generic_http_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified API failure.
///
/// # Example
///
/// ```
/// use blocktrail_client::classify::{classify_failure, ErrorKind};
/// use serde_json::json;
///
/// let body = json!({"msg": "bad address", "code": 5});
/// let err = classify_failure(400, Some(&body));
/// assert_eq!(err.kind, ErrorKind::EndpointSpecificError);
/// assert_eq!(err.message, "bad address");
/// assert_eq!(err.code.as_deref(), Some("5"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// Endpoint-specific error code, stringified. Only set for
    /// [`ErrorKind::EndpointSpecificError`].
    pub code: Option<String>,
    pub http_status: u16,
}

impl ApiError {
    pub fn is_invalid_credentials(&self) -> bool {
        self.kind == ErrorKind::InvalidCredentials
    }

    /// Returns `true` for both endpoint-specific kinds (400/403).
    pub fn is_endpoint_specific(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EndpointSpecificError | ErrorKind::UnknownEndpointSpecificError
        )
    }

    pub fn is_missing_endpoint(&self) -> bool {
        self.kind == ErrorKind::MissingEndpoint
    }

    pub fn is_object_not_found(&self) -> bool {
        self.kind == ErrorKind::ObjectNotFound
    }

    pub fn is_server_error(&self) -> bool {
        self.kind == ErrorKind::GenericServerError
    }
}

/// Result of classifying a raw response.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseOutcome {
    Success(Value),
    Failure(ApiError),
}

impl ResponseOutcome {
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(error) => Err(error),
        }
    }
}

/// Classify a raw response. Statuses 200–299 pass the body through untouched
/// (`null` when absent); anything else goes through [`classify_failure`].
pub fn classify(status: u16, body: Option<Value>) -> ResponseOutcome {
    if (200..300).contains(&status) {
        ResponseOutcome::Success(body.unwrap_or(Value::Null))
    } else {
        ResponseOutcome::Failure(classify_failure(status, body.as_ref()))
    }
}

/// Classify a failed response. Total over every status and body.
pub fn classify_failure(status: u16, body: Option<&Value>) -> ApiError {
    let msg = field(body, "msg");

    let (kind, message, code) = match status {
        400 | 403 => match msg {
            Some(msg) => (
                ErrorKind::EndpointSpecificError,
                render(msg),
                field(body, "code").map(render),
            ),
            None => (
                ErrorKind::UnknownEndpointSpecificError,
                UNKNOWN_ENDPOINT_SPECIFIC_ERROR.to_owned(),
                None,
            ),
        },
        401 => (
            ErrorKind::InvalidCredentials,
            INVALID_CREDENTIALS.to_owned(),
            None,
        ),
        404 if msg.and_then(Value::as_str) == Some(ENDPOINT_NOT_FOUND_MSG) => {
            (ErrorKind::MissingEndpoint, MISSING_ENDPOINT.to_owned(), None)
        }
        404 => (ErrorKind::ObjectNotFound, OBJECT_NOT_FOUND.to_owned(), None),
        500 => (
            ErrorKind::GenericServerError,
            format!("{GENERIC_SERVER_ERROR} {}", detail(msg)),
            None,
        ),
        _ => (
            ErrorKind::GenericHttpError,
            format!("{GENERIC_HTTP_ERROR} {}", detail(msg)),
            None,
        ),
    };

    ApiError {
        kind,
        message,
        code,
        http_status: status,
    }
}

fn field<'a>(body: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    body.and_then(|body| body.get(name))
        .filter(|value| !value.is_null())
}

/// Strings as-is, anything else JSON-encoded.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn detail(msg: Option<&Value>) -> String {
    msg.map_or_else(|| NOTHING.to_owned(), render)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(401, json!({}), ErrorKind::InvalidCredentials)]
    #[case(401, json!({"msg": "nope"}), ErrorKind::InvalidCredentials)]
    #[case(400, json!({"msg": "bad address", "code": 5}), ErrorKind::EndpointSpecificError)]
    #[case(403, json!({"msg": "forbidden"}), ErrorKind::EndpointSpecificError)]
    #[case(400, json!({}), ErrorKind::UnknownEndpointSpecificError)]
    #[case(403, json!({"code": 7}), ErrorKind::UnknownEndpointSpecificError)]
    #[case(400, json!({"msg": null}), ErrorKind::UnknownEndpointSpecificError)]
    #[case(404, json!({"msg": "Endpoint Not Found"}), ErrorKind::MissingEndpoint)]
    #[case(404, json!({"msg": "no such tx"}), ErrorKind::ObjectNotFound)]
    #[case(404, json!({"msg": "endpoint not found"}), ErrorKind::ObjectNotFound)]
    #[case(404, json!({}), ErrorKind::ObjectNotFound)]
    #[case(500, json!({"msg": "db down"}), ErrorKind::GenericServerError)]
    #[case(500, json!({}), ErrorKind::GenericServerError)]
    #[case(418, json!({}), ErrorKind::GenericHttpError)]
    #[case(502, json!({"msg": "bad gateway"}), ErrorKind::GenericHttpError)]
    #[case(302, json!({}), ErrorKind::GenericHttpError)]
    fn status_and_body_pick_the_kind(
        #[case] status: u16,
        #[case] body: Value,
        #[case] expected: ErrorKind,
    ) {
        let error = classify_failure(status, Some(&body));
        assert_eq!(error.kind, expected);
        assert_eq!(error.http_status, status);
    }

    #[test]
    fn endpoint_specific_error_carries_msg_and_code() {
        let error = classify_failure(400, Some(&json!({"msg": "bad address", "code": 5})));
        assert_eq!(error.message, "bad address");
        assert_eq!(error.code.as_deref(), Some("5"));

        let error = classify_failure(403, Some(&json!({"msg": "x", "code": "E_LIMIT"})));
        assert_eq!(error.code.as_deref(), Some("E_LIMIT"));
    }

    #[test]
    fn structured_msg_is_json_encoded() {
        let error = classify_failure(400, Some(&json!({"msg": {"field": "limit"}})));
        assert_eq!(error.kind, ErrorKind::EndpointSpecificError);
        assert_eq!(error.message, r#"{"field":"limit"}"#);
        assert_eq!(error.code, None);
    }

    #[test]
    fn generic_errors_append_msg_or_placeholder() {
        let error = classify_failure(500, Some(&json!({"msg": "db down"})));
        assert_eq!(error.message, "A Server Error has occurred! db down");

        let error = classify_failure(500, Some(&json!({})));
        assert!(error.message.contains("*nothing*"));

        let error = classify_failure(418, None);
        assert_eq!(error.message, "An HTTP Error has occurred! *nothing*");
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(classify_failure(401, None).message, INVALID_CREDENTIALS);
        assert_eq!(classify_failure(400, None).message, UNKNOWN_ENDPOINT_SPECIFIC_ERROR);
        assert_eq!(
            classify_failure(404, Some(&json!({"msg": "Endpoint Not Found"}))).message,
            MISSING_ENDPOINT
        );
        assert_eq!(classify_failure(404, None).message, OBJECT_NOT_FOUND);
    }

    #[test]
    fn non_object_bodies_take_the_fallback_branch() {
        for body in [json!("Endpoint Not Found"), json!([1, 2]), json!(42), Value::Null] {
            assert_eq!(classify_failure(404, Some(&body)).kind, ErrorKind::ObjectNotFound);
            assert_eq!(
                classify_failure(400, Some(&body)).kind,
                ErrorKind::UnknownEndpointSpecificError
            );
        }
        assert_eq!(classify_failure(404, None).kind, ErrorKind::ObjectNotFound);
    }

    #[test]
    fn success_statuses_pass_the_body_through() {
        let body = json!({"hash": "00ab", "height": 1});
        assert_eq!(
            classify(200, Some(body.clone())),
            ResponseOutcome::Success(body)
        );
        assert_eq!(classify(204, None), ResponseOutcome::Success(Value::Null));
    }

    #[test]
    fn classify_wraps_failures() {
        let outcome = classify(401, Some(json!({})));
        let error = outcome.into_result().unwrap_err();
        assert!(error.is_invalid_credentials());
    }

    #[test]
    fn classification_is_deterministic() {
        let body = json!({"msg": "db down"});
        assert_eq!(classify(500, Some(body.clone())), classify(500, Some(body)));
    }

    #[test]
    fn predicates_match_kinds() {
        assert!(classify_failure(400, None).is_endpoint_specific());
        assert!(classify_failure(404, None).is_object_not_found());
        assert!(
            classify_failure(404, Some(&json!({"msg": "Endpoint Not Found"}))).is_missing_endpoint()
        );
        assert!(classify_failure(500, None).is_server_error());
        assert!(!classify_failure(503, None).is_server_error());
    }

    #[test]
    fn kind_names_are_snake_case() {
        assert_eq!(ErrorKind::MissingEndpoint.as_str(), "missing_endpoint");
        assert_eq!(
            ErrorKind::UnknownEndpointSpecificError.to_string(),
            "unknown_endpoint_specific_error"
        );
    }
}
