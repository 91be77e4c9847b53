/// Response envelope classification.
///
/// The Lytics API signals success inconsistently across endpoints: some answer
/// with a numeric `status` and a `message` of "success", "created" or "updated",
/// some with `status: "success"`, some with HTTP 204, and "not found" sometimes
/// arrives as a 200 whose message is "Not Found". [`normalize`] folds all of it
/// into a single [`Outcome`].
use reqwest::StatusCode;
use serde_json::Value;

/// Pulls the payload out of an envelope for endpoints that do not use `data`.
pub type Extractor = fn(&Value) -> Value;

/// Classification of one completed request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The call succeeded; holds the extracted payload.
    Success(Value),
    /// HTTP 204 without a body.
    Empty,
    /// A successful envelope whose message is "Not Found".
    NotFound,
    /// The call failed; holds the envelope (or the raw body as a JSON string).
    Failure(Value),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

const MESSAGE_NOT_FOUND: &str = "Not Found";
const SUCCESS_MESSAGES: &[&str] = &["success", "created", "updated", ""];

/// Classify an HTTP status and raw body.
///
/// The payload of a successful envelope is `extractor(body)` when an extractor is
/// given, otherwise the `data` field (JSON null when absent).
pub fn normalize(status: StatusCode, body: &str, extractor: Option<Extractor>) -> Outcome {
    if status == StatusCode::NO_CONTENT && body.trim().is_empty() {
        return Outcome::Empty;
    }

    let envelope: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return Outcome::Failure(Value::String(body.to_string())),
    };

    match envelope.get("status") {
        Some(Value::Number(n)) if matches!(n.as_u64(), Some(200) | Some(201)) => {
            match envelope.get("message").and_then(|m| m.as_str()) {
                Some(MESSAGE_NOT_FOUND) => Outcome::NotFound,
                Some(m) if SUCCESS_MESSAGES.contains(&m) => {
                    Outcome::Success(extract(&envelope, extractor))
                }
                _ => Outcome::Failure(envelope),
            }
        }
        Some(Value::String(s)) if s == "success" => {
            Outcome::Success(extract(&envelope, extractor))
        }
        _ => Outcome::Failure(envelope),
    }
}

fn extract(envelope: &Value, extractor: Option<Extractor>) -> Value {
    match extractor {
        Some(f) => f(envelope),
        None => envelope.get("data").cloned().unwrap_or(Value::Null),
    }
}

/// Extractor returning the whole envelope, for endpoints that inline the payload.
pub fn whole_envelope(envelope: &Value) -> Value {
    envelope.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> String {
        v.to_string()
    }

    #[test]
    fn created_and_updated_count_as_success() {
        for message in ["created", "updated", ""] {
            let outcome = normalize(
                StatusCode::OK,
                &body(json!({"status": 201, "message": message, "data": [1]})),
                None,
            );
            assert_eq!(outcome, Outcome::Success(json!([1])), "message={message:?}");
        }
    }

    #[test]
    fn numeric_status_requires_a_message() {
        let outcome = normalize(StatusCode::OK, &body(json!({"status": 200, "data": 1})), None);
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[test]
    fn string_status_200_is_not_success() {
        let outcome = normalize(
            StatusCode::OK,
            &body(json!({"status": "200", "message": "success", "data": 1})),
            None,
        );
        assert!(matches!(outcome, Outcome::Failure(_)));
    }

    #[test]
    fn extractor_replaces_data_lookup() {
        fn topics(v: &Value) -> Value {
            v.get("topics").cloned().unwrap_or(Value::Null)
        }
        let outcome = normalize(
            StatusCode::OK,
            &body(json!({"status": "success", "topics": {"rust": 0.9}})),
            Some(topics),
        );
        assert_eq!(outcome, Outcome::Success(json!({"rust": 0.9})));
    }

    #[test]
    fn no_content_with_a_body_is_decoded() {
        let outcome = normalize(
            StatusCode::NO_CONTENT,
            &body(json!({"status": 200, "message": "success", "data": true})),
            None,
        );
        assert_eq!(outcome, Outcome::Success(json!(true)));
    }

    #[test]
    fn not_found_is_distinct_from_no_content() {
        let outcome = normalize(
            StatusCode::CREATED,
            &body(json!({"status": 201, "message": "Not Found", "data": {"id": "x"}})),
            None,
        );
        assert_eq!(outcome, Outcome::NotFound);
        assert_ne!(outcome, normalize(StatusCode::NO_CONTENT, "", None));
    }

    #[test]
    fn malformed_body_is_failure_with_raw_text() {
        let outcome = normalize(StatusCode::OK, "<html>gateway</html>", None);
        assert_eq!(outcome, Outcome::Failure(json!("<html>gateway</html>")));
    }

    #[test]
    fn empty_body_on_ok_is_failure() {
        assert!(matches!(
            normalize(StatusCode::OK, "", None),
            Outcome::Failure(_)
        ));
    }
}
