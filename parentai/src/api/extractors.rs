use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ParentAiError;

/// `Json` whose rejections use the v1 error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ParentAiError))]
pub struct AppJson<T>(pub T);

/// `Query` whose rejections use the v1 error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ParentAiError))]
pub struct AppQuery<T>(pub T);

impl From<JsonRejection> for ParentAiError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<QueryRejection> for ParentAiError {
    fn from(rejection: QueryRejection) -> Self {
        ParentAiError::Validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

fn map_json_rejection(rejection: JsonRejection) -> ParentAiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                ParentAiError::Validation(format!("Missing required field: {field}"))
            } else {
                ParentAiError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            ParentAiError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => ParentAiError::Validation(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(_) => {
            ParentAiError::Validation("Failed to read request body".to_string())
        }
        _ => ParentAiError::Validation(rejection.body_text()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_extracted() {
        let message = "Failed to deserialize the JSON body into the target type: missing field `question` at line 1 column 2";
        assert_eq!(extract_missing_field(message), Some("question"));
        assert_eq!(extract_missing_field("expected value"), None);
    }
}
