use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::error::SdkError;

/// Error envelopes used by the two services (FastAPI `detail`, portal `message`)
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn extract_message(error_text: &str) -> String {
    let Ok(body) = serde_json::from_str::<ServiceErrorBody>(error_text) else {
        return error_text.to_string();
    };
    body.detail
        .map(|detail| match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        })
        .or(body.message)
        .or(body.error)
        .unwrap_or_else(|| error_text.to_string())
}

/// Classify a non-success response
pub(crate) async fn error_from_response(response: Response) -> SdkError {
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = extract_message(&error_text);

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            SdkError::invalid_request(message)
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SdkError::authentication(message),
        StatusCode::NOT_FOUND => SdkError::not_found(message),
        StatusCode::CONFLICT => SdkError::conflict(message),
        StatusCode::PAYLOAD_TOO_LARGE => SdkError::invalid_request("Request too large"),
        _ => SdkError::api_error(status.as_u16(), message),
    }
}

/// Decode a JSON body, or classify the failure
pub(crate) async fn json_or_error<T: DeserializeOwned>(response: Response) -> Result<T, SdkError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Read a binary body, or classify the failure
pub(crate) async fn bytes_or_error(response: Response) -> Result<Vec<u8>, SdkError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response.bytes().await?.to_vec())
}

/// Read a text body that may or may not be JSON, or classify the failure
pub(crate) async fn text_or_error(response: Response) -> Result<String, SdkError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_detail() {
        assert_eq!(
            extract_message(r#"{"detail": "The file must contain a 'query' column."}"#),
            "The file must contain a 'query' column."
        );
        assert_eq!(extract_message(r#"{"message": "already reviewed"}"#), "already reviewed");
        assert_eq!(extract_message(r#"{"error": "boom"}"#), "boom");
    }

    #[test]
    fn test_extract_message_falls_back_to_raw_text() {
        assert_eq!(extract_message("Internal Server Error"), "Internal Server Error");
        assert_eq!(extract_message(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }

    #[test]
    fn test_extract_message_structured_detail() {
        let message = extract_message(r#"{"detail": [{"loc": ["body", "query"]}]}"#);
        assert!(message.contains("query"));
    }
}
