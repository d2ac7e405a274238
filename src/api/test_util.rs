use axum::body;
use serde::de::DeserializeOwned;

/// Reads an HTTP response body to completion and parses it as JSON, panicking
/// with the offending payload if either step fails.
pub async fn deserialize_body<T: DeserializeOwned>(response_body: body::Body) -> T {
    let bytes = body::to_bytes(response_body, usize::MAX)
        .await
        .expect("failed to read the response body");

    serde_json::from_slice(&bytes).unwrap_or_else(|err| {
        panic!("response body did not match the expected shape: {err}, body was {bytes:?}")
    })
}
