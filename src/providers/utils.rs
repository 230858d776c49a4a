use axum::body::Bytes;
use reqwest::RequestBuilder;
use serde::de::IgnoredAny;

use crate::error::Fault;

/// Sends one upstream request and returns its body untouched.
///
/// A non-success status becomes `Fault::Upstream` carrying the raw body. A
/// success body that is not JSON becomes `Fault::Decode`.
pub async fn send_json(request: RequestBuilder) -> Result<Bytes, Fault> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(Fault::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice::<IgnoredAny>(&body)?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_success_body_is_returned_verbatim() {
        let server = MockServer::start_async().await;
        let body = "{ \"z\": 1,\n  \"a\": [1, 2] }";
        server
            .mock_async(|when, then| {
                when.method(GET).path("/thing");
                then.status(200).header("content-type", "application/json").body(body);
            })
            .await;

        let client = reqwest::Client::new();
        let result = send_json(client.get(server.url("/thing"))).await.unwrap();
        assert_eq!(&result[..], body.as_bytes());
    }

    #[tokio::test]
    async fn test_error_status_keeps_raw_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/thing");
                then.status(401).body("bad key");
            })
            .await;

        let client = reqwest::Client::new();
        match send_json(client.get(server.url("/thing"))).await {
            Err(Fault::Upstream { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected upstream fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_decode_fault() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/thing");
                then.status(200).body("<html>oops</html>");
            })
            .await;

        let client = reqwest::Client::new();
        let result = send_json(client.get(server.url("/thing"))).await;
        assert!(matches!(result, Err(Fault::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_fault() {
        let client = reqwest::Client::new();
        let result = send_json(client.get("http://127.0.0.1:1/thing")).await;
        assert!(matches!(result, Err(Fault::Transport(_))));
    }
}
