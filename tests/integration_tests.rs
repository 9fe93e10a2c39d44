//! Integration tests for the gemchat library.
//!
//! The client tests run against a one-shot HTTP server on localhost.  The
//! live test requires an API key in the environment and is skipped without
//! one.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use gemchat::chat::{ChatStore, FALLBACK_MESSAGE, Origin, SendOutcome, TurnStatus};
    use gemchat::{
        ClientLogger, Completer, Error, FileStore, GenerateContentRequest, GenerateContentResponse,
        Gemini, KnownModel, Model,
    };

    /// Logger that remembers every call it sees.
    #[derive(Default)]
    struct RecordingLogger {
        events: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ClientLogger for RecordingLogger {
        fn log_request(&self, request: &GenerateContentRequest) {
            let prompt = request.contents[0].joined_text();
            self.events.lock().unwrap().push(format!("request: {prompt}"));
        }

        fn log_response(&self, response: &GenerateContentResponse) {
            let text = response.text().unwrap_or_default();
            self.events.lock().unwrap().push(format!("response: {text}"));
        }

        fn log_error(&self, error: &Error) {
            let status = error.status_code().unwrap_or_default();
            self.events.lock().unwrap().push(format!("error: {status}"));
        }
    }

    /// A request as seen by the mock server.
    struct Captured {
        head: String,
        body: serde_json::Value,
    }

    /// Serves exactly one request with `status` and `body`, then hangs up.
    async fn serve_once(status: &'static str, body: String) -> (String, oneshot::Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending the body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body =
                serde_json::from_slice(&buf[header_end..header_end + content_length])
                    .unwrap_or(serde_json::Value::Null);

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            let _ = tx.send(Captured {
                head,
                body: request_body,
            });
        });
        (format!("http://{addr}/v1beta"), rx)
    }

    fn client(base_url: String) -> Gemini {
        Gemini::with_options(
            Some("test-key".to_string()),
            Some(base_url),
            Some(Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn completion_from_mock_server() {
        let body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "React is a **library**."}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 5, "totalTokenCount": 9}
        })
        .to_string();
        let (base_url, captured) = serve_once("200 OK", body).await;

        let text = client(base_url).complete("What is React?").await.unwrap();
        assert_eq!(text, "React is a **library**.");

        let captured = captured.await.unwrap();
        assert!(
            captured
                .head
                .starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent ")
        );
        assert!(captured.head.to_lowercase().contains("x-goog-api-key: test-key"));
        assert_eq!(
            captured.body["contents"][0]["parts"][0]["text"],
            "What is React?"
        );
        assert_eq!(captured.body["contents"][0]["role"], "user");
        assert_eq!(captured.body["generationConfig"]["topK"], 40);
        assert_eq!(captured.body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[tokio::test]
    async fn custom_model_in_path() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        })
        .to_string();
        let (base_url, captured) = serve_once("200 OK", body).await;

        let text = client(base_url)
            .with_model(Model::Known(KnownModel::Gemini15Pro))
            .complete("hi")
            .await
            .unwrap();
        assert_eq!(text, "ok");
        let captured = captured.await.unwrap();
        assert!(
            captured
                .head
                .starts_with("POST /v1beta/models/gemini-1.5-pro:generateContent ")
        );
    }

    #[tokio::test]
    async fn error_status_maps_to_api_error() {
        let body = serde_json::json!({
            "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
        })
        .to_string();
        let (base_url, _captured) = serve_once("400 Bad Request", body).await;

        let err = client(base_url).complete("hi").await.unwrap_err();
        assert!(err.is_upstream());
        assert_eq!(err.status_code(), Some(400));
        match err {
            Error::Api {
                status, message, ..
            } => {
                assert_eq!(status.as_deref(), Some("INVALID_ARGUMENT"));
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected an API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blocked_prompt_maps_to_empty_response() {
        let body = serde_json::json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        })
        .to_string();
        let (base_url, _captured) = serve_once("200 OK", body).await;

        let err = client(base_url).complete("hi").await.unwrap_err();
        assert!(err.is_upstream());
        match err {
            Error::EmptyResponse { finish_reason, .. } => {
                assert_eq!(finish_reason.as_deref(), Some("SAFETY"));
            }
            other => panic!("expected an empty response error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn logger_sees_request_and_response() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        })
        .to_string();
        let (base_url, _captured) = serve_once("200 OK", body).await;
        let logger = Arc::new(RecordingLogger::default());

        let text = client(base_url)
            .with_logger(logger.clone())
            .complete("hi")
            .await
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(logger.events(), vec!["request: hi", "response: hello"]);
    }

    #[tokio::test]
    async fn logger_sees_error_status() {
        let body = serde_json::json!({
            "error": {"code": 400, "message": "bad", "status": "INVALID_ARGUMENT"}
        })
        .to_string();
        let (base_url, _captured) = serve_once("400 Bad Request", body).await;
        let logger = Arc::new(RecordingLogger::default());

        let err = client(base_url)
            .with_logger(logger.clone())
            .complete("hi")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(logger.events(), vec!["request: hi", "error: 400"]);
    }

    #[tokio::test]
    async fn store_shows_fallback_when_server_fails() {
        let (base_url, _captured) =
            serve_once("500 Internal Server Error", "{}".to_string()).await;
        let dir = tempfile::tempdir().unwrap();

        let mut store = ChatStore::new(client(base_url), FileStore::new(dir.path()));
        let outcome = store.send("What is React?", Origin::Input).await;
        assert!(matches!(outcome, SendOutcome::Failed { .. }));
        assert!(!store.is_loading());
        assert_eq!(store.turns()[0].answer(), Some(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn conversation_survives_restart() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "A UI library."}]}}]
        })
        .to_string();
        let (base_url, _captured) = serve_once("200 OK", body).await;
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = ChatStore::new(client(base_url.clone()), FileStore::new(dir.path()));
            let outcome = store.send("What is React?", Origin::Input).await;
            assert!(matches!(outcome, SendOutcome::Answered { .. }));
        }

        let store = ChatStore::open(client(base_url), FileStore::new(dir.path()));
        assert_eq!(store.prompt_history(), &["What is React?"]);
        assert_eq!(store.turns().len(), 1);
        assert_eq!(
            store.turns()[0].status,
            TurnStatus::Answered {
                text: "A UI library.".to_string()
            }
        );
        assert!(store.show_result());
    }

    #[tokio::test]
    async fn test_live_completion() {
        // This test requires GEMINI_API_KEY to be set
        let api_key = std::env::var("GEMINI_API_KEY").ok();
        if api_key.is_none() {
            eprintln!("Skipping test: GEMINI_API_KEY not set");
            return;
        }

        let client = Gemini::new(api_key).expect("Failed to create client");
        let response = client.complete("Say 'test passed'").await;
        assert!(
            response.is_ok(),
            "Request should succeed with valid API key: {response:?}"
        );
    }
}
