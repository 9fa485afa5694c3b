//! Transport tests for InventoryClient against a local HTTP stub

#[cfg(test)]
mod tests {
    use crate::client::InventoryClient;
    use crate::error::InventoryError;
    use crate::inventory_trait::InventoryClientTrait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned `(status, body)` response per connection, in order,
    /// and records the request line of each.
    async fn stub_server(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                seen.lock().unwrap().push(request.lines().next().unwrap_or_default().to_string());

                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (format!("http://{}", addr), requests)
    }

    /// Reads headers plus a `Content-Length` body
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|l| {
                        let lower = l.to_ascii_lowercase();
                        lower.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn event(id: &str) -> serde_json::Value {
        json!({
            "properties": {"class": "workload", "type": "change", "scope": "workspace/ws/configuration/cfg", "id": id, "action": "created"},
            "body": {"state": {"name": id, "sourceType": "kubernetes", "sourceInstance": "cluster/prod", "time": "2024-05-01T10:00:00Z", "data": {"name": id}}}
        })
    }

    fn page(ids: &[&str], next: Option<&str>) -> String {
        let events: Vec<_> = ids.iter().map(|id| event(id)).collect();
        json!({"events": events, "next": next}).to_string()
    }

    fn client(base_url: &str) -> InventoryClient {
        InventoryClient::new(base_url.to_string(), "secret".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_follows_next_pages() {
        let (url, requests) = stub_server(vec![
            (200, page(&["a", "b"], Some("/api/v1/configurations/cfg/events?page=2"))),
            (200, page(&["c"], None)),
        ])
        .await;

        let events = client(&url).fetch_previous_events("cfg").await.unwrap();

        let ids: Vec<_> = events.iter().map(|e| e.id().to_string()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let requests = requests.lock().unwrap();
        assert_eq!(requests[0], "GET /api/v1/configurations/cfg/events HTTP/1.1");
        assert_eq!(requests[1], "GET /api/v1/configurations/cfg/events?page=2 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_fetch_not_found_on_first_page_is_empty_history() {
        let (url, _) = stub_server(vec![(404, r#"{"detail":"no such configuration"}"#.to_string())]).await;

        let events = client(&url).fetch_previous_events("cfg").await.unwrap();

        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_not_found_on_later_page_is_error() {
        let (url, _) = stub_server(vec![
            (200, page(&["a"], Some("/page2"))),
            (404, r#"{"detail":"cursor expired"}"#.to_string()),
        ])
        .await;

        let result = client(&url).fetch_previous_events("cfg").await;

        match result {
            Err(InventoryError::Api(msg)) => {
                assert!(msg.contains("404"), "missing status: {}", msg);
                assert!(msg.contains("cursor expired"), "missing body: {}", msg);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_next_pointing_back() {
        let (url, _) = stub_server(vec![
            (200, page(&["a"], Some("/page2"))),
            (200, page(&["b"], Some("/page2"))),
        ])
        .await;

        let result = client(&url).fetch_previous_events("cfg").await;

        assert!(matches!(result, Err(InventoryError::Api(_))));
    }

    #[tokio::test]
    async fn test_fetch_unauthorized_maps_to_authentication() {
        let (url, _) = stub_server(vec![(401, r#"{"detail":"bad token"}"#.to_string())]).await;

        let result = client(&url).fetch_previous_events("cfg").await;

        assert!(matches!(result, Err(InventoryError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_validate_token_forbidden() {
        let (url, _) = stub_server(vec![(403, "forbidden".to_string())]).await;

        let result = client(&url).validate_token().await;

        assert!(matches!(result, Err(InventoryError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_post_failure_carries_status_and_body() {
        let (url, requests) = stub_server(vec![(500, "database unavailable".to_string())]).await;

        let result = client(&url).post_event_batch(b"[]".to_vec()).await;

        match result {
            Err(InventoryError::Api(msg)) => {
                assert!(msg.contains("500"), "missing status: {}", msg);
                assert!(msg.contains("database unavailable"), "missing body: {}", msg);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        assert_eq!(requests.lock().unwrap()[0], "POST /api/v1/events HTTP/1.1");
    }

    #[tokio::test]
    async fn test_post_status_success() {
        let (url, requests) = stub_server(vec![(202, String::new())]).await;

        client(&url).post_status(br#"{"state":"running"}"#.to_vec()).await.unwrap();

        assert_eq!(requests.lock().unwrap()[0], "POST /api/v1/status HTTP/1.1");
    }
}
