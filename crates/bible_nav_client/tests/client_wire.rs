//! Drives `BibleNavClient` against a canned one-shot HTTP server.

use bible_nav_client::{BibleNavClient, ClientError, Method, Revived, VerseFilter};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serves `responses` in order, one per connection, and hands back each raw request.
async fn canned_server(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut socket).await);
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        seen
    });
    (base, handle)
}

/// Reads one request: the head, then as many body bytes as `Content-Length` says.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&raw).to_string();
        if let Some(head_end) = text.find("\r\n\r\n") {
            let content_length = text[..head_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if raw.len() >= head_end + 4 + content_length {
                return text;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}

fn http_response(status: &str, extra_headers: &[&str], body: &str) -> String {
    let mut head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        body.len()
    );
    for header in extra_headers {
        head.push_str(header);
        head.push_str("\r\n");
    }
    format!("{head}\r\n{body}")
}

#[tokio::test]
async fn login_cookie_is_sent_on_later_requests() {
    let user = r#"{"user":{"id":"0b8f4b3a-1c2d-4e5f-8a9b-0c1d2e3f4a5b","username":null,"email":"a@b.c"}}"#;
    let (base, server) = canned_server(vec![
        http_response(
            "200 OK",
            &["Set-Cookie: session=abc123; HttpOnly; Path=/; Max-Age=60"],
            user,
        ),
        http_response("200 OK", &[], r#"{"verses":[]}"#),
    ])
    .await;

    let client = BibleNavClient::new(&base).unwrap();
    let me = client.login("a@b.c", "pw").await.unwrap();
    assert_eq!(me.email.as_deref(), Some("a@b.c"));
    assert_eq!(client.session().as_deref(), Some("abc123"));

    let favorites = client
        .list_favorites(&VerseFilter::verse("John", 3, 16))
        .await
        .unwrap();
    assert!(favorites.is_empty());

    let requests = server.await.unwrap();
    let second = requests[1].to_ascii_lowercase();
    assert!(second.starts_with("get /favorites?book=john&chapter=3&verse=16 "));
    assert!(second.contains("cookie: session=abc123"));
}

#[tokio::test]
async fn error_bodies_become_api_errors() {
    let (base, _server) = canned_server(vec![
        http_response("401 Unauthorized", &[], r#"{"error":"Unauthorized"}"#),
        http_response("502 Bad Gateway", &[], "upstream down"),
    ])
    .await;
    let client = BibleNavClient::new(&base).unwrap();

    match client.current_user().await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("unexpected: {other:?}"),
    }

    match client.ask_ai("Who was Moses?").await {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status.as_u16(), 502);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn untyped_requests_revive_timestamps() {
    let (base, _server) = canned_server(vec![http_response(
        "200 OK",
        &[],
        r#"{"notes":[{"book":"John","createdAt":"2024-05-01T12:30:00.000Z"}]}"#,
    )])
    .await;
    let client = BibleNavClient::new(&base).unwrap();

    let tree = client.request_value(Method::GET, "/notes", None).await.unwrap();
    let note = &tree.get("notes").and_then(Revived::as_array).unwrap()[0];
    assert!(matches!(note.get("createdAt"), Some(Revived::Date(_))));
    assert_eq!(note.get("book").and_then(Revived::as_str), Some("John"));
}
