//! Integration tests for the REST client against an in-process mock server.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};
use serial_test::serial;
use ureq::AgentBuilder;

use super::*;
use crate::error::{ClientError, ErrorClass, PublishError};

const TOPIC: &str = "projects/test-project/topics/test-topic";

#[derive(Debug)]
struct CapturedRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl CapturedRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A canned response: status code and JSON body.
type Reply = (u16, &'static str);

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    line.split_once(':')
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
}

fn read_http_request(stream: &mut TcpStream) -> CapturedRequest {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .expect("read request line");
    let parts: Vec<&str> = request_line.trim().split(' ').collect();
    let method = parts.first().unwrap_or(&"").to_string();
    let path = parts.get(1).unwrap_or(&"").to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).expect("read header");
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = parse_header_line(&line) else {
            continue;
        };
        if key == "content-length" {
            content_length = value.parse().unwrap_or(0);
        }
        headers.push((key, value));
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).expect("read body");
    }

    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

/// Serve one connection per canned reply, in order, then stop.
fn spawn_mock_server(
    listener: TcpListener,
    replies: Vec<Reply>,
) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let addr = listener.local_addr().expect("listener has address");
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in replies {
            let Ok((mut stream, _)) = listener.accept() else {
                break;
            };
            let captured = read_http_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                status_text(status),
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = tx.send(captured);
        }
    });

    (addr, rx)
}

#[fixture]
fn tcp_listener() -> TcpListener {
    TcpListener::bind(("127.0.0.1", 0)).expect("bind ephemeral listener")
}

fn client_for(addr: SocketAddr) -> PubsubClient {
    let agent = AgentBuilder::new()
        .timeout(Duration::from_secs(5))
        .build();
    PubsubClient::new(
        agent,
        format!("http://{addr}/v1"),
        Credentials::AccessToken("secret-token".into()),
    )
    .with_retry_policy(RetryPolicy {
        base: Duration::from_millis(2),
        cap: Duration::from_millis(10),
    })
}

fn drain(rx: &mpsc::Receiver<CapturedRequest>) -> Vec<CapturedRequest> {
    let mut requests = Vec::new();
    while let Ok(req) = rx.recv_timeout(Duration::from_millis(300)) {
        requests.push(req);
    }
    requests
}

#[rstest]
fn check_topic_reports_existing_topic(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![(200, r#"{"name":"t"}"#)]);
    let client = client_for(addr);

    assert_eq!(check_topic(&client, TOPIC, 3), Ok(true));

    let req = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, format!("/v1/{TOPIC}"));
    assert_eq!(req.header("authorization"), Some("Bearer secret-token"));
}

#[rstest]
fn check_topic_returns_false_on_404(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(
        tcp_listener,
        vec![(404, r#"{"error":{"code":404,"message":"Resource not found"}}"#)],
    );
    assert_eq!(check_topic(&client_for(addr), TOPIC, 3), Ok(false));
}

#[rstest]
fn check_topic_propagates_permission_errors(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(
        tcp_listener,
        vec![(403, r#"{"error":{"code":403,"message":"Access not allowed"}}"#)],
    );
    let err = check_topic(&client_for(addr), TOPIC, 3).expect_err("403 must propagate");
    assert_eq!(err, PublishError::status(403, "Access not allowed"));
}

#[rstest]
fn publish_posts_json_body(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![(200, r#"{"messageIds":["1"]}"#)]);
    let body = PublishBody::from_payloads([encode("Test message")]);

    publish_body(&client_for(addr), &body, TOPIC, 3).expect("publish");

    let req = rx.recv_timeout(Duration::from_secs(5)).expect("request");
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, format!("/v1/{TOPIC}:publish"));
    assert_eq!(req.header("content-type"), Some("application/json"));
    let sent: PublishBody = serde_json::from_str(&req.body).expect("json body");
    assert_eq!(sent, body);
}

#[rstest]
fn publish_retries_503_then_succeeds(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(
        tcp_listener,
        vec![(503, "{}"), (200, r#"{"messageIds":["1"]}"#)],
    );
    let body = PublishBody::from_payloads([encode("retry test")]);

    publish_body(&client_for(addr), &body, TOPIC, 3).expect("second attempt succeeds");
    assert_eq!(drain(&rx).len(), 2);
}

#[rstest]
fn publish_gives_up_after_retry_count(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(tcp_listener, vec![(503, "{}"), (503, "{}"), (503, "{}")]);
    let body = PublishBody::from_payloads([encode("outage")]);

    let err = publish_body(&client_for(addr), &body, TOPIC, 2).expect_err("still failing");
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.class(), ErrorClass::Recoverable);
    assert_eq!(drain(&rx).len(), 3);
}

#[rstest]
fn publish_does_not_retry_404(tcp_listener: TcpListener) {
    let (addr, rx) = spawn_mock_server(
        tcp_listener,
        vec![(404, r#"{"error":{"code":404,"message":"Topic not found"}}"#), (200, "{}")],
    );
    let body = PublishBody::from_payloads([encode("gone")]);

    let err = publish_body(&client_for(addr), &body, TOPIC, 3).expect_err("404 is fatal");
    assert_eq!(err, PublishError::status(404, "Topic not found"));
    assert_eq!(err.class(), ErrorClass::Fatal);
    assert_eq!(drain(&rx).len(), 1);
}

#[rstest]
fn publish_rejects_unparseable_response(tcp_listener: TcpListener) {
    let (addr, _rx) = spawn_mock_server(tcp_listener, vec![(200, "not json")]);
    let body = PublishBody::from_payloads([encode("x")]);

    let err = publish_body(&client_for(addr), &body, TOPIC, 0).expect_err("bad response");
    assert!(matches!(err, PublishError::InvalidResponse(_)));
}

#[test]
fn transport_errors_are_retried_then_reported() {
    // Bind then drop to obtain a port nobody listens on.
    let addr = TcpListener::bind(("127.0.0.1", 0))
        .and_then(|l| l.local_addr())
        .expect("ephemeral port");
    let body = PublishBody::from_payloads([encode("x")]);

    let err = publish_body(&client_for(addr), &body, TOPIC, 1).expect_err("refused");
    assert!(matches!(err, PublishError::Transport(_)));
    assert_eq!(err.class(), ErrorClass::Fatal);
}

mod client_discovery {
    use super::*;
    use std::env;

    fn clear_env() {
        // SAFETY: tests touching the environment are serialised.
        unsafe {
            env::remove_var(EMULATOR_HOST_ENV);
            env::remove_var(ACCESS_TOKEN_ENV);
        }
    }

    fn plain_agent() -> Option<ureq::Agent> {
        Some(AgentBuilder::new().build())
    }

    #[test]
    #[serial]
    fn fails_without_credentials() {
        clear_env();
        let err = get_pubsub_client(None, plain_agent()).expect_err("no credentials");
        assert!(matches!(err, ClientError::MissingCredentials));
    }

    #[test]
    #[serial]
    fn emulator_needs_no_credentials() {
        clear_env();
        unsafe { env::set_var(EMULATOR_HOST_ENV, "localhost:8085") };
        let client = get_pubsub_client(None, plain_agent()).expect("emulator client");
        clear_env();
        assert_eq!(client.endpoint(), "http://localhost:8085/v1");
        assert_eq!(client.credentials(), &Credentials::Anonymous);
    }

    #[test]
    #[serial]
    fn reads_token_from_environment() {
        clear_env();
        unsafe { env::set_var(ACCESS_TOKEN_ENV, " ya29.token ") };
        let client = get_pubsub_client(None, plain_agent()).expect("token client");
        clear_env();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(
            client.credentials(),
            &Credentials::AccessToken("ya29.token".into())
        );
    }

    #[test]
    #[serial]
    fn explicit_credentials_win() {
        clear_env();
        let client = get_pubsub_client(Some(Credentials::AccessToken("given".into())), plain_agent())
            .expect("explicit client");
        assert_eq!(client.credentials(), &Credentials::AccessToken("given".into()));
    }

    #[test]
    fn debug_output_redacts_token() {
        let rendered = format!("{:?}", Credentials::AccessToken("secret".into()));
        assert!(!rendered.contains("secret"));
    }
}
