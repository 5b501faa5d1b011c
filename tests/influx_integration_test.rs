//! Integration tests for the InfluxDB sink
//!
//! An in-process axum server stands in for the InfluxDB 1.x `/write`
//! endpoint and records what it receives.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use loxflux::config::InfluxConfig;
use loxflux::{parse_utc_line, InfluxSink, PointSink, SinkError};

#[derive(Debug, Clone)]
struct Captured {
    query: HashMap<String, String>,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Clone)]
struct FakeInflux {
    requests: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
}

async fn write_handler(
    State(state): State<FakeInflux>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(Captured {
        query,
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    let reply = if state.status.is_success() {
        String::new()
    } else {
        "{\"error\":\"database not found: \\\"loxone\\\"\"}\n".to_string()
    };
    (state.status, reply)
}

/// Start a fake server answering every write with `status`
async fn spawn_fake_influx(status: StatusCode) -> (u16, Arc<Mutex<Vec<Captured>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = FakeInflux {
        requests: requests.clone(),
        status,
    };
    let app = Router::new()
        .route("/write", post(write_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, requests)
}

fn influx_config(port: u16) -> InfluxConfig {
    InfluxConfig {
        host: "127.0.0.1".to_string(),
        port,
        https: false,
        verify_https: false,
        database: "loxone".to_string(),
        user: None,
        password: None,
        timeout_secs: 5,
    }
}

#[tokio::test]
async fn test_write_posts_line_protocol() {
    let (port, requests) = spawn_fake_influx(StatusCode::NO_CONTENT).await;
    let sink = InfluxSink::new(&influx_config(port)).unwrap();

    let point = parse_utc_line("2020-09-10 19:46:20;Bedroom temperature;23.0;Room:Master").unwrap();
    sink.write(&[point]).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.query.get("db").map(String::as_str), Some("loxone"));
    assert_eq!(request.query.get("precision").map(String::as_str), Some("s"));
    assert_eq!(request.authorization, None);
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/plain")));
    assert_eq!(
        request.body,
        "Bedroom\\ temperature,Room=Master,Source=Loxone value=23 1599767180"
    );
}

#[tokio::test]
async fn test_write_sends_basic_auth_when_user_configured() {
    let (port, requests) = spawn_fake_influx(StatusCode::NO_CONTENT).await;
    let mut config = influx_config(port);
    config.user = Some("loxone".to_string());
    config.password = Some("secret".to_string());
    let sink = InfluxSink::new(&config).unwrap();

    let point = parse_utc_line("2020-09-10 19:46:20;T;1").unwrap();
    sink.write(&[point]).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic bG94b25lOnNlY3JldA==")
    );
}

#[tokio::test]
async fn test_batch_is_one_request() {
    let (port, requests) = spawn_fake_influx(StatusCode::NO_CONTENT).await;
    let sink = InfluxSink::new(&influx_config(port)).unwrap();

    let points = vec![
        parse_utc_line("2020-09-10 19:46:20;A;1").unwrap(),
        parse_utc_line("2020-09-10 19:46:21;B;2.5").unwrap(),
    ];
    sink.write(&points).await.unwrap();

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        "A,Source=Loxone value=1 1599767180\nB,Source=Loxone value=2.5 1599767181"
    );
}

#[tokio::test]
async fn test_rejected_write_reports_status_and_body() {
    let (port, _requests) = spawn_fake_influx(StatusCode::NOT_FOUND).await;
    let sink = InfluxSink::new(&influx_config(port)).unwrap();

    let point = parse_utc_line("2020-09-10 19:46:20;T;1").unwrap();
    let err = sink.write(&[point]).await.unwrap_err();

    match &err {
        SinkError::Rejected { status, body } => {
            assert_eq!(*status, 404);
            assert!(body.contains("database not found"));
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let (port, _requests) = spawn_fake_influx(StatusCode::INTERNAL_SERVER_ERROR).await;
    let sink = InfluxSink::new(&influx_config(port)).unwrap();

    let point = parse_utc_line("2020-09-10 19:46:20;T;1").unwrap();
    let err = sink.write(&[point]).await.unwrap_err();

    assert!(matches!(err, SinkError::Rejected { status: 500, .. }));
    assert!(err.is_retryable());
}
