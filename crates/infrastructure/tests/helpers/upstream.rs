use super::messages::answer_with_records;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use hickory_proto::op::Message;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub enum UpstreamBehavior {
    /// Valid DoH answer with one A record.
    Answer,
    Status(StatusCode),
    ContentType(&'static str),
    Garbage,
    Delay(Duration),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub forwarded_for: Option<String>,
}

#[derive(Clone)]
struct UpstreamState {
    behavior: UpstreamBehavior,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// In-process DoH resolver on 127.0.0.1 that answers every path.
pub struct DohUpstream {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl DohUpstream {
    pub async fn spawn(behavior: UpstreamBehavior) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            behavior,
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(dns_query).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn dns_query(
    State(state): State<UpstreamState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        content_type: header_value(&headers, "content-type"),
        accept: header_value(&headers, "accept"),
        forwarded_for: header_value(&headers, "x-forwarded-for"),
    });

    match state.behavior {
        UpstreamBehavior::Answer => answer(&body),
        UpstreamBehavior::Status(status) => status.into_response(),
        UpstreamBehavior::ContentType(content_type) => {
            ([(header::CONTENT_TYPE, content_type)], answer_bytes(&body)).into_response()
        }
        UpstreamBehavior::Garbage => {
            ([(header::CONTENT_TYPE, "application/dns-message")], vec![0u8, 1]).into_response()
        }
        UpstreamBehavior::Delay(delay) => {
            tokio::time::sleep(delay).await;
            answer(&body)
        }
    }
}

fn answer_bytes(body: &[u8]) -> Vec<u8> {
    let query = Message::from_vec(body).unwrap();
    answer_with_records(&query, 1).to_vec().unwrap()
}

fn answer(body: &[u8]) -> Response {
    (
        [(header::CONTENT_TYPE, "application/dns-message")],
        answer_bytes(body),
    )
        .into_response()
}
