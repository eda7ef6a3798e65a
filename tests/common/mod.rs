//! An axum server that serves one in-memory payload, with or without
//! byte-range support, and records the `Range` header of every request.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE},
        HeaderMap, Method, Response, StatusCode,
    },
    serve, Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub range: Option<String>,
}

/// How the server treats `Range` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeMode {
    /// Honors ranges on HEAD and GET.
    Ranged,
    /// Ignores ranges, always answers 200 with the full payload.
    Plain,
    /// Claims range support on HEAD, then ignores ranges on GET.
    HeadOnly,
    /// Answers ranged GETs with 206 and the right length, but always from offset 0.
    Misaligned,
    /// Like `Ranged`, except the nth GET (1-based) gets a 500.
    FailGet(usize),
    /// Ignores ranges; GETs come back as 203 instead of 200.
    NonAuthoritative,
}

#[derive(Clone)]
struct ServerState {
    payload: Arc<Vec<u8>>,
    mode: RangeMode,
    requests: Arc<Mutex<Vec<Recorded>>>,
    gets: Arc<AtomicUsize>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl TestServer {
    pub async fn start(payload: Vec<u8>, mode: RangeMode) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = ServerState {
            payload: Arc::new(payload),
            mode,
            requests: requests.clone(),
            gets: Arc::new(AtomicUsize::new(0)),
        };
        let router = Router::new().fallback(serve_payload).with_state(state);
        let server = serve(listener, router);

        tokio::spawn(async move {
            let _ = server.await;
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_ranges(&self) -> Vec<Option<String>> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .map(|r| r.range)
            .collect()
    }
}

async fn serve_payload(
    State(state): State<ServerState>,
    method: Method,
    headers: HeaderMap,
) -> Response<Body> {
    let range = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(Recorded {
        method: method.as_str().to_string(),
        range: range.clone(),
    });

    let is_head = method == Method::HEAD;
    if !is_head {
        let nth = state.gets.fetch_add(1, Ordering::SeqCst) + 1;
        if state.mode == RangeMode::FailGet(nth) {
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty())
                .unwrap();
        }
    }

    let honors_ranges = match state.mode {
        RangeMode::Ranged | RangeMode::Misaligned | RangeMode::FailGet(_) => true,
        RangeMode::Plain | RangeMode::NonAuthoritative => false,
        RangeMode::HeadOnly => is_head,
    };
    let payload = state.payload.as_slice();
    let total = payload.len() as u64;

    let (status, body, content_range) = match range.as_deref().and_then(|r| resolve(r, total)) {
        Some((start, end)) if honors_ranges => {
            let (start, end) = if state.mode == RangeMode::Misaligned && !is_head {
                (0, end - start)
            } else {
                (start, end)
            };
            (
                StatusCode::PARTIAL_CONTENT,
                payload[start as usize..=end as usize].to_vec(),
                Some(format!("bytes {}-{}/{}", start, end, total)),
            )
        }
        None if honors_ranges && total == 0 && range.is_some() => (
            StatusCode::PARTIAL_CONTENT,
            Vec::new(),
            Some("bytes */0".to_string()),
        ),
        _ if state.mode == RangeMode::NonAuthoritative && !is_head => {
            (StatusCode::NON_AUTHORITATIVE_INFORMATION, payload.to_vec(), None)
        }
        _ => (StatusCode::OK, payload.to_vec(), None),
    };

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, body.len());
    if !matches!(state.mode, RangeMode::Plain | RangeMode::NonAuthoritative) {
        builder = builder.header(ACCEPT_RANGES, "bytes");
    }
    if let Some(content_range) = content_range {
        builder = builder.header(CONTENT_RANGE, content_range);
    }
    builder.body(Body::from(body)).unwrap()
}

/// `bytes=a-b`, `bytes=a-`, `bytes=-n` to an inclusive `(start, end)`.
fn resolve(header: &str, total: u64) -> Option<(u64, u64)> {
    if total == 0 {
        return None;
    }
    let spec = header.strip_prefix("bytes=")?;
    let (start, end) = spec.split_once('-')?;
    let (start, end) = match (start.is_empty(), end.is_empty()) {
        (false, false) => (
            start.parse::<u64>().ok()?,
            end.parse::<u64>().ok()?.min(total - 1),
        ),
        (false, true) => (start.parse::<u64>().ok()?, total - 1),
        (true, false) => {
            let n: u64 = end.parse().ok()?;
            (total.saturating_sub(n), total - 1)
        }
        (true, true) => return None,
    };
    (start <= end).then_some((start, end))
}

/// Answers exactly one connection with `response`, verbatim.
///
/// hyper refuses to emit malformed headers, so responses that need one
/// (a non-numeric `Content-Length`, say) go through this instead of axum.
pub async fn serve_verbatim_once(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else { return };
        let mut seen = Vec::new();
        let mut buf = [0u8; 1024];
        while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => seen.extend_from_slice(&buf[..n]),
            }
        }
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    });
    addr
}

/// Deterministic, non-repeating-looking test data.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
