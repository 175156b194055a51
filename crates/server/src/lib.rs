//! Local HTTP microservice in front of the window processor.
//!
//! Routes:
//! - `GET /numbers/{p|f|e|r}[?window=N]`  fetch, merge, return the state
//! - `GET /state`                          current state
//! - `DELETE /state`                       reset

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use winavg_core::{AvgError, NumberKind, Result, WindowState};
use winavg_processor::WindowProcessor;

/// Pause after a failed accept so fd exhaustion does not spin the loop.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct NumbersService {
    processor:   Arc<WindowProcessor>,
    /// Used when a request carries no `window` query parameter.
    window_size: i64,
}

impl NumbersService {
    pub fn new(processor: Arc<WindowProcessor>, window_size: i64) -> Self {
        Self {
            processor,
            window_size,
        }
    }

    /// Accept connections forever; one task per connection. Failed accepts
    /// (aborted handshakes, fd exhaustion) are logged and skipped.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        info!("serving on http://{}", listener.local_addr()?);
        loop {
            let (socket, peer) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("accept failed: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };
            let io = TokioIo::new(socket);
            let svc = Arc::clone(&self);
            let service = service_fn(move |req| {
                let svc = Arc::clone(&svc);
                async move { Ok::<_, Infallible>(svc.handle(req).await) }
            });
            tokio::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("error serving {peer}: {err:?}");
                }
            });
        }
    }

    /// Route a request. The body is never read.
    pub fn handle<B>(&self, req: Request<B>) -> impl Future<Output = Response<Full<Bytes>>> + '_ {
        self.route(req.method().clone(), req.uri().clone())
    }

    async fn route(&self, method: Method, uri: Uri) -> Response<Full<Bytes>> {
        let path = uri.path().trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').skip(1).collect();

        match (&method, segments.as_slice()) {
            (&Method::GET, ["numbers", id]) => {
                let Some(kind) = NumberKind::from_id(id) else {
                    return error_response(&AvgError::UnknownKind((*id).to_string()));
                };
                let window_size = match window_param(uri.query()) {
                    Ok(size) => size.unwrap_or(self.window_size),
                    Err(e) => return error_response(&e),
                };
                match self.processor.merge(kind, window_size).await {
                    Ok(state) => state_response(StatusCode::OK, &state),
                    Err(e) => error_response(&e),
                }
            }
            (&Method::GET, ["state"]) => {
                state_response(StatusCode::OK, &self.processor.current_state().await)
            }
            (&Method::DELETE, ["state"]) => match self.processor.reset().await {
                Ok(()) => empty_response(StatusCode::NO_CONTENT),
                Err(e) => error_response(&e),
            },
            _ => json_response(StatusCode::NOT_FOUND, &json!({ "error": "not found" })),
        }
    }
}

/// Parse `window=N` out of a query string.
fn window_param(query: Option<&str>) -> Result<Option<i64>> {
    let Some(query) = query else { return Ok(None) };
    for pair in query.split('&') {
        if let Some(raw) = pair.strip_prefix("window=") {
            return raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AvgError::InvalidRequest(format!("window must be an integer, got '{raw}'")));
        }
    }
    Ok(None)
}

fn status_for(err: &AvgError) -> StatusCode {
    match err {
        AvgError::InvalidWindowSize(_) | AvgError::UnknownKind(_) | AvgError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        AvgError::Fetch(_) | AvgError::Status { .. } => StatusCode::BAD_GATEWAY,
        AvgError::Config(_) | AvgError::Store(_) | AvgError::Io { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn state_response(status: StatusCode, state: &WindowState) -> Response<Full<Bytes>> {
    match serde_json::to_value(state) {
        Ok(body) => json_response(status, &body),
        Err(e) => error_response(&AvgError::Store(format!("encode window state: {e}"))),
    }
}

fn error_response(err: &AvgError) -> Response<Full<Bytes>> {
    json_response(status_for(err), &json!({ "error": err.to_string() }))
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(body.to_string())));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
    resp
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use winavg_source::NumberSource;
    use winavg_store::MemoryStore;

    /// Returns fixed numbers per kind; `Random` always fails.
    struct FixedSource;

    #[async_trait]
    impl NumberSource for FixedSource {
        async fn fetch(&self, kind: NumberKind) -> Result<Vec<i64>> {
            match kind {
                NumberKind::Even => Ok(vec![2, 4, 6, 8]),
                NumberKind::Prime => Ok(vec![2, 3, 5]),
                NumberKind::Fibonacci => Ok(vec![]),
                NumberKind::Random => Err(AvgError::Status { kind, status: 503 }),
            }
        }
    }

    fn service(window_size: i64) -> NumbersService {
        let processor = WindowProcessor::new(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedSource),
            "calculator_window_state",
        );
        NumbersService::new(Arc::new(processor), window_size)
    }

    async fn call(svc: &NumbersService, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let resp = svc.handle(req).await;
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn numbers_route_merges_with_default_window() {
        let svc = service(3);
        let (status, body) = call(&svc, Method::GET, "/numbers/e").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["windowPrevState"], json!([]));
        assert_eq!(body["windowCurrState"], json!([4, 6, 8]));
        assert_eq!(body["numbers"], json!([4, 6, 8]));
        assert_eq!(body["avg"], json!(6.0));
    }

    #[tokio::test]
    async fn window_query_overrides_default() {
        let svc = service(10);
        let (_, body) = call(&svc, Method::GET, "/numbers/p?window=2").await;
        assert_eq!(body["windowCurrState"], json!([3, 5]));
    }

    #[tokio::test]
    async fn upstream_failure_is_bad_gateway_and_keeps_state() {
        let svc = service(10);
        call(&svc, Method::GET, "/numbers/p").await;
        let (_, before) = call(&svc, Method::GET, "/state").await;

        let (status, body) = call(&svc, Method::GET, "/numbers/r").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("503"));

        let (_, after) = call(&svc, Method::GET, "/state").await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn bad_requests_are_rejected() {
        let svc = service(10);
        let (status, _) = call(&svc, Method::GET, "/numbers/x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&svc, Method::GET, "/numbers/e?window=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = call(&svc, Method::GET, "/numbers/e?window=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("invalid request"));
        assert!(!message.contains("config"));
        let (status, _) = call(&svc, Method::GET, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_state_resets() {
        let svc = service(10);
        call(&svc, Method::GET, "/numbers/e").await;

        let (status, _) = call(&svc, Method::DELETE, "/state").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = call(&svc, Method::GET, "/state").await;
        assert_eq!(body["windowCurrState"], json!([]));
        assert_eq!(body["avg"], json!(0.0));
    }

    #[test]
    fn window_param_parsing() {
        assert_eq!(window_param(None).unwrap(), None);
        assert_eq!(window_param(Some("a=1&window=7")).unwrap(), Some(7));
        assert_eq!(window_param(Some("a=1")).unwrap(), None);
        assert!(matches!(
            window_param(Some("window=")),
            Err(AvgError::InvalidRequest(_))
        ));
    }

    async fn raw_get(addr: std::net::SocketAddr, path: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn serve_keeps_accepting_connections() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(Arc::new(service(3)).serve(listener));

        let first = raw_get(addr, "/numbers/x").await;
        assert!(first.starts_with("HTTP/1.1 400"));
        let second = raw_get(addr, "/numbers/e").await;
        assert!(second.starts_with("HTTP/1.1 200"));
        assert!(second.contains("\"windowCurrState\":[4,6,8]"));

        assert!(!server.is_finished());
        server.abort();
    }
}
