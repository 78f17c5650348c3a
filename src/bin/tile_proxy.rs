//! Tile proxy - serves `/tiles/...` for the viewer from a remote static host.
//!
//! The viewer requests dataset tiles from its own origin. During local
//! development (and for the native build) this proxy forwards those requests
//! to the host that actually stores the tiles and adds a permissive CORS
//! header.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use clap::Parser;
use tower_http::set_header::SetResponseHeaderLayer;

const DEFAULT_UPSTREAM: &str = "http://albedo-sim-data.s3-website-us-west-2.amazonaws.com";

/// Upstream headers copied onto the response.
const PASSTHROUGH_HEADERS: [HeaderName; 4] = [
    header::CONTENT_TYPE,
    header::CACHE_CONTROL,
    header::ETAG,
    header::LAST_MODIFIED,
];

#[derive(Parser, Debug)]
#[command(name = "tile-proxy", about = "Forwards /tiles/ requests to the dataset tile host")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TILE_PROXY_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Host serving /tiles/{dataset}/{z}/{x}/{y}.png
    #[arg(long, env = "TILE_PROXY_UPSTREAM", default_value = DEFAULT_UPSTREAM)]
    upstream: String,
}

// --- App State ---

struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

// --- Errors ---

#[derive(Debug, thiserror::Error)]
enum ProxyError {
    #[error("invalid tile path")]
    InvalidPath,
    #[error("upstream request failed")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::InvalidPath => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(e) => {
                log::warn!("Upstream error: {}", e);
                StatusCode::BAD_GATEWAY
            }
        };
        (status, self.to_string()).into_response()
    }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let state = Arc::new(ProxyState {
        client,
        upstream: args.upstream.clone(),
    });

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    log::info!("Proxying http://{}/tiles/ to {}/tiles/", args.listen, args.upstream);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/tiles/{*path}", get(proxy_tile))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
}

/// Builds the upstream URL, keeping every path segment.
fn upstream_url(upstream: &str, path: &str, query: Option<&str>) -> Result<String, ProxyError> {
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(ProxyError::InvalidPath);
    }

    let mut url = format!("{}/tiles/{}", upstream.trim_end_matches('/'), path);
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    Ok(url)
}

// --- Handlers ---

async fn proxy_tile(
    State(state): State<Arc<ProxyState>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ProxyError> {
    let url = upstream_url(&state.upstream, &path, query.as_deref())?;
    log::debug!("GET {}", url);

    let upstream = state.client.get(&url).send().await?;
    let status = upstream.status();

    let mut headers = HeaderMap::new();
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            headers.insert(name, value.clone());
        }
    }

    let body = upstream.bytes().await?;
    if !status.is_success() {
        log::debug!("{} returned {}", url, status);
    }

    Ok((status, headers, body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::OriginalUri;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state(upstream: &str) -> Arc<ProxyState> {
        Arc::new(ProxyState {
            client: reqwest::Client::new(),
            upstream: upstream.to_string(),
        })
    }

    /// Serves `/tiles/...` on an ephemeral port, echoing the request URI.
    async fn spawn_upstream() -> String {
        async fn tile(OriginalUri(uri): OriginalUri) -> Response {
            if uri.path().contains("missing") {
                return (StatusCode::NOT_FOUND, "no such tile").into_response();
            }
            (
                [
                    (header::CONTENT_TYPE, "image/png"),
                    (header::ETAG, "\"abc\""),
                    (header::SET_COOKIE, "session=1"),
                ],
                uri.to_string(),
            )
                .into_response()
        }

        let app = Router::new().route("/tiles/{*path}", get(tile));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn get_tile(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[test]
    fn test_upstream_url() {
        assert_eq!(
            upstream_url("http://host/", "Priddis/15/5612/11030.png", None).unwrap(),
            "http://host/tiles/Priddis/15/5612/11030.png"
        );
        assert_eq!(
            upstream_url("http://host", "a/1.png", Some("v=2")).unwrap(),
            "http://host/tiles/a/1.png?v=2"
        );
        assert_eq!(
            upstream_url("http://host", "a/1.png", Some("")).unwrap(),
            "http://host/tiles/a/1.png"
        );
    }

    #[test]
    fn test_upstream_url_rejects_traversal() {
        for path in ["../etc/passwd", "a/./b.png", "a//b.png", "a/", ""] {
            assert!(
                matches!(upstream_url("http://host", path, None), Err(ProxyError::InvalidPath)),
                "path {path:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_forwards_tile() {
        let upstream = spawn_upstream().await;
        let response = get_tile(router(state(&upstream)), "/tiles/Priddis/15/5612/11030.png?v=1").await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::ETAG], "\"abc\"");
        assert!(headers.get(header::SET_COOKIE).is_none());

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"/tiles/Priddis/15/5612/11030.png?v=1");
    }

    #[tokio::test]
    async fn test_passes_upstream_status() {
        let upstream = spawn_upstream().await;
        let response = get_tile(router(state(&upstream)), "/tiles/Priddis/missing.png").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_invalid_path_is_bad_request() {
        let response = get_tile(router(state("http://127.0.0.1:1")), "/tiles/a/../b.png").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let response = get_tile(router(state("http://127.0.0.1:1")), "/tiles/a/1.png").await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_other_paths_not_found() {
        let response = get_tile(router(state("http://127.0.0.1:1")), "/index.html").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
