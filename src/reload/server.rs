// src/reload/server.rs

//! Static file server for the destination root, with live reload.
//!
//! Files come from `tower_http`'s `ServeDir`, which also rejects paths that
//! climb out of the root. HTML responses pass through a response layer that
//! adds the reload script.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

use super::ReloadChannel;

/// Server-sent events endpoint the injected script listens on.
pub const EVENTS_PATH: &str = "/__sitebuild/events";

const RELOAD_SCRIPT: &str = concat!(
    "<script>(function(){",
    "var es=new EventSource(\"/__sitebuild/events\");",
    "es.onmessage=function(){window.location.reload();};",
    "})();</script>\n"
);

/// Largest HTML page the reload script is injected into.
const MAX_HTML_BYTES: usize = 16 * 1024 * 1024;

/// Running dev server. Dropping it stops the server.
#[derive(Debug)]
pub struct DevServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl DevServer {
    /// Bind `addr` and serve `root` in a background task.
    pub async fn start(
        addr: SocketAddr,
        root: impl Into<PathBuf>,
        channel: ReloadChannel,
    ) -> Result<Self> {
        let root = root.into();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding dev server to {addr}"))?;
        let local_addr = listener.local_addr()?;

        let app = router(root.clone(), channel);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!(error = %e, "dev server stopped");
            }
        });

        info!(addr = %local_addr, root = %root.display(), "serving destination root");
        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Drop for DevServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(root: PathBuf, channel: ReloadChannel) -> Router {
    Router::new()
        .route(EVENTS_PATH, get(events))
        .fallback_service(ServeDir::new(root))
        .layer(middleware::map_response(inject_into_html))
        .with_state(channel)
}

async fn events(
    State(channel): State<ReloadChannel>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    debug!("reload client connected");
    let stream = BroadcastStream::new(channel.subscribe()).filter_map(|msg| {
        let event = msg.ok()?;
        Event::default().json_data(&event).ok().map(Ok)
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Add the reload script to successful HTML responses from the file server.
async fn inject_into_html(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if response.status() != StatusCode::OK || !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, MAX_HTML_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "failed to read HTML response");
            return (StatusCode::INTERNAL_SERVER_ERROR, "read error").into_response();
        }
    };

    let html = inject_reload_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

/// Insert the reload script before the last `</body>`, or append it.
pub fn inject_reload_script(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    match lower.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + RELOAD_SCRIPT.len());
            out.push_str(&html[..pos]);
            out.push_str(RELOAD_SCRIPT);
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{html}{RELOAD_SCRIPT}"),
    }
}
