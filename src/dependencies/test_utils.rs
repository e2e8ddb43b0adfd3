use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Router, http::StatusCode, routing::get, serve};
use tokio::net::TcpListener;
use tokio::sync::Barrier;
use zip::write::SimpleFileOptions;

/// Entry of a zip fixture: `None` content marks a directory.
pub type ZipFixtureEntry<'a> = (&'a str, Option<&'a str>);

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// In-process HTTP server counting every request it receives, matched or not.
pub struct TestHttpServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestHttpServer {
    pub async fn spawn(routes: Vec<(&'static str, Vec<u8>)>) -> Self {
        Self::spawn_with_gate(routes, None).await
    }

    /// Like [`TestHttpServer::spawn`], but every matched request waits on `gate`
    /// before its body is sent.
    pub async fn spawn_gated(routes: Vec<(&'static str, Vec<u8>)>, gate: Arc<Barrier>) -> Self {
        Self::spawn_with_gate(routes, Some(gate)).await
    }

    async fn spawn_with_gate(routes: Vec<(&'static str, Vec<u8>)>, gate: Option<Arc<Barrier>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let mut router = Router::new();
        for (path, body) in routes {
            let hits = hits.clone();
            let gate = gate.clone();
            router = router.route(
                path,
                get(move || {
                    let body = body.clone();
                    let hits = hits.clone();
                    let gate = gate.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        if let Some(gate) = gate {
                            gate.wait().await;
                        }
                        body
                    }
                }),
            );
        }
        let fallback_hits = hits.clone();
        let router = router.fallback(move || {
            let hits = fallback_hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::NOT_FOUND
            }
        });

        tokio::spawn(async move {
            let _ = serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            hits,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// URL of a port that was just released, so connecting to it is refused.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/unreachable")
}

pub fn zip_bytes(entries: &[ZipFixtureEntry<'_>]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().unix_permissions(0o755);
    for (name, content) in entries {
        match content {
            Some(content) => {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            None => writer.add_directory(*name, options).unwrap(),
        }
    }
    writer.finish().unwrap().into_inner()
}

pub fn write_zip(path: &Path, entries: &[ZipFixtureEntry<'_>]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, zip_bytes(entries)).unwrap();
}

/// Drops an executable file at `path`, creating its parents.
pub fn place_executable(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
