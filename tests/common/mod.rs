//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc, Mutex};

use alert_logger::config::AppConfig;
use alert_logger::lifecycle::{self, Service, Shutdown};
use alert_logger::sink::Sink;
use tempfile::TempDir;

/// A logger bound to an ephemeral port, writing under a temp directory.
pub struct TestLogger {
    pub service: Service,
    pub shutdown: Shutdown,
    pub url: String,
    pub log_path: PathBuf,
    pub dir: TempDir,
}

/// Config writing to `dir/alerts.log` and listening on an ephemeral port.
pub fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.listener.shutdown_timeout_secs = 1;
    config.sink.path = dir.join("alerts.log");
    config
}

pub async fn start_logger(configure: impl FnOnce(&mut AppConfig)) -> TestLogger {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    configure(&mut config);

    let shutdown = Shutdown::new();
    let service = lifecycle::start(&config, shutdown.clone()).await.unwrap();
    TestLogger {
        url: format!("http://{}/log", service.local_addr()),
        service,
        shutdown,
        log_path: config.sink.path.clone(),
        dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub async fn post(client: &reqwest::Client, url: &str, body: &str) -> reqwest::StatusCode {
    client
        .post(url)
        .body(body.to_string())
        .send()
        .await
        .expect("Logger unreachable")
        .status()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
        Err(e) => panic!("failed to read {}: {e}", path.display()),
    }
}

/// A sink whose writes park until the test releases them.
///
/// Each write reports on `entered`, then blocks until one `()` arrives on the
/// release channel.
pub struct GatedSink {
    pub written: Arc<Mutex<Vec<String>>>,
    entered: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
}

pub struct Gate {
    pub written: Arc<Mutex<Vec<String>>>,
    pub entered: mpsc::Receiver<()>,
    pub release: mpsc::Sender<()>,
}

pub fn gated_sink() -> (GatedSink, Gate) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    (
        GatedSink {
            written: written.clone(),
            entered: entered_tx,
            release: release_rx,
        },
        Gate {
            written,
            entered: entered_rx,
            release: release_tx,
        },
    )
}

impl Sink for GatedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        self.written
            .lock()
            .unwrap()
            .push(String::from_utf8_lossy(buf).into_owned());
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Gate {
    /// Wait (off the runtime) until the writer is parked inside a write.
    pub async fn wait_entered(&mut self) {
        let entered = std::mem::replace(&mut self.entered, mpsc::channel().1);
        let entered = tokio::task::spawn_blocking(move || {
            entered.recv().expect("sink dropped before write");
            entered
        })
        .await
        .unwrap();
        self.entered = entered;
    }
}
