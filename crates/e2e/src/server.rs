//! WebDriver process management - spawning and health checking geckodriver

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running WebDriver process (geckodriver or chromedriver)
pub struct DriverProcess {
    child: Child,
    pub server_url: String,
    pub port: u16,
    stopped: bool,
}

impl DriverProcess {
    /// Spawn the driver executable and wait until it reports ready
    pub async fn spawn(config: DriverProcessConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let server_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", config.binary_path.display(), port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                E2eError::DriverNotFound(config.binary_path.display().to_string())
            } else {
                E2eError::DriverStartup(format!(
                    "Failed to spawn {}: {}",
                    config.binary_path.display(),
                    e
                ))
            }
        })?;

        let handle = DriverProcess {
            child,
            server_url: server_url.clone(),
            port,
            stopped: false,
        };

        handle.wait_for_ready(config.startup_timeout).await?;

        info!("WebDriver is ready at {}", server_url);
        Ok(handle)
    }

    /// Poll the W3C `/status` endpoint until the driver accepts sessions
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.server_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value = resp.json().await.unwrap_or_default();
                    if ready_from_status(&body) {
                        return Ok(());
                    }
                    warn!("WebDriver reports not ready: {}", body);
                }
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver to start...");
                    }
                    // Connection refused is expected while the driver boots
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Stop the driver process. Only the first call signals it; once the
    /// child has been reaped its pid may belong to another process.
    pub fn stop(&mut self) -> E2eResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("WebDriver already exited ({})", status);
            return Ok(());
        }

        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(300));
            }
        }

        // Force kill if still running
        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// A `/status` body is ready when `value.ready` is true. Drivers that omit
/// the flag are treated as ready once they answer.
fn ready_from_status(body: &serde_json::Value) -> bool {
    body.get("value")
        .and_then(|v| v.get("ready"))
        .and_then(|r| r.as_bool())
        .unwrap_or(true)
}

/// Configuration for spawning a driver process
#[derive(Debug, Clone)]
pub struct DriverProcessConfig {
    /// Path or PATH-relative name of the driver executable
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for driver startup
    pub startup_timeout: Duration,
}

impl Default for DriverProcessConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("geckodriver"),
            port: None,
            startup_timeout: Duration::from_secs(20),
        }
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
