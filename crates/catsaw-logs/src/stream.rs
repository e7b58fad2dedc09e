use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use catsaw_adb::{AdbClient, AdbError};

const READ_CHUNK: usize = 8 * 1024;

/// Output of the running logcat process
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogcatEvent {
    /// Raw bytes from stdout, split at arbitrary points
    Chunk(Vec<u8>),

    /// One line from stderr
    Stderr(String),

    /// The process is gone and all of its output has been delivered
    Exited { code: Option<i32> },
}

/// Owns the logcat child process and the tasks reading from it
pub struct LogcatStream {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LogcatStream {
    /// Spawn `adb logcat` and start forwarding its output
    pub fn start(
        client: &AdbClient,
        tx: mpsc::UnboundedSender<LogcatEvent>,
    ) -> Result<Self, AdbError> {
        let child = client.spawn_logcat()?;
        Ok(Self::attach(child, tx)?)
    }

    /// Forward the output of an already spawned process
    ///
    /// The child must have piped stdout and stderr.
    pub fn attach(mut child: Child, tx: mpsc::UnboundedSender<LogcatEvent>) -> std::io::Result<Self> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("logcat stdout is not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("logcat stderr is not piped"))?;

        info!("logcat started with pid {:?}", child.id());

        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::run(child, stdout, stderr, tx, cancel.clone()));

        Ok(Self {
            cancel,
            task: Some(task),
        })
    }

    async fn run(
        mut child: Child,
        mut stdout: ChildStdout,
        stderr: ChildStderr,
        tx: mpsc::UnboundedSender<LogcatEvent>,
        cancel: CancellationToken,
    ) {
        let stderr_task = tokio::spawn(Self::stderr_reader(stderr, tx.clone()));
        let mut buf = vec![0u8; READ_CHUNK];

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("logcat stream cancelled");
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill logcat: {}", e);
                    }
                    stderr_task.abort();
                    return;
                }

                result = stdout.read(&mut buf) => {
                    match result {
                        Ok(0) => break,
                        Ok(n) => {
                            trace!("logcat chunk of {} bytes", n);
                            if tx.send(LogcatEvent::Chunk(buf[..n].to_vec())).is_err() {
                                debug!("logcat channel closed");
                                return;
                            }
                        }
                        Err(e) => {
                            warn!("Error reading logcat output: {}", e);
                            break;
                        }
                    }
                }
            }
        }

        // Deliver the remaining diagnostics before announcing the exit
        let _ = stderr_task.await;
        let code = match child.wait().await {
            Ok(status) => status.code(),
            Err(e) => {
                warn!("Error waiting for logcat: {}", e);
                None
            }
        };
        info!("logcat exited with code {:?}", code);
        let _ = tx.send(LogcatEvent::Exited { code });
    }

    async fn stderr_reader(stderr: ChildStderr, tx: mpsc::UnboundedSender<LogcatEvent>) {
        let mut lines = BufReader::new(stderr).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            trace!("stderr: {}", line);
            if tx.send(LogcatEvent::Stderr(line)).is_err() {
                break;
            }
        }
    }

    /// Kill the process and stop forwarding
    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.task.take();
    }
}

impl Drop for LogcatStream {
    fn drop(&mut self) {
        self.stop();
    }
}
