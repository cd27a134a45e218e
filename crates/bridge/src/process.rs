//! Subprocess driver for the prediction engine.
//!
//! One call = one child process:
//! 1. spawn `executable [args..] script operation` with all stdio piped
//! 2. write the request to stdin and close it, while draining stdout and stderr
//!    concurrently (a full pipe on either side must never stall the child)
//! 3. race the exchange against the deadline (and an optional cancel token)
//! 4. on overrun, SIGKILL and reap; on exit, classify and decode

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::config::BridgeConfig;
use crate::request::ModelRequest;
use crate::result::{BridgeError, BridgeResult, last_record};

/// Invokes the external prediction engine, one subprocess per call.
///
/// Stateless between calls: concurrent invocations each own their child and
/// share nothing but the configuration.
#[derive(Debug, Clone)]
pub struct ProcessBridge {
    config: BridgeConfig,
}

enum Outcome {
    Exited(io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

impl ProcessBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run a typed request. `timeout` overrides the configured default.
    pub async fn invoke<R: ModelRequest>(
        &self,
        request: &R,
        timeout: Option<Duration>,
    ) -> Result<BridgeResult, BridgeError> {
        let payload = serde_json::to_vec(request).map_err(BridgeError::Encode)?;
        self.run(payload, request.operation(), timeout, None).await
    }

    /// Run an untyped payload for callers that do not own a request schema.
    pub async fn invoke_raw(
        &self,
        payload: &JsonValue,
        operation: &str,
        timeout: Option<Duration>,
    ) -> Result<BridgeResult, BridgeError> {
        let payload = serde_json::to_vec(payload).map_err(BridgeError::Encode)?;
        self.run(payload, operation, timeout, None).await
    }

    /// Like [`invoke_raw`](Self::invoke_raw), but also stops (and kills the
    /// child) when `cancel` fires before the process exits.
    pub async fn invoke_with_cancel(
        &self,
        payload: &JsonValue,
        operation: &str,
        timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Result<BridgeResult, BridgeError> {
        let payload = serde_json::to_vec(payload).map_err(BridgeError::Encode)?;
        self.run(payload, operation, timeout, Some(cancel)).await
    }

    async fn run(
        &self,
        payload: Vec<u8>,
        operation: &str,
        timeout: Option<Duration>,
        cancel: Option<CancellationToken>,
    ) -> Result<BridgeResult, BridgeError> {
        let invocation_id = Uuid::now_v7();
        let span = info_span!("bridge.invoke", %invocation_id, operation);
        let timeout = timeout.unwrap_or(self.config.default_timeout);

        async move {
            let mut child = self
                .config
                .command(operation)
                .spawn()
                .map_err(|source| {
                    warn!(program = %self.config.program(), error = %source, "failed to start model process");
                    BridgeError::StartFailure {
                        program: self.config.program(),
                        source,
                    }
                })?;

            let started = Instant::now();
            debug!(pid = ?child.id(), timeout_ms = millis(timeout), bytes = payload.len(), "model process spawned");

            let stdin = child.stdin.take();
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            let mut out = Vec::new();
            let mut err = Vec::new();

            let outcome = {
                let exchange = exchange(&mut child, stdin, stdout, stderr, &payload, &mut out, &mut err);
                tokio::pin!(exchange);
                let deadline = tokio::time::sleep(timeout);
                tokio::pin!(deadline);
                let cancelled = async {
                    match &cancel {
                        Some(token) => token.cancelled().await,
                        None => std::future::pending::<()>().await,
                    }
                };

                tokio::select! {
                    biased;
                    status = &mut exchange => Outcome::Exited(status),
                    _ = &mut deadline => Outcome::TimedOut,
                    _ = cancelled => Outcome::Cancelled,
                }
            };

            let elapsed = started.elapsed();
            let stderr_text = String::from_utf8_lossy(&err).into_owned();
            forward_stderr(&stderr_text);

            match outcome {
                Outcome::TimedOut => {
                    terminate(&mut child).await;
                    warn!(elapsed_ms = millis(elapsed), partial_stdout_bytes = out.len(), "model process timed out");
                    Err(BridgeError::Timeout {
                        elapsed,
                        stderr: stderr_text,
                    })
                }
                Outcome::Cancelled => {
                    terminate(&mut child).await;
                    warn!(elapsed_ms = millis(elapsed), "model invocation cancelled");
                    Err(BridgeError::Cancelled {
                        elapsed,
                        stderr: stderr_text,
                    })
                }
                Outcome::Exited(Err(e)) => {
                    terminate(&mut child).await;
                    warn!(error = %e, "i/o failure while talking to model process");
                    Err(BridgeError::Io(e))
                }
                Outcome::Exited(Ok(status)) => {
                    info!(
                        elapsed_ms = millis(elapsed),
                        exit_code = ?status.code(),
                        stdout_bytes = out.len(),
                        stderr_bytes = err.len(),
                        "model process finished"
                    );
                    classify(status, &out, stderr_text, elapsed)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Feed stdin and drain both output pipes concurrently, then wait for exit.
///
/// Bytes land in `out`/`err` as they arrive, so whatever was read before a
/// timeout is still available to the caller afterwards.
async fn exchange(
    child: &mut Child,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    payload: &[u8],
    out: &mut Vec<u8>,
    err: &mut Vec<u8>,
) -> io::Result<ExitStatus> {
    let write = async move {
        if let Some(mut pipe) = stdin {
            // The engine may exit without reading its input; exit status decides.
            if let Err(e) = pipe.write_all(payload).await {
                debug!(error = %e, "model process did not consume its input");
            }
            // Dropping the handle closes the pipe (end of input).
        }
    };
    let read_out = async move {
        match stdout {
            Some(mut pipe) => pipe.read_to_end(out).await.map(|_| ()),
            None => Ok(()),
        }
    };
    let read_err = async move {
        match stderr {
            Some(mut pipe) => pipe.read_to_end(err).await.map(|_| ()),
            None => Ok(()),
        }
    };

    let ((), out_res, err_res) = tokio::join!(write, read_out, read_err);
    out_res?;
    err_res?;
    child.wait().await
}

/// SIGKILL the child (no-op if it already exited) and reap it.
async fn terminate(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "model process already exited before kill");
    }
    match child.wait().await {
        Ok(status) => debug!(?status, "model process reaped"),
        Err(e) => warn!(error = %e, "failed to reap model process"),
    }
}

fn classify(
    status: ExitStatus,
    stdout: &[u8],
    stderr: String,
    elapsed: Duration,
) -> Result<BridgeResult, BridgeError> {
    if !status.success() {
        warn!(exit_code = ?status.code(), "model process exited with failure status");
        return Err(BridgeError::NonZeroExit {
            code: status.code(),
            stderr,
            elapsed,
        });
    }

    let text = String::from_utf8_lossy(stdout);
    let Some(line) = last_record(&text) else {
        warn!("model process produced no output");
        return Err(BridgeError::EmptyOutput { stderr, elapsed });
    };

    BridgeResult::decode_line(line).map_err(|reason| {
        warn!(%reason, "model output could not be decoded");
        BridgeError::DecodeFailure {
            reason,
            line: line.to_string(),
            stderr,
        }
    })
}

/// Whole milliseconds for log fields, saturating instead of truncating.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn forward_stderr(stderr: &str) {
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        debug!(target: "mandi_bridge::engine", "{line}");
    }
}
