use super::Compressor;
use crate::services::core::cancel::CancelToken;
use crate::services::fs_utils::file_utils::JUNK_NAMES;
use crate::services::fs_utils::path_utils::absolute;
use crate::types::errors::CompressionError;
use regex::Regex;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

static RE_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})%").expect("Invalid regex"));

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Bytes of tool output kept for error reports.
const OUTPUT_TAIL: usize = 4096;

/// Runs a 7-Zip binary and parses its `-bsp1` progress stream.
#[derive(Debug, Clone)]
pub struct ExternalCompressor {
    program: PathBuf,
}

impl ExternalCompressor {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    /// Arguments for `7z`, run with `source_root` as the working directory.
    pub fn build_args(&self, source_root: &Path, dest: &Path) -> Vec<String> {
        let mut args: Vec<String> = ["a", "-tzip", "-mx=5", "-bsp1", "-bb0", "-y"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        for junk in JUNK_NAMES {
            args.push(format!("-xr!{junk}"));
        }
        if let Ok(rel) = dest.strip_prefix(source_root) {
            args.push(format!("-x!{}", rel.to_string_lossy()));
        }
        args.push(dest.to_string_lossy().to_string());
        args.push("*".to_string());
        args
    }
}

/// Every percentage marker in a chunk of tool output, in order.
pub fn parse_percentages(chunk: &str) -> Vec<u8> {
    chunk
        .split(['\r', '\n', '\u{8}'])
        .flat_map(|segment| RE_PERCENT.captures_iter(segment))
        .filter_map(|caps| caps[1].parse::<u8>().ok())
        .filter(|p| *p <= 100)
        .collect()
}

enum StdoutEvent {
    Percent(u8),
    Text(String),
}

impl Compressor for ExternalCompressor {
    fn name(&self) -> &'static str {
        "7-Zip"
    }

    fn compress(
        &self,
        source_root: &Path,
        dest: &Path,
        on_progress: &mut dyn FnMut(u8),
        cancel: &CancelToken,
    ) -> Result<(), CompressionError> {
        let root = absolute(source_root)?;
        let dest = absolute(dest)?;
        if dest.exists() {
            fs::remove_file(&dest)?;
        }

        let args = self.build_args(&root, &dest);
        log::debug!("Running {} {}", self.program.display(), args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompressionError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let (tx, rx) = mpsc::channel();
        let stdout_reader = child.stdout.take().map(|stdout| {
            thread::spawn(move || read_stdout(stdout, tx))
        });
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let mut last = 0u8;
        let mut stdout_tail = String::new();
        loop {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(StdoutEvent::Percent(p)) if p > last => {
                    last = p;
                    on_progress(p);
                }
                Ok(StdoutEvent::Percent(_)) => {}
                Ok(StdoutEvent::Text(text)) => push_tail(&mut stdout_tail, &text),
                Err(mpsc::RecvTimeoutError::Timeout) => {}
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
            if cancel.is_cancelled() {
                kill(&mut child);
                let _ = fs::remove_file(&dest);
                return Err(CompressionError::Cancelled);
            }
        }

        let status = child.wait()?;
        if let Some(handle) = stdout_reader {
            let _ = handle.join();
        }
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        if !status.success() {
            let output = if stderr.trim().is_empty() {
                stdout_tail
            } else {
                stderr
            };
            log::error!("7-Zip failed with {status}: {}", output.trim());
            let _ = fs::remove_file(&dest);
            return Err(CompressionError::ToolFailed {
                code: status.code(),
                output: output.trim().to_string(),
            });
        }

        on_progress(100);
        Ok(())
    }
}

fn read_stdout(mut stdout: impl Read, tx: mpsc::Sender<StdoutEvent>) {
    let mut buf = [0u8; 1024];
    // Text after the last separator may be a marker split across reads.
    let mut pending = String::new();
    loop {
        let n = match stdout.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let chunk = String::from_utf8_lossy(&buf[..n]).to_string();
        pending.push_str(&chunk);
        if let Some(idx) = pending.rfind(['\r', '\n', '\u{8}']) {
            let complete: String = pending.drain(..=idx).collect();
            if !forward(&tx, &complete) {
                return;
            }
        }
        if tx.send(StdoutEvent::Text(chunk)).is_err() {
            return;
        }
    }
    forward(&tx, &pending);
}

fn forward(tx: &mpsc::Sender<StdoutEvent>, text: &str) -> bool {
    parse_percentages(text)
        .into_iter()
        .all(|percent| tx.send(StdoutEvent::Percent(percent)).is_ok())
}

fn push_tail(tail: &mut String, text: &str) {
    tail.push_str(text);
    if tail.len() > OUTPUT_TAIL {
        let mut cut = tail.len() - OUTPUT_TAIL;
        while !tail.is_char_boundary(cut) {
            cut += 1;
        }
        tail.drain(..cut);
    }
}

fn kill(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::warn!("Failed to stop compressor process: {e}");
    }
    let _ = child.wait();
}
