use super::{ExtractionRequest, FamilyCardExtractor};
use crate::errors::{AppError, AppResult};
use anyhow::Context;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::Duration;
use wait_timeout::ChildExt;

pub const API_KEY_ENV: &str = "RT_EXTRACTOR_API_KEY";

/// Hands the request to a local bridge program: request JSON on stdin,
/// response text on stdout. The bridge owns the network call.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    api_key: Option<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    fn run(&self, request: &ExtractionRequest) -> anyhow::Result<String> {
        let payload = serde_json::to_vec(request).context("encode extraction request")?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(key) = &self.api_key {
            command.env(API_KEY_ENV, key);
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("spawn extractor '{}'", self.program.display()))?;

        let result = self.collect(&mut child, payload);
        if result.is_err() {
            let _ = child.kill();
            let _ = child.wait();
        }
        result
    }

    /// Feeds stdin and drains both pipes on their own threads, so neither a
    /// bridge that never reads nor one that writes a lot can outlast the timeout.
    fn collect(&self, child: &mut Child, payload: Vec<u8>) -> anyhow::Result<String> {
        let stdin = child.stdin.take().context("extractor stdin unavailable")?;
        let stdout = child.stdout.take().context("extractor stdout unavailable")?;
        let stderr = child.stderr.take().context("extractor stderr unavailable")?;
        let stdin_writer = thread::spawn(move || feed(stdin, &payload));
        let stdout_reader = thread::spawn(move || read_all(stdout));
        let stderr_reader = thread::spawn(move || read_all(stderr));

        let Some(status) = child.wait_timeout(self.timeout).context("wait for extractor")? else {
            anyhow::bail!("extractor timed out after {}ms", self.timeout.as_millis());
        };

        let written = stdin_writer.join().unwrap_or_else(|_| Err(anyhow::anyhow!("stdin writer panicked")));
        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        if !status.success() {
            anyhow::bail!("extractor exited with {}: {}", status, stderr.trim());
        }
        if let Err(error) = written {
            tracing::warn!(error = %format!("{:#}", error), "extractor answered without reading the whole request");
        }
        Ok(stdout)
    }
}

fn feed(mut stdin: ChildStdin, payload: &[u8]) -> anyhow::Result<()> {
    stdin.write_all(payload).context("write extraction request")?;
    stdin.flush().context("flush extraction request")
}

fn read_all(mut source: impl Read) -> String {
    let mut buffer = Vec::new();
    let _ = source.read_to_end(&mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

impl FamilyCardExtractor for CommandExtractor {
    fn extract(&self, request: &ExtractionRequest) -> AppResult<String> {
        self.run(request).map_err(|error| AppError::Extraction(format!("{:#}", error)))
    }
}
