//! FileSink - appends log lines to a single file

use contracts::{ContractError, LogMessage, MessageSink};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

const DEFAULT_PREFIX: &str = "logworker";

/// Line encoding of a FileSink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileFormat {
    /// `LEVEL text`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl FileFormat {
    fn parse(value: &str) -> io::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(FileFormat::Text),
            "json" => Ok(FileFormat::Json),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown file format '{other}'"),
            )),
        }
    }
}

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// File the sink appends to
    pub path: PathBuf,
    pub format: FileFormat,
}

impl FileSinkConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: FileFormat::default(),
        }
    }

    /// Timestamped file inside `directory`
    ///
    /// Named `<prefix>.logworker.<YYYYmmdd-HHMMSS>.log`.
    pub fn in_directory(prefix: &str, directory: &Path) -> Self {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        Self::new(directory.join(format!("{prefix}.logworker.{timestamp}.log")))
    }

    /// Create config from params map
    ///
    /// `path` wins over `directory` + `prefix`.
    pub fn from_params(params: &HashMap<String, String>) -> io::Result<Self> {
        let mut config = match (params.get("path"), params.get("directory")) {
            (Some(path), _) => Self::new(path),
            (None, Some(directory)) => {
                let prefix = params
                    .get("prefix")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_PREFIX);
                Self::in_directory(prefix, Path::new(directory))
            }
            (None, None) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file sink needs a 'path' or 'directory' param",
                ));
            }
        };

        if let Some(format) = params.get("format") {
            config.format = FileFormat::parse(format)?;
        }
        Ok(config)
    }
}

/// Sink that appends one line per message to a file
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Create a new FileSink, opening the file in append mode
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            config,
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> io::Result<Self> {
        let config = FileSinkConfig::from_params(params)?;
        Self::new(name, config)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn write_line(&mut self, message: &LogMessage) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other("file sink already closed"))?;

        match self.config.format {
            FileFormat::Text => writeln!(writer, "{message}"),
            FileFormat::Json => {
                serde_json::to_writer(&mut *writer, message)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writer.write_all(b"\n")
            }
        }
    }

    fn sink_error(&self, e: io::Error) -> ContractError {
        error!(sink = %self.name, path = %self.config.path.display(), error = %e, "Write failed");
        ContractError::sink_write(&self.name, e.to_string())
    }
}

impl MessageSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, message: &LogMessage) -> Result<(), ContractError> {
        self.write_line(message).map_err(|e| self.sink_error(e))
    }

    #[instrument(name = "file_sink_flush", skip(self), fields(sink = %self.name))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        let result = match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        };
        result.map_err(|e| self.sink_error(e))
    }

    #[instrument(name = "file_sink_close", skip(self), fields(sink = %self.name))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| self.sink_error(e))?;
        }
        debug!(sink = %self.name, path = %self.config.path.display(), "FileSink closed");
        Ok(())
    }
}
