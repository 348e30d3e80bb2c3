use anyhow::{anyhow, Result};
use chrono::Utc;
use log::{debug, warn};
use std::fs::{DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::message;

pub const LOG_DIR: &str = "var/log";
pub const INSTALL_LOG_FILE: &str = "install.log";
pub const GENERAL_LOG_FILE: &str = "general.log";

const NULL_SINK: &str = "/dev/null";

/// Where setup output should be appended. When log creation failed both
/// paths point at the null sink and every append silently goes nowhere.
#[derive(Debug, Clone)]
pub struct LogSinks {
    pub created: bool,
    pub install_log: PathBuf,
    pub general_log: PathBuf,
}

impl LogSinks {
    pub fn null() -> Self {
        Self {
            created: false,
            install_log: PathBuf::from(NULL_SINK),
            general_log: PathBuf::from(NULL_SINK),
        }
    }

    /// Appends a timestamped entry to the install log. Write failures are
    /// swallowed so late log trouble never aborts a running import.
    pub fn append_install(&self, text: &str) {
        if let Err(e) = append(&self.install_log, text) {
            debug!("Dropping install log entry: {}", e);
        }
    }
}

fn append(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "[{}] {}", Utc::now().to_rfc3339(), text)
}

/// Prepares `<base>/var/log` with the install and general log files.
/// Failure here is soft: the run continues with null sinks.
pub fn bootstrap(base: &Path) -> LogSinks {
    message::info("Trying to create log files...");

    match try_bootstrap(base) {
        Ok(sinks) => sinks,
        Err(e) => {
            warn!("Log bootstrap failed: {:#}", e);
            message::warning("Can't create log files.");
            LogSinks::null()
        }
    }
}

fn try_bootstrap(base: &Path) -> Result<LogSinks> {
    let log_dir = base.join(LOG_DIR);

    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(&log_dir)
        .map_err(|e| anyhow!("Failed to create {}: {}", log_dir.display(), e))?;

    let install_log = log_dir.join(INSTALL_LOG_FILE);
    let general_log = log_dir.join(GENERAL_LOG_FILE);

    for log_file in [&install_log, &general_log] {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)
            .map_err(|e| anyhow!("Failed to touch {}: {}", log_file.display(), e))?;
        if !log_file.exists() {
            return Err(anyhow!("{} is missing after touch", log_file.display()));
        }
    }

    Ok(LogSinks {
        created: true,
        install_log,
        general_log,
    })
}
