use anyhow::{anyhow, Result};
use log::{error, info};
use std::path::PathBuf;
use tokio::process::Command;

use crate::logs::LogSinks;
use crate::message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    New,
    TaxRules,
    Categories,
    Products,
    Publish,
}

impl ImportStep {
    /// Import order is fixed: the index must exist before anything is
    /// imported into it, and publish always runs last.
    pub const ALL: [ImportStep; 5] = [
        ImportStep::New,
        ImportStep::TaxRules,
        ImportStep::Categories,
        ImportStep::Products,
        ImportStep::Publish,
    ];

    pub fn argument(self) -> &'static str {
        match self {
            ImportStep::New => "new",
            ImportStep::TaxRules => "taxrules",
            ImportStep::Categories => "categories",
            ImportStep::Products => "products",
            ImportStep::Publish => "publish",
        }
    }

    pub fn failure_message(self) -> &'static str {
        match self {
            ImportStep::New => "Can't create elasticsearch index.",
            ImportStep::TaxRules => "Can't import the taxrules",
            ImportStep::Categories => "Can't import the categories",
            ImportStep::Products => "Can't import the products",
            ImportStep::Publish => "Can't publish the index",
        }
    }
}

/// Runs the external importer once per step. Paths are resolved against
/// the integration package root the tool is started from, where the
/// importer lives at `src/index.js`.
pub struct Importer {
    program: String,
    base_args: Vec<String>,
    workdir: PathBuf,
}

impl Importer {
    pub fn new() -> Self {
        Self::with_command("node", vec!["index.js".to_string()], "src")
    }

    pub fn with_command(
        program: impl Into<String>,
        base_args: Vec<String>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            base_args,
            workdir: workdir.into(),
        }
    }

    /// Runs all import steps in order, stopping at the first failure.
    pub async fn run_all(&self, logs: &LogSinks) -> Result<()> {
        message::info("Starting the Pimcore importer...");

        for step in ImportStep::ALL {
            self.run_step(step, logs).await?;
        }

        Ok(())
    }

    async fn run_step(&self, step: ImportStep, logs: &LogSinks) -> Result<()> {
        info!("Running import step '{}'", step.argument());

        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg(step.argument())
            .current_dir(&self.workdir)
            .output()
            .await
            .map_err(|e| {
                error!("Failed to spawn import step '{}': {}", step.argument(), e);
                anyhow!(step.failure_message())
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.is_empty() {
            print!("{}", stdout);
        }
        if !stderr.is_empty() {
            eprint!("{}", stderr);
        }
        logs.append_install(&format!(
            "--- {} ---\n{}{}",
            step.argument(),
            stdout,
            stderr
        ));

        if !output.status.success() {
            error!(
                "Import step '{}' exited with {}",
                step.argument(),
                output.status
            );
            return Err(anyhow!(step.failure_message()));
        }

        Ok(())
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}
