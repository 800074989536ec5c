//! CLI route: run context and dispatch to builder, loader, and catalog.

use crate::archive::{self, LoadedCrate};
use crate::builder;
use crate::catalog::{Catalog, CrateSummary};
use crate::cli::parse::Commands;
use crate::config::{ConfigLoader, CratepackConfig};
use crate::error::CliError;
use crate::manifest::Manifest;
use comfy_table::Table;
use std::path::{Path, PathBuf};
use tracing::info;

/// Runtime context for CLI execution: resolved configuration only; domain
/// modules are stateless.
pub struct RunContext {
    config: CratepackConfig,
}

impl RunContext {
    /// Create run context from an optional explicit config path.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self { config })
    }

    /// Execute one parsed command, returning the text to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, CliError> {
        match command {
            Commands::Build { source, output } => {
                let output_dir = self.output_dir(output.as_deref());
                let crate_path = builder::build(source, &output_dir)?;
                Ok(format!("Created crate: {}", crate_path.display()))
            }
            Commands::Batch {
                modules_dir,
                output,
            } => {
                let output_dir = self.output_dir(output.as_deref());
                let outcomes = builder::build_all(modules_dir, &output_dir)?;

                let mut lines = Vec::with_capacity(outcomes.len() + 1);
                let mut failed = 0;
                for outcome in &outcomes {
                    match &outcome.result {
                        Ok(path) => lines.push(format!("built   {}", path.display())),
                        Err(e) => {
                            failed += 1;
                            lines.push(format!(
                                "failed  {}: {}",
                                outcome.module.display(),
                                e
                            ));
                        }
                    }
                }
                lines.push(format!(
                    "{} built, {} failed",
                    outcomes.len() - failed,
                    failed
                ));
                Ok(lines.join("\n"))
            }
            Commands::Verify { target, crates_dir } => {
                let crate_path = self.resolve_target(target, crates_dir.as_deref())?;
                let loaded = LoadedCrate::open_with_staging(
                    &crate_path,
                    self.config.staging_root.as_deref(),
                )?;
                if loaded.verify()? {
                    info!(crate_path = %crate_path.display(), "Integrity verified");
                    Ok(format!("ok: {} verified", crate_path.display()))
                } else {
                    Err(CliError::IntegrityFailed(crate_path))
                }
            }
            Commands::Inspect {
                target,
                format,
                crates_dir,
            } => {
                let crate_path = self.resolve_target(target, crates_dir.as_deref())?;
                let manifest = archive::read_manifest(&crate_path)?;
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(&manifest)
                        .map_err(|e| CliError::Build(e.into())),
                    "text" => Ok(format_manifest_text(&crate_path, &manifest)),
                    other => Err(CliError::InvalidFormat(other.to_string())),
                }
            }
            Commands::List { crates_dir, format } => {
                let dir = crates_dir
                    .clone()
                    .unwrap_or_else(|| self.config.crates_dir.clone());
                let catalog = Catalog::scan(&dir)?;
                match format.as_str() {
                    "json" => serde_json::to_string_pretty(catalog.crates())
                        .map_err(|e| CliError::Build(e.into())),
                    "text" => Ok(format_catalog_table(catalog.crates())),
                    other => Err(CliError::InvalidFormat(other.to_string())),
                }
            }
        }
    }

    fn output_dir(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.crates_dir.clone())
    }

    /// A target is either a crate file on disk or an identifier resolved
    /// through the crates directory.
    fn resolve_target(
        &self,
        target: &str,
        crates_dir: Option<&Path>,
    ) -> Result<PathBuf, CliError> {
        let as_path = Path::new(target);
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }

        let dir = crates_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.crates_dir.clone());
        let catalog = Catalog::scan(&dir)?;
        catalog
            .resolve(target)
            .map(|c| c.path.clone())
            .ok_or_else(|| CliError::ModuleNotFound(target.to_string()))
    }
}

fn format_manifest_text(crate_path: &Path, manifest: &Manifest) -> String {
    let stem = crate_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut lines = vec![
        format!("crate:   {}", crate_path.display()),
        format!("name:    {}", manifest.display_name(&stem)),
        format!("version: {}", manifest.version),
    ];
    if let Some(slug) = &manifest.slug {
        lines.push(format!("slug:    {slug}"));
    }
    lines.push(format!("files:   {}", manifest.hashes.len()));
    lines.push(format!("tasks:   {}", manifest.tasks.len()));
    lines.join("\n")
}

fn format_catalog_table(crates: &[CrateSummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Crate", "Name", "Slug", "Tasks"]);
    for summary in crates {
        table.add_row(vec![
            summary.stem.clone(),
            summary.display_name.clone(),
            summary.slug.clone().unwrap_or_default(),
            summary.task_count.to_string(),
        ]);
    }
    table.to_string()
}
