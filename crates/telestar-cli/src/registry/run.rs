use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use telestar_reconcile::{ReconcileReport, RewritePolicy};

use super::{RegistryError, RegistryResult};

/// Serializable options for reconcile runs.
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    pub input: PathBuf,
    pub catalog: Option<PathBuf>,
    pub rewrite: RewritePolicy,
    pub padding: bool,
    pub derive_time_dimension: bool,
    pub max_passes: usize,
    pub max_examples: usize,
}

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub catalog_version: String,
    pub strict: bool,
    pub run_dir: PathBuf,
    pub options: RunOptions,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub catalog_version: String,
    pub strict: bool,
    pub options: RunOptions,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub run_root: PathBuf,
    pub tables_dir: PathBuf,
    pub logs_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let run_root = ctx
        .run_dir
        .join(format!("{timestamp}__run_{}", ctx.run_id));

    let tables_dir = run_root.join("tables");
    create_dir_all(&tables_dir)?;

    let config_path = run_root.join("config.json");
    let logs_path = run_root.join("logs.ndjson");
    let report_path = run_root.join("reconcile_report.json");

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        catalog_version: ctx.catalog_version.clone(),
        strict: ctx.strict,
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        run_root,
        tables_dir,
        logs_path,
        report_path,
    })
}

pub fn write_reconcile_report(paths: &RunPaths, report: &ReconcileReport) -> RegistryResult<()> {
    write_json(&paths.report_path, report)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_run_creates_layout() {
        let base = std::env::temp_dir().join(format!("telestar_runs_{}", uuid::Uuid::new_v4()));
        let ctx = RunContext {
            run_id: "abc".to_string(),
            started_at: Utc::now(),
            catalog_version: "0.1".to_string(),
            strict: true,
            run_dir: base.clone(),
            options: RunOptions {
                input: PathBuf::from("data"),
                catalog: None,
                rewrite: RewritePolicy::Snapshot,
                padding: true,
                derive_time_dimension: false,
                max_passes: 16,
                max_examples: 20,
            },
        };

        let paths = start_run(&ctx).expect("start run");
        assert!(paths.tables_dir.is_dir());
        assert!(paths.logs_path.is_file());
        assert!(
            paths
                .run_root
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("__run_abc"))
        );

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(paths.run_root.join("config.json")).expect("read config"),
        )
        .expect("parse config");
        assert_eq!(config["options"]["rewrite"], "snapshot");
        assert_eq!(config["strict"], true);

        let _ = std::fs::remove_dir_all(&base);
    }
}
