mod registry;
mod settings;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use registry::{
    RunContext, RunOptions, init_console_logging, init_run_logging, start_run,
    write_reconcile_report,
};
use settings::{Settings, SettingsError, load_settings};
use telestar_catalog::{
    CATALOG_VERSION, Catalog, CatalogError, ValidationIssue, build_fk_graph_report,
    catalog_json_schema_value, load_catalog, validate_catalog, validate_catalog_against_store,
};
use telestar_core::TableStore;
use telestar_eval::{EvalError, audit, ensure_clean, render_report, write_audit};
use telestar_reconcile::{
    ReconcileError, ReconcileOptions, Reconciler, RewritePolicy, build_time_dimension,
    load_store_dir, telecom_time_sources, write_store_dir,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),
    #[error("audit error: {0}")]
    Eval(#[from] EvalError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(name = "telestar", version, about = "Telestar referential-integrity toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pad, reconcile and audit a directory of CSV tables.
    Reconcile(ReconcileArgs),
    /// Audit a directory of CSV tables without changing it.
    Audit(AuditArgs),
    /// Inspect the relationship catalog.
    Catalog(CatalogArgs),
}

#[derive(Args, Debug)]
struct ReconcileArgs {
    /// Directory holding one CSV file per table.
    #[arg(long)]
    input: PathBuf,
    /// Catalog JSON file; the built-in telecom catalog when absent.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Which foreign rows are rewritten: recheck or snapshot.
    #[arg(long, value_name = "POLICY")]
    rewrite: Option<RewritePolicy>,
    /// Skip the sentinel padding pass.
    #[arg(long, default_value_t = false)]
    no_padding: bool,
    /// Rebuild Time_Dimension from the datetime columns before reconciling.
    #[arg(long, default_value_t = false)]
    derive_time_dimension: bool,
    /// Upper bound on passes over the relationship list.
    #[arg(long)]
    max_passes: Option<usize>,
    /// Exit non-zero when the final audit finds violations.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Settings file (defaults to ./telestar.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AuditArgs {
    /// Directory holding one CSV file per table.
    #[arg(long)]
    input: PathBuf,
    /// Catalog JSON file; the built-in telecom catalog when absent.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Limit the number of examples per relationship in the report.
    #[arg(long)]
    max_examples: Option<usize>,
    /// Exit non-zero when violations are found.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Settings file (defaults to ./telestar.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CatalogArgs {
    #[command(subcommand)]
    command: CatalogCommand,
    /// Catalog JSON file; the built-in telecom catalog when absent.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print the catalog as JSON.
    Show,
    /// Print the JSON Schema for catalog files.
    Schema,
    /// Print the FK dependency report.
    Graph,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Reconcile(args) => run_reconcile(args),
        Command::Audit(args) => run_audit(args),
        Command::Catalog(args) => run_catalog(args),
    }
}

fn run_reconcile(args: ReconcileArgs) -> Result<(), CliError> {
    let settings = load_settings(args.config.as_deref())?;
    let options = resolve_reconcile_options(&args, &settings);
    let strict = args.strict || settings.strict;
    let derive_time_dimension = args.derive_time_dimension || settings.derive_time_dimension;

    let (catalog, catalog_warnings) = resolve_catalog(args.catalog.as_deref())?;

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        catalog_version: catalog.catalog_version.clone(),
        strict,
        run_dir: args.run_dir.unwrap_or(settings.run_dir),
        options: RunOptions {
            input: args.input.clone(),
            catalog: args.catalog.clone(),
            rewrite: options.rewrite,
            padding: options.pad_primary_tables,
            derive_time_dimension,
            max_passes: options.max_passes,
            max_examples: settings.max_examples,
        },
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, input = %args.input.display());
    log_catalog_warnings(&catalog_warnings);

    let timer = Instant::now();
    let mut store = load_store(&args.input, &catalog)?;

    if derive_time_dimension {
        let dimension = build_time_dimension(&store, &telecom_time_sources())?;
        for issue in &dimension.issues {
            tracing::warn!(
                event = "time_dimension_issue",
                code = %issue.code,
                message = %issue.message
            );
        }
        tracing::info!(event = "time_dimension_derived", rows = dimension.table.row_count());
        store.replace(dimension.table);
    }

    let report = Reconciler::new(options).run(&catalog, &mut store);
    write_reconcile_report(&run_paths, &report)?;
    tracing::info!(event = "report_written", path = %run_paths.report_path.display());

    write_store_dir(&run_paths.tables_dir, &store)?;

    let audit_report = audit(&catalog.relationships, &store);
    let audit_paths = write_audit(&run_paths.run_root, &audit_report, settings.max_examples)?;
    tracing::info!(
        event = "audit_written",
        path = %audit_paths.report_path.display(),
        violations = audit_report.violations.len()
    );

    let duration_ms = timer.elapsed().as_millis();
    let status = if audit_report.is_clean() { "success" } else { "violations" };
    tracing::info!(event = "run_finished", status = status, duration_ms = duration_ms);
    println!("{}", run_paths.run_root.display());

    if strict {
        ensure_clean(&audit_report)?;
    }

    Ok(())
}

fn run_audit(args: AuditArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let settings = load_settings(args.config.as_deref())?;
    let max_examples = args.max_examples.unwrap_or(settings.max_examples);
    let strict = args.strict || settings.strict;

    let (catalog, catalog_warnings) = resolve_catalog(args.catalog.as_deref())?;
    log_catalog_warnings(&catalog_warnings);

    let store = load_store(&args.input, &catalog)?;
    let report = audit(&catalog.relationships, &store);
    println!("{}", render_report(&report, max_examples));

    if strict {
        ensure_clean(&report)?;
    }

    Ok(())
}

fn run_catalog(args: CatalogArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let output = match args.command {
        CatalogCommand::Schema => catalog_json_schema_value()?,
        CatalogCommand::Show => {
            let (catalog, catalog_warnings) = resolve_catalog(args.catalog.as_deref())?;
            log_catalog_warnings(&catalog_warnings);
            serde_json::to_value(&catalog)?
        }
        CatalogCommand::Graph => {
            let (catalog, _) = resolve_catalog(args.catalog.as_deref())?;
            serde_json::to_value(build_fk_graph_report(&catalog))?
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn resolve_reconcile_options(args: &ReconcileArgs, settings: &Settings) -> ReconcileOptions {
    ReconcileOptions {
        rewrite: args.rewrite.unwrap_or(settings.rewrite),
        pad_primary_tables: settings.padding && !args.no_padding,
        max_passes: args.max_passes.unwrap_or(settings.max_passes),
    }
}

fn resolve_catalog(path: Option<&Path>) -> Result<(Catalog, Vec<ValidationIssue>), CliError> {
    match path {
        Some(path) => {
            let validated = load_catalog(path)?;
            Ok((validated.catalog, validated.warnings))
        }
        None => {
            let catalog = Catalog::telecom();
            let report = validate_catalog(&catalog);
            if !report.is_ok() {
                return Err(CliError::InvalidConfig(format!(
                    "built-in catalog is invalid (expected version {CATALOG_VERSION})"
                )));
            }
            Ok((catalog, report.warnings))
        }
    }
}

fn load_store(input: &Path, catalog: &Catalog) -> Result<TableStore, CliError> {
    let store = load_store_dir(input)?;
    let report = validate_catalog_against_store(catalog, &store);
    for issue in &report.warnings {
        tracing::warn!(
            event = "catalog_store_mismatch",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }
    tracing::info!(event = "input_loaded", tables = store.len());
    Ok(store)
}

fn log_catalog_warnings(warnings: &[ValidationIssue]) {
    for issue in warnings {
        tracing::warn!(
            event = "catalog_warning",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }
}
