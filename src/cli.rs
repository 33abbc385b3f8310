use crate::{
    config::Config,
    deploy::{CliDeployer, Deployer},
    extract::extract_with_source,
    materialize::materialize,
    util::{ensure_dir, guard_out_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "deploy-artifacts")]
#[command(about = "Extract generated artifacts from a generate report and deploy them")]
pub struct Args {
    /// JSON report written by the generate step.
    pub input: PathBuf,

    /// Target alias passed to the deploy command.
    pub alias: String,

    /// Path to config TOML. If omitted, uses ./deploy-artifacts.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override paths.out_dir.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Write the artifacts but do not run the deploy command.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => match Config::load(&path) {
            Ok(cfg) => cfg,
            Err(err) => {
                let _guard = init_logging(&args, &Config::default(), None);
                return Err(err);
            }
        },
        None => Config::default(),
    };
    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;

    let deployer = CliDeployer::new(&cfg)?;
    run(&args, &cfg, &deployer)
}

/// Extract, materialize, then deploy. Nothing is written if the output root
/// is unsafe or extraction fails, and nothing is deployed if writing fails.
pub fn run(args: &Args, cfg: &Config, deployer: &dyn Deployer) -> Result<()> {
    let out_dir = resolve_out_dir(args, cfg)?;

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading generate output: {}", args.input.display()))?;
    let report: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing generate output: {}", args.input.display()))?;

    let extracted = extract_with_source(&report)?;
    info!(
        "artifacts: {} file(s) from {:?} ({} candidate(s))",
        extracted.artifacts.len(),
        extracted.source,
        extracted.candidates
    );

    let written = materialize(&extracted.artifacts, &out_dir)?;
    info!("wrote {} file(s) to {}", written.len(), out_dir.display());

    let dry_run = args.dry_run || cfg.deploy.dry_run;
    if dry_run {
        info!("dry run; skipping deploy to {}", args.alias);
    } else {
        deployer.deploy(&out_dir, &args.alias)?;
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "input": args.input,
                "alias": args.alias,
                "out_dir": out_dir,
                "source": extracted.source,
                "files": written,
                "deployed": !dry_run,
                "finished": now_rfc3339(),
            }))?
        );
    }

    Ok(())
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("deploy-artifacts.toml");
    default.exists().then_some(default)
}

fn resolve_out_dir(args: &Args, cfg: &Config) -> Result<PathBuf> {
    let raw = args
        .out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let cwd = std::env::current_dir().with_context(|| "current_dir")?;
    guard_out_dir(&raw, &cwd, &args.input)
        .with_context(|| format!("refusing output root {:?}", raw.display().to_string()))
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the summary JSON, so logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = match file_path {
        Some(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            ensure_dir(parent)?;
            let file = std::fs::File::create(path)
                .with_context(|| format!("create log file: {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from("deploy-artifacts.log"))
}
