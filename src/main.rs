//! app-aggregator - build-time application aggregator
//!
//! A CLI tool the bundler configuration calls to assemble independently
//! developed sub-applications into one front-end build: it discovers them,
//! merges their menus, links their sources and rewrites the dev-only
//! routing module for static builds.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration or filesystem error (the build must abort)

mod cli;
mod config;
mod context;
mod discovery;
mod error;
mod link;
mod menu;
mod models;
mod pipeline;
mod transform;

use anyhow::{Context, Result};
use cli::{Args, Commands, ResolveArgs, TransformArgs};
use config::{Config, CONFIG_FILE_NAME};
use error::AggregateError;
use pipeline::Aggregator;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;
use transform::{module_file, RouteTransform};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(&args);

    debug!("app-aggregator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        // Domain errors already carry their cause in the message.
        let (kind, message) = match e.downcast_ref::<AggregateError>() {
            Some(err) if err.is_configuration_error() => ("Configuration error", err.to_string()),
            Some(err) => ("Filesystem error", err.to_string()),
            None => ("Error", format!("{:#}", e)),
        };
        error!("{}: {}", kind, message);
        eprintln!("\n❌ {}: {}", kind, message);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr; stdout is reserved for command output.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

fn run(args: Args) -> Result<()> {
    let root = std::fs::canonicalize(&args.root)
        .with_context(|| format!("Failed to resolve aggregator root: {}", args.root.display()))?;

    match args.command {
        Commands::Resolve(ref resolve) => handle_resolve(&args, &root, resolve),
        Commands::Transform(ref transform) => handle_transform(&args, &root, transform),
        Commands::InitConfig => handle_init_config(&root),
    }
}

/// Handle `init-config`: generate a default .aggregator.toml.
fn handle_init_config(root: &Path) -> Result<()> {
    let path = root.join(CONFIG_FILE_NAME);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            path.display()
        );
    }

    let content = Config::default_toml();
    std::fs::write(&path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Edit it to customize layout, menu merging and module resolution.");
    Ok(())
}

/// Handle `resolve`: run the configuration pass and emit the build context.
fn handle_resolve(args: &Args, root: &Path, resolve: &ResolveArgs) -> Result<()> {
    let mut config = load_config(args, root)?;
    config.merge_with_args(resolve);

    let mode = resolve.build_mode();
    info!("Resolving {} build in {}", mode, root.display());

    let aggregator = Aggregator::new(root.to_path_buf(), mode, config.clone())
        .with_progress(!args.quiet)
        .with_dry_run(resolve.dry_run);

    let build_context = aggregator.resolve()?;

    if config.general.output == "-" {
        let json = context::generate_json(&build_context)
            .context("Failed to serialize build context")?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", json).context("Failed to write build context to stdout")?;
    } else if resolve.dry_run {
        info!(
            "Dry run: build context not written to {}",
            config.general.output
        );
    } else {
        let output = root.join(PathBuf::from(&config.general.output));
        context::write_context(&build_context, &output)?;
    }

    if !args.quiet {
        eprintln!(
            "✅ {} build resolved: {} applications, {} aliases",
            build_context.mode(),
            build_context.applications().len(),
            build_context.aliases().len()
        );
    }

    Ok(())
}

/// Handle `transform`: print the module's replacement or its original source.
fn handle_transform(args: &Args, root: &Path, transform: &TransformArgs) -> Result<()> {
    let config = load_config(args, root)?;
    let hook = RouteTransform::new(transform.build_mode(), config.transform.dev_routes_module);

    let source_path = transform
        .input
        .clone()
        .unwrap_or_else(|| module_file(root, &transform.id));

    // The stub ignores the original source, so it is only read on pass-through.
    let code = match hook.transform("", &transform.id) {
        Some(output) => {
            info!("Replaced {} with the route stub", transform.id);
            output.code
        }
        None => {
            debug!("{} passes through unchanged", transform.id);
            std::fs::read_to_string(&source_path)
                .with_context(|| format!("Failed to read module source: {}", source_path.display()))?
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(code.as_bytes())
        .context("Failed to write transformed module")?;
    Ok(())
}

/// Load configuration from an explicit file, the aggregator root, or defaults.
fn load_config(args: &Args, root: &Path) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_from_root(root)? {
        Some(config) => {
            info!("Loaded config from {}", root.join(CONFIG_FILE_NAME).display());
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
