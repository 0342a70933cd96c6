//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{BuildMode, CollisionPolicy, LinkStrategy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// app-aggregator - assemble sub-applications into one front-end build
///
/// Discovers sibling applications, merges their navigation menus, links
/// their sources into the aggregator and emits the build context the
/// bundler consumes.
///
/// Examples:
///   app-aggregator resolve --mode development
///   app-aggregator resolve --mode production --output -
///   app-aggregator --root ./htdoc resolve --mode development --strategy alias
///   app-aggregator transform --mode production src/router/development.js
///   app-aggregator init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Aggregator root (the directory holding the bundler config)
    #[arg(
        short,
        long,
        global = true,
        default_value = ".",
        value_name = "DIR",
        env = "AGGREGATOR_ROOT"
    )]
    pub root: PathBuf,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aggregator.toml in the aggregator root
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Discover, merge and link applications, then write the build context
    Resolve(ResolveArgs),

    /// Apply the route transform to one module
    Transform(TransformArgs),

    /// Generate a default .aggregator.toml configuration file
    InitConfig,
}

/// Arguments for `resolve`.
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Build mode reported by the bundler
    ///
    /// Only `development` runs discovery; any other value is a static build.
    #[arg(short, long, env = "AGGREGATOR_MODE", value_name = "MODE")]
    pub mode: String,

    /// Where to write the build context (`-` for stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Directory holding the sub-applications
    #[arg(long, value_name = "DIR")]
    pub applications_root: Option<PathBuf>,

    /// Base navigation menu file
    #[arg(long, value_name = "FILE")]
    pub base_menu: Option<PathBuf>,

    /// How application sources are wired into the build
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<LinkStrategy>,

    /// What to do when menus declare the same key
    #[arg(long, value_name = "POLICY")]
    pub on_collision: Option<CollisionPolicy>,

    /// Show what would be linked without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,
}

impl ResolveArgs {
    pub fn build_mode(&self) -> BuildMode {
        BuildMode::from_mode_str(&self.mode)
    }
}

/// Arguments for `transform`.
#[derive(Parser, Debug, Clone)]
pub struct TransformArgs {
    /// Build mode reported by the bundler
    #[arg(short, long, env = "AGGREGATOR_MODE", value_name = "MODE")]
    pub mode: String,

    /// Module identifier as seen by the bundler
    #[arg(value_name = "MODULE_ID")]
    pub id: String,

    /// Read the module source from this file instead of MODULE_ID
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

impl TransformArgs {
    pub fn build_mode(&self) -> BuildMode {
        BuildMode::from_mode_str(&self.mode)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if !self.root.exists() {
            return Err(format!(
                "Aggregator root does not exist: {}",
                self.root.display()
            ));
        }
        if !self.root.is_dir() {
            return Err(format!(
                "Aggregator root is not a directory: {}",
                self.root.display()
            ));
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file not found: {}", config.display()));
            }
        }

        if let Commands::Resolve(ref resolve) = self.command {
            if resolve.mode.trim().is_empty() {
                return Err("Build mode must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Commands) -> Args {
        Args {
            root: PathBuf::from("."),
            config: None,
            verbose: false,
            quiet: false,
            command,
        }
    }

    fn resolve_command(mode: &str) -> Commands {
        Commands::Resolve(ResolveArgs {
            mode: mode.to_string(),
            output: None,
            applications_root: None,
            base_menu: None,
            strategy: None,
            on_collision: None,
            dry_run: false,
        })
    }

    #[test]
    fn test_parse_resolve() {
        let args = Args::try_parse_from([
            "app-aggregator",
            "resolve",
            "--mode",
            "development",
            "--strategy",
            "alias",
            "--on-collision",
            "error",
            "-o",
            "-",
        ])
        .unwrap();

        match args.command {
            Commands::Resolve(resolve) => {
                assert_eq!(resolve.build_mode(), BuildMode::Development);
                assert_eq!(resolve.strategy, Some(LinkStrategy::Alias));
                assert_eq!(resolve.on_collision, Some(CollisionPolicy::Error));
                assert_eq!(resolve.output.as_deref(), Some("-"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_transform() {
        let args = Args::try_parse_from([
            "app-aggregator",
            "--root",
            "/tmp",
            "transform",
            "--mode",
            "production",
            "src/router/development.js",
        ])
        .unwrap();

        assert_eq!(args.root, PathBuf::from("/tmp"));
        match args.command {
            Commands::Transform(transform) => {
                assert_eq!(transform.build_mode(), BuildMode::Production);
                assert_eq!(transform.id, "src/router/development.js");
                assert!(transform.input.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(resolve_command("development"));
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_root() {
        let mut args = make_args(Commands::InitConfig);
        args.root = PathBuf::from("/definitely/not/here");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_empty_mode() {
        let args = make_args(resolve_command("  "));
        assert!(args.validate().is_err());

        let args = make_args(resolve_command("staging"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Commands::InitConfig);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
