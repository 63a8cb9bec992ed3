use crate::compose::Registry;
use crate::config::{load_settings, resolve_config_path, Settings};
use crate::discovery::{discover_mixins, prepare_mixins};
use crate::format::{rewrite_package, GoFormatter};
use crate::patcher::{run_batch, PatchOptions};
use crate::source::ADAPTIVE_ALIAS;
use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Command-line interface for xgen-mixin
///
/// Folds field groups shared between generated Go models into embedded
/// mixins and keeps the rewritten files formatted.
#[derive(Parser, Debug)]
#[command(name = "xgen-mixin", version)]
#[command(about = "Mixin composition for generated Go models", long_about = None)]
pub struct Cli {
    /// Log every substitution decision and every patched file
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Config file (default: ./xgen.toml when present)
    #[arg(long, global = true, env = "XGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fold known mixins into the models of one or more generated packages
    Apply {
        /// Package directories to patch (default: from the config file)
        dirs: Vec<PathBuf>,

        /// User mixin library
        #[arg(long)]
        mixin_dir: Option<PathBuf>,

        /// Import path of the user mixin library
        #[arg(long)]
        mixin_ns: Option<String>,

        /// Let local mixins grow from smaller declarations
        #[arg(long, default_value_t = false)]
        deep: bool,

        /// Write files without running gofmt/goimports
        #[arg(long, default_value_t = false)]
        no_format: bool,

        /// Directories processed in parallel (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List the mixins a directory would contribute
    Discover {
        /// Directory to scan (default: the configured mixin library)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Import path of the directory
        #[arg(long)]
        namespace: Option<String>,

        /// Qualifier for the names; `#` uses each file's package name
        #[arg(long, default_value = ADAPTIVE_ALIAS)]
        alias: String,

        /// Print JSON instead of one name per line
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Run every .go file of a directory through the formatter
    Prettify {
        /// Package directory
        #[arg(short, long)]
        dir: PathBuf,

        /// Rename the package clause of every file
        #[arg(long)]
        package: Option<String>,

        /// Skip the goimports pass
        #[arg(long, default_value_t = false)]
        no_format_imports: bool,
    },
}

#[derive(Debug, Serialize)]
struct DiscoverOutput<'a> {
    dir: &'a Path,
    namespace: &'a str,
    mixins: Vec<String>,
}

/// Execute a parsed command line
///
/// Returns `Ok(false)` when the command ran but at least one file failed
/// fatally.
pub fn run_cli(cli: Cli) -> anyhow::Result<bool> {
    let work_dir = std::env::current_dir().context("Failed to read working directory")?;
    let settings = match resolve_config_path(cli.config.as_deref(), &work_dir) {
        Some(path) => load_settings(&path)?,
        None => Settings::default(),
    };

    match cli.command {
        Commands::Apply {
            dirs,
            mixin_dir,
            mixin_ns,
            deep,
            no_format,
            jobs,
        } => {
            let wildcards = settings.mixin.compile()?;
            let mixin_dir = mixin_dir.unwrap_or_else(|| settings.reverse.mixin_dir.clone());
            let mixin_ns = mixin_ns.unwrap_or_else(|| settings.reverse.mixin_ns.clone());
            let (defaults, names) = prepare_mixins(&mixin_dir, &mixin_ns, &wildcards)?;
            info!(count = names.len(), dir = %mixin_dir.display(), "user mixins registered");
            let defaults: Arc<Registry> = Arc::new(defaults);

            let dirs = if dirs.is_empty() {
                settings.reverse.target_dirs()
            } else {
                dirs
            };
            let formatter = if no_format {
                GoFormatter::disabled()
            } else {
                settings.format.formatter()
            };
            let options = PatchOptions {
                verbose: cli.verbose,
                deep_match: deep || settings.reverse.deep_match,
                wildcards,
            };
            let jobs = jobs.unwrap_or_else(|| {
                std::thread::available_parallelism().map_or(1, |n| n.get())
            });

            let mut ok = true;
            let reports = run_batch(&dirs, defaults, &options, &formatter, jobs);
            for (dir, report) in dirs.iter().zip(reports) {
                match report {
                    Ok(report) => {
                        for err in report.errors() {
                            error!(file = %err.path().display(), "{}", err);
                        }
                        ok &= !report.has_fatal();
                        println!(
                            "{}: {} of {} files changed",
                            dir.display(),
                            report.changed().count(),
                            report.files.len()
                        );
                    }
                    Err(err) => {
                        error!(dir = %dir.display(), "{}", err);
                        ok = false;
                    }
                }
            }
            Ok(ok)
        }
        Commands::Discover {
            dir,
            namespace,
            alias,
            json,
        } => {
            let wildcards = settings.mixin.compile()?;
            let dir = dir.unwrap_or_else(|| settings.reverse.mixin_dir.clone());
            let namespace = namespace.unwrap_or_else(|| settings.reverse.mixin_ns.clone());
            let mut registry = Registry::new();
            let mixins = discover_mixins(&mut registry, &dir, &namespace, &alias, &wildcards)?;
            if json {
                let output = DiscoverOutput {
                    dir: &dir,
                    namespace: &namespace,
                    mixins,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for name in mixins {
                    println!("{}", name);
                }
            }
            Ok(true)
        }
        Commands::Prettify {
            dir,
            package,
            no_format_imports,
        } => {
            let mut formatter = settings.format.formatter();
            if no_format_imports {
                formatter = formatter.without_import_grouping();
            }
            match rewrite_package(&dir, package.as_deref(), &formatter) {
                Ok(changed) => {
                    for path in changed {
                        println!("+ {}", path.display());
                    }
                    Ok(true)
                }
                Err(err) if !err.is_fatal() => {
                    error!(file = %err.path().display(), "{}", err);
                    Ok(true)
                }
                Err(err) => Err(err.into()),
            }
        }
    }
}
