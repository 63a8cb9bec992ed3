//! # CLI Module
//!
//! Command-line front end of the `xgen-mixin` binary.
//!
//! ## Commands
//!
//! ### `apply`
//!
//! Patch generated model packages with the known mixins:
//!
//! ```bash
//! xgen-mixin apply models/default models/cache \
//!     --mixin-dir mixins --mixin-ns example.com/app/mixins
//! ```
//!
//! Options:
//! - `--mixin-dir <DIR>` - User mixin library (default: `[reverse].mixin_dir`)
//! - `--mixin-ns <PATH>` - Import path of the library (default: `[reverse].mixin_ns`)
//! - `--deep` - Let local mixins grow from smaller declarations
//! - `--no-format` - Skip `gofmt`/`goimports`
//! - `-j, --jobs <N>` - Directories patched in parallel
//!
//! Without directories the targets come from `xgen.toml`
//! (`[reverse].output_dir` joined with each of `connections`).
//!
//! ### `discover`
//!
//! List the mixins a directory would contribute:
//!
//! ```bash
//! xgen-mixin discover --dir mixins --namespace example.com/app/mixins --json
//! ```
//!
//! ### `prettify`
//!
//! Format a package, optionally renaming its package clause:
//!
//! ```bash
//! xgen-mixin prettify --dir models/default --package default
//! ```
//!
//! ## Exit status
//!
//! `0` on success, `1` when some file failed fatally, `2` when the run
//! could not start (bad config, unreadable directory).
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use xgen_mixin::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! let ok = run_cli(cli)?;
//! # let _ = ok;
//! # Ok::<(), anyhow::Error>(())
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};
