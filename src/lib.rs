//! # xgen-mixin
//!
//! **xgen-mixin** rewrites generated Go model files so that field groups
//! shared between models are declared once, as embedded *mixins*, instead
//! of being repeated in every struct.
//!
//! ## Overview
//!
//! A model generator emits one struct per table. Many tables carry the same
//! columns (timestamps, tree links, audit fields). This crate finds those
//! groups and replaces them in place:
//!
//! ```text
//! type User struct {                      type User struct {
//!     Id        int                           Id int
//!     CreatedAt time.Time                     xq.TimeMixin `json:",inline" xorm:"extends"`
//!     UpdatedAt time.Time          ==>    }
//!     DeletedAt time.Time
//! }
//! ```
//!
//! Everything outside the replaced field lists (comments, blank lines,
//! methods, other declarations) is kept byte for byte, apart from the
//! import block, which is repaired after each rewrite.
//!
//! ## Architecture
//!
//! - **[`source`]** - Go declaration parser, span editor and import repair
//! - **[`compose`]** - Field fingerprints, mixin registries and matching
//! - **[`discovery`]** - Registration of `*Core`/`*Mixin` declarations
//! - **[`patcher`]** - File, directory and batch rewrite passes
//! - **[`format`]** - `gofmt`/`goimports` pipeline and package renames
//! - **[`files`]** - Wildcards and recursive `.go` file listing
//! - **[`config`]** - `xgen.toml` settings
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `xgen-mixin` command line
//!
//! ### Patch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(xgen-mixin apply)
//!     participant Disc as discovery::prepare_mixins
//!     participant Batch as patcher::run_batch
//!     participant Dir as patcher::apply_dir_mixins
//!     participant File as patcher::apply_mixins_to_file
//!     participant FS as File System
//!
//!     CLI->>Disc: mixin_dir, mixin_ns
//!     Disc->>FS: parse *Core / *Mixin declarations
//!     Disc-->>CLI: default Registry (frozen in Arc)
//!     CLI->>Batch: target dirs, jobs
//!     Batch->>Dir: one scoped thread per chunk
//!     Dir->>Dir: register local mixins
//!     loop every .go file, path order
//!         Dir->>File: shared Composer
//!         File->>File: match, splice, repair imports
//!         File->>FS: gofmt / goimports, write
//!     end
//!     Batch-->>CLI: DirReport per dir
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::{Path, PathBuf};
//! use std::sync::Arc;
//! use xgen_mixin::{prepare_mixins, run_batch, GoFormatter, PatchOptions, Wildcards};
//!
//! let (defaults, _) = prepare_mixins(
//!     Path::new("mixins"),
//!     "example.com/app/mixins",
//!     &Wildcards::mixin_defaults(),
//! )?;
//! let dirs = vec![PathBuf::from("models/default")];
//! let reports = run_batch(
//!     &dirs,
//!     Arc::new(defaults),
//!     &PatchOptions::default(),
//!     &GoFormatter::from_env(),
//!     2,
//! );
//! for report in reports {
//!     let report = report?;
//!     println!("{}: {} changed", report.dir.display(), report.changed().count());
//! }
//! # Ok::<(), xgen_mixin::MixinError>(())
//! ```

pub mod cli;
pub mod compose;
pub mod config;
pub mod discovery;
pub mod error;
pub mod files;
pub mod format;
pub mod logging;
pub mod patcher;
pub mod source;
pub mod text;

pub use compose::{Composer, Registry, StructureSummary};
pub use discovery::{add_former_mixins, discover_mixins, prepare_mixins};
pub use error::{MixinError, ParseError};
pub use files::Wildcards;
pub use format::{GoFormatter, SourceFormatter};
pub use patcher::{apply_dir_mixins, apply_mixins_to_file, run_batch, DirReport, PatchOptions};
pub use source::GoFile;
