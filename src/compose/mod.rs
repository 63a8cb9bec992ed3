//! # Compose Module
//!
//! The mixin composition engine: decides which reusable field groups
//! ("mixins") a generated model contains and folds them into one embedded
//! field.
//!
//! ## Overview
//!
//! Each generated struct becomes a [`StructureSummary`]: its field lines
//! plus one *feature* per line (`name:type`, or `name:inline` for embeds).
//! The sorted features are the summary's fingerprint. A mixin matches a
//! model when the mixin's fingerprint is a subset of the model's.
//!
//! ```text
//! type User struct {                  type User struct {
//!     Id        int                       Id int
//!     CreatedAt time.Time      ==>        xq.TimeMixin `json:",inline" xorm:"extends"`
//!     UpdatedAt time.Time             }
//!     DeletedAt time.Time
//! }
//! ```
//!
//! ## Layers
//!
//! - The **default layer** ([`Registry::with_defaults`]) holds `xq.TimeMixin`
//!   and `xq.NestedMixin`, plus every user mixin found by discovery. It is
//!   frozen in an `Arc` before any file is patched.
//! - The **local layer** of a [`Composer`] is private to one directory pass
//!   and grows as declarations are processed, so a model can match another
//!   model declared earlier in the same pass.
//!
//! Candidates are tried newest first, so a larger mixin registered after a
//! smaller one wins.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use xgen_mixin::compose::{Composer, Registry, StructureSummary};
//!
//! let defaults = Arc::new(Registry::with_defaults());
//! let mut composer = Composer::new(defaults);
//! let mut user = StructureSummary::from_lines("User", [
//!     "Id int `json:\"id\"`",
//!     "CreatedAt time.Time `json:\"created_at\"`",
//!     "UpdatedAt time.Time `json:\"updated_at\"`",
//!     "DeletedAt time.Time `json:\"deleted_at\"`",
//! ]);
//! let imports = composer.substitute_summary(&mut user, false);
//! assert!(user.is_changed);
//! assert_eq!(imports[0].import_path, "github.com/azhai/xgen/xquery");
//! ```

mod composer;
mod feature;
mod matching;
mod registry;
mod summary;

#[cfg(test)]
mod tests;

pub use composer::Composer;
pub use feature::{is_inline_feature, line_feature, INLINE_SUFFIX, MODEL_EXTENDS};
pub use matching::{is_reserved, is_subset, scan_and_use_mixins, MatchOutcome, RESERVED_PREFIXES};
pub use registry::{Registry, XQUERY_ALIAS, XQUERY_IMPORT};
pub use summary::{StructureSummary, COMMENT_MAX_CHARS};
