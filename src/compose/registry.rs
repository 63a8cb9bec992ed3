//! One layer of known mixins.
//!
//! Entries live in an append-only arena of immutable snapshots; the name
//! index points at the current snapshot. Overwriting or growing a mixin
//! pushes a new snapshot and moves the index, so an `Arc` handed out
//! earlier keeps seeing the value it was given.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::matching::scan_and_use_mixins;
use super::summary::StructureSummary;

/// Import path of the built-in mixins.
pub const XQUERY_IMPORT: &str = "github.com/azhai/xgen/xquery";
/// Alias the built-in mixins are imported under.
pub const XQUERY_ALIAS: &str = "xq";

/// Ordered set of mixins; later registrations take priority.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    names: Vec<String>,
    index: HashMap<String, Option<usize>>,
    arena: Vec<Arc<StructureSummary>>,
}

/// What a scan over one layer produced.
#[derive(Debug, Default)]
pub(crate) struct ScanOutcome {
    pub(crate) imports: Vec<Arc<StructureSummary>>,
    pub(crate) grown: Vec<StructureSummary>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The default layer: xquery's nested-set and time-tracking mixins.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.insert(
            StructureSummary::from_lines(
                "xq.NestedMixin",
                [
                    "Lft   int `json:\"lft\" xorm:\"notnull default 0 comment('left edge') INT(10)\"`             // left edge",
                    "Rgt   int `json:\"rgt\" xorm:\"notnull default 0 comment('right edge') index INT(10)\"`      // right edge",
                    "Depth int `json:\"depth\" xorm:\"notnull default 1 comment('depth') index TINYINT(3)\"`     // depth",
                ],
            )
            .with_import(XQUERY_IMPORT, XQUERY_ALIAS),
        );
        registry.insert(
            StructureSummary::from_lines(
                "xq.TimeMixin",
                [
                    "CreatedAt time.Time `json:\"created_at\" xorm:\"created comment('created at') TIMESTAMP\"`       // created at",
                    "UpdatedAt time.Time `json:\"updated_at\" xorm:\"updated comment('updated at') TIMESTAMP\"`       // updated at",
                    "DeletedAt time.Time `json:\"deleted_at\" xorm:\"deleted comment('deleted at') index TIMESTAMP\"` // deleted at",
                ],
            )
            .with_import(XQUERY_IMPORT, XQUERY_ALIAS),
        );
        registry
    }

    /// No name was ever registered (tombstones count as registered).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.values().filter(|slot| slot.is_some()).count()
    }

    /// Names in priority order, oldest first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StructureSummary>> {
        match self.index.get(name) {
            Some(Some(slot)) => self.arena.get(*slot),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registers `summary` as a reusable mixin.
    ///
    /// Declarations that are already an alias of another mixin, and
    /// unnamed ones, are ignored. Returns whether the entry was stored.
    pub fn register_substitute(&mut self, summary: StructureSummary) -> bool {
        if summary.is_exists || summary.name.is_empty() {
            return false;
        }
        self.insert(summary);
        true
    }

    /// Tombstones `name`; its priority slot is kept.
    pub fn remove_substitute(&mut self, name: &str) {
        if let Some(slot) = self.index.get_mut(name) {
            *slot = None;
        }
    }

    pub(crate) fn insert(&mut self, summary: StructureSummary) {
        if !self.index.contains_key(&summary.name) {
            self.names.push(summary.name.clone());
        }
        let slot = self.arena.len();
        self.index.insert(summary.name.clone(), Some(slot));
        self.arena.push(Arc::new(summary));
    }

    /// Matches `target` against every live entry, newest first.
    ///
    /// Children of a mixin matched earlier in the same scan are skipped:
    /// they were folded into that mixin already.
    pub(crate) fn scan(
        &self,
        target: &mut StructureSummary,
        allow_reverse: bool,
        verbose: bool,
    ) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let mut absorbed: HashSet<&str> = HashSet::new();
        for name in self.names.iter().rev() {
            if *name == target.name || absorbed.contains(name.as_str()) {
                continue;
            }
            let Some(fragment) = self.get(name) else {
                continue;
            };
            let result = scan_and_use_mixins(target, fragment, allow_reverse, verbose);
            if result.matched {
                target.children.push(name.clone());
                absorbed.extend(fragment.children.iter().map(String::as_str));
            }
            if result.needs_import {
                outcome.imports.push(Arc::clone(fragment));
            }
            if let Some(grown) = result.grown {
                outcome.grown.push(grown);
            }
        }
        outcome
    }
}
