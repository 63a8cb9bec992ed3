use std::sync::Arc;

use super::registry::Registry;
use super::summary::StructureSummary;

/// Matches declarations against a shared default layer plus a private
/// local layer.
///
/// The default layer is built once, filled by discovery, then frozen in an
/// `Arc` and handed to every `Composer`. Holding it behind `Arc` is what
/// orders discovery before any patch pass: nothing can register into it
/// through a shared handle.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    local: Registry,
    global: Option<Arc<Registry>>,
    reverse: bool,
}

impl Composer {
    pub fn new(global: Arc<Registry>) -> Self {
        Self {
            local: Registry::new(),
            global: Some(global),
            reverse: false,
        }
    }

    /// A composer without a default layer.
    pub fn standalone() -> Self {
        Self::default()
    }

    /// Lets local mixins grow from smaller declarations (reverse matching).
    pub fn with_reverse_matching(mut self, enabled: bool) -> Self {
        self.reverse = enabled;
        self
    }

    pub fn local(&self) -> &Registry {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut Registry {
        &mut self.local
    }

    pub fn global(&self) -> Option<&Arc<Registry>> {
        self.global.as_ref()
    }

    pub fn register_substitute(&mut self, summary: StructureSummary) -> bool {
        self.local.register_substitute(summary)
    }

    /// Registers into the default layer seen by this composer.
    ///
    /// Copy-on-write: other composers sharing the old layer keep it.
    pub fn register_global_substitute(&mut self, summary: StructureSummary) -> bool {
        let global = self
            .global
            .get_or_insert_with(|| Arc::new(Registry::new()));
        Arc::make_mut(global).register_substitute(summary)
    }

    pub fn remove_substitute(&mut self, name: &str) {
        self.local.remove_substitute(name);
    }

    /// Folds every matching mixin into `target`.
    ///
    /// The default layer goes first (never reverse-matched), then the
    /// local layer newest first. Returns the mixins whose import the
    /// target now needs.
    pub fn substitute_summary(
        &mut self,
        target: &mut StructureSummary,
        verbose: bool,
    ) -> Vec<Arc<StructureSummary>> {
        let mut subs = Vec::new();
        if let Some(global) = self.global.as_ref().filter(|layer| !layer.is_empty()) {
            subs.extend(global.scan(target, false, verbose).imports);
        }
        let local = self.local.scan(target, self.reverse, verbose);
        for grown in local.grown {
            self.local.insert(grown);
        }
        subs.extend(local.imports);
        subs
    }
}
