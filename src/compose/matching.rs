//! Forward and reverse matching of one declaration against one mixin.

use tracing::{debug, info};

use super::summary::StructureSummary;

/// Namespaces of the built-in mixins. They are never grown by a reverse
/// match, otherwise two built-ins could keep absorbing each other.
pub const RESERVED_PREFIXES: [&str; 2] = ["xq.", "xquery."];

/// Name belongs to the built-in mixin namespace.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Every feature of `sub` appears in `sup`. Both slices must be sorted.
///
/// With `strict`, `sub` must also be smaller than `sup`. An empty
/// fingerprint matches nothing.
pub fn is_subset(sub: &[String], sup: &[String], strict: bool) -> bool {
    if sub.is_empty() || (strict && sub.len() >= sup.len()) {
        return false;
    }
    sub.iter().all(|feature| sup.binary_search(feature).is_ok())
}

/// Result of [`scan_and_use_mixins`].
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// The target absorbed the fragment
    pub matched: bool,
    /// The target now references a symbol that must be imported
    pub needs_import: bool,
    /// New version of the fragment after a reverse match
    pub grown: Option<StructureSummary>,
}

/// Tries to fold `fragment` into `target`.
///
/// Forward: the fragment's fields all occur in the target, so they are
/// replaced by one embed line. When both fingerprints have the same length
/// the target becomes a pure alias and is flagged `is_exists`.
///
/// Reverse (only with `allow_reverse`, never for reserved names, only when
/// forward failed): the target is a strict subset of the fragment, so a
/// copy of the fragment is rewritten to embed the target. The registered
/// fragment itself is left untouched; the caller swaps in `grown`.
pub fn scan_and_use_mixins(
    target: &mut StructureSummary,
    fragment: &StructureSummary,
    allow_reverse: bool,
    verbose: bool,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let sted = fragment.sorted_features();
    let sorted = target.sorted_features();

    if is_subset(&sted, &sorted, false) {
        outcome.matched = target.replace_summary(fragment);
        if sorted.len() == sted.len() {
            target.is_exists = true;
        }
        outcome.needs_import = outcome.matched && !fragment.import_path.is_empty();
        if verbose {
            info!(declaration = %target.name, mixin = %fragment.name, "* {} <- {}", target.name, fragment.name);
        } else {
            debug!(declaration = %target.name, mixin = %fragment.name, "replaced with mixin");
        }
        return outcome;
    }

    if !allow_reverse || is_reserved(&fragment.name) {
        return outcome;
    }
    if is_subset(&sorted, &sted, true) {
        let mut grown = fragment.clone();
        if grown.replace_summary(target) {
            if verbose {
                info!(declaration = %target.name, mixin = %fragment.name, "* {} -> {}", target.name, fragment.name);
            } else {
                debug!(declaration = %target.name, mixin = %fragment.name, "mixin grown by declaration");
            }
            outcome.grown = Some(grown);
        }
    }
    outcome
}
