use std::sync::Arc;

use super::*;

fn time_mixin() -> StructureSummary {
    StructureSummary::from_lines(
        "TimeMixin",
        [
            "CreatedAt time.Time `json:\"created_at\" xorm:\"created\"`",
            "UpdatedAt time.Time `json:\"updated_at\" xorm:\"updated\"`",
            "DeletedAt time.Time `json:\"deleted_at\" xorm:\"deleted\"`",
        ],
    )
    .with_import("example.com/app/mixins", "mx")
}

fn user() -> StructureSummary {
    StructureSummary::from_lines(
        "User",
        [
            "Id int `json:\"id\" xorm:\"pk autoincr\"`",
            "CreatedAt time.Time `json:\"created_at\" xorm:\"created comment('created')\"` // created",
            "UpdatedAt time.Time `json:\"updated_at\"`",
            "DeletedAt time.Time `json:\"deleted_at\"`",
        ],
    )
}

fn fields(prefix: &str, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|n| format!("{}{} string `json:\"{}\"`", prefix, n, n.to_lowercase()))
        .collect()
}

#[test]
fn test_scenario_a_forward_match() {
    let mut registry = Registry::new();
    registry.register_substitute(time_mixin());
    let mut target = user();
    let outcome = registry.scan(&mut target, false, false);

    assert!(target.is_changed);
    assert!(!target.is_exists);
    assert_eq!(
        target.field_lines(),
        &[
            "Id int `json:\"id\" xorm:\"pk autoincr\"`".to_string(),
            format!("TimeMixin {}", MODEL_EXTENDS),
        ]
    );
    assert_eq!(target.features(), &["Id:int", "TimeMixin:inline"]);
    assert_eq!(target.children, vec!["TimeMixin".to_string()]);
    assert_eq!(outcome.imports.len(), 1);
    assert_eq!(outcome.imports[0].import_path, "example.com/app/mixins");
}

#[test]
fn test_scenario_b_no_overlap() {
    let mut registry = Registry::new();
    registry.register_substitute(time_mixin());
    let mut target = StructureSummary::from_lines(
        "Tag",
        ["Id int `json:\"id\"`", "Name string `json:\"name\"`"],
    );
    let before = target.field_lines().to_vec();
    let outcome = registry.scan(&mut target, true, false);

    assert!(!target.is_changed);
    assert_eq!(target.field_lines(), before.as_slice());
    assert!(outcome.imports.is_empty());
    assert!(outcome.grown.is_empty());
}

#[test]
fn test_scenario_c_isomorphic_declaration() {
    let target = StructureSummary::from_lines(
        "Admin",
        [format!("*TimeMixin {}", MODEL_EXTENDS)],
    );
    assert!(target.is_isomorphic());
    assert_eq!(target.features(), &["*TimeMixin:inline"]);

    let plain = StructureSummary::from_lines("Plain", ["Id int"]);
    assert!(!plain.is_isomorphic());
}

#[test]
fn test_scenario_d_prefers_later_larger_mixin() {
    let mut registry = Registry::new();
    registry.register_substitute(StructureSummary::from_lines("ACore", fields("", &["F1", "F2"])));
    registry.register_substitute(StructureSummary::from_lines(
        "BCore",
        fields("", &["F1", "F2", "F3"]),
    ));
    let mut target = StructureSummary::from_lines("Model", fields("", &["F1", "F2", "F3", "F4"]));
    registry.scan(&mut target, false, false);

    assert_eq!(target.features(), &["BCore:inline", "F4:string"]);
    assert_eq!(target.children, vec!["BCore".to_string()]);
}

#[test]
fn test_children_of_matched_mixin_are_skipped() {
    let mut registry = Registry::new();
    registry.register_substitute(StructureSummary::from_lines("ACore", fields("", &["F1", "F2"])));
    let mut b = StructureSummary::from_lines(
        "BCore",
        vec![
            format!("ACore {}", MODEL_EXTENDS),
            "F3 string `json:\"f3\"`".to_string(),
        ],
    );
    b.children.push("ACore".to_string());
    registry.register_substitute(b);

    let mut target = StructureSummary::from_lines(
        "Model",
        vec![
            format!("ACore {}", MODEL_EXTENDS),
            "F3 string `json:\"f3\"`".to_string(),
            "F4 string `json:\"f4\"`".to_string(),
        ],
    );
    registry.scan(&mut target, false, false);
    assert_eq!(target.children, vec!["BCore".to_string()]);
    assert_eq!(target.features(), &["BCore:inline", "F4:string"]);
}

#[test]
fn test_fingerprint_ignores_field_order() {
    let a = StructureSummary::from_lines("A", fields("", &["X", "Y", "Z"]));
    let mut reversed = fields("", &["X", "Y", "Z"]);
    reversed.reverse();
    let b = StructureSummary::from_lines("B", reversed);
    assert_eq!(a.sorted_features(), b.sorted_features());
}

#[test]
fn test_no_self_match() {
    let mut registry = Registry::new();
    registry.register_substitute(time_mixin());
    let mut same_name = time_mixin();
    let outcome = registry.scan(&mut same_name, true, false);
    assert!(!same_name.is_changed);
    assert!(outcome.imports.is_empty());
}

#[test]
fn test_equal_fingerprint_marks_exists() {
    let mut target = StructureSummary::from_lines(
        "Stamp",
        time_mixin().field_lines().to_vec(),
    );
    let outcome = scan_and_use_mixins(&mut target, &time_mixin(), false, false);
    assert!(outcome.matched);
    assert!(outcome.needs_import);
    assert!(target.is_exists);
    assert!(target.is_isomorphic());

    let mut registry = Registry::new();
    assert!(!registry.register_substitute(target));
    assert!(registry.is_empty());
}

#[test]
fn test_reverse_match_grows_copy() {
    let fragment = StructureSummary::from_lines("WideCore", fields("", &["F1", "F2", "F3"]));
    let mut target = StructureSummary::from_lines("NarrowCore", fields("", &["F1", "F2"]));

    let outcome = scan_and_use_mixins(&mut target, &fragment, true, false);
    assert!(!outcome.matched);
    let grown = outcome.grown.expect("fragment grows");
    assert_eq!(grown.features(), &["NarrowCore:inline", "F3:string"]);
    assert!(grown.is_changed);
    assert_eq!(fragment.features().len(), 3);
    assert!(!target.is_changed);
}

#[test]
fn test_reverse_match_disabled_or_reserved() {
    let mut target = StructureSummary::from_lines("Narrow", fields("", &["F1", "F2"]));
    let fragment = StructureSummary::from_lines("WideCore", fields("", &["F1", "F2", "F3"]));
    assert!(scan_and_use_mixins(&mut target, &fragment, false, false).grown.is_none());

    let reserved = StructureSummary::from_lines("xq.WideMixin", fields("", &["F1", "F2", "F3"]));
    assert!(scan_and_use_mixins(&mut target, &reserved, true, false).grown.is_none());
    let legacy = StructureSummary::from_lines("xquery.WideMixin", fields("", &["F1", "F2", "F3"]));
    assert!(scan_and_use_mixins(&mut target, &legacy, true, false).grown.is_none());
}

#[test]
fn test_reverse_match_needs_strict_subset() {
    let mut target = StructureSummary::from_lines("Same", fields("", &["F1", "F2"]));
    let fragment = StructureSummary::from_lines("Other", fields("", &["F2", "F1"]));
    let outcome = scan_and_use_mixins(&mut target, &fragment, true, false);
    assert!(outcome.matched);
    assert!(outcome.grown.is_none());
}

#[test]
fn test_composer_replaces_grown_entry_copy_on_write() {
    let mut composer = Composer::standalone().with_reverse_matching(true);
    composer.register_substitute(StructureSummary::from_lines(
        "WideCore",
        fields("", &["F1", "F2", "F3"]),
    ));
    let before = Arc::clone(composer.local().get("WideCore").expect("registered"));

    let mut narrow = StructureSummary::from_lines("NarrowCore", fields("", &["F1", "F2"]));
    composer.substitute_summary(&mut narrow, false);

    let after = composer.local().get("WideCore").expect("still registered");
    assert_eq!(after.features(), &["NarrowCore:inline", "F3:string"]);
    assert_eq!(before.features().len(), 3);
    assert_eq!(composer.local().names(), &["WideCore".to_string()]);
}

#[test]
fn test_remove_substitute_tombstones() {
    let mut registry = Registry::new();
    registry.register_substitute(time_mixin());
    registry.remove_substitute("TimeMixin");
    assert!(!registry.contains("TimeMixin"));
    assert_eq!(registry.names(), &["TimeMixin".to_string()]);
    assert_eq!(registry.len(), 0);

    let mut target = user();
    registry.scan(&mut target, false, false);
    assert!(!target.is_changed);

    registry.register_substitute(time_mixin());
    assert_eq!(registry.names().len(), 1);
    assert!(registry.contains("TimeMixin"));
}

#[test]
fn test_global_layer_runs_first() {
    let defaults = Arc::new(Registry::with_defaults());
    let mut composer = Composer::new(Arc::clone(&defaults));
    composer.register_substitute(StructureSummary::from_lines(
        "AuditCore",
        vec![
            format!("xq.TimeMixin {}", MODEL_EXTENDS),
            "Operator string `json:\"operator\"`".to_string(),
        ],
    ));
    let mut target = StructureSummary::from_lines(
        "Order",
        [
            "Id int `json:\"id\"`",
            "Operator string `json:\"operator\"`",
            "CreatedAt time.Time `json:\"created_at\"`",
            "UpdatedAt time.Time `json:\"updated_at\"`",
            "DeletedAt time.Time `json:\"deleted_at\"`",
        ],
    );
    let imports = composer.substitute_summary(&mut target, false);

    assert_eq!(target.features(), &["Id:int", "AuditCore:inline"]);
    assert_eq!(target.children, vec!["xq.TimeMixin".to_string(), "AuditCore".to_string()]);
    assert_eq!(imports.len(), 1);
    assert_eq!(imports[0].name, "xq.TimeMixin");
}

#[test]
fn test_register_global_is_copy_on_write() {
    let defaults = Arc::new(Registry::with_defaults());
    let mut first = Composer::new(Arc::clone(&defaults));
    let second = Composer::new(Arc::clone(&defaults));

    assert!(first.register_global_substitute(time_mixin()));
    assert!(first.global().expect("layer").contains("TimeMixin"));
    assert!(!second.global().expect("layer").contains("TimeMixin"));
    assert_eq!(defaults.len(), 2);
}

#[test]
fn test_sorted_features_follow_mutation() {
    let mut target = user();
    let before = target.sorted_features();
    assert_eq!(before.len(), 4);
    target.replace_summary(&time_mixin());
    let after = target.sorted_features();
    assert_eq!(&*after, &["Id:int".to_string(), "TimeMixin:inline".to_string()]);
    assert_eq!(before.len(), 4);
}

#[test]
fn test_replace_with_disjoint_fragment_is_noop() {
    let mut target = StructureSummary::from_lines("Tag", ["Name string"]);
    assert!(!target.replace_summary(&time_mixin()));
    assert!(!target.is_changed);
    assert_eq!(target.field_lines(), &["Name string".to_string()]);
}

#[test]
fn test_substitute_is_cached_and_unnamed_is_empty() {
    let mixin = time_mixin();
    assert_eq!(mixin.substitute("*"), format!("*TimeMixin {}", MODEL_EXTENDS));
    assert_eq!(mixin.substitute(""), format!("*TimeMixin {}", MODEL_EXTENDS));

    let unnamed = StructureSummary::from_lines("", ["F1 string"]);
    assert_eq!(unnamed.substitute(""), "");
    let mut target = StructureSummary::from_lines("T", ["F1 string"]);
    assert!(!target.replace_summary(&unnamed));
}

#[test]
fn test_subset_rules() {
    let a: Vec<String> = vec!["a".into(), "b".into()];
    let ab: Vec<String> = vec!["a".into(), "b".into()];
    let abc: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
    assert!(is_subset(&a, &abc, false));
    assert!(is_subset(&a, &abc, true));
    assert!(is_subset(&a, &ab, false));
    assert!(!is_subset(&a, &ab, true));
    assert!(!is_subset(&abc, &a, false));
    assert!(!is_subset(&[], &abc, false));
}

#[test]
fn test_inner_code_uses_indent() {
    let summary = StructureSummary::from_lines("T", ["A int", "B string"]);
    assert_eq!(summary.inner_code("\t"), "A int\n\tB string");
}

#[test]
fn test_requalify_renames_only_the_embed() {
    let mixin = StructureSummary::from_lines(
        "xq.TimeMixin",
        [
            "CreatedAt time.Time `json:\"created_at\"`",
            "UpdatedAt time.Time `json:\"updated_at\"`",
            "DeletedAt time.Time `json:\"deleted_at\"`",
        ],
    );
    let mut target = StructureSummary::from_lines(
        "User",
        [
            "Note xq.Note `json:\"note\"`",
            "CreatedAt time.Time",
            "UpdatedAt time.Time",
            "DeletedAt time.Time",
        ],
    );
    assert!(target.replace_summary(&mixin));
    assert!(target.requalify("xq.TimeMixin", "xquery.TimeMixin"));
    assert_eq!(
        target.field_lines(),
        &[
            "Note xq.Note `json:\"note\"`".to_string(),
            format!("xquery.TimeMixin {}", MODEL_EXTENDS),
        ]
    );
    assert_eq!(target.features(), &["Note:xq.Note", "xquery.TimeMixin:inline"]);
    assert!(!target.requalify("xq.TimeMixin", "x.TimeMixin"));
}
