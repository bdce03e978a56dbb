//! Tests for mapping persistence, workspace snapshots, settings and plan quotas.
mod common;
use common::*;
use kumitate::prelude::*;

#[test]
fn test_mapping_json_format() {
    let mut mapping = ResourceMapping::new();
    mapping.insert("n2", MappedResource::task("t-1"));
    mapping.insert("n1", MappedResource::project("p-1"));

    let json = mapping.to_json().unwrap();

    assert_eq!(
        json,
        r#"{"n1":{"type":"project","id":"p-1"},"n2":{"type":"task","id":"t-1"}}"#
    );
    assert_eq!(ResourceMapping::from_json(&json).unwrap(), mapping);
}

#[test]
fn test_mapping_from_blank_or_null_is_empty() {
    assert!(ResourceMapping::from_json("").unwrap().is_empty());
    assert!(ResourceMapping::from_json("null").unwrap().is_empty());
    assert!(ResourceMapping::from_json("{}").unwrap().is_empty());
    assert!(ResourceMapping::from_json("{\"n1\": {\"type\": \"folder\", \"id\": \"x\"}}").is_err());
}

#[test]
fn test_mapping_queries() {
    let mapping: ResourceMapping = [
        ("a".to_string(), MappedResource::project("p")),
        ("b".to_string(), MappedResource::task("t1")),
        ("c".to_string(), MappedResource::task("t2")),
    ]
    .into_iter()
    .collect();

    assert_eq!(mapping.resource_of("a", ResourceKind::Project), Some("p"));
    assert_eq!(mapping.resource_of("a", ResourceKind::Task), None);
    assert_eq!(mapping.count(ResourceKind::Task), 2);
    let order: Vec<&str> = mapping.iter().map(|(node, _)| node).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[test]
fn test_mapping_bincode_snapshot() {
    let mut mapping = ResourceMapping::new();
    mapping.insert("root", MappedResource::project("p-1"));

    let bytes = mapping.to_bytes().unwrap();
    assert_eq!(ResourceMapping::from_bytes(&bytes).unwrap(), mapping);
    assert!(ResourceMapping::from_bytes(&[0xff, 0xff, 0xff]).is_err());
}

#[test]
fn test_workspace_snapshot_supports_reconversion() {
    let mut workspace = basic_workspace();
    let reconciler = unlimited_reconciler();
    convert(&reconciler, &mut workspace).unwrap();
    let mapping = stored_mapping(&workspace);

    let path = std::env::temp_dir().join(format!("kumitate-test-{}.bin", std::process::id()));
    let path = path.to_string_lossy().to_string();
    workspace.save(&path).expect("Failed to save workspace");
    let mut restored = MemoryWorkspace::from_file(&path).expect("Failed to load workspace");
    let _ = std::fs::remove_file(&path);

    assert_eq!(stored_mapping(&restored), mapping);
    assert_eq!(restored.store.project_count(), 2);
    // Call counters are not persisted.
    assert_eq!(restored.store.store_calls(), 0);

    let summary = convert(&reconciler, &mut restored).unwrap();
    assert!(summary.is_re_conversion);
    assert_eq!(summary.projects_created + summary.tasks_created, 0);
    // New ids keep counting after the restored ones.
    let extra = nodes_json(&[("A", "Launch", None), ("Z", "Extra", Some("A"))]);
    reconvert(&reconciler, &mut restored, &extra, "").unwrap();
    let z = resource(&restored, "Z");
    assert!(!mapping.iter().any(|(_, r)| r.id == z.id));
}

#[test]
fn test_missing_snapshot_file_reports_path() {
    let result = MemoryWorkspace::from_file("/definitely/not/here.bin");
    match result {
        Err(kumitate::error::SnapshotError::Io { path, .. }) => {
            assert_eq!(path, "/definitely/not/here.bin")
        }
        other => panic!("Expected Io error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_default_quota_table() {
    let quotas = QuotaTable::default();

    assert!(!quotas.allows_conversion(PlanTier::Free));
    assert!(quotas.allows_conversion(PlanTier::Pro));
    assert!(quotas.allows_conversion(PlanTier::Team));

    assert!(quotas.can_create_root_project(PlanTier::Pro, 24));
    assert!(!quotas.can_create_root_project(PlanTier::Pro, 25));
    assert!(quotas.can_create_root_project(PlanTier::Team, 10_000));

    // Pro allows subprojects down to depth 3.
    assert!(quotas.can_create_subproject(PlanTier::Pro, 2));
    assert!(!quotas.can_create_subproject(PlanTier::Pro, 3));

    assert!(quotas.can_create_mind_map_with_node_count(PlanTier::Pro, 500));
    assert!(!quotas.can_create_mind_map_with_node_count(PlanTier::Pro, 501));

    assert!(quotas.can_create_task(PlanTier::Free, 49));
    assert!(!quotas.can_create_task(PlanTier::Free, 50));
    assert!(quotas.can_create_task(PlanTier::Team, usize::MAX - 1));
}

#[test]
fn test_settings_from_json_fill_defaults() {
    let settings = Settings::from_json(
        r#"{
            "engine": { "branch_ordering": "list_order" },
            "quotas": { "free": { "conversion_enabled": true, "max_tasks": 5 } }
        }"#,
    )
    .expect("Failed to parse settings");

    assert_eq!(settings.engine.branch_ordering, BranchOrdering::ListOrder);
    assert_eq!(settings.engine.lock_ttl_ms, 30_000);
    assert!(settings.quotas.free.conversion_enabled);
    assert_eq!(settings.quotas.free.max_tasks, Some(5));
    assert_eq!(settings.quotas.free.max_root_projects, None);
    assert_eq!(settings.quotas.pro, QuotaTable::default().pro);

    assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    assert!(Settings::from_json("{\"engine\": 3}").is_err());
}

#[test]
fn test_settings_drive_the_reconciler() {
    let settings = Settings::from_json(
        r#"{ "quotas": { "pro": { "max_tasks": 1 } } }"#,
    )
    .unwrap();
    let reconciler = Reconciler::builder(settings.quotas, AllowAll)
        .with_config(settings.engine)
        .build();
    let mut workspace = basic_workspace();

    let summary = convert(&reconciler, &mut workspace).unwrap();

    assert_eq!(summary.tasks_created, 1);
    assert_eq!(reconciler.config().lock_ttl().as_secs(), 30);
}
