//! Catalog behavior against on-disk fixtures

use chrono::Utc;
use loredex_search::{ResourceCatalog, SearchError, SearchOptions};
use loredex_types::{KindFields, MasterIndex, Resource, ResourceKind, ResourceSet, MASTER_INDEX_FILE};
use std::fs;
use std::path::Path;

fn skill(name: &str, tags: &[&str], path: &str) -> Resource {
    Resource {
        name: name.into(),
        description: format!("{name} description"),
        path: path.into(),
        size: 1,
        fields: KindFields::Skill {
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        },
    }
}

fn agent(name: &str, path: &str) -> Resource {
    Resource {
        name: name.into(),
        description: format!("{name} agent"),
        path: path.into(),
        size: 1,
        fields: KindFields::Agent {
            tool_refs: Vec::new(),
        },
    }
}

fn fixture_catalog(root: &Path) -> ResourceCatalog {
    let master = MasterIndex::new(
        ResourceSet {
            skills: vec![
                skill("Reviewer", &["quality"], "skills/reviewer/SKILL.md"),
                skill("security-audit", &["security"], "skills/security-audit/SKILL.md"),
            ],
            agents: vec![agent("Reviewer", "agents/reviewer.agent.md")],
            ..Default::default()
        },
        Utc::now(),
    );
    ResourceCatalog::from_master(master, root)
}

fn write_backing_files(root: &Path) {
    fs::create_dir_all(root.join("skills/reviewer")).unwrap();
    fs::create_dir_all(root.join("skills/security-audit")).unwrap();
    fs::create_dir_all(root.join("agents")).unwrap();
    fs::write(root.join("skills/reviewer/SKILL.md"), "skill body").unwrap();
    fs::write(
        root.join("skills/security-audit/SKILL.md"),
        "audit body",
    )
    .unwrap();
    fs::write(root.join("agents/reviewer.agent.md"), "agent body").unwrap();
}

#[test]
fn test_bare_ambiguous_name_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());
    let catalog = fixture_catalog(tmp.path());

    let err = catalog.get_by_name("Reviewer", None).unwrap_err();
    match err {
        SearchError::AmbiguousName { name, kinds } => {
            assert_eq!(name, "Reviewer");
            assert_eq!(kinds, vec![ResourceKind::Skill, ResourceKind::Agent]);
        }
        other => panic!("expected AmbiguousName, got {other}"),
    }
}

#[test]
fn test_kind_disambiguates() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());
    let catalog = fixture_catalog(tmp.path());

    let loaded = catalog
        .get_by_name("Reviewer", Some(ResourceKind::Agent))
        .unwrap();
    assert_eq!(loaded.resource.kind(), ResourceKind::Agent);
    assert_eq!(loaded.content, "agent body");
}

#[test]
fn test_case_insensitive_fallback() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());
    let catalog = fixture_catalog(tmp.path());

    let loaded = catalog
        .get_by_name("SECURITY-AUDIT", None)
        .unwrap();
    assert_eq!(loaded.resource.name, "security-audit");
    assert_eq!(loaded.content, "audit body");
}

#[test]
fn test_unknown_name_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());
    let catalog = fixture_catalog(tmp.path());

    assert!(matches!(
        catalog.get_by_name("nope", None),
        Err(SearchError::NotFound { .. })
    ));
}

#[test]
fn test_stale_path_is_recoverable() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());
    let catalog = fixture_catalog(tmp.path());

    fs::remove_file(tmp.path().join("skills/security-audit/SKILL.md")).unwrap();

    // Body fetch reports the dangling path...
    assert!(matches!(
        catalog.get_by_name("security-audit", None),
        Err(SearchError::ResourceUnavailable { .. })
    ));

    // ...while metadata-only operations still see the entry.
    assert_eq!(catalog.list(Some(ResourceKind::Skill)).len(), 2);
    let hits = catalog.search("security", &SearchOptions::default());
    assert!(hits.iter().any(|r| r.name == "security-audit"));
}

#[test]
fn test_tag_filter_is_any_match() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = fixture_catalog(tmp.path());

    let both = SearchOptions {
        tags: vec!["security".into(), "perf".into()],
        ..Default::default()
    };
    let hits = catalog.search("", &both);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "security-audit");

    let perf_only = SearchOptions {
        tags: vec!["perf".into()],
        ..Default::default()
    };
    assert!(catalog.search("", &perf_only).is_empty());
}

#[test]
fn test_kind_filter_restricts_search() {
    let tmp = tempfile::tempdir().unwrap();
    let catalog = fixture_catalog(tmp.path());

    let agents_only = SearchOptions {
        kind: Some(ResourceKind::Agent),
        ..Default::default()
    };
    let hits = catalog.search("reviewer", &agents_only);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind(), ResourceKind::Agent);
}

#[test]
fn test_load_without_build_is_index_missing() {
    let tmp = tempfile::tempdir().unwrap();
    assert!(matches!(
        ResourceCatalog::load(tmp.path(), tmp.path()),
        Err(SearchError::IndexMissing { .. })
    ));
}

#[test]
fn test_load_reads_persisted_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    write_backing_files(tmp.path());

    let master = MasterIndex::new(
        ResourceSet {
            agents: vec![agent("solo", "agents/reviewer.agent.md")],
            ..Default::default()
        },
        Utc::now(),
    );
    fs::write(
        tmp.path().join(MASTER_INDEX_FILE),
        serde_json::to_vec_pretty(&master).unwrap(),
    )
    .unwrap();

    let catalog = ResourceCatalog::load(tmp.path(), tmp.path()).unwrap();
    assert_eq!(catalog.stats().stats.agents, 1);
    assert_eq!(catalog.list(None).len(), 1);
}
