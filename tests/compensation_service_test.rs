//! Tests for CompensationService

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use binplan::application::services::CompensationService;
use binplan::application::ApplicationError;
use binplan::domain::{DomainError, PayoutRules};
use binplan::infrastructure::traits::{FileSystem, RealFileSystem};
use binplan::util::testing::init_test_setup;

/// In-memory filesystem for service tests.
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    fn with_file(path: &str, content: &str) -> Self {
        let fs = Self::default();
        fs.files
            .lock()
            .unwrap()
            .insert(PathBuf::from(path), content.to_string());
        fs
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

const DASHBOARD_TREE: &str = r#"
name = "Marco"
role = "You"
volume = 2400

[[children]]
name = "Left Sponsor"
volume = 700

[[children.children]]
name = "L2"
volume = 500

[[children]]
name = "Right Sponsor"
volume = 1200
"#;

fn service_with(path: &str, content: &str) -> CompensationService {
    init_test_setup();
    CompensationService::new(
        Arc::new(MemoryFileSystem::with_file(path, content)),
        PayoutRules::default(),
    )
}

#[test]
fn given_no_path_when_loading_then_returns_sample_tree() {
    init_test_setup();
    let service = CompensationService::new(Arc::new(RealFileSystem), PayoutRules::default());

    let tree = service.load_tree(None).unwrap();

    assert_eq!(tree.name, "Marco");
    assert_eq!(tree.left().unwrap().name, "Jane Smith");
    assert_eq!(tree.right().unwrap().name, "Susan Wilson");
}

#[test]
fn given_tree_file_when_loading_then_children_map_to_left_and_right() {
    let service = service_with("team.toml", DASHBOARD_TREE);

    let tree = service.load_tree(Some(Path::new("team.toml"))).unwrap();

    assert_eq!(tree.role.as_deref(), Some("You"));
    let left = tree.left().unwrap();
    assert_eq!(left.name, "Left Sponsor");
    assert_eq!(left.left().unwrap().name, "L2");
    assert!(left.right().is_none());
    assert_eq!(tree.right().unwrap().name, "Right Sponsor");
}

#[test]
fn given_dashboard_tree_when_snapshot_then_matches_dashboard_figures() {
    let service = service_with("team.toml", DASHBOARD_TREE);
    let tree = service.load_tree(Some(Path::new("team.toml"))).unwrap();

    let snapshot = service.snapshot(&tree, 6, &[450.0]).unwrap();

    assert_eq!(snapshot.binary.left_vol, 1200.0);
    assert_eq!(snapshot.binary.right_vol, 1200.0);
    assert_eq!(snapshot.binary.matched_pairs, 12);
    assert_eq!(snapshot.binary.est_binary_bonus, 240.0);
    assert_eq!(snapshot.binary.carry_left, 0.0);
    assert_eq!(snapshot.binary.carry_right, 0.0);
    assert_eq!(snapshot.fast_start, 150.0);
    assert!((snapshot.matching - 45.0).abs() < 1e-9);
    assert!((snapshot.weekly_total - 195.0).abs() < 1e-9);
}

#[test]
fn given_sample_tree_when_binary_then_right_leg_carries_surplus() {
    init_test_setup();
    let service = CompensationService::new(Arc::new(RealFileSystem), PayoutRules::default());
    let tree = service.load_tree(None).unwrap();

    let est = service.binary(&tree).unwrap();
    let volume = service.team_volume(&tree);

    assert_eq!(est.left_vol, 2400.0);
    assert_eq!(est.right_vol, 2650.0);
    assert_eq!(est.matched_pairs, 24);
    assert_eq!(est.est_binary_bonus, 480.0);
    assert_eq!(est.carry_left, 0.0);
    assert_eq!(est.carry_right, 250.0);
    assert_eq!(volume.total, 7450.0);
    assert_eq!(volume.members, 10);
}

#[test]
fn given_loose_volumes_when_loading_then_coerced() {
    let content = r#"
name = "root"

[[children]]
name = "text"
volume = "300"

[[children.children]]
name = "garbage"
volume = "lots"

[[children]]
name = "negative"
volume = -40

[[children.children]]
name = "flag"
volume = true
"#;
    let service = service_with("loose.toml", content);

    let tree = service.load_tree(Some(Path::new("loose.toml"))).unwrap();
    let volume = service.team_volume(&tree);

    assert_eq!(tree.volume, 0.0);
    assert_eq!(tree.left().unwrap().volume, 300.0);
    assert_eq!(tree.left().unwrap().left().unwrap().volume, 0.0);
    assert_eq!(tree.right().unwrap().volume, 0.0);
    assert_eq!(tree.right().unwrap().left().unwrap().volume, 0.0);
    assert_eq!(volume.total, 300.0);
}

#[test]
fn given_three_children_when_loading_then_invalid_tree() {
    let content = r#"
name = "root"
volume = 1

[[children]]
name = "a"

[[children]]
name = "b"

[[children]]
name = "c"
"#;
    let service = service_with("wide.toml", content);

    let err = service
        .load_tree(Some(Path::new("wide.toml")))
        .unwrap_err();

    match err {
        ApplicationError::InvalidTree { path, message } => {
            assert_eq!(path, PathBuf::from("wide.toml"));
            assert!(message.contains("at most two"), "message: {}", message);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn given_unnamed_node_when_loading_then_invalid_tree() {
    let content = r#"
name = "root"

[[children]]
volume = 100
"#;
    let service = service_with("unnamed.toml", content);

    let err = service
        .load_tree(Some(Path::new("unnamed.toml")))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidTree { .. }));
    assert!(err.to_string().contains("name must not be empty"));
}

#[test]
fn given_missing_file_when_loading_then_operation_failed() {
    let service = service_with("team.toml", DASHBOARD_TREE);

    let err = service
        .load_tree(Some(Path::new("missing.toml")))
        .unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn given_real_file_when_loading_then_parses() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("team.toml");
    std::fs::write(&path, DASHBOARD_TREE).unwrap();
    let service = CompensationService::new(Arc::new(RealFileSystem), PayoutRules::default());

    let tree = service.load_tree(Some(&path)).unwrap();

    assert_eq!(tree.member_count(), 4);
    assert_eq!(tree.depth(), 3);
}

#[test]
fn given_zero_pair_bv_when_binary_then_invalid_configuration() {
    init_test_setup();
    let rules = PayoutRules {
        pair_bv: 0.0,
        ..PayoutRules::default()
    };
    let service = CompensationService::new(Arc::new(RealFileSystem), rules);
    let tree = service.load_tree(None).unwrap();

    let err = service.binary(&tree).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidConfiguration(_))
    ));
}

#[test]
fn given_negative_directs_when_snapshot_then_invalid_input() {
    init_test_setup();
    let service = CompensationService::new(Arc::new(RealFileSystem), PayoutRules::default());
    let tree = service.load_tree(None).unwrap();

    let err = service.snapshot(&tree, -2, &[]).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::InvalidInput(_))
    ));
}
