//! Integration tests for project context resolution on a real directory tree

use camino::{Utf8Path, Utf8PathBuf};
use gleaner_core::{ContextResolver, Error, SettingsEnv};
use std::fs;
use tempfile::TempDir;

fn utf8(temp: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
}

/// Lay out a minimal project the way the scaffolder does
fn write_project(parent: &Utf8Path, name: &str) -> Utf8PathBuf {
    let root = parent.join(name);
    fs::create_dir_all(root.join(name).join("spiders")).unwrap();
    fs::write(
        root.join("gleaner-ctl.py"),
        format!("import os\nos.environ.setdefault('GLEANER_SETTINGS_MODULE', '{name}.settings')\n"),
    )
    .unwrap();
    fs::write(root.join(name).join("__init__.py"), "").unwrap();
    fs::write(root.join(name).join("settings.py"), "").unwrap();
    fs::write(root.join(name).join("spiders").join("__init__.py"), "").unwrap();
    root
}

#[test]
fn test_resolve_real_tree() {
    let temp = TempDir::new().unwrap();
    let base = utf8(&temp);
    let root = write_project(&base, "testproject");

    let resolver = ContextResolver::os().with_ceiling(base.clone());
    let ctx = resolver
        .resolve(&root.join("testproject").join("spiders"), &SettingsEnv::default())
        .unwrap();

    assert_eq!(ctx.root(), root.as_path());
    assert_eq!(ctx.settings_module(), "testproject.settings");
    assert!(ctx.settings_path().is_file());
}

#[test]
fn test_resolve_outside_project_fails() {
    let temp = TempDir::new().unwrap();
    let base = utf8(&temp);
    write_project(&base, "testproject");
    fs::create_dir_all(base.join("unrelated")).unwrap();

    let resolver = ContextResolver::os().with_ceiling(base.clone());
    let err = resolver
        .resolve(&base.join("unrelated"), &SettingsEnv::default())
        .unwrap_err();
    assert!(matches!(err, Error::NoProjectFound { .. }));
}

#[test]
fn test_child_command_receives_context() {
    let temp = TempDir::new().unwrap();
    let base = utf8(&temp);
    let root = write_project(&base, "testproject");

    let ctx = ContextResolver::os()
        .with_ceiling(base)
        .resolve(&root, &SettingsEnv::default())
        .unwrap();

    let mut command = std::process::Command::new("true");
    ctx.apply_to(&mut command);

    let envs: Vec<_> = command.get_envs().collect();
    assert!(envs.iter().any(|(k, v)| {
        *k == "GLEANER_SETTINGS_MODULE" && v.map(|v| v == "testproject.settings").unwrap_or(false)
    }));
    assert!(envs
        .iter()
        .any(|(k, v)| *k == "GLEANER_SETTINGS_DISABLED" && v.is_none()));
    assert_eq!(command.get_current_dir(), Some(root.as_std_path()));
}
