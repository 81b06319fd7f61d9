//! Project scaffolding.
//!
//! `startproject` is all-or-nothing: the name is validated and every file is
//! rendered in memory before the disk is touched, the project root is created
//! with a non-recursive `create_dir` (so of two racing invocations exactly one
//! wins), and a failure while populating removes the root again.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info, warn};

use gleaner_core::identifier::validate_identifier;

use crate::error::{Error, Result};
use crate::templates::{ProjectSkeleton, TemplateRegistry};

/// Creates new project trees from the registry's skeleton
#[derive(Debug)]
pub struct Scaffolder<'a> {
    registry: &'a TemplateRegistry,
}

impl<'a> Scaffolder<'a> {
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Create project `name` under `parent`, returning the project root
    pub fn create_project(&self, name: &str, parent: &Utf8Path) -> Result<Utf8PathBuf> {
        validate_identifier(name)?;

        let root = parent.join(name);
        if fs::symlink_metadata(&root).is_ok() {
            return Err(Error::project_exists(root.as_str()));
        }

        let skeleton = self.registry.render_skeleton(name)?;

        fs::create_dir(&root).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::project_exists(root.as_str()),
            _ => Error::Io(e),
        })?;
        debug!("Created project root {}", root);

        if let Err(e) = write_skeleton(&root, &skeleton) {
            warn!("Failed to populate {}: {}; removing it", root, e);
            if let Err(cleanup) = fs::remove_dir_all(&root) {
                warn!("Failed to remove partial project {}: {}", root, cleanup);
            }
            return Err(e);
        }

        info!("Created project {} at {}", name, root);
        Ok(root)
    }
}

/// Write every skeleton file below `root`
fn write_skeleton(root: &Utf8Path, skeleton: &ProjectSkeleton) -> Result<()> {
    for file in &skeleton.files {
        let path = root.join(&file.path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, &file.content)?;
        if file.executable {
            make_executable(&path)?;
        }
        debug!("Wrote {}", path);
    }

    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> Result<()> {
    Ok(())
}
