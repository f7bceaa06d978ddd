//! Hook script installation.
//!
//! Scripts are thin `sh` wrappers that exec the `ia-commits` binary, so
//! upgrading the binary upgrades the hooks.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::info;

use crate::config::{self, Configuration, Environment, Task};
use crate::error::InstallError;

/// Marker line identifying scripts this tool wrote.
pub const HOOK_MARKER: &str = "# Installed by ia-commits.";

/// The hooks ia-commits manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PrepareCommitMsg,
    CommitMsg,
}

impl HookKind {
    pub const ALL: [HookKind; 2] = [HookKind::PrepareCommitMsg, HookKind::CommitMsg];

    pub fn file_name(&self) -> &'static str {
        match self {
            HookKind::PrepareCommitMsg => "prepare-commit-msg",
            HookKind::CommitMsg => "commit-msg",
        }
    }

    pub fn script(&self) -> String {
        let command = match self {
            HookKind::PrepareCommitMsg => "exec ia-commits prepare \"$@\"",
            HookKind::CommitMsg => "exec ia-commits verify \"$1\"",
        };
        format!("#!/bin/sh\n{HOOK_MARKER} Remove with `ia-commits uninstall`.\n{command}\n")
    }
}

/// Hooks directory of the repository containing `start`.
///
/// Honours `core.hooksPath` (relative paths resolve against the work tree),
/// otherwise `<git dir>/hooks`.
pub fn hooks_dir(start: &Path) -> Result<PathBuf, InstallError> {
    let repo = Repository::discover(start).map_err(InstallError::NotARepository)?;

    let configured = repo
        .config()
        .ok()
        .and_then(|config| config.get_path("core.hooksPath").ok());

    match configured {
        Some(path) if path.is_absolute() => Ok(path),
        Some(path) => repo
            .workdir()
            .map(|workdir| workdir.join(path))
            .ok_or(InstallError::NoHooksDirectory),
        None => Ok(repo.path().join("hooks")),
    }
}

/// Whether the file at `path` was written by ia-commits.
pub fn is_managed(path: &Path) -> bool {
    fs::read_to_string(path).is_ok_and(|content| content.contains(HOOK_MARKER))
}

/// Write both hook scripts.
///
/// Existing hooks written by ia-commits are refreshed. Any other existing
/// hook is only replaced when `force` is set.
pub fn install_hooks(start: &Path, force: bool) -> Result<Vec<PathBuf>, InstallError> {
    let dir = hooks_dir(start)?;

    let targets: Vec<(HookKind, PathBuf)> = HookKind::ALL
        .iter()
        .map(|kind| (*kind, dir.join(kind.file_name())))
        .collect();

    let foreign = targets
        .iter()
        .find(|(_, path)| path.exists() && !is_managed(path));
    if let (false, Some((_, path))) = (force, foreign) {
        return Err(InstallError::ForeignHook { path: path.clone() });
    }

    fs::create_dir_all(&dir).map_err(|source| InstallError::WriteFailed {
        path: dir.clone(),
        source,
    })?;

    let mut installed = Vec::new();
    for (kind, path) in targets {
        write_script(&path, &kind.script())?;
        info!("Installed {} hook at {}", kind.file_name(), path.display());
        installed.push(path);
    }

    Ok(installed)
}

/// Remove the hook scripts ia-commits wrote, leaving any others alone.
pub fn uninstall_hooks(start: &Path) -> Result<Vec<PathBuf>, InstallError> {
    let dir = hooks_dir(start)?;
    let mut removed = Vec::new();

    for kind in HookKind::ALL {
        let path = dir.join(kind.file_name());
        if !is_managed(&path) {
            continue;
        }
        fs::remove_file(&path).map_err(|source| InstallError::RemoveFailed {
            path: path.clone(),
            source,
        })?;
        info!("Removed {} hook at {}", kind.file_name(), path.display());
        removed.push(path);
    }

    Ok(removed)
}

/// One line of `ia-commits doctor` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

impl Check {
    fn new(name: &'static str, result: Result<String, String>) -> Self {
        match result {
            Ok(detail) => Check { name, ok: true, detail },
            Err(detail) => Check { name, ok: false, detail },
        }
    }
}

/// Inspect the environment the hooks will run in.
pub fn doctor(start: &Path, env: &Environment) -> Vec<Check> {
    let mut checks = vec![Check::new(
        "git",
        which::which("git")
            .map(|path| path.display().to_string())
            .map_err(|e| format!("git not found on PATH: {e}")),
    )];

    checks.extend(HookKind::ALL.iter().map(|kind| {
        let result = hooks_dir(start).map_err(|e| e.to_string()).and_then(|dir| {
            let path = dir.join(kind.file_name());
            if is_managed(&path) {
                Ok(path.display().to_string())
            } else if path.exists() {
                Err(format!("{} is not managed by ia-commits", path.display()))
            } else {
                Err("not installed, run `ia-commits install`".to_string())
            }
        });
        Check::new(kind.file_name(), result)
    }));

    for (name, task) in [("suggest config", Task::Suggest), ("verify config", Task::Verify)] {
        let result = Configuration::resolve(task, env)
            .map(|c| format!("{} / {} at {}", c.provider, c.model, c.base_url))
            .map_err(|e| e.to_string());
        checks.push(Check::new(name, result));
    }

    checks.push(Check::new(
        "verify failure policy",
        Ok(format!("{:?}", config::failure_policy(env)).to_lowercase()),
    ));

    let log_path = config::log_path(env);
    checks.push(Check::new(
        "log file",
        crate::logging::open_log_file(Path::new(&log_path))
            .map(|_| log_path.clone())
            .map_err(|e| format!("{log_path}: {e}")),
    ));

    checks
}

fn write_script(path: &Path, script: &str) -> Result<(), InstallError> {
    let write_failed = |source| InstallError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    fs::write(path, script).map_err(write_failed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(write_failed)?;
    }

    Ok(())
}
