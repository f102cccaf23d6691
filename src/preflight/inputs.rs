//! Input file checks: SSH keys and templates.

use std::collections::BTreeSet;
use std::path::Path;

use crate::artifact::{self, ArtifactKind};
use crate::keys;

use super::types::CheckResult;

/// Check both halves of the SSH key pair exist.
pub fn check_keys(public_key: &Path, private_key: &Path) -> Vec<CheckResult> {
    [("SSH public key", public_key), ("SSH private key", private_key)]
        .into_iter()
        .map(|(name, path)| {
            if path.is_file() {
                CheckResult::pass_with(name, &path.display().to_string())
            } else {
                CheckResult::fail(name, &format!("Not found at {}", path.display()))
            }
        })
        .collect()
}

/// Check a template exists, parses, and only references schema fields.
pub fn check_template(kind: ArtifactKind, path: &Path) -> CheckResult {
    let name = format!("{} template", kind.label());

    let template = match artifact::load_template(path) {
        Ok(t) => t,
        Err(err) => return CheckResult::fail(&name, &err.to_string()),
    };

    let unknown: BTreeSet<&str> = template
        .fields()
        .filter(|f| !kind.fields().iter().any(|known| known == f))
        .collect();

    if unknown.is_empty() {
        CheckResult::pass_with(&name, &path.display().to_string())
    } else {
        let list: Vec<&str> = unknown.into_iter().collect();
        CheckResult::fail(
            &name,
            &format!(
                "{} references undefined field(s): {}",
                path.display(),
                list.join(", ")
            ),
        )
    }
}

/// Staging directory for `authorized_keys` and `installerconfig`.
pub fn check_staging_dir(dir: &Path) -> CheckResult {
    let name = "staging directory";
    if dir.is_dir() {
        CheckResult::pass_with(name, &dir.display().to_string())
    } else if dir.exists() {
        CheckResult::fail(name, &format!("{} exists but is not a directory", dir.display()))
    } else {
        CheckResult::pass_with(
            name,
            &format!("{} (will be created, receives {})", dir.display(), keys::AUTHORIZED_KEYS),
        )
    }
}
