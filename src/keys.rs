//! SSH key pair checks and staging.
//!
//! Keys are never generated here. The pair must already exist; the public
//! half is copied into the staging directory as `authorized_keys`, where the
//! installer picks it up to grant SSH access to the fresh guest.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common;
use crate::error::{KitError, KitResult};

/// File name of the staged public key.
pub const AUTHORIZED_KEYS: &str = "authorized_keys";

/// Verify both halves of the key pair exist.
///
/// Fails on the first missing file, public key first.
pub fn ensure_key_pair(public_key: &Path, private_key: &Path) -> KitResult<()> {
    for (kind, path) in [("public", public_key), ("private", private_key)] {
        if !path.exists() {
            return Err(KitError::Precondition(format!(
                "SSH {} key not found at {}",
                kind,
                path.display()
            )));
        }
    }
    debug!(public = %public_key.display(), private = %private_key.display(), "SSH key pair present");
    Ok(())
}

/// Copy the public key verbatim to `{staging_dir}/authorized_keys`.
///
/// Creates `staging_dir` if needed and overwrites any earlier copy.
pub fn publish_public_key(public_key: &Path, staging_dir: &Path) -> KitResult<PathBuf> {
    common::ensure_dir_exists(staging_dir)?;
    let dest = staging_dir.join(AUTHORIZED_KEYS);
    let bytes = common::copy_file(public_key, &dest)?;
    debug!(dest = %dest.display(), bytes, "staged SSH public key");
    Ok(dest)
}
