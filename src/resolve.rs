//! Parameter resolution.
//!
//! Turns the sparse set of user inputs into a [`ResolvedConfig`] with every
//! default filled in. Resolution is pure apart from the injected random
//! source used for password generation, so the same inputs and the same
//! supplied password always resolve to the same record.
//!
//! Defaults are applied in order, later ones depending on earlier ones:
//!
//! 1. SSH password (16 random alphanumeric characters)
//! 2. SSH key pair paths (`<home>/.ssh/id_rsa.pub`, `<home>/.ssh/id_rsa`)
//! 3. ISO file name (`FreeBSD-{version}-RELEASE-{arch}-disc1.iso`)
//! 4. ISO URL (`{base}{version}/{file}`, always derived)
//! 5. Checksum URL (`{base}{version}/CHECKSUM.SHA512-FreeBSD-{version}-RELEASE-{arch}`)

use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{KitError, KitResult};

/// Length of generated SSH passwords.
pub const PASSWORD_LENGTH: usize = 16;

/// Default FreeBSD release.
pub const DEFAULT_VERSION: &str = "14.1";
/// Default FreeBSD architecture.
pub const DEFAULT_ARCH: &str = "amd64";
/// Default Packer output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";
/// Default guest disk size.
pub const DEFAULT_DISK_SIZE: &str = "50000M";
/// Default guest memory size.
pub const DEFAULT_MEMORY: &str = "1024";
/// Default guest SSH user.
pub const DEFAULT_SSH_USERNAME: &str = "freebsd";
/// Default ISO mirror.
pub const DEFAULT_ISO_BASE_URL: &str =
    "https://download.freebsd.org/ftp/releases/amd64/amd64/ISO-IMAGES/";

/// Raw inputs as collected from flags and configuration.
///
/// `None` (or an empty string) means "use the default".
#[derive(Debug, Clone)]
pub struct RawInputs {
    pub os_version: String,
    pub architecture: String,
    pub output_directory: PathBuf,
    pub disk_size: String,
    pub memory_size: String,
    pub ssh_username: String,
    pub ssh_password: Option<String>,
    pub iso_base_url: String,
    pub iso_file_name: Option<String>,
    pub checksum_url: Option<String>,
    pub ssh_public_key_path: Option<PathBuf>,
    pub ssh_private_key_path: Option<PathBuf>,
}

impl Default for RawInputs {
    fn default() -> Self {
        Self {
            os_version: DEFAULT_VERSION.to_string(),
            architecture: DEFAULT_ARCH.to_string(),
            output_directory: PathBuf::from(DEFAULT_OUTPUT_DIR),
            disk_size: DEFAULT_DISK_SIZE.to_string(),
            memory_size: DEFAULT_MEMORY.to_string(),
            ssh_username: DEFAULT_SSH_USERNAME.to_string(),
            ssh_password: None,
            iso_base_url: DEFAULT_ISO_BASE_URL.to_string(),
            iso_file_name: None,
            checksum_url: None,
            ssh_public_key_path: None,
            ssh_private_key_path: None,
        }
    }
}

impl RawInputs {
    /// Reject values that would produce unusable paths or URLs.
    ///
    /// Only emptiness is checked; version and architecture are otherwise
    /// passed through verbatim and left for Packer to reject.
    pub fn validate(&self) -> KitResult<()> {
        let required = [
            ("version", &self.os_version),
            ("arch", &self.architecture),
            ("ssh-username", &self.ssh_username),
        ];
        for (flag, value) in required {
            if value.trim().is_empty() {
                return Err(KitError::Usage(format!("--{} must not be empty", flag)));
            }
        }
        Ok(())
    }
}

/// Fully resolved configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub os_version: String,
    pub architecture: String,
    pub output_directory: PathBuf,
    pub disk_size: String,
    pub memory_size: String,
    pub ssh_username: String,
    #[serde(serialize_with = "masked")]
    pub ssh_password: String,
    /// True when the password was generated rather than supplied.
    #[serde(skip)]
    pub password_generated: bool,
    pub iso_base_url: String,
    pub iso_file_name: String,
    pub iso_url: String,
    pub checksum_url: String,
    pub ssh_public_key_path: PathBuf,
    pub ssh_private_key_path: PathBuf,
}

impl ResolvedConfig {
    /// Checksum reference in the form Packer expects (`file:<url>`).
    pub fn iso_checksum(&self) -> String {
        format!("file:{}", self.checksum_url)
    }

    /// File name of the rendered Packer template, unique per version/arch.
    pub fn builder_config_filename(&self) -> String {
        builder_config_filename(&self.os_version, &self.architecture)
    }
}

/// `freebsd-{version}-{arch}.pkr.hcl`
pub fn builder_config_filename(version: &str, arch: &str) -> String {
    format!("freebsd-{}-{}.pkr.hcl", version, arch)
}

/// Default ISO file name for a release.
pub fn default_iso_file_name(version: &str, arch: &str) -> String {
    format!("FreeBSD-{}-RELEASE-{}-disc1.iso", version, arch)
}

/// Default checksum URL for a release.
pub fn default_checksum_url(base_url: &str, version: &str, arch: &str) -> String {
    format!(
        "{}{}/CHECKSUM.SHA512-FreeBSD-{}-RELEASE-{}",
        base_url, version, version, arch
    )
}

/// Conventional per-user SSH key pair under `home`.
pub fn default_key_paths(home: &Path) -> (PathBuf, PathBuf) {
    let ssh_dir = home.join(".ssh");
    (ssh_dir.join("id_rsa.pub"), ssh_dir.join("id_rsa"))
}

/// Generate a password of `length` characters from `[a-zA-Z0-9]`.
///
/// Not a security boundary: callers needing secrecy supply their own.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(length)
        .collect()
}

/// Resolve `inputs` into a complete configuration.
///
/// `home` is only consulted when a key path was not supplied; `rng` only
/// when no password was supplied.
pub fn resolve<R: Rng + ?Sized>(inputs: RawInputs, home: &Path, rng: &mut R) -> ResolvedConfig {
    let RawInputs {
        os_version,
        architecture,
        output_directory,
        disk_size,
        memory_size,
        ssh_username,
        ssh_password,
        iso_base_url,
        iso_file_name,
        checksum_url,
        ssh_public_key_path,
        ssh_private_key_path,
    } = inputs;

    let (ssh_password, password_generated) = match non_empty(ssh_password) {
        Some(password) => (password, false),
        None => (generate_password(rng, PASSWORD_LENGTH), true),
    };

    let (default_pub, default_priv) = default_key_paths(home);
    let ssh_public_key_path = ssh_public_key_path
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(default_pub);
    let ssh_private_key_path = ssh_private_key_path
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(default_priv);

    let iso_file_name = non_empty(iso_file_name)
        .unwrap_or_else(|| default_iso_file_name(&os_version, &architecture));

    if !iso_base_url.ends_with('/') {
        warn!(
            iso_base_url = %iso_base_url,
            "ISO base URL has no trailing slash; URLs are concatenated verbatim"
        );
    }
    let iso_url = format!("{}{}/{}", iso_base_url, os_version, iso_file_name);

    let checksum_url = non_empty(checksum_url)
        .unwrap_or_else(|| default_checksum_url(&iso_base_url, &os_version, &architecture));

    debug!(
        version = %os_version,
        arch = %architecture,
        iso_url = %iso_url,
        checksum_url = %checksum_url,
        password_generated,
        "resolved build parameters"
    );

    ResolvedConfig {
        os_version,
        architecture,
        output_directory,
        disk_size,
        memory_size,
        ssh_username,
        ssh_password,
        password_generated,
        iso_base_url,
        iso_file_name,
        iso_url,
        checksum_url,
        ssh_public_key_path,
        ssh_private_key_path,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn masked<S: Serializer>(_: &str, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("********")
}
