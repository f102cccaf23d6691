//! Configuration management.
//!
//! Reads defaults from a `.env` file in the working directory and from
//! environment variables. Real environment variables take precedence over
//! `.env`, and command-line flags take precedence over both.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::build::DEFAULT_PROGRAM;
use crate::resolve::DEFAULT_ISO_BASE_URL;

/// Default directory served to the installer.
pub const DEFAULT_STAGING_DIR: &str = "http";
/// Default installer template path.
pub const DEFAULT_INSTALLER_TEMPLATE: &str = "installerconfig.tpl";
/// Default Packer template path.
pub const DEFAULT_PACKER_TEMPLATE: &str = "freebsd.pkr.hcl.tpl";

/// Kit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Mirror base URL (`KIT_ISO_BASE_URL`)
    pub iso_base_url: String,
    /// Builder program (`KIT_PACKER_BIN`)
    pub packer_bin: String,
    /// Staging directory, relative to the working directory (`KIT_STAGING_DIR`)
    pub staging_dir: PathBuf,
    /// Installer template (`KIT_INSTALLER_TEMPLATE`)
    pub installer_template: PathBuf,
    /// Packer template (`KIT_PACKER_TEMPLATE`)
    pub packer_template: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(&HashMap::new())
    }
}

impl Config {
    /// Load configuration from `base_dir/.env` and the environment.
    pub fn load(base_dir: &Path) -> Self {
        let mut vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if let Ok(iter) = dotenvy::from_path_iter(&env_path) {
            vars.extend(iter.flatten());
        }

        // Environment variables override .env file
        vars.extend(std::env::vars());

        Self::from_vars(&vars)
    }

    fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str, default: &str| {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            iso_base_url: get("KIT_ISO_BASE_URL", DEFAULT_ISO_BASE_URL),
            packer_bin: get("KIT_PACKER_BIN", DEFAULT_PROGRAM),
            staging_dir: PathBuf::from(get("KIT_STAGING_DIR", DEFAULT_STAGING_DIR)),
            installer_template: PathBuf::from(get(
                "KIT_INSTALLER_TEMPLATE",
                DEFAULT_INSTALLER_TEMPLATE,
            )),
            packer_template: PathBuf::from(get("KIT_PACKER_TEMPLATE", DEFAULT_PACKER_TEMPLATE)),
        }
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  KIT_ISO_BASE_URL: {}", self.iso_base_url);
        println!("  KIT_PACKER_BIN: {}", self.packer_bin);
        println!("  KIT_STAGING_DIR: {}", self.staging_dir.display());
        println!("  KIT_INSTALLER_TEMPLATE: {}", self.installer_template.display());
        println!("  KIT_PACKER_TEMPLATE: {}", self.packer_template.display());
    }
}
