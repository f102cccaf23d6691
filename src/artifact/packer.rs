//! Builder schema: every resolved value Packer needs.

use crate::resolve::ResolvedConfig;
use crate::template::TemplateData;

/// Data record for the Packer template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackerData<'a> {
    pub freebsd_version: &'a str,
    pub freebsd_arch: &'a str,
    pub output_dir: String,
    pub disk_size: &'a str,
    pub memory_size: &'a str,
    pub ssh_username: &'a str,
    pub ssh_password: &'a str,
    pub iso_url: &'a str,
    /// `file:` + checksum URL.
    pub iso_checksum: String,
    pub ssh_public_key_path: String,
    pub ssh_private_key_path: String,
}

impl PackerData<'_> {
    pub const FIELDS: &'static [&'static str] = &[
        "FreeBSDVersion",
        "FreeBSDArch",
        "OutputDir",
        "DiskSize",
        "MemorySize",
        "SSHUsername",
        "SSHPassword",
        "ISOURL",
        "ISOChecksum",
        "SSHPublicKeyPath",
        "SSHPrivateKeyPath",
    ];
}

impl<'a> From<&'a ResolvedConfig> for PackerData<'a> {
    fn from(cfg: &'a ResolvedConfig) -> Self {
        Self {
            freebsd_version: &cfg.os_version,
            freebsd_arch: &cfg.architecture,
            output_dir: cfg.output_directory.display().to_string(),
            disk_size: &cfg.disk_size,
            memory_size: &cfg.memory_size,
            ssh_username: &cfg.ssh_username,
            ssh_password: &cfg.ssh_password,
            iso_url: &cfg.iso_url,
            iso_checksum: cfg.iso_checksum(),
            ssh_public_key_path: cfg.ssh_public_key_path.display().to_string(),
            ssh_private_key_path: cfg.ssh_private_key_path.display().to_string(),
        }
    }
}

impl TemplateData for PackerData<'_> {
    fn field(&self, name: &str) -> Option<&str> {
        let value: &str = match name {
            "FreeBSDVersion" => self.freebsd_version,
            "FreeBSDArch" => self.freebsd_arch,
            "OutputDir" => &self.output_dir,
            "DiskSize" => self.disk_size,
            "MemorySize" => self.memory_size,
            "SSHUsername" => self.ssh_username,
            "SSHPassword" => self.ssh_password,
            "ISOURL" => self.iso_url,
            "ISOChecksum" => &self.iso_checksum,
            "SSHPublicKeyPath" => &self.ssh_public_key_path,
            "SSHPrivateKeyPath" => &self.ssh_private_key_path,
            _ => return None,
        };
        Some(value)
    }
}
