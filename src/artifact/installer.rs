//! Installer schema: the two values `bsdinstall` needs to create the user.

use crate::resolve::ResolvedConfig;
use crate::template::TemplateData;

/// File name of the rendered installer script inside the staging directory.
pub const OUTPUT_NAME: &str = "installerconfig";

/// Data record for the installer template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerData<'a> {
    pub ssh_username: &'a str,
    pub ssh_password: &'a str,
}

impl InstallerData<'_> {
    pub const FIELDS: &'static [&'static str] = &["SSHUsername", "SSHPassword"];
}

impl<'a> From<&'a ResolvedConfig> for InstallerData<'a> {
    fn from(cfg: &'a ResolvedConfig) -> Self {
        Self {
            ssh_username: &cfg.ssh_username,
            ssh_password: &cfg.ssh_password,
        }
    }
}

impl TemplateData for InstallerData<'_> {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "SSHUsername" => Some(self.ssh_username),
            "SSHPassword" => Some(self.ssh_password),
            _ => None,
        }
    }
}
