//! Rendered build artifacts.
//!
//! Both artifacts go through one [`RenderJob`]: read the template, render
//! it fully in memory against a schema, then write the destination. Only the
//! schema and destination differ:
//!
//! - `installer` - `installerconfig` for the FreeBSD unattended installer
//! - `packer` - `freebsd-{version}-{arch}.pkr.hcl` for Packer

pub mod installer;
pub mod packer;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::common;
use crate::error::{KitError, KitResult};
use crate::resolve::ResolvedConfig;
use crate::template::{Template, TemplateData};

pub use installer::InstallerData;
pub use packer::PackerData;

/// Where artifacts are written.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Working directory; the Packer template lands here.
    pub root: PathBuf,
    /// Directory served to the installer over HTTP.
    pub staging_dir: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root` with `staging` resolved against it.
    pub fn new(root: impl Into<PathBuf>, staging: impl AsRef<Path>) -> Self {
        let root = root.into();
        let staging_dir = root.join(staging);
        Self { root, staging_dir }
    }

    /// `{staging}/installerconfig`
    pub fn installer_config_path(&self) -> PathBuf {
        self.staging_dir.join(installer::OUTPUT_NAME)
    }

    /// `{root}/freebsd-{version}-{arch}.pkr.hcl`
    pub fn packer_config_path(&self, cfg: &ResolvedConfig) -> PathBuf {
        self.root.join(cfg.builder_config_filename())
    }

    /// Resolve a user-supplied path against the workspace root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// The two artifact kinds the kit produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    InstallerConfig,
    PackerTemplate,
}

impl ArtifactKind {
    /// Human-readable name used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            Self::InstallerConfig => "Installer config file",
            Self::PackerTemplate => "Packer template",
        }
    }

    /// Field names the schema defines.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::InstallerConfig => InstallerData::FIELDS,
            Self::PackerTemplate => PackerData::FIELDS,
        }
    }

    /// Destination of this artifact within `workspace`.
    pub fn destination(self, workspace: &Workspace, cfg: &ResolvedConfig) -> PathBuf {
        match self {
            Self::InstallerConfig => workspace.installer_config_path(),
            Self::PackerTemplate => workspace.packer_config_path(cfg),
        }
    }

    /// Render this artifact from `template` for `cfg`.
    pub fn generate(
        self,
        cfg: &ResolvedConfig,
        template: &Path,
        workspace: &Workspace,
    ) -> KitResult<PathBuf> {
        let job = RenderJob::new(template, self.destination(workspace, cfg));
        match self {
            Self::InstallerConfig => job.run(&InstallerData::from(cfg)),
            Self::PackerTemplate => job.run(&PackerData::from(cfg)),
        }
    }
}

/// One template rendered to one destination.
#[derive(Debug, Clone)]
pub struct RenderJob {
    template: PathBuf,
    destination: PathBuf,
}

impl RenderJob {
    pub fn new(template: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            destination: destination.into(),
        }
    }

    /// Parse the template without rendering it.
    pub fn load(&self) -> KitResult<Template> {
        load_template(&self.template)
    }

    /// Render against `data` and write the destination.
    ///
    /// The destination is only opened after rendering succeeded, so a
    /// template error leaves any previous artifact untouched.
    pub fn run<D: TemplateData + ?Sized>(&self, data: &D) -> KitResult<PathBuf> {
        let template = self.load()?;
        let rendered = template.render(data).map_err(|source| KitError::Template {
            name: template.name().to_string(),
            source,
        })?;
        common::write_file_with_dirs(&self.destination, rendered.as_bytes())?;
        debug!(
            template = %self.template.display(),
            destination = %self.destination.display(),
            bytes = rendered.len(),
            "rendered artifact"
        );
        Ok(self.destination.clone())
    }
}

/// Read and parse the template at `path`.
pub fn load_template(path: &Path) -> KitResult<Template> {
    let source = common::read_text(path)?;
    let name = path.display().to_string();
    Template::parse(name.as_str(), &source).map_err(|source| KitError::Template { name, source })
}
