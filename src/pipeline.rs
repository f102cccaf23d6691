//! Mode dispatch.
//!
//! Every mode runs the same ordered steps and differs only in which of them
//! it includes:
//!
//! | mode     | installerconfig | Packer template | packer init/build |
//! |----------|-----------------|-----------------|-------------------|
//! | `config` | yes             |                 |                   |
//! | `packer` |                 | yes             |                   |
//! | `all`    | yes             | yes             |                   |
//! | (none)   | yes             | yes             | yes               |
//!
//! Packer must be on PATH in every mode, and the SSH key pair is checked
//! before anything is written. The public key is staged in every mode.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::artifact::{ArtifactKind, Workspace};
use crate::build::PackerInvoker;
use crate::error::{KitError, KitResult};
use crate::keys;
use crate::resolve::ResolvedConfig;
use crate::timing::Timer;

/// What to generate, and whether to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Installer config only.
    Config,
    /// Packer template only.
    Packer,
    /// Both artifacts, no build.
    All,
    /// Both artifacts, then `packer init` and `packer build`.
    #[default]
    Build,
}

impl Mode {
    /// Parse an optional mode selector; absent or empty means [`Mode::Build`].
    pub fn from_selector(selector: Option<&str>) -> KitResult<Self> {
        selector.map_or(Ok(Self::Build), |s| s.parse())
    }

    /// Artifacts this mode renders, in order.
    pub fn artifacts(self) -> &'static [ArtifactKind] {
        match self {
            Self::Config => &[ArtifactKind::InstallerConfig],
            Self::Packer => &[ArtifactKind::PackerTemplate],
            Self::All | Self::Build => &[ArtifactKind::InstallerConfig, ArtifactKind::PackerTemplate],
        }
    }

    /// Whether this mode invokes the external builder.
    pub fn runs_builder(self) -> bool {
        self == Self::Build
    }
}

impl FromStr for Mode {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config" => Ok(Self::Config),
            "packer" => Ok(Self::Packer),
            "all" => Ok(Self::All),
            "" => Ok(Self::Build),
            other => Err(KitError::Usage(format!(
                "Invalid gen option: {}. Use 'config', 'packer', 'all', or omit for default behavior.",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Config => "config",
            Self::Packer => "packer",
            Self::All => "all",
            Self::Build => "build",
        };
        f.write_str(name)
    }
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Staged `authorized_keys` path.
    pub authorized_keys: PathBuf,
    /// Rendered artifacts, in the order they were written.
    pub artifacts: Vec<PathBuf>,
    /// Whether Packer ran to completion.
    pub built: bool,
}

/// One fully configured invocation.
#[derive(Debug, Clone)]
pub struct Pipeline {
    pub config: ResolvedConfig,
    pub mode: Mode,
    pub workspace: Workspace,
    pub installer_template: PathBuf,
    pub packer_template: PathBuf,
    pub invoker: PackerInvoker,
}

impl Pipeline {
    /// Assemble a pipeline. Relative template paths resolve against the
    /// workspace root, and Packer runs from it.
    pub fn new(
        config: ResolvedConfig,
        mode: Mode,
        workspace: Workspace,
        installer_template: &Path,
        packer_template: &Path,
        packer_bin: &str,
    ) -> Self {
        Self {
            installer_template: workspace.resolve_path(installer_template),
            packer_template: workspace.resolve_path(packer_template),
            invoker: PackerInvoker::new(packer_bin, workspace.root.clone()),
            config,
            mode,
            workspace,
        }
    }

    /// Template path used for `kind`.
    pub fn template_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::InstallerConfig => &self.installer_template,
            ArtifactKind::PackerTemplate => &self.packer_template,
        }
    }

    /// Run every step the mode selects. Stops at the first error; files
    /// already written stay in place.
    pub fn run(&self) -> KitResult<Outcome> {
        let cfg = &self.config;
        println!("Starting freebsdvirt-image-kit...");
        info!(mode = %self.mode, version = %cfg.os_version, arch = %cfg.architecture, "starting");

        self.invoker.ensure_installed()?;

        if cfg.password_generated {
            println!("Generated random SSH password: {}", cfg.ssh_password);
        }

        let timer = Timer::start("SSH public key");
        keys::ensure_key_pair(&cfg.ssh_public_key_path, &cfg.ssh_private_key_path)?;
        let authorized_keys =
            keys::publish_public_key(&cfg.ssh_public_key_path, &self.workspace.staging_dir)?;
        timer.finish();

        let mut artifacts = Vec::new();
        for &kind in self.mode.artifacts() {
            let timer = Timer::start(kind.label());
            let path = kind.generate(cfg, self.template_for(kind), &self.workspace)?;
            timer.finish();
            info!(artifact = %path.display(), "{} written", kind.label());
            artifacts.push(path);
        }

        match self.mode {
            Mode::Config => println!("Installer config file generated successfully."),
            Mode::Packer => println!("Packer template generated successfully."),
            Mode::All => {
                println!("Installer config file and Packer template generated successfully.")
            }
            Mode::Build => {}
        }

        let built = if self.mode.runs_builder() {
            let timer = Timer::start("packer");
            self.invoker.invoke(&self.workspace.packer_config_path(cfg))?;
            timer.finish();
            println!("freebsdvirt-image-kit: FreeBSD image generated successfully!");
            true
        } else {
            false
        };

        Ok(Outcome {
            authorized_keys,
            artifacts,
            built,
        })
    }
}
