//! freebsdvirt-image-kit - create FreeBSD images for KVM using Packer.
//!
//! ```bash
//! # Generate both files and build the image
//! freebsdvirt-image-kit
//!
//! # Only render http/installerconfig
//! freebsdvirt-image-kit config
//!
//! # Only render freebsd-14.1-amd64.pkr.hcl
//! freebsdvirt-image-kit packer -v 14.1 -a amd64
//!
//! # Render both, don't build
//! freebsdvirt-image-kit all
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use freebsdvirt_image_kit::artifact::Workspace;
use freebsdvirt_image_kit::config::Config;
use freebsdvirt_image_kit::resolve::{
    self, RawInputs, DEFAULT_ARCH, DEFAULT_DISK_SIZE, DEFAULT_MEMORY, DEFAULT_OUTPUT_DIR,
    DEFAULT_SSH_USERNAME, DEFAULT_VERSION,
};
use freebsdvirt_image_kit::{logging, preflight, KitError, Mode, Pipeline};

#[derive(Parser)]
#[command(name = "freebsdvirt-image-kit")]
#[command(about = "Create FreeBSD images for KVM using Packer")]
#[command(
    long_about = "freebsdvirt-image-kit is a tool to create FreeBSD images for KVM virtualization using HashiCorp Packer as a backend.",
    disable_version_flag = true,
    after_help = "MODES:\n  config   Generate http/installerconfig only\n  packer   Generate the Packer template only\n  all      Generate both\n  (none)   Generate both and build the image"
)]
struct Cli {
    /// Generate option: 'config', 'packer', or 'all' (default: build image)
    #[arg(value_name = "MODE")]
    mode: Option<String>,

    /// Same as MODE
    #[arg(long = "gen", value_name = "MODE", conflicts_with = "mode")]
    gen_mode: Option<String>,

    /// FreeBSD version
    #[arg(short = 'v', long = "version", default_value = DEFAULT_VERSION)]
    version: String,

    /// FreeBSD architecture
    #[arg(short, long, default_value = DEFAULT_ARCH)]
    arch: String,

    /// Output directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Disk size (e.g., 5000M, 10G)
    #[arg(long, default_value = DEFAULT_DISK_SIZE)]
    disk_size: String,

    /// Memory size (e.g., 2048)
    #[arg(long, default_value = DEFAULT_MEMORY)]
    memory: String,

    /// SSH username
    #[arg(long, default_value = DEFAULT_SSH_USERNAME)]
    ssh_username: String,

    /// SSH password (if not provided, a random password will be generated)
    #[arg(long)]
    ssh_password: Option<String>,

    /// Base URL for ISO download [env: KIT_ISO_BASE_URL]
    #[arg(long)]
    iso_base_url: Option<String>,

    /// Full URL for the checksum file
    #[arg(long)]
    checksum_url: Option<String>,

    /// ISO file name (e.g., FreeBSD-14.1-RELEASE-amd64-disc1.iso)
    #[arg(long)]
    iso_file: Option<String>,

    /// Path to the installer config template file [env: KIT_INSTALLER_TEMPLATE]
    #[arg(long)]
    installer_config: Option<PathBuf>,

    /// Path to the Packer template file [env: KIT_PACKER_TEMPLATE]
    #[arg(long)]
    packer_template: Option<PathBuf>,

    /// Path to SSH public key (default: ~/.ssh/id_rsa.pub)
    #[arg(long)]
    ssh_public_key: Option<String>,

    /// Path to SSH private key (default: ~/.ssh/id_rsa)
    #[arg(long)]
    ssh_private_key: Option<String>,

    /// Directory served to the installer [env: KIT_STAGING_DIR]
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Run preflight checks and exit without generating anything
    #[arg(long)]
    preflight: bool,

    /// Print the resolved configuration and exit
    #[arg(long, conflicts_with = "preflight")]
    print_config: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = Config::load(&work_dir);

    let mode = Mode::from_selector(cli.mode.as_deref().or(cli.gen_mode.as_deref()))?;

    let raw = RawInputs {
        os_version: cli.version,
        architecture: cli.arch,
        output_directory: cli.output,
        disk_size: cli.disk_size,
        memory_size: cli.memory,
        ssh_username: cli.ssh_username,
        ssh_password: cli.ssh_password,
        iso_base_url: cli.iso_base_url.unwrap_or_else(|| config.iso_base_url.clone()),
        iso_file_name: cli.iso_file,
        checksum_url: cli.checksum_url,
        ssh_public_key_path: key_path(cli.ssh_public_key),
        ssh_private_key_path: key_path(cli.ssh_private_key),
    };
    raw.validate()?;

    let home = if raw.ssh_public_key_path.is_some() && raw.ssh_private_key_path.is_some() {
        PathBuf::new()
    } else {
        dirs::home_dir().ok_or_else(|| {
            KitError::Precondition("Error getting user home directory".to_string())
        })?
    };

    let resolved = resolve::resolve(raw, &home, &mut rand::rng());

    let staging = cli.staging_dir.unwrap_or_else(|| config.staging_dir.clone());
    let installer_template = cli
        .installer_config
        .unwrap_or_else(|| config.installer_template.clone());
    let packer_template = cli
        .packer_template
        .unwrap_or_else(|| config.packer_template.clone());

    let pipeline = Pipeline::new(
        resolved,
        mode,
        Workspace::new(work_dir, staging),
        &installer_template,
        &packer_template,
        &config.packer_bin,
    );

    if cli.print_config {
        config.print();
        println!("{}", serde_json::to_string_pretty(&pipeline.config)?);
        return Ok(());
    }

    if cli.preflight {
        preflight::run_preflight_or_fail(&pipeline)?;
        return Ok(());
    }

    pipeline.run()?;
    Ok(())
}

/// An empty key path means "use the default under ~/.ssh".
fn key_path(arg: Option<String>) -> Option<PathBuf> {
    arg.filter(|p| !p.is_empty()).map(PathBuf::from)
}
