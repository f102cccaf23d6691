//! Shared test utilities for pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use freebsdvirt_image_kit::artifact::Workspace;
use freebsdvirt_image_kit::resolve::{resolve, RawInputs};
use freebsdvirt_image_kit::{Mode, Pipeline};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

pub const PUBLIC_KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAITestKey tester@example\n";

pub const INSTALLER_TEMPLATE: &str = "\
PARTITIONS=DEFAULT
echo '{{ .SSHPassword }}' | pw useradd -n {{ .SSHUsername }} -h 0
";

pub const PACKER_TEMPLATE: &str = "\
version={{.FreeBSDVersion}}
arch={{.FreeBSDArch}}
output={{.OutputDir}}
disk={{.DiskSize}}
memory={{.MemorySize}}
user={{.SSHUsername}}
password={{.SSHPassword}}
iso={{.ISOURL}}
checksum={{.ISOChecksum}}
pub={{.SSHPublicKeyPath}}
priv={{.SSHPrivateKeyPath}}
";

/// Temporary workspace with keys, templates and a fake `packer`.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Working directory the pipeline writes into
    pub work_dir: PathBuf,
    /// Directory holding the SSH key pair
    pub key_dir: PathBuf,
    /// Installer template path
    pub installer_template: PathBuf,
    /// Packer template path
    pub packer_template: PathBuf,
    /// Fake packer script
    pub packer_bin: PathBuf,
}

impl TestEnv {
    /// Workspace whose fake packer succeeds on both steps.
    pub fn new() -> Self {
        Self::with_packer_exit_codes(0, 0)
    }

    /// Workspace whose fake packer exits with the given codes.
    pub fn with_packer_exit_codes(init: i32, build: i32) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let work_dir = base.join("work");
        let key_dir = base.join("keys");
        let tools = base.join("tools");
        for dir in [&work_dir, &key_dir, &tools] {
            fs::create_dir_all(dir).expect("Failed to create test dir");
        }

        fs::write(key_dir.join("id_rsa.pub"), PUBLIC_KEY).expect("Failed to write public key");
        fs::write(key_dir.join("id_rsa"), "PRIVATE KEY\n").expect("Failed to write private key");

        let installer_template = work_dir.join("installerconfig.tpl");
        let packer_template = work_dir.join("freebsd.pkr.hcl.tpl");
        fs::write(&installer_template, INSTALLER_TEMPLATE).expect("Failed to write template");
        fs::write(&packer_template, PACKER_TEMPLATE).expect("Failed to write template");

        let packer_bin = tools.join("packer");
        create_fake_packer(&packer_bin, init, build);

        Self {
            _temp_dir: temp_dir,
            work_dir,
            key_dir,
            installer_template,
            packer_template,
            packer_bin,
        }
    }

    /// Inputs with a fixed password and the test key pair.
    pub fn inputs(&self) -> RawInputs {
        RawInputs {
            ssh_password: Some("fixed-password".to_string()),
            iso_base_url: "https://x/".to_string(),
            ssh_public_key_path: Some(self.key_dir.join("id_rsa.pub")),
            ssh_private_key_path: Some(self.key_dir.join("id_rsa")),
            ..RawInputs::default()
        }
    }

    /// Pipeline for `mode` over `inputs`.
    pub fn pipeline_with(&self, mode: Mode, inputs: RawInputs) -> Pipeline {
        let config = resolve(inputs, Path::new("/nonexistent-home"), &mut StdRng::seed_from_u64(9));
        Pipeline::new(
            config,
            mode,
            Workspace::new(&self.work_dir, "http"),
            &self.installer_template,
            &self.packer_template,
            &self.packer_bin.to_string_lossy(),
        )
    }

    pub fn pipeline(&self, mode: Mode) -> Pipeline {
        self.pipeline_with(mode, self.inputs())
    }

    pub fn installer_output(&self) -> PathBuf {
        self.work_dir.join("http/installerconfig")
    }

    pub fn authorized_keys(&self) -> PathBuf {
        self.work_dir.join("http/authorized_keys")
    }

    pub fn packer_output(&self) -> PathBuf {
        self.work_dir.join("freebsd-14.1-amd64.pkr.hcl")
    }

    /// Lines written by the fake packer, one per invocation.
    pub fn packer_calls(&self) -> Vec<String> {
        match fs::read_to_string(self.work_dir.join("packer-calls.log")) {
            Ok(log) => log.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Shell script standing in for packer: logs its arguments and exits with
/// `init` or `build` depending on the sub-command.
pub fn create_fake_packer(path: &Path, init: i32, build: i32) {
    let script = format!(
        "#!/bin/sh\n\
         echo \"$@\" >> packer-calls.log\n\
         case \"$1\" in\n\
         init) exit {init} ;;\n\
         build) exit {build} ;;\n\
         version) echo 'Packer v1.11.0' ;;\n\
         esac\n"
    );
    fs::write(path, script).expect("Failed to write fake packer");
    let mut perms = fs::metadata(path).expect("Failed to get metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("Failed to set permissions");
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file at {}", path.display());
}

/// Assert that nothing exists at `path`.
pub fn assert_not_exists(path: &Path) {
    assert!(!path.exists(), "Expected nothing at {}", path.display());
}
