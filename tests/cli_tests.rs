//! Command-line tests: run the built binary inside a temporary workspace.
//!
//! The child gets a cleared environment so `KIT_*` values come only from
//! each test.

mod helpers;

use std::fs;
use std::process::{Command, Output};

use helpers::{assert_file_exists, assert_not_exists, TestEnv};
use serde_json::Value;

fn kit(env: &TestEnv) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_freebsdvirt-image-kit"));
    cmd.current_dir(&env.work_dir)
        .env_clear()
        .env("PATH", "/usr/bin:/bin")
        .env("HOME", env.work_dir.join("home"))
        .env("KIT_PACKER_BIN", &env.packer_bin);
    cmd
}

fn with_keys(mut cmd: Command, env: &TestEnv) -> Command {
    cmd.arg("--ssh-public-key")
        .arg(env.key_dir.join("id_rsa.pub"))
        .arg("--ssh-private-key")
        .arg(env.key_dir.join("id_rsa"))
        .arg("--ssh-password")
        .arg("fixed-password");
    cmd
}

fn run(mut cmd: Command) -> Output {
    cmd.output().expect("Failed to run freebsdvirt-image-kit")
}

/// The JSON document `--print-config` writes after the config summary.
fn printed_config(output: &Output) -> Value {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let start = stdout.find('{').expect("no JSON in --print-config output");
    serde_json::from_str(&stdout[start..]).expect("invalid JSON in --print-config output")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Flag precedence
// =============================================================================

#[test]
fn test_env_supplies_iso_base_url() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.env("KIT_ISO_BASE_URL", "https://env/").arg("--print-config");

    let config = printed_config(&run(cmd));

    assert_eq!(
        config["iso_url"],
        "https://env/14.1/FreeBSD-14.1-RELEASE-amd64-disc1.iso"
    );
}

#[test]
fn test_flag_beats_env_iso_base_url() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.env("KIT_ISO_BASE_URL", "https://env/")
        .args(["--iso-base-url", "https://flag/", "--print-config"]);

    let config = printed_config(&run(cmd));

    assert_eq!(
        config["iso_url"],
        "https://flag/14.1/FreeBSD-14.1-RELEASE-amd64-disc1.iso"
    );
    assert_eq!(
        config["checksum_url"],
        "https://flag/14.1/CHECKSUM.SHA512-FreeBSD-14.1-RELEASE-amd64"
    );
}

#[test]
fn test_flag_beats_dotenv_iso_base_url() {
    let env = TestEnv::new();
    fs::write(env.work_dir.join(".env"), "KIT_ISO_BASE_URL=https://dotenv/\n").unwrap();

    let mut cmd = with_keys(kit(&env), &env);
    cmd.arg("--print-config");
    let config = printed_config(&run(cmd));
    assert_eq!(config["iso_base_url"], "https://dotenv/");

    let mut cmd = with_keys(kit(&env), &env);
    cmd.args(["--iso-base-url", "https://flag/", "--print-config"]);
    let config = printed_config(&run(cmd));
    assert_eq!(config["iso_base_url"], "https://flag/");
}

#[test]
fn test_print_config_masks_password() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.arg("--print-config");

    let output = run(cmd);
    let config = printed_config(&output);

    assert_eq!(config["ssh_password"], "********");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("fixed-password"));
}

#[test]
fn test_empty_key_path_falls_back_to_home() {
    let env = TestEnv::new();
    let mut cmd = kit(&env);
    cmd.args(["--ssh-public-key", "", "--ssh-private-key", "", "--print-config"]);

    let config = printed_config(&run(cmd));

    let ssh_dir = env.work_dir.join("home/.ssh");
    assert_eq!(
        config["ssh_public_key_path"],
        ssh_dir.join("id_rsa.pub").display().to_string()
    );
    assert_eq!(
        config["ssh_private_key_path"],
        ssh_dir.join("id_rsa").display().to_string()
    );
}

// =============================================================================
// Mode selection
// =============================================================================

#[test]
fn test_gen_flag_matches_positional_mode() {
    let positional = TestEnv::new();
    let mut cmd = with_keys(kit(&positional), &positional);
    cmd.arg("all");
    let by_position = run(cmd);

    let flagged = TestEnv::new();
    let mut cmd = with_keys(kit(&flagged), &flagged);
    cmd.args(["--gen", "all"]);
    let by_flag = run(cmd);

    for (env, output) in [(&positional, &by_position), (&flagged, &by_flag)] {
        assert!(output.status.success(), "{}", stderr(output));
        assert!(String::from_utf8_lossy(&output.stdout)
            .contains("Installer config file and Packer template generated successfully."));
        assert_file_exists(&env.installer_output());
        assert_file_exists(&env.packer_output());
        assert!(env.packer_calls().is_empty());
    }
    assert_eq!(
        fs::read_to_string(positional.installer_output()).unwrap(),
        fs::read_to_string(flagged.installer_output()).unwrap()
    );
}

#[test]
fn test_positional_and_gen_together_rejected() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.args(["all", "--gen", "config"]);

    let output = run(cmd);

    assert_eq!(output.status.code(), Some(2));
    assert_not_exists(&env.installer_output());
}

#[test]
fn test_invalid_mode_exits_one() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.arg("bogus");

    let output = run(cmd);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid gen option: bogus"));
    assert_not_exists(&env.authorized_keys());
}

#[test]
fn test_missing_packer_exits_one_in_config_mode() {
    let env = TestEnv::new();
    let mut cmd = with_keys(kit(&env), &env);
    cmd.env("KIT_PACKER_BIN", env.work_dir.join("no-such-packer"))
        .arg("config");

    let output = run(cmd);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("not installed"));
    assert_not_exists(&env.authorized_keys());
    assert_not_exists(&env.installer_output());
}

#[test]
fn test_default_mode_runs_packer() {
    let env = TestEnv::new();
    let output = run(with_keys(kit(&env), &env));

    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        env.packer_calls(),
        vec![
            "init freebsd-14.1-amd64.pkr.hcl".to_string(),
            "build freebsd-14.1-amd64.pkr.hcl".to_string(),
        ]
    );
}
