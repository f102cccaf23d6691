//! freebsdvirt-image-kit library.
//!
//! Resolves build parameters, stages the SSH public key, renders the FreeBSD
//! installer config and the Packer template, and drives `packer`.
//!
//! The binary in `main.rs` is a thin clap layer over [`pipeline::Pipeline`].

pub mod artifact;
pub mod build;
pub mod common;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod resolve;
pub mod template;
pub mod timing;

pub use error::{KitError, KitResult};
pub use pipeline::{Mode, Outcome, Pipeline};
pub use resolve::{resolve, RawInputs, ResolvedConfig};
