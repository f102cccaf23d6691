//! Shared utilities across the kit's modules.

pub mod files;

pub use files::{copy_file, ensure_dir_exists, read_text, write_file_with_dirs};
