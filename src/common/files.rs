//! File helpers with scoped handles and path-carrying errors.
//!
//! Every helper opens its handles inside the function body so they are
//! closed on all return paths, and maps IO failures to [`KitError::Io`]
//! naming the file involved.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{KitError, KitResult};

/// Create `dir` and any missing parents.
pub fn ensure_dir_exists(dir: &Path) -> KitResult<()> {
    fs::create_dir_all(dir).map_err(KitError::io_at("create directory", dir))
}

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> KitResult<String> {
    let mut file = File::open(path).map_err(KitError::io_at("open", path))?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(KitError::io_at("read", path))?;
    Ok(content)
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// Truncates any existing file (last write wins).
pub fn write_file_with_dirs<C: AsRef<[u8]>>(path: &Path, content: C) -> KitResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }
    let file = File::create(path).map_err(KitError::io_at("create", path))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(content.as_ref())
        .and_then(|()| writer.flush())
        .map_err(KitError::io_at("write", path))
}

/// Copy the bytes of `src` to `dest` verbatim, overwriting `dest`.
pub fn copy_file(src: &Path, dest: &Path) -> KitResult<u64> {
    let mut source = File::open(src).map_err(KitError::io_at("open", src))?;
    let mut destination = File::create(dest).map_err(KitError::io_at("create", dest))?;
    io::copy(&mut source, &mut destination).map_err(KitError::io_at("copy to", dest))
}
