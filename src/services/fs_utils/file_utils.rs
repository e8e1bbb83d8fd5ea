use std::fs;
use std::io;
use std::path::Path;

/// Copies `from` to `to` only if `to` does not exist yet.
///
/// The target is opened with `create_new`, so two writers racing on the same
/// path cannot both win. Returns `Ok(false)` when the target already exists.
pub fn copy_new_file(from: &Path, to: &Path) -> io::Result<bool> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut target = match fs::OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    let copied = fs::File::open(from).and_then(|mut source| io::copy(&mut source, &mut target));
    if let Err(e) = copied {
        // Don't leave a truncated file behind for the next run to trust.
        drop(target);
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(true)
}

/// Base name of a path written with either separator, as archives produced
/// on another platform may carry foreign separators.
pub fn base_name(value: &str) -> Option<&str> {
    value
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}
