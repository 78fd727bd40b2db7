use anyhow::{Error, Result};
use std::path::{Path, PathBuf};

/// Picks the job config to use.
///
/// An explicit path must exist; a directory is taken to mean the config
/// file inside it. Without an explicit path the working directory is
/// searched, and `None` means built-in defaults apply.
pub(crate) fn resolve_config_path(cwd: &Path, arg: Option<&str>) -> Result<Option<PathBuf>> {
    match arg {
        Some(p_str) => {
            let mut path = PathBuf::from(p_str);
            if path.is_relative() {
                path = cwd.join(path);
            }
            if path.is_dir() {
                path = path.join(avloc::CONFIG_FILE_NAME);
            }
            if !path.is_file() {
                return Err(Error::msg(format!(
                    "job config not found: {}",
                    path.to_string_lossy()
                )));
            }
            Ok(Some(path))
        }
        None => {
            let path = cwd.join(avloc::CONFIG_FILE_NAME);
            if path.is_file() {
                Ok(Some(path))
            } else {
                Ok(None)
            }
        }
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        None => path.to_string_lossy().to_string(),
    }
}
