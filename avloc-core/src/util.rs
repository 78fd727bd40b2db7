//! Contains a collection of useful utility functions.

extern crate strsim;

use std::fs::{read, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use crate::error::Error;
use crate::Result;

pub fn read_text_file<P: AsRef<Path>>(file: P) -> std::io::Result<String> {
    let file_path = file.as_ref();
    trace!("reading {:?}", file_path);
    let mut fd = File::open(&file_path)?;
    let mut content = String::new();
    fd.read_to_string(&mut content)?;

    Ok(content)
}

/// Create a static deser object from given path using serde.
pub fn deser_struct_from_path<T>(file_path: &Path) -> Result<T>
where
    for<'de> T: serde::Deserialize<'de>,
{
    let ext = file_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let d: T = match ext.as_deref() {
        Some("toml") => toml::from_slice(&read(file_path)?)?,
        #[cfg(feature = "yaml")]
        Some("yaml") | Some("yml") => serde_yaml::from_slice(&read(file_path)?)?,
        _ => return Err(Error::UnknownConfigFormat(file_path.to_path_buf())),
    };
    Ok(d)
}

/// Joins `path` onto `dir`, dropping `.` components.
pub fn join_clean(dir: &Path, path: &Path) -> PathBuf {
    let mut joined = dir.to_path_buf();
    for component in path.components() {
        if component != Component::CurDir {
            joined.push(component);
        }
    }
    if joined.as_os_str().is_empty() {
        joined.push(".");
    }
    joined
}

/// Formats a float as the shortest decimal that reads back to the same
/// value, keeping a fractional part for integral values (`0.0`, `1.7`).
pub fn fmt_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Get a similar name based on string similarity.
pub fn get_similar(original: &str, list: &[&str]) -> Option<String> {
    use self::strsim::normalized_damerau_levenshtein;
    let mut highest_sim = 0f64;
    let mut best = None;
    for candidate in list {
        let sim = normalized_damerau_levenshtein(
            &candidate.to_lowercase(),
            &original.to_lowercase(),
        );
        if sim > highest_sim {
            highest_sim = sim;
            best = Some(*candidate);
        }
    }
    if highest_sim > 0.4f64 {
        best.map(|s| s.to_string())
    } else {
        None
    }
}
