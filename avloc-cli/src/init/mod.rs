//! Initialize job directories based on templates.

pub mod job;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Error, Result};

// Initiate new job directory based on input args
pub fn init_at_path(path_str: &str, template_str: &str) -> Result<()> {
    println!(
        "Initiating new job directory at: {path} (template: {template})",
        path = path_str,
        template = template_str
    );

    // get the file stem as the sweep name
    let path = Path::new(path_str);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "jobs".to_string());

    // test if directory doesn't already exist at path
    if path.exists() {
        return Err(Error::msg(format!(
            "Can't initialize job directory, path already exists ({path}). Try another path.",
            path = path_str
        )));
    }

    // get the template files
    let template_files = match job::collect_template_files(&name, template_str) {
        Some(tf) => tf,
        None => {
            return Err(Error::msg(format!(
                "Failed getting template files for template \"{}\"",
                template_str
            )))
        }
    };

    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory \"{}\"", path_str))?;
    create_template_files(path, template_files)?;

    Ok(())
}

// Create actual files from the template file content
fn create_template_files(path: &Path, files: HashMap<String, String>) -> Result<()> {
    for (name, content) in files {
        let file_full_path = path.join(&name);
        debug!("writing {}", file_full_path.to_string_lossy());
        fs::write(&file_full_path, content)
            .with_context(|| format!("Failed to create template file \"{}\"", name))?;
    }
    Ok(())
}
