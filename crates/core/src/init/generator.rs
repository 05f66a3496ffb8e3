//! Directory structure and file generation for `.agentpipe/` initialization.

use super::error::{InitError, InitResult};
use super::templates::get_template;
use crate::config::{AGENTS_FILE, CONFIG_DIR, SETTINGS_FILE};
use std::fs;
use std::path::{Path, PathBuf};

/// Options for initializing a `.agentpipe/` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where `.agentpipe/` will be created.
    pub target_dir: PathBuf,

    /// Overwrite an existing `.agentpipe/` directory.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
        }
    }
}

/// Generate the `.agentpipe/` directory with its templates.
///
/// ```text
/// .agentpipe/
/// ├── config.toml
/// └── agents.yaml
/// ```
///
/// Returns the path of the created directory.
///
/// # Errors
/// - the directory already exists and `force` is not set
/// - a template file cannot be found
/// - file system operations fail
pub async fn generate_project_structure(options: InitOptions) -> InitResult<PathBuf> {
    let ap_dir = options.target_dir.join(CONFIG_DIR);

    if ap_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(ap_dir));
    }

    fs::create_dir_all(&ap_dir).map_err(|source| InitError::DirectoryCreate {
        path: ap_dir.clone(),
        source,
    })?;

    write_template_file(&ap_dir, SETTINGS_FILE)?;
    write_template_file(&ap_dir, AGENTS_FILE)?;

    tracing::info!(path = %ap_dir.display(), "initialized project directory");

    Ok(ap_dir)
}

fn write_template_file(ap_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = ap_dir.join(template_path);

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })
}
