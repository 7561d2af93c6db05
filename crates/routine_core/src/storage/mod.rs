pub mod json_store;

use crate::error::AppError;
use std::path::PathBuf;

const APP_DIR: &str = "routineapp";

/// `$env_var` when set, otherwise `file_name` in the per-user app directory
/// (`%APPDATA%\routineapp` on Windows, `~/.config/routineapp` elsewhere).
pub fn resolve_app_file(env_var: &str, file_name: &str) -> Result<PathBuf, AppError> {
    if let Some(explicit) = std::env::var_os(env_var).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(explicit));
    }

    let (base_var, base) = if cfg!(windows) {
        ("APPDATA", std::env::var_os("APPDATA").map(PathBuf::from))
    } else {
        (
            "HOME",
            std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")),
        )
    };
    base.map(|dir| dir.join(APP_DIR).join(file_name))
        .ok_or_else(|| AppError::invalid_data(format!("{base_var} is not set")))
}
