//! Config path resolution
//!
//! Resolves configuration paths relative to the plugin binary.

use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigResult};

/// File name of the API config
pub const CONFIG_FILE_NAME: &str = "extra_settings.toml";

/// Plugin base directory: the parent of the `bin/` folder holding the binary
///
/// `<base>/bin/extra_settings.so` resolves to `<base>/`.
pub fn plugin_base_dir() -> ConfigResult<PathBuf> {
    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;
    base_dir_of(&exe)
}

fn base_dir_of(binary: &Path) -> ConfigResult<PathBuf> {
    binary
        .parent() // bin/
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .ok_or(ConfigError::NoConfigDirectory)
}

/// `<base>/configs/`
pub fn configs_dir() -> ConfigResult<PathBuf> {
    Ok(plugin_base_dir()?.join("configs"))
}

/// `<base>/configs/extra_settings.toml`
pub fn config_path() -> ConfigResult<PathBuf> {
    Ok(configs_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_skips_bin() {
        let binary = PathBuf::from("/game/mods/extra_settings/bin/extra_settings.so");
        let base = base_dir_of(&binary).unwrap();
        assert_eq!(base, PathBuf::from("/game/mods/extra_settings"));
        assert!(base
            .join("configs")
            .join(CONFIG_FILE_NAME)
            .ends_with("configs/extra_settings.toml"));
    }

    #[test]
    fn test_root_has_no_base() {
        assert!(matches!(
            base_dir_of(Path::new("/")),
            Err(ConfigError::NoConfigDirectory)
        ));
    }
}
