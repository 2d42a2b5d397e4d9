//! Where asha keeps its config file and per-user data.
use once_cell::sync::Lazy;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "asha";

const DEFAULT_CONFIG: &str = include_str!("../data/config.yml");

static PLATFORM_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| home_fallback(".config"))
});

static PLATFORM_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .map(|p| p.join(APP_DIR))
        .unwrap_or_else(|| home_fallback(".local/share"))
});

fn home_fallback(relative: &str) -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(relative)
        .join(APP_DIR)
}

/// An empty `XDG_*` variable counts as unset.
fn resolve_dir(xdg_base: Option<OsString>, platform_dir: &Path) -> PathBuf {
    match xdg_base {
        Some(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => platform_dir.to_path_buf(),
    }
}

/// Directory holding `asha.yml`.
pub fn get_config_dir() -> PathBuf {
    resolve_dir(std::env::var_os("XDG_CONFIG_HOME"), &PLATFORM_CONFIG_DIR)
}

/// Directory for session storage, REPL history and logs. Created on demand.
pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let path = resolve_dir(std::env::var_os("XDG_DATA_HOME"), &PLATFORM_DATA_DIR);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Contents written to `asha.yml` when no config file exists yet.
pub fn get_default_config() -> &'static str {
    DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_resolve_dir() {
        let platform = Path::new("/platform/asha");
        assert_eq!(
            resolve_dir(Some(OsString::from("/xdg")), platform),
            PathBuf::from("/xdg/asha")
        );
        assert_eq!(resolve_dir(Some(OsString::new()), platform), platform);
        assert_eq!(resolve_dir(None, platform), platform);
    }

    #[test]
    fn test_get_config_dir_follows_xdg() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let tmp_dir = tempfile::tempdir().unwrap();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", tmp_dir.path());
        }
        assert_eq!(get_config_dir(), tmp_dir.path().join("asha"));

        unsafe {
            env::remove_var("XDG_CONFIG_HOME");
        }
        assert_eq!(get_config_dir(), *PLATFORM_CONFIG_DIR);
        assert!(get_config_dir().ends_with("asha"));
    }

    #[test]
    fn test_get_data_dir_is_created() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let tmp_dir = tempfile::tempdir().unwrap();
        unsafe {
            env::set_var("XDG_DATA_HOME", tmp_dir.path());
        }

        let data_dir = get_data_dir().unwrap();
        assert_eq!(data_dir, tmp_dir.path().join("asha"));
        assert!(data_dir.is_dir());

        unsafe {
            env::remove_var("XDG_DATA_HOME");
        }
    }

    #[test]
    fn test_default_config_points_at_local_service() {
        let config: serde_yaml::Value = serde_yaml::from_str(get_default_config()).unwrap();
        assert_eq!(config["service"].as_str(), Some("http://127.0.0.1:8000"));
        assert_eq!(config["theme"].as_str(), Some("dark"));
    }
}
