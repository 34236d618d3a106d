// sunbridge-common/src/config.rs
use std::env;
use std::path::PathBuf;

use directories::UserDirs;
use tracing::debug;

use super::error::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub shortcut_dir: PathBuf,
    pub apps_json: PathBuf,
    pub image_dir: PathBuf,
    pub autodetect_manifest: PathBuf,
}

impl Config {
    /// Resolve the default locations for the legacy host, the destination
    /// catalog and the box-art directory. Every path can be overridden on
    /// the command line afterwards.
    pub fn load() -> Result<Self> {
        debug!("Loading sunbridge configuration");

        let local_app_data = env_dir("LOCALAPPDATA")
            .unwrap_or_else(|| home_dir().join("AppData").join("Local"));
        let program_files =
            env_dir("PROGRAMFILES").unwrap_or_else(|| PathBuf::from("C:\\Program Files"));

        let shortcut_dir = env_dir("SUNBRIDGE_SHORTCUT_DIR")
            .unwrap_or_else(|| local_app_data.join("NVIDIA Corporation").join("Shield Apps"));

        let apps_json = env_dir("SUNBRIDGE_APPS").unwrap_or_else(|| {
            program_files
                .join("Sunshine")
                .join("config")
                .join("apps.json")
        });

        let image_dir = env_dir("SUNBRIDGE_IMAGE_DIR")
            .unwrap_or_else(|| pictures_dir().join("Sunshine"));

        let autodetect_manifest = env_dir("SUNBRIDGE_AUTODETECT_MANIFEST").unwrap_or_else(|| {
            local_app_data
                .join("NVIDIA")
                .join("NvBackend")
                .join("autodetect.json")
        });

        debug!(
            "Effective paths: shortcuts={} apps={} images={}",
            shortcut_dir.display(),
            apps_json.display(),
            image_dir.display()
        );

        Ok(Self {
            shortcut_dir,
            apps_json,
            image_dir,
            autodetect_manifest,
        })
    }
}

fn env_dir(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

fn home_dir() -> PathBuf {
    UserDirs::new().map_or_else(|| PathBuf::from("/"), |ud| ud.home_dir().to_path_buf())
}

fn pictures_dir() -> PathBuf {
    UserDirs::new()
        .and_then(|ud| ud.picture_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| home_dir().join("Pictures"))
}

pub fn load_config() -> Result<Config> {
    Config::load()
}
