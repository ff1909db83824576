//! Where the explainer keeps its files.
//!
//! Two roots, both named after the binary:
//!
//! * `settings.toml` lives in the platform config dir
//!   (`~/.config/dialogue-explainer/` on Linux, `%APPDATA%` on Windows,
//!   `~/Library/Application Support` on macOS).
//! * Synthesized `.wav` files go to `audio/` under the local data dir
//!   (`~/.local/share/dialogue-explainer/audio/` on Linux) unless
//!   `synth.output_dir` says otherwise.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "dialogue-explainer";

/// Resolved locations of the settings file and the default audio directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `settings.toml`, read by `AppConfig::load` and written by `init-config`.
    pub settings_file: PathBuf,
    /// Fallback directory for [`AudioStore`](crate::synth::AudioStore).
    pub audio_dir: PathBuf,
}

impl AppPaths {
    /// Paths under the platform directories; `.` stands in for a directory
    /// the platform does not report.
    pub fn new() -> Self {
        let here = || PathBuf::from(".");
        Self::under(
            &dirs::config_dir().unwrap_or_else(here),
            &dirs::data_local_dir().unwrap_or_else(here),
        )
    }

    /// Paths under explicit config and data roots.
    pub fn under(config_root: &Path, data_root: &Path) -> Self {
        Self {
            settings_file: config_root.join(APP_DIR).join("settings.toml"),
            audio_dir: data_root.join(APP_DIR).join("audio"),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_under_roots() {
        let paths = AppPaths::under(Path::new("/cfg"), Path::new("/data"));
        assert_eq!(
            paths.settings_file,
            Path::new("/cfg/dialogue-explainer/settings.toml")
        );
        assert_eq!(paths.audio_dir, Path::new("/data/dialogue-explainer/audio"));
    }

    #[test]
    fn platform_paths_end_in_app_dir() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.ends_with("dialogue-explainer/settings.toml"));
        assert!(paths.audio_dir.ends_with("dialogue-explainer/audio"));
    }
}
