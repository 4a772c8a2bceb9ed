use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::compositor::{
    Viewport, COMPACT_VIEWPORT_MAX_WIDTH, VIEWPORT_MAX_HEIGHT, VIEWPORT_MAX_WIDTH,
};
use crate::editor::{
    clamp_control_font_size, FontFamily, SessionSettings, TextStyle, DEFAULT_LAYER_TEXT,
    DEFAULT_MAX_LAYERS,
};
use crate::gallery::DEFAULT_SUBREDDIT;
use crate::geometry::Color;
use crate::template::{DEFAULT_TEMPLATE_LIMIT, IMGFLIP_TEMPLATES_URL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "memeforge";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_COMPACT_BREAKPOINT: i32 = 768;

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) viewport_max_width: f64,
    pub(crate) viewport_max_height: f64,
    pub(crate) compact_viewport_max_width: f64,
    /// Window widths below this use the compact viewport.
    pub(crate) compact_breakpoint: i32,
    pub(crate) template_limit: usize,
    pub(crate) max_layers: usize,
    pub(crate) default_text: String,
    pub(crate) default_font_family: FontFamily,
    pub(crate) default_font_size: u32,
    pub(crate) default_color: Color,
    pub(crate) download_dir: Option<PathBuf>,
    pub(crate) template_api_url: String,
    pub(crate) gallery_subreddit: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let style = TextStyle::default();
        Self {
            viewport_max_width: VIEWPORT_MAX_WIDTH,
            viewport_max_height: VIEWPORT_MAX_HEIGHT,
            compact_viewport_max_width: COMPACT_VIEWPORT_MAX_WIDTH,
            compact_breakpoint: DEFAULT_COMPACT_BREAKPOINT,
            template_limit: DEFAULT_TEMPLATE_LIMIT,
            max_layers: DEFAULT_MAX_LAYERS,
            default_text: DEFAULT_LAYER_TEXT.to_string(),
            default_font_family: style.font_family,
            default_font_size: style.font_size,
            default_color: style.color,
            download_dir: None,
            template_api_url: IMGFLIP_TEMPLATES_URL.to_string(),
            gallery_subreddit: DEFAULT_SUBREDDIT.to_string(),
        }
    }
}

impl AppConfig {
    pub(crate) fn viewport_for_width(&self, window_width: i32) -> Viewport {
        let max_width = if window_width > 0 && window_width < self.compact_breakpoint {
            self.compact_viewport_max_width
        } else {
            self.viewport_max_width
        };
        Viewport::new(max_width.max(1.0), self.viewport_max_height.max(1.0))
    }

    pub(crate) fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_layers: self.max_layers.max(1),
            default_text: self.default_text.clone(),
            default_style: TextStyle {
                font_family: self.default_font_family,
                font_size: clamp_control_font_size(self.default_font_size),
                color: self.default_color,
            },
        }
    }
}

pub(crate) fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(root: &Path, contents: &str) {
        let dir = root.join(APP_DIR);
        std::fs::create_dir_all(&dir).expect("config dir");
        std::fs::write(dir.join(APP_CONFIG_FILE), contents).expect("config file");
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "memeforge",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/config-root/memeforge/config.json"));
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("memeforge", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/memeforge/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("memeforge", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let config = load_app_config_with(Some(root.path()), None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.template_limit, 12);
        assert_eq!(config.default_text, "Click to edit");
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let root = tempfile::tempdir().expect("temp dir");
        write_config(
            root.path(),
            r##"{"max_layers": 4, "default_font_family": "Comic Sans MS", "default_color": "#00ff00", "download_dir": "/srv/memes"}"##,
        );

        let config = load_app_config_with(Some(root.path()), None);
        assert_eq!(config.max_layers, 4);
        assert_eq!(config.download_dir, Some(PathBuf::from("/srv/memes")));
        assert_eq!(config.viewport_max_width, 500.0);

        let settings = config.session_settings();
        assert_eq!(settings.max_layers, 4);
        assert_eq!(settings.default_style.font_family, FontFamily::ComicSansMs);
        assert_eq!(settings.default_style.color, Color::new(0, 255, 0));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        write_config(root.path(), r#"{"default_color": "purple"}"#);
        assert_eq!(
            load_app_config_with(Some(root.path()), None),
            AppConfig::default()
        );
    }

    #[test]
    fn viewport_switches_to_compact_below_breakpoint() {
        let config = AppConfig::default();
        assert_eq!(config.viewport_for_width(1280), Viewport::regular());
        assert_eq!(config.viewport_for_width(600), Viewport::compact());
        assert_eq!(config.viewport_for_width(0), Viewport::regular());
    }

    #[test]
    fn session_settings_clamp_font_size() {
        let config = AppConfig {
            default_font_size: 200,
            max_layers: 0,
            ..AppConfig::default()
        };
        let settings = config.session_settings();
        assert_eq!(settings.default_style.font_size, 64);
        assert_eq!(settings.max_layers, 1);
    }
}
