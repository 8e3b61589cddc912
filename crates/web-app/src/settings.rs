use chrono::Weekday;
use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub week_start: Weekday,
    pub remote: Option<RemoteConfig>,
    pub poll_interval_ms: u32,
}

impl Settings {
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                if let Some(window) = web_sys::window() {
                    if let Ok(prefers_dark_scheme) =
                        window.match_media("(prefers-color-scheme: dark)")
                    {
                        if let Some(media_query_list) = prefers_dark_scheme {
                            if media_query_list.matches() {
                                Theme::Dark
                            } else {
                                Theme::Light
                            }
                        } else {
                            error!("failed to determine preferred color scheme");
                            Theme::Light
                        }
                    } else {
                        error!("failed to match media to determine preferred color scheme");
                        Theme::Light
                    }
                } else {
                    error!("failed to access window to determine preferred color scheme");
                    Theme::Light
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }

    /// Remote document store, if one is fully configured.
    #[must_use]
    pub fn remote(&self) -> Option<&RemoteConfig> {
        self.remote.as_ref().filter(|r| r.configured())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            week_start: Weekday::Mon,
            remote: RemoteConfig::from_env(),
            poll_interval_ms: 30_000,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

/// Location of the remote document store.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub user_id: String,
}

const PLACEHOLDER_URL: &str = "https://example.com";

impl RemoteConfig {
    /// Configuration provided at build time by `MINIGYM_REMOTE_URL` and
    /// `MINIGYM_REMOTE_USER`.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_values(
            option_env!("MINIGYM_REMOTE_URL"),
            option_env!("MINIGYM_REMOTE_USER"),
        )
    }

    fn from_values(base_url: Option<&str>, user_id: Option<&str>) -> Option<Self> {
        let config = Self {
            base_url: base_url?.trim_end_matches('/').to_string(),
            user_id: user_id?.to_string(),
        };
        config.configured().then_some(config)
    }

    #[must_use]
    pub fn configured(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.user_id.trim().is_empty()
            && !self.base_url.starts_with(PLACEHOLDER_URL)
    }
}
