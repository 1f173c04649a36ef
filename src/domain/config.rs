use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    autosave::{AutosaveOptions, IdentityPolicy},
    domain::Language,
    storage::StoreOptions,
};

/// Configuration for draft storage and autosave.
///
/// Every setting has a default, so an empty (versioned) file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Quiet period after the last edit before an autosave commits.
    debounce_ms: u64,

    /// How long the "saved" status is shown before returning to idle.
    saved_display_ms: u64,

    /// Number of leading content characters that contribute to the
    /// duplicate-detection key used when loading drafts.
    dedup_prefix_chars: usize,

    /// Title given to drafts created with a blank title.
    pub untitled_title: String,

    /// Whether autosave may create a draft, or only update an existing one.
    pub identity: IdentityPolicy,

    /// Language for new, empty editor sessions.
    pub default_language: Language,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            saved_display_ms: default_saved_display_ms(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            untitled_title: default_untitled_title(),
            identity: IdentityPolicy::default(),
            default_language: Language::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to defaults if the file is
    /// missing or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The autosave debounce delay.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// How long the "saved" status lingers.
    #[must_use]
    pub const fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }

    /// Length of the content prefix used for duplicate detection.
    #[must_use]
    pub const fn dedup_prefix_chars(&self) -> usize {
        self.dedup_prefix_chars
    }

    /// Options for [`DraftStore`](crate::DraftStore).
    #[must_use]
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            untitled_title: self.untitled_title.clone(),
            dedup_prefix_chars: self.dedup_prefix_chars,
        }
    }

    /// Options for the [`Autosave`](crate::Autosave) coordinator.
    #[must_use]
    pub const fn autosave_options(&self) -> AutosaveOptions {
        AutosaveOptions {
            debounce: self.debounce(),
            saved_display: self.saved_display(),
            identity: self.identity,
            default_language: self.default_language,
        }
    }
}

const fn default_debounce_ms() -> u64 {
    1500
}

const fn default_saved_display_ms() -> u64 {
    2000
}

const fn default_dedup_prefix_chars() -> usize {
    200
}

fn default_untitled_title() -> String {
    "Untitled Story".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_debounce_ms")]
        debounce_ms: u64,

        #[serde(default = "default_saved_display_ms")]
        saved_display_ms: u64,

        /// Characters of trimmed content that, together with the title, make
        /// two drafts count as duplicates of each other.
        #[serde(default = "default_dedup_prefix_chars")]
        dedup_prefix_chars: usize,

        #[serde(default = "default_untitled_title")]
        untitled_title: String,

        #[serde(default)]
        identity: IdentityPolicy,

        #[serde(default)]
        default_language: Language,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                debounce_ms,
                saved_display_ms,
                dedup_prefix_chars,
                untitled_title,
                identity,
                default_language,
            } => Self {
                debounce_ms,
                saved_display_ms,
                dedup_prefix_chars,
                untitled_title,
                identity,
                default_language,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            debounce_ms: config.debounce_ms,
            saved_display_ms: config.saved_display_ms,
            dedup_prefix_chars: config.dedup_prefix_chars,
            untitled_title: config.untitled_title,
            identity: config.identity,
            default_language: config.default_language,
        }
    }
}
