use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::model::Category;

const CONFIG_FILE: &str = "news_hub";
const ENV_PREFIX: &str = "NEWS_HUB";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily-bridge envelope language.
    pub language: String,
    /// Daily-bridge envelope owner.
    pub owner: String,
    /// Default news document for `normalize`, `fold-bridge` and `rebalance`.
    pub news_path: PathBuf,
    pub caps: CategoryCaps,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "ko-KR".to_string(),
            owner: "운목(Woonmok)".to_string(),
            news_path: PathBuf::from("data/normalized/news.json"),
            caps: CategoryCaps::default(),
        }
    }
}

/// Per-category item caps applied by `rebalance`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CategoryCaps {
    pub listeria_free: usize,
    pub cultured_meat: usize,
    pub high_end_audio: usize,
    pub computer_ai: usize,
    pub global_biz: usize,
}

impl Default for CategoryCaps {
    fn default() -> Self {
        Self {
            listeria_free: 8,
            cultured_meat: 10,
            high_end_audio: 10,
            computer_ai: 10,
            global_biz: 8,
        }
    }
}

impl CategoryCaps {
    pub fn cap(&self, category: Category) -> usize {
        match category {
            Category::ListeriaFree => self.listeria_free,
            Category::CulturedMeat => self.cultured_meat,
            Category::HighEndAudio => self.high_end_audio,
            Category::ComputerAi => self.computer_ai,
            Category::GlobalBiz => self.global_biz,
        }
    }
}

impl Settings {
    /// Defaults, then `news_hub.toml` if present, then `NEWS_HUB_*` env vars
    /// (`NEWS_HUB_CAPS__GLOBAL_BIZ=6` for nested keys).
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
