// Hot-reloadable configuration for sumtopic
use crate::types::{LengthBudget, SumTopicError};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "sumtopic.toml";
pub const CONFIG_ENV: &str = "SUMTOPIC_CONFIG";
pub const WATCHER_ENV: &str = "SUMTOPIC_WATCHER_TYPE";
pub const MODELS_DIR_ENV: &str = "SUMTOPIC_MODELS_DIR";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_min_words")]
    pub min_words: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_words: default_min_words(),
        }
    }
}

fn default_max_chars() -> usize { 3500 }
fn default_min_words() -> usize { 50 }

/// Bucket table for the summary length budget. Counts below `medium_from`
/// get `short`, counts from `long_from` on get `long`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BudgetConfig {
    #[serde(default = "default_medium_from")]
    pub medium_from: usize,
    #[serde(default = "default_long_from")]
    pub long_from: usize,
    #[serde(default = "default_short")]
    pub short: [usize; 2],
    #[serde(default = "default_medium")]
    pub medium: [usize; 2],
    #[serde(default = "default_long")]
    pub long: [usize; 2],
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            medium_from: default_medium_from(),
            long_from: default_long_from(),
            short: default_short(),
            medium: default_medium(),
            long: default_long(),
        }
    }
}

fn default_medium_from() -> usize { 300 }
fn default_long_from() -> usize { 800 }
fn default_short() -> [usize; 2] { [40, 100] }
fn default_medium() -> [usize; 2] { [60, 150] }
fn default_long() -> [usize; 2] { [80, 200] }

impl BudgetConfig {
    pub fn short_budget(&self) -> LengthBudget {
        LengthBudget::new(self.short[0], self.short[1])
    }

    pub fn medium_budget(&self) -> LengthBudget {
        LengthBudget::new(self.medium[0], self.medium[1])
    }

    pub fn long_budget(&self) -> LengthBudget {
        LengthBudget::new(self.long[0], self.long[1])
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelsConfig {
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
    /// Overrides the beam count from the summarizer's generation config.
    #[serde(default)]
    pub num_beams: Option<usize>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            intra_threads: default_intra_threads(),
            num_beams: None,
        }
    }
}

fn default_models_dir() -> PathBuf { PathBuf::from("models") }
fn default_intra_threads() -> usize { 4 }

impl ModelsConfig {
    pub fn summarizer_dir(&self) -> PathBuf {
        self.dir.join("summarizer")
    }

    pub fn classifier_dir(&self) -> PathBuf {
        self.dir.join("classifier")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub watch_config: bool,
    #[serde(default = "default_highlight")]
    pub highlight: String,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            watch_config: default_true(),
            highlight: default_highlight(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_true() -> bool { true }
fn default_highlight() -> String { "cyan".to_string() }
fn default_tick_ms() -> u64 { 80 }

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub echo_stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            echo_stderr: default_true(),
        }
    }
}

fn default_log_file() -> Option<PathBuf> {
    Some(env::temp_dir().join("sumtopic_debug.log"))
}

impl AppConfig {
    /// Where to read config from: explicit path, then `SUMTOPIC_CONFIG`, then
    /// `./sumtopic.toml`, then the user config dir. `None` means defaults.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("sumtopic").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    pub fn load_from(path: &Path) -> Result<Self, SumTopicError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, SumTopicError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| SumTopicError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the located file (or defaults) and apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), SumTopicError> {
        let path = Self::locate(explicit);
        let mut config = match &path {
            Some(p) if p.exists() => Self::load_from(p)?,
            Some(p) if explicit.is_some() => {
                return Err(SumTopicError::Config(format!(
                    "config file {} not found",
                    p.display()
                )))
            }
            _ => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok((config, path))
    }

    pub fn save(&self, path: &Path) -> Result<(), SumTopicError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SumTopicError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup(WATCHER_ENV) {
            if kind.eq_ignore_ascii_case("none") {
                self.ui.watch_config = false;
            }
        }
        if let Some(dir) = lookup(MODELS_DIR_ENV) {
            if !dir.is_empty() {
                self.models.dir = PathBuf::from(dir);
            }
        }
    }

    pub fn validate(&self) -> Result<(), SumTopicError> {
        let budget = &self.budget;
        if budget.medium_from > budget.long_from {
            return Err(SumTopicError::Config(format!(
                "budget.medium_from ({}) must not exceed budget.long_from ({})",
                budget.medium_from, budget.long_from
            )));
        }
        for (name, pair) in [("short", budget.short), ("medium", budget.medium), ("long", budget.long)] {
            if pair[0] > pair[1] || pair[1] == 0 {
                return Err(SumTopicError::Config(format!(
                    "budget.{} must be [min, max] with 0 < max and min <= max, got {:?}",
                    name, pair
                )));
            }
        }
        if self.limits.max_chars == 0 {
            return Err(SumTopicError::Config("limits.max_chars must be positive".to_string()));
        }
        Ok(())
    }

    pub fn get_highlight_color(&self) -> crossterm::style::Color {
        use crossterm::style::Color;
        match self.ui.highlight.as_str() {
            "yellow" => Color::Yellow,
            "green" => Color::Green,
            "blue" => Color::Blue,
            "red" => Color::Red,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            _ => Color::White,
        }
    }
}
