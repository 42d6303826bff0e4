// RikTech Engine — Configuration
//
// `riktech.toml`, every key optional:
//
//   [retrieval]   history_window, training_sample, accept_threshold,
//                 knowledge_threshold, confidence_floor, confidence_ceiling
//   [confidence]  safety, command, intent, technical, fallback
//   [storage]     data_dir, training_cap
//   [templates]   summary_chars, version_label
//   [knowledge]   enabled
//   [server]      bind_address, port
//
// Lookup: explicit path, then $RIKTECH_CONFIG, then ./riktech.toml, then
// built-in defaults.

use crate::atoms::constants::*;
use crate::atoms::error::{EngineError, EngineResult};
use crate::engine::paths::default_data_dir;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub retrieval: RetrievalConfig,
    pub confidence: ConfidenceConfig,
    pub storage: StorageConfig,
    pub templates: TemplateConfig,
    pub knowledge: KnowledgeConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub history_window: usize,
    pub training_sample: usize,
    pub accept_threshold: f64,
    pub knowledge_threshold: f64,
    pub confidence_floor: f64,
    pub confidence_ceiling: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
            training_sample: DEFAULT_TRAINING_SAMPLE,
            accept_threshold: DEFAULT_ACCEPT_THRESHOLD,
            knowledge_threshold: DEFAULT_KNOWLEDGE_THRESHOLD,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            confidence_ceiling: DEFAULT_CONFIDENCE_CEILING,
        }
    }
}

impl RetrievalConfig {
    /// Recall confidence for a similarity score.
    pub fn recall_confidence(&self, score: f64) -> f64 {
        (self.confidence_floor + score).clamp(self.confidence_floor, self.confidence_ceiling)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub safety: f64,
    pub command: f64,
    pub intent: f64,
    pub technical: f64,
    pub fallback: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            safety: SAFETY_CONFIDENCE,
            command: COMMAND_CONFIDENCE,
            intent: INTENT_CONFIDENCE,
            technical: TECHNICAL_CONFIDENCE,
            fallback: FALLBACK_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// `None` means the platform default (see `paths::default_data_dir`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub training_cap: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None, training_cap: DEFAULT_TRAINING_CAP }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TemplateConfig {
    pub summary_chars: usize,
    pub version_label: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            summary_chars: DEFAULT_SUMMARY_CHARS,
            version_label: DEFAULT_VERSION_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub enabled: bool,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND_ADDRESS.to_string(), port: DEFAULT_PORT }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the first config file found; defaults when there is none.
    pub fn load(explicit: Option<&Path>) -> EngineResult<Self> {
        let Some(path) = Self::locate(explicit) else {
            info!("[config] No config file found, using defaults");
            return Ok(Self::default());
        };
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(EngineError::Config(format!("cannot read {}: {e}", path.display())));
            }
        };
        let config = Self::from_toml_str(&raw)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        info!("[config] Loaded {:?}", path);
        Ok(config)
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(p) = explicit {
            return Some(p.to_path_buf());
        }
        if let Some(p) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(p));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        local.is_file().then_some(local)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let r = &self.retrieval;
        for (name, v) in [
            ("retrieval.accept_threshold", r.accept_threshold),
            ("retrieval.knowledge_threshold", r.knowledge_threshold),
            ("retrieval.confidence_floor", r.confidence_floor),
            ("retrieval.confidence_ceiling", r.confidence_ceiling),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(EngineError::Config(format!("{name} must be within [0, 1], got {v}")));
            }
        }
        if r.confidence_floor > r.confidence_ceiling {
            return Err(EngineError::Config(
                "retrieval.confidence_floor exceeds retrieval.confidence_ceiling".into(),
            ));
        }
        if self.storage.training_cap == 0 {
            return Err(EngineError::Config("storage.training_cap must be at least 1".into()));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }
}
