// src/config/mod.rs
//! Service configuration: one TOML document plus a few environment overrides.

pub mod assistant;
pub mod llm;

pub use assistant::{
    AssistantConfig, AssistantSection, CapabilitySwitches, DataSection, FallbackSection,
    MatchingConfig, OfficeHoursSection, DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH, ENV_CORPUS_PATH,
    ENV_FUZZY_THRESHOLD,
};
pub use llm::LlmConfig;
