//! Pipeline configuration
//!
//! Settings are plain serde structs with per-field defaults, so an empty TOML
//! document yields the standard behavior:
//!
//! ```toml
//! document_extension = ".xml"
//! excerpt_limit = 256
//! staleness_multiplier = 3
//! horizon = "all"
//! default_merge_policy = "sum"
//!
//! [merge_policies]
//! A44 = "replace"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::aggregator::{Aggregator, MergePolicy};
use crate::codes::DocumentType;
use crate::error::ConfigError;
use crate::timeline::Horizon;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PipelineConfig {
    /// File extension of documents inside archives, matched case-insensitively
    #[serde(default = "default_document_extension")]
    pub document_extension: String,

    /// Maximum characters of a failed response body kept in `Api` errors
    #[serde(default = "default_excerpt_limit")]
    pub excerpt_limit: usize,

    /// A snapshot older than this many update intervals is stale
    #[serde(default = "default_staleness_multiplier")]
    pub staleness_multiplier: u32,

    /// Points exposed by [`Pipeline::timeline`](crate::pipeline::Pipeline::timeline)
    #[serde(default)]
    pub horizon: Horizon,

    /// Policy for document types without an entry in `merge_policies`
    #[serde(default)]
    pub default_merge_policy: MergePolicy,

    /// Document type code → merge policy
    #[serde(default)]
    pub merge_policies: BTreeMap<String, MergePolicy>,
}

fn default_document_extension() -> String {
    ".xml".to_owned()
}

fn default_excerpt_limit() -> usize {
    256
}

fn default_staleness_multiplier() -> u32 {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            document_extension: default_document_extension(),
            excerpt_limit: default_excerpt_limit(),
            staleness_multiplier: default_staleness_multiplier(),
            horizon: Horizon::default(),
            default_merge_policy: MergePolicy::default(),
            merge_policies: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse from TOML text and validate merge policy codes
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.aggregator()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Aggregator with the configured per-document-type policies
    pub fn aggregator(&self) -> Result<Aggregator, ConfigError> {
        let base = Aggregator::new().with_default_policy(self.default_merge_policy);
        self.merge_policies
            .iter()
            .try_fold(base, |aggregator, (code, policy)| {
                let document_type =
                    DocumentType::from_code(code).map_err(ConfigError::UnknownDocumentType)?;
                Ok(aggregator.with_policy(document_type, *policy))
            })
    }
}
