use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, PartialEq, Copy, Default)]
pub enum ApiVersion {
    V1,
    #[default]
    V1Beta,
}

impl ApiVersion {
    pub fn path_segment(&self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V1Beta => "v1beta",
        }
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(ApiVersion::V1),
            "v1beta" => Ok(ApiVersion::V1Beta),
            other => Err(ConfigError::UnknownApiVersion(other.to_string())),
        }
    }
}

/// Where the hosted model API lives.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    base_url: String,
    version: ApiVersion,
}

impl Endpoint {
    pub fn new(base_url: &str, version: ApiVersion) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version,
        }
    }

    pub fn model_url(&self, model: &str) -> String {
        format!(
            "{}/{}/models/{}",
            self.base_url,
            self.version.path_segment(),
            strip_models_prefix(model)
        )
    }

    pub fn generate_url(&self, model: &str) -> String {
        format!("{}:generateContent", self.model_url(model))
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, ApiVersion::default())
    }
}

// Model ids are accepted both bare and as "models/<id>".
fn strip_models_prefix(model: &str) -> &str {
    model.trim().trim_start_matches("models/")
}
