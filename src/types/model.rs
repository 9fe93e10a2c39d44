use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Represents a Gemini model identifier.
///
/// This can be a predefined model or a custom string value for models that
/// are newer than this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model versions
    Known(KnownModel),

    /// Custom model identifier (for future models or tuned models)
    Custom(String),
}

/// Known Gemini model versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// Gemini 2.0 Flash
    #[serde(rename = "gemini-2.0-flash")]
    Gemini20Flash,

    /// Gemini 2.0 Flash Lite
    #[serde(rename = "gemini-2.0-flash-lite")]
    Gemini20FlashLite,

    /// Gemini 1.5 Flash
    #[serde(rename = "gemini-1.5-flash")]
    Gemini15Flash,

    /// Gemini 1.5 Pro
    #[serde(rename = "gemini-1.5-pro")]
    Gemini15Pro,

    /// Gemini 2.5 Flash
    #[serde(rename = "gemini-2.5-flash")]
    Gemini25Flash,

    /// Gemini 2.5 Pro
    #[serde(rename = "gemini-2.5-pro")]
    Gemini25Pro,
}

impl KnownModel {
    const ALL: [KnownModel; 6] = [
        KnownModel::Gemini20Flash,
        KnownModel::Gemini20FlashLite,
        KnownModel::Gemini15Flash,
        KnownModel::Gemini15Pro,
        KnownModel::Gemini25Flash,
        KnownModel::Gemini25Pro,
    ];

    /// The identifier used in request paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::Gemini20Flash => "gemini-2.0-flash",
            KnownModel::Gemini20FlashLite => "gemini-2.0-flash-lite",
            KnownModel::Gemini15Flash => "gemini-1.5-flash",
            KnownModel::Gemini15Pro => "gemini-1.5-pro",
            KnownModel::Gemini25Flash => "gemini-2.5-flash",
            KnownModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::Gemini20Flash)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Known(known_model) => write!(f, "{}", known_model),
            Model::Custom(custom) => write!(f, "{}", custom),
        }
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("models/");
        Ok(KnownModel::ALL
            .iter()
            .find(|known| known.as_str() == s)
            .map(|known| Model::Known(*known))
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<String> for Model {
    fn from(model: String) -> Self {
        Model::Custom(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        Model::Custom(model.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_model_serialization() {
        let model = Model::Known(KnownModel::Gemini20Flash);
        let json = serde_json::to_string(&model).unwrap();
        assert_eq!(json, r#""gemini-2.0-flash""#);
    }

    #[test]
    fn test_model_deserialization() {
        let model: Model = serde_json::from_str(r#""gemini-1.5-pro""#).unwrap();
        assert_eq!(model, Model::Known(KnownModel::Gemini15Pro));

        let model: Model = serde_json::from_str(r#""gemini-exp-1206""#).unwrap();
        assert_eq!(model, Model::Custom("gemini-exp-1206".to_string()));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            "gemini-2.0-flash".parse::<Model>().unwrap(),
            Model::Known(KnownModel::Gemini20Flash)
        );
        assert_eq!(
            "models/gemini-2.5-pro".parse::<Model>().unwrap(),
            Model::Known(KnownModel::Gemini25Pro)
        );
        assert_eq!(
            "tunedModels/mine".parse::<Model>().unwrap(),
            Model::Custom("tunedModels/mine".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Model::default().to_string(), "gemini-2.0-flash");
        let model = Model::Custom("gemini-next".to_string());
        assert_eq!(model.to_string(), "gemini-next");
    }
}
