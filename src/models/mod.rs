//! Chat model catalog.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::types::Pricing;

/// Model used for new conversations when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Models with known descriptions and pricing.
///
/// Conversations store the model as a plain id string, so ids outside this
/// list still work; they just carry no pricing.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum ChatModel {
    #[strum(serialize = "gpt-4o")]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-mini")]
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "gpt-4-turbo")]
    #[serde(rename = "gpt-4-turbo")]
    Gpt4Turbo,
    #[strum(serialize = "gpt-3.5-turbo")]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ChatModel {
    /// Get the API model identifier.
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Gpt4o => "Multimodal: text, image, voice",
            Self::Gpt4oMini => "Lightweight and cheap for chatbots",
            Self::Gpt4Turbo => "Fast text model",
            Self::Gpt35Turbo => "Budget option",
        }
    }

    /// USD per million input/output tokens.
    pub fn pricing(&self) -> Pricing {
        let (input_per_m, output_per_m) = match self {
            Self::Gpt4o => (2.5, 10.0),
            Self::Gpt4oMini => (0.15, 0.6),
            Self::Gpt4Turbo => (1.5, 6.0),
            Self::Gpt35Turbo => (0.5, 1.5),
        };
        Pricing {
            input_per_m,
            output_per_m,
        }
    }

    /// Look up a catalog entry by API id.
    pub fn lookup(model_id: &str) -> Option<Self> {
        model_id.trim().parse().ok()
    }

    /// All catalog entries in display order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Pricing for an arbitrary model id, if it is in the catalog.
pub fn pricing_for(model_id: &str) -> Option<Pricing> {
    ChatModel::lookup(model_id).map(|m| m.pricing())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_ids() {
        assert_eq!(ChatModel::lookup("gpt-4o-mini"), Some(ChatModel::Gpt4oMini));
        assert_eq!(ChatModel::lookup("gpt-4o"), Some(ChatModel::Gpt4o));
        assert_eq!(ChatModel::lookup("llama3"), None);
    }

    #[test]
    fn display_matches_api_id() {
        for model in ChatModel::all() {
            assert_eq!(model.to_string(), model.as_str());
            assert_eq!(ChatModel::lookup(model.as_str()), Some(model));
        }
        assert_eq!(ChatModel::Gpt35Turbo.as_str(), "gpt-3.5-turbo");
    }

    #[test]
    fn default_model_has_pricing() {
        let pricing = pricing_for(DEFAULT_MODEL).unwrap();
        assert_eq!(pricing.input_per_m, 2.5);
        assert_eq!(pricing.output_per_m, 10.0);
    }
}
