//! Token usage and cost tracking types.

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// Token usage reported for one completion.
///
/// Fields the API leaves out deserialize as zero.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_m: f64,
    pub output_per_m: f64,
}

/// Estimated cost for one or more generations.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Cost {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub currency: String,
}

impl Cost {
    /// Compute cost from usage and per-token pricing.
    pub fn from_usage(usage: &Usage, pricing: Pricing) -> Self {
        let input_cost = (usage.prompt_tokens as f64 / 1_000_000.0) * pricing.input_per_m;
        let output_cost = (usage.completion_tokens as f64 / 1_000_000.0) * pricing.output_per_m;
        Self {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            currency: "USD".to_string(),
        }
    }

    /// Running cost of a message log: the sum over assistant messages.
    pub fn of_messages(messages: &[Message], pricing: Pricing) -> Self {
        let mut usage = Usage::default();
        for msg in messages.iter().filter(|m| m.role == Role::Assistant) {
            if let Some(ref u) = msg.usage {
                usage.merge(u);
            }
        }
        Self::from_usage(&usage, pricing)
    }

    /// Convert the total into another currency at a fixed rate.
    pub fn converted_total(&self, rate: f64) -> f64 {
        self.total_cost * rate
    }
}
