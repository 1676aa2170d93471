//! Model catalog and cost estimation

use std::collections::BTreeSet;

use crate::types::{Capability, ChatMessage, ModelConfig, ModelTarget};

/// Rough token count for a conversation: characters / 4, rounded up
pub fn approx_tokens(messages: &[ChatMessage]) -> u32 {
    let chars: usize = messages.iter().map(|m| m.char_len()).sum();
    chars.div_ceil(4) as u32
}

/// Estimated USD cost of one call
pub fn estimate_cost(model: &ModelConfig, prompt_tokens: u32, completion_tokens: u32) -> f64 {
    (prompt_tokens as f64 / 1000.0) * model.input_cost_per_1k
        + (completion_tokens as f64 / 1000.0) * model.output_cost_per_1k
}

/// Ordered list of models the router may choose from
///
/// Catalog order is the final tie-breaker when ranking, so it is kept
/// stable across adds and replaces.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<ModelConfig>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        let mut catalog = Self::default();
        for model in models {
            catalog.add(model);
        }
        catalog
    }

    /// Add a model, replacing an entry with the same (provider, model) in place
    pub fn add(&mut self, model: ModelConfig) {
        let target = model.target();
        match self.models.iter().position(|m| same_target(&m.target(), &target)) {
            Some(pos) => self.models[pos] = model,
            None => self.models.push(model),
        }
    }

    /// Remove a model; returns whether it was present
    pub fn remove(&mut self, target: &ModelTarget) -> bool {
        let before = self.models.len();
        self.models.retain(|m| !same_target(&m.target(), target));
        self.models.len() != before
    }

    pub fn get(&self, target: &ModelTarget) -> Option<&ModelConfig> {
        self.models.iter().find(|m| same_target(&m.target(), target))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelConfig> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Entries offering every required capability, with their catalog index
    pub fn capable<'a>(&'a self, required: &'a BTreeSet<Capability>) -> impl Iterator<Item = (usize, &'a ModelConfig)> + 'a {
        self.models
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.capabilities.satisfies(required))
    }
}

/// Provider names compare case-insensitively, model ids exactly
fn same_target(a: &ModelTarget, b: &ModelTarget) -> bool {
    a.provider.eq_ignore_ascii_case(&b.provider) && a.model == b.model
}
