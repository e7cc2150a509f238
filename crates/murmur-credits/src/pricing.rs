// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-draft credit cost.

use murmur_config::model::CreditsConfig;
use murmur_core::{DraftSettings, DraftingMode};

/// Unit costs for one generated draft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub base_unit_cost: f64,
    pub long_form_unit_cost: f64,
    pub long_form_threshold: u8,
}

impl Default for Pricing {
    fn default() -> Self {
        Self::from_config(&CreditsConfig::default())
    }
}

impl Pricing {
    pub fn from_config(config: &CreditsConfig) -> Self {
        Self {
            base_unit_cost: config.base_unit_cost,
            long_form_unit_cost: config.long_form_unit_cost,
            long_form_threshold: config.long_form_threshold,
        }
    }

    /// Credits consumed by one successful draft. Handwritten drafts are free.
    pub fn unit_cost(&self, mode: DraftingMode, settings: &DraftSettings) -> f64 {
        if !mode.consumes_credits() {
            return 0.0;
        }
        if settings.paragraphs <= self.long_form_threshold {
            self.base_unit_cost
        } else {
            self.long_form_unit_cost
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(paragraphs: u8) -> DraftSettings {
        DraftSettings {
            paragraphs,
            ..DraftSettings::default()
        }
    }

    #[test]
    fn short_drafts_cost_one_credit() {
        let pricing = Pricing::default();
        assert_eq!(pricing.unit_cost(DraftingMode::Ai, &settings(1)), 1.0);
        assert_eq!(pricing.unit_cost(DraftingMode::Hybrid, &settings(3)), 1.0);
    }

    #[test]
    fn long_drafts_cost_more() {
        let pricing = Pricing::default();
        assert_eq!(pricing.unit_cost(DraftingMode::Ai, &settings(4)), 1.5);
        assert_eq!(pricing.unit_cost(DraftingMode::Hybrid, &settings(9)), 1.5);
    }

    #[test]
    fn handwritten_is_free() {
        let pricing = Pricing::default();
        assert_eq!(pricing.unit_cost(DraftingMode::Handwritten, &settings(9)), 0.0);
    }

    #[test]
    fn threshold_follows_config() {
        let pricing = Pricing::from_config(&CreditsConfig {
            long_form_threshold: 5,
            ..CreditsConfig::default()
        });
        assert_eq!(pricing.unit_cost(DraftingMode::Ai, &settings(5)), 1.0);
        assert_eq!(pricing.unit_cost(DraftingMode::Ai, &settings(6)), 1.5);
    }
}
