//! Base vs. tuned scenario simulation.
//!
//! ```text
//! params ──► validate ──► compute ──────────────────► base
//!    │                                                  │
//!    └──► LeverTransformer::apply(toggles) ──► compute ─┴─► tuned
//! ```

use serde::{Deserialize, Serialize};

use flowsim_common::config::InputRangesConfig;
use flowsim_common::{Config, Result, ResultExt, Validate};

use crate::engine::compute;
use crate::levers::LeverTransformer;
use crate::metrics::{all_deltas, Metric, MetricDelta};
use crate::types::{BusinessParameters, KpiResult, LeverToggles};

/// Runs the base and lever-adjusted scenarios side by side.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    transformer: LeverTransformer,
    ranges: InputRangesConfig,
}

impl Simulator {
    /// Create a simulator with default multipliers and ranges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulator from configuration, rejecting invalid lever
    /// multipliers or ranges.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid configuration")?;
        Ok(Self {
            transformer: LeverTransformer::with_config(&config.levers),
            ranges: config.ranges.clone(),
        })
    }

    pub fn transformer(&self) -> &LeverTransformer {
        &self.transformer
    }

    /// Validate the inputs and compute both scenarios.
    ///
    /// Fails with `InvalidInput` for non-positive sales, negative costs or
    /// assets, and tax rates outside `[0, 1]`. Inputs outside the reference
    /// ranges are simulated and logged as warnings.
    pub fn run(
        &self,
        params: &BusinessParameters,
        toggles: &LeverToggles,
    ) -> Result<ScenarioComparison> {
        params
            .validate()
            .context("Invalid business parameters")?;

        for field in self.out_of_range_fields(params) {
            tracing::warn!(field, "Input outside the reference range");
        }

        let adjusted = self.transformer.apply(params, toggles);
        let base = compute(params);
        let tuned = compute(&adjusted);

        tracing::debug!(
            base_ebit = base.ebit,
            tuned_ebit = tuned.ebit,
            base_ccc = base.cash_conversion_cycle,
            tuned_ccc = tuned.cash_conversion_cycle,
            base_roi = base.roi,
            tuned_roi = tuned.roi,
            "Scenario simulated"
        );

        Ok(ScenarioComparison {
            params: *params,
            toggles: *toggles,
            adjusted,
            base,
            tuned,
        })
    }

    /// Names of inputs lying outside the reference ranges.
    pub fn out_of_range_fields(&self, params: &BusinessParameters) -> Vec<&'static str> {
        let values = [
            params.annual_sales,
            params.raw_material_pct,
            params.labor_pct,
            params.logistics_pct,
            params.opex_pct,
        ];
        self.ranges
            .entries()
            .iter()
            .zip(values)
            .filter(|((_, range), value)| !range.contains(*value))
            .map(|((name, _), _)| *name)
            .collect()
    }
}

/// Outcome of one simulation: inputs, adjusted inputs and both KPI sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub params: BusinessParameters,
    pub toggles: LeverToggles,
    /// Parameters after the levers were applied
    pub adjusted: BusinessParameters,
    pub base: KpiResult,
    pub tuned: KpiResult,
}

impl ScenarioComparison {
    /// Compare a single metric.
    pub fn delta(&self, metric: Metric) -> MetricDelta {
        MetricDelta::between(metric, &self.base, &self.tuned)
    }

    /// Compare every metric, in report order.
    pub fn deltas(&self) -> Vec<MetricDelta> {
        all_deltas(&self.base, &self.tuned)
    }

    /// Working capital freed by the levers (positive when it shrinks).
    pub fn working_capital_released(&self) -> f64 {
        self.base.working_capital - self.tuned.working_capital
    }

    /// Whether EBIT, cash cycle and ROI all moved the right way.
    pub fn improves_headline(&self) -> bool {
        self.tuned.ebit > self.base.ebit
            && self.tuned.cash_conversion_cycle < self.base.cash_conversion_cycle
            && self.tuned.roi > self.base.roi
    }
}
