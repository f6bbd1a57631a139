//! Feedback lever transformer.
//!
//! Each lever is a row in a rule table mapping the lever to one or more
//! `(field, transform)` adjustments. Rules run in table order against a copy
//! of the input snapshot; the higher-margin mix runs after every rule because
//! it redistributes a flat COGS cut across the already-adjusted cost
//! percentages.
//!
//! | Lever | Field | Transform |
//! |-------|-------|-----------|
//! | Negotiate suppliers | raw material % | × 0.95 |
//! | Optimize production | labor %, opex % | × 0.95, × 0.97 |
//! | Efficient logistics | logistics % | × 0.90 |
//! | Just-in-time | DIO | × 0.70, rounded |
//! | Improve collections | DSO | × 0.80, rounded |
//! | Improve payments | DPO | × 1.15, rounded |
//! | Predictive maintenance | fixed assets | × 0.90, rounded |
//! | Higher-margin mix | raw, labor, logistics % | −2pp of their sum, pro rata |
//!
//! Every result is floored at zero. Day counts and fixed assets are rounded
//! to whole units; cost percentages are not.

use serde::{Deserialize, Serialize};

use flowsim_common::LeverConfig;

use crate::types::{BusinessParameters, Lever, LeverToggles};

/// Lower bound on the COGS percentage used as a divisor by the margin mix.
const MIN_COGS_PCT: f64 = 1e-6;

/// Adjustable parameter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RawMaterialPct,
    LaborPct,
    LogisticsPct,
    OpexPct,
    InventoryDays,
    ReceivableDays,
    PayableDays,
    FixedAssets,
}

impl Field {
    fn read(self, params: &BusinessParameters) -> f64 {
        match self {
            Self::RawMaterialPct => params.raw_material_pct,
            Self::LaborPct => params.labor_pct,
            Self::LogisticsPct => params.logistics_pct,
            Self::OpexPct => params.opex_pct,
            Self::InventoryDays => f64::from(params.inventory_days),
            Self::ReceivableDays => f64::from(params.receivable_days),
            Self::PayableDays => f64::from(params.payable_days),
            Self::FixedAssets => params.fixed_assets,
        }
    }

    fn write(self, params: &mut BusinessParameters, value: f64) {
        match self {
            Self::RawMaterialPct => params.raw_material_pct = value,
            Self::LaborPct => params.labor_pct = value,
            Self::LogisticsPct => params.logistics_pct = value,
            Self::OpexPct => params.opex_pct = value,
            Self::InventoryDays => params.inventory_days = whole_days(value),
            Self::ReceivableDays => params.receivable_days = whole_days(value),
            Self::PayableDays => params.payable_days = whole_days(value),
            Self::FixedAssets => params.fixed_assets = value,
        }
    }
}

/// Day counts arrive here already rounded and non-negative. Validated inputs
/// (`MAX_DAYS` days, multipliers up to `MAX_LEVER_FACTOR`) stay far below
/// `u32::MAX`; anything larger is clamped.
fn whole_days(value: f64) -> u32 {
    value.min(f64::from(u32::MAX)) as u32
}

/// Operation applied to a single field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "factor")]
pub enum Transform {
    /// Multiply, floor at zero.
    Scale(f64),
    /// Multiply, round to the nearest whole unit, floor at zero.
    ScaleRounded(f64),
}

impl Transform {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Scale(factor) => (value * factor).max(0.0),
            Self::ScaleRounded(factor) => (value * factor).round().max(0.0),
        }
    }
}

/// One field adjustment made by a lever.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub field: Field,
    pub transform: Transform,
}

/// A lever and the adjustments it makes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverRule {
    pub lever: Lever,
    pub adjustments: Vec<Adjustment>,
}

/// Applies enabled levers to a parameter snapshot.
#[derive(Debug, Clone)]
pub struct LeverTransformer {
    rules: Vec<LeverRule>,
    margin_mix_cut_points: f64,
}

impl LeverTransformer {
    /// Create a transformer with the default multipliers.
    pub fn new() -> Self {
        Self::with_config(&LeverConfig::default())
    }

    /// Create a transformer with custom multipliers.
    pub fn with_config(config: &LeverConfig) -> Self {
        let adjust = |field, transform| Adjustment { field, transform };
        let rules = vec![
            LeverRule {
                lever: Lever::NegotiateSuppliers,
                adjustments: vec![adjust(
                    Field::RawMaterialPct,
                    Transform::Scale(config.raw_material_factor),
                )],
            },
            LeverRule {
                lever: Lever::OptimizeProduction,
                adjustments: vec![
                    adjust(Field::LaborPct, Transform::Scale(config.labor_factor)),
                    adjust(Field::OpexPct, Transform::Scale(config.production_opex_factor)),
                ],
            },
            LeverRule {
                lever: Lever::EfficientLogistics,
                adjustments: vec![adjust(
                    Field::LogisticsPct,
                    Transform::Scale(config.logistics_factor),
                )],
            },
            LeverRule {
                lever: Lever::JustInTime,
                adjustments: vec![adjust(
                    Field::InventoryDays,
                    Transform::ScaleRounded(config.inventory_days_factor),
                )],
            },
            LeverRule {
                lever: Lever::ImproveCollections,
                adjustments: vec![adjust(
                    Field::ReceivableDays,
                    Transform::ScaleRounded(config.receivable_days_factor),
                )],
            },
            LeverRule {
                lever: Lever::ImprovePayments,
                adjustments: vec![adjust(
                    Field::PayableDays,
                    Transform::ScaleRounded(config.payable_days_factor),
                )],
            },
            LeverRule {
                lever: Lever::PredictiveMaintenance,
                adjustments: vec![adjust(
                    Field::FixedAssets,
                    Transform::ScaleRounded(config.fixed_assets_factor),
                )],
            },
        ];

        Self {
            rules,
            margin_mix_cut_points: config.margin_mix_cut_points,
        }
    }

    /// The rule table, in application order. Margin mix is not a table rule.
    pub fn rules(&self) -> &[LeverRule] {
        &self.rules
    }

    /// COGS percentage points removed by the margin mix.
    pub fn margin_mix_cut_points(&self) -> f64 {
        self.margin_mix_cut_points
    }

    /// Produce the lever-adjusted snapshot. The input is never modified.
    pub fn apply(&self, params: &BusinessParameters, toggles: &LeverToggles) -> BusinessParameters {
        let mut adjusted = *params;
        if !toggles.feedback_enabled {
            return adjusted;
        }

        for rule in self.rules.iter().filter(|r| toggles.is_on(r.lever)) {
            for adjustment in &rule.adjustments {
                let value = adjustment.transform.apply(adjustment.field.read(&adjusted));
                adjustment.field.write(&mut adjusted, value);
            }
        }

        if toggles.margin_mix {
            self.apply_margin_mix(&mut adjusted);
        }

        tracing::debug!(
            levers = ?toggles.active_levers(),
            cogs_pct_before = params.cogs_pct(),
            cogs_pct_after = adjusted.cogs_pct(),
            "Applied feedback levers"
        );
        adjusted
    }

    /// Remove a flat number of COGS points, spread pro rata over the three
    /// cost components.
    fn apply_margin_mix(&self, params: &mut BusinessParameters) {
        let cogs_pct = params.cogs_pct();
        let reduced = (cogs_pct - self.margin_mix_cut_points).max(0.0);
        let factor = reduced / cogs_pct.max(MIN_COGS_PCT);

        params.raw_material_pct *= factor;
        params.labor_pct *= factor;
        params.logistics_pct *= factor;
    }
}

impl Default for LeverTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply levers with the default multipliers.
pub fn apply_levers(params: &BusinessParameters, toggles: &LeverToggles) -> BusinessParameters {
    LeverTransformer::new().apply(params, toggles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const EPS: f64 = 1e-9;

    fn only(lever: Lever) -> LeverToggles {
        LeverToggles::none().with(lever, true)
    }

    #[test]
    fn test_feedback_disabled_is_identity() {
        let toggles = LeverToggles {
            feedback_enabled: false,
            ..LeverToggles::all()
        };
        let params = BusinessParameters::REFERENCE;
        assert_eq!(apply_levers(&params, &toggles), params);
    }

    #[test]
    fn test_no_levers_is_identity() {
        let params = BusinessParameters::REFERENCE;
        assert_eq!(apply_levers(&params, &LeverToggles::none()), params);
    }

    #[test]
    fn test_negotiate_suppliers() {
        let out = apply_levers(&BusinessParameters::REFERENCE, &only(Lever::NegotiateSuppliers));
        assert!((out.raw_material_pct - 30.4).abs() < EPS);
        assert_eq!(out.labor_pct, 18.0);
    }

    #[test]
    fn test_optimize_production_touches_labor_and_opex() {
        let out = apply_levers(&BusinessParameters::REFERENCE, &only(Lever::OptimizeProduction));
        assert!((out.labor_pct - 17.1).abs() < EPS);
        assert!((out.opex_pct - 15.52).abs() < EPS);
        assert_eq!(out.raw_material_pct, 32.0);
    }

    #[test]
    fn test_efficient_logistics() {
        let out = apply_levers(&BusinessParameters::REFERENCE, &only(Lever::EfficientLogistics));
        assert!((out.logistics_pct - 6.3).abs() < EPS);
    }

    #[test_case(Lever::JustInTime, 60, 42 ; "jit 60 days")]
    #[test_case(Lever::JustInTime, 45, 31 ; "jit product just below half")]
    #[test_case(Lever::JustInTime, 1, 1 ; "jit one day")]
    #[test_case(Lever::ImproveCollections, 45, 36 ; "collections 45 days")]
    #[test_case(Lever::ImproveCollections, 2, 2 ; "collections rounds 1.6 up")]
    #[test_case(Lever::ImprovePayments, 35, 40 ; "payments 40.25 rounds down")]
    #[test_case(Lever::ImprovePayments, 13, 15 ; "payments 14.95 rounds up")]
    #[test_case(Lever::ImprovePayments, 0, 0 ; "payments zero stays zero")]
    fn test_day_levers_round(lever: Lever, days: u32, expected: u32) {
        let params = BusinessParameters {
            inventory_days: days,
            receivable_days: days,
            payable_days: days,
            ..BusinessParameters::REFERENCE
        };
        let out = apply_levers(&params, &only(lever));
        let got = match lever {
            Lever::JustInTime => out.inventory_days,
            Lever::ImproveCollections => out.receivable_days,
            _ => out.payable_days,
        };
        assert_eq!(got, expected);
    }

    #[test]
    fn test_predictive_maintenance_rounds_assets() {
        let params = BusinessParameters {
            fixed_assets: 1_234_567.0,
            ..BusinessParameters::REFERENCE
        };
        let out = apply_levers(&params, &only(Lever::PredictiveMaintenance));
        // 1_111_110.3 rounds to a whole unit
        assert_eq!(out.fixed_assets, 1_111_110.0);
    }

    #[test]
    fn test_percentages_are_not_rounded() {
        let params = BusinessParameters {
            raw_material_pct: 33.0,
            ..BusinessParameters::REFERENCE
        };
        let out = apply_levers(&params, &only(Lever::NegotiateSuppliers));
        assert!((out.raw_material_pct - 31.35).abs() < EPS);
    }

    #[test]
    fn test_margin_mix_alone_cuts_two_points_pro_rata() {
        let params = BusinessParameters::REFERENCE;
        let out = apply_levers(&params, &only(Lever::MarginMix));

        assert!((params.cogs_pct() - out.cogs_pct() - 2.0).abs() < EPS);
        assert!((out.raw_material_pct / out.labor_pct - 32.0 / 18.0).abs() < EPS);
        assert!((out.labor_pct / out.logistics_pct - 18.0 / 7.0).abs() < EPS);
        assert_eq!(out.opex_pct, params.opex_pct);
    }

    #[test]
    fn test_margin_mix_runs_after_cost_levers() {
        let out = apply_levers(&BusinessParameters::REFERENCE, &LeverToggles::all());
        // 30.4 + 17.1 + 6.3 = 53.8, minus 2 points
        assert!((out.cogs_pct() - 51.8).abs() < EPS);
        let factor = 51.8 / 53.8;
        assert!((out.raw_material_pct - 30.4 * factor).abs() < EPS);
    }

    #[test]
    fn test_margin_mix_on_tiny_cogs_floors_at_zero() {
        let params = BusinessParameters {
            raw_material_pct: 1.0,
            labor_pct: 0.5,
            logistics_pct: 0.0,
            ..BusinessParameters::REFERENCE
        };
        let out = apply_levers(&params, &only(Lever::MarginMix));
        assert_eq!(out.cogs_pct(), 0.0);
    }

    #[test]
    fn test_margin_mix_on_zero_cogs() {
        let params = BusinessParameters {
            raw_material_pct: 0.0,
            labor_pct: 0.0,
            logistics_pct: 0.0,
            ..BusinessParameters::REFERENCE
        };
        let out = apply_levers(&params, &only(Lever::MarginMix));
        assert_eq!(out.raw_material_pct, 0.0);
        assert_eq!(out.labor_pct, 0.0);
        assert_eq!(out.logistics_pct, 0.0);
    }

    #[test]
    fn test_input_is_untouched() {
        let params = BusinessParameters::REFERENCE;
        let _ = apply_levers(&params, &LeverToggles::all());
        assert_eq!(params, BusinessParameters::REFERENCE);
    }

    #[test]
    fn test_custom_config() {
        let config = LeverConfig {
            inventory_days_factor: 0.5,
            margin_mix_cut_points: 7.0,
            ..LeverConfig::default()
        };
        let transformer = LeverTransformer::with_config(&config);
        let toggles = only(Lever::JustInTime).with(Lever::MarginMix, true);
        let out = transformer.apply(&BusinessParameters::REFERENCE, &toggles);

        assert_eq!(out.inventory_days, 30);
        assert!((out.cogs_pct() - 50.0).abs() < EPS);
        assert_eq!(transformer.margin_mix_cut_points(), 7.0);
    }

    #[test]
    fn test_rule_table_order_and_shape() {
        let transformer = LeverTransformer::new();
        let levers: Vec<Lever> = transformer.rules().iter().map(|r| r.lever).collect();
        assert_eq!(levers, Lever::ALL[..7].to_vec());

        let production = &transformer.rules()[1];
        assert_eq!(production.adjustments.len(), 2);
        assert_eq!(production.adjustments[1].field, Field::OpexPct);
        assert_eq!(production.adjustments[1].transform, Transform::Scale(0.97));
    }

    #[test]
    fn test_transform_floors_negative_factor() {
        assert_eq!(Transform::Scale(-1.0).apply(10.0), 0.0);
        assert_eq!(Transform::ScaleRounded(-0.5).apply(3.0), 0.0);
    }
}
