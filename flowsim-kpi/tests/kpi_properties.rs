//! Property tests for the KPI engine and the lever transformer.
//!
//! Run with: `cargo test -p flowsim-kpi --test kpi_properties`

use proptest::prelude::*;

use flowsim_kpi::{apply_levers, compute, BusinessParameters, Lever, LeverToggles};

// ============================================================================
// Strategies
// ============================================================================

fn params_strategy() -> impl Strategy<Value = BusinessParameters> {
    (
        (1_000.0f64..20_000_000.0, 0.0f64..60.0, 0.0f64..40.0, 0.0f64..25.0, 0.0f64..40.0),
        (0u32..365, 0u32..365, 0u32..365),
        (0.0f64..10_000_000.0, 0.0f64..=1.0),
    )
        .prop_map(
            |(
                (annual_sales, raw_material_pct, labor_pct, logistics_pct, opex_pct),
                (inventory_days, receivable_days, payable_days),
                (fixed_assets, effective_tax_rate),
            )| BusinessParameters {
                annual_sales,
                raw_material_pct,
                labor_pct,
                logistics_pct,
                opex_pct,
                inventory_days,
                receivable_days,
                payable_days,
                fixed_assets,
                effective_tax_rate,
            },
        )
}

fn toggles_strategy() -> impl Strategy<Value = LeverToggles> {
    (any::<bool>(), any::<[bool; 8]>()).prop_map(|(feedback_enabled, levers)| {
        let mut toggles = LeverToggles {
            feedback_enabled,
            ..LeverToggles::none()
        };
        for (lever, on) in Lever::ALL.into_iter().zip(levers) {
            toggles = toggles.with(lever, on);
        }
        toggles
    })
}

// ============================================================================
// Engine
// ============================================================================

proptest! {
    #[test]
    fn compute_is_deterministic(params in params_strategy()) {
        prop_assert_eq!(compute(&params), compute(&params));
    }

    #[test]
    fn margins_match_their_definitions(params in params_strategy()) {
        let kpi = compute(&params);
        let tolerance = 1e-6 * kpi.sales;
        prop_assert!((kpi.gross_margin * kpi.sales - (kpi.sales - kpi.cogs)).abs() < tolerance);
        prop_assert!((kpi.operating_margin * kpi.sales - kpi.ebit).abs() < tolerance);
    }

    #[test]
    fn cash_cycle_is_exact(params in params_strategy()) {
        let kpi = compute(&params);
        let expected = params.inventory_days as i64 + params.receivable_days as i64
            - params.payable_days as i64;
        prop_assert_eq!(kpi.cash_conversion_cycle, expected);
    }

    #[test]
    fn investment_is_never_negative(params in params_strategy()) {
        let kpi = compute(&params);
        prop_assert!(kpi.total_investment >= 0.0);
        if kpi.total_investment == 0.0 {
            prop_assert_eq!(kpi.roi, 0.0);
        }
    }
}

// ============================================================================
// Levers
// ============================================================================

proptest! {
    #[test]
    fn feedback_off_is_identity(params in params_strategy(), toggles in toggles_strategy()) {
        let toggles = LeverToggles { feedback_enabled: false, ..toggles };
        prop_assert_eq!(apply_levers(&params, &toggles), params);
    }

    #[test]
    fn adjusted_fields_stay_non_negative(
        params in params_strategy(),
        toggles in toggles_strategy(),
    ) {
        let adjusted = apply_levers(&params, &toggles);
        prop_assert!(adjusted.raw_material_pct >= 0.0);
        prop_assert!(adjusted.labor_pct >= 0.0);
        prop_assert!(adjusted.logistics_pct >= 0.0);
        prop_assert!(adjusted.opex_pct >= 0.0);
        prop_assert!(adjusted.fixed_assets >= 0.0);
    }

    #[test]
    fn levers_never_raise_costs(params in params_strategy(), toggles in toggles_strategy()) {
        let adjusted = apply_levers(&params, &toggles);
        prop_assert!(adjusted.cogs_pct() <= params.cogs_pct() + 1e-9);
        prop_assert!(adjusted.opex_pct <= params.opex_pct);
        if toggles.is_active(Lever::PredictiveMaintenance) {
            prop_assert!(adjusted.fixed_assets <= params.fixed_assets.round());
        } else {
            prop_assert_eq!(adjusted.fixed_assets, params.fixed_assets);
        }
    }

    #[test]
    fn levers_never_lengthen_cash_cycle(
        params in params_strategy(),
        toggles in toggles_strategy(),
    ) {
        let base = compute(&params);
        let tuned = compute(&apply_levers(&params, &toggles));
        prop_assert!(tuned.cash_conversion_cycle <= base.cash_conversion_cycle);
    }

    #[test]
    fn margin_mix_cuts_two_points_pro_rata(params in params_strategy()) {
        let toggles = LeverToggles::none().with(Lever::MarginMix, true);
        let adjusted = apply_levers(&params, &toggles);

        let before = params.cogs_pct();
        let after = adjusted.cogs_pct();
        prop_assert!((after - (before - 2.0).max(0.0)).abs() < 1e-9);

        // Each component keeps its share of the total
        for (old, new) in [
            (params.raw_material_pct, adjusted.raw_material_pct),
            (params.labor_pct, adjusted.labor_pct),
            (params.logistics_pct, adjusted.logistics_pct),
        ] {
            prop_assert!((new * before - old * after).abs() < 1e-9 * before.max(1.0) * 100.0);
        }

        prop_assert_eq!(adjusted.opex_pct, params.opex_pct);
        prop_assert_eq!(adjusted.inventory_days, params.inventory_days);
    }
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn margin_mix_on_reference_costs() {
    let toggles = LeverToggles::none().with(Lever::MarginMix, true);
    let adjusted = apply_levers(&BusinessParameters::REFERENCE, &toggles);

    assert!((adjusted.cogs_pct() - 55.0).abs() < 1e-9);
    assert!((adjusted.raw_material_pct - 32.0 * 55.0 / 57.0).abs() < 1e-9);
    assert!((adjusted.labor_pct - 18.0 * 55.0 / 57.0).abs() < 1e-9);
    assert!((adjusted.logistics_pct - 7.0 * 55.0 / 57.0).abs() < 1e-9);
}

#[test]
fn default_levers_improve_reference() {
    let params = BusinessParameters::REFERENCE;
    let base = compute(&params);
    let tuned = compute(&apply_levers(&params, &LeverToggles::default()));

    assert!((base.cogs - 2_850_000.0).abs() < 1e-6);
    assert!((base.ebit - 1_350_000.0).abs() < 1e-6);
    assert_eq!(base.cash_conversion_cycle, 70);

    assert!(tuned.ebit > base.ebit);
    assert!(tuned.cash_conversion_cycle < base.cash_conversion_cycle);
    assert!(tuned.roi > base.roi);
}
