//! Core types for the KPI simulation.
//!
//! Percentages are whole-number scaled (`32.0` means 32%), day counts are
//! whole days and the tax rate is a fraction in `[0, 1]`.

use serde::{Deserialize, Serialize};

use flowsim_common::validation::{check_non_negative, check_range, collect_errors};
use flowsim_common::{Validate, ValidationError, ValidationResult};

/// Effective tax rates offered as presets.
pub const TAX_RATE_PRESETS: [f64; 4] = [0.0, 0.19, 0.25, 0.30];

/// Upper bound on DIO, DSO and DPO (ten years).
pub const MAX_DAYS: u32 = 3_650;

// ============================================================================
// Business Parameters
// ============================================================================

/// One snapshot of operating inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessParameters {
    /// Annual sales in currency units
    pub annual_sales: f64,
    /// Raw material cost, % of sales
    pub raw_material_pct: f64,
    /// Labor cost, % of sales
    pub labor_pct: f64,
    /// Logistics cost, % of sales
    pub logistics_pct: f64,
    /// Operating expenses, % of sales
    pub opex_pct: f64,
    /// Days inventory outstanding (DIO)
    pub inventory_days: u32,
    /// Days sales outstanding (DSO)
    pub receivable_days: u32,
    /// Days payable outstanding (DPO)
    pub payable_days: u32,
    /// Fixed assets in currency units
    pub fixed_assets: f64,
    /// Effective tax rate in [0, 1]
    pub effective_tax_rate: f64,
}

impl BusinessParameters {
    /// Reference inputs of a mid-sized manufacturer.
    pub const REFERENCE: Self = Self {
        annual_sales: 5_000_000.0,
        raw_material_pct: 32.0,
        labor_pct: 18.0,
        logistics_pct: 7.0,
        opex_pct: 16.0,
        inventory_days: 60,
        receivable_days: 45,
        payable_days: 35,
        fixed_assets: 2_000_000.0,
        effective_tax_rate: 0.25,
    };

    /// Combined COGS percentage (raw material + labor + logistics).
    pub fn cogs_pct(&self) -> f64 {
        self.raw_material_pct + self.labor_pct + self.logistics_pct
    }
}

impl Default for BusinessParameters {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl Validate for BusinessParameters {
    fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if !self.annual_sales.is_finite() || self.annual_sales <= 0.0 {
            errors.push(ValidationError::InvalidValue {
                field: "annual_sales".into(),
                reason: format!("must be a positive finite number, got {}", self.annual_sales),
            });
        }

        let non_negative = [
            ("raw_material_pct", self.raw_material_pct),
            ("labor_pct", self.labor_pct),
            ("logistics_pct", self.logistics_pct),
            ("opex_pct", self.opex_pct),
            ("fixed_assets", self.fixed_assets),
        ];
        errors.extend(
            non_negative
                .iter()
                .filter_map(|(field, value)| check_non_negative(field, *value).err()),
        );

        if let Err(e) = check_range("effective_tax_rate", self.effective_tax_rate, 0.0, 1.0) {
            errors.push(e);
        }

        let days = [
            ("inventory_days", self.inventory_days),
            ("receivable_days", self.receivable_days),
            ("payable_days", self.payable_days),
        ];
        errors.extend(days.iter().filter_map(|(field, value)| {
            check_range(field, f64::from(*value), 0.0, f64::from(MAX_DAYS)).err()
        }));

        collect_errors(errors)
    }
}

// ============================================================================
// Lever Toggles
// ============================================================================

/// Feedback levers a user can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    NegotiateSuppliers,
    OptimizeProduction,
    EfficientLogistics,
    JustInTime,
    ImproveCollections,
    ImprovePayments,
    PredictiveMaintenance,
    MarginMix,
}

impl Lever {
    /// All levers in application order; margin mix is always last.
    pub const ALL: [Lever; 8] = [
        Lever::NegotiateSuppliers,
        Lever::OptimizeProduction,
        Lever::EfficientLogistics,
        Lever::JustInTime,
        Lever::ImproveCollections,
        Lever::ImprovePayments,
        Lever::PredictiveMaintenance,
        Lever::MarginMix,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NegotiateSuppliers => "Negotiate suppliers",
            Self::OptimizeProduction => "Optimize production",
            Self::EfficientLogistics => "Efficient logistics",
            Self::JustInTime => "Just-in-time",
            Self::ImproveCollections => "Improve collections",
            Self::ImprovePayments => "Improve payments",
            Self::PredictiveMaintenance => "Predictive maintenance",
            Self::MarginMix => "Higher-margin mix",
        }
    }

    /// Part of the flow the lever acts on.
    pub fn area(&self) -> &'static str {
        match self {
            Self::NegotiateSuppliers => "Supply",
            Self::OptimizeProduction => "Operations",
            Self::EfficientLogistics => "Logistics",
            Self::JustInTime => "Inventory",
            Self::ImproveCollections => "Customers",
            Self::ImprovePayments => "Suppliers",
            Self::PredictiveMaintenance => "Capex",
            Self::MarginMix => "Product mix",
        }
    }
}

impl std::fmt::Display for Lever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Lever switch state.
///
/// `feedback_enabled` is the master switch: when off, no lever applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeverToggles {
    pub feedback_enabled: bool,
    pub negotiate_suppliers: bool,
    pub optimize_production: bool,
    pub efficient_logistics: bool,
    pub just_in_time: bool,
    pub improve_collections: bool,
    pub improve_payments: bool,
    pub predictive_maintenance: bool,
    pub margin_mix: bool,
}

impl Default for LeverToggles {
    fn default() -> Self {
        Self {
            feedback_enabled: true,
            negotiate_suppliers: true,
            optimize_production: true,
            efficient_logistics: true,
            just_in_time: true,
            improve_collections: true,
            improve_payments: true,
            predictive_maintenance: true,
            margin_mix: false,
        }
    }
}

impl LeverToggles {
    /// Master switch on, every individual lever off.
    pub fn none() -> Self {
        Self {
            feedback_enabled: true,
            negotiate_suppliers: false,
            optimize_production: false,
            efficient_logistics: false,
            just_in_time: false,
            improve_collections: false,
            improve_payments: false,
            predictive_maintenance: false,
            margin_mix: false,
        }
    }

    /// Master switch and every lever on.
    pub fn all() -> Self {
        Self {
            margin_mix: true,
            ..Self::default()
        }
    }

    /// Return a copy with one lever switched.
    pub fn with(mut self, lever: Lever, on: bool) -> Self {
        *self.slot(lever) = on;
        self
    }

    /// Raw toggle state, ignoring the master switch.
    pub fn is_on(&self, lever: Lever) -> bool {
        match lever {
            Lever::NegotiateSuppliers => self.negotiate_suppliers,
            Lever::OptimizeProduction => self.optimize_production,
            Lever::EfficientLogistics => self.efficient_logistics,
            Lever::JustInTime => self.just_in_time,
            Lever::ImproveCollections => self.improve_collections,
            Lever::ImprovePayments => self.improve_payments,
            Lever::PredictiveMaintenance => self.predictive_maintenance,
            Lever::MarginMix => self.margin_mix,
        }
    }

    /// Whether the lever takes effect (master switch and lever both on).
    pub fn is_active(&self, lever: Lever) -> bool {
        self.feedback_enabled && self.is_on(lever)
    }

    /// Levers that take effect, in application order.
    pub fn active_levers(&self) -> Vec<Lever> {
        Lever::ALL
            .into_iter()
            .filter(|lever| self.is_active(*lever))
            .collect()
    }

    fn slot(&mut self, lever: Lever) -> &mut bool {
        match lever {
            Lever::NegotiateSuppliers => &mut self.negotiate_suppliers,
            Lever::OptimizeProduction => &mut self.optimize_production,
            Lever::EfficientLogistics => &mut self.efficient_logistics,
            Lever::JustInTime => &mut self.just_in_time,
            Lever::ImproveCollections => &mut self.improve_collections,
            Lever::ImprovePayments => &mut self.improve_payments,
            Lever::PredictiveMaintenance => &mut self.predictive_maintenance,
            Lever::MarginMix => &mut self.margin_mix,
        }
    }
}

// ============================================================================
// KPI Result
// ============================================================================

/// Financial metrics derived from one parameter snapshot.
///
/// Margins and ROI are fractions (`0.27` is 27%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiResult {
    pub sales: f64,
    pub cogs: f64,
    pub opex: f64,
    pub ebit: f64,
    pub gross_margin: f64,
    pub operating_margin: f64,
    pub inventory_value: f64,
    pub receivables_value: f64,
    pub payables_value: f64,
    pub working_capital: f64,
    /// DIO + DSO - DPO, may be negative
    pub cash_conversion_cycle: i64,
    pub net_profit: f64,
    pub total_investment: f64,
    pub roi: f64,
}
