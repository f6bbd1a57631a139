//! Named KPI metrics and base/tuned deltas.

use serde::{Deserialize, Serialize};

use crate::types::KpiResult;

/// How a metric is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Fraction of a whole; shown as a percentage, compared in points
    Ratio,
    /// Currency amount
    Currency,
    /// Whole days
    Days,
}

/// One field of [`KpiResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Sales,
    Cogs,
    Opex,
    Ebit,
    GrossMargin,
    OperatingMargin,
    InventoryValue,
    ReceivablesValue,
    PayablesValue,
    WorkingCapital,
    CashConversionCycle,
    NetProfit,
    TotalInvestment,
    Roi,
}

impl Metric {
    /// Every metric, in report order.
    pub const ALL: [Metric; 14] = [
        Metric::Sales,
        Metric::Cogs,
        Metric::Opex,
        Metric::GrossMargin,
        Metric::OperatingMargin,
        Metric::Ebit,
        Metric::CashConversionCycle,
        Metric::WorkingCapital,
        Metric::InventoryValue,
        Metric::ReceivablesValue,
        Metric::PayablesValue,
        Metric::NetProfit,
        Metric::TotalInvestment,
        Metric::Roi,
    ];

    pub fn kind(&self) -> MetricKind {
        match self {
            Self::GrossMargin | Self::OperatingMargin | Self::Roi => MetricKind::Ratio,
            Self::CashConversionCycle => MetricKind::Days,
            _ => MetricKind::Currency,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::Cogs => "COGS",
            Self::Opex => "Opex",
            Self::Ebit => "EBIT",
            Self::GrossMargin => "Gross margin",
            Self::OperatingMargin => "Operating margin",
            Self::InventoryValue => "Inventory",
            Self::ReceivablesValue => "Receivables",
            Self::PayablesValue => "Payables",
            Self::WorkingCapital => "Working capital",
            Self::CashConversionCycle => "CCC (days)",
            Self::NetProfit => "Net profit",
            Self::TotalInvestment => "Total investment",
            Self::Roi => "ROI",
        }
    }

    /// Read this metric from a result.
    pub fn value(&self, kpi: &KpiResult) -> f64 {
        match self {
            Self::Sales => kpi.sales,
            Self::Cogs => kpi.cogs,
            Self::Opex => kpi.opex,
            Self::Ebit => kpi.ebit,
            Self::GrossMargin => kpi.gross_margin,
            Self::OperatingMargin => kpi.operating_margin,
            Self::InventoryValue => kpi.inventory_value,
            Self::ReceivablesValue => kpi.receivables_value,
            Self::PayablesValue => kpi.payables_value,
            Self::WorkingCapital => kpi.working_capital,
            Self::CashConversionCycle => kpi.cash_conversion_cycle as f64,
            Self::NetProfit => kpi.net_profit,
            Self::TotalInvestment => kpi.total_investment,
            Self::Roi => kpi.roi,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A metric compared between the base and tuned scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: Metric,
    pub base: f64,
    pub tuned: f64,
    /// tuned - base
    pub delta: f64,
}

impl MetricDelta {
    pub fn between(metric: Metric, base: &KpiResult, tuned: &KpiResult) -> Self {
        let base = metric.value(base);
        let tuned = metric.value(tuned);
        Self {
            metric,
            base,
            tuned,
            delta: tuned - base,
        }
    }

    /// Delta in percentage points for ratio metrics, plain delta otherwise.
    pub fn delta_points(&self) -> f64 {
        match self.metric.kind() {
            MetricKind::Ratio => self.delta * 100.0,
            _ => self.delta,
        }
    }

    /// Relative change against the base value, `None` when the base is zero.
    pub fn relative_change(&self) -> Option<f64> {
        if self.base == 0.0 {
            None
        } else {
            Some(self.delta / self.base.abs())
        }
    }
}

/// Deltas for every metric, in report order.
pub fn all_deltas(base: &KpiResult, tuned: &KpiResult) -> Vec<MetricDelta> {
    Metric::ALL
        .iter()
        .map(|metric| MetricDelta::between(*metric, base, tuned))
        .collect()
}
