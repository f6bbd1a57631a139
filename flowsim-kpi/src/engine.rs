//! KPI engine.
//!
//! Turns one [`BusinessParameters`] snapshot into a [`KpiResult`]. The
//! computation is pure floating-point arithmetic with no rounding.
//!
//! | Metric | Formula |
//! |--------|---------|
//! | COGS | sales × (raw + labor + logistics) / 100 |
//! | Opex | sales × opex / 100 |
//! | EBIT | sales − COGS − opex |
//! | Inventory | COGS / 365 × DIO |
//! | Receivables | sales / 365 × DSO |
//! | Payables | COGS / 365 × DPO |
//! | Working capital | inventory + receivables − payables |
//! | CCC | DIO + DSO − DPO |
//! | Net profit | EBIT × (1 − tax) |
//! | Total investment | max(0, fixed assets + working capital) |
//! | ROI | net profit / total investment, 0 when nothing is invested |
//!
//! With zero sales, gross and operating margin are reported as `0` rather
//! than NaN. Callers who need zero sales rejected validate the parameters
//! first, as [`crate::scenario::Simulator`] does.

use crate::types::{BusinessParameters, KpiResult};

/// Days used to turn annual flows into daily rates.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Compute every KPI for one parameter snapshot.
pub fn compute(params: &BusinessParameters) -> KpiResult {
    let sales = params.annual_sales;

    let cogs = sales * params.cogs_pct() / 100.0;
    let gross_margin = ratio(sales - cogs, sales);

    let opex = sales * (params.opex_pct / 100.0);
    let ebit = sales - cogs - opex;
    let operating_margin = ratio(ebit, sales);

    let cogs_per_day = cogs / DAYS_PER_YEAR;
    let sales_per_day = sales / DAYS_PER_YEAR;
    let inventory_value = cogs_per_day * f64::from(params.inventory_days);
    let receivables_value = sales_per_day * f64::from(params.receivable_days);
    let payables_value = cogs_per_day * f64::from(params.payable_days);
    let working_capital = inventory_value + receivables_value - payables_value;
    let cash_conversion_cycle = i64::from(params.inventory_days)
        + i64::from(params.receivable_days)
        - i64::from(params.payable_days);

    let net_profit = ebit * (1.0 - params.effective_tax_rate);
    let total_investment = (params.fixed_assets + working_capital).max(0.0);
    let roi = if total_investment > 0.0 {
        net_profit / total_investment
    } else {
        0.0
    };

    KpiResult {
        sales,
        cogs,
        opex,
        ebit,
        gross_margin,
        operating_margin,
        inventory_value,
        receivables_value,
        payables_value,
        working_capital,
        cash_conversion_cycle,
        net_profit,
        total_investment,
        roi,
    }
}

/// Sales-based ratio, defined as 0 when sales are zero.
fn ratio(numerator: f64, sales: f64) -> f64 {
    if sales == 0.0 {
        0.0
    } else {
        numerator / sales
    }
}
