//! Impact report generation.

use serde::{Deserialize, Serialize};

use crate::format::{money, percent, signed_grouped, signed_money, signed_points};
use crate::metrics::{Metric, MetricDelta, MetricKind};
use crate::scenario::ScenarioComparison;

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────\n";

/// Decimals for percentages in the report.
const PERCENT_DECIMALS: usize = 1;

/// Impact report for one scenario comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Report title
    pub title: String,
    /// Gross margin, operating margin and EBIT
    pub margins: ReportSection,
    /// Cash cycle, working capital and inventory
    pub liquidity: ReportSection,
    /// Net profit, invested capital and ROI
    pub returns: ReportSection,
    /// One sentence per section
    pub narrative: ImpactNarrative,
    /// Text report (formatted)
    pub text_report: String,
}

/// A titled group of compared metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<MetricDelta>,
}

/// Plain-language summary of the change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactNarrative {
    pub margins: String,
    pub liquidity: String,
    pub returns: String,
}

impl ReportSection {
    fn new(title: &str, metrics: &[Metric], comparison: &ScenarioComparison) -> Self {
        Self {
            title: title.to_string(),
            rows: metrics.iter().map(|m| comparison.delta(*m)).collect(),
        }
    }
}

impl ImpactReport {
    /// Generate a report from a scenario comparison
    pub fn generate(comparison: &ScenarioComparison) -> Self {
        let margins = ReportSection::new(
            "Margins",
            &[Metric::GrossMargin, Metric::OperatingMargin, Metric::Ebit],
            comparison,
        );
        let liquidity = ReportSection::new(
            "Liquidity",
            &[
                Metric::CashConversionCycle,
                Metric::WorkingCapital,
                Metric::InventoryValue,
            ],
            comparison,
        );
        let returns = ReportSection::new(
            "ROI",
            &[Metric::NetProfit, Metric::TotalInvestment, Metric::Roi],
            comparison,
        );
        let narrative = Self::narrate(comparison);

        let title = if comparison.toggles.feedback_enabled {
            "Feedback impact report".to_string()
        } else {
            "Base scenario report".to_string()
        };

        let text_report = Self::format_text_report(
            &title,
            comparison,
            &[&margins, &liquidity, &returns],
            &narrative,
        );

        Self {
            title,
            margins,
            liquidity,
            returns,
            narrative,
            text_report,
        }
    }

    fn narrate(comparison: &ScenarioComparison) -> ImpactNarrative {
        let operating = comparison.delta(Metric::OperatingMargin);
        let ebit = comparison.delta(Metric::Ebit);
        let roi = comparison.delta(Metric::Roi);

        ImpactNarrative {
            margins: format!(
                "Cost levers move operating margin by {} and add {} of EBIT.",
                signed_points(operating.delta, PERCENT_DECIMALS),
                money(ebit.delta),
            ),
            liquidity: format!(
                "The cash conversion cycle goes to {} days and {} of working capital is released.",
                comparison.tuned.cash_conversion_cycle,
                money(comparison.working_capital_released()),
            ),
            returns: format!(
                "ROI moves from {} to {}.",
                percent(roi.base, PERCENT_DECIMALS),
                percent(roi.tuned, PERCENT_DECIMALS),
            ),
        }
    }

    /// Format as text report
    fn format_text_report(
        title: &str,
        comparison: &ScenarioComparison,
        sections: &[&ReportSection],
        narrative: &ImpactNarrative,
    ) -> String {
        let mut report = String::new();

        report.push_str(HEAVY_RULE);
        report.push_str(&format!("{:^63}\n", title));
        report.push_str(HEAVY_RULE);
        report.push('\n');

        // Active levers
        let levers = comparison.toggles.active_levers();
        if levers.is_empty() {
            report.push_str("Levers: none\n\n");
        } else {
            let names: Vec<&str> = levers.iter().map(|l| l.label()).collect();
            report.push_str(&format!("Levers: {}\n\n", names.join(", ")));
        }

        for section in sections {
            report.push_str(&format!("{}\n", section.title));
            report.push_str(LIGHT_RULE);
            for row in &section.rows {
                report.push_str(&format_row(row));
            }
            report.push('\n');
        }

        report.push_str("Summary\n");
        report.push_str(LIGHT_RULE);
        for line in [&narrative.margins, &narrative.liquidity, &narrative.returns] {
            report.push_str(&format!("  {}\n", line));
        }

        report.push('\n');
        report.push_str(HEAVY_RULE);

        report
    }
}

fn format_row(row: &MetricDelta) -> String {
    let (base, tuned, delta) = match row.metric.kind() {
        MetricKind::Ratio => (
            percent(row.base, PERCENT_DECIMALS),
            percent(row.tuned, PERCENT_DECIMALS),
            signed_points(row.delta, PERCENT_DECIMALS),
        ),
        MetricKind::Currency => (money(row.base), money(row.tuned), signed_money(row.delta)),
        MetricKind::Days => (
            format!("{:.0}", row.base),
            format!("{:.0}", row.tuned),
            signed_grouped(row.delta),
        ),
    };
    format!(
        "  {:<18}{:>14} → {:>14}  ({})\n",
        row.metric.label(),
        base,
        tuned,
        delta
    )
}
