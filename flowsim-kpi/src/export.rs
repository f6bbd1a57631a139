//! CSV export of a scenario comparison.
//!
//! Every field is double-quoted with inner quotes doubled. The document has
//! two parts separated by an empty row:
//!
//! 1. A metadata block of `label, value` rows: timestamp, inputs and the
//!    state of every lever.
//! 2. A `Metric, Base, WithFeedback, Delta` table with one row per KPI.
//!    Ratios are percentages with the delta in points (`pp`); currency and
//!    day metrics are rounded whole numbers.

use std::io::Write;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use flowsim_common::{Error, ExportConfig, Result};

use crate::format::{percent, points, rounded};
use crate::metrics::{MetricDelta, MetricKind};
use crate::scenario::ScenarioComparison;
use crate::types::Lever;

/// Column headers of the comparison table.
pub const TABLE_HEADER: [&str; 4] = ["Metric", "Base", "WithFeedback", "Delta"];

/// Writes scenario comparisons as CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    config: ExportConfig,
}

impl CsvExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// File name for an export made on `date`, e.g. `kpis_feedback_2025-03-01.csv`.
    pub fn suggested_file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.config.file_prefix, date.format("%Y-%m-%d"))
    }

    /// Metadata rows, in output order.
    pub fn metadata_rows(
        &self,
        comparison: &ScenarioComparison,
        timestamp: DateTime<Utc>,
    ) -> Vec<[String; 2]> {
        let params = &comparison.params;
        let toggles = &comparison.toggles;
        let row = |label: &str, value: String| [label.to_string(), value];

        let mut rows = vec![row(
            "Timestamp",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )];
        if let Some(label) = &self.config.scenario_label {
            rows.push(row("Scenario", label.clone()));
        }
        rows.extend([
            row("Sales", params.annual_sales.to_string()),
            row("Effective tax rate", params.effective_tax_rate.to_string()),
            row("DIO", params.inventory_days.to_string()),
            row("DSO", params.receivable_days.to_string()),
            row("DPO", params.payable_days.to_string()),
            row("Raw material %", params.raw_material_pct.to_string()),
            row("Labor %", params.labor_pct.to_string()),
            row("Logistics %", params.logistics_pct.to_string()),
            row("Opex %", params.opex_pct.to_string()),
            row("Fixed assets", params.fixed_assets.to_string()),
            row("Levers", String::new()),
            row("Feedback", toggles.feedback_enabled.to_string()),
        ]);
        rows.extend(
            Lever::ALL
                .iter()
                .map(|lever| row(lever.label(), toggles.is_on(*lever).to_string())),
        );
        rows
    }

    /// Comparison table rows (without header), one per KPI.
    pub fn table_rows(&self, comparison: &ScenarioComparison) -> Vec<[String; 4]> {
        comparison
            .deltas()
            .iter()
            .map(|delta| self.format_row(delta))
            .collect()
    }

    fn format_row(&self, delta: &MetricDelta) -> [String; 4] {
        let decimals = self.config.percent_decimals;
        let label = delta.metric.label().to_string();
        match delta.metric.kind() {
            MetricKind::Ratio => [
                label,
                percent(delta.base, decimals),
                percent(delta.tuned, decimals),
                points(delta.delta, decimals),
            ],
            MetricKind::Currency | MetricKind::Days => [
                label,
                rounded(delta.base),
                rounded(delta.tuned),
                rounded(delta.delta),
            ],
        }
    }

    /// Write the full document.
    pub fn write<W: Write>(
        &self,
        writer: W,
        comparison: &ScenarioComparison,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut csv = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(writer);

        let metadata = self.metadata_rows(comparison, timestamp);
        let table = self.table_rows(comparison);

        for row in &metadata {
            csv.write_record(row).map_err(export_error)?;
        }
        // Separator between the metadata block and the table
        csv.write_record([""]).map_err(export_error)?;
        csv.write_record(TABLE_HEADER).map_err(export_error)?;
        for row in &table {
            csv.write_record(row).map_err(export_error)?;
        }
        csv.flush()?;

        tracing::debug!(
            records = metadata.len() + 2 + table.len(),
            "Scenario exported as CSV"
        );
        Ok(())
    }

    /// Render the full document to a string.
    pub fn to_csv_string(
        &self,
        comparison: &ScenarioComparison,
        timestamp: DateTime<Utc>,
    ) -> Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf, comparison, timestamp)?;
        String::from_utf8(buf).map_err(|e| Error::Export(e.to_string()))
    }
}

fn export_error(err: csv::Error) -> Error {
    Error::Export(err.to_string())
}
