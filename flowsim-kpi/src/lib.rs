//! Flowsim KPI Library
//!
//! KPI engine and feedback-lever simulation for a manufacturing business.
//! A base scenario is computed from business inputs, a tuned scenario from
//! the same inputs after the enabled improvement levers, and the two are
//! compared metric by metric.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           flowsim-kpi                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐  │
//! │  │  Levers      │──►│  Engine      │──►│  Scenario comparison │  │
//! │  │  (table)     │   │  (compute)   │   │  (deltas)            │  │
//! │  └──────────────┘   └──────────────┘   └──────────┬───────────┘  │
//! │                                         ┌─────────┴─────────┐    │
//! │                                         │ CSV export/report │    │
//! │                                         └───────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - **CCC**: days inventory + days receivable - days payable
//! - **Working capital**: inventory + receivables - payables
//! - **ROI**: net profit over fixed assets plus working capital

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod engine;
pub mod export;
pub mod format;
pub mod levers;
pub mod metrics;
pub mod report;
pub mod scenario;
pub mod types;

pub use engine::compute;
pub use export::CsvExporter;
pub use levers::{apply_levers, LeverTransformer};
pub use metrics::{Metric, MetricDelta, MetricKind};
pub use report::ImpactReport;
pub use scenario::{ScenarioComparison, Simulator};
pub use types::{BusinessParameters, KpiResult, Lever, LeverToggles, TAX_RATE_PRESETS};
