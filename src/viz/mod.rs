//! Response-to-visualization adapter
//!
//! Turns schema-less answer rows into chart-ready structures:
//! - `columns.rs`: ordered column inventory from the first row
//! - `classify.rs`: numeric/categorical column classification
//! - `coerce.rs`: value → number / label conversion
//! - `colors.rs`: random HSL colors for segments and series
//! - `plan.rs`: visualization kind → render plan
//! - `pie.rs`, `series.rs`, `table.rs`: one adapter per render plan
//! - `chart.rs`: chart data and chart options structures

pub mod chart;
pub mod classify;
pub mod coerce;
pub mod colors;
pub mod columns;
pub mod error;
pub mod pie;
pub mod plan;
pub mod series;
pub mod table;

pub use chart::{ChartData, ChartDataset, ChartKind, ChartOptions, ColorValue};
pub use classify::{classify, numeric_columns, ColumnKind};
pub use coerce::{to_label, to_number};
pub use colors::{ColorGenerator, HslColor};
pub use columns::ColumnInventory;
pub use error::{Result, VizError};
pub use pie::adapt_pie;
pub use plan::{RenderPlan, SeriesKind, VisualizationKind};
pub use series::{adapt_series, SeriesLabels};
pub use table::{adapt_table, TableView};
