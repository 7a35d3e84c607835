//! Export of analysis results as CSV tables.

pub mod tables;

// Re-export commonly used types
pub use tables::{
    aggregate_table_name, fixation_table_name, read_aggregate_table, read_fixation_table,
    write_aggregate_table, write_fixation_table, AggregateRow, ExportError, FixationRow,
};
