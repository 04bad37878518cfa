//! Concrete adapters for the port traits and for chart output.

pub mod csv_adapter;
pub mod svg_chart;
