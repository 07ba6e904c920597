//! Charts module - chart rendering

mod plotter;

pub use plotter::ChartPlotter;
