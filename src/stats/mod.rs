//! Stats module - aggregation over the filtered frame

mod aggregate;

pub use aggregate::{CrossTab, SummaryMetrics, SurveyAggregates};
