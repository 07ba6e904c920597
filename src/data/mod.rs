//! Data module - schema, CSV loading, filtering, export

pub mod export;
mod filter;
mod loader;
pub mod schema;

pub use filter::FilterSet;
pub use loader::{DataSource, SurveyLoader};
pub use schema::{ChartKind, SurveySchema};
