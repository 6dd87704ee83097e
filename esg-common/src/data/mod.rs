pub mod filter;
pub mod loader;
pub mod reshape;
pub mod types;

pub use filter::{filter, filter_selection, FilteredSet};
pub use loader::{ColumnLayout, Dataset};
pub use reshape::{parse_year_label, reshape, Reshaped};
pub use types::{LoadError, LoadResult, MetricMode, RawRow, Record, Selection};
