//! Dataset loading: delimited source, column roles, feature matrix, split and scaling.

pub mod dataset;
pub mod scaler;
pub mod schema;
pub mod source;
pub mod split;

pub use dataset::Dataset;
pub use scaler::StandardScaler;
pub use schema::{ColumnRole, DatasetSchema};
pub use source::{CsvSource, DataBatch, DataSourceInfo};
pub use split::{Split, train_test_split};
