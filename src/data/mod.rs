//! Data loading: table reading, deterministic splitting and matrix caching

pub mod loader;
pub mod matrix;
pub mod split;

pub use loader::{
    load_cached, load_data, matrix_to_frame, split_features_labels, write_parquet, DataLoader,
    LoadedData, LABEL_COLUMN,
};
pub use matrix::FeatureMatrix;
pub use split::{take_rows, train_test_split, SplitIndices};
