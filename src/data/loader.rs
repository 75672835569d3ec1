//! Table loading, splitting and caching

use super::matrix::FeatureMatrix;
use super::split::{take_rows, train_test_split};
use crate::config::SPLIT_SEED;
use crate::error::{Result, SigboostError};
use crate::layout::{ensure_parent, ArtifactLayout};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Name of the label column; it must be the rightmost column of the table
pub const LABEL_COLUMN: &str = "labels";

/// Output of the data loading step
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub train: FeatureMatrix,
    pub test: FeatureMatrix,
    /// Raw labels of the held-out rows, in test-matrix order
    pub y_test: Array1<f64>,
}

/// Table reader for the supported on-disk formats
#[derive(Debug, Default, Clone)]
pub struct DataLoader {
    infer_schema_length: Option<usize>,
}

impl DataLoader {
    pub fn new() -> Self {
        Self { infer_schema_length: Some(1000) }
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
            .map_err(|e| SigboostError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path)?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| SigboostError::DataError(format!("{}: {}", path.display(), e)))
    }

    /// Detect the format from the extension; CSV is the fallback
    pub fn load_table(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(SigboostError::DataError(format!(
                "data file does not exist: {}",
                path.display()
            )));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "parquet" | "pq" => self.load_parquet(path),
            _ => self.load_csv(path),
        }
    }
}

/// Split a table into a row-major feature matrix, the label vector (rightmost
/// column) and the feature names (all other headers, in order).
pub fn split_features_labels(df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>, Vec<String>)> {
    let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    let Some((label_name, feature_names)) = columns.split_last() else {
        return Err(SigboostError::DataError("table has no columns".to_string()));
    };
    if label_name != LABEL_COLUMN {
        return Err(SigboostError::FeatureNotFound(format!(
            "expected rightmost column '{}', found '{}'",
            LABEL_COLUMN, label_name
        )));
    }
    if feature_names.is_empty() {
        return Err(SigboostError::DataError("table has no feature columns".to_string()));
    }

    let y = Array1::from_vec(column_as_f64(df, label_name)?);

    let col_data: Vec<Vec<f64>> = feature_names
        .iter()
        .map(|name| column_as_f64(df, name))
        .collect::<Result<_>>()?;
    let n_rows = df.height();
    let x = Array2::from_shape_fn((n_rows, feature_names.len()), |(r, c)| col_data[c][r]);

    Ok((x, y, feature_names.to_vec()))
}

/// Extract a numeric column as `f64`; nulls become `NaN` (missing)
fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)
        .map_err(|_| SigboostError::FeatureNotFound(name.to_string()))?
        .as_materialized_series();

    let dtype = series.dtype();
    if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)) {
        return Err(SigboostError::DataError(format!(
            "column '{}' has non-numeric type {}",
            name, dtype
        )));
    }

    let cast = series.cast(&DataType::Float64)?;
    let values = cast
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Rebuild a table from a feature matrix, appending the label column
pub fn matrix_to_frame(matrix: &FeatureMatrix) -> Result<DataFrame> {
    let mut columns: Vec<Column> = matrix
        .feature_names()
        .iter()
        .enumerate()
        .map(|(j, name)| Column::new(name.as_str().into(), matrix.features().column(j).to_vec()))
        .collect();
    columns.push(Column::new(LABEL_COLUMN.into(), matrix.labels().to_vec()));
    Ok(DataFrame::new(columns)?)
}

/// Write a table as Parquet, creating parent directories
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path)?;
    ParquetWriter::new(file).finish(df)?;
    Ok(())
}

/// Load the table at `path`, split it deterministically and cache the result.
///
/// Writes both binary matrices under `dmatrices/<channel>/` and the held-out
/// table under `test/<channel>/`.
pub fn load_data(
    path: &Path,
    mode: &str,
    channel: &str,
    layout: &ArtifactLayout,
    test_size: f64,
) -> Result<LoadedData> {
    info!(path = %path.display(), test_size, "loading dataset");
    let start = Instant::now();

    let df = DataLoader::new().load_table(path)?;
    let (x, y, feature_names) = split_features_labels(&df)?;
    debug!(rows = x.nrows(), features = x.ncols(), elapsed = ?start.elapsed(), "table parsed");

    let split = train_test_split(x.nrows(), test_size, SPLIT_SEED)?;
    let (x_train, y_train) = take_rows(&x, &y, &split.train_indices);
    let (x_test, y_test) = take_rows(&x, &y, &split.test_indices);

    let train = FeatureMatrix::new(x_train, y_train, feature_names.clone())?;
    let test = FeatureMatrix::new(x_test, y_test.clone(), feature_names)?;

    train.save_binary(&layout.train_matrix_path(mode, channel))?;
    test.save_binary(&layout.test_matrix_path(mode, channel))?;

    let mut test_df = matrix_to_frame(&test)?;
    write_parquet(&mut test_df, &layout.test_table_path(mode, channel))?;

    info!(
        train_rows = train.n_rows(),
        test_rows = test.n_rows(),
        features = train.n_features(),
        "dataset split and cached"
    );

    Ok(LoadedData { train, test, y_test })
}

/// Reload the matrices cached by a previous [`load_data`] call
pub fn load_cached(mode: &str, channel: &str, layout: &ArtifactLayout) -> Result<LoadedData> {
    let train = FeatureMatrix::load_binary(&layout.train_matrix_path(mode, channel))?;
    let test = FeatureMatrix::load_binary(&layout.test_matrix_path(mode, channel))?;
    if train.feature_names() != test.feature_names() {
        return Err(SigboostError::DataError(
            "cached train and test matrices have different features".to_string(),
        ));
    }
    let y_test = test.labels().clone();
    info!(train_rows = train.n_rows(), test_rows = test.n_rows(), "loaded cached matrices");
    Ok(LoadedData { train, test, y_test })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_df() -> DataFrame {
        df!(
            "pt" => &[1.0, 2.0, 3.0, 4.0],
            "nhits" => &[3i64, 1, 4, 1],
            "labels" => &[0i64, 1, 0, 1]
        )
        .unwrap()
    }

    #[test]
    fn test_split_features_labels() {
        let (x, y, names) = split_features_labels(&small_df()).unwrap();
        assert_eq!(names, vec!["pt".to_string(), "nhits".to_string()]);
        assert_eq!(x.dim(), (4, 2));
        assert_eq!(x[[2, 1]], 4.0);
        assert_eq!(y.to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_label_must_be_rightmost() {
        let df = df!(
            "labels" => &[0.0, 1.0],
            "pt" => &[1.0, 2.0]
        )
        .unwrap();
        let err = split_features_labels(&df);
        assert!(matches!(err, Err(SigboostError::FeatureNotFound(_))));
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let df = df!(
            "name" => &["a", "b"],
            "labels" => &[0.0, 1.0]
        )
        .unwrap();
        assert!(matches!(split_features_labels(&df), Err(SigboostError::DataError(_))));
    }

    #[test]
    fn test_nulls_become_nan() {
        let df = df!(
            "pt" => &[Some(1.0), None],
            "labels" => &[0.0, 1.0]
        )
        .unwrap();
        let (x, _, _) = split_features_labels(&df).unwrap();
        assert!(x[[1, 0]].is_nan());
    }

    #[test]
    fn test_missing_file() {
        let err = DataLoader::new().load_table(Path::new("/nonexistent/data.csv"));
        assert!(matches!(err, Err(SigboostError::DataError(_))));
    }

    #[test]
    fn test_matrix_to_frame_appends_labels() {
        let (x, y, names) = split_features_labels(&small_df()).unwrap();
        let m = FeatureMatrix::new(x, y, names).unwrap();
        let df = matrix_to_frame(&m).unwrap();
        let cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(cols, vec!["pt", "nhits", "labels"]);
        assert_eq!(df.height(), 4);
    }
}
