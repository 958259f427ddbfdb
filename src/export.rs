//! Dataset export with format fallback.
//!
//! Parquet is the preferred structured format. If the Parquet encoder
//! fails, the payload falls back to CSV; if CSV also fails, an empty CSV
//! payload is produced. The extension always matches the bytes actually
//! written.

use std::path::{Path, PathBuf};

use color_eyre::Result;
use polars::prelude::*;

pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
    pub label: &'static str,
}

fn write_parquet(df: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut frame = df.clone();
    let mut buf = Vec::new();
    ParquetWriter::new(&mut buf).finish(&mut frame)?;
    Ok(buf)
}

fn write_csv(df: &DataFrame) -> PolarsResult<Vec<u8>> {
    let mut frame = df.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf).finish(&mut frame)?;
    Ok(buf)
}

/// Encode the dataset for download, degrading through the fallback chain
/// rather than failing.
pub fn export_payload(df: &DataFrame) -> ExportPayload {
    match write_parquet(df) {
        Ok(bytes) => ExportPayload {
            bytes,
            extension: "parquet",
            label: "Download as Parquet",
        },
        Err(_) => match write_csv(df) {
            Ok(bytes) => ExportPayload {
                bytes,
                extension: "csv",
                label: "Download as CSV (Parquet unavailable)",
            },
            Err(_) => ExportPayload {
                bytes: Vec::new(),
                extension: "csv",
                label: "Download as CSV (export error)",
            },
        },
    }
}

/// Write the export payload as `{stem}.{extension}` inside `dir`.
pub fn export_to_dir(df: &DataFrame, dir: &Path, stem: &str) -> Result<PathBuf> {
    let payload = export_payload(df);
    let path = dir.join(format!("{stem}.{}", payload.extension));
    std::fs::write(&path, &payload.bytes)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parquet_preferred() {
        let df = df!("a" => [1.0f64, 2.0], "b" => ["x", "y"]).unwrap();
        let payload = export_payload(&df);
        assert_eq!(payload.extension, "parquet");
        assert!(!payload.bytes.is_empty());
    }

    #[test]
    fn test_export_writes_matching_extension() {
        let df = df!("a" => [1.0f64, 2.0]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_dir(&df, dir.path(), "cleaned_dataset").unwrap();
        assert_eq!(path.extension().unwrap(), "parquet");
        assert!(path.exists());
    }
}
