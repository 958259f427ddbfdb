//! Initial dataset loading (the upload collaborator).

use std::fs::File;
use std::path::Path;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;

/// Load a dataset from disk. Format is chosen by extension: Parquet for
/// `.parquet`, CSV otherwise (tab delimiter inferred for `.tsv`).
pub fn load_dataset(path: &Path, delimiter: Option<u8>, has_header: bool) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "parquet" => {
            let file = File::open(path)?;
            Ok(ParquetReader::new(file).finish()?)
        }
        "csv" | "tsv" | "txt" | "" => {
            let delimiter = delimiter.unwrap_or(if ext == "tsv" { b'\t' } else { b',' });
            let mut read_options = CsvReadOptions::default();
            read_options.has_header = has_header;
            read_options =
                read_options.map_parse_options(|opts| opts.with_separator(delimiter));
            let df = read_options
                .try_into_reader_with_file_path(Some(path.into()))?
                .finish()?;
            Ok(df)
        }
        other => Err(eyre!("Unsupported file format: .{other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "a,b\n1,x\n2,y").unwrap();
        let df = load_dataset(&path, None, true).unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_load_parquet_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        let mut df = df!("a" => [1i64, 2, 3]).unwrap();
        let file = File::create(&path).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
        let loaded = load_dataset(&path, None, true).unwrap();
        assert_eq!(loaded.shape(), (3, 1));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(load_dataset(Path::new("data.xyz"), None, true).is_err());
    }
}
