
use anyhow::Context;
use std::io::{BufWriter, Write};
use std::fs::File;
use std::path::Path;

/// Saves a serializable struct as pretty JSON, gzip compressed if the path ends with .gz
/// # Arguments
/// * `data` - the data in memory
/// * `out_filename` - user provided path to write to
/// # Errors
/// * if opening or writing to the file throw errors
/// * if JSON serialization throws errors
pub fn save_json<T: serde::Serialize>(data: &T, out_filename: &Path) -> anyhow::Result<()> {
    let file = File::create(out_filename)
        .with_context(|| format!("Error while creating {out_filename:?}:"))?;
    let file: Box<dyn Write> = if out_filename.extension().unwrap_or_default() == "gz" {
        Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::best()))
    } else {
        Box::new(file)
    };
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .with_context(|| format!("Error while serializing {out_filename:?}:"))?;
    writer.flush()
        .with_context(|| format!("Error while flushing output to {out_filename:?}:"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use crate::data_types::aggregate_result::AggregateResult;

    fn example_result() -> AggregateResult {
        AggregateResult {
            total_lines: 12,
            record_lines: 4,
            warnings: 2,
            errors: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_save_plain() {
        let dir = tempfile::tempdir().unwrap();
        let out_fn = dir.path().join("summary.json");
        save_json(&example_result(), &out_fn).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out_fn).unwrap()).unwrap();
        assert_eq!(value["record_lines"], 4);
        assert_eq!(value["errors"], 1);
        assert_eq!(value["valid"], false);
        assert!(value["fatal_error"].is_null());
    }

    #[test]
    fn test_save_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let out_fn = dir.path().join("summary.json.gz");
        save_json(&example_result(), &out_fn).unwrap();

        let mut text = String::new();
        flate2::read::MultiGzDecoder::new(File::open(&out_fn).unwrap())
            .read_to_string(&mut text).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_lines"], 12);
    }

    #[test]
    fn test_bad_path() {
        let result = save_json(&example_result(), Path::new("/missing/folder/summary.json"));
        assert!(result.is_err());
    }
}
