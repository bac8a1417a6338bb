use crate::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

/// Reads a JSON file, transparently decompressing `.gz` files.
pub fn read_serialized<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    if is_gzip(path) {
        Ok(serde_json::from_reader(GzDecoder::new(reader))?)
    } else {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Writes `value` as pretty JSON, gzip-compressed when the path ends in
/// `.gz`. Missing parent directories are created.
pub fn write_serialized<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(path)?);
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer_pretty(&mut encoder, value)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = writer;
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    Ok(())
}

/// Hex SHA-1 of the file's raw bytes.
pub fn file_digest(path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn plain_and_gzip_files_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut tally = BTreeMap::new();
        tally.insert("A".to_string(), 3.5);
        tally.insert("B".to_string(), 1.0);

        for name in ["tally.json", "nested/tally.json.gz"] {
            let path = dir.path().join(name);
            write_serialized(&path, &tally).unwrap();
            let back: BTreeMap<String, f64> = read_serialized(&path).unwrap();
            assert_eq!(back, tally);
        }
    }

    #[test]
    fn digest_is_stable_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(file_digest(&path).unwrap(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_serialized::<BTreeMap<String, f64>>(Path::new("/nonexistent/x.json")).unwrap_err();
        assert!(matches!(err, crate::error::ElectionError::Io(_)));
    }
}
