//! OPC package (zip container) I/O

use super::DocxError;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One package entry, kept in archive order
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// All entries of a DOCX package, held in memory
#[derive(Debug, Clone)]
pub(crate) struct Package {
    entries: Vec<Entry>,
}

impl Package {
    /// Read every entry of a zip archive, preserving order
    pub(crate) fn read(bytes: &[u8]) -> Result<Self, DocxError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocxError::Package(format!("not a zip archive: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| DocxError::Package(format!("unreadable entry #{}: {}", index, e)))?;

            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| DocxError::Package(format!("failed to read '{}': {}", name, e)))?;

            entries.push(Entry {
                compression: file.compression(),
                is_dir: file.is_dir(),
                name,
                data,
            });
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.data.as_slice())
    }

    /// Write the package back, substituting the given entries' contents
    pub(crate) fn write(&self, replacements: &HashMap<String, Vec<u8>>) -> Result<Vec<u8>, DocxError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);

            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)
                    .map_err(|e| write_error(&entry.name, e))?;
                continue;
            }

            let data = replacements
                .get(&entry.name)
                .map(Vec::as_slice)
                .unwrap_or(&entry.data);

            zip.start_file(entry.name.as_str(), options)
                .map_err(|e| write_error(&entry.name, e))?;
            zip.write_all(data)
                .map_err(|e| write_error(&entry.name, e))?;
        }

        let cursor = zip
            .finish()
            .map_err(|e| DocxError::Package(format!("failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

fn write_error(name: &str, err: impl std::fmt::Display) -> DocxError {
    DocxError::Package(format!("failed to write '{}': {}", name, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_preserves_entries() {
        let bytes = archive(&[("a.xml", "<a/>"), ("b/c.xml", "<c/>")]);
        let package = Package::read(&bytes).unwrap();
        assert_eq!(package.get("a.xml"), Some(b"<a/>".as_slice()));
        assert_eq!(package.get("b/c.xml"), Some(b"<c/>".as_slice()));
        assert_eq!(package.get("missing"), None);
    }

    #[test]
    fn test_write_replaces_only_given_entries() {
        let bytes = archive(&[("a.xml", "<a/>"), ("b.xml", "<b/>")]);
        let package = Package::read(&bytes).unwrap();

        let mut replacements = HashMap::new();
        replacements.insert("b.xml".to_string(), b"<changed/>".to_vec());
        let written = package.write(&replacements).unwrap();

        let reread = Package::read(&written).unwrap();
        assert_eq!(reread.get("a.xml"), Some(b"<a/>".as_slice()));
        assert_eq!(reread.get("b.xml"), Some(b"<changed/>".as_slice()));
    }

    #[test]
    fn test_read_rejects_non_zip() {
        let err = Package::read(b"definitely not a zip").unwrap_err();
        assert!(matches!(err, DocxError::Package(_)));
    }
}
