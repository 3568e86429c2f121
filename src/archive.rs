//! Archive extraction
//!
//! Queries spanning several contributing series (e.g. one file per generation unit
//! group) come back as a ZIP archive. This module yields the bytes of every embedded
//! market document, lazily and in name order, skipping directories and auxiliary files.
//!
//! # Example
//!
//! ```rust
//! use std::io::Write;
//! use entsoe_data::archive::ArchiveDocuments;
//!
//! let mut cursor = std::io::Cursor::new(Vec::new());
//! {
//!     let mut writer = zip::ZipWriter::new(&mut cursor);
//!     let options = zip::write::SimpleFileOptions::default();
//!     writer.start_file("b.xml", options).unwrap();
//!     writer.write_all(b"<second/>").unwrap();
//!     writer.start_file("readme.txt", options).unwrap();
//!     writer.write_all(b"ignored").unwrap();
//!     writer.start_file("a.XML", options).unwrap();
//!     writer.write_all(b"<first/>").unwrap();
//!     writer.finish().unwrap();
//! }
//! let bytes = cursor.into_inner();
//!
//! let docs: Vec<Vec<u8>> = ArchiveDocuments::open(&bytes, ".xml")
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(docs, vec![b"<first/>".to_vec(), b"<second/>".to_vec()]);
//! ```

use std::io::{Cursor, Read};

use tracing::debug;
use zip::ZipArchive;

use crate::error::{EntsoeError, ParseError};

/// Lazy iterator over the document payloads of one archive
///
/// Entries are decompressed one at a time as the iterator advances; a failing
/// entry yields `Err(MalformedDocument)` without affecting earlier items.
pub struct ArchiveDocuments<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    entries: std::vec::IntoIter<String>,
}

impl<'a> ArchiveDocuments<'a> {
    /// Open an archive and select its document entries
    ///
    /// # Arguments
    ///
    /// * `bytes` - Complete archive body
    /// * `extension` - Document file extension, matched case-insensitively (e.g. ".xml")
    ///
    /// # Returns
    ///
    /// * `Ok(ArchiveDocuments)` - At least one matching entry
    /// * `Err(EntsoeError::MalformedDocument)` - Corrupt archive container
    /// * `Err(EntsoeError::NoDocumentsFound)` - Nothing left after filtering
    pub fn open(bytes: &'a [u8], extension: &str) -> Result<Self, EntsoeError> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        let extension = extension.to_ascii_lowercase();

        let mut entries: Vec<String> = Vec::new();
        for name in archive.file_names() {
            if name.ends_with('/') {
                debug!(entry = name, "skipping archive directory entry");
            } else if !name.to_ascii_lowercase().ends_with(&extension) {
                debug!(entry = name, "skipping non-document archive entry");
            } else {
                entries.push(name.to_string());
            }
        }

        if entries.is_empty() {
            return Err(EntsoeError::NoDocumentsFound);
        }

        // Central directory order is arbitrary; merge order must not be
        entries.sort();
        debug!(documents = entries.len(), total = archive.len(), "opened archive");

        Ok(Self {
            archive,
            entries: entries.into_iter(),
        })
    }

    /// Names of the documents not yet yielded
    pub fn remaining_names(&self) -> &[String] {
        self.entries.as_slice()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, EntsoeError> {
        let mut file = self.archive.by_name(name)?;
        // Declared entry sizes come from the archive itself and are not trusted
        let mut bytes = Vec::new();

        file.read_to_end(&mut bytes)
            .map_err(|e| ParseError::Archive(format!("entry '{}': {}", name, e)))?;

        Ok(bytes)
    }
}

impl Iterator for ArchiveDocuments<'_> {
    type Item = Result<Vec<u8>, EntsoeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.entries.next()?;
        Some(self.read_entry(&name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for ArchiveDocuments<'_> {}
