//! ZIP container handling shared by the file backends.
//!
//! Both input formats are ZIP archives of XML parts. The container
//! enforces resource limits while reading: entry count at open, per-part
//! size and cumulative size per read. Format-level structure (package
//! markers, required parts) is the backends' business.

use std::io::{Read, Seek};
use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error_codes;

/// Resource limits applied while reading an archive.
#[derive(Debug, Clone, Copy)]
pub struct ContainerLimits {
    pub max_entries: usize,
    pub max_part_uncompressed_bytes: u64,
    pub max_total_uncompressed_bytes: u64,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_part_uncompressed_bytes: 100 * 1024 * 1024,
            max_total_uncompressed_bytes: 500 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a ZIP container")]
    NotZip,
    #[error("archive has too many entries: {entries} (limit: {limit})")]
    TooManyParts { entries: usize, limit: usize },
    #[error("part '{name}' is too large: {size} bytes (limit: {limit} bytes)")]
    PartTooLarge { name: String, size: u64, limit: u64 },
    #[error("total uncompressed size would exceed {limit} bytes")]
    TotalTooLarge { limit: u64 },
    #[error("part not found in archive: {name}")]
    PartMissing { name: String },
    #[error("failed to read part '{name}': {reason}")]
    PartRead { name: String, reason: String },
}

impl ContainerError {
    pub fn code(&self) -> &'static str {
        match self {
            ContainerError::Io(_) => error_codes::CONTAINER_IO,
            ContainerError::NotZip => error_codes::CONTAINER_NOT_ZIP,
            ContainerError::TooManyParts { .. } => error_codes::CONTAINER_TOO_MANY_PARTS,
            ContainerError::PartTooLarge { .. } => error_codes::CONTAINER_PART_TOO_LARGE,
            ContainerError::TotalTooLarge { .. } => error_codes::CONTAINER_TOTAL_TOO_LARGE,
            ContainerError::PartMissing { .. } => error_codes::CONTAINER_PART_MISSING,
            ContainerError::PartRead { .. } => error_codes::CONTAINER_ZIP,
        }
    }
}

pub(crate) trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// An open ZIP archive with cumulative read accounting.
///
/// The lifetime covers borrowed readers such as `Cursor<&[u8]>`, so the
/// loader can probe both formats over one buffer.
pub struct ArchiveContainer<'a> {
    archive: ZipArchive<Box<dyn ReadSeek + 'a>>,
    limits: ContainerLimits,
    total_read: u64,
}

impl std::fmt::Debug for ArchiveContainer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveContainer")
            .field("limits", &self.limits)
            .field("total_read", &self.total_read)
            .finish_non_exhaustive()
    }
}

impl<'a> ArchiveContainer<'a> {
    pub fn open_from_reader<R: Read + Seek + 'a>(
        reader: R,
    ) -> Result<ArchiveContainer<'a>, ContainerError> {
        Self::open_from_reader_with_limits(reader, ContainerLimits::default())
    }

    pub fn open_from_reader_with_limits<R: Read + Seek + 'a>(
        reader: R,
        limits: ContainerLimits,
    ) -> Result<ArchiveContainer<'a>, ContainerError> {
        let reader: Box<dyn ReadSeek + 'a> = Box::new(reader);
        let archive = ZipArchive::new(reader).map_err(|err| match err {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => {
                ContainerError::NotZip
            }
            ZipError::Io(e) => ContainerError::Io(e),
            other => ContainerError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        })?;

        if archive.len() > limits.max_entries {
            return Err(ContainerError::TooManyParts {
                entries: archive.len(),
                limit: limits.max_entries,
            });
        }

        Ok(ArchiveContainer {
            archive,
            limits,
            total_read: 0,
        })
    }

    /// Reads one part in full, charging it against the limits.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, ContainerError> {
        let size = {
            let part = self.archive.by_name(name).map_err(|e| match e {
                ZipError::FileNotFound => ContainerError::PartMissing {
                    name: name.to_string(),
                },
                other => ContainerError::PartRead {
                    name: name.to_string(),
                    reason: other.to_string(),
                },
            })?;
            part.size()
        };

        if size > self.limits.max_part_uncompressed_bytes {
            return Err(ContainerError::PartTooLarge {
                name: name.to_string(),
                size,
                limit: self.limits.max_part_uncompressed_bytes,
            });
        }
        let new_total = self.total_read.saturating_add(size);
        if new_total > self.limits.max_total_uncompressed_bytes {
            return Err(ContainerError::TotalTooLarge {
                limit: self.limits.max_total_uncompressed_bytes,
            });
        }

        let mut part = self
            .archive
            .by_name(name)
            .map_err(|e| ContainerError::PartRead {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let mut buf = Vec::with_capacity(size.min(1 << 20) as usize);
        part.read_to_end(&mut buf)
            .map_err(|e| ContainerError::PartRead {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        self.total_read = new_total;
        Ok(buf)
    }

    /// Like [`read_part`](Self::read_part), but a missing part is `None`
    /// instead of an error.
    pub fn read_part_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>, ContainerError> {
        match self.read_part(name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(ContainerError::PartMissing { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.archive.file_names()
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn limits(&self) -> &ContainerLimits {
        &self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn archive_with(parts: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, bytes) in parts {
            writer.start_file(*name, options).expect("start entry");
            writer.write_all(bytes).expect("write entry");
        }
        writer.finish().expect("finish archive")
    }

    #[test]
    fn garbage_bytes_are_not_a_container() {
        let err = ArchiveContainer::open_from_reader(Cursor::new(b"plain text".to_vec()))
            .expect_err("not a zip");
        assert!(matches!(err, ContainerError::NotZip));
        assert_eq!(err.code(), "SHEETCMP_CONT_003");
    }

    #[test]
    fn parts_read_back_and_missing_parts_are_distinguished() {
        let cursor = archive_with(&[("content.xml", b"<a/>")]);
        let mut container = ArchiveContainer::open_from_reader(cursor).expect("open");
        assert_eq!(container.len(), 1);
        assert!(!container.is_empty());
        assert_eq!(container.part_names().collect::<Vec<_>>(), ["content.xml"]);
        assert!(container.has_part("content.xml"));
        assert!(!container.has_part("styles.xml"));
        assert_eq!(container.read_part("content.xml").expect("read"), b"<a/>");
        let err = container.read_part("styles.xml").expect_err("missing");
        assert_eq!(err.code(), "SHEETCMP_CONT_007");
        assert_eq!(
            container.read_part_optional("styles.xml").expect("optional"),
            None
        );
    }

    #[test]
    fn entry_count_limit_is_enforced_at_open() {
        let cursor = archive_with(&[("a.xml", b"1"), ("b.xml", b"2")]);
        let limits = ContainerLimits {
            max_entries: 1,
            ..ContainerLimits::default()
        };
        let err = ArchiveContainer::open_from_reader_with_limits(cursor, limits)
            .expect_err("too many entries");
        assert!(matches!(
            err,
            ContainerError::TooManyParts {
                entries: 2,
                limit: 1
            }
        ));
    }

    #[test]
    fn part_and_total_size_limits_are_enforced_per_read() {
        let cursor = archive_with(&[("big.xml", &[0u8; 64]), ("small.xml", &[0u8; 8])]);
        let limits = ContainerLimits {
            max_part_uncompressed_bytes: 32,
            max_total_uncompressed_bytes: 36,
            ..ContainerLimits::default()
        };
        let mut container =
            ArchiveContainer::open_from_reader_with_limits(cursor, limits).expect("open");

        let err = container.read_part("big.xml").expect_err("part too large");
        assert_eq!(err.code(), "SHEETCMP_CONT_005");

        // Failed reads charge nothing against the total.
        assert!(container.read_part("small.xml").is_ok());

        let cursor = archive_with(&[("a.xml", &[0u8; 24]), ("b.xml", &[0u8; 24])]);
        let limits = ContainerLimits {
            max_part_uncompressed_bytes: 32,
            max_total_uncompressed_bytes: 40,
            ..ContainerLimits::default()
        };
        let mut container =
            ArchiveContainer::open_from_reader_with_limits(cursor, limits).expect("open");
        assert!(container.read_part("a.xml").is_ok());
        let err = container.read_part("b.xml").expect_err("total too large");
        assert_eq!(err.code(), "SHEETCMP_CONT_006");
    }
}
