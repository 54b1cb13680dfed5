//! In-memory view of a PPTX container.
//!
//! Every entry is read once at load time. Serializing re-encodes every part
//! from its decompressed bytes with the entry's original timestamp and
//! permissions, so the output depends only on the part set: untouched parts
//! keep their exact content and re-serializing an unchanged archive yields
//! identical bytes.

use deck_core::{Error, Result};
use log::debug;
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Upper bound on how far a declared entry size may exceed the container
/// when preallocating; deflate cannot expand data by much more.
const MAX_INFLATE_RATIO: u64 = 1032;

/// One named entry of the container.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
    compression: CompressionMethod,
    last_modified: DateTime,
    unix_mode: Option<u32>,
    modified: bool,
}

impl Part {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the part was rewritten since loading.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// A loaded container: its decompressed parts in container order.
#[derive(Debug, Clone)]
pub struct Archive {
    parts: Vec<Part>,
}

impl Archive {
    /// Load a container from its raw bytes.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::Format(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .map_err(|e| Error::Format(format!("Failed to read entry {}: {}", index, e)))?;

            let mut data = Vec::with_capacity(capacity_hint(file.size(), bytes.len()));
            file.read_to_end(&mut data)
                .map_err(|e| Error::Format(format!("Failed to read '{}': {}", file.name(), e)))?;

            parts.push(Part {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
                compression: file.compression(),
                last_modified: file.last_modified(),
                unix_mode: file.unix_mode(),
                modified: false,
            });
        }

        debug!("Loaded container with {} parts", parts.len());

        Ok(Self { parts })
    }

    /// Part names in container order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.find(path).is_some()
    }

    fn find(&self, path: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.name == path)
    }

    /// Raw bytes of a part.
    pub fn get_part(&self, path: &str) -> Result<&[u8]> {
        self.find(path)
            .map(|i| self.parts[i].data.as_slice())
            .ok_or_else(|| Error::PartNotFound(path.to_string()))
    }

    /// A part decoded as UTF-8 text, without a leading byte order mark.
    pub fn get_part_text(&self, path: &str) -> Result<String> {
        let bytes = self.get_part(path)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::Format(format!("Part '{}' is not UTF-8: {}", path, e)))?;
        Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
    }

    /// Replace the content of an existing part.
    ///
    /// Writing back identical content leaves the part untouched.
    pub fn set_part(&mut self, path: &str, text: &str) -> Result<()> {
        let index = self
            .find(path)
            .ok_or_else(|| Error::PartNotFound(path.to_string()))?;

        let part = &mut self.parts[index];
        if part.data != text.as_bytes() {
            part.data = text.as_bytes().to_vec();
            part.modified = true;
        }
        Ok(())
    }

    /// Names of the parts rewritten since loading.
    pub fn modified_parts(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter(|p| p.modified)
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Write every part, in the original order, into a new container.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let capacity = self.parts.iter().map(|p| p.data.len()).sum();
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));

        for part in &self.parts {
            let mut options = FileOptions::default()
                .compression_method(writable_method(part.compression))
                .last_modified_time(part.last_modified);
            if let Some(mode) = part.unix_mode {
                options = options.unix_permissions(mode);
            }

            if part.is_dir {
                writer
                    .add_directory(part.name.as_str(), options)
                    .map_err(|e| zip_error(&part.name, e))?;
                continue;
            }

            writer
                .start_file(part.name.as_str(), options)
                .map_err(|e| zip_error(&part.name, e))?;
            writer
                .write_all(&part.data)
                .map_err(|e| Error::Serialization(format!("Failed to write '{}': {}", part.name, e)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Serialization(format!("Failed to finish ZIP: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// Preallocation for an entry, never trusting the declared size beyond what
/// the container could hold.
fn capacity_hint(declared: u64, container_len: usize) -> usize {
    let bound = (container_len as u64).saturating_mul(MAX_INFLATE_RATIO);
    usize::try_from(declared.min(bound)).unwrap_or(0)
}

/// Stored entries stay stored; everything else is written deflated.
fn writable_method(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

fn zip_error(name: &str, e: zip::result::ZipError) -> Error {
    Error::Serialization(format!("Failed to write '{}': {}", name, e))
}
