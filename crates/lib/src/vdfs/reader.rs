//! Minimal on-disk VDFS v2 catalog reader.
//!
//! Reads just enough of the container to list entry names: the fixed-size
//! header locates the entry table, and each 80-byte table record carries a
//! space-padded name plus a type word whose high bit marks directory groups.
//! Payload data is never touched.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use super::{VdfsCatalog, VdfsEntry, VdfsError};

/// Length of the free-form comment field at the start of the header.
const COMMENT_LEN: usize = 256;

/// Version signature following the comment.
const SIGNATURE: &[u8; 16] = b"PSVDSC_V2.00\r\n\r\n";

/// Fixed header fields after the signature: entry count, file count,
/// timestamp, data size, table offset, record size.
const HEADER_FIELDS: usize = 6 * 4;

/// Size of one entry-table record.
const RECORD_LEN: usize = 80;

/// Length of the name field inside a record.
const NAME_LEN: usize = 64;

/// Type-word bit marking a directory group.
const DIR_FLAG: u32 = 0x8000_0000;

/// Catalog implementation reading archives from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskCatalog;

impl VdfsCatalog for DiskCatalog {
  fn entries(&self, archive: &Path) -> Result<Vec<VdfsEntry>, VdfsError> {
    let io = |source| VdfsError::Io {
      path: archive.to_path_buf(),
      source,
    };

    let mut file = File::open(archive).map_err(io)?;

    let mut header = [0u8; COMMENT_LEN + 16 + HEADER_FIELDS];
    read_exact_or_truncated(&mut file, &mut header, archive)?;

    if &header[COMMENT_LEN..COMMENT_LEN + 16] != SIGNATURE {
      return Err(VdfsError::BadSignature {
        path: archive.to_path_buf(),
      });
    }

    let fields = &header[COMMENT_LEN + 16..];
    let entry_count = read_u32(fields, 0) as usize;
    let table_offset = u64::from(read_u32(fields, 16));

    trace!(archive = %archive.display(), entries = entry_count, "reading entry table");

    file.seek(SeekFrom::Start(table_offset)).map_err(io)?;

    // The count is untrusted header data; cap the reservation and let a
    // short table fail on read instead of allocating for a lie.
    let mut entries = Vec::with_capacity(entry_count.min(4096));
    let mut record = [0u8; RECORD_LEN];

    for _ in 0..entry_count {
      read_exact_or_truncated(&mut file, &mut record, archive)?;

      let name = String::from_utf8_lossy(&record[..NAME_LEN])
        .trim_end_matches([' ', '\0'])
        .to_string();
      let kind = read_u32(&record, NAME_LEN + 8);

      entries.push(VdfsEntry {
        name,
        is_dir: kind & DIR_FLAG != 0,
      });
    }

    Ok(entries)
  }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
  u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_exact_or_truncated(file: &mut File, buf: &mut [u8], path: &Path) -> Result<(), VdfsError> {
  file.read_exact(buf).map_err(|source| {
    if source.kind() == std::io::ErrorKind::UnexpectedEof {
      VdfsError::Truncated {
        path: path.to_path_buf(),
      }
    } else {
      VdfsError::Io {
        path: path.to_path_buf(),
        source,
      }
    }
  })
}
