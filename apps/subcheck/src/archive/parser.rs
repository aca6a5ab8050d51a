//! ZIP parser over an in-memory archive.
//!
//! ZIP files are read from the end:
//! 1. Find the End of Central Directory (EOCD) at the tail
//! 2. If ZIP64, follow the locator to the ZIP64 EOCD
//! 3. Parse every Central Directory File Header
//! 4. For extraction, skip each Local File Header and decode its data

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::DeflateDecoder;
use std::io::{Cursor, Read};

use crate::error::ArchiveError;

use super::structures::*;

type Result<T> = std::result::Result<T, ArchiveError>;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
const MAX_COMMENT_SIZE: usize = 65535;

pub struct ZipParser<'a> {
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Bounds-checked view into the archive.
    fn slice(&self, offset: u64, len: u64) -> Result<&'a [u8]> {
        let start = usize::try_from(offset).map_err(|_| ArchiveError::invalid("offset overflow"))?;
        let len = usize::try_from(len).map_err(|_| ArchiveError::invalid("length overflow"))?;
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| ArchiveError::invalid("truncated archive"))
    }

    /// Locate and parse the EOCD record, returning it with its offset.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            return Err(ArchiveError::invalid("not a ZIP file"));
        }

        // Common case: no archive comment.
        let offset = size - EndOfCentralDirectory::SIZE;
        let tail = &self.data[offset..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && tail[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(tail)?, offset as u64));
        }

        // Search backwards; the comment length must account for the rest of the file.
        let search_start = size - (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE).min(size);
        for i in (search_start..=offset).rev() {
            if &self.data[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let comment_len = u16::from_le_bytes([self.data[i + 20], self.data[i + 21]]) as usize;
                if comment_len == size - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(&self.data[i..])?;
                    return Ok((eocd, i as u64));
                }
            }
        }

        Err(ArchiveError::invalid("not a ZIP file"))
    }

    /// Read the ZIP64 EOCD through the locator that precedes the regular EOCD.
    fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or_else(|| ArchiveError::invalid("missing ZIP64 locator"))?;
        let locator =
            Zip64EOCDLocator::from_bytes(self.slice(locator_offset, Zip64EOCDLocator::SIZE as u64)?)?;
        Zip64EOCD::from_bytes(self.slice(locator.eocd64_offset, Zip64EOCD::MIN_SIZE as u64)?)
    }

    /// Parse the whole central directory.
    pub fn entries(&self) -> Result<Vec<ZipEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;
        if eocd.is_multi_disk() {
            return Err(ArchiveError::invalid("multi-disk archives are not supported"));
        }

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let cd = self.slice(cd_offset, cd_size)?;
        // Each header takes at least CDFH_MIN_SIZE bytes; reject inflated counts early.
        if total_entries > (cd.len() / CDFH_MIN_SIZE) as u64 {
            return Err(ArchiveError::invalid("central directory entry count mismatch"));
        }

        let mut cursor = Cursor::new(cd);
        let mut entries = Vec::with_capacity(total_entries as usize);
        for _ in 0..total_entries {
            entries.push(parse_cdfh(&mut cursor)?);
        }
        Ok(entries)
    }

    /// Offset of the entry's data, past the local header and its variable fields.
    fn data_offset(&self, entry: &ZipEntry) -> Result<u64> {
        let lfh = self.slice(entry.lfh_offset, LFH_SIZE as u64)?;
        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(ArchiveError::invalid(format!(
                "invalid local file header for '{}'",
                entry.file_name
            )));
        }
        let mut cursor = Cursor::new(&lfh[26..]);
        let file_name_length = cursor.read_u16::<LittleEndian>()? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>()? as u64;
        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    /// Decompress an entry and verify its CRC-32.
    pub fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        let offset = self.data_offset(entry)?;
        let raw = self.slice(offset, entry.compressed_size)?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw.to_vec(),
            CompressionMethod::Deflate => {
                let mut out = Vec::with_capacity(entry.uncompressed_size.min(1 << 20) as usize);
                // One byte past the declared size is enough to detect a lying header.
                DeflateDecoder::new(raw)
                    .take(entry.uncompressed_size.saturating_add(1))
                    .read_to_end(&mut out)
                    .map_err(|e| {
                        ArchiveError::invalid(format!(
                            "corrupt deflate data in '{}': {}",
                            entry.file_name, e
                        ))
                    })?;
                out
            }
            CompressionMethod::Unknown(m) => {
                return Err(ArchiveError::invalid(format!(
                    "unsupported compression method {} for '{}'",
                    m, entry.file_name
                )))
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ArchiveError::invalid(format!(
                "size mismatch for '{}'",
                entry.file_name
            )));
        }
        let mut crc = flate2::Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ArchiveError::invalid(format!(
                "CRC mismatch for '{}'",
                entry.file_name
            )));
        }
        Ok(data)
    }
}

/// Parse one Central Directory File Header.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(ArchiveError::invalid("invalid central directory file header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();
    let is_directory = file_name.ends_with('/');

    // ZIP64 extended information lives in extra field 0x0001; its values are
    // present only for header fields saturated at 0xFFFFFFFF.
    let extra_field_end = cursor.position() + extra_field_length as u64;
    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        let field_end = cursor.position() + field_size as u64;
        if header_id == 0x0001 {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }
    cursor.set_position(extra_field_end + file_comment_length as u64);
    if cursor.position() > cursor.get_ref().len() as u64 {
        return Err(ArchiveError::invalid("truncated central directory"));
    }

    Ok(ZipEntry {
        file_name,
        flags,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        is_directory,
    })
}
