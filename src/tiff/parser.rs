//! TIFF header and IFD parsing.
//!
//! # TIFF Header Structure
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (43 = 0x002B)
//! Bytes 4-5: Offset byte size (must be 8)
//! Bytes 6-7: Reserved (must be 0)
//! Bytes 8-15: Offset to first IFD (8 bytes)
//! ```
//!
//! Each IFD starts with an entry count (2 bytes classic, 8 bytes BigTIFF),
//! followed by fixed-size entries (12 or 20 bytes), followed by the offset
//! of the next IFD (0 terminates the chain). The page count of a file is
//! the length of this chain.

use crate::error::TiffError;
use crate::io::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le, ReadAt,
};

use super::tags::{FieldType, TiffTag};

// =============================================================================
// Constants
// =============================================================================

/// Magic bytes indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Magic bytes indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of BigTIFF header in bytes
pub const BIGTIFF_HEADER_SIZE: usize = 16;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
///
/// TIFF files declare their byte order in the first two bytes of the header.
/// All multi-byte values in the file must be read respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Whether this is a BigTIFF file (64-bit offsets)
    pub is_bigtiff: bool,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// The input must contain at least 8 bytes for classic TIFF or 16 bytes
    /// for BigTIFF. `file_size` is used to validate the first IFD offset.
    ///
    /// # Errors
    /// - `InvalidMagic` if byte order bytes are not II or MM
    /// - `InvalidVersion` if version is not 42 or 43
    /// - `InvalidBigTiffOffsetSize` if BigTIFF offset size is not 8
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidIfdOffset` if the first IFD offset is outside the file
    pub fn parse(bytes: &[u8], file_size: u64) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // The magic is a byte pattern, so read it as fixed little-endian
        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match magic {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidMagic(magic)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);

        match version {
            VERSION_TIFF => {
                let first_ifd_offset = byte_order.read_u32(&bytes[4..8]) as u64;
                if first_ifd_offset >= file_size {
                    return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
                }
                Ok(TiffHeader {
                    byte_order,
                    is_bigtiff: false,
                    first_ifd_offset,
                })
            }
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }

                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    return Err(TiffError::InvalidBigTiffOffsetSize(offset_size));
                }

                let first_ifd_offset = byte_order.read_u64(&bytes[8..16]);
                if first_ifd_offset >= file_size {
                    return Err(TiffError::InvalidIfdOffset(first_ifd_offset));
                }
                Ok(TiffHeader {
                    byte_order,
                    is_bigtiff: true,
                    first_ifd_offset,
                })
            }
            _ => Err(TiffError::InvalidVersion(version)),
        }
    }

    /// Size of an IFD entry in bytes.
    ///
    /// Classic TIFF: 12 bytes (2 tag + 2 type + 4 count + 4 value/offset)
    /// BigTIFF: 20 bytes (2 tag + 2 type + 8 count + 8 value/offset)
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Size of the entry count field at the start of an IFD.
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of the next IFD offset field at the end of an IFD.
    #[inline]
    pub const fn ifd_next_offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// One entry of an Image File Directory.
///
/// Small values are stored inline in the entry's value field; larger values
/// live at the offset the value field encodes.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    /// Tag id (e.g. 256 for ImageWidth)
    pub tag: u16,

    /// Raw field type value from the file
    pub field_type_raw: u16,

    /// Decoded field type, `None` if unknown
    pub field_type: Option<FieldType>,

    /// Number of values of `field_type`
    pub count: u64,

    /// Raw value/offset field (4 meaningful bytes classic, 8 BigTIFF)
    pub value_bytes: [u8; 8],
}

impl IfdEntry {
    /// Parse one entry from its raw bytes.
    fn parse(bytes: &[u8], header: &TiffHeader) -> Self {
        let bo = header.byte_order;
        let tag = bo.read_u16(&bytes[0..2]);
        let field_type_raw = bo.read_u16(&bytes[2..4]);
        let field_type = FieldType::from_u16(field_type_raw);

        let mut value_bytes = [0u8; 8];
        let count = if header.is_bigtiff {
            value_bytes.copy_from_slice(&bytes[12..20]);
            bo.read_u64(&bytes[4..12])
        } else {
            value_bytes[..4].copy_from_slice(&bytes[8..12]);
            bo.read_u32(&bytes[4..8]) as u64
        };

        Self {
            tag,
            field_type_raw,
            field_type,
            count,
            value_bytes,
        }
    }

    /// Whether the value is stored inline in the entry.
    pub fn is_inline(&self, header: &TiffHeader) -> bool {
        self.field_type
            .map(|ft| ft.fits_inline(self.count, header.is_bigtiff))
            .unwrap_or(false)
    }

    /// The value field interpreted as an offset into the file.
    pub fn value_offset(&self, header: &TiffHeader) -> u64 {
        if header.is_bigtiff {
            header.byte_order.read_u64(&self.value_bytes)
        } else {
            header.byte_order.read_u32(&self.value_bytes[..4]) as u64
        }
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// One parsed Image File Directory.
#[derive(Debug, Clone)]
pub struct Ifd {
    /// Offset of this IFD in the file
    pub offset: u64,

    /// Entries in file order
    pub entries: Vec<IfdEntry>,

    /// Offset of the next IFD, 0 if this is the last one
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Parse the IFD at `offset`.
    pub fn parse_at<R: ReadAt>(
        reader: &mut R,
        header: &TiffHeader,
        offset: u64,
    ) -> Result<Self, TiffError> {
        if offset == 0 || offset >= reader.size() {
            return Err(TiffError::InvalidIfdOffset(offset));
        }

        let count_bytes = reader.read_exact_at(offset, header.ifd_count_size())?;
        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(&count_bytes)
        } else {
            header.byte_order.read_u16(&count_bytes) as u64
        } as usize;

        let entry_size = header.ifd_entry_size();
        let body_len = entry_count * entry_size + header.ifd_next_offset_size();
        let body = reader.read_exact_at(offset + header.ifd_count_size() as u64, body_len)?;

        let mut entries = Vec::with_capacity(entry_count);
        for i in 0..entry_count {
            let start = i * entry_size;
            entries.push(IfdEntry::parse(&body[start..start + entry_size], header));
        }

        let next_bytes = &body[entry_count * entry_size..];
        let next_ifd_offset = if header.is_bigtiff {
            header.byte_order.read_u64(next_bytes)
        } else {
            header.byte_order.read_u32(next_bytes) as u64
        };

        Ok(Self {
            offset,
            entries,
            next_ifd_offset,
        })
    }

    /// Find the entry for `tag`, if present.
    pub fn entry(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag as u16)
    }
}

// =============================================================================
// Value Reading
// =============================================================================

/// Read the first element of an entry's value as a u32.
///
/// Handles Byte, Short, Long and Long8 field types, converting as needed.
/// For array-valued tags (e.g. BitsPerSample with one entry per sample)
/// only the first element is read; the probe treats all samples alike.
pub fn entry_first_u32<R: ReadAt>(
    reader: &mut R,
    header: &TiffHeader,
    entry: &IfdEntry,
    tag: &'static str,
) -> Result<u32, TiffError> {
    let field_type = entry
        .field_type
        .ok_or(TiffError::UnknownFieldType(entry.field_type_raw))?;

    if entry.count == 0 {
        return Err(TiffError::InvalidTagValue {
            tag,
            message: "empty value".to_string(),
        });
    }

    let elem_size = field_type.size_in_bytes();
    let bytes = if entry.is_inline(header) {
        entry.value_bytes[..elem_size].to_vec()
    } else {
        let value_offset = entry.value_offset(header);
        reader.read_exact_at(value_offset, elem_size)?
    };

    let bo = header.byte_order;
    match field_type {
        FieldType::Byte | FieldType::Undefined => Ok(bytes[0] as u32),
        FieldType::Short => Ok(bo.read_u16(&bytes) as u32),
        FieldType::Long => Ok(bo.read_u32(&bytes)),
        FieldType::Long8 => {
            let value = bo.read_u64(&bytes);
            u32::try_from(value).map_err(|_| TiffError::InvalidTagValue {
                tag,
                message: format!("value {value} exceeds u32"),
            })
        }
        FieldType::Ascii => Err(TiffError::InvalidTagValue {
            tag,
            message: "expected integer type, got ASCII".to_string(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
