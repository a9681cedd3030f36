use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use super::error::{Result, ZipDirError};

/// ZIP compression methods used by the pak tool chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    /// Stored payload, per-entry streamcipher with a key table.
    StoredStreamcipherKeytable,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            10 => CompressionMethod::StoredStreamcipherKeytable,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::StoredStreamcipherKeytable => 10,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    /// Store-family methods keep the payload size unchanged, so the
    /// compressed and uncompressed sizes must agree.
    pub fn is_store_family(&self) -> bool {
        matches!(
            self,
            CompressionMethod::Stored | CompressionMethod::StoredStreamcipherKeytable
        )
    }
}

/// How the archive headers are encrypted, declared either by the legacy
/// disk-number bits or by the extended header in the comment area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderEncryption {
    #[default]
    NotEncrypted,
    Streamcipher,
    Tea,
    StreamcipherKeytable,
}

impl HeaderEncryption {
    /// Decode the legacy hint stored in bits 14-15 of the EOCD disk number.
    ///
    /// Only the TEA and plain streamcipher techniques were ever written this
    /// way; any other bit pattern means "not encrypted".
    pub fn from_legacy_bits(bits: u16) -> Self {
        match bits {
            1 => HeaderEncryption::Streamcipher,
            2 => HeaderEncryption::Tea,
            _ => HeaderEncryption::NotEncrypted,
        }
    }

    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(HeaderEncryption::NotEncrypted),
            1 => Some(HeaderEncryption::Streamcipher),
            2 => Some(HeaderEncryption::Tea),
            3 => Some(HeaderEncryption::StreamcipherKeytable),
            _ => None,
        }
    }
}

/// Whether the central directory is signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderSignature {
    #[default]
    NotSigned,
    CdrSigned,
}

impl HeaderSignature {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(HeaderSignature::NotSigned),
            1 => Some(HeaderSignature::CdrSigned),
            _ => None,
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes
#[derive(Debug, Clone)]
pub struct EndOfCentralDirectory {
    pub disk: u16,
    pub cdr_start_disk: u16,
    pub entries_on_disk: u16,
    pub entries_total: u16,
    pub cdr_size: u32,
    pub cdr_offset: u32,
    pub comment_length: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipDirError::DataCorrupt(
                "bad end-of-central-directory record",
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            disk: cursor.read_u16::<LittleEndian>()?,
            cdr_start_disk: cursor.read_u16::<LittleEndian>()?,
            entries_on_disk: cursor.read_u16::<LittleEndian>()?,
            entries_total: cursor.read_u16::<LittleEndian>()?,
            cdr_size: cursor.read_u32::<LittleEndian>()?,
            cdr_offset: cursor.read_u32::<LittleEndian>()?,
            comment_length: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Central Directory File Header - 46 bytes fixed part
#[derive(Debug, Clone)]
pub struct CdrFileHeader {
    pub version_made_by: u16,
    pub needs_version: u16,
    pub flags: u16,
    pub method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_length: u16,
    pub extra_length: u16,
    pub comment_length: u16,
    pub disk_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub local_header_offset: u32,
}

impl CdrFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const SIZE: usize = 46;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipDirError::CdrCorrupt(
                "bad central directory record signature",
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            needs_version: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            method: cursor.read_u16::<LittleEndian>()?,
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            name_length: cursor.read_u16::<LittleEndian>()?,
            extra_length: cursor.read_u16::<LittleEndian>()?,
            comment_length: cursor.read_u16::<LittleEndian>()?,
            disk_start: cursor.read_u16::<LittleEndian>()?,
            internal_attrs: cursor.read_u16::<LittleEndian>()?,
            external_attrs: cursor.read_u32::<LittleEndian>()?,
            local_header_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    /// Total length of this record including its variable-length tail.
    pub fn record_len(&self) -> usize {
        Self::SIZE
            + self.name_length as usize
            + self.extra_length as usize
            + self.comment_length as usize
    }
}

/// Local File Header - 30 bytes fixed part
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub needs_version: u16,
    pub flags: u16,
    pub method: u16,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub name_length: u16,
    pub extra_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x03\x04";
    pub const SIZE: usize = 30;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(ZipDirError::ValidationFailed(
                "bad local file header signature",
            ));
        }

        let mut cursor = Cursor::new(&data[4..]);

        Ok(Self {
            needs_version: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            method: cursor.read_u16::<LittleEndian>()?,
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            name_length: cursor.read_u16::<LittleEndian>()?,
            extra_length: cursor.read_u16::<LittleEndian>()?,
        })
    }
}

/// Vendor extended header overlaying the start of the EOCD comment area.
///
/// Declares which encryption and signing techniques apply to the archive
/// headers; the corresponding sub-headers follow it.
#[derive(Debug, Clone)]
pub struct ExtendedHeader {
    pub header_size: u16,
    pub encryption: u16,
    pub signing: u16,
}

impl ExtendedHeader {
    pub const SIZE: usize = 6;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ZipDirError::DataCorrupt("bad extended header"));
        }

        let mut cursor = Cursor::new(data);
        let header = Self {
            header_size: cursor.read_u16::<LittleEndian>()?,
            encryption: cursor.read_u16::<LittleEndian>()?,
            signing: cursor.read_u16::<LittleEndian>()?,
        };

        if header.header_size as usize != Self::SIZE {
            return Err(ZipDirError::DataCorrupt("bad extended header"));
        }

        Ok(header)
    }
}

/// Size of the streamcipher key-table trailer that follows the extended
/// header when declared: a self-size word, a 16-byte CDR IV and a 16x16 key
/// table. Its contents are consumed by the decryption layer, not here; only
/// its length takes part in the comment-length accounting.
pub const ENCRYPTION_HEADER_SIZE: usize = 2 + 16 + 16 * 16;

/// Central directory signature trailer.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub header_size: u16,
    pub cdr_signature: [u8; 128],
}

impl SignatureHeader {
    pub const SIZE: usize = 130;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(ZipDirError::DataCorrupt("bad signature header"));
        }

        let mut cursor = Cursor::new(data);
        let header_size = cursor.read_u16::<LittleEndian>()?;
        if header_size as usize != Self::SIZE {
            return Err(ZipDirError::DataCorrupt("bad signature header"));
        }

        let mut cdr_signature = [0u8; 128];
        cdr_signature.copy_from_slice(&data[2..Self::SIZE]);

        Ok(Self {
            header_size,
            cdr_signature,
        })
    }
}

/// Extra field header ID for the NTFS timestamp block
pub const EXTRA_NTFS: u16 = 0x000A;

/// Extract the NTFS last-modify FILETIME from the data of an `EXTRA_NTFS`
/// field: 4 reserved bytes, then attribute TLVs where tag 0x0001 carries the
/// modify/access/create times.
pub fn ntfs_last_modify(data: &[u8]) -> Option<u64> {
    let mut pos = 4usize; // reserved
    while pos + 4 <= data.len() {
        let tag = u16::from_le_bytes([data[pos], data[pos + 1]]);
        let size = u16::from_le_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;
        if pos + size > data.len() {
            return None;
        }
        if tag == 0x0001 && size >= 8 {
            let mut time = [0u8; 8];
            time.copy_from_slice(&data[pos..pos + 8]);
            return Some(u64::from_le_bytes(time));
        }
        pos += size;
    }
    None
}
