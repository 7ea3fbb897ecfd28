use super::IndexError;

pub(crate) const HEADER_LEN: usize = 8;

/// Writes `magic`, the little-endian format version and two reserved bytes.
pub(crate) fn write_header(out: &mut Vec<u8>, magic: &[u8; 4], version: u16) {
    out.extend_from_slice(magic);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&0_u16.to_le_bytes());
}

/// Validates magic and version before anything else in the payload is read.
pub(crate) fn read_header(
    reader: &mut ByteReader<'_>,
    magic: &[u8; 4],
    supported_version: u16,
) -> Result<(), IndexError> {
    if reader.remaining() < HEADER_LEN {
        return Err(IndexError::UnsupportedFormat(format!(
            "payload of {} bytes is too short for a header",
            reader.remaining()
        )));
    }

    let found_magic = reader.take(4)?;
    if found_magic != magic {
        return Err(IndexError::UnsupportedFormat(format!(
            "expected magic {:?}, found {:?}",
            String::from_utf8_lossy(magic),
            String::from_utf8_lossy(found_magic)
        )));
    }

    let version = reader.read_u16()?;
    if version != supported_version {
        return Err(IndexError::UnsupportedFormat(format!(
            "format version {version} is not supported (expected {supported_version})"
        )));
    }

    let _reserved = reader.read_u16()?;
    Ok(())
}

pub(crate) struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], IndexError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                IndexError::CorruptIndex(format!(
                    "truncated payload: needed {len} bytes at offset {}, {} remaining",
                    self.offset,
                    self.remaining()
                ))
            })?;

        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16, IndexError> {
        let raw = self.take(2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32, IndexError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64, IndexError> {
        let raw = self.take(8)?;
        let mut buf = [0_u8; 8];
        buf.copy_from_slice(raw);
        Ok(u64::from_le_bytes(buf))
    }

    pub(crate) fn read_len(&mut self, field: &'static str) -> Result<usize, IndexError> {
        let value = self.read_u64()?;
        usize::try_from(value)
            .map_err(|_| IndexError::CorruptIndex(format!("{field} does not fit in memory: {value}")))
    }

    pub(crate) fn finish(self) -> Result<(), IndexError> {
        if self.remaining() != 0 {
            return Err(IndexError::CorruptIndex(format!(
                "{} unexpected trailing bytes",
                self.remaining()
            )));
        }
        Ok(())
    }
}
