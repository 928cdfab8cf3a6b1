use std::io::{self, Read, Write};

use thiserror::Error;

/// Largest length a var-bytes prefix may announce before the reader bails
/// out instead of allocating.
pub const MAX_VAR_BYTES_LEN: u64 = 32 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input")]
    Truncated,
    #[error("declared length {len} exceeds cap of {max} bytes")]
    LengthTooLarge { len: u64, max: u64 },
    #[error("string field is not valid UTF-8")]
    InvalidUtf8,
    #[error("malformed value: {0}")]
    Malformed(String),
    #[error("{field}: {source}")]
    Field {
        field: String,
        #[source]
        source: Box<CodecError>,
    },
    #[error("io error: {0}")]
    Io(io::Error),
}

impl CodecError {
    /// Tags the error with the field it occurred in.
    pub fn for_field(self, field: &str) -> CodecError {
        CodecError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated
        } else {
            CodecError::Io(err)
        }
    }
}

pub type CodecResult<T> = Result<T, CodecError>;

pub fn write_u8<W: Write>(w: &mut W, value: u8) -> CodecResult<()> {
    w.write_all(&[value])?;
    Ok(())
}

pub fn write_u16<W: Write>(w: &mut W, value: u16) -> CodecResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u32<W: Write>(w: &mut W, value: u32) -> CodecResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u64<W: Write>(w: &mut W, value: u64) -> CodecResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i64<W: Write>(w: &mut W, value: i64) -> CodecResult<()> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn read_u8<R: Read>(r: &mut R) -> CodecResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16<R: Read>(r: &mut R) -> CodecResult<u16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_u32<R: Read>(r: &mut R) -> CodecResult<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_u64<R: Read>(r: &mut R) -> CodecResult<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_i64<R: Read>(r: &mut R) -> CodecResult<i64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

/// Compact-size variable-length integer: values below 0xfd are a single
/// byte; larger values carry a marker byte followed by the little-endian
/// fixed-width encoding (0xfd + u16, 0xfe + u32, 0xff + u64).
pub fn write_var_uint<W: Write>(w: &mut W, value: u64) -> CodecResult<()> {
    if value < 0xfd {
        write_u8(w, value as u8)
    } else if value <= 0xffff {
        write_u8(w, 0xfd)?;
        write_u16(w, value as u16)
    } else if value <= 0xffff_ffff {
        write_u8(w, 0xfe)?;
        write_u32(w, value as u32)
    } else {
        write_u8(w, 0xff)?;
        write_u64(w, value)
    }
}

pub fn read_var_uint<R: Read>(r: &mut R) -> CodecResult<u64> {
    match read_u8(r)? {
        0xfd => Ok(u64::from(read_u16(r)?)),
        0xfe => Ok(u64::from(read_u32(r)?)),
        0xff => read_u64(r),
        prefix => Ok(u64::from(prefix)),
    }
}

pub fn write_var_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> CodecResult<()> {
    write_var_uint(w, bytes.len() as u64)?;
    w.write_all(bytes)?;
    Ok(())
}

pub fn read_var_bytes<R: Read>(r: &mut R) -> CodecResult<Vec<u8>> {
    let len = read_var_uint(r)?;
    if len > MAX_VAR_BYTES_LEN {
        return Err(CodecError::LengthTooLarge {
            len,
            max: MAX_VAR_BYTES_LEN,
        });
    }
    let mut bytes = vec![0u8; len as usize];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub fn write_var_string<W: Write>(w: &mut W, value: &str) -> CodecResult<()> {
    write_var_bytes(w, value.as_bytes())
}

pub fn read_var_string<R: Read>(r: &mut R) -> CodecResult<String> {
    let bytes = read_var_bytes(r)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

pub fn read_hash<R: Read>(r: &mut R) -> CodecResult<[u8; 32]> {
    let mut hash = [0u8; 32];
    r.read_exact(&mut hash)?;
    Ok(hash)
}
