use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::config::TlvConfig;
use crate::element::{
    ContainerType, TYPE_BOOL_FALSE, TYPE_BOOL_TRUE, TYPE_BYTES_L1, TYPE_END_OF_CONTAINER,
    TYPE_FLOAT_4, TYPE_FLOAT_8, TYPE_INT_1, TYPE_NULL, TYPE_UINT_1, TYPE_UTF8_L1,
};
use crate::error::{Result, TlvError};
use crate::tag::Tag;

/// Append-only TLV element writer over an owned buffer.
///
/// Every write is checked against [`TlvConfig::max_encoded_len`] before any
/// byte is appended, so a failed write leaves the buffer untouched. One byte
/// per open container is held back for its end marker.
#[derive(Debug)]
pub struct TlvWriter {
    buf: BytesMut,
    open: Vec<ContainerType>,
    config: TlvConfig,
}

impl TlvWriter {
    /// Create a writer with default configuration.
    pub fn new() -> Self {
        Self::with_config(TlvConfig::default())
    }

    /// Create a writer with explicit configuration.
    pub fn with_config(config: TlvConfig) -> Self {
        Self {
            buf: BytesMut::with_capacity(config.max_encoded_len),
            open: Vec::with_capacity(config.max_depth),
            config,
        }
    }

    /// Number of currently open containers.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Kind of the innermost open container.
    pub fn current_container(&self) -> Option<ContainerType> {
        self.open.last().copied()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes still writable, after reserving one end marker per open container.
    pub fn remaining(&self) -> usize {
        self.config
            .max_encoded_len
            .saturating_sub(self.buf.len() + self.open.len())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn config(&self) -> &TlvConfig {
        &self.config
    }

    /// Write a signed integer in the smallest width that holds it.
    pub fn put_signed(&mut self, tag: Tag, value: i64) -> Result<()> {
        let (width_code, width) = if i8::try_from(value).is_ok() {
            (0, 1)
        } else if i16::try_from(value).is_ok() {
            (1, 2)
        } else if i32::try_from(value).is_ok() {
            (2, 4)
        } else {
            (3, 8)
        };
        self.put_head(tag, TYPE_INT_1 + width_code, width)?;
        match width {
            1 => self.buf.put_i8(value as i8),
            2 => self.buf.put_i16_le(value as i16),
            4 => self.buf.put_i32_le(value as i32),
            _ => self.buf.put_i64_le(value),
        }
        Ok(())
    }

    /// Write an unsigned integer in the smallest width that holds it.
    pub fn put_unsigned(&mut self, tag: Tag, value: u64) -> Result<()> {
        let (width_code, width) = if value <= u8::MAX as u64 {
            (0, 1)
        } else if value <= u16::MAX as u64 {
            (1, 2)
        } else if value <= u32::MAX as u64 {
            (2, 4)
        } else {
            (3, 8)
        };
        self.put_head(tag, TYPE_UINT_1 + width_code, width)?;
        match width {
            1 => self.buf.put_u8(value as u8),
            2 => self.buf.put_u16_le(value as u16),
            4 => self.buf.put_u32_le(value as u32),
            _ => self.buf.put_u64_le(value),
        }
        Ok(())
    }

    pub fn put_bool(&mut self, tag: Tag, value: bool) -> Result<()> {
        let code = if value { TYPE_BOOL_TRUE } else { TYPE_BOOL_FALSE };
        self.put_head(tag, code, 0)
    }

    pub fn put_f32(&mut self, tag: Tag, value: f32) -> Result<()> {
        self.put_head(tag, TYPE_FLOAT_4, 4)?;
        self.buf.put_f32_le(value);
        Ok(())
    }

    pub fn put_f64(&mut self, tag: Tag, value: f64) -> Result<()> {
        self.put_head(tag, TYPE_FLOAT_8, 8)?;
        self.buf.put_f64_le(value);
        Ok(())
    }

    pub fn put_str(&mut self, tag: Tag, value: &str) -> Result<()> {
        self.put_string(tag, TYPE_UTF8_L1, value.as_bytes())
    }

    pub fn put_bytes(&mut self, tag: Tag, value: &[u8]) -> Result<()> {
        self.put_string(tag, TYPE_BYTES_L1, value)
    }

    pub fn put_null(&mut self, tag: Tag) -> Result<()> {
        self.put_head(tag, TYPE_NULL, 0)
    }

    /// Open a container. Its end marker is reserved immediately.
    pub fn start_container(&mut self, tag: Tag, kind: ContainerType) -> Result<()> {
        if self.open.len() >= self.config.max_depth {
            return Err(TlvError::DepthExceeded {
                max: self.config.max_depth,
            });
        }
        // +1 reserves the end marker.
        self.put_head(tag, kind.type_code(), 1)?;
        self.open.push(kind);
        trace!(%tag, container = %kind, depth = self.open.len(), "opened container");
        Ok(())
    }

    /// Close the innermost container, which must be of `kind`.
    pub fn end_container(&mut self, kind: ContainerType) -> Result<()> {
        match self.open.last() {
            Some(open) if *open == kind => {}
            _ => return Err(TlvError::ContainerMismatch),
        }
        self.open.pop();
        self.buf.put_u8(TYPE_END_OF_CONTAINER);
        trace!(container = %kind, depth = self.open.len(), "closed container");
        Ok(())
    }

    /// Consume the writer and return the encoded bytes.
    pub fn finish(self) -> Result<Bytes> {
        if !self.open.is_empty() {
            return Err(TlvError::UnclosedContainer {
                depth: self.open.len(),
            });
        }
        Ok(self.buf.freeze())
    }

    fn put_string(&mut self, tag: Tag, base_code: u8, data: &[u8]) -> Result<()> {
        let len = data.len();
        let (width_code, width) = if len <= u8::MAX as usize {
            (0, 1)
        } else if len <= u16::MAX as usize {
            (1, 2)
        } else if len as u64 <= u32::MAX as u64 {
            (2, 4)
        } else {
            (3, 8)
        };
        self.put_head(tag, base_code + width_code, width + len)?;
        match width {
            1 => self.buf.put_u8(len as u8),
            2 => self.buf.put_u16_le(len as u16),
            4 => self.buf.put_u32_le(len as u32),
            _ => self.buf.put_u64_le(len as u64),
        }
        self.buf.put_slice(data);
        Ok(())
    }

    /// Validate the tag, reserve space for control byte + tag + `body` bytes,
    /// and write the control byte and tag.
    fn put_head(&mut self, tag: Tag, type_code: u8, body: usize) -> Result<()> {
        self.check_tag(tag)?;
        let needed = 1 + tag.encoded_len() + body;
        let available = self.remaining();
        if needed > available {
            return Err(TlvError::BufferTooSmall { needed, available });
        }
        self.buf.put_u8(tag.control_bits() | type_code);
        tag.put(&mut self.buf);
        Ok(())
    }

    fn check_tag(&self, tag: Tag) -> Result<()> {
        let allowed = match self.current_container() {
            None | Some(ContainerType::List) => true,
            Some(ContainerType::Array) => tag.is_anonymous(),
            Some(ContainerType::Structure) => !tag.is_anonymous(),
        };
        if allowed {
            return Ok(());
        }
        Err(TlvError::InvalidTag {
            tag,
            container: self.current_container().unwrap_or(ContainerType::List),
        })
    }
}

impl Default for TlvWriter {
    fn default() -> Self {
        Self::new()
    }
}
