use bytes::Buf;

use crate::config::TlvConfig;
use crate::element::{
    Container, ContainerType, Element, Value, TYPE_ARRAY, TYPE_BOOL_FALSE, TYPE_BOOL_TRUE,
    TYPE_BYTES_L1, TYPE_BYTES_L8, TYPE_END_OF_CONTAINER, TYPE_FLOAT_4, TYPE_FLOAT_8, TYPE_INT_1,
    TYPE_INT_8, TYPE_LIST, TYPE_MASK, TYPE_NULL, TYPE_STRUCTURE, TYPE_UINT_1, TYPE_UINT_8,
    TYPE_UTF8_L1, TYPE_UTF8_L8,
};
use crate::error::{Result, TlvError};
use crate::tag::{ensure, Tag};

/// Forward-only reader over a borrowed TLV buffer.
///
/// Container elements are returned as [`Container`] views: the reader scans
/// to the matching end marker, and the caller descends with
/// [`Container::reader`]. Nothing is copied out of the buffer.
#[derive(Debug, Clone)]
pub struct TlvReader<'a> {
    rest: &'a [u8],
    len: usize,
    depth: usize,
    config: TlvConfig,
}

impl<'a> TlvReader<'a> {
    /// Create a reader over a top-level buffer with default configuration.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_config(buf, TlvConfig::default())
    }

    /// Create a reader over a top-level buffer with explicit configuration.
    pub fn with_config(buf: &'a [u8], config: TlvConfig) -> Self {
        Self::nested(buf, 0, config)
    }

    pub(crate) fn nested(buf: &'a [u8], depth: usize, config: TlvConfig) -> Self {
        Self {
            rest: buf,
            len: buf.len(),
            depth,
            config,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.len - self.rest.len()
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rest.is_empty()
    }

    /// Depth of the container this reader walks (0 at top level).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn config(&self) -> &TlvConfig {
        &self.config
    }

    /// Read the next element, or `None` at the end of the buffer.
    ///
    /// On error the reader is left where it was.
    pub fn next_element(&mut self) -> Result<Option<Element<'a>>> {
        if self.rest.is_empty() {
            return Ok(None);
        }
        let mut src = self.rest;
        let element = self.take_element(&mut src)?;
        self.rest = src;
        Ok(Some(element))
    }

    /// Step over the next element, including any container body.
    ///
    /// Returns `false` at the end of the buffer.
    pub fn skip(&mut self) -> Result<bool> {
        Ok(self.next_element()?.is_some())
    }

    fn take_element(&self, src: &mut &'a [u8]) -> Result<Element<'a>> {
        let control = src.get_u8();
        let type_code = control & TYPE_MASK;
        if type_code == TYPE_END_OF_CONTAINER {
            return Err(TlvError::UnexpectedEndOfContainer);
        }
        let tag = Tag::take(control, src)?;
        let value = match type_code {
            TYPE_INT_1..=TYPE_INT_8 => {
                let width = 1usize << (type_code - TYPE_INT_1);
                ensure(src, width)?;
                Value::Signed(src.get_int_le(width))
            }
            TYPE_UINT_1..=TYPE_UINT_8 => {
                let width = 1usize << (type_code - TYPE_UINT_1);
                ensure(src, width)?;
                Value::Unsigned(src.get_uint_le(width))
            }
            TYPE_BOOL_FALSE => Value::Bool(false),
            TYPE_BOOL_TRUE => Value::Bool(true),
            TYPE_FLOAT_4 => {
                ensure(src, 4)?;
                Value::F32(src.get_f32_le())
            }
            TYPE_FLOAT_8 => {
                ensure(src, 8)?;
                Value::F64(src.get_f64_le())
            }
            TYPE_UTF8_L1..=TYPE_UTF8_L8 => {
                let data = take_string(src, type_code - TYPE_UTF8_L1)?;
                let text = std::str::from_utf8(data).map_err(|_| TlvError::InvalidUtf8)?;
                Value::Utf8(text)
            }
            TYPE_BYTES_L1..=TYPE_BYTES_L8 => {
                Value::Bytes(take_string(src, type_code - TYPE_BYTES_L1)?)
            }
            TYPE_NULL => Value::Null,
            TYPE_STRUCTURE => {
                Value::Container(self.take_container(src, ContainerType::Structure)?)
            }
            TYPE_ARRAY => Value::Container(self.take_container(src, ContainerType::Array)?),
            TYPE_LIST => Value::Container(self.take_container(src, ContainerType::List)?),
            _ => return Err(TlvError::InvalidControlByte(control)),
        };
        Ok(Element { tag, value })
    }

    /// Scan to the end marker matching an already-consumed container head.
    fn take_container(
        &self,
        src: &mut &'a [u8],
        kind: ContainerType,
    ) -> Result<Container<'a>> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(TlvError::DepthExceeded {
                max: self.config.max_depth,
            });
        }

        let start: &'a [u8] = *src;
        let mut scan = TlvReader::nested(start, depth, self.config);
        loop {
            ensure(scan.rest, 1)?;
            if scan.rest[0] & TYPE_MASK == TYPE_END_OF_CONTAINER {
                let body_len = scan.position();
                *src = &start[body_len + 1..];
                return Ok(Container::new(kind, &start[..body_len], depth, self.config));
            }
            // Nested containers are scanned recursively by take_element.
            let mut inner = scan.rest;
            scan.take_element(&mut inner)?;
            scan.rest = inner;
        }
    }
}

fn take_string<'a>(src: &mut &'a [u8], width_code: u8) -> Result<&'a [u8]> {
    let width = 1usize << width_code;
    ensure(src, width)?;
    let len = src.get_uint_le(width);
    let len = usize::try_from(len).map_err(|_| TlvError::LengthOverflow(len))?;
    ensure(src, len)?;
    let (data, rest) = src.split_at(len);
    *src = rest;
    Ok(data)
}

/// Read the single top-level element of a received message.
///
/// Fails if the message exceeds the configured size, if it is empty or
/// truncated, or if bytes follow the top-level element.
pub fn read_message(buf: &[u8], config: TlvConfig) -> Result<Element<'_>> {
    if buf.len() > config.max_encoded_len {
        return Err(TlvError::MessageTooLarge {
            size: buf.len(),
            max: config.max_encoded_len,
        });
    }
    let mut reader = TlvReader::with_config(buf, config);
    let element = reader.next_element()?.ok_or(TlvError::Underrun {
        needed: 1,
        available: 0,
    })?;
    if !reader.is_empty() {
        return Err(TlvError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::TlvWriter;
    use crate::TlvType;

    fn sample() -> Vec<u8> {
        let mut w = TlvWriter::new();
        w.start_container(Tag::Anonymous, ContainerType::Structure)
            .unwrap();
        w.put_unsigned(Tag::Context(0), 7).unwrap();
        w.start_container(Tag::Context(1), ContainerType::Array)
            .unwrap();
        w.put_str(Tag::Anonymous, "a").unwrap();
        w.put_str(Tag::Anonymous, "b").unwrap();
        w.end_container(ContainerType::Array).unwrap();
        w.put_signed(Tag::Context(2), -300).unwrap();
        w.put_f64(Tag::Context(3), 1.5).unwrap();
        w.end_container(ContainerType::Structure).unwrap();
        w.finish().unwrap().to_vec()
    }

    #[test]
    fn reads_nested_elements() {
        let bytes = sample();
        let top = read_message(&bytes, TlvConfig::default()).unwrap();
        assert_eq!(top.tag, Tag::Anonymous);
        let container = top.as_container().unwrap();
        assert_eq!(container.kind(), ContainerType::Structure);
        assert_eq!(container.depth(), 1);

        let mut r = container.reader();
        let first = r.next_element().unwrap().unwrap();
        assert_eq!(first.tag, Tag::Context(0));
        assert_eq!(first.as_unsigned(), Some(7));

        let array = r.next_element().unwrap().unwrap();
        assert_eq!(array.tlv_type(), TlvType::Array);
        let mut items = array.as_container().unwrap().reader();
        assert_eq!(items.next_element().unwrap().unwrap().as_str(), Some("a"));
        assert_eq!(items.next_element().unwrap().unwrap().as_str(), Some("b"));
        assert!(items.next_element().unwrap().is_none());

        let signed = r.next_element().unwrap().unwrap();
        assert_eq!(signed.as_signed(), Some(-300));
        let float = r.next_element().unwrap().unwrap();
        assert_eq!(float.value, Value::F64(1.5));
        assert!(r.next_element().unwrap().is_none());
    }

    #[test]
    fn skip_steps_over_containers() {
        let bytes = sample();
        let top = read_message(&bytes, TlvConfig::default()).unwrap();
        let mut r = top.as_container().unwrap().reader();
        assert!(r.skip().unwrap());
        assert!(r.skip().unwrap());
        assert_eq!(r.next_element().unwrap().unwrap().tag, Tag::Context(2));
        assert!(r.skip().unwrap());
        assert!(!r.skip().unwrap());
    }

    #[test]
    fn truncated_container_is_underrun() {
        let mut bytes = sample();
        bytes.truncate(bytes.len() - 1);
        let err = read_message(&bytes, TlvConfig::default()).unwrap_err();
        assert!(err.is_truncated());
    }

    #[test]
    fn truncated_string_is_underrun() {
        let bytes = [0x0C, 0x05, b'a', b'b'];
        let err = read_message(&bytes, TlvConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TlvError::Underrun {
                needed: 5,
                available: 2
            }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = sample();
        bytes.push(0x04);
        bytes.push(0x01);
        let err = read_message(&bytes, TlvConfig::default()).unwrap_err();
        assert_eq!(err, TlvError::TrailingBytes { remaining: 2 });
    }

    #[test]
    fn reserved_type_code_is_rejected() {
        let bytes = [0x1F];
        let err = read_message(&bytes, TlvConfig::default()).unwrap_err();
        assert_eq!(err, TlvError::InvalidControlByte(0x1F));
    }

    #[test]
    fn stray_end_marker_is_rejected() {
        let mut r = TlvReader::new(&[0x18]);
        assert_eq!(
            r.next_element().unwrap_err(),
            TlvError::UnexpectedEndOfContainer
        );
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = [0x0C, 0x02, 0xC3, 0x28];
        assert_eq!(
            read_message(&bytes, TlvConfig::default()).unwrap_err(),
            TlvError::InvalidUtf8
        );
    }

    #[test]
    fn nesting_beyond_max_depth_fails() {
        // Three nested anonymous lists.
        let bytes = [0x17, 0x17, 0x17, 0x18, 0x18, 0x18];
        let config = TlvConfig {
            max_depth: 2,
            ..TlvConfig::default()
        };
        let err = read_message(&bytes, config).unwrap_err();
        assert_eq!(err, TlvError::DepthExceeded { max: 2 });
        assert!(read_message(&bytes, TlvConfig::default()).is_ok());
    }

    #[test]
    fn oversized_message_is_rejected() {
        let bytes = vec![0x14; 16];
        let err = read_message(&bytes, TlvConfig::with_max_encoded_len(8)).unwrap_err();
        assert_eq!(err, TlvError::MessageTooLarge { size: 16, max: 8 });
    }

    #[test]
    fn empty_message_is_underrun() {
        assert!(read_message(&[], TlvConfig::default())
            .unwrap_err()
            .is_truncated());
    }
}
