use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, TlvError};

pub(crate) const TAG_CONTROL_SHIFT: u8 = 5;

const CONTROL_ANONYMOUS: u8 = 0;
const CONTROL_CONTEXT: u8 = 1;
const CONTROL_COMMON_2: u8 = 2;
const CONTROL_COMMON_4: u8 = 3;
const CONTROL_IMPLICIT_2: u8 = 4;
const CONTROL_IMPLICIT_4: u8 = 5;
const CONTROL_FULL_6: u8 = 6;
const CONTROL_FULL_8: u8 = 7;

/// Identifier of an element within its enclosing container.
///
/// Context tags are only unique inside one container. Profile tags are
/// globally qualified and survive schema boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Tag {
    /// No tag: array and list elements.
    Anonymous,
    /// Context-specific tag, scoped to the enclosing container.
    Context(u8),
    /// Tag in the common profile.
    CommonProfile(u32),
    /// Tag in the profile implied by the enclosing message.
    ImplicitProfile(u32),
    /// Vendor- and profile-qualified tag.
    FullyQualified { vendor_id: u16, profile: u16, tag: u32 },
}

impl Tag {
    /// Context tag number, if this is a context-specific tag.
    pub fn context_number(self) -> Option<u8> {
        match self {
            Tag::Context(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_anonymous(self) -> bool {
        matches!(self, Tag::Anonymous)
    }

    /// Number of tag bytes that follow the control byte.
    pub fn encoded_len(self) -> usize {
        match self {
            Tag::Anonymous => 0,
            Tag::Context(_) => 1,
            Tag::CommonProfile(n) | Tag::ImplicitProfile(n) => {
                if n <= u16::MAX as u32 {
                    2
                } else {
                    4
                }
            }
            Tag::FullyQualified { tag, .. } => {
                if tag <= u16::MAX as u32 {
                    6
                } else {
                    8
                }
            }
        }
    }

    /// Tag control bits, already shifted into the control byte position.
    pub(crate) fn control_bits(self) -> u8 {
        let control = match self {
            Tag::Anonymous => CONTROL_ANONYMOUS,
            Tag::Context(_) => CONTROL_CONTEXT,
            Tag::CommonProfile(n) if n <= u16::MAX as u32 => CONTROL_COMMON_2,
            Tag::CommonProfile(_) => CONTROL_COMMON_4,
            Tag::ImplicitProfile(n) if n <= u16::MAX as u32 => CONTROL_IMPLICIT_2,
            Tag::ImplicitProfile(_) => CONTROL_IMPLICIT_4,
            Tag::FullyQualified { tag, .. } if tag <= u16::MAX as u32 => CONTROL_FULL_6,
            Tag::FullyQualified { .. } => CONTROL_FULL_8,
        };
        control << TAG_CONTROL_SHIFT
    }

    /// Append the tag bytes (not the control byte).
    pub(crate) fn put(self, dst: &mut BytesMut) {
        match self {
            Tag::Anonymous => {}
            Tag::Context(n) => dst.put_u8(n),
            Tag::CommonProfile(n) | Tag::ImplicitProfile(n) => {
                if n <= u16::MAX as u32 {
                    dst.put_u16_le(n as u16);
                } else {
                    dst.put_u32_le(n);
                }
            }
            Tag::FullyQualified {
                vendor_id,
                profile,
                tag,
            } => {
                dst.put_u16_le(vendor_id);
                dst.put_u16_le(profile);
                if tag <= u16::MAX as u32 {
                    dst.put_u16_le(tag as u16);
                } else {
                    dst.put_u32_le(tag);
                }
            }
        }
    }

    /// Decode the tag selected by `control` from the front of `src`.
    pub(crate) fn take(control: u8, src: &mut &[u8]) -> Result<Tag> {
        let tag_control = control >> TAG_CONTROL_SHIFT;
        let tag = match tag_control {
            CONTROL_ANONYMOUS => Tag::Anonymous,
            CONTROL_CONTEXT => {
                ensure(src, 1)?;
                Tag::Context(src.get_u8())
            }
            CONTROL_COMMON_2 => {
                ensure(src, 2)?;
                Tag::CommonProfile(src.get_u16_le() as u32)
            }
            CONTROL_COMMON_4 => {
                ensure(src, 4)?;
                Tag::CommonProfile(src.get_u32_le())
            }
            CONTROL_IMPLICIT_2 => {
                ensure(src, 2)?;
                Tag::ImplicitProfile(src.get_u16_le() as u32)
            }
            CONTROL_IMPLICIT_4 => {
                ensure(src, 4)?;
                Tag::ImplicitProfile(src.get_u32_le())
            }
            CONTROL_FULL_6 => {
                ensure(src, 6)?;
                Tag::FullyQualified {
                    vendor_id: src.get_u16_le(),
                    profile: src.get_u16_le(),
                    tag: src.get_u16_le() as u32,
                }
            }
            _ => {
                debug_assert_eq!(tag_control, CONTROL_FULL_8);
                ensure(src, 8)?;
                Tag::FullyQualified {
                    vendor_id: src.get_u16_le(),
                    profile: src.get_u16_le(),
                    tag: src.get_u32_le(),
                }
            }
        };
        Ok(tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Anonymous => write!(f, "anonymous"),
            Tag::Context(n) => write!(f, "ctx:{n}"),
            Tag::CommonProfile(n) => write!(f, "common:{n}"),
            Tag::ImplicitProfile(n) => write!(f, "implicit:{n}"),
            Tag::FullyQualified {
                vendor_id,
                profile,
                tag,
            } => write!(f, "0x{vendor_id:04x}:0x{profile:04x}:{tag}"),
        }
    }
}

pub(crate) fn ensure(src: &[u8], needed: usize) -> Result<()> {
    if src.remaining() < needed {
        return Err(TlvError::Underrun {
            needed,
            available: src.remaining(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(tag: Tag) -> Tag {
        let mut buf = BytesMut::new();
        tag.put(&mut buf);
        assert_eq!(buf.len(), tag.encoded_len());
        let mut src = &buf[..];
        let decoded = Tag::take(tag.control_bits(), &mut src).unwrap();
        assert!(src.is_empty());
        decoded
    }

    #[test]
    fn every_tag_form_roundtrips() {
        for tag in [
            Tag::Anonymous,
            Tag::Context(0),
            Tag::Context(0xFF),
            Tag::CommonProfile(7),
            Tag::CommonProfile(0x1_0000),
            Tag::ImplicitProfile(42),
            Tag::ImplicitProfile(u32::MAX),
            Tag::FullyQualified {
                vendor_id: 0xFFF1,
                profile: 0xDEED,
                tag: 1,
            },
            Tag::FullyQualified {
                vendor_id: 0xFFF1,
                profile: 0xDEED,
                tag: 0xAA55_FEED,
            },
        ] {
            assert_eq!(roundtrip(tag), tag);
        }
    }

    #[test]
    fn profile_tags_use_smallest_width() {
        assert_eq!(Tag::CommonProfile(0xFFFF).encoded_len(), 2);
        assert_eq!(Tag::CommonProfile(0x1_0000).encoded_len(), 4);
        assert_eq!(
            Tag::FullyQualified {
                vendor_id: 1,
                profile: 2,
                tag: 3
            }
            .encoded_len(),
            6
        );
    }

    #[test]
    fn truncated_tag_is_underrun() {
        let mut src: &[u8] = &[0x01];
        let err = Tag::take(CONTROL_COMMON_4 << TAG_CONTROL_SHIFT, &mut src).unwrap_err();
        assert!(matches!(err, TlvError::Underrun { needed: 4, .. }));
    }

    #[test]
    fn display_forms() {
        assert_eq!(Tag::Context(3).to_string(), "ctx:3");
        assert_eq!(Tag::Anonymous.to_string(), "anonymous");
    }
}
