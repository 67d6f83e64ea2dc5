use std::fmt;

use imtlv_schema::{FieldKind, Layout, Schema, SchemaError, TagSet};
use imtlv_stream::{ContainerType, Tag, TlvType, TlvWriter, Value};

use crate::encoder::Encoder;
use crate::error::{CodecError, Result};

/// Lifecycle of one builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// A failure was recorded; every further call is a no-op.
    Error,
    /// Created but no container opened yet.
    Reserved,
    /// Container open; writes and child creation allowed.
    InProgress,
    /// Container closed.
    Success,
}

impl BuilderState {
    pub fn as_str(self) -> &'static str {
        match self {
            BuilderState::Error => "error",
            BuilderState::Reserved => "reserved",
            BuilderState::InProgress => "in-progress",
            BuilderState::Success => "success",
        }
    }
}

impl fmt::Display for BuilderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema-checked writer for one container.
///
/// Writes return `&mut Self` so they chain; a failed write records its error
/// in the shared [`Encoder`] and surfaces from [`Builder::end`]. A child
/// builder borrows the encoder from its parent, so the parent cannot be used
/// until the child is dropped.
#[derive(Debug)]
pub struct Builder<'e> {
    encoder: &'e mut Encoder,
    schema: &'static Schema,
    state: BuilderState,
    /// Encoder depth while this builder's container is open.
    level: usize,
}

impl<'e> Builder<'e> {
    /// Reserve a builder for a container at the encoder's current position.
    pub fn new(encoder: &'e mut Encoder, schema: &'static Schema) -> Self {
        let level = encoder.depth() + 1;
        Self {
            encoder,
            schema,
            state: BuilderState::Reserved,
            level,
        }
    }

    /// Reserve a builder and open its container. A failure is kept and
    /// returned by [`Builder::end`].
    pub fn open(encoder: &'e mut Encoder, schema: &'static Schema, tag: Tag) -> Self {
        let mut builder = Self::new(encoder, schema);
        // The failure is sticky in the encoder.
        let _ = builder.init(tag);
        builder
    }

    /// Open the container described by the schema.
    pub fn init(&mut self, tag: Tag) -> Result<()> {
        if let Some(err) = self.encoder.failure() {
            let err = err.clone();
            return Err(self.fail(err));
        }
        if self.state != BuilderState::Reserved {
            let err = CodecError::InvalidState {
                context: "init",
                state: self.state,
            };
            return Err(self.fail(err));
        }
        self.level = self.encoder.depth() + 1;
        match self.encoder.open(tag, self.schema) {
            Ok(()) => {
                self.state = BuilderState::InProgress;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// The failure shared by this builder tree, if any.
    pub fn error(&self) -> Option<&CodecError> {
        self.encoder.failure()
    }

    pub fn put_unsigned(&mut self, tag: u8, value: u64) -> &mut Self {
        self.put_field("put_unsigned", tag, TlvType::UnsignedInteger, |w, t| {
            w.put_unsigned(t, value)
        })
    }

    pub fn put_signed(&mut self, tag: u8, value: i64) -> &mut Self {
        self.put_field("put_signed", tag, TlvType::SignedInteger, |w, t| {
            w.put_signed(t, value)
        })
    }

    pub fn put_bool(&mut self, tag: u8, value: bool) -> &mut Self {
        self.put_field("put_bool", tag, TlvType::Boolean, |w, t| {
            w.put_bool(t, value)
        })
    }

    pub fn put_f32(&mut self, tag: u8, value: f32) -> &mut Self {
        self.put_field("put_f32", tag, TlvType::FloatingPoint, |w, t| {
            w.put_f32(t, value)
        })
    }

    pub fn put_f64(&mut self, tag: u8, value: f64) -> &mut Self {
        self.put_field("put_f64", tag, TlvType::FloatingPoint, |w, t| {
            w.put_f64(t, value)
        })
    }

    pub fn put_str(&mut self, tag: u8, value: &str) -> &mut Self {
        self.put_field("put_str", tag, TlvType::Utf8String, |w, t| {
            w.put_str(t, value)
        })
    }

    pub fn put_bytes(&mut self, tag: u8, value: &[u8]) -> &mut Self {
        self.put_field("put_bytes", tag, TlvType::ByteString, |w, t| {
            w.put_bytes(t, value)
        })
    }

    pub fn put_null(&mut self, tag: u8) -> &mut Self {
        self.put_field("put_null", tag, TlvType::Null, |w, t| w.put_null(t))
    }

    pub fn push_unsigned(&mut self, value: u64) -> &mut Self {
        self.push_element("push_unsigned", TlvType::UnsignedInteger, |w| {
            w.put_unsigned(Tag::Anonymous, value)
        })
    }

    pub fn push_signed(&mut self, value: i64) -> &mut Self {
        self.push_element("push_signed", TlvType::SignedInteger, |w| {
            w.put_signed(Tag::Anonymous, value)
        })
    }

    pub fn push_bool(&mut self, value: bool) -> &mut Self {
        self.push_element("push_bool", TlvType::Boolean, |w| {
            w.put_bool(Tag::Anonymous, value)
        })
    }

    pub fn push_f32(&mut self, value: f32) -> &mut Self {
        self.push_element("push_f32", TlvType::FloatingPoint, |w| {
            w.put_f32(Tag::Anonymous, value)
        })
    }

    pub fn push_f64(&mut self, value: f64) -> &mut Self {
        self.push_element("push_f64", TlvType::FloatingPoint, |w| {
            w.put_f64(Tag::Anonymous, value)
        })
    }

    pub fn push_str(&mut self, value: &str) -> &mut Self {
        self.push_element("push_str", TlvType::Utf8String, |w| {
            w.put_str(Tag::Anonymous, value)
        })
    }

    pub fn push_bytes(&mut self, value: &[u8]) -> &mut Self {
        self.push_element("push_bytes", TlvType::ByteString, |w| {
            w.put_bytes(Tag::Anonymous, value)
        })
    }

    pub fn push_null(&mut self) -> &mut Self {
        self.push_element("push_null", TlvType::Null, |w| w.put_null(Tag::Anonymous))
    }

    /// Write a primitive under any tag form.
    ///
    /// Context tags get the same checks as `put_*`, anonymous tags the same
    /// checks as `push_*`. Profile tags are only taken by open schemas with
    /// named fields. Containers go through [`Builder::create_tagged`].
    pub fn put_value(&mut self, tag: Tag, value: &Value<'_>) -> &mut Self {
        self.guard("put_value", |b| {
            let found = value.tlv_type();
            if let Value::Container(_) = value {
                return Err(CodecError::WrongTlvType {
                    schema: b.schema.name,
                    field: "value",
                    expected: "primitive",
                    found,
                });
            }
            b.claim_tag(tag, found, None)?;
            let schema = b.schema.name;
            let w = b.encoder.writer_mut();
            let written = match *value {
                Value::Signed(v) => w.put_signed(tag, v),
                Value::Unsigned(v) => w.put_unsigned(tag, v),
                Value::Bool(v) => w.put_bool(tag, v),
                Value::F32(v) => w.put_f32(tag, v),
                Value::F64(v) => w.put_f64(tag, v),
                Value::Utf8(v) => w.put_str(tag, v),
                Value::Bytes(v) => w.put_bytes(tag, v),
                Value::Null | Value::Container(_) => w.put_null(tag),
            };
            written.map_err(|source| CodecError::Encoding {
                context: schema,
                source,
            })
        })
    }

    /// Open a child container under any tag form; see [`Builder::put_value`].
    pub fn create_tagged(&mut self, tag: Tag, schema: &'static Schema) -> Builder<'_> {
        let result = self
            .ready("create_tagged")
            .and_then(|()| self.claim_tag(tag, schema.container.tlv_type(), Some(schema)))
            .and_then(|()| self.encoder.open(tag, schema));
        self.child(schema, result)
    }

    /// Open a context-tagged child container and return its builder.
    pub fn create_child(&mut self, tag: u8, schema: &'static Schema) -> Builder<'_> {
        let result = self
            .ready("create_child")
            .and_then(|()| self.claim_field(tag, schema.container.tlv_type(), Some(schema)))
            .and_then(|()| self.encoder.open(Tag::Context(tag), schema));
        self.child(schema, result)
    }

    /// Append one anonymous element container to a collection.
    pub fn create_element(&mut self, schema: &'static Schema) -> Builder<'_> {
        let result = self
            .ready("create_element")
            .and_then(|()| self.claim_element(schema.container.tlv_type(), Some(schema)))
            .and_then(|()| self.encoder.open(Tag::Anonymous, schema));
        self.child(schema, result)
    }

    /// Re-attach to the child container opened with `create_child(tag, schema)`
    /// that is still open.
    pub fn get_child(&mut self, tag: u8, schema: &'static Schema) -> Builder<'_> {
        let result = self.reattach(tag, schema);
        self.child(schema, result)
    }

    /// Close the container.
    ///
    /// Fails if a child container is still open or a mandatory field was
    /// never written. If any builder of the tree failed, returns that failure
    /// and leaves the buffer untouched.
    pub fn end(&mut self) -> Result<()> {
        let result = self
            .ready("end")
            .and_then(|()| self.check_complete())
            .and_then(|()| self.encoder.close(self.schema));
        match result {
            Ok(()) => {
                self.state = BuilderState::Success;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Run `op` only if the builder can write; record its failure.
    fn guard(
        &mut self,
        context: &'static str,
        op: impl FnOnce(&mut Self) -> Result<()>,
    ) -> &mut Self {
        if let Err(err) = self.ready(context).and_then(|()| op(self)) {
            self.fail(err);
        }
        self
    }

    fn put_field(
        &mut self,
        context: &'static str,
        tag: u8,
        found: TlvType,
        write: impl FnOnce(&mut TlvWriter, Tag) -> imtlv_stream::Result<()>,
    ) -> &mut Self {
        self.guard(context, |b| {
            b.claim_field(tag, found, None)?;
            let schema = b.schema.name;
            write(b.encoder.writer_mut(), Tag::Context(tag)).map_err(|source| {
                CodecError::Encoding {
                    context: schema,
                    source,
                }
            })
        })
    }

    fn push_element(
        &mut self,
        context: &'static str,
        found: TlvType,
        write: impl FnOnce(&mut TlvWriter) -> imtlv_stream::Result<()>,
    ) -> &mut Self {
        self.guard(context, |b| {
            b.claim_element(found, None)?;
            let schema = b.schema.name;
            write(b.encoder.writer_mut()).map_err(|source| CodecError::Encoding {
                context: schema,
                source,
            })
        })
    }

    fn ready(&self, context: &'static str) -> Result<()> {
        if let Some(err) = self.encoder.failure() {
            return Err(err.clone());
        }
        if self.state != BuilderState::InProgress {
            return Err(CodecError::InvalidState {
                context,
                state: self.state,
            });
        }
        if self.encoder.depth() > self.level {
            let open = self
                .encoder
                .frame(self.level + 1)
                .map_or(self.schema.name, |frame| frame.schema.name);
            return Err(CodecError::ChildInProgress { schema: open });
        }
        Ok(())
    }

    fn fail(&mut self, err: CodecError) -> CodecError {
        self.state = BuilderState::Error;
        self.encoder.fail(err)
    }

    fn seen(&self) -> TagSet {
        self.encoder
            .frame(self.level)
            .map(|frame| frame.seen)
            .unwrap_or_default()
    }

    /// Profile tags are not tracked for duplicates.
    fn claim_tag(
        &mut self,
        tag: Tag,
        found: TlvType,
        nested: Option<&'static Schema>,
    ) -> Result<()> {
        let named = matches!(self.schema.layout, Layout::Fields(_));
        match tag {
            Tag::Context(n) => self.claim_field(n, found, nested),
            Tag::Anonymous => self.claim_element(found, nested),
            _ if named && self.schema.is_open() => Ok(()),
            _ => Err(SchemaError::UnknownTag {
                schema: self.schema.name,
                tag,
            }
            .into()),
        }
    }

    /// Check a context-tagged write against the schema and mark the tag seen.
    fn claim_field(
        &mut self,
        tag: u8,
        found: TlvType,
        nested: Option<&'static Schema>,
    ) -> Result<()> {
        let schema = self.schema;
        let unknown = SchemaError::UnknownTag {
            schema: schema.name,
            tag: Tag::Context(tag),
        };
        if let Layout::Elements(_) = schema.layout {
            return Err(unknown.into());
        }

        let seen = self.seen();
        if seen.contains(tag) {
            return Err(SchemaError::DuplicateTag {
                schema: schema.name,
                tag: Tag::Context(tag),
            }
            .into());
        }

        match schema.field_by_tag(tag) {
            Some((index, field)) => {
                let matches = match (field.kind, nested) {
                    (FieldKind::Nested(expected), Some(child)) => std::ptr::eq(expected, child),
                    _ => field.accepts(found),
                };
                if !matches {
                    return Err(SchemaError::WrongTlvType {
                        schema: schema.name,
                        field: field.name,
                        expected: field.kind.describe(),
                        found,
                    }
                    .into());
                }
                let skipped = schema.fields()[..index]
                    .iter()
                    .any(|earlier| earlier.is_mandatory() && !seen.contains(earlier.tag));
                if skipped {
                    return Err(CodecError::OutOfOrder {
                        schema: schema.name,
                        field: field.name,
                    });
                }
            }
            None if schema.is_open() => {}
            None => return Err(unknown.into()),
        }

        if let Some(frame) = self.encoder.frame_mut(self.level) {
            frame.seen.insert(tag);
        }
        Ok(())
    }

    /// Check an anonymous element write against the schema.
    fn claim_element(&self, found: TlvType, nested: Option<&'static Schema>) -> Result<()> {
        let schema = self.schema;
        let kind = match schema.layout {
            Layout::Elements(kind) => kind,
            // Open lists take anonymous members of any type.
            Layout::Fields(_) if schema.is_open() && schema.container == ContainerType::List => {
                FieldKind::Any
            }
            Layout::Fields(_) => {
                return Err(SchemaError::UnknownTag {
                    schema: schema.name,
                    tag: Tag::Anonymous,
                }
                .into())
            }
        };
        let matches = match (kind, nested) {
            (FieldKind::Nested(expected), Some(child)) => std::ptr::eq(expected, child),
            _ => kind.accepts(found),
        };
        if !matches {
            return Err(SchemaError::WrongTlvType {
                schema: schema.name,
                field: "element",
                expected: kind.describe(),
                found,
            }
            .into());
        }
        Ok(())
    }

    fn reattach(&self, tag: u8, schema: &'static Schema) -> Result<()> {
        if let Some(err) = self.encoder.failure() {
            return Err(err.clone());
        }
        if self.state != BuilderState::InProgress {
            return Err(CodecError::InvalidState {
                context: "get_child",
                state: self.state,
            });
        }
        let open = self
            .encoder
            .frame(self.level + 1)
            .filter(|_| self.encoder.depth() == self.level + 1);
        match open {
            Some(frame) if frame.tag == Tag::Context(tag) && std::ptr::eq(frame.schema, schema) => {
                Ok(())
            }
            _ => Err(CodecError::EndOfTlv {
                schema: self.schema.name,
                field: self
                    .schema
                    .field_by_tag(tag)
                    .map_or("unknown", |(_, field)| field.name),
            }),
        }
    }

    fn check_complete(&self) -> Result<()> {
        let seen = self.seen();
        match self
            .schema
            .mandatory_fields()
            .find(|field| !seen.contains(field.tag))
        {
            Some(missing) => Err(SchemaError::MissingMandatoryField {
                schema: self.schema.name,
                field: missing.name,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn child(&mut self, schema: &'static Schema, result: Result<()>) -> Builder<'_> {
        let state = match result {
            Ok(()) => BuilderState::InProgress,
            Err(err) => {
                self.fail(err);
                BuilderState::Error
            }
        };
        Builder {
            encoder: &mut *self.encoder,
            schema,
            state,
            level: self.level + 1,
        }
    }
}
