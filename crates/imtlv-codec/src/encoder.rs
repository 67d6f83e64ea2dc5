use bytes::Bytes;
use imtlv_schema::{Schema, TagSet};
use imtlv_stream::{Tag, TlvConfig, TlvWriter};
use tracing::{debug, trace};

use crate::error::{CodecError, Result};

/// Bookkeeping for one open container.
#[derive(Debug)]
pub(crate) struct Frame {
    pub(crate) schema: &'static Schema,
    pub(crate) tag: Tag,
    pub(crate) seen: TagSet,
}

/// Exclusively owned output buffer shared by one tree of builders.
///
/// The first failure of any builder is recorded here. From then on every
/// write through any builder of the tree is a no-op and every `end()` returns
/// that failure.
#[derive(Debug)]
pub struct Encoder {
    writer: TlvWriter,
    frames: Vec<Frame>,
    failure: Option<CodecError>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::with_config(TlvConfig::default())
    }

    pub fn with_config(config: TlvConfig) -> Self {
        Self {
            writer: TlvWriter::with_config(config),
            frames: Vec::with_capacity(config.max_depth),
            failure: None,
        }
    }

    /// The sticky failure, if any builder has failed.
    pub fn failure(&self) -> Option<&CodecError> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.writer.as_bytes()
    }

    /// Number of containers still open.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn config(&self) -> &TlvConfig {
        self.writer.config()
    }

    /// Consume the encoder and return the finished message.
    pub fn finish(self) -> Result<Bytes> {
        if let Some(err) = self.failure {
            return Err(err);
        }
        self.writer
            .finish()
            .map_err(|source| CodecError::Encoding {
                context: "finish",
                source,
            })
    }

    /// Record a failure unless one is already recorded, and return the
    /// failure that is now sticky.
    pub(crate) fn fail(&mut self, err: CodecError) -> CodecError {
        match &self.failure {
            Some(first) => first.clone(),
            None => {
                debug!(error = %err, depth = self.frames.len(), "encoder failed");
                self.failure = Some(err.clone());
                err
            }
        }
    }

    pub(crate) fn writer_mut(&mut self) -> &mut TlvWriter {
        &mut self.writer
    }

    pub(crate) fn frame(&self, level: usize) -> Option<&Frame> {
        level.checked_sub(1).and_then(|i| self.frames.get(i))
    }

    pub(crate) fn frame_mut(&mut self, level: usize) -> Option<&mut Frame> {
        level.checked_sub(1).and_then(|i| self.frames.get_mut(i))
    }

    /// Open a container described by `schema`.
    pub(crate) fn open(&mut self, tag: Tag, schema: &'static Schema) -> Result<()> {
        self.writer
            .start_container(tag, schema.container)
            .map_err(|source| CodecError::Encoding {
                context: schema.name,
                source,
            })?;
        self.frames.push(Frame {
            schema,
            tag,
            seen: TagSet::new(),
        });
        trace!(schema = schema.name, %tag, depth = self.frames.len(), "builder opened");
        Ok(())
    }

    /// Close the innermost container.
    pub(crate) fn close(&mut self, schema: &'static Schema) -> Result<()> {
        self.writer
            .end_container(schema.container)
            .map_err(|source| CodecError::Encoding {
                context: schema.name,
                source,
            })?;
        let fields = self.frames.pop().map_or(0, |frame| frame.seen.count());
        trace!(
            schema = schema.name,
            depth = self.frames.len(),
            fields,
            "builder closed"
        );
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}
