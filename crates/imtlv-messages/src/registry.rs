use bytes::Bytes;
use imtlv_codec::Parser;
use imtlv_schema::Schema;
use imtlv_stream::TlvConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::attribute_data::AttributeData;
use crate::attribute_status::AttributeStatus;
use crate::config::RegistryConfig;
use crate::error::{MessageError, Result};
use crate::message::Message;
use crate::path::AttributePath;
use crate::status::Status;
use crate::status_response::StatusResponse;
use crate::write_request::WriteRequest;
use crate::write_response::WriteResponse;

type EncodeFn = fn(&Value, TlvConfig) -> Result<Bytes>;
type DecodeFn = fn(&[u8], TlvConfig, bool) -> Result<Value>;

#[derive(Clone, Copy)]
struct Entry {
    name: &'static str,
    schema: &'static Schema,
    encode: EncodeFn,
    decode: DecodeFn,
}

/// Name-keyed registry of message kinds.
///
/// Lookups are case-insensitive and accept either the registry name
/// (`write-response`) or the schema name (`WriteResponseMessage`).
pub struct SchemaRegistry {
    entries: Vec<Entry>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Registry of every built-in message, default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Registry of every built-in message, explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self::empty(config);
        registry.register::<WriteResponse>();
        registry.register::<WriteRequest>();
        registry.register::<StatusResponse>();
        registry.register::<AttributeStatus>();
        registry.register::<AttributeData>();
        registry.register::<AttributePath>();
        registry.register::<Status>();
        registry
    }

    /// Registry with no messages.
    pub fn empty(config: RegistryConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    /// Add a message kind. A later registration under the same name wins.
    pub fn register<M: Message>(&mut self) {
        self.entries.retain(|entry| entry.name != M::NAME);
        self.entries.push(Entry {
            name: M::NAME,
            schema: M::schema(),
            encode: encode_json::<M>,
            decode: decode_json::<M>,
        });
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.entry(name).is_ok()
    }

    pub fn schema(&self, name: &str) -> Result<&'static Schema> {
        self.entry(name).map(|entry| entry.schema)
    }

    /// Encode a JSON model of message `name`.
    pub fn encode(&self, name: &str, value: &Value) -> Result<Bytes> {
        let entry = self.entry(name)?;
        (entry.encode)(value, self.config.tlv)
    }

    /// Decode message `name` into its JSON model.
    ///
    /// Runs the schema check first when `validate_on_decode` is set.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<Value> {
        self.decode_with(name, bytes, self.config.validate_on_decode)
    }

    /// Decode with an explicit choice about the schema check.
    pub fn decode_with(&self, name: &str, bytes: &[u8], validate: bool) -> Result<Value> {
        let entry = self.entry(name)?;
        (entry.decode)(bytes, self.config.tlv, validate)
    }

    /// Check `bytes` against the schema of message `name` without decoding.
    pub fn validate(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let entry = self.entry(name)?;
        let parser = Parser::from_message(entry.schema, bytes, self.config.tlv)?;
        parser.check_schema_validity().map_err(|err| {
            debug!(message = entry.name, error = %err, "schema check failed");
            MessageError::from(err)
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn entry(&self, name: &str) -> Result<&Entry> {
        self.entries
            .iter()
            .find(|entry| {
                entry.name.eq_ignore_ascii_case(name) || entry.schema.name.eq_ignore_ascii_case(name)
            })
            .ok_or_else(|| MessageError::UnknownMessage(name.to_string()))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_json<M: Message>(value: &Value, config: TlvConfig) -> Result<Bytes> {
    let message = M::deserialize(value)?;
    message.encode(config)
}

fn decode_json<M: Message>(bytes: &[u8], config: TlvConfig, validate: bool) -> Result<Value> {
    let message = if validate {
        M::decode(bytes, config)?
    } else {
        M::decode_unchecked(bytes, config)?
    };
    Ok(serde_json::to_value(message)?)
}
