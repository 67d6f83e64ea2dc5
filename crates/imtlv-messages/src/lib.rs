//! Interaction Model messages on top of the schema-checked TLV codec.
//!
//! Every message and information block (IB) comes in three parts:
//!
//! - a static [`Schema`](imtlv_schema::Schema) (`WRITE_RESPONSE_MESSAGE`,
//!   `ATTRIBUTE_STATUS_IB`, ...);
//! - a typed builder and parser pair wrapping the generic codec
//!   ([`WriteResponseBuilder`], [`WriteResponseParser`], ...);
//! - an owned serde model implementing [`Message`] ([`WriteResponse`], ...).
//!
//! Message schemas are open, so fields added by newer senders are skipped.
//! IB schemas are closed. [`SchemaRegistry`] looks messages up by name for
//! tools that work with JSON.

pub mod attribute_data;
pub mod attribute_status;
pub mod config;
pub mod data;
pub mod error;
pub mod message;
pub mod path;
pub mod registry;
pub mod status;
pub mod status_code;
pub mod status_response;
pub mod write_request;
pub mod write_response;

pub use attribute_data::{
    AttributeData, AttributeDataBuilder, AttributeDataListBuilder, AttributeDataListParser,
    AttributeDataParser, ATTRIBUTE_DATA_IB, ATTRIBUTE_DATA_IBS,
};
pub use attribute_status::{
    AttributeStatus, AttributeStatusBuilder, AttributeStatusParser, AttributeStatusesBuilder,
    AttributeStatusesParser, ATTRIBUTE_STATUS_IB, ATTRIBUTE_STATUS_IBS,
};
pub use config::RegistryConfig;
pub use data::{DataMember, DataValue};
pub use error::{MessageError, Result};
pub use message::Message;
pub use path::{
    AttributePath, AttributePathBuilder, AttributePathParser, ListIndex, ATTRIBUTE_PATH_IB,
};
pub use registry::SchemaRegistry;
pub use status::{Status, StatusBuilder, StatusParser, STATUS_IB};
pub use status_code::StatusCode;
pub use status_response::{
    StatusResponse, StatusResponseBuilder, StatusResponseParser, STATUS_RESPONSE_MESSAGE,
};
pub use write_request::{
    WriteRequest, WriteRequestBuilder, WriteRequestParser, WRITE_REQUEST_MESSAGE,
};
pub use write_response::{
    WriteResponse, WriteResponseBuilder, WriteResponseParser, WRITE_RESPONSE_MESSAGE,
};
