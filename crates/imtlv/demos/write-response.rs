//! Build a write response with the typed builders, then read it back.
//!
//! Run with:
//!   cargo run --example write-response
//!
//! Inspect the printed bytes with:
//!   cargo run --features cli -- dump --format pretty --hex <HEX>

use imtlv::codec::Encoder;
use imtlv::messages::{
    AttributePath, Status, StatusCode, WriteResponse, WriteResponseBuilder, WriteResponseParser,
};
use imtlv::stream::TlvConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut encoder = Encoder::new();
    let mut response = WriteResponseBuilder::open(&mut encoder);
    {
        let mut statuses = response.create_write_responses();
        let outcomes = [
            (0x0000, StatusCode::Success),
            (0x4003, StatusCode::UnsupportedWrite),
        ];
        for (attribute, status) in outcomes {
            let mut entry = statuses.create_attribute_status();
            AttributePath::new(1, 0x0006, attribute).write(&mut entry.create_path())?;
            Status::new(status).write(&mut entry.create_status())?;
            entry.end_of_attribute_status()?;
        }
        statuses.end_of_attribute_statuses()?;
    }
    response.interaction_model_revision(11);
    response.end_of_write_response()?;
    let bytes = encoder.finish()?;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    println!("{hex}");

    let parser = WriteResponseParser::from_message(&bytes, TlvConfig::default())?;
    parser.check_schema_validity()?;
    let decoded = WriteResponse::read(&parser)?;
    for status in &decoded.write_responses {
        eprintln!(
            "attribute 0x{:04x}: {}",
            status.path.attribute.unwrap_or_default(),
            status.status.status
        );
    }
    Ok(())
}
