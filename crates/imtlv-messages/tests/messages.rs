use imtlv_codec::{CodecError, Encoder};
use imtlv_messages::{
    AttributeData, AttributePath, AttributePathBuilder, AttributeStatus, DataValue, ListIndex,
    Message, SchemaRegistry, Status, StatusCode, StatusResponse, StatusResponseParser,
    WriteRequest, WriteResponse, WriteResponseBuilder, WriteResponseParser,
};
use imtlv_schema::SchemaError;
use imtlv_stream::{ContainerType, Tag, TlvConfig, TlvError, TlvWriter};

fn config() -> TlvConfig {
    TlvConfig::default()
}

fn on_off_path(endpoint: u16) -> AttributePath {
    AttributePath::new(endpoint, 0x0006, 0x0000)
}

#[test]
fn every_registered_message_round_trips() {
    let write_response = WriteResponse {
        write_responses: vec![AttributeStatus::new(on_off_path(1), StatusCode::Success)],
        interaction_model_revision: Some(11),
    };
    let write_request = WriteRequest {
        suppress_response: Some(true),
        timed_request: false,
        write_requests: vec![AttributeData::new(on_off_path(1), DataValue::Bool(true))],
        more_chunked_messages: None,
        interaction_model_revision: Some(11),
    };
    let path = AttributePath {
        node: Some(42),
        list_index: Some(ListIndex::Index(3)),
        ..on_off_path(2)
    };

    let registry = SchemaRegistry::new();
    let models = [
        ("write-response", serde_json::to_value(&write_response).unwrap()),
        ("write-request", serde_json::to_value(&write_request).unwrap()),
        (
            "status-response",
            serde_json::to_value(StatusResponse::new(StatusCode::Busy)).unwrap(),
        ),
        (
            "attribute-status",
            serde_json::to_value(AttributeStatus::new(path.clone(), StatusCode::Failure)).unwrap(),
        ),
        (
            "attribute-data",
            serde_json::to_value(AttributeData::new(path.clone(), DataValue::Signed(-7))).unwrap(),
        ),
        ("attribute-path", serde_json::to_value(&path).unwrap()),
        (
            "status",
            serde_json::to_value(Status {
                status: StatusCode::Failure,
                cluster_status: Some(3),
            })
            .unwrap(),
        ),
    ];

    for (name, model) in models {
        let bytes = registry.encode(name, &model).unwrap();
        registry.validate(name, &bytes).unwrap();
        assert_eq!(registry.decode(name, &bytes).unwrap(), model, "{name}");
    }
}

#[test]
fn duplicate_tag_fails_validity_but_lookup_returns_first() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Structure)
        .unwrap();
    w.put_unsigned(Tag::Context(0), 0x00).unwrap();
    w.put_unsigned(Tag::Context(0), 0x01).unwrap();
    w.end_container(ContainerType::Structure).unwrap();
    let bytes = w.finish().unwrap();

    let parser = StatusResponseParser::from_message(&bytes, config()).unwrap();
    assert_eq!(
        parser.check_schema_validity(),
        Err(CodecError::Schema(SchemaError::DuplicateTag {
            schema: "StatusResponseMessage",
            tag: Tag::Context(0),
        }))
    );
    assert_eq!(parser.get_status().unwrap(), StatusCode::Success);
}

#[test]
fn missing_mandatory_field() {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Structure)
        .unwrap();
    w.put_unsigned(Tag::Context(0xFF), 11).unwrap();
    w.end_container(ContainerType::Structure).unwrap();
    let bytes = w.finish().unwrap();

    let parser = WriteResponseParser::from_message(&bytes, config()).unwrap();
    assert_eq!(
        parser.check_schema_validity(),
        Err(CodecError::Schema(SchemaError::MissingMandatoryField {
            schema: "WriteResponseMessage",
            field: "WriteResponses",
        }))
    );
    assert!(matches!(
        parser.get_write_responses(),
        Err(CodecError::EndOfTlv {
            schema: "WriteResponseMessage",
            field: "WriteResponses",
        })
    ));
    assert_eq!(parser.get_interaction_model_revision().unwrap(), 11);
}

/// Write response with one status, plus `extra` written into the status IB
/// after its mandatory fields.
fn write_response_bytes(top_level_extra: bool, nested_extra: bool) -> bytes::Bytes {
    let mut w = TlvWriter::new();
    w.start_container(Tag::Anonymous, ContainerType::Structure)
        .unwrap();
    w.start_container(Tag::Context(0), ContainerType::Array)
        .unwrap();
    w.start_container(Tag::Anonymous, ContainerType::Structure)
        .unwrap();
    w.start_container(Tag::Context(0), ContainerType::List)
        .unwrap();
    w.put_unsigned(Tag::Context(2), 1).unwrap();
    w.end_container(ContainerType::List).unwrap();
    w.start_container(Tag::Context(1), ContainerType::Structure)
        .unwrap();
    w.put_unsigned(Tag::Context(0), 0).unwrap();
    w.end_container(ContainerType::Structure).unwrap();
    if nested_extra {
        w.put_unsigned(Tag::Context(7), 1).unwrap();
    }
    w.end_container(ContainerType::Structure).unwrap();
    w.end_container(ContainerType::Array).unwrap();
    if top_level_extra {
        w.put_str(Tag::Context(7), "from the future").unwrap();
    }
    w.end_container(ContainerType::Structure).unwrap();
    w.finish().unwrap()
}

#[test]
fn unknown_top_level_tag_is_skipped() {
    let bytes = write_response_bytes(true, false);
    let parser = WriteResponseParser::from_message(&bytes, config()).unwrap();
    parser.check_schema_validity().unwrap();
    let response = WriteResponse::decode(&bytes, config()).unwrap();
    assert_eq!(response.write_responses.len(), 1);
    assert_eq!(response.write_responses[0].path.endpoint, Some(1));
}

#[test]
fn unknown_tag_inside_closed_ib_is_rejected() {
    let bytes = write_response_bytes(false, true);
    let parser = WriteResponseParser::from_message(&bytes, config()).unwrap();
    assert_eq!(
        parser.check_schema_validity(),
        Err(CodecError::Schema(SchemaError::UnknownTag {
            schema: "AttributeStatusIB",
            tag: Tag::Context(7),
        }))
    );
}

#[test]
fn unknown_top_level_tag_can_be_built() {
    let mut encoder = Encoder::new();
    let mut response = WriteResponseBuilder::open(&mut encoder);
    response
        .create_write_responses()
        .end_of_attribute_statuses()
        .unwrap();
    response.end_of_write_response().unwrap();
    let known = encoder.finish().unwrap();

    let mut encoder = Encoder::new();
    let mut builder = imtlv_codec::Builder::open(
        &mut encoder,
        &imtlv_messages::WRITE_RESPONSE_MESSAGE,
        Tag::Anonymous,
    );
    builder
        .create_child(0, &imtlv_messages::ATTRIBUTE_STATUS_IBS)
        .end()
        .unwrap();
    builder.put_bool(0x20, true);
    builder.end().unwrap();
    let extended = encoder.finish().unwrap();

    assert!(extended.len() > known.len());
    assert_eq!(
        WriteResponse::decode(&extended, config()).unwrap(),
        WriteResponse::decode(&known, config()).unwrap()
    );
}

#[test]
fn list_elements_come_back_in_order() {
    let statuses: Vec<AttributeStatus> = (0..5u16)
        .map(|i| AttributeStatus::new(on_off_path(i), StatusCode::from(i as u8)))
        .collect();
    let response = WriteResponse {
        write_responses: statuses.clone(),
        interaction_model_revision: None,
    };
    let bytes = response.encode(config()).unwrap();

    let parser = WriteResponseParser::from_message(&bytes, config()).unwrap();
    parser.check_schema_validity().unwrap();
    let mut list = parser.get_write_responses().unwrap();
    for expected in &statuses {
        let status = list.next_attribute_status().unwrap().unwrap();
        assert_eq!(
            status.get_path().unwrap().get_endpoint().unwrap(),
            expected.path.endpoint.unwrap()
        );
        assert_eq!(
            status.get_status().unwrap().get_status().unwrap(),
            expected.status.status
        );
    }
    assert!(list.next_attribute_status().unwrap().is_none());
    assert!(list.next_attribute_status().unwrap().is_none());
}

#[test]
fn exhausted_buffer_short_circuits_later_writes() {
    let mut encoder = Encoder::with_config(TlvConfig::with_max_encoded_len(8));
    let mut path = AttributePathBuilder::open(&mut encoder);
    path.enable_tag_compression(false).node(1).endpoint(1);
    let err = path.end_of_attribute_path().unwrap_err();
    assert!(matches!(
        err,
        CodecError::Encoding {
            source: TlvError::BufferTooSmall { .. },
            ..
        }
    ));

    path.cluster(6).attribute(0);
    assert_eq!(path.end_of_attribute_path(), Err(err.clone()));
    assert_eq!(
        encoder.as_bytes(),
        &[0x17, 0x28, 0x00, 0x24, 0x01, 0x01]
    );
    assert_eq!(encoder.finish(), Err(err));
}

#[test]
fn write_response_with_success_and_failure() {
    let response = WriteResponse {
        write_responses: vec![
            AttributeStatus::new(on_off_path(1), StatusCode::Success),
            AttributeStatus::new(
                AttributePath::new(1, 0x0028, 0x0005),
                Status {
                    status: StatusCode::Failure,
                    cluster_status: Some(0x02),
                },
            ),
        ],
        interaction_model_revision: Some(11),
    };

    let bytes = response.encode(config()).unwrap();
    let parser = WriteResponseParser::from_message(&bytes, config()).unwrap();
    parser.check_schema_validity().unwrap();

    let decoded = WriteResponse::read(&parser).unwrap();
    assert_eq!(decoded, response);
    let outcomes: Vec<bool> = decoded
        .write_responses
        .iter()
        .map(AttributeStatus::is_success)
        .collect();
    assert_eq!(outcomes, vec![true, false]);
}

#[test]
fn truncated_message_is_corrupt() {
    let bytes = StatusResponse::new(StatusCode::Success)
        .encode(config())
        .unwrap();
    let err = StatusResponse::decode(&bytes[..bytes.len() - 1], config()).unwrap_err();
    assert!(err.is_corrupt());
    assert!(!err.is_schema_violation());
}
