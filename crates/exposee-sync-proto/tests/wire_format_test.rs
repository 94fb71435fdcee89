use exposee_sync_proto::{ProtoExposedList, ProtoExposee};
use prost::Message;

#[test]
fn test_empty_list_encodes_to_empty_body() {
    let list = ProtoExposedList::default();
    assert!(list.encode_to_vec().is_empty());

    let decoded = ProtoExposedList::decode(&[][..]).unwrap();
    assert!(decoded.exposed.is_empty());
}

#[test]
fn test_field_tags_match_schema() {
    let list = ProtoExposedList {
        exposed: vec![ProtoExposee {
            key: vec![0xAA, 0xBB],
            key_date: 1,
        }],
    };
    let bytes = list.encode_to_vec();

    // exposed (field 1, length-delimited) wrapping key (field 1, bytes) and keyDate (field 2, varint)
    assert_eq!(
        bytes,
        vec![0x0A, 0x06, 0x0A, 0x02, 0xAA, 0xBB, 0x10, 0x01],
        "wire layout drifted from proto/exposed.proto"
    );
}

#[test]
fn test_negative_key_date_survives_wire() {
    let list = ProtoExposedList {
        exposed: vec![ProtoExposee {
            key: vec![1; 32],
            key_date: -86_400_000,
        }],
    };
    let decoded = ProtoExposedList::decode(list.encode_to_vec().as_slice()).unwrap();
    assert_eq!(decoded.exposed[0].key_date, -86_400_000);
}
