//! Canonical serializer properties.

use onyx_smart_contract::serializer::{deserialize, serialize};
use onyx_vm::StackItem;
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy over serializable stack items: primitives at the leaves,
/// arrays, structs and maps above them.
fn arb_stack_item() -> impl Strategy<Value = StackItem> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(StackItem::from_bool),
        any::<i64>().prop_map(StackItem::from_int),
        vec(any::<u8>(), 0..48).prop_map(StackItem::from_bytes),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..4).prop_map(StackItem::from_array),
            vec(inner.clone(), 0..4).prop_map(StackItem::from_struct),
            vec((vec(any::<u8>(), 0..16), inner), 0..4).prop_map(|entries| {
                let map = StackItem::new_map();
                {
                    let handle = map.as_map().unwrap();
                    let mut handle = handle.borrow_mut();
                    for (key, value) in entries {
                        handle.insert(StackItem::from_bytes(key), value).unwrap();
                    }
                }
                map
            }),
        ]
    })
}

proptest! {
    #[test]
    fn round_trip_is_stable(item in arb_stack_item()) {
        let bytes = serialize(&item).unwrap();
        let back = deserialize(&bytes).unwrap();
        // The decoded item re-encodes to the identical byte form, and the
        // variant tag survives.
        prop_assert_eq!(serialize(&back).unwrap(), bytes);
        prop_assert_eq!(item.type_name(), back.type_name());
    }

    #[test]
    fn structs_round_trip_structurally(elements in vec(any::<i64>(), 0..8)) {
        let item = StackItem::from_struct(
            elements.iter().copied().map(StackItem::from_int).collect(),
        );
        let back = deserialize(&serialize(&item).unwrap()).unwrap();
        prop_assert!(item.equals(&back).unwrap());
    }

    #[test]
    fn integers_round_trip_canonically(value in any::<i128>()) {
        let item = StackItem::from_int(value);
        let back = deserialize(&serialize(&item).unwrap()).unwrap();
        prop_assert!(item.equals(&back).unwrap());
    }
}

#[test]
fn deserialize_rejects_truncated_input() {
    let bytes = serialize(&StackItem::from_bytes(b"hello".to_vec())).unwrap();
    assert!(deserialize(&bytes[..bytes.len() - 1]).is_err());
}

#[test]
fn deserialize_rejects_trailing_garbage() {
    let mut bytes = serialize(&StackItem::from_bool(true)).unwrap();
    bytes.push(0x00);
    assert!(deserialize(&bytes).is_err());
}
