use pagekit_block::BlockType;
use pagekit_form::{extract, FieldKey, Submission, KEY_SEPARATOR};
use proptest::prelude::*;

fn field_type_strategy() -> impl Strategy<Value = BlockType> {
    proptest::sample::select(
        BlockType::ALL
            .iter()
            .copied()
            .filter(|t| t.is_form_field())
            .collect::<Vec<_>>(),
    )
}

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,24}"
}

/// Raw value that coerces to an empty or false value for `block_type`
fn empty_raw(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::FormCheckbox => "false",
        _ => "",
    }
}

/// Raw value that coerces to a present value for `block_type`
fn filled_raw(block_type: BlockType) -> &'static str {
    match block_type {
        BlockType::FormCheckbox => "on",
        BlockType::FormNumberInput => "42",
        _ => "x",
    }
}

proptest! {
    #[test]
    fn prop_key_roundtrip(
        block_type in field_type_strategy(),
        id in id_strategy(),
        optional in any::<bool>()
    ) {
        let key = FieldKey::new(block_type, id, optional);
        prop_assert_eq!(FieldKey::decode(&key.encode()).unwrap(), key);
    }

    #[test]
    fn prop_decode_rejects_foreign_names(raw in "[^.]{0,32}") {
        // Without a separator a name can never have three parts
        prop_assert!(FieldKey::decode(&raw).is_err());
    }

    #[test]
    fn prop_decode_rejects_extra_parts(
        block_type in field_type_strategy(),
        id in id_strategy(),
        tail in "[a-z]{1,8}"
    ) {
        let raw = format!("{}{KEY_SEPARATOR}{tail}", FieldKey::new(block_type, id, false).encode());
        prop_assert!(FieldKey::decode(&raw).is_err());
    }

    #[test]
    fn prop_required_empty_fields_missing_exactly_once(
        fields in proptest::collection::vec((field_type_strategy(), any::<bool>()), 1..10)
    ) {
        let submission = Submission::from_pairs(fields.iter().enumerate().map(|(i, (block_type, filled))| {
            let key = FieldKey::new(*block_type, format!("f{i}"), false);
            let raw = if *filled { filled_raw(*block_type) } else { empty_raw(*block_type) };
            (key.encode(), raw)
        }));

        let missing = extract(&submission).unwrap().missing();

        for (i, (_, filled)) in fields.iter().enumerate() {
            let id = format!("f{i}");
            let count = missing.iter().filter(|m| **m == id).count();
            prop_assert_eq!(count, usize::from(!filled));
        }
    }

    #[test]
    fn prop_optional_fields_never_missing(
        fields in proptest::collection::vec(field_type_strategy(), 1..10)
    ) {
        let submission = Submission::from_pairs(fields.iter().enumerate().map(|(i, block_type)| {
            (FieldKey::new(*block_type, format!("f{i}"), true).encode(), empty_raw(*block_type))
        }));

        prop_assert!(extract(&submission).unwrap().missing().is_empty());
    }
}
