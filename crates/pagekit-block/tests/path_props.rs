use pagekit_block::{BlockPath, Segment, Slot};
use proptest::prelude::*;

fn segment_strategy() -> impl Strategy<Value = Segment> {
    prop_oneof![
        (0..500usize).prop_map(Segment::Index),
        Just(Segment::Slot(Slot::Blocks)),
        Just(Segment::Slot(Slot::LeftBlocks)),
        Just(Segment::Slot(Slot::RightBlocks)),
    ]
}

proptest! {
    #[test]
    fn prop_append_all_equals_repeated_append(
        segments in proptest::collection::vec(segment_strategy(), 0..12)
    ) {
        let all_at_once = BlockPath::root().append_all(&segments);
        let one_by_one = segments
            .iter()
            .fold(BlockPath::root(), |path, segment| path.append(*segment));

        prop_assert_eq!(&all_at_once, &one_by_one);
        prop_assert_eq!(all_at_once.segments().unwrap(), segments);
    }

    #[test]
    fn prop_parse_display_roundtrip(
        segments in proptest::collection::vec(segment_strategy(), 1..12)
    ) {
        let path = BlockPath::root().append_all(&segments);
        let parsed: BlockPath = path.to_string().parse().unwrap();
        prop_assert_eq!(parsed, path);
    }

    #[test]
    fn prop_parent_is_ancestor_of_child(
        prefix in proptest::collection::vec(segment_strategy(), 0..6),
        index in 0..100usize
    ) {
        let parent = BlockPath::root().append_all(&prefix);
        let child = parent.child(Slot::Blocks, index);
        prop_assert!(parent.is_ancestor_of(&child));
        prop_assert!(!child.is_ancestor_of(&parent));
    }
}
