//! Property tests for column addressing

use proptest::prelude::*;
use transactions2pln::column::resolve_column;

proptest! {
    #[test]
    fn letter_maps_to_alphabet_position(offset in 0u8..26, upper in any::<bool>()) {
        let base = if upper { b'A' } else { b'a' };
        let spec = ((base + offset) as char).to_string();
        prop_assert_eq!(resolve_column(Some(&spec), &[]).unwrap(), Some(offset as usize));
    }

    #[test]
    fn digit_maps_to_zero_based_index(digit in 1usize..=9) {
        let spec = digit.to_string();
        prop_assert_eq!(resolve_column(Some(&spec), &[]).unwrap(), Some(digit - 1));
    }

    #[test]
    fn header_maps_to_its_position(
        names in prop::collection::hash_set("[a-z]{2,8}", 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let headers: Vec<String> = names.into_iter().collect();
        let index = pick.index(headers.len());
        prop_assert_eq!(resolve_column(Some(&headers[index]), &headers).unwrap(), Some(index));
    }

    #[test]
    fn absent_header_is_not_found(
        headers in prop::collection::vec("[a-z]{2,8}", 0..10),
        missing in "[A-Z]{2,8}",
    ) {
        prop_assert!(resolve_column(Some(&missing), &headers).is_err());
    }
}
