use proptest::prelude::*;

use tcr_types::{ListingName, Timestamp};

proptest! {
    /// Any input of at most 32 bytes is preserved as the name's prefix.
    #[test]
    fn listing_name_preserves_prefix(bytes in prop::collection::vec(any::<u8>(), 0..=32)) {
        let name = ListingName::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&name.as_bytes()[..bytes.len()], &bytes[..]);
        prop_assert!(name.as_bytes()[bytes.len()..].iter().all(|b| *b == 0));
    }

    /// Inputs longer than 32 bytes are always rejected.
    #[test]
    fn listing_name_rejects_long_input(bytes in prop::collection::vec(any::<u8>(), 33..64)) {
        prop_assert!(ListingName::from_bytes(&bytes).is_err());
    }

    /// ListingName::is_zero is true only for all-zero bytes.
    #[test]
    fn listing_name_is_zero_correct(bytes in prop::array::uniform32(0u8..)) {
        let name = ListingName::new(bytes);
        prop_assert_eq!(name.is_zero(), bytes == [0u8; 32]);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// A deadline built with checked_add_secs has passed exactly when now reaches it.
    #[test]
    fn deadline_passes_at_boundary(start in 0u64..1_000_000, period in 0u64..1_000_000, now in 0u64..3_000_000) {
        let deadline = Timestamp::new(start).checked_add_secs(period).unwrap();
        prop_assert_eq!(deadline.has_passed(Timestamp::new(now)), now >= start + period);
    }

    /// checked_add_secs overflows to None instead of wrapping.
    #[test]
    fn checked_add_secs_never_wraps(start in (u64::MAX - 1000)..u64::MAX, period in 1001u64..u64::MAX) {
        prop_assert!(Timestamp::new(start).checked_add_secs(period).is_none());
    }
}
