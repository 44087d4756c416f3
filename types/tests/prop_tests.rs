use proptest::prelude::*;

use ballotlink_types::{Address, EnvelopeType, ProcessId, ProcessMode, Timestamp};

proptest! {
    /// ProcessId hex roundtrip: to_hex -> from_hex is the identity.
    #[test]
    fn process_id_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let id = ProcessId::new(bytes);
        let parsed = ProcessId::from_hex(&id.to_hex()).unwrap();
        prop_assert_eq!(parsed, id);
    }

    /// Address parsing accepts exactly 20 bytes and nothing else.
    #[test]
    fn address_length_is_enforced(bytes in prop::collection::vec(0u8.., 0..40)) {
        let parsed = Address::from_slice(&bytes);
        prop_assert_eq!(parsed.is_ok(), bytes.len() == 20);
    }

    /// Stripping the prefix does not change the parsed value.
    #[test]
    fn prefix_is_optional(bytes in prop::array::uniform32(0u8..)) {
        let raw = hex::encode(bytes);
        let with = ProcessId::from_hex(&format!("0x{raw}")).unwrap();
        let without = ProcessId::from_hex(&raw).unwrap();
        prop_assert_eq!(with, without);
    }

    /// Envelope type bit packing is lossless for the defined bits.
    #[test]
    fn envelope_type_bits_roundtrip(bits in 0u8..32) {
        prop_assert_eq!(EnvelopeType::from_bits(bits).bits(), bits);
    }

    /// Process mode bit packing is lossless for the defined bits.
    #[test]
    fn process_mode_bits_roundtrip(bits in 0u8..16) {
        prop_assert_eq!(ProcessMode::from_bits(bits).bits(), bits);
    }

    /// Timestamp offsets never underflow the epoch.
    #[test]
    fn timestamp_offset_saturates(base in 0u64..1_000_000, delta in -2_000_000i64..2_000_000) {
        let t = Timestamp::from_millis(base).offset_by(delta);
        let expected = (base as i128 + delta as i128).max(0) as u64;
        prop_assert_eq!(t.as_millis(), expected);
    }
}
