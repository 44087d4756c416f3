//! Voter and entity addresses.

fixed_bytes!(
    /// A 20-byte account address.
    ///
    /// Voter addresses are derived from the voter's public key, see
    /// `ballotlink_crypto::derive_address`.
    Address,
    20
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_prefix() {
        let hex = "000102030405060708090a0b0c0d0e0f10111213";
        let a = Address::from_hex(hex).unwrap();
        let b = Address::from_hex(&format!("0x{hex}")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes()[19], 0x13);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Address::from_hex("0x0102").unwrap_err();
        assert!(matches!(
            err,
            crate::TypesError::InvalidLength {
                expected: 20,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn json_uses_hex_and_bincode_uses_raw_bytes() {
        let addr = Address::new([7u8; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "07".repeat(20)));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);

        let bin = bincode::serialize(&addr).unwrap();
        assert_eq!(bin.len(), 20);
        let back: Address = bincode::deserialize(&bin).unwrap();
        assert_eq!(back, addr);
    }
}
