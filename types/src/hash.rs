//! 32-byte hash types.

fixed_bytes!(
    /// A vote nullifier: deterministic per voter and process, used by the
    /// chain to reject double votes.
    Nullifier,
    32
);

fixed_bytes!(
    /// Hash of a chain transaction.
    TxHash,
    32
);
