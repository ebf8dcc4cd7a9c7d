use thiserror::Error;

/// Everything that can go wrong below the transport boundary.
///
/// None of these are retried here: a short buffer or a bad tag means the
/// bytes do not describe what the caller thinks they do, and retry policy
/// (if any) belongs to the RPC layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A read past the end of the account or instruction buffer.
    #[error("read of {needed} bytes at offset {offset} overruns {len}-byte buffer")]
    BufferUnderrun {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// The first 8 bytes of the account are not the expected type tag.
    ///
    /// Fatal for a targeted fetch. Scan callers should filter with
    /// [`matches`](crate::state::ProgramAccount::matches) up front and treat
    /// this as "skip" if it surfaces anyway.
    #[error("account discriminator mismatch: expected {expected:02x?}, found {found:02x?}")]
    DiscriminatorMismatch { expected: [u8; 8], found: [u8; 8] },

    /// An enum, action, boolean or presence byte outside its closed range.
    #[error("unknown {kind} tag {tag}")]
    UnknownTag { kind: &'static str, tag: u8 },

    /// A caller-supplied value does not fit the wire field, checked before
    /// any bytes are written.
    #[error("{field} out of range: {value} (limit {limit})")]
    RangeViolation {
        field: &'static str,
        value: u64,
        limit: u64,
    },

    /// No bump in 255..=0 produced an off-curve address. Indicates broken
    /// seed construction, not a transient condition.
    #[error("program address derivation exhausted all bump seeds")]
    DerivationExhausted,

    /// A persisted string region is not valid UTF-8.
    #[error("{field} is not valid utf-8")]
    InvalidUtf8 { field: &'static str },
}

impl ProtocolError {
    /// True for the error a type-filtered bulk scan is allowed to swallow.
    pub fn is_foreign_account(&self) -> bool {
        matches!(self, ProtocolError::DiscriminatorMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
