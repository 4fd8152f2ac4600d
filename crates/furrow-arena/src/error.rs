//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// Two families share this enum: resource failures reported by the host
/// ([`HostExhausted`](ArenaError::HostExhausted)) and caller contract
/// violations (see [`ArenaError::is_contract_violation`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The host memory provider could not supply a block.
    HostExhausted {
        /// Usable bytes that were requested from the host.
        requested: usize,
    },
    /// A fixed-size arena was asked for more bytes than one block holds.
    OversizedRequest {
        /// Number of bytes requested.
        requested: usize,
        /// The arena's fixed block data size.
        block_size: usize,
    },
    /// A least-size arena was requested with a zero minimum.
    ZeroMinimum,
    /// The minimum block size cannot be rounded to a power of two.
    MinimumTooLarge {
        /// The minimum that was requested.
        least: usize,
    },
    /// An [`Allocation`](crate::Allocation) whose bytes were rolled back,
    /// released to the pool, or decommissioned.
    StaleAllocation,
}

impl ArenaError {
    /// Whether this error reports caller misuse rather than exhaustion.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::HostExhausted { .. })
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostExhausted { requested } => {
                write!(f, "host memory exhausted: could not commission {requested} bytes")
            }
            Self::OversizedRequest {
                requested,
                block_size,
            } => {
                write!(
                    f,
                    "allocation of {requested} bytes exceeds fixed block size {block_size}"
                )
            }
            Self::ZeroMinimum => write!(f, "minimum block size must be non-zero"),
            Self::MinimumTooLarge { least } => {
                write!(f, "minimum block size {least} has no power-of-two block size")
            }
            Self::StaleAllocation => write!(f, "allocation is no longer live"),
        }
    }
}

impl Error for ArenaError {}
