use core::fmt::{Debug, Formatter};

use flex_error::define_error;

define_error! {
    Error {
        EmptyProof
            | _ | { "empty merkle proof" },
    }
}

/// The serialized merkle proof that a packet commitment exists in a chain's
/// state. An empty proof cannot be constructed: a query answered without a
/// proof payload is not usable as proof material.
#[derive(Clone, PartialEq, Eq)]
pub struct CommitmentProofBytes {
    bytes: Vec<u8>,
}

impl CommitmentProofBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Debug for CommitmentProofBytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "CommitmentProofBytes({} bytes)", self.bytes.len())
    }
}

impl TryFrom<Vec<u8>> for CommitmentProofBytes {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        if bytes.is_empty() {
            Err(Error::empty_proof())
        } else {
            Ok(Self { bytes })
        }
    }
}

impl From<CommitmentProofBytes> for Vec<u8> {
    fn from(p: CommitmentProofBytes) -> Vec<u8> {
        p.bytes
    }
}
