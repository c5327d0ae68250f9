use core::fmt::{Display, Error as FmtError, Formatter};

use packet_relayer_types::core::ics23_commitment::commitment::CommitmentProofBytes;
use packet_relayer_types::Height;

/// Result of a transaction broadcast, as reported by the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxResponse {
    /// ABCI response code, zero on success
    pub code: u32,
    pub hash: String,
    /// Height the transaction was included at, when the broadcast waited for it
    pub height: Option<Height>,
    pub log: String,
}

impl TxResponse {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

impl Display for TxResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "TxResponse {{ code: {}, hash: {}", self.code, self.hash)?;

        if let Some(height) = self.height {
            write!(f, ", height: {height}")?;
        }

        if !self.log.is_empty() {
            write!(f, ", log: {}", self.log)?;
        }

        write!(f, " }}")
    }
}

/// A packet commitment proof, along with the height it was generated at.
///
/// A chain that has not indexed the commitment yet answers with no proof:
/// such a response is never usable as proof material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitmentResponse {
    pub proof: Option<CommitmentProofBytes>,
    pub proof_height: Height,
}

impl CommitmentResponse {
    pub fn into_proof(self) -> Option<(CommitmentProofBytes, Height)> {
        let proof_height = self.proof_height;
        self.proof.map(|proof| (proof, proof_height))
    }
}
