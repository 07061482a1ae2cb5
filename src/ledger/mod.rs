//! Ledger access: keypairs, addresses, transfer signing and the JSON-RPC client.
//!
//! The dispatcher only sees the [`LedgerClient`] trait so that tests can swap in
//! a scripted ledger; [`RpcLedgerClient`] is the network implementation.

pub mod address;
pub mod keypair;
pub mod rpc;
pub mod transaction;

use async_trait::async_trait;
use std::fmt;

pub use address::Address;
pub use keypair::Keypair;
pub use rpc::RpcLedgerClient;

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// An ed25519 transaction signature; its base58 form identifies the transaction.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Formats a lamport amount as SOL with full precision.
pub fn format_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{fraction:09}");
    format!("{whole}.{}", fraction.trim_end_matches('0'))
}

/// Error talking to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger RPC unreachable: {0}")]
    Network(String),
    #[error("ledger RPC returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected ledger RPC response: {0}")]
    MalformedResponse(String),
}

/// Error submitting a transfer, split by whether the ledger may have seen it.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Failed before submission, or the ledger answered with a definite rejection.
    #[error(transparent)]
    NotSubmitted(LedgerError),
    /// `sendTransaction` went out but its outcome is unknown; the transaction
    /// may still land under `signature`.
    #[error("{source} (transaction {signature} may still land)")]
    Unconfirmed {
        signature: Signature,
        source: LedgerError,
    },
}

impl TransferError {
    /// The signature of a transaction that may have reached the ledger.
    pub fn signature(&self) -> Option<Signature> {
        match self {
            Self::NotSubmitted(_) => None,
            Self::Unconfirmed { signature, .. } => Some(*signature),
        }
    }
}

/// Submits transfers and reads balances.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Returns the balance of `address` in lamports.
    async fn balance(&self, address: &Address) -> Result<u64, LedgerError>;

    /// Signs and submits a transfer, returning its signature once accepted.
    ///
    /// # Errors
    /// - [`TransferError::NotSubmitted`] if the transfer can safely be retried
    /// - [`TransferError::Unconfirmed`] if it may already have been accepted
    async fn transfer(
        &self,
        payer: &Keypair,
        recipient: &Address,
        lamports: u64,
    ) -> Result<Signature, TransferError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(0), "0");
        assert_eq!(format_sol(LAMPORTS_PER_SOL), "1");
        assert_eq!(format_sol(1_500_000_000), "1.5");
        assert_eq!(format_sol(1), "0.000000001");
    }
}
