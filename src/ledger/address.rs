//! Base58-encoded 32-byte account addresses and block hashes.

use std::fmt;
use std::str::FromStr;

/// A ledger account address (an ed25519 public key or a program id).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// The system program, owner of every plain wallet account.
    pub const SYSTEM_PROGRAM: Address = Address([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

/// Decodes a base58 string that must hold exactly 32 bytes.
pub(crate) fn decode_32(s: &str) -> Result<[u8; 32], AddressParseError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| AddressParseError::InvalidBase58(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| AddressParseError::InvalidLength(len))
}

/// Error parsing a base58 address or hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("not valid base58: {0}")]
    InvalidBase58(String),
    #[error("expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_system_program() {
        let address: Address = "11111111111111111111111111111111".parse().unwrap();
        assert_eq!(address, Address::SYSTEM_PROGRAM);
        assert_eq!(address.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn display_roundtrip() {
        let address = Address::from_bytes([7u8; 32]);
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn reject_short_payload() {
        assert_eq!(
            "ABC123".parse::<Address>(),
            Err(AddressParseError::InvalidLength(5))
        );
    }

    #[test]
    fn reject_non_base58() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet
        assert!(matches!(
            "0OIl".parse::<Address>(),
            Err(AddressParseError::InvalidBase58(_))
        ));
    }
}
