//! Wire encoding of a single-instruction system transfer.
//!
//! Only the legacy message format is produced. Layout:
//!
//! ```text
//! transaction = shortvec<signature[64]> message
//! message     = header[3] shortvec<address[32]> blockhash[32] shortvec<instruction>
//! instruction = program_index:u8 shortvec<account_index:u8> shortvec<data:u8>
//! ```

use std::fmt;
use std::str::FromStr;

use super::address::{decode_32, Address, AddressParseError};
use super::keypair::Keypair;
use super::Signature;

/// System program instruction discriminant for `Transfer`.
const SYSTEM_TRANSFER: u32 = 2;

/// A recent block hash; transactions referencing a stale one are rejected.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    #[cfg(test)]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Blockhash {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_32(s).map(Self)
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({})", bs58::encode(self.0).into_string())
    }
}

/// A signed transaction ready for `sendTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub signature: Signature,
    pub wire: Vec<u8>,
}

/// Appends a compact-u16 length prefix (7 bits per byte, little-endian).
fn encode_length(out: &mut Vec<u8>, len: usize) {
    let mut remaining = len;
    loop {
        let mut byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Serializes the message of a `Transfer` from `from` to `to`.
///
/// A self-transfer lists the payer only once, as the ledger deduplicates keys.
pub fn transfer_message(
    from: &Address,
    to: &Address,
    lamports: u64,
    recent_blockhash: &Blockhash,
) -> Vec<u8> {
    let mut keys = vec![*from];
    if to != from {
        keys.push(*to);
    }
    keys.push(Address::SYSTEM_PROGRAM);
    let program_index = (keys.len() - 1) as u8;
    let to_index = if to == from { 0 } else { 1 };

    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    let mut message = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 20);
    // one signer (writable), no read-only signers, one read-only non-signer (the program)
    message.extend_from_slice(&[1, 0, 1]);
    encode_length(&mut message, keys.len());
    for key in &keys {
        message.extend_from_slice(key.as_bytes());
    }
    message.extend_from_slice(&recent_blockhash.0);

    encode_length(&mut message, 1);
    message.push(program_index);
    encode_length(&mut message, 2);
    message.extend_from_slice(&[0, to_index]);
    encode_length(&mut message, data.len());
    message.extend_from_slice(&data);

    message
}

/// Builds and signs a transfer of `lamports` from the payer to `to`.
pub fn sign_transfer(
    payer: &Keypair,
    to: &Address,
    lamports: u64,
    recent_blockhash: &Blockhash,
) -> SignedTransaction {
    let message = transfer_message(&payer.address(), to, lamports, recent_blockhash);
    let signature = payer.sign(&message);

    let mut wire = Vec::with_capacity(1 + 64 + message.len());
    encode_length(&mut wire, 1);
    wire.extend_from_slice(signature.as_bytes());
    wire.extend_from_slice(&message);

    SignedTransaction { signature, wire }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    fn encoded(len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        encode_length(&mut out, len);
        out
    }

    #[test]
    fn compact_length_encoding() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(0x7f), vec![0x7f]);
        assert_eq!(encoded(0x80), vec![0x80, 0x01]);
        assert_eq!(encoded(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encoded(0x4000), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn transfer_message_layout() {
        let from = Address::from_bytes([1u8; 32]);
        let to = Address::from_bytes([2u8; 32]);
        let blockhash = Blockhash::from_bytes([3u8; 32]);

        let message = transfer_message(&from, &to, 5, &blockhash);

        assert_eq!(&message[..4], &[1, 0, 1, 3]);
        assert_eq!(&message[4..36], from.as_bytes());
        assert_eq!(&message[36..68], to.as_bytes());
        assert_eq!(&message[68..100], Address::SYSTEM_PROGRAM.as_bytes());
        assert_eq!(&message[100..132], &[3u8; 32]);
        // one instruction: program 2, accounts [0, 1], 12 data bytes
        assert_eq!(&message[132..138], &[1, 2, 2, 0, 1, 12]);
        assert_eq!(&message[138..142], &[2, 0, 0, 0]);
        assert_eq!(&message[142..], &5u64.to_le_bytes());
    }

    #[test]
    fn self_transfer_deduplicates_payer() {
        let from = Address::from_bytes([1u8; 32]);
        let blockhash = Blockhash::from_bytes([3u8; 32]);

        let message = transfer_message(&from, &from, 1, &blockhash);

        assert_eq!(message[3], 2);
        // program index 1, accounts [0, 0]
        let instruction = &message[3 + 1 + 64 + 32..];
        assert_eq!(&instruction[..6], &[1, 1, 2, 0, 0, 12]);
    }

    #[test]
    fn signed_transaction_carries_valid_signature() {
        let payer = Keypair::from_bytes(&[4u8; 32]).unwrap();
        let to = Address::from_bytes([2u8; 32]);
        let blockhash = Blockhash::from_bytes([3u8; 32]);

        let signed = sign_transfer(&payer, &to, 1_000, &blockhash);

        assert_eq!(signed.wire[0], 1);
        assert_eq!(&signed.wire[1..65], signed.signature.as_bytes());
        let message = &signed.wire[65..];
        assert_eq!(message, transfer_message(&payer.address(), &to, 1_000, &blockhash));

        let verifying_key = VerifyingKey::from_bytes(payer.address().as_bytes()).unwrap();
        let signature = ed25519_dalek::Signature::from_bytes(signed.signature.as_bytes());
        assert!(verifying_key.verify(message, &signature).is_ok());
    }
}
