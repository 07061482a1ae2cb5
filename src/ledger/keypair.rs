//! Payer keypair persistence.
//!
//! Keypairs are stored as a JSON array of 64 integers: the 32-byte ed25519 seed
//! followed by the 32-byte public key. This is the format produced by the
//! ledger's own CLI tooling, so files are interchangeable.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::address::Address;
use super::Signature;

/// An ed25519 signing keypair.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a fresh keypair from the operating system's CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a keypair from 64 keypair bytes or a bare 32-byte seed.
    ///
    /// # Errors
    /// - If the length is neither 32 nor 64
    /// - If the trailing public key does not belong to the seed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeypairError> {
        let signing_key = match bytes.len() {
            64 => {
                let mut keypair_bytes = [0u8; 64];
                keypair_bytes.copy_from_slice(bytes);
                SigningKey::from_keypair_bytes(&keypair_bytes)
                    .map_err(|_| KeypairError::PublicKeyMismatch)?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(bytes);
                SigningKey::from_bytes(&seed)
            }
            len => return Err(KeypairError::InvalidLength(len)),
        };
        Ok(Self { signing_key })
    }

    /// Returns the 64-byte seed-plus-public-key encoding.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn address(&self) -> Address {
        Address::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key.sign(message).to_bytes())
    }

    /// Reads a keypair JSON file.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the content is not a JSON byte array of a valid keypair
    pub fn load(path: &Path) -> Result<Self, KeypairError> {
        let content = fs::read_to_string(path).map_err(|source| KeypairError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let bytes: Vec<u8> = serde_json::from_str(&content)?;
        Self::from_bytes(&bytes)
    }

    /// Writes the keypair JSON file, refusing to replace an existing one.
    ///
    /// On Unix the file is created with mode 0600.
    ///
    /// # Errors
    /// - If the file already exists or cannot be written
    pub fn save(&self, path: &Path) -> Result<(), KeypairError> {
        let io_err = |source: std::io::Error| KeypairError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let json = serde_json::to_string(&self.to_bytes().to_vec())?;
        let mut file = options.open(path).map_err(io_err)?;
        file.write_all(json.as_bytes()).map_err(io_err)?;
        Ok(())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Error loading or saving a keypair.
#[derive(Debug, thiserror::Error)]
pub enum KeypairError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("keypair file is not a JSON byte array: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keypair must be 32 or 64 bytes, got {0}")]
    InvalidLength(usize),
    #[error("public key half does not match the secret key")]
    PublicKeyMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Verifier, VerifyingKey};

    #[test]
    fn save_then_load_preserves_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("keypair.json");

        let keypair = Keypair::generate();
        keypair.save(&path).unwrap();
        let loaded = Keypair::load(&path).unwrap();

        assert_eq!(loaded.address(), keypair.address());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('['));
        assert_eq!(content.split(',').count(), 64);
    }

    #[test]
    fn save_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keypair.json");
        Keypair::generate().save(&path).unwrap();
        assert!(matches!(
            Keypair::generate().save(&path),
            Err(KeypairError::Io { .. })
        ));
    }

    #[test]
    fn seed_and_full_encoding_agree() {
        let keypair = Keypair::from_bytes(&[9u8; 32]).unwrap();
        let full = Keypair::from_bytes(&keypair.to_bytes()).unwrap();
        assert_eq!(full.address(), keypair.address());
    }

    #[test]
    fn mismatched_public_key_is_rejected() {
        let mut bytes = Keypair::from_bytes(&[9u8; 32]).unwrap().to_bytes();
        bytes[40] ^= 0xff;
        assert!(matches!(
            Keypair::from_bytes(&bytes),
            Err(KeypairError::PublicKeyMismatch)
        ));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            Keypair::from_bytes(&[1u8; 10]),
            Err(KeypairError::InvalidLength(10))
        ));
    }

    #[test]
    fn signature_verifies_under_address() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"message");
        let verifying_key = VerifyingKey::from_bytes(keypair.address().as_bytes()).unwrap();
        let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
        assert!(verifying_key.verify(b"message", &signature).is_ok());
    }
}
