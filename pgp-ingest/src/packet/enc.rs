//! Session key and encrypted data packet bodies.

use crate::packet::Mpi;
use crate::types::{HashAlgorithm, KeyId, PublicKeyAlgorithm,
                   SymmetricAlgorithm};

/// A public-key encrypted session key packet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubkeyEnc {
    /// Packet version, always 3.
    pub version: u8,
    /// The intended recipient, zero for an anonymous recipient.
    pub keyid: KeyId,
    /// The recipient key's algorithm.
    pub pubkey_algo: PublicKeyAlgorithm,
    /// The encrypted session key material.
    pub mpis: Vec<Mpi>,
}

/// A string-to-key specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2k {
    /// 0 simple, 1 salted, 3 iterated and salted.
    pub mode: u8,
    /// The digest folding the passphrase into key material.
    pub hash_algo: HashAlgorithm,
    /// Present in salted and iterated modes.
    pub salt: Option<[u8; 8]>,
    /// The decoded iteration count, iterated mode only.
    pub count: Option<u32>,
}

impl S2k {
    /// The simple MD5 specifier assumed for messages that predate
    /// symmetric session key packets.
    pub fn legacy() -> Self {
        S2k {
            mode: 0,
            hash_algo: HashAlgorithm::MD5,
            salt: None,
            count: None,
        }
    }
}

/// A symmetric-key encrypted session key packet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymkeyEnc {
    /// Packet version, always 4.
    pub version: u8,
    /// The cipher the derived key is for.
    pub cipher_algo: SymmetricAlgorithm,
    /// How to fold the passphrase into a key.
    pub s2k: S2k,
    /// The encrypted session key, absent when the passphrase itself keys
    /// the data.
    pub esk: Option<Vec<u8>>,
}

impl SymkeyEnc {
    /// The specifier assumed for conventionally encrypted data with no
    /// session key packet at all, the oldest message layout.
    pub fn legacy() -> Self {
        SymkeyEnc {
            version: 4,
            cipher_algo: SymmetricAlgorithm::Idea,
            s2k: S2k::legacy(),
            esk: None,
        }
    }
}

/// A symmetrically encrypted data packet body.
#[derive(Clone, PartialEq, Eq)]
pub struct Encrypted {
    /// The raw ciphertext.
    pub body: Vec<u8>,
}

impl std::fmt::Debug for Encrypted {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Encrypted({} bytes)", self.body.len())
    }
}
