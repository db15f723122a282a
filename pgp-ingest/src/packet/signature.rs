//! Signature and one-pass signature packet bodies.

use crate::packet::Mpi;
use crate::types::{HashAlgorithm, KeyId, PublicKeyAlgorithm, SignatureType};

/// A signature packet body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Packet version, 3 or 4.
    pub version: u8,
    /// What was signed, and how to verify it.
    pub sig_class: SignatureType,
    /// The issuer's key algorithm.
    pub pubkey_algo: PublicKeyAlgorithm,
    /// The digest the signature is over.
    pub digest_algo: HashAlgorithm,
    /// The issuer, as decoded from the packet or its subpackets.
    pub keyid: KeyId,
    /// Creation time, seconds since the epoch.
    pub timestamp: u32,
    /// The left 16 bits of the signed digest, a quick-check value.
    pub digest_start: [u8; 2],
    /// Algorithm-specific signature material.
    pub mpis: Vec<Mpi>,
}

/// A one-pass signature packet body.
///
/// Announces, ahead of the signed data, which digest a trailing signature
/// will need, so the data can be hashed in the same pass that delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassSig {
    /// Packet version, always 3.
    pub version: u8,
    /// The class of the announced signature.
    pub sig_class: SignatureType,
    /// The digest to accumulate over the data.
    pub digest_algo: HashAlgorithm,
    /// The issuer's key algorithm.
    pub pubkey_algo: PublicKeyAlgorithm,
    /// The issuer.
    pub keyid: KeyId,
    /// Set on the packet closest to the data; clear means further
    /// one-pass packets follow.
    pub last: bool,
}

impl OnePassSig {
    /// A packet as synthesized in front of clearsigned text: canonical
    /// text class, wildcard issuer, no announced key algorithm.
    pub fn faked(digest_algo: HashAlgorithm, last: bool) -> Self {
        OnePassSig {
            version: 3,
            sig_class: SignatureType::Text,
            digest_algo,
            pubkey_algo: PublicKeyAlgorithm::Unknown(0),
            keyid: KeyId::wildcard(),
            last,
        }
    }
}
