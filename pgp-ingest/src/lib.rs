//! Streaming OpenPGP message ingestion.
//!
//! This crate consumes an opaque byte stream and takes it as far as
//! signature verification or decryption dispatch: it detects and strips
//! ASCII armor (including clearsigned text, which it rewrites into a
//! synthesized packet stream), sequences the parsed packets into key
//! blocks, and walks each block to drive checking.
//!
//! It deliberately stops at well-marked seams.  Packet byte parsing,
//! cryptographic primitives, key lookup, trust evaluation, and user
//! interaction are collaborator traits in [`interface`]; this crate calls
//! them but implements none of them.  The three processing entry points
//! are [`process_packets`], [`process_signature_packets`], and
//! [`process_encryption_packets`].
//!
//! Byte streams flow through pull filters (see the `pull-filter` crate).
//! The armor reader is such a filter; a digest tap placed directly below
//! the plaintext sink guarantees that signed bytes are hashed exactly as
//! delivered.

#![warn(missing_docs)]

pub mod armor;
pub mod crypto;
pub mod interface;
pub mod packet;
pub mod types;

mod proc;
mod seq;
pub use seq::{process_encryption_packets, process_packets,
              process_signature_packets, Options, Session};

use crate::types::{HashAlgorithm, KeyId, PublicKeyAlgorithm, Tag};

/// Crate result specialization.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Errors returned by this crate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An armor line exceeded the hard length limit.
    #[error("Armor line too long (limit {0} bytes)")]
    LineTooLong(usize),

    /// The stream ended in the middle of an armor structure.
    #[error("Incomplete armor line")]
    IncompleteLine,

    /// A structural or checksum failure at the armor layer.
    #[error("Invalid armor: {0}")]
    InvalidArmor(String),

    /// A framing failure at the packet parser layer.  The stream is
    /// abandoned.
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// A packet type that the current processing mode forbids.
    #[error("Unexpected packet: {0}")]
    Unexpected(Tag),

    /// A subkey, user ID, or similar child packet with no key block to
    /// attach to.
    #[error("Orphaned packet: {0}")]
    Orphan(Tag),

    /// Unsupported public key algorithm.
    #[error("Unsupported public key algorithm: {0}")]
    UnsupportedPubkeyAlgorithm(PublicKeyAlgorithm),

    /// Unsupported hash algorithm.
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedDigestAlgorithm(HashAlgorithm),

    /// A signature class we cannot verify.
    #[error("Unsupported signature class {0:#04x}")]
    UnsupportedSigClass(u8),

    /// No usable secret key for a session key packet.
    #[error("No secret key {0}")]
    NoSecretKey(KeyId),

    /// The signing key is not in the key store.
    #[error("No public key {0}")]
    NoPublicKey(KeyId),

    /// The signature did not verify.
    #[error("Bad signature: {0}")]
    BadSignature(String),

    /// The stream carried no OpenPGP data at all.
    #[error("No valid OpenPGP data found")]
    NoValidData,

    /// A collapsed internal failure.
    #[error("{0}")]
    General(String),
}

/// The decoded packets this crate routes.
///
/// The variants carry their decoded bodies; packet byte parsing happens in
/// the collaborating parser, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Public key packet.
    PublicKey(packet::Key),
    /// Public subkey packet.
    PublicSubkey(packet::Key),
    /// Secret key packet.
    SecretKey(packet::Key),
    /// Secret subkey packet.
    SecretSubkey(packet::Key),
    /// User ID packet.
    UserId(packet::UserId),
    /// Signature packet.
    Signature(packet::Signature),
    /// One-pass signature packet.
    OnePassSig(packet::OnePassSig),
    /// Public-key encrypted session key packet.
    PubkeyEnc(packet::PubkeyEnc),
    /// Symmetric-key encrypted session key packet.
    SymkeyEnc(packet::SymkeyEnc),
    /// Symmetrically encrypted data packet.
    Encrypted(packet::Encrypted),
    /// Literal data packet.
    Plaintext(packet::Plaintext),
    /// Compressed data packet.
    Compressed(packet::Compressed),
    /// Marker packet.
    Marker(packet::Marker),
    /// Comment packet.
    Comment(packet::Comment),
}

impl Packet {
    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        match self {
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::SecretKey(_) => Tag::SecretKey,
            Packet::SecretSubkey(_) => Tag::SecretSubkey,
            Packet::UserId(_) => Tag::UserId,
            Packet::Signature(_) => Tag::Signature,
            Packet::OnePassSig(_) => Tag::OnePassSig,
            Packet::PubkeyEnc(_) => Tag::PubkeyEnc,
            Packet::SymkeyEnc(_) => Tag::SymkeyEnc,
            Packet::Encrypted(_) => Tag::Encrypted,
            Packet::Plaintext(_) => Tag::Plaintext,
            Packet::Compressed(_) => Tag::Compressed,
            Packet::Marker(_) => Tag::Marker,
            Packet::Comment(_) => Tag::Comment,
        }
    }

    /// Whether this packet may root a key block.
    pub fn is_key(&self) -> bool {
        matches!(self,
                 Packet::PublicKey(_) | Packet::PublicSubkey(_)
                 | Packet::SecretKey(_) | Packet::SecretSubkey(_))
    }
}
