//! Algorithm identifiers, packet tags, and other wire-level constants.
//!
//! The numeric values are the OpenPGP registry values; every enum keeps
//! unknown values in an `Unknown` variant so a stream with identifiers we
//! do not understand can still be routed and reported.

use std::fmt;

/// An OpenPGP packet tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Public-Key Encrypted Session Key.
    PubkeyEnc,
    /// Signature.
    Signature,
    /// Symmetric-Key Encrypted Session Key.
    SymkeyEnc,
    /// One-Pass Signature.
    OnePassSig,
    /// Secret Key.
    SecretKey,
    /// Public Key.
    PublicKey,
    /// Secret Subkey.
    SecretSubkey,
    /// Compressed Data.
    Compressed,
    /// Symmetrically Encrypted Data.
    Encrypted,
    /// Marker.
    Marker,
    /// Literal Data.
    Plaintext,
    /// User ID.
    UserId,
    /// Public Subkey.
    PublicSubkey,
    /// Comment.
    Comment,
    /// A tag we do not route.
    Unknown(u8),
}

impl From<u8> for Tag {
    fn from(n: u8) -> Self {
        match n {
            1 => Tag::PubkeyEnc,
            2 => Tag::Signature,
            3 => Tag::SymkeyEnc,
            4 => Tag::OnePassSig,
            5 => Tag::SecretKey,
            6 => Tag::PublicKey,
            7 => Tag::SecretSubkey,
            8 => Tag::Compressed,
            9 => Tag::Encrypted,
            10 => Tag::Marker,
            11 => Tag::Plaintext,
            13 => Tag::UserId,
            14 => Tag::PublicSubkey,
            16 => Tag::Comment,
            n => Tag::Unknown(n),
        }
    }
}

impl From<Tag> for u8 {
    fn from(t: Tag) -> u8 {
        match t {
            Tag::PubkeyEnc => 1,
            Tag::Signature => 2,
            Tag::SymkeyEnc => 3,
            Tag::OnePassSig => 4,
            Tag::SecretKey => 5,
            Tag::PublicKey => 6,
            Tag::SecretSubkey => 7,
            Tag::Compressed => 8,
            Tag::Encrypted => 9,
            Tag::Marker => 10,
            Tag::Plaintext => 11,
            Tag::UserId => 13,
            Tag::PublicSubkey => 14,
            Tag::Comment => 16,
            Tag::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tag::PubkeyEnc => f.write_str("PubkeyEnc"),
            Tag::Signature => f.write_str("Signature"),
            Tag::SymkeyEnc => f.write_str("SymkeyEnc"),
            Tag::OnePassSig => f.write_str("OnePassSig"),
            Tag::SecretKey => f.write_str("SecretKey"),
            Tag::PublicKey => f.write_str("PublicKey"),
            Tag::SecretSubkey => f.write_str("SecretSubkey"),
            Tag::Compressed => f.write_str("Compressed"),
            Tag::Encrypted => f.write_str("Encrypted"),
            Tag::Marker => f.write_str("Marker"),
            Tag::Plaintext => f.write_str("Plaintext"),
            Tag::UserId => f.write_str("UserId"),
            Tag::PublicSubkey => f.write_str("PublicSubkey"),
            Tag::Comment => f.write_str("Comment"),
            Tag::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// A 64-bit key ID.
///
/// A key ID is a fingerprint fragment.  It identifies a key but is easy to
/// forge; it is used here for routing and reporting only.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(u64);

impl KeyId {
    /// Wraps a raw 64-bit key ID.
    pub fn new(id: u64) -> Self {
        KeyId(id)
    }

    /// The raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The all-zero key ID, used by synthesized one-pass packets and by
    /// anonymous recipients.
    pub fn wildcard() -> Self {
        KeyId(0)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyId({:016X})", self.0)
    }
}

/// A hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5.  Obsolete, kept for old messages.
    MD5,
    /// SHA-1.
    SHA1,
    /// RIPEMD-160.
    RipeMD,
    /// TIGER/192.
    Tiger,
    /// An identifier we do not implement.
    Unknown(u8),
}

impl HashAlgorithm {
    /// Whether this crate can instantiate the digest.
    pub fn is_supported(&self) -> bool {
        !matches!(self, HashAlgorithm::Unknown(_))
    }

    /// Parses the name used in armor `Hash:` header lines.
    pub fn from_armor_name(name: &str) -> Option<Self> {
        match name {
            "RIPEMD160" => Some(HashAlgorithm::RipeMD),
            "SHA1" => Some(HashAlgorithm::SHA1),
            "MD5" => Some(HashAlgorithm::MD5),
            "TIGER" => Some(HashAlgorithm::Tiger),
            _ => None,
        }
    }
}

impl From<u8> for HashAlgorithm {
    fn from(n: u8) -> Self {
        match n {
            1 => HashAlgorithm::MD5,
            2 => HashAlgorithm::SHA1,
            3 => HashAlgorithm::RipeMD,
            6 => HashAlgorithm::Tiger,
            n => HashAlgorithm::Unknown(n),
        }
    }
}

impl From<HashAlgorithm> for u8 {
    fn from(h: HashAlgorithm) -> u8 {
        match h {
            HashAlgorithm::MD5 => 1,
            HashAlgorithm::SHA1 => 2,
            HashAlgorithm::RipeMD => 3,
            HashAlgorithm::Tiger => 6,
            HashAlgorithm::Unknown(n) => n,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HashAlgorithm::MD5 => f.write_str("MD5"),
            HashAlgorithm::SHA1 => f.write_str("SHA1"),
            HashAlgorithm::RipeMD => f.write_str("RIPEMD160"),
            HashAlgorithm::Tiger => f.write_str("TIGER192"),
            HashAlgorithm::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// A public key algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKeyAlgorithm {
    /// RSA, encrypt or sign.
    RsaEncryptSign,
    /// RSA, encrypt only.
    RsaEncrypt,
    /// RSA, sign only.
    RsaSign,
    /// ElGamal, encrypt only.
    ElGamalEncrypt,
    /// DSA.
    Dsa,
    /// ElGamal, encrypt or sign.
    ElGamal,
    /// An identifier we do not implement.
    Unknown(u8),
}

impl From<u8> for PublicKeyAlgorithm {
    fn from(n: u8) -> Self {
        match n {
            1 => PublicKeyAlgorithm::RsaEncryptSign,
            2 => PublicKeyAlgorithm::RsaEncrypt,
            3 => PublicKeyAlgorithm::RsaSign,
            16 => PublicKeyAlgorithm::ElGamalEncrypt,
            17 => PublicKeyAlgorithm::Dsa,
            20 => PublicKeyAlgorithm::ElGamal,
            n => PublicKeyAlgorithm::Unknown(n),
        }
    }
}

impl From<PublicKeyAlgorithm> for u8 {
    fn from(p: PublicKeyAlgorithm) -> u8 {
        match p {
            PublicKeyAlgorithm::RsaEncryptSign => 1,
            PublicKeyAlgorithm::RsaEncrypt => 2,
            PublicKeyAlgorithm::RsaSign => 3,
            PublicKeyAlgorithm::ElGamalEncrypt => 16,
            PublicKeyAlgorithm::Dsa => 17,
            PublicKeyAlgorithm::ElGamal => 20,
            PublicKeyAlgorithm::Unknown(n) => n,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PublicKeyAlgorithm::RsaEncryptSign => f.write_str("RSA"),
            PublicKeyAlgorithm::RsaEncrypt => f.write_str("RSA (encrypt only)"),
            PublicKeyAlgorithm::RsaSign => f.write_str("RSA (sign only)"),
            PublicKeyAlgorithm::ElGamalEncrypt =>
                f.write_str("ElGamal (encrypt only)"),
            PublicKeyAlgorithm::Dsa => f.write_str("DSA"),
            PublicKeyAlgorithm::ElGamal => f.write_str("ElGamal"),
            PublicKeyAlgorithm::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// A symmetric cipher identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymmetricAlgorithm {
    /// No encryption.
    Unencrypted,
    /// IDEA.
    Idea,
    /// Triple-DES.
    TripleDes,
    /// CAST5.
    Cast5,
    /// Blowfish.
    Blowfish,
    /// AES with a 128-bit key.
    Aes128,
    /// AES with a 256-bit key.
    Aes256,
    /// An identifier we do not implement.
    Unknown(u8),
}

impl From<u8> for SymmetricAlgorithm {
    fn from(n: u8) -> Self {
        match n {
            0 => SymmetricAlgorithm::Unencrypted,
            1 => SymmetricAlgorithm::Idea,
            2 => SymmetricAlgorithm::TripleDes,
            3 => SymmetricAlgorithm::Cast5,
            4 => SymmetricAlgorithm::Blowfish,
            7 => SymmetricAlgorithm::Aes128,
            9 => SymmetricAlgorithm::Aes256,
            n => SymmetricAlgorithm::Unknown(n),
        }
    }
}

impl From<SymmetricAlgorithm> for u8 {
    fn from(s: SymmetricAlgorithm) -> u8 {
        match s {
            SymmetricAlgorithm::Unencrypted => 0,
            SymmetricAlgorithm::Idea => 1,
            SymmetricAlgorithm::TripleDes => 2,
            SymmetricAlgorithm::Cast5 => 3,
            SymmetricAlgorithm::Blowfish => 4,
            SymmetricAlgorithm::Aes128 => 7,
            SymmetricAlgorithm::Aes256 => 9,
            SymmetricAlgorithm::Unknown(n) => n,
        }
    }
}

impl fmt::Display for SymmetricAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymmetricAlgorithm::Unencrypted => f.write_str("Unencrypted"),
            SymmetricAlgorithm::Idea => f.write_str("IDEA"),
            SymmetricAlgorithm::TripleDes => f.write_str("3DES"),
            SymmetricAlgorithm::Cast5 => f.write_str("CAST5"),
            SymmetricAlgorithm::Blowfish => f.write_str("Blowfish"),
            SymmetricAlgorithm::Aes128 => f.write_str("AES"),
            SymmetricAlgorithm::Aes256 => f.write_str("AES256"),
            SymmetricAlgorithm::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// A compression algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionAlgorithm {
    /// No compression.
    Uncompressed,
    /// ZIP (RFC 1951).
    Zip,
    /// ZLIB (RFC 1950).
    Zlib,
    /// BZip2.
    Bzip2,
    /// An identifier we do not implement.
    Unknown(u8),
}

impl From<u8> for CompressionAlgorithm {
    fn from(n: u8) -> Self {
        match n {
            0 => CompressionAlgorithm::Uncompressed,
            1 => CompressionAlgorithm::Zip,
            2 => CompressionAlgorithm::Zlib,
            3 => CompressionAlgorithm::Bzip2,
            n => CompressionAlgorithm::Unknown(n),
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompressionAlgorithm::Uncompressed => f.write_str("Uncompressed"),
            CompressionAlgorithm::Zip => f.write_str("ZIP"),
            CompressionAlgorithm::Zlib => f.write_str("ZLIB"),
            CompressionAlgorithm::Bzip2 => f.write_str("BZip2"),
            CompressionAlgorithm::Unknown(n) => write!(f, "Unknown({})", n),
        }
    }
}

/// The class of a signature.
///
/// The class decides both what was hashed and which verification path a
/// signature takes: data classes verify against the message digest,
/// key classes verify against the enclosing key block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureType {
    /// Over a binary document (0x00).
    Binary,
    /// Over a text document, CR-LF canonicalized (0x01).
    Text,
    /// Standalone (0x02).
    Standalone,
    /// Generic User ID certification (0x10).
    GenericCertification,
    /// Persona User ID certification (0x11).
    PersonaCertification,
    /// Casual User ID certification (0x12).
    CasualCertification,
    /// Positive User ID certification (0x13).
    PositiveCertification,
    /// Subkey binding (0x18).
    SubkeyBinding,
    /// Direct key signature (0x1F).
    DirectKey,
    /// Key revocation (0x20).
    KeyRevocation,
    /// Certification revocation (0x30).
    CertificationRevocation,
    /// A class we do not implement.
    Unknown(u8),
}

impl SignatureType {
    /// Signatures over message data; verified against the data digest.
    pub fn is_data(&self) -> bool {
        matches!(u8::from(*self), 0x00 | 0x01)
    }

    /// Signatures over key material; verified against the key block.
    pub fn is_key_signature(&self) -> bool {
        matches!(u8::from(*self), 0x10..=0x17 | 0x18 | 0x20 | 0x30)
    }
}

impl From<u8> for SignatureType {
    fn from(n: u8) -> Self {
        match n {
            0x00 => SignatureType::Binary,
            0x01 => SignatureType::Text,
            0x02 => SignatureType::Standalone,
            0x10 => SignatureType::GenericCertification,
            0x11 => SignatureType::PersonaCertification,
            0x12 => SignatureType::CasualCertification,
            0x13 => SignatureType::PositiveCertification,
            0x18 => SignatureType::SubkeyBinding,
            0x1f => SignatureType::DirectKey,
            0x20 => SignatureType::KeyRevocation,
            0x30 => SignatureType::CertificationRevocation,
            n => SignatureType::Unknown(n),
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(t: SignatureType) -> u8 {
        match t {
            SignatureType::Binary => 0x00,
            SignatureType::Text => 0x01,
            SignatureType::Standalone => 0x02,
            SignatureType::GenericCertification => 0x10,
            SignatureType::PersonaCertification => 0x11,
            SignatureType::CasualCertification => 0x12,
            SignatureType::PositiveCertification => 0x13,
            SignatureType::SubkeyBinding => 0x18,
            SignatureType::DirectKey => 0x1f,
            SignatureType::KeyRevocation => 0x20,
            SignatureType::CertificationRevocation => 0x30,
            SignatureType::Unknown(n) => n,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:02x}", u8::from(*self))
    }
}

/// The format octet of a literal data packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Binary data ('b').
    Binary,
    /// Text, line endings as found ('t').
    Text,
    /// UTF-8 encoded text ('u').
    Unicode,
    /// A format octet we do not recognize.
    Unknown(u8),
}

impl From<u8> for DataFormat {
    fn from(b: u8) -> Self {
        match b {
            b'b' => DataFormat::Binary,
            b't' => DataFormat::Text,
            b'u' => DataFormat::Unicode,
            b => DataFormat::Unknown(b),
        }
    }
}

impl From<DataFormat> for u8 {
    fn from(d: DataFormat) -> u8 {
        match d {
            DataFormat::Binary => b'b',
            DataFormat::Text => b't',
            DataFormat::Unicode => b'u',
            DataFormat::Unknown(b) => b,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        for n in 0..32u8 {
            assert_eq!(u8::from(Tag::from(n)), n);
        }
    }

    #[test]
    fn signature_type_classes() {
        assert!(SignatureType::Binary.is_data());
        assert!(SignatureType::Text.is_data());
        assert!(!SignatureType::Text.is_key_signature());
        assert!(SignatureType::GenericCertification.is_key_signature());
        assert!(SignatureType::Unknown(0x15).is_key_signature());
        assert!(SignatureType::SubkeyBinding.is_key_signature());
        assert!(SignatureType::KeyRevocation.is_key_signature());
        assert!(!SignatureType::Standalone.is_data());
        assert!(!SignatureType::Standalone.is_key_signature());
    }

    #[test]
    fn armor_hash_names() {
        assert_eq!(HashAlgorithm::from_armor_name("SHA1"),
                   Some(HashAlgorithm::SHA1));
        assert_eq!(HashAlgorithm::from_armor_name("TIGER"),
                   Some(HashAlgorithm::Tiger));
        assert_eq!(HashAlgorithm::from_armor_name("SHA256"), None);
    }
}
