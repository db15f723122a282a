//! Decoded packet bodies and the key block structure built from them.
//!
//! Packets arrive from an external parser with their fields already
//! decoded; the types here are the owned, routed representation.  A
//! [`Keyblock`] is the flat ordered sequence the sequencer assembles: the
//! first packet is the root, the rest are its children in document order.

use std::fmt;

use crate::types::{KeyId, PublicKeyAlgorithm, Tag};
use crate::Packet;

mod signature;
pub use signature::{OnePassSig, Signature};
mod enc;
pub use enc::{Encrypted, PubkeyEnc, S2k, SymkeyEnc};
mod literal;
pub use literal::{Compressed, Plaintext};

/// A multi-precision integer, stored big-endian without leading zeros.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Mpi {
    value: Vec<u8>,
}

impl Mpi {
    /// Wraps an integer, dropping leading zero octets.
    pub fn new(value: Vec<u8>) -> Self {
        let leading = value.iter().take_while(|&&b| b == 0).count();
        Mpi {
            value: value[leading..].to_vec(),
        }
    }

    /// The number of significant bits.
    pub fn bits(&self) -> usize {
        self.value.len() * 8
            - self.value.first().map(|b| b.leading_zeros() as usize)
                .unwrap_or(0)
    }

    /// The big-endian octets.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for Mpi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Mpi({} bits)", self.bits())
    }
}

/// A public or secret key packet body.
///
/// Whether this is a primary key or a subkey, and whether secret material
/// is attached, is carried by the [`Packet`] variant wrapping it; the body
/// fields are the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Packet version, 3 or 4.
    pub version: u8,
    /// Creation time, seconds since the epoch.
    pub timestamp: u32,
    /// Expiration in days after creation, 0 for never.  Version 3 only.
    pub expiredate: u16,
    /// The key's algorithm.
    pub pubkey_algo: PublicKeyAlgorithm,
    /// The key ID, as computed by the parser.
    pub keyid: KeyId,
    /// Algorithm-specific public material.
    pub mpis: Vec<Mpi>,
}

/// A user ID packet body.
#[derive(Clone, PartialEq, Eq)]
pub struct UserId {
    value: Vec<u8>,
}

impl UserId {
    /// Wraps the raw user ID string.
    pub fn new(value: Vec<u8>) -> Self {
        UserId { value }
    }

    /// The raw bytes, conventionally UTF-8.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "UserId({:?})", String::from_utf8_lossy(&self.value))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.value))
    }
}

/// A marker packet.  Carries nothing we act on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Marker {}

/// A comment packet.  Dropped by the sequencer after logging.
#[derive(Clone, PartialEq, Eq)]
pub struct Comment {
    value: Vec<u8>,
}

impl Comment {
    /// Wraps the comment text.
    pub fn new(value: Vec<u8>) -> Self {
        Comment { value }
    }

    /// The raw bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Comment({:?})", String::from_utf8_lossy(&self.value))
    }
}

/// An ordered key block: a root packet followed by its children.
///
/// Grouping is implicit in packet order, exactly as transmitted: a primary
/// key is followed by its user IDs, subkeys, and signatures; a one-pass
/// group is one or more one-pass packets followed, after the data, by
/// their signatures.  Appending and sequential traversal are all the
/// processing pass needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyblock {
    packets: Vec<Packet>,
}

impl Keyblock {
    /// A block containing only its root.
    pub fn new(root: Packet) -> Self {
        Keyblock {
            packets: vec![root],
        }
    }

    /// Appends a child in document order.
    pub fn push(&mut self, packet: Packet) {
        self.packets.push(packet);
    }

    /// The root packet.  A key block is never empty.
    pub fn root(&self) -> &Packet {
        &self.packets[0]
    }

    /// The root packet's tag.
    pub fn root_tag(&self) -> Tag {
        self.root().tag()
    }

    /// The number of packets, root included.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Walks the packets in document order, root first.
    pub fn iter(&self) -> std::slice::Iter<Packet> {
        self.packets.iter()
    }

    /// The packet at `index`, the root being index zero.
    pub fn get(&self, index: usize) -> Option<&Packet> {
        self.packets.get(index)
    }

    /// The key ID of the root key, if the root is a key packet.
    pub fn root_keyid(&self) -> Option<KeyId> {
        match self.root() {
            Packet::PublicKey(k) | Packet::PublicSubkey(k)
            | Packet::SecretKey(k) | Packet::SecretSubkey(k) => Some(k.keyid),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a Keyblock {
    type Item = &'a Packet;
    type IntoIter = std::slice::Iter<'a, Packet>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mpi_strips_leading_zeros() {
        let m = Mpi::new(vec![0, 0, 0x01, 0xff]);
        assert_eq!(m.value(), &[0x01, 0xff]);
        assert_eq!(m.bits(), 9);
    }

    #[test]
    fn keyblock_order_is_document_order() {
        let mut kb = Keyblock::new(Packet::Marker(Marker::default()));
        kb.push(Packet::Comment(Comment::new(b"a".to_vec())));
        kb.push(Packet::Comment(Comment::new(b"b".to_vec())));
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.root_tag(), Tag::Marker);
        let tags: Vec<Tag> = kb.iter().map(|p| p.tag()).collect();
        assert_eq!(tags, [Tag::Marker, Tag::Comment, Tag::Comment]);
    }
}
