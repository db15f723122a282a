//! Cryptographic state owned by the pipeline.
//!
//! The primitives themselves live behind the collaborator traits; this
//! module only holds the state the pipeline carries between packets: the
//! data encryption key and the running message digests.

mod hash;
pub use hash::DigestContext;

use std::fmt;

use crate::types::SymmetricAlgorithm;

/// A data encryption key for symmetric bulk decryption.
///
/// Holds secret material: the buffer is wiped when the key is dropped,
/// and the `Debug` representation never shows it.  There is deliberately
/// no `Clone`; a session key has a single owner at a time.
pub struct SessionKey {
    algo: SymmetricAlgorithm,
    key: Vec<u8>,
}

impl SessionKey {
    /// Wraps key material for `algo`.
    pub fn new(algo: SymmetricAlgorithm, key: Vec<u8>) -> Self {
        SessionKey { algo, key }
    }

    /// The cipher this key is for.
    pub fn algo(&self) -> SymmetricAlgorithm {
        self.algo
    }

    /// The raw key material.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        unsafe {
            ::memsec::memzero(self.key.as_mut_ptr(), self.key.len());
        }
    }
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SessionKey({}, {} bytes)", self.algo, self.key.len())
    }
}
