//! The multi-hash message digest context.
//!
//! Signature verification may need the same data under several digests:
//! a clearsigned message declares them in its `Hash:` header, a one-pass
//! group declares one per signature, and old-style signatures declare
//! nothing at all, forcing a default set.  A [`DigestContext`] keeps all
//! enabled digests running over one pass of the data.

use std::fmt;
use std::io;

use digest::Digest;
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use tiger::Tiger;

use crate::types::HashAlgorithm;
use crate::{Error, Result};

/// The set of hash algorithms a context can run.
const ALGORITHMS: [HashAlgorithm; 4] = [
    HashAlgorithm::MD5,
    HashAlgorithm::SHA1,
    HashAlgorithm::RipeMD,
    HashAlgorithm::Tiger,
];

/// A set of running hash states over the same byte stream.
///
/// Implements [`io::Write`] so it can sit behind a stream tap: bytes are
/// fed to every enabled digest in arrival order.  `Clone` copies the
/// running states, which is how a verification step obtains a digest
/// without disturbing the stream's own state.
#[derive(Clone, Default)]
pub struct DigestContext {
    md5: Option<Md5>,
    sha1: Option<Sha1>,
    ripemd: Option<Ripemd160>,
    tiger: Option<Tiger>,
}

impl DigestContext {
    /// A context with no digests enabled.
    pub fn new() -> Self {
        Default::default()
    }

    /// Starts running `algo` over the stream.  Enabling an algorithm
    /// twice is harmless; the running state is kept.
    pub fn enable(&mut self, algo: HashAlgorithm) -> Result<()> {
        match algo {
            HashAlgorithm::MD5 => {
                self.md5.get_or_insert_with(Md5::new);
            }
            HashAlgorithm::SHA1 => {
                self.sha1.get_or_insert_with(Sha1::new);
            }
            HashAlgorithm::RipeMD => {
                self.ripemd.get_or_insert_with(Ripemd160::new);
            }
            HashAlgorithm::Tiger => {
                self.tiger.get_or_insert_with(Tiger::new);
            }
            HashAlgorithm::Unknown(_) =>
                return Err(Error::UnsupportedDigestAlgorithm(algo).into()),
        }
        Ok(())
    }

    /// Whether `algo` is running.
    pub fn is_enabled(&self, algo: HashAlgorithm) -> bool {
        match algo {
            HashAlgorithm::MD5 => self.md5.is_some(),
            HashAlgorithm::SHA1 => self.sha1.is_some(),
            HashAlgorithm::RipeMD => self.ripemd.is_some(),
            HashAlgorithm::Tiger => self.tiger.is_some(),
            HashAlgorithm::Unknown(_) => false,
        }
    }

    /// The enabled algorithms, in identifier order.
    pub fn enabled(&self) -> Vec<HashAlgorithm> {
        ALGORITHMS.iter().copied()
            .filter(|&a| self.is_enabled(a))
            .collect()
    }

    /// Feeds data to every enabled digest.
    pub fn update(&mut self, data: &[u8]) {
        if let Some(d) = self.md5.as_mut() {
            d.update(data);
        }
        if let Some(d) = self.sha1.as_mut() {
            d.update(data);
        }
        if let Some(d) = self.ripemd.as_mut() {
            d.update(data);
        }
        if let Some(d) = self.tiger.as_mut() {
            d.update(data);
        }
    }

    /// Returns the digest of the bytes seen so far under `algo`,
    /// leaving the running state untouched.
    pub fn digest(&self, algo: HashAlgorithm) -> Result<Vec<u8>> {
        let out = match algo {
            HashAlgorithm::MD5 =>
                self.md5.clone().map(|d| d.finalize().to_vec()),
            HashAlgorithm::SHA1 =>
                self.sha1.clone().map(|d| d.finalize().to_vec()),
            HashAlgorithm::RipeMD =>
                self.ripemd.clone().map(|d| d.finalize().to_vec()),
            HashAlgorithm::Tiger =>
                self.tiger.clone().map(|d| d.finalize().to_vec()),
            HashAlgorithm::Unknown(_) => None,
        };
        out.ok_or_else(
            || Error::UnsupportedDigestAlgorithm(algo).into())
    }
}

impl io::Write for DigestContext {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for DigestContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DigestContext{:?}", self.enabled())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clone_is_a_snapshot() {
        let mut ctx = DigestContext::new();
        ctx.enable(HashAlgorithm::SHA1).unwrap();
        ctx.update(b"hello");
        let snapshot = ctx.clone();
        ctx.update(b" world");

        assert_eq!(snapshot.digest(HashAlgorithm::SHA1).unwrap(),
                   Sha1::digest(b"hello").to_vec());
        assert_eq!(ctx.digest(HashAlgorithm::SHA1).unwrap(),
                   Sha1::digest(b"hello world").to_vec());
    }

    #[test]
    fn update_hits_every_enabled_digest() {
        let mut ctx = DigestContext::new();
        ctx.enable(HashAlgorithm::MD5).unwrap();
        ctx.enable(HashAlgorithm::RipeMD).unwrap();
        ctx.enable(HashAlgorithm::Tiger).unwrap();
        ctx.update(b"abc");

        assert_eq!(ctx.digest(HashAlgorithm::MD5).unwrap(),
                   Md5::digest(b"abc").to_vec());
        assert_eq!(ctx.digest(HashAlgorithm::RipeMD).unwrap(),
                   Ripemd160::digest(b"abc").to_vec());
        assert_eq!(ctx.digest(HashAlgorithm::Tiger).unwrap(),
                   Tiger::digest(b"abc").to_vec());
        assert_eq!(ctx.enabled(),
                   [HashAlgorithm::MD5, HashAlgorithm::RipeMD,
                    HashAlgorithm::Tiger]);
    }

    #[test]
    fn enabling_twice_keeps_state() {
        let mut ctx = DigestContext::new();
        ctx.enable(HashAlgorithm::SHA1).unwrap();
        ctx.update(b"abc");
        ctx.enable(HashAlgorithm::SHA1).unwrap();
        assert_eq!(ctx.digest(HashAlgorithm::SHA1).unwrap(),
                   Sha1::digest(b"abc").to_vec());
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let mut ctx = DigestContext::new();
        assert!(ctx.enable(HashAlgorithm::Unknown(42)).is_err());
        assert!(ctx.digest(HashAlgorithm::SHA1).is_err());
    }
}
