//! The seams between the pipeline and its collaborators.
//!
//! Everything the pipeline consumes but does not implement is a trait
//! here: the packet parser ([`PacketSource`]), cryptography, key lookup
//! and trust ([`Backend`]), literal data delivery and detached data
//! hashing ([`DataSink`]), and machine-readable reporting ([`Report`]).
//!
//! [`PacketList`] and [`WriteSink`] are small concrete implementations
//! for callers that have everything in memory; they also serve the test
//! suites.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};

use pull_filter::{FilterReader, Source, Tap};

use crate::crypto::{DigestContext, SessionKey};
use crate::packet::{Compressed, Encrypted, Key, Keyblock, Plaintext,
                    PubkeyEnc, Signature, SymkeyEnc, UserId};
use crate::types::KeyId;
use crate::{Packet, Result};

/// Pulls decoded packets out of a byte stream.
///
/// Packet byte parsing is not this crate's business; a `PacketSource` is
/// the seam where a parser plugs in.  `Ok(None)` is the orderly end of
/// the stream; an error abandons it.
pub trait PacketSource {
    /// The next packet, or `None` at end of stream.
    fn next_packet(&mut self) -> Result<Option<Packet>>;
}

/// A `PacketSource` over packets already in memory.
#[derive(Debug, Default)]
pub struct PacketList {
    packets: VecDeque<Packet>,
}

impl From<Vec<Packet>> for PacketList {
    fn from(packets: Vec<Packet>) -> Self {
        PacketList {
            packets: packets.into(),
        }
    }
}

impl PacketSource for PacketList {
    fn next_packet(&mut self) -> Result<Option<Packet>> {
        Ok(self.packets.pop_front())
    }
}

/// Cryptography, key lookup, and trust.
///
/// The pipeline routes bytes and state; every primitive operation goes
/// through here.
pub trait Backend {
    /// Decrypts the session key in `enc` with the matching secret key.
    fn session_key(&mut self, enc: &PubkeyEnc) -> Result<SessionKey>;

    /// Derives a key from a passphrase per the packet's specifier.
    fn passphrase_dek(&mut self, enc: &SymkeyEnc) -> Result<SessionKey>;

    /// Bulk-decrypts `enc`, returning the contained packet stream.
    fn decrypt(&mut self, enc: &Encrypted, dek: &SessionKey)
               -> Result<Box<dyn PacketSource>>;

    /// Decompresses `pkt`, returning the contained packet stream.
    fn decompress(&mut self, pkt: &Compressed)
                  -> Result<Box<dyn PacketSource>>;

    /// Verifies a data signature against the digest accumulated over the
    /// signed bytes.
    fn signature_check(&mut self, sig: &Signature, digest: DigestContext)
                       -> Result<()>;

    /// Verifies the key signature at `index` inside `block`, setting
    /// `is_selfsig` when the issuer is the block's own root key.
    fn key_signature_check(&mut self, block: &Keyblock, index: usize,
                           is_selfsig: &mut bool) -> Result<()>;

    /// The trust model's verdict on a signature that verified.
    fn signature_trust(&mut self, sig: &Signature) -> Result<()>;
}

/// Where literal data goes, and where detached data comes from.
pub trait DataSink {
    /// Delivers a literal data packet, feeding every delivered byte to
    /// `md` in the same order and quantity.
    fn plaintext(&mut self, pt: &Plaintext, md: &mut DigestContext,
                 sigs_only: bool, clearsig: bool) -> Result<()>;

    /// Hashes the named detached data files into `md`.  `sig_file` names
    /// the signature the data belongs to, for diagnostics; `textmode`
    /// requests canonical CR-LF line endings.
    fn hash_datafiles(&mut self, md: &mut DigestContext, names: &[String],
                      sig_file: Option<&str>, textmode: bool) -> Result<()>;

    /// Obtains the detached data for an in-band signature with no data,
    /// hashing it into `md`.  `name` is a hint where it might be found.
    fn detached_datafile(&mut self, md: &mut DigestContext, name: &str)
                         -> Result<()>;
}

/// A machine-readable status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// A signature verified.
    GoodSig(KeyId),
    /// A signature failed verification.
    BadSig(KeyId),
    /// A signature could not be checked at all.
    ErrSig(KeyId),
    /// The armor layer failed.
    BadArmor,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StatusCode::GoodSig(k) => write!(f, "GOODSIG {}", k),
            StatusCode::BadSig(k) => write!(f, "BADSIG {}", k),
            StatusCode::ErrSig(k) => write!(f, "ERRSIG {}", k),
            StatusCode::BadArmor => f.write_str("BADARMOR"),
        }
    }
}

/// The outcome class of a checked signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigClassification {
    /// Verified.
    Good,
    /// Failed verification.
    Bad,
    /// The issuing key is not available.
    NoPubkey,
    /// Any other failure.
    Other,
}

impl SigClassification {
    /// The one-character marker used in listings.
    pub fn symbol(&self) -> char {
        match self {
            SigClassification::Good => '!',
            SigClassification::Bad => '-',
            SigClassification::NoPubkey => '?',
            SigClassification::Other => '%',
        }
    }
}

/// Listing and status events from the tree processor.
///
/// Only [`Report::status`] is mandatory; the listing callbacks default to
/// doing nothing.
pub trait Report {
    /// A status line.
    fn status(&mut self, code: StatusCode);

    /// A key encountered while listing a key block.
    fn key(&mut self, _key: &Key) {}

    /// A user ID encountered while listing a key block.
    fn user_id(&mut self, _uid: &UserId) {}

    /// A signature, classified when checking was on.  `selfsig` is set
    /// when the issuer is the block's own root key.
    fn signature(&mut self, _sig: &Signature,
                 _class: Option<SigClassification>, _selfsig: bool) {}
}

/// A [`DataSink`] that writes literal data to an [`io::Write`].
///
/// The digest tap sits directly below the sink, so the digests see the
/// bytes exactly as delivered.  Detached data is read from the named
/// files.
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    sink: W,
}

impl<W: Write> WriteSink<W> {
    /// Delivers literal data to `sink`.
    pub fn new(sink: W) -> Self {
        WriteSink { sink }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> DataSink for WriteSink<W> {
    fn plaintext(&mut self, pt: &Plaintext, md: &mut DigestContext,
                 _sigs_only: bool, _clearsig: bool) -> Result<()> {
        let tap = Tap::new(Source::new(&pt.body[..]), &mut *md);
        let mut reader = FilterReader::new(tap);
        io::copy(&mut reader, &mut self.sink)?;
        self.sink.flush()?;
        Ok(())
    }

    fn hash_datafiles(&mut self, md: &mut DigestContext, names: &[String],
                      sig_file: Option<&str>, textmode: bool) -> Result<()> {
        if names.is_empty() {
            log::error!("no signed data for {}",
                        sig_file.unwrap_or("signature"));
            return Err(crate::Error::General(
                "no signed data files".into()).into());
        }
        for name in names {
            hash_file(md, name, textmode)?;
        }
        Ok(())
    }

    fn detached_datafile(&mut self, md: &mut DigestContext, name: &str)
                         -> Result<()> {
        hash_file(md, name, false)
    }
}

/// Streams one file into the digest context, canonicalizing line endings
/// to CR-LF in text mode.
fn hash_file(md: &mut DigestContext, name: &str, textmode: bool)
             -> Result<()> {
    let mut file = File::open(name)?;
    if !textmode {
        io::copy(&mut file, md)?;
        return Ok(());
    }

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    for line in data.split_inclusive(|&b| b == b'\n') {
        let line = match line.last() {
            Some(b'\n') => {
                let line = &line[..line.len() - 1];
                line.strip_suffix(b"\r").unwrap_or(line)
            }
            _ => line,
        };
        md.update(line);
        md.update(b"\r\n");
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{DataFormat, HashAlgorithm};

    #[test]
    fn write_sink_taps_delivered_bytes() {
        let pt = Plaintext {
            format: DataFormat::Binary,
            name: b"x".to_vec(),
            timestamp: 1,
            body: b"payload".to_vec(),
        };
        let mut md = DigestContext::new();
        md.enable(HashAlgorithm::SHA1).unwrap();

        let mut sink = WriteSink::new(Vec::new());
        sink.plaintext(&pt, &mut md, false, false).unwrap();

        assert_eq!(sink.into_inner(), b"payload");
        use sha1::{Digest, Sha1};
        assert_eq!(md.digest(HashAlgorithm::SHA1).unwrap(),
                   Sha1::digest(b"payload").to_vec());
    }

    #[test]
    fn status_lines_are_stable() {
        let id = KeyId::new(0x1234_5678_9ABC_DEF0);
        assert_eq!(StatusCode::GoodSig(id).to_string(),
                   "GOODSIG 123456789ABCDEF0");
        assert_eq!(StatusCode::BadArmor.to_string(), "BADARMOR");
    }
}
