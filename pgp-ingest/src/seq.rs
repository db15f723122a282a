//! The packet sequencer.
//!
//! Consumes parsed packets one by one, assembles them into key blocks,
//! and routes the rest: session key packets feed the pending data
//! encryption key, encrypted and compressed packets recurse over their
//! contained streams, literal data opens the digest context and flows to
//! the sink.  A completed key block is handed to the tree processor (see
//! `proc`).

use crate::crypto::{DigestContext, SessionKey};
use crate::interface::{Backend, DataSink, PacketSource, Report, StatusCode};
use crate::packet::{Keyblock, SymkeyEnc};
use crate::types::{HashAlgorithm, Tag};
use crate::{Error, Packet, Result};

/// Knobs for a processing session.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Verify key signatures while listing key blocks.
    pub check_sigs: bool,
    /// Report key signatures even when not checking them.
    pub list_sigs: bool,
    /// Unattended operation: a trust failure on a good signature is
    /// fatal instead of a warning.
    pub batch: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            check_sigs: true,
            list_sigs: false,
            batch: false,
        }
    }
}

/// The collaborators and options of one processing run.
pub struct Session<'a> {
    /// Cryptography, key lookup, and trust.
    pub backend: &'a mut dyn Backend,
    /// Literal data delivery and detached data hashing.
    pub sink: &'a mut dyn DataSink,
    /// Status and listing events.
    pub report: &'a mut dyn Report,
    /// Session knobs.
    pub opts: Options,
}

/// What the sequencer will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Full,
    SigsOnly,
    EncryptOnly,
}

/// One-step lookback: what the previous packet contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastEsk {
    None,
    Pubkey,
    Symkey,
}

pub(crate) struct Ctx {
    pub(crate) mode: Mode,
    pub(crate) list: Option<Keyblock>,
    pub(crate) dek: Option<SessionKey>,
    pub(crate) mfx: Option<DigestContext>,
    pub(crate) have_data: bool,
    pub(crate) signed_files: Vec<String>,
    pub(crate) sig_file: Option<String>,
    last_esk: LastEsk,
}

/// Processes an arbitrary packet stream: key blocks, encrypted messages,
/// signed messages, or any mix.
pub fn process_packets(session: &mut Session,
                       source: &mut dyn PacketSource) -> Result<()> {
    Ctx::new(Mode::Full).process(session, source)
}

/// Processes a detached signature: only signature-relevant packets are
/// accepted, and the signed data is taken from `signed_files`.
pub fn process_signature_packets(session: &mut Session,
                                 source: &mut dyn PacketSource,
                                 signed_files: &[&str],
                                 sig_file: Option<&str>) -> Result<()> {
    let mut ctx = Ctx::new(Mode::SigsOnly);
    ctx.signed_files = signed_files.iter().map(|s| s.to_string()).collect();
    ctx.sig_file = sig_file.map(Into::into);
    ctx.process(session, source)
}

/// Processes an encrypted message: key block packets are rejected.
pub fn process_encryption_packets(session: &mut Session,
                                  source: &mut dyn PacketSource)
                                  -> Result<()> {
    Ctx::new(Mode::EncryptOnly).process(session, source)
}

impl Ctx {
    fn new(mode: Mode) -> Self {
        Ctx {
            mode,
            list: None,
            dek: None,
            mfx: None,
            have_data: false,
            signed_files: Vec::new(),
            sig_file: None,
            last_esk: LastEsk::None,
        }
    }

    fn process(&mut self, session: &mut Session,
               source: &mut dyn PacketSource) -> Result<()> {
        match self.run(session, source) {
            Ok(()) => self.release_list(session),
            Err(e) => {
                if is_armor_error(&e) {
                    session.report.status(StatusCode::BadArmor);
                }
                // Secret material and the partial block are dropped
                // unprocessed.
                self.list = None;
                self.dek = None;
                self.mfx = None;
                Err(e)
            }
        }
    }

    /// The packet loop.  Recoverable failures are logged and the packet
    /// is dropped; parser failures and forbidden packets end the stream.
    fn run(&mut self, session: &mut Session,
           source: &mut dyn PacketSource) -> Result<()> {
        while let Some(pkt) = source.next_packet()? {
            // A held session key that was not followed by an encrypted
            // packet belongs to a recipient we did not become; forget it.
            if self.dek.is_some() && pkt.tag() != Tag::Encrypted {
                log::info!("dropping unused session key");
                self.dek = None;
            }

            if let Some(tag) = self.forbidden(&pkt) {
                log::error!("{} packet not allowed in this mode", tag);
                return Err(Error::Unexpected(tag).into());
            }

            let mut next_esk = LastEsk::None;
            match pkt {
                Packet::PublicKey(_) | Packet::SecretKey(_) =>
                    self.add_root(session, pkt)?,
                Packet::PublicSubkey(_) | Packet::SecretSubkey(_)
                | Packet::UserId(_) =>
                    self.add_child(pkt),
                Packet::Signature(_) =>
                    self.add_signature(pkt),
                Packet::OnePassSig(_) =>
                    self.add_onepass_sig(session, pkt)?,
                Packet::PubkeyEnc(ref pe) => {
                    self.proc_pubkey_enc(session, pe);
                    next_esk = LastEsk::Pubkey;
                }
                Packet::SymkeyEnc(ref se) => {
                    self.proc_symkey_enc(session, se);
                    next_esk = LastEsk::Symkey;
                }
                Packet::Encrypted(ref enc) =>
                    self.proc_encrypted(session, enc)?,
                Packet::Plaintext(ref pt) =>
                    self.proc_plaintext(session, pt)?,
                Packet::Compressed(ref cd) =>
                    self.proc_compressed(session, cd)?,
                Packet::Marker(_) =>
                    log::debug!("marker packet ignored"),
                Packet::Comment(ref c) =>
                    log::info!("{:?} ignored", c),
            }
            self.last_esk = next_esk;
        }
        Ok(())
    }

    /// The packet types the current mode refuses to see.
    fn forbidden(&self, pkt: &Packet) -> Option<Tag> {
        let tag = pkt.tag();
        let reject = match self.mode {
            Mode::Full => false,
            Mode::SigsOnly => matches!(
                tag,
                Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey
                    | Tag::SecretSubkey | Tag::UserId | Tag::Encrypted
                    | Tag::PubkeyEnc | Tag::SymkeyEnc),
            Mode::EncryptOnly => matches!(
                tag,
                Tag::PublicKey | Tag::PublicSubkey | Tag::SecretKey
                    | Tag::SecretSubkey | Tag::UserId),
        };
        reject.then_some(tag)
    }

    /// A primary key flushes whatever came before it and roots a new
    /// block.
    fn add_root(&mut self, session: &mut Session, pkt: Packet)
                -> Result<()> {
        self.release_list(session)?;
        self.list = Some(Keyblock::new(pkt));
        Ok(())
    }

    /// Subkeys and user IDs attach to the most recent root.
    fn add_child(&mut self, pkt: Packet) {
        match self.list {
            Some(ref mut kb) if kb.root_tag() != Tag::OnePassSig =>
                kb.push(pkt),
            Some(_) => log::error!(
                "{} cannot join a one-pass signature group", pkt.tag()),
            None => log::error!("{}", Error::Orphan(pkt.tag())),
        }
    }

    fn add_signature(&mut self, pkt: Packet) {
        match self.list {
            Some(ref mut kb) => kb.push(pkt),
            None => {
                // An old-style signed document leads with the bare
                // signature.
                self.list = Some(Keyblock::new(pkt));
            }
        }
    }

    fn add_onepass_sig(&mut self, session: &mut Session, pkt: Packet)
                       -> Result<()> {
        match self.list {
            Some(ref mut kb) if kb.root_tag() == Tag::OnePassSig => {
                kb.push(pkt);
                Ok(())
            }
            Some(_) => {
                log::error!("one-pass signature cuts into an open block");
                self.add_root_onepass(session, pkt)
            }
            None => {
                self.list = Some(Keyblock::new(pkt));
                Ok(())
            }
        }
    }

    fn add_root_onepass(&mut self, session: &mut Session, pkt: Packet)
                        -> Result<()> {
        self.release_list(session)?;
        self.list = Some(Keyblock::new(pkt));
        Ok(())
    }

    fn proc_pubkey_enc(&mut self, session: &mut Session,
                       pe: &crate::packet::PubkeyEnc) {
        if self.dek.is_some() {
            log::debug!("session key already there, skipping {}", pe.keyid);
            return;
        }
        match session.backend.session_key(pe) {
            Ok(dek) => self.dek = Some(dek),
            Err(e) =>
                log::info!("public key decryption failed for {}: {}",
                           pe.keyid, e),
        }
    }

    fn proc_symkey_enc(&mut self, session: &mut Session, se: &SymkeyEnc) {
        if self.dek.is_some() {
            log::debug!("session key already there, skipping passphrase");
            return;
        }
        match session.backend.passphrase_dek(se) {
            Ok(dek) => self.dek = Some(dek),
            Err(e) => log::info!("passphrase key derivation failed: {}", e),
        }
    }

    fn proc_encrypted(&mut self, session: &mut Session,
                      enc: &crate::packet::Encrypted) -> Result<()> {
        let dek = match self.dek.take() {
            Some(dek) => Some(dek),
            None if self.last_esk == LastEsk::None => {
                // No session key packet at all: conventionally encrypted
                // data from before session key packets existed.
                log::info!("assuming conventionally encrypted data");
                match session.backend.passphrase_dek(&SymkeyEnc::legacy()) {
                    Ok(dek) => Some(dek),
                    Err(e) => {
                        log::error!("passphrase key derivation failed: {}",
                                    e);
                        None
                    }
                }
            }
            None => None,
        };

        let dek = match dek {
            Some(dek) => dek,
            None => {
                log::error!("decryption failed: no session key");
                return Ok(());
            }
        };

        match session.backend.decrypt(enc, &dek) {
            Ok(mut inner) => {
                drop(dek); // wiped
                self.run(session, &mut *inner)
            }
            Err(e) => {
                log::error!("decryption failed: {}", e);
                Ok(())
            }
        }
    }

    fn proc_plaintext(&mut self, session: &mut Session,
                      pt: &crate::packet::Plaintext) -> Result<()> {
        if pt.name == b"_CONSOLE" {
            log::info!("sender requested \"for-your-eyes-only\"");
        }

        let mut md = DigestContext::new();
        let mut any = false;
        if let Some(ref kb) = self.list {
            for p in kb {
                if let Packet::OnePassSig(ops) = p {
                    match md.enable(ops.digest_algo) {
                        Ok(()) => any = true,
                        Err(e) => log::warn!("{}", e),
                    }
                }
            }
        }
        if !any {
            // Old-style signatures announce nothing in advance; hash
            // everything they might use.
            for algo in [HashAlgorithm::RipeMD, HashAlgorithm::SHA1,
                         HashAlgorithm::MD5] {
                md.enable(algo)?;
            }
        }

        session.sink.plaintext(pt, &mut md,
                               self.mode == Mode::SigsOnly,
                               pt.is_clearsig())?;
        self.mfx = Some(md);
        self.have_data = true;
        Ok(())
    }

    fn proc_compressed(&mut self, session: &mut Session,
                       cd: &crate::packet::Compressed) -> Result<()> {
        match session.backend.decompress(cd) {
            Ok(mut inner) => self.run(session, &mut *inner),
            Err(e) => {
                log::error!("uncompressing failed: {}", e);
                Ok(())
            }
        }
    }

    /// Flushes the open block through the tree processor and resets the
    /// per-message state.
    pub(crate) fn release_list(&mut self, session: &mut Session)
                               -> Result<()> {
        let result = match self.list.take() {
            Some(kb) => self.proc_tree(session, &kb),
            None => Ok(()),
        };
        self.dek = None;
        self.mfx = None;
        self.have_data = false;
        self.last_esk = LastEsk::None;
        result
    }
}

/// Whether the error chain bottoms out in an armor failure.
fn is_armor_error(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        let direct = cause.downcast_ref::<Error>();
        let in_io = cause.downcast_ref::<std::io::Error>()
            .and_then(|io| io.get_ref())
            .and_then(|inner| inner.downcast_ref::<Error>());
        matches!(direct.or(in_io),
                 Some(Error::InvalidArmor(_))
                 | Some(Error::LineTooLong(_))
                 | Some(Error::IncompleteLine))
    })
}
