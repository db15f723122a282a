//! The tree processor.
//!
//! Walks an assembled key block and drives checking: key blocks are
//! listed and their binding signatures verified, one-pass groups and
//! old-style signed documents have their data signatures checked against
//! the accumulated digest, hashing detached data first when the stream
//! carried none.

use crate::crypto::DigestContext;
use crate::interface::{SigClassification, StatusCode};
use crate::packet::Keyblock;
use crate::seq::{Ctx, Mode, Session};
use crate::types::SignatureType;
use crate::{Error, Packet, Result};

impl Ctx {
    pub(crate) fn proc_tree(&mut self, session: &mut Session,
                            kb: &Keyblock) -> Result<()> {
        match kb.root() {
            p if p.is_key() => self.list_keyblock(session, kb),
            Packet::OnePassSig(_) => self.check_onepass_group(session, kb),
            Packet::Signature(_) => self.check_old_style(session, kb),
            p => {
                log::debug!("{} cannot root a block, dropped", p.tag());
                Ok(())
            }
        }
    }

    /// Lists a key block and, on request, verifies its binding
    /// signatures.
    fn list_keyblock(&mut self, session: &mut Session, kb: &Keyblock)
                     -> Result<()> {
        let root_keyid = kb.root_keyid();

        for (index, p) in kb.iter().enumerate() {
            match p {
                Packet::PublicKey(k) | Packet::PublicSubkey(k)
                | Packet::SecretKey(k) | Packet::SecretSubkey(k) =>
                    session.report.key(k),
                Packet::UserId(uid) => session.report.user_id(uid),
                Packet::Signature(sig) => {
                    let mut selfsig = root_keyid == Some(sig.keyid);
                    if session.opts.check_sigs {
                        let class = match self.do_check_sig(
                            session, kb, index, &mut selfsig)
                        {
                            Ok(()) => SigClassification::Good,
                            Err(e) => {
                                log::info!("signature check failed: {}", e);
                                classify(&e)
                            }
                        };
                        session.report.signature(sig, Some(class), selfsig);
                    } else if session.opts.list_sigs {
                        session.report.signature(sig, None, selfsig);
                    }
                }
                p => log::debug!("{} inside a key block ignored", p.tag()),
            }
        }
        Ok(())
    }

    /// A one-pass group: every trailing signature is checked against the
    /// data digest.
    fn check_onepass_group(&mut self, session: &mut Session, kb: &Keyblock)
                           -> Result<()> {
        if !self.have_data {
            self.hash_detached_data(session, kb)?;
        }

        for (index, p) in kb.iter().enumerate() {
            if matches!(p, Packet::Signature(_)) {
                self.check_sig_and_report(session, kb, index)?;
            }
        }
        Ok(())
    }

    /// An old-style signed document: the bare signature roots the block
    /// and there is no one-pass announcement.
    fn check_old_style(&mut self, session: &mut Session, kb: &Keyblock)
                       -> Result<()> {
        if !self.have_data {
            self.hash_detached_data(session, kb)?;
        }
        self.check_sig_and_report(session, kb, 0)
    }

    /// The signed data is out of band: build the digest context from the
    /// signatures' declarations and feed it the detached files.
    fn hash_detached_data(&mut self, session: &mut Session, kb: &Keyblock)
                          -> Result<()> {
        let mut md = DigestContext::new();
        let mut textmode = false;
        for p in kb {
            match p {
                Packet::Signature(sig) => {
                    if let Err(e) = md.enable(sig.digest_algo) {
                        log::warn!("{}", e);
                    }
                }
                Packet::OnePassSig(ops) => {
                    if ops.sig_class == SignatureType::Text {
                        textmode = true;
                    }
                }
                _ => (),
            }
        }

        if self.mode == Mode::SigsOnly {
            session.sink.hash_datafiles(&mut md, &self.signed_files,
                                        self.sig_file.as_deref(),
                                        textmode)?;
        } else {
            let hint = self.sig_file.clone().unwrap_or_default();
            session.sink.detached_datafile(&mut md, &hint)?;
        }

        self.mfx = Some(md);
        Ok(())
    }

    /// Checks one data signature, emits the status line, and runs the
    /// trust model on success.
    fn check_sig_and_report(&mut self, session: &mut Session,
                            kb: &Keyblock, index: usize) -> Result<()> {
        let sig = match kb.get(index) {
            Some(Packet::Signature(sig)) => sig,
            _ => return Ok(()),
        };

        let mut selfsig = false;
        match self.do_check_sig(session, kb, index, &mut selfsig) {
            Ok(()) => {
                log::info!("good signature from {}", sig.keyid);
                session.report.status(StatusCode::GoodSig(sig.keyid));
                session.report.signature(sig, Some(SigClassification::Good),
                                         selfsig);
                if let Err(e) = session.backend.signature_trust(sig) {
                    if session.opts.batch {
                        return Err(e);
                    }
                    log::warn!("trust check failed: {}", e);
                }
            }
            Err(e) => {
                let class = classify(&e);
                let code = match class {
                    SigClassification::Bad => StatusCode::BadSig(sig.keyid),
                    _ => StatusCode::ErrSig(sig.keyid),
                };
                match class {
                    SigClassification::Bad =>
                        log::error!("BAD signature from {}", sig.keyid),
                    _ => log::error!("can't check signature from {}: {}",
                                     sig.keyid, e),
                }
                session.report.status(code);
                session.report.signature(sig, Some(class), selfsig);
            }
        }
        Ok(())
    }

    /// Verifies the signature at `index`, routing by class: data classes
    /// go against a copy of the data digest, key classes against the
    /// enclosing block.
    fn do_check_sig(&mut self, session: &mut Session, kb: &Keyblock,
                    index: usize, is_selfsig: &mut bool) -> Result<()> {
        let sig = match kb.get(index) {
            Some(Packet::Signature(sig)) => sig,
            _ => return Err(Error::General(
                "node is not a signature".into()).into()),
        };

        if u8::from(sig.digest_algo) == 0 || !sig.digest_algo.is_supported()
        {
            return Err(
                Error::UnsupportedDigestAlgorithm(sig.digest_algo).into());
        }

        if sig.sig_class.is_data() {
            let md = match self.mfx {
                Some(ref md) => md.clone(),
                None => return Err(Error::General(
                    "no data was hashed for this signature".into()).into()),
            };
            session.backend.signature_check(sig, md)
        } else if sig.sig_class.is_key_signature() {
            if !kb.root().is_key() {
                return Err(Error::UnsupportedSigClass(
                    u8::from(sig.sig_class)).into());
            }
            session.backend.key_signature_check(kb, index, is_selfsig)
        } else {
            Err(Error::UnsupportedSigClass(u8::from(sig.sig_class)).into())
        }
    }
}

/// Maps a verification failure to its listing class.
fn classify(e: &anyhow::Error) -> SigClassification {
    for cause in e.chain() {
        match cause.downcast_ref::<Error>() {
            Some(Error::BadSignature(_)) => return SigClassification::Bad,
            Some(Error::NoPublicKey(_)) =>
                return SigClassification::NoPubkey,
            Some(_) => return SigClassification::Other,
            None => (),
        }
    }
    SigClassification::Other
}
