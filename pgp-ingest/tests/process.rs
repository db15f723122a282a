//! Sequencer and tree processor behavior with mocked collaborators.

use sha1::{Digest, Sha1};

use pgp_ingest::crypto::{DigestContext, SessionKey};
use pgp_ingest::interface::{Backend, DataSink, PacketList, PacketSource,
                            Report, SigClassification, StatusCode};
use pgp_ingest::packet::{Compressed, Encrypted, Key, Keyblock, OnePassSig,
                         Plaintext, PubkeyEnc, Signature, SymkeyEnc, UserId};
use pgp_ingest::types::{CompressionAlgorithm, DataFormat, HashAlgorithm,
                        KeyId, PublicKeyAlgorithm, SignatureType,
                        SymmetricAlgorithm};
use pgp_ingest::{process_encryption_packets, process_packets,
                 process_signature_packets, Error, Options, Packet, Result,
                 Session};

// ---- packet builders ----

fn key(id: u64) -> Packet {
    Packet::PublicKey(Key {
        version: 4,
        timestamp: 1_000_000,
        expiredate: 0,
        pubkey_algo: PublicKeyAlgorithm::Dsa,
        keyid: KeyId::new(id),
        mpis: vec![],
    })
}

fn user_id(name: &str) -> Packet {
    Packet::UserId(UserId::new(name.as_bytes().to_vec()))
}

fn sig(id: u64, class: SignatureType, algo: HashAlgorithm) -> Packet {
    Packet::Signature(Signature {
        version: 4,
        sig_class: class,
        pubkey_algo: PublicKeyAlgorithm::Dsa,
        digest_algo: algo,
        keyid: KeyId::new(id),
        timestamp: 1_000_000,
        digest_start: [0, 0],
        mpis: vec![],
    })
}

fn one_pass(id: u64, algo: HashAlgorithm, last: bool) -> Packet {
    Packet::OnePassSig(OnePassSig {
        version: 3,
        sig_class: SignatureType::Binary,
        digest_algo: algo,
        pubkey_algo: PublicKeyAlgorithm::Dsa,
        keyid: KeyId::new(id),
        last,
    })
}

fn literal(body: &[u8]) -> Packet {
    Packet::Plaintext(Plaintext {
        format: DataFormat::Binary,
        name: b"msg.txt".to_vec(),
        timestamp: 1_000_000,
        body: body.to_vec(),
    })
}

fn pubkey_enc(id: u64) -> Packet {
    Packet::PubkeyEnc(PubkeyEnc {
        version: 3,
        keyid: KeyId::new(id),
        pubkey_algo: PublicKeyAlgorithm::ElGamalEncrypt,
        mpis: vec![],
    })
}

fn encrypted() -> Packet {
    Packet::Encrypted(Encrypted {
        body: vec![0xde, 0xad, 0xbe, 0xef],
    })
}

fn compressed() -> Packet {
    Packet::Compressed(Compressed {
        algo: CompressionAlgorithm::Zip,
        body: vec![0x78, 0x9c],
    })
}

// ---- collaborators ----

#[derive(Default)]
struct TestBackend {
    /// Key ids whose session key packets we can open.
    secret_keys: Vec<u64>,
    /// What `decrypt` yields.
    decrypted: Option<Vec<Packet>>,
    /// What `decompress` yields.
    decompressed: Option<Vec<Packet>>,
    /// The digest a data signature must match to verify.
    expected: Option<(HashAlgorithm, Vec<u8>)>,
    /// Whether key signatures verify.
    key_sigs_good: bool,
    /// Whether the trust model objects to good signatures.
    trust_fails: bool,
    passphrases_asked: usize,
}

impl Backend for TestBackend {
    fn session_key(&mut self, enc: &PubkeyEnc) -> Result<SessionKey> {
        if self.secret_keys.contains(&enc.keyid.as_u64()) {
            Ok(SessionKey::new(SymmetricAlgorithm::Aes128, vec![7; 16]))
        } else {
            Err(Error::NoSecretKey(enc.keyid).into())
        }
    }

    fn passphrase_dek(&mut self, _enc: &SymkeyEnc) -> Result<SessionKey> {
        self.passphrases_asked += 1;
        Ok(SessionKey::new(SymmetricAlgorithm::Idea, vec![3; 16]))
    }

    fn decrypt(&mut self, _enc: &Encrypted, dek: &SessionKey)
               -> Result<Box<dyn PacketSource>> {
        assert!(!dek.key().is_empty());
        match self.decrypted.take() {
            Some(packets) => Ok(Box::new(PacketList::from(packets))),
            None => Err(Error::General("checksum error".into()).into()),
        }
    }

    fn decompress(&mut self, _pkt: &Compressed)
                  -> Result<Box<dyn PacketSource>> {
        match self.decompressed.take() {
            Some(packets) => Ok(Box::new(PacketList::from(packets))),
            None => Err(Error::General("corrupt stream".into()).into()),
        }
    }

    fn signature_check(&mut self, sig: &Signature, digest: DigestContext)
                       -> Result<()> {
        let (algo, ref wanted) = *self.expected.as_ref()
            .ok_or_else(|| Error::NoPublicKey(sig.keyid))?;
        if digest.digest(algo)? == *wanted {
            Ok(())
        } else {
            Err(Error::BadSignature("digest mismatch".into()).into())
        }
    }

    fn key_signature_check(&mut self, block: &Keyblock, index: usize,
                           is_selfsig: &mut bool) -> Result<()> {
        if let Some(Packet::Signature(sig)) = block.get(index) {
            *is_selfsig = block.root_keyid() == Some(sig.keyid);
        }
        if self.key_sigs_good {
            Ok(())
        } else {
            Err(Error::BadSignature("bad binding".into()).into())
        }
    }

    fn signature_trust(&mut self, _sig: &Signature) -> Result<()> {
        if self.trust_fails {
            Err(Error::General("key is not trusted".into()).into())
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct TestSink {
    delivered: Vec<u8>,
    detached: Vec<u8>,
    datafile_requests: usize,
}

impl DataSink for TestSink {
    fn plaintext(&mut self, pt: &Plaintext, md: &mut DigestContext,
                 _sigs_only: bool, _clearsig: bool) -> Result<()> {
        md.update(&pt.body);
        self.delivered.extend_from_slice(&pt.body);
        Ok(())
    }

    fn hash_datafiles(&mut self, md: &mut DigestContext, _names: &[String],
                      _sig_file: Option<&str>, _textmode: bool)
                      -> Result<()> {
        self.datafile_requests += 1;
        md.update(&self.detached);
        Ok(())
    }

    fn detached_datafile(&mut self, md: &mut DigestContext, _name: &str)
                         -> Result<()> {
        self.datafile_requests += 1;
        md.update(&self.detached);
        Ok(())
    }
}

#[derive(Default)]
struct TestReport {
    statuses: Vec<String>,
    keys: usize,
    user_ids: usize,
    signatures: Vec<(Option<char>, bool)>,
}

impl Report for TestReport {
    fn status(&mut self, code: StatusCode) {
        self.statuses.push(code.to_string());
    }

    fn key(&mut self, _key: &Key) {
        self.keys += 1;
    }

    fn user_id(&mut self, _uid: &UserId) {
        self.user_ids += 1;
    }

    fn signature(&mut self, _sig: &Signature,
                 class: Option<SigClassification>, selfsig: bool) {
        self.signatures.push((class.map(|c| c.symbol()), selfsig));
    }
}

struct Rig {
    backend: TestBackend,
    sink: TestSink,
    report: TestReport,
    opts: Options,
}

impl Rig {
    fn new() -> Self {
        Rig {
            backend: TestBackend::default(),
            sink: TestSink::default(),
            report: TestReport::default(),
            opts: Options::default(),
        }
    }

    fn full(&mut self, packets: Vec<Packet>) -> Result<()> {
        let mut source = PacketList::from(packets);
        let mut session = Session {
            backend: &mut self.backend,
            sink: &mut self.sink,
            report: &mut self.report,
            opts: self.opts,
        };
        process_packets(&mut session, &mut source)
    }

    fn sigs_only(&mut self, packets: Vec<Packet>, files: &[&str])
                 -> Result<()> {
        let mut source = PacketList::from(packets);
        let mut session = Session {
            backend: &mut self.backend,
            sink: &mut self.sink,
            report: &mut self.report,
            opts: self.opts,
        };
        process_signature_packets(&mut session, &mut source, files,
                                  Some("msg.sig"))
    }

    fn encrypt_only(&mut self, packets: Vec<Packet>) -> Result<()> {
        let mut source = PacketList::from(packets);
        let mut session = Session {
            backend: &mut self.backend,
            sink: &mut self.sink,
            report: &mut self.report,
            opts: self.opts,
        };
        process_encryption_packets(&mut session, &mut source)
    }
}

fn sha1_of(data: &[u8]) -> Vec<u8> {
    Sha1::digest(data).to_vec()
}

// ---- the tests ----

#[test]
fn key_block_is_assembled_and_listed() {
    let mut rig = Rig::new();
    rig.backend.key_sigs_good = true;
    rig.full(vec![
        key(0xAAAA),
        user_id("alice"),
        sig(0xAAAA, SignatureType::PositiveCertification,
            HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.report.keys, 1);
    assert_eq!(rig.report.user_ids, 1);
    assert_eq!(rig.report.signatures, [(Some('!'), true)]);
    assert!(rig.report.statuses.is_empty());
}

#[test]
fn each_primary_key_opens_its_own_block() {
    let mut rig = Rig::new();
    rig.opts.check_sigs = false;
    rig.opts.list_sigs = true;
    rig.full(vec![
        key(0xA),
        user_id("alice"),
        sig(0xB, SignatureType::GenericCertification, HashAlgorithm::SHA1),
        key(0xB),
        user_id("bob"),
    ]).unwrap();

    assert_eq!(rig.report.keys, 2);
    assert_eq!(rig.report.user_ids, 2);
    // Listed, not checked: no classification; issued by B over A's block.
    assert_eq!(rig.report.signatures, [(None, false)]);
}

#[test]
fn bad_key_binding_is_classified() {
    let mut rig = Rig::new();
    rig.backend.key_sigs_good = false;
    rig.full(vec![
        key(0xAAAA),
        user_id("alice"),
        sig(0xBBBB, SignatureType::GenericCertification,
            HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.report.signatures, [(Some('-'), false)]);
}

#[test]
fn one_pass_signed_message_verifies() {
    let body = b"signed body";
    let mut rig = Rig::new();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(body)));
    rig.full(vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(body),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.sink.delivered, body);
    assert_eq!(rig.report.statuses, ["GOODSIG 0000000000C0FFEE"]);
    assert_eq!(rig.report.signatures, [(Some('!'), false)]);
}

#[test]
fn mismatching_digest_is_a_bad_signature() {
    let mut rig = Rig::new();
    rig.backend.expected =
        Some((HashAlgorithm::SHA1, sha1_of(b"something else")));
    rig.full(vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(b"signed body"),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.report.statuses, ["BADSIG 0000000000C0FFEE"]);
    assert_eq!(rig.report.signatures, [(Some('-'), false)]);
}

#[test]
fn unsupported_digest_cannot_be_checked() {
    let mut rig = Rig::new();
    rig.full(vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(b"body"),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::Unknown(99)),
    ]).unwrap();

    assert_eq!(rig.report.statuses, ["ERRSIG 0000000000C0FFEE"]);
    assert_eq!(rig.report.signatures, [(Some('%'), false)]);
}

#[test]
fn missing_public_key_is_its_own_class() {
    let mut rig = Rig::new();
    rig.backend.expected = None; // signature_check reports NoPublicKey
    rig.full(vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(b"body"),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.report.statuses, ["ERRSIG 0000000000C0FFEE"]);
    assert_eq!(rig.report.signatures, [(Some('?'), false)]);
}

#[test]
fn detached_signature_hashes_external_files() {
    let data = b"the signed file contents";
    let mut rig = Rig::new();
    rig.sink.detached = data.to_vec();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(data)));
    rig.sigs_only(vec![
        sig(0xD00D, SignatureType::Binary, HashAlgorithm::SHA1),
    ], &["file.txt"]).unwrap();

    assert_eq!(rig.sink.datafile_requests, 1);
    assert_eq!(rig.report.statuses, ["GOODSIG 000000000000D00D"]);
}

#[test]
fn one_pass_group_without_data_is_detached() {
    let data = b"external data";
    let mut rig = Rig::new();
    rig.sink.detached = data.to_vec();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(data)));
    rig.sigs_only(vec![
        one_pass(0xD00D, HashAlgorithm::SHA1, true),
        sig(0xD00D, SignatureType::Binary, HashAlgorithm::SHA1),
    ], &["file.txt"]).unwrap();

    assert_eq!(rig.report.statuses, ["GOODSIG 000000000000D00D"]);
}

#[test]
fn old_style_leading_signature_is_accepted() {
    let data = b"old school";
    let mut rig = Rig::new();
    rig.sink.detached = data.to_vec();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(data)));
    rig.full(vec![
        sig(0xBEEF, SignatureType::Binary, HashAlgorithm::SHA1),
    ]).unwrap();

    assert_eq!(rig.sink.datafile_requests, 1);
    assert_eq!(rig.report.statuses, ["GOODSIG 000000000000BEEF"]);
}

#[test]
fn key_block_packets_are_rejected_in_sigs_only_mode() {
    let mut rig = Rig::new();
    let err = rig.sigs_only(vec![key(0xA)], &["f"]).unwrap_err();
    assert!(err.to_string().contains("Unexpected"), "{}", err);
}

#[test]
fn key_block_packets_are_rejected_in_encrypt_only_mode() {
    let mut rig = Rig::new();
    assert!(rig.encrypt_only(vec![user_id("mallory")]).is_err());
}

#[test]
fn orphaned_children_are_dropped_not_fatal() {
    let mut rig = Rig::new();
    rig.full(vec![user_id("nobody")]).unwrap();
    assert_eq!(rig.report.user_ids, 0);
    assert_eq!(rig.report.keys, 0);
}

#[test]
fn encrypted_then_compressed_then_signed() {
    let body = b"deeply nested plaintext";
    let mut rig = Rig::new();
    rig.backend.secret_keys = vec![0x5EC];
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(body)));
    rig.backend.decrypted = Some(vec![compressed()]);
    rig.backend.decompressed = Some(vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(body),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::SHA1),
    ]);

    rig.full(vec![pubkey_enc(0x5EC), encrypted()]).unwrap();

    assert_eq!(rig.sink.delivered, body);
    assert_eq!(rig.report.statuses, ["GOODSIG 0000000000C0FFEE"]);
}

#[test]
fn unopenable_session_key_is_not_fatal() {
    let mut rig = Rig::new();
    rig.backend.secret_keys = vec![]; // we are not a recipient
    rig.full(vec![pubkey_enc(0x5EC), encrypted()]).unwrap();
    // Decryption failed, quietly: nothing delivered, nothing reported.
    assert!(rig.sink.delivered.is_empty());
    assert!(rig.report.statuses.is_empty());
}

#[test]
fn stale_session_key_is_dropped() {
    let mut rig = Rig::new();
    rig.backend.secret_keys = vec![0x5EC];
    rig.backend.decrypted = Some(vec![literal(b"conventional")]);

    // A marker between the session key and the data invalidates the key;
    // the encrypted packet then walks the conventional passphrase path.
    rig.full(vec![pubkey_enc(0x5EC), Packet::Marker(Default::default()),
                  encrypted()]).unwrap();

    assert_eq!(rig.backend.passphrases_asked, 1);
    assert_eq!(rig.sink.delivered, b"conventional");
}

#[test]
fn trust_failure_is_fatal_only_in_batch_mode() {
    let packets = || vec![
        one_pass(0xC0FFEE, HashAlgorithm::SHA1, true),
        literal(b"body"),
        sig(0xC0FFEE, SignatureType::Binary, HashAlgorithm::SHA1),
    ];

    let mut rig = Rig::new();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(b"body")));
    rig.backend.trust_fails = true;
    rig.full(packets()).unwrap();
    assert_eq!(rig.report.statuses, ["GOODSIG 0000000000C0FFEE"]);

    let mut rig = Rig::new();
    rig.backend.expected = Some((HashAlgorithm::SHA1, sha1_of(b"body")));
    rig.backend.trust_fails = true;
    rig.opts.batch = true;
    assert!(rig.full(packets()).is_err());
}

#[test]
fn marker_and_comment_packets_are_dropped() {
    let mut rig = Rig::new();
    rig.full(vec![
        Packet::Marker(Default::default()),
        Packet::Comment(pgp_ingest::packet::Comment::new(b"hi".to_vec())),
    ]).unwrap();
    assert!(rig.report.statuses.is_empty());
}

#[test]
fn armor_failure_reports_badarmor() {
    struct BadArmorSource;
    impl PacketSource for BadArmorSource {
        fn next_packet(&mut self) -> Result<Option<Packet>> {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                Error::InvalidArmor("CRC mismatch".into())).into())
        }
    }

    let mut rig = Rig::new();
    let mut source = BadArmorSource;
    let mut session = Session {
        backend: &mut rig.backend,
        sink: &mut rig.sink,
        report: &mut rig.report,
        opts: rig.opts,
    };
    assert!(process_packets(&mut session, &mut source).is_err());
    assert_eq!(rig.report.statuses, ["BADARMOR"]);
}

#[test]
fn default_digests_cover_unannounced_signatures() {
    // Literal with no one-pass announcement, then an old-style
    // signature: the default digest set must already be running.
    let body = b"gpg 1.x layout";
    let mut rig = Rig::new();
    rig.backend.expected = Some((HashAlgorithm::RipeMD, {
        use ripemd::{Digest, Ripemd160};
        Ripemd160::digest(body).to_vec()
    }));
    rig.full(vec![
        literal(body),
        sig(0xFACE, SignatureType::Binary, HashAlgorithm::RipeMD),
    ]).unwrap();

    assert_eq!(rig.report.statuses, ["GOODSIG 000000000000FACE"]);
}
