//! Radix-64: streaming base64 with whitespace tolerance and a running
//! CRC-24 over the decoded bytes.

use lazy_static::lazy_static;

use crate::Error;

type Result<T> = std::result::Result<T, Error>;

pub(crate) const CRC24_INIT: u32 = 0xB704CE;
pub(crate) const CRC24_POLY: u32 = 0x1864CFB;

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

lazy_static! {
    /// Maps an input byte to its sextet, or -1.
    static ref DECODE: [i8; 256] = {
        let mut t = [-1i8; 256];
        for (i, &c) in ALPHABET.iter().enumerate() {
            t[c as usize] = i as i8;
        }
        t
    };
}

/// The running CRC-24 (see RFC 4880, section 6.1).
#[derive(Debug, Clone)]
pub(crate) struct Crc24 {
    n: u32,
}

impl Crc24 {
    pub fn new() -> Self {
        Crc24 { n: CRC24_INIT }
    }

    pub fn update(&mut self, buf: &[u8]) -> &Self {
        for octet in buf {
            self.n ^= (*octet as u32) << 16;
            for _ in 0..8 {
                self.n <<= 1;
                if self.n & 0x1000000 > 0 {
                    self.n ^= CRC24_POLY;
                }
            }
        }
        self
    }

    pub fn finalize(&self) -> u32 {
        self.n & 0xFFFFFF
    }
}

/// Streaming decoder for one armor body.
///
/// Whitespace is ignored, other characters outside the alphabet are
/// logged and skipped, and `=` padding ends the data.  The CRC runs over
/// the decoded output.
#[derive(Debug)]
pub(crate) struct Decoder {
    quantum: [u8; 4],
    idx: usize,
    crc: Crc24,
    done: bool,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder {
            quantum: [0; 4],
            idx: 0,
            crc: Crc24::new(),
            done: false,
        }
    }

    /// Whether `=` padding has been seen; no further data may follow.
    pub fn padded(&self) -> bool {
        self.done
    }

    /// The CRC over everything decoded so far.
    pub fn crc(&self) -> u32 {
        self.crc.finalize()
    }

    /// Decodes one line of body text, appending the bytes to `out`.
    pub fn decode_line(&mut self, line: &[u8], out: &mut Vec<u8>)
                       -> Result<()> {
        for &b in line {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => continue,
                b'=' => {
                    self.flush_partial(out)?;
                    self.done = true;
                }
                b => {
                    if self.done {
                        log::warn!("radix-64 data after padding skipped");
                        continue;
                    }
                    let sextet = DECODE[b as usize];
                    if sextet < 0 {
                        log::warn!(
                            "invalid radix-64 character 0x{:02x} skipped",
                            b);
                        continue;
                    }
                    self.quantum[self.idx] = sextet as u8;
                    self.idx += 1;
                    if self.idx == 4 {
                        self.emit_full(out);
                    }
                }
            }
        }
        Ok(())
    }

    /// Ends the data section, flushing a final unpadded quantum.
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<()> {
        if !self.done {
            self.flush_partial(out)?;
            self.done = true;
        }
        Ok(())
    }

    fn emit_full(&mut self, out: &mut Vec<u8>) {
        let q = &self.quantum;
        let bytes = [
            (q[0] << 2) | (q[1] >> 4),
            (q[1] << 4) | (q[2] >> 2),
            (q[2] << 6) | q[3],
        ];
        self.crc.update(&bytes);
        out.extend_from_slice(&bytes);
        self.idx = 0;
    }

    fn flush_partial(&mut self, out: &mut Vec<u8>) -> Result<()> {
        let q = &self.quantum;
        let bytes: &[u8] = match self.idx {
            0 => &[],
            1 => return Err(Error::InvalidArmor(
                "truncated radix-64 quantum".into())),
            2 => &[(q[0] << 2) | (q[1] >> 4)],
            3 => &[(q[0] << 2) | (q[1] >> 4), (q[1] << 4) | (q[2] >> 2)],
            _ => unreachable!("quantum flushed at four sextets"),
        };
        self.crc.update(bytes);
        out.extend_from_slice(bytes);
        self.idx = 0;
        Ok(())
    }
}
