//! Chained pull-based byte filters.
//!
//! A filter transforms a byte stream.  Filters stack: each one owns the
//! filter below it and pulls input from it on demand, so a whole stack is
//! driven by a single consumer at the top.  This is the same layering that
//! a stack of buffered readers provides, reduced to the four operations a
//! stream transformer actually needs: set up, produce bytes, flush, and
//! tear down.
//!
//! The crate knows nothing about what flows through it.  It provides the
//! [`Filter`] trait, a [`Source`] to put an [`io::Read`] at the bottom of a
//! stack, a [`Tap`] that mirrors the stream into an observer without
//! changing it, and a [`FilterReader`] that turns a stack back into an
//! [`io::Read`] for consumers that expect one.
//!
//! # Discipline
//!
//! A stack has exactly one consumer.  [`Filter::init`] runs before the
//! first [`Filter::pull`]; [`Filter::close`] runs on every exit path,
//! including unwinding, which [`FilterReader`] guarantees via its `Drop`
//! implementation.  Filters are not thread-safe and may only block while
//! pulling from the filter below.

use std::io::{self, Read, Write};

/// The outcome of a single [`Filter::pull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Produced {
    /// This many bytes were written to the front of the buffer.
    ///
    /// A filter handed a non-empty buffer produces at least one byte;
    /// `Data(0)` only answers a zero-length request.
    Data(usize),
    /// The filter is exhausted and will not produce further bytes.
    Eof,
}

/// A pull-based byte stream transformer.
pub trait Filter {
    /// Prepares the filter.  Called once, before the first `pull`.
    fn init(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Produces up to `buf.len()` bytes into `buf`.
    ///
    /// May pull any amount from the filter below.  Returns
    /// [`Produced::Eof`] once the transformed stream is exhausted; after
    /// that, every further call returns `Eof` as well.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Produced>;

    /// Pushes out anything the filter holds back.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the filter's private resources.  Idempotent.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// A short name for diagnostics.
    fn describe(&self) -> &'static str;
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn init(&mut self) -> io::Result<()> {
        (**self).init()
    }

    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Produced> {
        (**self).pull(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn describe(&self) -> &'static str {
        (**self).describe()
    }
}

/// The bottom of a stack: adapts an [`io::Read`] to the [`Filter`]
/// interface.
///
/// This is where all blocking I/O happens; everything above only blocks by
/// pulling through it.
#[derive(Debug)]
pub struct Source<R: Read> {
    inner: R,
}

impl<R: Read> Source<R> {
    pub fn new(inner: R) -> Self {
        Source { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Filter for Source<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Produced> {
        if buf.is_empty() {
            return Ok(Produced::Data(0));
        }

        loop {
            match self.inner.read(buf) {
                Ok(0) => return Ok(Produced::Eof),
                Ok(n) => return Ok(Produced::Data(n)),
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => (),
                Err(e) => return Err(e),
            }
        }
    }

    fn describe(&self) -> &'static str {
        "source"
    }
}

/// Forwards bytes unchanged while copying them into an observer.
///
/// The observer sees exactly the bytes delivered to the consumer, in the
/// same order and quantity.  Putting a `Tap` directly below the final
/// consumer therefore observes the stream as consumed, which is what a
/// message-digest side channel needs.
#[derive(Debug)]
pub struct Tap<F: Filter, W: Write> {
    source: F,
    observer: W,
}

impl<F: Filter, W: Write> Tap<F, W> {
    pub fn new(source: F, observer: W) -> Self {
        Tap { source, observer }
    }

    /// Returns the filter below and the observer.
    pub fn into_parts(self) -> (F, W) {
        (self.source, self.observer)
    }
}

impl<F: Filter, W: Write> Filter for Tap<F, W> {
    fn init(&mut self) -> io::Result<()> {
        self.source.init()
    }

    fn pull(&mut self, buf: &mut [u8]) -> io::Result<Produced> {
        let produced = self.source.pull(buf)?;
        if let Produced::Data(n) = produced {
            self.observer.write_all(&buf[..n])?;
        }
        Ok(produced)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.source.flush()?;
        self.observer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.source.close()
    }

    fn describe(&self) -> &'static str {
        "tap"
    }
}

/// Drives a filter stack as an [`io::Read`].
///
/// `init` fires before the first read, `close` when [`FilterReader::close`]
/// is called or the reader is dropped, whichever comes first.  Errors from
/// the stack surface as `io::Error` from `read`.
#[derive(Debug)]
pub struct FilterReader<F: Filter> {
    filter: Option<F>,
    initialized: bool,
}

impl<F: Filter> FilterReader<F> {
    pub fn new(filter: F) -> Self {
        FilterReader {
            filter: Some(filter),
            initialized: false,
        }
    }

    /// Flushes and closes the stack, reporting errors that `Drop` would
    /// have to swallow, and returns the stack.
    pub fn close(mut self) -> io::Result<F> {
        match self.filter.take() {
            Some(mut f) => {
                f.flush()?;
                f.close()?;
                Ok(f)
            }
            None => unreachable!("filter is present until close"),
        }
    }

    pub fn get_ref(&self) -> Option<&F> {
        self.filter.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut F> {
        self.filter.as_mut()
    }
}

impl<F: Filter> Read for FilterReader<F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let filter = match self.filter {
            Some(ref mut f) => f,
            None => return Ok(0),
        };

        if buf.is_empty() {
            return Ok(0);
        }

        if !self.initialized {
            filter.init()?;
            self.initialized = true;
        }

        loop {
            match filter.pull(buf)? {
                Produced::Data(0) => (),
                Produced::Data(n) => return Ok(n),
                Produced::Eof => return Ok(0),
            }
        }
    }
}

impl<F: Filter> Drop for FilterReader<F> {
    fn drop(&mut self) {
        if let Some(ref mut f) = self.filter {
            let _ = f.close();
        }
    }
}
