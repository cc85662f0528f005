//! Byte storage underlying a [crate::Stream].
//!
//! A backend copies bytes to and from some storage at an offset chosen by the stream. Two
//! kinds are provided:
//! - [Memory]: a contiguous region, either owned (and grown on demand) or borrowed from the caller
//!   (and never grown).
//! - [File]: any handle implementing [std::io::Read], [std::io::Write], and [std::io::Seek]. The
//!   handle's own position is the source of truth, the stream only mirrors it.
//!
//! [Null] backs the stand-alone free walk (see [crate::free]) and refuses every transfer.

use crate::Error;
use bytes::BytesMut;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use tracing::{debug, trace};

/// Size of the region allocated when the caller does not supply one (one page).
pub const DEFAULT_CAPACITY: usize = 4096;

/// Bounded byte storage addressed by offset.
pub trait Backend {
    /// Offset a new stream over this backend starts at.
    fn start(&self) -> usize {
        0
    }

    /// Fills `buf` with the bytes at `offset`.
    ///
    /// Must fail, without side effects on the region, if fewer than `buf.len()` bytes are
    /// available.
    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Error>;

    /// Stores `buf` at `offset`.
    fn write_at(&mut self, offset: usize, buf: &[u8]) -> Result<(), Error>;

    /// Moves any underlying position to `offset`.
    fn seek(&mut self, _offset: usize) -> Result<(), Error> {
        Ok(())
    }

    /// Returns the offset the storage is actually positioned at after a failed transfer, if it
    /// may have moved.
    fn resync(&mut self) -> Option<usize> {
        None
    }
}

enum Region<'a> {
    Owned(BytesMut),
    Borrowed(&'a mut [u8]),
}

/// A contiguous in-memory region.
///
/// Owned regions double in size until a write fits. Borrowed regions keep their size for their
/// entire lifetime and refuse writes past their end.
pub struct Memory<'a> {
    region: Region<'a>,
}

impl<'a> Memory<'a> {
    /// Allocates an owned region of [DEFAULT_CAPACITY] bytes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Allocates an owned region of `capacity` bytes ([DEFAULT_CAPACITY] if zero).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };
        Self {
            region: Region::Owned(BytesMut::zeroed(capacity)),
        }
    }

    /// Binds a caller-supplied region. The region is never grown.
    ///
    /// An empty region cannot hold a single unit, so an owned default region is allocated instead.
    pub fn borrowed(region: &'a mut [u8]) -> Self {
        if region.is_empty() {
            return Self::new();
        }
        Self {
            region: Region::Borrowed(region),
        }
    }

    /// Returns true if the region was allocated by this backend (and may therefore grow).
    pub fn is_owned(&self) -> bool {
        matches!(self.region, Region::Owned(_))
    }

    /// Returns the current size of the region.
    pub fn capacity(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns the entire region.
    ///
    /// The region of an owned backend may move on every write, so the returned slice cannot be
    /// held across writes.
    pub fn as_slice(&self) -> &[u8] {
        match &self.region {
            Region::Owned(buf) => buf,
            Region::Borrowed(region) => region,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match &mut self.region {
            Region::Owned(buf) => buf,
            Region::Borrowed(region) => region,
        }
    }

    /// Returns the owned region, or `None` if the region was borrowed.
    pub fn into_inner(self) -> Option<BytesMut> {
        match self.region {
            Region::Owned(buf) => Some(buf),
            Region::Borrowed(_) => None,
        }
    }

    /// Ensures the region spans at least `required` bytes.
    fn reserve(&mut self, required: usize) -> Result<(), Error> {
        match &mut self.region {
            Region::Owned(buf) => {
                if required <= buf.len() {
                    return Ok(());
                }
                let mut capacity = buf.len().max(1);
                while capacity < required {
                    capacity = capacity.checked_mul(2).ok_or(Error::OffsetOverflow)?;
                }
                trace!(from = buf.len(), to = capacity, "growing region");
                buf.resize(capacity, 0);
                Ok(())
            }
            Region::Borrowed(region) => {
                if required > region.len() {
                    debug!(
                        required,
                        capacity = region.len(),
                        "write exceeds borrowed region"
                    );
                    return Err(Error::CapacityExceeded(required, region.len()));
                }
                Ok(())
            }
        }
    }
}

impl Default for Memory<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BytesMut> for Memory<'_> {
    fn from(buf: BytesMut) -> Self {
        Self {
            region: Region::Owned(buf),
        }
    }
}

impl From<Vec<u8>> for Memory<'_> {
    fn from(buf: Vec<u8>) -> Self {
        Self::from(BytesMut::from(&buf[..]))
    }
}

impl Backend for Memory<'_> {
    fn read_at(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Error> {
        let end = offset.checked_add(buf.len()).ok_or(Error::OffsetOverflow)?;
        let region = self.as_slice();
        if end > region.len() {
            return Err(Error::EndOfBuffer);
        }
        buf.copy_from_slice(&region[offset..end]);
        Ok(())
    }

    fn write_at(&mut self, offset: usize, buf: &[u8]) -> Result<(), Error> {
        let end = offset.checked_add(buf.len()).ok_or(Error::OffsetOverflow)?;
        self.reserve(end)?;
        self.as_mut_slice()[offset..end].copy_from_slice(buf);
        Ok(())
    }
}

/// A sequential file-like handle.
///
/// The handle is read and written at its own position. The offsets handed in by the stream
/// mirror that position and are only used to reposition the handle on [Backend::seek].
///
/// A failed transfer may have moved the handle partway, so [Backend::resync] reports where it
/// ended up.
pub struct File<F> {
    handle: F,
    start: usize,
}

impl<F: Seek> File<F> {
    /// Binds `handle`, recording its current position as the starting offset.
    pub fn new(mut handle: F) -> Result<Self, Error> {
        let position = handle.stream_position()?;
        let start = usize::try_from(position).map_err(|_| Error::OffsetOverflow)?;
        Ok(Self { handle, start })
    }

    /// Returns a reference to the underlying handle.
    pub fn get_ref(&self) -> &F {
        &self.handle
    }

    /// Returns the underlying handle.
    pub fn into_inner(self) -> F {
        self.handle
    }
}

impl<F: Read + Write + Seek> Backend for File<F> {
    fn start(&self) -> usize {
        self.start
    }

    fn read_at(&mut self, _offset: usize, buf: &mut [u8]) -> Result<(), Error> {
        self.handle.read_exact(buf).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => Error::EndOfBuffer,
            _ => Error::Io(err),
        })
    }

    fn write_at(&mut self, _offset: usize, buf: &[u8]) -> Result<(), Error> {
        self.handle.write_all(buf)?;
        Ok(())
    }

    fn seek(&mut self, offset: usize) -> Result<(), Error> {
        let offset = u64::try_from(offset).map_err(|_| Error::OffsetOverflow)?;
        trace!(offset, "repositioning handle");
        self.handle.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    fn resync(&mut self) -> Option<usize> {
        let position = self.handle.stream_position().ok()?;
        trace!(position, "resyncing after failed transfer");
        usize::try_from(position).ok()
    }
}

/// A backend without storage.
#[derive(Clone, Copy, Debug, Default)]
pub struct Null;

impl Backend for Null {
    fn read_at(&mut self, _offset: usize, _buf: &mut [u8]) -> Result<(), Error> {
        Err(Error::Unsupported("read"))
    }

    fn write_at(&mut self, _offset: usize, _buf: &[u8]) -> Result<(), Error> {
        Err(Error::Unsupported("write"))
    }
}
