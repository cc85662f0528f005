//! The stream context shared by every codec.

use crate::{
    backend::{Backend, File, Memory},
    Error,
};
use std::io::{Read, Seek, Write};

/// What a codec does when invoked on a [Stream].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Write values to the backend.
    Encode,
    /// Read values from the backend, allocating where a slot is empty.
    Decode,
    /// Release whatever a previous decode allocated. The backend is not touched.
    Free,
}

/// A [Backend] bound to a [Mode] and a cursor.
///
/// Every codec takes the stream as its first argument and advances the cursor by the number of
/// bytes it transfers. A stream is not meant to be shared: all operations take `&mut self`.
pub struct Stream<B: Backend> {
    backend: B,
    mode: Mode,
    offset: usize,
}

impl<B: Backend> Stream<B> {
    /// Binds `backend` in `mode`, starting at the backend's own starting offset.
    pub fn new(backend: B, mode: Mode) -> Self {
        let offset = backend.start();
        Self {
            backend,
            mode,
            offset,
        }
    }

    /// Returns the mode this stream was created with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the current offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Moves the cursor to `position`.
    ///
    /// File backends also reposition their handle, and the cursor is left unchanged if that fails.
    pub fn set_position(&mut self, position: usize) -> Result<(), Error> {
        self.backend.seek(position)?;
        self.offset = position;
        Ok(())
    }

    /// Fills `buf` from the backend and advances the cursor by `buf.len()`.
    ///
    /// If the read fails, the cursor does not move unless the backend reports that it did (a file
    /// handle may have consumed part of the data).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<(), Error> {
        if let Err(err) = self.backend.read_at(self.offset, buf) {
            self.resync();
            return Err(err);
        }
        self.offset += buf.len();
        Ok(())
    }

    /// Writes `buf` to the backend and advances the cursor by `buf.len()`.
    ///
    /// If the write fails, the cursor does not move unless the backend reports that it did (a file
    /// handle may have accepted part of the data).
    pub fn write(&mut self, buf: &[u8]) -> Result<(), Error> {
        if let Err(err) = self.backend.write_at(self.offset, buf) {
            self.resync();
            return Err(err);
        }
        self.offset += buf.len();
        Ok(())
    }

    fn resync(&mut self) {
        if let Some(offset) = self.backend.resync() {
            self.offset = offset;
        }
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unbinds the stream, returning the backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Releases the stream.
    ///
    /// An owned memory region is released with it. Values allocated by decoding are not: they
    /// belong to the caller (see [crate::free]).
    pub fn destroy(self) {}
}

impl<'a> Stream<Memory<'a>> {
    /// Creates a stream over `region`, or over an owned region of
    /// [crate::backend::DEFAULT_CAPACITY] bytes if none is supplied.
    pub fn memory(region: Option<&'a mut [u8]>, mode: Mode) -> Self {
        let backend = match region {
            Some(region) => Memory::borrowed(region),
            None => Memory::new(),
        };
        Self::new(backend, mode)
    }

    /// Returns the current region.
    ///
    /// The region of an owned backend may move on every write, so it must be re-queried after
    /// writing.
    pub fn base(&self) -> &[u8] {
        self.backend.as_slice()
    }
}

impl<F: Read + Write + Seek> Stream<File<F>> {
    /// Creates a stream over `handle`, starting at the handle's current position.
    pub fn file(handle: F, mode: Mode) -> Result<Self, Error> {
        Ok(Self::new(File::new(handle)?, mode))
    }
}
