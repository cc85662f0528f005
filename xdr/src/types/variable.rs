//! Codecs for strings and opaque data.
//!
//! Payloads are padded with zeros to a multiple of [UNIT]. Strings and variable-length opaque
//! data ("bytes") are preceded by their length as an unsigned integer; fixed-length opaque data
//! carries no length, both sides must agree on it out of band.
//!
//! Lengths are checked against a caller-supplied maximum before anything is written (on encode)
//! or allocated (on decode).

use crate::{
    backend::Backend,
    codec::{incoming_length, outgoing_length, padding, UNIT},
    stream::{Mode, Stream},
    Error,
};

impl<B: Backend> Stream<B> {
    /// Writes `payload` followed by its padding.
    fn payload_out(&mut self, payload: &[u8]) -> Result<(), Error> {
        self.write(payload)?;
        let pad = padding(payload.len());
        if pad > 0 {
            self.write(&[0u8; UNIT][..pad])?;
        }
        Ok(())
    }

    /// Fills `payload` and skips its padding.
    fn payload_in(&mut self, payload: &mut [u8]) -> Result<(), Error> {
        self.read(payload)?;
        let pad = padding(payload.len());
        if pad > 0 {
            let mut skip = [0u8; UNIT];
            self.read(&mut skip[..pad])?;
        }
        Ok(())
    }

    /// Reads a length prefix and checks it against `max`.
    fn payload_length(&mut self, max: usize) -> Result<usize, Error> {
        let mut len = 0u32;
        self.u_int(&mut len)?;
        incoming_length(len, max)
    }

    /// Codec for a string of at most `max` bytes.
    ///
    /// Encoding an absent string fails. Decoding allocates the string if `value` is `None` and
    /// reuses the existing allocation otherwise. Freeing resets `value` to `None`.
    ///
    /// If decoding fails on the length prefix, `value` is left untouched. If it fails later (on the
    /// payload or on invalid UTF-8), an existing allocation is kept as an empty string and an
    /// absent one stays `None`.
    pub fn string(&mut self, value: &mut Option<String>, max: usize) -> Result<(), Error> {
        match self.mode() {
            Mode::Encode => {
                let string = value.as_ref().ok_or(Error::MissingValue("string"))?;
                let mut len = outgoing_length(string.len(), max)?;
                self.u_int(&mut len)?;
                self.payload_out(string.as_bytes())
            }
            Mode::Decode => {
                let len = self.payload_length(max)?;
                let present = value.is_some();
                let mut buf = reuse(value.take().map(String::into_bytes), len);
                if let Err(err) = self.payload_in(&mut buf) {
                    if present {
                        *value = Some(cleared(buf));
                    }
                    return Err(err);
                }
                match String::from_utf8(buf) {
                    Ok(string) => {
                        *value = Some(string);
                        Ok(())
                    }
                    Err(err) => {
                        if present {
                            *value = Some(cleared(err.into_bytes()));
                        }
                        Err(Error::InvalidData("string", "invalid utf-8"))
                    }
                }
            }
            Mode::Free => {
                *value = None;
                Ok(())
            }
        }
    }

    /// Codec for opaque data of a fixed length (`value.len()`).
    ///
    /// Never allocates; freeing is a no-op.
    pub fn opaque(&mut self, value: &mut [u8]) -> Result<(), Error> {
        match self.mode() {
            Mode::Encode => self.payload_out(value),
            Mode::Decode => self.payload_in(value),
            Mode::Free => Ok(()),
        }
    }

    /// Codec for opaque data of at most `max` bytes.
    ///
    /// Encoding absent data fails. Decoding allocates the buffer if `value` is `None` and reuses
    /// the existing allocation otherwise. Freeing resets `value` to `None`.
    ///
    /// If decoding fails on the length prefix, `value` is left untouched. If the payload is
    /// truncated, an existing allocation is kept (with unspecified contents) and an absent one
    /// stays `None`.
    pub fn bytes(&mut self, value: &mut Option<Vec<u8>>, max: usize) -> Result<(), Error> {
        match self.mode() {
            Mode::Encode => {
                let bytes = value.as_ref().ok_or(Error::MissingValue("bytes"))?;
                let mut len = outgoing_length(bytes.len(), max)?;
                self.u_int(&mut len)?;
                self.payload_out(bytes)
            }
            Mode::Decode => {
                let len = self.payload_length(max)?;
                let present = value.is_some();
                let mut buf = reuse(value.take(), len);
                let result = self.payload_in(&mut buf);
                if result.is_ok() || present {
                    *value = Some(buf);
                }
                result
            }
            Mode::Free => {
                *value = None;
                Ok(())
            }
        }
    }
}

/// Returns a zeroed buffer of `len` bytes, reusing `existing` if set.
fn reuse(existing: Option<Vec<u8>>, len: usize) -> Vec<u8> {
    let mut buf = existing.unwrap_or_default();
    buf.clear();
    buf.resize(len, 0);
    buf
}

/// Empties `buf`, keeping its allocation, as a string.
fn cleared(mut buf: Vec<u8>) -> String {
    buf.clear();
    String::from_utf8(buf).unwrap_or_default()
}
