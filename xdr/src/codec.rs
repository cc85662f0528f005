//! Core codec trait and helpers

use crate::{
    backend::{Backend, Memory},
    stream::{Mode, Stream},
    Error,
};
use bytes::{Bytes, BytesMut};
use tracing::debug;

/// Size of an XDR unit, the granularity of every item on the wire.
pub const UNIT: usize = 4;

/// A codec function: encodes, decodes, or releases a `T` depending on the mode of the stream.
pub type Proc<B, T> = fn(&mut Stream<B>, &mut T) -> Result<(), Error>;

/// Trait for types with a canonical XDR codec.
///
/// A single implementation serves all three [Mode]s, so the associated function can be passed
/// wherever a codec function is expected (e.g. `stream.vector(&mut values, i32::xdr)`).
pub trait Xdr: Sized {
    /// Encodes, decodes, or releases `value` according to `stream.mode()`.
    fn xdr<B: Backend>(stream: &mut Stream<B>, value: &mut Self) -> Result<(), Error>;
}

/// Returns the number of zero bytes that follow `len` bytes of payload.
#[inline]
pub fn padding(len: usize) -> usize {
    (UNIT - len % UNIT) % UNIT
}

/// Returns `len` rounded up to a multiple of [UNIT].
#[inline]
pub fn padded(len: usize) -> usize {
    len + padding(len)
}

/// Checks a length about to be written against `max`.
pub(crate) fn outgoing_length(len: usize, max: usize) -> Result<u32, Error> {
    if len > max {
        debug!(len, max, "length exceeds maximum");
        return Err(Error::LengthExceeded(len, max));
    }
    u32::try_from(len).map_err(|_| Error::LengthExceeded(len, u32::MAX as usize))
}

/// Checks a length read from the wire against `max`.
pub(crate) fn incoming_length(len: u32, max: usize) -> Result<usize, Error> {
    let len = usize::try_from(len).map_err(|_| Error::OffsetOverflow)?;
    if len > max {
        debug!(len, max, "length exceeds maximum");
        return Err(Error::LengthExceeded(len, max));
    }
    Ok(len)
}

/// Encodes `value` into an owned region and returns the bytes written.
pub fn encode<T: Xdr>(value: &mut T) -> Result<Bytes, Error> {
    let mut stream = Stream::new(Memory::new(), Mode::Encode);
    T::xdr(&mut stream, value)?;
    let len = stream.position();
    Ok(Bytes::copy_from_slice(&stream.base()[..len]))
}

/// Decodes a `T` from `buf`, ensuring the buffer is fully consumed.
pub fn decode<T: Xdr + Default>(buf: &[u8]) -> Result<T, Error> {
    let mut stream = Stream::new(Memory::from(BytesMut::from(buf)), Mode::Decode);
    let mut value = T::default();
    T::xdr(&mut stream, &mut value)?;

    // Check that the buffer is fully consumed.
    let remaining = buf.len() - stream.position();
    if remaining > 0 {
        return Err(Error::ExtraData(remaining));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(4), 0);
        assert_eq!(padding(5), 3);
        assert_eq!(padding(7), 1);
        assert_eq!(padded(5), 8);
        assert_eq!(padded(8), 8);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(outgoing_length(3, 3).unwrap(), 3);
        assert!(matches!(
            outgoing_length(4, 3),
            Err(Error::LengthExceeded(4, 3))
        ));
        assert_eq!(incoming_length(3, 3).unwrap(), 3);
        assert!(matches!(
            incoming_length(4, 3),
            Err(Error::LengthExceeded(4, 3))
        ));
    }

    #[test]
    fn test_encode_decode() {
        let encoded = encode(&mut 0x01020304i32).unwrap();
        assert_eq!(encoded, Bytes::from_static(&[1, 2, 3, 4]));
        assert_eq!(decode::<i32>(&encoded).unwrap(), 0x01020304);
    }

    #[test]
    fn test_insufficient_buffer() {
        assert!(matches!(
            decode::<u32>(&[0x01, 0x02]),
            Err(Error::EndOfBuffer)
        ));
    }

    #[test]
    fn test_extra_data() {
        assert!(matches!(
            decode::<u32>(&[0, 0, 0, 1, 0]),
            Err(Error::ExtraData(1))
        ));
    }
}
