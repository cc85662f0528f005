//! Codecs for scalar values.
//!
//! Every scalar occupies exactly one [UNIT], most significant byte first. Values narrower than
//! a unit (characters, shorts) are zero-extended: the unused high-order bytes are always zero on
//! the wire and are ignored when decoding.
//!
//! The unsigned, long, and enumerant codecs share the wire shape of the signed integer codec and
//! only reinterpret the host value. Releasing a scalar is a no-op.

use crate::{
    backend::Backend,
    codec::{Xdr, UNIT},
    stream::{Mode, Stream},
    Error,
};
use tracing::debug;

// Generates a codec that moves `$type` through one unit by way of `$via`.
macro_rules! impl_unit {
    ($(#[$doc:meta])* $name:ident, $type:ty, $via:ty) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, value: &mut $type) -> Result<(), Error> {
            let mut unit = *value as $via as u32;
            self.unit(&mut unit)?;
            *value = unit as $via as $type;
            Ok(())
        }
    };
}

impl<B: Backend> Stream<B> {
    /// Encodes or decodes one raw unit.
    ///
    /// `value` is only assigned once the whole unit has been read.
    pub fn unit(&mut self, value: &mut u32) -> Result<(), Error> {
        match self.mode() {
            Mode::Encode => self.write(&value.to_be_bytes()),
            Mode::Decode => {
                let mut unit = [0u8; UNIT];
                self.read(&mut unit)?;
                *value = u32::from_be_bytes(unit);
                Ok(())
            }
            Mode::Free => Ok(()),
        }
    }

    impl_unit!(
        /// Codec for a signed character.
        char, i8, u8
    );
    impl_unit!(
        /// Codec for an unsigned character.
        u_char, u8, u8
    );
    impl_unit!(
        /// Codec for a signed short.
        short, i16, u16
    );
    impl_unit!(
        /// Codec for an unsigned short.
        u_short, u16, u16
    );
    impl_unit!(
        /// Codec for a signed integer.
        int, i32, u32
    );
    impl_unit!(
        /// Codec for an unsigned integer.
        u_int, u32, u32
    );

    /// Codec for a signed long (same wire shape as [Stream::int]).
    #[inline]
    pub fn long(&mut self, value: &mut i32) -> Result<(), Error> {
        self.int(value)
    }

    /// Codec for an unsigned long (same wire shape as [Stream::u_int]).
    #[inline]
    pub fn u_long(&mut self, value: &mut u32) -> Result<(), Error> {
        self.u_int(value)
    }

    /// Codec for an enumerant (same wire shape as [Stream::int]).
    #[inline]
    pub fn enumeration(&mut self, value: &mut i32) -> Result<(), Error> {
        self.int(value)
    }

    /// Codec for a boolean. Decoding accepts only 0 and 1.
    pub fn boolean(&mut self, value: &mut bool) -> Result<(), Error> {
        let mut unit = u32::from(*value);
        self.unit(&mut unit)?;
        *value = match unit {
            0 => false,
            1 => true,
            _ => {
                debug!(unit, "invalid bool");
                return Err(Error::InvalidBool(unit));
            }
        };
        Ok(())
    }

    /// Codec for nothing. Always succeeds without touching the stream.
    #[inline]
    pub fn void(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

macro_rules! impl_xdr {
    ($type:ty, $method:ident) => {
        impl Xdr for $type {
            #[inline]
            fn xdr<B: Backend>(stream: &mut Stream<B>, value: &mut Self) -> Result<(), Error> {
                stream.$method(value)
            }
        }
    };
}

impl_xdr!(i8, char);
impl_xdr!(u8, u_char);
impl_xdr!(i16, short);
impl_xdr!(u16, u_short);
impl_xdr!(i32, int);
impl_xdr!(u32, u_int);
impl_xdr!(bool, boolean);

impl Xdr for () {
    #[inline]
    fn xdr<B: Backend>(stream: &mut Stream<B>, _: &mut Self) -> Result<(), Error> {
        stream.void()
    }
}
