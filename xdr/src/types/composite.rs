//! Codecs composed from an element codec.
//!
//! Each composite delegates per-element work to a codec function supplied by the caller, so a
//! hand-written codec for a structure is itself just a sequence of calls on the stream:
//!
//! ```
//! use commonware_xdr::{backend::Backend, Error, Stream};
//!
//! #[derive(Default)]
//! struct Node {
//!     value: i32,
//!     next: Option<Box<Node>>,
//! }
//!
//! fn node<B: Backend>(stream: &mut Stream<B>, value: &mut Node) -> Result<(), Error> {
//!     stream.int(&mut value.value)?;
//!     stream.pointer(&mut value.next, node)
//! }
//! ```
//!
//! On failure, processing of further elements stops and the cursor stays wherever the last
//! successful element left it.

use crate::{
    backend::Backend,
    codec::{incoming_length, outgoing_length, Proc},
    stream::{Mode, Stream},
    Error,
};
use tracing::debug;

/// One arm of a discriminated union.
pub struct Arm<B: Backend, T> {
    /// Discriminant selecting this arm.
    pub discriminant: i32,
    /// Codec for the arm's body.
    pub proc: Proc<B, T>,
}

impl<B: Backend, T> Arm<B, T> {
    /// Creates an arm for `discriminant`.
    pub const fn new(discriminant: i32, proc: Proc<B, T>) -> Self {
        Self { discriminant, proc }
    }
}

impl<B: Backend> Stream<B> {
    /// Codec for a fixed number of elements (`values.len()`, known out of band).
    ///
    /// No count is transmitted and nothing is allocated or released.
    pub fn vector<T, F>(&mut self, values: &mut [T], mut proc: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self, &mut T) -> Result<(), Error>,
    {
        for value in values.iter_mut() {
            proc(self, value)?;
        }
        Ok(())
    }

    /// Codec for a variable number of elements, at most `max`.
    ///
    /// Encoding an absent array writes a count of zero. Decoding allocates the array if `values`
    /// is `None` and resizes the existing one otherwise. Freeing resets `values` to `None`
    /// without walking the elements.
    pub fn array<T, F>(
        &mut self,
        values: &mut Option<Vec<T>>,
        max: usize,
        proc: F,
    ) -> Result<(), Error>
    where
        T: Default,
        F: FnMut(&mut Self, &mut T) -> Result<(), Error>,
    {
        match self.mode() {
            Mode::Encode => {
                let len = values.as_ref().map_or(0, Vec::len);
                let mut count = outgoing_length(len, max)?;
                self.u_int(&mut count)?;
            }
            Mode::Decode => {
                let mut count = 0u32;
                self.u_int(&mut count)?;
                let count = incoming_length(count, max)?;
                values
                    .get_or_insert_with(|| Vec::with_capacity(count))
                    .resize_with(count, T::default);
            }
            Mode::Free => {
                *values = None;
                return Ok(());
            }
        }
        match values {
            Some(values) => self.vector(values, proc),
            None => Ok(()),
        }
    }

    /// Codec for a discriminated union.
    ///
    /// The discriminant is processed first, then the body with the first arm whose discriminant
    /// matches. If no arm matches, `default` is used; without one the call fails.
    ///
    /// Arms are plain functions. Bodies that need captured state (a maximum length, say) can be
    /// dispatched with [Stream::union_with] instead.
    pub fn union<T>(
        &mut self,
        discriminant: &mut i32,
        value: &mut T,
        arms: &[Arm<B, T>],
        default: Option<Proc<B, T>>,
    ) -> Result<(), Error> {
        self.union_with(discriminant, value, |stream, discriminant, value| {
            if let Some(arm) = arms.iter().find(|arm| arm.discriminant == discriminant) {
                return (arm.proc)(stream, value);
            }
            match default {
                Some(proc) => proc(stream, value),
                None => {
                    debug!(discriminant, "no matching union arm");
                    Err(Error::NoMatchingArm(discriminant))
                }
            }
        })
    }

    /// Codec for a discriminated union whose body is selected by `body`.
    ///
    /// The discriminant is processed first, then `body` runs with the (possibly just decoded)
    /// discriminant. It should return [Error::NoMatchingArm] for discriminants it does not handle.
    pub fn union_with<T, F>(
        &mut self,
        discriminant: &mut i32,
        value: &mut T,
        body: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(&mut Self, i32, &mut T) -> Result<(), Error>,
    {
        self.enumeration(discriminant)?;
        body(self, *discriminant, value)
    }

    /// Codec for an owned sub-object that is always present on the wire.
    ///
    /// Encoding an absent reference fails. Decoding allocates a default `T` if `value` is `None`
    /// and then runs `proc` on it. Freeing resets `value` to `None`.
    pub fn reference<T, F>(&mut self, value: &mut Option<Box<T>>, proc: F) -> Result<(), Error>
    where
        T: Default,
        F: FnOnce(&mut Self, &mut T) -> Result<(), Error>,
    {
        match self.mode() {
            Mode::Encode => {
                let inner = value
                    .as_deref_mut()
                    .ok_or(Error::MissingValue("reference"))?;
                proc(self, inner)
            }
            Mode::Decode => {
                let inner: &mut T = value.get_or_insert_with(Box::default);
                proc(self, inner)
            }
            Mode::Free => {
                *value = None;
                Ok(())
            }
        }
    }

    /// Codec for an optional sub-object.
    ///
    /// A boolean "present" unit precedes the reference encoding of the sub-object, which is
    /// omitted when absent. Chaining `pointer` through a field of `T` expresses a linked list.
    ///
    /// Each link is processed by a nested call, so the length of a chain is bounded by the stack
    /// (in the order of tens of thousands of links on a default thread). Dropping a long chain
    /// recurses as well; release it with [crate::free::unlink].
    pub fn pointer<T, F>(&mut self, value: &mut Option<Box<T>>, proc: F) -> Result<(), Error>
    where
        T: Default,
        F: FnOnce(&mut Self, &mut T) -> Result<(), Error>,
    {
        let mut present = value.is_some();
        self.boolean(&mut present)?;
        if present {
            return self.reference(value, proc);
        }
        *value = None;
        Ok(())
    }
}
