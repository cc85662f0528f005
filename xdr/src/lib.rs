//! Encode, decode, and release data in the External Data Representation format.
//!
//! # Overview
//!
//! XDR lays every item out in 4-byte units, most significant byte first. Variable-length data is
//! preceded by its length and padded to a unit boundary, unions are preceded by their
//! discriminant, and optional data by a boolean.
//!
//! All codecs operate on a [Stream], which binds a [backend::Backend] (an in-memory region or a
//! file-like handle) to a [Mode] and a cursor. The mode decides what a codec does:
//! - [Mode::Encode]: write the value at the cursor.
//! - [Mode::Decode]: read the value at the cursor, allocating empty slots (`None`) as needed.
//! - [Mode::Free]: release whatever a previous decode allocated, without touching the backend.
//!
//! Because the mode lives in the stream, one codec function per type provides all three
//! behaviors. Composite codecs (vectors, arrays, unions, references, pointers) take the codec of
//! their elements as an argument, so codecs for structured data are written by composition.
//!
//! # Supported Constructs
//!
//! - Scalars: characters, shorts, integers, longs, enumerants, booleans, and void
//! - Strings, fixed-length opaque data, and variable-length opaque data
//! - Fixed-length vectors and variable-length arrays of any element
//! - Discriminated unions, owned references, and optional pointers (linked lists)
//!
//! # Example
//!
//! ```
//! use commonware_xdr::{backend::{Backend, Memory}, free, Error, Mode, Stream};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Entry {
//!     id: u32,
//!     name: Option<String>,
//!     next: Option<Box<Entry>>,
//! }
//!
//! // A single codec for encoding, decoding, and releasing an entry (and its successors).
//! fn entry<B: Backend>(stream: &mut Stream<B>, value: &mut Entry) -> Result<(), Error> {
//!     stream.u_int(&mut value.id)?;
//!     stream.string(&mut value.name, 255)?;
//!     stream.pointer(&mut value.next, entry)
//! }
//!
//! let mut list = Entry {
//!     id: 1,
//!     name: Some("first".into()),
//!     next: Some(Box::new(Entry { id: 2, name: Some("second".into()), next: None })),
//! };
//!
//! // Encode into an owned region (grown as needed)
//! let mut stream = Stream::memory(None, Mode::Encode);
//! entry(&mut stream, &mut list).unwrap();
//! let encoded = stream.base()[..stream.position()].to_vec();
//! stream.destroy();
//!
//! // Decode into an empty value (allocating strings and successors)
//! let mut stream = Stream::new(Memory::from(encoded), Mode::Decode);
//! let mut decoded = Entry::default();
//! entry(&mut stream, &mut decoded).unwrap();
//! assert_eq!(decoded, list);
//!
//! // Release what decoding allocated
//! free(entry, &mut decoded).unwrap();
//! assert_eq!(decoded, Entry { id: 1, ..Default::default() });
//! ```

pub mod backend;
pub mod codec;
pub mod error;
pub mod free;
pub mod stream;
pub mod types;

// Re-export main types and traits
pub use codec::{decode, encode, padded, padding, Proc, Xdr, UNIT};
pub use error::Error;
pub use free::{free, unlink};
pub use stream::{Mode, Stream};
pub use types::composite::Arm;
