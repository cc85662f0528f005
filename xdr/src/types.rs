//! Codecs for every construct of the wire format, implemented as methods on [crate::Stream].

pub mod composite;
pub mod primitives;
pub mod variable;
