//! Release of values allocated by decoding.
//!
//! Decoding hands ownership of every allocated string, buffer, array, and sub-object to the
//! caller. Those values are released by running the same codec that decoded them in
//! [Mode::Free], either on an existing stream or through [free]. Every codec resets the slot it
//! allocated to `None`, so repeating a free walk is a no-op.

use crate::{
    backend::Null,
    stream::{Mode, Stream},
    Error,
};

/// Runs `proc` on `value` in [Mode::Free].
///
/// No backend is needed to release memory, so `proc` runs over a [Null] backend.
///
/// ```
/// use commonware_xdr::{free, Error, Stream, backend::Backend};
///
/// fn names<B: Backend>(stream: &mut Stream<B>, value: &mut Option<Vec<Option<String>>>) -> Result<(), Error> {
///     stream.array(value, 8, |stream, name| stream.string(name, 64))
/// }
///
/// let mut value = Some(vec![Some("alice".to_string()), Some("bob".to_string())]);
/// free(names, &mut value).unwrap();
/// assert!(value.is_none());
/// free(names, &mut value).unwrap();
/// ```
pub fn free<T, F>(proc: F, value: &mut T) -> Result<(), Error>
where
    F: FnOnce(&mut Stream<Null>, &mut T) -> Result<(), Error>,
{
    let mut stream = Stream::new(Null, Mode::Free);
    proc(&mut stream, value)
}

/// Releases the chain starting at `head` one link at a time.
///
/// Dropping a chain built by [Stream::pointer] recurses once per link. `unlink` detaches each
/// link (through `next`) before dropping it, so chains of any length can be released.
///
/// ```
/// use commonware_xdr::free::unlink;
///
/// struct Node {
///     next: Option<Box<Node>>,
/// }
///
/// let mut head = None;
/// for _ in 0..1_000_000 {
///     head = Some(Box::new(Node { next: head }));
/// }
/// unlink(&mut head, |node| &mut node.next);
/// assert!(head.is_none());
/// ```
pub fn unlink<T, F>(head: &mut Option<Box<T>>, mut next: F)
where
    F: FnMut(&mut T) -> &mut Option<Box<T>>,
{
    let mut current = head.take();
    while let Some(mut node) = current {
        current = next(&mut node).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::Backend, codec::Xdr};

    #[derive(Debug, Default, PartialEq)]
    struct Record {
        id: u32,
        name: Option<String>,
        tags: Option<Vec<Option<String>>>,
        payload: Option<Vec<u8>>,
        parent: Option<Box<Record>>,
    }

    fn record<B: Backend>(stream: &mut Stream<B>, value: &mut Record) -> Result<(), Error> {
        stream.u_int(&mut value.id)?;
        stream.string(&mut value.name, 32)?;
        stream.array(&mut value.tags, 4, |stream, tag| stream.string(tag, 16))?;
        stream.bytes(&mut value.payload, 64)?;
        stream.pointer(&mut value.parent, record)
    }

    #[test]
    fn test_free_walk_releases_every_slot() {
        let mut value = Record {
            id: 1,
            name: Some("child".into()),
            tags: Some(vec![Some("a".into())]),
            payload: Some(vec![1, 2, 3]),
            parent: Some(Box::new(Record {
                id: 2,
                name: Some("parent".into()),
                ..Default::default()
            })),
        };
        free(record, &mut value).unwrap();
        assert_eq!(
            value,
            Record {
                id: 1,
                ..Default::default()
            }
        );

        // Repeating the walk is a no-op
        free(record, &mut value).unwrap();
        assert_eq!(value.id, 1);
    }

    #[test]
    fn test_unlink_long_chain() {
        let mut head: Option<Box<Record>> = None;
        for id in 0..200_000 {
            head = Some(Box::new(Record {
                id,
                parent: head,
                ..Default::default()
            }));
        }
        unlink(&mut head, |record| &mut record.parent);
        assert!(head.is_none());

        // Unlinking an empty chain is a no-op
        unlink(&mut head, |record| &mut record.parent);
        assert!(head.is_none());
    }

    #[test]
    fn test_free_scalars() {
        let mut value = 5i32;
        free(i32::xdr, &mut value).unwrap();
        assert_eq!(value, 5);
    }

    #[test]
    fn test_free_never_touches_backend() {
        let mut value = [1u8, 2, 3];
        free(|stream, value: &mut [u8; 3]| stream.opaque(value), &mut value).unwrap();
        assert_eq!(value, [1, 2, 3]);
    }
}
