#![no_main]

use commonware_xdr::{
    backend::{Backend, Memory},
    free, Error, Mode, Stream, Xdr,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Default)]
struct Entry {
    key: Option<String>,
    value: Option<Vec<u8>>,
    tags: Option<Vec<i32>>,
    next: Option<Box<Entry>>,
}

fn entry<B: Backend>(stream: &mut Stream<B>, value: &mut Entry) -> Result<(), Error> {
    stream.string(&mut value.key, 64)?;
    stream.bytes(&mut value.value, 256)?;
    stream.array(&mut value.tags, 16, i32::xdr)?;
    stream.pointer(&mut value.next, entry)
}

fuzz_target!(|data: &[u8]| {
    // Bound the length of decoded chains (each link takes at least 16 bytes)
    if data.len() > 4096 {
        return;
    }
    let mut stream = Stream::new(Memory::from(data.to_vec()), Mode::Decode);
    let mut decoded = Entry::default();
    let _ = entry(&mut stream, &mut decoded);
    assert!(stream.position() <= data.len());
    free(entry, &mut decoded).expect("failed to free a partially decoded entry");
    assert!(decoded.key.is_none() && decoded.next.is_none());
});
