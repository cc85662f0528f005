#![no_main]

use arbitrary::Arbitrary;
use commonware_xdr::{
    backend::{Backend, Memory},
    free, Arm, Error, Mode, Stream, Xdr,
};
use libfuzzer_sys::fuzz_target;

const MAX_STRING: usize = 256;
const MAX_BYTES: usize = 1024;
const MAX_ITEMS: usize = 64;

#[derive(Arbitrary, Debug, Default, Clone, PartialEq)]
enum Shape {
    #[default]
    Void,
    Int(i32),
    Short(i16),
}

#[derive(Arbitrary, Debug, Default, Clone, PartialEq)]
struct Item {
    flag: bool,
    character: i8,
    short: u16,
    integer: i32,
    text: Option<String>,
    fixed: [u8; 7],
    data: Option<Vec<u8>>,
    numbers: Option<Vec<u32>>,
    discriminant: i32,
    shape: Shape,
    next: Option<Box<Item>>,
}

fn void_arm<B: Backend>(_: &mut Stream<B>, value: &mut Shape) -> Result<(), Error> {
    *value = Shape::Void;
    Ok(())
}

fn int_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Shape) -> Result<(), Error> {
    let mut inner = match value {
        Shape::Int(inner) => *inner,
        _ => 0,
    };
    stream.int(&mut inner)?;
    *value = Shape::Int(inner);
    Ok(())
}

fn short_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Shape) -> Result<(), Error> {
    let mut inner = match value {
        Shape::Short(inner) => *inner,
        _ => 0,
    };
    stream.short(&mut inner)?;
    *value = Shape::Short(inner);
    Ok(())
}

fn item<B: Backend>(stream: &mut Stream<B>, value: &mut Item) -> Result<(), Error> {
    stream.boolean(&mut value.flag)?;
    stream.char(&mut value.character)?;
    stream.u_short(&mut value.short)?;
    stream.int(&mut value.integer)?;
    stream.string(&mut value.text, MAX_STRING)?;
    stream.opaque(&mut value.fixed)?;
    stream.bytes(&mut value.data, MAX_BYTES)?;
    stream.array(&mut value.numbers, MAX_ITEMS, u32::xdr)?;
    let arms = [Arm::new(1, int_arm), Arm::new(2, short_arm)];
    stream.union(&mut value.discriminant, &mut value.shape, &arms, Some(void_arm))?;
    stream.pointer(&mut value.next, item)
}

/// Aligns the union with its discriminant so that the value survives a round trip.
fn normalize(value: &mut Item) {
    value.discriminant = match value.shape {
        Shape::Void => 0,
        Shape::Int(_) => 1,
        Shape::Short(_) => 2,
    };
    if let Some(next) = value.next.as_deref_mut() {
        normalize(next);
    }
}

fn depth(value: &Item) -> usize {
    1 + value.next.as_deref().map_or(0, depth)
}

fn fits(value: &Item) -> bool {
    value.text.as_ref().map_or(true, |text| text.len() <= MAX_STRING)
        && value.data.as_ref().map_or(true, |data| data.len() <= MAX_BYTES)
        && value
            .numbers
            .as_ref()
            .map_or(true, |numbers| numbers.len() <= MAX_ITEMS)
        && value.next.as_deref().map_or(true, fits)
}

fuzz_target!(|input: Item| {
    let mut input = input;
    if depth(&input) > 32 {
        return;
    }
    normalize(&mut input);

    // Absent strings and opaque data cannot be encoded
    let mut stream = Stream::memory(None, Mode::Encode);
    let result = item(&mut stream, &mut input);
    let complete = {
        let mut cursor = Some(&input);
        let mut complete = true;
        while let Some(current) = cursor {
            complete &= current.text.is_some() && current.data.is_some();
            cursor = current.next.as_deref();
        }
        complete
    };
    if !complete || !fits(&input) {
        assert!(result.is_err());
        return;
    }
    result.expect("failed to encode a valid item");
    let encoded = stream.base()[..stream.position()].to_vec();
    assert_eq!(encoded.len() % 4, 0);

    let mut stream = Stream::new(Memory::from(encoded.clone()), Mode::Decode);
    let mut decoded = Item::default();
    item(&mut stream, &mut decoded).expect("failed to decode an encoded item");
    assert_eq!(stream.position(), encoded.len());

    // Absent arrays decode as empty ones
    let mut expected = input.clone();
    let mut cursor = Some(&mut expected);
    while let Some(current) = cursor {
        current.numbers.get_or_insert_with(Vec::new);
        cursor = current.next.as_deref_mut();
    }
    assert_eq!(decoded, expected);

    free(item, &mut decoded).expect("failed to free a decoded item");
    assert!(decoded.text.is_none() && decoded.next.is_none());
});
