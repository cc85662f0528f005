//! Integration tests exercising full encode, decode, and free cycles.

use commonware_xdr::{
    backend::{Backend, File, Memory},
    free, Arm, Error, Mode, Stream, Xdr, UNIT,
};
use std::{
    fs::OpenOptions,
    io::{Seek, SeekFrom},
    path::PathBuf,
};

const END: i32 = 0;
const ERROR: i32 = 1;
const INTEGER: i32 = 2;
const CHARACTER: i32 = 3;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
enum Filter {
    #[default]
    Empty,
    Error(i32),
    Integer(i32),
    Character(i8),
}

fn error_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Filter) -> Result<(), Error> {
    let mut code = match value {
        Filter::Error(code) => *code,
        _ => 0,
    };
    stream.int(&mut code)?;
    *value = Filter::Error(code);
    Ok(())
}

fn integer_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Filter) -> Result<(), Error> {
    let mut integer = match value {
        Filter::Integer(integer) => *integer,
        _ => 0,
    };
    stream.int(&mut integer)?;
    *value = Filter::Integer(integer);
    Ok(())
}

fn character_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Filter) -> Result<(), Error> {
    let mut character = match value {
        Filter::Character(character) => *character,
        _ => 0,
    };
    stream.char(&mut character)?;
    *value = Filter::Character(character);
    Ok(())
}

fn filter_arms<B: Backend>() -> Vec<Arm<B, Filter>> {
    vec![
        Arm::new(ERROR, error_arm),
        Arm::new(INTEGER, integer_arm),
        Arm::new(CHARACTER, character_arm),
    ]
}

/// A mix of every construct, processed in a fixed order.
#[derive(Debug, Default, Clone, PartialEq)]
struct Message {
    number: i32,
    text: Option<String>,
    fixed: [i32; 4],
    discriminant: i32,
    filter: Filter,
    blob: [u8; 5],
    data: Option<Vec<u8>>,
    shorts: Option<Vec<i16>>,
    flag: bool,
}

fn message<B: Backend>(stream: &mut Stream<B>, value: &mut Message) -> Result<(), Error> {
    stream.int(&mut value.number)?;
    stream.string(&mut value.text, 256)?;
    stream.vector(&mut value.fixed, i32::xdr)?;
    stream.union(
        &mut value.discriminant,
        &mut value.filter,
        &filter_arms(),
        None,
    )?;
    stream.opaque(&mut value.blob)?;
    stream.bytes(&mut value.data, 64)?;
    stream.array(&mut value.shorts, 8, i16::xdr)?;
    stream.boolean(&mut value.flag)
}

fn sample() -> Message {
    Message {
        number: 9,
        text: Some("test string".into()),
        fixed: [100, 101, 102, 103],
        discriminant: CHARACTER,
        filter: Filter::Character(b'c' as i8),
        blob: [1, 2, 3, 4, 5],
        data: Some(b"opaque".to_vec()),
        shorts: Some(vec![-1, 0, 1, i16::MAX]),
        flag: true,
    }
}

// 4 + (4 + 12) + 16 + (4 + 4) + 8 + (4 + 8) + (4 + 16) + 4
const SAMPLE_LEN: usize = 88;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("commonware-xdr-{}-{}", std::process::id(), name))
}

#[test]
fn test_memory_roundtrip() {
    let mut original = sample();
    let mut stream = Stream::memory(None, Mode::Encode);
    message(&mut stream, &mut original).unwrap();
    assert_eq!(stream.position(), SAMPLE_LEN);
    let encoded = stream.base()[..SAMPLE_LEN].to_vec();
    stream.destroy();

    let mut stream = Stream::new(Memory::from(encoded), Mode::Decode);
    let mut decoded = Message::default();
    message(&mut stream, &mut decoded).unwrap();
    assert_eq!(stream.position(), SAMPLE_LEN);
    assert_eq!(decoded, original);

    free(message, &mut decoded).unwrap();
    assert!(decoded.text.is_none());
    assert!(decoded.data.is_none());
    assert!(decoded.shorts.is_none());
    free(message, &mut decoded).unwrap();
}

#[test]
fn test_borrowed_roundtrip() {
    let mut region = vec![0u8; 4096];
    let mut original = sample();
    let mut stream = Stream::memory(Some(&mut region), Mode::Encode);
    message(&mut stream, &mut original).unwrap();
    stream.destroy();

    let mut stream = Stream::memory(Some(&mut region), Mode::Decode);
    let mut decoded = Message::default();
    message(&mut stream, &mut decoded).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn test_file_roundtrip() {
    let path = temp_path("roundtrip");
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .unwrap();

    // Leave a header in front of the XDR data
    let mut stream = Stream::file(&mut file, Mode::Encode).unwrap();
    stream.write(b"HDR!").unwrap();
    let mut original = sample();
    message(&mut stream, &mut original).unwrap();
    assert_eq!(stream.position(), UNIT + SAMPLE_LEN);
    stream.destroy();

    // A new stream starts at the handle's current position
    file.seek(SeekFrom::Start(UNIT as u64)).unwrap();
    let mut stream = Stream::file(&mut file, Mode::Decode).unwrap();
    assert_eq!(stream.position(), UNIT);
    let mut decoded = Message::default();
    message(&mut stream, &mut decoded).unwrap();
    assert_eq!(decoded, original);

    // Nothing left to read
    let mut extra = 0i32;
    assert!(matches!(stream.int(&mut extra), Err(Error::EndOfBuffer)));

    // Repositioning moves the handle
    stream.set_position(UNIT).unwrap();
    let mut number = 0;
    stream.int(&mut number).unwrap();
    assert_eq!(number, 9);

    drop(stream);
    drop(file);
    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_file_and_memory_agree() {
    let mut original = sample();
    let mut stream = Stream::memory(None, Mode::Encode);
    message(&mut stream, &mut original).unwrap();
    let from_memory = stream.base()[..stream.position()].to_vec();

    let mut stream = Stream::file(std::io::Cursor::new(Vec::new()), Mode::Encode).unwrap();
    message(&mut stream, &mut original).unwrap();
    let from_file = stream.into_backend().into_inner().into_inner();
    assert_eq!(from_memory, from_file);
}

#[test]
fn test_growth() {
    let mut stream = Stream::new(Memory::with_capacity(4), Mode::Encode);
    for i in 0..250u32 {
        let mut value = i;
        stream.u_int(&mut value).unwrap();
    }
    assert_eq!(stream.position(), 1000);
    assert_eq!(stream.backend().capacity(), 1024);

    let base = stream.base();
    for i in 0..250usize {
        let unit = &base[i * UNIT..(i + 1) * UNIT];
        assert_eq!(unit, &(i as u32).to_be_bytes());
    }
}

#[test]
fn test_no_growth() {
    let mut region = [0xAAu8; 10];
    let mut stream = Stream::memory(Some(&mut region), Mode::Encode);
    stream.int(&mut 1).unwrap();
    stream.int(&mut 2).unwrap();
    assert!(matches!(
        stream.int(&mut 3),
        Err(Error::CapacityExceeded(12, 10))
    ));
    assert!(matches!(
        stream.string(&mut Some("ab".into()), 8),
        Err(Error::CapacityExceeded(12, 10))
    ));
    assert_eq!(stream.position(), 8);
    assert_eq!(stream.backend().capacity(), 10);
    stream.destroy();
    assert_eq!(region, [0, 0, 0, 1, 0, 0, 0, 2, 0xAA, 0xAA]);
}

#[test]
fn test_padding() {
    // Fixed-length opaque data carries no length
    let mut stream = Stream::memory(None, Mode::Encode);
    stream.opaque(&mut [1, 2, 3, 4, 5]).unwrap();
    stream.int(&mut 0x0A0B0C0D).unwrap();
    assert_eq!(&stream.base()[8..12], &[0x0A, 0x0B, 0x0C, 0x0D]);

    // Variable-length opaque data is preceded by its length
    let mut stream = Stream::memory(None, Mode::Encode);
    stream.bytes(&mut Some(vec![1, 2, 3, 4, 5]), 5).unwrap();
    stream.int(&mut 0x0A0B0C0D).unwrap();
    assert_eq!(stream.position(), 16);
    assert_eq!(&stream.base()[12..16], &[0x0A, 0x0B, 0x0C, 0x0D]);
}

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: i32,
    next: Option<Box<Node>>,
}

fn node<B: Backend>(stream: &mut Stream<B>, value: &mut Node) -> Result<(), Error> {
    stream.int(&mut value.value)?;
    stream.pointer(&mut value.next, node)
}

fn chain(values: &[i32]) -> Option<Box<Node>> {
    values.iter().rev().fold(None, |next, value| {
        Some(Box::new(Node {
            value: *value,
            next,
        }))
    })
}

#[test]
fn test_pointer_chain() {
    let mut head = chain(&[10, 20, 30]);
    let mut stream = Stream::memory(None, Mode::Encode);
    stream.pointer(&mut head, node).unwrap();
    // (flag + value) per node, then a final absent flag
    assert_eq!(stream.position(), 3 * 2 * UNIT + UNIT);
    let encoded = stream.base()[..stream.position()].to_vec();

    let mut stream = Stream::new(Memory::from(encoded), Mode::Decode);
    let mut decoded = None;
    stream.pointer(&mut decoded, node).unwrap();
    assert_eq!(decoded, head);

    let mut values = Vec::new();
    let mut cursor = decoded.as_deref();
    while let Some(current) = cursor {
        values.push(current.value);
        cursor = current.next.as_deref();
    }
    assert_eq!(values, vec![10, 20, 30]);

    free(|stream, head| stream.pointer(head, node), &mut decoded).unwrap();
    assert!(decoded.is_none());
    free(|stream, head| stream.pointer(head, node), &mut decoded).unwrap();
}

#[test]
fn test_null_head() {
    let mut head: Option<Box<Node>> = None;
    let mut stream = Stream::memory(None, Mode::Encode);
    stream.pointer(&mut head, node).unwrap();
    assert_eq!(&stream.base()[..stream.position()], &[0, 0, 0, 0]);
}

#[test]
fn test_union_default_arm() {
    fn default_arm<B: Backend>(stream: &mut Stream<B>, value: &mut Filter) -> Result<(), Error> {
        // Unknown arms carry a single integer
        integer_arm(stream, value)
    }

    let mut discriminant = END;
    let mut value = Filter::Integer(77);

    let mut stream = Stream::memory(None, Mode::Encode);
    assert!(matches!(
        stream.union(&mut discriminant, &mut value, &filter_arms(), None),
        Err(Error::NoMatchingArm(END))
    ));

    let mut stream = Stream::memory(None, Mode::Encode);
    stream
        .union(
            &mut discriminant,
            &mut value,
            &filter_arms(),
            Some(default_arm),
        )
        .unwrap();
    let encoded = stream.base()[..stream.position()].to_vec();
    assert_eq!(encoded, vec![0, 0, 0, 0, 0, 0, 0, 77]);

    let mut stream = Stream::new(Memory::from(encoded), Mode::Decode);
    let mut decoded_discriminant = -1;
    let mut decoded = Filter::default();
    stream
        .union(
            &mut decoded_discriminant,
            &mut decoded,
            &filter_arms(),
            Some(default_arm),
        )
        .unwrap();
    assert_eq!(decoded_discriminant, END);
    assert_eq!(decoded, Filter::Integer(77));
}

#[test]
fn test_length_enforcement() {
    let mut stream = Stream::memory(None, Mode::Encode);
    stream.string(&mut Some("0123456789".into()), 10).unwrap();
    let encoded = stream.base()[..stream.position()].to_vec();

    let mut stream = Stream::new(Memory::from(encoded.clone()), Mode::Decode);
    let mut text = None;
    assert!(matches!(
        stream.string(&mut text, 9),
        Err(Error::LengthExceeded(10, 9))
    ));
    assert!(text.is_none());

    // The same wire data read as bytes
    let mut stream = Stream::new(Memory::from(encoded), Mode::Decode);
    let mut data = None;
    stream.bytes(&mut data, 10).unwrap();
    assert_eq!(data.as_deref(), Some(&b"0123456789"[..]));
}

#[test]
fn test_file_backend_type() {
    let cursor = std::io::Cursor::new(vec![0, 0, 0, 5]);
    let file = File::new(cursor).unwrap();
    let mut stream = Stream::new(file, Mode::Decode);
    let mut value = 0u16;
    stream.u_short(&mut value).unwrap();
    assert_eq!(value, 5);
    assert_eq!(stream.backend().get_ref().position(), 4);
}
