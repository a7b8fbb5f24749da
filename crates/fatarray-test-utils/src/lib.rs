//! Test fixtures and helpers for fatarray development.
//!
//! Provides byte encoders for the element shapes used across the test
//! suites and benches: native-endian `u32` words and a 12-byte
//! [`Record`] whose size is not a power of two.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use fatarray::FatArray;

/// Element size of a `u32` word.
pub const WORD: usize = std::mem::size_of::<u32>();

/// Encode a run of `u32` values as contiguous native-endian bytes.
pub fn u32_bytes(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

/// Decode every complete `u32` in `bytes`.
pub fn decode_u32s(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(WORD)
        .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Live elements of a `u32` array.
pub fn read_u32s(arr: &FatArray) -> Vec<u32> {
    decode_u32s(arr.as_bytes())
}

/// Build a `u32` array holding `values`, with at least `capacity` slots.
pub fn u32_array(values: &[u32], capacity: usize) -> FatArray {
    let capacity = capacity.max(values.len()).max(1);
    FatArray::from_bytes(WORD, capacity, values.len(), &u32_bytes(values))
        .expect("fixture config is valid")
}

pub fn push_u32(arr: &mut FatArray, value: u32) {
    arr.push(&value.to_ne_bytes()).expect("push u32");
}

pub fn pop_u32(arr: &mut FatArray) -> u32 {
    let mut out = [0u8; WORD];
    arr.pop(&mut out).expect("pop u32");
    u32::from_ne_bytes(out)
}

/// A 12-byte element: an id and a 2D position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Record {
    pub const SIZE: usize = 12;

    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0..4].copy_from_slice(&self.id.to_ne_bytes());
        out[4..8].copy_from_slice(&self.x.to_ne_bytes());
        out[8..12].copy_from_slice(&self.y.to_ne_bytes());
        out
    }

    pub fn decode(bytes: &[u8]) -> Self {
        let word = |i: usize| [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
        Self {
            id: u32::from_ne_bytes(word(0)),
            x: f32::from_ne_bytes(word(4)),
            y: f32::from_ne_bytes(word(8)),
        }
    }
}

/// Live elements of a [`Record`] array.
pub fn read_records(arr: &FatArray) -> Vec<Record> {
    arr.as_bytes()
        .chunks_exact(Record::SIZE)
        .map(Record::decode)
        .collect()
}
