//! Benchmark workloads for fatarray.
//!
//! Provides deterministic inputs so that runs are comparable:
//!
//! - [`word_values`]: a pseudo-random `u32` sequence derived from a seed
//! - [`payload`]: a byte buffer for bulk-copy workloads
//! - [`filled_array`]: a `u32` array already holding `n` elements

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fatarray::{ArrayError, FatArray};

/// Element counts used by every benchmark group.
pub const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

/// Generate `n` deterministic `u32` values from `seed`.
pub fn word_values(n: usize, seed: u64) -> Vec<u32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 32) as u32
        })
        .collect()
}

/// Native-endian bytes of `n` deterministic words.
pub fn payload(n: usize, seed: u64) -> Vec<u8> {
    word_values(n, seed)
        .iter()
        .flat_map(|v| v.to_ne_bytes())
        .collect()
}

/// A `u32` array of exactly `n` elements built with one bulk copy.
pub fn filled_array(n: usize, seed: u64) -> Result<FatArray, ArrayError> {
    let mut arr = FatArray::new(std::mem::size_of::<u32>())?;
    arr.bulk_copy(&payload(n, seed))?;
    Ok(arr)
}
