//! A type-erased, header-prefixed dynamic array.
//!
//! A [`FatArray`] is one heap block: a fixed-size [`Header`] (capacity,
//! length, element size) immediately followed by contiguous element
//! storage. The array's handle is the address of the first element; the
//! header lives at a fixed negative offset from it. Elements are opaque
//! byte blocks of a size chosen at creation.
//!
//! # Architecture
//!
//! ```text
//! FatArray (safe API, &mut self for anything that may reallocate)
//! └── RawBlock (sole owner of the allocation, the only unsafe code)
//!     ├── Header  [capacity | length | element_size]  (16-byte aligned)
//!     └── storage [live elements ... | slack ...]     ← handle
//! ```
//!
//! # Growth
//!
//! Inserting into a full array doubles its capacity. [`FatArray::bulk_copy`]
//! grows to exactly the slots needed. Capacity never shrinks unless
//! [`FatArray::resize`] is called explicitly.
//!
//! # Safety model
//!
//! Contract violations (bad index, wrong value size, zero capacity, ...)
//! are returned as [`ArrayError`]. Every storage byte, slack included, is
//! kept initialised so [`FatArray::set_len`] is safe.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod array;
pub mod config;
pub mod error;
pub mod header;
mod raw;

// Public re-exports for the primary API surface.
pub use array::{FatArray, GROWTH_FACTOR};
pub use config::ArrayConfig;
pub use error::ArrayError;
pub use header::{Header, HEADER_ALIGN, HEADER_SIZE};
