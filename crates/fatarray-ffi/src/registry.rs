//! Registry of arrays owned on behalf of C callers.
//!
//! A C caller holds a `u64` naming a registry slot and the generation that
//! slot had when the array was adopted. Releasing an array advances the
//! slot's generation, so stale handles resolve to nothing. The registry
//! owns each array outright, so a handle does not change when its array
//! reallocates.
//!
//! Element bytes coming from C are copied into registry-owned buffers
//! before any mutation runs. A caller may therefore pass a pointer into
//! the array's own storage (from `fatarray_data`) as the value to push,
//! insert or bulk-copy.

#![allow(unsafe_code)]

use std::borrow::Cow;

use fatarray::{ArrayError, FatArray};
use smallvec::{smallvec, SmallVec};

use crate::status::FatArrayStatus;

/// One element's bytes, inline for elements up to 64 bytes.
pub(crate) type Staged = SmallVec<[u8; 64]>;

/// Decoded form of a C handle: slot index in the upper 32 bits, generation
/// in the lower 32.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

impl Handle {
    fn raw(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }
}

enum Slot {
    Occupied { generation: u32, array: FatArray },
    /// Free for reuse; `next_free` links the intrusive free list.
    Vacant { generation: u32, next_free: Option<u32> },
    /// Generation wrapped to zero; never handed out again.
    Retired,
}

/// Slot+generation registry of live arrays.
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free_head: Option<u32>,
}

impl Registry {
    /// Empty registry, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    /// Take ownership of `array` and return its handle.
    pub fn adopt(&mut self, array: FatArray) -> u64 {
        if let Some(index) = self.free_head {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                if let Slot::Vacant {
                    generation,
                    next_free,
                } = *slot
                {
                    self.free_head = next_free;
                    *slot = Slot::Occupied { generation, array };
                    return Handle {
                        slot: index,
                        generation,
                    }
                    .raw();
                }
            }
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 0,
            array,
        });
        Handle {
            slot: index,
            generation: 0,
        }
        .raw()
    }

    /// Give up ownership of the array behind `handle`.
    ///
    /// `None` for a stale or unknown handle, so a double free is harmless.
    pub fn release(&mut self, handle: u64) -> Option<FatArray> {
        let Handle { slot: index, generation } = Handle::from(handle);
        let slot = self.slots.get_mut(index as usize)?;
        if !matches!(&*slot, Slot::Occupied { generation: g, .. } if *g == generation) {
            return None;
        }
        let next = generation.wrapping_add(1);
        let vacated = if next == 0 {
            Slot::Retired
        } else {
            Slot::Vacant {
                generation: next,
                next_free: self.free_head,
            }
        };
        let previous = std::mem::replace(slot, vacated);
        if next != 0 {
            self.free_head = Some(index);
        }
        match previous {
            Slot::Occupied { array, .. } => Some(array),
            _ => None,
        }
    }

    fn array(&self, handle: u64) -> Option<&FatArray> {
        let Handle { slot, generation } = Handle::from(handle);
        match self.slots.get(slot as usize)? {
            Slot::Occupied {
                generation: g,
                array,
            } if *g == generation => Some(array),
            _ => None,
        }
    }

    fn array_mut(&mut self, handle: u64) -> Option<&mut FatArray> {
        let Handle { slot, generation } = Handle::from(handle);
        match self.slots.get_mut(slot as usize)? {
            Slot::Occupied {
                generation: g,
                array,
            } if *g == generation => Some(array),
            _ => None,
        }
    }

    /// Read a value derived from the array behind `handle`.
    pub fn read(
        &self,
        handle: u64,
        f: impl FnOnce(&FatArray) -> usize,
    ) -> Result<usize, FatArrayStatus> {
        self.array(handle)
            .map(f)
            .ok_or(FatArrayStatus::InvalidHandle)
    }

    /// Apply a mutation to the array behind `handle` and collapse the
    /// outcome to a status code.
    pub fn update(
        &mut self,
        handle: u64,
        f: impl FnOnce(&mut FatArray) -> Result<(), ArrayError>,
    ) -> i32 {
        match self.array_mut(handle) {
            Some(arr) => FatArrayStatus::code(f(arr)),
            None => FatArrayStatus::InvalidHandle as i32,
        }
    }

    /// Copy one element's bytes from `value` into a registry-owned buffer.
    ///
    /// # Safety
    ///
    /// `value` must point to as many readable bytes as the element size of
    /// the array behind `handle`. It may point into that array's storage.
    pub unsafe fn stage_element(
        &self,
        handle: u64,
        value: *const u8,
    ) -> Result<Staged, FatArrayStatus> {
        let size = self
            .array(handle)
            .map(FatArray::element_size)
            .ok_or(FatArrayStatus::InvalidHandle)?;
        // SAFETY: value covers size readable bytes per the caller contract.
        // No mutable borrow of any array is live while the slice exists.
        let bytes = unsafe { std::slice::from_raw_parts(value, size) };
        Ok(Staged::from_slice(bytes))
    }

    /// View `len` bytes at `src` as a bulk-copy source for `handle`.
    ///
    /// Bytes overlapping the array's own storage are copied out first;
    /// other sources are borrowed as-is.
    ///
    /// # Safety
    ///
    /// `src` must point to `len` readable bytes that stay valid and
    /// unmodified for `'a`, except where they lie inside the array's
    /// storage.
    pub unsafe fn stage_source<'a>(
        &self,
        handle: u64,
        src: *const u8,
        len: usize,
    ) -> Result<Cow<'a, [u8]>, FatArrayStatus> {
        let arr = self.array(handle).ok_or(FatArrayStatus::InvalidHandle)?;
        if len == 0 {
            return Ok(Cow::Borrowed(&[]));
        }
        let start = arr.as_ptr() as usize;
        let end = start + arr.header().storage_bytes();
        let from = src as usize;
        // SAFETY: src covers len readable bytes per the caller contract.
        let bytes: &'a [u8] = unsafe { std::slice::from_raw_parts(src, len) };
        if from < end && from.saturating_add(len) > start {
            Ok(Cow::Owned(bytes.to_vec()))
        } else {
            Ok(Cow::Borrowed(bytes))
        }
    }

    /// Pop the last element of the array behind `handle` into an owned
    /// buffer.
    pub fn take_last(&mut self, handle: u64) -> Result<Staged, FatArrayStatus> {
        let arr = self
            .array_mut(handle)
            .ok_or(FatArrayStatus::InvalidHandle)?;
        let mut out: Staged = smallvec![0u8; arr.element_size()];
        arr.pop(&mut out).map_err(|e| FatArrayStatus::from(&e))?;
        Ok(out)
    }

    /// Current storage address of the array behind `handle`.
    pub fn data_ptr(&mut self, handle: u64) -> Option<*mut u8> {
        self.array_mut(handle).map(FatArray::as_mut_ptr)
    }

    #[cfg(test)]
    fn live(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied { .. }))
            .count()
    }
}
