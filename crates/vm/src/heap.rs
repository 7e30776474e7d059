//! Fixed-size byte heap with a first-fit, coalescing free list.
//!
//! The free list holds disjoint, non-adjacent half-open ranges. Together with
//! the live allocations they partition `[0, size)` exactly. Regions are kept in
//! insertion order, not sorted, and allocation takes the first region that is
//! large enough.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use tracing::debug;

use crate::error::RuntimeError;

/// A half-open range `[start, end)` of free heap bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, address: usize) -> bool {
        self.start <= address && address < self.end
    }
}

/// The machine heap.
#[derive(Debug, Clone)]
pub struct Heap {
    bytes: Vec<u8>,
    free: Vec<Region>,
    sizes: HashMap<usize, usize>,
}

impl Heap {
    /// Create a zeroed heap of `size` bytes, entirely free.
    pub fn new(size: usize) -> Self {
        let free = if size == 0 {
            Vec::new()
        } else {
            vec![Region {
                start: 0,
                end: size,
            }]
        };
        Self {
            bytes: vec![0; size],
            free,
            sizes: HashMap::new(),
        }
    }

    /// Total heap size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Current free regions, in list order.
    pub fn free_regions(&self) -> &[Region] {
        &self.free
    }

    /// Sum of all free region lengths.
    pub fn free_bytes(&self) -> usize {
        self.free.iter().map(Region::len).sum()
    }

    /// Recorded block length for an allocation base address.
    pub fn allocation_size(&self, address: usize) -> Option<usize> {
        self.sizes.get(&address).copied()
    }

    /// Number of live allocations.
    pub fn allocation_count(&self) -> usize {
        self.sizes.len()
    }

    /// Reserve `size` bytes from the first free region that can hold them.
    ///
    /// An exact fit consumes the region. A larger region is shrunk from its
    /// start, and the returned address is the region's old start.
    pub fn allocate(&mut self, size: NonZeroUsize) -> Result<usize, RuntimeError> {
        let size = size.get();
        let idx = self
            .free
            .iter()
            .position(|r| r.len() >= size)
            .ok_or(RuntimeError::OutOfMemory { requested: size })?;

        let region = self.free[idx];
        let address = region.start;
        if region.len() == size {
            debug!(
                "{size} bytes allocated from section {} -> {}, exact fit",
                region.start, region.end
            );
            self.free.remove(idx);
        } else {
            let new_start = region.start + size;
            debug!(
                "{size} bytes allocated from section {} -> {}, shrunk to {new_start} -> {}",
                region.start, region.end, region.end
            );
            self.free[idx].start = new_start;
        }
        self.sizes.insert(address, size);
        Ok(address)
    }

    /// Return the block at `address` to the free list.
    ///
    /// Addresses without an allocation record are ignored, so double frees
    /// are harmless. The released range is merged with any free neighbours.
    pub fn release(&mut self, address: usize) {
        let Some(size) = self.sizes.remove(&address) else {
            debug!("release of unknown address {address} ignored");
            return;
        };
        let end = address + size;

        let before = self.free.iter().position(|r| r.end == address);
        let after = self.free.iter().position(|r| r.start == end);

        match (before, after) {
            (Some(b), Some(a)) => {
                debug!(
                    "{size} bytes returned, joined {} -> {} and {} -> {}",
                    self.free[b].start, self.free[b].end, self.free[a].start, self.free[a].end
                );
                self.free[b].end = self.free[a].end;
                self.free.remove(a);
            }
            (Some(b), None) => {
                debug!(
                    "{size} bytes returned, extended {} -> {} to end at {end}",
                    self.free[b].start, self.free[b].end
                );
                self.free[b].end = end;
            }
            (None, Some(a)) => {
                debug!(
                    "{size} bytes returned, extended {} -> {} to start at {address}",
                    self.free[a].start, self.free[a].end
                );
                self.free[a].start = address;
            }
            (None, None) => {
                debug!("{size} bytes returned at {address} -> {end}, no neighbours");
                self.free.push(Region {
                    start: address,
                    end,
                });
            }
        }
    }

    /// True iff `address` lies in no free region.
    ///
    /// This does not check that `address` is inside the heap or that it is
    /// the base of an allocation.
    pub fn is_allocated(&self, address: usize) -> bool {
        !self.is_free(address)
    }

    /// True iff `address` lies in some free region.
    pub fn is_free(&self, address: usize) -> bool {
        self.free.iter().any(|r| r.contains(address))
    }

    /// True iff `position` falls within the bounds of some free region.
    ///
    /// Unlike [`Heap::is_free`] this takes the raw variable value, so a
    /// fractional position between two free bytes is free too. NaN is never
    /// inside a region.
    pub fn is_free_at(&self, position: f64) -> bool {
        self.free
            .iter()
            .any(|r| r.start as f64 <= position && position < r.end as f64)
    }

    /// Read the byte at `address`, `None` if outside the heap.
    pub fn load(&self, address: usize) -> Option<u8> {
        self.bytes.get(address).copied()
    }

    /// Write `byte` at `address`. Returns false if outside the heap.
    pub fn store(&mut self, address: usize, byte: u8) -> bool {
        match self.bytes.get_mut(address) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }
}

/// Convert a variable value into a heap address.
///
/// Only finite, non-negative whole numbers name a byte.
pub fn heap_address(value: f64) -> Option<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= usize::MAX as f64 {
        Some(value as usize)
    } else {
        None
    }
}

/// Truncate a value to the byte stored in the heap.
///
/// The value is truncated toward zero and reduced modulo 256. Non-finite
/// values store 0.
pub fn to_byte(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(256.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn region(start: usize, end: usize) -> Region {
        Region { start, end }
    }

    #[test]
    fn new_heap_is_one_free_region() {
        let heap = Heap::new(64);
        assert_eq!(heap.size(), 64);
        assert_eq!(heap.free_regions(), &[region(0, 64)]);
        assert_eq!(heap.load(63), Some(0));
    }

    #[test]
    fn zero_sized_heap_has_no_regions() {
        let mut heap = Heap::new(0);
        assert!(heap.free_regions().is_empty());
        assert_eq!(
            heap.allocate(nz(1)),
            Err(RuntimeError::OutOfMemory { requested: 1 })
        );
    }

    #[test]
    fn allocate_shrinks_region_from_start() {
        let mut heap = Heap::new(64);
        assert_eq!(heap.allocate(nz(10)), Ok(0));
        assert_eq!(heap.allocate(nz(4)), Ok(10));
        assert_eq!(heap.free_regions(), &[region(14, 64)]);
        assert_eq!(heap.allocation_size(10), Some(4));
    }

    #[test]
    fn exact_fit_removes_region() {
        let mut heap = Heap::new(16);
        assert_eq!(heap.allocate(nz(16)), Ok(0));
        assert!(heap.free_regions().is_empty());
        assert_eq!(
            heap.allocate(nz(1)),
            Err(RuntimeError::OutOfMemory { requested: 1 })
        );
    }

    #[test]
    fn out_of_memory_reports_request() {
        let mut heap = Heap::new(8);
        assert_eq!(
            heap.allocate(nz(9)),
            Err(RuntimeError::OutOfMemory { requested: 9 })
        );
        assert_eq!(heap.free_regions(), &[region(0, 8)]);
    }

    #[test]
    fn first_fit_uses_list_order_not_best_fit() {
        let mut heap = Heap::new(100);
        let a = heap.allocate(nz(10)).unwrap(); // 0..10
        let _b = heap.allocate(nz(10)).unwrap(); // 10..20
        let c = heap.allocate(nz(4)).unwrap(); // 20..24
        let _d = heap.allocate(nz(1)).unwrap(); // 24..25
        heap.release(a); // free: [25,100), [0,10)
        heap.release(c); // free: [25,100), [0,10), [20,24)
        assert_eq!(
            heap.free_regions(),
            &[region(25, 100), region(0, 10), region(20, 24)]
        );
        // [20,24) is an exact fit, but [25,100) comes first.
        assert_eq!(heap.allocate(nz(4)), Ok(25));
    }

    #[test]
    fn release_merges_both_neighbours() {
        let mut heap = Heap::new(30);
        let a = heap.allocate(nz(10)).unwrap();
        let b = heap.allocate(nz(10)).unwrap();
        let c = heap.allocate(nz(10)).unwrap();
        heap.release(a);
        heap.release(c);
        assert_eq!(heap.free_regions(), &[region(0, 10), region(20, 30)]);
        heap.release(b);
        assert_eq!(heap.free_regions(), &[region(0, 30)]);
    }

    #[test]
    fn release_extends_before() {
        let mut heap = Heap::new(30);
        let a = heap.allocate(nz(10)).unwrap();
        let b = heap.allocate(nz(10)).unwrap();
        let _c = heap.allocate(nz(10)).unwrap();
        heap.release(a);
        heap.release(b);
        assert_eq!(heap.free_regions(), &[region(0, 20)]);
    }

    #[test]
    fn release_extends_after() {
        let mut heap = Heap::new(30);
        let _a = heap.allocate(nz(10)).unwrap();
        let b = heap.allocate(nz(10)).unwrap();
        heap.release(b);
        assert_eq!(heap.free_regions(), &[region(10, 30)]);
    }

    #[test]
    fn release_without_neighbours_inserts_region() {
        let mut heap = Heap::new(30);
        let _a = heap.allocate(nz(10)).unwrap();
        let b = heap.allocate(nz(10)).unwrap();
        let _c = heap.allocate(nz(10)).unwrap();
        heap.release(b);
        assert_eq!(heap.free_regions(), &[region(10, 20)]);
    }

    #[test]
    fn release_unknown_and_double_free_are_noops() {
        let mut heap = Heap::new(32);
        let a = heap.allocate(nz(8)).unwrap();
        heap.release(a);
        let snapshot = heap.free_regions().to_vec();
        heap.release(a);
        heap.release(5);
        heap.release(1000);
        assert_eq!(heap.free_regions(), snapshot.as_slice());
    }

    #[test]
    fn is_allocated_is_complement_of_free() {
        let mut heap = Heap::new(16);
        assert!(!heap.is_allocated(0));
        let a = heap.allocate(nz(4)).unwrap();
        assert!(heap.is_allocated(a));
        assert!(heap.is_allocated(a + 3));
        assert!(!heap.is_allocated(a + 4));
        // Out-of-range addresses are not in any free region.
        assert!(heap.is_allocated(16));
        assert!(heap.is_allocated(usize::MAX));
    }

    #[test]
    fn is_free_at_uses_raw_bounds() {
        let mut heap = Heap::new(8);
        assert!(heap.is_free_at(0.0));
        assert!(heap.is_free_at(1.5));
        assert!(heap.is_free_at(7.99));
        assert!(!heap.is_free_at(8.0));
        assert!(!heap.is_free_at(-0.5));
        assert!(!heap.is_free_at(f64::NAN));
        let a = heap.allocate(nz(2)).unwrap();
        assert_eq!(a, 0);
        assert!(!heap.is_free_at(1.5));
        assert!(heap.is_free_at(2.0));
    }

    #[test]
    fn allocation_count_tracks_live_blocks() {
        let mut heap = Heap::new(16);
        assert_eq!(heap.allocation_count(), 0);
        let a = heap.allocate(nz(4)).unwrap();
        let b = heap.allocate(nz(4)).unwrap();
        assert_eq!(heap.allocation_count(), 2);
        heap.release(a);
        heap.release(a);
        assert_eq!(heap.allocation_count(), 1);
        heap.release(b);
        assert_eq!(heap.allocation_count(), 0);
    }

    #[test]
    fn load_and_store_respect_bounds() {
        let mut heap = Heap::new(4);
        assert!(heap.store(3, 200));
        assert_eq!(heap.load(3), Some(200));
        assert!(!heap.store(4, 1));
        assert_eq!(heap.load(4), None);
    }

    #[test]
    fn heap_address_accepts_whole_numbers_only() {
        assert_eq!(heap_address(0.0), Some(0));
        assert_eq!(heap_address(17.0), Some(17));
        assert_eq!(heap_address(-1.0), None);
        assert_eq!(heap_address(1.5), None);
        assert_eq!(heap_address(f64::NAN), None);
        assert_eq!(heap_address(f64::INFINITY), None);
    }

    #[test]
    fn to_byte_wraps_and_truncates() {
        assert_eq!(to_byte(65.0), 65);
        assert_eq!(to_byte(255.0), 255);
        assert_eq!(to_byte(256.0), 0);
        assert_eq!(to_byte(300.0), 44);
        assert_eq!(to_byte(-1.0), 255);
        assert_eq!(to_byte(7.9), 7);
        assert_eq!(to_byte(-7.9), 249);
        assert_eq!(to_byte(f64::NAN), 0);
        assert_eq!(to_byte(f64::NEG_INFINITY), 0);
    }
}
