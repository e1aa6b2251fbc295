// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! First-fit sub-allocation inside an arena.

use super::arena::ByteRange;
use crate::error::ResourceError;
use std::collections::BTreeMap;

/// Tracks which byte ranges of an arena are in use.
///
/// Free space is kept as a sorted list of disjoint ranges; neighbouring free ranges
/// are merged on release. Allocation takes the first free range that fits.
#[derive(Debug, Clone)]
pub struct ArenaAllocator {
    capacity: u64,
    free: Vec<ByteRange>,
    allocated: BTreeMap<u64, u64>,
}

impl ArenaAllocator {
    /// An allocator over `capacity` free bytes.
    pub fn new(capacity: u64) -> Self {
        let free = if capacity > 0 {
            vec![ByteRange::new(0, capacity)]
        } else {
            Vec::new()
        };
        Self {
            capacity,
            free,
            allocated: BTreeMap::new(),
        }
    }

    /// Reserves `size` bytes. Returns `None` when no free range is large enough.
    /// Zero-sized requests always fail.
    pub fn allocate(&mut self, size: u64) -> Option<ByteRange> {
        if size == 0 {
            return None;
        }
        let index = self.free.iter().position(|r| r.size >= size)?;
        let block = &mut self.free[index];
        let range = ByteRange::new(block.offset, size);
        if block.size == size {
            self.free.remove(index);
        } else {
            block.offset += size;
            block.size -= size;
        }
        self.allocated.insert(range.offset, range.size);
        Some(range)
    }

    /// Returns a range handed out by `allocate`.
    ///
    /// Fails with `InvalidRange` if the range is not a live allocation.
    pub fn release(&mut self, range: ByteRange) -> Result<(), ResourceError> {
        match self.allocated.get(&range.offset) {
            Some(&size) if size == range.size => {
                self.allocated.remove(&range.offset);
            }
            _ => {
                return Err(ResourceError::InvalidRange {
                    offset: range.offset,
                    size: range.size,
                })
            }
        }
        let index = self.free.partition_point(|r| r.offset < range.offset);
        self.free.insert(index, range);
        self.merge_around(index);
        Ok(())
    }

    /// Extends the allocator to `capacity` bytes. Shrinking is refused when a live
    /// allocation would end up out of bounds.
    pub fn resize(&mut self, capacity: u64) -> Result<(), ResourceError> {
        if capacity >= self.capacity {
            if capacity > self.capacity {
                self.free.push(ByteRange::new(self.capacity, capacity - self.capacity));
                let last = self.free.len() - 1;
                self.merge_around(last);
            }
            self.capacity = capacity;
            return Ok(());
        }
        if let Some((&offset, &size)) = self.allocated.iter().next_back() {
            if offset + size > capacity {
                return Err(ResourceError::OutOfBounds {
                    offset,
                    size,
                    capacity,
                });
            }
        }
        self.free.retain_mut(|r| {
            if r.offset >= capacity {
                return false;
            }
            r.size = r.size.min(capacity - r.offset);
            true
        });
        self.capacity = capacity;
        Ok(())
    }

    /// Total managed bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> u64 {
        self.allocated.values().sum()
    }

    /// Bytes currently free.
    pub fn free(&self) -> u64 {
        self.capacity - self.used()
    }

    /// Size of the largest free range.
    pub fn largest_free(&self) -> u64 {
        self.free.iter().map(|r| r.size).max().unwrap_or(0)
    }

    /// Number of live allocations.
    pub fn allocation_count(&self) -> usize {
        self.allocated.len()
    }

    fn merge_around(&mut self, index: usize) {
        if index + 1 < self.free.len() && self.free[index].end() == self.free[index + 1].offset {
            self.free[index].size += self.free[index + 1].size;
            self.free.remove(index + 1);
        }
        if index > 0 && self.free[index - 1].end() == self.free[index].offset {
            self.free[index - 1].size += self.free[index].size;
            self.free.remove(index);
        }
    }
}
