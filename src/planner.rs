// src/planner.rs

use crate::models::ByteRange;

/// How the remaining bytes of a resource are split into requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub chunk_size: u64,
    /// Number of full-size chunks.
    pub chunk_count: u64,
    /// Length of the trailing chunk, 0 when the split is even.
    pub remainder_len: u64,
}

/// Splits `remaining` bytes into `chunk_size` pieces. A size of 0 is treated as 1.
pub fn plan(remaining: u64, chunk_size: u64) -> ChunkPlan {
    let chunk_size = chunk_size.max(1);
    if remaining < chunk_size {
        return ChunkPlan {
            chunk_size,
            chunk_count: 0,
            remainder_len: remaining,
        };
    }
    ChunkPlan {
        chunk_size,
        chunk_count: remaining / chunk_size,
        remainder_len: remaining % chunk_size,
    }
}

impl ChunkPlan {
    pub fn is_empty(&self) -> bool {
        self.chunk_count == 0 && self.remainder_len == 0
    }

    /// Total bytes covered by the plan.
    pub fn total(&self) -> u64 {
        self.chunk_count * self.chunk_size + self.remainder_len
    }

    /// Closed ranges covering `[resume_offset, resume_offset + total())` in order.
    pub fn ranges(&self, resume_offset: u64) -> impl Iterator<Item = ByteRange> + '_ {
        let full = (0..self.chunk_count).map(move |i| {
            let start = resume_offset + i * self.chunk_size;
            ByteRange::closed(start, start + self.chunk_size - 1)
        });
        let tail_start = resume_offset + self.chunk_count * self.chunk_size;
        let tail = (self.remainder_len > 0)
            .then(|| ByteRange::closed(tail_start, tail_start + self.remainder_len - 1));
        full.chain(tail)
    }
}
