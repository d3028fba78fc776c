// ABOUTME: Pool of reusable worst-case PCM blocks
// ABOUTME: Keeps steady-state decode loops free of per-packet allocation

use crate::types::{block_len, Channels, PcmSample};
use crossbeam::queue::ArrayQueue;
use std::sync::Arc;

/// Lock-free pool of interleaved PCM blocks sized for the 120 ms worst case.
///
/// Every block a pool vends has exactly the interleaved length the matching
/// decoder's `decode` requires, so blocks pass straight through a decode
/// loop without resizing. `get` falls back to a fresh allocation when the
/// pool runs dry, and `put` hands a block back for reuse.
pub struct BlockPool<S: PcmSample = i16> {
    pool: Arc<ArrayQueue<Vec<S>>>,
    block_len: usize,
}

impl<S: PcmSample> BlockPool<S> {
    /// Pre-allocates `pool_size` silence-filled blocks for the given format.
    ///
    /// `pool_size` must be non-zero; a zero-size pool panics.
    pub fn new(pool_size: usize, sample_rate: u32, channels: Channels) -> Self {
        let block_len = block_len(sample_rate, channels);
        let pool = Arc::new(ArrayQueue::new(pool_size));

        for _ in 0..pool_size {
            let _ = pool.push(vec![S::SILENCE; block_len]);
        }

        Self { pool, block_len }
    }

    /// Takes a block from the pool, allocating a fresh one if it is empty.
    ///
    /// A reused block keeps whatever its previous user wrote; a decode call
    /// overwrites the prefix it reports and ignores the rest.
    pub fn get(&self) -> Vec<S> {
        self.pool
            .pop()
            .unwrap_or_else(|| vec![S::SILENCE; self.block_len])
    }

    /// Returns a block to the pool; the block is dropped if the pool is full.
    pub fn put(&self, block: Vec<S>) {
        debug_assert_eq!(block.len(), self.block_len);
        let _ = self.pool.push(block);
    }

    /// Interleaved length of every block this pool vends.
    pub fn block_len(&self) -> usize {
        self.block_len
    }
}
