//! Size-bounded batching for backend writes.
//!
//! An arbitrarily large set of items is partitioned into contiguous chunks
//! of at most [`MAX_UPSERT_BATCH_SIZE`](super::config::MAX_UPSERT_BATCH_SIZE)
//! and issued sequentially, one backend call per chunk. Chunks preserve
//! input order. On the first chunk error the caller aborts and surfaces
//! that error; earlier chunks remain committed, so a failed upsert is
//! non-atomic and at-least-partially applied.

use super::config::MAX_UPSERT_BATCH_SIZE;

/// Partition `items` into contiguous input-order chunks of at most
/// [`MAX_UPSERT_BATCH_SIZE`](super::config::MAX_UPSERT_BATCH_SIZE) items.
pub fn chunked<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(MAX_UPSERT_BATCH_SIZE)
}

// ============================================================================
// Tests
// ============================================================================
