//! Chunk planning over an already-bounded lexeme sequence
use serde::{Deserialize, Serialize};

use crate::config::compile_time;
use crate::tokens::Lexeme;

/// Hardware parallelism minus one, never below two
pub fn default_worker_count() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2);
    cores
        .saturating_sub(1)
        .clamp(2, compile_time::scheduler::MAX_WORKER_THREADS)
}

/// Contiguous run of lexemes classified by one worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: usize,
    pub lexemes: Vec<Lexeme>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.lexemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexemes.is_empty()
    }

    /// Source byte range covered by the chunk
    pub fn range(&self) -> ChunkRange {
        let start = self.lexemes.first().map_or(0, |l| l.offset);
        let end = self.lexemes.last().map_or(start, |l| l.end());
        ChunkRange {
            id: self.id,
            start,
            end,
            lexemes: self.lexemes.len(),
        }
    }
}

/// Where a chunk sat in the source, kept after the chunk itself is handed off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    pub id: usize,
    pub start: usize,
    pub end: usize,
    pub lexemes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPlan {
    pub total_lexemes: usize,
    pub chunk_len: usize,
    pub chunk_count: usize,
    pub workers: usize,
}

impl ChunkPlan {
    /// Lay out `total` lexemes for `workers` workers.
    ///
    /// Below `parallel_threshold`, or with a single worker, everything goes
    /// to one chunk. With fewer lexemes than workers each lexeme is its own
    /// chunk. Otherwise chunks are `max(min_chunk_size, total / 2W)` long and
    /// the last one absorbs the remainder.
    pub fn compute(
        total: usize,
        workers: usize,
        min_chunk_size: usize,
        parallel_threshold: usize,
    ) -> Self {
        let workers = workers.max(1);

        if total == 0 {
            return Self {
                total_lexemes: 0,
                chunk_len: 0,
                chunk_count: 0,
                workers: 1,
            };
        }

        if workers == 1 || total < parallel_threshold {
            return Self {
                total_lexemes: total,
                chunk_len: total,
                chunk_count: 1,
                workers: 1,
            };
        }

        if total < workers {
            return Self {
                total_lexemes: total,
                chunk_len: 1,
                chunk_count: total,
                workers: total,
            };
        }

        let chunk_len = (total / (2 * workers)).max(min_chunk_size.max(1));
        let chunk_count = (total / chunk_len).max(1);
        Self {
            total_lexemes: total,
            chunk_len,
            chunk_count,
            workers: workers.min(chunk_count),
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.workers > 1
    }

    /// Cut `lexemes` into `chunk_count` ordered chunks
    pub fn split(&self, lexemes: Vec<Lexeme>) -> Vec<Chunk> {
        let mut chunks = Vec::with_capacity(self.chunk_count);
        let mut rest = lexemes.into_iter();

        for id in 0..self.chunk_count {
            let chunk: Vec<Lexeme> = if id + 1 == self.chunk_count {
                rest.by_ref().collect()
            } else {
                rest.by_ref().take(self.chunk_len).collect()
            };
            chunks.push(Chunk { id, lexemes: chunk });
        }
        chunks
    }

    /// Chunk ids handled by `worker`, in id order
    pub fn assigned_to(&self, worker: usize) -> impl Iterator<Item = usize> {
        (worker..self.chunk_count).step_by(self.workers.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(n: usize) -> Vec<Lexeme> {
        (0..n).map(|i| Lexeme::new("x", i)).collect()
    }

    #[test]
    fn test_default_worker_floor() {
        assert!(default_worker_count() >= 2);
    }

    #[test]
    fn test_small_input_stays_on_one_worker() {
        let plan = ChunkPlan::compute(50, 4, 100, 1000);
        assert_eq!((plan.chunk_count, plan.workers), (1, 1));
        assert!(!plan.is_parallel());

        let plan = ChunkPlan::compute(5000, 1, 100, 0);
        assert_eq!((plan.chunk_count, plan.chunk_len), (1, 5000));
    }

    #[test]
    fn test_chunk_length_uses_floor() {
        // 1000 / (2 * 4) = 125
        let plan = ChunkPlan::compute(1000, 4, 100, 0);
        assert_eq!(plan.chunk_len, 125);
        assert_eq!(plan.chunk_count, 8);
        assert_eq!(plan.workers, 4);

        let plan = ChunkPlan::compute(1000, 8, 100, 0);
        assert_eq!(plan.chunk_len, 100);
        assert_eq!(plan.chunk_count, 10);
    }

    #[test]
    fn test_fewer_lexemes_than_workers() {
        let plan = ChunkPlan::compute(3, 8, 100, 0);
        assert_eq!((plan.chunk_len, plan.chunk_count, plan.workers), (1, 3, 3));
    }

    #[test]
    fn test_last_chunk_absorbs_remainder() {
        let plan = ChunkPlan::compute(1050, 4, 100, 0);
        let chunks = plan.split(lexemes(1050));
        assert_eq!(chunks.len(), plan.chunk_count);
        assert!(chunks[..chunks.len() - 1].iter().all(|c| c.len() == plan.chunk_len));
        assert_eq!(chunks.iter().map(Chunk::len).sum::<usize>(), 1050);
        assert_eq!(chunks.last().map(Chunk::len), Some(1050 - 131 * 7));
    }

    #[test]
    fn test_split_preserves_order_and_ids() {
        let plan = ChunkPlan::compute(10, 4, 1, 0);
        let chunks = plan.split(lexemes(10));
        let offsets: Vec<usize> = chunks
            .iter()
            .flat_map(|c| c.lexemes.iter().map(|l| l.offset))
            .collect();
        assert_eq!(offsets, (0..10).collect::<Vec<_>>());
        assert!(chunks.iter().enumerate().all(|(i, c)| c.id == i));
    }

    #[test]
    fn test_round_robin_assignment() {
        let plan = ChunkPlan::compute(1000, 4, 100, 0);
        let ids: Vec<usize> = plan.assigned_to(1).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn test_chunk_range() {
        let chunk = Chunk {
            id: 2,
            lexemes: vec![Lexeme::new("ab", 10), Lexeme::new(" ", 12)],
        };
        let range = chunk.range();
        assert_eq!((range.start, range.end, range.lexemes), (10, 13, 2));
    }

    #[test]
    fn test_empty_input() {
        let plan = ChunkPlan::compute(0, 4, 100, 0);
        assert!(plan.split(Vec::new()).is_empty());
    }
}
