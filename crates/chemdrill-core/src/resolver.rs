//! Question set resolution: shuffle, slice, and batch a raw pool.
//!
//! Pure and free of I/O; the only nondeterminism is the injected random
//! source, so property tests can run seeded.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{CountMode, OrderMode, QuestionPool, QuestionRecord, QuizSettings};

/// Produce the ordered question list for one session.
///
/// When shuffling, the **entire pool** is shuffled before any slicing, so
/// any record can appear in any batch across repeated runs. Batch windows
/// use a 1-based start and clip to pool bounds; a start beyond the pool (or
/// the invalid start 0) yields an empty list, which callers treat as "no
/// next range" rather than an error. The input pool is never mutated.
pub fn resolve<R: Rng + ?Sized>(
    pool: &QuestionPool,
    settings: &QuizSettings,
    rng: &mut R,
) -> Vec<QuestionRecord> {
    let mut records: Vec<QuestionRecord> = pool.records().to_vec();

    if settings.order == OrderMode::Shuffle {
        records.shuffle(rng);
    }

    match settings.count {
        CountMode::All { count: None } => records,
        CountMode::All { count: Some(n) } => {
            records.truncate(n);
            records
        }
        CountMode::Batch { size, start } => {
            if start == 0 {
                return Vec::new();
            }
            let lo = start - 1;
            if lo >= records.len() {
                return Vec::new();
            }
            let hi = (lo + size.len()).min(records.len());
            records[lo..hi].to_vec()
        }
    }
}
