use crate::candidate::{SplitCandidate, FRAME_HEADER_SIZE};
use crate::codec::ByteReader;
use crate::config::SyncConfig;
use crate::errors::SplitError;
use crate::reduced::ReducedSplitCandidate;
use rayon::prelude::*;

/// Replace `local` with `incoming` when `incoming` is the better split.
pub fn merge_best(local: &mut SplitCandidate, incoming: SplitCandidate) {
    if incoming > *local {
        *local = incoming;
    }
}

/// The best `k` valid candidates, best first, as light records.
/// This is what a worker proposes for a global vote on features.
pub fn local_top_k(candidates: &[SplitCandidate], k: usize) -> Vec<ReducedSplitCandidate> {
    let mut ranked: Vec<&SplitCandidate> = candidates.iter().filter(|c| c.is_valid()).collect();
    ranked.sort_by(|a, b| b.cmp(a));
    ranked
        .into_iter()
        .take(k)
        .map(ReducedSplitCandidate::from)
        .collect()
}

/// Exchange of split candidates between workers.
///
/// Each worker packs its best candidates, one per slot (for example the best
/// split of each of the two leaves grown in the current step), into a buffer of
/// fixed size slots. The buffers of all workers are then reduced slot by slot,
/// so every worker ends up with the same global best candidate for every slot.
pub struct SplitSync {
    pub config: SyncConfig,
}

impl SplitSync {
    pub fn new(config: SyncConfig) -> Self {
        SplitSync { config }
    }

    /// Bytes of a single slot, large enough for any candidate
    /// within `max_cat_threshold`.
    pub fn slot_size(&self) -> Result<usize, SplitError> {
        SplitCandidate::framed_size(self.config.max_cat_threshold)
    }

    pub fn buffer_size(&self, slots: usize) -> Result<usize, SplitError> {
        slots
            .checked_mul(self.slot_size()?)
            .ok_or(SplitError::SizeOverflow {
                categories: self.config.max_cat_threshold,
            })
    }

    fn check_categories(&self, count: usize) -> Result<(), SplitError> {
        if count > self.config.max_cat_threshold {
            return Err(SplitError::TooManyCategories {
                count,
                max: self.config.max_cat_threshold,
            });
        }
        Ok(())
    }

    /// Number of whole slots in a buffer of `len` bytes.
    fn slots_in(&self, len: usize) -> Result<usize, SplitError> {
        let slot = self.slot_size()?;
        if len % slot != 0 {
            return Err(SplitError::BufferTooShort {
                needed: (len / slot + 1).saturating_mul(slot),
                available: len,
            });
        }
        Ok(len / slot)
    }

    /// Pack one candidate per slot.
    pub fn encode(&self, candidates: &[SplitCandidate]) -> Result<Vec<u8>, SplitError> {
        let slot = self.slot_size()?;
        let mut buf = vec![0u8; self.buffer_size(candidates.len())?];
        for (candidate, chunk) in candidates.iter().zip(buf.chunks_mut(slot)) {
            self.check_categories(candidate.num_categorical_thresholds)?;
            candidate.write_framed(chunk)?;
        }
        log::debug!(
            "Encoded {} candidates into {} bytes.",
            candidates.len(),
            buf.len()
        );
        Ok(buf)
    }

    /// Unpack every slot of a buffer built by [`SplitSync::encode`].
    pub fn decode(&self, buf: &[u8]) -> Result<Vec<SplitCandidate>, SplitError> {
        let slots = self.slots_in(buf.len())?;
        let mut candidates = Vec::with_capacity(slots);
        for (i, chunk) in buf.chunks(self.slot_size()?).enumerate() {
            let mut header = ByteReader::new(chunk, FRAME_HEADER_SIZE)?;
            let count: u32 = header.take();
            if let Err(e) = self.check_categories(count as usize) {
                log::warn!("Rejecting slot {}: {}", i, e);
                return Err(e);
            }
            let (candidate, _) = SplitCandidate::read_framed(chunk)?;
            candidates.push(candidate);
        }
        Ok(candidates)
    }

    /// Reduce the buffers of all workers to the best candidate of every slot.
    /// The result does not depend on the order of `buffers`, as long as no two
    /// workers report different candidates with the same gain and feature.
    pub fn reduce(&self, buffers: &[Vec<u8>]) -> Result<Vec<SplitCandidate>, SplitError> {
        let decoded: Vec<Vec<SplitCandidate>> = if self.config.parallel {
            buffers
                .par_iter()
                .map(|b| self.decode(b))
                .collect::<Result<_, _>>()?
        } else {
            buffers
                .iter()
                .map(|b| self.decode(b))
                .collect::<Result<_, _>>()?
        };
        let mut workers = decoded.into_iter();
        let mut best = match workers.next() {
            Some(first) => first,
            None => return Ok(Vec::new()),
        };
        for worker in workers {
            if worker.len() != best.len() {
                return Err(SplitError::SlotCountMismatch {
                    expected: best.len(),
                    found: worker.len(),
                });
            }
            for (local, incoming) in best.iter_mut().zip(worker) {
                merge_best(local, incoming);
            }
        }
        log::debug!(
            "Reduced {} worker buffers into {} slots.",
            buffers.len(),
            best.len()
        );
        Ok(best)
    }

    /// Pack light records back to back.
    pub fn encode_light(&self, candidates: &[ReducedSplitCandidate]) -> Result<Vec<u8>, SplitError> {
        let mut buf = vec![0u8; candidates.len() * ReducedSplitCandidate::SIZE];
        for (candidate, chunk) in candidates
            .iter()
            .zip(buf.chunks_mut(ReducedSplitCandidate::SIZE))
        {
            candidate.write_to(chunk)?;
        }
        Ok(buf)
    }

    /// Best light record across all buffers built by [`SplitSync::encode_light`].
    /// An unset record is returned when the buffers hold none.
    pub fn reduce_light(&self, buffers: &[Vec<u8>]) -> Result<ReducedSplitCandidate, SplitError> {
        let best_of = |buf: &Vec<u8>| -> Result<ReducedSplitCandidate, SplitError> {
            if buf.len() % ReducedSplitCandidate::SIZE != 0 {
                return Err(SplitError::BufferTooShort {
                    needed: (buf.len() / ReducedSplitCandidate::SIZE + 1)
                        * ReducedSplitCandidate::SIZE,
                    available: buf.len(),
                });
            }
            let mut best = ReducedSplitCandidate::new();
            let mut current = ReducedSplitCandidate::new();
            for chunk in buf.chunks(ReducedSplitCandidate::SIZE) {
                current.read_from(chunk)?;
                if current > best {
                    best = current;
                }
            }
            Ok(best)
        };
        let per_worker: Vec<ReducedSplitCandidate> = if self.config.parallel {
            buffers.par_iter().map(best_of).collect::<Result<_, _>>()?
        } else {
            buffers.iter().map(best_of).collect::<Result<_, _>>()?
        };
        Ok(per_worker
            .into_iter()
            .fold(ReducedSplitCandidate::new(), |best, c| {
                if c > best {
                    c
                } else {
                    best
                }
            }))
    }
}
