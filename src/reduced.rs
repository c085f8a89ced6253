use crate::candidate::SplitCandidate;
use crate::codec::{ByteReader, ByteWriter};
use crate::data::{DataSize, NativeBytes, MIN_SCORE, UNSET_FEATURE};
use crate::errors::SplitError;
use crate::order::{impl_split_order, RankedSplit};
use serde::{Deserialize, Serialize};

/// Light weight projection of a [`SplitCandidate`], enough to rank
/// candidates and report counts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ReducedSplitCandidate {
    pub feature: i32,
    pub gain: f64,
    pub left_count: DataSize,
    pub right_count: DataSize,
}

impl Default for ReducedSplitCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&SplitCandidate> for ReducedSplitCandidate {
    fn from(candidate: &SplitCandidate) -> Self {
        let mut reduced = ReducedSplitCandidate::new();
        reduced.copy_from(candidate);
        reduced
    }
}

impl ReducedSplitCandidate {
    /// Encoded width, `feature`, `left_count`, `right_count` then `gain`.
    pub const SIZE: usize = <i32 as NativeBytes>::WIDTH
        + 2 * <DataSize as NativeBytes>::WIDTH
        + <f64 as NativeBytes>::WIDTH;

    pub fn new() -> Self {
        ReducedSplitCandidate {
            feature: UNSET_FEATURE,
            gain: MIN_SCORE,
            left_count: 0,
            right_count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.feature = UNSET_FEATURE;
        self.gain = MIN_SCORE;
    }

    pub fn is_valid(&self) -> bool {
        self.feature >= 0
    }

    /// Copy the ranked fields and counts of a full candidate.
    pub fn copy_from(&mut self, candidate: &SplitCandidate) {
        self.feature = candidate.feature;
        self.gain = candidate.gain;
        self.left_count = candidate.left_count;
        self.right_count = candidate.right_count;
    }

    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize, SplitError> {
        let mut w = ByteWriter::new(buf, Self::SIZE)?;
        w.put(self.feature);
        w.put(self.left_count);
        w.put(self.right_count);
        w.put(self.gain);
        Ok(w.position())
    }

    /// Decode a light record. The layout is also the prefix of an encoded
    /// [`SplitCandidate`], so a full candidate's bytes can be read as well.
    pub fn read_from(&mut self, buf: &[u8]) -> Result<usize, SplitError> {
        let mut r = ByteReader::new(buf, Self::SIZE)?;
        self.feature = r.take();
        self.left_count = r.take();
        self.right_count = r.take();
        self.gain = r.take();
        Ok(r.position())
    }
}

impl RankedSplit for ReducedSplitCandidate {
    fn split_gain(&self) -> f64 {
        self.gain
    }
    fn split_feature(&self) -> i32 {
        self.feature
    }
}

impl_split_order!(ReducedSplitCandidate);
