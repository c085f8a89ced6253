use crate::codec::{check_len, ByteReader, ByteWriter};
use crate::data::{DataSize, NativeBytes, MIN_SCORE, UNSET_FEATURE};
use crate::errors::SplitError;
use crate::order::{impl_split_order, RankedSplit};
use serde::{Deserialize, Serialize};

/// Bytes taken by the header of a framed candidate, the
/// number of categorical thresholds as a `u32`.
pub const FRAME_HEADER_SIZE: usize = <u32 as NativeBytes>::WIDTH;

/// Statistics of one proposed split of a node.
///
/// A candidate with `feature == -1` holds no split, in that case
/// every field other than `gain` is meaningless.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitCandidate {
    /// Feature index, `-1` when no split was found.
    pub feature: i32,
    /// Bin index splitting numeric features.
    pub threshold: u32,
    pub left_count: DataSize,
    pub right_count: DataSize,
    /// Number of entries of `categorical_thresholds`, `0` for
    /// numeric splits.
    pub num_categorical_thresholds: usize,
    pub left_output: f64,
    pub right_output: f64,
    pub gain: f64,
    pub left_sum_gradient: f64,
    pub left_sum_hessian: f64,
    pub right_sum_gradient: f64,
    pub right_sum_hessian: f64,
    /// Categories sent to the left child.
    pub categorical_thresholds: Vec<u32>,
    /// Whether missing values go to the left child.
    pub default_left: bool,
}

impl Default for SplitCandidate {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitCandidate {
    pub fn new() -> Self {
        SplitCandidate {
            feature: UNSET_FEATURE,
            threshold: 0,
            left_count: 0,
            right_count: 0,
            num_categorical_thresholds: 0,
            left_output: 0.,
            right_output: 0.,
            gain: MIN_SCORE,
            left_sum_gradient: 0.,
            left_sum_hessian: 0.,
            right_sum_gradient: 0.,
            right_sum_hessian: 0.,
            categorical_thresholds: Vec::new(),
            default_left: true,
        }
    }

    /// Mark this candidate as holding no split. Other fields,
    /// and the categorical buffer, are kept for reuse.
    pub fn reset(&mut self) {
        self.feature = UNSET_FEATURE;
        self.gain = MIN_SCORE;
    }

    /// True once a producer has stored a split in this candidate.
    pub fn is_valid(&self) -> bool {
        self.feature >= 0
    }

    /// Replace the categorical thresholds, keeping the count in sync.
    pub fn set_categorical_thresholds(&mut self, thresholds: Vec<u32>) {
        self.num_categorical_thresholds = thresholds.len();
        self.categorical_thresholds = thresholds;
    }

    /// Bytes needed to encode a candidate with at most
    /// `max_left_categories` categorical thresholds.
    ///
    /// This is the sum of the field widths only, the categorical count is not
    /// counted since it is not written. A LightGBM `SplitInfo::Size` buffer is
    /// 4 bytes wider per record, so slots sized here do not share a stride with
    /// those. [`SplitCandidate::framed_size`] matches that width.
    pub fn required_size(max_left_categories: usize) -> Result<usize, SplitError> {
        let fixed = <i32 as NativeBytes>::WIDTH
            + 2 * <DataSize as NativeBytes>::WIDTH
            + <u32 as NativeBytes>::WIDTH
            + 7 * <f64 as NativeBytes>::WIDTH
            + <bool as NativeBytes>::WIDTH;
        max_left_categories
            .checked_mul(<u32 as NativeBytes>::WIDTH)
            .and_then(|categories| categories.checked_add(fixed))
            .ok_or(SplitError::SizeOverflow {
                categories: max_left_categories,
            })
    }

    /// Bytes needed to encode a framed candidate, header included.
    pub fn framed_size(max_left_categories: usize) -> Result<usize, SplitError> {
        Self::required_size(max_left_categories)?
            .checked_add(FRAME_HEADER_SIZE)
            .ok_or(SplitError::SizeOverflow {
                categories: max_left_categories,
            })
    }

    /// Write the candidate to the start of `buf`, returning the number of bytes written.
    ///
    /// The number of categorical thresholds is not part of the output, the reader
    /// must know it beforehand. See [`SplitCandidate::write_framed`] for an encoding
    /// that carries it.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize, SplitError> {
        if self.categorical_thresholds.len() != self.num_categorical_thresholds {
            return Err(SplitError::CategoricalCountMismatch {
                declared: self.num_categorical_thresholds,
                actual: self.categorical_thresholds.len(),
            });
        }
        let mut w = ByteWriter::new(buf, Self::required_size(self.num_categorical_thresholds)?)?;
        w.put(self.feature);
        w.put(self.left_count);
        w.put(self.right_count);
        w.put(self.gain);
        w.put(self.threshold);
        w.put(self.left_output);
        w.put(self.right_output);
        w.put(self.left_sum_gradient);
        w.put(self.left_sum_hessian);
        w.put(self.right_sum_gradient);
        w.put(self.right_sum_hessian);
        w.put(self.default_left);
        for t in self.categorical_thresholds.iter() {
            w.put(*t);
        }
        Ok(w.position())
    }

    /// Read a candidate written by [`SplitCandidate::write_to`].
    ///
    /// `num_categorical_thresholds` must be set on `self` before calling,
    /// it decides how many categories are read.
    pub fn read_from(&mut self, buf: &[u8]) -> Result<usize, SplitError> {
        let mut r = ByteReader::new(buf, Self::required_size(self.num_categorical_thresholds)?)?;
        self.feature = r.take();
        self.left_count = r.take();
        self.right_count = r.take();
        self.gain = r.take();
        self.threshold = r.take();
        self.left_output = r.take();
        self.right_output = r.take();
        self.left_sum_gradient = r.take();
        self.left_sum_hessian = r.take();
        self.right_sum_gradient = r.take();
        self.right_sum_hessian = r.take();
        self.default_left = r.take();
        self.categorical_thresholds.clear();
        for _ in 0..self.num_categorical_thresholds {
            let t = r.take();
            self.categorical_thresholds.push(t);
        }
        Ok(r.position())
    }

    /// Write a header with the categorical count, followed by the candidate.
    pub fn write_framed(&self, buf: &mut [u8]) -> Result<usize, SplitError> {
        let count = u32::try_from(self.num_categorical_thresholds).map_err(|_| {
            SplitError::TooManyCategories {
                count: self.num_categorical_thresholds,
                max: u32::MAX as usize,
            }
        })?;
        check_len(
            Self::framed_size(self.num_categorical_thresholds)?,
            buf.len(),
        )?;
        let mut header = ByteWriter::new(buf, FRAME_HEADER_SIZE)?;
        header.put(count);
        let body = self.write_to(&mut buf[FRAME_HEADER_SIZE..])?;
        Ok(FRAME_HEADER_SIZE + body)
    }

    /// Read a candidate written by [`SplitCandidate::write_framed`], returning
    /// it along with the number of bytes consumed.
    pub fn read_framed(buf: &[u8]) -> Result<(Self, usize), SplitError> {
        let mut header = ByteReader::new(buf, FRAME_HEADER_SIZE)?;
        let count: u32 = header.take();
        let mut candidate = SplitCandidate {
            num_categorical_thresholds: count as usize,
            ..Default::default()
        };
        // Validate the whole frame before allocating for the categories.
        check_len(Self::framed_size(count as usize)?, buf.len())?;
        candidate.categorical_thresholds.reserve(count as usize);
        let body = candidate.read_from(&buf[FRAME_HEADER_SIZE..])?;
        Ok((candidate, FRAME_HEADER_SIZE + body))
    }
}

impl RankedSplit for SplitCandidate {
    fn split_gain(&self) -> f64 {
        self.gain
    }
    fn split_feature(&self) -> i32 {
        self.feature
    }
}

impl_split_order!(SplitCandidate);

#[cfg(test)]
mod tests {
    use super::*;

    fn categorical_candidate() -> SplitCandidate {
        let mut c = SplitCandidate::new();
        c.feature = 4;
        c.threshold = 17;
        c.left_count = 120;
        c.right_count = 80;
        c.gain = 3.25;
        c.left_output = -0.4;
        c.right_output = 0.6;
        c.left_sum_gradient = -12.5;
        c.left_sum_hessian = 30.0;
        c.right_sum_gradient = 9.75;
        c.right_sum_hessian = 20.0;
        c.default_left = false;
        c.set_categorical_thresholds(vec![2, 9, 11]);
        c
    }

    fn assert_same_fields(a: &SplitCandidate, b: &SplitCandidate) {
        assert_eq!(a.feature, b.feature);
        assert_eq!(a.threshold, b.threshold);
        assert_eq!(a.left_count, b.left_count);
        assert_eq!(a.right_count, b.right_count);
        assert_eq!(a.num_categorical_thresholds, b.num_categorical_thresholds);
        assert_eq!(a.left_output, b.left_output);
        assert_eq!(a.right_output, b.right_output);
        assert_eq!(a.gain.to_bits(), b.gain.to_bits());
        assert_eq!(a.left_sum_gradient, b.left_sum_gradient);
        assert_eq!(a.left_sum_hessian, b.left_sum_hessian);
        assert_eq!(a.right_sum_gradient, b.right_sum_gradient);
        assert_eq!(a.right_sum_hessian, b.right_sum_hessian);
        assert_eq!(a.categorical_thresholds, b.categorical_thresholds);
        assert_eq!(a.default_left, b.default_left);
    }

    #[test]
    fn test_new_and_reset() {
        let mut c = SplitCandidate::new();
        assert_eq!(c.feature, -1);
        assert_eq!(c.gain, MIN_SCORE);
        assert!(!c.is_valid());

        let mut other = categorical_candidate();
        assert!(other.is_valid());
        other.reset();
        assert_eq!(other.feature, -1);
        assert_eq!(other.gain, MIN_SCORE);
        assert_eq!(c, other);

        c.reset();
        assert_eq!(c, SplitCandidate::default());
    }

    #[test]
    fn test_required_size() {
        assert_eq!(SplitCandidate::required_size(0).unwrap(), 73);
        assert_eq!(SplitCandidate::required_size(1).unwrap(), 77);
        assert_eq!(SplitCandidate::required_size(32).unwrap(), 73 + 4 * 32);
        assert_eq!(SplitCandidate::framed_size(0).unwrap(), 77);
    }

    #[test]
    fn test_write_read() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::required_size(3).unwrap()];
        let written = c.write_to(&mut buf).unwrap();
        assert_eq!(written, buf.len());

        let mut decoded = SplitCandidate::new();
        decoded.num_categorical_thresholds = 3;
        let read = decoded.read_from(&buf).unwrap();
        assert_eq!(read, written);
        assert_same_fields(&c, &decoded);
    }

    #[test]
    fn test_field_layout() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::required_size(3).unwrap()];
        c.write_to(&mut buf).unwrap();
        assert_eq!(&buf[0..4], &4i32.to_ne_bytes());
        assert_eq!(&buf[4..8], &120i32.to_ne_bytes());
        assert_eq!(&buf[8..12], &80i32.to_ne_bytes());
        assert_eq!(&buf[12..20], &3.25f64.to_ne_bytes());
        assert_eq!(&buf[20..24], &17u32.to_ne_bytes());
        assert_eq!(&buf[24..32], &(-0.4f64).to_ne_bytes());
        assert_eq!(&buf[64..72], &20.0f64.to_ne_bytes());
        assert_eq!(buf[72], 0);
        assert_eq!(&buf[73..77], &2u32.to_ne_bytes());
        assert_eq!(&buf[81..85], &11u32.to_ne_bytes());
    }

    #[test]
    fn test_write_into_larger_buffer() {
        // Buffers are sized with the global maximum, the candidate only
        // uses what it needs.
        let mut c = categorical_candidate();
        c.set_categorical_thresholds(vec![]);
        let mut buf = vec![0xffu8; SplitCandidate::required_size(8).unwrap()];
        let written = c.write_to(&mut buf).unwrap();
        assert_eq!(written, SplitCandidate::required_size(0).unwrap());
        assert!(buf[written..].iter().all(|b| *b == 0xff));

        let mut decoded = SplitCandidate::new();
        decoded.read_from(&buf).unwrap();
        assert_same_fields(&c, &decoded);
    }

    #[test]
    fn test_read_count_comes_from_target() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::required_size(3).unwrap()];
        c.write_to(&mut buf).unwrap();

        let mut decoded = SplitCandidate::new();
        decoded.num_categorical_thresholds = 2;
        decoded.categorical_thresholds = vec![7; 10];
        decoded.read_from(&buf).unwrap();
        assert_eq!(decoded.categorical_thresholds, vec![2, 9]);
    }

    #[test]
    fn test_short_buffers_rejected() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::required_size(3).unwrap() - 1];
        assert!(matches!(
            c.write_to(&mut buf),
            Err(SplitError::BufferTooShort {
                needed: 85,
                available: 84
            })
        ));

        let mut decoded = SplitCandidate::new();
        decoded.num_categorical_thresholds = 3;
        assert!(matches!(
            decoded.read_from(&buf),
            Err(SplitError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut c = categorical_candidate();
        c.num_categorical_thresholds = 5;
        let mut buf = vec![0u8; SplitCandidate::required_size(5).unwrap()];
        assert!(matches!(
            c.write_to(&mut buf),
            Err(SplitError::CategoricalCountMismatch {
                declared: 5,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_framed() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::framed_size(3).unwrap()];
        let written = c.write_framed(&mut buf).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(&buf[0..4], &3u32.to_ne_bytes());

        let (decoded, read) = SplitCandidate::read_framed(&buf).unwrap();
        assert_eq!(read, written);
        assert_same_fields(&c, &decoded);
    }

    #[test]
    fn test_framed_truncated() {
        let c = categorical_candidate();
        let mut buf = vec![0u8; SplitCandidate::framed_size(3).unwrap()];
        c.write_framed(&mut buf).unwrap();
        assert!(SplitCandidate::read_framed(&buf[..buf.len() - 4]).is_err());
        assert!(SplitCandidate::read_framed(&buf[..2]).is_err());
        let mut small = vec![0u8; SplitCandidate::framed_size(2).unwrap()];
        assert!(c.write_framed(&mut small).is_err());
    }

    #[test]
    fn test_size_overflow_rejected() {
        let count = usize::MAX / 4 + 1;
        assert!(matches!(
            SplitCandidate::required_size(count),
            Err(SplitError::SizeOverflow { .. })
        ));
        assert!(SplitCandidate::framed_size(usize::MAX / 4).is_err());

        let mut c = SplitCandidate::new();
        c.num_categorical_thresholds = count;
        assert!(matches!(
            c.read_from(&[0u8; 200]),
            Err(SplitError::SizeOverflow { categories }) if categories == count
        ));
        let mut buf = vec![0u8; 200];
        assert!(c.write_to(&mut buf).is_err());
        assert!(c.write_framed(&mut buf).is_err());
    }

    #[test]
    fn test_framed_huge_count_rejected() {
        let mut buf = vec![0u8; SplitCandidate::framed_size(0).unwrap()];
        buf[0..4].copy_from_slice(&u32::MAX.to_ne_bytes());
        assert!(matches!(
            SplitCandidate::read_framed(&buf),
            Err(SplitError::BufferTooShort { .. })
        ));
    }

    #[test]
    fn test_ordering_uses_gain_and_feature() {
        let a = categorical_candidate();
        let mut b = categorical_candidate();
        b.left_count = 1;
        b.categorical_thresholds.clear();
        assert_eq!(a, b);
        b.feature = 3;
        assert!(b > a);
        b.gain = 1.0;
        assert!(a > b);
    }

    #[test]
    fn test_serde_json() {
        let c = categorical_candidate();
        let s = serde_json::to_string(&c).unwrap();
        let decoded: SplitCandidate = serde_json::from_str(&s).unwrap();
        assert_same_fields(&c, &decoded);
    }
}
