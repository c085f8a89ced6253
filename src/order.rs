use crate::data::{MIN_SCORE, UNSET_FEATURE};
use std::cmp::Ordering;

/// A record that can be ranked as a split candidate.
pub trait RankedSplit {
    fn split_gain(&self) -> f64;
    fn split_feature(&self) -> i32;
}

/// Gain and feature as used for ranking, the stored
/// fields are left as they are.
pub fn rank_key<S: RankedSplit + ?Sized>(split: &S) -> (f64, i32) {
    let gain = split.split_gain();
    let gain = if gain.is_nan() { MIN_SCORE } else { gain };
    let feature = split.split_feature();
    let feature = if feature == UNSET_FEATURE {
        i32::MAX
    } else {
        feature
    };
    (gain, feature)
}

/// Compare two candidates, possibly of different record types.
/// `Ordering::Greater` means `a` is the better split.
///
/// Only the gain and the feature index are looked at, so every worker that
/// sees the same set of candidates picks the same winner, whatever the order
/// it merges them in.
///
/// * A `NaN` gain ranks as [`MIN_SCORE`].
/// * An unset feature ([`UNSET_FEATURE`]) ranks as `i32::MAX`.
/// * A larger gain is better. On equal gains, the smaller feature index is better.
///
/// A concrete candidate whose gain is exactly [`MIN_SCORE`] ties with an unset
/// candidate on gain, and then wins on feature index.
pub fn compare_splits<A, B>(a: &A, b: &B) -> Ordering
where
    A: RankedSplit + ?Sized,
    B: RankedSplit + ?Sized,
{
    let (a_gain, a_feature) = rank_key(a);
    let (b_gain, b_feature) = rank_key(b);
    if a_gain != b_gain {
        // Neither gain is NaN at this point.
        if a_gain > b_gain {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    } else {
        b_feature.cmp(&a_feature)
    }
}

/// Implement `PartialEq`, `Eq`, `PartialOrd` and `Ord` for a record
/// through [`compare_splits`].
macro_rules! impl_split_order {
    ($t:ty) => {
        impl PartialEq for $t {
            fn eq(&self, other: &Self) -> bool {
                $crate::order::compare_splits(self, other) == std::cmp::Ordering::Equal
            }
        }

        impl Eq for $t {}

        impl PartialOrd for $t {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $t {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                $crate::order::compare_splits(self, other)
            }
        }
    };
}

pub(crate) use impl_split_order;
