//! Edge weights with a total order.
//!
//! Traversals enumerate neighbors by edge weight: breadth-first in ascending
//! order, depth-first by pushing in descending order so the lightest unvisited
//! neighbor is popped first. Sorting is stable, so equal weights keep insertion
//! order. The unit weight `()` used by unweighted graphs compares everything equal
//! and skips sorting entirely.

use core::cmp::Ordering;
use core::fmt::Debug;
use core::time::Duration;

/// A totally ordered edge weight.
pub trait Weight: Clone + Debug + Send + 'static {
    /// Whether comparisons carry information. `false` skips neighbor sorting.
    const ORDERED: bool = true;

    /// Total order over weights.
    fn weight_cmp(&self, other: &Self) -> Ordering;
}

impl Weight for () {
    const ORDERED: bool = false;

    #[inline]
    fn weight_cmp(&self, _other: &Self) -> Ordering {
        Ordering::Equal
    }
}

macro_rules! impl_ord_weight {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Weight for $ty {
                #[inline]
                fn weight_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }
        )*
    };
}

impl_ord_weight!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, Duration);

impl Weight for f32 {
    #[inline]
    fn weight_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Weight for f64 {
    #[inline]
    fn weight_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

/// Direction in which neighbors are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WeightOrder {
    Ascending,
    Descending,
}

/// Stable-sorts `items` by the weight `key` looks up for each, in `order`.
pub(crate) fn sort_by_weight<'w, W, T, K>(items: &mut [T], order: WeightOrder, mut key: K)
where
    W: Weight + 'w,
    K: FnMut(&T) -> &'w W,
{
    if !W::ORDERED || items.len() < 2 {
        return;
    }
    match order {
        WeightOrder::Ascending => items.sort_by(|a, b| key(a).weight_cmp(key(b))),
        WeightOrder::Descending => items.sort_by(|a, b| key(b).weight_cmp(key(a))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_sort_keeps_ties_in_insertion_order() {
        let weights = [1u32, 5, 1, 5];
        let mut items = vec![0usize, 1, 2, 3];
        sort_by_weight(&mut items, WeightOrder::Descending, |&i| &weights[i]);
        assert_eq!(items, vec![1, 3, 0, 2]);
    }

    #[test]
    fn float_weights_order_nan_last() {
        let weights = [f64::NAN, 2.0, -1.0];
        let mut items = vec![0usize, 1, 2];
        sort_by_weight(&mut items, WeightOrder::Ascending, |&i| &weights[i]);
        assert_eq!(items, vec![2, 1, 0]);
    }

    #[test]
    fn unit_weight_leaves_order_untouched() {
        let weights = [(), (), ()];
        let mut items = vec![2usize, 0, 1];
        sort_by_weight(&mut items, WeightOrder::Ascending, |&i| &weights[i]);
        assert_eq!(items, vec![2, 0, 1]);
    }
}
