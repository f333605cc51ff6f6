//! Comprehensions: build ordered collections from index sets.

use crate::product::{for_each_tuple, product_len};
use crate::set::IndexSet;

/// `[f(i) for i in set]`, preserving order and length.
pub fn comprehend<T>(set: &IndexSet, mut f: impl FnMut(usize) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(set.len());
    for i in set {
        out.push(f(i));
    }
    out
}

/// `[[f(i, j) for j in b] for i in a]`: a dense rectangular table, outer
/// over the first set.
pub fn comprehend2<T>(
    a: &IndexSet,
    b: &IndexSet,
    mut f: impl FnMut(usize, usize) -> T,
) -> Vec<Vec<T>> {
    let mut out = Vec::with_capacity(a.len());
    for i in a {
        let mut row = Vec::with_capacity(b.len());
        for j in b {
            row.push(f(i, j));
        }
        out.push(row);
    }
    out
}

/// Flattened N-dimensional comprehension in odometer order. The result has
/// length equal to the product of the set sizes; callers reconstruct index
/// tuples from the extents.
pub fn comprehend_nd<T>(sets: &[IndexSet], mut f: impl FnMut(&[usize]) -> T) -> Vec<T> {
    let mut out = Vec::with_capacity(product_len(sets));
    for_each_tuple(sets, |tuple| out.push(f(tuple)));
    out
}
