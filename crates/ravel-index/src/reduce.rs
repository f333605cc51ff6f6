//! Summation and iteration over index sets.
//!
//! All forms evaluate in odometer order (first set outermost). Sums
//! accumulate into a single term buffer rather than chaining expression
//! additions. Positional-parameter forms stop at three sets; beyond that
//! the `_nd` forms pass the full index tuple.

use crate::product::for_each_tuple;
use crate::set::IndexSet;
use ravel_expr::{Expr, IntoExpr, VariableId};

#[derive(Default)]
struct Accumulator {
    terms: Vec<(VariableId, f64)>,
    constant: f64,
}

impl Accumulator {
    fn push(&mut self, value: impl IntoExpr) {
        let (terms, constant) = value.into_expr().into_parts();
        self.terms.extend(terms);
        self.constant += constant;
    }

    fn finish(self) -> Expr {
        Expr::new(self.terms, self.constant)
    }
}

/// Σ f(i) over one set. An empty set yields the zero expression.
pub fn sum<T: IntoExpr>(set: &IndexSet, mut f: impl FnMut(usize) -> T) -> Expr {
    let mut acc = Accumulator::default();
    for i in set {
        acc.push(f(i));
    }
    acc.finish()
}

/// Σ f(i, j) over two sets.
pub fn sum2<T: IntoExpr>(a: &IndexSet, b: &IndexSet, mut f: impl FnMut(usize, usize) -> T) -> Expr {
    let mut acc = Accumulator::default();
    for i in a {
        for j in b {
            acc.push(f(i, j));
        }
    }
    acc.finish()
}

/// Σ f(i, j, k) over three sets.
pub fn sum3<T: IntoExpr>(
    a: &IndexSet,
    b: &IndexSet,
    c: &IndexSet,
    mut f: impl FnMut(usize, usize, usize) -> T,
) -> Expr {
    let mut acc = Accumulator::default();
    for i in a {
        for j in b {
            for k in c {
                acc.push(f(i, j, k));
            }
        }
    }
    acc.finish()
}

/// Σ f(tuple) over the product of any number of sets.
pub fn sum_nd<T: IntoExpr>(sets: &[IndexSet], mut f: impl FnMut(&[usize]) -> T) -> Expr {
    let mut acc = Accumulator::default();
    for_each_tuple(sets, |tuple| acc.push(f(tuple)));
    acc.finish()
}

/// Invoke f once per member, in order, for side effects.
pub fn for_each(set: &IndexSet, mut f: impl FnMut(usize)) {
    for i in set {
        f(i);
    }
}

/// Invoke f once per pair, in odometer order.
pub fn for_each2(a: &IndexSet, b: &IndexSet, mut f: impl FnMut(usize, usize)) {
    for i in a {
        for j in b {
            f(i, j);
        }
    }
}

/// Invoke f once per triple, in odometer order.
pub fn for_each3(a: &IndexSet, b: &IndexSet, c: &IndexSet, mut f: impl FnMut(usize, usize, usize)) {
    for i in a {
        for j in b {
            for k in c {
                f(i, j, k);
            }
        }
    }
}

/// Invoke f once per tuple of the product, in odometer order.
pub fn for_each_nd(sets: &[IndexSet], f: impl FnMut(&[usize])) {
    for_each_tuple(sets, f);
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{for_each2, for_each_nd, sum, sum2, sum3, sum_nd};
    use crate::set::IndexSet;
    use ravel_expr::{Expr, VariableId};

    fn var(i: usize) -> VariableId {
        VariableId::new(i as u32)
    }

    #[test]
    fn sum_over_empty_set_is_zero() {
        let e = sum(&IndexSet::range(0), |i| Expr::var(var(i)));
        assert!(e.is_zero());
        assert_eq!(e, Expr::zero());
    }

    #[test]
    fn sum_collects_unit_terms() {
        let e = sum(&IndexSet::range(4), |i| var(i));
        let (terms, constant) = e.normalized_parts();
        assert_eq!(terms.len(), 4);
        assert!(terms.iter().all(|(_, c)| *c == 1.0));
        assert_eq!(constant, 0.0);
    }

    #[test]
    fn sum_accepts_plain_numbers() {
        let e = sum(&IndexSet::range(3), |i| i as f64);
        assert_eq!(e.constant(), 3.0);
        assert!(e.terms().is_empty());
    }

    #[test]
    fn sum2_matches_nested_partial_sums() {
        let a = IndexSet::range(3);
        let b = IndexSet::range(4);
        let coeff = |i: usize, j: usize| (i * 4 + j + 1) as f64;

        let flat = sum2(&a, &b, |i, j| Expr::term(var(i * 4 + j), coeff(i, j)));
        let regrouped = sum(&a, |i| sum(&b, |j| Expr::term(var(i * 4 + j), coeff(i, j))));
        assert_eq!(flat, regrouped);
    }

    #[test]
    fn sum_nd_matches_positional_forms() {
        let sets = [IndexSet::range(2), IndexSet::range(2), IndexSet::range(2)];
        let nd = sum_nd(&sets, |t| Expr::term(var(t[0] * 4 + t[1] * 2 + t[2]), 1.0));
        let positional = sum3(&sets[0], &sets[1], &sets[2], |i, j, k| {
            Expr::term(var(i * 4 + j * 2 + k), 1.0)
        });
        assert_eq!(nd, positional);
    }

    #[test]
    fn sum_nd_over_empty_product_is_zero() {
        assert!(sum_nd(&[], |_| 1.0).is_zero());
        let sets = [IndexSet::range(2), IndexSet::range(0)];
        assert!(sum_nd(&sets, |_| 1.0).is_zero());
    }

    #[test]
    fn for_each_orders_are_deterministic() {
        let a = IndexSet::range(2);
        let b = IndexSet::span(5, 7);
        let mut seen = Vec::new();
        for_each2(&a, &b, |i, j| seen.push((i, j)));
        assert_eq!(seen, vec![(0, 5), (0, 6), (1, 5), (1, 6)]);

        let mut nd_seen = Vec::new();
        for_each_nd(&[a, b], |t| nd_seen.push((t[0], t[1])));
        assert_eq!(nd_seen, seen);
    }
}
