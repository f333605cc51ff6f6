//! Index sets, Cartesian products, and the summation / comprehension
//! engine for building expressions over them.
//!
//! - [`IndexSet`]: lazy integer range or explicit ordered sequence
//! - [`product`]: odometer iteration over products of sets
//! - [`reduce`]: `sum*` and `for_each*` in odometer order
//! - [`comprehend`]: ordered, nested, and flattened collection builders

pub mod comprehend;
pub mod product;
pub mod reduce;
pub mod set;

pub use comprehend::{comprehend, comprehend2, comprehend_nd};
pub use product::{Tuples, for_each_tuple, product_len, tuples};
pub use reduce::{for_each, for_each2, for_each3, for_each_nd, sum, sum2, sum3, sum_nd};
pub use set::{IndexIter, IndexSet};
