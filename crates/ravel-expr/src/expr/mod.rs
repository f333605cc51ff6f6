//! Expression types for optimization modeling.
//!
//! - `core`: Expr, affine terms + constant
//! - `constraint`: ConstraintExpr, expression with comparison sense and RHS
//! - `convert`: IntoExpr conversions and linear_sum

pub mod constraint;
pub mod convert;
pub mod core;

pub use constraint::{ComparisonSense, ConstraintExpr};
pub use convert::{IntoExpr, linear_sum};
pub use core::Expr;
