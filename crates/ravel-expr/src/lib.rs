pub mod expr;
pub mod ids;

pub use expr::{ComparisonSense, ConstraintExpr, Expr, IntoExpr, linear_sum};
pub use ids::{ConstraintId, VariableId};
