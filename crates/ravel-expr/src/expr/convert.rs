//! Conversions into expressions.
//!
//! Summation and comprehension callbacks may return a variable handle, a
//! ready expression, or a plain number; everything funnels through
//! `IntoExpr` before accumulation.

use crate::expr::core::Expr;
use crate::ids::VariableId;

pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for &Expr {
    fn into_expr(self) -> Expr {
        self.clone()
    }
}

impl IntoExpr for VariableId {
    fn into_expr(self) -> Expr {
        Expr::var(self)
    }
}

impl IntoExpr for f64 {
    fn into_expr(self) -> Expr {
        Expr::from_constant(self)
    }
}

impl IntoExpr for i32 {
    fn into_expr(self) -> Expr {
        Expr::from_constant(f64::from(self))
    }
}

/// Combine expressions by concatenating their terms and summing constants.
/// Duplicate variable terms are NOT merged; use `normalized_parts()` on the
/// result if consolidation is needed.
pub fn linear_sum(exprs: Vec<Expr>) -> Expr {
    let mut terms = Vec::new();
    let mut constant = 0.0;
    for expr in exprs {
        let (t, c) = expr.into_parts();
        terms.extend(t);
        constant += c;
    }
    Expr::new(terms, constant)
}
