//! Core expression type: affine combination of variables plus a constant.
//!
//! Every algebraic operation returns a new expression; operands are never
//! mutated. Duplicate terms for the same variable are allowed in the raw
//! term list and consolidated by `normalized_parts`, which is also the
//! basis of equality.

use crate::expr::constraint::{ComparisonSense, ConstraintExpr};
use crate::ids::VariableId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Expr {
    constant: f64,
    terms: Vec<(VariableId, f64)>,
}

impl Expr {
    // ── Constructors ────────────────────────────────────────

    /// Empty expression (all zeros).
    pub fn zero() -> Self {
        Self::default()
    }

    /// Expression from linear terms and constant.
    pub fn new(terms: Vec<(VariableId, f64)>, constant: f64) -> Self {
        Self { constant, terms }
    }

    /// Just a constant, no variable terms.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            constant,
            ..Default::default()
        }
    }

    /// Single linear term: coeff * var.
    pub fn term(var_id: VariableId, coeff: f64) -> Self {
        if coeff == 0.0 {
            return Self::default();
        }
        Self {
            terms: vec![(var_id, coeff)],
            ..Default::default()
        }
    }

    /// Single variable with coefficient 1.0.
    pub fn var(var_id: VariableId) -> Self {
        Self {
            terms: vec![(var_id, 1.0)],
            ..Default::default()
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    /// Consume and return (terms, constant).
    pub fn into_parts(self) -> (Vec<(VariableId, f64)>, f64) {
        (self.terms, self.constant)
    }

    /// True when there are no variable terms and the constant is zero.
    pub fn is_zero(&self) -> bool {
        self.constant == 0.0 && self.normalized_terms().is_empty()
    }

    // ── Operations ──────────────────────────────────────────

    /// Scale all terms and the constant by a factor.
    pub fn scale(&self, by: f64) -> Self {
        Self {
            constant: self.constant * by,
            terms: self
                .terms
                .iter()
                .map(|(v, c)| (*v, *c * by))
                .filter(|(_, c)| *c != 0.0)
                .collect(),
        }
    }

    /// Add another expression (concatenates terms, sums constants).
    pub fn add(&self, other: &Expr) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        terms.extend_from_slice(&self.terms);
        terms.extend_from_slice(&other.terms);
        Self {
            constant: self.constant + other.constant,
            terms,
        }
    }

    /// Add a constant offset.
    pub fn add_constant(&self, value: f64) -> Self {
        Self {
            constant: self.constant + value,
            terms: self.terms.clone(),
        }
    }

    /// Copy with constant set to zero.
    pub fn without_constant(&self) -> Self {
        Self {
            constant: 0.0,
            terms: self.terms.clone(),
        }
    }

    /// Merged terms with duplicates combined and zero coefficients dropped.
    pub fn normalized_terms(&self) -> Vec<(VariableId, f64)> {
        let mut merged: BTreeMap<VariableId, f64> = BTreeMap::new();
        for (var_id, coeff) in &self.terms {
            if *coeff == 0.0 {
                continue;
            }
            *merged.entry(*var_id).or_insert(0.0) += *coeff;
        }
        merged.into_iter().filter(|(_, c)| *c != 0.0).collect()
    }

    /// Consolidated form: (merged terms, constant).
    pub fn normalized_parts(&self) -> (Vec<(VariableId, f64)>, f64) {
        (self.normalized_terms(), self.constant)
    }

    // ── Comparison methods (produce ConstraintExpr) ─────────

    pub fn compare_scalar(&self, rhs: f64, sense: ComparisonSense) -> ConstraintExpr {
        ConstraintExpr::new(self.without_constant(), sense, rhs - self.constant)
    }

    pub fn compare_expr(&self, other: &Expr, sense: ComparisonSense) -> ConstraintExpr {
        let combined = self.add(&other.scale(-1.0));
        ConstraintExpr::new(combined.without_constant(), sense, -combined.constant)
    }

    pub fn le_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_scalar(&self, rhs: f64) -> ConstraintExpr {
        self.compare_scalar(rhs, ComparisonSense::Equal)
    }

    pub fn le_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::LessEqual)
    }

    pub fn ge_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::GreaterEqual)
    }

    pub fn eq_expr(&self, rhs: &Expr) -> ConstraintExpr {
        self.compare_expr(rhs, ComparisonSense::Equal)
    }
}

/// Equality over the consolidated form, so algebraically equivalent
/// expressions compare equal regardless of term order or duplication.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.normalized_parts() == other.normalized_parts()
    }
}

// ── Operator overloads ──────────────────────────────────────

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Self::Output {
        Expr::add(&self, &rhs.scale(-1.0))
    }
}

impl std::ops::Mul<f64> for Expr {
    type Output = Expr;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

impl std::ops::Div<f64> for Expr {
    type Output = Expr;

    fn div(self, rhs: f64) -> Self::Output {
        self.scale(1.0 / rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        self.scale(-1.0)
    }
}

impl std::ops::Add<f64> for Expr {
    type Output = Expr;

    fn add(self, rhs: f64) -> Self::Output {
        self.add_constant(rhs)
    }
}

impl std::ops::Sub<f64> for Expr {
    type Output = Expr;

    fn sub(self, rhs: f64) -> Self::Output {
        self.add_constant(-rhs)
    }
}

impl std::ops::Add<Expr> for f64 {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Self::Output {
        rhs.add_constant(self)
    }
}

impl std::ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        rhs.scale(self)
    }
}
