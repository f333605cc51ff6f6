//! Named constraint-building patterns on top of the session.
//!
//! Every helper composes the expression algebra and the summation engine
//! and submits through the session's pending constraint set; nothing here
//! talks to the engine directly.

use crate::naming::name_nd;
use crate::session::ModelSession;
use crate::table::FamilyKey;
use ravel_expr::{Expr, IntoExpr, VariableId};
use ravel_index::{IndexSet, sum};

impl<K: FamilyKey> ModelSession<'_, K> {
    /// Submit `lhs == rhs`.
    pub fn add_eq(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr, name: Option<&str>) {
        let constraint = lhs.into_expr().eq_expr(&rhs.into_expr());
        self.submit(constraint, name.map(str::to_string));
    }

    /// Submit `lhs <= rhs`.
    pub fn add_le(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr, name: Option<&str>) {
        let constraint = lhs.into_expr().le_expr(&rhs.into_expr());
        self.submit(constraint, name.map(str::to_string));
    }

    /// Submit `lhs >= rhs`.
    pub fn add_ge(&mut self, lhs: impl IntoExpr, rhs: impl IntoExpr, name: Option<&str>) {
        let constraint = lhs.into_expr().ge_expr(&rhs.into_expr());
        self.submit(constraint, name.map(str::to_string));
    }

    /// Submit `Σ f(i) <= 1` over the set, as a single constraint.
    pub fn at_most_one<T: IntoExpr>(
        &mut self,
        set: &IndexSet,
        f: impl FnMut(usize) -> T,
        name: Option<&str>,
    ) {
        let total = sum(set, f);
        self.submit(total.le_scalar(1.0), name.map(str::to_string));
    }

    /// Submit `Σ f(i) == 1` over the set, as a single constraint.
    pub fn exactly_one<T: IntoExpr>(
        &mut self,
        set: &IndexSet,
        f: impl FnMut(usize) -> T,
        name: Option<&str>,
    ) {
        let total = sum(set, f);
        self.submit(total.eq_scalar(1.0), name.map(str::to_string));
    }

    /// Submit `lhs <= rhs + M * (1 - indicator)`: the constraint binds only
    /// when the indicator is 1, without native conditional support.
    pub fn big_m_le(
        &mut self,
        lhs: impl IntoExpr,
        rhs: impl IntoExpr,
        indicator: VariableId,
        big_m: f64,
        name: Option<&str>,
    ) {
        let relaxed = rhs
            .into_expr()
            .add_constant(big_m)
            .add(&Expr::term(indicator, -big_m));
        let constraint = lhs.into_expr().le_expr(&relaxed);
        self.submit(constraint, name.map(str::to_string));
    }

    /// Submit `lhs >= rhs - M * (1 - indicator)`: the mirrored form of
    /// [`big_m_le`](Self::big_m_le).
    pub fn big_m_ge(
        &mut self,
        lhs: impl IntoExpr,
        rhs: impl IntoExpr,
        indicator: VariableId,
        big_m: f64,
        name: Option<&str>,
    ) {
        let relaxed = rhs
            .into_expr()
            .add_constant(-big_m)
            .add(&Expr::term(indicator, big_m));
        let constraint = lhs.into_expr().ge_expr(&relaxed);
        self.submit(constraint, name.map(str::to_string));
    }

    /// Submit a native conditional constraint: indicator == active_value
    /// implies `lhs <= rhs`. Engines without indicator support reject it
    /// at flush time.
    pub fn implies(
        &mut self,
        indicator: VariableId,
        active_value: bool,
        lhs: impl IntoExpr,
        rhs: impl IntoExpr,
        name: Option<&str>,
    ) {
        let constraint = lhs.into_expr().le_expr(&rhs.into_expr());
        self.submit_indicator(
            indicator,
            active_value,
            constraint,
            name.map(str::to_string),
        );
    }

    /// Link `z` to an upper envelope: submit `z >= f(i)` for every i.
    pub fn max_of<T: IntoExpr>(
        &mut self,
        z: VariableId,
        set: &IndexSet,
        mut f: impl FnMut(usize) -> T,
        name: Option<&str>,
    ) {
        for i in set {
            let constraint = Expr::var(z).ge_expr(&f(i).into_expr());
            self.submit(constraint, name.map(|base| name_nd(base, &[i])));
        }
    }

    /// Link `z` to a lower envelope: submit `z <= f(i)` for every i.
    pub fn min_of<T: IntoExpr>(
        &mut self,
        z: VariableId,
        set: &IndexSet,
        mut f: impl FnMut(usize) -> T,
        name: Option<&str>,
    ) {
        for i in set {
            let constraint = Expr::var(z).le_expr(&f(i).into_expr());
            self.submit(constraint, name.map(|base| name_nd(base, &[i])));
        }
    }
}
