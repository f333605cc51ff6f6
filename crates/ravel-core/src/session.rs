//! The model-building session handed to definition callbacks.
//!
//! A session wraps the engine, the variable family table, the pending
//! constraint set, and the staged objective for one build. Variables are
//! created on the engine immediately (their handles are needed to form
//! expressions); constraints are buffered as descriptors and registered in
//! one flush pass, so DSL helpers and directly constructed descriptors go
//! through a single code path.

use crate::array::VarArray;
use crate::engine::Engine;
use crate::error::BuildError;
use crate::naming::{Naming, name_nd};
use crate::table::{FamilyKey, FamilyTable};
use crate::types::{Sense, VarSpec};
use ravel_expr::{ConstraintExpr, Expr, VariableId};
use tracing::debug;

#[derive(Debug, Clone)]
pub(crate) enum PendingConstraint {
    Linear {
        constraint: ConstraintExpr,
        name: Option<String>,
    },
    Indicator {
        indicator: VariableId,
        active_value: bool,
        constraint: ConstraintExpr,
        name: Option<String>,
    },
}

pub struct ModelSession<'s, K: FamilyKey> {
    engine: &'s mut dyn Engine,
    vars: &'s mut FamilyTable<K>,
    pending: Vec<PendingConstraint>,
    objective: Option<(Expr, Sense)>,
    naming: Naming,
}

impl<'s, K: FamilyKey> ModelSession<'s, K> {
    pub(crate) fn new(
        engine: &'s mut dyn Engine,
        vars: &'s mut FamilyTable<K>,
        naming: Naming,
    ) -> Self {
        Self {
            engine,
            vars,
            pending: Vec::new(),
            objective: None,
            naming,
        }
    }

    // ── Variables ───────────────────────────────────────────

    /// Create a variable family of the given shape and store it under a
    /// key. `dims` may be empty for a scalar family.
    pub fn add_family(
        &mut self,
        key: K,
        spec: VarSpec,
        base: &str,
        dims: &[usize],
    ) -> Result<(), BuildError> {
        let array = VarArray::attached(&mut *self.engine, spec, base, dims, self.naming)?;
        self.vars.set(key, array);
        Ok(())
    }

    /// Create a single scalar variable under a key.
    pub fn add_scalar(&mut self, key: K, spec: VarSpec, base: &str) -> Result<(), BuildError> {
        self.add_family(key, spec, base, &[])
    }

    /// Handle of one variable of a stored family.
    pub fn var(&self, key: K, indices: &[usize]) -> Result<VariableId, BuildError> {
        self.vars.var(key, indices)
    }

    /// Handle of a scalar family's variable.
    pub fn scalar(&self, key: K) -> Result<VariableId, BuildError> {
        self.vars.scalar(key)
    }

    /// The stored family itself.
    pub fn family(&self, key: K) -> Result<&VarArray, BuildError> {
        self.vars.get(key)
    }

    // ── Constraints ─────────────────────────────────────────

    /// Queue a constraint descriptor for registration at flush time.
    pub fn submit(&mut self, constraint: ConstraintExpr, name: Option<String>) {
        self.pending.push(PendingConstraint::Linear {
            constraint,
            name: self.effective_name(name),
        });
    }

    /// Queue a native conditional constraint. Rejected at flush time by
    /// engines without native indicator support.
    pub fn submit_indicator(
        &mut self,
        indicator: VariableId,
        active_value: bool,
        constraint: ConstraintExpr,
        name: Option<String>,
    ) {
        self.pending.push(PendingConstraint::Indicator {
            indicator,
            active_value,
            constraint,
            name: self.effective_name(name),
        });
    }

    /// Number of queued constraints.
    pub fn pending_constraints(&self) -> usize {
        self.pending.len()
    }

    // ── Objective ───────────────────────────────────────────

    /// Stage a minimization objective. Exactly one objective per build.
    pub fn minimize(&mut self, expr: Expr) -> Result<(), BuildError> {
        self.stage_objective(expr, Sense::Minimize)
    }

    /// Stage a maximization objective. Exactly one objective per build.
    pub fn maximize(&mut self, expr: Expr) -> Result<(), BuildError> {
        self.stage_objective(expr, Sense::Maximize)
    }

    fn stage_objective(&mut self, expr: Expr, sense: Sense) -> Result<(), BuildError> {
        if self.objective.is_some() {
            return Err(BuildError::ObjectiveAlreadySet);
        }
        debug!(
            component = "session",
            operation = "stage_objective",
            status = "success",
            sense = sense.as_str(),
            terms = expr.terms().len(),
            "Staged objective"
        );
        self.objective = Some((expr, sense));
        Ok(())
    }

    pub fn has_objective(&self) -> bool {
        self.objective.is_some()
    }

    // ── Naming ──────────────────────────────────────────────

    /// Build `base[i1,i2,...]` when naming is enabled, `None` otherwise.
    pub fn name(&self, base: &str, indices: &[usize]) -> Option<String> {
        self.naming
            .is_enabled()
            .then(|| name_nd(base, indices))
    }

    fn effective_name(&self, name: Option<String>) -> Option<String> {
        if self.naming.is_enabled() { name } else { None }
    }

    // ── Engine access ───────────────────────────────────────

    /// Direct engine access for configuration hooks.
    pub fn engine_mut(&mut self) -> &mut dyn Engine {
        &mut *self.engine
    }

    // ── Flush ───────────────────────────────────────────────

    /// Register all queued constraints and the staged objective with the
    /// engine. Fails if no objective was staged.
    pub(crate) fn flush(&mut self) -> Result<(), BuildError> {
        let queued = self.pending.len();
        for entry in self.pending.drain(..) {
            match entry {
                PendingConstraint::Linear { constraint, name } => {
                    self.engine.add_constraint(constraint, name.as_deref())?;
                }
                PendingConstraint::Indicator {
                    indicator,
                    active_value,
                    constraint,
                    name,
                } => {
                    self.engine.add_indicator(
                        indicator,
                        active_value,
                        constraint,
                        name.as_deref(),
                    )?;
                }
            }
        }

        let (expr, sense) = self.objective.take().ok_or(BuildError::ObjectiveMissing)?;
        self.engine.set_objective(expr, sense)?;

        debug!(
            component = "session",
            operation = "flush",
            status = "success",
            constraints = queued,
            variables = self.engine.num_variables(),
            "Registered model with engine"
        );
        Ok(())
    }
}
