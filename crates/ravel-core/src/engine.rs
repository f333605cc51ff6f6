//! The engine boundary: the external optimizer consumed by the model
//! orchestrator.
//!
//! The framework prepares a model description and dispatches it through
//! this trait; the search itself is entirely the engine's business. All
//! operations are synchronous and may fail with an [`EngineError`].

use crate::types::{Sense, VarSpec};
use ravel_expr::{ConstraintExpr, ConstraintId, Expr, VariableId};
use ravel_solver::{EngineError, RunOptions, SolveStatus};

pub trait Engine {
    /// Short backend identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Create one decision variable and return its handle. The handle is
    /// owned by the engine and valid until the next `reset`.
    fn add_variable(
        &mut self,
        spec: VarSpec,
        name: Option<&str>,
    ) -> Result<VariableId, EngineError>;

    /// Register a linear constraint from a descriptor.
    fn add_constraint(
        &mut self,
        constraint: ConstraintExpr,
        name: Option<&str>,
    ) -> Result<ConstraintId, EngineError>;

    /// Register a native conditional constraint: when `indicator` takes
    /// `active_value`, the inner constraint must hold. Engines without
    /// native support reject this.
    fn add_indicator(
        &mut self,
        _indicator: VariableId,
        _active_value: bool,
        _constraint: ConstraintExpr,
        _name: Option<&str>,
    ) -> Result<ConstraintId, EngineError> {
        Err(EngineError::Unsupported {
            operation: "indicator constraints",
        })
    }

    /// Set the objective expression and optimization sense.
    fn set_objective(&mut self, expr: Expr, sense: Sense) -> Result<(), EngineError>;

    /// Apply run-time controls ahead of `optimize`.
    fn configure(&mut self, options: &RunOptions) -> Result<(), EngineError>;

    /// Run the search. Blocks until the engine finishes or hits one of its
    /// configured budgets.
    fn optimize(&mut self) -> Result<SolveStatus, EngineError>;

    /// Objective value of the incumbent solution.
    fn objective_value(&self) -> Result<f64, EngineError>;

    /// Solution value of one variable.
    fn primal_value(&self, var: VariableId) -> Result<f64, EngineError>;

    /// Final relative optimality gap, when the engine reports one.
    fn gap(&self) -> Option<f64> {
        None
    }

    /// Nodes explored, when the engine reports them.
    fn node_count(&self) -> Option<u64> {
        None
    }

    fn num_variables(&self) -> usize;

    fn num_constraints(&self) -> usize;

    /// Export the model to a file in an engine-specific format. Opaque
    /// pass-through; not every engine supports it.
    fn write_model(&mut self, _path: &str) -> Result<(), EngineError> {
        Err(EngineError::Unsupported {
            operation: "model export",
        })
    }

    /// Discard all variables, constraints, and results, returning the
    /// engine to its freshly constructed state. Invalidates every handle
    /// issued so far.
    fn reset(&mut self);
}
