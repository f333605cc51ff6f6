//! Model lifecycle orchestration.
//!
//! A [`Runner`] owns a model definition and an engine, drives the build
//! phases in strict order, and classifies the outcome into a
//! [`SolveReport`]. `solve` is a failure boundary: every error raised by
//! the build phases or the engine comes back inside the report, never as
//! an escaping fault.

use crate::engine::Engine;
use crate::error::BuildError;
use crate::naming::Naming;
use crate::session::ModelSession;
use crate::table::{FamilyKey, FamilyTable};
use ravel_solver::{EngineError, RunOptions, SolveReport};
use ravel_tools::memory::MemoryProbe;
use std::time::Instant;
use tracing::{debug, warn};

/// A concrete model: the three required build callbacks plus an optional
/// configuration hook. Callbacks must be idempotent for `solve` to be
/// re-invocable; each solve rebuilds from scratch.
pub trait ModelDefinition {
    type Family: FamilyKey;

    /// Populate the family table. Runs first.
    fn create_variables(&mut self, m: &mut ModelSession<'_, Self::Family>)
    -> Result<(), BuildError>;

    /// Read variables and submit constraint descriptors. Runs second.
    fn add_constraints(&mut self, m: &mut ModelSession<'_, Self::Family>)
    -> Result<(), BuildError>;

    /// Stage exactly one objective. Runs third.
    fn set_objective(&mut self, m: &mut ModelSession<'_, Self::Family>) -> Result<(), BuildError>;

    /// Engine-specific tuning. Runs last before the engine call; default
    /// is a no-op.
    fn configure(&mut self, _m: &mut ModelSession<'_, Self::Family>) -> Result<(), BuildError> {
        Ok(())
    }
}

/// Where one solve invocation currently stands. Phases advance strictly in
/// order; re-invoking `solve` starts over from `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Created,
    VariablesBuilt,
    ConstraintsBuilt,
    ObjectiveSet,
    Configured,
    Solved { success: bool },
}

impl BuildPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildPhase::Created => "created",
            BuildPhase::VariablesBuilt => "variables_built",
            BuildPhase::ConstraintsBuilt => "constraints_built",
            BuildPhase::ObjectiveSet => "objective_set",
            BuildPhase::Configured => "configured",
            BuildPhase::Solved { success: true } => "solved",
            BuildPhase::Solved { success: false } => "failed",
        }
    }
}

pub struct Runner<D: ModelDefinition, E: Engine> {
    definition: D,
    engine: E,
    vars: FamilyTable<D::Family>,
    naming: Naming,
    phase: BuildPhase,
}

impl<D: ModelDefinition, E: Engine> Runner<D, E> {
    pub fn new(definition: D, engine: E) -> Self {
        Self {
            definition,
            engine,
            vars: FamilyTable::new(),
            naming: Naming::default(),
            phase: BuildPhase::Created,
        }
    }

    /// Enable or disable debug-name generation for this runner's builds.
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Build and solve. Runs create-variables, add-constraints,
    /// set-objective, and configure in order, registers the model with the
    /// engine, applies the run options, and invokes the engine. Always
    /// returns a report; a failure anywhere is classified into
    /// `success = false` with whatever timing was already measured.
    pub fn solve(&mut self, options: &RunOptions) -> SolveReport {
        let started = Instant::now();
        self.phase = BuildPhase::Created;
        self.vars = FamilyTable::new();
        self.engine.reset();

        match self.run_build(options, started) {
            Ok(report) => {
                self.phase = BuildPhase::Solved { success: true };
                debug!(
                    component = "runner",
                    operation = "solve",
                    status = "success",
                    solve_status = report.status.as_str(),
                    objective = report.objective,
                    elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                    "Solve finished"
                );
                report
            }
            Err(err) => {
                self.phase = BuildPhase::Solved { success: false };
                warn!(
                    component = "runner",
                    operation = "solve",
                    status = "error",
                    code = err.code(),
                    error = %err,
                    "Solve failed"
                );
                SolveReport::failure(err.to_string(), started.elapsed())
            }
        }
    }

    fn run_build(
        &mut self,
        options: &RunOptions,
        started: Instant,
    ) -> Result<SolveReport, BuildError> {
        let Self {
            definition,
            engine,
            vars,
            naming,
            phase,
        } = self;

        let mut probe = MemoryProbe::new();
        let mut session = ModelSession::new(&mut *engine, vars, *naming);

        definition.create_variables(&mut session)?;
        *phase = BuildPhase::VariablesBuilt;
        probe.record("variables");

        definition.add_constraints(&mut session)?;
        *phase = BuildPhase::ConstraintsBuilt;
        probe.record("constraints");

        definition.set_objective(&mut session)?;
        if !session.has_objective() {
            return Err(BuildError::ObjectiveMissing);
        }
        *phase = BuildPhase::ObjectiveSet;

        definition.configure(&mut session)?;
        *phase = BuildPhase::Configured;

        session.flush()?;

        engine.configure(options)?;
        probe.record("configure");
        let status = engine.optimize()?;
        probe.record("optimize");

        let elapsed = started.elapsed();
        let objective = if status.has_solution() {
            match engine.objective_value() {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        component = "runner",
                        operation = "read_objective",
                        status = "warn",
                        code = err.code(),
                        "Objective unavailable despite solution status; defaulting to 0"
                    );
                    0.0
                }
            }
        } else {
            0.0
        };

        if let Some(growth) = probe.growth() {
            debug!(
                component = "runner",
                operation = "memory",
                status = "success",
                rss_delta_bytes = growth,
                "Build-to-solve memory growth"
            );
        }

        Ok(SolveReport {
            success: true,
            status,
            objective,
            elapsed,
            node_count: engine.node_count(),
            gap: engine.gap(),
            message: String::new(),
        })
    }

    /// Solution value of one variable after a solve.
    pub fn value(&self, key: D::Family, indices: &[usize]) -> Result<f64, BuildError> {
        let var = self.vars.var(key, indices)?;
        Ok(self.engine.primal_value(var)?)
    }

    /// Export the engine's model to a file (engine-specific format).
    pub fn write_model(&mut self, path: &str) -> Result<(), EngineError> {
        self.engine.write_model(path)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::{BuildPhase, ModelDefinition, Runner};
    use crate::engine::Engine;
    use crate::error::BuildError;
    use crate::naming::Naming;
    use crate::session::ModelSession;
    use crate::types::{Sense, VarSpec};
    use ravel_expr::{ComparisonSense, ConstraintExpr, ConstraintId, Expr, VariableId};
    use ravel_index::{IndexSet, sum};
    use ravel_solver::{EngineError, RunOptions, SolveStatus};

    /// Records everything it is told and answers with canned results.
    #[derive(Default)]
    struct StubEngine {
        variables: Vec<(VarSpec, Option<String>)>,
        constraints: Vec<(ConstraintExpr, Option<String>)>,
        indicators: Vec<(VariableId, bool, ConstraintExpr, Option<String>)>,
        objective: Option<(Expr, Sense)>,
        options: Option<RunOptions>,
        resets: usize,
        status: Option<SolveStatus>,
        objective_value: f64,
        fail_optimize: bool,
        fail_objective_read: bool,
        fail_constraints: bool,
    }

    impl StubEngine {
        fn optimal(objective_value: f64) -> Self {
            Self {
                status: Some(SolveStatus::Optimal),
                objective_value,
                ..Self::default()
            }
        }
    }

    impl Engine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn add_variable(
            &mut self,
            spec: VarSpec,
            name: Option<&str>,
        ) -> Result<VariableId, EngineError> {
            let id = VariableId::new(self.variables.len() as u32);
            self.variables.push((spec, name.map(str::to_string)));
            Ok(id)
        }

        fn add_constraint(
            &mut self,
            constraint: ConstraintExpr,
            name: Option<&str>,
        ) -> Result<ConstraintId, EngineError> {
            if self.fail_constraints {
                return Err(EngineError::Backend {
                    code: "10020".to_string(),
                    message: "row rejected".to_string(),
                });
            }
            let id = ConstraintId::new(self.constraints.len() as u32);
            self.constraints.push((constraint, name.map(str::to_string)));
            Ok(id)
        }

        fn add_indicator(
            &mut self,
            indicator: VariableId,
            active_value: bool,
            constraint: ConstraintExpr,
            name: Option<&str>,
        ) -> Result<ConstraintId, EngineError> {
            let id = ConstraintId::new((self.constraints.len() + self.indicators.len()) as u32);
            self.indicators
                .push((indicator, active_value, constraint, name.map(str::to_string)));
            Ok(id)
        }

        fn set_objective(&mut self, expr: Expr, sense: Sense) -> Result<(), EngineError> {
            self.objective = Some((expr, sense));
            Ok(())
        }

        fn configure(&mut self, options: &RunOptions) -> Result<(), EngineError> {
            self.options = Some(options.clone());
            Ok(())
        }

        fn optimize(&mut self) -> Result<SolveStatus, EngineError> {
            if self.fail_optimize {
                return Err(EngineError::Backend {
                    code: "LICENSE".to_string(),
                    message: "no license".to_string(),
                });
            }
            Ok(self.status.unwrap_or(SolveStatus::Unknown))
        }

        fn objective_value(&self) -> Result<f64, EngineError> {
            if self.fail_objective_read {
                return Err(EngineError::SolveRequired {
                    operation: "objective_value",
                });
            }
            Ok(self.objective_value)
        }

        fn primal_value(&self, var: VariableId) -> Result<f64, EngineError> {
            Ok(f64::from(var.inner()))
        }

        fn num_variables(&self) -> usize {
            self.variables.len()
        }

        fn num_constraints(&self) -> usize {
            self.constraints.len()
        }

        fn reset(&mut self) {
            self.resets += 1;
            self.variables.clear();
            self.constraints.clear();
            self.indicators.clear();
            self.objective = None;
            self.options = None;
        }
    }

    crate::variable_families! {
        enum PackVar { Select }
    }

    /// Select items under a weight budget; optionally misbehaves for the
    /// boundary tests.
    struct PackModel {
        weights: Vec<f64>,
        skip_objective: bool,
        double_objective: bool,
    }

    impl PackModel {
        fn new(weights: Vec<f64>) -> Self {
            Self {
                weights,
                skip_objective: false,
                double_objective: false,
            }
        }

        fn items(&self) -> IndexSet {
            IndexSet::range(self.weights.len())
        }
    }

    impl ModelDefinition for PackModel {
        type Family = PackVar;

        fn create_variables(
            &mut self,
            m: &mut ModelSession<'_, PackVar>,
        ) -> Result<(), BuildError> {
            m.add_family(PackVar::Select, VarSpec::binary(), "select", &[self.weights.len()])
        }

        fn add_constraints(&mut self, m: &mut ModelSession<'_, PackVar>) -> Result<(), BuildError> {
            let items = self.items();
            let weights = self.weights.clone();
            let load = sum(&items, |i| {
                Expr::term(m.var(PackVar::Select, &[i]).unwrap(), weights[i])
            });
            m.add_le(load, 8.0, Some("capacity"));
            Ok(())
        }

        fn set_objective(&mut self, m: &mut ModelSession<'_, PackVar>) -> Result<(), BuildError> {
            if self.skip_objective {
                return Ok(());
            }
            let items = self.items();
            let total = sum(&items, |i| m.var(PackVar::Select, &[i]).unwrap());
            m.maximize(total.clone())?;
            if self.double_objective {
                m.maximize(total)?;
            }
            Ok(())
        }
    }

    #[test]
    fn solve_builds_registers_and_reports() {
        let model = PackModel::new(vec![1.0, 3.0, 2.0]);
        let mut runner = Runner::new(model, StubEngine::optimal(42.0));

        let report = runner.solve(&RunOptions::new().with_time_limit(5.0));

        assert!(report.success);
        assert_eq!(report.status, SolveStatus::Optimal);
        assert_eq!(report.objective, 42.0);
        assert!(report.message.is_empty());
        assert_eq!(runner.phase(), BuildPhase::Solved { success: true });

        let engine = runner.engine();
        assert_eq!(engine.num_variables(), 3);
        assert_eq!(engine.num_constraints(), 1);
        assert_eq!(engine.options.as_ref().unwrap().time_limit, Some(5.0));
        let (_, sense) = engine.objective.as_ref().unwrap();
        assert_eq!(*sense, Sense::Maximize);
    }

    #[test]
    fn engine_failure_is_classified_not_raised() {
        let model = PackModel::new(vec![1.0, 2.0]);
        let mut engine = StubEngine::optimal(0.0);
        engine.fail_optimize = true;
        let mut runner = Runner::new(model, engine);

        let report = runner.solve(&RunOptions::new());

        assert!(!report.success);
        assert!(report.message.contains("ENGINE_BACKEND"));
        assert!(report.message.contains("no license"));
        assert_eq!(runner.phase(), BuildPhase::Solved { success: false });
    }

    #[test]
    fn constraint_rejection_is_classified() {
        let model = PackModel::new(vec![1.0]);
        let mut engine = StubEngine::optimal(0.0);
        engine.fail_constraints = true;
        let mut runner = Runner::new(model, engine);

        let report = runner.solve(&RunOptions::new());
        assert!(!report.success);
        assert!(report.message.contains("row rejected"));
    }

    #[test]
    fn missing_objective_fails_the_build() {
        let mut model = PackModel::new(vec![1.0]);
        model.skip_objective = true;
        let mut runner = Runner::new(model, StubEngine::optimal(0.0));

        let report = runner.solve(&RunOptions::new());
        assert!(!report.success);
        assert!(report.message.contains("OBJECTIVE_MISSING"));
    }

    #[test]
    fn second_objective_fails_the_build() {
        let mut model = PackModel::new(vec![1.0]);
        model.double_objective = true;
        let mut runner = Runner::new(model, StubEngine::optimal(0.0));

        let report = runner.solve(&RunOptions::new());
        assert!(!report.success);
        assert!(report.message.contains("OBJECTIVE_ALREADY_SET"));
    }

    #[test]
    fn objective_read_failure_defaults_to_zero() {
        let model = PackModel::new(vec![1.0]);
        let mut engine = StubEngine::optimal(99.0);
        engine.status = Some(SolveStatus::TimeLimit);
        engine.fail_objective_read = true;
        let mut runner = Runner::new(model, engine);

        let report = runner.solve(&RunOptions::new());
        assert!(report.success);
        assert_eq!(report.status, SolveStatus::TimeLimit);
        assert_eq!(report.objective, 0.0);
    }

    #[test]
    fn no_solution_status_skips_objective_read() {
        let model = PackModel::new(vec![1.0]);
        let mut engine = StubEngine::optimal(77.0);
        engine.status = Some(SolveStatus::Infeasible);
        let mut runner = Runner::new(model, engine);

        let report = runner.solve(&RunOptions::new());
        assert!(report.success);
        assert_eq!(report.objective, 0.0);
        assert!(!report.has_solution());
    }

    #[test]
    fn resolve_rebuilds_from_scratch() {
        let model = PackModel::new(vec![1.0, 2.0]);
        let mut runner = Runner::new(model, StubEngine::optimal(7.0));

        let first = runner.solve(&RunOptions::new());
        let second = runner.solve(&RunOptions::new());

        assert_eq!(first.objective, second.objective);
        assert_eq!(first.status, second.status);
        assert_eq!(runner.engine().resets, 2);
        // Rebuild did not accumulate duplicates.
        assert_eq!(runner.engine().num_variables(), 2);
        assert_eq!(runner.engine().num_constraints(), 1);
    }

    #[test]
    fn value_reads_primal_through_the_table() {
        let model = PackModel::new(vec![1.0, 2.0, 3.0]);
        let mut runner = Runner::new(model, StubEngine::optimal(1.0));
        runner.solve(&RunOptions::new());

        assert_eq!(runner.value(PackVar::Select, &[2]).unwrap(), 2.0);
        assert!(runner.value(PackVar::Select, &[9]).is_err());
    }

    #[test]
    fn naming_disabled_sends_no_names() {
        let model = PackModel::new(vec![1.0, 2.0]);
        let mut runner = Runner::new(model, StubEngine::optimal(0.0));
        runner.solve(&RunOptions::new());

        assert!(
            runner
                .engine()
                .variables
                .iter()
                .all(|(_, name)| name.is_none())
        );
        assert!(
            runner
                .engine()
                .constraints
                .iter()
                .all(|(_, name)| name.is_none())
        );
    }

    #[test]
    fn naming_enabled_generates_indexed_names() {
        let model = PackModel::new(vec![1.0, 2.0]);
        let mut runner =
            Runner::new(model, StubEngine::optimal(0.0)).with_naming(Naming::Enabled);
        runner.solve(&RunOptions::new());

        let names: Vec<_> = runner
            .engine()
            .variables
            .iter()
            .map(|(_, name)| name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["select[0]", "select[1]"]);
        assert_eq!(
            runner.engine().constraints[0].1.as_deref(),
            Some("capacity")
        );
    }

    /// Uses the cardinality and envelope helpers so their submitted shapes
    /// can be checked on the recorded descriptors.
    struct HelperModel;

    crate::variable_families! {
        enum HelperVar { Pick, Peak }
    }

    impl ModelDefinition for HelperModel {
        type Family = HelperVar;

        fn create_variables(
            &mut self,
            m: &mut ModelSession<'_, HelperVar>,
        ) -> Result<(), BuildError> {
            m.add_family(HelperVar::Pick, VarSpec::binary(), "pick", &[4])?;
            m.add_scalar(HelperVar::Peak, VarSpec::continuous(0.0, 100.0), "peak")
        }

        fn add_constraints(
            &mut self,
            m: &mut ModelSession<'_, HelperVar>,
        ) -> Result<(), BuildError> {
            let items = IndexSet::range(4);
            let picks: Vec<_> = (0..4).map(|i| m.var(HelperVar::Pick, &[i]).unwrap()).collect();
            m.at_most_one(&items, |i| picks[i], None);
            m.exactly_one(&items, |i| picks[i], None);

            let peak = m.scalar(HelperVar::Peak)?;
            m.max_of(peak, &items, |i| picks[i], None);
            m.big_m_le(picks[0], picks[1], picks[2], 50.0, None);
            m.implies(picks[3], true, picks[0], picks[1], None);
            Ok(())
        }

        fn set_objective(&mut self, m: &mut ModelSession<'_, HelperVar>) -> Result<(), BuildError> {
            let peak = m.scalar(HelperVar::Peak)?;
            m.minimize(Expr::var(peak))
        }
    }

    #[test]
    fn cardinality_helpers_submit_unit_sums() {
        let mut runner = Runner::new(HelperModel, StubEngine::optimal(0.0));
        runner.solve(&RunOptions::new());

        let constraints = &runner.engine().constraints;
        // at_most_one: 4 unit terms <= 1
        let (at_most, _) = &constraints[0];
        assert_eq!(at_most.sense(), ComparisonSense::LessEqual);
        assert_eq!(at_most.rhs(), 1.0);
        let terms = at_most.expr().normalized_terms();
        assert_eq!(terms.len(), 4);
        assert!(terms.iter().all(|(_, c)| *c == 1.0));

        // exactly_one: 4 unit terms == 1
        let (exactly, _) = &constraints[1];
        assert_eq!(exactly.sense(), ComparisonSense::Equal);
        assert_eq!(exactly.rhs(), 1.0);
        assert_eq!(exactly.expr().normalized_terms().len(), 4);
    }

    #[test]
    fn envelope_helper_submits_one_row_per_member() {
        let mut runner = Runner::new(HelperModel, StubEngine::optimal(0.0));
        runner.solve(&RunOptions::new());

        // 2 cardinality + 4 max_of rows + 1 big-M row.
        assert_eq!(runner.engine().constraints.len(), 7);
        let (max_row, _) = &runner.engine().constraints[2];
        assert_eq!(max_row.sense(), ComparisonSense::GreaterEqual);
    }

    #[test]
    fn big_m_folds_the_indicator_into_the_row() {
        let mut runner = Runner::new(HelperModel, StubEngine::optimal(0.0));
        runner.solve(&RunOptions::new());

        // pick0 <= pick1 + 50*(1 - pick2): pick0 - pick1 + 50*pick2 <= 50.
        let (big_m, _) = &runner.engine().constraints[6];
        assert_eq!(big_m.sense(), ComparisonSense::LessEqual);
        assert_eq!(big_m.rhs(), 50.0);
        let terms = big_m.expr().normalized_terms();
        assert!(terms.iter().any(|(_, c)| *c == 50.0));
    }

    #[test]
    fn implies_routes_to_the_indicator_path() {
        let mut runner = Runner::new(HelperModel, StubEngine::optimal(0.0));
        runner.solve(&RunOptions::new());

        assert_eq!(runner.engine().indicators.len(), 1);
        let (indicator, active, inner, _) = &runner.engine().indicators[0];
        assert_eq!(indicator.inner(), 3);
        assert!(*active);
        assert_eq!(inner.sense(), ComparisonSense::LessEqual);
    }
}
