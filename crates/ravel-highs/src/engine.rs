//! HiGHS-backed engine.
//!
//! The engine buffers the model description (columns, rows, objective) and
//! builds a fresh `highs::RowProblem` at optimize time; HiGHS consumes the
//! problem, so post-solve attribute reads come from the captured outcome.

use ravel_core::engine::Engine;
use ravel_core::types::{Sense, VarSpec, VarType};
use ravel_expr::{ComparisonSense, ConstraintExpr, ConstraintId, Expr, VariableId};
use ravel_solver::{EngineError, RunOptions, SolveStatus};

use highs::{HighsModelStatus, RowProblem, Sense as HighsSense};
use std::collections::BTreeMap;
use std::ffi::CString;
use tracing::{debug, trace, warn};

struct ColumnSpec {
    spec: VarSpec,
    name: Option<String>,
}

struct RowSpec {
    lower: f64,
    upper: f64,
    terms: Vec<(usize, f64)>,
    name: Option<String>,
}

struct SolveOutcome {
    status: SolveStatus,
    objective: f64,
    primal: Vec<f64>,
    gap: Option<f64>,
    node_count: Option<u64>,
    model: highs::SolvedModel,
}

/// Bridge from the model-building session to HiGHS.
#[derive(Default)]
pub struct HighsEngine {
    columns: Vec<ColumnSpec>,
    rows: Vec<RowSpec>,
    objective_terms: Vec<(usize, f64)>,
    objective_offset: f64,
    objective_sense: Option<Sense>,
    options: RunOptions,
    outcome: Option<SolveOutcome>,
}

impl HighsEngine {
    pub fn new() -> Self {
        debug!(
            component = "engine",
            operation = "init",
            status = "success",
            backend = "highs",
            version = highs_version().as_deref().unwrap_or("unknown"),
            "Created HiGHS engine"
        );
        Self::default()
    }

    fn lower_terms(&self, expr: &Expr) -> Result<Vec<(usize, f64)>, EngineError> {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for (var_id, coeff) in expr.terms() {
            let col = var_id.inner() as usize;
            if col >= self.columns.len() {
                return Err(EngineError::Rejected {
                    message: format!("unknown variable {}", var_id),
                });
            }
            if !coeff.is_finite() {
                return Err(EngineError::Rejected {
                    message: format!("non-finite coefficient for {}", var_id),
                });
            }
            *merged.entry(col).or_insert(0.0) += *coeff;
        }
        Ok(merged.into_iter().filter(|(_, c)| *c != 0.0).collect())
    }

    fn outcome(&self, operation: &'static str) -> Result<&SolveOutcome, EngineError> {
        self.outcome
            .as_ref()
            .ok_or(EngineError::SolveRequired { operation })
    }

    /// Debug name of a buffered column, when one was generated.
    pub fn variable_name(&self, var: VariableId) -> Option<&str> {
        self.columns
            .get(var.inner() as usize)
            .and_then(|column| column.name.as_deref())
    }

    /// Debug name of a buffered row, when one was generated.
    pub fn constraint_name(&self, constraint: ConstraintId) -> Option<&str> {
        self.rows
            .get(constraint.inner() as usize)
            .and_then(|row| row.name.as_deref())
    }
}

impl Engine for HighsEngine {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn add_variable(
        &mut self,
        spec: VarSpec,
        name: Option<&str>,
    ) -> Result<VariableId, EngineError> {
        if spec.bounds.lower.is_nan()
            || spec.bounds.upper.is_nan()
            || spec.bounds.lower > spec.bounds.upper
        {
            return Err(EngineError::Rejected {
                message: format!(
                    "variable bounds invalid: lower ({}) > upper ({})",
                    spec.bounds.lower, spec.bounds.upper
                ),
            });
        }

        let id = VariableId::new(self.columns.len() as u32);
        self.columns.push(ColumnSpec {
            spec,
            name: name.map(str::to_string),
        });
        trace!(
            component = "engine",
            operation = "add_variable",
            status = "success",
            var_id = %id,
            lower = spec.bounds.lower,
            upper = spec.bounds.upper,
            var_type = spec.var_type.as_str(),
            "Buffered column"
        );
        Ok(id)
    }

    fn add_constraint(
        &mut self,
        constraint: ConstraintExpr,
        name: Option<&str>,
    ) -> Result<ConstraintId, EngineError> {
        let (expr, sense, rhs) = constraint.into_parts();
        // Fold any residual constant into the right-hand side.
        let rhs = rhs - expr.constant();
        if !rhs.is_finite() {
            return Err(EngineError::Rejected {
                message: format!("non-finite right-hand side {}", rhs),
            });
        }
        let terms = self.lower_terms(&expr)?;

        let (lower, upper) = match sense {
            ComparisonSense::LessEqual => (f64::NEG_INFINITY, rhs),
            ComparisonSense::GreaterEqual => (rhs, f64::INFINITY),
            ComparisonSense::Equal => (rhs, rhs),
        };

        let id = ConstraintId::new(self.rows.len() as u32);
        self.rows.push(RowSpec {
            lower,
            upper,
            terms,
            name: name.map(str::to_string),
        });
        trace!(
            component = "engine",
            operation = "add_constraint",
            status = "success",
            constraint_id = %id,
            sense = sense.as_str(),
            rhs,
            "Buffered row"
        );
        Ok(id)
    }

    fn set_objective(&mut self, expr: Expr, sense: Sense) -> Result<(), EngineError> {
        let terms = self.lower_terms(&expr)?;
        self.objective_offset = expr.constant();
        self.objective_terms = terms;
        self.objective_sense = Some(sense);
        debug!(
            component = "engine",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = self.objective_terms.len(),
            "Buffered objective"
        );
        Ok(())
    }

    fn configure(&mut self, options: &RunOptions) -> Result<(), EngineError> {
        self.options = options.clone();
        Ok(())
    }

    fn optimize(&mut self) -> Result<SolveStatus, EngineError> {
        if self.columns.is_empty() {
            return Err(EngineError::Rejected {
                message: "model has no variables".to_string(),
            });
        }
        let Some(sense) = self.objective_sense else {
            return Err(EngineError::Rejected {
                message: "model has no objective".to_string(),
            });
        };

        let objective: BTreeMap<usize, f64> = self.objective_terms.iter().copied().collect();

        let mut problem = RowProblem::default();
        let mut cols = Vec::with_capacity(self.columns.len());
        for (index, column) in self.columns.iter().enumerate() {
            let obj_coeff = objective.get(&index).copied().unwrap_or(0.0);
            let bounds = column.spec.bounds.lower..=column.spec.bounds.upper;
            let col = match column.spec.var_type {
                VarType::Continuous => problem.add_column(obj_coeff, bounds),
                VarType::Integer | VarType::Binary => {
                    problem.add_integer_column(obj_coeff, bounds)
                }
            };
            cols.push(col);
        }

        for row in &self.rows {
            let factors: Vec<_> = row
                .terms
                .iter()
                .map(|&(col, coeff)| (cols[col], coeff))
                .collect();
            problem.add_row(row.lower..=row.upper, factors);
        }

        debug!(
            component = "engine",
            operation = "optimize",
            status = "success",
            num_cols = self.columns.len(),
            num_rows = self.rows.len(),
            sense = sense.as_str(),
            "Dispatching model to HiGHS"
        );

        let highs_sense = match sense {
            Sense::Minimize => HighsSense::Minimise,
            Sense::Maximize => HighsSense::Maximise,
        };
        let mut model = problem.optimise(highs_sense);

        if self.options.verbose {
            model.set_option("log_to_console", true);
            model.set_option("output_flag", true);
        } else {
            model.make_quiet();
        }
        if let Some(limit) = self.options.time_limit {
            model.set_option("time_limit", limit);
        }
        if let Some(gap) = self.options.mip_gap {
            model.set_option("mip_rel_gap", gap);
        }
        if let Some(threads) = self.options.threads {
            model.set_option("threads", threads as i32);
        }
        if let Some(limit) = self.options.solution_limit {
            model.set_option("mip_max_improving_sols", limit as i32);
        }
        if let Some(limit) = self.options.node_limit {
            model.set_option("mip_max_nodes", limit.min(i32::MAX as u64) as i32);
        }

        let solved = model.solve();
        let status = map_status(solved.status());

        let (objective_value, primal) = if status.has_solution() {
            let solution = solved.get_solution();
            (
                solved.objective_value() + self.objective_offset,
                solution.columns().to_vec(),
            )
        } else {
            (0.0, Vec::new())
        };

        let gap = match solved.mip_gap() {
            g if g.is_finite() => Some(g),
            _ => None,
        };
        let node_count = read_node_count(&solved);

        trace!(
            component = "engine",
            operation = "optimize",
            status = "success",
            solve_status = status.as_str(),
            objective = objective_value,
            "HiGHS returned"
        );

        self.outcome = Some(SolveOutcome {
            status,
            objective: objective_value,
            primal,
            gap,
            node_count,
            model: solved,
        });
        Ok(status)
    }

    fn objective_value(&self) -> Result<f64, EngineError> {
        let outcome = self.outcome("objective_value")?;
        if !outcome.status.has_solution() {
            return Err(EngineError::SolveRequired {
                operation: "objective_value",
            });
        }
        Ok(outcome.objective)
    }

    fn primal_value(&self, var: VariableId) -> Result<f64, EngineError> {
        let outcome = self.outcome("primal_value")?;
        outcome
            .primal
            .get(var.inner() as usize)
            .copied()
            .ok_or(EngineError::Rejected {
                message: format!("no solution value for {}", var),
            })
    }

    fn gap(&self) -> Option<f64> {
        self.outcome.as_ref().and_then(|outcome| outcome.gap)
    }

    fn node_count(&self) -> Option<u64> {
        self.outcome.as_ref().and_then(|outcome| outcome.node_count)
    }

    fn num_variables(&self) -> usize {
        self.columns.len()
    }

    fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    fn write_model(&mut self, path: &str) -> Result<(), EngineError> {
        let outcome = self.outcome("model export")?;
        let c_path = CString::new(path).map_err(|_| EngineError::Rejected {
            message: format!("invalid export path {:?}", path),
        })?;
        let status =
            unsafe { highs_sys::Highs_writeModel(outcome.model.as_ptr(), c_path.as_ptr()) };
        if status != highs_sys::STATUS_OK {
            return Err(EngineError::Backend {
                code: status.to_string(),
                message: format!("failed to write model to {}", path),
            });
        }
        Ok(())
    }

    fn reset(&mut self) {
        let had_model = !self.columns.is_empty();
        self.columns.clear();
        self.rows.clear();
        self.objective_terms.clear();
        self.objective_offset = 0.0;
        self.objective_sense = None;
        self.options = RunOptions::default();
        self.outcome = None;
        if had_model {
            debug!(
                component = "engine",
                operation = "reset",
                status = "success",
                "Cleared buffered model"
            );
        }
    }
}

impl std::fmt::Debug for HighsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighsEngine")
            .field("num_variables", &self.columns.len())
            .field("num_constraints", &self.rows.len())
            .field("objective_sense", &self.objective_sense)
            .field("solved", &self.outcome.is_some())
            .finish_non_exhaustive()
    }
}

fn map_status(status: HighsModelStatus) -> SolveStatus {
    match status {
        HighsModelStatus::Optimal => SolveStatus::Optimal,
        HighsModelStatus::Infeasible => SolveStatus::Infeasible,
        HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
            SolveStatus::Unbounded
        }
        HighsModelStatus::ReachedTimeLimit => SolveStatus::TimeLimit,
        HighsModelStatus::ReachedIterationLimit => SolveStatus::IterationLimit,
        _ => SolveStatus::Unknown,
    }
}

fn read_node_count(solved: &highs::SolvedModel) -> Option<u64> {
    let name = CString::new("mip_node_count").ok()?;
    let mut value: i64 = 0;
    let status =
        unsafe { highs_sys::Highs_getInt64InfoValue(solved.as_ptr(), name.as_ptr(), &mut value) };
    if status != highs_sys::STATUS_OK {
        warn!(
            component = "engine",
            operation = "solve_info",
            status = "warn",
            info = "mip_node_count",
            status_code = status,
            "Failed to read node count"
        );
        return None;
    }
    u64::try_from(value).ok()
}

/// HiGHS library version string, if available.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            std::ffi::CStr::from_ptr(ptr)
                .to_str()
                .ok()
                .map(str::to_string)
        }
    }
}
