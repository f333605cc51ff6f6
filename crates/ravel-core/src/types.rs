//! Core value types for model building.

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Bounds for a decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Continuous,
    Integer,
    Binary,
}

impl VarType {
    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Continuous => "continuous",
            VarType::Integer => "integer",
            VarType::Binary => "binary",
        }
    }
}

/// Everything the engine needs to create one decision variable, shared by
/// every cell of a variable family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarSpec {
    pub bounds: Bounds,
    pub var_type: VarType,
}

impl VarSpec {
    /// A binary variable with bounds [0, 1].
    pub fn binary() -> Self {
        Self {
            bounds: Bounds::new(0.0, 1.0),
            var_type: VarType::Binary,
        }
    }

    /// A continuous variable with the given bounds.
    pub fn continuous(lower: f64, upper: f64) -> Self {
        Self {
            bounds: Bounds::new(lower, upper),
            var_type: VarType::Continuous,
        }
    }

    /// An integer variable with the given bounds.
    pub fn integer(lower: f64, upper: f64) -> Self {
        Self {
            bounds: Bounds::new(lower, upper),
            var_type: VarType::Integer,
        }
    }
}
