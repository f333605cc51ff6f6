//! Enum-keyed registry of variable families.
//!
//! One slot per declared key, fixed at construction; a slot stays empty
//! until explicitly set, and reading an empty slot is a usage error.

use crate::array::VarArray;
use crate::error::BuildError;
use ravel_expr::VariableId;
use std::marker::PhantomData;

/// A closed set of symbolic keys, one per logical variable family.
/// Implemented by the [`variable_families!`] macro.
pub trait FamilyKey: Copy {
    /// Number of declared keys.
    const COUNT: usize;

    /// Slot position of this key, in 0..COUNT.
    fn index(self) -> usize;

    /// Key name for diagnostics.
    fn label(self) -> &'static str;
}

/// Declare a variable-family key enum and its [`FamilyKey`] impl.
///
/// ```
/// ravel_core::variable_families! {
///     pub enum FacilityVar { Open, Assign }
/// }
/// ```
#[macro_export]
macro_rules! variable_families {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($key:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($key),+
        }

        impl $crate::table::FamilyKey for $name {
            const COUNT: usize = [$($name::$key),+].len();

            fn index(self) -> usize {
                self as usize
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$key => stringify!($key)),+
                }
            }
        }
    };
}

/// Fixed-size table mapping family keys to variable arrays.
#[derive(Debug)]
pub struct FamilyTable<K: FamilyKey> {
    slots: Vec<Option<VarArray>>,
    _keys: PhantomData<K>,
}

impl<K: FamilyKey> FamilyTable<K> {
    /// A table with every slot empty. Length is `K::COUNT`; it never
    /// grows.
    pub fn new() -> Self {
        Self {
            slots: (0..K::COUNT).map(|_| None).collect(),
            _keys: PhantomData,
        }
    }

    /// Store a family under its key. Re-setting overwrites.
    pub fn set(&mut self, key: K, array: VarArray) {
        self.slots[key.index()] = Some(array);
    }

    /// The family stored under a key; fails if the key was never set.
    pub fn get(&self, key: K) -> Result<&VarArray, BuildError> {
        self.slots[key.index()]
            .as_ref()
            .ok_or(BuildError::FamilyNotInitialized {
                family: key.label(),
            })
    }

    /// Check whether a key has been set.
    pub fn is_set(&self, key: K) -> bool {
        self.slots[key.index()].is_some()
    }

    /// Handle of one variable: forwards to the stored family's `at`.
    pub fn var(&self, key: K, indices: &[usize]) -> Result<VariableId, BuildError> {
        Ok(self.get(key)?.at(indices)?)
    }

    /// Handle of a zero-rank family's single variable.
    pub fn scalar(&self, key: K) -> Result<VariableId, BuildError> {
        self.var(key, &[])
    }
}

impl<K: FamilyKey> Default for FamilyTable<K> {
    fn default() -> Self {
        Self::new()
    }
}
