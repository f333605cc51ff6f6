//! N-dimensional variable storage.
//!
//! A [`VarArray`] is a flat arena of variable handles plus per-dimension
//! extents and precomputed row-major strides. Rank is fixed at
//! construction and every access is bounds-checked against it.

use crate::engine::Engine;
use crate::error::IndexError;
use crate::naming::{Naming, name_nd};
use crate::types::VarSpec;
use ravel_expr::VariableId;
use ravel_solver::EngineError;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VarArray {
    extents: Vec<usize>,
    strides: Vec<usize>,
    handles: Vec<VariableId>,
}

fn strides_for(extents: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; extents.len()];
    for axis in (0..extents.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * extents[axis + 1];
    }
    strides
}

fn decode_flat(mut flat: usize, strides: &[usize], out: &mut [usize]) {
    for (slot, stride) in out.iter_mut().zip(strides) {
        *slot = flat / stride;
        flat %= stride;
    }
}

impl VarArray {
    /// Create one engine variable per cell. A zero-rank `dims` yields a
    /// single scalar handle. With naming enabled, each cell is named
    /// `base[i1,i2,...]` (bare `base` for a scalar); with naming disabled
    /// no names are decoded or formatted at all.
    pub fn attached(
        engine: &mut dyn Engine,
        spec: VarSpec,
        base: &str,
        dims: &[usize],
        naming: Naming,
    ) -> Result<Self, EngineError> {
        let extents = dims.to_vec();
        let strides = strides_for(&extents);
        let total: usize = extents.iter().product();

        let mut handles = Vec::with_capacity(total);
        let mut index_buf = vec![0usize; extents.len()];
        for flat in 0..total {
            let handle = if naming.is_enabled() {
                decode_flat(flat, &strides, &mut index_buf);
                engine.add_variable(spec, Some(&name_nd(base, &index_buf)))?
            } else {
                engine.add_variable(spec, None)?
            };
            handles.push(handle);
        }

        debug!(
            component = "array",
            operation = "attach",
            status = "success",
            base,
            rank = extents.len(),
            cells = handles.len(),
            var_type = spec.var_type.as_str(),
            named = naming.is_enabled(),
            "Created variable family"
        );

        Ok(Self {
            extents,
            strides,
            handles,
        })
    }

    /// Build the same shape without engine registration, filled with
    /// sequential placeholder handles. For staging and testing only; the
    /// handles do not belong to any engine.
    pub fn detached(dims: &[usize]) -> Self {
        let extents = dims.to_vec();
        let strides = strides_for(&extents);
        let total: usize = extents.iter().product();
        Self {
            extents,
            strides,
            handles: (0..total).map(|i| VariableId::new(i as u32)).collect(),
        }
    }

    /// Number of index dimensions.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Extent of one dimension.
    pub fn extent(&self, axis: usize) -> Option<usize> {
        self.extents.get(axis).copied()
    }

    /// All extents.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Handle at the given index tuple. The tuple length must equal the
    /// rank and every component must be within its extent.
    pub fn at(&self, indices: &[usize]) -> Result<VariableId, IndexError> {
        if indices.len() != self.extents.len() {
            return Err(IndexError::RankMismatch {
                expected: self.extents.len(),
                got: indices.len(),
            });
        }

        let mut offset = 0usize;
        for (axis, (&index, &extent)) in indices.iter().zip(&self.extents).enumerate() {
            if index >= extent {
                return Err(IndexError::AxisOutOfBounds {
                    axis,
                    index,
                    extent,
                });
            }
            offset += index * self.strides[axis];
        }
        Ok(self.handles[offset])
    }

    /// The single handle of a zero-rank array.
    pub fn scalar(&self) -> Result<VariableId, IndexError> {
        self.at(&[])
    }

    /// Handles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.handles.iter().copied()
    }
}
