//! Work partitions: the global / local iteration space of one dispatch.
//!
//! A partition keeps both the logical extent (the problem size) and the
//! global extent actually enqueued. They differ only when a local extent
//! forces the global extent up to the next multiple; kernels dispatched
//! over a padded partition must bounds-check their work-item ids.

use serde::Serialize;

use crate::error::{ComputeError, PartitionError};

/// Round `extent` up to the nearest multiple of `local`.
///
/// `local` must be non-zero.
pub fn round_up(extent: usize, local: usize) -> usize {
    extent.div_ceil(local) * local
}

/// 1-D or 2-D iteration space for a kernel dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkPartition {
    logical: Vec<usize>,
    global: Vec<usize>,
    local: Option<Vec<usize>>,
}

impl WorkPartition {
    /// 1-D partition of `n` work-items, leaving the group size to the driver.
    pub fn linear(n: usize) -> Result<Self, PartitionError> {
        Self::from_parts(vec![n], vec![n], None)
    }

    /// 1-D partition with an explicit group size; the global extent is
    /// rounded up to a multiple of `local`.
    pub fn linear_grouped(n: usize, local: usize) -> Result<Self, PartitionError> {
        Self::grouped(&[n], &[local])
    }

    /// 2-D partition over `extent` with group shape `local`, rounding each
    /// global dimension up to a multiple of the matching local dimension.
    pub fn grid(extent: [usize; 2], local: [usize; 2]) -> Result<Self, PartitionError> {
        Self::grouped(&extent, &local)
    }

    /// Partition with a caller-supplied global extent and no padding.
    ///
    /// Rejects a global extent that is not a multiple of `local`.
    pub fn explicit(global: &[usize], local: Option<&[usize]>) -> Result<Self, PartitionError> {
        Self::from_parts(global.to_vec(), global.to_vec(), local.map(|l| l.to_vec()))
    }

    fn grouped(extent: &[usize], local: &[usize]) -> Result<Self, PartitionError> {
        if local.len() != extent.len() {
            return Err(PartitionError::DimensionMismatch {
                global: extent.len(),
                local: local.len(),
            });
        }
        if let Some(dim) = local.iter().position(|&l| l == 0) {
            return Err(PartitionError::ZeroLocal { dim });
        }
        let global = extent
            .iter()
            .zip(local)
            .map(|(&e, &l)| round_up(e, l))
            .collect();
        Self::from_parts(extent.to_vec(), global, Some(local.to_vec()))
    }

    fn from_parts(
        logical: Vec<usize>,
        global: Vec<usize>,
        local: Option<Vec<usize>>,
    ) -> Result<Self, PartitionError> {
        let partition = Self {
            logical,
            global,
            local,
        };
        partition.validate()?;
        Ok(partition)
    }

    /// Check the structural invariants: 1 or 2 dimensions, non-zero
    /// extents, and global a multiple of local in every dimension.
    pub fn validate(&self) -> Result<(), PartitionError> {
        let dims = self.global.len();
        if !(1..=2).contains(&dims) {
            return Err(PartitionError::Dimensions(dims));
        }
        if let Some(dim) = self.logical.iter().position(|&g| g == 0) {
            return Err(PartitionError::ZeroExtent { dim });
        }
        if let Some(local) = &self.local {
            if local.len() != dims {
                return Err(PartitionError::DimensionMismatch {
                    global: dims,
                    local: local.len(),
                });
            }
            for (dim, (&g, &l)) in self.global.iter().zip(local).enumerate() {
                if l == 0 {
                    return Err(PartitionError::ZeroLocal { dim });
                }
                if g % l != 0 {
                    return Err(PartitionError::NotMultiple {
                        dim,
                        global: g,
                        local: l,
                    });
                }
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the device's work-group size limit.
    pub fn validate_for_device(&self, max_work_group_size: usize) -> Result<(), PartitionError> {
        self.validate()?;
        let size = self.group_items();
        if size > max_work_group_size {
            return Err(PartitionError::GroupTooLarge {
                size,
                max: max_work_group_size,
            });
        }
        Ok(())
    }

    /// Precondition for a dispatch: the host buffer driving it must hold
    /// exactly as many elements as the logical iteration space.
    pub fn check_host_len(&self, host_len: usize) -> Result<(), ComputeError> {
        let partition = self.logical_items();
        if host_len != partition {
            return Err(ComputeError::ExtentMismatch {
                host: host_len,
                partition,
            });
        }
        Ok(())
    }

    pub fn dims(&self) -> usize {
        self.global.len()
    }

    pub fn global(&self) -> &[usize] {
        &self.global
    }

    pub fn local(&self) -> Option<&[usize]> {
        self.local.as_deref()
    }

    pub fn logical(&self) -> &[usize] {
        &self.logical
    }

    /// Work-items in the enqueued (possibly padded) space.
    pub fn global_items(&self) -> usize {
        self.global.iter().product()
    }

    /// Work-items that map onto real buffer elements.
    pub fn logical_items(&self) -> usize {
        self.logical.iter().product()
    }

    /// Items per work-group (1 when the driver picks the group size).
    pub fn group_items(&self) -> usize {
        self.local.as_ref().map_or(1, |l| l.iter().product())
    }

    pub fn is_padded(&self) -> bool {
        self.logical != self.global
    }

    /// `512 x 512` style rendering of the global extent.
    pub fn describe_global(&self) -> String {
        join_extent(&self.global)
    }

    /// Rendering of the local extent, or `auto` when none was given.
    pub fn describe_local(&self) -> String {
        self.local
            .as_deref()
            .map_or_else(|| "auto".to_string(), join_extent)
    }
}

fn join_extent(extent: &[usize]) -> String {
    extent
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" x ")
}
