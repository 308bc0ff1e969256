//! KernelIntrospect implementation for TruckKernel.

use crate::tessellation::solid_aabb;
use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::{KernelError, SolidHandle};
use duotype_types::Aabb;

impl KernelIntrospect for TruckKernel {
    fn bounding_box(&self, solid: &SolidHandle) -> Result<Aabb, KernelError> {
        let parts = self.get_parts(solid)?;
        let mut bbox: Option<Aabb> = None;
        for part in parts {
            let b = solid_aabb(part);
            bbox = Some(match bbox {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
        bbox.ok_or(KernelError::Degenerate {
            reason: "solid has no parts".to_string(),
        })
    }

    fn part_count(&self, solid: &SolidHandle) -> Result<usize, KernelError> {
        Ok(self.get_parts(solid)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Kernel;

    #[test]
    fn compound_bounding_box_spans_all_parts() {
        let mut kernel = TruckKernel::new();
        let a = kernel.cylinder(1.0, 1.0).unwrap();
        let b = kernel.cylinder(1.0, 1.0).unwrap();
        let b = kernel.translated(&b, [10.0, 0.0, 5.0]).unwrap();
        let both = kernel.compound(&[a, b]).unwrap();

        let bbox = kernel.bounding_box(&both).unwrap();
        let eps = 2e-3;
        assert!((bbox.min[0] + 1.0).abs() < eps);
        assert!((bbox.max[0] - 11.0).abs() < eps);
        assert!(bbox.min[2].abs() < 1e-9);
        assert!((bbox.max[2] - 6.0).abs() < 1e-9);
    }

    #[test]
    fn bounding_box_of_unknown_handle_fails() {
        let kernel = TruckKernel::new();
        let err = kernel.bounding_box(&SolidHandle(42)).unwrap_err();
        assert!(matches!(err, KernelError::UnknownHandle { handle: 42 }));
    }
}
