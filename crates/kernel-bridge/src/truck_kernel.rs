//! Real geometry kernel wrapping truck's API.

use crate::primitives;
use crate::profile::{PlaneBasis, Profile};
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;

use tracing::debug;

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{InnerSpace, Point3, Rad, Vector3};

/// Real geometry kernel backed by the truck BREP library.
///
/// Every handle owns a list of disjoint parts; single solids are the
/// one-element case. Boolean intersection works pairwise across parts, so
/// multi-region glyphs (the dot of an `i`) intersect naturally.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, Vec<Solid>>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> SolidHandle {
        let h = SolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_parts(&mut self, parts: Vec<Solid>) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), parts);
        handle
    }

    pub(crate) fn get_parts(&self, handle: &SolidHandle) -> Result<&[Solid], KernelError> {
        self.solids
            .get(&handle.id())
            .map(Vec::as_slice)
            .ok_or(KernelError::UnknownHandle {
                handle: handle.id(),
            })
    }

}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        plane: &PlaneBasis,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<SolidHandle, KernelError> {
        if !(depth > 0.0) || !depth.is_finite() {
            return Err(KernelError::Degenerate {
                reason: format!("extrusion depth {depth}"),
            });
        }
        let dir = Vector3::new(direction[0], direction[1], direction[2]);
        let dir_len = dir.magnitude();
        if dir_len < 1e-12 {
            return Err(KernelError::Degenerate {
                reason: "extrude direction has zero length".to_string(),
            });
        }
        let sweep_vec = dir.normalize() * depth;

        let faces = primitives::profile_faces(profile, plane)?;
        let parts: Vec<Solid> = faces
            .iter()
            .map(|face| builder::tsweep(face, sweep_vec))
            .collect();
        debug!(parts = parts.len(), depth, "extruded profile");
        Ok(self.store_parts(parts))
    }

    fn cylinder(&mut self, radius: f64, height: f64) -> Result<SolidHandle, KernelError> {
        let solid = primitives::make_cylinder(radius, height)?;
        Ok(self.store_parts(vec![solid]))
    }

    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let parts_a = self.get_parts(a)?.to_vec();
        let parts_b = self.get_parts(b)?.to_vec();

        let boxes_a: Vec<_> = parts_a.iter().map(tessellation::solid_aabb).collect();
        let boxes_b: Vec<_> = parts_b.iter().map(tessellation::solid_aabb).collect();

        let mut out: Vec<Solid> = Vec::new();
        let mut candidates = 0usize;
        for (pa, ba) in parts_a.iter().zip(&boxes_a) {
            for (pb, bb) in parts_b.iter().zip(&boxes_b) {
                // Disjoint envelopes cannot intersect; skip the expensive op.
                if ba.intersection(bb).is_none() {
                    continue;
                }
                candidates += 1;
                if let Some(piece) = truck_shapeops::and(pa, pb, 0.05) {
                    out.push(piece);
                }
            }
        }
        debug!(
            candidates,
            pieces = out.len(),
            "pairwise intersection done"
        );
        if out.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: if candidates == 0 {
                    "operands have disjoint bounding boxes".to_string()
                } else {
                    "intersection is empty".to_string()
                },
            });
        }
        Ok(self.store_parts(out))
    }

    fn translated(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let v = Vector3::new(offset[0], offset[1], offset[2]);
        let parts: Vec<Solid> = self
            .get_parts(solid)?
            .iter()
            .map(|p| builder::translated(p, v))
            .collect();
        Ok(self.store_parts(parts))
    }

    fn rotated_z(
        &mut self,
        solid: &SolidHandle,
        angle_rad: f64,
    ) -> Result<SolidHandle, KernelError> {
        let parts: Vec<Solid> = self
            .get_parts(solid)?
            .iter()
            .map(|p| builder::rotated(p, Point3::new(0.0, 0.0, 0.0), Vector3::unit_z(), Rad(angle_rad)))
            .collect();
        Ok(self.store_parts(parts))
    }

    fn compound(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError> {
        let mut all: Vec<Solid> = Vec::new();
        for handle in parts {
            all.extend(self.get_parts(handle)?.iter().cloned());
        }
        if all.is_empty() {
            return Err(KernelError::Degenerate {
                reason: "compound of zero parts".to_string(),
            });
        }
        Ok(self.store_parts(all))
    }

    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        let parts = self.get_parts(solid)?;
        let mesh = tessellation::tessellate_parts(parts, tolerance)?;
        debug!(
            triangles = mesh.triangle_count(),
            vertices = mesh.vertex_count(),
            "tessellated solid"
        );
        Ok(mesh)
    }

    fn export_step(&self, solid: &SolidHandle) -> Result<String, KernelError> {
        use truck_stepio::out::{CompleteStepDisplay, StepHeaderDescriptor, StepModel};
        use truck_topology::Shell;

        let parts = self.get_parts(solid)?;
        let faces: Vec<_> = parts
            .iter()
            .flat_map(|p| p.boundaries())
            .flat_map(|shell| shell.face_iter().cloned().collect::<Vec<_>>())
            .collect();
        if faces.is_empty() {
            return Err(KernelError::Degenerate {
                reason: "no faces to export".to_string(),
            });
        }

        let shell: Shell<_, _, _> = faces.into();
        let compressed = shell.compress();
        let step_string = CompleteStepDisplay::new(
            StepModel::from(&compressed),
            StepHeaderDescriptor {
                organization_system: "duotype".to_owned(),
                ..Default::default()
            },
        )
        .to_string();
        Ok(step_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KernelIntrospect;

    fn square_profile(side: f64) -> Profile {
        Profile::from_polylines(vec![vec![
            [0.0, 0.0],
            [side, 0.0],
            [side, side],
            [0.0, side],
        ]])
        .unwrap()
    }

    #[test]
    fn test_extrude_square_topology() {
        let mut kernel = TruckKernel::new();
        let handle = kernel
            .extrude_profile(
                &square_profile(1.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                2.0,
            )
            .unwrap();

        let parts = kernel.get_parts(&handle).unwrap();
        assert_eq!(parts.len(), 1);
        let boundaries = parts[0].boundaries();
        assert_eq!(boundaries.len(), 1);
        let faces: Vec<_> = boundaries[0].face_iter().collect();
        assert_eq!(faces.len(), 6, "Extruded rectangle should have 6 faces");
    }

    #[test]
    fn test_extrude_disjoint_regions_yields_parts() {
        let profile = Profile::from_polylines(vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[3.0, 0.0], [4.0, 0.0], [4.0, 1.0], [3.0, 1.0]],
        ])
        .unwrap();
        let mut kernel = TruckKernel::new();
        let handle = kernel
            .extrude_profile(&profile, &PlaneBasis::ground(), [0.0, 0.0, 1.0], 1.0)
            .unwrap();
        assert_eq!(kernel.part_count(&handle).unwrap(), 2);
    }

    #[test]
    fn test_extrude_rejects_bad_depth() {
        let mut kernel = TruckKernel::new();
        let res = kernel.extrude_profile(
            &square_profile(1.0),
            &PlaneBasis::ground(),
            [0.0, 0.0, 1.0],
            0.0,
        );
        assert!(matches!(res, Err(KernelError::Degenerate { .. })));
    }

    #[test]
    fn test_intersect_disjoint_boxes_fails_fast() {
        let mut kernel = TruckKernel::new();
        let a = kernel
            .extrude_profile(
                &square_profile(1.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        let b = kernel
            .extrude_profile(
                &square_profile(1.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        let b = kernel.translated(&b, [5.0, 0.0, 0.0]).unwrap();

        let err = kernel.boolean_intersect(&a, &b).unwrap_err();
        assert!(matches!(err, KernelError::BooleanFailed { .. }));
        assert!(err.is_geometric());
    }

    #[test]
    fn test_intersect_overlapping_boxes() {
        let mut kernel = TruckKernel::new();
        let a = kernel
            .extrude_profile(
                &square_profile(2.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                2.0,
            )
            .unwrap();
        let b = kernel
            .extrude_profile(
                &square_profile(2.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                2.0,
            )
            .unwrap();
        let b = kernel.translated(&b, [1.0, 1.0, 1.0]).unwrap();

        let result = kernel.boolean_intersect(&a, &b).unwrap();
        let bbox = kernel.bounding_box(&result).unwrap();
        let eps = 1e-6;
        assert!((bbox.min[0] - 1.0).abs() < eps);
        assert!((bbox.max[0] - 2.0).abs() < eps);
        assert!((bbox.min[2] - 1.0).abs() < eps);
        assert!((bbox.max[2] - 2.0).abs() < eps);
    }

    #[test]
    fn test_unknown_handle_is_fatal_error() {
        let mut kernel = TruckKernel::new();
        let real = kernel.cylinder(1.0, 1.0).unwrap();
        let stale = SolidHandle(999);
        let err = kernel.boolean_intersect(&real, &stale).unwrap_err();
        assert!(matches!(err, KernelError::UnknownHandle { handle: 999 }));
        assert!(!err.is_geometric());
    }

    #[test]
    fn test_compound_and_tessellate() {
        let mut kernel = TruckKernel::new();
        let a = kernel
            .extrude_profile(
                &square_profile(1.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        let b = kernel.cylinder(0.5, 2.0).unwrap();
        let b = kernel.translated(&b, [4.0, 0.0, 0.0]).unwrap();
        let both = kernel.compound(&[a, b]).unwrap();
        assert_eq!(kernel.part_count(&both).unwrap(), 2);

        let mesh = kernel.tessellate(&both, 0.05).unwrap();
        assert!(mesh.triangle_count() >= 12 + 4);
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        let max_index = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max_index < mesh.vertex_count());
    }

    #[test]
    fn test_rotated_square_bounding_box_grows() {
        let mut kernel = TruckKernel::new();
        let handle = kernel
            .extrude_profile(
                &square_profile(2.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        // Center the square footprint on the origin, then rotate 45 degrees.
        let centered = kernel.translated(&handle, [-1.0, -1.0, 0.0]).unwrap();
        let rotated = kernel
            .rotated_z(&centered, 45f64.to_radians())
            .unwrap();
        let bbox = kernel.bounding_box(&rotated).unwrap();
        let half_diag = 2.0f64.sqrt();
        let eps = 1e-6;
        assert!((bbox.min[0] + half_diag).abs() < eps);
        assert!((bbox.max[0] - half_diag).abs() < eps);
        assert!((bbox.min[1] + half_diag).abs() < eps);
        assert!((bbox.max[1] - half_diag).abs() < eps);
    }

    #[test]
    fn test_export_step_contains_header_and_faces() {
        let mut kernel = TruckKernel::new();
        let handle = kernel
            .extrude_profile(
                &square_profile(1.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        let step = kernel.export_step(&handle).unwrap();
        assert!(step.contains("ISO-10303-21"));
        assert!(step.contains("ADVANCED_FACE"));
    }
}
