//! Deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Every part is modeled by its axis-aligned envelope. Transforms map the
//! envelope corners, booleans work on envelopes, and tessellation emits one
//! box mesh per part. That keeps results analytic and exactly reproducible,
//! which is what pipeline tests need; fidelity to curved geometry is the
//! real kernel's job.

use crate::profile::{PlaneBasis, Profile};
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use duotype_types::Aabb;
use std::collections::HashMap;

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_handle: u64,
    solids: HashMap<u64, Vec<Aabb>>,
}

impl MockKernel {
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

    fn store(&mut self, parts: Vec<Aabb>) -> SolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), parts);
        handle
    }

    fn parts(&self, handle: &SolidHandle) -> Result<&[Aabb], KernelError> {
        self.solids
            .get(&handle.id())
            .map(Vec::as_slice)
            .ok_or(KernelError::UnknownHandle {
                handle: handle.id(),
            })
    }

}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for MockKernel {
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
        let len =
            (direction[0] * direction[0] + direction[1] * direction[1] + direction[2] * direction[2])
                .sqrt();
        if len < 1e-12 {
            return Err(KernelError::Degenerate {
                reason: "extrude direction has zero length".to_string(),
            });
        }
        let sweep = [
            direction[0] / len * depth,
            direction[1] / len * depth,
            direction[2] / len * depth,
        ];

        let groups = profile.face_groups();
        if groups.is_empty() {
            return Err(KernelError::ProfileRejected {
                reason: "profile has no closed regions".to_string(),
            });
        }
        let parts: Vec<Aabb> = groups
            .iter()
            .map(|g| {
                let (min, max) = g.outer.bounds();
                let corners = [
                    [min[0], min[1]],
                    [max[0], min[1]],
                    [max[0], max[1]],
                    [min[0], max[1]],
                ];
                let mut pts = Vec::with_capacity(8);
                for c in corners {
                    let p = plane.point_at(c[0], c[1]);
                    pts.push(p);
                    pts.push([p[0] + sweep[0], p[1] + sweep[1], p[2] + sweep[2]]);
                }
                Aabb::from_points(pts).expect("four corners always yield an envelope")
            })
            .collect();
        Ok(self.store(parts))
    }

    fn cylinder(&mut self, radius: f64, height: f64) -> Result<SolidHandle, KernelError> {
        if !(radius > 0.0) || !(height > 0.0) || !radius.is_finite() || !height.is_finite() {
            return Err(KernelError::Degenerate {
                reason: format!("cylinder with radius {radius} and height {height}"),
            });
        }
        Ok(self.store(vec![Aabb::new(
            [-radius, -radius, 0.0],
            [radius, radius, height],
        )]))
    }

    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError> {
        let parts_a = self.parts(a)?.to_vec();
        let parts_b = self.parts(b)?.to_vec();
        let mut out = Vec::new();
        for pa in &parts_a {
            for pb in &parts_b {
                if let Some(piece) = pa.intersection(pb) {
                    out.push(piece);
                }
            }
        }
        if out.is_empty() {
            return Err(KernelError::BooleanFailed {
                reason: "intersection is empty".to_string(),
            });
        }
        Ok(self.store(out))
    }

    fn translated(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError> {
        let parts: Vec<Aabb> = self
            .parts(solid)?
            .iter()
            .map(|p| p.translated(offset))
            .collect();
        Ok(self.store(parts))
    }

    fn rotated_z(
        &mut self,
        solid: &SolidHandle,
        angle_rad: f64,
    ) -> Result<SolidHandle, KernelError> {
        let (s, c) = angle_rad.sin_cos();
        let parts: Vec<Aabb> = self
            .parts(solid)?
            .iter()
            .map(|p| {
                let rotated = p
                    .corners()
                    .map(|q| [c * q[0] - s * q[1], s * q[0] + c * q[1], q[2]]);
                Aabb::from_points(rotated).expect("eight corners always yield an envelope")
            })
            .collect();
        Ok(self.store(parts))
    }

    fn compound(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError> {
        let mut all = Vec::new();
        for handle in parts {
            all.extend_from_slice(self.parts(handle)?);
        }
        if all.is_empty() {
            return Err(KernelError::Degenerate {
                reason: "compound of zero parts".to_string(),
            });
        }
        Ok(self.store(all))
    }

    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError> {
        if !(tolerance > 0.0) || !tolerance.is_finite() {
            return Err(KernelError::TessellationFailed {
                reason: format!("tolerance {tolerance} is not positive"),
            });
        }
        let mut mesh = RenderMesh::empty();
        for part in self.parts(solid)? {
            mesh.append(&box_mesh(part));
        }
        if mesh.indices.is_empty() {
            return Err(KernelError::TessellationFailed {
                reason: "solid has no parts".to_string(),
            });
        }
        Ok(mesh)
    }

    fn export_step(&self, solid: &SolidHandle) -> Result<String, KernelError> {
        self.parts(solid)?;
        Err(KernelError::NotSupported {
            operation: "export_step on the mock kernel".to_string(),
        })
    }
}

impl KernelIntrospect for MockKernel {
    fn bounding_box(&self, solid: &SolidHandle) -> Result<Aabb, KernelError> {
        let parts = self.parts(solid)?;
        let mut bbox: Option<Aabb> = None;
        for p in parts {
            bbox = Some(match bbox {
                Some(acc) => acc.union(p),
                None => *p,
            });
        }
        bbox.ok_or(KernelError::Degenerate {
            reason: "solid has no parts".to_string(),
        })
    }

    fn part_count(&self, solid: &SolidHandle) -> Result<usize, KernelError> {
        Ok(self.parts(solid)?.len())
    }
}

/// Triangle mesh of one axis-aligned box: 6 faces, 4 vertices each, with
/// outward face normals.
fn box_mesh(b: &Aabb) -> RenderMesh {
    let [x0, y0, z0] = b.min;
    let [x1, y1, z1] = b.max;
    // (corners counter-clockwise seen from outside, normal)
    let faces: [([[f64; 3]; 4], [f64; 3]); 6] = [
        (
            [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
            [-1.0, 0.0, 0.0],
        ),
        (
            [[x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]],
            [1.0, 0.0, 0.0],
        ),
        (
            [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
            [0.0, -1.0, 0.0],
        ),
        (
            [[x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]],
            [0.0, 1.0, 0.0],
        ),
        (
            [[x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]],
            [0.0, 0.0, -1.0],
        ),
        (
            [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
            [0.0, 0.0, 1.0],
        ),
    ];

    let mut mesh = RenderMesh::empty();
    for (corners, normal) in faces {
        let base = mesh.vertex_count() as u32;
        for c in corners {
            mesh.vertices.extend(c.map(|v| v as f32));
            mesh.normals.extend(normal.map(|v| v as f32));
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn extrude_upright_square_spans_depth_along_y() {
        let mut kernel = MockKernel::new();
        let handle = kernel
            .extrude_profile(
                &square_profile(2.0),
                &PlaneBasis::upright(),
                [0.0, -1.0, 0.0],
                5.0,
            )
            .unwrap();
        let bbox = kernel.bounding_box(&handle).unwrap();
        assert_eq!(bbox.min, [0.0, -5.0, 0.0]);
        assert_eq!(bbox.max, [2.0, 0.0, 2.0]);
    }

    #[test]
    fn rotation_grows_the_envelope() {
        let mut kernel = MockKernel::new();
        let handle = kernel
            .extrude_profile(
                &square_profile(2.0),
                &PlaneBasis::ground(),
                [0.0, 0.0, 1.0],
                1.0,
            )
            .unwrap();
        let centered = kernel.translated(&handle, [-1.0, -1.0, 0.0]).unwrap();
        let rotated = kernel.rotated_z(&centered, 45f64.to_radians()).unwrap();
        let bbox = kernel.bounding_box(&rotated).unwrap();
        let half_diag = 2.0f64.sqrt();
        assert!((bbox.min[0] + half_diag).abs() < 1e-12);
        assert!((bbox.max[0] - half_diag).abs() < 1e-12);
    }

    #[test]
    fn intersect_is_pairwise_and_fails_empty() {
        let mut kernel = MockKernel::new();
        let a = kernel.cylinder(1.0, 1.0).unwrap();
        let b = kernel.cylinder(1.0, 1.0).unwrap();
        let b_far = kernel.translated(&b, [10.0, 0.0, 0.0]).unwrap();

        let err = kernel.boolean_intersect(&a, &b_far).unwrap_err();
        assert!(err.is_geometric());

        let b_near = kernel.translated(&b, [1.0, 0.0, 0.0]).unwrap();
        let hit = kernel.boolean_intersect(&a, &b_near).unwrap();
        let bbox = kernel.bounding_box(&hit).unwrap();
        assert_eq!(bbox.min[0], 0.0);
        assert_eq!(bbox.max[0], 1.0);
    }

    #[test]
    fn tessellated_box_has_twelve_triangles_per_part() {
        let mut kernel = MockKernel::new();
        let a = kernel.cylinder(1.0, 2.0).unwrap();
        let b = kernel.cylinder(1.0, 2.0).unwrap();
        let both = kernel.compound(&[a, b]).unwrap();
        let mesh = kernel.tessellate(&both, 0.1).unwrap();
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(mesh.vertex_count(), 48);
        let max_index = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max_index < mesh.vertex_count());
    }

    #[test]
    fn export_step_is_not_supported() {
        let mut kernel = MockKernel::new();
        let a = kernel.cylinder(1.0, 1.0).unwrap();
        let err = kernel.export_step(&a).unwrap_err();
        assert!(matches!(err, KernelError::NotSupported { .. }));
        assert!(!err.is_geometric());
    }

    #[test]
    fn multi_region_profile_extrudes_to_parts() {
        let profile = Profile::from_polylines(vec![
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            vec![[0.0, 2.0], [1.0, 2.0], [1.0, 3.0], [0.0, 3.0]],
        ])
        .unwrap();
        let mut kernel = MockKernel::new();
        let handle = kernel
            .extrude_profile(&profile, &PlaneBasis::upright(), [0.0, -1.0, 0.0], 1.0)
            .unwrap();
        assert_eq!(kernel.part_count(&handle).unwrap(), 2);
    }
}
