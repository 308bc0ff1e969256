//! Tessellation and edge-sampled measurement of truck solids.

use crate::types::{KernelError, RenderMesh};
use duotype_types::Aabb;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;
use truck_meshalgo::tessellation::MeshedShape;

type TruckSolid = truck_modeling::Solid;

/// Chord tolerance for edge sampling in bounding queries.
const BBOX_SAMPLE_TOL: f64 = 1e-3;

/// Tessellate a list of disjoint parts into one merged RenderMesh.
pub fn tessellate_parts(
    parts: &[TruckSolid],
    tolerance: f64,
) -> std::result::Result<RenderMesh, KernelError> {
    if !(tolerance > 0.0) || !tolerance.is_finite() {
        return Err(KernelError::TessellationFailed {
            reason: format!("tolerance {tolerance} is not positive"),
        });
    }

    let mut out = RenderMesh::empty();
    for part in parts {
        let meshed = part.triangulation(tolerance);
        let mesh = meshed.to_polygon();

        let positions = mesh.positions();
        let normals = mesh.normals();
        let tri_faces = mesh.tri_faces();

        let mut piece = RenderMesh::empty();
        for pos in positions {
            piece.vertices.push(pos[0] as f32);
            piece.vertices.push(pos[1] as f32);
            piece.vertices.push(pos[2] as f32);
        }
        // The polygon mesh indexes normals separately from positions; fold
        // them onto position slots so the arrays stay parallel.
        piece.normals = vec![0.0; piece.vertices.len()];
        for tri in tri_faces {
            for v in tri.iter() {
                piece.indices.push(v.pos as u32);
                if let Some(ni) = v.nor {
                    let n = normals[ni];
                    let base = v.pos * 3;
                    piece.normals[base] = n[0] as f32;
                    piece.normals[base + 1] = n[1] as f32;
                    piece.normals[base + 2] = n[2] as f32;
                }
            }
        }
        out.append(&piece);
    }

    if out.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "triangulation produced no triangles".to_string(),
        });
    }
    Ok(out)
}

/// Axis-aligned bounds of a solid from sampled edge geometry.
///
/// The extremes of sweep-built solids lie on edges: planar faces are bounded
/// by their edges and cylindrical side faces by their boundary circles. Edge
/// curves are sampled at a fixed chord tolerance, which is what layout
/// decisions can rely on.
pub fn solid_aabb(solid: &TruckSolid) -> Aabb {
    use truck_modeling::{BoundedCurve, ParameterDivision1D};

    let mut bbox: Option<Aabb> = None;
    for shell in solid.boundaries().iter() {
        for edge in shell.edge_iter() {
            let curve = edge.oriented_curve();
            let range = curve.range_tuple();
            let (_params, points) = curve.parameter_division(range, BBOX_SAMPLE_TOL);
            for pt in &points {
                let p = Aabb::point([pt[0], pt[1], pt[2]]);
                bbox = Some(match bbox {
                    Some(b) => b.union(&p),
                    None => p,
                });
            }
        }
    }
    bbox.unwrap_or_else(|| Aabb::point([0.0; 3]))
}
