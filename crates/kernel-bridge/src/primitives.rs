//! Profile and primitive builders on top of truck's sweep API.
//!
//! truck has no built-in primitives; everything is vertices, sweeps and
//! attached planes.

use std::f64::consts::PI;

use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Solid, Wire};
use truck_modeling::{EuclideanSpace, Point3, Rad, Vector3};

use crate::profile::{dist2, Contour, PathSeg, PlaneBasis, Profile};
use crate::types::KernelError;

/// Create a cylinder solid: circle wire, attached face, translational sweep.
/// Base centered at the origin of the XY plane, extending along +Z.
pub fn make_cylinder(radius: f64, height: f64) -> Result<Solid, KernelError> {
    if !(radius > 0.0) || !(height > 0.0) || !radius.is_finite() || !height.is_finite() {
        return Err(KernelError::Degenerate {
            reason: format!("cylinder with radius {radius} and height {height}"),
        });
    }
    let v = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let wire = builder::rsweep(&v, Point3::origin(), Vector3::unit_z(), Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::Degenerate {
        reason: format!("circular face: {e}"),
    })?;
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, height)))
}

/// Planar faces for every region of the profile, holes included.
pub fn profile_faces(profile: &Profile, plane: &PlaneBasis) -> Result<Vec<Face>, KernelError> {
    let groups = profile.face_groups();
    if groups.is_empty() {
        return Err(KernelError::ProfileRejected {
            reason: "profile has no closed regions".to_string(),
        });
    }
    let mut faces = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut wires = Vec::with_capacity(1 + group.holes.len());
        wires.push(contour_wire(&group.outer, plane)?);
        for hole in &group.holes {
            wires.push(contour_wire(hole, plane)?);
        }
        let face =
            builder::try_attach_plane(&wires).map_err(|e| KernelError::ProfileRejected {
                reason: format!("failed to attach plane: {e}"),
            })?;
        faces.push(face);
    }
    Ok(faces)
}

/// Build a closed truck wire for one contour mapped through `plane`.
///
/// All vertices are created first so consecutive edges share endpoints,
/// which truck requires for a closed wire.
fn contour_wire(contour: &Contour, plane: &PlaneBasis) -> Result<Wire, KernelError> {
    let to_3d = |p: [f64; 2]| {
        let q = plane.point_at(p[0], p[1]);
        Point3::new(q[0], q[1], q[2])
    };

    let mut pts = contour.endpoints();
    let closes_explicitly = pts.len() > 1 && dist2(*pts.last().unwrap(), pts[0]) < 1e-18;
    if closes_explicitly {
        pts.pop();
    }
    let n = pts.len();
    if n < 2 || (n == 2 && closes_explicitly) {
        return Err(KernelError::ProfileRejected {
            reason: "contour with fewer than 3 distinct points".to_string(),
        });
    }

    let vertices: Vec<_> = pts.iter().map(|&p| builder::vertex(to_3d(p))).collect();
    let mut edges: Vec<Edge> = Vec::with_capacity(n);
    for (i, seg) in contour.segs.iter().enumerate() {
        let j = (i + 1) % n;
        let edge = match *seg {
            PathSeg::Line { .. } => builder::line(&vertices[i], &vertices[j]),
            PathSeg::Arc { via, .. } => {
                builder::circle_arc(&vertices[i], &vertices[j], to_3d(via))
            }
        };
        edges.push(edge);
    }
    if !closes_explicitly {
        edges.push(builder::line(&vertices[n - 1], &vertices[0]));
    }
    Ok(Wire::from_iter(edges))
}
