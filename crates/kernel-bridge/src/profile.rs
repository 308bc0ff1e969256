//! Planar profiles: closed contour loops of line and arc segments.
//!
//! Profiles are the kernel's 2D input vocabulary. Glyph outlines arrive as
//! pure polylines; the base plate and the heart shell use true circular arcs
//! so the exported boundary representation keeps them exact.

use std::f64::consts::PI;

const EPS: f64 = 1e-9;
/// Segments per arc when a polygonal approximation is needed (area,
/// containment, bounding queries).
const ARC_SAMPLES: usize = 16;

/// One segment of a closed contour, starting at the previous endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSeg {
    /// Straight segment to `to`.
    Line { to: [f64; 2] },
    /// Circular arc through `via`, ending at `to`.
    Arc { via: [f64; 2], to: [f64; 2] },
}

impl PathSeg {
    pub fn end(&self) -> [f64; 2] {
        match self {
            PathSeg::Line { to } | PathSeg::Arc { to, .. } => *to,
        }
    }
}

/// A closed loop in the profile plane. The chain implicitly closes from the
/// last endpoint back to `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub start: [f64; 2],
    pub segs: Vec<PathSeg>,
}

impl Contour {
    /// Closed polyline through the given points. Consecutive duplicates are
    /// dropped; a trailing point equal to the first is treated as the close.
    pub fn polyline(points: &[[f64; 2]]) -> Self {
        let mut start = [0.0, 0.0];
        let mut segs = Vec::new();
        let mut prev: Option<[f64; 2]> = None;
        for &p in points {
            match prev {
                None => start = p,
                Some(q) if dist2(p, q) < EPS * EPS => continue,
                Some(_) => segs.push(PathSeg::Line { to: p }),
            }
            prev = Some(p);
        }
        // Drop an explicit closing point.
        if let Some(PathSeg::Line { to }) = segs.last() {
            if dist2(*to, start) < EPS * EPS {
                segs.pop();
            }
        }
        Contour { start, segs }
    }

    /// Endpoints of every segment, starting with `start`.
    pub fn endpoints(&self) -> Vec<[f64; 2]> {
        let mut pts = Vec::with_capacity(self.segs.len() + 1);
        pts.push(self.start);
        pts.extend(self.segs.iter().map(PathSeg::end));
        pts
    }

    /// Polygonal approximation of the loop. Arcs are sampled finely enough
    /// for area, winding and containment queries, with their axis-extreme
    /// points included so bounds are exact.
    pub fn sample(&self) -> Vec<[f64; 2]> {
        let mut pts = vec![self.start];
        let mut prev = self.start;
        for seg in &self.segs {
            match *seg {
                PathSeg::Line { to } => pts.push(to),
                PathSeg::Arc { via, to } => {
                    sample_arc(prev, via, to, &mut pts);
                }
            }
            prev = seg.end();
        }
        pts
    }

    /// Signed area of the loop: positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.sample())
    }

    /// The same loop traversed in the opposite direction.
    pub fn reversed(&self) -> Contour {
        let pts = self.endpoints();
        let n = pts.len();
        let start = pts[n - 1];
        let mut segs = Vec::with_capacity(self.segs.len());
        for (i, seg) in self.segs.iter().enumerate().rev() {
            let to = pts[i];
            segs.push(match *seg {
                PathSeg::Line { .. } => PathSeg::Line { to },
                PathSeg::Arc { via, .. } => PathSeg::Arc { via, to },
            });
        }
        Contour { start, segs }
    }

    /// Point-in-polygon test on the sampled loop (even-odd rule).
    pub fn contains(&self, p: [f64; 2]) -> bool {
        let pts = self.sample();
        let mut inside = false;
        let n = pts.len();
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            if (a[1] > p[1]) != (b[1] > p[1]) {
                let x = a[0] + (p[1] - a[1]) / (b[1] - a[1]) * (b[0] - a[0]);
                if x > p[0] {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let pts = self.sample();
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        for p in pts {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        (min, max)
    }
}

/// One extrudable region: an outer loop plus the holes directly inside it.
/// Windings are normalized: outer counter-clockwise, holes clockwise.
#[derive(Debug, Clone)]
pub struct FaceGroup {
    pub outer: Contour,
    pub holes: Vec<Contour>,
}

/// A set of closed contours describing one or more regions with holes.
#[derive(Debug, Clone)]
pub struct Profile {
    pub contours: Vec<Contour>,
}

impl Profile {
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// Profile from raw closed polylines, dropping loops with fewer than
    /// three distinct points. Returns `None` if nothing usable remains.
    pub fn from_polylines(loops: Vec<Vec<[f64; 2]>>) -> Option<Self> {
        let contours: Vec<Contour> = loops
            .iter()
            .map(|pts| Contour::polyline(pts))
            .filter(|c| c.segs.len() >= 2 && c.signed_area().abs() > EPS)
            .collect();
        if contours.is_empty() {
            None
        } else {
            Some(Self { contours })
        }
    }

    /// Rectangle with rounded corners, footprint [0, width] x [0, length],
    /// counter-clockwise. A zero radius gives a plain rectangle; a radius of
    /// half the shorter side degenerates the straight run on that side to
    /// nothing (stadium shape), which is handled by omitting the zero-length
    /// segments.
    pub fn rounded_rect(width: f64, length: f64, corner_radius: f64) -> Self {
        let r = corner_radius.max(0.0);
        if r < EPS {
            return Self::new(vec![Contour::polyline(&[
                [0.0, 0.0],
                [width, 0.0],
                [width, length],
                [0.0, length],
            ])]);
        }
        let k = r * std::f64::consts::FRAC_1_SQRT_2;
        let start = [r, 0.0];
        let mut segs = Vec::with_capacity(8);
        let push_line = |segs: &mut Vec<PathSeg>, from: [f64; 2], to: [f64; 2]| {
            if dist2(from, to) > EPS * EPS {
                segs.push(PathSeg::Line { to });
            }
        };
        push_line(&mut segs, start, [width - r, 0.0]);
        segs.push(PathSeg::Arc {
            via: [width - r + k, r - k],
            to: [width, r],
        });
        push_line(&mut segs, [width, r], [width, length - r]);
        segs.push(PathSeg::Arc {
            via: [width - r + k, length - r + k],
            to: [width - r, length],
        });
        push_line(&mut segs, [width - r, length], [r, length]);
        segs.push(PathSeg::Arc {
            via: [r - k, length - r + k],
            to: [0.0, length - r],
        });
        push_line(&mut segs, [0.0, length - r], [0.0, r]);
        segs.push(PathSeg::Arc {
            via: [r - k, r - k],
            to: start,
        });
        Self::new(vec![Contour { start, segs }])
    }

    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut min = [f64::MAX, f64::MAX];
        let mut max = [f64::MIN, f64::MIN];
        for c in &self.contours {
            let (cmin, cmax) = c.bounds();
            min[0] = min[0].min(cmin[0]);
            min[1] = min[1].min(cmin[1]);
            max[0] = max[0].max(cmax[0]);
            max[1] = max[1].max(cmax[1]);
        }
        (min, max)
    }

    /// Group contours into extrudable regions.
    ///
    /// A contour contained in an odd number of other contours is a hole of
    /// its innermost enclosing outer; everything else is an outer. Windings
    /// come out normalized regardless of the input direction, so both
    /// TrueType and PostScript outline conventions are accepted.
    pub fn face_groups(&self) -> Vec<FaceGroup> {
        let n = self.contours.len();
        let samples: Vec<[f64; 2]> = self.contours.iter().map(|c| c.sample()[0]).collect();
        let areas: Vec<f64> = self.contours.iter().map(|c| c.signed_area().abs()).collect();

        // enclosing[i] = indices of contours strictly containing contour i
        let mut enclosing: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in 0..n {
                if i != j && areas[j] > areas[i] && self.contours[j].contains(samples[i]) {
                    enclosing[i].push(j);
                }
            }
        }

        let is_hole: Vec<bool> = enclosing.iter().map(|e| e.len() % 2 == 1).collect();

        let mut groups: Vec<(usize, FaceGroup)> = Vec::new();
        for i in 0..n {
            if !is_hole[i] {
                let c = &self.contours[i];
                let outer = if c.signed_area() >= 0.0 {
                    c.clone()
                } else {
                    c.reversed()
                };
                groups.push((
                    i,
                    FaceGroup {
                        outer,
                        holes: Vec::new(),
                    },
                ));
            }
        }
        for i in 0..n {
            if is_hole[i] {
                // Innermost enclosing outer: smallest containing non-hole.
                let parent = enclosing[i]
                    .iter()
                    .copied()
                    .filter(|&j| !is_hole[j])
                    .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
                if let Some(p) = parent {
                    if let Some((_, group)) = groups.iter_mut().find(|(idx, _)| *idx == p) {
                        let c = &self.contours[i];
                        let hole = if c.signed_area() <= 0.0 {
                            c.clone()
                        } else {
                            c.reversed()
                        };
                        group.holes.push(hole);
                    }
                }
            }
        }
        groups.into_iter().map(|(_, g)| g).collect()
    }
}

/// Orthonormal frame mapping profile (u, v) coordinates into 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneBasis {
    pub origin: [f64; 3],
    pub x_axis: [f64; 3],
    pub y_axis: [f64; 3],
}

impl PlaneBasis {
    /// Ground plane: u maps to X, v to Y, normal +Z.
    pub fn ground() -> Self {
        Self {
            origin: [0.0; 3],
            x_axis: [1.0, 0.0, 0.0],
            y_axis: [0.0, 1.0, 0.0],
        }
    }

    /// Upright letter plane: u maps to X, v to Z, normal -Y.
    pub fn upright() -> Self {
        Self {
            origin: [0.0; 3],
            x_axis: [1.0, 0.0, 0.0],
            y_axis: [0.0, 0.0, 1.0],
        }
    }

    pub fn normal(&self) -> [f64; 3] {
        let x = self.x_axis;
        let y = self.y_axis;
        [
            x[1] * y[2] - x[2] * y[1],
            x[2] * y[0] - x[0] * y[2],
            x[0] * y[1] - x[1] * y[0],
        ]
    }

    pub fn point_at(&self, u: f64, v: f64) -> [f64; 3] {
        [
            self.origin[0] + self.x_axis[0] * u + self.y_axis[0] * v,
            self.origin[1] + self.x_axis[1] * u + self.y_axis[1] * v,
            self.origin[2] + self.x_axis[2] * u + self.y_axis[2] * v,
        ]
    }
}

pub(crate) fn dist2(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

fn shoelace(pts: &[[f64; 2]]) -> f64 {
    let n = pts.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        acc += a[0] * b[1] - b[0] * a[1];
    }
    acc / 2.0
}

/// Center of the circle through three points, `None` when collinear.
fn circumcenter(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<[f64; 2]> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < EPS {
        return None;
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    Some([ux, uy])
}

/// Append a polygonal approximation of the arc from..via..to (excluding
/// `from`, ending exactly at `to`). Axis-extreme points on the arc are
/// included so sampled bounds are exact.
fn sample_arc(from: [f64; 2], via: [f64; 2], to: [f64; 2], out: &mut Vec<[f64; 2]>) {
    let Some(center) = circumcenter(from, via, to) else {
        out.push(to);
        return;
    };
    let radius = dist2(from, center).sqrt();
    let ang = |p: [f64; 2]| (p[1] - center[1]).atan2(p[0] - center[0]);
    let a0 = ang(from);
    let av = ang(via);
    let a2 = ang(to);
    // Counter-clockwise offsets from a0 in [0, 2pi).
    let ccw = |x: f64| (x - a0).rem_euclid(2.0 * PI);
    let (sweep, dir) = if ccw(av) <= ccw(a2) || ccw(a2) < EPS {
        (if ccw(a2) < EPS { 2.0 * PI } else { ccw(a2) }, 1.0)
    } else {
        (2.0 * PI - ccw(a2), -1.0)
    };

    let mut angles: Vec<f64> = (1..ARC_SAMPLES)
        .map(|i| sweep * i as f64 / ARC_SAMPLES as f64)
        .collect();
    // Offsets of the four axis-extreme directions, if crossed by the sweep.
    for quarter in 0..4 {
        let target = quarter as f64 * PI / 2.0;
        let off = if dir > 0.0 {
            (target - a0).rem_euclid(2.0 * PI)
        } else {
            (a0 - target).rem_euclid(2.0 * PI)
        };
        if off > EPS && off < sweep - EPS {
            angles.push(off);
        }
    }
    angles.sort_by(f64::total_cmp);

    for off in angles {
        let a = a0 + dir * off;
        out.push([center[0] + radius * a.cos(), center[1] + radius * a.sin()]);
    }
    out.push(to);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64, offset: [f64; 2]) -> Vec<[f64; 2]> {
        vec![
            [offset[0], offset[1]],
            [offset[0] + side, offset[1]],
            [offset[0] + side, offset[1] + side],
            [offset[0], offset[1] + side],
        ]
    }

    #[test]
    fn polyline_signed_area_reflects_winding() {
        let ccw = Contour::polyline(&square(2.0, [0.0, 0.0]));
        assert!((ccw.signed_area() - 4.0).abs() < 1e-12);
        let cw = ccw.reversed();
        assert!((cw.signed_area() + 4.0).abs() < 1e-12);
    }

    #[test]
    fn polyline_drops_duplicate_and_closing_points() {
        let c = Contour::polyline(&[
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.0, 0.0],
        ]);
        assert_eq!(c.endpoints().len(), 4);
    }

    #[test]
    fn containment_parity_classifies_holes() {
        // Outer square, hole inside it, island inside the hole.
        let profile = Profile::from_polylines(vec![
            square(10.0, [0.0, 0.0]),
            square(6.0, [2.0, 2.0]),
            square(2.0, [4.0, 4.0]),
        ])
        .unwrap();
        let groups = profile.face_groups();
        assert_eq!(groups.len(), 2);
        let big = groups
            .iter()
            .find(|g| g.outer.signed_area() > 50.0)
            .unwrap();
        assert_eq!(big.holes.len(), 1);
        assert!(big.holes[0].signed_area() < 0.0, "holes wind clockwise");
        let island = groups
            .iter()
            .find(|g| g.outer.signed_area() < 50.0)
            .unwrap();
        assert!(island.holes.is_empty());
        assert!(island.outer.signed_area() > 0.0, "outers wind ccw");
    }

    #[test]
    fn disjoint_outers_form_separate_groups() {
        let profile =
            Profile::from_polylines(vec![square(1.0, [0.0, 0.0]), square(1.0, [5.0, 0.0])])
                .unwrap();
        assert_eq!(profile.face_groups().len(), 2);
    }

    #[test]
    fn from_polylines_rejects_degenerate_loops() {
        assert!(Profile::from_polylines(vec![vec![[0.0, 0.0], [1.0, 0.0]]]).is_none());
        assert!(Profile::from_polylines(vec![]).is_none());
        // Zero-area spike
        assert!(
            Profile::from_polylines(vec![vec![[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]]])
                .is_none()
        );
    }

    #[test]
    fn rounded_rect_bounds_and_orientation() {
        let p = Profile::rounded_rect(10.0, 4.0, 1.0);
        let (min, max) = p.bounds();
        assert!((min[0]).abs() < 1e-9 && (min[1]).abs() < 1e-9);
        assert!((max[0] - 10.0).abs() < 1e-9 && (max[1] - 4.0).abs() < 1e-9);
        assert!(p.contours[0].signed_area() > 0.0);
        // Area = rect minus the four corner squares plus the quarter circles.
        let expected = 10.0 * 4.0 - (4.0 - PI) * 1.0 * 1.0;
        assert!((p.contours[0].signed_area() - expected).abs() < 0.01);
    }

    #[test]
    fn rounded_rect_stadium_has_no_zero_length_lines() {
        // Radius equals half the short side: the straight runs on the short
        // sides vanish.
        let p = Profile::rounded_rect(10.0, 4.0, 2.0);
        let c = &p.contours[0];
        for (i, seg) in c.segs.iter().enumerate() {
            let from = if i == 0 { c.start } else { c.segs[i - 1].end() };
            assert!(
                dist2(from, seg.end()) > 1e-18,
                "segment {i} has zero length"
            );
        }
        let (min, max) = p.bounds();
        assert!((max[0] - 10.0).abs() < 1e-9);
        assert!((max[1] - 4.0).abs() < 1e-9);
        assert!(min[0].abs() < 1e-9 && min[1].abs() < 1e-9);
    }

    #[test]
    fn arc_sampling_hits_axis_extremes() {
        // Full semicircle over [0,0] -> [2,0] through (1,1): apex y = 1.
        let c = Contour {
            start: [0.0, 0.0],
            segs: vec![
                PathSeg::Arc {
                    via: [1.0, 1.0],
                    to: [2.0, 0.0],
                },
                PathSeg::Line { to: [0.0, 0.0] },
            ],
        };
        let (_, max) = c.bounds();
        assert!((max[1] - 1.0).abs() < 1e-9, "apex should be sampled exactly");
    }

    #[test]
    fn plane_basis_normals() {
        assert_eq!(PlaneBasis::ground().normal(), [0.0, 0.0, 1.0]);
        assert_eq!(PlaneBasis::upright().normal(), [0.0, -1.0, 0.0]);
        let p = PlaneBasis::upright().point_at(2.0, 3.0);
        assert_eq!(p, [2.0, 0.0, 3.0]);
    }
}
