use crate::profile::{PlaneBasis, Profile};
use crate::types::{KernelError, RenderMesh, SolidHandle};
use duotype_types::Aabb;

/// Core geometry kernel trait. Provides all shape construction and
/// modification operations. Implemented by TruckKernel (wraps real truck)
/// and MockKernel (deterministic test double).
///
/// Handles may refer to compounds: several disjoint solids treated as one
/// unit. Extruding a profile with separate outer loops (the dot of an `i`)
/// yields one, and `compound` builds one explicitly.
pub trait Kernel {
    /// Extrude the profile's regions from `plane` along `direction` by
    /// `depth`. Each outer loop with its holes becomes one part.
    fn extrude_profile(
        &mut self,
        profile: &Profile,
        plane: &PlaneBasis,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Upright cylinder, base circle centered on the origin of the XY plane,
    /// extending along +Z.
    fn cylinder(&mut self, radius: f64, height: f64) -> Result<SolidHandle, KernelError>;

    /// Boolean intersection, taken pairwise across the parts of compound
    /// operands. Fails with `BooleanFailed` when nothing remains.
    fn boolean_intersect(
        &mut self,
        a: &SolidHandle,
        b: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// The solid rigidly translated by `offset`.
    fn translated(
        &mut self,
        solid: &SolidHandle,
        offset: [f64; 3],
    ) -> Result<SolidHandle, KernelError>;

    /// The solid rotated about the vertical axis through the origin.
    fn rotated_z(
        &mut self,
        solid: &SolidHandle,
        angle_rad: f64,
    ) -> Result<SolidHandle, KernelError>;

    /// Collect solids into one compound handle without fusing them.
    fn compound(&mut self, parts: &[SolidHandle]) -> Result<SolidHandle, KernelError>;

    /// Tessellate a solid (all parts merged) to a triangle mesh.
    fn tessellate(
        &mut self,
        solid: &SolidHandle,
        tolerance: f64,
    ) -> Result<RenderMesh, KernelError>;

    /// Serialize a solid's boundary representation as a STEP document.
    fn export_step(&self, solid: &SolidHandle) -> Result<String, KernelError>;
}

/// Read-only geometric queries on kernel solids.
pub trait KernelIntrospect {
    /// Axis-aligned bounding box over every part of the solid.
    fn bounding_box(&self, solid: &SolidHandle) -> Result<Aabb, KernelError>;

    /// Number of disjoint parts behind the handle.
    fn part_count(&self, solid: &SolidHandle) -> Result<usize, KernelError>;
}
