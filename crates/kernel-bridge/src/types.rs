use serde::{Deserialize, Serialize};

/// Opaque handle to a solid (or a compound of disjoint solids) stored in a
/// kernel. Valid only for the kernel instance that created it; never
/// persisted.
#[derive(Debug, Clone)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("profile rejected: {reason}")]
    ProfileRejected { reason: String },

    #[error("degenerate geometry: {reason}")]
    Degenerate { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("unknown solid handle {handle}")]
    UnknownHandle { handle: u64 },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

impl KernelError {
    /// True for outcomes that are properties of the input geometry (empty
    /// intersection, unusable outline). Callers building letter pairs absorb
    /// these as skips; everything else indicates misuse or a missing
    /// capability and must propagate.
    pub fn is_geometric(&self) -> bool {
        matches!(
            self,
            KernelError::BooleanFailed { .. }
                | KernelError::ProfileRejected { .. }
                | KernelError::Degenerate { .. }
        )
    }
}

/// Tessellated triangle mesh handed to exporters and previews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat vertex normals, parallel to `vertices`.
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, re-basing its indices.
    pub fn append(&mut self, other: &RenderMesh) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_rebases_indices() {
        let mut a = RenderMesh {
            vertices: vec![0.0; 9],
            normals: vec![0.0; 9],
            indices: vec![0, 1, 2],
        };
        let b = RenderMesh {
            vertices: vec![1.0; 9],
            normals: vec![0.0; 9],
            indices: vec![0, 1, 2],
        };
        a.append(&b);
        assert_eq!(a.vertex_count(), 6);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn geometric_errors_are_classified() {
        assert!(KernelError::BooleanFailed {
            reason: "x".into()
        }
        .is_geometric());
        assert!(KernelError::Degenerate { reason: "x".into() }.is_geometric());
        assert!(!KernelError::UnknownHandle { handle: 7 }.is_geometric());
        assert!(!KernelError::NotSupported {
            operation: "x".into()
        }
        .is_geometric());
    }
}
