use crate::types::ExportError;
use kernel_bridge::RenderMesh;

/// Convert a `RenderMesh` to binary STL format.
///
/// Binary STL layout:
/// - 80 bytes: header
/// - 4 bytes: u32 LE triangle count
/// - Per triangle (50 bytes each):
///   - 12 bytes: normal vector (3 × f32 LE)
///   - 36 bytes: 3 vertices (3 × 3 × f32 LE)
///   - 2 bytes: attribute byte count (0u16)
///
/// Normals are recomputed per face from the triangle winding; STL consumers
/// ignore the vertex normals a tessellator provides anyway.
pub fn render_mesh_to_stl(mesh: &RenderMesh) -> Result<Vec<u8>, ExportError> {
    let tri_count = mesh.indices.len() / 3;
    if tri_count == 0 {
        return Err(ExportError::NoTriangles);
    }
    let vertex_count = mesh.vertex_count();
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(ExportError::IndexOutOfRange {
            index: bad,
            count: vertex_count,
        });
    }

    let mut buf = Vec::with_capacity(84 + tri_count * 50);
    buf.extend_from_slice(b"duotype STL export");
    buf.resize(80, 0);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for t in 0..tri_count {
        let v = |slot: usize| {
            let i = mesh.indices[t * 3 + slot] as usize;
            [
                mesh.vertices[i * 3],
                mesh.vertices[i * 3 + 1],
                mesh.vertices[i * 3 + 2],
            ]
        };
        let (v0, v1, v2) = (v(0), v(1), v(2));

        let e1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
        let e2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];
        let nx = e1[1] * e2[2] - e1[2] * e2[1];
        let ny = e1[2] * e2[0] - e1[0] * e2[2];
        let nz = e1[0] * e2[1] - e1[1] * e2[0];
        let len = (nx * nx + ny * ny + nz * nz).sqrt();
        let normal = if len > 1e-12 {
            [nx / len, ny / len, nz / len]
        } else {
            [0.0, 0.0, 0.0]
        };

        for c in &normal {
            buf.extend_from_slice(&c.to_le_bytes());
        }
        for v in &[v0, v1, v2] {
            for c in v {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}
