//! Angle-weighted vertex normals recomputed from triangle winding.
//!
//! Extraction emits positions and indices only. Mesh sinks that need shading
//! normals rebuild them here.

use glam::Vec3;

use crate::types::MeshOutput;

/// Per-vertex normals, parallel to `mesh.vertices`.
///
/// Each triangle contributes its unit face normal weighted by the corner
/// angle at each vertex. Vertices with no usable triangle get `+Y`.
pub fn recalculate_normals(mesh: &MeshOutput) -> Vec<Vec3> {
  let mut normals = vec![Vec3::ZERO; mesh.vertices.len()];
  let vertices = &mesh.vertices;

  for [i0, i1, i2] in mesh.triangles() {
    let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
    let p0 = vertices[i0];
    let p1 = vertices[i1];
    let p2 = vertices[i2];

    let e01 = p1 - p0;
    let e02 = p2 - p0;
    let e12 = p2 - p1;

    let face_normal = e01.cross(e02);
    let face_len_sq = face_normal.length_squared();

    // Skip degenerate triangles
    if face_len_sq < 1e-12 {
      continue;
    }

    let face_normal_unit = face_normal * face_len_sq.sqrt().recip();

    normals[i0] += face_normal_unit * vertex_angle(e01, e02);
    normals[i1] += face_normal_unit * vertex_angle(-e01, e12);
    normals[i2] += face_normal_unit * vertex_angle(-e02, -e12);
  }

  for n in &mut normals {
    *n = n.try_normalize().unwrap_or(Vec3::Y);
  }
  normals
}

fn vertex_angle(e1: Vec3, e2: Vec3) -> f32 {
  let len1_sq = e1.length_squared();
  let len2_sq = e2.length_squared();

  if len1_sq < 1e-12 || len2_sq < 1e-12 {
    return 0.0;
  }

  let cos_angle = e1.dot(e2) / (len1_sq.sqrt() * len2_sq.sqrt());
  cos_angle.clamp(-1.0, 1.0).acos()
}
