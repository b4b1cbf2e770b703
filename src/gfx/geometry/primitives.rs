//! # Primitive Shape Generation
//!
//! Placeholder shapes for furniture and the van shell. Real models come from
//! the external catalog; these exist so the interaction core has something
//! with bounds to pick, drag and transform.

use super::GeometryData;

/// Generate an axis-aligned box centered at the origin
///
/// Each face has its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();

    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-hx, -hy,  hz], [ hx, -hy,  hz], [ hx,  hy,  hz], [-hx,  hy,  hz],
        // Back face
        [-hx, -hy, -hz], [-hx,  hy, -hz], [ hx,  hy, -hz], [ hx, -hy, -hz],
        // Left face
        [-hx, -hy, -hz], [-hx, -hy,  hz], [-hx,  hy,  hz], [-hx,  hy, -hz],
        // Right face
        [ hx, -hy,  hz], [ hx, -hy, -hz], [ hx,  hy, -hz], [ hx,  hy,  hz],
        // Top face
        [-hx,  hy,  hz], [ hx,  hy,  hz], [ hx,  hy, -hz], [-hx,  hy, -hz],
        // Bottom face
        [-hx, -hy, -hz], [ hx, -hy, -hz], [ hx, -hy,  hz], [-hx, -hy,  hz],
    ];

    let face_normals: [[f32; 3]; 6] = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit cube centered at the origin
pub fn generate_cube() -> GeometryData {
    generate_box(1.0, 1.0, 1.0)
}

/// Generate a floor plane in the XZ plane (Y-up), centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `segments` - Subdivisions per side
pub fn generate_floor(width: f32, depth: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(1);

    for row in 0..=segs {
        let v = row as f32 / segs as f32;
        let z = (v - 0.5) * depth;

        for col in 0..=segs {
            let u = col as f32 / segs as f32;
            let x = (u - 0.5) * width;

            data.vertices.push([x, 0.0, z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for row in 0..segs {
        for col in 0..segs {
            let i = row * (segs + 1) + col;
            let next_row = i + segs + 1;

            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), cube.vertices.len());
    }

    #[test]
    fn test_box_extents() {
        let data = generate_box(2.0, 1.0, 4.0);
        let max_x = data.vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        let min_y = data.vertices.iter().map(|v| v[1]).fold(f32::MAX, f32::min);
        let max_z = data.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 1.0);
        assert_eq!(min_y, -0.5);
        assert_eq!(max_z, 2.0);
    }

    #[test]
    fn test_floor_generation() {
        let floor = generate_floor(2.0, 2.0, 2);
        assert_eq!(floor.vertices.len(), 9); // 3x3 grid
        assert_eq!(floor.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(floor.vertices.iter().all(|v| v[1] == 0.0));
    }
}
