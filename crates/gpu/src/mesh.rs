use foundation::math::lat_lon_to_vec3;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    /// Equirectangular texture coordinate; `v = 0` is the north pole.
    pub uv: [f32; 2],
}

/// Latitude/longitude sphere with `segments` rings and `segments` slices.
///
/// Vertices are laid out on the same parameterization as
/// [`lat_lon_to_vec3`], so `u = 0` is longitude -180 and an equirectangular
/// image lines up with marker positions. Seams and poles are duplicated so
/// every vertex has a single UV.
pub fn uv_sphere(radius: f64, segments: u32) -> (Vec<MeshVertex>, Vec<u32>) {
    let rings = segments.max(3);
    let slices = segments.max(3);

    let mut vertices = Vec::with_capacity(((rings + 1) * (slices + 1)) as usize);
    for iy in 0..=rings {
        let v = iy as f64 / rings as f64;
        let lat = 90.0 - v * 180.0;
        for ix in 0..=slices {
            let u = ix as f64 / slices as f64;
            let lon = u * 360.0 - 180.0;
            vertices.push(MeshVertex {
                position: lat_lon_to_vec3(lat, lon, radius).to_f32(),
                uv: [u as f32, v as f32],
            });
        }
    }

    let stride = slices + 1;
    let mut indices = Vec::with_capacity((rings * slices * 6) as usize);
    for iy in 0..rings {
        for ix in 0..slices {
            let a = iy * stride + ix;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            // Degenerate triangles at the poles are skipped.
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != rings - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    (vertices, indices)
}
