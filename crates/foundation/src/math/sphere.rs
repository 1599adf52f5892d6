//! Geographic coordinates on a render sphere.
//!
//! The viewer's sphere uses a Y-up frame where the texture seam sits on the
//! -X axis: longitude 0 maps to +X, longitude +90 to -Z, latitude +90 to +Y.
//! The sign and axis order must match the equirectangular texture mapping of
//! the globe mesh, otherwise markers end up mirrored relative to the map.

use super::Vec3;

/// Project latitude/longitude (degrees) onto a sphere of `radius`.
pub fn lat_lon_to_vec3(lat_deg: f64, lon_deg: f64, radius: f64) -> Vec3 {
    let phi = (90.0 - lat_deg).to_radians();
    let theta = (lon_deg + 180.0).to_radians();
    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::lat_lon_to_vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn united_states_marker_position() {
        let p = lat_lon_to_vec3(37.0902, -95.7129, 5.1);
        assert_close(p.x, -0.404_964_426_406_010_27, 1e-12);
        assert_close(p.y, 3.075_664_947_632_526_4, 1e-12);
        assert_close(p.z, 4.047_998_140_223_171_5, 1e-12);
    }

    #[test]
    fn poles_and_prime_meridian() {
        let north = lat_lon_to_vec3(90.0, 0.0, 2.0);
        assert_close(north.x, 0.0, 1e-12);
        assert_close(north.y, 2.0, 1e-12);
        assert_close(north.z, 0.0, 1e-12);

        // lon 0 at the equator lands on +X with this axis convention.
        let origin = lat_lon_to_vec3(0.0, 0.0, 1.0);
        assert_close(origin.x, 1.0, 1e-12);
        assert_close(origin.y, 0.0, 1e-12);
        assert_close(origin.z, 0.0, 1e-12);
    }

    #[test]
    fn projected_points_lie_on_the_sphere() {
        let radius = 5.1;
        let mut lat = -90.0;
        while lat <= 90.0 {
            let mut lon = -180.0;
            while lon <= 180.0 {
                let p = lat_lon_to_vec3(lat, lon, radius);
                assert_close(p.length(), radius, 1e-9);
                lon += 7.5;
            }
            lat += 7.5;
        }
    }
}
