use crate::Cost;
use crate::types::Coordinate;

/// Mean Earth radius used for link costs, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates. Symmetric, and zero only for identical points.
pub fn haversine(a: Coordinate, b: Coordinate) -> Cost {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

impl Coordinate {
    pub fn distance_to(&self, other: &Coordinate) -> Cost {
        haversine(*self, *other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identical_points_are_zero() {
        let p = Coordinate::new(12.99151, 80.23362);
        assert_eq!(haversine(p, p), 0.0);
    }

    #[test]
    fn one_degree_along_equator() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 1.0);
        let expected = EARTH_RADIUS_KM * 1f64.to_radians();
        assert_relative_eq!(haversine(a, b), expected, epsilon = 1e-9);
    }

    #[test]
    fn symmetric() {
        let chennai = Coordinate::new(13.0827, 80.2707);
        let london = Coordinate::new(51.5074, -0.1278);
        assert_eq!(haversine(chennai, london), haversine(london, chennai));
        // roughly 8,200 km
        let d = chennai.distance_to(&london);
        assert!(d > 8_100.0 && d < 8_300.0, "{d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        assert_relative_eq!(haversine(a, b), std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }
}
