use kd_tree::KdPoint;

/// Particle position tagged with the particle's index inside its frame.
#[derive(Debug, Clone, Copy)]
pub struct XYZ {
    coords: [f64; 3],
    index: usize,
}

impl XYZ {
    pub fn from(coords: [f64; 3], index: usize) -> Self {
        Self { coords, index }
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }
    pub fn y(&self) -> f64 {
        self.coords[1]
    }
    pub fn z(&self) -> f64 {
        self.coords[2]
    }
    pub fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for XYZ {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.coords == other.coords
    }
}

impl KdPoint for XYZ {
    type Scalar = f64;
    type Dim = typenum::U3;
    fn at(&self, i: usize) -> f64 {
        self.coords[i]
    }
}

/// Inclusive distance test: `|a - b| <= cutoff`.
pub fn check_cutoff(a: XYZ, b: XYZ, cutoff: f64) -> bool {
    let d_x = a.x() - b.x();
    let d_y = a.y() - b.y();
    let d_z = a.z() - b.z();
    d_x * d_x + d_y * d_y + d_z * d_z <= cutoff * cutoff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_cutoff_is_inclusive() {
        let a = XYZ::from([0.0, 0.0, 0.0], 0);
        let b = XYZ::from([3.0, 4.0, 0.0], 1);
        assert!(check_cutoff(a, b, 5.0));
        assert!(check_cutoff(a, b, 5.5));
        assert!(!check_cutoff(a, b, 4.99));
    }

    #[test]
    fn test_same_point_different_particles() {
        let a = XYZ::from([1.0, 2.0, 3.0], 0);
        let b = XYZ::from([1.0, 2.0, 3.0], 1);
        assert_ne!(a, b);
        assert_eq!(a, XYZ::from([1.0, 2.0, 3.0], 0));
        assert!(check_cutoff(a, b, 0.0));
    }
}
