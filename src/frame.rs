use crate::xyz::XYZ;

/// One simulation snapshot: positions already wrapped into the periodic box.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub step: u64,
    positions: Vec<XYZ>,
}

impl Frame {
    pub fn new(step: u64, positions: Vec<XYZ>) -> Self {
        Self { step, positions }
    }

    /// Builds a frame from bare coordinates, indexing particles in order.
    pub fn from_coordinates(step: u64, coords: impl IntoIterator<Item = [f64; 3]>) -> Self {
        let positions = coords
            .into_iter()
            .enumerate()
            .map(|(i, c)| XYZ::from(c, i))
            .collect();
        Self { step, positions }
    }

    #[inline]
    pub fn particles_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn positions(&self) -> &[XYZ] {
        &self.positions
    }
}
