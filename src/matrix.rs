use nalgebra::DMatrix;

use crate::error::PairingError;

/// One frame of a correlation or membership matrix, entries are 0 or 1.
pub type Correlation = DMatrix<u8>;

pub(crate) fn check_square(m: &Correlation) -> Result<usize, PairingError> {
    if m.nrows() != m.ncols() {
        return Err(PairingError::NotSquare {
            rows: m.nrows(),
            cols: m.ncols(),
        });
    }
    Ok(m.nrows())
}

pub(crate) fn check_boolean(m: &Correlation) -> Result<(), PairingError> {
    for col in 0..m.ncols() {
        for row in 0..m.nrows() {
            let value = m[(row, col)];
            if value > 1 {
                return Err(PairingError::NotBoolean { row, col, value });
            }
        }
    }
    Ok(())
}

/// Square, 0/1, symmetric and with every particle paired with itself.
pub(crate) fn check_direct(m: &Correlation) -> Result<usize, PairingError> {
    let n = check_square(m)?;
    check_boolean(m)?;
    for row in 0..n {
        for col in (row + 1)..n {
            if m[(row, col)] != m[(col, row)] {
                return Err(PairingError::Asymmetric { row, col });
            }
        }
    }
    if let Some(i) = (0..n).find(|&i| m[(i, i)] != 1) {
        return Err(PairingError::MissingSelfPairing(i));
    }
    Ok(n)
}

/// Direct matrix invariants plus transitivity.
///
/// Keys every particle by the first column set in its row. A symmetric
/// reflexive relation is transitive exactly when two particles are related
/// iff they share a key.
pub(crate) fn check_equivalence(m: &Correlation) -> Result<usize, PairingError> {
    let n = check_direct(m)?;
    let keys = (0..n)
        .map(|i| (0..n).find(|&j| m[(i, j)] == 1).unwrap_or(i))
        .collect::<Vec<_>>();
    for row in 0..n {
        for col in (row + 1)..n {
            if (m[(row, col)] == 1) != (keys[row] == keys[col]) {
                return Err(PairingError::NotTransitive { row, col });
            }
        }
    }
    Ok(n)
}

/// Every particle row holds exactly one set entry.
pub(crate) fn check_partition(m: &Correlation) -> Result<usize, PairingError> {
    check_boolean(m)?;
    for row in 0..m.nrows() {
        let set = m.row(row).iter().filter(|&&v| v == 1).count();
        if set != 1 {
            return Err(PairingError::NotPartition { row, set });
        }
    }
    Ok(m.nrows())
}

fn check_batch(
    frames: &[Correlation],
    check: impl Fn(&Correlation) -> Result<usize, PairingError>,
) -> Result<usize, PairingError> {
    let mut expected = None;
    for (index, frame) in frames.iter().enumerate() {
        let found = check(frame).map_err(|e| e.in_frame(index))?;
        match expected {
            None => expected = Some(found),
            Some(expected) if expected != found => {
                return Err(
                    PairingError::ParticleCountMismatch { expected, found }.in_frame(index)
                );
            }
            _ => {}
        }
    }
    Ok(expected.unwrap_or(0))
}

macro_rules! impl_stack {
    ($($name:ident)*) => ($(
        impl $name {
            #[must_use]
            pub fn frames_count(&self) -> usize {
                self.frames.len()
            }

            /// Particle count shared by every frame of the batch.
            #[must_use]
            pub fn particles_count(&self) -> usize {
                self.particles
            }

            #[must_use]
            pub fn frame(&self, index: usize) -> Option<&Correlation> {
                self.frames.get(index)
            }

            #[must_use]
            pub fn frames(&self) -> &[Correlation] {
                &self.frames
            }

            #[must_use]
            pub fn into_frames(self) -> Vec<Correlation> {
                self.frames
            }

            pub fn iter(&self) -> impl Iterator<Item = &Correlation> {
                self.frames.iter()
            }
        }
    )*)
}

macro_rules! impl_square_shape {
    ($($name:ident)*) => ($(
        impl $name {
            /// `(frames, particles, particles)`
            #[must_use]
            pub fn shape(&self) -> (usize, usize, usize) {
                (self.frames.len(), self.particles, self.particles)
            }
        }
    )*)
}

/// Stack of direct correlation matrices indexed `[frame, i, j]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMatrix {
    particles: usize,
    frames: Vec<Correlation>,
}

impl DirectMatrix {
    /// Wraps precomputed adjacency matrices, rejecting any frame that is not
    /// square, 0/1, symmetric and self-paired.
    pub fn new(frames: Vec<Correlation>) -> Result<Self, PairingError> {
        let particles = check_batch(&frames, check_direct)?;
        Ok(Self { particles, frames })
    }

    pub(crate) fn from_checked(particles: usize, frames: Vec<Correlation>) -> Self {
        Self { particles, frames }
    }
}

/// Stack of indirect correlation matrices, each an equivalence relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectMatrix {
    particles: usize,
    frames: Vec<Correlation>,
}

impl IndirectMatrix {
    pub fn new(frames: Vec<Correlation>) -> Result<Self, PairingError> {
        let particles = check_batch(&frames, check_equivalence)?;
        Ok(Self { particles, frames })
    }

    pub(crate) fn from_checked(particles: usize, frames: Vec<Correlation>) -> Self {
        Self { particles, frames }
    }
}

/// Stack of `[particle, cluster]` membership matrices. The cluster count
/// varies per frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedMatrix {
    particles: usize,
    frames: Vec<Correlation>,
}

impl ReducedMatrix {
    pub fn new(frames: Vec<Correlation>) -> Result<Self, PairingError> {
        let particles = check_batch(&frames, check_partition)?;
        Ok(Self { particles, frames })
    }

    pub(crate) fn from_checked(particles: usize, frames: Vec<Correlation>) -> Self {
        Self { particles, frames }
    }

    #[must_use]
    pub fn clusters_count(&self, frame: usize) -> Option<usize> {
        self.frames.get(frame).map(Correlation::ncols)
    }
}

impl_stack! { DirectMatrix IndirectMatrix ReducedMatrix }
impl_square_shape! { DirectMatrix IndirectMatrix }

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sevick_direct() -> Correlation {
        DMatrix::from_row_slice(
            5,
            5,
            &[
                1, 0, 0, 0, 1, //
                0, 1, 1, 0, 0, //
                0, 1, 1, 0, 1, //
                0, 0, 0, 1, 0, //
                1, 0, 1, 0, 1, //
            ],
        )
    }

    pub(crate) fn sevick_indirect() -> Correlation {
        DMatrix::from_row_slice(
            5,
            5,
            &[
                1, 1, 1, 0, 1, //
                1, 1, 1, 0, 1, //
                1, 1, 1, 0, 1, //
                0, 0, 0, 1, 0, //
                1, 1, 1, 0, 1, //
            ],
        )
    }

    #[test]
    fn test_direct_matrix_shape() {
        let direct = DirectMatrix::new(vec![sevick_direct()]).unwrap();
        assert_eq!(direct.shape(), (1, 5, 5));
        assert_eq!(direct.frame(0), Some(&sevick_direct()));
        assert!(direct.frame(1).is_none());
    }

    #[test]
    fn test_empty_batch() {
        let direct = DirectMatrix::new(Vec::new()).unwrap();
        assert_eq!(direct.shape(), (0, 0, 0));
        let direct = DirectMatrix::new(vec![DMatrix::zeros(0, 0)]).unwrap();
        assert_eq!(direct.shape(), (1, 0, 0));
    }

    #[test]
    fn test_direct_rejects_non_square() {
        let err = DirectMatrix::new(vec![DMatrix::from_element(2, 3, 1)]).unwrap_err();
        assert_eq!(
            err,
            PairingError::NotSquare { rows: 2, cols: 3 }.in_frame(0)
        );
    }

    #[test]
    fn test_direct_rejects_asymmetric() {
        let mut m = sevick_direct();
        m[(0, 3)] = 1;
        assert_eq!(
            check_direct(&m),
            Err(PairingError::Asymmetric { row: 0, col: 3 })
        );
    }

    #[test]
    fn test_direct_rejects_zero_diagonal() {
        let mut m = sevick_direct();
        m[(2, 2)] = 0;
        assert_eq!(check_direct(&m), Err(PairingError::MissingSelfPairing(2)));
    }

    #[test]
    fn test_direct_rejects_non_boolean() {
        let mut m = sevick_direct();
        m[(4, 0)] = 2;
        m[(0, 4)] = 2;
        assert_eq!(
            check_direct(&m),
            Err(PairingError::NotBoolean {
                row: 4,
                col: 0,
                value: 2
            })
        );
    }

    #[test]
    fn test_batch_rejects_particle_count_mismatch() {
        let err = DirectMatrix::new(vec![sevick_direct(), DMatrix::identity(3, 3)]).unwrap_err();
        assert_eq!(
            err,
            PairingError::ParticleCountMismatch {
                expected: 5,
                found: 3
            }
            .in_frame(1)
        );
    }

    #[test]
    fn test_equivalence_check() {
        assert_eq!(check_equivalence(&sevick_indirect()), Ok(5));
        assert_eq!(
            check_equivalence(&sevick_direct()),
            Err(PairingError::NotTransitive { row: 2, col: 4 })
        );
        assert!(IndirectMatrix::new(vec![sevick_direct()]).is_err());
    }

    #[test]
    fn test_equivalence_check_catches_broken_chains() {
        // 0-1 and 1-2 related, 0-2 not
        let path = DMatrix::from_row_slice(3, 3, &[1, 1, 0, 1, 1, 1, 0, 1, 1]);
        assert_eq!(
            check_equivalence(&path),
            Err(PairingError::NotTransitive { row: 1, col: 2 })
        );
        // 0 related to both, 1 and 2 unrelated
        let star = DMatrix::from_row_slice(3, 3, &[1, 1, 1, 1, 1, 0, 1, 0, 1]);
        assert_eq!(
            check_equivalence(&star),
            Err(PairingError::NotTransitive { row: 1, col: 2 })
        );
    }

    #[test]
    fn test_equivalence_check_on_dense_cluster() {
        let n = 1500;
        let mut m = DMatrix::<u8>::from_element(n, n, 1);
        assert_eq!(check_equivalence(&m), Ok(n));
        m[(n - 2, n - 1)] = 0;
        m[(n - 1, n - 2)] = 0;
        assert_eq!(
            check_equivalence(&m),
            Err(PairingError::NotTransitive {
                row: n - 2,
                col: n - 1
            })
        );
    }

    #[test]
    fn test_partition_check() {
        let reduced = DMatrix::from_row_slice(3, 2, &[0, 1, 1, 0, 0, 1]);
        assert_eq!(check_partition(&reduced), Ok(3));
        let reduced = DMatrix::from_row_slice(3, 2, &[0, 1, 1, 1, 0, 1]);
        assert_eq!(
            check_partition(&reduced),
            Err(PairingError::NotPartition { row: 1, set: 2 })
        );
        let reduced = DMatrix::from_row_slice(2, 2, &[0, 0, 1, 0]);
        assert_eq!(
            ReducedMatrix::new(vec![reduced]),
            Err(PairingError::NotPartition { row: 0, set: 0 }.in_frame(0))
        );
    }
}
