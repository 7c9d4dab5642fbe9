use itertools::Itertools;
use kd_tree::KdTree;
use log::{debug, info};
use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::error::PairingError;
use crate::frame::Frame;
use crate::matrix::{Correlation, DirectMatrix};
use crate::xyz::{check_cutoff, XYZ};

// k-d tree radius queries are strict, the cutoff test is not.
const SEARCH_PADDING: f64 = 1e-9;

pub(crate) fn check_cutoff_value(cutoff: f64) -> Result<(), PairingError> {
    if cutoff.is_nan() || cutoff < 0.0 {
        return Err(PairingError::NegativeCutoff(cutoff));
    }
    Ok(())
}

/// Direct correlation matrix of a single frame.
///
/// Entry `(i, j)` is 1 when particles `i` and `j` are at most `cutoff` apart.
/// The diagonal is always 1. Rows follow the order of `positions`.
pub fn direct_correlation(positions: &[XYZ], cutoff: f64) -> Result<Correlation, PairingError> {
    check_cutoff_value(cutoff)?;
    let n = positions.len();
    if n == 0 {
        return Ok(DMatrix::zeros(0, 0));
    }
    let atoms = positions
        .iter()
        .enumerate()
        .map(|(i, p)| XYZ::from([p.x(), p.y(), p.z()], i))
        .collect::<Vec<_>>();
    let tree = KdTree::build_by_ordered_float(atoms.clone());
    let radius = cutoff * (1.0 + SEARCH_PADDING) + SEARCH_PADDING;
    let mut direct = DMatrix::<u8>::identity(n, n);
    for atom in &atoms {
        for neighbour in tree.within_radius(atom, radius) {
            if check_cutoff(*atom, *neighbour, cutoff) {
                direct[(atom.index(), neighbour.index())] = 1;
                direct[(neighbour.index(), atom.index())] = 1;
            }
        }
    }
    debug!(
        "direct correlation: {n} particles, {} pairs within {cutoff}",
        direct_pairs(&direct).len()
    );
    Ok(direct)
}

/// Direct correlation matrices for a batch of frames, in frame order.
///
/// All frames must hold the same number of particles.
pub fn generate_direct_correlation(
    frames: &[Frame],
    cutoff: f64,
) -> Result<DirectMatrix, PairingError> {
    check_cutoff_value(cutoff)?;
    let particles = frames.first().map_or(0, Frame::particles_count);
    if let Some((index, frame)) = frames
        .iter()
        .enumerate()
        .find(|(_, frame)| frame.particles_count() != particles)
    {
        return Err(PairingError::ParticleCountMismatch {
            expected: particles,
            found: frame.particles_count(),
        }
        .in_frame(index));
    }
    let matrices = frames
        .par_iter()
        .enumerate()
        .map(|(index, frame)| {
            direct_correlation(frame.positions(), cutoff).map_err(|e| e.in_frame(index))
        })
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "built {} direct correlation matrices of {particles} particles",
        matrices.len()
    );
    Ok(DirectMatrix::from_checked(particles, matrices))
}

/// Directly paired particles `(i, j)` with `i < j`, in ascending order.
pub fn direct_pairs(direct: &Correlation) -> Vec<(usize, usize)> {
    let n = direct.nrows().min(direct.ncols());
    (0..n)
        .tuple_combinations()
        .filter(|&(i, j)| direct[(i, j)] == 1)
        .collect()
}
