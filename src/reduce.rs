use log::{debug, info};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::error::PairingError;
use crate::matrix::{check_equivalence, Correlation, IndirectMatrix, ReducedMatrix};

/// Ordering of cluster columns in a reduced matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnOrder {
    /// Ascending lexicographic order of the clusters' indirect rows. For 0/1
    /// rows this puts the cluster with the largest smallest member first.
    #[default]
    RowContent,
    /// Ascending order of each cluster's smallest member.
    FirstOccurrence,
}

pub(crate) fn reduce(indirect: &Correlation, order: ColumnOrder) -> Correlation {
    let n = indirect.nrows();
    // each particle's class is keyed by its smallest member
    let keys = (0..n)
        .map(|i| (0..n).find(|&j| indirect[(i, j)] == 1).unwrap_or(i))
        .collect::<Vec<_>>();
    let mut representatives = Vec::new();
    let mut columns: HashMap<usize, usize> = HashMap::new();
    for &key in &keys {
        columns.entry(key).or_insert_with(|| {
            representatives.push(key);
            representatives.len() - 1
        });
    }
    if order == ColumnOrder::RowContent {
        let k = representatives.len();
        columns.values_mut().for_each(|column| *column = k - 1 - *column);
    }
    let mut reduced = DMatrix::<u8>::zeros(n, representatives.len());
    for (particle, key) in keys.iter().enumerate() {
        reduced[(particle, columns[key])] = 1;
    }
    debug!("reduced {n} particles into {} clusters", representatives.len());
    reduced
}

/// Membership matrix `[particle, cluster]` of a single indirect matrix.
///
/// Particles are visited in ascending index order and every distinct
/// equivalence class gets one column. Input that is not an equivalence
/// relation is rejected.
pub fn reduce_indirect(
    indirect: &Correlation,
    order: ColumnOrder,
) -> Result<Correlation, PairingError> {
    check_equivalence(indirect)?;
    Ok(reduce(indirect, order))
}

/// Membership matrices for every frame of `indirect`, in frame order.
pub fn generate_reduced_matrix(indirect: &IndirectMatrix, order: ColumnOrder) -> ReducedMatrix {
    let frames = indirect
        .frames()
        .par_iter()
        .map(|frame| reduce(frame, order))
        .collect::<Vec<_>>();
    info!("reduced {} frames", frames.len());
    ReducedMatrix::from_checked(indirect.particles_count(), frames)
}

/// Cluster column holding `particle`, if the particle exists.
pub fn cluster_of(reduced: &Correlation, particle: usize) -> Option<usize> {
    if particle >= reduced.nrows() {
        return None;
    }
    (0..reduced.ncols()).find(|&c| reduced[(particle, c)] == 1)
}
