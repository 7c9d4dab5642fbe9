use log::{debug, info};
use nalgebra::DMatrix;
use rayon::prelude::*;
use std::collections::VecDeque;

use crate::error::PairingError;
use crate::matrix::{check_direct, Correlation, DirectMatrix, IndirectMatrix};

/// How the transitive closure of a direct matrix is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosureStrategy {
    /// Breadth-first connected component labelling.
    #[default]
    Components,
    /// Boolean matrix squaring until a fixed point.
    Squaring,
}

fn labels(direct: &Correlation) -> Vec<usize> {
    let n = direct.nrows();
    let neighbours = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| j != i && direct[(i, j)] == 1)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    for start in 0..n {
        if labels[start].is_some() {
            continue;
        }
        labels[start] = Some(start);
        let mut queue = VecDeque::from([start]);
        while let Some(i) = queue.pop_front() {
            for &j in &neighbours[i] {
                if labels[j].is_none() {
                    labels[j] = Some(start);
                    queue.push_back(j);
                }
            }
        }
    }
    labels.into_iter().flatten().collect()
}

/// Connected component label of every particle: the smallest particle index
/// of its component.
pub fn component_labels(direct: &Correlation) -> Result<Vec<usize>, PairingError> {
    check_direct(direct)?;
    Ok(labels(direct))
}

fn closure_by_components(direct: &Correlation) -> Correlation {
    let labels = labels(direct);
    let n = labels.len();
    DMatrix::from_fn(n, n, |i, j| u8::from(labels[i] == labels[j]))
}

fn closure_by_squaring(direct: &Correlation) -> Correlation {
    if direct.is_empty() {
        return direct.clone();
    }
    let mut closure = direct.map(u32::from);
    let mut iterations = 1;
    loop {
        let next = (&closure * &closure).map(|v| u32::from(v > 0));
        if next == closure {
            break;
        }
        closure = next;
        iterations += 1;
    }
    debug!("squaring closure reached a fixed point after {iterations} products");
    closure.map(|v| u8::from(v > 0))
}

pub(crate) fn closure(direct: &Correlation, strategy: ClosureStrategy) -> Correlation {
    match strategy {
        ClosureStrategy::Components => closure_by_components(direct),
        ClosureStrategy::Squaring => closure_by_squaring(direct),
    }
}

/// Indirect correlation matrix of a single frame.
///
/// Fails on input that is not square, not 0/1, asymmetric or missing a
/// diagonal entry. Asymmetric input is never repaired.
pub fn indirect_connectivity(
    direct: &Correlation,
    strategy: ClosureStrategy,
) -> Result<Correlation, PairingError> {
    check_direct(direct)?;
    Ok(closure(direct, strategy))
}

/// Indirect correlation matrices for every frame of `direct`, in frame order.
pub fn generate_indirect_connectivity(
    direct: &DirectMatrix,
    strategy: ClosureStrategy,
) -> IndirectMatrix {
    let frames = direct
        .frames()
        .par_iter()
        .map(|frame| closure(frame, strategy))
        .collect::<Vec<_>>();
    info!(
        "closed {} frames of {} particles with {strategy:?}",
        frames.len(),
        direct.particles_count()
    );
    IndirectMatrix::from_checked(direct.particles_count(), frames)
}
