use log::{debug, info};
use rayon::prelude::*;

use crate::direct::{check_cutoff_value, direct_correlation, generate_direct_correlation};
use crate::error::PairingError;
use crate::frame::Frame;
use crate::indirect::{closure, generate_indirect_connectivity, ClosureStrategy};
use crate::matrix::{Correlation, DirectMatrix, IndirectMatrix, ReducedMatrix};
use crate::reduce::{generate_reduced_matrix, reduce, ColumnOrder};
use crate::summary::ClusterSummary;

/// All matrices computed for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClusters {
    pub step: u64,
    pub direct: Correlation,
    pub indirect: Correlation,
    pub reduced: Correlation,
    pub summary: ClusterSummary,
}

/// Cluster analysis settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pairing {
    cutoff: f64,
    strategy: ClosureStrategy,
    order: ColumnOrder,
}

impl Pairing {
    pub fn new(cutoff: f64) -> Result<Self, PairingError> {
        check_cutoff_value(cutoff)?;
        Ok(Self {
            cutoff,
            strategy: ClosureStrategy::default(),
            order: ColumnOrder::default(),
        })
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ClosureStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: ColumnOrder) -> Self {
        self.order = order;
        self
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn analyze_frame(&self, frame: &Frame) -> Result<FrameClusters, PairingError> {
        // the builder's output already holds the direct invariants
        let direct = direct_correlation(frame.positions(), self.cutoff)?;
        let indirect = closure(&direct, self.strategy);
        let reduced = reduce(&indirect, self.order);
        let summary = ClusterSummary::from_reduced(&reduced);
        debug!("step {}: {} clusters", frame.step, summary.count());
        Ok(FrameClusters {
            step: frame.step,
            direct,
            indirect,
            reduced,
            summary,
        })
    }

    /// Analyzes every frame on its own. A failing frame yields its error in
    /// place and does not affect the others.
    pub fn analyze_frames(&self, frames: &[Frame]) -> Vec<Result<FrameClusters, PairingError>> {
        let results = frames
            .par_iter()
            .enumerate()
            .map(|(index, frame)| self.analyze_frame(frame).map_err(|e| e.in_frame(index)))
            .collect::<Vec<_>>();
        info!(
            "analyzed {} frames, {} failed",
            results.len(),
            results.iter().filter(|r| r.is_err()).count()
        );
        results
    }

    /// Stacked matrices of a homogeneous batch. Fails on the first invalid
    /// frame.
    pub fn generate(
        &self,
        frames: &[Frame],
    ) -> Result<(DirectMatrix, IndirectMatrix, ReducedMatrix), PairingError> {
        let direct = generate_direct_correlation(frames, self.cutoff)?;
        let indirect = generate_indirect_connectivity(&direct, self.strategy);
        let reduced = generate_reduced_matrix(&indirect, self.order);
        Ok((direct, indirect, reduced))
    }
}
