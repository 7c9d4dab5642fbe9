use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;

use crate::matrix::Correlation;

/// Cluster count and per-cluster population of one reduced matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    sizes: Vec<usize>,
}

impl ClusterSummary {
    pub fn from_reduced(reduced: &Correlation) -> Self {
        let sizes = reduced
            .column_iter()
            .map(|column| column.iter().filter(|&&v| v == 1).count())
            .collect();
        Self { sizes }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Sizes in column order.
    #[inline]
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn largest(&self) -> Option<usize> {
        self.sizes.iter().copied().max()
    }

    pub fn mean_size(&self) -> Option<f64> {
        if self.sizes.is_empty() {
            return None;
        }
        Some(self.sizes.iter().sum::<usize>() as f64 / self.sizes.len() as f64)
    }

    /// Number of clusters of each size.
    pub fn size_histogram(&self) -> BTreeMap<usize, usize> {
        self.sizes.iter().copied().counts().into_iter().collect()
    }
}

impl fmt::Display for ClusterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.count(), self.sizes.iter().join(" "))
    }
}
