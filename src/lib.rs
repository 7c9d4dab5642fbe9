mod direct;
mod dump_file;
mod dump_snapshot;
mod error;
mod frame;
mod indirect;
mod matrix;
mod pipeline;
mod reduce;
mod summary;
mod xyz;

pub use direct::{direct_correlation, direct_pairs, generate_direct_correlation};
pub use dump_file::{DumpFile, DumpParsingError};
pub use dump_snapshot::{DumpSnapshot, SymBox};
pub use error::PairingError;
pub use frame::Frame;
pub use indirect::{
    component_labels, generate_indirect_connectivity, indirect_connectivity, ClosureStrategy,
};
pub use matrix::{Correlation, DirectMatrix, IndirectMatrix, ReducedMatrix};
pub use pipeline::{FrameClusters, Pairing};
pub use reduce::{cluster_of, generate_reduced_matrix, reduce_indirect, ColumnOrder};
pub use summary::ClusterSummary;
pub use xyz::{check_cutoff, XYZ};
