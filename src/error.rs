use std::fmt;

/// Rejections raised at the entry of every pairing stage.
///
/// All variants describe invalid input; nothing in the pairing core is
/// retryable.
#[derive(Debug, Clone, PartialEq)]
pub enum PairingError {
    NegativeCutoff(f64),
    NotSquare {
        rows: usize,
        cols: usize,
    },
    NotBoolean {
        row: usize,
        col: usize,
        value: u8,
    },
    Asymmetric {
        row: usize,
        col: usize,
    },
    MissingSelfPairing(usize),
    NotTransitive {
        row: usize,
        col: usize,
    },
    ParticleCountMismatch {
        expected: usize,
        found: usize,
    },
    NotPartition {
        row: usize,
        set: usize,
    },
    Frame {
        index: usize,
        source: Box<PairingError>,
    },
}

impl PairingError {
    /// Every pairing error is an invalid input error.
    pub fn is_invalid_input(&self) -> bool {
        true
    }

    pub(crate) fn in_frame(self, index: usize) -> Self {
        Self::Frame {
            index,
            source: Box::new(self),
        }
    }
}

impl fmt::Display for PairingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeCutoff(cutoff) => write!(f, "invalid input: cutoff {cutoff} is negative"),
            Self::NotSquare { rows, cols } => {
                write!(f, "invalid input: matrix is {rows}x{cols}, not square")
            }
            Self::NotBoolean { row, col, value } => {
                write!(f, "invalid input: entry ({row}, {col}) is {value}, not 0 or 1")
            }
            Self::Asymmetric { row, col } => {
                write!(f, "invalid input: entries ({row}, {col}) and ({col}, {row}) differ")
            }
            Self::MissingSelfPairing(i) => {
                write!(f, "invalid input: diagonal entry ({i}, {i}) is 0")
            }
            Self::NotTransitive { row, col } => write!(
                f,
                "invalid input: pairing of particles {row} and {col} breaks transitivity"
            ),
            Self::ParticleCountMismatch { expected, found } => write!(
                f,
                "invalid input: expected {expected} particles, found {found}"
            ),
            Self::NotPartition { row, set } => write!(
                f,
                "invalid input: particle {row} belongs to {set} clusters instead of 1"
            ),
            Self::Frame { index, source } => write!(f, "frame {index}: {source}"),
        }
    }
}

impl std::error::Error for PairingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Frame { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
