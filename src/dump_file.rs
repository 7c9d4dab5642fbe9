use anyhow::{Context, Result};
use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::dump_snapshot::{DumpSnapshot, HEADER_NUM_OF_ATOMS, HEADER_TIMESTEP};
use crate::frame::Frame;

/// Snapshots of a LAMMPS text dump, ordered by timestep.
pub struct DumpFile {
    snapshots: BTreeMap<u64, DumpSnapshot>,
}

#[derive(Debug)]
pub enum DumpParsingError {
    InvalidOrMissingTimestep,
    InvalidOrMissingNumberOfAtoms,
    MissingSymBox,
    InvalidSymBox,
    MissingAtomKeys,
    DuplicateAtomKeys,
    DuplicateSnapshots,
    InvalidOrMissingAtomRow,
    MissingCoordinates,
    IO(io::Error),
}

impl std::fmt::Display for DumpParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for DumpParsingError {}

/// Non-blank lines of a dump. The first read error ends the stream and is
/// kept for the caller.
struct DumpLines<B> {
    lines: io::Lines<B>,
    error: Option<io::Error>,
}

impl<B: BufRead> Iterator for DumpLines<B> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        loop {
            match self.lines.next()? {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => return Some(line),
                Err(err) => {
                    self.error = Some(err);
                    return None;
                }
            }
        }
    }
}

impl DumpFile {
    pub fn read(path: &Path, timesteps: &[u64]) -> Result<Self> {
        let file = File::open(path).context(format!("Reading {}", path.to_string_lossy()))?;
        Self::from_reader(BufReader::new(file), timesteps)
            .context(format!("Parsing {}", path.to_string_lossy()))
    }

    /// Parses a dump keeping only `timesteps`, or every snapshot when the
    /// filter is empty. Input past the last requested timestep is not read.
    pub fn from_reader<R: BufRead>(reader: R, timesteps: &[u64]) -> Result<Self, DumpParsingError> {
        let mut lines = DumpLines {
            lines: reader.lines(),
            error: None,
        };
        let dump = Self::parse(&mut lines, timesteps);
        // a failed read ends the line stream early, so it outranks parse errors
        match lines.error.take() {
            Some(err) => Err(DumpParsingError::IO(err)),
            None => dump,
        }
    }

    fn parse<I>(lines: &mut I, timesteps: &[u64]) -> Result<Self, DumpParsingError>
    where
        I: Iterator<Item = String>,
    {
        let mut timesteps = timesteps.to_vec();
        timesteps.sort_unstable();

        let mut dump = Self {
            snapshots: BTreeMap::new(),
        };

        loop {
            let timestep = match lines.next() {
                None => break Ok(dump),
                Some(header) if header.trim() == HEADER_TIMESTEP => {
                    match lines.next().map(|s| s.trim().parse::<u64>()) {
                        Some(Ok(n)) => n,
                        _ => break Err(DumpParsingError::InvalidOrMissingTimestep),
                    }
                }
                Some(_) => break Err(DumpParsingError::InvalidOrMissingTimestep),
            };
            if timesteps.last().is_some_and(|&last| timestep > last) {
                break Ok(dump);
            }
            let number_of_atoms = match lines
                .next()
                .filter(|s| s.trim() == HEADER_NUM_OF_ATOMS)
                .zip(lines.next().map(|s| s.trim().parse::<usize>()))
            {
                Some((_, Ok(n))) => n,
                _ => break Err(DumpParsingError::InvalidOrMissingNumberOfAtoms),
            };
            if !timesteps.is_empty() && timesteps.binary_search(&timestep).is_err() {
                debug!("skipping timestep {timestep}");
                // box header, three box lines, atoms header, atom rows
                for _ in 0..(number_of_atoms + 5) {
                    if lines.next().is_none() {
                        break;
                    }
                }
                continue;
            }
            if dump.snapshots.contains_key(&timestep) {
                break Err(DumpParsingError::DuplicateSnapshots);
            }
            let snapshot = DumpSnapshot::read(lines, timestep, number_of_atoms)?;
            debug!("read timestep {timestep} with {number_of_atoms} atoms");
            dump.snapshots.insert(snapshot.step, snapshot);
        }
    }

    #[must_use]
    pub fn get_snapshots(&self) -> Vec<&DumpSnapshot> {
        self.snapshots.values().collect()
    }

    /// Every snapshot as a frame, in timestep order.
    pub fn get_frames(&self) -> Result<Vec<Frame>, DumpParsingError> {
        self.snapshots.values().map(DumpSnapshot::to_frame).collect()
    }
}
