use std::collections::HashMap;
use std::fmt;

use crate::dump_file::DumpParsingError;
use crate::frame::Frame;
use crate::xyz::XYZ;

pub(crate) const HEADER_TIMESTEP: &str = "ITEM: TIMESTEP";
pub(crate) const HEADER_NUM_OF_ATOMS: &str = "ITEM: NUMBER OF ATOMS";
const HEADER_SYM_BOX: &str = "ITEM: BOX BOUNDS";
const HEADER_ATOMS: &str = "ITEM: ATOMS";

const COORDINATE_KEYS: [[&str; 3]; 2] = [["x", "y", "z"], ["xu", "yu", "zu"]];
const SCALED_COORDINATE_KEYS: [&str; 3] = ["xs", "ys", "zs"];

#[derive(Debug, Clone, PartialEq)]
pub struct SymBox {
    pub boundaries: String,
    pub xlo: f64,
    pub xhi: f64,
    pub ylo: f64,
    pub yhi: f64,
    pub zlo: f64,
    pub zhi: f64,
}

impl SymBox {
    fn read<I>(lines: &mut I) -> Result<Self, DumpParsingError>
    where
        I: Iterator<Item = String>,
    {
        let boundaries = match lines
            .next()
            .as_deref()
            .and_then(|l| l.split_at_checked(HEADER_SYM_BOX.len()))
        {
            Some((HEADER_SYM_BOX, boundaries)) => boundaries.trim().to_string(),
            _ => return Err(DumpParsingError::MissingSymBox),
        };
        let mut bounds = [(0.0, 0.0); 3];
        for bound in bounds.iter_mut() {
            // triclinic boxes carry a trailing tilt factor, ignored here
            *bound = lines
                .next()
                .and_then(|l| {
                    let mut values = l.split_whitespace().map(str::parse::<f64>);
                    match (values.next(), values.next()) {
                        (Some(Ok(lo)), Some(Ok(hi))) => Some((lo, hi)),
                        _ => None,
                    }
                })
                .ok_or(DumpParsingError::InvalidSymBox)?;
        }
        let [(xlo, xhi), (ylo, yhi), (zlo, zhi)] = bounds;
        Ok(Self {
            boundaries,
            xlo,
            xhi,
            ylo,
            yhi,
            zlo,
            zhi,
        })
    }

    pub fn lengths(&self) -> [f64; 3] {
        [
            self.xhi - self.xlo,
            self.yhi - self.ylo,
            self.zhi - self.zlo,
        ]
    }

    pub fn volume(&self) -> f64 {
        self.lengths().iter().product()
    }
}

#[derive(Clone)]
pub struct DumpSnapshot {
    pub step: u64,
    pub atoms_count: usize,
    pub sym_box: SymBox,
    keys: HashMap<String, usize>,
    atoms: Vec<f64>,
}

impl DumpSnapshot {
    pub(crate) fn read<I>(lines: &mut I, step: u64, atoms_count: usize) -> Result<Self, DumpParsingError>
    where
        I: Iterator<Item = String>,
    {
        let sym_box = SymBox::read(lines)?;
        let mut keys = HashMap::new();
        match lines
            .next()
            .as_deref()
            .and_then(|l| l.split_at_checked(HEADER_ATOMS.len()))
        {
            Some((HEADER_ATOMS, names)) if !names.trim().is_empty() => {
                for key in names.split_whitespace() {
                    if keys.insert(key.to_string(), keys.len()).is_some() {
                        return Err(DumpParsingError::DuplicateAtomKeys);
                    }
                }
            }
            _ => return Err(DumpParsingError::MissingAtomKeys),
        }
        let mut atoms = vec![0.0; atoms_count * keys.len()];
        for i in 0..atoms_count {
            let values = lines
                .next()
                .ok_or(DumpParsingError::InvalidOrMissingAtomRow)?
                .split_whitespace()
                .map(str::parse::<f64>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| DumpParsingError::InvalidOrMissingAtomRow)?;
            if values.len() != keys.len() {
                return Err(DumpParsingError::InvalidOrMissingAtomRow);
            }
            for (j, val) in values.into_iter().enumerate() {
                atoms[atoms_count * j + i] = val;
            }
        }
        Ok(Self {
            step,
            atoms_count,
            sym_box,
            keys,
            atoms,
        })
    }

    pub fn get_keys(&self) -> Vec<&String> {
        let mut entries: Vec<(&String, &usize)> = self.keys.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1));
        entries.into_iter().map(|i| i.0).collect()
    }

    pub fn get_property(&self, key: &str) -> Option<&[f64]> {
        let start = self.keys.get(key)? * self.atoms_count;
        let end = start + self.atoms_count;
        Some(&self.atoms[start..end])
    }

    fn get_columns(&self, keys: [&str; 3]) -> Option<[&[f64]; 3]> {
        Some([
            self.get_property(keys[0])?,
            self.get_property(keys[1])?,
            self.get_property(keys[2])?,
        ])
    }

    /// Atom positions in row order, read from unscaled or scaled columns.
    pub fn get_coordinates(&self) -> Result<Vec<XYZ>, DumpParsingError> {
        let unscaled = COORDINATE_KEYS
            .iter()
            .find_map(|&keys| self.get_columns(keys));
        let (columns, scale) = match unscaled {
            Some(columns) => (columns, None),
            None => (
                self.get_columns(SCALED_COORDINATE_KEYS)
                    .ok_or(DumpParsingError::MissingCoordinates)?,
                Some((
                    [self.sym_box.xlo, self.sym_box.ylo, self.sym_box.zlo],
                    self.sym_box.lengths(),
                )),
            ),
        };
        let [x, y, z] = columns;
        Ok((0..self.atoms_count)
            .map(|i| {
                let mut coords = [x[i], y[i], z[i]];
                if let Some((lo, len)) = scale {
                    for k in 0..3 {
                        coords[k] = lo[k] + coords[k] * len[k];
                    }
                }
                XYZ::from(coords, i)
            })
            .collect())
    }

    pub fn to_frame(&self) -> Result<Frame, DumpParsingError> {
        Ok(Frame::new(self.step, self.get_coordinates()?))
    }
}

impl fmt::Debug for DumpSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpSnapshot")
            .field("step", &self.step)
            .field("atoms_count", &self.atoms_count)
            .field("keys", &self.get_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_f64_near;

    fn lines(text: &str) -> impl Iterator<Item = String> + '_ {
        text.lines().map(str::to_string)
    }

    #[test]
    fn test_read_snapshot() {
        let text = "\
ITEM: BOX BOUNDS pp pp pp
0.0 10.0
-5.0 5.0
0.0 4.0
ITEM: ATOMS id type x y z
1 1 0.5 0.0 1.0
2 1 1.5 -1.0 2.0
";
        let snapshot = DumpSnapshot::read(&mut lines(text), 7, 2).unwrap();
        assert_eq!(snapshot.sym_box.boundaries, "pp pp pp");
        assert_f64_near!(snapshot.sym_box.volume(), 400.0);
        assert_eq!(snapshot.get_keys(), vec!["id", "type", "x", "y", "z"]);
        assert_eq!(snapshot.get_property("id"), Some(&[1.0, 2.0][..]));
        assert!(snapshot.get_property("vx").is_none());
        let frame = snapshot.to_frame().unwrap();
        assert_eq!(frame.step, 7);
        assert_eq!(frame.positions()[1], XYZ::from([1.5, -1.0, 2.0], 1));
    }

    #[test]
    fn test_scaled_coordinates() {
        let text = "\
ITEM: BOX BOUNDS pp pp pp
0.0 10.0
-5.0 5.0
2.0 4.0
ITEM: ATOMS id xs ys zs
1 0.5 0.5 0.25
";
        let snapshot = DumpSnapshot::read(&mut lines(text), 0, 1).unwrap();
        let coords = snapshot.get_coordinates().unwrap();
        assert_f64_near!(coords[0].x(), 5.0);
        assert_f64_near!(coords[0].y(), 0.0);
        assert_f64_near!(coords[0].z(), 2.5);
    }

    #[test]
    fn test_missing_coordinates() {
        let text = "\
ITEM: BOX BOUNDS pp pp pp
0 1
0 1
0 1
ITEM: ATOMS id x y
1 0.5 0.5
";
        let snapshot = DumpSnapshot::read(&mut lines(text), 0, 1).unwrap();
        assert!(matches!(
            snapshot.get_coordinates(),
            Err(DumpParsingError::MissingCoordinates)
        ));
    }

    #[test]
    fn test_malformed_snapshots() {
        let no_box = "ITEM: ATOMS id x y z\n";
        assert!(matches!(
            DumpSnapshot::read(&mut lines(no_box), 0, 0),
            Err(DumpParsingError::MissingSymBox)
        ));
        let bad_box = "ITEM: BOX BOUNDS pp pp pp\n0 1\n0 one\n0 1\n";
        assert!(matches!(
            DumpSnapshot::read(&mut lines(bad_box), 0, 0),
            Err(DumpParsingError::InvalidSymBox)
        ));
        let duplicate = "ITEM: BOX BOUNDS pp pp pp\n0 1\n0 1\n0 1\nITEM: ATOMS id x x\n";
        assert!(matches!(
            DumpSnapshot::read(&mut lines(duplicate), 0, 0),
            Err(DumpParsingError::DuplicateAtomKeys)
        ));
        let short_row = "ITEM: BOX BOUNDS pp pp pp\n0 1\n0 1\n0 1\nITEM: ATOMS id x y z\n1 0.0 0.0\n";
        assert!(matches!(
            DumpSnapshot::read(&mut lines(short_row), 0, 1),
            Err(DumpParsingError::InvalidOrMissingAtomRow)
        ));
    }
}
