use crate::error::{IndexError, QueryError, Result};
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 4] = b"BRFI";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

/// Flat vector index: exhaustive squared-L2 nearest-neighbor search over
/// row-major storage. Rows are appended during a build and never mutated
/// afterwards; incremental updates are not supported, rebuilds are wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_row(&mut self, row: &[f32]) -> Result<()> {
        if row.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                row: self.len(),
                expected: self.dimension,
                found: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        Ok(())
    }

    /// Exact nearest-neighbor search, closest first. Ties break on the lower
    /// row index so results are deterministic. Returns fewer than `top_k`
    /// rows when the index is smaller than `top_k`.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(usize, f32)>, QueryError> {
        if query.len() != self.dimension {
            return Err(QueryError::DimensionMismatch {
                expected: self.dimension,
                found: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(row, stored)| {
                let distance = stored
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f32>();
                (row, distance)
            })
            .collect();

        scored.sort_by(|left, right| {
            left.1
                .total_cmp(&right.1)
                .then_with(|| left.0.cmp(&right.0))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Serializes the index: a fixed header (magic, format version,
    /// dimension, row count) followed by little-endian f32 rows.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u32).to_le_bytes());
        for value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.len() < HEADER_LEN {
            return Err(IndexError::CorruptIndex(format!(
                "{}: shorter than header",
                path.display()
            )));
        }
        if &bytes[0..4] != MAGIC {
            return Err(IndexError::CorruptIndex(format!(
                "{}: bad magic",
                path.display()
            )));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != FORMAT_VERSION {
            return Err(IndexError::CorruptIndex(format!(
                "{}: unsupported format version {version}",
                path.display()
            )));
        }

        let dimension = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let rows = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        let expected_payload = dimension
            .checked_mul(rows)
            .and_then(|cells| cells.checked_mul(4))
            .ok_or_else(|| {
                IndexError::CorruptIndex(format!("{}: header overflows", path.display()))
            })?;

        let payload = &bytes[HEADER_LEN..];
        if payload.len() != expected_payload {
            return Err(IndexError::CorruptIndex(format!(
                "{}: expected {} payload bytes, found {}",
                path.display(),
                expected_payload,
                payload.len()
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|cell| f32::from_le_bytes([cell[0], cell[1], cell[2], cell[3]]))
            .collect();

        Ok(Self { dimension, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_index() -> FlatIndex {
        let mut index = FlatIndex::new(3);
        index.add_row(&[1.0, 0.0, 0.0]).unwrap();
        index.add_row(&[0.0, 1.0, 0.0]).unwrap();
        index.add_row(&[0.0, 0.0, 1.0]).unwrap();
        index
    }

    #[test]
    fn search_returns_ascending_distances() {
        let index = sample_index();
        let hits = index.search(&[0.9, 0.1, 0.0], 3).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].0, 0);
        assert!(hits[0].1 <= hits[1].1 && hits[1].1 <= hits[2].1);
    }

    #[test]
    fn search_caps_results_at_index_size() {
        let index = sample_index();
        let hits = index.search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn equidistant_rows_tie_break_on_row_order() {
        let mut index = FlatIndex::new(2);
        index.add_row(&[1.0, 0.0]).unwrap();
        index.add_row(&[0.0, 1.0]).unwrap();

        let hits = index.search(&[0.5, 0.5], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn mismatched_query_dimension_is_rejected() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(QueryError::DimensionMismatch {
                expected: 3,
                found: 2
            })
        ));
    }

    #[test]
    fn mismatched_row_dimension_is_rejected() {
        let mut index = FlatIndex::new(3);
        assert!(matches!(
            index.add_row(&[1.0, 2.0]),
            Err(IndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn write_and_read_round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("flat.index");
        let index = sample_index();

        index.write_to(&path)?;
        let reloaded = FlatIndex::read_from(&path)?;
        assert_eq!(reloaded, index);
        Ok(())
    }

    #[test]
    fn truncated_file_is_reported_as_corrupt() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("flat.index");
        let index = sample_index();
        index.write_to(&path)?;

        let bytes = std::fs::read(&path)?;
        std::fs::write(&path, &bytes[..bytes.len() - 3])?;

        assert!(matches!(
            FlatIndex::read_from(&path),
            Err(IndexError::CorruptIndex(_))
        ));
        Ok(())
    }

    #[test]
    fn garbage_file_is_reported_as_corrupt() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("flat.index");
        std::fs::write(&path, b"definitely not an index file")?;

        assert!(matches!(
            FlatIndex::read_from(&path),
            Err(IndexError::CorruptIndex(_))
        ));
        Ok(())
    }
}
