//! Partitioning of a catalog's row index domain into contiguous sub-jobs.
//!
//! Chunks are inclusive `[start, end]` intervals, not slices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chunking capability error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Inclusive row interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    pub fn new(start: u64, end: u64) -> Result<Self, ChunkError> {
        if start > end {
            return Err(ChunkError::InvalidArgument(format!(
                "chunk start {} is past its end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of rows covered.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; an inclusive interval holds at least one row.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Zero-padded `{start:06}-{end:06}` label used in file and job names.
    pub fn label(&self) -> String {
        format!("{:06}-{:06}", self.start, self.end)
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Split `[0, nrow-1]` into consecutive chunks of at most `nper` rows.
///
/// Every chunk holds exactly `nper` rows except possibly the last.
pub fn chunks(nrow: u64, nper: u64) -> Result<Vec<Chunk>, ChunkError> {
    if nper == 0 {
        return Err(ChunkError::InvalidArgument("nper must be positive".to_string()));
    }

    let nchunk = nrow.div_ceil(nper);
    let last = nrow.saturating_sub(1);

    Ok((0..nchunk)
        .map(|i| {
            let start = i * nper;
            let end = start.saturating_add(nper - 1).min(last);
            Chunk { start, end }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn splits_with_short_tail() {
        let got = chunks(250, 100).unwrap();
        let bounds: Vec<(u64, u64)> = got.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(bounds, vec![(0, 99), (100, 199), (200, 249)]);
    }

    #[test]
    fn exact_multiple_has_no_tail() {
        let got = chunks(200, 100).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1], Chunk { start: 100, end: 199 });
    }

    #[test]
    fn empty_catalog_yields_no_chunks() {
        assert!(chunks(0, 10).unwrap().is_empty());
    }

    #[test]
    fn single_row_catalog() {
        assert_eq!(chunks(1, 10).unwrap(), vec![Chunk { start: 0, end: 0 }]);
    }

    #[test]
    fn zero_nper_is_rejected() {
        assert!(matches!(chunks(10, 0), Err(ChunkError::InvalidArgument(_))));
    }

    #[test]
    fn label_is_zero_padded() {
        let chunk = Chunk::new(0, 119).unwrap();
        assert_eq!(chunk.label(), "000000-000119");
        assert_eq!(chunk.len(), 120);
    }

    #[test]
    fn top_of_range_does_not_overflow() {
        let half = u64::MAX / 2 + 1;
        let got = chunks(u64::MAX, half).unwrap();
        assert_eq!(
            got,
            vec![Chunk { start: 0, end: half - 1 }, Chunk { start: half, end: u64::MAX - 1 }]
        );

        let got = chunks(u64::MAX, u64::MAX).unwrap();
        assert_eq!(got, vec![Chunk { start: 0, end: u64::MAX - 1 }]);
    }

    #[test]
    fn reversed_bounds_are_rejected() {
        assert!(Chunk::new(5, 4).is_err());
    }

    proptest! {
        #[test]
        fn chunks_cover_domain_exactly(nrow in 0u64..5_000, nper in 1u64..700) {
            let got = chunks(nrow, nper).unwrap();

            prop_assert_eq!(got.len() as u64, nrow.div_ceil(nper));

            let mut next = 0u64;
            for chunk in &got {
                prop_assert_eq!(chunk.start, next);
                prop_assert!(chunk.end >= chunk.start);
                prop_assert!(chunk.len() <= nper);
                next = chunk.end + 1;
            }
            prop_assert_eq!(next, nrow);

            if let Some((last, full)) = got.split_last() {
                prop_assert!(full.iter().all(|c| c.len() == nper));
                prop_assert!(last.len() <= nper);
            }
        }

        #[test]
        fn chunks_near_u64_max_cover_domain(
            nrow in (u64::MAX - 1_000)..=u64::MAX,
            nper in (u64::MAX / 16)..=u64::MAX,
        ) {
            let got = chunks(nrow, nper).unwrap();

            prop_assert_eq!(got.len() as u64, nrow.div_ceil(nper));
            prop_assert_eq!(got[0].start, 0);
            prop_assert_eq!(got[got.len() - 1].end, nrow - 1);
            for pair in got.windows(2) {
                prop_assert_eq!(pair[1].start, pair[0].end + 1);
                prop_assert_eq!(pair[0].len(), nper);
            }
        }
    }
}
