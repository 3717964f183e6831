use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{DbId, Strand};
use crate::utils::errors::TxError;

/// A coordinate system, e.g. `chromosome` of assembly `GRCh38`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordSystem {
    pub name: String,
    pub version: Option<String>,
}

impl CoordSystem {
    pub fn new<S: Into<String>>(name: S, version: Option<&str>) -> Self {
        CoordSystem {
            name: name.into(),
            version: version.map(|v| v.to_string()),
        }
    }
}

impl fmt::Display for CoordSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.name,
            self.version.as_deref().unwrap_or_default()
        )
    }
}

/// A window onto a seq region, the coordinate reference of all features
///
/// Features placed on a slice use slice-relative coordinates: position `1` is
/// the first base of the slice, read on the slice's strand.
///
/// # Examples
///
/// ```rust
/// use txdb::models::{CoordSystem, Slice, Strand};
///
/// let chrom = CoordSystem::new("chromosome", Some("GRCh38"));
/// let slice = Slice::new(chrom, "1", 101, 200, Strand::Plus, 1000).unwrap();
/// assert_eq!(slice.name(), "chromosome:GRCh38:1:101:200:1");
///
/// // position 1 on the slice is position 101 on the chromosome
/// assert_eq!(slice.to_seq_region(1, 10, Strand::Plus), (101, 110, Strand::Plus));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slice {
    coord_system: CoordSystem,
    seq_region_name: String,
    seq_region_id: Option<DbId>,
    seq_region_length: i64,
    start: i64,
    end: i64,
    strand: Strand,
}

impl Slice {
    /// Creates a new slice on a seq region
    ///
    /// `start` and `end` are absolute seq-region coordinates and must lie
    /// within `1..=seq_region_length`.
    pub fn new<S: Into<String>>(
        coord_system: CoordSystem,
        seq_region_name: S,
        start: i64,
        end: i64,
        strand: Strand,
        seq_region_length: i64,
    ) -> Result<Self, TxError> {
        if start < 1 || start > end || end > seq_region_length {
            return Err(TxError::validation(format!(
                "slice {}-{} is not within seq region of length {}",
                start, end, seq_region_length
            )));
        }
        Ok(Slice {
            coord_system,
            seq_region_name: seq_region_name.into(),
            seq_region_id: None,
            seq_region_length,
            start,
            end,
            strand,
        })
    }

    /// Creates a slice spanning a whole seq region on the forward strand
    pub fn whole<S: Into<String>>(
        coord_system: CoordSystem,
        seq_region_name: S,
        seq_region_length: i64,
    ) -> Self {
        Slice {
            coord_system,
            seq_region_name: seq_region_name.into(),
            seq_region_id: None,
            seq_region_length,
            start: 1,
            end: seq_region_length,
            strand: Strand::Plus,
        }
    }

    /// Sets the surrogate id of the seq region in the store
    pub fn with_seq_region_id(mut self, id: DbId) -> Self {
        self.seq_region_id = Some(id);
        self
    }

    pub fn coord_system(&self) -> &CoordSystem {
        &self.coord_system
    }

    pub fn seq_region_name(&self) -> &str {
        &self.seq_region_name
    }

    pub fn seq_region_id(&self) -> Option<DbId> {
        self.seq_region_id
    }

    pub fn seq_region_length(&self) -> i64 {
        self.seq_region_length
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Returns the canonical name `coord_system:version:seq_region:start:end:strand`
    pub fn name(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.coord_system,
            self.seq_region_name,
            self.start,
            self.end,
            self.strand.as_int()
        )
    }

    /// Returns true if both slices are windows onto the same seq region
    pub fn is_same_region(&self, other: &Slice) -> bool {
        self.seq_region_name == other.seq_region_name && self.coord_system == other.coord_system
    }

    /// Returns true if both slices cover the same window of the same seq region
    ///
    /// The stored seq region id is ignored, a slice built in memory is at the
    /// same location as its fetched copy.
    pub fn is_same_location(&self, other: &Slice) -> bool {
        self.is_same_region(other)
            && self.start == other.start
            && self.end == other.end
            && self.strand == other.strand
    }

    /// Converts slice-relative coordinates into absolute seq-region coordinates
    pub fn to_seq_region(&self, start: i64, end: i64, strand: Strand) -> (i64, i64, Strand) {
        match self.strand {
            Strand::Plus => (self.start + start - 1, self.start + end - 1, strand),
            Strand::Minus => (
                self.end - end + 1,
                self.end - start + 1,
                strand.reverse(),
            ),
        }
    }

    /// Converts absolute seq-region coordinates into slice-relative coordinates
    pub fn from_seq_region(&self, start: i64, end: i64, strand: Strand) -> (i64, i64, Strand) {
        match self.strand {
            Strand::Plus => (start - self.start + 1, end - self.start + 1, strand),
            Strand::Minus => (
                self.end - end + 1,
                self.end - start + 1,
                strand.reverse(),
            ),
        }
    }

    /// Returns true if the absolute interval lies completely within the slice
    pub fn contains_seq_region(&self, start: i64, end: i64) -> bool {
        start >= self.start && end <= self.end
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Provides the nucleotide sequence of seq regions
///
/// `start` and `end` are absolute (1-based, inclusive) coordinates on the seq
/// region of `slice`. The returned sequence is always the forward strand.
/// `None` means that the sequence is not available.
pub trait SequenceProvider {
    fn fetch_sequence(&self, slice: &Slice, start: i64, end: i64) -> Option<String>;
}

/// In-memory sequences keyed by seq region name
impl SequenceProvider for HashMap<String, String> {
    fn fetch_sequence(&self, slice: &Slice, start: i64, end: i64) -> Option<String> {
        let seq = self.get(slice.seq_region_name())?;
        if start < 1 || start > end || end as usize > seq.len() {
            return None;
        }
        seq.get(start as usize - 1..end as usize).map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrom() -> CoordSystem {
        CoordSystem::new("chromosome", Some("GRCh38"))
    }

    #[test]
    fn test_slice_name() {
        let slice = Slice::whole(chrom(), "X", 500);
        assert_eq!(slice.name(), "chromosome:GRCh38:X:1:500:1");
        let scaffold = Slice::whole(CoordSystem::new("scaffold", None), "sc1", 20);
        assert_eq!(scaffold.name(), "scaffold::sc1:1:20:1");
    }

    #[test]
    fn test_same_location() {
        let slice = Slice::whole(chrom(), "1", 1000);
        assert!(slice.is_same_location(&slice.clone().with_seq_region_id(3)));
        assert_ne!(slice, slice.clone().with_seq_region_id(3));

        let window = Slice::new(chrom(), "1", 1, 500, Strand::Plus, 1000).unwrap();
        assert!(slice.is_same_region(&window));
        assert!(!slice.is_same_location(&window));
        assert!(!slice.is_same_location(&Slice::whole(chrom(), "2", 1000)));
    }

    #[test]
    fn test_invalid_slice() {
        assert!(Slice::new(chrom(), "1", 0, 10, Strand::Plus, 100).is_err());
        assert!(Slice::new(chrom(), "1", 20, 10, Strand::Plus, 100).is_err());
        assert!(Slice::new(chrom(), "1", 20, 101, Strand::Plus, 100).is_err());
    }

    #[test]
    fn test_minus_strand_conversion() {
        let slice = Slice::new(chrom(), "1", 101, 200, Strand::Minus, 1000).unwrap();
        // position 1 of the slice is the last base of the window
        assert_eq!(
            slice.to_seq_region(1, 10, Strand::Plus),
            (191, 200, Strand::Minus)
        );
        assert_eq!(
            slice.from_seq_region(191, 200, Strand::Minus),
            (1, 10, Strand::Plus)
        );
    }

    #[test]
    fn test_hashmap_provider() {
        let mut seqs = HashMap::new();
        seqs.insert("1".to_string(), "ACGTACGTAC".to_string());
        let slice = Slice::whole(chrom(), "1", 10);
        assert_eq!(seqs.fetch_sequence(&slice, 2, 4), Some("CGT".to_string()));
        assert_eq!(seqs.fetch_sequence(&slice, 8, 11), None);
        let other = Slice::whole(chrom(), "2", 10);
        assert_eq!(seqs.fetch_sequence(&other, 2, 4), None);
    }
}
