use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::sequence::reverse_complement;
use crate::models::{DbId, SequenceProvider, Slice, Strand};
use crate::utils::errors::TxError;

/// An exon, a contiguous transcribed genomic segment
///
/// `start` is always lower or equal than `end`, regardless of the strand.
/// Exons are values: copying an exon into another transcript never
/// links the two transcripts in memory. Two exons describe the same genomic
/// feature if their [`hashkey`](`Exon::hashkey`)s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exon {
    db_id: Option<DbId>,
    stable_id: Option<String>,
    version: Option<u32>,
    slice: Slice,
    start: i64,
    end: i64,
    strand: Strand,
    phase: i8,
    end_phase: i8,
}

impl Exon {
    /// Creates a new, non-coding exon (phase and end phase `-1`)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use txdb::models::{CoordSystem, Exon, Slice, Strand};
    ///
    /// let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 1000);
    /// let exon = Exon::new(slice, 100, 150, Strand::Plus).unwrap();
    /// assert_eq!(exon.length(), 51);
    /// ```
    pub fn new(slice: Slice, start: i64, end: i64, strand: Strand) -> Result<Self, TxError> {
        if start > end {
            return Err(TxError::validation(format!(
                "exon start {} is after its end {}",
                start, end
            )));
        }
        Ok(Exon {
            db_id: None,
            stable_id: None,
            version: None,
            slice,
            start,
            end,
            strand,
            phase: -1,
            end_phase: -1,
        })
    }

    /// Sets phase and end phase, each one of `-1`, `0`, `1` or `2`
    pub fn with_phase(mut self, phase: i8, end_phase: i8) -> Result<Self, TxError> {
        for p in [phase, end_phase] {
            if !(-1..=2).contains(&p) {
                return Err(TxError::validation(format!("invalid exon phase {}", p)));
            }
        }
        self.phase = phase;
        self.end_phase = end_phase;
        Ok(self)
    }

    pub fn with_stable_id<S: Into<String>>(mut self, stable_id: S, version: u32) -> Self {
        self.stable_id = Some(stable_id.into());
        self.version = Some(version);
        self
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn set_db_id(&mut self, id: Option<DbId>) {
        self.db_id = id;
    }

    pub fn stable_id(&self) -> Option<&str> {
        self.stable_id.as_deref()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn slice(&self) -> &Slice {
        &self.slice
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

    pub fn phase(&self) -> i8 {
        self.phase
    }

    pub fn end_phase(&self) -> i8 {
        self.end_phase
    }

    /// Number of nucleotides in the exon
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Returns true if both exons share at least one position
    pub fn overlaps(&self, other: &Exon) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the structural identity of the exon
    ///
    /// The key combines slice, coordinates, strand and phases. It is used
    /// to find an exon again after it was copied, e.g. to resolve the exons of
    /// a [`Translation`](`crate::models::Translation`) against the exons of its transcript.
    pub fn hashkey(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.slice.name(),
            self.start,
            self.end,
            self.strand.as_int(),
            self.phase,
            self.end_phase
        )
    }

    /// Returns the absolute seq-region coordinates of the exon
    pub fn seq_region_location(&self) -> (i64, i64, Strand) {
        self.slice.to_seq_region(self.start, self.end, self.strand)
    }

    /// Returns the exon's nucleotide sequence, read on the exon's strand
    ///
    /// Returns `None` if the provider cannot resolve the sequence.
    pub fn seq(&self, provider: &dyn SequenceProvider) -> Option<String> {
        let (start, end, strand) = self.seq_region_location();
        let seq = provider.fetch_sequence(&self.slice, start, end)?;
        if seq.len() as i64 != self.length() {
            return None;
        }
        match strand {
            Strand::Plus => Some(seq),
            Strand::Minus => Some(reverse_complement(&seq)),
        }
    }

    /// Returns a copy of the exon with both ends moved by the given number of
    /// nucleotides, in the direction of transcription
    ///
    /// A positive `start_adjust` shortens the exon at its 5' end, a negative
    /// `end_adjust` shortens it at its 3' end. The copy is not stored.
    pub fn adjust_start_end(&self, start_adjust: i64, end_adjust: i64) -> Exon {
        let mut exon = self.clone();
        exon.db_id = None;
        match self.strand {
            Strand::Plus => {
                exon.start += start_adjust;
                exon.end += end_adjust;
            }
            Strand::Minus => {
                exon.start -= end_adjust;
                exon.end -= start_adjust;
            }
        }
        exon
    }

    /// Re-expresses the exon on another slice of the same seq region
    ///
    /// Returns `None` if the slice is on another seq region or does not contain the exon.
    pub fn transfer(&self, target: &Slice) -> Option<Exon> {
        if !self.slice.is_same_region(target) {
            return None;
        }
        let (start, end, strand) = self.seq_region_location();
        if !target.contains_seq_region(start, end) {
            return None;
        }
        let (start, end, strand) = target.from_seq_region(start, end, strand);
        let mut exon = self.clone();
        exon.slice = target.clone();
        exon.start = start;
        exon.end = end;
        exon.strand = strand;
        Some(exon)
    }
}

impl fmt::Display for Exon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.slice.seq_region_name(),
            self.start,
            self.end,
            self.strand
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoordSystem;
    use std::collections::HashMap;

    fn chrom(len: i64) -> Slice {
        Slice::whole(CoordSystem::new("chromosome", Some("GRCh38")), "1", len)
    }

    #[test]
    fn test_invalid_exon() {
        assert!(Exon::new(chrom(100), 20, 10, Strand::Plus).is_err());
        let exon = Exon::new(chrom(100), 10, 20, Strand::Plus).unwrap();
        assert!(exon.clone().with_phase(3, 0).is_err());
        assert!(exon.with_phase(0, 2).is_ok());
    }

    #[test]
    fn test_hashkey() {
        let a = Exon::new(chrom(100), 10, 20, Strand::Plus).unwrap();
        let mut b = a.clone();
        b.set_db_id(Some(12));
        assert_eq!(a.hashkey(), b.hashkey());
        assert_eq!(a.hashkey(), "chromosome:GRCh38:1:1:100:1-10-20-1--1--1");

        let c = a.clone().with_phase(0, 1).unwrap();
        assert_ne!(a.hashkey(), c.hashkey());
    }

    #[test]
    fn test_sequence() {
        let mut seqs = HashMap::new();
        seqs.insert("1".to_string(), "AAAACCCCGGGGTTTT".to_string());
        let fwd = Exon::new(chrom(16), 3, 6, Strand::Plus).unwrap();
        assert_eq!(fwd.seq(&seqs).unwrap(), "AACC");

        let rev = Exon::new(chrom(16), 3, 6, Strand::Minus).unwrap();
        assert_eq!(rev.seq(&seqs).unwrap(), "GGTT");

        let outside = Exon::new(chrom(100), 10, 20, Strand::Plus).unwrap();
        assert_eq!(outside.seq(&seqs), None);
    }

    #[test]
    fn test_adjust_start_end() {
        let fwd = Exon::new(chrom(100), 10, 20, Strand::Plus).unwrap();
        let adjusted = fwd.adjust_start_end(2, -3);
        assert_eq!((adjusted.start(), adjusted.end()), (12, 17));

        let rev = Exon::new(chrom(100), 10, 20, Strand::Minus).unwrap();
        let adjusted = rev.adjust_start_end(2, -3);
        assert_eq!((adjusted.start(), adjusted.end()), (13, 18));
    }

    #[test]
    fn test_transfer() {
        let exon = Exon::new(chrom(1000), 150, 160, Strand::Plus).unwrap();
        let window = Slice::new(
            CoordSystem::new("chromosome", Some("GRCh38")),
            "1",
            101,
            200,
            Strand::Minus,
            1000,
        )
        .unwrap();
        let moved = exon.transfer(&window).unwrap();
        assert_eq!((moved.start(), moved.end(), moved.strand()), (41, 51, Strand::Minus));
        assert_eq!(moved.seq_region_location(), exon.seq_region_location());

        let small = Slice::new(
            CoordSystem::new("chromosome", Some("GRCh38")),
            "1",
            155,
            200,
            Strand::Plus,
            1000,
        )
        .unwrap();
        assert!(exon.transfer(&small).is_none());

        let other = Slice::whole(CoordSystem::new("chromosome", Some("GRCh38")), "2", 1000);
        assert!(exon.transfer(&other).is_none());
    }
}
