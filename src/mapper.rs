//! Coordinate mapping between the genomic, cDNA and peptide space of one transcript
//!
//! | Space | Basis | Origin |
//! | --- | --- | --- |
//! | Genomic | 1-based, inclusive | the slice the exons are placed on |
//! | cDNA | 1-based, inclusive | first base of the spliced (unedited) transcript |
//! | CDS | 1-based, inclusive | first coding base (`cdna_coding_start`) |
//! | Peptide | 1-based, inclusive | first amino acid |
//!
//! A [`TranscriptMapper`] is built from the ordered exon list of a transcript.
//! It holds one [`MapperPair`] per exon. The mapper does not change after
//! it is built; the [`Transcript`](`crate::models::Transcript`) drops and
//! rebuilds it whenever its exons change.
//!
//! All queries return a list of [`Mapped`] results. Portions of a query that
//! have no counterpart in the target space (introns, positions outside the
//! transcript) are reported as [`Mapped::Gap`] and never silently dropped.
//!
//! ```rust
//! use txdb::mapper::{Mapped, Space};
//! use txdb::models::Strand;
//! use txdb::tests::transcripts::standard_transcript;
//!
//! let tx = standard_transcript();
//!
//! // exons 100-150 and 200-260 on the plus strand
//! let res = tx.mapper().genomic_to_cdna(150, 200, Strand::Plus).unwrap();
//! assert_eq!(res, vec![
//!     Mapped::Coordinate { start: 51, end: 51, strand: Strand::Plus, space: Space::Cdna },
//!     Mapped::Gap { start: 151, end: 199 },
//!     Mapped::Coordinate { start: 52, end: 52, strand: Strand::Plus, space: Space::Cdna },
//! ]);
//! ```
use std::fmt;

use crate::models::{Exon, Strand};
use crate::utils::errors::TxError;

/// The coordinate space of a [`Mapped::Coordinate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Genomic,
    Cdna,
    Peptide,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Space::Genomic => "genomic",
                Space::Cdna => "cdna",
                Space::Peptide => "peptide",
            }
        )
    }
}

/// One piece of a mapping result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapped {
    /// A range in the target space
    Coordinate {
        start: i64,
        end: i64,
        strand: Strand,
        space: Space,
    },
    /// A range of the query without counterpart in the target space,
    /// expressed in the coordinates of the query
    Gap { start: i64, end: i64 },
}

impl Mapped {
    pub fn is_gap(&self) -> bool {
        matches!(self, Mapped::Gap { .. })
    }

    pub fn start(&self) -> i64 {
        match self {
            Mapped::Coordinate { start, .. } | Mapped::Gap { start, .. } => *start,
        }
    }

    pub fn end(&self) -> i64 {
        match self {
            Mapped::Coordinate { end, .. } | Mapped::Gap { end, .. } => *end,
        }
    }

    pub fn length(&self) -> i64 {
        self.end() - self.start() + 1
    }
}

/// The genomic and the cDNA interval of one exon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperPair {
    pub genomic_start: i64,
    pub genomic_end: i64,
    pub cdna_start: i64,
    pub cdna_end: i64,
    pub strand: Strand,
}

impl MapperPair {
    fn genomic_to_cdna(&self, start: i64, end: i64) -> (i64, i64) {
        match self.strand {
            Strand::Plus => (
                self.cdna_start + start - self.genomic_start,
                self.cdna_start + end - self.genomic_start,
            ),
            Strand::Minus => (
                self.cdna_start + self.genomic_end - end,
                self.cdna_start + self.genomic_end - start,
            ),
        }
    }

    fn cdna_to_genomic(&self, start: i64, end: i64) -> (i64, i64) {
        match self.strand {
            Strand::Plus => (
                self.genomic_start + start - self.cdna_start,
                self.genomic_start + end - self.cdna_start,
            ),
            Strand::Minus => (
                self.genomic_end - (end - self.cdna_start),
                self.genomic_end - (start - self.cdna_start),
            ),
        }
    }
}

/// A genomic piece of a query and the exon it falls into, if any
#[derive(Debug, Clone, Copy)]
struct Segment {
    genomic_start: i64,
    genomic_end: i64,
    pair: Option<MapperPair>,
}

/// Maps coordinates between the spaces of a single transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMapper {
    pairs: Vec<MapperPair>,
    coding: Option<(i64, i64)>,
}

impl TranscriptMapper {
    /// Builds the mapper from exons in transcript order
    ///
    /// `coding` is the cDNA coding start and end of the transcript, `None`
    /// for non-coding transcripts.
    pub fn new(exons: &[Exon], coding: Option<(i64, i64)>) -> Self {
        let mut cdna_start = 1;
        let pairs = exons
            .iter()
            .map(|exon| {
                let pair = MapperPair {
                    genomic_start: exon.start(),
                    genomic_end: exon.end(),
                    cdna_start,
                    cdna_end: cdna_start + exon.length() - 1,
                    strand: exon.strand(),
                };
                cdna_start += exon.length();
                pair
            })
            .collect();
        TranscriptMapper { pairs, coding }
    }

    pub fn pairs(&self) -> &[MapperPair] {
        &self.pairs
    }

    /// cDNA coding start and end, `None` if the transcript is non-coding
    pub fn coding(&self) -> Option<(i64, i64)> {
        self.coding
    }

    /// Length of the spliced transcript
    pub fn cdna_length(&self) -> i64 {
        self.pairs.last().map(|p| p.cdna_end).unwrap_or(0)
    }

    /// Maps a genomic interval into cDNA space
    ///
    /// Intronic or overhanging portions of the query are returned as
    /// [`Mapped::Gap`] in genomic coordinates. Results are sorted by ascending
    /// genomic position. The strand of each coordinate is the strand of
    /// the query combined with the strand of the exon.
    /// A query that does not touch the transcript returns an empty list.
    pub fn genomic_to_cdna(&self, start: i64, end: i64, strand: Strand) -> Result<Vec<Mapped>, TxError> {
        Ok(self
            .genomic_segments(start, end)?
            .into_iter()
            .map(|segment| match segment.pair {
                None => Mapped::Gap {
                    start: segment.genomic_start,
                    end: segment.genomic_end,
                },
                Some(pair) => {
                    let (start, end) = pair.genomic_to_cdna(segment.genomic_start, segment.genomic_end);
                    Mapped::Coordinate {
                        start,
                        end,
                        strand: strand.combine(pair.strand),
                        space: Space::Cdna,
                    }
                }
            })
            .collect())
    }

    /// Maps a cDNA interval into genomic space
    ///
    /// Returns one coordinate per exon that the interval touches, in cDNA
    /// order. Portions before position 1 or after the end of the spliced
    /// transcript are returned as [`Mapped::Gap`] in cDNA coordinates.
    ///
    /// ```rust
    /// use txdb::mapper::{Mapped, Space};
    /// use txdb::models::Strand;
    /// use txdb::tests::transcripts::standard_transcript;
    ///
    /// let tx = standard_transcript();
    /// let res = tx.mapper().cdna_to_genomic(50, 53).unwrap();
    /// assert_eq!(res, vec![
    ///     Mapped::Coordinate { start: 149, end: 150, strand: Strand::Plus, space: Space::Genomic },
    ///     Mapped::Coordinate { start: 200, end: 201, strand: Strand::Plus, space: Space::Genomic },
    /// ]);
    /// ```
    pub fn cdna_to_genomic(&self, start: i64, end: i64) -> Result<Vec<Mapped>, TxError> {
        check_interval(start, end)?;
        let mut res = vec![];
        let mut pos = start;
        if pos < 1 {
            let gap_end = end.min(0);
            res.push(Mapped::Gap {
                start: pos,
                end: gap_end,
            });
            pos = gap_end + 1;
        }
        for pair in &self.pairs {
            if pos > end {
                break;
            }
            if pair.cdna_end < pos {
                continue;
            }
            let seg_end = end.min(pair.cdna_end);
            let (g_start, g_end) = pair.cdna_to_genomic(pos, seg_end);
            res.push(Mapped::Coordinate {
                start: g_start,
                end: g_end,
                strand: pair.strand,
                space: Space::Genomic,
            });
            pos = seg_end + 1;
        }
        if pos <= end {
            res.push(Mapped::Gap { start: pos, end });
        }
        Ok(res)
    }

    /// Maps a CDS interval into genomic space
    ///
    /// CDS position 1 is the cDNA coding start. Returns an empty list for
    /// non-coding transcripts.
    pub fn cds_to_genomic(&self, start: i64, end: i64) -> Result<Vec<Mapped>, TxError> {
        check_interval(start, end)?;
        match self.coding {
            Some((coding_start, _)) => {
                self.cdna_to_genomic(start + coding_start - 1, end + coding_start - 1)
            }
            None => Ok(vec![]),
        }
    }

    /// Maps a peptide interval into genomic space
    ///
    /// Every amino acid covers the genomic span of its full codon, which can
    /// be split across two exons. Returns an empty list for non-coding transcripts.
    pub fn peptide_to_genomic(&self, start: i64, end: i64) -> Result<Vec<Mapped>, TxError> {
        check_interval(start, end)?;
        match self.coding {
            Some((coding_start, _)) => self.cdna_to_genomic(
                (start - 1) * 3 + coding_start,
                end * 3 + coding_start - 1,
            ),
            None => Ok(vec![]),
        }
    }

    /// Maps a genomic interval into peptide space
    ///
    /// Intronic, overhanging and UTR portions of the query are returned as
    /// [`Mapped::Gap`] in genomic coordinates, in ascending genomic order.
    /// Returns an empty list for non-coding transcripts.
    pub fn genomic_to_peptide(&self, start: i64, end: i64, strand: Strand) -> Result<Vec<Mapped>, TxError> {
        check_interval(start, end)?;
        let (coding_start, coding_end) = match self.coding {
            Some(coding) => coding,
            None => return Ok(vec![]),
        };
        let mut res = vec![];
        for segment in self.genomic_segments(start, end)? {
            let pair = match segment.pair {
                Some(pair) => pair,
                None => {
                    res.push(Mapped::Gap {
                        start: segment.genomic_start,
                        end: segment.genomic_end,
                    });
                    continue;
                }
            };
            let (cdna_start, cdna_end) = pair.genomic_to_cdna(segment.genomic_start, segment.genomic_end);
            let lo = cdna_start.max(coding_start);
            let hi = cdna_end.min(coding_end);
            if lo > hi {
                res.push(Mapped::Gap {
                    start: segment.genomic_start,
                    end: segment.genomic_end,
                });
                continue;
            }

            // UTR overhangs of the segment, expressed in genomic coordinates
            let five_prime = lo - cdna_start;
            let three_prime = cdna_end - hi;
            let (low_overhang, high_overhang) = match pair.strand {
                Strand::Plus => (five_prime, three_prime),
                Strand::Minus => (three_prime, five_prime),
            };
            if low_overhang > 0 {
                res.push(Mapped::Gap {
                    start: segment.genomic_start,
                    end: segment.genomic_start + low_overhang - 1,
                });
            }
            res.push(Mapped::Coordinate {
                start: (lo - coding_start) / 3 + 1,
                end: (hi - coding_start) / 3 + 1,
                strand: strand.combine(pair.strand),
                space: Space::Peptide,
            });
            if high_overhang > 0 {
                res.push(Mapped::Gap {
                    start: segment.genomic_end - high_overhang + 1,
                    end: segment.genomic_end,
                });
            }
        }
        Ok(res)
    }

    /// Splits a genomic interval at the exon boundaries
    fn genomic_segments(&self, start: i64, end: i64) -> Result<Vec<Segment>, TxError> {
        check_interval(start, end)?;
        let mut sorted = self.pairs.clone();
        sorted.sort_by_key(|pair| pair.genomic_start);

        let (first, last) = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => (first.genomic_start, last.genomic_end),
            _ => return Ok(vec![]),
        };
        if end < first || start > last {
            return Ok(vec![]);
        }

        let mut res = vec![];
        let mut pos = start;
        for pair in sorted {
            if pos > end {
                break;
            }
            if pair.genomic_end < pos {
                continue;
            }
            if pair.genomic_start > end {
                break;
            }
            if pair.genomic_start > pos {
                res.push(Segment {
                    genomic_start: pos,
                    genomic_end: pair.genomic_start - 1,
                    pair: None,
                });
                pos = pair.genomic_start;
            }
            let seg_end = end.min(pair.genomic_end);
            res.push(Segment {
                genomic_start: pos,
                genomic_end: seg_end,
                pair: Some(pair),
            });
            pos = seg_end + 1;
        }
        if pos <= end {
            res.push(Segment {
                genomic_start: pos,
                genomic_end: end,
                pair: None,
            });
        }
        Ok(res)
    }
}

fn check_interval(start: i64, end: i64) -> Result<(), TxError> {
    if start > end {
        return Err(TxError::validation(format!(
            "interval start {} is after its end {}",
            start, end
        )));
    }
    Ok(())
}
