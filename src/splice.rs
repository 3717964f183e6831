//! Assembles the nucleotide sequence of a transcript
//!
//! The sequence of every exon is read from a [`SequenceProvider`], reverse
//! complemented for minus strand exons and concatenated in transcript order.
//! RNA edits (attributes with code [`RNA_EDIT_CODE`](`crate::models::RNA_EDIT_CODE`))
//! are applied on top of the spliced sequence.
//!
//! ```rust
//! use txdb::tests::sequences::genome;
//! use txdb::tests::transcripts::standard_transcript;
//!
//! let tx = standard_transcript();
//! let genome = genome();
//!
//! assert_eq!(tx.spliced_sequence(&genome).len(), 112);
//! assert_eq!(tx.translateable_sequence(&genome).unwrap().len(), 92);
//! ```
use log::warn;

use crate::models::{SequenceProvider, Transcript};
use crate::utils::errors::TxError;

impl Transcript {
    /// Returns the spliced sequence of all exons
    ///
    /// Exons whose sequence cannot be resolved are filled with `N`.
    pub fn spliced_sequence(&self, provider: &dyn SequenceProvider) -> String {
        let mut seq = String::with_capacity(self.length().max(0) as usize);
        for exon in self.exons() {
            match exon.seq(provider) {
                Some(exon_seq) => seq.push_str(&exon_seq),
                None => {
                    warn!(
                        "No sequence for exon {} of transcript {}, using N",
                        exon, self
                    );
                    seq.push_str(&"N".repeat(exon.length().max(0) as usize));
                }
            }
        }
        seq
    }

    /// Returns the spliced sequence with all RNA edits applied
    ///
    /// Edits are applied from the rightmost start to the leftmost, so the
    /// offsets of the remaining edits stay valid. Malformed edits are skipped
    /// with a warning, like for the coding boundaries. Without enabled edits
    /// this is the spliced sequence.
    pub fn edited_sequence(&self, provider: &dyn SequenceProvider) -> Result<String, TxError> {
        let mut seq = self.spliced_sequence(provider);
        if !self.edits_enabled() {
            return Ok(seq);
        }
        for edit in self.sorted_seq_edits() {
            edit.apply(&mut seq)?;
        }
        Ok(seq)
    }

    /// Returns the coding part of the edited sequence
    ///
    /// The result is empty for non-coding transcripts.
    pub fn translateable_sequence(&self, provider: &dyn SequenceProvider) -> Result<String, TxError> {
        let (start, end) = match (self.cdna_coding_start(), self.cdna_coding_end()) {
            (Some(start), Some(end)) => (start, end),
            _ => return Ok(String::new()),
        };
        let seq = self.edited_sequence(provider)?;
        let start = start.max(1) as usize;
        let end = end.min(seq.len() as i64).max(0) as usize;
        if start > end {
            return Ok(String::new());
        }
        Ok(seq.get(start - 1..end).unwrap_or_default().to_string())
    }

    /// Returns the edited sequence upstream of the coding region
    ///
    /// `None` for non-coding transcripts.
    pub fn five_prime_utr(&self, provider: &dyn SequenceProvider) -> Result<Option<String>, TxError> {
        let start = match self.cdna_coding_start() {
            Some(start) => start,
            None => return Ok(None),
        };
        let seq = self.edited_sequence(provider)?;
        let end = (start - 1).clamp(0, seq.len() as i64) as usize;
        Ok(seq.get(..end).map(|s| s.to_string()))
    }

    /// Returns the edited sequence downstream of the coding region
    ///
    /// `None` for non-coding transcripts.
    pub fn three_prime_utr(&self, provider: &dyn SequenceProvider) -> Result<Option<String>, TxError> {
        let end = match self.cdna_coding_end() {
            Some(end) => end,
            None => return Ok(None),
        };
        let seq = self.edited_sequence(provider)?;
        let start = end.clamp(0, seq.len() as i64) as usize;
        Ok(seq.get(start..).map(|s| s.to_string()))
    }
}
