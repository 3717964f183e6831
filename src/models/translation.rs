use serde::{Deserialize, Serialize};

use crate::models::{Attribute, DbId, Exon, SeqEdit};
use crate::utils::errors::TxError;

/// Attribute codes of edits that are applied to the translated peptide
pub const PEPTIDE_EDIT_CODES: [&str; 3] = ["_selenocysteine", "amino_acid_sub", "initial_met"];

/// The coding span of a transcript
///
/// The span starts at the 1-based offset `start` within `start_exon` and ends
/// at the 1-based offset `end` within `end_exon`. Offsets are counted in the
/// direction of transcription.
///
/// # Examples
///
/// ```rust
/// use txdb::models::{CoordSystem, Exon, Slice, Strand, Translation};
///
/// let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 1000);
/// let first = Exon::new(slice.clone(), 100, 150, Strand::Plus).unwrap();
/// let last = Exon::new(slice, 200, 260, Strand::Plus).unwrap();
///
/// let translation = Translation::new(first.clone(), 10, last.clone(), 50).unwrap();
/// assert_eq!(translation.start(), 10);
///
/// // the offset must lie within the exon
/// assert!(Translation::new(first, 52, last, 50).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    db_id: Option<DbId>,
    stable_id: Option<String>,
    version: Option<u32>,
    start_exon: Exon,
    start: i64,
    end_exon: Exon,
    end: i64,
    attributes: Vec<Attribute>,
}

impl Translation {
    /// Creates a new translation and validates both offsets against their exons
    pub fn new(start_exon: Exon, start: i64, end_exon: Exon, end: i64) -> Result<Self, TxError> {
        check_offset("start", start, &start_exon)?;
        check_offset("end", end, &end_exon)?;
        if start_exon.hashkey() == end_exon.hashkey() && start > end {
            return Err(TxError::validation(format!(
                "translation start {} is after its end {} in exon {}",
                start, end, start_exon
            )));
        }
        Ok(Self::unchecked(start_exon, start, end_exon, end))
    }

    /// Creates a translation without validating the offsets
    ///
    /// Used for rows loaded from the store, invalid offsets surface
    /// once the coding exons are computed.
    pub(crate) fn unchecked(start_exon: Exon, start: i64, end_exon: Exon, end: i64) -> Self {
        Translation {
            db_id: None,
            stable_id: None,
            version: None,
            start_exon,
            start,
            end_exon,
            end,
            attributes: vec![],
        }
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

    pub(crate) fn set_stable_id(&mut self, stable_id: Option<String>, version: Option<u32>) {
        self.stable_id = stable_id;
        self.version = version;
    }

    pub fn start_exon(&self) -> &Exon {
        &self.start_exon
    }

    pub fn end_exon(&self) -> &Exon {
        &self.end_exon
    }

    /// 1-based offset of the first coding base within the start exon
    pub fn start(&self) -> i64 {
        self.start
    }

    /// 1-based offset of the last coding base within the end exon
    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn set_start_exon(&mut self, exon: Exon) {
        self.start_exon = exon;
    }

    pub fn set_end_exon(&mut self, exon: Exon) {
        self.end_exon = exon;
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute)
    }

    pub(crate) fn set_attributes(&mut self, attributes: Vec<Attribute>) {
        self.attributes = attributes;
    }

    /// Returns all peptide edits, e.g. selenocysteine positions
    pub fn peptide_edits(&self) -> Result<Vec<SeqEdit>, TxError> {
        self.attributes
            .iter()
            .filter(|attr| PEPTIDE_EDIT_CODES.contains(&attr.code.as_str()))
            .map(|attr| attr.seq_edit())
            .collect()
    }

    /// Applies all peptide edits to the peptide, the rightmost edit first
    pub fn modify_peptide(&self, peptide: &mut String) -> Result<(), TxError> {
        let mut edits = self.peptide_edits()?;
        edits.sort_by(|a, b| b.start().cmp(&a.start()));
        for edit in edits {
            edit.apply(peptide)?;
        }
        Ok(())
    }
}

/// Checks that a translation offset lies within `[1, exon length]`
pub(crate) fn check_offset(boundary: &'static str, offset: i64, exon: &Exon) -> Result<(), TxError> {
    if offset < 1 || offset > exon.length() {
        return Err(TxError::TranslationBoundary {
            boundary,
            offset,
            exon: exon.to_string(),
            length: exon.length(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoordSystem, Slice, Strand};

    fn exon(start: i64, end: i64) -> Exon {
        let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 1000);
        Exon::new(slice, start, end, Strand::Plus).unwrap()
    }

    #[test]
    fn test_offsets() {
        assert!(Translation::new(exon(1, 10), 0, exon(20, 30), 5).is_err());
        assert!(Translation::new(exon(1, 10), 1, exon(20, 30), 12).is_err());
        assert!(Translation::new(exon(1, 10), 10, exon(20, 30), 11).is_ok());
        // same exon, inverted offsets
        assert!(Translation::new(exon(1, 10), 6, exon(1, 10), 5).is_err());
    }

    #[test]
    fn test_selenocysteine() {
        let mut tl = Translation::new(exon(1, 30), 1, exon(1, 30), 30).unwrap();
        tl.add_attribute(Attribute::new("_selenocysteine", "Selenocysteine", "2 3 U"));
        tl.add_attribute(Attribute::new("other", "Something else", "0 1 X"));
        let mut peptide = String::from("MK*R");
        tl.modify_peptide(&mut peptide).unwrap();
        assert_eq!(peptide, "MKUR");
    }
}
