use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::errors::TxError;

/// Attribute code of RNA edits on transcripts
pub const RNA_EDIT_CODE: &str = "_rna_edit";

/// A typed key-value annotation of a transcript or translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub code: String,
    pub name: String,
    pub description: String,
    pub value: String,
}

impl Attribute {
    pub fn new(code: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            value: value.into(),
        }
    }

    /// Creates an RNA edit attribute from a [`SeqEdit`]
    pub fn rna_edit(edit: &SeqEdit) -> Self {
        Attribute::new(RNA_EDIT_CODE, "RNA editing", edit.to_string())
    }

    /// Parses the value as a [`SeqEdit`]
    pub fn seq_edit(&self) -> Result<SeqEdit, TxError> {
        self.value.parse()
    }
}

/// A declared modification of a sequence
///
/// The interval `[start, end)` is zero-based and half-open on the unedited
/// sequence. `start == end` inserts `alt_seq`, an empty `alt_seq` deletes the
/// interval.
///
/// The textual form is `"<start> <end> <alt_seq>"`.
///
/// # Examples
///
/// ```rust
/// use txdb::models::SeqEdit;
///
/// let edit: SeqEdit = "5 5 AAA".parse().unwrap();
/// assert_eq!(edit.length_diff(), 3);
///
/// let mut seq = String::from("ACGTACGTAC");
/// edit.apply(&mut seq).unwrap();
/// assert_eq!(seq, "ACGTAAAACGTAC");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqEdit {
    start: usize,
    end: usize,
    alt_seq: String,
}

impl SeqEdit {
    pub fn new<S: Into<String>>(start: usize, end: usize, alt_seq: S) -> Result<Self, TxError> {
        if start > end {
            return Err(TxError::validation(format!(
                "sequence edit start {} is after its end {}",
                start, end
            )));
        }
        Ok(SeqEdit {
            start,
            end,
            alt_seq: alt_seq.into(),
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn alt_seq(&self) -> &str {
        &self.alt_seq
    }

    /// Change of the sequence length caused by the edit
    pub fn length_diff(&self) -> i64 {
        self.alt_seq.len() as i64 - (self.end - self.start) as i64
    }

    /// Replaces the edited interval of `seq` in place
    pub fn apply(&self, seq: &mut String) -> Result<(), TxError> {
        if self.end > seq.len()
            || !seq.is_char_boundary(self.start)
            || !seq.is_char_boundary(self.end)
        {
            return Err(TxError::EditOutOfRange {
                start: self.start,
                end: self.end,
                length: seq.len(),
            });
        }
        seq.replace_range(self.start..self.end, &self.alt_seq);
        Ok(())
    }
}

impl FromStr for SeqEdit {
    type Err = TxError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split_whitespace();
        let start = fields.next().and_then(|v| v.parse::<usize>().ok());
        let end = fields.next().and_then(|v| v.parse::<usize>().ok());
        let alt = fields.next().unwrap_or_default();
        match (start, end, fields.next()) {
            (Some(start), Some(end), None) => SeqEdit::new(start, end, alt),
            _ => Err(TxError::validation(format!("invalid sequence edit '{}'", s))),
        }
    }
}

impl fmt::Display for SeqEdit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.alt_seq.is_empty() {
            write!(f, "{} {}", self.start, self.end)
        } else {
            write!(f, "{} {} {}", self.start, self.end, self.alt_seq)
        }
    }
}
