//! Coding exons and peptide translation of transcripts
use crate::models::{check_offset, Exon, GeneticCode, Sequence, SequenceProvider, Transcript};
use crate::utils::errors::TxError;

impl Transcript {
    /// Returns the coding parts of all coding exons, in transcript order
    ///
    /// Exons upstream of the translation start exon and downstream of the
    /// translation end exon are skipped. The start exon is trimmed to the
    /// translation start, the end exon to the translation end. The returned
    /// exons are copies and not stored.
    ///
    /// Returns an empty list for non-coding transcripts.
    ///
    /// ```rust
    /// use txdb::tests::transcripts::standard_transcript;
    ///
    /// let tx = standard_transcript();
    /// let coding: Vec<(i64, i64)> = tx
    ///     .coding_exons()
    ///     .unwrap()
    ///     .iter()
    ///     .map(|exon| (exon.start(), exon.end()))
    ///     .collect();
    /// assert_eq!(coding, vec![(109, 150), (200, 249)]);
    /// ```
    pub fn coding_exons(&self) -> Result<Vec<Exon>, TxError> {
        let translation = match self.translation() {
            Some(tl) => tl,
            None => return Ok(vec![]),
        };
        let start_idx = self.exon_index(translation.start_exon()).ok_or_else(|| {
            TxError::validation(format!(
                "translation start exon {} is not part of transcript {}",
                translation.start_exon(),
                self
            ))
        })?;
        let end_idx = self.exon_index(translation.end_exon()).ok_or_else(|| {
            TxError::validation(format!(
                "translation end exon {} is not part of transcript {}",
                translation.end_exon(),
                self
            ))
        })?;
        if start_idx > end_idx {
            return Err(TxError::validation(format!(
                "translation of transcript {} starts after its end exon",
                self
            )));
        }

        let exons = self.exons();
        check_offset("start", translation.start(), &exons[start_idx])?;
        check_offset("end", translation.end(), &exons[end_idx])?;

        Ok(exons[start_idx..=end_idx]
            .iter()
            .enumerate()
            .map(|(i, exon)| {
                let idx = start_idx + i;
                let start_adjust = if idx == start_idx {
                    translation.start() - 1
                } else {
                    0
                };
                let end_adjust = if idx == end_idx {
                    translation.end() - exon.length()
                } else {
                    0
                };
                if start_adjust == 0 && end_adjust == 0 {
                    exon.clone()
                } else {
                    exon.adjust_start_end(start_adjust, end_adjust)
                }
            })
            .collect())
    }

    /// Translates the coding sequence into a peptide
    ///
    /// A single trailing stop codon is removed if the coding sequence is a
    /// multiple of 3 long. A trailing partial codon is ignored, codons with
    /// ambiguous nucleotides are translated as `X`. Peptide edits of the
    /// translation (e.g. selenocysteines) are applied last.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use txdb::models::GeneticCode;
    /// use txdb::tests::sequences::genome;
    /// use txdb::tests::transcripts::standard_transcript;
    ///
    /// let tx = standard_transcript();
    /// let peptide = tx.translate(&genome(), &GeneticCode::default()).unwrap();
    /// assert_eq!(peptide, "CRNNRVPKMHLGYPKQYLLKIAERRVIIVL");
    /// ```
    pub fn translate(
        &self,
        provider: &dyn SequenceProvider,
        code: &GeneticCode,
    ) -> Result<String, TxError> {
        let translation = self
            .translation()
            .ok_or_else(|| TxError::NoTranslation(self.to_string()))?;

        let seq = Sequence::from_lenient(&self.translateable_sequence(provider)?);
        let mut len = seq.len();
        if len >= 3 && len % 3 == 0 && code.is_stop_codon(&seq[len - 3..len]) {
            len -= 3;
        }

        let mut peptide = String::with_capacity(len / 3);
        for codon in seq[..len].chunks_exact(3) {
            peptide.push(code.translate_lenient(codon).single_letter());
        }
        translation.modify_peptide(&mut peptide)?;
        Ok(peptide)
    }
}
