//! WER and RTFX metric computation.

use crate::error::MetricError;

/// Corpus-level Word Error Rate.
///
/// Sums word-level edit distances across all pairs and divides by the total
/// number of reference words, so long utterances weigh more than short ones
/// (pooled WER, not an average of per-utterance rates).
pub fn wer(references: &[String], hypotheses: &[String]) -> Result<f64, MetricError> {
    if references.len() != hypotheses.len() {
        return Err(MetricError::LengthMismatch {
            references: references.len(),
            hypotheses: hypotheses.len(),
        });
    }

    let mut errors = 0usize;
    let mut total_words = 0usize;

    for (reference, hypothesis) in references.iter().zip(hypotheses) {
        let ref_words: Vec<&str> = reference.split_whitespace().collect();
        let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();

        errors += edit_distance(&ref_words, &hyp_words);
        total_words += ref_words.len();
    }

    if total_words == 0 {
        if errors == 0 {
            return Ok(0.0);
        }
        return Err(MetricError::EmptyCorpus);
    }

    Ok(errors as f64 / total_words as f64)
}

/// Inverse real-time factor: seconds of audio transcribed per second of wall
/// time. Higher is faster.
pub fn rtfx(total_audio_secs: f64, wall_secs: f64) -> Result<f64, MetricError> {
    if wall_secs <= 0.0 {
        return Err(MetricError::NonPositiveWallTime(wall_secs));
    }
    Ok(total_audio_secs / wall_secs)
}

/// Round a metric for reporting (two decimal places).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Word-level Levenshtein distance with a two-row DP table.
fn edit_distance(a: &[&str], b: &[&str]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &wa) in a.iter().enumerate() {
        curr[0] = i + 1;

        for (j, &wb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(wa != wb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_pairs_have_zero_wer() {
        let refs = strings(&["the cat sat", "on the mat"]);
        assert!((wer(&refs, &refs).unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn counts_substitutions_insertions_deletions() {
        // 1 substitution against 3 reference words
        let refs = strings(&["the cat sat"]);
        let hyps = strings(&["the bat sat"]);
        assert!((wer(&refs, &hyps).unwrap() - 1.0 / 3.0).abs() < 1e-9);

        // 1 deletion
        let hyps = strings(&["the sat"]);
        assert!((wer(&refs, &hyps).unwrap() - 1.0 / 3.0).abs() < 1e-9);

        // 1 insertion
        let hyps = strings(&["the cat sat down"]);
        assert!((wer(&refs, &hyps).unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn pools_errors_across_corpus() {
        // 1 error over 3 words + 0 errors over 1 word = 1/4, not mean(1/3, 0)
        let refs = strings(&["a b c", "d"]);
        let hyps = strings(&["a x c", "d"]);
        assert!((wer(&refs, &hyps).unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn empty_hypothesis_deletes_every_word() {
        let refs = strings(&["one two three"]);
        let hyps = strings(&[""]);
        assert!((wer(&refs, &hyps).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_corpus_with_empty_hypotheses_is_zero() {
        let refs = strings(&["", ""]);
        let hyps = strings(&["", ""]);
        assert!((wer(&refs, &hyps).unwrap() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn empty_corpus_with_insertions_is_an_error() {
        let refs = strings(&[""]);
        let hyps = strings(&["ghost words"]);
        assert!(matches!(wer(&refs, &hyps), Err(MetricError::EmptyCorpus)));
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let refs = strings(&["a", "b"]);
        let hyps = strings(&["a"]);
        assert!(matches!(
            wer(&refs, &hyps),
            Err(MetricError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn wer_can_exceed_one() {
        let refs = strings(&["hi"]);
        let hyps = strings(&["well hello there friend"]);
        assert!(wer(&refs, &hyps).unwrap() > 1.0);
    }

    #[test]
    fn rtfx_is_audio_over_wall_time() {
        assert!((rtfx(120.0, 2.0).unwrap() - 60.0).abs() < 1e-9);
        assert!((rtfx(1.0, 4.0).unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn rtfx_rejects_zero_wall_time() {
        assert!(matches!(
            rtfx(10.0, 0.0),
            Err(MetricError::NonPositiveWallTime(_))
        ));
    }

    #[test]
    fn round2_reports_two_decimals() {
        assert!((round2(8.3333333) - 8.33).abs() < 1e-9);
        assert!((round2(119.996) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn edit_distance_known_cases() {
        assert_eq!(edit_distance(&[], &[]), 0);
        assert_eq!(edit_distance(&["a"], &[]), 1);
        assert_eq!(edit_distance(&[], &["a", "b"]), 2);
        assert_eq!(
            edit_distance(&["kitten", "sat"], &["sitting", "sat"]),
            1
        );
        assert_eq!(
            edit_distance(&["a", "b", "c", "d"], &["b", "c", "d", "e"]),
            2
        );
    }
}
