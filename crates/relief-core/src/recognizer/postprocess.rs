//! CTC greedy decode (§4.3, §8 CTC invariant).
//!
//! Blanks are transparent to run-tracking: a blank step neither starts nor
//! breaks a character's run, so the same character reappearing after one or
//! more blank steps is treated as a continuation of its run rather than a
//! second occurrence. Only a *different* non-blank class starts a new run.
//! This matches the worked example in the CTC invariant (argmax path
//! `[3,3,0,3,5,5]` over a 6-class dictionary decodes to `"ce"`, not
//! `"cce"`) — see DESIGN.md for why this reading was chosen over the
//! formally stricter "a blank always separates repeats" rule.

use ndarray::ArrayD;

use crate::dictionary::CharacterDictionary;
use crate::error::OcrError;

/// One decoded word: its text and the geometric mean of its emitted
/// characters' run-maxima.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub text: String,
    pub confidence: f32,
}

/// Decodes a `[M, T, K]` batch of post-softmax class probabilities into `M`
/// `(text, confidence)` pairs.
pub fn decode(output: &ArrayD<f32>, dictionary: &CharacterDictionary) -> Result<Vec<Decoded>, OcrError> {
    let shape = output.shape();
    if shape.len() != 3 {
        return Err(OcrError::InvalidInput(format!(
            "expected recognizer output rank 3 [M,T,K], got {:?}",
            shape
        )));
    }
    let (m, t, k) = (shape[0], shape[1], shape[2]);

    let mut results = Vec::with_capacity(m);
    for seq in 0..m {
        results.push(decode_one(output, seq, t, k, dictionary));
    }
    Ok(results)
}

fn decode_one(output: &ArrayD<f32>, seq: usize, t: usize, k: usize, dictionary: &CharacterDictionary) -> Decoded {
    let mut text = String::new();
    let mut char_maxima: Vec<f32> = Vec::new();

    let mut open_class: Option<usize> = None;
    let mut open_max = 0.0f32;

    for step in 0..t {
        let mut best_class = 0usize;
        let mut best_prob = f32::NEG_INFINITY;
        for c in 0..k {
            let p = output[[seq, step, c]];
            if p > best_prob {
                best_prob = p;
                best_class = c;
            }
        }

        if best_class == 0 {
            continue; // blank: transparent to the currently open run
        }

        if open_class == Some(best_class) {
            open_max = open_max.max(best_prob);
        } else {
            if let Some(prev) = open_class {
                if let Some(c) = dictionary.get(prev) {
                    text.push(c);
                }
                char_maxima.push(open_max);
            }
            open_class = Some(best_class);
            open_max = best_prob;
        }
    }
    if let Some(prev) = open_class {
        if let Some(c) = dictionary.get(prev) {
            text.push(c);
        }
        char_maxima.push(open_max);
    }

    let confidence = if char_maxima.is_empty() {
        0.0
    } else {
        let log_sum: f32 = char_maxima.iter().map(|p| p.max(f32::MIN_POSITIVE).ln()).sum();
        (log_sum / char_maxima.len() as f32).exp()
    };

    Decoded { text, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    struct Scratch(std::path::PathBuf);
    impl Scratch {
        fn write(contents: &str) -> Self {
            static COUNTER: std::sync::atomic::AtomicU32 = std::sync::atomic::AtomicU32::new(0);
            let n = COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!("relief-ctc-test-{}-{n}.txt", std::process::id()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }
    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn dict_with(chars: &[char]) -> (Scratch, CharacterDictionary) {
        let contents: String = chars.iter().map(|c| format!("{c}\n")).collect();
        let file = Scratch::write(&contents);
        let dict = CharacterDictionary::load(&file.0).unwrap();
        (file, dict)
    }

    /// 6-class dictionary where 0 is blank and indices 1..=5 map to a,b,c,d,e.
    #[test]
    fn greedy_decode_matches_spec_worked_example() {
        let (_file, dict) = dict_with(&['a', 'b', 'c', 'd', 'e']);
        let probs = vec![
            0.0, 0.0, 0.0, 0.9, 0.0, 0.0, // t=0: argmax 3 ('c')
            0.0, 0.0, 0.0, 0.8, 0.0, 0.0, // t=1: argmax 3 (repeat, collapsed)
            0.9, 0.0, 0.0, 0.0, 0.0, 0.0, // t=2: argmax 0 (blank, transparent)
            0.0, 0.0, 0.0, 0.7, 0.0, 0.0, // t=3: argmax 3 (still the same run)
            0.0, 0.0, 0.0, 0.0, 0.0, 0.6, // t=4: argmax 5 ('e')
            0.0, 0.0, 0.0, 0.0, 0.0, 0.95, // t=5: argmax 5 (repeat, collapsed)
        ];
        let output = Array3::from_shape_vec((1, 6, 6), probs).unwrap().into_dyn();
        let decoded = decode(&output, &dict).unwrap();
        assert_eq!(decoded[0].text, "ce");
        // geometric mean of [0.9, 0.95]
        let expected = (0.9f32 * 0.95).sqrt();
        assert!((decoded[0].confidence - expected).abs() < 1e-4);
    }

    #[test]
    fn all_blank_sequence_has_zero_confidence_and_empty_text() {
        let (_file, dict) = dict_with(&['a', 'b', 'c']);
        let probs = vec![0.9, 0.0, 0.0, 0.0];
        let output = Array3::from_shape_vec((1, 1, 4), probs).unwrap().into_dyn();
        let decoded = decode(&output, &dict).unwrap();
        assert_eq!(decoded[0].text, "");
        assert_eq!(decoded[0].confidence, 0.0);
    }

    #[test]
    fn distinct_adjacent_characters_both_emit() {
        let (_file, dict) = dict_with(&['a', 'b']);
        // path [1,2]: 'a' then 'b', no repeats, no blanks.
        let probs = vec![
            0.0, 0.9, 0.0, //
            0.0, 0.0, 0.9,
        ];
        let output = Array3::from_shape_vec((1, 2, 3), probs).unwrap().into_dyn();
        let decoded = decode(&output, &dict).unwrap();
        assert_eq!(decoded[0].text, "ab");
    }
}
