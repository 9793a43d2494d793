//! The character set a recognizer model was trained against.

use std::path::Path;

use crate::error::OcrError;

/// Maps CTC class indices to characters. Index 0 is always the blank token
/// and never appears in decoded output.
#[derive(Debug, Clone)]
pub struct CharacterDictionary {
    chars: Vec<char>,
}

impl CharacterDictionary {
    /// Loads a dictionary file with one character per line. A blank entry
    /// is prepended automatically; it does not need to be present in the
    /// file.
    pub fn load(path: &Path) -> Result<Self, OcrError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OcrError::InvalidInput(format!("failed to read dictionary {}: {e}", path.display())))?;

        let mut chars = vec!['\0'];
        for line in content.lines() {
            if let Some(c) = line.chars().next() {
                chars.push(c);
            }
        }

        Ok(Self { chars })
    }

    /// Looks up the character for a CTC class index. Returns `None` for the
    /// blank index (0) or an out-of-range index.
    pub fn get(&self, index: usize) -> Option<char> {
        if index == 0 {
            return None;
        }
        self.chars.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScratchFile(std::path::PathBuf);

    impl ScratchFile {
        fn write(contents: &str) -> Self {
            static COUNTER: AtomicU32 = AtomicU32::new(0);
            let n = COUNTER.fetch_add(1, Ordering::SeqCst);
            let path = std::env::temp_dir().join(format!("relief-dict-test-{}-{n}.txt", std::process::id()));
            std::fs::write(&path, contents).unwrap();
            Self(path)
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn blank_token_occupies_index_zero() {
        let file = ScratchFile::write("a\nb\nc\n");
        let dict = CharacterDictionary::load(&file.0).unwrap();
        assert_eq!(dict.get(0), None);
        assert_eq!(dict.get(1), Some('a'));
        assert_eq!(dict.get(3), Some('c'));
        assert_eq!(dict.len(), 4);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = CharacterDictionary::load(Path::new("/nonexistent/dict.txt"));
        assert!(result.is_err());
    }
}
