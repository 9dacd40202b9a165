use crate::checker::tokenizer::{for_each_word, NormalizedWord};
use crate::error::{EngineError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default table width, matching the capacity of the largest word lists we
/// expect to load.
pub const DEFAULT_BUCKETS: usize = 200_000;

struct Node {
    word: Box<str>,
    next: Option<Box<Node>>,
}

/// Set of normalized words backed by a chained hash table.
///
/// A set is built for one task from one dictionary file and is never shared.
pub struct DictionarySet {
    buckets: Vec<Option<Box<Node>>>,
    len: usize,
}

impl DictionarySet {
    pub fn with_buckets(buckets: usize) -> Result<Self> {
        let width = buckets.max(1);
        let mut table = Vec::new();
        table
            .try_reserve_exact(width)
            .map_err(|_| EngineError::Allocation {
                what: "dictionary table",
            })?;
        table.resize_with(width, || None);

        Ok(Self {
            buckets: table,
            len: 0,
        })
    }

    /// Allocate a set and load one dictionary file into it.
    pub fn build(path: &Path, buckets: usize) -> Result<Self> {
        let mut set = Self::with_buckets(buckets)?;
        set.load_file(path)?;
        Ok(set)
    }

    /// Split every line of `path` on the token delimiters and insert each
    /// normalized token once.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).map_err(|source| EngineError::DictionaryOpen {
            path: path.to_path_buf(),
            source,
        })?;

        for_each_word(BufReader::new(file), |word| {
            self.insert(word);
        })
        .map_err(|source| EngineError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if self.is_empty() {
            log::warn!("dictionary {} contains no words", path.display());
        } else {
            log::debug!(
                "loaded {} words from dictionary {}",
                self.len(),
                path.display()
            );
        }
        Ok(())
    }

    /// Insert a word, returning `false` if it was already present.
    pub fn insert(&mut self, word: NormalizedWord) -> bool {
        if self.contains(&word) {
            return false;
        }

        let index = self.index_of(&word);
        let next = self.buckets[index].take();
        self.buckets[index] = Some(Box::new(Node {
            word: word.into_string().into_boxed_str(),
            next,
        }));
        self.len += 1;
        true
    }

    /// Exact lookup. Callers pass already-normalized words.
    pub fn contains(&self, word: &str) -> bool {
        let mut node = self.buckets[self.index_of(word)].as_deref();
        while let Some(current) = node {
            if &*current.word == word {
                return true;
            }
            node = current.next.as_deref();
        }
        false
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Iterate over the stored words in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().flat_map(|bucket| {
            let mut node = bucket.as_deref();
            std::iter::from_fn(move || {
                let current = node?;
                node = current.next.as_deref();
                Some(&*current.word)
            })
        })
    }

    fn index_of(&self, word: &str) -> usize {
        (djb2(word) % self.buckets.len() as u64) as usize
    }
}

impl Drop for DictionarySet {
    // Unlink chains iteratively so a degenerate bucket cannot blow the stack.
    fn drop(&mut self) {
        for bucket in &mut self.buckets {
            let mut node = bucket.take();
            while let Some(mut current) = node {
                node = current.next.take();
            }
        }
    }
}

fn djb2(word: &str) -> u64 {
    word.bytes()
        .fold(5381u64, |hash, b| hash.wrapping_mul(33).wrapping_add(u64::from(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::tokenizer::normalize;
    use std::fs;
    use tempfile::tempdir;

    fn word(raw: &str) -> NormalizedWord {
        normalize(raw).unwrap()
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = DictionarySet::with_buckets(64).unwrap();
        assert!(set.insert(word("hello")));
        assert!(set.insert(word("World")));
        assert!(!set.insert(word("HELLO")));

        assert_eq!(set.len(), 2);
        assert!(set.contains("hello"));
        assert!(set.contains(&word("WORLD")));
        assert!(!set.contains("notfound"));
    }

    #[test]
    fn test_collisions_compare_full_strings() {
        // A single bucket forces every word into one chain.
        let mut set = DictionarySet::with_buckets(1).unwrap();
        for w in ["alpha", "beta", "gamma", "delta"] {
            set.insert(word(w));
        }
        assert_eq!(set.bucket_count(), 1);
        assert!(set.contains("gamma"));
        assert!(set.contains("alpha"));
        assert!(!set.contains("epsilon"));
        assert!(!set.contains("alph"));

        let mut all: Vec<&str> = set.iter().collect();
        all.sort_unstable();
        assert_eq!(all, vec!["alpha", "beta", "delta", "gamma"]);
    }

    #[test]
    fn test_build_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.txt");
        fs::write(&path, "The quick\nbrown, FOX!\n42 fox\n(jumps) over_the/lazy-dog\n").unwrap();

        let set = DictionarySet::build(&path, 128).unwrap();
        for w in ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog"] {
            assert!(set.contains(w), "{w}");
        }
        assert_eq!(set.len(), 8);
    }

    #[test]
    fn test_build_from_file_without_words() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("numbers.txt");
        fs::write(&path, "1 22 333\n").unwrap();

        let set = DictionarySet::build(&path, 16).unwrap();
        assert!(set.is_empty());
        assert!(!set.contains("one"));
    }

    #[test]
    fn test_build_missing_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.txt");

        match DictionarySet::build(&path, 16) {
            Err(EngineError::DictionaryOpen { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }
}
