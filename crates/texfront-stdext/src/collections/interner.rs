//! String interning
//!
//! Interning maps each distinct string to a small integer key.
//! Comparing and hashing keys is cheaper than doing so for strings,
//! and a key can be resolved back to its string at any time.
//! Interned strings are never freed.
//!
//! ```
//! # use texfront_stdext::collections::interner::Interner;
//! let mut interner: Interner = Default::default();
//! let hello_1 = interner.get_or_intern("hello").unwrap();
//! let world = interner.get_or_intern("world").unwrap();
//! let hello_2 = interner.get_or_intern("hello").unwrap();
//! assert_eq!(hello_1, hello_2);
//! assert_ne!(hello_1, world);
//! assert_eq!(interner.resolve(hello_1), Some("hello"));
//! ```
//!
//! All strings are stored in one contiguous buffer, and the map from strings to keys
//! stores `(start, end)` ranges into that buffer.
//! This is the scheme described in
//! [a post by Mat Klad](https://matklad.github.io/2020/03/22/fast-simple-rust-interner.html),
//! minus the arena of buffers.
use std::collections::HashMap;
use std::num;

/// String interner.
#[derive(Debug, Clone)]
pub struct Interner<K = num::NonZeroU32> {
    buffer: String,
    // ends[i] is the end offset of the string with key i+1.
    ends: Vec<usize>,
    keys: HashMap<String, K>,
}

impl<K> Default for Interner<K> {
    fn default() -> Self {
        Self {
            buffer: Default::default(),
            ends: Default::default(),
            keys: Default::default(),
        }
    }
}

/// Types implementing this trait can be used as keys in the [Interner].
pub trait Key: Copy + Eq + std::fmt::Debug {
    /// Try to create a key from the provided [usize], returning `None` on overflow.
    fn try_from_usize(index: usize) -> Option<Self>;

    /// Convert the key back to the [usize] it was created from.
    fn into_usize(self) -> usize;
}

impl Key for num::NonZeroU32 {
    fn try_from_usize(index: usize) -> Option<Self> {
        let index: u32 = index.try_into().ok()?;
        num::NonZeroU32::new(index.checked_add(1)?)
    }

    fn into_usize(self) -> usize {
        self.get() as usize - 1
    }
}

impl<K: Key> Interner<K> {
    /// Returns the key for the string, interning it if needed.
    ///
    /// Returns `None` only if the key space is exhausted.
    pub fn get_or_intern(&mut self, s: &str) -> Option<K> {
        if let Some(k) = self.keys.get(s) {
            return Some(*k);
        }
        let k = K::try_from_usize(self.ends.len())?;
        self.buffer.push_str(s);
        self.ends.push(self.buffer.len());
        self.keys.insert(s.to_string(), k);
        Some(k)
    }

    /// Returns the key for the string if it has been interned already.
    pub fn get(&self, s: &str) -> Option<K> {
        self.keys.get(s).copied()
    }

    /// Returns the string corresponding to the key.
    pub fn resolve(&self, k: K) -> Option<&str> {
        let i = k.into_usize();
        let end = *self.ends.get(i)?;
        let start = if i == 0 { 0 } else { self.ends[i - 1] };
        self.buffer.get(start..end)
    }

    /// Iterates over all interned strings, in the order they were interned.
    pub fn iter(&self) -> impl Iterator<Item = (K, &str)> + '_ {
        (0..self.ends.len()).filter_map(|i| {
            let k = K::try_from_usize(i)?;
            Some((k, self.resolve(k)?))
        })
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string() {
        let mut interner: Interner = Default::default();
        let empty = interner.get_or_intern("").unwrap();
        let a = interner.get_or_intern("a").unwrap();
        assert_eq!(interner.resolve(empty), Some(""));
        assert_eq!(interner.resolve(a), Some("a"));
    }

    #[test]
    fn get_without_intern() {
        let mut interner: Interner = Default::default();
        assert_eq!(interner.get("par"), None);
        let par = interner.get_or_intern("par").unwrap();
        assert_eq!(interner.get("par"), Some(par));
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn iter_in_insertion_order() {
        let mut interner: Interner = Default::default();
        for s in ["def", "let", "def", "par"] {
            interner.get_or_intern(s);
        }
        let all: Vec<&str> = interner.iter().map(|(_, s)| s).collect();
        assert_eq!(all, vec!["def", "let", "par"]);
    }
}
