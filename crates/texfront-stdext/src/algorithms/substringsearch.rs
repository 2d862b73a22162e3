//! Online substring search
//!
//! The [Matcher] type finds a fixed substring at the end of a sequence that
//! is built up one element at a time.
//! This is the situation when reading the argument of a macro with a delimited
//! parameter: each new token is checked to see whether the tokens read so far
//! end with the delimiter.
//!
//! The implementation is the Knuth-Morris-Pratt algorithm, so each call to
//! [Search::next] runs in amortized O(1) time.
//!
//! ```
//! # use texfront_stdext::algorithms::substringsearch::Matcher;
//! let matcher = Matcher::new(vec!['a', 'b', 'a']).unwrap();
//! let mut search = matcher.start();
//! let matches: Vec<bool> = "cabab".chars().map(|c| search.next(&c)).collect();
//! assert_eq!(matches, vec![false, false, false, true, false]);
//! ```

/// A substring that can be searched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher<T: PartialEq> {
    substring: Vec<T>,
    // prefix_function[i] is the length of the longest proper prefix of
    // substring[..=i] that is also a suffix of it.
    prefix_function: Vec<usize>,
}

impl<T: PartialEq> Matcher<T> {
    /// Builds a matcher for the provided substring, or returns `None` if it is empty.
    pub fn new(substring: Vec<T>) -> Option<Matcher<T>> {
        if substring.is_empty() {
            return None;
        }
        let mut prefix_function = vec![0_usize; substring.len()];
        let mut k = 0;
        for i in 1..substring.len() {
            while k > 0 && substring[k] != substring[i] {
                k = prefix_function[k - 1];
            }
            if substring[k] == substring[i] {
                k += 1;
            }
            prefix_function[i] = k;
        }
        Some(Matcher {
            substring,
            prefix_function,
        })
    }

    /// Starts a new search.
    pub fn start(&self) -> Search<'_, T> {
        Search {
            matcher: self,
            matched: 0,
        }
    }

    pub fn substring(&self) -> &[T] {
        &self.substring
    }
}

/// An in-progress search for the substring of a [Matcher].
#[derive(Debug, Clone)]
pub struct Search<'a, T: PartialEq> {
    matcher: &'a Matcher<T>,
    matched: usize,
}

impl<'a, T: PartialEq> Search<'a, T> {
    /// Appends an element to the sequence and returns whether the sequence now ends with the substring.
    pub fn next(&mut self, tail: &T) -> bool {
        let substring = &self.matcher.substring;
        if self.matched == substring.len() {
            self.matched = self.matcher.prefix_function[self.matched - 1];
        }
        while self.matched > 0 && substring[self.matched] != *tail {
            self.matched = self.matcher.prefix_function[self.matched - 1];
        }
        if substring[self.matched] == *tail {
            self.matched += 1;
        }
        self.matched == substring.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(substring: &str, sequence: &str) -> Vec<usize> {
        let matcher = Matcher::new(substring.chars().collect()).unwrap();
        let mut search = matcher.start();
        sequence
            .chars()
            .enumerate()
            .filter(|(_, c)| search.next(c))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn overlapping_matches() {
        assert_eq!(run("aa", "aaaa"), vec![1, 2, 3]);
    }

    #[test]
    fn partial_match_restarts() {
        assert_eq!(run("aab", "aaab"), vec![3]);
    }

    #[test]
    fn no_match() {
        assert_eq!(run("xyz", "xyxyxy"), Vec::<usize>::new());
    }

    #[test]
    fn empty_substring() {
        assert_eq!(Matcher::<char>::new(vec![]), None);
    }
}
