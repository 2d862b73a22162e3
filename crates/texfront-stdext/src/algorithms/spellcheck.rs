//! Spell checking using Levenshtein distance
//!
//! [find_close_words] ranks the words of a dictionary by their
//! [Levenshtein distance](https://en.wikipedia.org/wiki/Levenshtein_distance)
//! to a search word.
//! The distance is computed with the standard dynamic program,
//! keeping only one row of the matrix at a time.

/// A dictionary word together with its distance from the search word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordDiff {
    pub word: String,
    pub distance: usize,
}

/// Find words in the provided dictionary that are close to the search word.
///
/// Returns at most `max_results` words with distance at most `max_distance`,
/// closest first. Ties are broken alphabetically.
pub fn find_close_words<'a, I>(
    dictionary: I,
    word: &str,
    max_distance: usize,
    max_results: usize,
) -> Vec<WordDiff>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut diffs: Vec<WordDiff> = dictionary
        .into_iter()
        .map(|candidate| WordDiff {
            word: candidate.to_string(),
            distance: levenshtein_distance(word, candidate),
        })
        .filter(|diff| diff.distance <= max_distance)
        .collect();
    diffs.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.word.cmp(&b.word)));
    diffs.truncate(max_results);
    diffs
}

/// Returns the Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, a_char) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if a_char == *b_char {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! distance_tests {
        ($( ($name: ident, $a: expr, $b: expr, $want: expr), )+) => {
            $(
            #[test]
            fn $name() {
                assert_eq!(levenshtein_distance($a, $b), $want);
            }
            )+
        };
    }

    distance_tests![
        (same, "hbox", "hbox", 0),
        (one_addition, "hbo", "hbox", 1),
        (one_deletion, "hboxx", "hbox", 1),
        (one_substitution, "vbox", "hbox", 1),
        (empty, "", "def", 3),
        (kitten, "kitten", "sitting", 3),
    ];

    #[test]
    fn closest_first() {
        let got = find_close_words(["hbox", "vbox", "vtop", "hskip"], "hbx", 2, 3);
        let words: Vec<&str> = got.iter().map(|d| d.word.as_str()).collect();
        assert_eq!(words, vec!["hbox", "vbox"]);
    }
}
