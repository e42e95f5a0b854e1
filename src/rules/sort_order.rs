
use serde::Serialize;
use std::cmp::Ordering;
use strum_macros::EnumString;

/// The total order records are expected to follow
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq, strum_macros::Display, EnumString, Serialize, clap::ValueEnum)]
pub enum ChromOrder {
    /// Byte-wise CHROM comparison, then numeric POS
    #[default]
    #[strum(ascii_case_insensitive, serialize = "lexicographic")]
    #[clap(name = "lexicographic")]
    Lexicographic,
    /// Numeric-aware CHROM comparison (chr2 < chr10), then numeric POS
    #[strum(ascii_case_insensitive, serialize = "natural")]
    #[clap(name = "natural")]
    Natural
}

impl ChromOrder {
    /// Compares two (CHROM, POS) keys under this order
    pub fn compare(&self, a: (&str, u64), b: (&str, u64)) -> Ordering {
        let chrom_order = match self {
            ChromOrder::Lexicographic => a.0.cmp(b.0),
            ChromOrder::Natural => natural_chrom_cmp(a.0, b.0)
        };
        chrom_order.then(a.1.cmp(&b.1))
    }
}

/// A chromosome name split for natural ordering, e.g. `chr10_alt` -> ("chr", Some(10), "_alt")
#[derive(Debug, Eq, PartialEq)]
struct NaturalChrom<'a> {
    /// The original-case `chr` prefix, or empty
    prefix: &'a str,
    /// The leading numeric run after the prefix
    number: Option<u64>,
    /// Whatever follows the numeric run
    suffix: &'a str
}

/// Splits a chromosome name; returns None if the numeric run does not fit in a u64
fn split_natural(chrom: &str) -> Option<NaturalChrom<'_>> {
    let prefix_len = if chrom.len() >= 3 && chrom.as_bytes()[..3].eq_ignore_ascii_case(b"chr") { 3 } else { 0 };
    let (prefix, rest) = chrom.split_at(prefix_len);
    let digit_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    let (digits, suffix) = rest.split_at(digit_len);
    let number = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<u64>().ok()?)
    };
    Some(NaturalChrom { prefix, number, suffix })
}

/// Natural chromosome comparison: prefix, then the numeric run as an integer, then the suffix.
/// Names with a numeric run sort before names without one; if neither has one, this is a plain string comparison.
pub fn natural_chrom_cmp(a: &str, b: &str) -> Ordering {
    let (na, nb) = match (split_natural(a), split_natural(b)) {
        (Some(na), Some(nb)) => (na, nb),
        _ => return a.cmp(b)
    };

    if na.prefix != nb.prefix {
        return na.prefix.cmp(nb.prefix);
    }
    match (na.number, nb.number) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| na.suffix.cmp(nb.suffix)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b)
    }
}

/// Running sort state; tracks the last accepted (CHROM, POS) and flags keys that move backwards.
#[derive(Debug)]
pub struct SortOrderChecker {
    /// The order to enforce
    order: ChromOrder,
    /// Last accepted key, None until the first record
    last: Option<(String, u64)>
}

impl SortOrderChecker {
    /// Constructor
    pub fn new(order: ChromOrder) -> Self {
        Self {
            order,
            last: None
        }
    }

    /// Records a new key and returns true if it sorts strictly before the previous one.
    /// The stored key is always replaced, so a single misplaced record is only reported once.
    /// # Arguments
    /// * `chrom` - CHROM of the record
    /// * `pos` - parsed POS of the record
    pub fn observe(&mut self, chrom: &str, pos: u64) -> bool {
        self.observe_violation(chrom, pos).is_some()
    }

    /// Same as `observe`, but returns the previous key when the new one is out of order so it can be reported.
    /// # Arguments
    /// * `chrom` - CHROM of the record
    /// * `pos` - parsed POS of the record
    pub fn observe_violation(&mut self, chrom: &str, pos: u64) -> Option<(String, u64)> {
        match self.last.as_mut() {
            Some((last_chrom, last_pos)) => {
                let out_of_order = self.order.compare((chrom, pos), (last_chrom.as_str(), *last_pos)) == Ordering::Less;
                let previous = out_of_order.then(|| (last_chrom.clone(), *last_pos));
                if last_chrom.as_str() != chrom {
                    last_chrom.clear();
                    last_chrom.push_str(chrom);
                }
                *last_pos = pos;
                previous
            },
            None => {
                self.last = Some((chrom.to_string(), pos));
                None
            }
        }
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<(&str, u64)> {
        self.last.as_ref().map(|(c, p)| (c.as_str(), *p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicographic() {
        let order = ChromOrder::Lexicographic;
        assert_eq!(order.compare(("chr1", 100), ("chr1", 200)), Ordering::Less);
        assert_eq!(order.compare(("chr1", 200), ("chr1", 200)), Ordering::Equal);
        assert_eq!(order.compare(("chr10", 1), ("chr2", 1)), Ordering::Less);
        assert_eq!(order.compare(("chr2", 1), ("chr10", 1)), Ordering::Greater);
        // positions are numeric, not strings
        assert_eq!(order.compare(("chr1", 9), ("chr1", 10)), Ordering::Less);
    }

    #[test]
    fn test_natural() {
        assert_eq!(natural_chrom_cmp("chr2", "chr10"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("2", "10"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("chr10", "chr10"), Ordering::Equal);
        assert_eq!(natural_chrom_cmp("chr22", "chrX"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("chrY", "chrX"), Ordering::Greater);
        assert_eq!(natural_chrom_cmp("chr1", "chr1_random"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("chr1_random", "chr2"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("chr01", "chr1"), Ordering::Equal);

        // prefixes compare first and keep their case
        assert_eq!(natural_chrom_cmp("1", "chr1"), Ordering::Less);
        assert_eq!(natural_chrom_cmp("Chr1", "chr1"), Ordering::Less);

        // absurdly long numbers fall back to plain comparison
        assert_eq!(natural_chrom_cmp("chr99999999999999999999999", "chr2"), Ordering::Greater);

        let order = ChromOrder::Natural;
        assert_eq!(order.compare(("chr2", 500), ("chr10", 1)), Ordering::Less);
        assert_eq!(order.compare(("chr2", 500), ("chr2", 1)), Ordering::Greater);
    }

    #[test]
    fn test_split_natural() {
        assert_eq!(split_natural("chr10_alt"), Some(NaturalChrom { prefix: "chr", number: Some(10), suffix: "_alt" }));
        assert_eq!(split_natural("X"), Some(NaturalChrom { prefix: "", number: None, suffix: "X" }));
        assert_eq!(split_natural("CHR7"), Some(NaturalChrom { prefix: "CHR", number: Some(7), suffix: "" }));
        assert_eq!(split_natural("ch"), Some(NaturalChrom { prefix: "", number: None, suffix: "ch" }));
    }

    #[test]
    fn test_checker() {
        let mut checker = SortOrderChecker::new(ChromOrder::Lexicographic);
        assert!(!checker.observe("chr1", 200));
        assert!(checker.observe("chr1", 100));
        // compared to the most recent record, not the max seen
        assert!(!checker.observe("chr1", 150));
        assert!(!checker.observe("chr1", 150));
        assert!(!checker.observe("chr2", 1));
        assert!(checker.observe("chr1", 300));
        assert_eq!(checker.last(), Some(("chr1", 300)));
    }

    #[test]
    fn test_observe_violation() {
        let mut checker = SortOrderChecker::new(ChromOrder::Natural);
        assert_eq!(checker.observe_violation("chr10", 5), None);
        assert_eq!(checker.observe_violation("chr2", 7), Some(("chr10".to_string(), 5)));
        assert_eq!(checker.observe_violation("chr2", 8), None);
    }

    #[test]
    fn test_checker_natural() {
        // chr2 -> chr10 is only backwards lexicographically
        let mut lex = SortOrderChecker::new(ChromOrder::Lexicographic);
        assert!(!lex.observe("chr2", 10));
        assert!(lex.observe("chr10", 5));
        let mut nat = SortOrderChecker::new(ChromOrder::Natural);
        assert!(!nat.observe("chr2", 10));
        assert!(!nat.observe("chr10", 5));
    }
}
