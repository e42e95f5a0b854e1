
use itertools::Itertools;

/// Normalized identity of a variant used for duplicate detection.
/// Alleles are upper-cased and the ALT list is sorted so `A>G,T` and `a>T,G` are the same variant.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VariantKey {
    chrom: String,
    pos: u64,
    reference: String,
    alternates: Vec<String>
}

impl VariantKey {
    /// Constructor
    /// # Arguments
    /// * `chrom` - the CHROM column
    /// * `pos` - the parsed 1-based position
    /// * `reference` - the REF column
    /// * `alternates` - the ALT alleles in file order
    pub fn new(chrom: &str, pos: u64, reference: &str, alternates: &[&str]) -> Self {
        let alternates = alternates.iter()
            .map(|a| a.to_ascii_uppercase())
            .sorted()
            .collect();
        Self {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_ascii_uppercase(),
            alternates
        }
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}:{}", self.chrom, self.pos, self.reference, self.alternates.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized() {
        let k1 = VariantKey::new("chr1", 100, "A", &["G", "T"]);
        let k2 = VariantKey::new("chr1", 100, "a", &["t", "G"]);
        assert_eq!(k1, k2);
        assert_eq!(k1.to_string(), "chr1:100:A:G,T");

        // chromosome names are case sensitive
        assert_ne!(k1, VariantKey::new("CHR1", 100, "A", &["G", "T"]));
        assert_ne!(k1, VariantKey::new("chr1", 101, "A", &["G", "T"]));
    }
}
