
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::str::FromStr;
use strum_macros::EnumString;

/// The standard leading columns of every VCF data line
pub const FIXED_COLUMNS: [&str; 8] = ["#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];
/// Index of the FORMAT column, when present
pub const FORMAT_COLUMN: usize = 8;
/// Ploidy assumed when nothing else tells us
pub const DEFAULT_PLOIDY: usize = 2;

/// The declared arity of an INFO or FORMAT key
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Number {
    /// An exact number of values, e.g. Number=1; Number=0 is a flag
    Fixed(usize),
    /// Number=A, one value per alternate allele
    PerAltAllele,
    /// Number=R, one value per allele including the reference
    PerAllele,
    /// Number=G, one value per possible genotype
    PerGenotype,
    /// Number=., anything goes
    Unbounded
}

impl Number {
    /// Returns the number of values this arity requires for a record, or None if it is unbounded.
    /// A Number=G count too large to represent is treated as unbounded.
    /// # Arguments
    /// * `num_alts` - the number of alternate alleles in the record
    /// * `ploidy` - the ploidy to use for Number=G
    pub fn expected_count(&self, num_alts: usize, ploidy: usize) -> Option<usize> {
        match self {
            Number::Fixed(n) => Some(*n),
            Number::PerAltAllele => Some(num_alts),
            Number::PerAllele => Some(num_alts + 1),
            Number::PerGenotype => genotype_count(num_alts + 1, ploidy),
            Number::Unbounded => None
        }
    }
}

impl FromStr for Number {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Number::PerAltAllele),
            "R" => Ok(Number::PerAllele),
            "G" => Ok(Number::PerGenotype),
            "." => Ok(Number::Unbounded),
            _ => s.parse::<usize>()
                .map(Number::Fixed)
                .map_err(|_e| format!("invalid Number \"{s}\""))
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Fixed(n) => write!(f, "{n}"),
            Number::PerAltAllele => write!(f, "A"),
            Number::PerAllele => write!(f, "R"),
            Number::PerGenotype => write!(f, "G"),
            Number::Unbounded => write!(f, ".")
        }
    }
}

/// Number of unordered genotypes for a given allele count and ploidy, i.e. C(alleles + ploidy - 1, ploidy).
/// # Arguments
/// * `num_alleles` - number of alleles including the reference
/// * `ploidy` - number of alleles per genotype
/// # Returns
/// * None if the count does not fit in a `usize`
pub fn genotype_count(num_alleles: usize, ploidy: usize) -> Option<usize> {
    // multiplicative form of the binomial keeps every intermediate value an integer
    let mut count: usize = 1;
    for i in 1..=ploidy {
        let factor = num_alleles.checked_add(i - 1)?;
        count = count.checked_mul(factor)? / i;
    }
    Some(count)
}

/// Declared value type of an INFO or FORMAT key
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::Display, EnumString)]
pub enum ValueType {
    Integer,
    Float,
    Flag,
    Character,
    String
}

impl ValueType {
    /// Returns true if a single (non-missing) value is acceptable for this type
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            ValueType::Integer => value.parse::<i64>().is_ok(),
            ValueType::Float => value.parse::<f64>().is_ok(),
            ValueType::Character => value.chars().count() == 1,
            ValueType::String => true,
            // flags never carry values
            ValueType::Flag => false
        }
    }
}

/// Which block of declarations a key belongs to
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, strum_macros::Display)]
pub enum Namespace {
    #[strum(serialize = "INFO")]
    Info,
    #[strum(serialize = "FORMAT")]
    Format
}

/// A single INFO/FORMAT declaration
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldDefinition {
    /// Declared arity
    number: Number,
    /// Declared value type
    value_type: ValueType
}

impl FieldDefinition {
    /// Constructor
    pub fn new(number: Number, value_type: ValueType) -> Self {
        Self { number, value_type }
    }

    // getters
    pub fn number(&self) -> Number {
        self.number
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }
}

/// Returns the standard definition for INFO keys reserved by the VCF specification.
/// These are accepted without a header declaration.
pub fn reserved_info_definition(key: &str) -> Option<FieldDefinition> {
    use Number::*;
    use ValueType::*;
    let (number, value_type) = match key {
        "AA" => (Fixed(1), String),
        "AC" => (PerAltAllele, Integer),
        "AF" => (PerAltAllele, Float),
        "AN" => (Fixed(1), Integer),
        "BQ" => (Fixed(1), Float),
        "CIGAR" => (PerAltAllele, String),
        "DP" => (Fixed(1), Integer),
        "END" => (Fixed(1), Integer),
        "MQ" => (Fixed(1), Float),
        "MQ0" => (Fixed(1), Integer),
        "NS" => (Fixed(1), Integer),
        "SB" => (Fixed(4), Integer),
        "DB" | "H2" | "H3" | "SOMATIC" | "VALIDATED" | "1000G" => (Fixed(0), Flag),
        _ => return None
    };
    Some(FieldDefinition::new(number, value_type))
}

/// The schema a file declares for itself: INFO/FORMAT keys plus the column layout from the #CHROM line.
/// Built once by the header pass and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct HeaderSchema {
    /// INFO declarations in declaration order
    info: IndexMap<String, FieldDefinition>,
    /// FORMAT declarations in declaration order
    format: IndexMap<String, FieldDefinition>,
    /// Number of columns on the #CHROM line
    column_count: usize,
    /// Sample names from the #CHROM line
    sample_names: Vec<String>
}

impl HeaderSchema {
    /// Creates a schema from the collected declarations and the #CHROM columns.
    /// # Arguments
    /// * `info` - INFO declarations
    /// * `format` - FORMAT declarations
    /// * `column_count` - total columns on the #CHROM line
    /// * `sample_names` - the sample columns, possibly empty
    pub fn new(
        info: IndexMap<String, FieldDefinition>, format: IndexMap<String, FieldDefinition>,
        column_count: usize, sample_names: Vec<String>
    ) -> Self {
        Self {
            info, format, column_count, sample_names
        }
    }

    /// Looks up an INFO key, falling back to the reserved keys
    pub fn info_definition(&self, key: &str) -> Option<FieldDefinition> {
        self.info.get(key).copied()
            .or_else(|| reserved_info_definition(key))
    }

    /// Looks up a FORMAT key; FORMAT keys must always be declared
    pub fn format_definition(&self, key: &str) -> Option<FieldDefinition> {
        self.format.get(key).copied()
    }

    /// True if the #CHROM line carried a FORMAT column
    pub fn has_format(&self) -> bool {
        self.column_count > FORMAT_COLUMN
    }

    /// Returns the sample names that appear more than once, in first-repeat order
    pub fn duplicate_sample_names(&self) -> Vec<&str> {
        let mut seen: FxHashSet<&str> = Default::default();
        let mut reported: FxHashSet<&str> = Default::default();
        let mut duplicates = vec![];
        for name in self.sample_names.iter() {
            if !seen.insert(name.as_str()) && reported.insert(name.as_str()) {
                duplicates.push(name.as_str());
            }
        }
        duplicates
    }

    // getters
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn sample_count(&self) -> usize {
        self.sample_names.len()
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn info(&self) -> &IndexMap<String, FieldDefinition> {
        &self.info
    }

    pub fn format(&self) -> &IndexMap<String, FieldDefinition> {
        &self.format
    }
}
