
/// A parsed GT value such as `0/1`, `1|2`, or `./.`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Genotype {
    /// Allele indices, None for a missing allele
    alleles: Vec<Option<usize>>,
    /// True if any separator was `|`
    phased: bool
}

/// Reasons a GT value can be rejected
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum GenotypeError {
    #[error("genotype is empty")]
    Empty,
    #[error("genotype allele \"{token}\" is not an allele index")]
    BadAllele { token: String },
    #[error("genotype mixes called and missing alleles")]
    PartiallyMissing
}

impl Genotype {
    /// Parses a GT value. Accepted forms are `\d+([/|]\d+)*` and the entirely missing forms (`.`, `./.`, `.|.`).
    /// # Arguments
    /// * `value` - the raw GT sub-field
    /// # Errors
    /// * if the value is empty, has a non-numeric allele, or mixes missing and called alleles
    pub fn parse(value: &str) -> Result<Genotype, GenotypeError> {
        if value.is_empty() {
            return Err(GenotypeError::Empty);
        }

        let phased = value.contains('|');
        let mut alleles = vec![];
        for token in value.split(['/', '|']) {
            if token == "." {
                alleles.push(None);
            } else if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
                let index = token.parse::<usize>()
                    .map_err(|_e| GenotypeError::BadAllele { token: token.to_string() })?;
                alleles.push(Some(index));
            } else {
                return Err(GenotypeError::BadAllele { token: token.to_string() });
            }
        }

        let num_missing = alleles.iter().filter(|a| a.is_none()).count();
        if num_missing > 0 && num_missing != alleles.len() {
            return Err(GenotypeError::PartiallyMissing);
        }

        Ok(Genotype {
            alleles,
            phased
        })
    }

    /// Returns the called allele indices, skipping missing ones
    pub fn called_alleles(&self) -> impl Iterator<Item = usize> + '_ {
        self.alleles.iter().flatten().copied()
    }

    /// True if every allele is missing
    #[cfg(test)]
    pub fn is_missing(&self) -> bool {
        self.alleles.iter().all(|a| a.is_none())
    }

    /// The largest allele index referenced, if any
    pub fn max_allele(&self) -> Option<usize> {
        self.called_alleles().max()
    }

    // getters
    pub fn ploidy(&self) -> usize {
        self.alleles.len()
    }

    pub fn alleles(&self) -> &[Option<usize>] {
        &self.alleles
    }

    pub fn is_phased(&self) -> bool {
        self.phased
    }
}

/// Running allele counts over all sample genotypes of one record
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GenotypeTally {
    /// allele_counts[i] = number of times allele i was called
    allele_counts: Vec<u64>,
    /// Total number of called alleles, i.e. the observed AN
    called_alleles: u64,
    /// Number of samples that had a GT value (missing or not)
    genotyped_samples: u64
}

impl GenotypeTally {
    /// Creates an empty tally sized for a record
    /// # Arguments
    /// * `num_alleles` - number of alleles including the reference
    pub fn new(num_alleles: usize) -> Self {
        Self {
            allele_counts: vec![0; num_alleles],
            called_alleles: 0,
            genotyped_samples: 0
        }
    }

    /// Adds one sample's genotype; allele indices beyond the record are counted in the total only
    pub fn add(&mut self, genotype: &Genotype) {
        self.genotyped_samples += 1;
        for allele in genotype.called_alleles() {
            self.called_alleles += 1;
            if let Some(count) = self.allele_counts.get_mut(allele) {
                *count += 1;
            }
        }
    }

    /// Observed count for one allele index; 0 = REF
    pub fn allele_count(&self, allele: usize) -> u64 {
        self.allele_counts.get(allele).copied().unwrap_or(0)
    }

    // getters
    pub fn called_alleles(&self) -> u64 {
        self.called_alleles
    }

    pub fn genotyped_samples(&self) -> u64 {
        self.genotyped_samples
    }
}
