
use crate::data_types::finding::Finding;
use crate::data_types::genotype::GenotypeTally;
use crate::data_types::record_fields::RecordFields;

/// The AN and AC values pulled from an INFO column; either may be absent or unparseable
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AlleleCounts {
    /// Parsed AN
    pub allele_number: Option<u64>,
    /// Parsed AC, one value per ALT allele
    pub allele_counts: Option<Vec<u64>>
}

impl AlleleCounts {
    /// Extracts AN and AC from a record.
    /// Missing (`.`) or non-integer values are treated as absent; the INFO type rules already report those.
    pub fn from_record(fields: &RecordFields) -> Self {
        let mut result = Self::default();
        for (key, value) in fields.info_entries() {
            match (key, value) {
                ("AN", Some(v)) => {
                    result.allele_number = v.parse::<u64>().ok();
                },
                ("AC", Some(v)) => {
                    result.allele_counts = v.split(',')
                        .map(|c| c.parse::<u64>().ok())
                        .collect::<Option<Vec<u64>>>();
                },
                _ => {}
            }
        }
        result
    }
}

/// Cross-checks INFO AN/AC against each other and, when genotypes are present, against the observed calls.
/// The AC value count itself is covered by the INFO arity rule and is not repeated here.
/// # Arguments
/// * `line_number` - line being checked
/// * `fields` - the split record
/// * `tally` - allele counts observed in the sample genotypes, if the record has GT
pub fn check_allele_consistency(line_number: usize, fields: &RecordFields, tally: Option<&GenotypeTally>) -> Vec<Finding> {
    let counts = AlleleCounts::from_record(fields);
    let num_alts = fields.alt_alleles().len();
    let mut findings = vec![];

    if let (Some(an), Some(ac)) = (counts.allele_number, counts.allele_counts.as_ref()) {
        // an AC sum past u64::MAX certainly exceeds AN
        let total: u128 = ac.iter().map(|&c| u128::from(c)).sum();
        if total > u128::from(an) {
            findings.push(Finding::warning(line_number, format!("sum of AC ({total}) exceeds AN ({an})")));
        }
    }

    // only compare against genotypes when at least one sample was genotyped
    let Some(tally) = tally.filter(|t| t.genotyped_samples() > 0) else {
        return findings;
    };

    if let Some(an) = counts.allele_number {
        if an != tally.called_alleles() {
            findings.push(Finding::warning(line_number,
                format!("AN is {an} but genotypes contain {} called alleles", tally.called_alleles())
            ));
        }
    }

    if let Some(ac) = counts.allele_counts.as_ref() {
        if ac.len() == num_alts {
            for (alt_offset, &declared) in ac.iter().enumerate() {
                let allele_index = alt_offset + 1;
                let observed = tally.allele_count(allele_index);
                if declared != observed {
                    findings.push(Finding::warning(line_number,
                        format!("AC for ALT allele {allele_index} is {declared} but genotypes contain {observed}")
                    ));
                }
            }
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::genotype::Genotype;

    fn tally_of(num_alleles: usize, genotypes: &[&str]) -> GenotypeTally {
        let mut tally = GenotypeTally::new(num_alleles);
        for gt in genotypes.iter() {
            tally.add(&Genotype::parse(gt).unwrap());
        }
        tally
    }

    fn messages(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.message()).collect()
    }

    #[test]
    fn test_extract() {
        let fields = RecordFields::split("1\t5\t.\tC\tA,G\t.\t.\tAN=6;DP=3;AC=1,2").unwrap();
        let counts = AlleleCounts::from_record(&fields);
        assert_eq!(counts.allele_number, Some(6));
        assert_eq!(counts.allele_counts, Some(vec![1, 2]));

        let fields = RecordFields::split("1\t5\t.\tC\tA,G\t.\t.\tAN=.;AC=1,x").unwrap();
        assert_eq!(AlleleCounts::from_record(&fields), AlleleCounts::default());
    }

    #[test]
    fn test_consistent() {
        let fields = RecordFields::split("1\t5\t.\tC\tA,G\t.\t.\tAN=4;AC=1,2\tGT\t0/1\t2/2").unwrap();
        let tally = tally_of(3, &["0/1", "2/2"]);
        assert!(check_allele_consistency(5, &fields, Some(&tally)).is_empty());
        // sites-only records only get the AN/AC sanity check
        assert!(check_allele_consistency(5, &fields, None).is_empty());
    }

    #[test]
    fn test_sum_exceeds_an() {
        let fields = RecordFields::split("1\t5\t.\tC\tA,G\t.\t.\tAN=2;AC=2,1").unwrap();
        let findings = check_allele_consistency(7, &fields, None);
        assert_eq!(messages(&findings), vec!["sum of AC (3) exceeds AN (2)"]);
        assert_eq!(findings[0].line_number(), Some(7));
    }

    #[test]
    fn test_sum_beyond_u64() {
        let fields = RecordFields::split(
            "1\t5\t.\tC\tA,G,T\t.\t.\tAN=6;AC=9223372036854775807,9223372036854775807,9223372036854775807"
        ).unwrap();
        let findings = check_allele_consistency(7, &fields, None);
        assert_eq!(messages(&findings), vec!["sum of AC (27670116110564327421) exceeds AN (6)"]);
    }

    #[test]
    fn test_genotype_mismatch() {
        let fields = RecordFields::split("1\t5\t.\tC\tA\t.\t.\tAN=4;AC=1\tGT\t1/1\t./.").unwrap();
        let tally = tally_of(2, &["1/1", "./."]);
        assert_eq!(messages(&check_allele_consistency(5, &fields, Some(&tally))), vec![
            "AN is 4 but genotypes contain 2 called alleles",
            "AC for ALT allele 1 is 1 but genotypes contain 2"
        ]);

        // wrong AC arity is left to the INFO rules
        let fields = RecordFields::split("1\t5\t.\tC\tA\t.\t.\tAN=2;AC=1,1\tGT\t1/1").unwrap();
        let tally = tally_of(2, &["1/1"]);
        assert!(check_allele_consistency(5, &fields, Some(&tally)).is_empty());
    }

    #[test]
    fn test_no_genotyped_samples() {
        let fields = RecordFields::split("1\t5\t.\tC\tA\t.\t.\tAN=4;AC=1\tGT\t.").unwrap();
        let tally = GenotypeTally::new(2);
        assert!(check_allele_consistency(5, &fields, Some(&tally)).is_empty());
    }
}
