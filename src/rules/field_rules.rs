/*!
# Field rules
The per-record rule engine.
Each data line is checked by a fixed sequence of rules (columns, CHROM, POS, ID, REF/ALT, QUAL, FILTER, INFO, FORMAT/genotypes, ALT-observed).
The rules are independent of each other: a failure in one rule does not suppress later rules, with the single exception of a line that is too short to split into the fixed columns.
*/

use rustc_hash::FxHashSet;

use crate::data_types::finding::Finding;
use crate::data_types::genotype::{Genotype, GenotypeTally};
use crate::data_types::header_schema::{FieldDefinition, HeaderSchema, ValueType, DEFAULT_PLOIDY, FIXED_COLUMNS};
use crate::data_types::record_fields::RecordFields;
use crate::parsing::dbsnp_lookup::IdLookup;
use crate::parsing::reference_lookup::ReferenceLookup;
use crate::rules::strictness::StrictnessPolicy;

/// Everything the rules learned about one data line
#[derive(Debug, Default)]
pub struct RecordReport<'l> {
    /// Findings in rule order
    pub findings: Vec<Finding>,
    /// The split columns; None if the line had fewer than the fixed columns
    pub fields: Option<RecordFields<'l>>,
    /// The parsed POS, if it was a valid positive integer
    pub position: Option<u64>,
    /// Allele counts over the sample genotypes, if the record has a GT key
    pub tally: Option<GenotypeTally>
}

impl RecordReport<'_> {
    /// The (CHROM, POS) sort key; only available when both columns were accepted
    pub fn sort_key(&self) -> Option<(&str, u64)> {
        let fields = self.fields.as_ref()?;
        let position = self.position?;
        if fields.chrom().is_empty() {
            None
        } else {
            Some((fields.chrom(), position))
        }
    }
}

/// Problems a value list can have relative to its declaration
#[derive(Debug, Eq, PartialEq)]
pub enum ValueProblem<'v> {
    /// Wrong number of comma-separated values
    Count { expected: usize, found: usize },
    /// A value that does not parse as the declared type
    Type { value: &'v str, value_type: ValueType }
}

/// Checks a comma-separated value list against a declaration; a lone `.` is missing and always passes.
/// Count problems are reported ahead of type problems.
/// # Arguments
/// * `definition` - the declared Number and Type
/// * `values` - the raw value text
/// * `num_alts` - number of ALT alleles in the record
/// * `ploidy` - ploidy used for Number=G
pub fn check_values<'v>(definition: &FieldDefinition, values: &'v str, num_alts: usize, ploidy: usize) -> Option<ValueProblem<'v>> {
    if values == "." {
        return None;
    }
    let split: Vec<&str> = values.split(',').collect();
    if let Some(expected) = definition.number().expected_count(num_alts, ploidy) {
        if split.len() != expected {
            return Some(ValueProblem::Count { expected, found: split.len() });
        }
    }
    let value_type = definition.value_type();
    split.into_iter()
        .find(|v| *v != "." && !value_type.accepts(v))
        .map(|value| ValueProblem::Type { value, value_type })
}

/// True if every base is one of A, C, G, T, N in any case
pub fn is_valid_bases(allele: &str) -> bool {
    allele.bytes().all(|b| matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N'))
}

/// True for ALT alleles that are not literal sequence: symbolic `<...>`, the spanning deletion `*`, and breakends
pub fn is_opaque_allele(allele: &str) -> bool {
    (allele.starts_with('<') && allele.ends_with('>')) ||
        allele == "*" ||
        allele.contains('[') || allele.contains(']')
}

/// Placeholder ALT alleles that are never expected to appear in a genotype
fn is_placeholder_allele(allele: &str) -> bool {
    allele == "<*>" || allele == "<NON_REF>"
}

/// Compares a REF allele to the genome, where `N` on either side matches anything
fn matches_reference(allele: &str, genome: &[u8]) -> bool {
    allele.len() == genome.len() &&
        allele.bytes().zip(genome.iter()).all(|(a, g)| {
            let a = a.to_ascii_uppercase();
            let g = g.to_ascii_uppercase();
            a == g || a == b'N' || g == b'N'
        })
}

/// Runs the per-record rules against a built header schema
pub struct FieldRules<'s> {
    /// The declarations and column layout from the header
    schema: &'s HeaderSchema,
    /// Decides the column/sub-field comparisons
    policy: StrictnessPolicy,
    /// Optional genome used to verify REF
    reference: Option<&'s dyn ReferenceLookup>,
    /// Optional known IDs used to verify ID
    known_ids: Option<&'s dyn IdLookup>
}

impl<'s> FieldRules<'s> {
    /// Constructor
    /// # Arguments
    /// * `schema` - the built header schema
    /// * `policy` - strictness policy for the structural comparisons
    /// * `reference` - optional REF lookup
    /// * `known_ids` - optional ID lookup
    pub fn new(
        schema: &'s HeaderSchema, policy: StrictnessPolicy,
        reference: Option<&'s dyn ReferenceLookup>, known_ids: Option<&'s dyn IdLookup>
    ) -> Self {
        Self {
            schema, policy, reference, known_ids
        }
    }

    /// Runs every rule on a data line, in order.
    /// # Arguments
    /// * `line_number` - 1-based line number for findings
    /// * `line` - the data line without its terminator
    pub fn check_line<'l>(&self, line_number: usize, line: &'l str) -> RecordReport<'l> {
        let mut report = RecordReport::default();
        let fields = match RecordFields::split(line) {
            Ok(f) => f,
            Err(found) => {
                report.findings.push(Finding::error(line_number,
                    format!("has {found} columns, fewer than the {} required", FIXED_COLUMNS.len())
                ));
                return report;
            }
        };

        let findings = &mut report.findings;
        if let Some(f) = self.policy.check_column_count(line_number, fields.column_count(), self.schema.column_count()) {
            findings.push(f);
        }
        self.check_chrom(line_number, &fields, findings);
        let position = self.check_pos(line_number, &fields, findings);
        self.check_id(line_number, &fields, findings);
        self.check_alleles(line_number, &fields, position, findings);
        self.check_qual(line_number, &fields, findings);
        if fields.filter().is_empty() {
            findings.push(Finding::error(line_number, "FILTER is empty".to_string()));
        }
        self.check_info(line_number, &fields, findings);
        let tally = self.check_format(line_number, &fields, findings);
        if let Some(t) = tally.as_ref() {
            self.check_alt_observed(line_number, &fields, t, findings);
        }

        report.fields = Some(fields);
        report.position = position;
        report.tally = tally;
        report
    }

    fn check_chrom(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) {
        let chrom = fields.chrom();
        if chrom.is_empty() {
            findings.push(Finding::error(line_number, "CHROM is empty".to_string()));
        } else if let Some(reference) = self.reference {
            if !reference.has_contig(chrom) {
                findings.push(Finding::warning(line_number, format!("CHROM \"{chrom}\" is not in the reference")));
            }
        }
    }

    /// Returns the parsed position when it is a positive integer
    fn check_pos(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) -> Option<u64> {
        match fields.pos().parse::<i64>() {
            Ok(p) if p > 0 => Some(p as u64),
            Ok(_) => {
                findings.push(Finding::error(line_number, "POS must be >0".to_string()));
                None
            },
            Err(_) => {
                findings.push(Finding::error(line_number, format!("POS \"{}\" is not a valid integer", fields.pos())));
                None
            }
        }
    }

    fn check_id(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) {
        let Some(known_ids) = self.known_ids else {
            return;
        };
        for id in fields.id().split(';').filter(|id| !id.is_empty() && *id != ".") {
            if !known_ids.contains_id(id) {
                findings.push(Finding::warning(line_number, format!("ID \"{id}\" is not in dbSNP")));
            }
        }
    }

    fn check_alleles(&self, line_number: usize, fields: &RecordFields, position: Option<u64>, findings: &mut Vec<Finding>) {
        let reference_allele = fields.reference();
        let ref_ok = if reference_allele.is_empty() {
            findings.push(Finding::error(line_number, "REF is empty".to_string()));
            false
        } else if !is_valid_bases(reference_allele) {
            findings.push(Finding::error(line_number, "REF has invalid characters".to_string()));
            false
        } else {
            true
        };

        let alternate = fields.alternate();
        if alternate.is_empty() || fields.alt_alleles().iter().any(|a| a.is_empty()) {
            findings.push(Finding::error(line_number, "ALT is empty".to_string()));
        } else if fields.alt_alleles().iter().any(|a| !is_opaque_allele(a) && !is_valid_bases(a)) {
            findings.push(Finding::error(line_number, "ALT has invalid characters".to_string()));
        }

        // the genome check needs a clean REF and a usable position
        let (Some(reference), Some(pos), true) = (self.reference, position, ref_ok) else {
            return;
        };
        let chrom = fields.chrom();
        if !reference.has_contig(chrom) {
            return;
        }
        match reference.lookup(chrom, pos, reference_allele.len()) {
            Some(genome) => {
                if !matches_reference(reference_allele, &genome) {
                    findings.push(Finding::error(line_number, format!(
                        "REF {reference_allele} does not match the reference ({}) at {chrom}:{pos}",
                        String::from_utf8_lossy(&genome)
                    )));
                }
            },
            None => {
                findings.push(Finding::error(line_number, format!("REF extends beyond the end of {chrom}")));
            }
        }
    }

    fn check_qual(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) {
        let qual = fields.qual();
        if qual == "." {
            return;
        }
        match qual.parse::<f64>() {
            Ok(q) if !q.is_finite() => findings.push(Finding::error(line_number, "invalid QUAL".to_string())),
            Ok(q) if q < 0.0 => findings.push(Finding::error(line_number, "negative QUAL".to_string())),
            Ok(_) => {},
            Err(_) => findings.push(Finding::error(line_number, "invalid QUAL".to_string()))
        }
    }

    fn check_info(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) {
        if fields.info().is_empty() {
            findings.push(Finding::error(line_number, "INFO is empty".to_string()));
            return;
        }

        let num_alts = fields.alt_alleles().len();
        let mut seen: FxHashSet<&str> = Default::default();
        for (key, value) in fields.info_entries() {
            if key.is_empty() {
                findings.push(Finding::warning(line_number, "INFO has an empty key".to_string()));
                continue;
            }
            if !seen.insert(key) {
                findings.push(Finding::warning(line_number, format!("INFO field {key} appears more than once")));
                continue;
            }
            let Some(definition) = self.schema.info_definition(key) else {
                findings.push(Finding::warning(line_number, format!("INFO field {key} not defined in header")));
                continue;
            };

            match (definition.value_type(), value) {
                (ValueType::Flag, Some(_)) => {
                    findings.push(Finding::warning(line_number, format!("INFO flag {key} should not have a value")));
                },
                (ValueType::Flag, None) => {},
                (_, None) => {
                    findings.push(Finding::warning(line_number, format!("INFO field {key} is missing a value")));
                },
                (_, Some(values)) => {
                    match check_values(&definition, values, num_alts, DEFAULT_PLOIDY) {
                        Some(ValueProblem::Count { expected, found }) => {
                            findings.push(Finding::warning(line_number,
                                format!("INFO field {key} expected {expected} values but found {found}")
                            ));
                        },
                        Some(ValueProblem::Type { value, value_type }) => {
                            findings.push(Finding::warning(line_number,
                                format!("INFO field {key} value \"{value}\" is not of type {value_type}")
                            ));
                        },
                        None => {}
                    }
                }
            }
        }
    }

    /// Checks the FORMAT keys and every sample; returns the genotype tally when GT is one of the keys
    fn check_format(&self, line_number: usize, fields: &RecordFields, findings: &mut Vec<Finding>) -> Option<GenotypeTally> {
        let format = fields.format()?;
        if format.is_empty() || format == "." {
            if fields.samples().iter().any(|s| !s.is_empty() && *s != ".") {
                findings.push(Finding::error(line_number, "FORMAT is empty but samples are present".to_string()));
            }
            return None;
        }

        let keys: Vec<&str> = format.split(':').collect();
        let mut seen: FxHashSet<&str> = Default::default();
        for key in keys.iter().copied() {
            if !seen.insert(key) {
                findings.push(Finding::warning(line_number, format!("FORMAT field {key} appears more than once")));
            } else if self.schema.format_definition(key).is_none() {
                findings.push(Finding::warning(line_number, format!("FORMAT field {key} not defined in header")));
            }
        }

        let gt_index = keys.iter().position(|k| *k == "GT");
        if matches!(gt_index, Some(i) if i > 0) {
            findings.push(Finding::warning(line_number, "GT must be the first FORMAT field".to_string()));
        }

        let num_alts = fields.alt_alleles().len();
        let mut tally = gt_index.map(|_| GenotypeTally::new(num_alts + 1));
        for (sample_offset, sample) in fields.samples().iter().enumerate() {
            if sample.is_empty() || *sample == "." {
                continue;
            }
            let sample_index = sample_offset + 1;
            let values: Vec<&str> = sample.split(':').collect();
            if let Some(f) = self.policy.check_sample_fields(line_number, sample_index, values.len(), keys.len()) {
                findings.push(f);
            }

            // the genotype decides the ploidy used for Number=G keys in the same sample
            let mut ploidy = DEFAULT_PLOIDY;
            if let Some(gt_value) = gt_index.and_then(|i| values.get(i)) {
                match Genotype::parse(gt_value) {
                    Ok(genotype) => {
                        if let Some(max_allele) = genotype.max_allele() {
                            if max_allele > num_alts {
                                findings.push(Finding::warning(line_number, format!(
                                    "sample column {sample_index} genotype references allele {max_allele} but there are only {num_alts} ALT alleles"
                                )));
                            }
                        }
                        ploidy = genotype.ploidy();
                        if let Some(t) = tally.as_mut() {
                            t.add(&genotype);
                        }
                    },
                    Err(e) => {
                        findings.push(Finding::warning(line_number,
                            format!("invalid genotype \"{gt_value}\" in sample column {sample_index} ({e})")
                        ));
                    }
                }
            }

            for (key, value) in keys.iter().zip(values.iter()) {
                if *key == "GT" || value.is_empty() {
                    continue;
                }
                let Some(definition) = self.schema.format_definition(key) else {
                    continue;
                };
                match check_values(&definition, value, num_alts, ploidy) {
                    Some(ValueProblem::Count { expected, found }) => {
                        findings.push(Finding::warning(line_number, format!(
                            "FORMAT field {key} in sample column {sample_index} expected {expected} values but found {found}"
                        )));
                    },
                    Some(ValueProblem::Type { value, value_type }) => {
                        findings.push(Finding::warning(line_number, format!(
                            "FORMAT field {key} value \"{value}\" in sample column {sample_index} is not of type {value_type}"
                        )));
                    },
                    None => {}
                }
            }
        }
        tally
    }

    fn check_alt_observed(&self, line_number: usize, fields: &RecordFields, tally: &GenotypeTally, findings: &mut Vec<Finding>) {
        // nothing was called, so nothing can be said about the ALTs
        if tally.called_alleles() == 0 {
            return;
        }
        for (alt_offset, allele) in fields.alt_alleles().iter().enumerate() {
            let allele_index = alt_offset + 1;
            if is_placeholder_allele(allele) {
                continue;
            }
            if tally.allele_count(allele_index) == 0 {
                findings.push(Finding::warning(line_number,
                    format!("ALT allele {allele_index} ({allele}) is not observed in any sample genotype")
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::header_schema::Number;
    use crate::parsing::dbsnp_lookup::KnownIds;
    use crate::parsing::reference_lookup::ReferenceSequences;
    use indexmap::IndexMap;
    use rust_lib_reference_genome::reference_genome::ReferenceGenome;

    fn test_schema(samples: &[&str]) -> HeaderSchema {
        let info: IndexMap<String, FieldDefinition> = [
            ("DP", FieldDefinition::new(Number::Fixed(1), ValueType::Integer)),
            ("AF", FieldDefinition::new(Number::PerAltAllele, ValueType::Float)),
            ("PL3", FieldDefinition::new(Number::PerGenotype, ValueType::Integer)),
            ("TAG", FieldDefinition::new(Number::Fixed(0), ValueType::Flag))
        ].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let format: IndexMap<String, FieldDefinition> = [
            ("GT", FieldDefinition::new(Number::Fixed(1), ValueType::String)),
            ("DP", FieldDefinition::new(Number::Fixed(1), ValueType::Integer)),
            ("AD", FieldDefinition::new(Number::PerAllele, ValueType::Integer)),
            ("PL", FieldDefinition::new(Number::PerGenotype, ValueType::Integer))
        ].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let column_count = if samples.is_empty() { 8 } else { 9 + samples.len() };
        HeaderSchema::new(info, format, column_count, samples.iter().map(|s| s.to_string()).collect())
    }

    fn messages(report: &RecordReport) -> Vec<String> {
        report.findings.iter().map(|f| format!("{}: {}", f.severity(), f.message())).collect()
    }

    fn check(schema: &HeaderSchema, line: &str) -> Vec<String> {
        let rules = FieldRules::new(schema, StrictnessPolicy::new(false), None, None);
        let report = rules.check_line(2, line);
        messages(&report)
    }

    #[test]
    fn test_valid_sites_only() {
        let schema = test_schema(&[]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(false), None, None);
        let report = rules.check_line(2, "chr1\t100\trs1\tA\tG\t30\tPASS\tDP=10");
        assert!(report.findings.is_empty(), "{:?}", report.findings);
        assert_eq!(report.position, Some(100));
        assert_eq!(report.sort_key(), Some(("chr1", 100)));
        assert!(report.tally.is_none());

        // lower case bases, missing values and reserved keys are all fine
        assert!(check(&schema, "chr1\t100\t.\tacgtn\tg,<DEL>,*,G]chr2:5]\t.\t.\tAF=.,0.1,1e-3,0.2;DB;AN=4").is_empty());
    }

    #[test]
    fn test_too_few_columns() {
        let schema = test_schema(&[]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(false), None, None);
        let report = rules.check_line(5, "chr1\t100\trs1\tA\tG");
        assert_eq!(messages(&report), vec!["Error: has 5 columns, fewer than the 8 required"]);
        assert!(report.fields.is_none());
        assert_eq!(report.sort_key(), None);
    }

    #[test]
    fn test_column_count_vs_header() {
        let schema = test_schema(&["S1"]);
        let line = "chr1\t100\t.\tA\tG\t.\tPASS\t.";
        assert_eq!(check(&schema, line), vec!["Warning: has 8 columns but header specifies 10"]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(true), None, None);
        assert_eq!(messages(&rules.check_line(2, line)), vec!["Error: has 8 columns but header specifies 10"]);
    }

    #[test]
    fn test_fixed_columns() {
        let schema = test_schema(&[]);
        assert_eq!(check(&schema, "\t100\t.\tA\tG\t.\tPASS\t."), vec!["Error: CHROM is empty"]);
        assert_eq!(check(&schema, "chr1\t0\t.\tA\tG\t.\tPASS\t."), vec!["Error: POS must be >0"]);
        assert_eq!(check(&schema, "chr1\t-5\t.\tA\tG\t.\tPASS\t."), vec!["Error: POS must be >0"]);
        assert_eq!(check(&schema, "chr1\tabc\t.\tA\tG\t.\tPASS\t."), vec!["Error: POS \"abc\" is not a valid integer"]);
        assert_eq!(check(&schema, "chr1\t1\t.\t\tG\t.\tPASS\t."), vec!["Error: REF is empty"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tAX\tG\t.\tPASS\t."), vec!["Error: REF has invalid characters"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\t\t.\tPASS\t."), vec!["Error: ALT is empty"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG,\t.\tPASS\t."), vec!["Error: ALT is empty"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG,R\t.\tPASS\t."), vec!["Error: ALT has invalid characters"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG\t-1\tPASS\t."), vec!["Error: negative QUAL"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG\thigh\tPASS\t."), vec!["Error: invalid QUAL"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG\tinf\tPASS\t."), vec!["Error: invalid QUAL"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG\t.\t\t."), vec!["Error: FILTER is empty"]);
        assert_eq!(check(&schema, "chr1\t1\t.\tA\tG\t.\tPASS\t"), vec!["Error: INFO is empty"]);
    }

    #[test]
    fn test_rules_are_independent() {
        let schema = test_schema(&[]);
        assert_eq!(check(&schema, "chr1\t0\t.\tZ\tG\t-1\t\tFOO=1"), vec![
            "Error: POS must be >0",
            "Error: REF has invalid characters",
            "Error: negative QUAL",
            "Error: FILTER is empty",
            "Warning: INFO field FOO not defined in header"
        ]);
    }

    #[test]
    fn test_info() {
        let schema = test_schema(&[]);
        let base = "chr1\t1\t.\tA\tG,T\t.\tPASS\t";
        let run = |info: &str| check(&schema, &format!("{base}{info}"));
        assert!(run("DP=5;AF=0.1,0.2;TAG;PL3=1,2,3,4,5,6").is_empty());
        assert_eq!(run("DP=5;DP=6"), vec!["Warning: INFO field DP appears more than once"]);
        assert_eq!(run("AF=0.1"), vec!["Warning: INFO field AF expected 2 values but found 1"]);
        assert_eq!(run("PL3=1,2,3"), vec!["Warning: INFO field PL3 expected 6 values but found 3"]);
        assert_eq!(run("DP=five"), vec!["Warning: INFO field DP value \"five\" is not of type Integer"]);
        assert_eq!(run("TAG=1"), vec!["Warning: INFO flag TAG should not have a value"]);
        assert_eq!(run("DP"), vec!["Warning: INFO field DP is missing a value"]);
        assert_eq!(run("=3"), vec!["Warning: INFO has an empty key"]);
        assert_eq!(run("DP=."), Vec::<String>::new());
        // reserved keys are checked against their standard definitions
        assert_eq!(run("AC=1"), vec!["Warning: INFO field AC expected 2 values but found 1"]);
    }

    #[test]
    fn test_format() {
        let schema = test_schema(&["S1", "S2"]);
        let base = "chr1\t1\t.\tA\tG\t.\tPASS\t.\t";
        let run = |rest: &str| check(&schema, &format!("{base}{rest}"));
        assert!(run("GT:DP:AD:PL\t0/1:10:5,5:0,10,100\t1|1:.:.:.").is_empty());
        assert!(run("GT\t.\t./.").is_empty());
        assert_eq!(run("GT:XX\t0/1:1\t0/1:1"), vec!["Warning: FORMAT field XX not defined in header"]);
        assert_eq!(run("DP:GT\t3:0/1\t3:1/1"), vec!["Warning: GT must be the first FORMAT field"]);
        assert_eq!(run("GT:GT\t0/1:0/1\t1/1:1/1"), vec!["Warning: FORMAT field GT appears more than once"]);
        assert_eq!(run("GT\t0/1\t0/A"), vec!["Warning: invalid genotype \"0/A\" in sample column 2 (genotype allele \"A\" is not an allele index)"]);
        assert_eq!(run("GT\t0/1\t0/."), vec!["Warning: invalid genotype \"0/.\" in sample column 2 (genotype mixes called and missing alleles)"]);
        assert_eq!(run("GT\t0/1\t0/2"), vec!["Warning: sample column 2 genotype references allele 2 but there are only 1 ALT alleles"]);
        assert_eq!(run("GT:AD\t0/1:5\t1/1:0,5"), vec!["Warning: FORMAT field AD in sample column 1 expected 2 values but found 1"]);
        assert_eq!(run("GT:DP\t0/1:x\t1/1:3"), vec!["Warning: FORMAT field DP value \"x\" in sample column 1 is not of type Integer"]);
        // haploid PL has one value per allele
        assert!(run("GT:PL\t1:0,10\t0:10,0").is_empty());
        // extra sub-fields are flagged, missing trailing sub-fields are not
        assert_eq!(run("GT:DP\t0/1:3:9\t1/1"), vec!["Warning: sample column 1 has 3 sub-fields but FORMAT has 2 keys"]);
        assert_eq!(run(".\t0/1\t."), vec!["Error: FORMAT is empty but samples are present"]);
    }

    #[test]
    fn test_huge_genotype_count() {
        // 40 ALT alleles at ploidy 40 has more genotypes than a usize can hold, so PL is not count-checked
        let schema = test_schema(&["S1"]);
        let alts = vec!["C"; 40].join(",");
        let gt = vec!["0"; 40].join("/");
        let line = format!("chr1\t1\t.\tA\t{alts}\t.\tPASS\t.\tGT:PL\t{gt}:0,1,2");
        let findings = check(&schema, &line);
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|m| m.contains("is not observed in any sample genotype")));
    }

    #[test]
    fn test_strict_sample_fields() {
        let schema = test_schema(&["S1"]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(true), None, None);
        let report = rules.check_line(4, "chr1\t1\t.\tA\tG\t.\tPASS\t.\tGT:DP\t0/1");
        assert_eq!(messages(&report), vec!["Error: sample column 1 has 1 sub-fields but FORMAT has 2 keys"]);
        assert_eq!(report.findings[0].line_number(), Some(4));
    }

    #[test]
    fn test_alt_observed() {
        let schema = test_schema(&["S1", "S2"]);
        let base = "chr1\t1\t.\tA\tG,T,<*>\t.\tPASS\t.\tGT\t";
        let run = |samples: &str| check(&schema, &format!("{base}{samples}"));
        assert_eq!(run("0/1\t0/1"), vec!["Warning: ALT allele 2 (T) is not observed in any sample genotype"]);
        assert!(run("0/1\t1/2").is_empty());
        // nothing called at all
        assert!(run("./.\t.").is_empty());

        let rules = FieldRules::new(&schema, StrictnessPolicy::new(false), None, None);
        let line = format!("{base}0/1\t1/2");
        let report = rules.check_line(2, &line);
        let tally = report.tally.unwrap();
        assert_eq!(tally.called_alleles(), 4);
        assert_eq!(tally.allele_count(1), 2);
        assert_eq!(tally.allele_count(2), 1);
    }

    #[test]
    fn test_reference_checks() {
        let mut genome = ReferenceGenome::empty_reference();
        genome.add_contig("chr1".to_string(), "ACGTACGTNN").unwrap();
        let reference = ReferenceSequences::from_genome(genome);
        let schema = test_schema(&[]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(false), Some(&reference), None);
        let run = |line: &str| messages(&rules.check_line(2, line));

        assert!(run("chr1\t2\t.\tCG\tC\t.\tPASS\t.").is_empty());
        assert!(run("chr1\t2\t.\tcn\tC\t.\tPASS\t.").is_empty());
        assert!(run("chr1\t9\t.\tAC\tC\t.\tPASS\t.").is_empty());
        assert_eq!(run("chr1\t2\t.\tGG\tC\t.\tPASS\t."), vec!["Error: REF GG does not match the reference (CG) at chr1:2"]);
        assert_eq!(run("chr1\t10\t.\tNA\tN\t.\tPASS\t."), vec!["Error: REF extends beyond the end of chr1"]);
        assert_eq!(run("chr2\t1\t.\tA\tC\t.\tPASS\t."), vec!["Warning: CHROM \"chr2\" is not in the reference"]);
    }

    #[test]
    fn test_dbsnp_checks() {
        let known: KnownIds = ["rs1", "rs2"].into_iter().collect();
        let schema = test_schema(&[]);
        let rules = FieldRules::new(&schema, StrictnessPolicy::new(false), None, Some(&known));
        let run = |line: &str| messages(&rules.check_line(2, line));
        assert!(run("chr1\t2\trs1;rs2\tC\tG\t.\tPASS\t.").is_empty());
        assert!(run("chr1\t2\t.\tC\tG\t.\tPASS\t.").is_empty());
        assert_eq!(run("chr1\t2\trs1;rs9\tC\tG\t.\tPASS\t."), vec!["Warning: ID \"rs9\" is not in dbSNP"]);
    }

    #[test]
    fn test_allele_helpers() {
        assert!(is_valid_bases("acgtnACGTN"));
        assert!(!is_valid_bases("ACGU"));
        assert!(is_opaque_allele("<DUP:TANDEM>"));
        assert!(is_opaque_allele("*"));
        assert!(is_opaque_allele("]chr1:100]A"));
        assert!(!is_opaque_allele("<DEL"));
        assert!(matches_reference("ACN", b"AcG"));
        assert!(!matches_reference("AC", b"ACG"));

        let definition = FieldDefinition::new(Number::PerAllele, ValueType::Float);
        assert_eq!(check_values(&definition, "0.1,0.2", 1, 2), None);
        assert_eq!(check_values(&definition, ".", 1, 2), None);
        assert_eq!(check_values(&definition, "0.1", 1, 2), Some(ValueProblem::Count { expected: 2, found: 1 }));
        assert_eq!(check_values(&definition, "0.1,x", 1, 2), Some(ValueProblem::Type { value: "x", value_type: ValueType::Float }));
    }
}
