/*!
# Rules module
Contains the validation rules that run on data lines, along with the cross-line state (sort order, duplicates) they need.
*/
/// Cross-checks INFO AN/AC against each other and the sample genotypes
pub mod allele_consistency;
/// Bloom-filter based detection of repeated variants
pub mod duplicate_detector;
/// The ordered per-record rule engine
pub mod field_rules;
/// Running (CHROM, POS) order checks
pub mod sort_order;
/// Strict vs. lenient handling of findings and structural comparisons
pub mod strictness;
