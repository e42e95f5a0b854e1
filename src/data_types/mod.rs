/*!
# Data types module
Shared data types passed between the parsers, the rules, and the writers.
*/
/// End-of-run counters and the final verdict
pub mod aggregate_result;
/// A single problem found in the input, with its severity
pub mod finding;
/// GT parsing and per-record allele tallies
pub mod genotype;
/// INFO/FORMAT declarations and sample names from the header
pub mod header_schema;
/// Zero-copy column view of a data line
pub mod record_fields;
/// Normalized variant identity used for duplicate detection
pub mod variant_key;
