/*!
# Parsing module
Contains the logic for turning input streams and header lines into meaningful structs / data.
*/
/// Known variant identifiers loaded from a dbSNP VCF
pub mod dbsnp_lookup;
/// Accumulates meta lines and the #CHROM line into a header schema
pub mod header_builder;
/// Opens plain or gzip input and reads raw lines
pub mod input;
/// Classifies each line as meta, header, data, or blank
pub mod line_classifier;
/// Parser for structured `##INFO`/`##FORMAT` declarations
pub mod meta_parser;
/// Reference genome lookups for the CHROM and REF checks
pub mod reference_lookup;
