/// Command line interface functionality
pub mod cli;
/// Contains various shared data types
pub mod data_types;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// The individual checks applied to each line
pub mod rules;
/// Various utility functions that tend to be very generic
pub mod util;
/// Drives one validation run over a VCF stream
pub mod validation_session;
/// All output writers
pub mod writers;
