/*!
# CLI module
Command line interface functionality that is specific to Anteater.
*/

/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The validate CLI subcommand
pub mod validate;
