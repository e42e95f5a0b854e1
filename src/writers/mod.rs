/*!
# Writers module
Contains the logic for writing diagnostics and report files for the validate command.
*/
/// Optional table with one row per finding
pub mod findings_table;
/// Counts findings, writes the diagnostics stream, and decides validity
pub mod report_aggregator;
