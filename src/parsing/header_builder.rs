
use indexmap::IndexMap;
use indexmap::map::Entry;
use log::debug;

use crate::data_types::finding::Finding;
use crate::data_types::header_schema::{FieldDefinition, HeaderSchema, Namespace, FIXED_COLUMNS, FORMAT_COLUMN};
use crate::parsing::meta_parser::{declaration_namespace, parse_declaration};
use crate::validation_session::ValidationError;

/// Collects INFO/FORMAT declarations from the meta lines until the #CHROM line freezes them into a `HeaderSchema`.
#[derive(Debug, Default)]
pub struct HeaderSchemaBuilder {
    /// INFO declarations seen so far
    info: IndexMap<String, FieldDefinition>,
    /// FORMAT declarations seen so far
    format: IndexMap<String, FieldDefinition>
}

impl HeaderSchemaBuilder {
    /// Consumes a `##` line. Only INFO and FORMAT declarations are interpreted; everything else is passed over.
    /// Problems are returned as warnings, never as fatal errors.
    /// # Arguments
    /// * `line_number` - 1-based line number for reporting
    /// * `line` - the meta line
    pub fn add_meta_line(&mut self, line_number: usize, line: &str) -> Vec<Finding> {
        let namespace = match declaration_namespace(line) {
            Some(ns) => ns,
            None => return vec![]
        };

        let declaration = match parse_declaration(namespace, line) {
            Ok(d) => d,
            Err(e) => {
                return vec![Finding::warning(line_number, format!("malformed {namespace} header: {e}"))];
            }
        };

        let lookup = match declaration.namespace {
            Namespace::Info => &mut self.info,
            Namespace::Format => &mut self.format
        };
        let mut findings = vec![];
        match lookup.entry(declaration.id) {
            Entry::Occupied(mut entry) => {
                findings.push(Finding::warning(line_number, format!("{namespace} field {} is declared more than once", entry.key())));
                // later declaration wins
                entry.insert(declaration.definition);
            },
            Entry::Vacant(entry) => {
                entry.insert(declaration.definition);
            }
        }
        findings
    }

    /// Consumes the #CHROM line and produces the final schema.
    /// # Arguments
    /// * `line_number` - 1-based line number for reporting
    /// * `line` - the #CHROM line
    /// # Errors
    /// * if the line has fewer than 8 columns, in which case no schema can be built
    pub fn build(self, line_number: usize, line: &str) -> Result<(HeaderSchema, Vec<Finding>), ValidationError> {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < FIXED_COLUMNS.len() {
            return Err(ValidationError::MalformedChromHeader { line_number, columns: columns.len() });
        }

        let mut findings = vec![];
        for (found, expected) in columns.iter().zip(FIXED_COLUMNS.iter()) {
            if found != expected {
                findings.push(Finding::error(line_number, format!("#CHROM header column \"{found}\" should be \"{expected}\"")));
            }
        }

        let sample_names: Vec<String> = if columns.len() > FORMAT_COLUMN {
            if columns[FORMAT_COLUMN] != "FORMAT" {
                findings.push(Finding::warning(line_number, "column 9 of #CHROM header is not 'FORMAT'".to_string()));
            }
            columns[(FORMAT_COLUMN + 1)..].iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            vec![]
        };

        debug!("Header declares {} INFO keys, {} FORMAT keys, {} samples", self.info.len(), self.format.len(), sample_names.len());
        let schema = HeaderSchema::new(self.info, self.format, columns.len(), sample_names);
        for name in schema.duplicate_sample_names() {
            findings.push(Finding::warning(line_number, format!("duplicate sample name \"{name}\" in #CHROM header")));
        }

        Ok((schema, findings))
    }
}
