
use indexmap::IndexMap;

use crate::data_types::header_schema::{FieldDefinition, Namespace, Number, ValueType};

/// Problems with an `##INFO`/`##FORMAT` declaration
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum MetaParseError {
    #[error("declaration is not enclosed in <...>")]
    NotStructured,
    #[error("declaration has an unterminated quoted value")]
    UnterminatedQuote,
    #[error("declaration entry \"{entry}\" is not KEY=VALUE")]
    BadEntry { entry: String },
    #[error("declaration is missing ID")]
    MissingId,
    #[error("declaration of {id} is missing Number")]
    MissingNumber { id: String },
    #[error("declaration of {id} has invalid Number \"{value}\"")]
    InvalidNumber { id: String, value: String },
    #[error("declaration of {id} is missing Type")]
    MissingType { id: String },
    #[error("declaration of {id} has invalid Type \"{value}\"")]
    InvalidType { id: String, value: String },
    #[error("flag {id} must be declared with Number=0, found Number={number}")]
    FlagNumber { id: String, number: Number },
    #[error("FORMAT field {id} cannot have Type=Flag")]
    FormatFlag { id: String }
}

/// A successfully parsed INFO/FORMAT declaration
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    /// Which block this declares a key in
    pub namespace: Namespace,
    /// The declared key
    pub id: String,
    /// Arity and type
    pub definition: FieldDefinition
}

/// Returns the namespace a meta line declares a key in, if it is an INFO or FORMAT line
pub fn declaration_namespace(line: &str) -> Option<Namespace> {
    if line.starts_with("##INFO=") {
        Some(Namespace::Info)
    } else if line.starts_with("##FORMAT=") {
        Some(Namespace::Format)
    } else {
        None
    }
}

/// Splits the body of a structured meta line (`<ID=x,Number=1,...>`) into its key-value entries.
/// Commas inside double quotes do not split, and `\"` does not end a quoted value.
/// # Arguments
/// * `line` - the full meta line, e.g. `##INFO=<ID=DP,...>`
/// # Errors
/// * if the value is not wrapped in `<...>`, a quote is unterminated, or an entry lacks `=`
pub fn parse_structured_entries(line: &str) -> Result<IndexMap<String, String>, MetaParseError> {
    let value = match line.split_once('=') {
        Some((_key, value)) => value,
        None => return Err(MetaParseError::NotStructured)
    };
    let inner = value.strip_prefix('<')
        .and_then(|v| v.strip_suffix('>'))
        .ok_or(MetaParseError::NotStructured)?;

    // walk the characters, only splitting on commas outside of quotes
    let mut raw_entries: Vec<String> = vec![];
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            current.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            },
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            },
            ',' if !in_quotes => {
                raw_entries.push(std::mem::take(&mut current));
            },
            _ => current.push(c)
        }
    }
    if in_quotes {
        return Err(MetaParseError::UnterminatedQuote);
    }
    raw_entries.push(current);

    let mut entries: IndexMap<String, String> = Default::default();
    for entry in raw_entries.into_iter() {
        let (key, value) = entry.split_once('=')
            .ok_or_else(|| MetaParseError::BadEntry { entry: entry.clone() })?;
        let value = value.trim();
        let value = value.strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        entries.insert(key.trim().to_string(), value.to_string());
    }
    Ok(entries)
}

/// Parses an `##INFO=<...>` or `##FORMAT=<...>` line into a declaration.
/// # Arguments
/// * `namespace` - which block the line belongs to, see `declaration_namespace`
/// * `line` - the full meta line
/// # Errors
/// * if the line is not structured, or the ID/Number/Type are missing or invalid
pub fn parse_declaration(namespace: Namespace, line: &str) -> Result<Declaration, MetaParseError> {
    let entries = parse_structured_entries(line)?;

    let id = match entries.get("ID") {
        Some(id) if !id.is_empty() => id.clone(),
        _ => return Err(MetaParseError::MissingId)
    };

    let number_str = entries.get("Number")
        .ok_or_else(|| MetaParseError::MissingNumber { id: id.clone() })?;
    let number: Number = number_str.parse()
        .map_err(|_e| MetaParseError::InvalidNumber { id: id.clone(), value: number_str.clone() })?;

    let type_str = entries.get("Type")
        .ok_or_else(|| MetaParseError::MissingType { id: id.clone() })?;
    let value_type: ValueType = type_str.parse()
        .map_err(|_e| MetaParseError::InvalidType { id: id.clone(), value: type_str.clone() })?;

    if value_type == ValueType::Flag {
        match namespace {
            Namespace::Format => return Err(MetaParseError::FormatFlag { id }),
            Namespace::Info => {
                if number != Number::Fixed(0) {
                    return Err(MetaParseError::FlagNumber { id, number });
                }
            }
        }
    }

    Ok(Declaration {
        namespace,
        id,
        definition: FieldDefinition::new(number, value_type)
    })
}
