
use crate::data_types::header_schema::{FIXED_COLUMNS, FORMAT_COLUMN};

/// Zero-copy view of the tab-separated columns of one data line.
/// Only constructed for lines that have at least the 8 fixed columns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordFields<'a> {
    /// Every column, in order
    columns: Vec<&'a str>
}

impl<'a> RecordFields<'a> {
    /// Splits a data line on tabs, returning the column count as the error if there are fewer than 8 columns.
    /// # Arguments
    /// * `line` - the data line with the line terminator already stripped
    pub fn split(line: &'a str) -> Result<Self, usize> {
        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < FIXED_COLUMNS.len() {
            Err(columns.len())
        } else {
            Ok(Self { columns })
        }
    }

    pub fn chrom(&self) -> &'a str {
        self.columns[0]
    }

    pub fn pos(&self) -> &'a str {
        self.columns[1]
    }

    pub fn id(&self) -> &'a str {
        self.columns[2]
    }

    pub fn reference(&self) -> &'a str {
        self.columns[3]
    }

    pub fn alternate(&self) -> &'a str {
        self.columns[4]
    }

    pub fn qual(&self) -> &'a str {
        self.columns[5]
    }

    pub fn filter(&self) -> &'a str {
        self.columns[6]
    }

    pub fn info(&self) -> &'a str {
        self.columns[7]
    }

    /// The FORMAT column, if this line has one
    pub fn format(&self) -> Option<&'a str> {
        self.columns.get(FORMAT_COLUMN).copied()
    }

    /// The sample columns after FORMAT; empty if there are none
    pub fn samples(&self) -> &[&'a str] {
        if self.columns.len() > FORMAT_COLUMN + 1 {
            &self.columns[(FORMAT_COLUMN + 1)..]
        } else {
            &[]
        }
    }

    /// The ALT alleles; the missing ALT `.` yields no alleles
    pub fn alt_alleles(&self) -> Vec<&'a str> {
        match self.alternate() {
            "." => vec![],
            alts => alts.split(',').collect()
        }
    }

    /// The INFO entries as (key, value) pairs; `.` yields no entries and a bare key (flag) has no value
    pub fn info_entries(&self) -> Vec<(&'a str, Option<&'a str>)> {
        match self.info() {
            "." => vec![],
            info => info.split(';')
                .map(|entry| match entry.split_once('=') {
                    Some((key, value)) => (key, Some(value)),
                    None => (entry, None)
                })
                .collect()
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
