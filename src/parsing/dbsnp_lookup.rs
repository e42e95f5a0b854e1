
use anyhow::Context;
use log::debug;
use noodles::vcf;
use noodles::vcf::variant::record::Ids;
use rustc_hash::FxHashSet;
use std::path::Path;

/// Source of known variant identifiers used to check the ID column
pub trait IdLookup {
    /// True if the identifier is known
    fn contains_id(&self, id: &str) -> bool;
}

/// Every ID from a dbSNP (or any other) VCF, loaded into memory
#[derive(Clone, Debug, Default)]
pub struct KnownIds {
    /// The set of known identifiers
    ids: FxHashSet<String>
}

impl KnownIds {
    /// Loads all IDs from a VCF file; `.vcf.gz` files are decoded as BGZF.
    /// # Arguments
    /// * `filename` - path to the dbSNP VCF
    /// # Errors
    /// * if the file cannot be opened or a record fails to parse
    pub fn from_vcf(filename: &Path) -> anyhow::Result<Self> {
        let mut vcf_reader = vcf::io::reader::Builder::default()
            .build_from_path(filename)
            .with_context(|| format!("Error while opening {filename:?}:"))?;
        let _header = vcf_reader.read_header()
            .with_context(|| format!("Error while reading header of {filename:?}:"))?;

        let mut ids: FxHashSet<String> = Default::default();
        for result in vcf_reader.records() {
            let record = result
                .with_context(|| format!("Error while reading record from {filename:?}:"))?;
            ids.extend(record.ids().iter().map(|id| id.to_string()));
        }
        debug!("Loaded {} known IDs from {filename:?}", ids.len());

        Ok(Self { ids })
    }

    /// Number of known identifiers
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True if nothing was loaded
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for KnownIds {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(|s| s.into()).collect()
        }
    }
}

impl IdLookup for KnownIds {
    fn contains_id(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_iter() {
        let known: KnownIds = ["rs1", "rs2"].into_iter().collect();
        assert_eq!(known.len(), 2);
        assert!(known.contains_id("rs1"));
        assert!(!known.contains_id("rs3"));
    }

    #[test]
    fn test_from_vcf() {
        let dir = tempfile::tempdir().unwrap();
        let vcf_fn = dir.path().join("dbsnp.vcf");
        let mut fp = std::fs::File::create(&vcf_fn).unwrap();
        write!(fp, "##fileformat=VCFv4.2\n\
            #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
            chr1\t100\trs100\tA\tG\t.\t.\t.\n\
            chr1\t200\trs200;rs201\tC\tT\t.\t.\t.\n\
            chr1\t300\t.\tG\tA\t.\t.\t.\n").unwrap();
        drop(fp);

        let known = KnownIds::from_vcf(&vcf_fn).unwrap();
        assert_eq!(known.len(), 3);
        assert!(known.contains_id("rs100"));
        assert!(known.contains_id("rs201"));
        assert!(!known.contains_id("."));
    }
}
