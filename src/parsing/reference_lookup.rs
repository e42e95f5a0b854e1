
use anyhow::anyhow;
use log::debug;
use rust_lib_reference_genome::reference_genome::ReferenceGenome;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Source of reference sequence used to check REF alleles against the genome
pub trait ReferenceLookup {
    /// True if the reference knows this contig
    fn has_contig(&self, chrom: &str) -> bool;

    /// Returns `length` bases starting at the 1-based `pos`, or None if the contig is unknown or the range runs off the end.
    /// # Arguments
    /// * `chrom` - contig name
    /// * `pos` - 1-based start position
    /// * `length` - number of bases
    fn lookup(&self, chrom: &str, pos: u64, length: usize) -> Option<Vec<u8>>;
}

/// A fully loaded reference genome along with the contig lengths for bounds checks
pub struct ReferenceSequences {
    /// The loaded sequences
    genome: ReferenceGenome,
    /// Contig name to length
    contig_lengths: FxHashMap<String, usize>
}

impl ReferenceSequences {
    /// Loads a FASTA file (optionally gzipped) into memory.
    /// # Arguments
    /// * `filename` - the FASTA to load
    /// # Errors
    /// * if the FASTA cannot be parsed
    pub fn from_fasta(filename: &Path) -> anyhow::Result<Self> {
        let genome = ReferenceGenome::from_fasta(filename)
            .map_err(|e| anyhow!("Error while loading reference genome {filename:?}: {e:?}"))?;
        Ok(Self::from_genome(genome))
    }

    /// Wraps an already loaded genome
    pub fn from_genome(genome: ReferenceGenome) -> Self {
        let contig_lengths: FxHashMap<String, usize> = genome.contig_keys().iter()
            .map(|k| (k.clone(), genome.get_full_chromosome(k).len()))
            .collect();
        debug!("Loaded {} reference contigs", contig_lengths.len());
        Self {
            genome,
            contig_lengths
        }
    }
}

impl ReferenceLookup for ReferenceSequences {
    fn has_contig(&self, chrom: &str) -> bool {
        self.contig_lengths.contains_key(chrom)
    }

    fn lookup(&self, chrom: &str, pos: u64, length: usize) -> Option<Vec<u8>> {
        let contig_length = *self.contig_lengths.get(chrom)?;
        if pos == 0 {
            return None;
        }
        let start = (pos - 1) as usize;
        let end = start.checked_add(length)?;
        if end > contig_length {
            return None;
        }
        Some(self.genome.get_slice(chrom, start, end).to_vec())
    }
}
