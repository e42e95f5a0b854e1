/*!
# Duplicate detector
Flags records whose (CHROM, POS, REF, sorted ALT) identity may have been seen before.

The detector is a fixed-size bloom filter, so memory stays constant no matter how large the input is.
The trade-off is approximate membership: a key that was inserted is always reported ("no false negatives"),
but an unseen key can also be reported with a probability that grows with the number of records and shrinks with the budget.
Reported duplicates can therefore include a small, bounded share of false alarms, which is why they are kept out of the error count.
*/
use bloomfilter::Bloom;
use log::debug;

use crate::data_types::variant_key::VariantKey;

/// Default memory budget in megabytes
pub const DEFAULT_BLOOM_SIZE_MB: usize = 128;
/// Number of records the hash count is tuned for; roughly a whole-genome callset
const DESIGN_CAPACITY: u64 = 100_000_000;
/// Upper bound on hash functions; more than this costs throughput for little gain
const MAX_HASH_FUNCTIONS: u32 = 7;
/// Fixed hash keys so repeated runs on the same input report the same lines
const SIP_KEYS: [(u64, u64); 2] = [
    (0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210),
    (0x0f1e_2d3c_4b5a_6978, 0x8796_a5b4_c3d2_e1f0)
];

#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum DuplicateDetectorError {
    #[error("bloom filter size must be > 0 MB")]
    ZeroBudget,
    #[error("bloom filter size of {size_mb} MB is too large")]
    BudgetTooLarge { size_mb: usize }
}

/// Picks a small odd number of hash functions for a bit budget, using the usual k = m/n * ln(2) at `DESIGN_CAPACITY`.
/// # Arguments
/// * `num_bits` - size of the bit array
pub fn hash_function_count(num_bits: u64) -> u32 {
    let optimal = (num_bits as f64 / DESIGN_CAPACITY as f64) * std::f64::consts::LN_2;
    let k = (optimal.round() as u32).clamp(1, MAX_HASH_FUNCTIONS);
    if k % 2 == 0 {
        // MAX_HASH_FUNCTIONS is odd, so bumping up never exceeds it
        k + 1
    } else {
        k
    }
}

/// Bloom filter over variant identities
pub struct DuplicateDetector {
    /// The underlying filter
    filter: Bloom<VariantKey>,
    /// Size of the bit array
    num_bits: u64,
    /// Number of hash functions
    num_hashes: u32,
    /// Number of keys inserted so far
    inserted: u64
}

impl DuplicateDetector {
    /// Creates a detector from a megabyte budget.
    /// # Arguments
    /// * `size_mb` - memory budget for the bit array, in MB
    /// # Errors
    /// * if the budget is zero or overflows
    pub fn new(size_mb: usize) -> Result<Self, DuplicateDetectorError> {
        if size_mb == 0 {
            return Err(DuplicateDetectorError::ZeroBudget);
        }
        let num_bytes = size_mb.checked_mul(1024 * 1024)
            .ok_or(DuplicateDetectorError::BudgetTooLarge { size_mb })?;
        Self::with_bytes(num_bytes)
            .ok_or(DuplicateDetectorError::BudgetTooLarge { size_mb })
    }

    /// Creates a detector with an exact byte budget; returns None if the budget is 0 or the bit count overflows
    pub fn with_bytes(num_bytes: usize) -> Option<Self> {
        if num_bytes == 0 {
            return None;
        }
        let num_bits = (num_bytes as u64).checked_mul(8)?;
        let num_hashes = hash_function_count(num_bits);
        let bitmap = vec![0u8; num_bytes];
        let filter = Bloom::from_existing(&bitmap, num_bits, num_hashes, SIP_KEYS);
        debug!("Duplicate detector: {num_bits} bits, {num_hashes} hash functions");
        Some(Self {
            filter,
            num_bits,
            num_hashes,
            inserted: 0
        })
    }

    /// Queries the filter for a key and then inserts it.
    /// Returns true if the key was possibly present before this call; false means it was definitely absent.
    pub fn check_and_insert(&mut self, key: &VariantKey) -> bool {
        let possibly_present = self.filter.check(key);
        self.filter.set(key);
        self.inserted += 1;
        possibly_present
    }

    /// Query without inserting
    #[cfg(test)]
    pub fn possibly_contains(&self, key: &VariantKey) -> bool {
        self.filter.check(key)
    }

    /// The theoretical false-positive rate after `num_keys` distinct insertions: (1 - e^(-kn/m))^k
    pub fn expected_false_positive_rate(&self, num_keys: u64) -> f64 {
        let k = self.num_hashes as f64;
        let m = self.num_bits as f64;
        let n = num_keys as f64;
        (1.0 - (-k * n / m).exp()).powf(k)
    }

    // getters
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    pub fn inserted(&self) -> u64 {
        self.inserted
    }
}

impl std::fmt::Debug for DuplicateDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Bloom does not implement Debug
        f.debug_struct("DuplicateDetector")
            .field("num_bits", &self.num_bits)
            .field("num_hashes", &self.num_hashes)
            .field("inserted", &self.inserted)
            .finish()
    }
}
