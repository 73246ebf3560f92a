//! Stratum buckets and seeded sampling
//!
//! Every bucket is sampled with its own RNG seeded from the run seed, so a
//! bucket's sample depends only on its members and the seed. Samples are
//! drawn without replacement and returned in corpus order.

use quizstrata_core::{Record, Stratum};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All records assigned to one stratum, in corpus order
#[derive(Debug, Clone)]
pub struct StratumBucket {
    stratum: Stratum,
    members: Vec<Record>,
}

impl StratumBucket {
    pub fn new(stratum: Stratum) -> Self {
        Self {
            stratum,
            members: Vec::new(),
        }
    }

    pub fn stratum(&self) -> Stratum {
        self.stratum
    }

    /// Append a member; callers push in corpus order
    pub fn push(&mut self, record: Record) {
        self.members.push(record);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Record] {
        &self.members
    }
}

/// How a sample is spread over a bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Every member equally likely
    #[default]
    Uniform,

    /// Proportional to each category's share of the bucket
    Stratified,
}

/// Draws at most `sample_size` members from a bucket
#[derive(Debug, Clone)]
pub struct Sampler {
    sample_size: usize,
    seed: u64,
    mode: SamplingMode,
}

impl Sampler {
    pub fn new(sample_size: usize, seed: u64) -> Self {
        Self {
            sample_size,
            seed,
            mode: SamplingMode::Uniform,
        }
    }

    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    /// Sampled members in corpus order. Small buckets are returned whole.
    pub fn sample<'b>(&self, bucket: &'b StratumBucket) -> Vec<&'b Record> {
        self.sample_indices(bucket.members())
            .into_iter()
            .map(|i| &bucket.members[i])
            .collect()
    }

    /// Sorted indices into `members`
    pub fn sample_indices(&self, members: &[Record]) -> Vec<usize> {
        if members.len() <= self.sample_size {
            return (0..members.len()).collect();
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut picked = match self.mode {
            SamplingMode::Uniform => index::sample(&mut rng, members.len(), self.sample_size).into_vec(),
            SamplingMode::Stratified => self.stratified_indices(&mut rng, members),
        };
        picked.sort_unstable();
        picked
    }

    fn stratified_indices(&self, rng: &mut StdRng, members: &[Record]) -> Vec<usize> {
        let mut groups: BTreeMap<Option<&str>, Vec<usize>> = BTreeMap::new();
        for (i, record) in members.iter().enumerate() {
            groups.entry(record.category.as_deref()).or_default().push(i);
        }

        let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
        let quotas = proportional_allocation(&sizes, self.sample_size);

        let mut picked = Vec::with_capacity(self.sample_size);
        for (group, quota) in groups.values().zip(quotas) {
            picked.extend(
                index::sample(rng, group.len(), quota)
                    .into_iter()
                    .map(|local| group[local]),
            );
        }
        picked
    }
}

/// Split `total` across groups proportionally to `sizes`.
///
/// Floors first, then hands the remainder to the largest fractional parts
/// (ties go to the larger group, then the earlier one). No group gets more
/// than its size; the result sums to `min(total, sum(sizes))`.
pub fn proportional_allocation(sizes: &[usize], total: usize) -> Vec<usize> {
    let population: usize = sizes.iter().sum();
    if population == 0 {
        return vec![0; sizes.len()];
    }
    let total = total.min(population);

    let mut quotas = Vec::with_capacity(sizes.len());
    let mut remainders = Vec::with_capacity(sizes.len());
    for (i, &size) in sizes.iter().enumerate() {
        let scaled = size as u128 * total as u128;
        quotas.push((scaled / population as u128) as usize);
        remainders.push((scaled % population as u128, size, i));
    }

    let mut left = total - quotas.iter().sum::<usize>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
    for &(_, size, i) in &remainders {
        if left == 0 {
            break;
        }
        if quotas[i] < size {
            quotas[i] += 1;
            left -= 1;
        }
    }
    quotas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(categories: &[&str]) -> StratumBucket {
        let mut bucket = StratumBucket::new(Stratum::Numbers);
        for (i, category) in categories.iter().enumerate() {
            bucket.push(Record::new(i as u64, format!("q{}", i), "a").with_category(*category));
        }
        bucket
    }

    #[test]
    fn test_small_bucket_returned_whole() {
        let bucket = bucket(&["A", "B", "C"]);
        let sample = Sampler::new(10, 42).sample(&bucket);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.iter().map(|r| r.id).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_is_bounded_and_in_corpus_order() {
        let bucket = bucket(&["A"; 100]);
        let sample = Sampler::new(10, 42).sample(&bucket);

        assert_eq!(sample.len(), 10);
        let ids: Vec<u64> = sample.iter().map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_same_seed_same_sample() {
        let bucket = bucket(&["A"; 100]);
        let first = Sampler::new(10, 7).sample_indices(bucket.members());
        let second = Sampler::new(10, 7).sample_indices(bucket.members());
        let other = Sampler::new(10, 8).sample_indices(bucket.members());

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_stratified_follows_category_shares() {
        let mut categories = vec!["SCIENCE"; 60];
        categories.extend(vec!["HISTORY"; 30]);
        categories.extend(vec!["POTPOURRI"; 10]);
        let bucket = bucket(&categories);

        let sample = Sampler::new(10, 42)
            .with_mode(SamplingMode::Stratified)
            .sample(&bucket);

        let count = |name: &str| {
            sample
                .iter()
                .filter(|r| r.category.as_deref() == Some(name))
                .count()
        };
        assert_eq!(sample.len(), 10);
        assert_eq!(count("SCIENCE"), 6);
        assert_eq!(count("HISTORY"), 3);
        assert_eq!(count("POTPOURRI"), 1);
    }

    #[test]
    fn test_proportional_allocation() {
        assert_eq!(proportional_allocation(&[60, 30, 10], 10), vec![6, 3, 1]);
        assert_eq!(proportional_allocation(&[1, 1, 1], 2), vec![1, 1, 0]);
        assert_eq!(proportional_allocation(&[5, 3], 4), vec![3, 1]);
        assert_eq!(proportional_allocation(&[2, 2], 10), vec![2, 2]);
        assert_eq!(proportional_allocation(&[], 10), Vec::<usize>::new());
        assert_eq!(proportional_allocation(&[0, 0], 3), vec![0, 0]);
    }
}
