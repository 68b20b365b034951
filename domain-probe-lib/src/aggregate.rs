//! Result aggregation.
//!
//! The `Aggregator` consumes classification results as they stream out of
//! the worker pool, keeps running counts for progress reporting, and hands
//! back the complete `ResultSet` once the run is over.

use crate::types::{ClassificationResult, Status};
use std::collections::HashMap;

/// Running counts over the results seen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    /// Results received so far
    pub processed: usize,
    /// Results with status `Valid`
    pub valid: usize,
    by_status: HashMap<Status, usize>,
}

impl Tally {
    /// Count one result.
    pub fn record(&mut self, result: &ClassificationResult) {
        self.processed += 1;
        if result.is_valid() {
            self.valid += 1;
        }
        *self.by_status.entry(result.status).or_insert(0) += 1;
    }

    /// Number of results with the given status.
    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Non-zero counts in `Status::ALL` order.
    pub fn breakdown(&self) -> Vec<(Status, usize)> {
        Status::ALL
            .iter()
            .map(|status| (*status, self.count(*status)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// All results of one run plus derived counts.
///
/// Order is whatever order results were collected in.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    results: Vec<ClassificationResult>,
    tally: Tally,
}

impl ResultSet {
    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the run had no input.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of results with status `Valid`.
    pub fn valid_count(&self) -> usize {
        self.tally.valid
    }

    /// Number of results with the given status.
    pub fn count(&self, status: Status) -> usize {
        self.tally.count(status)
    }

    /// The final counts.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Results as a slice.
    pub fn results(&self) -> &[ClassificationResult] {
        &self.results
    }

    /// Iterate over results.
    pub fn iter(&self) -> std::slice::Iter<'_, ClassificationResult> {
        self.results.iter()
    }

    /// Take ownership of the results.
    pub fn into_results(self) -> Vec<ClassificationResult> {
        self.results
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ClassificationResult;
    type IntoIter = std::slice::Iter<'a, ClassificationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

/// Incrementally builds a `ResultSet`.
#[derive(Debug, Default)]
pub struct Aggregator {
    results: Vec<ClassificationResult>,
    tally: Tally,
}

impl Aggregator {
    /// Create an aggregator expecting roughly `capacity` results.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
            tally: Tally::default(),
        }
    }

    /// Take ownership of a result and return the updated counts.
    pub fn push(&mut self, result: ClassificationResult) -> &Tally {
        self.tally.record(&result);
        self.results.push(result);
        &self.tally
    }

    /// Counts so far.
    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    /// Most recently pushed result.
    pub fn last(&self) -> Option<&ClassificationResult> {
        self.results.last()
    }

    /// Finish aggregation.
    pub fn finish(self) -> ResultSet {
        ResultSet {
            results: self.results,
            tally: self.tally,
        }
    }
}

/// Collect results into a `ResultSet`, counting valid domains on the way.
pub fn summarize<I>(results: I) -> ResultSet
where
    I: IntoIterator<Item = ClassificationResult>,
{
    let results = results.into_iter();
    let mut aggregator = Aggregator::with_capacity(results.size_hint().0);
    for result in results {
        aggregator.push(result);
    }
    aggregator.finish()
}
