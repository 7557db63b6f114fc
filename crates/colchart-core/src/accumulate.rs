//! Incremental accumulation: individual records in, growing batches out.

/// Collects records from successive emissions into one batch
///
/// With a limit only the most recent records are retained.
#[derive(Debug, Clone)]
pub struct Accumulator<T> {
    records: Vec<T>,
    limit: Option<usize>,
}

impl<T> Accumulator<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            limit: None,
        }
    }

    /// Keep at most `limit` records, dropping the oldest first
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: Vec::with_capacity(limit),
            limit: Some(limit),
        }
    }

    /// Append records and return the accumulated batch
    pub fn push(&mut self, records: impl IntoIterator<Item = T>) -> &[T] {
        self.records.extend(records);

        if let Some(limit) = self.limit {
            if self.records.len() > limit {
                let excess = self.records.len() - limit;
                self.records.drain(..excess);
            }
        }

        &self.records
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}
