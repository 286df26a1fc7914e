use super::normalize::NormalizedMessage;

/// A contiguous run of records submitted as one request.
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position in the run.
    pub index: usize,
    pub records: Vec<NormalizedMessage>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split `records` into batches of at most `size`, preserving order.
///
/// Produces `ceil(N / size)` batches; only the last may be short. A `size`
/// of zero is treated as one.
pub fn chunk(records: Vec<NormalizedMessage>, size: usize) -> Vec<Batch> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(records.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(records.len()));
    for record in records {
        current.push(record);
        if current.len() == size {
            batches.push(Batch {
                index: batches.len() + 1,
                records: std::mem::replace(&mut current, Vec::with_capacity(size)),
            });
        }
    }
    if !current.is_empty() {
        batches.push(Batch {
            index: batches.len() + 1,
            records: current,
        });
    }
    batches
}
