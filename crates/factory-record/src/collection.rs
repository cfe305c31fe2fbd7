//! Batch of units tested in one run.

use crate::record::DiagnosticRecord;

/// Ordered list of records, one per unit tested in a run.
///
/// Insertion order is kept and nothing is deduplicated: two records with the
/// same serial or sequence number are both stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordList {
    records: Vec<DiagnosticRecord>,
}

impl RecordList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end.
    pub fn push(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record has been added.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&DiagnosticRecord> {
        self.records.get(index)
    }

    /// Mutable record at `index`, if any.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DiagnosticRecord> {
        self.records.get_mut(index)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticRecord> {
        self.records.iter()
    }

    /// Mutable records in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, DiagnosticRecord> {
        self.records.iter_mut()
    }

    /// Every record carrying `serial`, in insertion order.
    pub fn by_serial<'a>(
        &'a self,
        serial: &'a str,
    ) -> impl Iterator<Item = &'a DiagnosticRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.serial() == serial)
    }

    /// Records whose devices all pass. Finalize records first, otherwise the
    /// untestable devices still read as failed.
    pub fn passed_count(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.all_devices_ok())
            .count()
    }

    /// Records with at least one failing device.
    pub fn failed_count(&self) -> usize {
        self.len().saturating_sub(self.passed_count())
    }

    /// Finalize every record, returning the verdicts in order.
    pub fn finalize_all(&mut self) -> Vec<bool> {
        self.records.iter_mut().map(DiagnosticRecord::finalize).collect()
    }
}

impl FromIterator<DiagnosticRecord> for RecordList {
    fn from_iter<I: IntoIterator<Item = DiagnosticRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<DiagnosticRecord> for RecordList {
    fn extend<I: IntoIterator<Item = DiagnosticRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl IntoIterator for RecordList {
    type Item = DiagnosticRecord;
    type IntoIter = std::vec::IntoIter<DiagnosticRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a DiagnosticRecord;
    type IntoIter = std::slice::Iter<'a, DiagnosticRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a mut RecordList {
    type Item = &'a mut DiagnosticRecord;
    type IntoIter = std::slice::IterMut<'a, DiagnosticRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;

    #[test]
    fn test_preserves_insertion_order() {
        let list: RecordList = [3, 1, 2].into_iter().map(DiagnosticRecord::new).collect();
        let order: Vec<u32> = list.iter().map(DiagnosticRecord::sequence_number).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_allows_duplicate_serials() {
        let mut list = RecordList::new();
        list.push(DiagnosticRecord::new(8));
        list.push(DiagnosticRecord::new(9));
        list.push(DiagnosticRecord::new(8));
        assert_eq!(list.len(), 3);
        assert_eq!(list.by_serial("8").count(), 2);
        assert_eq!(list.by_serial("10").count(), 0);
    }

    #[test]
    fn test_pass_fail_counts_after_finalize() {
        let mut passing = DiagnosticRecord::new(1);
        for device in Device::ALL {
            passing.devices_mut().set_ok(device, true);
        }
        let mut list: RecordList = vec![passing, DiagnosticRecord::new(2)].into_iter().collect();
        assert_eq!(list.finalize_all(), vec![true, false]);
        assert_eq!(list.passed_count(), 1);
        assert_eq!(list.failed_count(), 1);
    }

    #[test]
    fn test_empty_list() {
        let list = RecordList::new();
        assert!(list.is_empty());
        assert!(list.get(0).is_none());
        assert_eq!(list.failed_count(), 0);
    }
}
