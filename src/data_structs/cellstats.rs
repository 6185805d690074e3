use serde::{
    Deserialize,
    Serialize,
};

use super::calls::MethylationCall;
use super::typedef::DensityType;

/// Coverage and methylation summary of one cell.
///
/// Field order matches the columns of the persisted `cell_stats.csv`
/// table, so the struct serializes straight into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellStats {
    cell_name:        String,
    total_sites:      u64,
    methylated_sites: u64,
    meth_frac:        DensityType,
}

impl CellStats {
    pub fn new(cell_name: impl Into<String>) -> Self {
        Self {
            cell_name:        cell_name.into(),
            total_sites:      0,
            methylated_sites: 0,
            meth_frac:        0.0,
        }
    }

    /// Folds one site into the running totals. A site counts as
    /// methylated when a strict majority of its reads is.
    pub fn observe(
        &mut self,
        call: &MethylationCall,
    ) {
        self.total_sites += 1;
        if call.is_methylated() {
            self.methylated_sites += 1;
        }
        self.meth_frac =
            self.methylated_sites as DensityType / self.total_sites as DensityType;
    }

    pub fn cell_name(&self) -> &str {
        &self.cell_name
    }

    pub fn total_sites(&self) -> u64 {
        self.total_sites
    }

    pub fn methylated_sites(&self) -> u64 {
        self.methylated_sites
    }

    pub fn meth_frac(&self) -> DensityType {
        self.meth_frac
    }

    /// Global methylation of the cell in percent, the scale used by
    /// filtering thresholds.
    pub fn meth_percent(&self) -> DensityType {
        self.meth_frac * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_accumulates() {
        let mut stats = CellStats::new("a");
        assert_eq!(stats.meth_frac(), 0.0);

        stats.observe(&MethylationCall::new(42, 0, 1).unwrap());
        stats.observe(&MethylationCall::new(50, 1, 1).unwrap());
        stats.observe(&MethylationCall::new(52, 0, 1).unwrap());
        stats.observe(&MethylationCall::new(60, 1, 1).unwrap());

        assert_eq!(stats.total_sites(), 4);
        assert_eq!(stats.methylated_sites(), 2);
        assert_eq!(stats.meth_frac(), 0.5);
        assert_eq!(stats.meth_percent(), 50.0);
    }

    #[test]
    fn majority_rule_on_multiread_sites() {
        let mut stats = CellStats::new("c");
        // 2 of 3 reads methylated counts, 1 of 2 does not.
        stats.observe(&MethylationCall::new(10, 2, 3).unwrap());
        stats.observe(&MethylationCall::new(20, 1, 2).unwrap());
        assert_eq!(stats.methylated_sites(), 1);
        assert_eq!(stats.total_sites(), 2);
    }
}
