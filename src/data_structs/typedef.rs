pub type PosType = u32;
pub type CountType = u16;
pub type SumType = u64;
pub type OffsetType = i64;
pub type DensityType = f64;

/// 0-based index of a cell within the store column order.
pub type CellIdx = usize;
