pub use crate::data_structs::typedef::{
    CountType,
    DensityType,
    PosType,
};
pub use crate::data_structs::{
    AnchorPoint,
    CellStats,
    CellTrack,
    ChromCalls,
    GenomicInterval,
    MethylationCall,
    Strand,
};
pub use crate::error::MethsweepError;
pub use crate::io::compression::Compression;
pub use crate::io::coverage::CellCoverage;
pub use crate::io::store::{
    RunInfo,
    StoreReader,
    StoreWriter,
};
pub use crate::tools::aggregate::{
    tally_intervals,
    IntervalTally,
    OverlapPolicy,
};
pub use crate::tools::filter::{
    filter_data_dir,
    select_cells,
    FilterPredicate,
};
pub use crate::tools::matrix::{
    MatrixConfig,
    RegionMatrixSet,
};
pub use crate::tools::profile::{
    ProfileConfig,
    ProfileTable,
};
pub use crate::tools::smooth::{
    smooth_data_dir,
    KernelType,
    Smoother,
};
pub use crate::utils::CiMethod;
