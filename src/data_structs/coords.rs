use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use super::enums::Strand;
use super::typedef::PosType;
use crate::error::MethsweepError;

/// A half-open genomic region `[start, end)` on one chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomicInterval {
    chrom: String,
    start: PosType,
    end:   PosType,
    name:  Option<String>,
}

impl GenomicInterval {
    /// Creates a new interval. Start must lie strictly below the half-open
    /// end.
    pub fn new(
        chrom: impl Into<String>,
        start: PosType,
        end: PosType,
        name: Option<String>,
    ) -> Result<Self, MethsweepError> {
        let chrom = chrom.into();
        if start >= end {
            return Err(MethsweepError::InvalidInterval { chrom, start, end });
        }
        Ok(Self {
            chrom,
            start,
            end,
            name,
        })
    }

    /// Creates an interval from end-inclusive coordinates, as used by BED
    /// input. `1  50  52` covers positions 50..=52 and becomes `[50, 53)`.
    pub fn from_inclusive(
        chrom: impl Into<String>,
        start: PosType,
        end_inclusive: PosType,
        name: Option<String>,
    ) -> Result<Self, MethsweepError> {
        let chrom = chrom.into();
        if end_inclusive < start {
            return Err(MethsweepError::InvalidInterval {
                chrom,
                start,
                end: end_inclusive,
            });
        }
        Self::new(chrom, start, end_inclusive + 1, name)
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn start(&self) -> PosType {
        self.start
    }

    pub fn end(&self) -> PosType {
        self.end
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the canonical `chrom:start-end` label used for feature
    /// lists and dense matrix headers.
    pub fn label(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start, self.end)
    }

    pub fn contains(
        &self,
        position: PosType,
    ) -> bool {
        self.start <= position && position < self.end
    }

    pub fn length(&self) -> PosType {
        self.end - self.start
    }
}

impl Display for GenomicInterval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A strand-aware reference point for profile aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPoint {
    chrom:    String,
    position: PosType,
    strand:   Strand,
}

impl AnchorPoint {
    pub fn new(
        chrom: impl Into<String>,
        position: PosType,
        strand: Strand,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            position,
            strand,
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> PosType {
        self.position
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }
}

impl Display for AnchorPoint {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}:{}({})", self.chrom, self.position, self.strand)
    }
}
