//! Per-interval tallies over sorted call tracks.

use crate::data_structs::typedef::{
    DensityType,
    PosType,
    SumType,
};
use crate::data_structs::{
    validate_sorted,
    GenomicInterval,
    MethylationCall,
};
use crate::error::MethsweepError;
use crate::utils::safe_frac;

/// How interval aggregation treats overlapping intervals on the same
/// chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Intervals may overlap; a call inside several intervals counts in
    /// each of them.
    #[default]
    Allow,
    /// Intervals must not overlap; a shared position is a precondition
    /// violation.
    Disjoint,
}

/// Read counts of one (cell, interval) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalTally {
    pub total_sites:      SumType,
    pub methylated_sites: SumType,
}

impl IntervalTally {
    pub fn observe(
        &mut self,
        call: &MethylationCall,
    ) {
        self.total_sites += call.n_total() as SumType;
        self.methylated_sites += call.n_meth() as SumType;
    }

    pub fn frac(&self) -> DensityType {
        safe_frac(self.methylated_sites, self.total_sites)
    }

    pub fn is_empty(&self) -> bool {
        self.total_sites == 0
    }
}

/// Tallies one cell's calls into intervals of the same chromosome.
///
/// Calls must be strictly ascending by position and intervals sorted
/// by start; both are single-pass preconditions, never corrected
/// silently. Output order matches interval order.
pub fn tally_intervals(
    calls: &[MethylationCall],
    intervals: &[GenomicInterval],
    policy: OverlapPolicy,
) -> Result<Vec<IntervalTally>, MethsweepError> {
    validate_sorted(calls)?;
    for pair in intervals.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        if current.start() < prev.start() {
            return Err(MethsweepError::UnsortedIntervals {
                prev:    prev.start(),
                current: current.start(),
            });
        }
        if policy == OverlapPolicy::Disjoint && current.start() < prev.end() {
            return Err(MethsweepError::OverlappingIntervals {
                prev_end: prev.end(),
                start:    current.start(),
            });
        }
    }

    let mut tallies = vec![IntervalTally::default(); intervals.len()];
    // Intervals whose span still reaches past the sweep position, as
    // (end, output index).
    let mut active: Vec<(PosType, usize)> = Vec::new();
    let mut next = 0usize;

    for call in calls {
        let position = call.position();
        while next < intervals.len() && intervals[next].start() <= position {
            active.push((intervals[next].end(), next));
            next += 1;
        }
        active.retain(|(end, _)| *end > position);
        for (_, idx) in &active {
            tallies[*idx].observe(call);
        }
    }
    Ok(tallies)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(
        position: PosType,
        n_meth: u16,
        n_total: u16,
    ) -> MethylationCall {
        MethylationCall::new(position, n_meth, n_total).unwrap()
    }

    fn interval(
        start: PosType,
        end: PosType,
    ) -> GenomicInterval {
        GenomicInterval::new("1", start, end, None).unwrap()
    }

    #[test]
    fn counts_calls_inside_half_open_span() {
        let calls = [call(50, 1, 1), call(52, 0, 1), call(53, 1, 1)];
        let tallies = tally_intervals(
            &calls,
            &[interval(50, 53)],
            OverlapPolicy::Allow,
        )
        .unwrap();
        assert_eq!(tallies[0].total_sites, 2);
        assert_eq!(tallies[0].methylated_sites, 1);
        assert_eq!(tallies[0].frac(), 0.5);
    }

    #[test]
    fn untouched_intervals_stay_empty() {
        let calls = [call(5, 1, 1)];
        let tallies = tally_intervals(
            &calls,
            &[interval(10, 20), interval(30, 40)],
            OverlapPolicy::Allow,
        )
        .unwrap();
        assert!(tallies.iter().all(IntervalTally::is_empty));
        assert_eq!(tallies[0].frac(), 0.0);
    }

    #[test]
    fn overlapping_intervals_double_count() {
        let calls = [call(7, 1, 1), call(12, 0, 1)];
        let tallies = tally_intervals(
            &calls,
            &[interval(0, 10), interval(5, 15)],
            OverlapPolicy::Allow,
        )
        .unwrap();
        assert_eq!(tallies[0].total_sites, 1);
        assert_eq!(tallies[1].total_sites, 2);
        assert_eq!(tallies[1].methylated_sites, 1);
    }

    #[test]
    fn nested_intervals_both_observe() {
        let calls = [call(15, 1, 1), call(50, 0, 1)];
        let tallies = tally_intervals(
            &calls,
            &[interval(0, 100), interval(10, 20)],
            OverlapPolicy::Allow,
        )
        .unwrap();
        assert_eq!(tallies[0].total_sites, 2);
        assert_eq!(tallies[1].total_sites, 1);
    }

    #[test]
    fn disjoint_policy_rejects_overlap() {
        let result = tally_intervals(
            &[],
            &[interval(0, 10), interval(5, 15)],
            OverlapPolicy::Disjoint,
        );
        assert!(matches!(
            result,
            Err(MethsweepError::OverlappingIntervals {
                prev_end: 10,
                start:    5,
            })
        ));
    }

    #[test]
    fn disjoint_policy_accepts_touching_spans() {
        let calls = [call(9, 1, 1), call(10, 1, 1)];
        let tallies = tally_intervals(
            &calls,
            &[interval(0, 10), interval(10, 20)],
            OverlapPolicy::Disjoint,
        )
        .unwrap();
        assert_eq!(tallies[0].total_sites, 1);
        assert_eq!(tallies[1].total_sites, 1);
    }

    #[test]
    fn unsorted_intervals_are_rejected() {
        let result = tally_intervals(
            &[],
            &[interval(10, 20), interval(0, 5)],
            OverlapPolicy::Allow,
        );
        assert!(matches!(
            result,
            Err(MethsweepError::UnsortedIntervals { .. })
        ));
    }

    #[test]
    fn unsorted_calls_are_rejected() {
        let result = tally_intervals(
            &[call(20, 1, 1), call(10, 1, 1)],
            &[interval(0, 100)],
            OverlapPolicy::Allow,
        );
        assert!(matches!(
            result,
            Err(MethsweepError::UnsortedPositions { .. })
        ));
    }

    #[test]
    fn multiread_counts_are_summed() {
        let calls = [call(5, 2, 3), call(6, 1, 2)];
        let tallies =
            tally_intervals(&calls, &[interval(0, 10)], OverlapPolicy::Allow)
                .unwrap();
        assert_eq!(tallies[0].total_sites, 5);
        assert_eq!(tallies[0].methylated_sites, 3);
    }
}
