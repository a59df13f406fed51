use crate::checker::EvaluationSnapshot;
use crate::{MergedRange, ProblemRange};

/// Coalesce overlapping or touching ranges into sorted, disjoint spans.
///
/// A range that starts exactly where the previous span ends is absorbed.
/// Messages are joined with `"; "`, skipping one already contained in the
/// span's message. For equal starts the input order is kept (stable sort).
pub fn merge_ranges(ranges: &[ProblemRange]) -> Vec<MergedRange> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut merged: Vec<MergedRange> = Vec::with_capacity(sorted.len());

    for range in sorted {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => {
                last.end = last.end.max(range.end);
                if !range.message.is_empty() && !last.message.contains(&range.message) {
                    if !last.message.is_empty() {
                        last.message.push_str("; ");
                    }
                    last.message.push_str(&range.message);
                }
            }
            _ => merged.push(range.into()),
        }
    }

    merged
}

/// All located problems of a snapshot, in registration order.
pub fn collect_ranges(snapshot: &EvaluationSnapshot) -> Vec<ProblemRange> {
    snapshot
        .results()
        .flat_map(|(_, result)| result.problem_ranges().iter().cloned())
        .collect()
}

/// Merged highlight spans for a snapshot, ready for rendering.
pub fn highlight_spans(snapshot: &EvaluationSnapshot) -> Vec<MergedRange> {
    merge_ranges(&collect_ranges(snapshot))
}

/// Reorder spans by descending start so markup can be spliced in place.
pub fn descending(mut spans: Vec<MergedRange>) -> Vec<MergedRange> {
    spans.sort_by(|a, b| b.start.cmp(&a.start));
    spans
}
