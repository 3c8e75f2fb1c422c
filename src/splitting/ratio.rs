/*!
 * Minimum-loss grouping of spans into a fixed number of fragments.
 *
 * `ratio_split` enumerates every way to cut S spans into N contiguous groups and keeps the
 * grouping whose length proportions are closest to the requested ratio. `merge_by_num` is the
 * cheap greedy reduction used when only the fragment count matters.
 */

use log::trace;

use crate::errors::SplitError;
use crate::language::LengthMetric;
use crate::segmentation::Span;

/// Losses closer than this are treated as equal so the earlier partition wins
const LOSS_EPSILON: f64 = 1e-9;

/// Iterator over the cut positions of all partitions of `spans` items into `parts` groups,
/// in lexicographic order. A cut at `c` starts a new group at item `c`.
#[derive(Debug)]
pub struct Partitions {
    spans: usize,
    cuts: Vec<usize>,
    done: bool,
}

impl Partitions {
    pub fn new(spans: usize, parts: usize) -> Self {
        let k = parts.saturating_sub(1);
        Self {
            spans,
            cuts: (1..=k).collect(),
            done: parts == 0 || parts > spans,
        }
    }
}

impl Iterator for Partitions {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.cuts.clone();

        // Advance to the next combination of k cut positions out of 1..spans
        let k = self.cuts.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            let max = self.spans - k + i;
            if self.cuts[i] < max {
                self.cuts[i] += 1;
                for j in i + 1..k {
                    self.cuts[j] = self.cuts[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

/// Group `spans` into `ratio.len()` contiguous fragments whose metric lengths best match `ratio`.
///
/// The loss of a grouping is `Σ |r_i/Σr - len_i/Σlen|`; the first grouping with minimal loss in
/// lexicographic cut order is returned.
pub fn ratio_split(spans: &[Span], ratio: &[f64], metric: LengthMetric) -> Result<Vec<String>, SplitError> {
    Ok(ratio_groups(spans, ratio, metric)?
        .into_iter()
        .map(|group| group.text)
        .collect())
}

/// Like `ratio_split`, keeping every group as one merged span
pub fn ratio_groups(spans: &[Span], ratio: &[f64], metric: LengthMetric) -> Result<Vec<Span>, SplitError> {
    let parts = ratio.len();
    if parts == 0 || spans.len() < parts {
        return Err(SplitError::InsufficientSpans {
            sentence: None,
            spans: spans.len(),
            requested: parts,
        });
    }
    if parts == 1 {
        return Ok(vec![join_spans(spans)]);
    }

    let lengths = GroupLengths::new(spans, metric);
    let ratio_total: f64 = ratio.iter().sum();
    let shares: Vec<f64> = ratio.iter().map(|r| r / ratio_total).collect();

    let mut best: Option<(f64, Vec<usize>)> = None;
    for cuts in Partitions::new(spans.len(), parts) {
        let group_lengths: Vec<usize> = bounds(&cuts, spans.len())
            .map(|(start, end)| lengths.get(start, end))
            .collect();
        let total = group_lengths.iter().sum::<usize>().max(1) as f64;
        let loss: f64 = shares
            .iter()
            .zip(&group_lengths)
            .map(|(share, len)| (share - *len as f64 / total).abs())
            .sum();
        if best.as_ref().is_none_or(|(best_loss, _)| loss + LOSS_EPSILON < *best_loss) {
            best = Some((loss, cuts));
        }
    }

    let (loss, cuts) = best.ok_or(SplitError::InsufficientSpans {
        sentence: None,
        spans: spans.len(),
        requested: parts,
    })?;
    trace!("Ratio split cuts {:?} with loss {:.4}", cuts, loss);
    Ok(bounds(&cuts, spans.len())
        .map(|(start, end)| join_spans(&spans[start..end]))
        .collect())
}

/// Repeatedly merge the adjacent pair with the smallest combined length until `count` spans remain
pub fn merge_by_num(mut spans: Vec<Span>, count: usize, metric: LengthMetric) -> Vec<Span> {
    let count = count.max(1);
    while spans.len() > count {
        let mut best: Option<(usize, usize)> = None;
        for i in 0..spans.len() - 1 {
            let mut combined = spans[i].text.clone();
            spans[i + 1].append_to(&mut combined);
            let length = metric.len(&combined);
            if best.is_none_or(|(_, best_length)| length < best_length) {
                best = Some((i, length));
            }
        }
        let Some((i, _)) = best else { break };
        let next = spans.remove(i + 1);
        spans[i].absorb(next);
    }
    spans
}

fn join_spans(spans: &[Span]) -> Span {
    let mut merged = spans[0].clone();
    for span in &spans[1..] {
        merged.absorb(span.clone());
    }
    merged
}

/// `(start, end)` item ranges of the groups described by `cuts`
fn bounds(cuts: &[usize], spans: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
    let starts = std::iter::once(0).chain(cuts.iter().copied());
    let ends = cuts.iter().copied().chain(std::iter::once(spans));
    starts.zip(ends)
}

/// Metric length of every contiguous span range, computed once per split
struct GroupLengths {
    spans: usize,
    lengths: Vec<usize>,
}

impl GroupLengths {
    fn new(spans: &[Span], metric: LengthMetric) -> Self {
        let n = spans.len();
        let mut lengths = vec![0; n * (n + 1)];
        for start in 0..n {
            let mut text = String::new();
            for end in start + 1..=n {
                spans[end - 1].append_to(&mut text);
                lengths[start * (n + 1) + end] = metric.len(&text);
            }
        }
        Self { spans: n, lengths }
    }

    fn get(&self, start: usize, end: usize) -> usize {
        self.lengths[start * (self.spans + 1) + end]
    }
}
