/*!
 * Fragment splitting.
 *
 * - `ratio`: minimum-loss grouping of spans into N fragments, and merge-to-count
 * - `length_bound`: halving over-length text until it fits, then greedy merging
 * - `pipeline`: per-sentence driver/other split producing bilingual fragments
 * - `document`: the fragment document handed to the aligner
 */

pub mod document;
pub mod length_bound;
pub mod pipeline;
pub mod ratio;

pub use self::document::{Fragment, FragmentDocument, SentenceFragments};
pub use self::length_bound::LengthBoundSplitter;
pub use self::pipeline::SentenceSplitter;
pub use self::ratio::{merge_by_num, ratio_groups, ratio_split, Partitions};
