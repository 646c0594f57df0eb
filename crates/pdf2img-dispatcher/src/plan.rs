use crate::config::DispatcherConfig;
use pdf2img_types::PageSelector;

/// A group of page numbers submitted to the worker pool together. Pages
/// within a batch run concurrently; batches themselves run concurrently
/// too (the worker pool's own concurrency cap is the only throttle).
pub type Batch = Vec<usize>;

/// Resolves a [`PageSelector`] plus a known document page count into the
/// list of batches to submit (spec.md §4.5 step 2).
pub fn resolve_batches(selector: &PageSelector, total: usize, config: &DispatcherConfig) -> Vec<Batch> {
    match selector {
        PageSelector::FirstN(n) => {
            let n = (*n).min(total);
            vec![(1..=n).collect()]
        }
        PageSelector::Explicit(pages) => {
            let filtered: Vec<usize> = pages.iter().copied().filter(|p| *p >= 1 && *p <= total).collect();
            vec![filtered]
        }
        PageSelector::All => {
            let first_batch_size = config.first_batch_size.min(total).max(1.min(total));
            if total <= config.first_batch_size {
                return vec![(1..=total).collect()];
            }
            let mut batches = vec![(1..=first_batch_size).collect::<Batch>()];
            let remaining = total - first_batch_size;
            let pages_per_worker = remaining.div_ceil(config.split_factor).max(config.first_batch_size);

            let mut next = first_batch_size + 1;
            while next <= total {
                let end = (next + pages_per_worker - 1).min(total);
                batches.push((next..=end).collect());
                next = end + 1;
            }
            batches
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DispatcherConfig {
        DispatcherConfig::default()
    }

    #[test]
    fn first_n_caps_at_total() {
        let batches = resolve_batches(&PageSelector::FirstN(10), 3, &config());
        assert_eq!(batches, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn explicit_drops_out_of_range() {
        let selector = PageSelector::Explicit(vec![1, 5, 100]);
        let batches = resolve_batches(&selector, 5, &config());
        assert_eq!(batches, vec![vec![1, 5]]);
    }

    #[test]
    fn all_returns_single_batch_when_under_first_batch_size() {
        let batches = resolve_batches(&PageSelector::All, 4, &config());
        assert_eq!(batches, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn all_splits_remaining_pages_across_split_factor_batches() {
        let batches = resolve_batches(&PageSelector::All, 30, &config());
        assert_eq!(batches[0], (1..=6).collect::<Vec<_>>());
        let covered: Vec<usize> = batches.iter().skip(1).flatten().copied().collect();
        assert_eq!(covered, (7..=30).collect::<Vec<_>>());
        assert!(batches.len() - 1 <= config().split_factor);
    }
}
