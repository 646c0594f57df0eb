use std::collections::BTreeSet;

/// Which pages of a document to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelector {
    All,
    FirstN(usize),
    Explicit(Vec<usize>),
}

impl Default for PageSelector {
    fn default() -> Self {
        PageSelector::FirstN(6)
    }
}

impl PageSelector {
    /// Normalizes an `Explicit` list: drops non-positive values, dedupes,
    /// and sorts ascending. An empty list normalizes to `All` (spec.md §8
    /// boundary behavior: `pages = []` is treated as `All`).
    ///
    /// Duplicate page numbers are deduped rather than rendered multiple
    /// times — the resolution to spec.md §9's open question, kept
    /// consistent across every request of the same shape.
    pub fn normalize(raw: Vec<i64>) -> PageSelector {
        if raw.is_empty() {
            return PageSelector::All;
        }
        let set: BTreeSet<usize> = raw
            .into_iter()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .collect();
        if set.is_empty() {
            PageSelector::Explicit(Vec::new())
        } else {
            PageSelector::Explicit(set.into_iter().collect())
        }
    }
}
