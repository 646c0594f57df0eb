/// Tunables for the Dispatcher's page-planning policy (spec.md §9 open
/// question resolution: these were hard-coded constants in the source,
/// exposed here as constructor parameters).
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Size of the first batch submitted for `FirstN`/`All` before the
    /// document's total page count is known.
    pub first_batch_size: usize,
    /// `All` splits its remaining pages into `split_factor` concurrent
    /// batches (each at least `first_batch_size` pages).
    pub split_factor: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            first_batch_size: 6,
            split_factor: 4,
        }
    }
}
