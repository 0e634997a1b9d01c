//! Order-preserving map over independent work items.

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

/// Below this many items the work stays on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 4;

/// Maps `f` over `items`, keeping input order in the output and stopping at
/// the first error.
///
/// With the `parallel` feature, larger inputs run on the rayon pool. Which
/// error is reported when several items fail is then unspecified.
#[inline]
pub fn try_map_ordered<T, R, E, F>(items: &[T], f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync + Send,
{
    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    {
        if items.len() > PARALLEL_THRESHOLD {
            return items.par_iter().map(f).collect();
        }
    }
    items.iter().map(f).collect()
}
