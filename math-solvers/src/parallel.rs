//! Parallel utilities with feature-gated implementations
//!
//! With the `parallel` feature these helpers run on the rayon thread pool,
//! otherwise they fall back to sequential iteration with identical results.

/// Check if parallel processing is available
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Parallel map with index
#[cfg(feature = "parallel")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    (0..count).into_par_iter().map(f).collect()
}

/// Sequential map with index (fallback)
#[cfg(not(feature = "parallel"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    (0..count).map(f).collect()
}

/// Fill consecutive fixed-size chunks of a buffer in parallel
///
/// `f(i, chunk)` receives the i-th chunk of length `chunk_len`. Chunks are
/// disjoint, so callers writing matrix rows need no synchronization.
#[cfg(feature = "parallel")]
pub fn parallel_chunks_mut<T, F>(data: &mut [T], chunk_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    use rayon::prelude::*;
    if chunk_len == 0 {
        return;
    }
    data.par_chunks_mut(chunk_len)
        .enumerate()
        .for_each(|(i, chunk)| f(i, chunk));
}

/// Sequential chunk fill (fallback)
#[cfg(not(feature = "parallel"))]
pub fn parallel_chunks_mut<T, F>(data: &mut [T], chunk_len: usize, f: F)
where
    F: Fn(usize, &mut [T]),
{
    if chunk_len == 0 {
        return;
    }
    data.chunks_mut(chunk_len)
        .enumerate()
        .for_each(|(i, chunk)| f(i, chunk));
}
