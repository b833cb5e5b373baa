//! Worker pool sizing.

use jointbpe_core::{BpeError, Result};

/// Run `f` on a dedicated rayon pool of `workers` threads, or on the global
/// pool when `workers` is 0.
pub fn with_workers<T, F>(workers: usize, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if workers == 0 {
        return Ok(f());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| BpeError::InvalidConfig(format!("unable to build worker pool: {e}")))?;
    Ok(pool.install(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_workers_sizes_pool() {
        let threads = with_workers(3, rayon::current_num_threads).unwrap();
        assert_eq!(threads, 3);
    }

    #[test]
    fn test_zero_workers_uses_global_pool() {
        let threads = with_workers(0, rayon::current_num_threads).unwrap();
        assert_eq!(threads, rayon::current_num_threads());
    }
}
