//! Environment configuration shared by the library and the demo binary.
//!
//! Reads `MAHJONG_DISPLAY_ALL`, `MAHJONG_SEQUENTIAL`, `MAHJONG_TRACE` and
//! `MAHJONG_THREADS`.

/// True for `1`, `true`, `yes` or `on` (any case). Unset is false.
fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Read `MAHJONG_DISPLAY_ALL` (default false).
pub fn display_all() -> bool {
    flag("MAHJONG_DISPLAY_ALL")
}

/// Read `MAHJONG_SEQUENTIAL` (default false).
pub fn sequential() -> bool {
    flag("MAHJONG_SEQUENTIAL")
}

/// Read `MAHJONG_TRACE` (default false).
pub fn trace_enabled() -> bool {
    flag("MAHJONG_TRACE")
}

/// A positive thread count, if `value` holds one.
fn parse_thread_count(value: &str) -> Option<usize> {
    value.trim().parse().ok().filter(|&threads| threads > 0)
}

/// Read `MAHJONG_THREADS` (unset means rayon's default).
pub fn thread_count() -> Option<usize> {
    std::env::var("MAHJONG_THREADS").ok().as_deref().and_then(parse_thread_count)
}

/// Sizes the global rayon pool from `MAHJONG_THREADS` and returns the size
/// of the pool in use. Without the variable rayon picks its own size
/// (`RAYON_NUM_THREADS`, else one thread per CPU). A pool that already
/// exists is kept.
pub fn init_thread_pool() -> usize {
    if let Some(threads) = thread_count() {
        // Fails only when the global pool already exists.
        let _ = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global();
    }
    rayon::current_num_threads()
}
