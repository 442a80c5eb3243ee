//! Partitioning of the selected files into formatter invocations.

/// Split `files` into consecutive batches of at most `size` paths.
///
/// Every batch but the last holds exactly `size` paths. No files yields no
/// batches.
pub fn batches(files: &[String], size: usize) -> std::slice::Chunks<'_, String> {
    files.chunks(size.max(1))
}

/// Number of batches [`batches`] yields for `total` files.
pub fn batch_count(total: usize, size: usize) -> usize {
    total.div_ceil(size.max(1))
}
