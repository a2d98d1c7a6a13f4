use std::path::Path;

/// Archive format that bundles a directory tree into one byte stream.
pub trait Container: Send + Sync {
    /// Stable name recorded in the manifest (e.g. `zip`).
    fn name(&self) -> &'static str;

    /// File name used for the reassembled archive when it is written to disk.
    fn recovery_file_name(&self) -> &'static str;

    /// Archive every file and directory under `source`, paths relative to it.
    fn archive_directory(&self, source: &Path) -> anyhow::Result<Vec<u8>>;

    /// Standalone signature check: does `bytes` look like this container at all?
    ///
    /// Must not parse entries; a stream passing this check can still fail
    /// [`extract_archive`](Container::extract_archive).
    fn has_signature(&self, bytes: &[u8]) -> bool;

    /// Materialize every entry of `bytes` under `dest`.
    ///
    /// Any entry that cannot be written (escaping path, truncated data)
    /// aborts the whole extraction.
    fn extract_archive(&self, bytes: &[u8], dest: &Path) -> anyhow::Result<()>;
}
