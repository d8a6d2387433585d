/// Static Data Source - turns untyped tabular data into a queryable in-memory database
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `static-db-core`: schema inference, ingestion and query execution
/// - `static-db-cli`: command line front end for loading and querying data sets

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
