//! Test-only crate: the article store contract suite.
//!
//! Every storage backend has to produce identical observable results for
//! identical call sequences. The integration tests in `tests/` run one
//! suite against the SQLite store, the JSON file store and the in-memory
//! reference store, and compare scripted scenarios across all three.
//!
//! There is intentionally no library code here.
