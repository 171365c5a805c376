/// Data layer: table model, CSV I/O, memory accounting, dtype optimization.
///
/// Architecture:
/// ```text
///      source .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  full load, or chunked subset load → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐      ┌──────────┐
///   │  memory   │ ───▶ │  .json    │  per-column deep size report
///   └──────────┘      └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ optimize  │  text → category, narrow ints and floats (in place)
///   └──────────┘
///
///   subset Table ──▶ writer (.csv)   subset Table ──▶ stats (plots)
/// ```

pub mod error;
pub mod loader;
pub mod memory;
pub mod model;
pub mod optimize;
pub mod stats;
pub mod writer;
