/// Data layer: core types, loading, cleaning, filtering and metrics.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  clean labels, aliases, backfill, coerce → ScoreTable
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  class / subject restriction → filtered ScoreTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ metrics   │  progress, summary, class averages, chart series
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod normalize;
