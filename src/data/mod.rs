/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CustomerDataset (fatal on error)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ CustomerDataset  │  Vec<CustomerRecord>, locations, age bounds
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  age range + location set → subset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  per-location means → tidy metric rows
///   └───────────┘
/// ```

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
