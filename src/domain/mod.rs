// Domain layer: export records, flattened tables and ports (interfaces).
// Only std/serde here; no I/O.

pub mod model;
pub mod ports;
