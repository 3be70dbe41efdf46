//! Instance catalog — static dataset behind a best-fit lookup.
//!
//! A CSV fixture of instance offerings is loaded into SQLite at session
//! start; lookups ask for the cheapest row satisfying CPU and RAM floors.
//! The `sqlx` pool is the one shared access point in the system: bounded,
//! lock-guarded internally, and safe for concurrent sessions even though a
//! single dialogue session queries it strictly sequentially. The pool is
//! passed explicitly to every call — there is no ambient global.

pub mod error;
pub mod lookup;
pub mod store;

pub use error::{CatalogError, CatalogResult};
pub use lookup::{BestInstance, InstanceOffer, find_best_instance, DEFAULT_CPU, DEFAULT_RAM_GB};
pub use store::{connect, load_catalog};
