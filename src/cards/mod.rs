//! Card system: definitions and catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for catalog entries
//! - `Card`: Fixed record with four combat stats
//! - `Stat`: Enumerated combat stat, the unit of comparison in a round
//! - `CardCatalog`: Read-only lookup consumed by the engine
//! - `CardRegistry`: In-memory catalog

pub mod definition;
pub mod registry;

pub use definition::{Card, CardId, Rarity, Stat};
pub use registry::{CardCatalog, CardRegistry};
