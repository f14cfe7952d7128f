//! # costing_core - Wire and Cable Costing Engine
//!
//! `costing_core` computes copper and PVC weights, material cost, labour
//! markup and final cord cost for a wire specification, and records each
//! submitted costing as a row in a spreadsheet-shaped sheet under a sequential
//! `CO-NNNN` ID. All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Pure calculations**: the costing formulas are side-effect free
//! - **Lenient input**: numeric form fields accept numbers or text; anything
//!   unparseable reads as zero or as the configured default
//! - **Rich Errors**: structured error types, not just strings
//! - **Pluggable storage**: the sheet talks to a [`RecordStore`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use costing_core::calculations::{calculate, MaterialRates, RoundingMode, WireSpec};
//!
//! let spec = WireSpec {
//!     cu_strands: 30.0,
//!     gauge: 0.2,
//!     inner_od: 1.5,
//!     no_of_cores: 3.0,
//!     labour_on_wire: 12.0,
//!     length_req: 100.0,
//!     ..WireSpec::default()
//! };
//!
//! let breakdown = calculate(&spec, &MaterialRates::default(), RoundingMode::Precise);
//! assert_eq!(breakdown.bunch, 3);
//! assert_eq!(breakdown.laying, 1);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The costing formulas
//! - [`numeric`] - Lenient number parsing and display rounding
//! - [`schema`] - Sheet column labels and table schema
//! - [`id`] - `CO-NNNN` sequence IDs
//! - [`record`] - Costing records and their sheet rows
//! - [`store`] - Record stores (memory, JSON file)
//! - [`sheet`] - Submit, list and look up costings
//! - [`settings`] - Default rates and rounding mode
//! - [`formulas`] - Formula registry and reference docs
//! - [`pdf`] - PDF costing sheet
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod formulas;
pub mod id;
pub mod numeric;
pub mod pdf;
pub mod record;
pub mod schema;
pub mod settings;
pub mod sheet;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calculate, CostingBreakdown, CostingInput};
pub use errors::{CostError, CostResult};
pub use record::CostingRecord;
pub use settings::CostingSettings;
pub use sheet::CostingSheet;
pub use store::{MemoryStore, RecordStore};

#[cfg(not(target_arch = "wasm32"))]
pub use store::JsonFileStore;
