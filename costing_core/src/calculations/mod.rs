//! # Costing Calculations
//!
//! Each calculation follows the pattern:
//!
//! - `*Input` - Submitted parameters (JSON-serializable, lenient)
//! - `*Breakdown` - Derived results (JSON-serializable)
//! - `calculate(...)` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`costing`] - Wire/cord costing from strands, gauge, cores and sheath

pub mod costing;

// Re-export commonly used types
pub use costing::{
    calculate, calculate_input, CableType, CostingBreakdown, CostingDefaults, CostingInput, MaterialRates,
    RoundingMode, WireSpec,
};
