//! # Sheet Schema
//!
//! Column labels are the storage contract: existing costing sheets were
//! written with exactly these strings, so they must never be renamed.

use serde::{Deserialize, Serialize};

/// Name of the costing table in the record store.
pub const COSTING_TABLE: &str = "Costing";

/// Column labels, verbatim.
pub mod columns {
    pub const COSTING_ID: &str = "Costing ID";
    pub const DATE: &str = "Date";
    pub const SPECIFICATIONS: &str = "Specifications";
    pub const CU_STRANDS: &str = "Cu Strands";
    pub const GAUGE: &str = "Gauge";
    pub const INNER_OD: &str = "Inner OD";
    pub const NO_OF_CORES: &str = "No of Cores";
    pub const BUNCH: &str = "Bunch";
    pub const LAYING: &str = "Laying";
    pub const COPPER_WEIGHT: &str = "Copper Weight (Kgs/100 mtr)";
    pub const PVC_WEIGHT: &str = "PVC Weight (Kgs/100 mtr)";
    pub const FINAL_COPPER: &str = "Final Copper (Kgs/100 mtr)";
    pub const ROUND_OD: &str = "Round OD";
    pub const FINAL_PVC_ROUND: &str = "Final PVC Round (Kgs/100 mtr)";
    pub const FLAT_B: &str = "Flat B";
    pub const FLAT_W: &str = "Flat W";
    pub const FINAL_PVC_FLAT: &str = "Final PVC Flat (Kgs/100 mtr)";
    pub const RMC: &str = "RMC";
    pub const LABOUR_ON_WIRE: &str = "Labour on Wire (%)";
    pub const BUNDLE_COST: &str = "Bundle Cost";
    pub const BUNDLE_WEIGHT: &str = "Bundle Weight (Kgs/100 mtr)";
    pub const COST_OF_WIRE_PER_MTR: &str = "Cost of Wire per Mtr";
    pub const LENGTH_REQ: &str = "Length Req (Mtr)";
    pub const WIRE_COST: &str = "Wire Cost";
    pub const TYPE: &str = "Type";
    pub const PLUG_COST: &str = "Plug Cost";
    pub const TERMINAL_ACC_COST: &str = "Terminal & Acc Cost";
    pub const CORD_COST: &str = "Cord Cost";
    pub const COPPER_RATE: &str = "Copper Rate";
    pub const PVC_RATE: &str = "PVC Rate";
    pub const ENQUIRY_BY: &str = "Enquiry By";
    pub const COMPANY: &str = "Company";
    pub const REMARKS: &str = "Remarks";
    pub const UNIQUE: &str = "Unique";
}

/// Ordered header row written when the costing sheet is first created.
pub const COSTING_HEADERS: [&str; 34] = [
    columns::COSTING_ID,
    columns::DATE,
    columns::SPECIFICATIONS,
    columns::CU_STRANDS,
    columns::GAUGE,
    columns::INNER_OD,
    columns::NO_OF_CORES,
    columns::BUNCH,
    columns::LAYING,
    columns::COPPER_WEIGHT,
    columns::PVC_WEIGHT,
    columns::FINAL_COPPER,
    columns::ROUND_OD,
    columns::FINAL_PVC_ROUND,
    columns::FLAT_B,
    columns::FLAT_W,
    columns::FINAL_PVC_FLAT,
    columns::RMC,
    columns::LABOUR_ON_WIRE,
    columns::BUNDLE_COST,
    columns::BUNDLE_WEIGHT,
    columns::COST_OF_WIRE_PER_MTR,
    columns::LENGTH_REQ,
    columns::WIRE_COST,
    columns::TYPE,
    columns::PLUG_COST,
    columns::TERMINAL_ACC_COST,
    columns::CORD_COST,
    columns::COPPER_RATE,
    columns::PVC_RATE,
    columns::ENQUIRY_BY,
    columns::COMPANY,
    columns::REMARKS,
    columns::UNIQUE,
];

/// Table definition handed to a record store on first use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub headers: Vec<String>,
    /// Column whose values must be unique across rows
    pub key_column: Option<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        TableSchema {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            key_column: None,
        }
    }

    pub fn with_key(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }
}

/// Schema of the costing sheet, keyed by `Costing ID`.
pub fn costing_schema() -> TableSchema {
    TableSchema::new(COSTING_TABLE, &COSTING_HEADERS).with_key(columns::COSTING_ID)
}
