//! # Costing Records
//!
//! A [`CostingRecord`] is one submitted costing: the parsed inputs, the rates
//! that were active, the derived breakdown and the sheet metadata (ID, date).
//! Records are converted to and from sheet rows keyed by the labels in
//! [`crate::schema::columns`]. Rounding to display precision happens here and
//! only here.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calculations::costing::{
    calculate, CableType, CostingBreakdown, CostingDefaults, CostingInput, MaterialRates, RoundingMode, WireSpec,
};
use crate::errors::{CostError, CostResult};
use crate::numeric::{parse_number, round_currency, round_weight};
use crate::schema::columns as col;

/// A sheet row: column label to cell value.
pub type Row = serde_json::Map<String, Value>;

/// A persisted costing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostingRecord {
    /// `CO-NNNN`
    pub costing_id: String,
    pub date: DateTime<Utc>,
    pub specifications: String,
    pub spec: WireSpec,
    pub cable_type: CableType,
    pub rates: MaterialRates,
    pub enquiry_by: String,
    pub company: String,
    pub remarks: String,
    pub breakdown: CostingBreakdown,
    /// Mirrors `company`. Kept for sheet compatibility; not a uniqueness key.
    pub unique: String,
}

impl CostingRecord {
    /// Build a record from a submitted form.
    pub fn from_input(
        costing_id: impl Into<String>,
        date: DateTime<Utc>,
        input: &CostingInput,
        defaults: &CostingDefaults,
        mode: RoundingMode,
    ) -> Self {
        let spec = input.spec(defaults);
        let rates = input.rates(defaults);
        let breakdown = calculate(&spec, &rates, mode);

        CostingRecord {
            costing_id: costing_id.into(),
            date,
            specifications: input.specifications.clone(),
            spec,
            cable_type: input.cable_type,
            rates,
            enquiry_by: input.enquiry_by.clone(),
            company: input.company.clone(),
            remarks: input.remarks.clone(),
            breakdown,
            unique: input.company.clone(),
        }
    }

    /// Same record under a different ID.
    pub fn with_id(mut self, costing_id: impl Into<String>) -> Self {
        self.costing_id = costing_id.into();
        self
    }

    /// ISO-8601 date as written to the sheet (`2024-06-10T08:15:23.456Z`).
    pub fn date_string(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Sheet row with display rounding applied.
    pub fn to_row(&self) -> Row {
        let b = self.breakdown.rounded();
        let s = &self.spec;
        let mut row = Row::new();
        let mut put = |key: &str, value: Value| {
            row.insert(key.to_string(), value);
        };

        put(col::COSTING_ID, Value::from(self.costing_id.clone()));
        put(col::DATE, Value::from(self.date_string()));
        put(col::SPECIFICATIONS, Value::from(self.specifications.clone()));
        put(col::CU_STRANDS, Value::from(s.cu_strands));
        put(col::GAUGE, Value::from(s.gauge));
        put(col::INNER_OD, Value::from(s.inner_od));
        put(col::NO_OF_CORES, Value::from(s.no_of_cores));
        put(col::BUNCH, Value::from(b.bunch));
        put(col::LAYING, Value::from(b.laying));
        put(col::COPPER_WEIGHT, Value::from(b.copper_weight));
        put(col::PVC_WEIGHT, Value::from(b.pvc_weight));
        put(col::FINAL_COPPER, Value::from(b.final_copper));
        put(col::ROUND_OD, Value::from(s.round_od));
        put(col::FINAL_PVC_ROUND, Value::from(b.final_pvc_round));
        put(col::FLAT_B, Value::from(s.flat_b));
        put(col::FLAT_W, Value::from(s.flat_w));
        put(col::FINAL_PVC_FLAT, Value::from(b.final_pvc_flat));
        put(col::RMC, Value::from(b.rmc));
        put(col::LABOUR_ON_WIRE, Value::from(s.labour_on_wire));
        put(col::BUNDLE_COST, Value::from(b.bundle_cost));
        put(col::BUNDLE_WEIGHT, Value::from(b.bundle_weight));
        put(col::COST_OF_WIRE_PER_MTR, Value::from(b.cost_of_wire_per_mtr));
        put(col::LENGTH_REQ, Value::from(s.length_req));
        put(col::WIRE_COST, Value::from(b.wire_cost));
        put(col::TYPE, Value::from(self.cable_type.label()));
        put(col::PLUG_COST, Value::from(round_currency(s.plug_cost)));
        put(col::TERMINAL_ACC_COST, Value::from(round_currency(s.terminal_acc_cost)));
        put(col::CORD_COST, Value::from(b.cord_cost));
        put(col::COPPER_RATE, Value::from(self.rates.copper_rate));
        put(col::PVC_RATE, Value::from(self.rates.pvc_rate));
        put(col::ENQUIRY_BY, Value::from(self.enquiry_by.clone()));
        put(col::COMPANY, Value::from(self.company.clone()));
        put(col::REMARKS, Value::from(self.remarks.clone()));
        put(col::UNIQUE, Value::from(self.unique.clone()));

        row
    }

    /// Rebuild a record from a stored row.
    ///
    /// Derived values come back at display precision. Cells that do not parse
    /// read as zero, the same way the form treats them; only the ID and date
    /// are required.
    pub fn from_row(row: &Row) -> CostResult<Self> {
        let costing_id = cell_text(row, col::COSTING_ID);
        if costing_id.trim().is_empty() {
            return Err(CostError::missing_field(col::COSTING_ID));
        }

        let date_text = cell_text(row, col::DATE);
        let date = DateTime::parse_from_rfc3339(date_text.trim())
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| CostError::invalid_input(col::DATE, date_text.clone(), e.to_string()))?;

        let num = |column: &str| cell_number(row, column);
        let spec = WireSpec {
            cu_strands: num(col::CU_STRANDS),
            gauge: num(col::GAUGE),
            inner_od: num(col::INNER_OD),
            no_of_cores: num(col::NO_OF_CORES),
            round_od: num(col::ROUND_OD),
            flat_b: num(col::FLAT_B),
            flat_w: num(col::FLAT_W),
            labour_on_wire: num(col::LABOUR_ON_WIRE),
            length_req: num(col::LENGTH_REQ),
            plug_cost: num(col::PLUG_COST),
            terminal_acc_cost: num(col::TERMINAL_ACC_COST),
        };
        let breakdown = CostingBreakdown {
            bunch: num(col::BUNCH) as u32,
            laying: num(col::LAYING) as u32,
            copper_weight: round_weight(num(col::COPPER_WEIGHT)),
            pvc_weight: round_weight(num(col::PVC_WEIGHT)),
            final_copper: round_weight(num(col::FINAL_COPPER)),
            final_pvc_round: round_weight(num(col::FINAL_PVC_ROUND)),
            final_pvc_flat: round_weight(num(col::FINAL_PVC_FLAT)),
            rmc: round_currency(num(col::RMC)),
            bundle_cost: round_currency(num(col::BUNDLE_COST)),
            bundle_weight: round_weight(num(col::BUNDLE_WEIGHT)),
            cost_of_wire_per_mtr: round_currency(num(col::COST_OF_WIRE_PER_MTR)),
            wire_cost: round_currency(num(col::WIRE_COST)),
            cord_cost: round_currency(num(col::CORD_COST)),
        };

        Ok(CostingRecord {
            costing_id: costing_id.trim().to_string(),
            date,
            specifications: cell_text(row, col::SPECIFICATIONS),
            spec,
            cable_type: CableType::from_label(&cell_text(row, col::TYPE)),
            rates: MaterialRates::new(num(col::COPPER_RATE), num(col::PVC_RATE)),
            enquiry_by: cell_text(row, col::ENQUIRY_BY),
            company: cell_text(row, col::COMPANY),
            remarks: cell_text(row, col::REMARKS),
            breakdown,
            unique: cell_text(row, col::UNIQUE),
        })
    }
}

/// Cell as text; numbers are formatted, missing cells are empty.
pub fn cell_text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Cell as a number; anything unparseable is zero.
pub fn cell_number(row: &Row, column: &str) -> f64 {
    match row.get(column) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_number(s).unwrap_or(0.0),
        _ => 0.0,
    }
}
