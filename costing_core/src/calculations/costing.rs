//! # Wire Costing Calculation
//!
//! Turns a raw cable specification (strands, gauge, cores, sheath dimensions)
//! plus the active copper and PVC rates into a full cost breakdown.
//!
//! ## Units
//!
//! - Weights are kg per 100 m of cable
//! - Rates are currency per kg
//! - `bundle_cost` is per 100 m, `cost_of_wire_per_mtr` per meter
//!
//! ## Rounding
//!
//! [`RoundingMode::Precise`] keeps full `f64` precision between formulas and
//! rounds only when a record is written out. [`RoundingMode::Legacy`] rounds
//! every derived value to its display precision as soon as it is computed and
//! feeds the rounded value forward, which reproduces sheets written by the old
//! web form.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::costing::{calculate, MaterialRates, RoundingMode, WireSpec};
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
//! let result = calculate(&spec, &MaterialRates::default(), RoundingMode::Precise);
//! assert_eq!(result.bunch, 3);
//! assert!((result.final_copper - 38.5308).abs() < 1e-9);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CostError, CostResult};
use crate::numeric::{lenient_text, number_or, number_or_zero, round_currency, round_weight, value_as_text, FieldValue};

/// Copper density factor for weight per 100 m (kg).
pub const COPPER_FACTOR: f64 = 0.703;

/// PVC density factor.
pub const PVC_FACTOR: f64 = 1.67;

/// Area factor used by the single-core PVC weight (pi/4 / 10).
pub const PVC_WEIGHT_AREA_FACTOR: f64 = 0.0785;

/// Area factor used by the sheath formulas (pi/4).
pub const SHEATH_AREA_FACTOR: f64 = 0.785;

/// Strand count above which a bunching allowance applies.
pub const BUNCH_STRAND_THRESHOLD: f64 = 24.0;

/// Bunching allowance (kg per core per 100 m).
pub const BUNCH_ALLOWANCE: u32 = 3;

/// Core count above which cores are laid up.
pub const LAYING_CORE_THRESHOLD: f64 = 2.0;

// ============================================================================
// Material Rates and Defaults
// ============================================================================

/// Material rates in currency per kg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialRates {
    pub copper_rate: f64,
    pub pvc_rate: f64,
}

impl MaterialRates {
    pub const DEFAULT_COPPER_RATE: f64 = 700.0;
    pub const DEFAULT_PVC_RATE: f64 = 100.0;

    pub fn new(copper_rate: f64, pvc_rate: f64) -> Self {
        MaterialRates { copper_rate, pvc_rate }
    }
}

impl Default for MaterialRates {
    fn default() -> Self {
        MaterialRates::new(Self::DEFAULT_COPPER_RATE, Self::DEFAULT_PVC_RATE)
    }
}

/// Fallback values used when a submitted field is absent or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostingDefaults {
    pub copper_rate: f64,
    pub pvc_rate: f64,
    /// Labour percentage on wire
    pub labour_on_wire: f64,
}

impl CostingDefaults {
    pub const DEFAULT_LABOUR_ON_WIRE: f64 = 12.0;

    pub fn rates(&self) -> MaterialRates {
        MaterialRates::new(self.copper_rate, self.pvc_rate)
    }
}

impl Default for CostingDefaults {
    fn default() -> Self {
        CostingDefaults {
            copper_rate: MaterialRates::DEFAULT_COPPER_RATE,
            pvc_rate: MaterialRates::DEFAULT_PVC_RATE,
            labour_on_wire: Self::DEFAULT_LABOUR_ON_WIRE,
        }
    }
}

/// How intermediate values flow between formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMode {
    /// Unrounded intermediates; round only at output
    #[default]
    Precise,
    /// Round each derived field before later formulas use it
    Legacy,
}

// ============================================================================
// Cable Type
// ============================================================================

/// Product type. Unknown labels, `null` and non-text values fall back to `Wire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "String")]
pub enum CableType {
    #[default]
    Wire,
    Plug,
}

impl CableType {
    pub fn label(&self) -> &'static str {
        match self {
            CableType::Wire => "Wire",
            CableType::Plug => "Plug",
        }
    }

    /// Case-insensitive parse; anything unrecognized is `Wire`.
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("plug") {
            CableType::Plug
        } else {
            CableType::Wire
        }
    }
}

impl From<serde_json::Value> for CableType {
    fn from(value: serde_json::Value) -> Self {
        CableType::from_label(&value_as_text(&value))
    }
}

impl From<CableType> for String {
    fn from(t: CableType) -> Self {
        t.label().to_string()
    }
}

impl fmt::Display for CableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Input
// ============================================================================

/// A costing request as submitted by the form.
///
/// Numeric fields accept numbers or text. Text fields accept any JSON value;
/// missing or `null` text is empty.
///
/// ## JSON Example
///
/// ```json
/// {
///   "specifications": "3 core 0.75 sq mm flexible",
///   "cuStrands": "30",
///   "gauge": 0.2,
///   "innerOD": 1.5,
///   "noOfCores": 3,
///   "lengthReq": 100,
///   "type": "Wire",
///   "company": "Acme Electricals"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostingInput {
    #[serde(deserialize_with = "lenient_text")]
    pub specifications: String,
    pub cu_strands: Option<FieldValue>,
    pub gauge: Option<FieldValue>,
    #[serde(rename = "innerOD")]
    pub inner_od: Option<FieldValue>,
    pub no_of_cores: Option<FieldValue>,
    #[serde(rename = "roundOD")]
    pub round_od: Option<FieldValue>,
    pub flat_b: Option<FieldValue>,
    pub flat_w: Option<FieldValue>,
    pub labour_on_wire: Option<FieldValue>,
    pub length_req: Option<FieldValue>,
    #[serde(rename = "type")]
    pub cable_type: CableType,
    pub plug_cost: Option<FieldValue>,
    pub terminal_acc_cost: Option<FieldValue>,
    pub copper_rate: Option<FieldValue>,
    pub pvc_rate: Option<FieldValue>,
    #[serde(deserialize_with = "lenient_text")]
    pub enquiry_by: String,
    #[serde(deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(deserialize_with = "lenient_text")]
    pub remarks: String,
}

impl CostingInput {
    /// Check the fields a stored record cannot do without.
    ///
    /// The calculator does not need this; the sheet calls it before appending.
    pub fn validate(&self) -> CostResult<()> {
        if self.specifications.trim().is_empty() {
            return Err(CostError::missing_field("specifications"));
        }
        Ok(())
    }

    /// Parse the numeric fields, applying defaults where required.
    ///
    /// Labour falls back to the default when absent, unparseable or negative.
    /// An explicit 0 is kept: it means "no labour markup".
    pub fn spec(&self, defaults: &CostingDefaults) -> WireSpec {
        let labour = self
            .labour_on_wire
            .as_ref()
            .and_then(FieldValue::as_number)
            .filter(|l| *l >= 0.0)
            .unwrap_or(defaults.labour_on_wire);

        WireSpec {
            cu_strands: number_or_zero(self.cu_strands.as_ref()),
            gauge: number_or_zero(self.gauge.as_ref()),
            inner_od: number_or_zero(self.inner_od.as_ref()),
            no_of_cores: number_or_zero(self.no_of_cores.as_ref()),
            round_od: number_or_zero(self.round_od.as_ref()),
            flat_b: number_or_zero(self.flat_b.as_ref()),
            flat_w: number_or_zero(self.flat_w.as_ref()),
            labour_on_wire: labour,
            length_req: number_or_zero(self.length_req.as_ref()),
            plug_cost: number_or_zero(self.plug_cost.as_ref()),
            terminal_acc_cost: number_or_zero(self.terminal_acc_cost.as_ref()),
        }
    }

    /// Resolve the material rates.
    ///
    /// Unlike labour, a rate of 0 is not a meaningful price: it would cost the
    /// material at nothing. Zero and negative rates therefore count as invalid
    /// and fall back to the defaults, as do absent or unparseable ones.
    pub fn rates(&self, defaults: &CostingDefaults) -> MaterialRates {
        let positive = |field: Option<&FieldValue>, fallback: f64| {
            let rate = number_or(field, fallback);
            if rate > 0.0 {
                rate
            } else {
                fallback
            }
        };
        MaterialRates::new(
            positive(self.copper_rate.as_ref(), defaults.copper_rate),
            positive(self.pvc_rate.as_ref(), defaults.pvc_rate),
        )
    }
}

/// Parsed numeric specification, the calculator's actual input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WireSpec {
    pub cu_strands: f64,
    pub gauge: f64,
    pub inner_od: f64,
    pub no_of_cores: f64,
    pub round_od: f64,
    pub flat_b: f64,
    pub flat_w: f64,
    /// Labour percentage applied on raw material cost
    pub labour_on_wire: f64,
    /// Required length in meters
    pub length_req: f64,
    pub plug_cost: f64,
    pub terminal_acc_cost: f64,
}

impl WireSpec {
    /// Total copper cross-section term `gauge² * cuStrands`.
    pub fn conductor_area_term(&self) -> f64 {
        self.gauge * self.gauge * self.cu_strands
    }
}

// ============================================================================
// Result
// ============================================================================

/// Derived costing fields.
///
/// Values are unrounded in [`RoundingMode::Precise`]; call
/// [`CostingBreakdown::rounded`] for display precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostingBreakdown {
    /// Bunching allowance, 0 or 3
    pub bunch: u32,
    /// 1 when cores are laid up (informational)
    pub laying: u32,
    pub copper_weight: f64,
    pub pvc_weight: f64,
    pub final_copper: f64,
    #[serde(rename = "finalPVCRound")]
    pub final_pvc_round: f64,
    #[serde(rename = "finalPVCFlat")]
    pub final_pvc_flat: f64,
    /// Raw material cost per 100 m
    pub rmc: f64,
    pub bundle_cost: f64,
    pub bundle_weight: f64,
    pub cost_of_wire_per_mtr: f64,
    pub wire_cost: f64,
    pub cord_cost: f64,
}

impl CostingBreakdown {
    /// Copy with display rounding: 4 decimals for weights, 2 for money.
    pub fn rounded(&self) -> Self {
        CostingBreakdown {
            bunch: self.bunch,
            laying: self.laying,
            copper_weight: round_weight(self.copper_weight),
            pvc_weight: round_weight(self.pvc_weight),
            final_copper: round_weight(self.final_copper),
            final_pvc_round: round_weight(self.final_pvc_round),
            final_pvc_flat: round_weight(self.final_pvc_flat),
            rmc: round_currency(self.rmc),
            bundle_cost: round_currency(self.bundle_cost),
            bundle_weight: round_weight(self.bundle_weight),
            cost_of_wire_per_mtr: round_currency(self.cost_of_wire_per_mtr),
            wire_cost: round_currency(self.wire_cost),
            cord_cost: round_currency(self.cord_cost),
        }
    }

    /// PVC weight comes out negative when the inner OD is too small for the
    /// conductor bundle. Kept as-is; callers may want to flag it.
    pub fn has_negative_pvc(&self) -> bool {
        self.pvc_weight < 0.0
    }
}

/// Bunching allowance for a strand count.
pub fn bunch_for(cu_strands: f64) -> u32 {
    if cu_strands > BUNCH_STRAND_THRESHOLD {
        BUNCH_ALLOWANCE
    } else {
        0
    }
}

/// Laying flag for a core count.
pub fn laying_for(no_of_cores: f64) -> u32 {
    if no_of_cores > LAYING_CORE_THRESHOLD {
        1
    } else {
        0
    }
}

/// Run the costing formulas.
///
/// Never fails; zero inputs simply produce zero terms.
pub fn calculate(spec: &WireSpec, rates: &MaterialRates, mode: RoundingMode) -> CostingBreakdown {
    let weight = |v: f64| match mode {
        RoundingMode::Precise => v,
        RoundingMode::Legacy => round_weight(v),
    };
    let money = |v: f64| match mode {
        RoundingMode::Precise => v,
        RoundingMode::Legacy => round_currency(v),
    };

    let bunch = bunch_for(spec.cu_strands);
    let laying = laying_for(spec.no_of_cores);
    let bunch_f = bunch as f64;
    let area = spec.conductor_area_term();
    let gauge_sq = spec.gauge * spec.gauge;

    let copper_weight = weight(COPPER_FACTOR * area + bunch_f * spec.no_of_cores);
    let pvc_weight = weight(PVC_FACTOR * PVC_WEIGHT_AREA_FACTOR * (spec.inner_od * spec.inner_od - area));
    let final_copper = weight(copper_weight * spec.no_of_cores + bunch_f * spec.no_of_cores);

    let core_bundle = SHEATH_AREA_FACTOR * gauge_sq * spec.cu_strands * spec.no_of_cores;
    let final_pvc_round = if spec.round_od == 0.0 {
        0.0
    } else {
        weight(PVC_FACTOR * (SHEATH_AREA_FACTOR * spec.round_od * spec.round_od - core_bundle) / 10.0)
    };
    let final_pvc_flat = if spec.flat_b == 0.0 || spec.flat_w == 0.0 {
        0.0
    } else {
        weight(PVC_FACTOR * ((spec.flat_b * spec.flat_w) - core_bundle) / 10.0)
    };

    let rmc = money(
        final_copper * rates.copper_rate + final_pvc_round * rates.pvc_rate + final_pvc_flat * rates.pvc_rate,
    );
    let bundle_cost = money(rmc + (spec.labour_on_wire / 100.0) * rmc);
    let bundle_weight = weight(final_copper + final_pvc_round + final_pvc_flat);
    let cost_of_wire_per_mtr = money(bundle_cost / 100.0);
    let wire_cost = money(cost_of_wire_per_mtr * spec.length_req);
    let cord_cost = money(wire_cost + spec.plug_cost + spec.terminal_acc_cost);

    let breakdown = CostingBreakdown {
        bunch,
        laying,
        copper_weight,
        pvc_weight,
        final_copper,
        final_pvc_round,
        final_pvc_flat,
        rmc,
        bundle_cost,
        bundle_weight,
        cost_of_wire_per_mtr,
        wire_cost,
        cord_cost,
    };

    tracing::debug!(
        ?mode,
        rmc = breakdown.rmc,
        cord_cost = breakdown.cord_cost,
        negative_pvc = breakdown.has_negative_pvc(),
        "costing calculated"
    );

    breakdown
}

/// Parse a submitted form and run the formulas in one step.
pub fn calculate_input(input: &CostingInput, defaults: &CostingDefaults, mode: RoundingMode) -> CostingBreakdown {
    calculate(&input.spec(defaults), &input.rates(defaults), mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn worked_example() -> WireSpec {
        WireSpec {
            cu_strands: 30.0,
            gauge: 0.2,
            inner_od: 1.5,
            no_of_cores: 3.0,
            round_od: 0.0,
            flat_b: 0.0,
            flat_w: 0.0,
            labour_on_wire: 12.0,
            length_req: 100.0,
            plug_cost: 0.0,
            terminal_acc_cost: 0.0,
        }
    }

    fn precise(spec: &WireSpec) -> CostingBreakdown {
        calculate(spec, &MaterialRates::new(700.0, 100.0), RoundingMode::Precise)
    }

    #[test]
    fn test_worked_example() {
        let r = precise(&worked_example());
        assert_eq!(r.bunch, 3);
        assert_eq!(r.laying, 1);
        assert!((r.copper_weight - 9.8436).abs() < EPS);
        assert!((r.final_copper - 38.5308).abs() < EPS);
        assert_eq!(r.final_pvc_round, 0.0);
        assert_eq!(r.final_pvc_flat, 0.0);
        assert!((r.rmc - 26971.56).abs() < 1e-6);
        assert!((r.bundle_cost - 30208.1472).abs() < 1e-6);
        assert!((r.cost_of_wire_per_mtr - 302.081472).abs() < 1e-8);
        assert!((r.wire_cost - 30208.1472).abs() < 1e-6);
        assert!((r.cord_cost - 30208.1472).abs() < 1e-6);
        // 1.67 * 0.0785 * (2.25 - 1.2) = 0.131095 * 1.05
        assert!((r.pvc_weight - 0.13764975).abs() < EPS);
    }

    #[test]
    fn test_worked_example_rounded_output() {
        let r = precise(&worked_example()).rounded();
        assert_eq!(r.copper_weight, 9.8436);
        assert_eq!(r.final_copper, 38.5308);
        assert_eq!(r.rmc, 26971.56);
        assert_eq!(r.bundle_cost, 30208.15);
        assert_eq!(r.cost_of_wire_per_mtr, 302.08);
        assert_eq!(r.pvc_weight, 0.1376);
    }

    #[test]
    fn test_bunch_step_at_24_strands() {
        assert_eq!(bunch_for(0.0), 0);
        assert_eq!(bunch_for(24.0), 0);
        assert_eq!(bunch_for(24.5), 3);
        assert_eq!(bunch_for(25.0), 3);
        for strands in 0..60 {
            let b = bunch_for(strands as f64);
            assert!(b == 0 || b == 3);
            assert_eq!(b == 3, strands > 24);
        }
    }

    #[test]
    fn test_laying_step_at_2_cores() {
        assert_eq!(laying_for(0.0), 0);
        assert_eq!(laying_for(2.0), 0);
        assert_eq!(laying_for(3.0), 1);
        for cores in 0..10 {
            assert_eq!(laying_for(cores as f64) == 1, cores > 2);
        }
    }

    #[test]
    fn test_round_sheath_zero_when_no_round_od() {
        let mut spec = worked_example();
        spec.flat_b = 5.0;
        spec.flat_w = 3.0;
        let r = precise(&spec);
        assert_eq!(r.final_pvc_round, 0.0);
        assert!(r.final_pvc_flat > 0.0);
    }

    #[test]
    fn test_flat_sheath_zero_when_either_dimension_missing() {
        let mut spec = worked_example();
        spec.round_od = 6.0;
        spec.flat_b = 5.0;
        spec.flat_w = 0.0;
        assert_eq!(precise(&spec).final_pvc_flat, 0.0);

        spec.flat_b = 0.0;
        spec.flat_w = 3.0;
        assert_eq!(precise(&spec).final_pvc_flat, 0.0);
    }

    #[test]
    fn test_sheath_formulas() {
        let mut spec = worked_example();
        spec.round_od = 6.0;
        spec.flat_b = 5.0;
        spec.flat_w = 3.0;
        let r = precise(&spec);

        // core bundle = 0.785 * 0.04 * 30 * 3 = 2.826
        let round = 1.67 * (0.785 * 36.0 - 2.826) / 10.0;
        let flat = 1.67 * (15.0 - 2.826) / 10.0;
        assert!((r.final_pvc_round - round).abs() < EPS);
        assert!((r.final_pvc_flat - flat).abs() < EPS);

        let rmc = r.final_copper * 700.0 + round * 100.0 + flat * 100.0;
        assert!((r.rmc - rmc).abs() < 1e-6);
    }

    #[test]
    fn test_identities_are_exact() {
        let mut spec = worked_example();
        spec.round_od = 6.3;
        spec.flat_b = 4.1;
        spec.flat_w = 2.7;
        spec.plug_cost = 17.35;
        spec.terminal_acc_cost = 4.2;
        spec.length_req = 37.5;
        let r = precise(&spec);

        assert_eq!(r.bundle_weight, r.final_copper + r.final_pvc_round + r.final_pvc_flat);
        assert_eq!(r.cord_cost, r.wire_cost + spec.plug_cost + spec.terminal_acc_cost);
    }

    #[test]
    fn test_idempotent() {
        let spec = worked_example();
        let rates = MaterialRates::new(812.5, 96.0);
        let a = calculate(&spec, &rates, RoundingMode::Precise);
        let b = calculate(&spec, &rates, RoundingMode::Precise);
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_pvc_weight_is_not_clamped() {
        let mut spec = worked_example();
        spec.inner_od = 0.5;
        let r = precise(&spec);
        assert!(r.pvc_weight < 0.0);
        assert!(r.has_negative_pvc());
    }

    #[test]
    fn test_malformed_strands_behave_like_zero() {
        let defaults = CostingDefaults::default();
        let input = CostingInput {
            specifications: "junk strands".to_string(),
            cu_strands: Some(FieldValue::from("abc")),
            gauge: Some(FieldValue::from(0.2)),
            inner_od: Some(FieldValue::from("1.5")),
            no_of_cores: Some(FieldValue::from(3.0)),
            length_req: Some(FieldValue::from("100")),
            ..CostingInput::default()
        };
        let zero = CostingInput {
            cu_strands: Some(FieldValue::from(0.0)),
            ..input.clone()
        };

        let r = calculate_input(&input, &defaults, RoundingMode::Precise);
        assert_eq!(r, calculate_input(&zero, &defaults, RoundingMode::Precise));
        assert_eq!(r.bunch, 0);
        assert_eq!(r.copper_weight, 0.0);
        assert_eq!(r.final_copper, 0.0);
    }

    #[test]
    fn test_empty_input_is_total() {
        let r = calculate_input(&CostingInput::default(), &CostingDefaults::default(), RoundingMode::Precise);
        assert_eq!(r, CostingBreakdown::default());
    }

    #[test]
    fn test_defaults_for_labour_and_rates() {
        let defaults = CostingDefaults::default();
        let input = CostingInput {
            labour_on_wire: Some(FieldValue::from("n/a")),
            copper_rate: Some(FieldValue::from("")),
            pvc_rate: Some(FieldValue::from(0.0)),
            ..CostingInput::default()
        };
        assert_eq!(input.spec(&defaults).labour_on_wire, 12.0);
        assert_eq!(input.rates(&defaults), MaterialRates::new(700.0, 100.0));

        let explicit = CostingInput {
            labour_on_wire: Some(FieldValue::from(0.0)),
            copper_rate: Some(FieldValue::from("812")),
            ..CostingInput::default()
        };
        assert_eq!(explicit.spec(&defaults).labour_on_wire, 0.0);
        assert_eq!(explicit.rates(&defaults).copper_rate, 812.0);
    }

    #[test]
    fn test_negative_and_zero_labour_and_rates() {
        let defaults = CostingDefaults::default();
        let input = CostingInput {
            labour_on_wire: Some(FieldValue::from(-5.0)),
            copper_rate: Some(FieldValue::from(-700.0)),
            pvc_rate: Some(FieldValue::from("-1")),
            ..CostingInput::default()
        };
        assert_eq!(input.spec(&defaults).labour_on_wire, 12.0);
        assert_eq!(input.rates(&defaults), MaterialRates::new(700.0, 100.0));

        let zero_rate = CostingInput {
            labour_on_wire: Some(FieldValue::from("0")),
            copper_rate: Some(FieldValue::from(0.0)),
            ..CostingInput::default()
        };
        assert_eq!(zero_rate.spec(&defaults).labour_on_wire, 0.0);
        assert_eq!(zero_rate.rates(&defaults).copper_rate, 700.0);
    }

    #[test]
    fn test_legacy_rounding_feeds_rounded_values_forward() {
        let spec = WireSpec {
            cu_strands: 14.0,
            gauge: 0.17,
            no_of_cores: 2.0,
            labour_on_wire: 12.0,
            length_req: 10.0,
            ..WireSpec::default()
        };
        let rates = MaterialRates::default();
        let precise = calculate(&spec, &rates, RoundingMode::Precise);
        let legacy = calculate(&spec, &rates, RoundingMode::Legacy);

        // 0.703 * 0.0289 * 14 = 0.2844338
        assert_eq!(legacy.copper_weight, 0.2844);
        assert_eq!(legacy.final_copper, 0.5688);
        assert_eq!(legacy.rmc, 398.16);
        assert!((precise.rmc - 0.5688676 * 700.0).abs() < 1e-6);
        assert_ne!(precise.rounded().rmc, legacy.rmc);
    }

    #[test]
    fn test_cable_type_parsing() {
        assert_eq!(CableType::from_label("plug"), CableType::Plug);
        assert_eq!(CableType::from_label(" Plug "), CableType::Plug);
        assert_eq!(CableType::from_label("Wire"), CableType::Wire);
        assert_eq!(CableType::from_label("cable"), CableType::Wire);

        let json = serde_json::to_string(&CableType::Plug).unwrap();
        assert_eq!(json, "\"Plug\"");
    }

    #[test]
    fn test_input_json_accepts_text_and_numbers() {
        let json = r#"{
            "specifications": "3C x 0.75",
            "cuStrands": "30",
            "gauge": 0.2,
            "innerOD": "1.5",
            "noOfCores": 3,
            "lengthReq": 100,
            "type": "Plug",
            "plugCost": null,
            "company": "Acme"
        }"#;
        let input: CostingInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.cable_type, CableType::Plug);
        assert_eq!(input.enquiry_by, "");
        assert!(input.plug_cost.is_none());

        let r = calculate_input(&input, &CostingDefaults::default(), RoundingMode::Precise);
        assert!((r.final_copper - 38.5308).abs() < EPS);
    }

    #[test]
    fn test_input_json_tolerates_null_and_numeric_text_fields() {
        let input: CostingInput = serde_json::from_str(
            r#"{"specifications": "3C", "company": null, "remarks": null, "enquiryBy": 4711, "type": null}"#,
        )
        .unwrap();
        assert_eq!(input.specifications, "3C");
        assert_eq!(input.company, "");
        assert_eq!(input.remarks, "");
        assert_eq!(input.enquiry_by, "4711");
        assert_eq!(input.cable_type, CableType::Wire);

        let input: CostingInput =
            serde_json::from_str(r#"{"specifications": 2.5, "company": true, "type": 7}"#).unwrap();
        assert_eq!(input.specifications, "2.5");
        assert_eq!(input.company, "true");
        assert_eq!(input.cable_type, CableType::Wire);

        let plug: CableType = serde_json::from_str("\"plug\"").unwrap();
        assert_eq!(plug, CableType::Plug);
    }

    #[test]
    fn test_validate_requires_specifications() {
        assert!(CostingInput::default().validate().is_err());
        let input = CostingInput {
            specifications: "2C flat".to_string(),
            ..CostingInput::default()
        };
        assert!(input.validate().is_ok());
    }
}
