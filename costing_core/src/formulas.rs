//! # Formula Registry
//!
//! Every costing formula with its metadata, so reports and the generated
//! `FORMULAS.md` describe exactly what [`crate::calculations::costing`]
//! computes.
//!
//! ## Usage
//!
//! ```rust
//! use costing_core::formulas::{Formula, FormulaCategory};
//!
//! let meta = Formula::FinalCopper.metadata();
//! assert_eq!(meta.category, FormulaCategory::Weights);
//! println!("{}", meta.formula_plain);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Categories
// ============================================================================

/// Grouping used in the reference and the PDF appendix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Discrete auto-classifications (bunch, laying)
    Classification,
    /// Material weights per 100 m
    Weights,
    /// Material, labour and add-on costs
    Costs,
}

impl FormulaCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Classification => "Classification",
            FormulaCategory::Weights => "Weights",
            FormulaCategory::Costs => "Costs",
        }
    }

    /// Sort order (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Classification => 1,
            FormulaCategory::Weights => 2,
            FormulaCategory::Costs => 3,
        }
    }

    pub fn all() -> [FormulaCategory; 3] {
        [
            FormulaCategory::Classification,
            FormulaCategory::Weights,
            FormulaCategory::Costs,
        ]
    }
}

// ============================================================================
// Variables and Metadata
// ============================================================================

/// A symbol used in a formula.
#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self {
            symbol,
            description,
            units,
        }
    }
}

/// Everything needed to document one formula.
#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Plain-text formula
    pub formula_plain: &'static str,
    pub variables: Vec<Variable>,
    /// Caveats worth printing next to the formula
    pub notes: Vec<&'static str>,
    pub category: FormulaCategory,
    /// Sheet column the result is stored under
    pub column: &'static str,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// The costing formulas, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    Bunch,
    Laying,
    CopperWeight,
    PvcWeight,
    FinalCopper,
    FinalPvcRound,
    FinalPvcFlat,
    RawMaterialCost,
    BundleCost,
    BundleWeight,
    CostOfWirePerMtr,
    WireCost,
    CordCost,
}

const STRANDS: Variable = Variable::new("n", "Copper strands (cuStrands)", "count");
const GAUGE: Variable = Variable::new("g", "Strand gauge", "mm");
const CORES: Variable = Variable::new("k", "Number of cores (noOfCores)", "count");
const BUNCH: Variable = Variable::new("b", "Bunching allowance", "kg/100 m per core");

impl Formula {
    pub fn metadata(&self) -> FormulaMetadata {
        use crate::schema::columns as col;

        match self {
            Formula::Bunch => FormulaMetadata {
                name: "Bunch",
                description: "Bunching allowance applied to multi-strand conductors",
                formula_plain: "b = 3 if n > 24, else 0",
                variables: vec![STRANDS, BUNCH],
                notes: vec!["Strict comparison: 24 strands get no allowance"],
                category: FormulaCategory::Classification,
                column: col::BUNCH,
            },
            Formula::Laying => FormulaMetadata {
                name: "Laying",
                description: "Whether cores are laid up together",
                formula_plain: "laying = 1 if k > 2, else 0",
                variables: vec![CORES],
                notes: vec!["Informational; not used by any cost formula"],
                category: FormulaCategory::Classification,
                column: col::LAYING,
            },
            Formula::CopperWeight => FormulaMetadata {
                name: "Copper Weight",
                description: "Copper weight of one core",
                formula_plain: "Wcu = 0.703 * g^2 * n + b * k",
                variables: vec![GAUGE, STRANDS, BUNCH, CORES],
                notes: vec![],
                category: FormulaCategory::Weights,
                column: col::COPPER_WEIGHT,
            },
            Formula::PvcWeight => FormulaMetadata {
                name: "PVC Weight",
                description: "Insulation weight of one core",
                formula_plain: "Wpvc = 1.67 * 0.0785 * (ID^2 - g^2 * n)",
                variables: vec![Variable::new("ID", "Inner OD", "mm"), GAUGE, STRANDS],
                notes: vec!["Negative when the inner OD is smaller than the conductor bundle; not clamped"],
                category: FormulaCategory::Weights,
                column: col::PVC_WEIGHT,
            },
            Formula::FinalCopper => FormulaMetadata {
                name: "Final Copper",
                description: "Copper weight across all cores",
                formula_plain: "Fcu = Wcu * k + b * k",
                variables: vec![CORES, BUNCH],
                notes: vec![],
                category: FormulaCategory::Weights,
                column: col::FINAL_COPPER,
            },
            Formula::FinalPvcRound => FormulaMetadata {
                name: "Final PVC Round",
                description: "Outer sheath weight for a round cable",
                formula_plain: "Fr = 1.67 * (0.785 * OD^2 - 0.785 * g^2 * n * k) / 10, or 0 when OD = 0",
                variables: vec![Variable::new("OD", "Round OD", "mm"), GAUGE, STRANDS, CORES],
                notes: vec![],
                category: FormulaCategory::Weights,
                column: col::FINAL_PVC_ROUND,
            },
            Formula::FinalPvcFlat => FormulaMetadata {
                name: "Final PVC Flat",
                description: "Outer sheath weight for a flat cable",
                formula_plain: "Ff = 1.67 * (B * W - 0.785 * g^2 * n * k) / 10, or 0 when B = 0 or W = 0",
                variables: vec![
                    Variable::new("B", "Flat breadth", "mm"),
                    Variable::new("W", "Flat width", "mm"),
                    GAUGE,
                    STRANDS,
                    CORES,
                ],
                notes: vec![],
                category: FormulaCategory::Weights,
                column: col::FINAL_PVC_FLAT,
            },
            Formula::RawMaterialCost => FormulaMetadata {
                name: "Raw Material Cost",
                description: "Copper and PVC cost per 100 m",
                formula_plain: "RMC = Fcu * Rcu + Fr * Rpvc + Ff * Rpvc",
                variables: vec![
                    Variable::new("Rcu", "Copper rate", "per kg"),
                    Variable::new("Rpvc", "PVC rate", "per kg"),
                ],
                notes: vec![],
                category: FormulaCategory::Costs,
                column: col::RMC,
            },
            Formula::BundleCost => FormulaMetadata {
                name: "Bundle Cost",
                description: "Raw material cost plus labour, per 100 m",
                formula_plain: "Cb = RMC + (L / 100) * RMC",
                variables: vec![Variable::new("L", "Labour on wire", "%")],
                notes: vec![],
                category: FormulaCategory::Costs,
                column: col::BUNDLE_COST,
            },
            Formula::BundleWeight => FormulaMetadata {
                name: "Bundle Weight",
                description: "Total material weight per 100 m",
                formula_plain: "Wb = Fcu + Fr + Ff",
                variables: vec![],
                notes: vec![],
                category: FormulaCategory::Weights,
                column: col::BUNDLE_WEIGHT,
            },
            Formula::CostOfWirePerMtr => FormulaMetadata {
                name: "Cost of Wire per Meter",
                description: "Bundle cost brought down to one meter",
                formula_plain: "Cm = Cb / 100",
                variables: vec![],
                notes: vec![],
                category: FormulaCategory::Costs,
                column: col::COST_OF_WIRE_PER_MTR,
            },
            Formula::WireCost => FormulaMetadata {
                name: "Wire Cost",
                description: "Cost of the requested length",
                formula_plain: "Cw = Cm * len",
                variables: vec![Variable::new("len", "Length required", "m")],
                notes: vec![],
                category: FormulaCategory::Costs,
                column: col::WIRE_COST,
            },
            Formula::CordCost => FormulaMetadata {
                name: "Cord Cost",
                description: "Wire cost plus plug and terminal add-ons",
                formula_plain: "Cc = Cw + plug + terminal",
                variables: vec![
                    Variable::new("plug", "Plug cost", "currency"),
                    Variable::new("terminal", "Terminal and accessories cost", "currency"),
                ],
                notes: vec![],
                category: FormulaCategory::Costs,
                column: col::CORD_COST,
            },
        }
    }

    /// Formulas in a category, in evaluation order.
    pub fn in_category(category: FormulaCategory) -> Vec<Formula> {
        ALL_FORMULAS
            .iter()
            .filter(|f| f.metadata().category == category)
            .copied()
            .collect()
    }
}

/// All formulas, in evaluation order.
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::Bunch,
    Formula::Laying,
    Formula::CopperWeight,
    Formula::PvcWeight,
    Formula::FinalCopper,
    Formula::FinalPvcRound,
    Formula::FinalPvcFlat,
    Formula::RawMaterialCost,
    Formula::BundleCost,
    Formula::BundleWeight,
    Formula::CostOfWirePerMtr,
    Formula::WireCost,
    Formula::CordCost,
];

// ============================================================================
// Generated Documentation
// ============================================================================

/// Generate the formulas reference (FORMULAS.md).
///
/// ```rust
/// use costing_core::formulas::generate_formulas_markdown;
///
/// let markdown = generate_formulas_markdown();
/// assert!(markdown.contains("Wirecost Formulas Reference"));
/// assert!(markdown.contains("## Weights"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(
        r#"# Wirecost Formulas Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

Weights are kg per 100 m. Weight columns are stored to 4 decimals and money
columns to 2, rounding half away from zero.

---

"#,
    );

    for category in FormulaCategory::all() {
        let formulas = Formula::in_category(category);
        if formulas.is_empty() {
            continue;
        }
        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in formulas {
            let meta = formula.metadata();
            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));
            output.push_str(&format!("**Sheet column:** `{}`\n\n", meta.column));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            for note in &meta.notes {
                output.push_str(&format!("- {}\n", note));
            }
            if !meta.notes.is_empty() {
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!("**Total formulas:** {}\n", ALL_FORMULAS.len()));
    output
}

/// Typst markup for the formula appendix of a costing sheet.
pub fn generate_formulas_appendix_typst() -> String {
    let mut output = String::from(
        r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Appendix: Costing Formulas]
  ]
]

#v(8pt)
"##,
    );

    for category in FormulaCategory::all() {
        output.push_str(&format!("\n== {}\n\n", category.display_name()));
        output.push_str("#table(\n  columns: (auto, 1fr),\n  inset: 6pt,\n  stroke: 0.5pt,\n");
        output.push_str("  table.header([*Field*], [*Formula*]),\n");
        for formula in Formula::in_category(category) {
            let meta = formula.metadata();
            output.push_str(&format!("  [{}], [`{}`],\n", meta.name, meta.formula_plain));
        }
        output.push_str(")\n");
    }

    output
}
