//! # PDF Costing Sheet
//!
//! Renders a stored costing as a printable quotation sheet using Typst.
//!
//! ## Architecture
//!
//! - The Typst template is an embedded string constant
//! - Record values are substituted into `{{PLACEHOLDER}}` slots
//! - Fonts come from `typst-assets` and are loaded once per process
//! - Output is raw PDF bytes (`Vec<u8>`)
//!
//! ## Example
//!
//! ```rust,no_run
//! use costing_core::pdf::render_costing_pdf;
//! use costing_core::settings::CostingSettings;
//! use costing_core::sheet::CostingSheet;
//! use costing_core::store::JsonFileStore;
//!
//! let sheet = CostingSheet::new(JsonFileStore::new("costings.json"), CostingSettings::default());
//! let record = sheet.find("CO-0004")?;
//! std::fs::write("CO-0004.pdf", render_costing_pdf(&record)?).unwrap();
//! # Ok::<(), costing_core::errors::CostError>(())
//! ```

use chrono::Utc;
use once_cell::sync::Lazy;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::errors::{CostError, CostResult};
use crate::formulas::generate_formulas_appendix_typst;
use crate::record::CostingRecord;

// ============================================================================
// Typst World Implementation
// ============================================================================

/// Bundled fonts, parsed once.
static FONTS: Lazy<Vec<Font>> = Lazy::new(|| {
    typst_assets::fonts()
        .flat_map(|font_bytes| Font::iter(Bytes::new(font_bytes.to_vec())))
        .collect()
});

/// A minimal Typst world for compiling one document without external files.
struct PdfWorld {
    main: Source,
    book: LazyHash<FontBook>,
    library: LazyHash<Library>,
}

impl PdfWorld {
    fn new(source: String) -> Self {
        PdfWorld {
            main: Source::detached(source),
            book: LazyHash::new(FontBook::from_fonts(FONTS.iter())),
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for PdfWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        FONTS.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(
            now.format("%Y").to_string().parse().ok()?,
            now.format("%m").to_string().parse().ok()?,
            now.format("%d").to_string().parse().ok()?,
        )
    }
}

// ============================================================================
// Template
// ============================================================================

const COSTING_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Wirecost Costing Sheet]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[{{COSTING_ID}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[{{DATE}}]],
    )
  ]
)

#set text(size: 10pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Costing Sheet]
    #v(4pt)
    #text(size: 14pt)[{{COSTING_ID}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Enquiry*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Company:], [{{COMPANY}}],
      [Enquiry By:], [{{ENQUIRY_BY}}],
      [Date:], [{{DATE}}],
      [Type:], [{{TYPE}}],
    )
  ],
  [
    *Rates*
    #v(4pt)
    #table(
      columns: (auto, 1fr),
      stroke: none,
      row-gutter: 4pt,
      [Copper:], [{{COPPER_RATE}} per kg],
      [PVC:], [{{PVC_RATE}} per kg],
      [Labour:], [{{LABOUR}} %],
    )
  ]
)

#v(12pt)

== Specification

*Description:* {{SPECIFICATIONS}}

#v(8pt)

== Construction

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Parameter*], [*Value*], [*Unit*]),
  [Cu Strands], [{{CU_STRANDS}}], [],
  [Gauge], [{{GAUGE}}], [mm],
  [Inner OD], [{{INNER_OD}}], [mm],
  [No of Cores], [{{NO_OF_CORES}}], [],
  [Round OD], [{{ROUND_OD}}], [mm],
  [Flat B x W], [{{FLAT_B}} x {{FLAT_W}}], [mm],
  [Length Required], [{{LENGTH_REQ}}], [m],
)

#v(8pt)

== Weights

#table(
  columns: (1fr, auto, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right, left),
  table.header([*Item*], [*Value*], [*Unit*]),
  [Bunch], [{{BUNCH}}], [],
  [Laying], [{{LAYING}}], [],
  [Copper Weight], [{{COPPER_WEIGHT}}], [kg/100 m],
  [PVC Weight], [{{PVC_WEIGHT}}], [kg/100 m],
  [Final Copper], [{{FINAL_COPPER}}], [kg/100 m],
  [Final PVC Round], [{{FINAL_PVC_ROUND}}], [kg/100 m],
  [Final PVC Flat], [{{FINAL_PVC_FLAT}}], [kg/100 m],
  [*Bundle Weight*], [*{{BUNDLE_WEIGHT}}*], [kg/100 m],
)

#v(8pt)

== Costs

#table(
  columns: (1fr, auto),
  inset: 6pt,
  stroke: 0.5pt,
  align: (left, right),
  table.header([*Item*], [*Amount*]),
  [Raw Material Cost (per 100 m)], [{{RMC}}],
  [Bundle Cost (per 100 m)], [{{BUNDLE_COST}}],
  [Cost of Wire per Meter], [{{COST_PER_MTR}}],
  [Wire Cost ({{LENGTH_REQ}} m)], [{{WIRE_COST}}],
  [Plug Cost], [{{PLUG_COST}}],
  [Terminal & Accessories], [{{TERMINAL_COST}}],
  [*Cord Cost*], [*{{CORD_COST}}*],
)

#v(8pt)

*Remarks:* {{REMARKS}}
"##;

/// Typst source for a costing sheet.
fn costing_sheet_source(record: &CostingRecord) -> String {
    let b = record.breakdown.rounded();
    let s = &record.spec;
    let weight = |v: f64| format!("{:.4}", v);
    let money = |v: f64| format!("{:.2}", v);
    let plain = |v: f64| v.to_string();

    let replacements: [(&str, String); 33] = [
        ("{{COSTING_ID}}", escape_typst(&record.costing_id)),
        ("{{DATE}}", record.date.format("%Y-%m-%d").to_string()),
        ("{{COMPANY}}", escape_typst(&record.company)),
        ("{{ENQUIRY_BY}}", escape_typst(&record.enquiry_by)),
        ("{{TYPE}}", record.cable_type.label().to_string()),
        ("{{COPPER_RATE}}", money(record.rates.copper_rate)),
        ("{{PVC_RATE}}", money(record.rates.pvc_rate)),
        ("{{LABOUR}}", plain(s.labour_on_wire)),
        ("{{SPECIFICATIONS}}", escape_typst(&record.specifications)),
        ("{{CU_STRANDS}}", plain(s.cu_strands)),
        ("{{GAUGE}}", plain(s.gauge)),
        ("{{INNER_OD}}", plain(s.inner_od)),
        ("{{NO_OF_CORES}}", plain(s.no_of_cores)),
        ("{{ROUND_OD}}", plain(s.round_od)),
        ("{{FLAT_B}}", plain(s.flat_b)),
        ("{{FLAT_W}}", plain(s.flat_w)),
        ("{{LENGTH_REQ}}", plain(s.length_req)),
        ("{{BUNCH}}", b.bunch.to_string()),
        ("{{LAYING}}", b.laying.to_string()),
        ("{{COPPER_WEIGHT}}", weight(b.copper_weight)),
        ("{{PVC_WEIGHT}}", weight(b.pvc_weight)),
        ("{{FINAL_COPPER}}", weight(b.final_copper)),
        ("{{FINAL_PVC_ROUND}}", weight(b.final_pvc_round)),
        ("{{FINAL_PVC_FLAT}}", weight(b.final_pvc_flat)),
        ("{{BUNDLE_WEIGHT}}", weight(b.bundle_weight)),
        ("{{RMC}}", money(b.rmc)),
        ("{{BUNDLE_COST}}", money(b.bundle_cost)),
        ("{{COST_PER_MTR}}", money(b.cost_of_wire_per_mtr)),
        ("{{WIRE_COST}}", money(b.wire_cost)),
        ("{{PLUG_COST}}", money(s.plug_cost)),
        ("{{TERMINAL_COST}}", money(s.terminal_acc_cost)),
        ("{{CORD_COST}}", money(b.cord_cost)),
        ("{{REMARKS}}", escape_typst(&record.remarks)),
    ];

    let mut source = fill_placeholders(COSTING_TEMPLATE, &replacements);
    source.push_str(&generate_formulas_appendix_typst());
    source
}

/// Substitute `{{NAME}}` slots in one pass over the template.
///
/// Inserted values are never rescanned, so user text that happens to contain
/// a placeholder stays literal. Unknown placeholders are left as-is.
fn fill_placeholders(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len() + 512);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let slot = &rest[start..];
        let Some(end) = slot.find("}}") else {
            rest = slot;
            break;
        };
        let placeholder = &slot[..end + 2];
        match values.iter().find(|(key, _)| *key == placeholder) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(placeholder),
        }
        rest = &slot[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Render a costing record as a PDF quotation sheet.
///
/// # Returns
///
/// * `Ok(Vec<u8>)` - PDF bytes
/// * `Err(CostError::Internal)` - Typst compilation or export failed
pub fn render_costing_pdf(record: &CostingRecord) -> CostResult<Vec<u8>> {
    let world = PdfWorld::new(costing_sheet_source(record));
    let warned = typst::compile(&world);

    let document = warned.output.map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CostError::Internal {
            message: format!("Typst compilation failed: {}", error_msgs.join("; ")),
        }
    })?;

    let pdf_bytes = typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let error_msgs: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        CostError::Internal {
            message: format!("PDF rendering failed: {}", error_msgs.join("; ")),
        }
    })?;

    tracing::debug!(costing_id = %record.costing_id, bytes = pdf_bytes.len(), "costing sheet rendered");
    Ok(pdf_bytes)
}

/// Escape special Typst characters in user-provided text
fn escape_typst(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '*' => "\\*".to_string(),
            '_' => "\\_".to_string(),
            '#' => "\\#".to_string(),
            '$' => "\\$".to_string(),
            '@' => "\\@".to_string(),
            '<' => "\\<".to_string(),
            '>' => "\\>".to_string(),
            '[' => "\\[".to_string(),
            ']' => "\\]".to_string(),
            '/' => "\\/".to_string(),
            '\\' => "\\\\".to_string(),
            '`' => "\\`".to_string(),
            '~' => "\\~".to_string(),
            '\n' | '\r' => " ".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::costing::{CableType, CostingDefaults, CostingInput, RoundingMode};
    use crate::numeric::FieldValue;

    fn record() -> CostingRecord {
        let input = CostingInput {
            specifications: "3C x 0.75 sq mm [FR] #1 grade".to_string(),
            cu_strands: Some(FieldValue::from(30.0)),
            gauge: Some(FieldValue::from(0.2)),
            inner_od: Some(FieldValue::from(1.5)),
            no_of_cores: Some(FieldValue::from(3.0)),
            round_od: Some(FieldValue::from(6.0)),
            length_req: Some(FieldValue::from(100.0)),
            cable_type: CableType::Plug,
            plug_cost: Some(FieldValue::from(25.5)),
            enquiry_by: "R. Mehta".to_string(),
            company: "Acme_Electricals".to_string(),
            remarks: "Quote valid 7 days // ask for bulk rate".to_string(),
            ..CostingInput::default()
        };
        CostingRecord::from_input("CO-0012", Utc::now(), &input, &CostingDefaults::default(), RoundingMode::Precise)
    }

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("a_b"), "a\\_b");
        assert_eq!(escape_typst("[x]"), "\\[x\\]");
        assert_eq!(escape_typst("#1"), "\\#1");
        assert_eq!(escape_typst("line\nbreak"), "line break");
        assert_eq!(escape_typst("plain text"), "plain text");
    }

    #[test]
    fn test_source_fills_every_placeholder() {
        let source = costing_sheet_source(&record());
        assert!(!source.contains("{{"), "unfilled placeholder left in template");
        assert!(source.contains("CO-0012"));
        assert!(source.contains("Acme\\_Electricals"));
        assert!(source.contains("38.5308"));
        assert!(source.contains("Appendix: Costing Formulas"));
    }

    #[test]
    fn test_placeholder_text_in_user_fields_stays_literal() {
        let mut record = record();
        record.company = "{{CORD_COST}} Traders".to_string();
        record.remarks = "see {{REMARKS}}".to_string();

        let source = costing_sheet_source(&record);
        assert!(source.contains("[{{CORD_COST}} Traders]"));
        assert!(source.contains("*Remarks:* see {{REMARKS}}"));
    }

    #[test]
    fn test_fill_placeholders_single_pass() {
        let values = [("{{A}}", "{{B}}".to_string()), ("{{B}}", "b".to_string())];
        assert_eq!(fill_placeholders("{{A}}-{{B}}", &values), "{{B}}-b");
        assert_eq!(fill_placeholders("{{C}} {{A}", &values), "{{C}} {{A}");
    }

    #[test]
    fn test_pdf_generation() {
        let pdf = render_costing_pdf(&record());
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let pdf_bytes = pdf.unwrap();
        assert!(pdf_bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(pdf_bytes.len() > 1000, "PDF seems too small");
    }
}
