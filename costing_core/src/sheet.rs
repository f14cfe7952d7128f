//! # Costing Sheet
//!
//! Ties the calculator to a [`RecordStore`]: computes a submitted costing,
//! assigns the next `CO-NNNN` ID and appends the row.
//!
//! ## ID allocation
//!
//! The next ID is read as max+1 over the stored rows, which two writers can
//! compute at the same time. Stores reject a second row with the same
//! `Costing ID`, so the loser of such a race gets `DuplicateKey`, re-reads and
//! tries again (up to [`MAX_ID_ATTEMPTS`] times). When the rows cannot be read
//! at all, a timestamp-derived ID is used instead and a warning is logged.
//!
//! ## Example
//!
//! ```rust
//! use costing_core::calculations::CostingInput;
//! use costing_core::numeric::FieldValue;
//! use costing_core::settings::CostingSettings;
//! use costing_core::sheet::CostingSheet;
//! use costing_core::store::MemoryStore;
//!
//! let mut sheet = CostingSheet::new(MemoryStore::new(), CostingSettings::default());
//!
//! let input = CostingInput {
//!     specifications: "2C x 0.5 sq mm".to_string(),
//!     cu_strands: Some(FieldValue::from("16")),
//!     gauge: Some(FieldValue::from(0.2)),
//!     no_of_cores: Some(FieldValue::from(2.0)),
//!     length_req: Some(FieldValue::from(90.0)),
//!     ..CostingInput::default()
//! };
//!
//! let record = sheet.submit(&input)?;
//! assert_eq!(record.costing_id, "CO-0001");
//! assert_eq!(sheet.records()?.len(), 1);
//! # Ok::<(), costing_core::errors::CostError>(())
//! ```

use chrono::Utc;

use crate::calculations::costing::{calculate_input, CostingBreakdown, CostingInput};
use crate::errors::{CostError, CostResult};
use crate::id::{fallback_id, next_costing_id, COSTING_ID_PREFIX};
use crate::record::{cell_text, CostingRecord};
use crate::schema::{columns, costing_schema, COSTING_TABLE};
use crate::settings::CostingSettings;
use crate::store::RecordStore;

/// Attempts at claiming a fresh ID before giving up.
pub const MAX_ID_ATTEMPTS: u32 = 5;

/// Costing records over a record store.
pub struct CostingSheet<S: RecordStore> {
    store: S,
    settings: CostingSettings,
    initialized: bool,
}

impl<S: RecordStore> CostingSheet<S> {
    pub fn new(store: S, settings: CostingSettings) -> Self {
        CostingSheet {
            store,
            settings,
            initialized: false,
        }
    }

    pub fn settings(&self) -> &CostingSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Create the costing table with its header row if it is missing.
    pub fn init(&mut self) -> CostResult<()> {
        if !self.initialized {
            self.store.ensure_table(&costing_schema())?;
            self.initialized = true;
        }
        Ok(())
    }

    /// Compute a costing without storing it.
    pub fn preview(&self, input: &CostingInput) -> CostingBreakdown {
        calculate_input(input, &self.settings.defaults, self.settings.rounding)
    }

    /// ID the next submission would get.
    ///
    /// Falls back to a timestamp-derived ID when the store cannot be read.
    pub fn next_id(&self) -> String {
        match self.scan_next_id() {
            Ok(id) => id,
            Err(e) => {
                let id = fallback_id(COSTING_ID_PREFIX, Utc::now());
                tracing::warn!(error = %e, fallback = %id, "could not scan costing IDs, using timestamp fallback");
                id
            }
        }
    }

    fn scan_next_id(&self) -> CostResult<String> {
        let rows = self.store.read_all_rows(COSTING_TABLE)?;
        let ids: Vec<String> = rows.iter().map(|row| cell_text(row, columns::COSTING_ID)).collect();
        Ok(next_costing_id(ids.iter().map(String::as_str)))
    }

    /// Calculate, number and append a costing.
    ///
    /// # Returns
    ///
    /// * `Ok(CostingRecord)` - The stored record (full precision)
    /// * `Err(CostError::MissingField)` - No specification text
    /// * `Err(CostError::IdExhausted)` - Every ID attempt collided
    /// * `Err(_)` - Store failure
    pub fn submit(&mut self, input: &CostingInput) -> CostResult<CostingRecord> {
        input.validate()?;
        self.init()?;

        let draft = CostingRecord::from_input(
            String::new(),
            Utc::now(),
            input,
            &self.settings.defaults,
            self.settings.rounding,
        );

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let record = draft.clone().with_id(self.next_id());
            match self.store.append_row(COSTING_TABLE, record.to_row()) {
                Ok(()) => {
                    tracing::info!(
                        costing_id = %record.costing_id,
                        company = %record.company,
                        cord_cost = record.breakdown.cord_cost,
                        "costing recorded"
                    );
                    return Ok(record);
                }
                Err(CostError::DuplicateKey { key, .. }) => {
                    tracing::warn!(attempt, %key, "costing ID already taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(CostError::IdExhausted {
            table: COSTING_TABLE.to_string(),
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// All stored costings in sheet order.
    ///
    /// Rows that cannot be read back (no ID, bad date) are skipped with a
    /// warning rather than failing the whole listing.
    pub fn records(&self) -> CostResult<Vec<CostingRecord>> {
        let rows = self.store.read_all_rows(COSTING_TABLE)?;
        let records = rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| match CostingRecord::from_row(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(row = i + 1, error = %e, "skipping unreadable costing row");
                    None
                }
            })
            .collect();
        Ok(records)
    }

    /// Look up a costing by ID.
    pub fn find(&self, costing_id: &str) -> CostResult<CostingRecord> {
        let wanted = costing_id.trim();
        self.records()?
            .into_iter()
            .find(|r| r.costing_id == wanted)
            .ok_or_else(|| CostError::record_not_found(COSTING_TABLE, wanted))
    }
}
