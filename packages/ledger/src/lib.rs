//! Durable resume ledger for dupgen.
//!
//! Records which duplication tasks have been fully written so an interrupted
//! run can skip them on restart. The ledger lives at
//! `<output>/.resume_state.json` and is always replaced atomically.
//!
//! Loading is best-effort: a missing, unreadable or malformed ledger simply
//! means "no prior progress".
//!
//! # Example
//!
//! ```rust,ignore
//! use dupgen_ledger::{NamingMode, ResumeLedger, TaskId};
//!
//! let ledger = ResumeLedger::load(output, NamingMode::Sequential, 500);
//! let done = ledger.completed();
//! if !done.contains(&TaskId::new(0, 7)) {
//!     // ... write the file ...
//!     ledger.record(TaskId::new(0, 7));
//! }
//! ledger.persist()?;
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod ledger;
mod state;

pub use error::LedgerError;
pub use ledger::ResumeLedger;
pub use state::{LEDGER_VERSION, NamingMode, RESUME_FILE, RESUME_TMP_FILE, TaskId};
