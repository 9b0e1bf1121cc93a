//! Guild Log Analysis - Type System
//!
//! - `report`: Records fetched from the log API (fights, participants, actors, events, tables)
//! - `entries`: Declarative analysis and plot entries from boss definitions
//! - `results`: Per-player result rows and per-report analysis results

mod entries;
mod report;
mod results;

pub use entries::*;
pub use report::*;
pub use results::*;
