//! mrcheck MR1 test harness
//!
//! This crate checks a web-hosted sentiment-analysis model for metamorphic
//! consistency: inserting an emphasis word into a sentence (MR1) must not
//! change the predicted sentiment label. It drives a real browser against the
//! system under test, submits each sentence twice (original and transformed),
//! reads the displayed prediction, and records the comparison.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MrRunner (Rust)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  for each TestCase:                                         │
//! │    ├── predict(original_text)      -> original prediction   │
//! │    ├── add_emphasis(original_text) -> transformed_text      │
//! │    ├── predict(transformed_text)   -> transformed pred.     │
//! │    ├── compare (trim + lowercase)  -> passed                │
//! │    └── CsvReporter::append(row)    (immediate, not batched) │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserHandle (PredictionSource)                           │
//! │    ├── generated Playwright script per submission           │
//! │    ├── fill input, click analyze, poll result selector      │
//! │    └── JSON result line parsed from driver stdout           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod browser;
pub mod cases;
pub mod error;
pub mod report;
pub mod runner;
pub mod transform;

pub use browser::{Browser, BrowserHandle, SutConfig};
pub use cases::TestCase;
pub use error::{MrError, MrResult};
pub use report::CsvReporter;
pub use runner::{CaseResult, MrRunner, PredictionSource, RunnerConfig, SuiteResult};
