//! MR1 test runner
//!
//! Drives the per-case submission cycle: predict the original sentence,
//! transform it, predict again, compare after normalization, report the row
//! immediately. Execution errors are isolated per case unless the caller
//! asks for the whole run to abort.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::cases::TestCase;
use crate::error::MrResult;
use crate::report::CsvReporter;
use crate::transform::{add_emphasis, DEFAULT_EMPHASIS};

/// Source of sentiment predictions. The browser implements this; tests
/// substitute a scripted source.
#[async_trait::async_trait]
pub trait PredictionSource: Send + Sync {
    async fn predict(&self, text: &str) -> MrResult<String>;
}

/// Outcome of one test case. Created once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub id: u32,
    pub original_text: String,
    pub transformed_text: String,
    pub original_prediction: Option<String>,
    pub transformed_prediction: Option<String>,
    pub passed: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
}

/// Run-level summary over all case results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl SuiteResult {
    /// True when every case passed the MR check and none errored.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    /// Write the full suite result as pretty JSON.
    pub fn write_json(&self, path: &Path) -> MrResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Emphasis token inserted by the MR1 transformation
    pub emphasis_word: String,

    /// Pause between cases so the SUT is not hammered
    pub pause_between: Duration,

    /// Abort the whole run on the first per-case execution error
    pub abort_on_error: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            emphasis_word: DEFAULT_EMPHASIS.to_string(),
            pause_between: Duration::from_millis(800),
            abort_on_error: false,
        }
    }
}

/// Prediction labels are compared after trimming and lowercasing.
pub fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

pub struct MrRunner<S: PredictionSource> {
    source: S,
    config: RunnerConfig,
}

impl<S: PredictionSource> MrRunner<S> {
    pub fn new(source: S, config: RunnerConfig) -> Self {
        Self { source, config }
    }

    /// Run all cases in order. Each case appends one CSV row the moment its
    /// outcome is known, so partial runs still leave partial reports.
    pub async fn run(
        &self,
        cases: &[TestCase],
        mut reporter: Option<&mut CsvReporter>,
    ) -> MrResult<SuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(cases.len());
        let mut passed = 0;
        let mut failed = 0;
        let mut errored = 0;

        info!("Running {} MR1 case(s)...", cases.len());

        for (i, case) in cases.iter().enumerate() {
            info!("Case {}: {:?}", case.id, case.text);

            let result = match self.run_case(case).await {
                Ok(result) => {
                    if result.passed {
                        info!(
                            "✓ case {} consistent: {:?} ({} ms)",
                            case.id,
                            result.original_prediction.as_deref().unwrap_or(""),
                            result.duration_ms
                        );
                        passed += 1;
                    } else {
                        warn!(
                            "✗ case {} MR violation: {:?} -> {:?}",
                            case.id,
                            result.original_prediction.as_deref().unwrap_or(""),
                            result.transformed_prediction.as_deref().unwrap_or("")
                        );
                        failed += 1;
                    }
                    result
                }
                Err(e) => {
                    if self.config.abort_on_error {
                        error!("✗ case {} failed, aborting run: {}", case.id, e);
                        return Err(e);
                    }
                    error!("✗ case {} failed: {}", case.id, e);
                    errored += 1;
                    CaseResult {
                        id: case.id,
                        original_text: case.text.clone(),
                        transformed_text: add_emphasis(&case.text, &self.config.emphasis_word),
                        original_prediction: None,
                        transformed_prediction: None,
                        passed: false,
                        error: Some(e.to_string()),
                        duration_ms: 0,
                    }
                }
            };

            if let Some(r) = reporter.as_deref_mut() {
                r.append(&result)?;
            }
            results.push(result);

            if i + 1 < cases.len() && !self.config.pause_between.is_zero() {
                tokio::time::sleep(self.config.pause_between).await;
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "MR1 results: {} passed, {} failed, {} errored ({} ms)",
            passed, failed, errored, duration_ms
        );

        Ok(SuiteResult {
            total: cases.len(),
            passed,
            failed,
            errored,
            started_at,
            duration_ms,
            results,
        })
    }

    async fn run_case(&self, case: &TestCase) -> MrResult<CaseResult> {
        let start = Instant::now();
        let transformed_text = add_emphasis(&case.text, &self.config.emphasis_word);

        let original = self.source.predict(&case.text).await?;
        let transformed = self.source.predict(&transformed_text).await?;
        let passed = normalize(&original) == normalize(&transformed);

        Ok(CaseResult {
            id: case.id,
            original_text: case.text.clone(),
            transformed_text,
            original_prediction: Some(original),
            transformed_prediction: Some(transformed),
            passed,
            error: None,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MrError;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed sequence of prediction outcomes.
    struct ScriptedSource {
        responses: Mutex<VecDeque<MrResult<String>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<MrResult<String>>) -> Self {
            Self { responses: Mutex::new(responses.into_iter().collect()) }
        }
    }

    #[async_trait::async_trait]
    impl PredictionSource for ScriptedSource {
        async fn predict(&self, _text: &str) -> MrResult<String> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(MrError::Script("scripted responses exhausted".into())))
        }
    }

    fn fast_config() -> RunnerConfig {
        RunnerConfig { pause_between: Duration::ZERO, ..RunnerConfig::default() }
    }

    #[tokio::test]
    async fn consistent_labels_pass_after_normalization() {
        let source = ScriptedSource::new(vec![
            Ok("Positive".to_string()),
            Ok("  positive ".to_string()),
        ]);
        let runner = MrRunner::new(source, fast_config());
        let cases = vec![TestCase::new(1, "I love this movie")];

        let suite = runner.run(&cases, None).await.unwrap();
        assert_eq!(suite.total, 1);
        assert_eq!(suite.passed, 1);
        assert!(suite.all_passed());
        let r = &suite.results[0];
        assert!(r.passed);
        assert_eq!(r.transformed_text, "I really love this movie");
        assert_eq!(r.original_prediction.as_deref(), Some("Positive"));
    }

    #[tokio::test]
    async fn label_flip_is_recorded_not_escalated() {
        let source = ScriptedSource::new(vec![
            Ok("Neutral".to_string()),
            Ok("Negative".to_string()),
        ]);
        let runner = MrRunner::new(source, fast_config());
        let cases = vec![TestCase::new(1, "This movie is okay")];

        let suite = runner.run(&cases, None).await.unwrap();
        assert_eq!(suite.failed, 1);
        assert_eq!(suite.errored, 0);
        let r = &suite.results[0];
        assert!(!r.passed);
        assert!(r.error.is_none());
        assert_eq!(r.original_prediction.as_deref(), Some("Neutral"));
        assert_eq!(r.transformed_prediction.as_deref(), Some("Negative"));
    }

    #[tokio::test]
    async fn execution_error_is_isolated_per_case() {
        let source = ScriptedSource::new(vec![
            Err(MrError::Timeout("prediction element stayed empty".into())),
            Ok("Positive".to_string()),
            Ok("Positive".to_string()),
        ]);
        let runner = MrRunner::new(source, fast_config());
        let cases = vec![
            TestCase::new(1, "Never answers"),
            TestCase::new(2, "I love this movie"),
        ];

        let suite = runner.run(&cases, None).await.unwrap();
        assert_eq!(suite.total, 2);
        assert_eq!(suite.errored, 1);
        assert_eq!(suite.passed, 1);

        let first = &suite.results[0];
        assert!(!first.passed);
        assert!(first.original_prediction.is_none());
        assert!(first.transformed_prediction.is_none());
        assert!(first.error.as_deref().unwrap().contains("Timeout"));

        assert!(suite.results[1].passed);
    }

    #[tokio::test]
    async fn abort_on_error_stops_the_run() {
        let source = ScriptedSource::new(vec![Err(MrError::Script("boom".into()))]);
        let config = RunnerConfig { abort_on_error: true, ..fast_config() };
        let runner = MrRunner::new(source, config);
        let cases = vec![TestCase::new(1, "x y"), TestCase::new(2, "a b")];

        assert!(runner.run(&cases, None).await.is_err());
    }

    #[tokio::test]
    async fn one_result_per_case_in_input_order() {
        let source = ScriptedSource::new(vec![
            Ok("Positive".to_string()),
            Ok("Positive".to_string()),
            Ok("Negative".to_string()),
            Ok("Negative".to_string()),
            Ok("Neutral".to_string()),
            Ok("Positive".to_string()),
        ]);
        let runner = MrRunner::new(source, fast_config());
        let cases = vec![
            TestCase::new(1, "first one"),
            TestCase::new(2, "second one"),
            TestCase::new(3, "third one"),
        ];

        let suite = runner.run(&cases, None).await.unwrap();
        let ids: Vec<u32> = suite.results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(suite.passed, 2);
        assert_eq!(suite.failed, 1);
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Positive\n"), "positive");
        assert_eq!(normalize("NEGATIVE"), "negative");
    }
}
