//! Batch executor.
//!
//! Each input log is one job. Jobs run on the blocking pool since tracking
//! is synchronous CPU work, and a semaphore bounds how many run at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hoopshot_models::SessionId;
use hoopshot_tracker::ShotTrackerConfig;
use metrics::counter;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::SessionLogger;
use crate::replay::{replay_log, DetectionLog, ReplaySummary};

const JOBS_TOTAL: &str = "hoopshot_worker_jobs_total";

/// A finished job.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub replay: ReplaySummary,
}

/// A job that failed; other jobs are unaffected.
#[derive(Debug)]
pub struct JobFailure {
    pub input: PathBuf,
    pub error: WorkerError,
}

/// Outcome of a whole batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<JobSummary>,
    pub failed: Vec<JobFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs detection logs through independent tracking sessions.
pub struct BatchExecutor {
    config: WorkerConfig,
    tracker_config: Arc<ShotTrackerConfig>,
    job_semaphore: Arc<Semaphore>,
}

impl BatchExecutor {
    pub fn new(config: WorkerConfig, tracker_config: ShotTrackerConfig) -> Self {
        let job_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs.max(1)));
        Self {
            config,
            tracker_config: Arc::new(tracker_config),
            job_semaphore,
        }
    }

    /// Process every input, writing one result file per success.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> WorkerResult<BatchReport> {
        info!(
            "Starting batch of {} logs with {} max concurrent jobs",
            inputs.len(),
            self.config.max_concurrent_jobs
        );
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut handles = Vec::with_capacity(inputs.len());
        for input in inputs {
            let permit = self
                .job_semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| WorkerError::job_failed("Semaphore closed"))?;
            let tracker_config = Arc::clone(&self.tracker_config);
            let output_dir = self.config.output_dir.clone();
            let job_input = input.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                run_job(&job_input, &output_dir, &tracker_config)
            });
            handles.push((input, handle));
        }

        let mut report = BatchReport::default();
        for (input, handle) in handles {
            let outcome = handle
                .await
                .unwrap_or_else(|e| Err(WorkerError::job_failed(format!("job panicked: {}", e))));

            match outcome {
                Ok(summary) => {
                    counter!(JOBS_TOTAL, &[("status", "succeeded".to_string())]).increment(1);
                    report.succeeded.push(summary);
                }
                Err(error) => {
                    counter!(JOBS_TOTAL, &[("status", "failed".to_string())]).increment(1);
                    if error.is_input_error() {
                        warn!(input = %input.display(), "Rejected input: {}", error);
                    } else {
                        error!(input = %input.display(), "Job failed: {}", error);
                    }
                    report.failed.push(JobFailure { input, error });
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Batch finished"
        );
        Ok(report)
    }
}

/// `<output_dir>/<stem>.shots.json` for an input log.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "detections".to_string());
    output_dir.join(format!("{}.shots.json", stem))
}

/// Replay one log and write its result. Runs on a blocking thread.
fn run_job(input: &Path, output_dir: &Path, config: &ShotTrackerConfig) -> WorkerResult<JobSummary> {
    let source = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let session_id = SessionId::new();
    let logger = SessionLogger::new(&session_id, &source);
    let _span = logger.create_span().entered();

    let outcome = DetectionLog::open(input)
        .and_then(|log| replay_log(log, session_id, config, &logger))
        .and_then(|replay| {
            let output = output_path(input, output_dir);
            let json = serde_json::to_vec_pretty(&replay.result)?;
            std::fs::write(&output, json)?;
            Ok(JobSummary {
                input: input.to_path_buf(),
                output,
                replay,
            })
        });

    if let Err(e) = &outcome {
        logger.log_error(&e.to_string());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopshot_models::ShotDetectionResult;
    use std::fmt::Write as _;

    /// One made shot: hoop every frame, ball arc crossing the rim at x=490.
    fn make_shot_log() -> String {
        let arc = [
            (36, 330.0, 330.0),
            (38, 350.0, 290.0),
            (40, 370.0, 250.0),
            (42, 390.0, 215.0),
            (44, 410.0, 195.0),
            (46, 430.0, 195.0),
            (48, 450.0, 210.0),
            (50, 470.0, 235.0),
            (52, 510.0, 275.0),
            (54, 530.0, 320.0),
            (56, 550.0, 365.0),
            (58, 570.0, 410.0),
        ];
        let hoop = r#"{"class":"hoop","box":{"x1":450,"y1":255,"x2":550,"y2":345},"confidence":0.9}"#;

        let mut out = String::new();
        for frame in 0..=70u64 {
            let mut detections = vec![hoop.to_string()];
            if let Some(&(_, x, y)) = arc.iter().find(|(f, _, _)| *f == frame) {
                detections.push(format!(
                    r#"{{"class":"ball","box":{{"x1":{},"y1":{},"x2":{},"y2":{}}},"confidence":0.9}}"#,
                    x - 12.0,
                    y - 12.0,
                    x + 12.0,
                    y + 12.0
                ));
            }
            writeln!(out, r#"{{"frame_index":{},"detections":[{}]}}"#, frame, detections.join(","))
                .unwrap();
        }
        out
    }

    fn executor(output_dir: &Path, max_jobs: usize) -> BatchExecutor {
        let config = WorkerConfig {
            max_concurrent_jobs: max_jobs,
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        };
        BatchExecutor::new(config, ShotTrackerConfig::default())
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/logs/game-1.jsonl"), Path::new("/out")),
            PathBuf::from("/out/game-1.shots.json")
        );
    }

    #[tokio::test]
    async fn test_batch_writes_results() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();

        let make = input_dir.path().join("make.jsonl");
        std::fs::write(&make, make_shot_log()).unwrap();
        let empty = input_dir.path().join("empty.jsonl");
        std::fs::write(&empty, "").unwrap();

        let report = executor(output_dir.path(), 2)
            .run(vec![make, empty])
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.succeeded.len(), 2);

        let written = std::fs::read_to_string(output_dir.path().join("make.shots.json")).unwrap();
        let result: ShotDetectionResult = serde_json::from_str(&written).unwrap();
        assert_eq!(result.total_attempts, 1);
        assert_eq!(result.total_makes, 1);
        assert_eq!(result.shooting_percentage, 100.0);

        let written = std::fs::read_to_string(output_dir.path().join("empty.shots.json")).unwrap();
        let result: ShotDetectionResult = serde_json::from_str(&written).unwrap();
        assert_eq!(result, ShotDetectionResult::empty());
    }

    #[tokio::test]
    async fn test_bad_input_fails_only_its_job() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();

        let good = input_dir.path().join("good.jsonl");
        std::fs::write(&good, make_shot_log()).unwrap();
        let bad = input_dir.path().join("bad.jsonl");
        std::fs::write(&bad, "{\"frame_index\": 0}\n{oops\n").unwrap();
        let missing = input_dir.path().join("missing.jsonl");

        let report = executor(output_dir.path(), 1)
            .run(vec![bad.clone(), good, missing.clone()])
            .await
            .unwrap();

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.succeeded[0].replay.result.total_makes, 1);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].input, bad);
        assert!(matches!(report.failed[0].error, WorkerError::MalformedLine { line: 2, .. }));
        assert_eq!(report.failed[1].input, missing);
        assert!(matches!(report.failed[1].error, WorkerError::Io(_)));
        assert!(!output_dir.path().join("bad.shots.json").exists());
    }

    #[test]
    fn test_identical_logs_give_identical_results() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let a = input_dir.path().join("a.jsonl");
        let b = input_dir.path().join("b.jsonl");
        std::fs::write(&a, make_shot_log()).unwrap();
        std::fs::write(&b, make_shot_log()).unwrap();

        let exec = executor(output_dir.path(), 2);
        let report = tokio_test::block_on(exec.run(vec![a, b])).unwrap();

        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(
            report.succeeded[0].replay.result,
            report.succeeded[1].replay.result
        );
    }
}
