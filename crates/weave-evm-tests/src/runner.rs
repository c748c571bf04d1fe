//! Directory walker and aggregate statistics

use crate::error::{TestError, TestResult};
use crate::vm_test::{VmTestResults, VmTestRunner};
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use weave_evm::ChainSpec;

/// Totals over every fixture file visited
#[derive(Debug, Default)]
pub struct TestStats {
    /// Cases executed
    pub total: usize,
    /// Cases passed
    pub passed: usize,
    /// Cases failed
    pub failed: usize,
    /// Files that could not be loaded
    pub skipped: usize,
    /// Wall time
    pub duration: Duration,
    /// Failed case names with reasons
    pub failures: Vec<(String, String)>,
}

impl TestStats {
    /// Empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in one file's results
    pub fn add_results(&mut self, results: &VmTestResults) {
        self.total += results.total();
        self.passed += results.passed.len();
        self.failed += results.failed.len();
        self.failures.extend(
            results
                .failed
                .iter()
                .map(|(name, reason)| (format!("{}::{}", results.file, name), reason.clone())),
        );
    }

    /// Pass rate as a percentage of executed cases
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.passed as f64 / self.total as f64) * 100.0
    }
}

impl fmt::Display for TestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total:     {}", self.total)?;
        writeln!(f, "Passed:    {}", self.passed)?;
        writeln!(f, "Failed:    {}", self.failed)?;
        writeln!(f, "Skipped:   {}", self.skipped)?;
        writeln!(f, "Pass Rate: {:.2}%", self.pass_rate())?;
        write!(f, "Duration:  {:.2}s", self.duration.as_secs_f64())?;
        for (name, reason) in &self.failures {
            write!(f, "\n  - {name}: {reason}")?;
        }
        Ok(())
    }
}

/// Runs every `*.json` fixture under a directory tree
pub struct TestRunner {
    vm_runner: VmTestRunner,
    verbose: bool,
}

impl TestRunner {
    /// Create a runner for the named fork preset
    pub fn new(fork: &str, verbose: bool) -> TestResult<Self> {
        let spec =
            ChainSpec::by_name(fork).ok_or_else(|| TestError::UnsupportedFork(fork.to_string()))?;
        Ok(Self {
            vm_runner: VmTestRunner::new(spec, verbose),
            verbose,
        })
    }

    /// Run all fixtures below `dir`; a missing directory yields empty statistics
    pub fn run_vm_tests(&self, dir: &Path) -> TestResult<TestStats> {
        let mut stats = TestStats::new();
        let start = Instant::now();
        if self.verbose {
            tracing::info!(dir = %dir.display(), "running VM tests");
        }
        self.walk(dir, &mut stats)?;
        stats.duration = start.elapsed();
        Ok(stats)
    }

    fn walk(&self, dir: &Path, stats: &mut TestStats) -> TestResult<()> {
        if !dir.exists() {
            tracing::debug!(dir = %dir.display(), "fixture directory not found");
            return Ok(());
        }

        let mut entries = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                self.walk(&path, stats)?;
            } else if path.extension().is_some_and(|e| e == "json") {
                match self.vm_runner.run_file(&path) {
                    Ok(results) => {
                        if self.verbose && !results.failed.is_empty() {
                            tracing::warn!(
                                file = %path.display(),
                                passed = results.passed.len(),
                                failed = results.failed.len(),
                                "fixture file has failures"
                            );
                        }
                        stats.add_results(&results);
                    }
                    Err(error) => {
                        tracing::warn!(file = %path.display(), %error, "skipping fixture file");
                        stats.skipped += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_pass_rate() {
        let stats = TestStats {
            total: 100,
            passed: 90,
            failed: 10,
            ..Default::default()
        };
        assert!((stats.pass_rate() - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(TestStats::new().pass_rate(), 100.0);
    }

    #[test]
    fn test_add_results_prefixes_file() {
        let mut results = VmTestResults::new("arith.json".to_string());
        results.passed.push("add0".to_string());
        results.failed.push(("add1".to_string(), "gas".to_string()));

        let mut stats = TestStats::new();
        stats.add_results(&results);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.failures[0].0, "arith.json::add1");
        assert!(stats.to_string().contains("arith.json::add1: gas"));
    }

    #[test]
    fn test_unknown_fork() {
        assert!(matches!(
            TestRunner::new("london", false),
            Err(TestError::UnsupportedFork(_))
        ));
    }
}
