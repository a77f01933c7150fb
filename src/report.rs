//! Report aggregator - runs every rule in isolation and tallies the results

use crate::rules::{Failure, Rule, RuleContext, RuleError, RuleOutcome};
use log::{debug, warn};
use serde::Serialize;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// How a single rule ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RuleStatus {
    Pass { message: String },
    Fail { message: String, failure: Failure },
    /// The rule raised an unexpected fault
    Error { message: String },
}

impl RuleStatus {
    pub fn message(&self) -> &str {
        match self {
            RuleStatus::Pass { message }
            | RuleStatus::Fail { message, .. }
            | RuleStatus::Error { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleReport {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(flatten)]
    pub status: RuleStatus,
}

impl RuleReport {
    pub fn passed(&self) -> bool {
        matches!(self.status, RuleStatus::Pass { .. })
    }
}

/// Aggregate outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    pub passed: usize,
    pub total: usize,
    /// `passed / total` as a percentage, rounded to one decimal place
    pub percentage: f64,
    pub compliant: bool,
    pub results: Vec<RuleReport>,
}

impl ComplianceReport {
    pub fn from_results(results: Vec<RuleReport>) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        let total = results.len();
        Self {
            passed,
            total,
            percentage: percentage(passed, total),
            compliant: total > 0 && passed == total,
            results,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.compliant
    }

    /// Process exit status: 0 only when every rule passed
    pub fn exit_code(&self) -> u8 {
        if self.compliant {
            0
        } else {
            1
        }
    }
}

/// `round(100 * passed / total, 1)`; an empty run scores 0.0
pub fn percentage(passed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (passed as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Progress callbacks invoked around each rule
pub trait Reporter {
    fn rule_started(&mut self, _rule: &Rule) {}
    fn rule_finished(&mut self, _report: &RuleReport) {}
}

/// Reporter that prints nothing
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Run `rules` in order. A failing, erroring or panicking rule never stops
/// the remaining rules.
pub fn run_rules(
    rules: &[Rule],
    ctx: &RuleContext,
    reporter: &mut dyn Reporter,
) -> ComplianceReport {
    let mut results = Vec::with_capacity(rules.len());

    for rule in rules {
        reporter.rule_started(rule);
        let report = RuleReport {
            id: rule.id,
            name: rule.name,
            status: run_isolated(rule, ctx),
        };
        debug!("rule {} -> {}", rule.id, report.status.message());
        reporter.rule_finished(&report);
        results.push(report);
    }

    ComplianceReport::from_results(results)
}

fn run_isolated(rule: &Rule, ctx: &RuleContext) -> RuleStatus {
    let result = catch_unwind(AssertUnwindSafe(|| rule.run(ctx)))
        .unwrap_or_else(|payload| Err(RuleError::Panicked(panic_message(payload.as_ref()))));

    match result {
        Ok(RuleOutcome::Pass(message)) => RuleStatus::Pass { message },
        Ok(RuleOutcome::Fail(failure)) => RuleStatus::Fail {
            message: failure.to_string(),
            failure,
        },
        Err(e) => {
            warn!("rule {} failed unexpectedly: {}", rule.id, e);
            RuleStatus::Error {
                message: e.to_string(),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
