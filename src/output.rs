//! Output formatters for compliance runs

use crate::report::{ComplianceReport, Reporter, RuleReport, RuleStatus};
use crate::rules::Rule;
use colored::*;
use std::io::{self, Write};

const SEPARATOR_WIDTH: usize = 50;

/// Opening banner and separator
pub fn format_banner() -> String {
    format!(
        "{}\n{}\n",
        "🚀 Starting consensus compliance validation".bold(),
        "=".repeat(SEPARATOR_WIDTH)
    )
}

pub fn format_rule_started(rule: &Rule) -> String {
    format!("🔍 Validating {}...\n", rule.name)
}

/// Status line for a finished rule, followed by a blank line
pub fn format_rule_finished(report: &RuleReport) -> String {
    let line = match &report.status {
        RuleStatus::Pass { message } => format!("✅ {}", message).green(),
        RuleStatus::Fail { message, .. } => format!("❌ {}", message).red(),
        RuleStatus::Error { message } => {
            format!("❌ Validation failed with error: {}", message)
                .red()
                .bold()
        }
    };
    format!("{}\n\n", line)
}

/// Tally line, percentage and verdict
pub fn format_summary(report: &ComplianceReport) -> String {
    let mut output = String::new();
    output.push_str(&"=".repeat(SEPARATOR_WIDTH));
    output.push('\n');
    output.push_str(&format!(
        "📊 Compliance Results: {}/{} validations passed\n",
        report.passed, report.total
    ));
    output.push_str(&format!("📈 Compliance: {:.1}%\n", report.percentage));

    if report.is_compliant() {
        output.push_str(&format!(
            "{}\n",
            "🎉 FULL COMPLIANCE ACHIEVED! 🎉".green().bold()
        ));
        output.push_str("All consensus structures meet their requirements.\n");
    } else {
        output.push_str(&format!(
            "{}\n",
            "Some validations failed. Please review the output above.".yellow()
        ));
    }
    output
}

/// Streams progress to a writer as rules run.
///
/// The first write error is kept and returned by [`TextReporter::summary`];
/// later output is dropped.
pub struct TextReporter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self) -> io::Result<()> {
        self.out.write_all(format_banner().as_bytes())
    }

    /// Write the summary, or report the first failed progress write
    pub fn summary(&mut self, report: &ComplianceReport) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.write_all(format_summary(report).as_bytes())?;
        self.out.flush()
    }

    fn emit(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            self.error = Some(e);
        }
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn rule_started(&mut self, rule: &Rule) {
        self.emit(&format_rule_started(rule));
    }

    fn rule_finished(&mut self, report: &RuleReport) {
        self.emit(&format_rule_finished(report));
    }
}

/// Print the whole report as pretty JSON
pub fn write_json<W: Write>(mut out: W, report: &ComplianceReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)
}

/// One line per rule: id, subject and description
pub fn write_rule_list<W: Write>(mut out: W, rules: &[Rule]) -> io::Result<()> {
    for rule in rules {
        writeln!(out, "{:<14} {:<24} {}", rule.id, rule.name, rule.description)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{default_rules, Failure};
    use pretty_assertions::assert_eq;

    fn render(report: &ComplianceReport) -> String {
        colored::control::set_override(false);
        let mut reporter = TextReporter::new(Vec::new());
        for result in &report.results {
            reporter.rule_finished(result);
        }
        reporter.summary(report).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn pass(id: &'static str) -> RuleReport {
        RuleReport {
            id,
            name: id,
            status: RuleStatus::Pass {
                message: format!("{} is compliant", id),
            },
        }
    }

    #[test]
    fn test_full_compliance_output() {
        let report = ComplianceReport::from_results(vec![pass("Block"), pass("TxInput")]);
        let text = render(&report);
        assert_eq!(
            text,
            "✅ Block is compliant\n\n✅ TxInput is compliant\n\n\
             ==================================================\n\
             📊 Compliance Results: 2/2 validations passed\n\
             📈 Compliance: 100.0%\n\
             🎉 FULL COMPLIANCE ACHIEVED! 🎉\n\
             All consensus structures meet their requirements.\n"
        );
    }

    #[test]
    fn test_partial_compliance_output() {
        let failure = Failure::MissingArtifact {
            path: "docs/p2p/README.md".to_string(),
        };
        let report = ComplianceReport::from_results(vec![
            pass("Block"),
            pass("TxInput"),
            RuleReport {
                id: "documentation",
                name: "documentation",
                status: RuleStatus::Fail {
                    message: failure.to_string(),
                    failure,
                },
            },
        ]);
        let text = render(&report);
        assert!(text.contains("❌ Could not find docs/p2p/README.md"));
        assert!(text.contains("📊 Compliance Results: 2/3 validations passed"));
        assert!(text.contains("📈 Compliance: 66.7%"));
        assert!(!text.contains("FULL COMPLIANCE"));
    }

    #[test]
    fn test_error_line() {
        let report = ComplianceReport::from_results(vec![RuleReport {
            id: "x",
            name: "x",
            status: RuleStatus::Error {
                message: "rule panicked: boom".to_string(),
            },
        }]);
        assert!(render(&report).contains("❌ Validation failed with error: rule panicked: boom"));
    }

    #[test]
    fn test_progress_line() {
        colored::control::set_override(false);
        let mut reporter = TextReporter::new(Vec::new());
        reporter.rule_started(&default_rules()[0]);
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(text, "🔍 Validating BlockHeader structure...\n");
    }

    /// Accepts `budget` bytes, then fails every write
    struct ClosedPipe {
        budget: usize,
    }

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = buf.len().min(self.budget);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_surfaces_in_summary() {
        let report = ComplianceReport::from_results(vec![pass("Block")]);
        let mut reporter = TextReporter::new(ClosedPipe { budget: 4 });
        reporter.rule_started(&default_rules()[0]);
        reporter.rule_finished(&report.results[0]);

        let err = reporter.summary(&report).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_banner_write_error() {
        let mut reporter = TextReporter::new(ClosedPipe { budget: 0 });
        assert!(reporter.banner().is_err());
    }

    #[test]
    fn test_empty_run_summary_is_not_celebrated() {
        colored::control::set_override(false);
        let summary = format_summary(&ComplianceReport::from_results(Vec::new()));
        assert!(summary.contains("📊 Compliance Results: 0/0 validations passed"));
        assert!(summary.contains("📈 Compliance: 0.0%"));
        assert!(!summary.contains("FULL COMPLIANCE"));
    }

    #[test]
    fn test_json_output() {
        let report = ComplianceReport::from_results(vec![pass("Block")]);
        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["percentage"], 100.0);
        assert_eq!(value["total"], 1);
    }

    #[test]
    fn test_rule_list() {
        let mut buf = Vec::new();
        write_rule_list(&mut buf, &default_rules()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 8);
        assert!(text.lines().next().unwrap().starts_with("block-header"));
    }
}
