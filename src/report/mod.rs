//! Failure report rendering
//!
//! Reports are rendered with minijinja into plain text: one block per
//! PipelineRun, a nested block per task run and a nested block per failing step
//! holding the raw container log between separator lines.

use minijinja::{context, Environment, UndefinedBehavior};

use crate::model::FailureReport;
use crate::Result;

const FAILURE_REPORT: &str = "failure_report.txt";

/// Renders failure reports as text
pub struct ReportRenderer {
    env: Environment<'static>,
}

impl ReportRenderer {
    /// Create a renderer with the built-in report template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_template(FAILURE_REPORT, include_str!("templates/failure_report.txt"))?;
        Ok(Self { env })
    }

    /// Render `reports` in order; no reports renders as an empty string
    pub fn render(&self, reports: &[FailureReport]) -> Result<String> {
        let template = self.env.get_template(FAILURE_REPORT)?;
        Ok(template.render(context! { reports => reports })?)
    }
}

/// Render failure reports with the built-in template
pub fn render_reports(reports: &[FailureReport]) -> Result<String> {
    ReportRenderer::new()?.render(reports)
}
