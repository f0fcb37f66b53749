//! Prompt construction

use std::fmt::Write;
use surge_core::Report;

pub(crate) const SYSTEM_PROMPT: &str = "You are an expert in HTTP load testing and web performance. \
Analyze the provided load test report. Explain throughput, error rate and stability in plain terms, \
point out anything that suggests the target was saturated or failing, and suggest a next test to run. \
Highlight numbers using inline code blocks and key points in bold. Keep it short. Format as Markdown.";

/// Render a report (and the user's question, if any) as the user prompt
pub fn build_prompt(report: &Report, question: Option<&str>) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Load test report");
    let _ = writeln!(prompt, "- Target: {} {}", report.method, report.url);
    let _ = writeln!(
        prompt,
        "- Concurrency: {} requests per second, configured for {}s",
        report.concurrency, report.duration
    );
    let _ = writeln!(
        prompt,
        "- Actual duration: {:.2}s (ended: {})",
        report.test_duration_seconds, report.stop_reason
    );
    let _ = writeln!(
        prompt,
        "- Requests: {} total, {} succeeded, {} failed",
        report.total_requests, report.successful_requests, report.failed_requests
    );
    let _ = writeln!(prompt, "- Success rate: {:.2}%", report.success_percent());
    let _ = writeln!(prompt, "- Average RPS: {:.2}", report.average_rps);

    if !report.history.is_empty() {
        let series: Vec<String> = report
            .history
            .iter()
            .map(|s| format!("{}s={}", s.elapsed_seconds, s.requests_per_second))
            .collect();
        let _ = writeln!(prompt, "- RPS per second: {}", series.join(", "));
    }

    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(question) => {
            let _ = write!(prompt, "\nQuestion: {}", question);
        }
        None => {
            let _ = write!(prompt, "\nSummarize how the target held up under this load.");
        }
    }

    prompt
}
