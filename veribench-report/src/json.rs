//! JSON Output

use crate::report::Report;

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CaseReport, ReportMeta, ReportSummary};
    use veribench_logic::CaseStatus;

    #[test]
    fn test_report_round_trips_through_json() {
        let report = Report {
            meta: ReportMeta::collect(),
            cases: vec![CaseReport {
                id: "minify/twitter".to_string(),
                group: "minify".to_string(),
                status: CaseStatus::Skipped,
                bytes: 1024,
                items: 0,
                iterations: 0,
                hardware_events: false,
                metrics: Vec::new(),
                label: None,
                failure: Some("reference document reading failed".to_string()),
            }],
            summary: ReportSummary {
                total_cases: 1,
                skipped: 1,
                ..Default::default()
            },
        };

        let json = generate_json_report(&report).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cases.len(), 1);
        assert_eq!(parsed.cases[0].status, CaseStatus::Skipped);
        assert_eq!(
            parsed.cases[0].failure.as_deref(),
            Some("reference document reading failed")
        );
    }
}
