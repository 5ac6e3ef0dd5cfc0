use action_flow::{BatchReport, BatchStatus};
use anyhow::Result;
use clap::ValueEnum;
use queue_extractor::WorkItem;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Serialize `value` for the machine-readable formats
    pub fn render<T: Serialize>(&self, value: &T) -> Result<Option<String>> {
        Ok(match self {
            OutputFormat::Human => None,
            OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Some(to_yaml(value)?),
        })
    }
}

/// YAML with enums written as single-key maps, the form the config loader reads back
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_yaml::Serializer::new(&mut buf);
    serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)?;
    Ok(String::from_utf8(buf)?)
}

pub fn format_report(report: &BatchReport) -> String {
    let result = &report.result;
    let mut out = format!(
        "Batch finished: {}\n  succeeded: {}\n  failed:    {}\n  total:     {}\n  attempts:  {}\n  duration:  {}s\n",
        report.status,
        result.succeeded,
        result.failed,
        result.total(),
        result.attempts,
        report.duration().num_seconds()
    );
    if result.failed > 0 {
        out.push_str("Some evaluations failed; check these manually in the portal.\n");
    }
    if report.status == BatchStatus::AttemptsExhausted {
        out.push_str("The attempt limit was reached; rerun to continue.\n");
    }
    out
}

pub fn format_queue(items: &[WorkItem]) -> String {
    if items.is_empty() {
        return "No pending evaluations.\n".to_string();
    }
    let mut out = format!("{} pending evaluation(s):\n", items.len());
    for item in items {
        out.push_str(&format!("  {}\n", item));
    }
    out
}

pub fn print_report(report: &BatchReport, format: OutputFormat) -> Result<()> {
    match format.render(report)? {
        Some(text) => println!("{}", text),
        None => print!("{}", format_report(report)),
    }
    Ok(())
}

pub fn print_queue(items: &[WorkItem], format: OutputFormat) -> Result<()> {
    match format.render(&items)? {
        Some(text) => println!("{}", text),
        None => print!("{}", format_queue(items)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_flow::BatchResult;
    use chrono::Utc;
    use action_primitives::Query;
    use queue_extractor::ActionHandle;
    use uuid::Uuid;

    fn report(failed: u32, status: BatchStatus) -> BatchReport {
        let now = Utc::now();
        BatchReport {
            run_id: Uuid::new_v4(),
            result: BatchResult {
                succeeded: 2,
                failed,
                attempts: 2 + failed,
            },
            status,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn summary_lists_counts() {
        let text = format_report(&report(0, BatchStatus::Drained));
        assert!(text.starts_with("Batch finished: drained"));
        assert!(text.contains("succeeded: 2"));
        assert!(text.contains("total:     2"));
        assert!(!text.contains("manually"));
    }

    #[test]
    fn failures_add_hint() {
        let text = format_report(&report(1, BatchStatus::AttemptsExhausted));
        assert!(text.contains("check these manually"));
        assert!(text.contains("attempt limit"));
    }

    #[test]
    fn queue_listing() {
        assert_eq!(format_queue(&[]), "No pending evaluations.\n");
        let item = WorkItem {
            sequence_label: "1".into(),
            group_label: "Computing".into(),
            subject_name: "Algorithms".into(),
            counterparty_name: "Dr. X".into(),
            weight: "2.50".into(),
            period: "02-09".into(),
            action: ActionHandle::empty(),
        };
        let text = format_queue(&[item.clone()]);
        assert!(text.starts_with("1 pending evaluation(s):"));
        assert!(text.contains("[1] Algorithms - Dr. X"));

        let json = OutputFormat::Json.render(&vec![item]).unwrap().unwrap();
        assert!(json.contains("\"subject_name\": \"Algorithms\""));
        assert!(!json.contains("action"));
    }

    #[test]
    fn yaml_writes_queries_as_maps() {
        let queries = vec![Query::css("#sheetTable"), Query::xpath("//table")];
        let yaml = to_yaml(&queries).unwrap();
        assert!(yaml.contains("- css: "));
        assert!(yaml.contains("#sheetTable"));
        assert!(yaml.contains("- xpath: "));
        assert!(!yaml.contains('!'));
    }
}
