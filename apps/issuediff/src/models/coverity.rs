//! Analyzer JSON schema: a list of issues, each with a tree of events.

use serde::Deserialize;

#[derive(Deserialize)]
/// Top-level analyzer document for one revision.
pub struct Document {
    #[serde(default)]
    pub issues: Vec<AnalyzerIssue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
/// One analyzer issue with its kind tags and event tree.
pub struct AnalyzerIssue {
    #[serde(default)]
    pub merge_key: String,
    #[serde(default)]
    pub checker_properties: Option<CheckerProperties>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl AnalyzerIssue {
    /// The last entry of `checkerProperties.issueKinds`, if any.
    pub fn last_kind(&self) -> Option<&str> {
        self.checker_properties
            .as_ref()
            .and_then(|p| p.issue_kinds.last())
            .map(String::as_str)
    }

    /// Depth-first search for the event flagged as main.
    pub fn main_event(&self) -> Option<&Event> {
        fn find(events: &[Event]) -> Option<&Event> {
            for ev in events {
                if ev.main {
                    return Some(ev);
                }
                if let Some(found) = find(&ev.events) {
                    return Some(found);
                }
            }
            None
        }
        find(&self.events)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerProperties {
    #[serde(default)]
    pub issue_kinds: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
/// An event node; children live in `events`.
pub struct Event {
    #[serde(default)]
    pub main: bool,
    pub file_pathname: String,
    pub line_number: u32,
    #[serde(default)]
    pub event_description: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_main_event_found_in_nested_tree() {
        let doc: Document = serde_json::from_value(json!({
            "issues": [{
                "mergeKey": "K1",
                "checkerProperties": {"issueKinds": ["QUALITY", "SECURITY"]},
                "events": [{
                    "filePathname": "mkfs/a.c",
                    "lineNumber": 1,
                    "eventDescription": "outer",
                    "events": [{
                        "main": true,
                        "filePathname": "mkfs/a.c",
                        "lineNumber": 7,
                        "eventDescription": "inner"
                    }]
                }]
            }]
        }))
        .unwrap();
        let issue = &doc.issues[0];
        assert_eq!(issue.last_kind(), Some("SECURITY"));
        assert_eq!(issue.main_event().map(|e| e.line_number), Some(7));
    }

    #[test]
    fn test_missing_required_event_field_is_rejected() {
        let res: Result<Document, _> = serde_json::from_value(json!({
            "issues": [{"events": [{"lineNumber": 3}]}]
        }));
        assert!(res.is_err());
    }
}
