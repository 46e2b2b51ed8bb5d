//! Fixed catalog of task descriptions used by the harness probes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rough effort class of a sample task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleTask {
    pub name: &'static str,
    pub description: &'static str,
    pub complexity: Complexity,
}

pub static SAMPLE_TASKS: [SampleTask; 5] = [
    SampleTask {
        name: "simple_bug_fix",
        description:
            "Fix a simple bug in a React component that shows an error when clicking a button",
        complexity: Complexity::Low,
    },
    SampleTask {
        name: "api_integration",
        description:
            "Integrate a REST API into a Node.js application to fetch and display user data",
        complexity: Complexity::Medium,
    },
    SampleTask {
        name: "code_refactor",
        description: "Refactor a large codebase to remove duplicate code and improve performance",
        complexity: Complexity::High,
    },
    SampleTask {
        name: "database_migration",
        description: "Create a migration script to move data from MongoDB to PostgreSQL",
        complexity: Complexity::High,
    },
    SampleTask {
        name: "security_vulnerability",
        description: "Fix an SQL injection vulnerability in a user input handling function",
        complexity: Complexity::Medium,
    },
];

/// Task used when a consistency run is started without a description.
pub const CONSISTENCY_TASK: &str =
    "Create a function that converts temperatures from Celsius to Fahrenheit";

/// Task whose status is re-read concurrently by the status integrity check.
pub const INTEGRITY_TASK: &str = "Create a function to calculate prime numbers";

const OVERSIZED_INPUT_LEN: usize = 10_000;

/// Malformed or hostile descriptions the service must reject or accept
/// without a server error, labelled for reports.
pub fn malformed_inputs() -> Vec<(&'static str, String)> {
    vec![
        ("empty", String::new()),
        ("whitespace", "   ".to_string()),
        ("oversized", "a".repeat(OVERSIZED_INPUT_LEN)),
        ("broken_json", r#"{"malformed": "json" "#.to_string()),
        ("script_tag", r#"<script>alert("XSS")</script>"#.to_string()),
    ]
}

/// `count` descriptions cycling through [`SAMPLE_TASKS`].
pub fn cycled_descriptions(count: usize) -> Vec<&'static str> {
    SAMPLE_TASKS
        .iter()
        .cycle()
        .take(count)
        .map(|task| task.description)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycled_descriptions_wraps_around() {
        let descriptions = cycled_descriptions(7);
        assert_eq!(descriptions.len(), 7);
        assert_eq!(descriptions[0], SAMPLE_TASKS[0].description);
        assert_eq!(descriptions[5], SAMPLE_TASKS[0].description);
        assert_eq!(descriptions[6], SAMPLE_TASKS[1].description);
    }

    #[test]
    fn test_malformed_inputs() {
        let inputs = malformed_inputs();
        assert_eq!(inputs.len(), 5);
        assert!(inputs[0].1.is_empty());
        assert!(inputs[1].1.trim().is_empty());
        assert_eq!(inputs[2].1.chars().count(), 10_000);
        assert!(serde_json::from_str::<serde_json::Value>(&inputs[3].1).is_err());
    }

    #[test]
    fn test_cycled_descriptions_empty() {
        assert!(cycled_descriptions(0).is_empty());
    }
}
