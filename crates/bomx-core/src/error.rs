use std::fmt;
use std::io;

/// Machine-readable error codes for scripts and pipelines that wrap `bomx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    MalformedEdgeTable,
    MalformedItemTable,
    ItemNotFound,
    CycleDetected,
    UnresolvableCycle,
    TableReadFailed,
    TableWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::MalformedEdgeTable => "E2001",
            Self::MalformedItemTable => "E2002",
            Self::ItemNotFound => "E2003",
            Self::CycleDetected => "E3001",
            Self::UnresolvableCycle => "E3002",
            Self::TableReadFailed => "E5001",
            Self::TableWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::MalformedEdgeTable => "Edge table is missing required columns",
            Self::MalformedItemTable => "Item master is missing required columns",
            Self::ItemNotFound => "Item not found",
            Self::CycleDetected => "BOM graph contains cycles",
            Self::UnresolvableCycle => "Cycle removal left the graph cyclic",
            Self::TableReadFailed => "Failed to read input table",
            Self::TableWriteFailed => "Failed to write output table",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint surfaced next to the error.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .bomx/config.toml and retry."),
            Self::MalformedEdgeTable => {
                Some("Check the [columns] section of the config against the edge table header.")
            }
            Self::MalformedItemTable => {
                Some("Check the [items] section of the config against the item master header.")
            }
            Self::ItemNotFound => Some("Verify the item number exists in the item master."),
            Self::CycleDetected => {
                Some("Fix the listed BOM lines, or drop --strict to sever the weakest edge per cycle.")
            }
            Self::UnresolvableCycle => {
                Some("Raise or remove cycles.max_passes. Without a cap, report a bug with the edge table.")
            }
            Self::TableReadFailed => Some("Ensure the file exists and contains JSON Lines rows."),
            Self::TableWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by the BOM explosion pipeline.
///
/// Every variant is fatal for the batch: a run that hits one of these
/// produces no partial explosion rows.
#[derive(Debug, thiserror::Error)]
pub enum BomError {
    /// Required columns are absent from the edge table.
    #[error("edge table is missing required column(s): {}{}", .missing.join(", "), line_suffix(.line.as_ref()))]
    MalformedEdge {
        missing: Vec<String>,
        /// 1-based line of the offending row, `None` when the header itself lacks the column.
        line: Option<usize>,
    },

    /// Required columns are absent from the item master.
    #[error("item master is missing required column(s): {}{}", .missing.join(", "), line_suffix(.line.as_ref()))]
    MalformedItems {
        missing: Vec<String>,
        line: Option<usize>,
    },

    /// Cycles were found and cycle tolerance is disabled.
    #[error("detected {} BOM cycle(s): {}", .cycles.len(), format_cycles(.cycles))]
    CyclicGraph { cycles: Vec<Vec<String>> },

    /// Cycle removal ran but the graph is still cyclic.
    #[error("cycle removal failed after {passes} pass(es); graph still cyclic: {}", format_cycles(.remaining))]
    UnresolvableCycle {
        passes: usize,
        remaining: Vec<Vec<String>>,
    },

    /// A requested item does not exist in the item master.
    #[error("item number {0} not found")]
    ItemNotFound(String),

    /// A table row is not a JSON object.
    #[error("invalid row at line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a table failed.
    #[error("table I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BomError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MalformedEdge { .. } => ErrorCode::MalformedEdgeTable,
            Self::MalformedItems { .. } => ErrorCode::MalformedItemTable,
            Self::CyclicGraph { .. } => ErrorCode::CycleDetected,
            Self::UnresolvableCycle { .. } => ErrorCode::UnresolvableCycle,
            Self::ItemNotFound(_) => ErrorCode::ItemNotFound,
            Self::InvalidRow { .. } | Self::Io(_) => ErrorCode::TableReadFailed,
        }
    }

    /// Remediation hint, falling back to the generic code message.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }
}

fn line_suffix(line: Option<&usize>) -> String {
    line.map_or_else(String::new, |line| format!(" (line {line})"))
}

/// Render cycles as `A -> B -> C -> A; X -> X`.
#[must_use]
pub fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| cycle.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::{BomError, ErrorCode};
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigParseError,
            ErrorCode::MalformedEdgeTable,
            ErrorCode::MalformedItemTable,
            ErrorCode::ItemNotFound,
            ErrorCode::CycleDetected,
            ErrorCode::UnresolvableCycle,
            ErrorCode::TableReadFailed,
            ErrorCode::TableWriteFailed,
            ErrorCode::InternalUnexpected,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::CycleDetected.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn malformed_edge_names_every_missing_column() {
        let err = BomError::MalformedEdge {
            missing: vec!["component_no".to_string(), "total".to_string()],
            line: None,
        };
        assert_eq!(
            err.to_string(),
            "edge table is missing required column(s): component_no, total"
        );
        assert_eq!(err.error_code(), ErrorCode::MalformedEdgeTable);
    }

    #[test]
    fn malformed_edge_reports_line() {
        let err = BomError::MalformedEdge {
            missing: vec!["total".to_string()],
            line: Some(4),
        };
        assert!(err.to_string().ends_with("total (line 4)"));
    }

    #[test]
    fn cyclic_graph_lists_node_sequences() {
        let err = BomError::CyclicGraph {
            cycles: vec![
                vec!["A".into(), "B".into(), "A".into()],
                vec!["X".into(), "X".into()],
            ],
        };
        assert_eq!(
            err.to_string(),
            "detected 2 BOM cycle(s): A -> B -> A; X -> X"
        );
        assert!(err.suggestion().contains("--strict"));
    }
}
