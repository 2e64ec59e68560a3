//! The `search` tool: description, input schema and result rendering

use serde_json::{Value, json};
use universal_search_core::{BackendKind, MAX_RESULTS, MIN_RESULTS, SearchResult};

pub const TOOL_NAME: &str = "search";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tool description with the feature list of the active backend
pub fn description(kind: BackendKind) -> String {
    let features = match kind {
        BackendKind::Everything => {
            "Search using Everything SDK.
Features:
- Fast file and folder search across all indexed drives
- Support for wildcards and boolean operators
- Multiple sort options
- Case-sensitive and whole word matching
- Regular expression support"
        }
        BackendKind::Mdfind => {
            "Search using macOS Spotlight (mdfind).
Features:
- Real-time file indexing
- Basic name and content search
- Case-insensitive by default
- Limited regex support"
        }
        BackendKind::Locate => {
            "Search using locate database.
Features:
- Fast filename-based search
- Case-insensitive option
- Basic regex support
- Note: Database updates periodically (usually daily)"
        }
    };
    format!("Universal file search tool\n\n{}", features)
}

/// JSON Schema of the tool arguments
pub fn input_schema() -> Value {
    json!({
        "title": "SearchQuery",
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "Search query string. See the search syntax guide for details."
            },
            "max_results": {
                "type": "integer",
                "default": 100,
                "minimum": MIN_RESULTS,
                "maximum": MAX_RESULTS,
                "description": "Maximum number of results to return (1-1000)"
            },
            "match_path": {
                "type": "boolean",
                "default": false,
                "description": "Match against full path instead of filename only"
            },
            "match_case": {
                "type": "boolean",
                "default": false,
                "description": "Enable case-sensitive search"
            },
            "match_whole_word": {
                "type": "boolean",
                "default": false,
                "description": "Match whole words only"
            },
            "match_regex": {
                "type": "boolean",
                "default": false,
                "description": "Enable regex search"
            },
            "sort_by": {
                "type": "integer",
                "default": 1,
                "description":
                    "Sort order for results (Note: Not all sort options available on all platforms)"
            },
            "everything": {
                "type": "object",
                "description": "Everything SDK options (Windows only, ignored elsewhere)",
                "properties": {
                    "offset": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 0,
                        "description": "Number of leading results to skip"
                    }
                }
            }
        },
        "required": ["query"]
    })
}

/// Render results as the text block returned to the caller
pub fn render_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No files found.".to_string();
    }
    results.iter().map(render_one).collect::<Vec<_>>().join("\n")
}

fn render_one(r: &SearchResult) -> String {
    let extension = r
        .extension
        .as_ref()
        .map(|e| format!(" ({})", e))
        .unwrap_or_default();
    let size = r
        .size
        .map(|s| format!("{} bytes", group_thousands(s)))
        .unwrap_or_else(|| "N/A".to_string());
    let time = |t: &Option<chrono::DateTime<chrono::Local>>| {
        t.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| "N/A".to_string())
    };

    format!(
        "Path: {}\nFilename: {}{}\nSize: {}\nCreated: {}\nModified: {}\nAccessed: {}\n",
        r.path,
        r.filename,
        extension,
        size,
        time(&r.created),
        time(&r.modified),
        time(&r.accessed),
    )
}

/// 1234567 -> "1,234,567"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
