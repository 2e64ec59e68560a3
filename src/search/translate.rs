//! Query translation into each backend's native invocation
//!
//! These are pure functions: the same query always yields the same
//! invocation. Query content (e.g. regex syntax) is not validated here;
//! the backend rejects it at execution time.

use universal_search_core::SearchQuery;

pub const MDFIND: &str = "mdfind";
pub const LOCATE: &str = "locate";

/// Highest sort constant known to the Everything SDK
pub const EVERYTHING_SORT_MAX: u32 = 26;
/// EVERYTHING_SORT_NAME_ASCENDING
pub const EVERYTHING_SORT_DEFAULT: u32 = 1;

/// A subprocess to run: fixed program name plus arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// Parameters for one Everything SDK query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EverythingRequest {
    pub search: String,
    pub match_path: bool,
    pub match_case: bool,
    pub match_whole_word: bool,
    pub regex: bool,
    pub max: u32,
    pub offset: u32,
    pub sort: u32,
}

/// `mdfind -name <query>` for file-name search, `mdfind <query>` otherwise
pub fn mdfind(query: &SearchQuery) -> Invocation {
    let mut args = Vec::with_capacity(2);
    if !query.match_path {
        args.push("-name".to_string());
    }
    args.push(query.query.clone());
    Invocation { program: MDFIND, args }
}

/// `locate [-i] [--regex] <query>`; case-insensitive unless `match_case`
pub fn locate(query: &SearchQuery) -> Invocation {
    let mut args = Vec::with_capacity(3);
    if !query.match_case {
        args.push("-i".to_string());
    }
    if query.match_regex {
        args.push("--regex".to_string());
    }
    args.push(query.query.clone());
    Invocation { program: LOCATE, args }
}

pub fn everything(query: &SearchQuery) -> EverythingRequest {
    let sort = if (1..=EVERYTHING_SORT_MAX).contains(&query.sort_by) {
        query.sort_by
    } else {
        EVERYTHING_SORT_DEFAULT
    };

    EverythingRequest {
        search: normalize_separators(&query.query),
        match_path: query.match_path,
        match_case: query.match_case,
        match_whole_word: query.match_whole_word,
        regex: query.match_regex,
        max: query.max_results,
        offset: query.everything.as_ref().map_or(0, |o| o.offset),
        sort,
    }
}

/// Rewrite `/` to `\` and collapse repeated separators.
///
/// A leading `\\` is kept so UNC paths survive.
pub fn normalize_separators(query: &str) -> String {
    let converted = query.replace('/', "\\");
    let (prefix, rest) = match converted.strip_prefix("\\\\") {
        Some(rest) => ("\\\\", rest),
        None => ("", converted.as_str()),
    };

    let mut out = String::with_capacity(converted.len());
    out.push_str(prefix);
    let mut prev_sep = !prefix.is_empty();
    for c in rest.chars() {
        if c == '\\' {
            if prev_sep {
                continue;
            }
            prev_sep = true;
        } else {
            prev_sep = false;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use universal_search_core::EverythingOptions;

    #[test]
    fn mdfind_name_scoped_by_default() {
        let inv = mdfind(&SearchQuery::new("report.pdf"));
        assert_eq!(inv.program, "mdfind");
        assert_eq!(inv.args, vec!["-name", "report.pdf"]);
    }

    #[test]
    fn mdfind_full_text_when_matching_path() {
        let inv = mdfind(&SearchQuery::new("kind:pdf budget").with_match_path(true));
        assert_eq!(inv.args, vec!["kind:pdf budget"]);
    }

    #[test]
    fn locate_defaults_to_case_insensitive() {
        let query = SearchQuery::new("report.pdf").with_max_results(10);
        let inv = locate(&query);
        assert_eq!(inv.program, "locate");
        assert_eq!(inv.args, vec!["-i", "report.pdf"]);
        assert!(!inv.args.iter().any(|a| a == "--regex"));
    }

    #[test]
    fn locate_regex_flag() {
        let inv = locate(&SearchQuery::new("*.txt").with_match_regex(true));
        assert_eq!(inv.args, vec!["-i", "--regex", "*.txt"]);
    }

    #[test]
    fn locate_case_sensitive_drops_flag() {
        let inv = locate(&SearchQuery::new("Makefile").with_match_case(true));
        assert_eq!(inv.args, vec!["Makefile"]);
    }

    #[test]
    fn query_string_is_always_last_argument() {
        let query = SearchQuery::new("-rf").with_match_regex(true);
        assert_eq!(locate(&query).args.last().map(String::as_str), Some("-rf"));
        assert_eq!(mdfind(&query).args.last().map(String::as_str), Some("-rf"));
    }

    #[test]
    fn translation_is_repeatable() {
        let query = SearchQuery::new("a/b")
            .with_match_regex(true)
            .with_sort_by(40)
            .with_everything(EverythingOptions { offset: 5 });
        assert_eq!(mdfind(&query), mdfind(&query));
        assert_eq!(locate(&query), locate(&query));
        assert_eq!(everything(&query), everything(&query));
    }

    #[test]
    fn separators_collapse_to_single_backslash() {
        assert_eq!(normalize_separators("a//b\\\\c"), "a\\b\\c");
        assert_eq!(normalize_separators("C:/Users/me"), "C:\\Users\\me");
        assert_eq!(normalize_separators("no separators"), "no separators");
    }

    #[test]
    fn unc_prefix_survives() {
        assert_eq!(normalize_separators("\\\\server\\\\share"), "\\\\server\\share");
        assert_eq!(normalize_separators("//server/share"), "\\\\server\\share");
        assert_eq!(normalize_separators("\\\\\\x"), "\\\\x");
    }

    #[test]
    fn everything_request_passes_fields_through() {
        let query = SearchQuery::new("src//main.rs")
            .with_max_results(25)
            .with_match_path(true)
            .with_match_case(true)
            .with_match_whole_word(true)
            .with_sort_by(14)
            .with_everything(EverythingOptions { offset: 50 });
        assert_eq!(
            everything(&query),
            EverythingRequest {
                search: "src\\main.rs".into(),
                match_path: true,
                match_case: true,
                match_whole_word: true,
                regex: false,
                max: 25,
                offset: 50,
                sort: 14,
            }
        );
    }

    #[test]
    fn unknown_sort_degrades_to_name_ascending() {
        assert_eq!(everything(&SearchQuery::new("x").with_sort_by(0)).sort, 1);
        assert_eq!(everything(&SearchQuery::new("x").with_sort_by(27)).sort, 1);
        assert_eq!(everything(&SearchQuery::new("x").with_sort_by(26)).sort, 26);
    }
}
