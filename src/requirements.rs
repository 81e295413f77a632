//! Grouped requirements parsing.
//!
//! A requirements source is a flat list of lines. Lines starting with `#`
//! are directives that open a named group; every following requirement line
//! belongs to that group until the next directive. `#noreq` (and a bare `#`)
//! closes the current group so that subsequent lines are dropped, as are
//! lines that appear before the first directive.
//!
//! ```text
//! rasa_nlu==1.0.0        <- dropped, no group yet
//! #spacy
//! spacy==2.0.0           <- "spacy"
//! #noreq
//! #other
//! pytest==2.0.3          <- "other"
//! ```

use std::path::Path;

use indexmap::IndexMap;

use crate::errors::Result;

/// Marker that starts a directive line.
pub const GROUP_MARKER: char = '#';

/// Directive name that discards lines until the next group.
pub const NO_REQUIREMENTS: &str = "noreq";

/// Requirement lines keyed by group name, in first-seen order.
pub type RequirementGroups = IndexMap<String, Vec<String>>;

/// Group requirement lines by the directive that precedes them.
///
/// Surrounding whitespace is trimmed and blank lines are skipped. Groups
/// that receive no requirement lines do not appear in the output.
pub fn group_requirements<I, S>(lines: I) -> RequirementGroups
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut groups = RequirementGroups::new();
    let mut current: Option<String> = None;

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(directive) = line.strip_prefix(GROUP_MARKER) {
            let name = directive.trim();
            current = if name.is_empty() || name == NO_REQUIREMENTS {
                None
            } else {
                Some(name.to_string())
            };
            continue;
        }

        if let Some(group) = &current {
            groups
                .entry(group.clone())
                .or_default()
                .push(line.to_string());
        }
    }

    groups
}

/// Read a requirements file and group its lines.
pub fn read_requirement_groups(path: impl AsRef<Path>) -> Result<RequirementGroups> {
    let contents = std::fs::read_to_string(path)?;
    Ok(group_requirements(contents.lines()))
}
