//! render::markdown
//!
//! Sectioned Markdown output.
//!
//! # Example Output
//!
//! ```markdown
//! FEATURES
//!
//! * New `--format` flag (#31)
//!
//! BUG FIXES
//!
//! * Fixed a crash on empty input (#12)
//! * Fixed flag parsing (#28)
//! ```
//!
//! Sections come in the configured order first; types not mentioned there
//! follow alphabetically. Within a section, notes keep the aggregator's
//! order.

use super::RenderOptions;
use crate::core::types::Note;
use crate::engine::Changelog;

/// Render every section, separated by blank lines.
///
/// Returns an empty string when there are no notes; otherwise the output
/// ends with a newline.
pub fn render_markdown(changelog: &Changelog, options: &RenderOptions) -> String {
    let sections: Vec<String> = section_types(changelog, &options.section_order)
        .into_iter()
        .filter_map(|note_type| {
            let notes = changelog.notes_by_type.get(note_type)?;
            let lines: Vec<String> = notes.iter().map(|n| format_note(n, options)).collect();
            Some(format!(
                "{}\n\n{}",
                heading(note_type, options),
                lines.join("\n")
            ))
        })
        .collect();

    if sections.is_empty() {
        return String::new();
    }
    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

/// Types present in `changelog`, configured ones first.
fn section_types<'a>(changelog: &'a Changelog, order: &'a [String]) -> Vec<&'a str> {
    let mut types: Vec<&str> = Vec::new();
    for note_type in order {
        let note_type = note_type.as_str();
        if changelog.notes_by_type.contains_key(note_type) && !types.contains(&note_type) {
            types.push(note_type);
        }
    }
    for note_type in changelog.notes_by_type.keys() {
        if !types.contains(&note_type.as_str()) {
            types.push(note_type);
        }
    }
    types
}

/// Heading for a section.
///
/// Uses the configured heading, else the type upper-cased with `-`
/// replaced by a space.
pub fn heading(note_type: &str, options: &RenderOptions) -> String {
    match options.headings.get(note_type) {
        Some(heading) => heading.clone(),
        None => note_type.replace('-', " ").to_uppercase(),
    }
}

/// Expand a note template.
///
/// Recognized placeholders are `{body}`, `{issue}`, `{type}`, and `{repo}`.
/// Substitution is a single pass, so placeholder text inside a note body
/// is left alone. Unknown placeholders are copied through.
///
/// # Example
///
/// ```
/// use changelog_build::core::types::Note;
/// use changelog_build::render::markdown::format_note;
/// use changelog_build::render::RenderOptions;
///
/// let note = Note {
///     note_type: "bug".to_string(),
///     body: "Fixed".to_string(),
///     issue: "7".to_string(),
///     position: 0,
/// };
/// let options = RenderOptions {
///     note_format: "* {body} ([GH-{issue}](https://github.com/{repo}/issues/{issue}))".to_string(),
///     repo: Some("hashicorp/consul".to_string()),
///     ..Default::default()
/// };
///
/// assert_eq!(
///     format_note(&note, &options),
///     "* Fixed ([GH-7](https://github.com/hashicorp/consul/issues/7))"
/// );
/// ```
pub fn format_note(note: &Note, options: &RenderOptions) -> String {
    let template = options.note_format.as_str();
    let mut out = String::with_capacity(template.len() + note.body.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open..];
        let Some(close) = after.find('}') else {
            rest = after;
            break;
        };

        let value = match &after[1..close] {
            "body" => Some(note.body.as_str()),
            "issue" => Some(note.issue.as_str()),
            "type" => Some(note.note_type.as_str()),
            "repo" => Some(options.repo.as_deref().unwrap_or("")),
            _ => None,
        };
        match value {
            Some(value) => out.push_str(value),
            None => out.push_str(&after[..=close]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Entry;
    use crate::engine::build_changelog;

    fn options(note_format: &str) -> RenderOptions {
        RenderOptions {
            note_format: note_format.to_string(),
            ..Default::default()
        }
    }

    fn note(body: &str) -> Note {
        Note {
            note_type: "bug".to_string(),
            body: body.to_string(),
            issue: "9".to_string(),
            position: 0,
        }
    }

    mod sections {
        use super::*;

        #[test]
        fn empty_changelog_renders_nothing() {
            assert_eq!(render_markdown(&Changelog::default(), &options("* {body}")), "");
        }

        #[test]
        fn alphabetical_without_order() {
            let changelog = build_changelog(&[
                Entry::new("1", "[improvement] Faster"),
                Entry::new("2", "[bug] Fixed\n[breaking-change] Removed flag"),
            ]);

            assert_eq!(
                render_markdown(&changelog, &options("* {body} (#{issue})")),
                "BREAKING CHANGE\n\n* Removed flag (#2)\n\n\
                 BUG\n\n* Fixed (#2)\n\n\
                 IMPROVEMENT\n\n* Faster (#1)\n"
            );
        }

        #[test]
        fn configured_order_first_then_rest() {
            let changelog = build_changelog(&[
                Entry::new("1", "[bug] A\n[feature] B\n[note] C\n[deprecation] D"),
            ]);
            let options = RenderOptions {
                note_format: "{type}".to_string(),
                section_order: vec!["feature".into(), "security".into(), "bug".into()],
                ..Default::default()
            };

            let rendered = render_markdown(&changelog, &options);
            let headings: Vec<&str> = rendered
                .lines()
                .filter(|l| !l.is_empty() && l.chars().all(|c| c.is_uppercase()))
                .collect();
            assert_eq!(headings, vec!["FEATURE", "BUG", "DEPRECATION", "NOTE"]);
        }

        #[test]
        fn configured_heading_wins() {
            let changelog = build_changelog(&[Entry::new("5", "[bug] Fixed")]);
            let mut options = options("* {body}");
            options
                .headings
                .insert("bug".to_string(), "BUG FIXES".to_string());

            assert_eq!(
                render_markdown(&changelog, &options),
                "BUG FIXES\n\n* Fixed\n"
            );
        }

        #[test]
        fn notes_keep_aggregate_order() {
            let changelog = build_changelog(&[
                Entry::new("2", "[bug] two"),
                Entry::new("10", "[bug] ten"),
            ]);

            assert_eq!(
                render_markdown(&changelog, &options("{issue}")),
                "BUG\n\n10\n2\n"
            );
        }
    }

    mod placeholders {
        use super::*;

        #[test]
        fn all_placeholders() {
            let mut options = options("{type}|{issue}|{repo}|{body}");
            options.repo = Some("o/r".to_string());
            assert_eq!(format_note(&note("x"), &options), "bug|9|o/r|x");
        }

        #[test]
        fn missing_repo_is_empty() {
            assert_eq!(format_note(&note("x"), &options("[{repo}]")), "[]");
        }

        #[test]
        fn body_is_not_reexpanded() {
            assert_eq!(
                format_note(&note("uses {issue} literally"), &options("{body}")),
                "uses {issue} literally"
            );
        }

        #[test]
        fn unknown_and_unbalanced_braces_pass_through() {
            assert_eq!(
                format_note(&note("x"), &options("{nope} {body} {")),
                "{nope} x {"
            );
        }
    }
}
