use crate::model::{MatchResult, ReportError};
use crate::report::{Reporter, RunSummary};
use std::io::Write;

/// Prints one block per course, matched badges as a bullet list.
pub struct ConsoleReporter;

pub fn render_listing(result: &MatchResult) -> String {
    let mut out = String::new();
    for (course, badges) in result.iter() {
        out.push_str(&format!("Course: {}\n", course));
        if badges.is_empty() {
            out.push_str("No matched badges found for this course.\n");
        } else {
            out.push_str("Matched Badges:\n");
            for badge in badges {
                out.push_str(&format!("- {}\n", badge));
            }
        }
        out.push('\n');
    }
    out
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn emit(&self, summary: &RunSummary<'_>) -> Result<(), ReportError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(render_listing(summary.result).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_matches_expected_layout() {
        let mut result = MatchResult::new();
        result.insert("AI Fundamentals".into(), vec!["AI".into()]);
        result.insert("Networking".into(), vec![]);

        assert_eq!(
            render_listing(&result),
            "Course: AI Fundamentals\nMatched Badges:\n- AI\n\n\
             Course: Networking\nNo matched badges found for this course.\n\n"
        );
    }

    #[test]
    fn empty_result_prints_nothing() {
        assert_eq!(render_listing(&MatchResult::new()), "");
    }
}
