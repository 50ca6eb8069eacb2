// Course <-> badge association by case-insensitive substring containment
use crate::model::{Badge, Course, MatchResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPredicate {
    /// Badge name occurs in the course name.
    #[default]
    NameInName,
    /// Badge name or description occurs in the course name or description.
    /// Empty descriptions never count as a hit.
    Bidirectional,
}

impl MatchPredicate {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPredicate::NameInName => "name_in_name",
            MatchPredicate::Bidirectional => "bidirectional",
        }
    }
}

/// Lower-cased copies so each string is folded once per run, not once per pair.
struct Folded {
    name: String,
    description: String,
}

impl Folded {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            description: description.to_lowercase(),
        }
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.contains(needle)
}

fn is_related(predicate: MatchPredicate, course: &Folded, badge: &Folded) -> bool {
    match predicate {
        MatchPredicate::NameInName => contains(&course.name, &badge.name),
        MatchPredicate::Bidirectional => {
            contains(&course.name, &badge.name)
                || contains(&course.description, &badge.name)
                || contains(&course.name, &badge.description)
                || contains(&course.description, &badge.description)
        }
    }
}

/// Maps every course name to the badges related to it, both in feed order.
/// Either side empty gives an empty result. A repeated course name keeps its
/// first position and takes the list computed for its last occurrence.
pub fn match_catalogs(courses: &[Course], badges: &[Badge], predicate: MatchPredicate) -> MatchResult {
    let mut result = MatchResult::new();
    if courses.is_empty() || badges.is_empty() {
        return result;
    }

    let folded_badges: Vec<Folded> = badges
        .iter()
        .map(|b| Folded::new(&b.name, &b.description))
        .collect();

    for course in courses {
        let folded_course = Folded::new(&course.name, &course.description);
        let matched: Vec<String> = badges
            .iter()
            .zip(&folded_badges)
            .filter(|(_, folded)| is_related(predicate, &folded_course, folded))
            .map(|(badge, _)| badge.name.clone())
            .collect();
        result.insert(course.name.clone(), matched);
    }

    result
}
