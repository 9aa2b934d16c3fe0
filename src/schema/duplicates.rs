use indexmap::IndexMap;
use serde::Serialize;

use super::question::Schema;
use crate::text::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateLocation {
    pub subject: String,
    pub theme: String,
    /// 0-based position within the theme
    pub index: usize,
    pub original_text: String,
}

/// Questions sharing one normalized text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub normalized_text: String,
    /// original text of the first question seen with this normalized text
    pub sample_original_text: String,
    /// always at least two, in subject, theme, then array order
    pub locations: Vec<DuplicateLocation>,
}

/// Group every named question of `schema` by [`normalize`]d text and return
/// the groups with more than one member, in order of first appearance.
pub fn find_duplicates(schema: &Schema) -> Vec<DuplicateGroup> {
    let mut groups: IndexMap<String, Vec<DuplicateLocation>> = IndexMap::new();

    for located in schema.questions().filter(|q| !q.question.name.is_empty()) {
        groups
            .entry(normalize(&located.question.name))
            .or_default()
            .push(DuplicateLocation {
                subject: located.subject.to_string(),
                theme: located.theme.to_string(),
                index: located.index,
                original_text: located.question.name.clone(),
            });
    }

    groups
        .into_iter()
        .filter(|(_, locations)| locations.len() > 1)
        .map(|(normalized_text, locations)| DuplicateGroup {
            sample_original_text: locations[0].original_text.clone(),
            normalized_text,
            locations,
        })
        .collect()
}
