use indexmap::IndexMap;
use serde::Serialize;

use super::question::Schema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubjectStats {
    pub questions: usize,
    /// question count per theme, in file order
    pub themes: IndexMap<String, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaStats {
    pub subjects: usize,
    pub themes: usize,
    pub questions: usize,
    /// question count per `type`, in order of first appearance
    pub by_type: IndexMap<String, usize>,
    pub per_subject: IndexMap<String, SubjectStats>,
}

pub fn schema_stats(schema: &Schema) -> SchemaStats {
    let mut stats = SchemaStats::default();

    for (subject, themes) in schema.subjects() {
        let mut subject_stats = SubjectStats::default();
        for (theme, questions) in themes {
            subject_stats.themes.insert(theme.clone(), questions.len());
            subject_stats.questions += questions.len();
            for question in questions {
                *stats
                    .by_type
                    .entry(question.type_name().to_string())
                    .or_default() += 1;
            }
        }

        stats.subjects += 1;
        stats.themes += themes.len();
        stats.questions += subject_stats.questions;
        stats.per_subject.insert(subject.clone(), subject_stats);
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;
    use serde_json::json;

    #[test]
    fn test_empty_schema() {
        assert_eq!(schema_stats(&Schema::new()), SchemaStats::default());
    }

    #[test]
    fn test_counts_and_type_distribution() {
        let schema = parse_schema(&json!({
            "Math": {
                "Algebra": [
                    {"name": "a", "type": "text", "correctText": "a"},
                    {"name": "b", "type": "choice", "answers": []},
                ],
                "Empty": [],
            },
            "Networks": {
                "TCP": [{"name": "c", "type": "text", "correctText": "c"}],
            },
        }))
        .unwrap();

        let stats = schema_stats(&schema);
        assert_eq!(stats.subjects, 2);
        assert_eq!(stats.themes, 3);
        assert_eq!(stats.questions, 3);
        assert_eq!(
            stats.by_type.iter().collect::<Vec<_>>(),
            vec![(&"text".to_string(), &2), (&"choice".to_string(), &1)]
        );
        assert_eq!(stats.per_subject["Math"].questions, 2);
        assert_eq!(stats.per_subject["Math"].themes["Empty"], 0);
        assert_eq!(stats.per_subject["Networks"].themes["TCP"], 1);
    }
}
