use indexmap::IndexMap;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};

/// Themes of a subject, in file order. Each theme is an ordered list of questions.
pub type Subject = IndexMap<String, Vec<Question>>;

/// A whole quiz schema: subjects in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema(pub IndexMap<String, Subject>);

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subjects(&self) -> impl Iterator<Item = (&String, &Subject)> {
        self.0.iter()
    }

    pub fn subject(&self, name: &str) -> Option<&Subject> {
        self.0.get(name)
    }

    pub fn subject_mut(&mut self, name: &str) -> Option<&mut Subject> {
        self.0.get_mut(name)
    }

    /// Get the subject, inserting an empty one at the end if missing.
    pub fn subject_entry(&mut self, name: &str) -> &mut Subject {
        self.0.entry(name.to_string()).or_default()
    }

    /// Every question with its location, in subject, theme, then array order.
    pub fn questions(&self) -> impl Iterator<Item = QuestionRef<'_>> {
        self.0.iter().flat_map(|(subject, themes)| {
            themes.iter().flat_map(move |(theme, questions)| {
                questions
                    .iter()
                    .enumerate()
                    .map(move |(index, question)| QuestionRef {
                        subject,
                        theme,
                        index,
                        question,
                    })
            })
        })
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A question together with where it sits in a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct QuestionRef<'a> {
    pub subject: &'a str,
    pub theme: &'a str,
    /// 0-based position within the theme
    pub index: usize,
    pub question: &'a Question,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// question text, possibly containing `\uXXXX` escapes
    pub name: String,

    /// type-dependent payload, serialized as the `type` field plus its data
    pub kind: QuestionKind,

    /// fields the tools do not interpret, kept so a load/save cycle is lossless
    pub extra: Map<String, Value>,
}

impl Question {
    pub fn new(name: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            extra: Map::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// single correct answer expected
    Choice { answers: Vec<Answer> },
    /// zero or more correct answers
    MultiChoice { answers: Vec<Answer> },
    /// free text compared against `correct_text`
    Text { correct_text: String },
}

impl QuestionKind {
    pub const CHOICE: &'static str = "choice";
    pub const MULTICHOICE: &'static str = "multichoice";
    pub const TEXT: &'static str = "text";

    pub fn type_name(&self) -> &'static str {
        match self {
            QuestionKind::Choice { .. } => Self::CHOICE,
            QuestionKind::MultiChoice { .. } => Self::MULTICHOICE,
            QuestionKind::Text { .. } => Self::TEXT,
        }
    }

    pub fn answers(&self) -> &[Answer] {
        match self {
            QuestionKind::Choice { answers } | QuestionKind::MultiChoice { answers } => answers,
            QuestionKind::Text { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub name: String,
    pub correct: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Answer {
    pub fn new(name: impl Into<String>, correct: bool) -> Self {
        Self {
            name: name.into(),
            correct,
            extra: Map::new(),
        }
    }
}

impl Serialize for Question {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.type_name())?;
        match &self.kind {
            QuestionKind::Choice { answers } | QuestionKind::MultiChoice { answers } => {
                map.serialize_entry("answers", answers)?;
            }
            QuestionKind::Text { correct_text } => {
                map.serialize_entry("correctText", correct_text)?;
            }
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
