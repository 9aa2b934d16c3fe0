mod duplicates;
mod merge;
mod question;
mod stats;
mod validate;

pub use duplicates::{find_duplicates, DuplicateGroup, DuplicateLocation};
pub use merge::{
    merge_schemas, FileMergeStats, InvalidInput, MergeCounts, MergeError, MergeInput,
    MergeOptions, MergeOutcome, MergeStats,
};
pub use question::{Answer, Question, QuestionKind, QuestionRef, Schema, Subject};
pub use stats::{schema_stats, SchemaStats, SubjectStats};
pub use validate::{parse_questions, parse_schema, validate, QuestionPath, SchemaErrors, ValidationError};
