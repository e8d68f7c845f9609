use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[derive(Deserialize, Debug, Clone)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String, // slug, e.g. "web-development"
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub thumbnail_url: String,
    pub enrollments: Option<u64>,
    pub rating: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    #[serde(default)]
    pub original_name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub mime: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_downloadable: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Resource {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Question {
    #[serde(default)]
    pub question_text: String,
    #[serde(rename = "type", default = "default_question_type")]
    pub kind: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_question_type() -> String {
    "mcq".into()
}

fn default_points() -> u32 {
    1
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quiz {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub time_limit: Option<u32>,
    pub passing_score: Option<u32>,
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub shuffle_questions: bool,
    #[serde(default)]
    pub show_results: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }
}

/// Lessons reference their quiz either by id or with the quiz inlined.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QuizRef {
    Id(String),
    Inline(Box<Quiz>),
}

impl QuizRef {
    pub fn id(&self) -> &str {
        match self {
            QuizRef::Id(id) => id,
            QuizRef::Inline(q) => &q.id,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Lesson {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub quiz: Option<QuizRef>,
    pub video_embed_url: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizAttempt {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub passed: bool,
    pub score: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Progress {
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CourseRef {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Descriptor returned by the upload endpoint. Unknown fields are preserved
/// so the lesson payload echoes exactly what the backend produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub filename: String,
    pub url: String,
    #[serde(rename = "type")]
    pub mime: String,
    #[serde(default)]
    pub is_downloadable: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LessonPayload {
    pub title: String,
    pub content: String,
    pub order: i64,
    pub duration: u64,
    pub course_id: String,
    pub attachments: Vec<UploadedFile>,
}

#[skip_serializing_none]
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QuizPayload {
    pub title: String,
    pub description: String,
    pub time_limit: u32,
    pub passing_score: u32,
    pub max_attempts: u32,
    pub shuffle_questions: bool,
    pub show_results: bool,
    pub questions: Vec<Question>,
    pub lesson_id: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct MarkDoneReq<'a> {
    #[serde(rename = "lessonId")]
    pub lesson_id: &'a str,
}
