use std::collections::HashMap;
use tokio::task::JoinSet;

use crate::{
    api::ApiClient,
    models::{Course, FilePart, Lesson, LessonPayload, Question, QuizPayload, QuizRef, UploadedFile},
    notify::Toast,
};

pub const QUIZ_INCOMPLETE: &str =
    "Please fill out all quiz question fields and options before submitting.";
pub const MAX_QUESTIONS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct LessonDraft {
    pub title: String,
    pub content: String,
    pub order: i64,
    pub duration: u64,
    pub is_downloadable: bool,
}

impl Default for LessonDraft {
    fn default() -> Self {
        LessonDraft {
            title: String::new(),
            content: String::new(),
            order: 1,
            duration: 10,
            is_downloadable: false,
        }
    }
}

impl LessonDraft {
    pub fn from_lesson(lesson: &Lesson) -> Self {
        LessonDraft {
            title: lesson.title.clone(),
            content: lesson.content.clone(),
            order: lesson.order,
            duration: lesson.duration,
            is_downloadable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizDraft {
    pub title: String,
    pub description: String,
    pub time_limit: u32,
    pub passing_score: u32,
    pub max_attempts: u32,
    pub shuffle_questions: bool,
    pub show_results: bool,
    pub questions: Vec<Question>,
}

impl Default for QuizDraft {
    fn default() -> Self {
        QuizDraft {
            title: String::new(),
            description: String::new(),
            time_limit: 10,
            passing_score: 70,
            max_attempts: 3,
            shuffle_questions: false,
            show_results: true,
            questions: vec![blank_question()],
        }
    }
}

pub fn blank_question() -> Question {
    Question {
        question_text: String::new(),
        kind: "mcq".into(),
        options: vec![String::new(); 4],
        correct_answer: 0,
        explanation: String::new(),
        points: 1,
    }
}

impl QuizDraft {
    /// Editor starting state: `count` questions, the first one pre-filled as a sample.
    pub fn editor(count: usize) -> Self {
        let count = count.clamp(1, MAX_QUESTIONS);
        let mut draft = QuizDraft {
            questions: vec![blank_question(); count],
            ..QuizDraft::default()
        };
        if let Some(first) = draft.questions.first_mut() {
            first.question_text = "Sample question?".into();
            first.options = (1..=4).map(|i| format!("Option {}", i)).collect();
        }
        draft
    }

    /// Appends a blank question unless the editor is already full.
    pub fn add_question(&mut self) -> bool {
        if self.questions.len() >= MAX_QUESTIONS {
            return false;
        }
        self.questions.push(blank_question());
        true
    }

    /// Every question needs text and every option must be non-blank.
    pub fn validate(&self) -> Result<(), &'static str> {
        let incomplete = self.questions.iter().any(|q| {
            q.question_text.trim().is_empty() || q.options.iter().any(|o| o.trim().is_empty())
        });
        if incomplete {
            Err(QUIZ_INCOMPLETE)
        } else {
            Ok(())
        }
    }

    pub fn into_payload(self, lesson_id: Option<String>) -> QuizPayload {
        QuizPayload {
            title: self.title,
            description: self.description,
            time_limit: self.time_limit,
            passing_score: self.passing_score,
            max_attempts: self.max_attempts,
            shuffle_questions: self.shuffle_questions,
            show_results: self.show_results,
            questions: self.questions,
            lesson_id,
        }
    }

    /// Reads `quiz_*` settings and `q{i}_*` question fields from a submitted form.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, String> {
        let defaults = QuizDraft::default();
        let mut questions = Vec::new();
        for i in 0..MAX_QUESTIONS {
            let Some(text) = fields.get(&format!("q{}_text", i)) else {
                break;
            };
            let mut options = Vec::new();
            while let Some(opt) = fields.get(&format!("q{}_opt{}", i, options.len())) {
                options.push(opt.clone());
            }
            questions.push(Question {
                question_text: text.clone(),
                kind: "mcq".into(),
                correct_answer: number(fields, &format!("q{}_correct", i))?.unwrap_or(0),
                explanation: fields
                    .get(&format!("q{}_explanation", i))
                    .cloned()
                    .unwrap_or_default(),
                points: number(fields, &format!("q{}_points", i))?.unwrap_or(1),
                options,
            });
        }
        if questions.is_empty() {
            questions.push(blank_question());
        }
        Ok(QuizDraft {
            title: fields.get("quiz_title").cloned().unwrap_or_default(),
            description: fields.get("quiz_description").cloned().unwrap_or_default(),
            time_limit: number(fields, "quiz_time_limit")?.unwrap_or(defaults.time_limit),
            passing_score: number(fields, "quiz_passing_score")?.unwrap_or(defaults.passing_score),
            max_attempts: number(fields, "quiz_max_attempts")?.unwrap_or(defaults.max_attempts),
            shuffle_questions: checked(fields, "quiz_shuffle_questions"),
            show_results: checked(fields, "quiz_show_results"),
            questions,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LessonForm {
    pub course_id: String,
    pub draft: LessonDraft,
    pub files: Vec<FilePart>,
    pub quiz: Option<QuizDraft>,
    pub add_question: bool,
}

impl LessonForm {
    pub fn from_parts(
        fields: HashMap<String, String>,
        files: Vec<FilePart>,
    ) -> Result<Self, String> {
        let defaults = LessonDraft::default();
        let draft = LessonDraft {
            title: fields.get("title").cloned().unwrap_or_default(),
            content: fields.get("content").cloned().unwrap_or_default(),
            order: number(&fields, "order")?.unwrap_or(defaults.order),
            duration: number(&fields, "duration")?.unwrap_or(defaults.duration),
            is_downloadable: checked(&fields, "is_downloadable"),
        };
        let add_question = checked(&fields, "add_question");
        let quiz = if add_question || checked(&fields, "quiz_enabled") {
            Some(QuizDraft::from_fields(&fields)?)
        } else {
            None
        };
        Ok(LessonForm {
            course_id: fields.get("course_id").cloned().unwrap_or_default(),
            draft,
            files,
            quiz,
            add_question,
        })
    }

    /// Checks that need no backend round trip, in the order the author sees them.
    pub fn check(&self) -> Result<(), Toast> {
        if self.course_id.is_empty() {
            return Err(Toast::error("Please select a course first"));
        }
        if self.draft.title.trim().is_empty() || self.draft.content.trim().is_empty() {
            return Err(Toast::error("Please fill in all required fields"));
        }
        if let Some(quiz) = &self.quiz {
            quiz.validate().map_err(Toast::error)?;
        }
        Ok(())
    }

    fn payload(&self, attachments: Vec<UploadedFile>) -> LessonPayload {
        LessonPayload {
            title: self.draft.title.clone(),
            content: self.draft.content.clone(),
            order: self.draft.order,
            duration: self.draft.duration,
            course_id: self.course_id.clone(),
            attachments,
        }
    }
}

fn number<T: std::str::FromStr>(
    fields: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, String> {
    match fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| format!("invalid {}: {}", key, v)),
    }
}

fn checked(fields: &HashMap<String, String>, key: &str) -> bool {
    matches!(fields.get(key).map(String::as_str), Some("on" | "true" | "1"))
}

pub fn next_order(lessons: &[Lesson]) -> i64 {
    lessons.iter().map(|l| l.order).max().map_or(1, |max| max + 1)
}

#[derive(Debug, Clone, Default)]
pub struct CourseLessons {
    pub lessons: Vec<Lesson>,
    pub next_order: i64,
}

impl CourseLessons {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        let next_order = next_order(&lessons);
        CourseLessons { lessons, next_order }
    }

    /// Drops the quiz from one lesson in place; nothing is re-fetched.
    pub fn detach_quiz(&mut self, lesson_id: &str) {
        if let Some(lesson) = self.lessons.iter_mut().find(|l| l.id == lesson_id) {
            lesson.quiz = None;
        }
    }

    pub fn find(&self, lesson_id: &str) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == lesson_id)
    }
}

pub async fn load_courses(api: &ApiClient, token: Option<&str>) -> (Vec<Course>, Option<Toast>) {
    match api.my_courses(token).await {
        Ok(courses) => (courses, None),
        Err(e) => {
            tracing::error!(error=%e, "failed to fetch instructor courses");
            (Vec::new(), Some(Toast::error("Failed to load your courses")))
        }
    }
}

/// Loads a course's lessons and inlines every quiz referenced by id.
/// A quiz that fails to load leaves the lesson without one.
pub async fn load_lessons(
    api: &ApiClient,
    token: Option<&str>,
    course_id: &str,
) -> Result<CourseLessons, Toast> {
    let mut lessons = api.course_lessons(token, course_id).await.map_err(|e| {
        tracing::error!(error=%e, course_id, "failed to fetch lessons");
        Toast::error("Failed to load lessons for the selected course")
    })?;

    let mut set = JoinSet::new();
    for (idx, lesson) in lessons.iter().enumerate() {
        if let Some(QuizRef::Id(quiz_id)) = &lesson.quiz {
            let api = api.clone();
            let token = token.map(str::to_owned);
            let quiz_id = quiz_id.clone();
            set.spawn(async move {
                let quiz = match api.quiz(token.as_deref(), &quiz_id).await {
                    Ok(q) => Some(q),
                    Err(e) => {
                        tracing::warn!(error=%e, %quiz_id, "failed to hydrate quiz");
                        None
                    }
                };
                (idx, quiz)
            });
        }
    }
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, quiz)) => {
                if let Some(lesson) = lessons.get_mut(idx) {
                    lesson.quiz = quiz.map(|q| QuizRef::Inline(Box::new(q)));
                }
            }
            Err(e) => tracing::error!(error=%e, "quiz hydration task failed"),
        }
    }

    Ok(CourseLessons::new(lessons))
}

async fn upload(
    api: &ApiClient,
    token: Option<&str>,
    form: &mut LessonForm,
) -> Result<Vec<UploadedFile>, crate::error::ApiError> {
    if form.files.is_empty() {
        return Ok(Vec::new());
    }
    let files = std::mem::take(&mut form.files);
    let mut uploaded = api.upload_files(token, files).await?;
    for file in uploaded.iter_mut() {
        file.is_downloadable = form.draft.is_downloadable;
    }
    Ok(uploaded)
}

pub async fn create_lesson(
    api: &ApiClient,
    token: Option<&str>,
    mut form: LessonForm,
) -> Result<Lesson, Toast> {
    form.check()?;

    let fail = |e: crate::error::ApiError| {
        tracing::error!(error=%e, "failed to add lesson");
        Toast::error(e.user_message("Error adding lesson"))
    };

    let attachments = upload(api, token, &mut form).await.map_err(fail)?;
    let lesson = api.create_lesson(token, &form.payload(attachments)).await.map_err(fail)?;
    tracing::info!(lesson_id = %lesson.id, course_id = %form.course_id, "lesson created");

    if let Some(quiz) = form.quiz.take() {
        api.create_quiz(token, &quiz.into_payload(Some(lesson.id.clone())))
            .await
            .map_err(fail)?;
        tracing::info!(lesson_id = %lesson.id, "quiz created");
    }
    Ok(lesson)
}

pub async fn update_lesson(
    api: &ApiClient,
    token: Option<&str>,
    lesson_id: &str,
    mut form: LessonForm,
) -> Result<(), Toast> {
    let fail = |e: crate::error::ApiError| {
        tracing::error!(error=%e, lesson_id, "failed to update lesson");
        Toast::error(e.user_message("Error updating lesson"))
    };
    let attachments = upload(api, token, &mut form).await.map_err(fail)?;
    api.update_lesson(token, lesson_id, &form.payload(attachments))
        .await
        .map_err(fail)
}

pub async fn delete_lesson(
    api: &ApiClient,
    token: Option<&str>,
    lesson_id: &str,
) -> Result<(), Toast> {
    api.delete_lesson(token, lesson_id).await.map_err(|e| {
        tracing::error!(error=%e, lesson_id, "failed to delete lesson");
        Toast::error("Error deleting lesson")
    })
}

pub async fn delete_quiz(
    api: &ApiClient,
    token: Option<&str>,
    state: &mut CourseLessons,
    lesson_id: &str,
    quiz_id: &str,
) -> Result<(), Toast> {
    api.delete_quiz(token, quiz_id).await.map_err(|e| {
        tracing::error!(error=%e, quiz_id, "failed to delete quiz");
        Toast::error("Failed to delete quiz")
    })?;
    state.detach_quiz(lesson_id);
    Ok(())
}
