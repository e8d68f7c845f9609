use askama::Template;

use crate::{
    catalog::{self, CatalogQuery, ViewMode, CATEGORIES, LEVELS},
    manage::{CourseLessons, LessonDraft, QuizDraft, MAX_QUESTIONS},
    models::{Course, Lesson, Quiz, QuizRef, Resource},
    notify::{encode, Toast},
    urls::Urls,
    viewer::{self, AttachmentView, LessonPage, PdfMode, PdfModes},
};

#[derive(Debug, Clone)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Choice { value: value.into(), label: label.into(), selected }
    }
}

// --- catalog ---

#[derive(Debug, Clone)]
pub struct CourseCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub category: String,
    pub difficulty: String,
    pub price: String,
    pub enrolled: bool,
}

impl CourseCard {
    fn new(urls: &Urls, course: &Course, enrolled: bool) -> Self {
        CourseCard {
            id: course.id.clone(),
            title: course.title.clone(),
            description: course.description.clone(),
            thumbnail: urls.thumbnail_url(&course.thumbnail_url),
            category: course.category.replace('-', " "),
            difficulty: course.difficulty.clone(),
            price: format_price(course.price),
            enrolled,
        }
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${}", price as i64)
    } else {
        format!("${:.2}", price)
    }
}

#[derive(Template)]
#[template(path = "courses.html")]
pub struct CoursesPage {
    pub toasts: Vec<Toast>,
    pub search: String,
    pub categories: Vec<Choice>,
    pub levels: Vec<Choice>,
    pub sorts: Vec<Choice>,
    pub grid: bool,
    pub grid_href: String,
    pub list_href: String,
    pub cards: Vec<CourseCard>,
}

impl CoursesPage {
    pub fn new(
        urls: &Urls,
        query: &CatalogQuery,
        catalog: &catalog::Catalog,
        mut toasts: Vec<Toast>,
    ) -> Self {
        toasts.extend(catalog.toasts.iter().cloned());
        let cards = query
            .apply(&catalog.courses)
            .iter()
            .map(|c| CourseCard::new(urls, c, catalog.is_enrolled(&c.id)))
            .collect();
        let sort = query.sort();
        CoursesPage {
            toasts,
            search: query.q.clone(),
            categories: CATEGORIES
                .iter()
                .map(|c| Choice::new(*c, *c, *c == query.category()))
                .collect(),
            levels: LEVELS.iter().map(|l| Choice::new(*l, *l, *l == query.level())).collect(),
            sorts: catalog::SortMode::ALL
                .iter()
                .map(|m| Choice::new(m.as_str(), m.label(), *m == sort))
                .collect(),
            grid: query.view() == ViewMode::Grid,
            grid_href: catalog_href(query, "grid"),
            list_href: catalog_href(query, "list"),
            cards,
        }
    }
}

fn catalog_href(query: &CatalogQuery, view: &str) -> String {
    format!(
        "/courses?q={}&category={}&level={}&sort={}&view={}",
        encode(&query.q),
        encode(query.category()),
        encode(query.level()),
        query.sort().as_str(),
        view
    )
}

// --- lesson viewer ---

// --- course outline ---

#[derive(Debug, Clone)]
pub struct LessonLink {
    pub id: String,
    pub title: String,
    pub order: i64,
    pub duration: String,
}

#[derive(Template)]
#[template(path = "course.html")]
pub struct CoursePage {
    pub toasts: Vec<Toast>,
    pub title: String,
    pub description: String,
    pub difficulty: String,
    pub lessons: Vec<LessonLink>,
}

impl CoursePage {
    pub fn new(course: &Course, lessons: &[Lesson], toasts: Vec<Toast>) -> Self {
        let mut lessons: Vec<LessonLink> = lessons
            .iter()
            .map(|l| LessonLink {
                id: l.id.clone(),
                title: l.title.clone(),
                order: l.order,
                duration: viewer::format_duration(l.duration),
            })
            .collect();
        lessons.sort_by_key(|l| l.order);
        CoursePage {
            toasts,
            title: course.title.clone(),
            description: course.description.clone(),
            difficulty: course.difficulty.clone(),
            lessons,
        }
    }
}

// --- lesson viewer ---

#[derive(Debug, Clone)]
pub struct AttachmentCard {
    pub file: AttachmentView,
    pub preview_href: String,
    pub download_only_href: String,
}

#[derive(Debug, Clone)]
pub struct QuizView {
    pub title: String,
    pub description: String,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone)]
pub struct QuestionView {
    pub number: usize,
    pub text: String,
    pub options: Vec<String>,
    pub points: u32,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        QuizView {
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            questions: quiz
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| QuestionView {
                    number: i + 1,
                    text: q.question_text.clone(),
                    options: q.options.clone(),
                    points: q.points,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "lesson.html")]
pub struct LessonView {
    pub toasts: Vec<Toast>,
    pub lesson_id: String,
    pub title: String,
    pub content: String,
    pub attachments_heading: String,
    pub attachments: Vec<AttachmentCard>,
    pub video_embed_url: String,
    pub resources: Vec<Resource>,
    pub quiz: Option<QuizView>,
    pub duration: String,
    pub mark_done_enabled: bool,
    pub done: bool,
    pub next_enabled: bool,
    pub show_pass_warning: bool,
}

impl LessonView {
    pub fn new(urls: &Urls, page: &LessonPage, modes: &PdfModes, mut toasts: Vec<Toast>) -> Self {
        toasts.extend(page.toasts.iter().cloned());
        let lesson = &page.lesson;
        let gate = page.gate();
        let attachments = lesson
            .attachments
            .iter()
            .map(|a| AttachmentCard {
                file: AttachmentView::new(urls, a, modes),
                preview_href: lesson_href(&lesson.id, &modes.with(&a.filename, PdfMode::Preview)),
                download_only_href: lesson_href(
                    &lesson.id,
                    &modes.with(&a.filename, PdfMode::DownloadOnly),
                ),
            })
            .collect();
        LessonView {
            toasts,
            lesson_id: lesson.id.clone(),
            title: lesson.title.clone(),
            content: lesson.content.clone(),
            attachments_heading: viewer::attachments_heading(lesson.attachments.len()),
            attachments,
            video_embed_url: lesson.video_embed_url.clone().unwrap_or_default(),
            resources: lesson.resources.clone(),
            quiz: page.quiz.as_ref().map(QuizView::from),
            duration: viewer::format_duration(lesson.duration),
            mark_done_enabled: gate.mark_done_enabled(),
            done: page.done,
            next_enabled: gate.next_enabled(),
            show_pass_warning: gate.show_pass_warning(),
        }
    }
}

fn lesson_href(lesson_id: &str, modes: &PdfModes) -> String {
    let pdf = modes.to_query();
    if pdf.is_empty() {
        format!("/lesson/{}", lesson_id)
    } else {
        format!("/lesson/{}?pdf={}", lesson_id, encode(&pdf))
    }
}

/// Stand-in page when the primary resource of a view could not be loaded.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub toasts: Vec<Toast>,
    pub title: String,
    pub error: String,
}

// --- lesson management ---

#[derive(Debug, Clone)]
pub struct LessonRow {
    pub id: String,
    pub title: String,
    pub order: i64,
    pub duration: u64,
    pub attachment_count: usize,
    pub quiz_id: String,
    pub quiz_title: String,
    pub question_count: usize,
}

impl LessonRow {
    fn new(lesson: &Lesson) -> Self {
        let (quiz_id, quiz_title, question_count) = match &lesson.quiz {
            Some(QuizRef::Inline(q)) => (q.id.clone(), q.title.clone(), q.questions.len()),
            Some(QuizRef::Id(id)) => (id.clone(), String::new(), 0),
            None => (String::new(), String::new(), 0),
        };
        LessonRow {
            id: lesson.id.clone(),
            title: lesson.title.clone(),
            order: lesson.order,
            duration: lesson.duration,
            attachment_count: lesson.attachments.len(),
            quiz_id,
            quiz_title,
            question_count,
        }
    }

    pub fn has_quiz(&self) -> bool {
        !self.quiz_id.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OptionEditor {
    pub index: usize,
    pub value: String,
    pub correct: bool,
}

#[derive(Debug, Clone)]
pub struct QuestionEditor {
    pub index: usize,
    pub text: String,
    pub options: Vec<OptionEditor>,
    pub explanation: String,
    pub points: u32,
}

#[derive(Template)]
#[template(path = "manage.html")]
pub struct ManagePage {
    pub toasts: Vec<Toast>,
    pub courses: Vec<Choice>,
    pub course_id: String,
    pub course_title: String,
    pub editing_id: String,
    pub form: LessonDraft,
    pub quiz: QuizDraft,
    pub quiz_enabled: bool,
    pub questions: Vec<QuestionEditor>,
    pub can_add_question: bool,
    pub lessons: Vec<LessonRow>,
}

fn question_editors(quiz: &QuizDraft) -> Vec<QuestionEditor> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(index, q)| QuestionEditor {
            index,
            text: q.question_text.clone(),
            options: q
                .options
                .iter()
                .enumerate()
                .map(|(i, v)| OptionEditor {
                    index: i,
                    value: v.clone(),
                    correct: i == q.correct_answer,
                })
                .collect(),
            explanation: q.explanation.clone(),
            points: q.points,
        })
        .collect()
}

impl ManagePage {
    pub fn new(
        courses: &[Course],
        course_id: Option<&str>,
        state: Option<&CourseLessons>,
        editing: Option<&Lesson>,
        toasts: Vec<Toast>,
    ) -> Self {
        let course_id = course_id.unwrap_or("").to_string();
        let course_title = courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.title.clone())
            .unwrap_or_default();
        let form = match (editing, state) {
            (Some(lesson), _) => LessonDraft::from_lesson(lesson),
            (None, Some(s)) => LessonDraft { order: s.next_order, ..LessonDraft::default() },
            (None, None) => LessonDraft::default(),
        };
        let quiz = QuizDraft::editor(1);
        ManagePage {
            toasts,
            courses: courses
                .iter()
                .map(|c| Choice::new(c.id.clone(), c.title.clone(), c.id == course_id))
                .collect(),
            course_title,
            editing_id: editing.map(|l| l.id.clone()).unwrap_or_default(),
            form,
            quiz_enabled: false,
            questions: question_editors(&quiz),
            can_add_question: quiz.questions.len() < MAX_QUESTIONS,
            quiz,
            lessons: state
                .map(|s| s.lessons.iter().map(LessonRow::new).collect())
                .unwrap_or_default(),
            course_id,
        }
    }

    /// Refills the create form with what the author submitted.
    pub fn with_draft(mut self, draft: LessonDraft, quiz: Option<QuizDraft>) -> Self {
        self.form = draft;
        self.quiz_enabled = quiz.is_some();
        if let Some(quiz) = quiz {
            self.questions = question_editors(&quiz);
            self.can_add_question = quiz.questions.len() < MAX_QUESTIONS;
            self.quiz = quiz;
        }
        self
    }

    pub fn is_editing(&self) -> bool {
        !self.editing_id.is_empty()
    }

    pub fn has_course(&self) -> bool {
        !self.course_id.is_empty()
    }

    pub fn form_action(&self) -> String {
        if self.is_editing() {
            format!("/manage/lessons/{}", self.editing_id)
        } else {
            "/manage/lessons".into()
        }
    }
}
