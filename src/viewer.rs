use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeSet;

use crate::{
    api::ApiClient,
    error::ApiError,
    models::{Attachment, Lesson, Quiz, QuizAttempt, QuizRef},
    notify::Toast,
    urls::Urls,
};

pub const PDF_VIEWER: &str = "https://mozilla.github.io/pdf.js/web/viewer.html";
pub const MUST_PASS: &str = "You must pass the quiz to proceed.";

// Same set encodeURIComponent leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    Loading,
    Settled(Option<QuizAttempt>),
}

impl AttemptStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, AttemptStatus::Loading)
    }

    pub fn passed(&self) -> bool {
        matches!(self, AttemptStatus::Settled(Some(a)) if a.passed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub has_quiz: bool,
    pub attempt_loading: bool,
    pub passed: bool,
    pub done: bool,
}

impl Gate {
    pub fn mark_done_enabled(&self) -> bool {
        !self.has_quiz || (self.passed && !self.attempt_loading && !self.done)
    }

    pub fn next_enabled(&self) -> bool {
        !self.has_quiz || (self.passed && !self.attempt_loading)
    }

    pub fn show_pass_warning(&self) -> bool {
        self.has_quiz && !self.attempt_loading && !self.passed
    }
}

#[derive(Debug, Clone)]
pub struct LessonPage {
    pub lesson: Lesson,
    pub quiz: Option<Quiz>,
    pub attempt: AttemptStatus,
    pub done: bool,
    pub toasts: Vec<Toast>,
}

impl LessonPage {
    /// State right after the lesson arrives, before any dependent fetch settles.
    pub fn new(lesson: Lesson) -> Self {
        LessonPage {
            lesson,
            quiz: None,
            attempt: AttemptStatus::Loading,
            done: false,
            toasts: Vec::new(),
        }
    }

    pub fn gate(&self) -> Gate {
        Gate {
            has_quiz: self.quiz.is_some(),
            attempt_loading: self.quiz.is_some() && self.attempt.is_loading(),
            passed: self.attempt.passed(),
            done: self.done,
        }
    }
}

/// Runs the viewer pipeline. Only a lesson failure is an error; every other
/// step degrades to an empty state, possibly with a toast.
pub async fn load(
    api: &ApiClient,
    token: Option<&str>,
    lesson_id: &str,
) -> Result<LessonPage, ApiError> {
    let lesson = api.lesson(lesson_id).await.map_err(|e| {
        tracing::error!(error=%e, lesson_id, "failed to fetch lesson");
        e
    })?;
    let mut page = LessonPage::new(lesson);

    let quiz_and_attempt = async {
        let (quiz, toast) = resolve_quiz(api, token, &page.lesson).await;
        let attempt = match &quiz {
            Some(_) => AttemptStatus::Settled(latest_attempt(api, token, &page.lesson.id).await),
            None => AttemptStatus::Settled(None),
        };
        (quiz, toast, attempt)
    };
    let ((quiz, quiz_toast, attempt), (done, progress_toast)) =
        tokio::join!(quiz_and_attempt, progress(api, token, &page.lesson.id));

    page.quiz = quiz;
    page.attempt = attempt;
    page.done = done;
    page.toasts.extend(quiz_toast);
    page.toasts.extend(progress_toast);
    Ok(page)
}

/// A quiz is only kept when it has at least one question.
pub async fn resolve_quiz(
    api: &ApiClient,
    token: Option<&str>,
    lesson: &Lesson) -> (Option<Quiz>, Option<Toast>,
) {
    match &lesson.quiz {
        Some(QuizRef::Id(id)) => match api.quiz(token, id).await {
            Ok(quiz) if quiz.has_questions() => (Some(quiz), None),
            Ok(_) => (None, None),
            Err(e) => {
                tracing::error!(error=%e, quiz_id = %id, "failed to fetch quiz");
                (None, Some(Toast::error("Failed to load quiz.")))
            }
        },
        Some(QuizRef::Inline(quiz)) if quiz.has_questions() => (Some(quiz.as_ref().clone()), None),
        _ => (None, None),
    }
}

/// Any failure reads as "no attempt yet"; only unexpected kinds are logged loudly.
pub async fn latest_attempt(
    api: &ApiClient,
    token: Option<&str>,
    lesson_id: &str,
) -> Option<QuizAttempt> {
    match api.latest_attempt(token, lesson_id).await {
        Ok(attempt) => attempt,
        Err(e) if e.is_not_found() => {
            tracing::debug!(lesson_id, "no quiz attempt yet");
            None
        }
        Err(e) => {
            tracing::warn!(
                error=%e,
                lesson_id,
                "quiz attempt fetch failed, treating as no attempt"
            );
            None
        }
    }
}

pub async fn progress(
    api: &ApiClient,
    token: Option<&str>,
    lesson_id: &str) -> (bool, Option<Toast>,
) {
    if token.is_none() {
        return (false, None);
    }
    match api.lesson_progress(token, lesson_id).await {
        Ok(p) => (p.completed, None),
        Err(e) => {
            tracing::error!(error=%e, lesson_id, "failed to fetch progress");
            (false, Some(Toast::error("Failed to fetch progress.")))
        }
    }
}

/// Completing an already completed lesson is a no-op.
pub async fn mark_done(
    api: &ApiClient,
    token: Option<&str>,
    page: &LessonPage,
) -> Result<(), Toast> {
    if page.done {
        return Ok(());
    }
    if !page.gate().mark_done_enabled() {
        return Err(Toast::warning(MUST_PASS));
    }
    api.mark_done(token, &page.lesson.id).await.map_err(|e| {
        tracing::error!(error=%e, lesson_id = %page.lesson.id, "failed to mark lesson as done");
        Toast::error("Failed to mark lesson as done.")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Go(String),
    Stay(Toast),
}

pub async fn next(api: &ApiClient, page: &LessonPage) -> Navigation {
    if !page.gate().next_enabled() {
        return Navigation::Stay(Toast::warning(MUST_PASS));
    }
    match api.next_lesson(&page.lesson.id).await {
        Ok(Some(lesson)) => Navigation::Go(lesson.id),
        Ok(None) => Navigation::Stay(Toast::warning("No next lesson available.")),
        Err(e) => {
            tracing::error!(error=%e, "failed to fetch next lesson");
            Navigation::Stay(Toast::error("Failed to fetch next lesson."))
        }
    }
}

pub async fn previous(api: &ApiClient, lesson_id: &str) -> Navigation {
    match api.prev_lesson(lesson_id).await {
        Ok(Some(lesson)) => Navigation::Go(lesson.id),
        Ok(None) => Navigation::Stay(Toast::warning("No previous lesson available.")),
        Err(e) => {
            tracing::error!(error=%e, "failed to fetch previous lesson");
            Navigation::Stay(Toast::error("Failed to fetch previous lesson."))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Video,
    Pdf,
    Other,
}

impl AttachmentKind {
    pub fn of(mime: &str) -> Self {
        if mime.starts_with("video/") {
            AttachmentKind::Video
        } else if mime == "application/pdf" {
            AttachmentKind::Pdf
        } else {
            AttachmentKind::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfMode {
    Preview,
    DownloadOnly,
}

/// PDF filenames switched to download-only. Each name is percent-encoded
/// before joining on `,` so names containing commas survive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfModes(BTreeSet<String>);

impl PdfModes {
    pub fn parse(raw: Option<&str>) -> Self {
        PdfModes(
            raw.unwrap_or("")
                .split(',')
                .filter(|s| !s.is_empty())
                .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
                .collect(),
        )
    }

    pub fn mode(&self, filename: &str) -> PdfMode {
        if self.0.contains(filename) {
            PdfMode::DownloadOnly
        } else {
            PdfMode::Preview
        }
    }

    pub fn with(&self, filename: &str, mode: PdfMode) -> Self {
        let mut set = self.0.clone();
        match mode {
            PdfMode::DownloadOnly => set.insert(filename.to_string()),
            PdfMode::Preview => set.remove(filename),
        };
        PdfModes(set)
    }

    pub fn to_query(&self) -> String {
        self.0
            .iter()
            .map(|name| utf8_percent_encode(name, URI_COMPONENT).to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentView {
    pub filename: String,
    pub name: String,
    pub url: String,
    pub mime: String,
    pub size_mb: String,
    pub downloadable: bool,
    pub kind: AttachmentKind,
    pub pdf_mode: PdfMode,
    pub viewer_url: String,
}

impl AttachmentView {
    pub fn new(urls: &Urls, file: &Attachment, modes: &PdfModes) -> Self {
        let url = urls.upload_url(&file.url);
        let kind = AttachmentKind::of(&file.mime);
        let viewer_url = match kind {
            AttachmentKind::Pdf => pdf_viewer_url(&url),
            _ => String::new(),
        };
        let name = if file.original_name.is_empty() {
            file.filename.clone()
        } else {
            file.original_name.clone()
        };
        AttachmentView {
            filename: file.filename.clone(),
            name,
            size_mb: format_size_mb(file.size),
            downloadable: file.is_downloadable,
            pdf_mode: modes.mode(&file.filename),
            mime: file.mime.clone(),
            url,
            kind,
            viewer_url,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == AttachmentKind::Video
    }

    pub fn is_pdf(&self) -> bool {
        self.kind == AttachmentKind::Pdf
    }

    pub fn pdf_preview(&self) -> bool {
        self.is_pdf() && self.pdf_mode == PdfMode::Preview
    }
}

pub fn pdf_viewer_url(file_url: &str) -> String {
    format!("{}?file={}", PDF_VIEWER, utf8_percent_encode(file_url, URI_COMPONENT))
}

pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0 / 1024.0)
}

pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return "N/A".into();
    }
    format!("{}m {}s", seconds / 60, seconds % 60)
}

pub fn attachments_heading(count: usize) -> String {
    format!("Attachments ({} file{})", count, if count == 1 { "" } else { "s" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, spawn_backend};
    use axum::{http::StatusCode, routing::{get, post}, Json, Router};
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::{atomic::{AtomicUsize, Ordering}, Arc};

    fn quiz_json() -> Value {
        json!({ "_id": "q1", "title": "Check", "questions": [
            { "question_text": "2+2?", "options": ["3", "4"], "correct_answer": 1 }
        ]})
    }

    fn lesson_json(quiz: Value) -> Value {
        json!({ "success": true, "data": {
            "_id": "l1", "title": "Borrowing", "content": "<p>refs</p>", "duration": 125,
            "attachments": [
                { "filename": "v.mp4", "original_name": "Talk.mp4", "url": "/uploads/v.mp4", "type": "video/mp4", "size": 1048576 },
                { "filename": "n.pdf", "url": "/uploads/n.pdf", "type": "application/pdf", "size": 0, "is_downloadable": true }
            ],
            "quiz": quiz
        }})
    }

    fn backend(lesson: Value, attempt: Option<(StatusCode, Value)>) -> Router {
        let attempt = attempt.unwrap_or((StatusCode::OK, json!({ "success": true, "data": null })));
        Router::new()
            .route("/api/lessons/:id", get(move || async move { Json(lesson) }))
            .route(
                "/api/quizzes/:id",
                get(|| async { Json(json!({ "success": true, "data": quiz_json() })) }),
            )
            .route(
                "/api/quiz-attempts/:id/latest",
                get(move || async move { (attempt.0, Json(attempt.1)) }),
            )
            .route(
                "/api/progress/lesson/:id",
                get(|| async { Json(json!({ "success": true, "data": { "completed": false } })) }),
            )
            .route(
                "/api/lessons/:id/next",
                get(|| async { Json(json!({ "success": true, "data": { "_id": "l2", "title": "Next" } })) }),
            )
    }

    #[rstest]
    #[case(Gate { has_quiz: true, attempt_loading: false, passed: false, done: false }, false, false)]
    #[case(Gate { has_quiz: true, attempt_loading: false, passed: true, done: false }, true, true)]
    #[case(Gate { has_quiz: true, attempt_loading: true, passed: true, done: false }, false, false)]
    #[case(Gate { has_quiz: true, attempt_loading: false, passed: true, done: true }, false, true)]
    #[case(Gate { has_quiz: false, attempt_loading: true, passed: false, done: true }, true, true)]
    fn gating_matrix(#[case] gate: Gate, #[case] mark_done: bool, #[case] next: bool) {
        assert_eq!(gate.mark_done_enabled(), mark_done);
        assert_eq!(gate.next_enabled(), next);
    }

    #[test]
    fn pass_warning_hidden_while_loading() {
        let gate = Gate { has_quiz: true, attempt_loading: true, passed: false, done: false };
        assert!(!gate.show_pass_warning());
        let gate = Gate { attempt_loading: false, ..gate };
        assert!(gate.show_pass_warning());
    }

    #[tokio::test]
    async fn lesson_without_quiz_allows_next() {
        let api = client_for(spawn_backend(backend(lesson_json(Value::Null), None)).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert!(page.quiz.is_none());
        assert!(page.gate().next_enabled());
        assert_eq!(next(&api, &page).await, Navigation::Go("l2".into()));
    }

    #[tokio::test]
    async fn referenced_quiz_without_attempt_blocks_progression() {
        let api = client_for(spawn_backend(backend(lesson_json(json!("q1")), None)).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert_eq!(page.quiz.as_ref().map(|q| q.id.as_str()), Some("q1"));
        assert_eq!(page.attempt, AttemptStatus::Settled(None));
        let gate = page.gate();
        assert!(!gate.mark_done_enabled());
        assert!(!gate.next_enabled());
        assert_eq!(next(&api, &page).await, Navigation::Stay(Toast::warning(MUST_PASS)));
    }

    #[tokio::test]
    async fn passing_attempt_unlocks_progression() {
        let attempt = (StatusCode::OK, json!({ "success": true, "data": { "_id": "a1", "passed": true, "score": 90 } }));
        let api = client_for(spawn_backend(backend(lesson_json(quiz_json()), Some(attempt))).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert!(page.attempt.passed());
        assert!(page.gate().mark_done_enabled());
        assert!(page.gate().next_enabled());
    }

    #[tokio::test]
    async fn attempt_fetch_error_reads_as_no_attempt_without_toast() {
        let attempt = (StatusCode::INTERNAL_SERVER_ERROR, json!({ "success": false, "message": "db down" }));
        let api = client_for(spawn_backend(backend(lesson_json(json!("q1")), Some(attempt))).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert!(page.quiz.is_some());
        assert_eq!(page.attempt, AttemptStatus::Settled(None));
        assert!(!page.gate().next_enabled());
        assert!(page.toasts.is_empty());
    }

    #[tokio::test]
    async fn lesson_fetch_error_fails_the_pipeline() {
        let app = Router::new().route(
            "/api/lessons/:id",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "success": false }))) }),
        );
        let api = client_for(spawn_backend(app).await);
        assert!(load(&api, Some("tok"), "missing").await.is_err());
    }

    #[tokio::test]
    async fn quiz_failure_still_fetches_progress() {
        let app = Router::new()
            .route("/api/lessons/:id", get(|| async { Json(lesson_json(json!("q1"))) }))
            .route("/api/quizzes/:id", get(|| async { StatusCode::BAD_GATEWAY }))
            .route(
                "/api/progress/lesson/:id",
                get(|| async { Json(json!({ "success": true, "data": { "completed": true } })) }),
            );
        let api = client_for(spawn_backend(app).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert!(page.quiz.is_none());
        assert!(page.done);
        assert_eq!(page.toasts, vec![Toast::error("Failed to load quiz.")]);
    }

    #[tokio::test]
    async fn progress_is_skipped_without_token() {
        let api = client_for(spawn_backend(backend(lesson_json(Value::Null), None)).await);
        let page = load(&api, None, "l1").await.unwrap();
        assert!(!page.done);
        assert!(page.toasts.is_empty());
    }

    #[tokio::test]
    async fn inlined_quiz_without_questions_is_ignored() {
        let quiz = json!({ "_id": "q1", "title": "Empty", "questions": [] });
        let api = client_for(spawn_backend(backend(lesson_json(quiz), None)).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert!(page.quiz.is_none());
    }

    #[tokio::test]
    async fn mark_done_is_refused_before_network_when_gated() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = backend(lesson_json(json!("q1")), None).route(
            "/api/progress/mark-done",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "success": true }))
                }
            }),
        );
        let api = client_for(spawn_backend(app).await);
        let page = load(&api, Some("tok"), "l1").await.unwrap();
        assert_eq!(mark_done(&api, Some("tok"), &page).await, Err(Toast::warning(MUST_PASS)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    fn page_with(quiz: bool, passed: bool, done: bool) -> LessonPage {
        let lesson: Lesson = serde_json::from_value(json!({ "_id": "l1", "title": "Borrowing" })).unwrap();
        let mut page = LessonPage::new(lesson);
        if quiz {
            page.quiz = Some(serde_json::from_value(quiz_json()).unwrap());
        }
        let attempt = QuizAttempt { id: Some("a1".into()), passed, score: None };
        page.attempt = AttemptStatus::Settled(Some(attempt));
        page.done = done;
        page
    }

    fn counting_mark_done(status: StatusCode) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/api/progress/mark-done",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    (status, Json(json!({ "success": status.is_success() })))
                }
            }),
        );
        (app, calls)
    }

    #[tokio::test]
    async fn already_done_lesson_is_not_told_to_pass_the_quiz() {
        let (app, calls) = counting_mark_done(StatusCode::OK);
        let api = client_for(spawn_backend(app).await);
        let page = page_with(true, true, true);
        assert_eq!(mark_done(&api, Some("tok"), &page).await, Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    #[case(StatusCode::OK, Ok(()))]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, Err(Toast::error("Failed to mark lesson as done.")))]
    #[tokio::test]
    async fn mark_done_reports_backend_outcome(
        #[case] status: StatusCode,
        #[case] expected: Result<(), Toast>,
    ) {
        let (app, calls) = counting_mark_done(status);
        let api = client_for(spawn_backend(app).await);
        let page = page_with(true, true, false);
        assert_eq!(mark_done(&api, Some("tok"), &page).await, expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn navigation_backend(path: &'static str, status: StatusCode, body: Value) -> Router {
        Router::new().route(path, get(move || async move { (status, Json(body)) }))
    }

    #[rstest]
    #[case(StatusCode::OK, json!({ "success": true, "data": { "_id": "l2", "title": "Next" } }), Navigation::Go("l2".into()))]
    #[case(
        StatusCode::OK,
        json!({ "success": true, "data": null }),
        Navigation::Stay(Toast::warning("No next lesson available."))
    )]
    #[case(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false }),
        Navigation::Stay(Toast::error("Failed to fetch next lesson."))
    )]
    #[tokio::test]
    async fn next_lesson_navigation(
        #[case] status: StatusCode,
        #[case] body: Value,
        #[case] expected: Navigation,
    ) {
        let api = client_for(spawn_backend(navigation_backend("/api/lessons/:id/next", status, body)).await);
        assert_eq!(next(&api, &page_with(false, false, false)).await, expected);
    }

    #[rstest]
    #[case(StatusCode::OK, json!({ "success": true, "data": { "_id": "l0", "title": "Intro" } }), Navigation::Go("l0".into()))]
    #[case(
        StatusCode::OK,
        json!({ "success": true, "data": null }),
        Navigation::Stay(Toast::warning("No previous lesson available."))
    )]
    #[case(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false }),
        Navigation::Stay(Toast::error("Failed to fetch previous lesson."))
    )]
    #[tokio::test]
    async fn previous_lesson_navigation(
        #[case] status: StatusCode,
        #[case] body: Value,
        #[case] expected: Navigation,
    ) {
        let api = client_for(spawn_backend(navigation_backend("/api/lessons/:id/prev", status, body)).await);
        assert_eq!(previous(&api, "l1").await, expected);
    }

    #[test]
    fn pdf_names_with_commas_can_be_toggled() {
        let modes = PdfModes::default().with("notes, part 1.pdf", PdfMode::DownloadOnly);
        let parsed = PdfModes::parse(Some(&modes.to_query()));
        assert_eq!(parsed.mode("notes, part 1.pdf"), PdfMode::DownloadOnly);
        assert_eq!(parsed.mode("notes"), PdfMode::Preview);
        assert_eq!(parsed.with("notes, part 1.pdf", PdfMode::Preview).to_query(), "");
    }

    #[test]
    fn attachments_branch_on_mime_type() {
        let urls = Urls::new("http://localhost:5000", crate::urls::Environment::Development, Default::default());
        let lesson: Lesson = serde_json::from_value(lesson_json(Value::Null)["data"].clone()).unwrap();
        let modes = PdfModes::default();
        let views: Vec<_> = lesson.attachments.iter().map(|a| AttachmentView::new(&urls, a, &modes)).collect();

        assert!(views[0].is_video());
        assert_eq!(views[0].name, "Talk.mp4");
        assert_eq!(views[0].size_mb, "1.00");
        assert_eq!(views[0].url, "http://localhost:5000/uploads/v.mp4");

        assert!(views[1].pdf_preview());
        assert_eq!(views[1].name, "n.pdf");
        assert_eq!(
            views[1].viewer_url,
            "https://mozilla.github.io/pdf.js/web/viewer.html?file=http%3A%2F%2Flocalhost%3A5000%2Fuploads%2Fn.pdf"
        );

        let modes = modes.with("n.pdf", PdfMode::DownloadOnly);
        let pdf = AttachmentView::new(&urls, &lesson.attachments[1], &modes);
        assert_eq!(pdf.pdf_mode, PdfMode::DownloadOnly);
        assert!(!pdf.pdf_preview());
        assert_eq!(AttachmentKind::of("text/plain"), AttachmentKind::Other);
    }

    #[test]
    fn pdf_modes_round_trip_through_query() {
        let modes = PdfModes::parse(Some("a.pdf,b.pdf"));
        assert_eq!(modes.mode("a.pdf"), PdfMode::DownloadOnly);
        assert_eq!(modes.mode("c.pdf"), PdfMode::Preview);
        assert_eq!(modes.with("a.pdf", PdfMode::Preview).to_query(), "b.pdf");
    }

    #[rstest]
    #[case(0, "N/A")]
    #[case(125, "2m 5s")]
    #[case(60, "1m 0s")]
    fn duration_formatting(#[case] secs: u64, #[case] expected: &str) {
        assert_eq!(format_duration(secs), expected);
    }

    #[test]
    fn heading_pluralizes() {
        assert_eq!(attachments_heading(1), "Attachments (1 file)");
        assert_eq!(attachments_heading(3), "Attachments (3 files)");
    }
}
