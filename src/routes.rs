use askama::Template;
use axum::{
    async_trait,
    extract::{FromRequestParts, Multipart, Path, Query, State},
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization, Cookie},
    TypedHeader,
};
use http::StatusCode;
use serde::Deserialize;
use std::{collections::HashMap, convert::Infallible};

use crate::{
    api::ApiClient,
    catalog::{self, CatalogQuery, EnrollOutcome},
    error::AppError,
    manage::{self, CourseLessons, LessonDraft, LessonForm, QuizDraft},
    models::{Course, FilePart},
    notify::{encode, with_toast, Flash, Toast},
    viewer::{self, Navigation, PdfModes},
    views::{CoursePage, CoursesPage, ErrorView, LessonView, ManagePage},
};

pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
}

/// Bearer token from the `token` cookie, falling back to an Authorization header.
pub struct AuthToken(pub Option<String>);

impl AuthToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Option::<TypedHeader<Cookie>>::from_request_parts(parts, state)
            .await
            .ok()
            .flatten();
        if let Some(token) = cookies
            .as_ref()
            .and_then(|TypedHeader(c)| c.get(TOKEN_COOKIE))
            .filter(|t| !t.is_empty())
        {
            return Ok(AuthToken(Some(token.to_string())));
        }
        let bearer = Option::<TypedHeader<Authorization<Bearer>>>::from_request_parts(parts, state)
            .await
            .ok()
            .flatten()
            .map(|TypedHeader(auth)| auth.token().to_string());
        Ok(AuthToken(bearer))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // catalog
        .route("/courses", get(courses_page))
        .route("/courses/:id/enroll", post(enroll))
        .route("/course/:id", get(course_page))
        // lesson viewer
        .route("/lesson/:id", get(lesson_page))
        .route("/lesson/:id/done", post(mark_done))
        .route("/lesson/:id/next", get(next_lesson))
        .route("/lesson/:id/prev", get(prev_lesson))
        // authoring
        .route("/manage/lessons", get(manage_page).post(create_lesson))
        .route("/manage/lessons/:id", post(update_lesson))
        .route("/manage/lessons/:id/delete", post(delete_lesson))
        .route("/manage/quizzes/:id/delete", post(delete_quiz))
        .with_state(state)
}

fn render<T: Template>(page: T) -> Result<Html<String>, AppError> {
    Ok(Html(page.render()?))
}

// --- catalog ---

async fn courses_page(
    State(st): State<AppState>,
    token: AuthToken,
    Query(query): Query<CatalogQuery>,
    Query(flash): Query<Flash>,
) -> Result<Html<String>, AppError> {
    let catalog = catalog::load(&st.api, token.as_deref()).await;
    render(CoursesPage::new(st.api.urls(), &query, &catalog, flash.into_toasts()))
}

async fn enroll(
    State(st): State<AppState>,
    token: AuthToken,
    Path(course_id): Path<String>,
) -> Redirect {
    // best-effort: an unknown enrollment set just means we ask the backend
    let mut enrolled = st
        .api
        .enrolled_course_ids(token.as_deref())
        .await
        .unwrap_or_default();
    match catalog::enroll(&st.api, token.as_deref(), &mut enrolled, &course_id).await {
        EnrollOutcome::Enrolled { course_id } => Redirect::to(&format!(
            "/course/{}?{}",
            course_id,
            Toast::success("Enrollment successful!").to_query()
        )),
        EnrollOutcome::Failed(toast) => Redirect::to(&with_toast("/courses", &toast)),
    }
}

async fn course_page(
    State(st): State<AppState>,
    token: AuthToken,
    Path(course_id): Path<String>,
    Query(flash): Query<Flash>,
) -> Result<Response, AppError> {
    let mut toasts = flash.into_toasts();
    let (course, lessons) = tokio::join!(
        st.api.course(&course_id),
        st.api.course_lessons(token.as_deref(), &course_id)
    );
    let course = match course {
        Ok(course) => course,
        Err(e) => {
            tracing::error!(error=%e, %course_id, "failed to fetch course");
            toasts.push(Toast::error("Failed to load course."));
            let view = ErrorView {
                toasts,
                title: "Course".into(),
                error: "Failed to load course".into(),
            };
            return Ok((upstream_status(&e), render(view)?).into_response());
        }
    };
    let lessons = lessons.unwrap_or_else(|e| {
        tracing::error!(error=%e, %course_id, "failed to fetch course lessons");
        toasts.push(Toast::error("Failed to load lessons."));
        Vec::new()
    });
    Ok(render(CoursePage::new(&course, &lessons, toasts))?.into_response())
}

fn upstream_status(e: &crate::error::ApiError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    }
}

// --- lesson viewer ---

#[derive(Deserialize, Debug, Default)]
struct LessonQuery {
    pdf: Option<String>,
}

async fn lesson_page(
    State(st): State<AppState>,
    token: AuthToken,
    Path(lesson_id): Path<String>,
    Query(q): Query<LessonQuery>,
    Query(flash): Query<Flash>,
) -> Result<Response, AppError> {
    let mut toasts = flash.into_toasts();
    match viewer::load(&st.api, token.as_deref(), &lesson_id).await {
        Ok(page) => {
            let modes = PdfModes::parse(q.pdf.as_deref());
            Ok(render(LessonView::new(st.api.urls(), &page, &modes, toasts))?.into_response())
        }
        Err(e) => {
            toasts.push(Toast::error("Failed to load lesson."));
            let view = ErrorView {
                toasts,
                title: "Lesson".into(),
                error: "Failed to load lesson".into(),
            };
            Ok((upstream_status(&e), render(view)?).into_response())
        }
    }
}

fn back_to_lesson(lesson_id: &str, toast: Option<Toast>) -> Redirect {
    let path = format!("/lesson/{}", lesson_id);
    match toast {
        Some(t) => Redirect::to(&with_toast(&path, &t)),
        None => Redirect::to(&path),
    }
}

async fn mark_done(
    State(st): State<AppState>,
    token: AuthToken,
    Path(lesson_id): Path<String>,
) -> Redirect {
    let Ok(page) = viewer::load(&st.api, token.as_deref(), &lesson_id).await else {
        return back_to_lesson(&lesson_id, None);
    };
    back_to_lesson(&lesson_id, viewer::mark_done(&st.api, token.as_deref(), &page).await.err())
}

async fn next_lesson(
    State(st): State<AppState>,
    token: AuthToken,
    Path(lesson_id): Path<String>,
) -> Redirect {
    let Ok(page) = viewer::load(&st.api, token.as_deref(), &lesson_id).await else {
        return back_to_lesson(&lesson_id, None);
    };
    match viewer::next(&st.api, &page).await {
        Navigation::Go(id) => back_to_lesson(&id, None),
        Navigation::Stay(toast) => back_to_lesson(&lesson_id, Some(toast)),
    }
}

async fn prev_lesson(State(st): State<AppState>, Path(lesson_id): Path<String>) -> Redirect {
    match viewer::previous(&st.api, &lesson_id).await {
        Navigation::Go(id) => back_to_lesson(&id, None),
        Navigation::Stay(toast) => back_to_lesson(&lesson_id, Some(toast)),
    }
}

// --- authoring ---

#[derive(Deserialize, Debug, Default)]
struct ManageQuery {
    course_id: Option<String>,
    edit: Option<String>,
}

async fn load_manage(
    st: &AppState,
    token: Option<&str>,
    course_id: Option<&str>,
    toasts: &mut Vec<Toast>,
) -> (Vec<Course>, Option<CourseLessons>) {
    let (courses, courses_toast) = manage::load_courses(&st.api, token).await;
    toasts.extend(courses_toast);
    let state = match course_id {
        Some(id) => match manage::load_lessons(&st.api, token, id).await {
            Ok(state) => Some(state),
            Err(toast) => {
                toasts.push(toast);
                None
            }
        },
        None => None,
    };
    (courses, state)
}

async fn manage_page(
    State(st): State<AppState>,
    token: AuthToken,
    Query(q): Query<ManageQuery>,
    Query(flash): Query<Flash>,
) -> Result<Html<String>, AppError> {
    let mut toasts = flash.into_toasts();
    let course_id = q.course_id.as_deref().filter(|c| !c.is_empty());
    let (courses, state) = load_manage(&st, token.as_deref(), course_id, &mut toasts).await;
    let editing = match (&state, q.edit.as_deref()) {
        (Some(s), Some(id)) => s.find(id),
        _ => None,
    };
    render(ManagePage::new(&courses, course_id, state.as_ref(), editing, toasts))
}

/// Create form rendered again with the author's input in place.
async fn redraw_create_form(
    st: &AppState,
    token: Option<&str>,
    course_id: &str,
    draft: LessonDraft,
    quiz: Option<QuizDraft>,
    mut toasts: Vec<Toast>,
) -> Result<Html<String>, AppError> {
    let course_id = Some(course_id).filter(|c| !c.is_empty());
    let (courses, state) = load_manage(st, token, course_id, &mut toasts).await;
    let page = ManagePage::new(&courses, course_id, state.as_ref(), None, toasts);
    render(page.with_draft(draft, quiz))
}

fn manage_href(course_id: &str) -> String {
    if course_id.is_empty() {
        "/manage/lessons".into()
    } else {
        format!("/manage/lessons?course_id={}", encode(course_id))
    }
}

async fn read_lesson_form(mut mp: Multipart) -> Result<LessonForm, AppError> {
    let mut fields = HashMap::new();
    let mut files = Vec::new();

    while let Some(field) = mp.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        if name == "files" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;
            // browsers send an empty part when no file was picked
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            files.push(FilePart { name: file_name, content_type, bytes: bytes.to_vec() });
        } else {
            fields.insert(name, field.text().await?);
        }
    }

    LessonForm::from_parts(fields, files).map_err(AppError::BadRequest)
}

async fn create_lesson(
    State(st): State<AppState>,
    token: AuthToken,
    mp: Multipart,
) -> Result<Response, AppError> {
    let mut form = read_lesson_form(mp).await?;
    let token = token.as_deref();

    if form.add_question {
        let mut quiz = form.quiz.take().unwrap_or_else(|| QuizDraft::editor(1));
        quiz.add_question();
        let page = redraw_create_form(&st, token, &form.course_id, form.draft, Some(quiz), vec![]);
        return Ok(page.await?.into_response());
    }

    let course_id = form.course_id.clone();
    let draft = form.draft.clone();
    let quiz = form.quiz.clone();
    match manage::create_lesson(&st.api, token, form).await {
        Ok(_) => {
            let toast = Toast::success("Lesson added successfully!");
            Ok(Redirect::to(&with_toast(&manage_href(&course_id), &toast)).into_response())
        }
        Err(toast) => {
            let page = redraw_create_form(&st, token, &course_id, draft, quiz, vec![toast]).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

async fn update_lesson(
    State(st): State<AppState>,
    token: AuthToken,
    Path(lesson_id): Path<String>,
    mp: Multipart,
) -> Result<Redirect, AppError> {
    let form = read_lesson_form(mp).await?;
    let back = manage_href(&form.course_id);
    let toast = match manage::update_lesson(&st.api, token.as_deref(), &lesson_id, form).await {
        Ok(()) => Toast::success("Lesson updated successfully!"),
        Err(toast) => {
            // stay in edit mode so the author can retry
            let sep = if back.contains('?') { '&' } else { '?' };
            let back = format!("{}{}edit={}", back, sep, encode(&lesson_id));
            return Ok(Redirect::to(&with_toast(&back, &toast)));
        }
    };
    Ok(Redirect::to(&with_toast(&back, &toast)))
}

#[derive(Deserialize, Debug)]
struct CourseForm {
    #[serde(default)]
    course_id: String,
}

async fn delete_lesson(
    State(st): State<AppState>,
    token: AuthToken,
    Path(lesson_id): Path<String>,
    Form(f): Form<CourseForm>,
) -> Redirect {
    let toast = match manage::delete_lesson(&st.api, token.as_deref(), &lesson_id).await {
        Ok(()) => Toast::success("Lesson deleted successfully!"),
        Err(toast) => toast,
    };
    Redirect::to(&with_toast(&manage_href(&f.course_id), &toast))
}

#[derive(Deserialize, Debug)]
struct QuizDeleteForm {
    lesson_id: String,
    #[serde(default)]
    course_id: String,
}

/// Renders directly from the detached local state instead of re-fetching.
async fn delete_quiz(
    State(st): State<AppState>,
    token: AuthToken,
    Path(quiz_id): Path<String>,
    Form(f): Form<QuizDeleteForm>,
) -> Result<Html<String>, AppError> {
    if f.course_id.is_empty() {
        return Err(AppError::BadRequest("course_id is required".into()));
    }
    let mut toasts = Vec::new();
    let (courses, state) =
        load_manage(&st, token.as_deref(), Some(&f.course_id), &mut toasts).await;
    let mut state = state.unwrap_or_default();
    match manage::delete_quiz(&st.api, token.as_deref(), &mut state, &f.lesson_id, &quiz_id).await {
        Ok(()) => toasts.push(Toast::success("Quiz deleted successfully")),
        Err(toast) => toasts.push(toast),
    }
    render(ManagePage::new(&courses, Some(&f.course_id), Some(&state), None, toasts))
}
