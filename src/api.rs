use reqwest::{multipart, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{collections::HashSet, sync::Arc, time::Duration};

use crate::{
    error::ApiError,
    models::*,
    urls::Urls,
};

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    urls: Arc<Urls>,
}

impl ApiClient {
    pub fn new(urls: Urls, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rustilms-portal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(ApiClient { http, urls: Arc::new(urls) })
    }

    pub fn urls(&self) -> &Urls {
        &self.urls
    }

    fn request(&self, method: Method, url: String, token: Option<&str>) -> RequestBuilder {
        tracing::debug!(%method, %url, authed = token.is_some(), "backend request");
        let req = self.http.request(method, url);
        match token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes)
                .ok()
                .and_then(|e| e.message);
            tracing::warn!(
                %status,
                message = message.as_deref().unwrap_or(""),
                "backend returned error status"
            );
            return Err(ApiError::Status { status, message });
        }
        let envelope: Envelope<T> = serde_json::from_slice(&bytes)?;
        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message));
        }
        Ok(envelope)
    }

    async fn data<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        self.send(req).await?.data.ok_or(ApiError::MissingData)
    }

    async fn optional<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        Ok(self.send(req).await?.data)
    }

    /// For mutations: any 2xx passes unless the body explicitly says `success: false`.
    async fn expect_ok(&self, req: RequestBuilder) -> Result<(), ApiError> {
        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;
        let body: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_owned);
        if !status.is_success() {
            tracing::warn!(%status, "backend returned error status");
            return Err(ApiError::Status { status, message });
        }
        let rejected = body
            .as_ref()
            .and_then(|b| b.get("success"))
            .and_then(|s| s.as_bool())
            == Some(false);
        if rejected {
            return Err(ApiError::Rejected(message));
        }
        Ok(())
    }

    // --- catalog ---

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        let req = self.request(Method::GET, self.urls.courses(), None);
        Ok(self.optional(req).await?.unwrap_or_default())
    }

    pub async fn course(&self, id: &str) -> Result<Course, ApiError> {
        let req = self.request(Method::GET, self.urls.course(id), None);
        self.data(req).await
    }

    pub async fn enrolled_course_ids(
        &self,
        token: Option<&str>,
    ) -> Result<HashSet<String>, ApiError> {
        let req = self.request(Method::GET, self.urls.enrolled_courses(), token);
        let courses: Vec<CourseRef> = self.optional(req).await?.unwrap_or_default();
        Ok(courses.into_iter().map(|c| c.id).collect())
    }

    pub async fn enroll(&self, token: Option<&str>, course_id: &str) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, self.urls.enroll(course_id), token)
            .json(&serde_json::json!({}));
        self.send::<serde_json::Value>(req).await.map(|_| ())
    }

    // --- lesson viewer ---

    pub async fn lesson(&self, id: &str) -> Result<Lesson, ApiError> {
        let req = self.request(Method::GET, self.urls.lesson(id), None);
        self.data(req).await
    }

    pub async fn quiz(&self, token: Option<&str>, id: &str) -> Result<Quiz, ApiError> {
        let req = self.request(Method::GET, self.urls.quiz(id), token);
        self.data(req).await
    }

    pub async fn latest_attempt(
        &self,
        token: Option<&str>,
        lesson_id: &str,
    ) -> Result<Option<QuizAttempt>, ApiError> {
        let req = self.request(Method::GET, self.urls.latest_attempt(lesson_id), token);
        self.optional(req).await
    }

    pub async fn lesson_progress(
        &self,
        token: Option<&str>,
        lesson_id: &str,
    ) -> Result<Progress, ApiError> {
        let req = self.request(Method::GET, self.urls.lesson_progress(lesson_id), token);
        Ok(self.optional(req).await?.unwrap_or_default())
    }

    pub async fn mark_done(&self, token: Option<&str>, lesson_id: &str) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, self.urls.mark_done(), token)
            .json(&MarkDoneReq { lesson_id });
        self.expect_ok(req).await
    }

    pub async fn next_lesson(&self, id: &str) -> Result<Option<Lesson>, ApiError> {
        let req = self.request(Method::GET, self.urls.next_lesson(id), None);
        self.optional(req).await
    }

    pub async fn prev_lesson(&self, id: &str) -> Result<Option<Lesson>, ApiError> {
        let req = self.request(Method::GET, self.urls.prev_lesson(id), None);
        self.optional(req).await
    }

    // --- authoring ---

    pub async fn my_courses(&self, token: Option<&str>) -> Result<Vec<Course>, ApiError> {
        let req = self.request(Method::GET, self.urls.my_courses(), token);
        Ok(self.optional(req).await?.unwrap_or_default())
    }

    pub async fn course_lessons(
        &self,
        token: Option<&str>,
        course_id: &str,
    ) -> Result<Vec<Lesson>, ApiError> {
        let req = self.request(Method::GET, self.urls.course_lessons(course_id), token);
        Ok(self.optional(req).await?.unwrap_or_default())
    }

    pub async fn upload_files(
        &self,
        token: Option<&str>,
        files: Vec<FilePart>,
    ) -> Result<Vec<UploadedFile>, ApiError> {
        let mut form = multipart::Form::new();
        for file in files {
            let mut part = multipart::Part::bytes(file.bytes).file_name(file.name);
            if let Some(ct) = file.content_type.as_deref() {
                part = part.mime_str(ct)?;
            }
            form = form.part("files", part);
        }
        let mut req = self
            .request(Method::POST, self.urls.lesson_upload(), token)
            .multipart(form);
        if let Some(t) = token {
            req = req.header("X-Auth-Token", t);
        }
        Ok(self.optional(req).await?.unwrap_or_default())
    }

    pub async fn create_lesson(
        &self,
        token: Option<&str>,
        payload: &LessonPayload,
    ) -> Result<Lesson, ApiError> {
        let req = self
            .request(Method::POST, self.urls.lessons(), token)
            .multipart(lesson_form(payload)?);
        self.data(req).await
    }

    pub async fn update_lesson(
        &self,
        token: Option<&str>,
        id: &str,
        payload: &LessonPayload,
    ) -> Result<(), ApiError> {
        let mut req = self
            .request(Method::PUT, self.urls.lesson(id), token)
            .multipart(lesson_form(payload)?);
        if let Some(t) = token {
            req = req.header("X-Auth-Token", t);
        }
        self.expect_ok(req).await
    }

    pub async fn delete_lesson(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, self.urls.lesson(id), token);
        self.expect_ok(req).await
    }

    pub async fn create_quiz(
        &self,
        token: Option<&str>,
        payload: &QuizPayload,
    ) -> Result<(), ApiError> {
        let req = self.request(Method::POST, self.urls.quizzes(), token).json(payload);
        self.expect_ok(req).await
    }

    pub async fn delete_quiz(&self, token: Option<&str>, id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, self.urls.quiz(id), token);
        self.expect_ok(req).await
    }
}

fn lesson_form(payload: &LessonPayload) -> Result<multipart::Form, ApiError> {
    let attachments = serde_json::to_string(&payload.attachments)?;
    Ok(multipart::Form::new()
        .text("title", payload.title.clone())
        .text("content", payload.content.clone())
        .text("order", payload.order.to_string())
        .text("duration", payload.duration.to_string())
        .text("course_id", payload.course_id.clone())
        .text("attachments", attachments))
}
