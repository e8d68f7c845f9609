use std::{fmt, str::FromStr};

pub const DEFAULT_REGION: &str = "ap-south-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    pub region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: None,
            region: DEFAULT_REGION.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Urls {
    backend: String,
    environment: Environment,
    storage: StorageConfig,
}

impl Urls {
    pub fn new(
        backend: impl Into<String>,
        environment: Environment,
        storage: StorageConfig,
    ) -> Self {
        let backend = backend.into().trim_end_matches('/').to_string();
        Urls { backend, environment, storage }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    fn build(&self, endpoint: &str) -> String {
        format!("{}{}", self.backend, endpoint)
    }

    /// Rewrites a stored file path to the object-store domain in production
    /// (when a bucket is configured) and to the backend origin otherwise.
    pub fn file_url(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http") {
            return path.to_string();
        }
        match (&self.environment, &self.storage.bucket) {
            (Environment::Production, Some(bucket)) => format!(
                "https://{}.s3.{}.amazonaws.com{}",
                bucket, self.storage.region, path
            ),
            _ => self.build(path),
        }
    }

    pub fn logo_url(&self, filename: &str) -> String {
        self.file_url(&format!("/logo/{}", filename))
    }

    pub fn thumbnail_url(&self, path: &str) -> String {
        self.file_url(path)
    }

    pub fn upload_url(&self, path: &str) -> String {
        self.file_url(path)
    }

    // --- auth ---
    pub fn auth_login(&self) -> String {
        self.build("/api/auth/login")
    }

    pub fn auth_register(&self) -> String {
        self.build("/api/auth/register")
    }

    pub fn auth_change_password(&self) -> String {
        self.build("/api/auth/change-password")
    }

    // --- users ---
    pub fn users(&self) -> String {
        self.build("/api/users")
    }

    pub fn user_profile(&self) -> String {
        self.build("/api/users/profile")
    }

    pub fn user_upload_avatar(&self) -> String {
        self.build("/api/users/upload-avatar")
    }

    pub fn user(&self, id: &str) -> String {
        self.build(&format!("/api/users/{}", id))
    }

    // --- courses ---
    pub fn courses(&self) -> String {
        self.build("/api/courses")
    }

    pub fn my_courses(&self) -> String {
        self.build("/api/courses/my")
    }

    pub fn course(&self, id: &str) -> String {
        self.build(&format!("/api/courses/{}", id))
    }

    // --- enrollments ---
    pub fn enrolled_courses(&self) -> String {
        self.build("/api/enrollments/my-courses")
    }

    pub fn enroll(&self, course_id: &str) -> String {
        self.build(&format!("/api/enrollments/enroll/{}", course_id))
    }

    pub fn enrollment_status(&self, course_id: &str) -> String {
        self.build(&format!("/api/enrollments/status/{}", course_id))
    }

    pub fn enrollment_progress(&self, course_id: &str) -> String {
        self.build(&format!("/api/enrollments/progress/{}", course_id))
    }

    pub fn complete_lesson(&self) -> String {
        self.build("/api/enrollments/complete")
    }

    // --- quiz attempts ---
    pub fn latest_attempt(&self, lesson_id: &str) -> String {
        self.build(&format!("/api/quiz-attempts/{}/latest", lesson_id))
    }

    pub fn quiz_attempts(&self) -> String {
        self.build("/api/quiz-attempts")
    }

    pub fn submit_attempt(&self, attempt_id: &str) -> String {
        self.build(&format!("/api/quiz-attempts/{}/submit", attempt_id))
    }

    // --- progress ---
    pub fn lesson_progress(&self, lesson_id: &str) -> String {
        self.build(&format!("/api/progress/lesson/{}", lesson_id))
    }

    pub fn mark_done(&self) -> String {
        self.build("/api/progress/mark-done")
    }

    pub fn course_progress(&self, course_id: &str) -> String {
        self.build(&format!("/api/progress/course/{}", course_id))
    }

    // --- lessons ---
    pub fn lessons(&self) -> String {
        self.build("/api/lessons")
    }

    pub fn lesson_upload(&self) -> String {
        self.build("/api/lessons/upload")
    }

    pub fn course_lessons(&self, course_id: &str) -> String {
        self.build(&format!("/api/lessons/course/{}", course_id))
    }

    pub fn lesson(&self, id: &str) -> String {
        self.build(&format!("/api/lessons/{}", id))
    }

    pub fn next_lesson(&self, id: &str) -> String {
        self.build(&format!("/api/lessons/{}/next", id))
    }

    pub fn prev_lesson(&self, id: &str) -> String {
        self.build(&format!("/api/lessons/{}/prev", id))
    }

    // --- quizzes ---
    pub fn quizzes(&self) -> String {
        self.build("/api/quizzes")
    }

    pub fn quiz(&self, id: &str) -> String {
        self.build(&format!("/api/quizzes/{}", id))
    }

    pub fn course_quizzes(&self, course_id: &str) -> String {
        self.build(&format!("/api/quizzes/course/{}", course_id))
    }

    // --- analytics ---
    pub fn analytics_progress(&self, course_id: &str) -> String {
        self.build(&format!("/api/analytics/progress/{}", course_id))
    }

    pub fn analytics_hours(&self) -> String {
        self.build("/api/analytics/hours")
    }

    // --- notifications ---
    pub fn notifications(&self) -> String {
        self.build("/api/notifications")
    }

    pub fn notification(&self, id: &str) -> String {
        self.build(&format!("/api/notifications/{}", id))
    }

    // --- affiliations / franchise ---
    pub fn affiliations(&self) -> String {
        self.build("/api/affiliations")
    }

    pub fn affiliation(&self, id: &str) -> String {
        self.build(&format!("/api/affiliations/{}", id))
    }

    pub fn franchises(&self) -> String {
        self.build("/api/franchise")
    }

    pub fn franchise(&self, id: &str) -> String {
        self.build(&format!("/api/franchise/{}", id))
    }

    // --- contact ---
    pub fn contact(&self) -> String {
        self.build("/api/contact")
    }
}
