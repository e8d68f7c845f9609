use serde::Deserialize;
use std::{collections::HashSet, str::FromStr};

use crate::{
    api::ApiClient,
    models::Course,
    notify::Toast,
};

pub const ALL_CATEGORIES: &str = "All Categories";
pub const ALL_LEVELS: &str = "All Levels";

pub const CATEGORIES: [&str; 7] = [
    ALL_CATEGORIES,
    "Web Development",
    "Data Science",
    "Design",
    "Marketing",
    "Technology",
    "Business",
];

pub const LEVELS: [&str; 4] = [ALL_LEVELS, "Beginner", "Intermediate", "Advanced"];

/// Lowercase, each whitespace run collapsed to a single `-`.
pub fn slugify(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    Newest,
    #[default]
    Popular,
    Rating,
    PriceLow,
    PriceHigh,
}

impl SortMode {
    pub const ALL: [SortMode; 5] = [
        SortMode::Newest,
        SortMode::Popular,
        SortMode::Rating,
        SortMode::PriceLow,
        SortMode::PriceHigh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Newest => "newest",
            SortMode::Popular => "popular",
            SortMode::Rating => "rating",
            SortMode::PriceLow => "price-low",
            SortMode::PriceHigh => "price-high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Newest => "Newest",
            SortMode::Popular => "Most Popular",
            SortMode::Rating => "Highest Rated",
            SortMode::PriceLow => "Price: Low to High",
            SortMode::PriceHigh => "Price: High to Low",
        }
    }
}

impl FromStr for SortMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct CatalogQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub sort: Option<String>,
    pub view: Option<String>,
}

impl CatalogQuery {
    pub fn category(&self) -> &str {
        self.category.as_deref().filter(|c| !c.is_empty()).unwrap_or(ALL_CATEGORIES)
    }

    pub fn level(&self) -> &str {
        self.level.as_deref().filter(|l| !l.is_empty()).unwrap_or(ALL_LEVELS)
    }

    pub fn sort(&self) -> SortMode {
        self.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub fn view(&self) -> ViewMode {
        match self.view.as_deref() {
            Some("list") => ViewMode::List,
            _ => ViewMode::Grid,
        }
    }

    pub fn matches(&self, course: &Course) -> bool {
        let needle = self.q.to_lowercase();
        let matches_search = course.title.to_lowercase().contains(&needle)
            || course.description.to_lowercase().contains(&needle);

        let category = self.category();
        let matches_category = category == ALL_CATEGORIES || course.category == slugify(category);

        let level = self.level();
        let matches_level =
            level == ALL_LEVELS || course.difficulty.to_lowercase() == level.to_lowercase();

        matches_search && matches_category && matches_level
    }

    /// Filters then sorts a copy of `courses`; the input order breaks ties.
    pub fn apply(&self, courses: &[Course]) -> Vec<Course> {
        let mut out: Vec<Course> = courses.iter().filter(|c| self.matches(c)).cloned().collect();
        sort_courses(&mut out, self.sort());
        out
    }
}

pub fn sort_courses(courses: &mut [Course], mode: SortMode) {
    // slice::sort_by is stable
    match mode {
        SortMode::Newest => courses.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Popular => {
            courses.sort_by(|a, b| b.enrollments.unwrap_or(0).cmp(&a.enrollments.unwrap_or(0)))
        }
        SortMode::Rating => courses.sort_by(|a, b| {
            b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0))
        }),
        SortMode::PriceLow => courses.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortMode::PriceHigh => courses.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub enrolled: HashSet<String>,
    pub toasts: Vec<Toast>,
}

impl Catalog {
    pub fn is_enrolled(&self, course_id: &str) -> bool {
        self.enrolled.contains(course_id)
    }
}

pub async fn load(api: &ApiClient, token: Option<&str>) -> Catalog {
    let (courses, enrolled) = tokio::join!(api.list_courses(), api.enrolled_course_ids(token));
    let mut catalog = Catalog::default();

    match courses {
        Ok(courses) => catalog.courses = courses,
        Err(e) => {
            tracing::error!(error=%e, "failed to fetch courses");
            catalog.toasts.push(Toast::error("Failed to load courses."));
        }
    }
    match enrolled {
        Ok(ids) => catalog.enrolled = ids,
        Err(e) => {
            tracing::error!(error=%e, "failed to fetch enrolled courses");
            catalog.toasts.push(Toast::error("Failed to load your enrollments."));
        }
    }
    catalog
}

#[derive(Debug, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// Enrolled now, or already enrolled; either way the course is open.
    Enrolled { course_id: String },
    Failed(Toast),
}

/// Enrolls the caller. A course already in `enrolled` short-circuits to the
/// enrolled state without a second request.
pub async fn enroll(
    api: &ApiClient,
    token: Option<&str>,
    enrolled: &mut HashSet<String>,
    course_id: &str,
) -> EnrollOutcome {
    if enrolled.contains(course_id) {
        return EnrollOutcome::Enrolled { course_id: course_id.to_string() };
    }
    match api.enroll(token, course_id).await {
        Ok(()) => {
            tracing::info!(course_id, "enrolled");
            enrolled.insert(course_id.to_string());
            EnrollOutcome::Enrolled { course_id: course_id.to_string() }
        }
        Err(e @ crate::error::ApiError::Rejected(_)) => {
            tracing::warn!(error=%e, course_id, "enrollment rejected");
            EnrollOutcome::Failed(Toast::error(e.user_message("Enrollment failed")))
        }
        Err(e) => {
            tracing::error!(error=%e, course_id, "enrollment error");
            EnrollOutcome::Failed(Toast::error("Something went wrong while enrolling"))
        }
    }
}
