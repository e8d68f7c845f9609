use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn css_class(&self) -> &'static str {
        match self {
            Level::Success => "toast-success",
            Level::Warning => "toast-warning",
            Level::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: Level,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Toast { level: Level::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Toast { level: Level::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Toast { level: Level::Error, message: message.into() }
    }

    pub fn css_class(&self) -> &'static str {
        self.level.css_class()
    }

    /// Query-string form used to carry a toast across a redirect.
    pub fn to_query(&self) -> String {
        let key = match self.level {
            Level::Success => "notice",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        format!("{}={}", key, encode(&self.message))
    }
}

/// Toasts carried in on a redirect (`?notice=..&warning=..&error=..`).
#[derive(Deserialize, Debug, Default, Clone)]
pub struct Flash {
    pub notice: Option<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn into_toasts(self) -> Vec<Toast> {
        let mut out = Vec::new();
        if let Some(m) = self.notice.filter(|m| !m.is_empty()) {
            out.push(Toast::success(m));
        }
        if let Some(m) = self.warning.filter(|m| !m.is_empty()) {
            out.push(Toast::warning(m));
        }
        if let Some(m) = self.error.filter(|m| !m.is_empty()) {
            out.push(Toast::error(m));
        }
        out
    }
}

pub fn encode(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, percent_encoding::NON_ALPHANUMERIC).to_string()
}

/// Appends a toast to a redirect target, respecting an existing query string.
pub fn with_toast(path: &str, toast: &Toast) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, sep, toast.to_query())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_survives_redirect_query() {
        let toast = Toast::warning("No next lesson available.");
        let target = with_toast("/lesson/l1", &toast);
        assert_eq!(target, "/lesson/l1?warning=No%20next%20lesson%20available%2E");

        let target = with_toast("/manage/lessons?course_id=c1", &Toast::success("ok"));
        assert_eq!(target, "/manage/lessons?course_id=c1&notice=ok");
    }

    #[test]
    fn flash_skips_empty_messages() {
        let flash = Flash {
            notice: Some(String::new()),
            warning: None,
            error: Some("boom".into()),
        };
        assert_eq!(flash.into_toasts(), vec![Toast::error("boom")]);
    }
}
