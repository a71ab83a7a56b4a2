use super::models::Job;

/// Case-insensitive substring matcher over a fixed keyword profile
///
/// Matching is plain substring search with no word boundaries, so a short
/// keyword such as "ai" also hits "main" or "email".
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    /// Build the matcher, lowercasing keywords once and dropping blank entries
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches(&self, job: &Job) -> bool {
        let haystack = Self::haystack(job);
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }

    /// Every profile keyword found in the job, in profile order
    pub fn matched_keywords(&self, job: &Job) -> Vec<&str> {
        let haystack = Self::haystack(job);
        self.keywords
            .iter()
            .filter(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    fn haystack(job: &Job) -> String {
        format!(
            "{} {} {} {}",
            job.title, job.company, job.location, job.description
        )
        .to_lowercase()
    }
}
