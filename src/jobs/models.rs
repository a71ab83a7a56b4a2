use serde::Deserialize;

/// Search response envelope returned by JSearch
///
/// A missing `data` key means zero results, not an error.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<RawListing>,
}

/// One provider record, only the fields the pipeline consumes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListing {
    pub job_id: Option<String>,
    pub job_title: Option<String>,
    pub employer_name: Option<String>,
    pub job_country: Option<String>,
    pub job_apply_link: Option<String>,
    pub job_google_link: Option<String>,
    pub job_description: Option<String>,
}

/// Canonical job listing
///
/// Text fields are never absent: missing provider values become empty strings.
/// The id keeps its absence so the pipeline can drop the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: Option<String>,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

impl Job {
    /// The identifier used for deduplication, if the record has a usable one
    pub fn dedup_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

impl From<RawListing> for Job {
    fn from(raw: RawListing) -> Self {
        Job {
            id: raw.job_id,
            title: raw.job_title.unwrap_or_default(),
            company: raw.employer_name.unwrap_or_default(),
            location: raw.job_country.unwrap_or_default(),
            description: raw.job_description.unwrap_or_default(),
            link: raw
                .job_apply_link
                .filter(|link| !link.is_empty())
                .or(raw.job_google_link)
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_normalize_to_empty_strings() {
        let raw: RawListing = serde_json::from_str(r#"{"job_id": "J1"}"#).unwrap();
        let job = Job::from(raw);

        assert_eq!(job.id.as_deref(), Some("J1"));
        assert_eq!(job.title, "");
        assert_eq!(job.company, "");
        assert_eq!(job.location, "");
        assert_eq!(job.description, "");
        assert_eq!(job.link, "");
    }

    #[test]
    fn missing_id_is_kept_absent() {
        let job = Job::from(RawListing {
            job_title: Some("Backend Intern".into()),
            ..Default::default()
        });
        assert_eq!(job.id, None);
        assert_eq!(job.dedup_id(), None);

        let job = Job::from(RawListing {
            job_id: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(job.dedup_id(), None);
    }

    #[test]
    fn link_falls_back_to_google_link() {
        let job = Job::from(RawListing {
            job_id: Some("J1".into()),
            job_google_link: Some("https://google.example/J1".into()),
            ..Default::default()
        });
        assert_eq!(job.link, "https://google.example/J1");

        let job = Job::from(RawListing {
            job_id: Some("J1".into()),
            job_apply_link: Some("https://apply.example/J1".into()),
            job_google_link: Some("https://google.example/J1".into()),
            ..Default::default()
        });
        assert_eq!(job.link, "https://apply.example/J1");
    }

    #[test]
    fn response_without_data_is_empty() {
        let response: SearchResponse =
            serde_json::from_str(r#"{"status": "OK", "request_id": "x"}"#).unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let body = r#"{
            "status": "OK",
            "data": [
                {"job_id": "J1", "job_title": "Remote Software Intern", "job_is_remote": true},
                {"job_title": "No id here"}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].job_id.as_deref(), Some("J1"));
        assert_eq!(response.data[1].job_id, None);
    }
}
