//! Turns one rendered item card (plus its open detail view) into a [`Record`].
//!
//! Every field is resolved through a [`FallbackChain`]; nothing raised while
//! reading the DOM escapes this module.

use crate::error::ExtractionFailure;
use crate::fallback::FallbackChain;
use crate::selectors::SelectorSet;
use jobtrawl_browser::{BrowserActions, BrowserError};
use jobtrawl_core::{Field, Record, Seniority, WorkplaceMode};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

const JOB_PATH_MARKER: &str = "/jobs/view/";

static TITLE_QUALIFIER: OnceLock<Regex> = OnceLock::new();
static POSTED_PHRASE: OnceLock<Regex> = OnceLock::new();
static APPLICANT_PHRASE: OnceLock<Regex> = OnceLock::new();

fn title_qualifier() -> &'static Regex {
    TITLE_QUALIFIER.get_or_init(|| {
        Regex::new(r"(?i)^(.*?)(?:\s+with verification)+$").expect("valid regex")
    })
}

fn posted_phrase() -> &'static Regex {
    POSTED_PHRASE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:reposted\s+)?\d+\s+(?:second|minute|hour|day|week|month|year)s?\s+ago",
        )
        .expect("valid regex")
    })
}

fn applicant_phrase() -> &'static Regex {
    APPLICANT_PHRASE
        .get_or_init(|| Regex::new(r"(?i)(?:over\s+)?\d[\d,]*\s+applicants?").expect("valid regex"))
}

/// Take the first line of a title block and strip trailing verification badges.
///
/// Falls back to the trimmed first line when nothing matches or the
/// remainder would be empty.
#[must_use]
pub fn normalize_title(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or_default().trim();
    match title_qualifier().captures(first_line).and_then(|c| c.get(1)) {
        Some(stem) if !stem.as_str().trim().is_empty() => stem.as_str().trim().to_string(),
        _ => first_line.to_string(),
    }
}

/// Reduce a posting href to `<origin>/jobs/view/<id>`.
///
/// Relative hrefs take their origin from `base`. Hrefs without the posting
/// path marker are returned unchanged.
#[must_use]
pub fn canonical_job_url(href: &str, base: &Url) -> String {
    let Some(marker) = href.find(JOB_PATH_MARKER) else {
        return href.to_string();
    };

    let rest = &href[marker + JOB_PATH_MARKER.len()..];
    let id = &rest[..rest.find(['/', '?', '#']).unwrap_or(rest.len())];
    if id.is_empty() {
        return href.to_string();
    }

    let origin = match Url::parse(href) {
        Ok(url) if url.origin().is_tuple() => url.origin().ascii_serialization(),
        _ => base.origin().ascii_serialization(),
    };
    format!("{origin}{JOB_PATH_MARKER}{id}")
}

/// Drop the query string and fragment from a URL.
#[must_use]
pub fn strip_query(href: &str) -> String {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    href[..end].to_string()
}

/// First candidate, in list order, whose label occurs in `blob`.
pub fn scan_keywords<T: Copy>(
    blob: &str,
    candidates: &[T],
    label: impl Fn(T) -> &'static str,
) -> Option<T> {
    candidates.iter().copied().find(|c| blob.contains(label(*c)))
}

fn missing(selector: &str, error: BrowserError) -> ExtractionFailure {
    match error {
        BrowserError::SelectorNotFound(_) => ExtractionFailure::Missing(selector.to_string()),
        other => ExtractionFailure::Browser(other),
    }
}

/// Field extraction for one item, bound to a driver and selector set.
pub struct RecordExtractor<'a, D: BrowserActions> {
    driver: &'a D,
    selectors: &'a SelectorSet,
    base_url: &'a Url,
}

impl<'a, D: BrowserActions> RecordExtractor<'a, D> {
    pub fn new(driver: &'a D, selectors: &'a SelectorSet, base_url: &'a Url) -> Self {
        Self {
            driver,
            selectors,
            base_url,
        }
    }

    /// Extract a record from a result card and, if it opened, its detail view.
    ///
    /// With `detail == None` every detail-only field is [`Field::Error`].
    pub async fn extract(&self, card: &D::Handle, detail: Option<&D::Handle>) -> Record {
        let source_url = self
            .attributes(FallbackChain::new("source_url"), card, &self.selectors.card_link, "href")
            .resolve()
            .await
            .map(|href| canonical_job_url(&href, self.base_url));

        let title = self
            .texts(FallbackChain::new("title"), card, &self.selectors.card_title)
            .resolve()
            .await
            .map(|raw| normalize_title(&raw));

        let mut organization =
            self.texts(FallbackChain::new("organization"), card, &self.selectors.card_organization);
        let mut location =
            self.texts(FallbackChain::new("location"), card, &self.selectors.card_location);
        if let Some(detail) = detail {
            organization = self.texts(organization, detail, &self.selectors.detail_organization);
            location = location.then(self.fragment(detail, 0));
        }

        let mut record = Record {
            source_url,
            title,
            organization: organization.resolve().await,
            location: location.resolve().await,
            ..Record::default()
        };
        self.fill_detail(&mut record, detail).await;
        record
    }

    /// Extract a record from a full-page posting layout.
    pub async fn extract_posting(&self, page_url: &str, detail: &D::Handle) -> Record {
        let title = self
            .texts(FallbackChain::new("title"), detail, &self.selectors.detail_title)
            .resolve()
            .await
            .map(|raw| normalize_title(&raw));
        let organization = self
            .texts(FallbackChain::new("organization"), detail, &self.selectors.detail_organization)
            .resolve()
            .await;
        let location = FallbackChain::new("location")
            .then(self.fragment(detail, 0))
            .resolve()
            .await;

        let mut record = Record {
            source_url: Field::Value(canonical_job_url(page_url, self.base_url)),
            title,
            organization,
            location,
            ..Record::default()
        };
        self.fill_detail(&mut record, Some(detail)).await;
        record
    }

    async fn fill_detail(&self, record: &mut Record, detail: Option<&D::Handle>) {
        let Some(detail) = detail else {
            record.organization_url = Field::Error;
            record.posted_at = Field::Error;
            record.applicant_count = Field::Error;
            record.description = Field::Error;
            record.benefits = Field::Error;
            record.workplace_mode = Field::Error;
            record.seniority = Field::Error;
            return;
        };

        record.organization_url = self
            .attributes(
                FallbackChain::new("organization_url"),
                detail,
                &self.selectors.detail_organization_link,
                "href",
            )
            .resolve()
            .await
            .map(|href| strip_query(&href));

        record.posted_at = FallbackChain::new("posted_at")
            .then(self.fragment(detail, 2))
            .then(self.phrase(detail, posted_phrase(), "posting age"))
            .resolve()
            .await;

        let applicants = FallbackChain::new("applicant_count").then(self.fragment(detail, 4));
        record.applicant_count = self
            .texts(applicants, detail, &self.selectors.detail_applicant_count)
            .then(self.phrase(detail, applicant_phrase(), "applicant count"))
            .resolve()
            .await;

        record.description = self
            .texts(FallbackChain::new("description"), detail, &self.selectors.detail_description)
            .resolve()
            .await;
        record.benefits = self
            .texts(FallbackChain::new("benefits"), detail, &self.selectors.detail_benefits)
            .resolve()
            .await;

        let insight = self.insight_blob(detail).await;
        record.workplace_mode = Field::from_option(scan_keywords(
            &insight,
            &WorkplaceMode::ALL,
            WorkplaceMode::label,
        ));
        record.seniority =
            Field::from_option(scan_keywords(&insight, &Seniority::ALL, Seniority::label));
    }

    fn texts<'s>(
        &'s self,
        chain: FallbackChain<'s>,
        scope: &'s D::Handle,
        selectors: &'s [String],
    ) -> FallbackChain<'s> {
        selectors
            .iter()
            .fold(chain, |chain, selector| chain.then(self.text_of(scope, selector)))
    }

    fn attributes<'s>(
        &'s self,
        chain: FallbackChain<'s>,
        scope: &'s D::Handle,
        selectors: &'s [String],
        attribute: &'static str,
    ) -> FallbackChain<'s> {
        selectors.iter().fold(chain, |chain, selector| {
            chain.then(self.attribute_of(scope, selector, attribute))
        })
    }

    async fn text_of(&self, scope: &D::Handle, selector: &str) -> Result<String, ExtractionFailure> {
        let element = self
            .driver
            .find_element(scope, selector)
            .await
            .map_err(|e| missing(selector, e))?;
        Ok(self.driver.text(&element).await?)
    }

    async fn attribute_of(
        &self,
        scope: &D::Handle,
        selector: &str,
        attribute: &'static str,
    ) -> Result<String, ExtractionFailure> {
        let element = self
            .driver
            .find_element(scope, selector)
            .await
            .map_err(|e| missing(selector, e))?;
        self.driver
            .attribute(&element, attribute)
            .await?
            .ok_or_else(|| ExtractionFailure::MissingAttribute {
                selector: selector.to_string(),
                attribute,
            })
    }

    /// Text of the `index`-th low-emphasis fragment of the primary description.
    async fn fragment(&self, detail: &D::Handle, index: usize) -> Result<String, ExtractionFailure> {
        for container in &self.selectors.detail_primary_description {
            let Ok(primary) = self.driver.find_element(detail, container).await else {
                continue;
            };
            for selector in &self.selectors.detail_description_fragment {
                let fragments = self.driver.find_all_elements(&primary, selector).await?;
                if let Some(fragment) = fragments.get(index) {
                    return Ok(self.driver.text(fragment).await?);
                }
            }
        }

        Err(ExtractionFailure::MissingFragment {
            selector: self.selectors.detail_primary_description.join(", "),
            index,
        })
    }

    /// First match of `pattern` in the primary description text.
    async fn phrase(
        &self,
        detail: &D::Handle,
        pattern: &'static Regex,
        what: &'static str,
    ) -> Result<String, ExtractionFailure> {
        let mut last_failure = ExtractionFailure::NoMatch(what);
        for container in &self.selectors.detail_primary_description {
            match self.text_of(detail, container).await {
                Ok(text) => {
                    if let Some(found) = pattern.find(&text) {
                        return Ok(found.as_str().to_string());
                    }
                }
                Err(e) => last_failure = e,
            }
        }
        Err(last_failure)
    }

    async fn insight_blob(&self, detail: &D::Handle) -> String {
        let mut parts = Vec::new();
        for selector in &self.selectors.detail_insight {
            let elements = match self.driver.find_all_elements(detail, selector).await {
                Ok(elements) => elements,
                Err(e) => {
                    tracing::debug!("insight selector {} failed: {}", selector, e);
                    continue;
                }
            };
            for element in &elements {
                if let Ok(text) = self.driver.text(element).await {
                    parts.push(text);
                }
            }
        }
        parts.join("\n")
    }
}
