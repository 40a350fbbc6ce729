//! CSS selector chains for the job search result layout.
//!
//! Every list is ordered: the first selector is the current layout, later
//! entries are older or alternate renderings tried as fallbacks.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    // Result list page
    pub results_list: Vec<String>,
    pub item_card: Vec<String>,
    pub card_title: Vec<String>,
    pub card_link: Vec<String>,
    pub card_organization: Vec<String>,
    pub card_location: Vec<String>,

    // Detail view (right pane, or the full posting page)
    pub detail_root: Vec<String>,
    pub detail_title: Vec<String>,
    pub detail_organization: Vec<String>,
    pub detail_organization_link: Vec<String>,
    pub detail_primary_description: Vec<String>,
    pub detail_description_fragment: Vec<String>,
    pub detail_applicant_count: Vec<String>,
    pub detail_insight: Vec<String>,
    pub detail_description: Vec<String>,
    pub detail_benefits: Vec<String>,

    // Pagination
    /// `{page}` is replaced with the 1-based page number
    pub numbered_page_button: Vec<String>,
    pub next_page_button: Vec<String>,
    pub pagination_container: Vec<String>,
    pub pagination_button: String,
    pub next_labels: Vec<String>,

    // Jobs home board
    pub board_root: Vec<String>,
    pub board_area: Vec<String>,
    pub board_item: Vec<String>,
}

fn owned(selectors: &[&str]) -> Vec<String> {
    selectors.iter().map(ToString::to_string).collect()
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            results_list: owned(&[
                ".scaffold-layout__list > div",
                ".scaffold-layout__list",
                ".jobs-search-results-list",
            ]),
            item_card: owned(&[
                "li.scaffold-layout__list-item",
                ".job-card-list",
                "li.jobs-search-results__list-item",
            ]),
            card_title: owned(&[
                ".artdeco-entity-lockup__title",
                ".job-card-list__title",
                ".job-card-list__title--link",
            ]),
            card_link: owned(&[
                ".artdeco-entity-lockup__title a",
                "a.job-card-container__link",
                "a.job-card-list__title",
            ]),
            card_organization: owned(&[
                ".artdeco-entity-lockup__subtitle",
                ".job-card-container__primary-description",
                ".job-card-container__company-name",
            ]),
            card_location: owned(&[
                ".job-card-container__metadata-wrapper",
                ".artdeco-entity-lockup__caption",
                ".job-card-container__metadata-item",
            ]),
            detail_root: owned(&[
                ".jobs-search__job-details--container",
                ".jobs-details",
                ".job-view-layout",
            ]),
            detail_title: owned(&[
                ".job-details-jobs-unified-top-card__job-title",
                ".jobs-unified-top-card__job-title",
            ]),
            detail_organization: owned(&[
                ".job-details-jobs-unified-top-card__company-name",
                ".jobs-unified-top-card__company-name",
            ]),
            detail_organization_link: owned(&[
                ".job-details-jobs-unified-top-card__company-name a",
                ".jobs-unified-top-card__company-name a",
            ]),
            detail_primary_description: owned(&[
                ".job-details-jobs-unified-top-card__primary-description-container",
                ".job-details-jobs-unified-top-card__tertiary-description-container",
                ".jobs-unified-top-card__primary-description",
            ]),
            detail_description_fragment: owned(&[".tvm__text--low-emphasis", "span"]),
            detail_applicant_count: owned(&[".jobs-unified-top-card__applicant-count"]),
            detail_insight: owned(&[
                ".job-details-jobs-unified-top-card__job-insight",
                ".job-details-preferences-and-skills",
                ".job-details-fit-level-preferences",
            ]),
            detail_description: owned(&["#job-details", ".jobs-description__content"]),
            detail_benefits: owned(&[
                ".jobs-unified-description__salary-main-rail-card",
                "#SALARY",
            ]),
            numbered_page_button: owned(&[
                "li[data-test-pagination-page-btn='{page}'] button",
                "button[aria-label='Page {page}']",
            ]),
            next_page_button: owned(&[
                "button.jobs-search-pagination__button--next",
                "button[aria-label='View next page']",
            ]),
            pagination_container: owned(&[".jobs-search-pagination", ".artdeco-pagination"]),
            pagination_button: "button".to_string(),
            next_labels: owned(&["Next", "Suivant"]),
            board_root: owned(&[".scaffold-finite-scroll__content"]),
            board_area: owned(&[".artdeco-card"]),
            board_item: owned(&[".jobs-job-board-list__item"]),
        }
    }
}

impl SelectorSet {
    /// Numbered page button selectors for a 1-based page number.
    #[must_use]
    pub fn numbered_page(&self, page_number: usize) -> Vec<String> {
        self.numbered_page_button
            .iter()
            .map(|template| template.replace("{page}", &page_number.to_string()))
            .collect()
    }
}
