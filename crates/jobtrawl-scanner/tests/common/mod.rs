// Shared fixtures: an in-memory job board implementing BrowserActions.

#![allow(dead_code)]

use jobtrawl_browser::{BrowserActions, BrowserError, Result};
use jobtrawl_core::SearchQuery;
use jobtrawl_scanner::{DelayKind, Pacer, SelectorSet};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const JOBS_HOME: &str = "https://www.linkedin.com/jobs/";

pub fn query() -> SearchQuery {
    SearchQuery::new("Data Engineer", 90_009_834).expect("valid query")
}

pub fn fake_selectors() -> SelectorSet {
    fn one(selector: &str) -> Vec<String> {
        vec![selector.to_string()]
    }

    SelectorSet {
        results_list: vec!["#results".to_string(), "#results-legacy".to_string()],
        item_card: one("li.card"),
        card_title: vec![".card-title-v2".to_string(), ".card-title".to_string()],
        card_link: one(".card-link"),
        card_organization: one(".card-org"),
        card_location: one(".card-loc"),
        detail_root: one("#detail"),
        detail_title: one(".d-title"),
        detail_organization: one(".d-org"),
        detail_organization_link: one(".d-org-link"),
        detail_primary_description: one(".d-primary"),
        detail_description_fragment: one(".d-frag"),
        detail_applicant_count: one(".d-applicants"),
        detail_insight: one(".d-insight"),
        detail_description: one(".d-desc"),
        detail_benefits: one(".d-benefits"),
        numbered_page_button: one("button[data-page='{page}']"),
        next_page_button: one("button.next"),
        pagination_container: one(".pagination"),
        pagination_button: "button".to_string(),
        next_labels: vec!["Next".to_string(), "Suivant".to_string()],
        board_root: one("#board"),
        board_area: one(".area"),
        board_item: one("li.card"),
    }
}

/// One synthetic job posting.
#[derive(Debug, Clone)]
pub struct Posting {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub posted: String,
    pub applicants: String,
    pub description: String,
    pub benefits: String,
    pub insight: String,
    /// Clicking the card fails, so the detail view never opens
    pub broken_detail: bool,
    /// Clicking the card succeeds but leaves the detail view untouched
    pub inert_click: bool,
    /// Rendered parts to leave out of the DOM
    pub missing: Vec<&'static str>,
}

impl Posting {
    pub fn synthetic(n: usize) -> Self {
        Self {
            id: format!("{}", 3_900_000_000_usize + n),
            title: format!("Data Engineer {n}"),
            organization: format!("Acme {n}"),
            location: "Warsaw, Mazowieckie, Poland".to_string(),
            posted: "2 days ago".to_string(),
            applicants: "87 applicants".to_string(),
            description: format!("Build pipelines for team {n}."),
            benefits: "PLN 20,000/month - 25,000/month".to_string(),
            insight: "Hybrid\nFull-time · Mid-Senior level".to_string(),
            broken_detail: false,
            inert_click: false,
            missing: Vec::new(),
        }
    }

    pub fn broken(mut self) -> Self {
        self.broken_detail = true;
        self
    }

    pub fn inert(mut self) -> Self {
        self.inert_click = true;
        self
    }

    pub fn without(mut self, parts: &[&'static str]) -> Self {
        self.missing.extend_from_slice(parts);
        self
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn canonical_url(&self) -> String {
        format!("https://www.linkedin.com/jobs/view/{}", self.id)
    }

    fn has(&self, part: &str) -> bool {
        !self.missing.iter().any(|m| *m == part)
    }
}

/// Postings `start..end` as one result page.
pub fn page(range: std::ops::Range<usize>) -> Vec<Posting> {
    range.map(Posting::synthetic).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NextStyle {
    /// Dedicated next button
    #[default]
    Button,
    /// Numbered button for the following page only
    Numbered,
    /// Plain buttons in the pagination bar, next one labelled
    Labelled(&'static str),
    /// Next button rendered but disabled
    Disabled,
    /// No pagination at all
    Hidden,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    pub pages: Vec<Vec<Posting>>,
    pub next_style: NextStyle,
    pub broken_next_click: bool,
    /// URL navigation to this result page always fails
    pub fail_navigation_at: Option<usize>,
    /// Card clicks after this many succeed drop the session
    pub lose_session_after_clicks: Option<usize>,
    pub board: Vec<Vec<Posting>>,
}

impl FakeSite {
    pub fn with_pages(pages: Vec<Vec<Posting>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum OnClick {
    Nothing,
    OpenDetail(Box<Posting>),
    Fail,
    NextPage,
}

#[derive(Debug)]
struct Node {
    tag: String,
    text: String,
    attrs: HashMap<String, String>,
    children: Vec<NodeId>,
    alive: bool,
    on_click: OnClick,
}

#[derive(Debug, Default)]
struct Dom {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Dom {
    fn node(&mut self, tag: &str, text: &str) -> NodeId {
        self.nodes.push(Node {
            tag: tag.to_string(),
            text: text.to_string(),
            attrs: HashMap::new(),
            children: Vec::new(),
            alive: true,
            on_click: OnClick::Nothing,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn root(&mut self, tag: &str, text: &str) -> NodeId {
        let id = self.node(tag, text);
        self.roots.push(id);
        id
    }

    fn child(&mut self, parent: NodeId, tag: &str, text: &str) -> NodeId {
        let id = self.node(tag, text);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id.0]
            .attrs
            .insert(name.to_string(), value.to_string());
    }

    fn on_click(&mut self, id: NodeId, action: OnClick) {
        self.nodes[id.0].on_click = action;
    }

    fn clear(&mut self) {
        for node in &mut self.nodes {
            node.alive = false;
        }
        self.roots.clear();
    }

    fn remove(&mut self, id: NodeId) {
        self.nodes[id.0].alive = false;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.remove(child);
        }
        self.roots.retain(|r| *r != id);
    }

    fn alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|n| n.alive)
    }

    fn collect(&self, from: &[NodeId], selector: &str, out: &mut Vec<NodeId>) {
        for &id in from {
            let node = &self.nodes[id.0];
            if !node.alive {
                continue;
            }
            if node.tag == selector {
                out.push(id);
            }
            self.collect(&node.children, selector, out);
        }
    }

    fn select(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        match scope {
            Some(parent) => self.collect(&self.nodes[parent.0].children, selector, &mut out),
            None => self.collect(&self.roots, selector, &mut out),
        }
        out
    }
}

#[derive(Debug, Default)]
struct State {
    dom: Dom,
    url: String,
    current_page: Option<usize>,
    detail: Option<NodeId>,
    navigations: Vec<String>,
    card_clicks: usize,
    next_clicks: usize,
    scrolls: usize,
    session_lost: bool,
}

/// In-memory job board driven through [`BrowserActions`].
pub struct FakeBrowser {
    site: FakeSite,
    state: Mutex<State>,
}

impl FakeBrowser {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site,
            state: Mutex::new(State::default()),
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock().navigations.clone()
    }

    pub fn next_clicks(&self) -> usize {
        self.lock().next_clicks
    }

    pub fn scrolls(&self) -> usize {
        self.lock().scrolls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake browser state poisoned")
    }

    fn live(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        let state = self.lock();
        if state.session_lost {
            return Err(BrowserError::SessionLost("target closed".to_string()));
        }
        Ok(state)
    }

    fn render_search(&self, state: &mut State, page_index: usize) {
        state.dom.clear();
        state.detail = None;
        state.current_page = Some(page_index);

        let list = state.dom.root("#results", "");
        for posting in self.site.pages.get(page_index).into_iter().flatten() {
            render_card(&mut state.dom, list, posting);
        }

        if page_index + 1 >= self.site.pages.len() {
            return;
        }
        let dom = &mut state.dom;
        match &self.site.next_style {
            NextStyle::Button => {
                let next = dom.root("button.next", "Next");
                dom.on_click(next, OnClick::NextPage);
            }
            NextStyle::Numbered => {
                let label = (page_index + 2).to_string();
                let next = dom.root(&format!("button[data-page='{label}']"), &label);
                dom.on_click(next, OnClick::NextPage);
            }
            NextStyle::Labelled(label) => {
                let bar = dom.root(".pagination", "");
                dom.child(bar, "button", "1");
                dom.child(bar, "button", "2");
                let next = dom.child(bar, "button", &format!(" {label} "));
                dom.on_click(next, OnClick::NextPage);
            }
            NextStyle::Disabled => {
                let next = dom.root("button.next", "Next");
                dom.set_attr(next, "disabled", "");
            }
            NextStyle::Hidden => {}
        }
    }

    fn render_board(&self, state: &mut State) {
        state.dom.clear();
        state.detail = None;
        state.current_page = None;

        let board = state.dom.root("#board", "");
        for area_postings in &self.site.board {
            let area = state.dom.child(board, ".area", "");
            for posting in area_postings {
                render_card(&mut state.dom, area, posting);
            }
        }
    }

    fn render_posting(&self, state: &mut State, id: &str) {
        state.dom.clear();
        state.current_page = None;
        let posting = self
            .site
            .pages
            .iter()
            .chain(&self.site.board)
            .flatten()
            .find(|p| p.id == id);
        state.detail = posting.map(|p| render_detail(&mut state.dom, p));
    }
}

fn render_card(dom: &mut Dom, parent: NodeId, posting: &Posting) {
    let card = dom.child(parent, "li.card", "");
    let action = if posting.broken_detail {
        OnClick::Fail
    } else if posting.inert_click {
        OnClick::Nothing
    } else {
        OnClick::OpenDetail(Box::new(posting.clone()))
    };
    dom.on_click(card, action);

    if posting.has("card_title") {
        let text = format!("{0}\n{0} with verification", posting.title);
        dom.child(card, ".card-title", &text);
    }
    if posting.has("card_link") {
        let link = dom.child(card, ".card-link", &posting.title);
        let href = format!(
            "https://www.linkedin.com/jobs/view/{}/?eBP=CwEAAAGR&refId=abc%3D%3D&trackingId=xyz",
            posting.id
        );
        dom.set_attr(link, "href", &href);
    }
    if posting.has("card_org") {
        dom.child(card, ".card-org", &posting.organization);
    }
    if posting.has("card_location") {
        dom.child(card, ".card-loc", &posting.location);
    }
}

fn render_detail(dom: &mut Dom, posting: &Posting) -> NodeId {
    let root = dom.root("#detail", "");
    dom.child(root, ".d-title", &format!("{} with verification", posting.title));

    if posting.has("detail_org") {
        let org = dom.child(root, ".d-org", &posting.organization);
        if posting.has("org_link") {
            let link = dom.child(org, ".d-org-link", &posting.organization);
            let slug = posting.organization.to_lowercase().replace(' ', "-");
            let href = format!("https://www.linkedin.com/company/{slug}/life?trk=job-details");
            dom.set_attr(link, "href", &href);
        }
    }

    if posting.has("primary") {
        let summary = format!(
            "{} · {} · {}",
            posting.location, posting.posted, posting.applicants
        );
        let primary = dom.child(root, ".d-primary", &summary);
        if posting.has("fragments") {
            for fragment in [
                posting.location.as_str(),
                "·",
                posting.posted.as_str(),
                "·",
                posting.applicants.as_str(),
            ] {
                dom.child(primary, ".d-frag", fragment);
            }
        }
    }

    if posting.has("insight") {
        dom.child(root, ".d-insight", &posting.insight);
    }
    if posting.has("description") {
        dom.child(root, ".d-desc", &posting.description);
    }
    if posting.has("benefits") {
        dom.child(root, ".d-benefits", &posting.benefits);
    }
    root
}

fn page_from_url(url: &str) -> usize {
    url.split('&')
        .find_map(|param| param.strip_prefix("start="))
        .and_then(|start| start.parse::<usize>().ok())
        .unwrap_or(0)
        / 25
}

#[async_trait::async_trait]
impl BrowserActions for FakeBrowser {
    type Handle = NodeId;

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.live()?;
        state.navigations.push(url.to_string());

        let Some(rest) = url.strip_prefix(JOBS_HOME) else {
            return Err(BrowserError::NavigationError(format!("unknown host: {url}")));
        };

        if rest.is_empty() {
            self.render_board(&mut state);
        } else if rest.starts_with("search?") {
            let page_index = page_from_url(url);
            if self.site.fail_navigation_at == Some(page_index) {
                return Err(BrowserError::Timeout(format!("navigation to {url}")));
            }
            self.render_search(&mut state, page_index);
        } else if let Some(view) = rest.strip_prefix("view/") {
            let id = view.split(['/', '?']).next().unwrap_or_default().to_string();
            self.render_posting(&mut state, &id);
        } else {
            return Err(BrowserError::NavigationError(format!("no route for {url}")));
        }

        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.live()?.url.clone())
    }

    async fn wait_for_element(
        &self,
        selector: &str,
        scope: Option<&NodeId>,
        _timeout: Duration,
    ) -> Result<NodeId> {
        let state = self.live()?;
        if let Some(scope) = scope {
            if !state.dom.alive(*scope) {
                return Err(BrowserError::StaleElement(selector.to_string()));
            }
        }
        let found = state.dom.select(scope.copied(), selector);
        found
            .first()
            .copied()
            .ok_or_else(|| BrowserError::Timeout(selector.to_string()))
    }

    async fn wait_for_all_elements(
        &self,
        selector: &str,
        scope: Option<&NodeId>,
        _timeout: Duration,
    ) -> Result<Vec<NodeId>> {
        let state = self.live()?;
        let found = state.dom.select(scope.copied(), selector);
        if found.is_empty() {
            return Err(BrowserError::Timeout(selector.to_string()));
        }
        Ok(found)
    }

    async fn find_element(&self, scope: &NodeId, selector: &str) -> Result<NodeId> {
        self.find_all_elements(scope, selector)
            .await?
            .first()
            .copied()
            .ok_or_else(|| BrowserError::SelectorNotFound(selector.to_string()))
    }

    async fn find_all_elements(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let state = self.live()?;
        if !state.dom.alive(*scope) {
            return Err(BrowserError::StaleElement(selector.to_string()));
        }
        Ok(state.dom.select(Some(*scope), selector))
    }

    async fn text(&self, handle: &NodeId) -> Result<String> {
        let state = self.live()?;
        if !state.dom.alive(*handle) {
            return Err(BrowserError::StaleElement("text".to_string()));
        }
        Ok(state.dom.nodes[handle.0].text.clone())
    }

    async fn attribute(&self, handle: &NodeId, name: &str) -> Result<Option<String>> {
        let state = self.live()?;
        if !state.dom.alive(*handle) {
            return Err(BrowserError::StaleElement(name.to_string()));
        }
        Ok(state.dom.nodes[handle.0].attrs.get(name).cloned())
    }

    async fn click(&self, handle: &NodeId) -> Result<()> {
        let mut state = self.live()?;
        if !state.dom.alive(*handle) {
            return Err(BrowserError::StaleElement("click".to_string()));
        }

        match state.dom.nodes[handle.0].on_click.clone() {
            OnClick::Nothing => Ok(()),
            OnClick::Fail => Err(BrowserError::ChromiumError(
                "element is not clickable at point".to_string(),
            )),
            OnClick::OpenDetail(posting) => {
                if self
                    .site
                    .lose_session_after_clicks
                    .is_some_and(|limit| state.card_clicks >= limit)
                {
                    state.session_lost = true;
                    return Err(BrowserError::SessionLost("target closed".to_string()));
                }
                state.card_clicks += 1;
                if let Some(previous) = state.detail.take() {
                    state.dom.remove(previous);
                }
                if posting.has("detail_root") {
                    state.detail = Some(render_detail(&mut state.dom, &posting));
                }
                Ok(())
            }
            OnClick::NextPage => {
                if self.site.broken_next_click {
                    return Err(BrowserError::ChromiumError(
                        "other element would receive the click".to_string(),
                    ));
                }
                state.next_clicks += 1;
                let next_page = state.current_page.map_or(0, |p| p + 1);
                self.render_search(&mut state, next_page);
                state.url = format!("{JOBS_HOME}search?clicked&start={}", next_page * 25);
                Ok(())
            }
        }
    }

    async fn scroll_viewport(&self, _fraction: f64) -> Result<()> {
        self.live()?.scrolls += 1;
        Ok(())
    }

    async fn wait_for_stale(&self, handle: &NodeId, _timeout: Duration) -> Result<bool> {
        Ok(!self.live()?.dom.alive(*handle))
    }
}

/// Records every delay instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    calls: Mutex<Vec<DelayKind>>,
}

impl RecordingPacer {
    pub fn count(&self, kind: DelayKind) -> usize {
        self.calls
            .lock()
            .expect("pacer log poisoned")
            .iter()
            .filter(|k| **k == kind)
            .count()
    }

    pub fn calls(&self) -> Vec<DelayKind> {
        self.calls.lock().expect("pacer log poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Pacer for RecordingPacer {
    async fn delay(&self, kind: DelayKind) {
        self.calls.lock().expect("pacer log poisoned").push(kind);
    }
}
