use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::{CatalogEntry, NavTarget, ViewerContext};

/// Cards per row
pub const ITEMS_PER_ROW: usize = 6;
/// Rows shown by an expanded section
pub const EXPANDED_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Arrival order
    #[default]
    Default,
    TitleAsc,
    TitleDesc,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Recommended,
    Movies,
    Series,
}

impl Section {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "recommended" => Some(Section::Recommended),
            "movies" => Some(Section::Movies),
            "series" => Some(Section::Series),
            _ => None,
        }
    }
}

/// Independent expand flag per section
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub struct ExpandFlags {
    pub recommended: bool,
    pub movies: bool,
    pub series: bool,
}

impl ExpandFlags {
    pub fn get(&self, section: Section) -> bool {
        match section {
            Section::Recommended => self.recommended,
            Section::Movies => self.movies,
            Section::Series => self.series,
        }
    }

    fn set(mut self, section: Section, expanded: bool) -> Self {
        match section {
            Section::Recommended => self.recommended = expanded,
            Section::Movies => self.movies = expanded,
            Section::Series => self.series = expanded,
        }
        self
    }
}

/// Transient browse state: shared search and sort, per-section expansion
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct SectionState {
    pub search: String,
    pub sort: SortMode,
    pub expanded: ExpandFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionAction {
    SetSearch(String),
    SetSort(SortMode),
    Expand(Section),
    Collapse(Section),
    Toggle(Section),
}

impl SectionState {
    /// Pure state transition
    pub fn reduce(self, action: SectionAction) -> Self {
        match action {
            SectionAction::SetSearch(search) => Self { search, ..self },
            SectionAction::SetSort(sort) => Self { sort, ..self },
            SectionAction::Expand(section) => Self {
                expanded: self.expanded.set(section, true),
                ..self
            },
            SectionAction::Collapse(section) => Self {
                expanded: self.expanded.set(section, false),
                ..self
            },
            SectionAction::Toggle(section) => {
                let expanded = !self.expanded.get(section);
                Self {
                    expanded: self.expanded.set(section, expanded),
                    ..self
                }
            }
        }
    }

    pub fn reduce_all(self, actions: impl IntoIterator<Item = SectionAction>) -> Self {
        actions.into_iter().fold(self, Self::reduce)
    }

    fn search_term(&self) -> String {
        self.search.trim().to_lowercase()
    }
}

/// A card in a section, with the route selecting it leads to
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectionItem {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub target: Option<NavTarget>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectionView {
    pub section: Section,
    pub items: Vec<SectionItem>,
    /// Matches before pagination
    pub total: usize,
    pub expanded: bool,
    pub show_more: bool,
    pub show_less: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BrowseLayout {
    /// Present only when the viewer has any recommendations at all
    pub recommended: Option<SectionView>,
    pub movies: SectionView,
    pub series: SectionView,
    /// Nothing matched in any visible section
    pub no_content: bool,
}

/// Where selecting a card leads for this viewer.
///
/// Paid content sends non-subscribers to the subscription page; entries
/// without an id are otherwise not navigable.
pub fn card_target(entry: &CatalogEntry, viewer: &ViewerContext) -> Option<NavTarget> {
    if entry.is_paid() && !viewer.is_subscriber {
        return Some(NavTarget::Subscribe);
    }

    let content_id = entry.canonical_id()?;
    Some(if entry.is_series() {
        NavTarget::SeriesDetail { content_id }
    } else {
        NavTarget::Watch { content_id }
    })
}

/// Accent- and case-insensitive comparison. Ties break on accents, then on
/// case with lowercase first.
fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Primary collation key: lowercase, with diacritics stripped
fn fold(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Sort key; unlike search, sorting does not fall back to `name`
fn title_of(entry: &CatalogEntry) -> &str {
    entry.title.as_deref().unwrap_or("")
}

/// Applies the search term and sort mode, preserving arrival order by default
pub fn search_and_sort<'a>(
    entries: impl IntoIterator<Item = &'a CatalogEntry>,
    state: &SectionState,
) -> Vec<&'a CatalogEntry> {
    let term = state.search_term();
    let mut matched: Vec<&CatalogEntry> = entries
        .into_iter()
        .filter(|entry| {
            term.is_empty()
                || entry
                    .display_title()
                    .is_some_and(|title| title.to_lowercase().contains(&term))
        })
        .collect();

    match state.sort {
        SortMode::Default => {}
        SortMode::TitleAsc => matched.sort_by(|a, b| collate(title_of(a), title_of(b))),
        SortMode::TitleDesc => matched.sort_by(|a, b| collate(title_of(b), title_of(a))),
    }

    matched
}

/// Row pagination: one row collapsed, up to four rows expanded
pub fn visible_count(total: usize, expanded: bool) -> usize {
    let rows = if expanded { EXPANDED_ROWS } else { 1 };
    total.min(rows * ITEMS_PER_ROW)
}

fn section_view(
    section: Section,
    matched: Vec<&CatalogEntry>,
    state: &SectionState,
    viewer: &ViewerContext,
) -> SectionView {
    let expanded = state.expanded.get(section);
    let total = matched.len();

    let items = matched
        .into_iter()
        .take(visible_count(total, expanded))
        .map(|entry| SectionItem {
            entry: entry.clone(),
            target: card_target(entry, viewer),
        })
        .collect();

    SectionView {
        section,
        items,
        total,
        expanded,
        show_more: !expanded && total > ITEMS_PER_ROW,
        show_less: expanded,
    }
}

/// Lays out the recommended, movies and series sections
pub fn layout_sections(
    catalog: &[CatalogEntry],
    recommendations: &[CatalogEntry],
    state: &SectionState,
    viewer: &ViewerContext,
) -> BrowseLayout {
    let movies = search_and_sort(catalog.iter().filter(|e| e.is_movie()), state);
    let series = search_and_sort(catalog.iter().filter(|e| e.is_series()), state);

    let recommended = (!recommendations.is_empty()).then(|| {
        section_view(
            Section::Recommended,
            search_and_sort(recommendations, state),
            state,
            viewer,
        )
    });

    let movies = section_view(Section::Movies, movies, state, viewer);
    let series = section_view(Section::Series, series, state, viewer);

    let no_content = recommended.as_ref().map_or(true, |view| view.total == 0)
        && movies.total == 0
        && series.total == 0;

    BrowseLayout {
        recommended,
        movies,
        series,
        no_content,
    }
}
