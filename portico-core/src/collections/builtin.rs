//! Read contracts of the site's four public collections.

use portico_model::{QueryMode, SizePreference};

use super::spec::{
    CollectionSpec, DetailKey, MediaRule, ModeSpec, SearchParam, SizePolicy,
};
use crate::query::{Populate, PopulateEntry, SortKey};

use QueryMode::{Detail, Homepage, List, Searching};

/// Upload attributes fetched for every media field. `formats` is fetched so
/// the response shaper can pick a rendition; it never reaches the client.
pub const IMAGE_FIELDS: &[&str] = &[
    "url",
    "name",
    "caption",
    "alternativeText",
    "width",
    "height",
    "mime",
    "size",
    "formats",
];

const GRANT_SUMMARY_FIELDS: &[&str] = &[
    "project_title",
    "pi_name",
    "total_funding",
    "type_of_grants",
    "grant_scheme_name",
    "grant_code",
    "start_date",
    "end_date",
    "funder",
];

const PUBLICATION_HOMEPAGE_FIELDS: &[&str] = &[
    "title",
    "journal_name",
    "impact_factor",
    "indexing_classification",
    "doi_link",
];

const PUBLICATION_LIST_FIELDS: &[&str] = &[
    "title",
    "journal_name",
    "vol",
    "issue",
    "page_start",
    "page_end",
    "impact_factor",
    "indexing_classification",
    "publication_type",
    "doi_link",
    "publishedAt",
];

const NEWS_SUMMARY_FIELDS: &[&str] = &["title", "date"];

/// Grants larger than this (KB) get a `large` rendition on detail pages.
const GRAPHICAL_ABSTRACT_OVERSIZE_KB: f64 = 2000.0;

/// Collaborator logos larger than this (KB) are served untouched.
const LOGO_OVERSIZE_KB: f64 = 100.0;

pub fn grants() -> CollectionSpec {
    let summary = || {
        ModeSpec::new()
            .fields(GRANT_SUMMARY_FIELDS)
            .sort(SortKey::desc("start_date"))
    };
    let full_populate = Populate::relation(
        "collaborators",
        PopulateEntry::fields(&["id", "name", "link"]).populate(Populate::relation(
            "logo",
            PopulateEntry::fields(IMAGE_FIELDS),
        )),
    )
    .and("graphical_abstract", PopulateEntry::fields(IMAGE_FIELDS))
    .and("team_members", PopulateEntry::all())
    .and("project_output", PopulateEntry::all().populate(Populate::All))
    .and(
        "publications",
        PopulateEntry::fields(&[
            "id",
            "title",
            "journal_name",
            "impact_factor",
            "indexing_classification",
        ]),
    );

    CollectionSpec::builder("grants-n-projects", "/api/grants-n-projects")
        .detail_key(DetailKey::DocumentId)
        .homepage(summary().page_size(8))
        .list(summary())
        .detail(ModeSpec::new().populate(full_populate))
        .searching(summary())
        .search(SearchParam::text("pi_name", &["pi_name"]))
        .search(SearchParam::text("title", &["project_title", "grant_scheme_name"]))
        .search(SearchParam::year("year", &["start_date", "end_date"]))
        .media(
            MediaRule::field("graphical_abstract")
                .when(
                    &[Homepage, List, Searching],
                    SizePolicy::Fixed(SizePreference::Small),
                )
                .when(
                    &[Detail],
                    SizePolicy::Oversize {
                        threshold_kb: GRAPHICAL_ABSTRACT_OVERSIZE_KB,
                        above: SizePreference::Large,
                        otherwise: SizePreference::Original,
                    },
                ),
        )
        .media(
            MediaRule::nested("collaborators", "logo").when(
                &[Homepage, List, Searching, Detail],
                SizePolicy::Fixed(SizePreference::Small),
            ),
        )
        .build()
}

pub fn publications() -> CollectionSpec {
    let populate = || {
        Populate::relation("author", PopulateEntry::all())
            .and("cover_picture", PopulateEntry::fields(IMAGE_FIELDS))
    };
    let by_impact = || ModeSpec::new().populate(populate()).sort(SortKey::desc("impact_factor"));

    CollectionSpec::builder("publics", "/api/publics")
        .detail_key(DetailKey::Id)
        .homepage(by_impact().fields(PUBLICATION_HOMEPAGE_FIELDS).page_size(5))
        .list(by_impact().fields(PUBLICATION_LIST_FIELDS))
        .detail(ModeSpec::new().populate(populate()))
        .searching(by_impact().fields(PUBLICATION_LIST_FIELDS))
        .search(SearchParam::text("title", &["title", "journal_name"]))
        .search(SearchParam::exact("classification", "indexing_classification"))
        .search(SearchParam::exact("type", "publication_type"))
        .search(SearchParam::year("year", &["publishedAt"]))
        .media(
            MediaRule::field("cover_picture")
                .when(
                    &[Homepage, List, Searching],
                    SizePolicy::Fixed(SizePreference::Small),
                )
                .when(&[Detail], SizePolicy::Fixed(SizePreference::Large)),
        )
        .build()
}

pub fn news() -> CollectionSpec {
    let cover = || Populate::relation("cover_picture", PopulateEntry::fields(IMAGE_FIELDS));
    let summary = || {
        ModeSpec::new()
            .fields(NEWS_SUMMARY_FIELDS)
            .populate(cover())
            .sort(SortKey::desc("date"))
    };

    CollectionSpec::builder("news", "/api/news")
        .detail_key(DetailKey::DocumentId)
        .homepage(summary().page_size(3))
        .list(summary())
        .detail(
            ModeSpec::new()
                .fields(&["title", "date", "news_content"])
                .populate(cover()),
        )
        .searching(summary())
        .search(SearchParam::text("title", &["title"]))
        .search(SearchParam::year("year", &["date"]))
        .media(
            MediaRule::field("cover_picture")
                .when(
                    &[Homepage, List, Searching],
                    SizePolicy::Fixed(SizePreference::Small),
                )
                .when(&[Detail], SizePolicy::Fixed(SizePreference::Large)),
        )
        .build()
}

pub fn collaborators() -> CollectionSpec {
    let logo = || Populate::relation("logo", PopulateEntry::fields(IMAGE_FIELDS));

    CollectionSpec::builder("collaborators", "/api/collaborators")
        .detail_key(DetailKey::DocumentId)
        .homepage(ModeSpec::new().fields(&["name"]).populate(logo()).page_size(100))
        .detail(
            ModeSpec::new()
                .fields(&["name", "link", "description"])
                .populate(logo().and(
                    "grants_and_projects",
                    PopulateEntry::fields(&[
                        "id",
                        "project_title",
                        "grant_scheme_name",
                        "grant_code",
                        "pi_name",
                        "start_date",
                        "end_date",
                        "total_funding",
                    ]),
                )),
        )
        .media(
            MediaRule::field("logo")
                .when(
                    &[Homepage],
                    SizePolicy::Oversize {
                        threshold_kb: LOGO_OVERSIZE_KB,
                        above: SizePreference::Original,
                        otherwise: SizePreference::Large,
                    },
                )
                .when(&[Detail], SizePolicy::Fixed(SizePreference::Original)),
        )
        .build()
}
