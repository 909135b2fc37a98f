//! The resource registry: one [`ResourceSpec`] per backend entity type.
//!
//! Each UI path and API base appears exactly once here. The route table and
//! the screens are both generated from this list, so a resource cannot end
//! up with duplicate or drifting route registrations.

use crate::schema::{FieldKind, FieldSpec, ResourceSpec};

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Text,
        required: true,
        max_len: None,
    }
}

pub const HELP_REQUEST: ResourceSpec = ResourceSpec {
    key: "helprequest",
    title: "Help Requests",
    api_base: "/api/helprequest",
    ui_path: "/helprequest",
    id_field: "id",
    fields: &[
        FieldSpec {
            name: "requesterEmail",
            label: "Requester Email",
            kind: FieldKind::Email,
            required: true,
            max_len: None,
        },
        text("teamId", "Team ID"),
        FieldSpec {
            name: "tableOrBreakoutRoom",
            label: "Table/Breakout Room",
            kind: FieldKind::Text,
            required: true,
            max_len: Some(100),
        },
        FieldSpec {
            name: "requestTime",
            label: "Request Time (UTC)",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "explanation",
            label: "Explanation",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
        FieldSpec {
            name: "solved",
            label: "Solved",
            kind: FieldKind::Bool,
            required: false,
            max_len: None,
        },
    ],
};

pub const MENU_ITEM_REVIEW: ResourceSpec = ResourceSpec {
    key: "menuitemreview",
    title: "Menu Item Reviews",
    api_base: "/api/menuitemreview",
    ui_path: "/menuitemreviews",
    id_field: "id",
    fields: &[
        FieldSpec {
            name: "itemId",
            label: "Item ID",
            kind: FieldKind::Int {
                min: 1,
                max: i64::MAX,
            },
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "reviewerEmail",
            label: "Reviewer Email",
            kind: FieldKind::Email,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "stars",
            label: "Stars",
            kind: FieldKind::Int { min: 1, max: 5 },
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "dateReviewed",
            label: "Date Reviewed",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "comments",
            label: "Comments",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
    ],
};

pub const RECOMMENDATION_REQUEST: ResourceSpec = ResourceSpec {
    key: "recommendationrequest",
    title: "Recommendation Requests",
    api_base: "/api/recommendationrequest",
    ui_path: "/recommendationrequests",
    id_field: "id",
    fields: &[
        FieldSpec {
            name: "requesterEmail",
            label: "Requester Email",
            kind: FieldKind::Email,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "professorEmail",
            label: "Professor Email",
            kind: FieldKind::Email,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "explanation",
            label: "Explanation",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
        FieldSpec {
            name: "dateRequested",
            label: "Date Requested",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "dateNeeded",
            label: "Date Needed",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "done",
            label: "Done",
            kind: FieldKind::Bool,
            required: false,
            max_len: None,
        },
    ],
};

pub const ORGANIZATION: ResourceSpec = ResourceSpec {
    key: "organization",
    title: "Organizations",
    api_base: "/api/ucsborganizations",
    ui_path: "/organizations",
    id_field: "orgCode",
    fields: &[
        text("orgCode", "Org Code"),
        text("orgTranslationShort", "Short Translation"),
        text("orgTranslation", "Translation"),
        FieldSpec {
            name: "inactive",
            label: "Inactive",
            kind: FieldKind::Bool,
            required: false,
            max_len: None,
        },
    ],
};

pub const CAMPUS_DATE: ResourceSpec = ResourceSpec {
    key: "campusdate",
    title: "Campus Dates",
    api_base: "/api/ucsbdates",
    ui_path: "/campusdates",
    id_field: "id",
    fields: &[
        text("quarterYYYYQ", "Quarter YYYYQ"),
        text("name", "Name"),
        FieldSpec {
            name: "localDateTime",
            label: "Date (ISO)",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
    ],
};

pub const ARTICLE: ResourceSpec = ResourceSpec {
    key: "article",
    title: "Articles",
    api_base: "/api/articles",
    ui_path: "/articles",
    id_field: "id",
    fields: &[
        text("title", "Title"),
        FieldSpec {
            name: "url",
            label: "URL",
            kind: FieldKind::Url,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "explanation",
            label: "Explanation",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
        FieldSpec {
            name: "email",
            label: "Email",
            kind: FieldKind::Email,
            required: true,
            max_len: None,
        },
        FieldSpec {
            name: "dateAdded",
            label: "Date Added",
            kind: FieldKind::DateTime,
            required: true,
            max_len: None,
        },
    ],
};

pub const DINING_MENU_ITEM: ResourceSpec = ResourceSpec {
    key: "diningmenuitem",
    title: "Dining Menu Items",
    api_base: "/api/ucsbdiningcommonsmenuitem",
    ui_path: "/diningmenuitems",
    id_field: "id",
    fields: &[
        text("diningCommonsCode", "Dining Commons"),
        text("name", "Name"),
        text("station", "Station"),
    ],
};

pub const RESTAURANT: ResourceSpec = ResourceSpec {
    key: "restaurant",
    title: "Restaurants",
    api_base: "/api/restaurants",
    ui_path: "/restaurants",
    id_field: "id",
    fields: &[
        text("name", "Name"),
        FieldSpec {
            name: "description",
            label: "Description",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
    ],
};

pub const PLACEHOLDER: ResourceSpec = ResourceSpec {
    key: "placeholder",
    title: "Placeholders",
    api_base: "/api/placeholder",
    ui_path: "/placeholder",
    id_field: "id",
    fields: &[
        text("name", "Name"),
        FieldSpec {
            name: "description",
            label: "Description",
            kind: FieldKind::LongText,
            required: true,
            max_len: Some(255),
        },
    ],
};

/// Every registered resource, in navigation order.
pub fn all() -> &'static [ResourceSpec] {
    &[
        HELP_REQUEST,
        MENU_ITEM_REVIEW,
        RECOMMENDATION_REQUEST,
        ORGANIZATION,
        CAMPUS_DATE,
        ARTICLE,
        DINING_MENU_ITEM,
        RESTAURANT,
        PLACEHOLDER,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn registry_paths_are_unique() {
        let specs = all();
        let ui: HashSet<_> = specs.iter().map(|s| s.ui_path).collect();
        let api: HashSet<_> = specs.iter().map(|s| s.api_base).collect();
        let keys: HashSet<_> = specs.iter().map(|s| s.key).collect();
        assert_eq!(ui.len(), specs.len());
        assert_eq!(api.len(), specs.len());
        assert_eq!(keys.len(), specs.len());
    }

    #[test]
    fn derived_urls() {
        assert_eq!(HELP_REQUEST.list_url(), "/api/helprequest/all");
        assert_eq!(HELP_REQUEST.post_url(), "/api/helprequest/post");
        assert_eq!(HELP_REQUEST.item_url(), "/api/helprequest");
    }

    #[test]
    fn id_fields_exist_outside_schema_only_for_generated_ids() {
        // orgCode is both the identifier and an editable field; numeric ids
        // are server-generated and never appear in the field list.
        for spec in all() {
            if spec.id_field == "id" {
                assert!(spec.field("id").is_none(), "{}", spec.key);
            } else {
                assert!(spec.field(spec.id_field).is_some(), "{}", spec.key);
            }
        }
    }
}
