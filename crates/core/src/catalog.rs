//! Compiled-in entity catalog for the admin dashboard.
//!
//! Lookup tables come first so content descriptors can reference them.

use crate::schema::{ColumnDef, DeleteMode, EntityDescriptor, EntityKind};

const LOOKUP_COLUMNS: &[ColumnDef] = &[ColumnDef::text("value").searchable()];

/// Single-value reference tables feeding dropdowns.
pub const LOOKUP_TABLES: &[&str] = &[
    "industries",
    "categories",
    "capacities",
    "locations",
    "expertise_areas",
    "solution_categories",
];

const CONSULTANTS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::text("email").optional().searchable(),
    ColumnDef::text("phone").optional(),
    ColumnDef::text("company").optional().searchable(),
    ColumnDef::text("designation").optional(),
    ColumnDef::reference("industry_id", "industries").optional(),
    ColumnDef::reference("expertise_area_id", "expertise_areas").optional(),
    ColumnDef::reference("location_id", "locations").optional(),
    ColumnDef::integer("experience_years").optional(),
    ColumnDef::text("bio").optional(),
    ColumnDef::text("image_url").optional(),
    ColumnDef::text("linkedin_url").optional(),
    ColumnDef::json("services").optional(),
    ColumnDef::boolean("is_approved").optional(),
];

const SPEAKERS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::text("company").optional().searchable(),
    ColumnDef::text("designation").optional(),
    ColumnDef::reference("industry_id", "industries").optional(),
    ColumnDef::text("bio").optional(),
    ColumnDef::text("image_url").optional(),
    ColumnDef::text("linkedin_url").optional(),
    ColumnDef::json("topics").optional(),
];

const VENUE_PARTNERS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::reference("location_id", "locations").optional(),
    ColumnDef::text("address").optional().searchable(),
    ColumnDef::reference("capacity_id", "capacities").optional(),
    ColumnDef::text("email").optional(),
    ColumnDef::text("phone").optional(),
    ColumnDef::text("website").optional(),
    ColumnDef::json("amenities").optional(),
    ColumnDef::json("image_urls").optional(),
    ColumnDef::boolean("is_approved").optional(),
];

const EXCLUSIVE_PARTNERS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::reference("category_id", "categories").optional(),
    ColumnDef::text("description").optional(),
    ColumnDef::text("website").optional(),
    ColumnDef::text("logo_url").optional(),
    ColumnDef::boolean("is_featured").optional(),
];

const LEGAL_COMPLIANCE_EXPERTS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::text("email").optional().searchable(),
    ColumnDef::text("firm").optional().searchable(),
    ColumnDef::text("jurisdiction").optional(),
    ColumnDef::reference("expertise_area_id", "expertise_areas").optional(),
    ColumnDef::text("bio").optional(),
    ColumnDef::text("image_url").optional(),
    ColumnDef::json("certifications").optional(),
    ColumnDef::boolean("is_approved").optional(),
];

const PROCURETECH_SOLUTIONS: &[ColumnDef] = &[
    ColumnDef::text("name").searchable(),
    ColumnDef::text("vendor").optional().searchable(),
    ColumnDef::reference("solution_category_id", "solution_categories").optional(),
    ColumnDef::text("description").optional(),
    ColumnDef::text("website").optional(),
    ColumnDef::text("logo_url").optional(),
    ColumnDef::text("pricing_model").optional(),
    ColumnDef::json("features").optional(),
];

const INSIGHT_POSTS: &[ColumnDef] = &[
    ColumnDef::text("title").searchable(),
    ColumnDef::text("author").optional().searchable(),
    ColumnDef::reference("category_id", "categories").optional(),
    ColumnDef::text("summary").optional(),
    ColumnDef::text("content").optional(),
    ColumnDef::text("cover_image_url").optional(),
    ColumnDef::json("tags").optional(),
    ColumnDef::timestamp("published_at").optional(),
    ColumnDef::boolean("is_published").optional(),
];

const ROUND_TABLES: &[ColumnDef] = &[
    ColumnDef::text("title").searchable(),
    ColumnDef::text("topic").optional().searchable(),
    ColumnDef::timestamp("event_date").optional(),
    ColumnDef::reference("location_id", "locations").optional(),
    ColumnDef::text("moderator").optional(),
    ColumnDef::json("participants").optional(),
    ColumnDef::text("image_url").optional(),
    ColumnDef::text("registration_url").optional(),
];

const TALENT_HIRING: &[ColumnDef] = &[
    ColumnDef::text("job_title").searchable(),
    ColumnDef::text("company").optional().searchable(),
    ColumnDef::reference("location_id", "locations").optional(),
    ColumnDef::reference("industry_id", "industries").optional(),
    ColumnDef::text("employment_type").optional(),
    ColumnDef::text("salary_range").optional(),
    ColumnDef::text("description").optional(),
    ColumnDef::text("email").optional(),
    ColumnDef::json("skills").optional(),
];

const INNOVATION_VAULT: &[ColumnDef] = &[
    ColumnDef::text("title").searchable(),
    ColumnDef::text("innovator").optional().searchable(),
    ColumnDef::reference("category_id", "categories").optional(),
    ColumnDef::text("description").optional(),
    ColumnDef::text("attachment_url").optional(),
    ColumnDef::json("tags").optional(),
];

const EXCLUSIVE_INTELLIGENCE_REPORTS: &[ColumnDef] = &[
    ColumnDef::text("title").searchable(),
    ColumnDef::reference("industry_id", "industries").optional(),
    ColumnDef::text("summary").optional(),
    ColumnDef::text("report_url").optional(),
    ColumnDef::text("cover_image_url").optional(),
    ColumnDef::json("key_findings").optional(),
    ColumnDef::timestamp("published_at").optional(),
    ColumnDef::boolean("is_premium").optional(),
];

const fn content(
    name: &'static str,
    columns: &'static [ColumnDef],
    delete_mode: DeleteMode,
    approval_column: Option<&'static str>,
) -> EntityDescriptor {
    EntityDescriptor {
        name,
        table_name: name,
        kind: EntityKind::Content,
        columns,
        delete_mode,
        approval_column,
    }
}

const fn lookup(name: &'static str) -> EntityDescriptor {
    EntityDescriptor {
        name,
        table_name: name,
        kind: EntityKind::Lookup,
        columns: LOOKUP_COLUMNS,
        delete_mode: DeleteMode::Soft,
        approval_column: None,
    }
}

const APPROVED: Option<&str> = Some("is_approved");

/// Descriptors for every table the dashboard manages, in registration order.
pub fn builtin_descriptors() -> Vec<EntityDescriptor> {
    let mut descriptors: Vec<EntityDescriptor> = LOOKUP_TABLES.iter().copied().map(lookup).collect();

    descriptors.extend([
        content("consultants", CONSULTANTS, DeleteMode::Soft, APPROVED),
        content("speakers", SPEAKERS, DeleteMode::Soft, None),
        content("venue_partners", VENUE_PARTNERS, DeleteMode::Soft, APPROVED),
        content("exclusive_partners", EXCLUSIVE_PARTNERS, DeleteMode::Soft, None),
        content(
            "legal_compliance_experts",
            LEGAL_COMPLIANCE_EXPERTS,
            DeleteMode::Soft,
            APPROVED,
        ),
        content("procuretech_solutions", PROCURETECH_SOLUTIONS, DeleteMode::Soft, None),
        content("insight_posts", INSIGHT_POSTS, DeleteMode::Soft, None),
        content("round_tables", ROUND_TABLES, DeleteMode::Soft, None),
        content("talent_hiring", TALENT_HIRING, DeleteMode::Hard, None),
        content("innovation_vault", INNOVATION_VAULT, DeleteMode::Hard, None),
        content(
            "exclusive_intelligence_reports",
            EXCLUSIVE_INTELLIGENCE_REPORTS,
            DeleteMode::Soft,
            None,
        ),
    ]);

    descriptors
}
