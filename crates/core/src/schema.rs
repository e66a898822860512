//! Entity descriptors and the table schema registry.
//!
//! A [`SchemaRegistry`] is the only source of table and column identifiers
//! that ever reach SQL text. Callers name an entity with an untrusted string;
//! [`SchemaRegistry::resolve`] turns it into a `&EntityDescriptor` or fails
//! with [`CoreError::UnknownEntity`]. The registry is built once at startup
//! and never mutated afterwards.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog;
use crate::error::CoreError;

/// Primary key column shared by every table.
pub const PRIMARY_KEY: &str = "id";

/// Audit columns managed by the repository, never writable by callers.
pub const RESERVED_COLUMNS: &[&str] = &[PRIMARY_KEY, "created_at", "updated_at", "deleted_at"];

// ---------------------------------------------------------------------------
// Column metadata
// ---------------------------------------------------------------------------

/// Storage type of a writable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
    /// Array or object value stored as JSON text.
    Json,
    Timestamp,
}

/// One writable column of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// Included in the `search` filter of list queries (text columns only).
    pub searchable: bool,
    /// Lookup entity this column points at. The column holds the lookup id
    /// and reads also return the resolved display value.
    pub references: Option<&'static str>,
}

impl ColumnDef {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            searchable: false,
            references: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Boolean)
    }

    pub const fn json(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Json)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Timestamp)
    }

    /// An integer column holding the id of a row in `lookup`.
    pub const fn reference(name: &'static str, lookup: &'static str) -> Self {
        Self {
            references: Some(lookup),
            ..Self::new(name, ColumnKind::Integer)
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn searchable(self) -> Self {
        Self {
            searchable: true,
            ..self
        }
    }

    /// Whether values of this column are JSON-encoded on write and decoded on read.
    pub fn json_encoded(&self) -> bool {
        self.kind == ColumnKind::Json
    }

    /// Name of the denormalized display field for a reference column
    /// (`industry_id` -> `industry_name`).
    pub fn display_field(&self) -> Option<String> {
        self.references?;
        let base = self.name.strip_suffix("_id").unwrap_or(self.name);
        Some(format!("{base}_name"))
    }
}

// ---------------------------------------------------------------------------
// Entity descriptors
// ---------------------------------------------------------------------------

/// How `delete` removes a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Stamp `deleted_at`; the row stays in the table.
    Soft,
    /// Remove the row.
    Hard,
}

/// Whether a descriptor is a content entity or a single-value lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Content,
    Lookup,
}

/// Static storage metadata for one logical entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub table_name: &'static str,
    pub kind: EntityKind,
    pub columns: &'static [ColumnDef],
    pub delete_mode: DeleteMode,
    /// Boolean column whose flips are reported as status transitions.
    pub approval_column: Option<&'static str>,
}

impl EntityDescriptor {
    pub fn has_soft_delete(&self) -> bool {
        self.delete_mode == DeleteMode::Soft
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only catalog of entity descriptors.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<EntityDescriptor>,
}

impl SchemaRegistry {
    /// Build a registry, validating every descriptor against the others.
    pub fn new(descriptors: Vec<EntityDescriptor>) -> Result<Self, CoreError> {
        let mut names = HashSet::new();
        for descriptor in &descriptors {
            if !names.insert(descriptor.name) {
                return Err(CoreError::Internal(format!(
                    "duplicate entity descriptor '{}'",
                    descriptor.name
                )));
            }
        }

        for descriptor in &descriptors {
            validate_descriptor(descriptor, &descriptors)?;
        }

        Ok(Self { descriptors })
    }

    /// The compiled-in catalog of every content entity and lookup table.
    pub fn builtin() -> Self {
        Self {
            descriptors: catalog::builtin_descriptors(),
        }
    }

    /// Resolve an entity name to its descriptor.
    pub fn resolve(&self, name: &str) -> Result<&EntityDescriptor, CoreError> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| CoreError::UnknownEntity(name.to_string()))
    }

    /// Resolve a name that must refer to a content entity.
    pub fn resolve_content(&self, name: &str) -> Result<&EntityDescriptor, CoreError> {
        self.resolve_kind(name, EntityKind::Content)
    }

    /// Resolve a name that must refer to a lookup table.
    pub fn resolve_lookup(&self, name: &str) -> Result<&EntityDescriptor, CoreError> {
        self.resolve_kind(name, EntityKind::Lookup)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.descriptors.iter()
    }

    fn resolve_kind(&self, name: &str, kind: EntityKind) -> Result<&EntityDescriptor, CoreError> {
        match self.resolve(name)? {
            d if d.kind == kind => Ok(d),
            _ => Err(CoreError::UnknownEntity(name.to_string())),
        }
    }
}

/// Identifiers are interpolated into SQL, so they are restricted to
/// lowercase ASCII, digits and underscores.
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_descriptor(
    descriptor: &EntityDescriptor,
    all: &[EntityDescriptor],
) -> Result<(), CoreError> {
    let fail = |msg: String| {
        Err(CoreError::Internal(format!(
            "invalid descriptor '{}': {msg}",
            descriptor.name
        )))
    };

    if !is_sql_identifier(descriptor.table_name) {
        return fail(format!("table name '{}' is not an identifier", descriptor.table_name));
    }
    if descriptor.columns.is_empty() {
        return fail("no writable columns".into());
    }

    let mut seen = HashSet::new();
    for column in descriptor.columns {
        if !is_sql_identifier(column.name) {
            return fail(format!("column '{}' is not an identifier", column.name));
        }
        if RESERVED_COLUMNS.contains(&column.name) {
            return fail(format!("column '{}' is reserved", column.name));
        }
        if !seen.insert(column.name) {
            return fail(format!("column '{}' declared twice", column.name));
        }
        if column.searchable && column.kind != ColumnKind::Text {
            return fail(format!("column '{}' is searchable but not text", column.name));
        }
        if let Some(target) = column.references {
            let is_lookup = all
                .iter()
                .any(|d| d.name == target && d.kind == EntityKind::Lookup);
            if !is_lookup {
                return fail(format!(
                    "column '{}' references unknown lookup '{target}'",
                    column.name
                ));
            }
            if !column.name.ends_with("_id") {
                return fail(format!("reference column '{}' must end in _id", column.name));
            }
        }
    }

    if let Some(approval) = descriptor.approval_column {
        match descriptor.column(approval) {
            Some(c) if c.kind == ColumnKind::Boolean => {}
            _ => return fail(format!("approval column '{approval}' must be a boolean column")),
        }
    }

    if descriptor.kind == EntityKind::Lookup {
        let single_value = matches!(
            descriptor.columns,
            [ColumnDef { name: "value", kind: ColumnKind::Text, .. }]
        );
        if !single_value {
            return fail("lookup tables have exactly one text column named 'value'".into());
        }
    }

    Ok(())
}
