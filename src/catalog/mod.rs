//! Package catalog: record types, the sqlite-backed store and the table view.

pub mod error;
pub mod store;
pub mod table;

pub use error::CatalogError;
pub use store::CatalogStore;

/// One catalog entry as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub id: i64,
    pub package_name: String,
    pub package_desc: String,
    pub slug: String,
    pub command_debian: String,
    pub command_fedora: String,
}

/// A fully populated field set for a record that does not exist yet
/// (or that is being replaced wholesale).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDraft {
    pub package_name: String,
    pub package_desc: String,
    pub slug: String,
    pub command_debian: String,
    pub command_fedora: String,
}

impl PackageDraft {
    /// Check every field against its length bounds.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for field in PackageField::ALL {
            field.check(self.get(field))?;
        }
        Ok(())
    }

    pub fn get(&self, field: PackageField) -> &str {
        match field {
            PackageField::Name => &self.package_name,
            PackageField::Desc => &self.package_desc,
            PackageField::Slug => &self.slug,
            PackageField::CommandDebian => &self.command_debian,
            PackageField::CommandFedora => &self.command_fedora,
        }
    }
}

/// The five mutable fields of a record. Single-field updates go through
/// this enum rather than through stringly-typed column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageField {
    Name,
    Desc,
    Slug,
    CommandDebian,
    CommandFedora,
}

impl PackageField {
    pub const ALL: [PackageField; 5] = [
        PackageField::Name,
        PackageField::Desc,
        PackageField::Slug,
        PackageField::CommandDebian,
        PackageField::CommandFedora,
    ];

    /// Human-readable name used in prompts and error messages.
    pub fn label(self) -> &'static str {
        match self {
            PackageField::Name => "package name",
            PackageField::Desc => "package description",
            PackageField::Slug => "slug",
            PackageField::CommandDebian => "Debian install command",
            PackageField::CommandFedora => "Fedora install command",
        }
    }

    /// Column name in the packages table.
    pub fn column(self) -> &'static str {
        match self {
            PackageField::Name => "package_name",
            PackageField::Desc => "package_desc",
            PackageField::Slug => "slug",
            PackageField::CommandDebian => "command_debian",
            PackageField::CommandFedora => "command_fedora",
        }
    }

    /// Inclusive length bounds, counted in characters.
    pub fn bounds(self) -> (usize, usize) {
        match self {
            PackageField::Name => (2, 20),
            PackageField::Desc => (5, 300),
            PackageField::Slug => (2, 30),
            PackageField::CommandDebian | PackageField::CommandFedora => (2, 1000),
        }
    }

    /// Validate a candidate value against this field's bounds.
    pub fn check(self, value: &str) -> Result<(), CatalogError> {
        let (min, max) = self.bounds();
        let len = value.chars().count();
        if len < min || len > max {
            return Err(CatalogError::Validation {
                field: self.label(),
                min,
                max,
                len,
            });
        }
        Ok(())
    }
}
