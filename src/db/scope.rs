//! School scoping of admin-visible rows
//!
//! Every resource declares once how its rows relate to a school. A school
//! admin only ever sees rows of its own school; a system admin sees all rows.

/// Visibility granted to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Platform-wide visibility
    Global,
    /// Visibility confined to one school
    School(i64),
}

/// Relation path from a resource row to its school
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePath {
    /// Row carries the school reference in this column
    Direct(&'static str),
    /// Row references a user in this column; scope on the user's school
    ViaUser(&'static str),
    /// Row references a classroom in this column; scope on the classroom's school
    ViaClassroom(&'static str),
    /// Row references a user in this column; scope on the school of that
    /// user's school admin record. Users without one never match.
    ViaSchoolAdmin(&'static str),
    /// Row has no school relation
    Unscoped,
}

impl ScopePath {
    /// SQL predicate restricting `alias` rows to one school.
    ///
    /// The predicate contains exactly one `?` placeholder for the school id.
    pub fn predicate(&self, alias: &str) -> Option<String> {
        match self {
            ScopePath::Direct(column) => Some(format!("{alias}.{column} = ?")),
            ScopePath::ViaUser(column) => Some(format!(
                "{alias}.{column} IN (SELECT id FROM users WHERE school_id = ?)"
            )),
            ScopePath::ViaClassroom(column) => Some(format!(
                "{alias}.{column} IN (SELECT id FROM classrooms WHERE school_id = ?)"
            )),
            ScopePath::ViaSchoolAdmin(column) => Some(format!(
                "{alias}.{column} IN (SELECT user_id FROM school_admins WHERE school_id = ?)"
            )),
            ScopePath::Unscoped => None,
        }
    }
}

/// Resources subject to the scope filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedResource {
    Users,
    SchoolAdmins,
    SystemAdmins,
    AuditLogs,
}

impl ScopedResource {
    pub fn table(&self) -> &'static str {
        match self {
            ScopedResource::Users => "users",
            ScopedResource::SchoolAdmins => "school_admins",
            ScopedResource::SystemAdmins => "system_admins",
            ScopedResource::AuditLogs => "admin_audit_logs",
        }
    }

    pub fn scope_path(&self) -> ScopePath {
        match self {
            ScopedResource::Users => ScopePath::Direct("school_id"),
            ScopedResource::SchoolAdmins => ScopePath::Direct("school_id"),
            ScopedResource::SystemAdmins => ScopePath::Unscoped,
            // Entries written by system admins stay out of every school's view
            ScopedResource::AuditLogs => ScopePath::ViaSchoolAdmin("admin_id"),
        }
    }

    /// Extra predicate for writes by a school-scoped caller. Rows it matches
    /// are left untouched even when they lie inside the caller's school.
    pub fn school_write_guard(&self, alias: &str) -> Option<String> {
        match self {
            ScopedResource::Users => Some(format!(
                "{alias}.id NOT IN (SELECT user_id FROM system_admins WHERE is_active = 1)"
            )),
            ScopedResource::SchoolAdmins
            | ScopedResource::SystemAdmins
            | ScopedResource::AuditLogs => None,
        }
    }

    /// Plural display name used in ledger descriptions
    pub fn verbose_name_plural(&self) -> &'static str {
        match self {
            ScopedResource::Users => "users",
            ScopedResource::SchoolAdmins => "school admins",
            ScopedResource::SystemAdmins => "system admins",
            ScopedResource::AuditLogs => "admin audit logs",
        }
    }
}

/// Scope predicate ready to splice into a hand-built query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    clause: Option<String>,
    school_id: Option<i64>,
}

impl ScopeFilter {
    pub fn new(resource: ScopedResource, scope: Scope, alias: &str) -> Self {
        match scope {
            Scope::Global => Self {
                clause: None,
                school_id: None,
            },
            Scope::School(school_id) => match resource.scope_path().predicate(alias) {
                Some(clause) => Self {
                    clause: Some(clause),
                    school_id: Some(school_id),
                },
                None => Self {
                    clause: None,
                    school_id: None,
                },
            },
        }
    }

    /// Append ` AND <predicate>` to `sql` when the filter restricts rows
    pub fn push_and(&self, sql: &mut String) {
        if let Some(ref clause) = self.clause {
            sql.push_str(" AND ");
            sql.push_str(clause);
        }
    }

    /// Value to bind for the predicate placeholder, if any
    pub fn school_id(&self) -> Option<i64> {
        self.school_id
    }

    pub fn is_restricted(&self) -> bool {
        self.clause.is_some()
    }
}
