//! Conflict classification for storage errors
//!
//! Neither driver hands us a portable error code through the `Any`
//! layer, so conflicts are recognised from a fixed fragment of the
//! error text per dialect. Callers only ever see [`ErrorClass`], never
//! the fragments.

use crate::dialect::Dialect;

/// What a failed statement means to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Primary or unique key violation
    Unique,
    /// Foreign key violation
    ForeignKey,
    /// Anything else; surfaced untranslated
    Other,
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, err: &sqlx::Error) -> ErrorClass;
}

impl ErrorClassifier for Dialect {
    fn classify(&self, err: &sqlx::Error) -> ErrorClass {
        let text = err.to_string();
        if text.contains(self.unique_violation_signature()) {
            ErrorClass::Unique
        } else if text.contains(self.foreign_key_violation_signature()) {
            ErrorClass::ForeignKey
        } else {
            ErrorClass::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver_error(text: &str) -> sqlx::Error {
        sqlx::Error::Protocol(text.to_owned())
    }

    #[test]
    fn mysql_signatures() {
        let dup = driver_error(
            "error returned from database: 1062 (23000): Duplicate entry 'bob' for key 'username'",
        );
        let fk = driver_error(
            "error returned from database: 1452 (23000): Cannot add or update a child row: \
             a foreign key constraint fails",
        );
        assert_eq!(Dialect::MySql.classify(&dup), ErrorClass::Unique);
        assert_eq!(Dialect::MySql.classify(&fk), ErrorClass::ForeignKey);
        assert_eq!(
            Dialect::MySql.classify(&driver_error("1146 (42S02): Table doesn't exist")),
            ErrorClass::Other
        );
    }

    #[test]
    fn postgres_signatures() {
        let dup = driver_error(
            "error returned from database: duplicate key value violates unique constraint \"ftp_mapping_pkey\"",
        );
        let fk = driver_error(
            "error returned from database: insert or update on table \"ftp_mapping\" \
             violates foreign key constraint \"ftp_mapping_ftp_id_fkey\"",
        );
        assert_eq!(Dialect::Postgres.classify(&dup), ErrorClass::Unique);
        assert_eq!(Dialect::Postgres.classify(&fk), ErrorClass::ForeignKey);
        assert_eq!(
            Dialect::Postgres.classify(&sqlx::Error::RowNotFound),
            ErrorClass::Other
        );
    }

    #[test]
    fn signatures_do_not_cross_dialects() {
        let pg_dup = driver_error("duplicate key value violates unique constraint \"x\"");
        assert_eq!(Dialect::MySql.classify(&pg_dup), ErrorClass::Other);

        let mysql_fk = driver_error("1452 (23000): Cannot add or update a child row");
        assert_eq!(Dialect::Postgres.classify(&mysql_fk), ErrorClass::Other);
    }
}
