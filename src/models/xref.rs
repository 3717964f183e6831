use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::DbId;

/// A cross-reference from an annotation object to a record in an external database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbEntry {
    db_id: Option<DbId>,
    pub external_db: String,
    pub primary_id: String,
    pub display_id: String,
    pub version: String,
    pub description: Option<String>,
}

impl DbEntry {
    /// Creates a new cross-reference
    ///
    /// ```rust
    /// use txdb::models::DbEntry;
    ///
    /// let xref = DbEntry::new("HGNC", "HGNC:1100", "BRCA1");
    /// assert_eq!(xref.to_string(), "HGNC:HGNC:1100");
    /// assert!(xref.db_id().is_none());
    /// ```
    pub fn new<S: Into<String>>(external_db: S, primary_id: S, display_id: S) -> Self {
        DbEntry {
            db_id: None,
            external_db: external_db.into(),
            primary_id: primary_id.into(),
            display_id: display_id.into(),
            version: "0".to_string(),
            description: None,
        }
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn set_db_id(&mut self, id: Option<DbId>) {
        self.db_id = id;
    }
}

impl fmt::Display for DbEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.external_db, self.primary_id)
    }
}
