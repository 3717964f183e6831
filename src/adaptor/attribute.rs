use rusqlite::OptionalExtension;

use crate::adaptor::{AttributeOwner, AttributeStore, DbConnection};
use crate::models::{Attribute, DbId};
use crate::utils::errors::StoreError;

/// Attributes of transcripts and translations
///
/// The code, name and description of an attribute are stored once per
/// code in `attrib_type`, the first stored attribute of a code defines them.
pub struct AttributeAdaptor<'a> {
    db: &'a DbConnection,
}

impl AttributeOwner {
    fn table(&self) -> (&'static str, &'static str, DbId) {
        match self {
            AttributeOwner::Transcript(id) => ("transcript_attrib", "transcript_id", *id),
            AttributeOwner::Translation(id) => ("translation_attrib", "translation_id", *id),
        }
    }
}

impl<'a> AttributeAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        AttributeAdaptor { db }
    }

    /// Returns the id of the attribute type of `attribute`, creating it if needed
    pub fn attrib_type_id(&self, attribute: &Attribute) -> Result<DbId, StoreError> {
        let conn = self.db.connection();
        let id: Option<DbId> = conn
            .query_row(
                "SELECT attrib_type_id FROM attrib_type WHERE code = ?1",
                [&attribute.code],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = id {
            return Ok(id);
        }
        conn.execute(
            "INSERT INTO attrib_type (code, name, description) VALUES (?1, ?2, ?3)",
            (&attribute.code, &attribute.name, &attribute.description),
        )?;
        Ok(conn.last_insert_rowid())
    }
}

impl AttributeStore for AttributeAdaptor<'_> {
    fn store(&self, owner: AttributeOwner, attributes: &[Attribute]) -> Result<(), StoreError> {
        let (table, column, id) = owner.table();
        let sql = format!(
            "INSERT INTO {} ({}, attrib_type_id, value) VALUES (?1, ?2, ?3)",
            table, column
        );
        for attribute in attributes {
            let type_id = self.attrib_type_id(attribute)?;
            self.db
                .connection()
                .execute(&sql, (id, type_id, &attribute.value))?;
        }
        Ok(())
    }

    fn fetch_all(&self, owner: AttributeOwner) -> Result<Vec<Attribute>, StoreError> {
        let (table, column, id) = owner.table();
        let mut stmt = self.db.connection().prepare(&format!(
            "SELECT at.code, at.name, at.description, a.value
            FROM {} a
            JOIN attrib_type at ON at.attrib_type_id = a.attrib_type_id
            WHERE a.{} = ?1
            ORDER BY a.rowid",
            table, column
        ))?;
        let attributes = stmt
            .query_map([id], |row| {
                Ok(Attribute {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    value: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<Attribute>, _>>()?;
        Ok(attributes)
    }

    fn remove_all(&self, owner: AttributeOwner) -> Result<(), StoreError> {
        let (table, column, id) = owner.table();
        self.db
            .connection()
            .execute(&format!("DELETE FROM {} WHERE {} = ?1", table, column), [id])?;
        Ok(())
    }
}
