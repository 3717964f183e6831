use log::{debug, info};
use rusqlite::Connection;

use crate::adaptor::schema;
use crate::adaptor::{
    AttributeAdaptor, DbEntryAdaptor, ExonAdaptor, SliceAdaptor, SupportingFeatureAdaptor,
    TranscriptAdaptor, TranslationAdaptor,
};
use crate::config::DbConfig;
use crate::utils::errors::StoreError;

/// A connection to the annotation store
///
/// All adaptors borrow the connection. The connection is not shared between
/// threads; open one connection per thread.
///
/// # Examples
///
/// ```rust
/// use txdb::adaptor::DbConnection;
/// use txdb::tests::transcripts::standard_transcript;
///
/// let db = DbConnection::open_in_memory().unwrap();
/// let adaptor = db.transcript_adaptor();
///
/// let mut tx = standard_transcript();
/// let id = adaptor.store(&mut tx, 1).unwrap();
/// assert_eq!(tx.db_id(), Some(id));
///
/// let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
/// fetched.ensure_loaded(&adaptor).unwrap();
/// assert_eq!(fetched.exons().len(), 2);
/// ```
#[derive(Debug)]
pub struct DbConnection {
    conn: Connection,
    config: DbConfig,
}

impl DbConnection {
    /// Opens the database described by `config`
    ///
    /// The schema is created if the database is empty. Pending patches are
    /// applied to existing databases if `apply_patches` is set.
    pub fn open(config: &DbConfig) -> Result<Self, StoreError> {
        let conn = match &config.path {
            Some(path) => {
                info!("Opening annotation store {}", path.display());
                Connection::open(path)?
            }
            None => {
                debug!("Opening in-memory annotation store");
                Connection::open_in_memory()?
            }
        };
        if !schema::has_schema(&conn)? {
            schema::create_schema(&conn)?;
        } else if config.apply_patches {
            schema::apply_patches(&conn)?;
        }
        Ok(DbConnection {
            conn,
            config: config.clone(),
        })
    }

    /// Opens a new, empty in-memory database with the default configuration
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(&DbConfig::default())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Runs `f` as one unit of work
    ///
    /// With `atomic_writes` enabled, `f` runs inside a transaction that is
    /// rolled back if `f` fails. Calls within an already open transaction
    /// join it. Without `atomic_writes` every statement is committed
    /// individually.
    pub fn atomic<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError>,
    {
        if !self.config.atomic_writes || !self.conn.is_autocommit() {
            return f();
        }
        let transaction = self.conn.unchecked_transaction()?;
        match f() {
            Ok(value) => {
                transaction.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!("Rolling back transaction: {}", err);
                transaction.rollback()?;
                Err(err)
            }
        }
    }

    pub fn slice_adaptor(&self) -> SliceAdaptor<'_> {
        SliceAdaptor::new(self)
    }

    pub fn exon_adaptor(&self) -> ExonAdaptor<'_> {
        ExonAdaptor::new(self)
    }

    pub fn translation_adaptor(&self) -> TranslationAdaptor<'_> {
        TranslationAdaptor::new(self)
    }

    pub fn dbentry_adaptor(&self) -> DbEntryAdaptor<'_> {
        DbEntryAdaptor::new(self)
    }

    pub fn attribute_adaptor(&self) -> AttributeAdaptor<'_> {
        AttributeAdaptor::new(self)
    }

    pub fn supporting_feature_adaptor(&self) -> SupportingFeatureAdaptor<'_> {
        SupportingFeatureAdaptor::new(self)
    }

    pub fn transcript_adaptor(&self) -> TranscriptAdaptor<'_> {
        TranscriptAdaptor::new(self)
    }
}
