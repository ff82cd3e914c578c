//! Struct-backed rows
//!
//! A [`Model`] is a serde struct paired with the [`TableSchema`] describing
//! its table. Saving serializes the struct through `serde_json` and renames
//! each field to its column. Byte arrays bound for BLOB columns are stored as
//! BLOBs, other arrays and objects as JSON text. Loading applies the inverse
//! column mapping and lets each field's type pick how its value is read.
//!
//! Model tables need an `INTEGER PRIMARY KEY`, the rowid alias the model's
//! id is read from.

use crate::row::deserialize_fields;
use crate::{Database, Error, Executor, Result, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use squeeb_core::{
    where_, DataType, DeleteQueryBuilder, InsertQueryBuilder, Predicate, QueryBuilder,
    SelectQueryBuilder, SortDirection, TableSchema, UpdateQueryBuilder, Value, ValueMap,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// A struct stored as one row of a table with an integer rowid primary key
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    /// Schema of the backing table
    fn schema() -> Arc<TableSchema>;

    /// Primary key, `None` until the row has been saved
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Column values of this model, keyed by column name
    fn to_values(&self) -> Result<ValueMap> {
        model_values(self, &Self::schema())
    }

    /// INSERT an unsaved model and record its new rowid, or UPDATE a saved one
    fn save<E: Executor>(&mut self, exec: &mut E) -> impl Future<Output = Result<()>> + Send {
        async move {
            let schema = rowid_schema::<Self>()?;
            let key = schema.primary_key_column();
            let mut values = self.to_values()?;
            values.remove(key);

            match self.id() {
                None => {
                    let query = InsertQueryBuilder::new(schema.name()).values(values).build();
                    let id = exec.execute_insert(&query).await?;
                    self.set_id(id);
                    debug!(table = schema.name(), id, "Model inserted");
                }
                Some(id) => {
                    let query = UpdateQueryBuilder::new(schema.name())
                        .values(values)
                        .where_(where_(key).equals(id))
                        .build();
                    if exec.execute(&query).await? == 0 {
                        return Err(Error::row_not_found(schema.name()));
                    }
                    debug!(table = schema.name(), id, "Model updated");
                }
            }
            Ok(())
        }
    }

    /// DELETE the row backing this model
    fn delete<E: Executor>(&self, exec: &mut E) -> impl Future<Output = Result<()>> + Send {
        async move {
            let schema = rowid_schema::<Self>()?;
            let Some(id) = self.id() else {
                return Err(Error::not_saved(schema.name()));
            };
            let query = DeleteQueryBuilder::new(schema.name())
                .where_(where_(schema.primary_key_column()).equals(id))
                .build();
            exec.execute(&query).await?;
            debug!(table = schema.name(), id, "Model deleted");
            Ok(())
        }
    }

    /// Reload every field from the database
    fn refresh<E: Executor>(&mut self, exec: &mut E) -> impl Future<Output = Result<()>> + Send {
        async move {
            let schema = rowid_schema::<Self>()?;
            let Some(id) = self.id() else {
                return Err(Error::not_saved(schema.name()));
            };
            let query = SelectQueryBuilder::new(schema.name())
                .where_(where_(schema.primary_key_column()).equals(id))
                .build();
            match exec.fetch_optional(&query).await? {
                Some(row) => {
                    *self = from_row(row, &schema)?;
                    Ok(())
                }
                None => Err(Error::row_not_found(schema.name())),
            }
        }
    }

    /// Load the model whose primary key is `id`
    fn find<E: Executor>(
        exec: &mut E,
        id: i64,
    ) -> impl Future<Output = Result<Option<Self>>> + Send {
        async move {
            let schema = rowid_schema::<Self>()?;
            let query = SelectQueryBuilder::new(schema.name())
                .where_(where_(schema.primary_key_column()).equals(id))
                .build();
            exec.fetch_optional(&query)
                .await?
                .map(|row| from_row(row, &schema))
                .transpose()
        }
    }

    /// Load every model matching `predicate`; conditions name SQL columns
    fn find_where<E: Executor>(
        exec: &mut E,
        predicate: impl Into<Predicate>,
    ) -> impl Future<Output = Result<Vec<Self>>> + Send {
        let schema = Self::schema();
        let query = SelectQueryBuilder::new(schema.name())
            .where_(predicate)
            .build();
        async move {
            let rows = exec.fetch_all(&query).await?;
            rows.into_iter().map(|row| from_row(row, &schema)).collect()
        }
    }

    /// Load every row of the table, in primary key order
    fn all<E: Executor>(exec: &mut E) -> impl Future<Output = Result<Vec<Self>>> + Send {
        let schema = Self::schema();
        let query = SelectQueryBuilder::new(schema.name())
            .order_by(schema.primary_key_column(), SortDirection::Asc)
            .build();
        async move {
            let rows = exec.fetch_all(&query).await?;
            rows.into_iter().map(|row| from_row(row, &schema)).collect()
        }
    }
}

fn rowid_schema<M: Model>() -> Result<Arc<TableSchema>> {
    let schema = M::schema();
    if !schema.has_rowid_key() {
        return Err(squeeb_core::Error::invalid_schema(
            schema.name(),
            "model tables need an INTEGER rowid primary key",
        )
        .into());
    }
    Ok(schema)
}

fn model_values<M: Serialize + ?Sized>(model: &M, schema: &TableSchema) -> Result<ValueMap> {
    let serde_json::Value::Object(mut fields) = serde_json::to_value(model)? else {
        return Err(
            squeeb_core::Error::invalid_schema(schema.name(), "model must serialize to a map")
                .into(),
        );
    };

    let mut values = ValueMap::new();
    for (field, column) in schema.columns() {
        let value = match fields.remove(field) {
            Some(json) if column.data_type() == DataType::Blob => blob_value(json),
            Some(json) => Value::from_json(json),
            None => Value::Null,
        };
        values.insert(schema.column_name(field).unwrap_or(field), value);
    }
    Ok(values)
}

// serde_json has no byte type; a `Vec<u8>` arrives as an array of numbers
fn blob_value(json: serde_json::Value) -> Value {
    if let serde_json::Value::Array(items) = &json {
        let bytes: Option<Vec<u8>> = items
            .iter()
            .map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
            .collect();
        if let Some(bytes) = bytes {
            return Value::Blob(bytes);
        }
    }
    Value::from_json(json)
}

fn from_row<M: DeserializeOwned>(row: Row, schema: &TableSchema) -> Result<M> {
    deserialize_fields(row.into_iter().map(|(column, value)| {
        let field = schema
            .field_name(&column)
            .map(str::to_string)
            .unwrap_or(column);
        (field, value)
    }))
}

/// An ordered collection of models with bulk operations
#[derive(Debug, Clone, PartialEq)]
pub struct ModelList<M> {
    models: Vec<M>,
}

impl<M> Default for ModelList<M> {
    fn default() -> Self {
        Self { models: Vec::new() }
    }
}

impl<M: Model> ModelList<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, model: M) {
        self.models.push(model);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, M> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn into_inner(self) -> Vec<M> {
        self.models
    }

    /// Primary keys of the saved members
    pub fn ids(&self) -> Vec<i64> {
        self.models.iter().filter_map(Model::id).collect()
    }

    /// Delete every saved member with a single statement. Unsaved members are
    /// skipped. Returns the number of deleted rows.
    pub async fn delete_all<E: Executor>(&self, exec: &mut E) -> Result<u64> {
        let schema = rowid_schema::<M>()?;
        let ids = self.ids();
        if ids.is_empty() {
            return Ok(0);
        }
        let query = DeleteQueryBuilder::new(schema.name())
            .where_(where_(schema.primary_key_column()).is_in(ids))
            .build();
        exec.execute(&query).await
    }

    /// Reload every saved member
    pub async fn refresh_all<E: Executor>(&mut self, exec: &mut E) -> Result<()> {
        for model in self.models.iter_mut().filter(|model| model.id().is_some()) {
            model.refresh(exec).await?;
        }
        Ok(())
    }

    /// Save every member inside one transaction. On failure nothing is
    /// written and the members keep their previous ids.
    pub async fn save_all(&mut self, db: &Database) -> Result<()>
    where
        M: Clone,
    {
        let mut staged = self.models.clone();
        let mut tx = db.begin(None).await?;

        let mut outcome = Ok(());
        for model in staged.iter_mut() {
            outcome = model.save(&mut tx).await;
            if outcome.is_err() {
                break;
            }
        }

        match outcome {
            Ok(()) => {
                tx.commit().await?;
                self.models = staged;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(error = %rollback_error, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

impl<M> From<Vec<M>> for ModelList<M> {
    fn from(models: Vec<M>) -> Self {
        Self { models }
    }
}

impl<M> FromIterator<M> for ModelList<M> {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}

impl<M> IntoIterator for ModelList<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabaseConfig;
    use once_cell::sync::Lazy;
    use serde::Deserialize;
    use squeeb_core::{Column, Constraint, PrimaryKey};

    static ARTISTS: Lazy<Arc<TableSchema>> = Lazy::new(|| {
        Arc::new(
            TableSchema::builder("artists")
                .column("id", Column::integer().constraint(PrimaryKey::new()))
                .column("name", Column::text().constraint(Constraint::not_null()))
                .column("formed", Column::integer().named("formed_year"))
                .build()
                .unwrap(),
        )
    });

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Artist {
        id: Option<i64>,
        name: String,
        formed: Option<i64>,
    }

    impl Artist {
        fn new(name: &str, formed: Option<i64>) -> Self {
            Self {
                id: None,
                name: name.to_string(),
                formed,
            }
        }
    }

    impl Model for Artist {
        fn schema() -> Arc<TableSchema> {
            Arc::clone(&ARTISTS)
        }

        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    async fn db() -> Database {
        let mut db = Database::connect(&DatabaseConfig::in_memory("music"))
            .await
            .unwrap();
        db.run(&ARTISTS.create_table_query()).await.unwrap();
        db
    }

    #[test]
    fn test_values_use_column_names() {
        let artist = Artist::new("Can", Some(1968));
        let values = artist.to_values().unwrap();
        assert_eq!(
            values.columns().collect::<Vec<_>>(),
            vec!["id", "name", "formed_year"]
        );
        assert_eq!(values.get("formed_year"), Some(&Value::Integer(1968)));
        assert_eq!(values.get("id"), Some(&Value::Null));
    }

    #[test]
    fn test_from_row_maps_columns_to_fields() {
        let row: Row = [
            ("id", Value::Integer(2)),
            ("name", Value::from("Faust")),
            ("formed_year", Value::Integer(1971)),
        ]
        .into_iter()
        .collect();
        let artist: Artist = from_row(row, &ARTISTS).unwrap();
        assert_eq!(artist.id, Some(2));
        assert_eq!(artist.formed, Some(1971));
    }

    #[tokio::test]
    async fn test_save_inserts_then_updates() {
        let mut db = db().await;
        let mut artist = Artist::new("Can", None);

        artist.save(&mut db).await.unwrap();
        assert_eq!(artist.id, Some(1));

        artist.formed = Some(1968);
        artist.save(&mut db).await.unwrap();

        let loaded = Artist::find(&mut db, 1).await.unwrap().unwrap();
        assert_eq!(loaded, artist);
        assert_eq!(Artist::all(&mut db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_row() {
        let mut db = db().await;
        let mut ghost = Artist::new("Ghost", None);
        ghost.id = Some(99);
        assert!(matches!(
            ghost.save(&mut db).await,
            Err(Error::RowNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_and_refresh() {
        let mut db = db().await;
        let mut artist = Artist::new("Neu!", Some(1971));

        assert!(matches!(
            artist.delete(&mut db).await,
            Err(Error::NotSaved { .. })
        ));

        artist.save(&mut db).await.unwrap();
        artist.name = "changed locally".to_string();
        artist.refresh(&mut db).await.unwrap();
        assert_eq!(artist.name, "Neu!");

        artist.delete(&mut db).await.unwrap();
        assert!(Artist::find(&mut db, 1).await.unwrap().is_none());
        assert!(matches!(
            artist.refresh(&mut db).await,
            Err(Error::RowNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_where() {
        let mut db = db().await;
        for (name, formed) in [("Can", 1968), ("Faust", 1971), ("Cluster", 1971)] {
            Artist::new(name, Some(formed)).save(&mut db).await.unwrap();
        }

        let found = Artist::find_where(&mut db, where_("formed_year").equals(1971))
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|artist| artist.name.as_str()).collect();
        assert_eq!(names, vec!["Faust", "Cluster"]);
    }

    #[tokio::test]
    async fn test_model_list() {
        let mut db = db().await;
        let mut list: ModelList<Artist> = vec![
            Artist::new("Can", Some(1968)),
            Artist::new("Faust", Some(1971)),
        ]
        .into();

        list.save_all(&db).await.unwrap();
        assert_eq!(list.ids(), vec![1, 2]);

        db.run(
            &squeeb_core::update("artists")
                .values([("name", "CAN")])
                .where_(where_("id").equals(1)),
        )
        .await
        .unwrap();
        list.refresh_all(&mut db).await.unwrap();
        assert_eq!(list.iter().next().unwrap().name, "CAN");

        list.push(Artist::new("Unsaved", None));
        assert_eq!(list.delete_all(&mut db).await.unwrap(), 2);
        assert!(Artist::all(&mut db).await.unwrap().is_empty());
    }

    static COVERS: Lazy<Arc<TableSchema>> = Lazy::new(|| {
        Arc::new(
            TableSchema::builder("covers")
                .column("id", Column::integer().constraint(PrimaryKey::new()))
                .column("art", Column::blob())
                .column("explicit", Column::integer())
                .column("credits", Column::text())
                .strict()
                .build()
                .unwrap(),
        )
    });

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Cover {
        id: Option<i64>,
        art: Vec<u8>,
        explicit: bool,
        credits: Vec<String>,
    }

    impl Model for Cover {
        fn schema() -> Arc<TableSchema> {
            Arc::clone(&COVERS)
        }

        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    #[tokio::test]
    async fn test_blob_and_bool_fields_round_trip() {
        let mut db = db().await;
        db.run(&COVERS.create_table_query()).await.unwrap();

        let mut cover = Cover {
            id: None,
            art: vec![0xFF, 0xD8, 0x01],
            explicit: true,
            credits: vec!["Holger Czukay".to_string()],
        };
        let values = cover.to_values().unwrap();
        assert_eq!(values.get("art"), Some(&Value::Blob(vec![0xFF, 0xD8, 0x01])));
        assert_eq!(values.get("explicit"), Some(&Value::Bool(true)));
        assert_eq!(
            values.get("credits"),
            Some(&Value::from(r#"["Holger Czukay"]"#))
        );

        cover.save(&mut db).await.unwrap();
        let stored = db
            .fetch_all(&squeeb_core::select("covers").build())
            .await
            .unwrap();
        assert_eq!(stored[0].get("art"), Some(&Value::Blob(vec![0xFF, 0xD8, 0x01])));
        assert_eq!(stored[0].get("explicit"), Some(&Value::Integer(1)));

        let loaded = Cover::find(&mut db, cover.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(loaded, cover);
    }

    static TAGS: Lazy<Arc<TableSchema>> = Lazy::new(|| {
        Arc::new(
            TableSchema::builder("tags")
                .column("id", Column::text().constraint(PrimaryKey::new()))
                .column("label", Column::text())
                .build()
                .unwrap(),
        )
    });

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Tag {
        id: Option<i64>,
        label: String,
    }

    impl Model for Tag {
        fn schema() -> Arc<TableSchema> {
            Arc::clone(&TAGS)
        }

        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }
    }

    #[tokio::test]
    async fn test_text_primary_key_is_refused() {
        let mut db = db().await;
        db.run(&TAGS.create_table_query()).await.unwrap();

        let mut tag = Tag {
            id: None,
            label: "ambient".to_string(),
        };
        assert!(matches!(
            tag.save(&mut db).await,
            Err(Error::Core(squeeb_core::Error::InvalidSchema { .. }))
        ));
        assert_eq!(tag.id, None);
        assert!(matches!(
            Tag::find(&mut db, 1).await,
            Err(Error::Core(squeeb_core::Error::InvalidSchema { .. }))
        ));

        tag.id = Some(1);
        assert!(tag.delete(&mut db).await.is_err());
        assert!(tag.refresh(&mut db).await.is_err());
        let stored = db
            .fetch_all(&squeeb_core::select("tags").build())
            .await
            .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_save_all_rolls_back() {
        let mut db = db().await;
        let mut list: ModelList<Artist> = vec![Artist::new("Can", None), {
            let mut ghost = Artist::new("Ghost", None);
            ghost.id = Some(42);
            ghost
        }]
        .into();

        assert!(list.save_all(&db).await.is_err());
        assert_eq!(list.iter().next().unwrap().id, None);
        assert!(Artist::all(&mut db).await.unwrap().is_empty());
    }
}
