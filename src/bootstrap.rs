use crate::{
    db::{DocumentStore, IndexDefinition},
    errors::AppError,
    schemas::{
        item_schema, order_schema, user_schema, CollectionSchema, ITEM_COLLECTION,
        ORDER_COLLECTION, USER_COLLECTION,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensured {
    Created,
    Existing,
}

#[derive(Debug, Clone)]
pub struct BootstrapPlan {
    pub collections: Vec<(String, Option<CollectionSchema>)>,
    pub unique_indexes: Vec<(String, String)>,
}

impl Default for BootstrapPlan {
    fn default() -> Self {
        Self {
            collections: vec![
                (USER_COLLECTION.to_owned(), Some(user_schema())),
                (ITEM_COLLECTION.to_owned(), Some(item_schema())),
                (ORDER_COLLECTION.to_owned(), Some(order_schema())),
            ],
            unique_indexes: vec![
                (USER_COLLECTION.to_owned(), "email".to_owned()),
                (ITEM_COLLECTION.to_owned(), "name".to_owned()),
            ],
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub database: Option<Ensured>,
    pub collections: Vec<(String, Ensured)>,
    pub indexes: Vec<(String, String, Ensured)>,
}

impl BootstrapReport {
    pub fn created(&self) -> usize {
        let database = usize::from(self.database == Some(Ensured::Created));
        let collections = self
            .collections
            .iter()
            .filter(|(_, e)| *e == Ensured::Created)
            .count();
        let indexes = self
            .indexes
            .iter()
            .filter(|(_, _, e)| *e == Ensured::Created)
            .count();
        database + collections + indexes
    }
}

pub struct Bootstrapper<S> {
    store: S,
    database: String,
}

impl<S: DocumentStore> Bootstrapper<S> {
    pub fn new(store: S, database: impl Into<String>) -> Self {
        Self {
            store,
            database: database.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn ensure_database(&self) -> Result<Ensured, AppError> {
        let name = self.database.as_str();
        if self.store.databases().await?.iter().any(|db| db == name) {
            log::info!("Database {} already exists", name);
            return Ok(Ensured::Existing);
        }
        let created = self.store.create_database(name).await;
        settle(created, &format!("database {name}"))
    }

    /// Creates `name` with `schema` attached, unless a collection by that name exists.
    /// An existing collection keeps its schema; nothing is migrated.
    pub async fn ensure_collection(
        &self,
        name: &str,
        schema: Option<&CollectionSchema>,
    ) -> Result<Ensured, AppError> {
        let existing = self.store.collections(&self.database).await?;
        if existing.iter().any(|c| c == name) {
            log::info!("Collection {} already exists, schema left unchanged", name);
            return Ok(Ensured::Existing);
        }
        let created = self
            .store
            .create_collection(&self.database, name, schema)
            .await;
        settle(created, &format!("collection {name}"))
    }

    /// Persistent, unique, non-sparse index on exactly `[field]`.
    pub async fn ensure_unique_index(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<Ensured, AppError> {
        let wanted = IndexDefinition::unique_persistent(field);
        let indexes = self.store.indexes(&self.database, collection).await?;
        if indexes.contains(&wanted) {
            log::info!("Unique index on {}.{} already exists", collection, field);
            return Ok(Ensured::Existing);
        }
        let created = self
            .store
            .create_index(&self.database, collection, &wanted)
            .await;
        settle(created, &format!("unique index on {collection}.{field}"))
    }

    pub async fn run(&self, plan: &BootstrapPlan) -> Result<BootstrapReport, AppError> {
        let mut report = BootstrapReport {
            database: Some(self.ensure_database().await?),
            ..BootstrapReport::default()
        };
        for (name, schema) in &plan.collections {
            let ensured = self.ensure_collection(name, schema.as_ref()).await?;
            report.collections.push((name.clone(), ensured));
        }
        for (collection, field) in &plan.unique_indexes {
            let ensured = self.ensure_unique_index(collection, field).await?;
            report
                .indexes
                .push((collection.clone(), field.clone(), ensured));
        }
        log::info!(
            "Bootstrap of {} finished, {} resource(s) created",
            self.database,
            report.created()
        );
        Ok(report)
    }
}

fn settle(created: Result<(), AppError>, what: &str) -> Result<Ensured, AppError> {
    match created {
        Ok(()) => {
            log::info!("Created {}", what);
            Ok(Ensured::Created)
        }
        Err(AppError::DatabaseError(e)) if e.is_duplicate_name() => {
            log::warn!("{} appeared while creating it: {}", what, e);
            Ok(Ensured::Existing)
        }
        Err(e) => {
            log::error!("Failed to create {}: {}", what, e);
            Err(e)
        }
    }
}
