//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the schema
//! always matches the entity definitions under `crate::entities` without any
//! hand-written DDL. Creation uses `IF NOT EXISTS`, which lets the binary run
//! repeatedly against the same database file.

use crate::entities::{
    AgentOption, Artist, ArtistReview, Artwork, ArtworkLike, ArtworkView, Cart, Member,
    MemberActivity, SearchLog, SocialShare, Transaction,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Default location of the marketplace database when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/vortex_marketplace.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    prepare_sqlite_location(&database_url)?;
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// File path of a `sqlite://` URL, without query parameters.
///
/// In-memory URLs have no path.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?.split('?').next()?;
    (!path.is_empty() && !path.starts_with(':')).then(|| Path::new(path))
}

/// Creates the directory that will hold a `SQLite` database file.
///
/// `mode=rwc` creates the file but not its parent directory.
pub fn prepare_sqlite_location(database_url: &str) -> Result<()> {
    if let Some(parent) = sqlite_file_path(database_url)
        .and_then(Path::parent)
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
        debug!("Ensured database directory {}", parent.display());
    }
    Ok(())
}

/// Creates every marketplace table from its entity definition.
///
/// Parents are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = [
        schema.create_table_from_entity(Artist),
        schema.create_table_from_entity(Artwork),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(ArtworkView),
        schema.create_table_from_entity(ArtworkLike),
        schema.create_table_from_entity(Cart),
        schema.create_table_from_entity(ArtistReview),
        schema.create_table_from_entity(SocialShare),
        schema.create_table_from_entity(Member),
        schema.create_table_from_entity(MemberActivity),
        schema.create_table_from_entity(SearchLog),
        schema.create_table_from_entity(AgentOption),
    ];

    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    info!("Ensured {} marketplace tables exist", tables.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        AgentOptionModel, ArtistModel, ArtworkModel, CartModel, MemberActivityModel,
        SearchLogModel, SocialShareModel, TransactionModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ArtistModel> = Artist::find().limit(1).all(&db).await?;
        let _: Vec<ArtworkModel> = Artwork::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<CartModel> = Cart::find().limit(1).all(&db).await?;
        let _: Vec<SocialShareModel> = SocialShare::find().limit(1).all(&db).await?;
        let _: Vec<MemberActivityModel> = MemberActivity::find().limit(1).all(&db).await?;
        let _: Vec<SearchLogModel> = SearchLog::find().limit(1).all(&db).await?;
        let _: Vec<AgentOptionModel> = AgentOption::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path(DEFAULT_DATABASE_URL),
            Some(Path::new("data/vortex_marketplace.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite://:memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/vortex"), None);
    }

    #[tokio::test]
    async fn test_connects_when_parent_directory_is_missing() -> Result<()> {
        let root = std::env::temp_dir().join(format!("vortex-insights-{}", std::process::id()));
        let file = root.join("nested").join("marketplace.sqlite");
        let url = format!("sqlite://{}?mode=rwc", file.display());

        prepare_sqlite_location(&url)?;
        assert!(root.join("nested").is_dir());

        let db = Database::connect(&url).await?;
        create_tables(&db).await?;
        drop(db);

        std::fs::remove_dir_all(&root)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
