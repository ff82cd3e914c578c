use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use squeeb::prelude::*;
use squeeb::{Result, TransactionBehavior};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

struct Library {
    registry: SchemaRegistry,
    artists: Arc<TableSchema>,
    albums: Arc<TableSchema>,
    tracks: Arc<TableSchema>,
}

static LIBRARY: Lazy<Library> = Lazy::new(|| {
    let mut registry = SchemaRegistry::new();
    let id = || Column::integer().constraint(PrimaryKey::new().autoincrement());

    let artists = registry
        .define_table(
            "library",
            TableSchema::builder("artists")
                .column("id", id())
                .column("name", Column::text().constraint(Constraint::not_null())),
        )
        .expect("artists schema");

    let albums = registry
        .define_table(
            "library",
            TableSchema::builder("albums")
                .column("id", id())
                .column("title", Column::text().constraint(Constraint::not_null()))
                .column("year", Column::integer())
                .column(
                    "artist_id",
                    Column::integer().constraint(
                        ForeignKey::references(&artists, "id")
                            .expect("artists.id")
                            .on_delete(KeyAction::Cascade),
                    ),
                ),
        )
        .expect("albums schema");

    let tracks = registry
        .define_table(
            "library",
            TableSchema::builder("tracks")
                .column("id", id())
                .column("title", Column::text().constraint(Constraint::not_null()))
                .column("number", Column::integer().named("track_number"))
                .column("seconds", Column::integer().named("length_seconds"))
                .column(
                    "album_id",
                    Column::integer().constraint(
                        ForeignKey::references(&albums, "id")
                            .expect("albums.id")
                            .on_delete(KeyAction::Cascade),
                    ),
                )
                .index(TableIndex::new(["album_id", "track_number"]).unique()),
        )
        .expect("tracks schema");

    Library {
        registry,
        artists,
        albums,
        tracks,
    }
});

macro_rules! model {
    ($ty:ty, $table:ident) => {
        impl Model for $ty {
            fn schema() -> Arc<TableSchema> {
                Arc::clone(&LIBRARY.$table)
            }

            fn id(&self) -> Option<i64> {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = Some(id);
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Artist {
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Album {
    id: Option<i64>,
    title: String,
    year: Option<i64>,
    artist_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Track {
    id: Option<i64>,
    title: String,
    number: i64,
    seconds: i64,
    album_id: i64,
}

model!(Artist, artists);
model!(Album, albums);
model!(Track, tracks);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("squeeb=info")),
        )
        .init();

    println!("=== Squeeb - Music Library Example ===\n");

    let mut db = Database::connect(&DatabaseConfig::in_memory("library")).await?;
    db.init_tables(&LIBRARY.registry).await?;

    // Models
    let mut can = Artist {
        id: None,
        name: "Can".to_string(),
    };
    can.save(&mut db).await?;

    let mut tago = Album {
        id: None,
        title: "Tago Mago".to_string(),
        year: Some(1971),
        artist_id: can.id.unwrap_or_default(),
    };
    tago.save(&mut db).await?;
    println!("1. Saved {} (#{:?}) and {} (#{:?})", can.name, can.id, tago.title, tago.id);

    // Bulk save in one transaction
    let album_id = tago.id.unwrap_or_default();
    let mut tracks: ModelList<Track> = [
        ("Paperhouse", 450),
        ("Mushroom", 243),
        ("Oh Yeah", 443),
        ("Halleluhwah", 1110),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (title, seconds))| Track {
        id: None,
        title: title.to_string(),
        number: i as i64 + 1,
        seconds,
        album_id,
    })
    .collect();
    tracks.save_all(&db).await?;
    println!("2. Saved {} tracks with ids {:?}", tracks.len(), tracks.ids());

    // Conditions, groups and ordering
    let long_tracks = Track::find_where(
        &mut db,
        where_("album_id")
            .equals(album_id)
            .and()
            .where_predicate(or_group([
                where_("length_seconds").greater_than(600),
                where_("title").like("Oh%"),
            ])),
    )
    .await?;
    for track in &long_tracks {
        println!("3. Matched {} ({}s)", track.title, track.seconds);
    }

    let query = select("tracks")
        .columns(["title", "length_seconds"])
        .where_(where_("track_number").is_in([1, 2]))
        .order_by("length_seconds", SortDirection::Desc)
        .build();
    println!("4. SQL: {}\n   Parameters: {:?}", query.text(), query.args());
    for row in db.fetch_all(&query).await? {
        println!("   {}", row.into_json());
    }

    // Explicit transaction with a savepoint
    let mut tx = db.begin(Some(TransactionBehavior::Immediate)).await?;
    tx.savepoint("retitle").await?;
    tx.run(
        &update("albums")
            .values([("title", "Tago Mago (Remastered)")])
            .where_(where_("id").equals(album_id)),
    )
    .await?;
    tx.rollback_to_savepoint("retitle").await?;
    tx.release_savepoint("retitle").await?;
    tx.commit().await?;
    tago.refresh(&mut db).await?;
    println!("5. Title after rolled back savepoint: {}", tago.title);

    // A DELETE without WHERE never reaches the database
    match db.execute(&delete("tracks").build()).await {
        Err(e) => println!("6. Refused: {}", e),
        Ok(_) => println!("6. Unexpectedly deleted every track"),
    }

    // Cascades through albums and tracks
    can.delete(&mut db).await?;
    println!("7. Tracks left after deleting the artist: {}", Track::all(&mut db).await?.len());

    db.close().await;
    println!("\n=== All examples completed successfully! ===");
    Ok(())
}
