use squeeb_core::prelude::*;
use squeeb_core::{InsertQueryBuilder, PragmaQueryBuilder};

fn print_query(label: &str, query: &Query) {
    match query.error() {
        Some(error) => println!("{label}: <error: {error}>"),
        None => println!("{label}: {}  {:?}", query.text(), query.args()),
    }
}

fn main() {
    // SELECT with a mixed AND / OR sequence
    let select_query = select("albums")
        .columns(["id", "title"])
        .where_(
            where_("year").greater_than_equals(1970)
                .and().where_("title").like("%Live%")
                .or().where_("artist_id").is_in([1, 2, 3]),
        )
        .order_by("year", SortDirection::Desc)
        .limit(10)
        .build();
    print_query("SELECT", &select_query);

    // Parenthesized groups
    let grouped = select("tracks")
        .where_(
            where_("length").less_than(300)
                .and()
                .where_predicate(or_group([
                    where_("genre").equals("ambient"),
                    where_("genre").equals("krautrock"),
                ])),
        )
        .build();
    print_query("GROUPED", &grouped);

    // Optional filters: a None value drops the condition
    let wanted_year: Option<i64> = None;
    let optional = select("albums")
        .where_(where_("title").like("Tr%").and().where_("year").equals(wanted_year))
        .build();
    print_query("OPTIONAL", &optional);

    // INSERT, one row and several
    let insert_query = insert("artists")
        .values(ValueMap::new().with("name", "Can").with("formed", 1968))
        .build();
    print_query("INSERT", &insert_query);

    let rows = vec![
        ValueMap::new().with("title", "Tago Mago").with("year", 1971),
        ValueMap::new().with("title", "Ege Bamyasi").with("year", 1972),
    ];
    print_query("INSERT MANY", &InsertQueryBuilder::new("albums").values(rows).build());

    // UPDATE binds SET values before WHERE values
    let update_query = update("albums")
        .values([("title", "Future Days")])
        .where_(where_("id").equals(3))
        .build();
    print_query("UPDATE", &update_query);

    // DELETE refuses to build without a WHERE clause
    print_query("DELETE", &delete("albums").where_(where_("id").equals(3)).build());
    print_query("DELETE ALL", &delete("albums").build());

    // Schema driven DDL
    let artists = TableSchema::builder("artists")
        .column("id", Column::integer().constraint(PrimaryKey::new().autoincrement()))
        .column("name", Column::text().constraint(Constraint::not_null()))
        .build()
        .expect("valid artists schema");
    let albums = TableSchema::builder("albums")
        .column("id", Column::integer().constraint(PrimaryKey::new().autoincrement()))
        .column("title", Column::text().constraint(Constraint::not_null()))
        .column(
            "artist_id",
            Column::integer().constraint(
                ForeignKey::references(&artists, "id")
                    .expect("artists has an id column")
                    .on_delete(KeyAction::Cascade),
            ),
        )
        .index(TableIndex::new(["artist_id", "title"]).unique())
        .build()
        .expect("valid albums schema");

    print_query("CREATE TABLE", &albums.create_table_query().build());
    for index in albums.create_index_queries() {
        print_query("CREATE INDEX", &index.build());
    }

    print_query("PRAGMA", &PragmaQueryBuilder::new("foreign_keys").value(true).build());
}
