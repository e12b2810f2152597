use showroom_database::*;

async fn memory(db_name: &str) -> Database {
    Database::builder().url("mem://").session("showroom_test", db_name).init().await.unwrap()
}

#[tokio::test]
async fn connects_in_memory_and_applies_schema() {
    let db = memory("schema").await;
    db.health().await.unwrap();
    assert_eq!(db.namespace(), "showroom_test");
    assert_eq!(db.database(), "schema");

    let versions: Vec<String> = db
        .query("SELECT VALUE record::id(id) FROM migration")
        .await
        .unwrap()
        .take(0)
        .unwrap();
    assert_eq!(versions, vec!["0001_catalog".to_owned()]);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = memory("idempotent").await;

    let report = db.migrate().await.unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, vec!["0001_catalog".to_owned()]);
}

#[tokio::test]
async fn brand_schema_enforces_name_length() {
    let db = memory("constraints").await;

    let too_long = "a".repeat(101);
    let result = db
        .query("CREATE brand CONTENT { name: $name } RETURN NONE")
        .bind(("name", too_long))
        .await
        .unwrap()
        .check();
    assert!(result.is_err());

    db.query("CREATE brand:acme CONTENT { name: 'Acme' } RETURN NONE")
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[tokio::test]
async fn missing_parameters_fail_validation() {
    let err = Database::builder().init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));

    let err = Database::builder().url("mem://").session("", "x").init().await.unwrap_err();
    assert!(matches!(err, DatabaseError::Validation { .. }));
}
