use migration::Migrator;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::SchemaManager;

#[tokio::test]
async fn test_migrate_up_and_down() {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    Migrator::up(&db, None).await.unwrap();

    let manager = SchemaManager::new(&db);
    for table in ["csr", "subject_alt_name", "certificate", "access_log"] {
        assert!(manager.has_table(table).await.unwrap(), "{table} missing");
    }
    assert!(
        manager
            .has_index("csr", "index-Csr-Sha256sum-Unique")
            .await
            .unwrap()
    );

    Migrator::down(&db, None).await.unwrap();
    assert!(!manager.has_table("csr").await.unwrap());
}
