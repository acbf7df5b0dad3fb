mod common;

use pretty_assertions::assert_eq;
use rstest::rstest;

use common::{user1, FakeDatabase, USER1_CREATE};
use table_sync::config::{Config, DatabaseConfig, LoggingConfig};
use table_sync::{
    CompositeIndexSpec, Error, FieldDescriptor, IndexSpec, SchemaDiff, SyncConfig, SyncMode,
    Synchronizer, TableDescriptor, TableErrorPolicy, TableState, TableSyncClient, ValueKind,
};

fn sync_config(mode: SyncMode) -> SyncConfig {
    SyncConfig {
        mode,
        packages: vec!["app::entity".to_string()],
        ..SyncConfig::default()
    }
}

fn client(sync: SyncConfig) -> TableSyncClient {
    TableSyncClient::new(Config {
        database: DatabaseConfig {
            url: "mysql://localhost/test".to_string(),
            connect_timeout_seconds: None,
        },
        sync,
        logging: None::<LoggingConfig>,
    })
}

async fn plan(config: &SyncConfig, tables: &[TableDescriptor], db: &FakeDatabase) -> SchemaDiff {
    Synchronizer::new(config).plan(tables, db).await.unwrap()
}

#[tokio::test]
async fn recreate_mode_drops_then_creates() {
    let config = sync_config(SyncMode::Create);
    let db = FakeDatabase::new().with_table("user1", &["id"]);

    let diff = plan(&config, &[user1()], &db).await;

    assert_eq!(
        diff.statements(),
        vec!["DROP TABLE IF EXISTS user1;".to_string(), USER1_CREATE.to_string()]
    );
    assert!(diff.deferred.is_empty());
    assert_eq!(diff.tables[0].state, TableState::CreateFresh);
}

#[tokio::test]
async fn update_mode_adds_missing_column_as_deferred_alter() {
    let config = sync_config(SyncMode::Update);
    let db = FakeDatabase::new().with_table("user1", &["id", "username"]);

    let diff = plan(&config, &[user1()], &db).await;

    assert!(diff.immediate.is_empty());
    assert_eq!(
        diff.deferred,
        vec!["ALTER TABLE user1 ADD COLUMN sex INTEGER COMMENT \"\"".to_string()]
    );
    assert_eq!(
        diff.tables[0].state,
        TableState::UpdateExisting { added_columns: 1 }
    );
}

#[tokio::test]
async fn update_mode_creates_missing_table() {
    let config = sync_config(SyncMode::Update);
    let db = FakeDatabase::new();

    let diff = plan(&config, &[user1()], &db).await;

    assert_eq!(diff.immediate, vec![USER1_CREATE.to_string()]);
    assert!(diff.deferred.is_empty());
    assert_eq!(diff.tables[0].state, TableState::CreateMissing);
}

#[tokio::test]
async fn missing_indexed_column_also_gets_its_index() {
    let config = sync_config(SyncMode::Update);
    let db = FakeDatabase::new().with_table("account", &["id"]);
    let account = TableDescriptor::new("app::entity::Account", "account")
        .field(FieldDescriptor::new("id", ValueKind::Int64).primary_key(true))
        .field(
            FieldDescriptor::new("email", ValueKind::String)
                .length(120)
                .index(IndexSpec::unique().named("uk_email")),
        );

    let diff = plan(&config, &[account], &db).await;

    assert_eq!(
        diff.deferred,
        vec![
            "ALTER TABLE account ADD COLUMN email VARCHAR(120) COMMENT \"\"".to_string(),
            "ALTER TABLE account ADD UNIQUE INDEX uk_email (email)".to_string(),
        ]
    );
}

#[tokio::test]
async fn second_update_run_is_a_no_op() {
    let mut sync = sync_config(SyncMode::Update);
    sync.show_sql = true;
    let mut client = client(sync);
    client.registry_mut().register_descriptor(user1(), false);
    let db = FakeDatabase::new().with_table("user1", &["id", "username"]);

    let first = client.plan_with(&db).await.unwrap();
    assert_eq!(client.apply(&first, &db).await.unwrap(), 1);
    assert_eq!(
        db.columns("user1").unwrap(),
        vec!["id".to_string(), "username".to_string(), "sex".to_string()]
    );

    let second = client.plan_with(&db).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(
        second.tables[0].state,
        TableState::UpdateExisting { added_columns: 0 }
    );
}

#[tokio::test]
async fn creates_run_before_alters_across_tables() {
    let config = sync_config(SyncMode::Update);
    let db = FakeDatabase::new().with_table("user1", &["id", "username"]);
    let orders = TableDescriptor::new("app::entity::Order", "orders")
        .field(FieldDescriptor::new("id", ValueKind::Int64).primary_key(true))
        .field(FieldDescriptor::new("userId", ValueKind::Int64))
        .index(CompositeIndexSpec::on_fields(&["userId"]));

    let diff = plan(&config, &[user1(), orders], &db).await;
    let statements = diff.statements();

    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS orders("));
    assert!(statements[0].contains("INDEX user_id (user_id)"));
    assert!(statements[1].starts_with("ALTER TABLE user1 ADD COLUMN sex"));
}

#[tokio::test]
async fn unchecked_tables_are_skipped() {
    let config = sync_config(SyncMode::Create);
    let db = FakeDatabase::new();

    let diff = plan(&config, &[user1().check(false)], &db).await;

    assert!(diff.is_empty());
    assert_eq!(diff.tables[0].state, TableState::Skipped);
}

#[rstest]
#[case(SyncMode::Create)]
#[case(SyncMode::Update)]
#[tokio::test]
async fn blank_table_name_aborts_by_default(#[case] mode: SyncMode) {
    let config = sync_config(mode);
    let db = FakeDatabase::new();
    let broken = TableDescriptor::new("app::entity::Broken", " ")
        .field(FieldDescriptor::new("id", ValueKind::Int64));

    let result = Synchronizer::new(&config)
        .plan(&[user1(), broken], &db)
        .await;

    match result {
        Err(Error::ConfigError(message)) => assert!(message.contains("app::entity::Broken")),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[tokio::test]
async fn skip_policy_drops_only_the_failing_table() {
    let mut config = sync_config(SyncMode::Create);
    config.on_table_error = TableErrorPolicy::Skip;
    let db = FakeDatabase::new();
    let broken = TableDescriptor::new("app::entity::Broken", "");
    let two_keys = TableDescriptor::new("app::entity::TwoKeys", "two_keys")
        .field(FieldDescriptor::new("a", ValueKind::Int64).primary_key(true))
        .field(FieldDescriptor::new("b", ValueKind::Int64).primary_key(true));

    let diff = plan(&config, &[broken, two_keys, user1()], &db).await;

    assert_eq!(
        diff.statements(),
        vec!["DROP TABLE IF EXISTS user1;".to_string(), USER1_CREATE.to_string()]
    );
    assert_eq!(diff.tables[0].table, "app::entity::Broken");
    assert_eq!(diff.tables[0].state, TableState::NoName);
    assert_eq!(diff.tables[1].table, "two_keys");
    assert!(matches!(diff.tables[1].state, TableState::Failed { .. }));
    assert_eq!(diff.tables[2].state, TableState::CreateFresh);
}

fn invalid_descriptors() -> Vec<TableDescriptor> {
    vec![
        TableDescriptor::new("app::entity::TwoKeys", "t")
            .field(FieldDescriptor::new("a", ValueKind::Int64).primary_key(true))
            .field(FieldDescriptor::new("b", ValueKind::Int64).primary_key(true)),
        TableDescriptor::new("app::entity::EmptyIndex", "t")
            .field(FieldDescriptor::new("a", ValueKind::Int64))
            .field(FieldDescriptor::new("b", ValueKind::Int64))
            .index(CompositeIndexSpec::default()),
    ]
}

#[rstest]
#[case(0)]
#[case(1)]
#[tokio::test]
async fn update_of_existing_table_rejects_invalid_descriptor(#[case] which: usize) {
    let config = sync_config(SyncMode::Update);
    let db = FakeDatabase::new().with_table("t", &["a"]);
    let descriptor = invalid_descriptors().swap_remove(which);

    let result = Synchronizer::new(&config).plan(&[descriptor], &db).await;

    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[tokio::test]
async fn update_of_existing_table_skips_invalid_descriptor() {
    let mut config = sync_config(SyncMode::Update);
    config.on_table_error = TableErrorPolicy::Skip;
    let db = FakeDatabase::new()
        .with_table("t", &["a"])
        .with_table("user1", &["id", "username"]);
    let mut tables = invalid_descriptors();
    tables.push(user1());

    let diff = plan(&config, &tables, &db).await;

    assert_eq!(
        diff.statements(),
        vec!["ALTER TABLE user1 ADD COLUMN sex INTEGER COMMENT \"\"".to_string()]
    );
    assert!(matches!(diff.tables[0].state, TableState::Failed { .. }));
    assert!(matches!(diff.tables[1].state, TableState::Failed { .. }));
}

#[tokio::test]
async fn probe_errors_are_fatal_even_when_skipping() {
    let mut config = sync_config(SyncMode::Update);
    config.on_table_error = TableErrorPolicy::Skip;
    let db = FakeDatabase::new().failing_probes("Access denied");

    let result = Synchronizer::new(&config).plan(&[user1()], &db).await;

    assert!(matches!(result, Err(Error::ProbeError { .. })));
}

#[tokio::test]
async fn none_mode_plans_nothing() {
    let config = sync_config(SyncMode::None);
    let db = FakeDatabase::new();

    let diff = plan(&config, &[user1()], &db).await;

    assert!(diff.is_empty());
    assert!(diff.tables.is_empty());
}

#[tokio::test]
async fn dry_run_executes_nothing() {
    let mut sync = sync_config(SyncMode::Create);
    sync.dry_run = true;
    let mut client = client(sync);
    client.registry_mut().register_descriptor(user1(), false);
    let db = FakeDatabase::new();

    let diff = client.plan_with(&db).await.unwrap();
    let executed = client.apply(&diff, &db).await.unwrap();

    assert_eq!(diff.len(), 2);
    assert_eq!(executed, 0);
    assert!(db.executed().is_empty());
}

#[tokio::test]
async fn none_mode_sync_never_connects() {
    // The URL is unreachable, so this only passes if no connection is attempted
    let client = client(sync_config(SyncMode::None));

    let diff = client.sync_database().await.unwrap();

    assert!(diff.is_empty());
}

#[test]
fn diff_serializes_table_states() {
    let mut diff = SchemaDiff::new();
    diff.push_deferred("ALTER TABLE user1 ADD COLUMN sex INTEGER COMMENT \"\"".to_string());
    diff.record("user1", TableState::UpdateExisting { added_columns: 1 });

    let json = serde_json::to_value(&diff).unwrap();

    assert_eq!(json["tables"][0]["table"], "user1");
    assert_eq!(json["tables"][0]["state"]["kind"], "update_existing");
    assert_eq!(json["tables"][0]["state"]["added_columns"], 1);
}
