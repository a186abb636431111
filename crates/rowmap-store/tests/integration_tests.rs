//! End-to-end tests: CSV round trip into the in-memory engine

use pretty_assertions::assert_eq;
use rowmap_csv::CsvTable;
use rowmap_sql::table_name_for;
use rowmap_store::{CommandLog, ExecError, MemoryExecutor, RecordStore, StoreError};

rowmap_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Make {
        Chevy => "CHEVY",
        Ford => "FORD",
        Toyota => "TOYOTA",
        Hyundai => "HYUNDAI",
    }
}

rowmap_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Size {
        Compact => "COMPACT",
        Intermediate => "INTERMEDIATE",
        FullSize => "FULL_SIZE",
    }
}

rowmap_core::record! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Vehicle {
        pub make: Make,
        pub size: Size,
        pub weight: f64,
        pub engine_size: f64,
    }
}

fn fleet() -> Vec<Vehicle> {
    vec![
        Vehicle { make: Make::Chevy, size: Size::FullSize, weight: 3400.5, engine_size: 190.0 },
        Vehicle { make: Make::Ford, size: Size::Intermediate, weight: 2300.0, engine_size: 150.25 },
        Vehicle { make: Make::Toyota, size: Size::Compact, weight: 1720.75, engine_size: 110.0 },
        Vehicle { make: Make::Hyundai, size: Size::FullSize, weight: 2800.0, engine_size: 175.5 },
    ]
}

#[tokio::test]
async fn csv_round_trip_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let table = table_name_for::<Vehicle>();
    assert_eq!(table, "Vehicles");

    CsvTable::save(&fleet(), dir.path()).unwrap();
    let report = CsvTable::load::<Vehicle>(&dir.path().join(CsvTable::file_name::<Vehicle>())).unwrap();
    assert!(report.is_clean());

    let log = CommandLog::open(dir.path().join("database_log.txt")).unwrap();
    let store = RecordStore::new(MemoryExecutor::new()).with_log(log);

    store.create_table::<Vehicle>(&table).await.unwrap();
    assert_eq!(store.insert_all(&table, &report.records).await.unwrap(), 4);

    let all = store.select(&table, "*", "").await.unwrap();
    assert_eq!(
        all.render(),
        "CHEVY FULL_SIZE 3400.5 190.0\n\
         FORD INTERMEDIATE 2300.0 150.25\n\
         TOYOTA COMPACT 1720.75 110.0\n\
         HYUNDAI FULL_SIZE 2800.0 175.5\n"
    );

    let picked = store
        .select(&table, "*", "Make = 'CHEVY' OR Make = 'TOYOTA'")
        .await
        .unwrap();
    assert_eq!(picked.len(), 2);
    assert_eq!(picked.get(1, "make"), Some("TOYOTA"));

    let heavy = store.select(&table, "make, weight", "Weight > 2500").await.unwrap();
    assert_eq!(heavy.render(), "CHEVY 3400.5\nHYUNDAI 2800.0\n");

    store.drop_table(&table).await.unwrap();

    let contents = store.log().unwrap().contents().unwrap();
    assert_eq!(contents.matches("Executing command: ").count(), 9);
    assert_eq!(contents.matches("Command executed successfully (query)").count(), 3);
    assert!(contents.contains("Executing command: DROP TABLE Vehicles"));
}

#[tokio::test]
async fn enum_column_width_rejects_longer_text() {
    let store = RecordStore::new(MemoryExecutor::new());
    store.create_table::<Vehicle>("Vehicles").await.unwrap();

    // make is VARCHAR(10): the longest variant is shorter than the minimum
    let err = store
        .execute("INSERT INTO Vehicles (make, size, weight, engine_size) VALUES ('MERCEDES-BENZ', 'COMPACT', 1.0, 1.0)")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Exec(ExecError::Constraint(_))));

    // size is VARCHAR(12): INTERMEDIATE fits exactly
    store
        .execute("INSERT INTO Vehicles (make, size, weight, engine_size) VALUES ('FORD', 'INTERMEDIATE', 1.0, 1.0)")
        .await
        .unwrap();
}

#[tokio::test]
async fn dropping_a_missing_table_fails() {
    let store = RecordStore::new(MemoryExecutor::new());

    let err = store.drop_table("Vehicles").await.unwrap_err();
    assert!(matches!(err, StoreError::Exec(ExecError::TableNotFound(_))));
    assert_eq!(store.executor().history().await, vec!["DROP TABLE Vehicles".to_string()]);
}
