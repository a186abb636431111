//! Generated statements must be valid SQL

use rowmap_sql::{create_table_for, insert_for, QueryBuilder};
use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

rowmap_core::sql_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Make {
        Chevy => "CHEVY",
        Ford => "FORD",
        Toyota => "TOYOTA",
        Nissan => "NISSAN",
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

fn parse_one(sql: &str) -> Statement {
    let mut statements = Parser::parse_sql(&GenericDialect {}, sql)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", sql, e));
    assert_eq!(statements.len(), 1, "expected exactly one statement in {:?}", sql);
    statements.remove(0)
}

#[test]
fn create_table_parses() {
    let sql = create_table_for::<Vehicle>("Vehicles").unwrap();
    assert_eq!(
        sql,
        "CREATE TABLE Vehicles (make VARCHAR(10), size VARCHAR(12), weight DOUBLE, engine_size DOUBLE)"
    );
    assert!(matches!(parse_one(&sql), Statement::CreateTable(_)));
}

#[test]
fn insert_parses() {
    let vehicle = Vehicle {
        make: Make::Toyota,
        size: Size::FullSize,
        weight: 3012.5,
        engine_size: 171.0,
    };

    let sql = insert_for("Vehicles", &vehicle).unwrap();
    assert_eq!(
        sql,
        "INSERT INTO Vehicles (make, size, weight, engine_size) VALUES ('TOYOTA', 'FULL_SIZE', 3012.5, 171.0)"
    );
    assert!(matches!(parse_one(&sql), Statement::Insert(_)));
}

#[test]
fn select_parses() {
    for where_clause in ["", "Make = 'CHEVY' OR Make = 'TOYOTA'", "Weight > 2500"] {
        let sql = QueryBuilder::select("Vehicles", "*", where_clause).unwrap();
        assert!(matches!(parse_one(&sql), Statement::Query(_)));
    }
}

#[test]
fn delete_and_drop_parse() {
    let sql = QueryBuilder::delete("Vehicles", "Weight < 1600").unwrap();
    assert!(matches!(parse_one(&sql), Statement::Delete(_)));

    let sql = QueryBuilder::drop_table("Vehicles").unwrap();
    assert!(matches!(parse_one(&sql), Statement::Drop { .. }));
}

#[test]
fn gated_fragment_cannot_smuggle_a_second_statement() {
    assert!(QueryBuilder::select("Vehicles", "*", "1=1; DROP TABLE Vehicles").is_err());
    assert!(QueryBuilder::drop_table("Vehicles; DROP TABLE Owners").is_err());
}
