//! In-memory execution engine
//!
//! Parses each statement with `sqlparser` (generic dialect) and runs it
//! against tables held in memory. Nothing is persisted. It understands the
//! statement shapes the query builder emits:
//! - `CREATE TABLE` with typed columns
//! - `DROP TABLE [IF EXISTS]`
//! - `INSERT INTO ... (...) VALUES (...), ...` with literal values
//! - `SELECT` of `*` or named columns from one table, with an optional WHERE
//! - `DELETE FROM` one table, with an optional WHERE
//!
//! WHERE clauses support comparisons, `AND`, `OR`, `NOT`, `IS [NOT] NULL`
//! and parentheses. Identifiers are case-insensitive. Column types are
//! enforced, including `VARCHAR(n)` widths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let engine = MemoryExecutor::new();
//! engine.execute("CREATE TABLE Vehicles (make VARCHAR(10), weight DOUBLE)").await?;
//! engine.execute("INSERT INTO Vehicles (make, weight) VALUES ('CHEVY', 2600.0)").await?;
//! let outcome = engine.execute("SELECT * FROM Vehicles WHERE weight > 2500").await?;
//! ```

use crate::executor::{ExecError, ExecOutcome, ResultSet, SqlExecutor};
use sqlparser::ast::{
    BinaryOperator, CreateTable, Delete, Expr, FromTable, Insert, ObjectName, ObjectType, Query,
    SelectItem, SetExpr, Statement, TableFactor, TableWithJoins, UnaryOperator, Value,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Statements kept in the history unless configured otherwise
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// A stored value
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    /// Numeric literal, kept as written
    Number(String),
    Text(String),
    Bool(bool),
}

impl Cell {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Number(v) | Self::Text(v) => Some(v),
            Self::Bool(v) => Some(v.to_string()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => v.parse().ok(),
            _ => None,
        }
    }
}

/// Storage class of a column, derived from its declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnClass {
    Numeric,
    Boolean,
    Text { width: Option<usize> },
    Untyped,
}

impl ColumnClass {
    fn from_sql_type(sql_type: &str) -> Self {
        let upper = sql_type.to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or_default().trim();

        match base {
            "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "DOUBLE"
            | "DOUBLE PRECISION" | "FLOAT" | "REAL" | "DECIMAL" | "NUMERIC" => Self::Numeric,
            "BOOLEAN" | "BOOL" => Self::Boolean,
            "VARCHAR" | "CHARACTER VARYING" | "CHAR" | "CHARACTER" | "TEXT" | "STRING" => {
                Self::Text {
                    width: declared_width(&upper),
                }
            }
            _ => Self::Untyped,
        }
    }
}

/// `n` in `TYPE(n)`
fn declared_width(sql_type: &str) -> Option<usize> {
    let start = sql_type.find('(')? + 1;
    let end = start + sql_type[start..].find(')')?;
    sql_type[start..end].trim().parse().ok()
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    class: ColumnClass,
}

#[derive(Debug, Clone)]
struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    fn column_index(&self, name: &str) -> Result<usize, ExecError> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ExecError::ColumnNotFound(format!("{}.{}", self.name, name)))
    }

    fn check(&self, index: usize, cell: &Cell) -> Result<(), ExecError> {
        let column = &self.columns[index];
        let ok = match (column.class, cell) {
            (_, Cell::Null) | (ColumnClass::Untyped, _) => true,
            (ColumnClass::Numeric, Cell::Number(_)) => true,
            (ColumnClass::Boolean, Cell::Bool(_)) => true,
            (ColumnClass::Text { width }, Cell::Text(v)) => {
                if let Some(width) = width {
                    if v.chars().count() > width {
                        return Err(ExecError::Constraint(format!(
                            "value '{}' is longer than {} characters for column {}",
                            v, width, column.name
                        )));
                    }
                }
                true
            }
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(ExecError::Constraint(format!(
                "value {:?} does not match the type of column {}",
                cell, column.name
            )))
        }
    }
}

/// In-memory execution engine
///
/// Clones share the same tables.
pub struct MemoryExecutor {
    /// Tables keyed by upper-cased name
    tables: Arc<RwLock<HashMap<String, Table>>>,

    /// Most recent statements received, oldest first
    history: Arc<RwLock<VecDeque<String>>>,

    history_limit: usize,
}

impl MemoryExecutor {
    /// Create an engine with no tables
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an engine that remembers at most `limit` statements
    ///
    /// A limit of 0 disables the history.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
            history: Arc::new(RwLock::new(VecDeque::new())),
            history_limit: limit,
        }
    }

    /// Recent statements, including failed ones, oldest first
    pub async fn history(&self) -> Vec<String> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }

    async fn remember(&self, statement: &str) {
        if self.history_limit == 0 {
            return;
        }

        let mut history = self.history.write().await;
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(statement.to_string());
    }

    /// Whether a table exists
    pub async fn has_table(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(&table_key(name))
    }

    /// Number of rows in a table
    pub async fn row_count(&self, name: &str) -> Option<usize> {
        self.tables
            .read()
            .await
            .get(&table_key(name))
            .map(|t| t.rows.len())
    }

    fn run(
        tables: &mut HashMap<String, Table>,
        statement: Statement,
    ) -> Result<ExecOutcome, ExecError> {
        match statement {
            Statement::CreateTable(create) => create_table(tables, &create),
            Statement::Drop {
                object_type: ObjectType::Table,
                if_exists,
                names,
                ..
            } => drop_tables(tables, &names, if_exists),
            Statement::Insert(insert) => insert_rows(tables, &insert),
            Statement::Query(query) => select(tables, &query).map(ExecOutcome::Rows),
            Statement::Delete(delete) => delete_rows(tables, &delete),
            other => Err(ExecError::Unsupported(other.to_string())),
        }
    }
}

impl Default for MemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MemoryExecutor {
    fn clone(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            history: Arc::clone(&self.history),
            history_limit: self.history_limit,
        }
    }
}

#[async_trait::async_trait]
impl SqlExecutor for MemoryExecutor {
    fn name(&self) -> &'static str {
        "Memory"
    }

    async fn execute(&self, statement: &str) -> Result<ExecOutcome, ExecError> {
        self.remember(statement).await;

        let mut statements = Parser::parse_sql(&GenericDialect {}, statement)
            .map_err(|e| ExecError::Syntax(e.to_string()))?;

        if statements.len() != 1 {
            return Err(ExecError::Unsupported(format!(
                "expected one statement, found {}",
                statements.len()
            )));
        }

        let mut tables = self.tables.write().await;
        Self::run(&mut tables, statements.remove(0))
    }
}

fn table_key(name: &str) -> String {
    name.to_ascii_uppercase()
}

fn object_key(name: &ObjectName) -> String {
    table_key(&name.to_string())
}

fn create_table(
    tables: &mut HashMap<String, Table>,
    create: &CreateTable,
) -> Result<ExecOutcome, ExecError> {
    let key = object_key(&create.name);
    if tables.contains_key(&key) {
        if create.if_not_exists {
            return Ok(ExecOutcome::Affected { count: 0 });
        }
        return Err(ExecError::TableExists(create.name.to_string()));
    }

    if create.columns.is_empty() {
        return Err(ExecError::Unsupported("CREATE TABLE without columns".to_string()));
    }

    let columns = create
        .columns
        .iter()
        .map(|def| Column {
            name: def.name.value.clone(),
            class: ColumnClass::from_sql_type(&def.data_type.to_string()),
        })
        .collect();

    tables.insert(
        key,
        Table {
            name: create.name.to_string(),
            columns,
            rows: Vec::new(),
        },
    );

    Ok(ExecOutcome::Affected { count: 0 })
}

fn drop_tables(
    tables: &mut HashMap<String, Table>,
    names: &[ObjectName],
    if_exists: bool,
) -> Result<ExecOutcome, ExecError> {
    for name in names {
        if !tables.contains_key(&object_key(name)) && !if_exists {
            return Err(ExecError::TableNotFound(name.to_string()));
        }
    }

    for name in names {
        tables.remove(&object_key(name));
    }

    Ok(ExecOutcome::Affected { count: 0 })
}

fn table_mut<'a>(
    tables: &'a mut HashMap<String, Table>,
    name: &ObjectName,
) -> Result<&'a mut Table, ExecError> {
    tables
        .get_mut(&object_key(name))
        .ok_or_else(|| ExecError::TableNotFound(name.to_string()))
}

fn insert_rows(
    tables: &mut HashMap<String, Table>,
    insert: &Insert,
) -> Result<ExecOutcome, ExecError> {
    let table = table_mut(tables, &insert.table_name)?;

    let source = insert
        .source
        .as_ref()
        .ok_or_else(|| ExecError::Unsupported("INSERT without VALUES".to_string()))?;
    let values = match source.body.as_ref() {
        SetExpr::Values(values) => values,
        other => return Err(ExecError::Unsupported(other.to_string())),
    };

    let targets = if insert.columns.is_empty() {
        (0..table.columns.len()).collect::<Vec<_>>()
    } else {
        insert
            .columns
            .iter()
            .map(|ident| table.column_index(&ident.value))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut new_rows = Vec::with_capacity(values.rows.len());
    for exprs in &values.rows {
        if exprs.len() != targets.len() {
            return Err(ExecError::QueryError(format!(
                "{} values supplied for {} columns",
                exprs.len(),
                targets.len()
            )));
        }

        let mut row = vec![Cell::Null; table.columns.len()];
        for (&index, expr) in targets.iter().zip(exprs) {
            let cell = literal(expr)?;
            table.check(index, &cell)?;
            row[index] = cell;
        }
        new_rows.push(row);
    }

    let count = new_rows.len() as u64;
    table.rows.extend(new_rows);
    Ok(ExecOutcome::Affected { count })
}

fn single_table(from: &[TableWithJoins]) -> Result<&ObjectName, ExecError> {
    match from {
        [only] if only.joins.is_empty() => match &only.relation {
            TableFactor::Table { name, .. } => Ok(name),
            other => Err(ExecError::Unsupported(other.to_string())),
        },
        _ => Err(ExecError::Unsupported(
            "exactly one table without joins is supported".to_string(),
        )),
    }
}

fn select(tables: &HashMap<String, Table>, query: &Query) -> Result<ResultSet, ExecError> {
    let select = match query.body.as_ref() {
        SetExpr::Select(select) => select,
        other => return Err(ExecError::Unsupported(other.to_string())),
    };

    let name = single_table(&select.from)?;
    let table = tables
        .get(&object_key(name))
        .ok_or_else(|| ExecError::TableNotFound(name.to_string()))?;

    let mut names = Vec::new();
    let mut indices = Vec::new();
    for item in &select.projection {
        match item {
            SelectItem::Wildcard(_) => {
                for (index, column) in table.columns.iter().enumerate() {
                    names.push(column.name.clone());
                    indices.push(index);
                }
            }
            SelectItem::UnnamedExpr(Expr::Identifier(ident)) => {
                indices.push(table.column_index(&ident.value)?);
                names.push(ident.value.clone());
            }
            SelectItem::ExprWithAlias {
                expr: Expr::Identifier(ident),
                alias,
            } => {
                indices.push(table.column_index(&ident.value)?);
                names.push(alias.value.clone());
            }
            other => return Err(ExecError::Unsupported(other.to_string())),
        }
    }

    let mut result = ResultSet::new(names);
    for row in &table.rows {
        if !matches_filter(select.selection.as_ref(), table, row)? {
            continue;
        }
        result
            .rows
            .push(indices.iter().map(|&i| row[i].clone().into_text()).collect());
    }

    Ok(result)
}

fn delete_rows(
    tables: &mut HashMap<String, Table>,
    delete: &Delete,
) -> Result<ExecOutcome, ExecError> {
    let from = match &delete.from {
        FromTable::WithFromKeyword(from) | FromTable::WithoutKeyword(from) => from,
    };
    let name = single_table(from)?;
    let table = table_mut(tables, name)?;

    let mut doomed = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        doomed.push(matches_filter(delete.selection.as_ref(), table, row)?);
    }

    let before = table.rows.len();
    let mut flags = doomed.into_iter();
    table.rows.retain(|_| !flags.next().unwrap_or(false));

    let count = (before - table.rows.len()) as u64;
    Ok(ExecOutcome::Affected { count })
}

fn matches_filter(filter: Option<&Expr>, table: &Table, row: &[Cell]) -> Result<bool, ExecError> {
    match filter {
        None => Ok(true),
        Some(expr) => Ok(eval(expr, table, row)? == Cell::Bool(true)),
    }
}

/// Evaluate a constant expression
fn literal(expr: &Expr) -> Result<Cell, ExecError> {
    match expr {
        Expr::Value(value) => value_cell(value),
        Expr::Nested(inner) => literal(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Minus,
            expr,
        } => negate(literal(expr)?),
        Expr::UnaryOp {
            op: UnaryOperator::Plus,
            expr,
        } => literal(expr),
        other => Err(ExecError::Unsupported(format!("non-literal value {}", other))),
    }
}

fn value_cell(value: &Value) -> Result<Cell, ExecError> {
    match value {
        Value::Number(n, _) => Ok(Cell::Number(n.to_string())),
        Value::SingleQuotedString(s) => Ok(Cell::Text(s.clone())),
        Value::Boolean(b) => Ok(Cell::Bool(*b)),
        Value::Null => Ok(Cell::Null),
        other => Err(ExecError::Unsupported(format!("literal {}", other))),
    }
}

fn negate(cell: Cell) -> Result<Cell, ExecError> {
    match cell {
        Cell::Number(n) => Ok(Cell::Number(match n.strip_prefix('-') {
            Some(positive) => positive.to_string(),
            None => format!("-{}", n),
        })),
        Cell::Null => Ok(Cell::Null),
        other => Err(ExecError::QueryError(format!("cannot negate {:?}", other))),
    }
}

/// Evaluate an expression against one row
///
/// Comparisons involving NULL yield NULL, which a filter treats as false.
fn eval(expr: &Expr, table: &Table, row: &[Cell]) -> Result<Cell, ExecError> {
    match expr {
        Expr::Identifier(ident) => Ok(row[table.column_index(&ident.value)?].clone()),
        Expr::Nested(inner) => eval(inner, table, row),
        Expr::Value(value) => value_cell(value),
        Expr::IsNull(inner) => Ok(Cell::Bool(eval(inner, table, row)? == Cell::Null)),
        Expr::IsNotNull(inner) => Ok(Cell::Bool(eval(inner, table, row)? != Cell::Null)),
        Expr::UnaryOp { op, expr } => {
            let operand = eval(expr, table, row)?;
            match op {
                UnaryOperator::Not => match operand {
                    Cell::Bool(b) => Ok(Cell::Bool(!b)),
                    Cell::Null => Ok(Cell::Null),
                    other => Err(ExecError::QueryError(format!("NOT applied to {:?}", other))),
                },
                UnaryOperator::Minus => negate(operand),
                UnaryOperator::Plus => Ok(operand),
                other => Err(ExecError::Unsupported(format!("operator {}", other))),
            }
        }
        Expr::BinaryOp { left, op, right } => {
            let left = eval(left, table, row)?;
            let right = eval(right, table, row)?;
            binary(op, left, right)
        }
        other => Err(ExecError::Unsupported(format!("expression {}", other))),
    }
}

fn binary(op: &BinaryOperator, left: Cell, right: Cell) -> Result<Cell, ExecError> {
    match op {
        BinaryOperator::And => logical(left, right, false),
        BinaryOperator::Or => logical(left, right, true),
        BinaryOperator::Eq
        | BinaryOperator::NotEq
        | BinaryOperator::Lt
        | BinaryOperator::LtEq
        | BinaryOperator::Gt
        | BinaryOperator::GtEq => {
            let ordering = match compare(&left, &right)? {
                Some(ordering) => ordering,
                None => return Ok(Cell::Null),
            };
            let holds = match op {
                BinaryOperator::Eq => ordering == Ordering::Equal,
                BinaryOperator::NotEq => ordering != Ordering::Equal,
                BinaryOperator::Lt => ordering == Ordering::Less,
                BinaryOperator::LtEq => ordering != Ordering::Greater,
                BinaryOperator::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Cell::Bool(holds))
        }
        other => Err(ExecError::Unsupported(format!("operator {}", other))),
    }
}

/// Three-valued AND (`short = false`) and OR (`short = true`)
fn logical(left: Cell, right: Cell, short: bool) -> Result<Cell, ExecError> {
    let as_bool = |cell: &Cell| match cell {
        Cell::Bool(b) => Ok(Some(*b)),
        Cell::Null => Ok(None),
        other => Err(ExecError::QueryError(format!("{:?} is not a boolean", other))),
    };

    match (as_bool(&left)?, as_bool(&right)?) {
        (Some(a), _) if a == short => Ok(Cell::Bool(short)),
        (_, Some(b)) if b == short => Ok(Cell::Bool(short)),
        (Some(_), Some(_)) => Ok(Cell::Bool(!short)),
        _ => Ok(Cell::Null),
    }
}

fn compare(left: &Cell, right: &Cell) -> Result<Option<Ordering>, ExecError> {
    match (left, right) {
        (Cell::Null, _) | (_, Cell::Null) => Ok(None),
        (Cell::Number(_), Cell::Number(_)) => Ok(left
            .as_number()
            .zip(right.as_number())
            .and_then(|(a, b)| a.partial_cmp(&b))),
        (Cell::Text(a), Cell::Text(b)) => Ok(Some(a.cmp(b))),
        (Cell::Bool(a), Cell::Bool(b)) => Ok(Some(a.cmp(b))),
        _ => Err(ExecError::QueryError(format!(
            "cannot compare {:?} with {:?}",
            left, right
        ))),
    }
}
