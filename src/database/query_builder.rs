use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres};

use crate::database::manager::DatabaseError;

/// Value bound into a filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Int(i64),
    Text(String),
    Bool(bool),
}

#[derive(Debug, Clone)]
enum Piece {
    Sql(String),
    Bind(Bind),
}

/// Paginated list query over one table (optionally aliased).
///
/// Conditions are ANDed together. Every value goes through a bind parameter;
/// only identifiers supplied by the code itself are spliced into the SQL.
pub struct QueryBuilder<T> {
    from: String,
    conditions: Vec<Vec<Piece>>,
    order_by: Option<String>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    /// `from` is a table name with an optional alias, e.g. "issues i"
    pub fn new(from: impl Into<String>) -> Result<Self, DatabaseError> {
        let from = from.into();
        let valid = from.split_whitespace().count() <= 2
            && from.split_whitespace().all(is_identifier);
        if !valid {
            return Err(DatabaseError::QueryError(format!("Invalid table reference: {}", from)));
        }
        Ok(Self {
            from,
            conditions: Vec::new(),
            order_by: None,
            _phantom: std::marker::PhantomData,
        })
    }

    /// `column = $n`
    pub fn where_eq(mut self, column: &str, value: Bind) -> Self {
        self.conditions.push(vec![
            Piece::Sql(format!("{} = ", column)),
            Piece::Bind(value),
        ]);
        self
    }

    /// Case-insensitive substring match on any of `columns`
    pub fn where_search(mut self, columns: &[&str], term: &str) -> Self {
        let pattern = format!("%{}%", escape_like(term));
        let mut pieces = vec![Piece::Sql("(".to_string())];
        for (i, column) in columns.iter().enumerate() {
            let prefix = if i == 0 { "" } else { " OR " };
            pieces.push(Piece::Sql(format!("{}{} ILIKE ", prefix, column)));
            pieces.push(Piece::Bind(Bind::Text(pattern.clone())));
        }
        pieces.push(Piece::Sql(")".to_string()));
        self.conditions.push(pieces);
        self
    }

    /// Arbitrary condition with a single bound value between `before` and `after`
    pub fn where_bind(mut self, before: &str, value: Bind, after: &str) -> Self {
        self.conditions.push(vec![
            Piece::Sql(before.to_string()),
            Piece::Bind(value),
            Piece::Sql(after.to_string()),
        ]);
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    fn push_from_where<'a>(&'a self, qb: &mut sqlx::QueryBuilder<'a, Postgres>) {
        qb.push(" FROM ");
        qb.push(&self.from);
        for (i, condition) in self.conditions.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            for piece in condition {
                match piece {
                    Piece::Sql(sql) => {
                        qb.push(sql);
                    }
                    Piece::Bind(Bind::Int(v)) => {
                        qb.push_bind(*v);
                    }
                    Piece::Bind(Bind::Text(v)) => {
                        qb.push_bind(v.as_str());
                    }
                    Piece::Bind(Bind::Bool(v)) => {
                        qb.push_bind(*v);
                    }
                }
            }
        }
    }

    fn count_builder(&self) -> sqlx::QueryBuilder<'_, Postgres> {
        let mut qb = sqlx::QueryBuilder::new("SELECT COUNT(*)");
        self.push_from_where(&mut qb);
        qb
    }

    fn select_builder(&self, limit: i64, offset: i64) -> sqlx::QueryBuilder<'_, Postgres> {
        let mut qb = sqlx::QueryBuilder::new("SELECT *");
        self.push_from_where(&mut qb);
        if let Some(order_by) = &self.order_by {
            qb.push(" ORDER BY ");
            qb.push(order_by);
        }
        qb.push(" LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);
        qb
    }

    pub async fn count(&self, pool: &PgPool) -> Result<i64, DatabaseError> {
        let count: i64 = self.count_builder().build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(count)
    }

    /// One page of rows plus the total number of matching rows
    pub async fn fetch_page(
        &self,
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<T>, i64), DatabaseError> {
        let total = self.count(pool).await?;
        if total == 0 {
            return Ok((Vec::new(), 0));
        }
        let rows = self
            .select_builder(limit, offset)
            .build_query_as::<T>()
            .fetch_all(pool)
            .await?;
        Ok((rows, total))
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
