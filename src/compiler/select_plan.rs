use serde_json::Value;

use crate::{
    compiler::{ColumnRef, Dialect, JoinClause, OrderKey, Pagination, SqlWriter, WhereNode},
    definition::TableRef,
};

/// One output column and the key it appears under in result rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub column: ColumnRef,
    pub alias: String,
}

/// Fully resolved `SELECT`, independent of any SQL dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub table: TableRef,
    pub alias: String,
    pub projection: Vec<Projection>,
    pub joins: Vec<JoinClause>,
    pub predicate: Option<WhereNode>,
    pub order: Vec<OrderKey>,
    pub pagination: Pagination,
    /// Count the matching rows instead of returning a page of them.
    pub count: bool,
}

impl SelectPlan {
    /// Key of the single column a count statement returns.
    pub const COUNT_ALIAS: &'static str = "count";

    /// `SELECT .. FROM .. [JOIN ..] [WHERE ..] [ORDER BY ..] LIMIT .. OFFSET ..`
    ///
    /// A count plan renders `SELECT COUNT(*) AS "count" FROM .. [JOIN ..] [WHERE ..]`.
    pub fn render(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut writer = SqlWriter::new(dialect);

        writer.push("SELECT ");
        if self.count {
            writer.push("COUNT(*) AS ");
            writer.push_identifier(Self::COUNT_ALIAS);
        } else if self.projection.is_empty() {
            writer.push("*");
        } else {
            for (i, projection) in self.projection.iter().enumerate() {
                if i > 0 {
                    writer.push(", ");
                }
                writer.push_column(&projection.column);
                writer.push(" AS ");
                writer.push_identifier(&projection.alias);
            }
        }

        writer.push(" FROM ");
        writer.push_table(&self.table, &self.alias);

        for join in &self.joins {
            writer.push(" ");
            writer.push(join.join_type.keyword());
            writer.push(" ");
            writer.push_table(&join.table, &join.alias);
            writer.push(" ON ");
            for (i, (local, target)) in join.on.iter().enumerate() {
                if i > 0 {
                    writer.push(" AND ");
                }
                writer.push_column(local);
                writer.push(" = ");
                writer.push_column(target);
            }
        }

        if let Some(predicate) = &self.predicate {
            writer.push(" WHERE ");
            predicate.render(&mut writer);
        }

        if self.count {
            return writer.finish();
        }

        if !self.order.is_empty() {
            writer.push(" ORDER BY ");
            for (i, key) in self.order.iter().enumerate() {
                if i > 0 {
                    writer.push(", ");
                }
                key.render(&mut writer);
            }
        }

        writer.push(" LIMIT ");
        writer.bind(Value::from(self.pagination.limit));
        writer.push(" OFFSET ");
        writer.bind(Value::from(self.pagination.offset));

        writer.finish()
    }
}
