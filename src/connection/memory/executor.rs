use serde_json::{Map, Value};

use crate::{
    compiler::{ColumnRef, JoinClause, SelectPlan},
    definition::{JoinType, TableRef},
    Eval, ExecutionError, Helpers, InternalMemoryDb,
};

type Row = Map<String, Value>;

/// Evaluates a [`SelectPlan`] over memory tables with SQL semantics:
/// scan, joins, filter, sort, offset/limit, projection. A count plan stops
/// after the filter and returns a single `{"count": n}` row.
pub struct MemoryExecutor;

impl MemoryExecutor {
    pub fn run(plan: &SelectPlan, db: &InternalMemoryDb) -> Result<Vec<Value>, ExecutionError> {
        let mut rows = Self::scan(db, &plan.table, &plan.alias)?;

        for join in &plan.joins {
            let right = Self::scan(db, &join.table, &join.alias)?;
            rows = Self::join(rows, right, join);
        }

        if let Some(predicate) = &plan.predicate {
            rows.retain(|row| Eval::eval_node(predicate, row).is_true());
        }

        if plan.count {
            let mut row = Row::new();
            row.insert(SelectPlan::COUNT_ALIAS.to_string(), Value::from(rows.len()));
            return Ok(vec![Value::Object(row)]);
        }

        if !plan.order.is_empty() {
            // stable, so ties keep scan order
            rows.sort_by(|a, b| {
                for key in &plan.order {
                    let av = Eval::column(&key.column, a);
                    let bv = Eval::column(&key.column, b);
                    let ord = Helpers::cmp_for_sort(&av, &bv, key.direction, key.nulls);
                    if !ord.is_eq() {
                        return ord;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }

        let offset = usize::try_from(plan.pagination.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.pagination.limit).unwrap_or(usize::MAX);

        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| {
                let projected = plan
                    .projection
                    .iter()
                    .map(|p| (p.alias.clone(), Eval::column(&p.column, &row)))
                    .collect::<Row>();
                Value::Object(projected)
            })
            .collect())
    }

    /// Rows of `table` with keys qualified by `alias` (`t0_users.name`).
    fn scan(db: &InternalMemoryDb, table: &TableRef, alias: &str) -> Result<Vec<Row>, ExecutionError> {
        let handle = db
            .get(&table.to_string())
            .ok_or_else(|| ExecutionError::new(format!("relation \"{}\" does not exist", table)))?;
        let guard = handle.read().unwrap_or_else(std::sync::PoisonError::into_inner);

        Ok(guard
            .rows()
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                object
                    .iter()
                    .map(|(k, v)| (ColumnRef::new(alias, k).key(), v.clone()))
                    .collect::<Row>()
            })
            .collect())
    }

    fn matches(left: &Row, right: &Row, join: &JoinClause) -> bool {
        join.on.iter().all(|(local, target)| {
            let l = Eval::column(local, left);
            let r = Eval::column(target, right);
            !l.is_null() && !r.is_null() && Helpers::compare(&l, &r).is_some_and(|o| o.is_eq())
        })
    }

    fn merge(left: &Row, right: &Row) -> Row {
        let mut out = left.clone();
        for (k, v) in right {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Nested-loop join. Unmatched rows kept by outer joins simply lack the
    /// other side's keys, which read as NULL.
    fn join(left: Vec<Row>, right: Vec<Row>, join: &JoinClause) -> Vec<Row> {
        let mut out = Vec::new();

        if join.join_type == JoinType::Right {
            for r in &right {
                let mut matched = false;
                for l in &left {
                    if Self::matches(l, r, join) {
                        out.push(Self::merge(l, r));
                        matched = true;
                    }
                }
                if !matched {
                    out.push(r.clone());
                }
            }
            return out;
        }

        let mut right_matched = vec![false; right.len()];
        for l in &left {
            let mut matched = false;
            for (i, r) in right.iter().enumerate() {
                if Self::matches(l, r, join) {
                    out.push(Self::merge(l, r));
                    right_matched[i] = true;
                    matched = true;
                }
            }
            if !matched && join.join_type.keeps_unmatched_left() {
                out.push(l.clone());
            }
        }

        if join.join_type.keeps_unmatched_right() {
            for (r, matched) in right.iter().zip(right_matched) {
                if !matched {
                    out.push(r.clone());
                }
            }
        }

        out
    }
}
