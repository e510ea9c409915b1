use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    compiler::{
        JoinPlanner, OrderCompiler, Page, PageInfo, PaginationGuard, PredicateCompiler, SelectPlan, Statement,
    },
    connection::Connection,
    definition::QueryDefinition,
    request::RequestEnvelope,
    ExecutionError, QueryError,
};

/// Entry points that turn a definition and a request into a statement.
pub struct SqlAssembler;

impl SqlAssembler {
    /// Resolve and validate everything the request references.
    ///
    /// The definition's defaults fill whatever the request leaves out. Joins
    /// are added as the filter, then the order, then the projection first
    /// reach them.
    pub fn plan(definition: &QueryDefinition, request: &RequestEnvelope) -> Result<SelectPlan, QueryError> {
        let defaults = definition.defaults();
        let request = defaults.apply(request);
        let mut planner = JoinPlanner::new(definition);

        let predicate = PredicateCompiler::compile(&mut planner, request.filter.as_ref())?;
        let order = OrderCompiler::compile(&mut planner, request.order.as_deref())?;
        let projection = planner.projection(request.select.as_deref(), &defaults.include, &defaults.exclude)?;
        let pagination = PaginationGuard::normalize(definition.config(), request.limit, request.offset);

        Ok(SelectPlan {
            table: definition.table().clone(),
            alias: planner.scope(JoinPlanner::ROOT).alias.clone(),
            projection,
            joins: planner.into_joins(),
            predicate,
            order,
            pagination,
            count: false,
        })
    }

    /// Plan counting every row `request` matches, ignoring its window.
    ///
    /// Joins are the page's own, including those only `select` reaches.
    pub fn plan_count(definition: &QueryDefinition, request: &RequestEnvelope) -> Result<SelectPlan, QueryError> {
        let page = Self::plan(definition, request)?;

        Ok(SelectPlan {
            projection: Vec::new(),
            order: Vec::new(),
            count: true,
            ..page
        })
    }

    /// Build the statement without any I/O.
    pub fn build(definition: &QueryDefinition, request: &RequestEnvelope) -> Result<Statement, QueryError> {
        let plan = Self::plan(definition, request)?;
        Ok(Self::finish(definition, plan))
    }

    pub fn build_count(definition: &QueryDefinition, request: &RequestEnvelope) -> Result<Statement, QueryError> {
        let plan = Self::plan_count(definition, request)?;
        Ok(Self::finish(definition, plan))
    }

    fn finish(definition: &QueryDefinition, plan: SelectPlan) -> Statement {
        let statement = Statement::new(plan, definition.config().dialect);

        debug!(
            table = %definition.table(),
            joins = statement.plan().joins.len(),
            params = statement.params().len(),
            count = statement.plan().count,
            "assembled statement"
        );

        statement
    }

    /// Build the statement and hand it to `connection` once. Rows come back untouched.
    pub async fn execute<C: Connection>(
        connection: &C,
        definition: &QueryDefinition,
        request: &RequestEnvelope,
    ) -> Result<Vec<Value>, QueryError> {
        let statement = Self::build(definition, request)?;
        Self::run(connection, definition, &statement).await
    }

    /// Run the page and then its count. Both statements are built before
    /// either reaches `connection`.
    pub async fn execute_page<C: Connection>(
        connection: &C,
        definition: &QueryDefinition,
        request: &RequestEnvelope,
    ) -> Result<Page, QueryError> {
        let statement = Self::build(definition, request)?;
        let count = Self::build_count(definition, request)?;

        let rows = Self::run(connection, definition, &statement).await?;
        let counted = Self::run(connection, definition, &count).await?;
        let total_count = Self::total_count(&counted)?;

        Ok(Page {
            rows,
            page_info: PageInfo::calculate(total_count, &statement.plan().pagination),
        })
    }

    async fn run<C: Connection>(
        connection: &C,
        definition: &QueryDefinition,
        statement: &Statement,
    ) -> Result<Vec<Value>, QueryError> {
        match connection.query(statement).await {
            Ok(rows) => {
                debug!(table = %definition.table(), rows = rows.len(), "statement executed");
                Ok(rows)
            }
            Err(err) => {
                warn!(table = %definition.table(), error = %err, "statement failed");
                Err(err.into())
            }
        }
    }

    /// Read `count` from the first row. Drivers may hand it back as a number
    /// or, for 64-bit counts, as a string.
    fn total_count(rows: &[Value]) -> Result<u64, QueryError> {
        let value = rows.first().and_then(|row| row.get(SelectPlan::COUNT_ALIAS));
        let count = match value {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        };

        count.ok_or_else(|| ExecutionError::new("count statement returned no count").into())
    }
}
