use std::sync::Arc;

use serde_json::Value;

use crate::{
    compiler::{Dialect, Page, SqlAssembler, Statement},
    connection::Connection,
    definition::{FieldRegistry, FieldSpec, QueryConfig, QueryDefaults, TableRef},
    request::{OrderInput, RequestEnvelope},
    QueryError,
};

#[derive(Debug, Clone)]
struct InternalDefinition {
    table: TableRef,
    fields: FieldRegistry,
    config: QueryConfig,
    defaults: QueryDefaults,
}

/// Immutable description of a queryable table and its exposed fields.
///
/// Cloning is cheap (shared `Arc`), and a definition can be used from any
/// number of threads at once; every compile call allocates its own state.
#[derive(Debug, Clone)]
pub struct QueryDefinition {
    inner: Arc<InternalDefinition>,
}

/// Declare a definition over `table` with the given `(name, field)` pairs.
pub fn create_query<T, I, N, S>(table: T, fields: I) -> Result<QueryDefinition, QueryError>
where
    T: Into<TableRef>,
    I: IntoIterator<Item = (N, S)>,
    N: AsRef<str>,
    S: Into<FieldSpec>,
{
    let mut registry = FieldRegistry::new();
    for (name, spec) in fields {
        registry.insert(name.as_ref(), spec.into())?;
    }
    Ok(QueryDefinition::new(table.into(), registry, QueryConfig::default()))
}

impl QueryDefinition {
    pub fn new(table: TableRef, fields: FieldRegistry, config: QueryConfig) -> Self {
        Self {
            inner: Arc::new(InternalDefinition {
                table,
                fields,
                config,
                defaults: QueryDefaults::default(),
            }),
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.inner.table
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.inner.fields
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.inner.defaults
    }

    pub fn resolve(&self, name: &str) -> Result<&FieldSpec, QueryError> {
        self.inner.fields.resolve(name)
    }

    fn with_config(self, update: impl FnOnce(&mut QueryConfig)) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        update(&mut inner.config);
        Self { inner: Arc::new(inner) }
    }

    fn with_defaults(self, update: impl FnOnce(&mut QueryDefaults)) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        update(&mut inner.defaults);
        Self { inner: Arc::new(inner) }
    }

    pub fn default_limit(self, limit: u64) -> Self {
        self.with_config(|config| config.default_limit = limit)
    }

    pub fn max_limit(self, limit: u64) -> Self {
        self.with_config(|config| config.max_limit = limit)
    }

    pub fn max_join_depth(self, depth: usize) -> Self {
        self.with_config(|config| config.max_join_depth = depth)
    }

    pub fn dialect(self, dialect: Dialect) -> Self {
        self.with_config(|config| config.dialect = dialect)
    }

    /// Filter used when a request has no `where`.
    pub fn default_where(self, filter: Value) -> Self {
        self.with_defaults(|defaults| defaults.filter = Some(filter))
    }

    /// Order used when a request has no `order`.
    pub fn default_order<I, O>(self, order: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderInput>,
    {
        let order = order.into_iter().map(Into::into).collect();
        self.with_defaults(|defaults| defaults.order = Some(order))
    }

    /// Projection used when a request has no `select`.
    pub fn default_select<I, S>(self, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let select = select.into_iter().map(Into::into).collect();
        self.with_defaults(|defaults| defaults.select = Some(select))
    }

    /// Paths added to every projection.
    pub fn include<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.with_defaults(|defaults| defaults.include = paths)
    }

    /// Paths removed from every projection, `select` included.
    pub fn exclude<I, S>(self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        self.with_defaults(|defaults| defaults.exclude = paths)
    }

    /// Compile `request` without touching any connection.
    pub fn get_sql(&self, request: &RequestEnvelope) -> Result<Statement, QueryError> {
        SqlAssembler::build(self, request)
    }

    /// Compile the `COUNT(*)` companion of `request`: same joins and filter,
    /// no order or window.
    pub fn get_count_sql(&self, request: &RequestEnvelope) -> Result<Statement, QueryError> {
        SqlAssembler::build_count(self, request)
    }

    /// Compile `request` and run it with a single call to `connection`.
    pub async fn execute<C: Connection>(&self, connection: &C, request: &RequestEnvelope) -> Result<Vec<Value>, QueryError> {
        SqlAssembler::execute(connection, self, request).await
    }

    /// Run `request` and its count statement, returning the rows with page flags.
    pub async fn execute_page<C: Connection>(&self, connection: &C, request: &RequestEnvelope) -> Result<Page, QueryError> {
        SqlAssembler::execute_page(connection, self, request).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        compiler::Dialect,
        definition::{create_query, field},
        request::OrderInput,
        QueryError,
    };

    #[test]
    fn create_query_registers_fields_in_order() {
        let users = create_query("users", [
            ("id", field("id")),
            ("name", field("name")),
            ("isActive", field("is_active")),
        ]).unwrap();

        assert_eq!(users.table().name, "users");
        assert_eq!(users.fields().len(), 3);
        assert_eq!(users.resolve("isActive").unwrap().column(), "is_active");
    }

    #[test]
    fn create_query_rejects_duplicate_names() {
        let err = create_query("users", [("id", field("id")), ("id", field("uuid"))]).unwrap_err();
        assert_eq!(err, QueryError::DuplicateField("id".into()));
    }

    #[test]
    fn configuration_methods_return_updated_definition() {
        let users = create_query("users", [("id", field("id"))])
            .unwrap()
            .default_limit(5)
            .max_limit(10)
            .max_join_depth(2)
            .dialect(Dialect::Sqlite);

        assert_eq!(users.config().default_limit, 5);
        assert_eq!(users.config().max_limit, 10);
        assert_eq!(users.config().max_join_depth, 2);
        assert_eq!(users.config().dialect, Dialect::Sqlite);
    }

    #[test]
    fn configuring_a_shared_definition_leaves_the_original_untouched() {
        let users = create_query("users", [("id", field("id"))]).unwrap();
        let limited = users.clone().max_limit(3);

        assert_eq!(users.config().max_limit, 100);
        assert_eq!(limited.config().max_limit, 3);
    }

    #[test]
    fn default_builders_fill_the_defaults() {
        let users = create_query("users", [("id", field("id")), ("name", field("name"))])
            .unwrap()
            .default_where(json!({ "name": { "$neq": "root" } }))
            .default_order(["name:asc"])
            .default_select(["id"])
            .include(["name"])
            .exclude(["id"]);

        let defaults = users.defaults();
        assert_eq!(defaults.filter, Some(json!({ "name": { "$neq": "root" } })));
        assert_eq!(defaults.order, Some(vec![OrderInput::from("name:asc")]));
        assert_eq!(defaults.select, Some(vec!["id".to_string()]));
        assert_eq!(defaults.include, vec!["name".to_string()]);
        assert_eq!(defaults.exclude, vec!["id".to_string()]);
        assert_eq!(users.config().default_limit, 20);
    }

    #[test]
    fn definitions_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<crate::definition::QueryDefinition>();
    }
}
