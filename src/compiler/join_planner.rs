use indexmap::IndexMap;
use tracing::trace;

use crate::{
    compiler::{ColumnRef, Projection},
    definition::{FieldSpec, JoinType, QueryDefinition, TableRef},
    QueryError,
};

pub type ScopeId = usize;

/// One table visible to a statement together with the field names it exposes.
#[derive(Debug, Clone)]
pub struct Scope {
    pub definition: QueryDefinition,
    pub alias: String,
    /// Dotted path of join field names leading here; empty for the base table.
    pub prefix: String,
    pub depth: usize,
    /// join field name -> joined scope
    pub children: IndexMap<String, ScopeId>,
}

impl Scope {
    /// Public name of `field` as seen from the base definition.
    pub fn qualify(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableRef,
    pub alias: String,
    /// `(owning table column, joined table column)` pairs, ANDed in `ON`.
    pub on: Vec<(ColumnRef, ColumnRef)>,
    pub path: String,
    pub depth: usize,
}

/// Outcome of resolving a field name inside a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Column(ColumnRef),
    /// A join field: its local column and the scope that owns it.
    Join { local: ColumnRef, owner: ScopeId },
}

impl Resolved {
    /// Column used when the field itself is compared or sorted on.
    pub fn column(&self) -> &ColumnRef {
        match self {
            Resolved::Column(column) => column,
            Resolved::Join { local, .. } => local,
        }
    }
}

/// Answers field lookups against the right table alias and collects the
/// joins a request actually reaches.
///
/// A join is registered the first time a where sub-object, order path or
/// select path goes through it, so undeclared-in-request joins never filter
/// or multiply rows. The base table is `t0_<table>` and each registered join
/// takes the next ordinal, so the same table can be joined any number of times.
#[derive(Debug)]
pub struct JoinPlanner {
    scopes: Vec<Scope>,
    joins: Vec<JoinClause>,
    max_depth: usize,
}

impl JoinPlanner {
    pub const ROOT: ScopeId = 0;

    pub fn new(definition: &QueryDefinition) -> Self {
        Self {
            scopes: vec![Scope {
                definition: definition.clone(),
                alias: definition.table().alias(0),
                prefix: String::new(),
                depth: 0,
                children: IndexMap::new(),
            }],
            joins: Vec::new(),
            max_depth: definition.config().max_join_depth,
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn into_joins(self) -> Vec<JoinClause> {
        self.joins
    }

    pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<Resolved, QueryError> {
        let current = &self.scopes[scope];
        match current.definition.resolve(name)? {
            FieldSpec::Scalar { column } => Ok(Resolved::Column(ColumnRef::new(&current.alias, column))),
            FieldSpec::Join(join) => Ok(Resolved::Join {
                local: ColumnRef::new(&current.alias, &join.local_column),
                owner: scope,
            }),
        }
    }

    /// Scope reached through the join field `name` of `scope`, registering
    /// the join on first use.
    pub fn enter(&mut self, scope: ScopeId, name: &str) -> Result<ScopeId, QueryError> {
        if let Some(child) = self.scopes[scope].children.get(name) {
            return Ok(*child);
        }

        let owner = &self.scopes[scope];
        let join = match owner.definition.resolve(name)? {
            FieldSpec::Join(join) => join.clone(),
            FieldSpec::Scalar { .. } => return QueryError::UnknownField(owner.qualify(name)).err(),
        };

        let depth = owner.depth + 1;
        if depth > self.max_depth {
            return QueryError::JoinDepthExceeded { depth, max: self.max_depth }.err();
        }

        let alias = join.target.table().alias(self.joins.len() + 1);
        let path = owner.qualify(name);
        let on = join
            .conditions()
            .map(|(local, target)| (ColumnRef::new(&owner.alias, local), ColumnRef::new(&alias, target)))
            .collect();

        trace!(path = %path, alias = %alias, join = join.join_type.keyword(), "registered join");

        self.joins.push(JoinClause {
            join_type: join.join_type,
            table: join.target.table().clone(),
            alias: alias.clone(),
            on,
            path: path.clone(),
            depth,
        });

        let child = self.scopes.len();
        self.scopes.push(Scope {
            definition: join.target.clone(),
            alias,
            prefix: path,
            depth,
            children: IndexMap::new(),
        });
        self.scopes[scope].children.insert(name.to_string(), child);
        Ok(child)
    }

    /// Resolve a dotted path (`translation.value`) from the base table,
    /// registering every join it passes through.
    ///
    /// Every segment but the last must name a join field. Unknown segments
    /// report the whole path.
    pub fn resolve_path(&mut self, path: &str) -> Result<Resolved, QueryError> {
        let unknown = || QueryError::UnknownField(path.to_string());
        let segments = path.split('.').collect::<Vec<_>>();
        let mut scope = Self::ROOT;

        for (i, segment) in segments.iter().enumerate() {
            let resolved = self.resolve(scope, segment).map_err(|_| unknown())?;
            if i + 1 == segments.len() {
                return Ok(resolved);
            }
            scope = match resolved {
                Resolved::Join { .. } => self.enter(scope, segment)?,
                Resolved::Column(_) => return unknown().err(),
            };
        }
        unknown().err()
    }

    /// Validate a dotted path without registering anything.
    pub fn check_path(&self, path: &str) -> Result<(), QueryError> {
        let unknown = || QueryError::UnknownField(path.to_string());
        let segments = path.split('.').collect::<Vec<_>>();
        let mut definition = self.scopes[Self::ROOT].definition.clone();

        for (i, segment) in segments.iter().enumerate() {
            let spec = definition.resolve(segment).map_err(|_| unknown())?;
            if i + 1 == segments.len() {
                return Ok(());
            }
            let Some(join) = spec.as_join() else {
                return unknown().err();
            };
            if i + 1 > self.max_depth {
                return QueryError::JoinDepthExceeded { depth: i + 1, max: self.max_depth }.err();
            }
            let target = join.target.clone();
            definition = target;
        }
        unknown().err()
    }

    /// Output columns.
    ///
    /// Without `select` only the base table's scalars are returned and no join
    /// is added. A selected join path expands to every scalar of its target.
    /// `include` paths are always added, `exclude` paths (and everything under
    /// an excluded join path) always removed.
    pub fn projection(
        &mut self,
        select: Option<&[String]>,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<Projection>, QueryError> {
        for path in exclude {
            self.check_path(path)?;
        }

        let mut projection = Vec::new();
        match select {
            Some(paths) if !paths.is_empty() => {
                for (i, path) in paths.iter().enumerate() {
                    if paths[..i].contains(path) {
                        return QueryError::DuplicateField(path.clone()).err();
                    }
                }
                for path in paths {
                    self.push_path(path, exclude, &mut projection)?;
                }
            }
            _ => self.push_scalars(Self::ROOT, exclude, &mut projection),
        }

        for path in include {
            self.push_path(path, exclude, &mut projection)?;
        }

        if projection.is_empty() && !exclude.is_empty() {
            return QueryError::InvalidRequest("every selected field is excluded".to_string()).err();
        }
        Ok(projection)
    }

    fn push_path(&mut self, path: &str, exclude: &[String], projection: &mut Vec<Projection>) -> Result<(), QueryError> {
        self.check_path(path)?;
        if Self::is_excluded(exclude, path) {
            return Ok(());
        }

        match self.resolve_path(path)? {
            Resolved::Column(column) => {
                if !projection.iter().any(|p| p.alias == path) {
                    projection.push(Projection { column, alias: path.to_string() });
                }
            }
            Resolved::Join { owner, .. } => {
                let name = path.rsplit('.').next().unwrap_or(path);
                let child = self.enter(owner, name)?;
                self.push_scalars(child, exclude, projection);
            }
        }
        Ok(())
    }

    fn push_scalars(&self, id: ScopeId, exclude: &[String], projection: &mut Vec<Projection>) {
        let scope = &self.scopes[id];
        for (name, column) in scope.definition.fields().scalars() {
            let alias = scope.qualify(name);
            if Self::is_excluded(exclude, &alias) || projection.iter().any(|p| p.alias == alias) {
                continue;
            }
            projection.push(Projection {
                column: ColumnRef::new(&scope.alias, column),
                alias,
            });
        }
    }

    fn is_excluded(exclude: &[String], alias: &str) -> bool {
        exclude.iter().any(|path| {
            alias == path || alias.strip_prefix(path.as_str()).is_some_and(|rest| rest.starts_with('.'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{JoinPlanner, Resolved};
    use crate::{
        compiler::ColumnRef,
        definition::{create_query, field, JoinType, QueryDefinition},
        QueryError,
    };

    fn authors() -> QueryDefinition {
        create_query("authors", [("id", field("id")), ("name", field("name"))]).unwrap()
    }

    fn translations() -> QueryDefinition {
        let authors = authors();
        create_query("translations", [
            ("entityId", field("entity_id").into()),
            ("value", field("value").into()),
            ("author", field("author_id").left_join(&authors, "id")),
        ]).unwrap()
    }

    fn products() -> QueryDefinition {
        let translations = translations();
        create_query("products", [
            ("id", field("id").into()),
            ("handle", field("handle").into()),
            ("translation", field("id").left_join(&translations, "entityId")),
            ("draft", field("id").inner_join(&translations, "entityId")),
        ]).unwrap()
    }

    fn strings(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn nothing_is_joined_until_referenced() {
        let mut planner = JoinPlanner::new(&products());
        assert!(planner.joins().is_empty());

        planner.projection(None, &[], &[]).unwrap();
        assert!(planner.joins().is_empty());
    }

    #[test]
    fn joins_take_ordinals_in_order_of_first_use() {
        let mut planner = JoinPlanner::new(&products());
        planner.resolve_path("draft.value").unwrap();
        planner.resolve_path("translation.author.name").unwrap();
        planner.resolve_path("draft.entityId").unwrap();

        let aliases = planner.joins().iter().map(|j| j.alias.as_str()).collect::<Vec<_>>();
        assert_eq!(aliases, vec!["t1_translations", "t2_translations", "t3_authors"]);

        let paths = planner.joins().iter().map(|j| j.path.as_str()).collect::<Vec<_>>();
        assert_eq!(paths, vec!["draft", "translation", "translation.author"]);

        let author = &planner.joins()[2];
        assert_eq!(author.on, vec![(
            ColumnRef::new("t2_translations", "author_id"),
            ColumnRef::new("t3_authors", "id"),
        )]);
        assert_eq!(author.depth, 2);
        assert_eq!(planner.joins()[0].join_type, JoinType::Inner);
    }

    #[test]
    fn composite_keys_extend_the_on_clause() {
        let translations = translations();
        let products = create_query("products", [
            ("id", field("id").into()),
            ("title", field("id").left_join(&translations, "entityId").and_on("handle", "field")),
        ]).unwrap();

        let mut planner = JoinPlanner::new(&products);
        planner.enter(JoinPlanner::ROOT, "title").unwrap();
        assert_eq!(planner.joins()[0].on, vec![
            (ColumnRef::new("t0_products", "id"), ColumnRef::new("t1_translations", "entity_id")),
            (ColumnRef::new("t0_products", "handle"), ColumnRef::new("t1_translations", "field")),
        ]);
    }

    #[test]
    fn resolve_scalar_and_join_fields() {
        let planner = JoinPlanner::new(&products());
        assert_eq!(
            planner.resolve(JoinPlanner::ROOT, "handle").unwrap(),
            Resolved::Column(ColumnRef::new("t0_products", "handle"))
        );
        let resolved = planner.resolve(JoinPlanner::ROOT, "translation").unwrap();
        assert_eq!(resolved.column(), &ColumnRef::new("t0_products", "id"));
        assert!(matches!(resolved, Resolved::Join { owner: JoinPlanner::ROOT, .. }));
        assert!(planner.joins().is_empty());
    }

    #[test]
    fn resolve_unknown_field() {
        let planner = JoinPlanner::new(&products());
        let err = planner.resolve(JoinPlanner::ROOT, "nope").unwrap_err();
        assert_eq!(err, QueryError::UnknownField("nope".into()));
    }

    #[test]
    fn entering_twice_reuses_the_join() {
        let mut planner = JoinPlanner::new(&products());
        let first = planner.enter(JoinPlanner::ROOT, "translation").unwrap();
        let second = planner.enter(JoinPlanner::ROOT, "translation").unwrap();
        assert_eq!(first, second);
        assert_eq!(planner.joins().len(), 1);

        let err = planner.enter(JoinPlanner::ROOT, "handle").unwrap_err();
        assert_eq!(err, QueryError::UnknownField("handle".into()));
    }

    #[test]
    fn resolve_path_reports_whole_path() {
        let mut planner = JoinPlanner::new(&products());
        assert_eq!(
            planner.resolve_path("translation.missing").unwrap_err(),
            QueryError::UnknownField("translation.missing".into())
        );
        assert_eq!(
            planner.resolve_path("handle.value").unwrap_err(),
            QueryError::UnknownField("handle.value".into())
        );
    }

    #[test]
    fn depth_limit_rejects_deeper_paths() {
        let mut planner = JoinPlanner::new(&products().max_join_depth(1));

        let err = planner.resolve_path("translation.author.name").unwrap_err();
        assert_eq!(err, QueryError::JoinDepthExceeded { depth: 2, max: 1 });
        assert_eq!(
            planner.check_path("translation.author.name").unwrap_err(),
            QueryError::JoinDepthExceeded { depth: 2, max: 1 }
        );

        let translation = planner.enter(JoinPlanner::ROOT, "translation").unwrap();
        assert_eq!(
            planner.enter(translation, "author").unwrap_err(),
            QueryError::JoinDepthExceeded { depth: 2, max: 1 }
        );
    }

    #[test]
    fn check_path_registers_nothing() {
        let planner = JoinPlanner::new(&products());
        planner.check_path("translation.author.name").unwrap();
        assert_eq!(
            planner.check_path("translation.ghost").unwrap_err(),
            QueryError::UnknownField("translation.ghost".into())
        );
        assert!(planner.joins().is_empty());
    }

    #[test]
    fn default_projection_is_the_base_table() {
        let mut planner = JoinPlanner::new(&products());
        let aliases = planner
            .projection(None, &[], &[])
            .unwrap()
            .into_iter()
            .map(|p| p.alias)
            .collect::<Vec<_>>();

        assert_eq!(aliases, vec!["id", "handle"]);
    }

    #[test]
    fn select_restricts_projection_and_joins_what_it_names() {
        let mut planner = JoinPlanner::new(&products());
        let select = strings(&["handle", "translation.author"]);
        let projection = planner.projection(Some(select.as_slice()), &[], &[]).unwrap();
        let aliases = projection.iter().map(|p| p.alias.as_str()).collect::<Vec<_>>();
        assert_eq!(aliases, vec!["handle", "translation.author.id", "translation.author.name"]);
        assert_eq!(projection[1].column, ColumnRef::new("t2_authors", "id"));
        assert_eq!(planner.joins().len(), 2);

        let err = planner.projection(Some(strings(&["ghost"]).as_slice()), &[], &[]).unwrap_err();
        assert_eq!(err, QueryError::UnknownField("ghost".into()));
    }

    #[test]
    fn duplicate_select_paths_are_rejected() {
        let mut planner = JoinPlanner::new(&products());
        let select = strings(&["handle", "id", "handle"]);
        let err = planner.projection(Some(select.as_slice()), &[], &[]).unwrap_err();
        assert_eq!(err, QueryError::DuplicateField("handle".into()));
    }

    #[test]
    fn include_and_exclude_shape_the_projection() {
        let mut planner = JoinPlanner::new(&products());
        let include = strings(&["translation.value", "handle"]);
        let exclude = strings(&["handle"]);
        let aliases = planner
            .projection(None, &include, &exclude)
            .unwrap()
            .into_iter()
            .map(|p| p.alias)
            .collect::<Vec<_>>();
        assert_eq!(aliases, vec!["id", "translation.value"]);

        let mut planner = JoinPlanner::new(&products());
        let select = strings(&["id", "translation"]);
        let exclude = strings(&["translation.author", "translation.entityId"]);
        let aliases = planner
            .projection(Some(select.as_slice()), &[], &exclude)
            .unwrap()
            .into_iter()
            .map(|p| p.alias)
            .collect::<Vec<_>>();
        assert_eq!(aliases, vec!["id", "translation.value"]);
    }

    #[test]
    fn excluding_everything_is_an_error() {
        let mut planner = JoinPlanner::new(&products());
        let err = planner.projection(None, &[], &strings(&["id", "handle"])).unwrap_err();
        assert!(matches!(err, QueryError::InvalidRequest(_)));

        let err = planner.projection(None, &[], &strings(&["ghost"])).unwrap_err();
        assert_eq!(err, QueryError::UnknownField("ghost".into()));
    }
}
