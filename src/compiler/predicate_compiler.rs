use serde_json::{Map, Value};

use crate::{
    compiler::{ColumnRef, JoinPlanner, Resolved, ScopeId, WhereNode},
    request::OperatorKind,
    QueryError,
};

/// Turns a request's `where` object into a resolved [`WhereNode`].
///
/// Field names are looked up in the scope they appear in: the base table at
/// the top level and a join target's fields inside that join's sub-object.
/// Join-scoped predicates end up in the statement's `WHERE`, never in `ON`.
pub struct PredicateCompiler<'a> {
    planner: &'a mut JoinPlanner,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(planner: &'a mut JoinPlanner) -> Self {
        Self { planner }
    }

    /// `None` when the filter is absent, `null`, or constrains nothing.
    ///
    /// Join sub-objects register their joins on `planner` as they are met.
    pub fn compile(planner: &mut JoinPlanner, filter: Option<&Value>) -> Result<Option<WhereNode>, QueryError> {
        let map = match filter {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Object(map)) => map,
            Some(_) => return QueryError::invalid_filter("where", "Expected object").err(),
        };
        let nodes = PredicateCompiler::new(planner).compile_object(JoinPlanner::ROOT, map)?;
        Ok(WhereNode::and(nodes).filter(|node| !node.is_always_true()))
    }

    /// Conditions of one where object; the caller combines them with AND.
    fn compile_object(&mut self, scope: ScopeId, map: &Map<String, Value>) -> Result<Vec<WhereNode>, QueryError> {
        let mut nodes = Vec::new();

        for (key, value) in map {
            match key.as_str() {
                "$and" => {
                    for branch in self.branches(scope, key, value)? {
                        nodes.extend(branch);
                    }
                }
                "$or" => {
                    let branches = self
                        .branches(scope, key, value)?
                        .into_iter()
                        .filter_map(WhereNode::and)
                        .collect();
                    nodes.extend(WhereNode::or(branches));
                }
                "$not" => {
                    let Value::Object(inner) = value else {
                        let field = self.planner.scope(scope).qualify(key);
                        return QueryError::invalid_filter(&field, "Expected where object").err();
                    };
                    if let Some(node) = WhereNode::and(self.compile_object(scope, inner)?) {
                        nodes.push(WhereNode::Not(Box::new(node)));
                    }
                }
                _ => nodes.extend(self.compile_field(scope, key, value)?),
            }
        }

        Ok(nodes)
    }

    /// Each element of a `$and`/`$or` array compiled as its own where object.
    fn branches(&mut self, scope: ScopeId, key: &str, value: &Value) -> Result<Vec<Vec<WhereNode>>, QueryError> {
        let field = self.planner.scope(scope).qualify(key);
        let invalid = || QueryError::invalid_filter(&field, "Expected array of where objects");

        let Value::Array(items) = value else {
            return invalid().err();
        };

        let mut branches = Vec::with_capacity(items.len());
        for item in items {
            let Value::Object(branch) = item else {
                return invalid().err();
            };
            branches.push(self.compile_object(scope, branch)?);
        }
        Ok(branches)
    }

    fn compile_field(&mut self, scope: ScopeId, key: &str, value: &Value) -> Result<Vec<WhereNode>, QueryError> {
        let resolved = self.planner.resolve(scope, key)?;

        if value.is_null() {
            return Ok(Vec::new());
        }

        if let (Resolved::Join { .. }, Value::Object(inner)) = (&resolved, value) {
            if !OperatorKind::is_operator_object(value) {
                let child = self.planner.enter(scope, key)?;
                return self.compile_object(child, inner);
            }
        }

        let field = self.planner.scope(scope).qualify(key);
        Ok(Self::leaf(field, resolved.column(), value)?.into_iter().collect())
    }

    /// Comparisons on a single column. A bare value is `$eq`.
    ///
    /// `$notIn: []` is kept only when it is all the leaf says, so the leaf
    /// can stand for TRUE inside `$or` and `$not`.
    fn leaf(field: String, column: &ColumnRef, value: &Value) -> Result<Option<WhereNode>, QueryError> {
        let mut operators = Vec::new();

        match value {
            Value::Object(map) if map.is_empty() => {}
            Value::Object(map) if OperatorKind::is_operator_object(value) => {
                for (key, operand) in map {
                    let Some(op) = OperatorKind::from_key(key) else {
                        return QueryError::invalid_filter(&field, &format!("Unknown operator \"{}\"", key)).err();
                    };
                    if operand.is_null() && !op.accepts_null() {
                        continue;
                    }
                    op.validate(&field, operand)?;
                    operators.push((op, operand.clone()));
                }
            }
            _ => {
                OperatorKind::Eq.validate(&field, value)?;
                operators.push((OperatorKind::Eq, value.clone()));
            }
        }

        if operators.iter().any(|(op, operand)| !WhereNode::is_empty_not_in(*op, operand)) {
            operators.retain(|(op, operand)| !WhereNode::is_empty_not_in(*op, operand));
        }

        if operators.is_empty() {
            return Ok(None);
        }
        Ok(Some(WhereNode::Leaf { field, column: column.clone(), operators }))
    }
}
