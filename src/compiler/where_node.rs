use std::fmt::Display;

use serde_json::Value;

use crate::{
    compiler::{Dialect, SqlWriter},
    request::OperatorKind,
};

/// A column qualified by the alias of the table it is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub alias: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(alias: &str, column: &str) -> Self {
        Self { alias: alias.to_string(), column: column.to_string() }
    }

    /// Key under which the in-memory executor stores this column.
    pub fn key(&self) -> String {
        format!("{}.{}", self.alias, self.column)
    }
}

impl Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.alias, self.column)
    }
}

/// Resolved predicate tree. Every leaf already points at a qualified column.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    /// Comparisons on one column, combined with AND.
    Leaf {
        field: String,
        column: ColumnRef,
        operators: Vec<(OperatorKind, Value)>,
    },
    And(Vec<WhereNode>),
    Or(Vec<WhereNode>),
    Not(Box<WhereNode>),
}

impl WhereNode {
    /// Collapse a conjunction: nothing -> `None`, one node -> itself.
    ///
    /// Always-true members are dropped unless nothing else is left, so a
    /// branch made only of `$notIn: []` still reads as TRUE inside `$or`/`$not`.
    pub fn and(nodes: Vec<WhereNode>) -> Option<WhereNode> {
        let (trivial, mut nodes): (Vec<_>, Vec<_>) = nodes.into_iter().partition(WhereNode::is_always_true);
        match nodes.len() {
            0 => trivial.into_iter().next(),
            1 => nodes.pop(),
            _ => Some(WhereNode::And(nodes)),
        }
    }

    /// A leaf whose every operator is `$notIn: []`.
    pub fn is_always_true(&self) -> bool {
        match self {
            WhereNode::Leaf { operators, .. } => {
                !operators.is_empty() && operators.iter().all(|(op, value)| Self::is_empty_not_in(*op, value))
            }
            _ => false,
        }
    }

    pub fn is_empty_not_in(op: OperatorKind, value: &Value) -> bool {
        op == OperatorKind::NotIn && value.as_array().is_some_and(Vec::is_empty)
    }

    pub fn or(mut nodes: Vec<WhereNode>) -> Option<WhereNode> {
        match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(WhereNode::Or(nodes)),
        }
    }

    pub fn render(&self, writer: &mut SqlWriter) {
        match self {
            WhereNode::Leaf { column, operators, .. } => {
                if operators.len() == 1 {
                    let (op, value) = &operators[0];
                    Self::render_condition(column, *op, value, writer);
                } else {
                    writer.push("(");
                    for (i, (op, value)) in operators.iter().enumerate() {
                        if i > 0 {
                            writer.push(" AND ");
                        }
                        Self::render_condition(column, *op, value, writer);
                    }
                    writer.push(")");
                }
            }
            WhereNode::And(children) => Self::render_group(children, " AND ", writer),
            WhereNode::Or(children) => Self::render_group(children, " OR ", writer),
            WhereNode::Not(inner) => match inner.as_ref() {
                WhereNode::And(_) | WhereNode::Or(_) => {
                    writer.push("NOT ");
                    inner.render(writer);
                }
                _ => {
                    writer.push("NOT (");
                    inner.render(writer);
                    writer.push(")");
                }
            },
        }
    }

    fn render_group(children: &[WhereNode], separator: &str, writer: &mut SqlWriter) {
        writer.push("(");
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                writer.push(separator);
            }
            child.render(writer);
        }
        writer.push(")");
    }

    fn render_condition(column: &ColumnRef, op: OperatorKind, value: &Value, writer: &mut SqlWriter) {
        let comparison = match op {
            OperatorKind::Eq => Some(" = "),
            OperatorKind::Neq => Some(" <> "),
            OperatorKind::Gt => Some(" > "),
            OperatorKind::Gte => Some(" >= "),
            OperatorKind::Lt => Some(" < "),
            OperatorKind::Lte => Some(" <= "),
            _ => None,
        };
        if let Some(symbol) = comparison {
            writer.push_column(column);
            writer.push(symbol);
            writer.bind(value.clone());
            return;
        }

        match op {
            OperatorKind::In | OperatorKind::NotIn => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                if items.is_empty() {
                    // nothing matches `IN ()`; everything matches `NOT IN ()`
                    let literal = if op == OperatorKind::In {
                        writer.dialect().false_literal()
                    } else {
                        writer.dialect().true_literal()
                    };
                    writer.push(literal);
                    return;
                }
                writer.push_column(column);
                writer.push(if op == OperatorKind::In { " IN (" } else { " NOT IN (" });
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writer.push(", ");
                    }
                    writer.bind(item.clone());
                }
                writer.push(")");
            }
            OperatorKind::Like | OperatorKind::NotLike => {
                let negated = op == OperatorKind::NotLike;
                writer.push_column(column);
                if writer.dialect().has_case_sensitive_like() {
                    writer.push(if negated { " NOT LIKE " } else { " LIKE " });
                    writer.bind(value.clone());
                } else {
                    writer.push(if negated { " NOT GLOB " } else { " GLOB " });
                    let pattern = match value {
                        Value::String(pattern) => Value::String(Dialect::glob_pattern(pattern)),
                        other => other.clone(),
                    };
                    writer.bind(pattern);
                }
            }
            OperatorKind::ILike | OperatorKind::NotILike => {
                let negated = op == OperatorKind::NotILike;
                if writer.dialect().has_ilike() {
                    writer.push_column(column);
                    writer.push(if negated { " NOT ILIKE " } else { " ILIKE " });
                    writer.bind(value.clone());
                } else {
                    writer.push("LOWER(");
                    writer.push_column(column);
                    writer.push(if negated { ") NOT LIKE LOWER(" } else { ") LIKE LOWER(" });
                    writer.bind(value.clone());
                    writer.push(")");
                }
            }
            OperatorKind::Is | OperatorKind::IsNot => {
                writer.push_column(column);
                writer.push(if op == OperatorKind::Is { " IS " } else { " IS NOT " });
                writer.push(match value {
                    Value::Bool(true) => "TRUE",
                    Value::Bool(false) => "FALSE",
                    _ => "NULL",
                });
            }
            _ => {}
        }
    }
}
