use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{compiler::{ColumnRef, WhereNode}, request::OperatorKind, Helpers, Truth};

pub struct Eval;

impl Eval {
    /// Column value of a joined row; absent keys read as NULL.
    pub fn column(column: &ColumnRef, row: &Map<String, Value>) -> Value {
        row.get(&column.key()).cloned().unwrap_or(Value::Null)
    }

    pub fn eval_node(node: &WhereNode, row: &Map<String, Value>) -> Truth {
        match node {
            WhereNode::Leaf { column, operators, .. } => {
                let value = Self::column(column, row);
                operators
                    .iter()
                    .fold(Truth::True, |acc, (op, operand)| acc.and(Self::eval_condition(&value, *op, operand)))
            }
            WhereNode::And(children) => children
                .iter()
                .fold(Truth::True, |acc, child| acc.and(Self::eval_node(child, row))),
            WhereNode::Or(children) => children
                .iter()
                .fold(Truth::False, |acc, child| acc.or(Self::eval_node(child, row))),
            WhereNode::Not(inner) => Self::eval_node(inner, row).not(),
        }
    }

    pub fn eval_condition(value: &Value, op: OperatorKind, operand: &Value) -> Truth {
        match op {
            OperatorKind::Eq => Self::cmp3(value, operand, |o| o == Ordering::Equal),
            OperatorKind::Neq => Self::cmp3(value, operand, |o| o != Ordering::Equal),
            OperatorKind::Gt => Self::cmp3(value, operand, |o| o == Ordering::Greater),
            OperatorKind::Gte => Self::cmp3(value, operand, |o| o != Ordering::Less),
            OperatorKind::Lt => Self::cmp3(value, operand, |o| o == Ordering::Less),
            OperatorKind::Lte => Self::cmp3(value, operand, |o| o != Ordering::Greater),
            OperatorKind::In => Self::in_list(value, operand),
            OperatorKind::NotIn => Self::in_list(value, operand).not(),
            OperatorKind::Like => Self::like(value, operand, false),
            OperatorKind::ILike => Self::like(value, operand, true),
            OperatorKind::NotLike => Self::like(value, operand, false).not(),
            OperatorKind::NotILike => Self::like(value, operand, true).not(),
            OperatorKind::Is => Self::is(value, operand),
            OperatorKind::IsNot => Self::is(value, operand).not(),
        }
    }

    fn cmp3(left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Truth {
        if left.is_null() || right.is_null() {
            return Truth::Unknown;
        }
        match Helpers::compare(left, right) {
            Some(ord) => Truth::from_bool(test(ord)),
            None => Truth::Unknown,
        }
    }

    // `x IN ()` is FALSE for every x, NULL included
    fn in_list(value: &Value, list: &Value) -> Truth {
        let items = list.as_array().map(Vec::as_slice).unwrap_or_default();
        if items.is_empty() {
            return Truth::False;
        }
        if value.is_null() {
            return Truth::Unknown;
        }

        let mut has_null = false;
        for item in items {
            match Self::cmp3(value, item, |o| o == Ordering::Equal) {
                Truth::True => return Truth::True,
                Truth::Unknown => has_null = has_null || item.is_null(),
                Truth::False => {}
            }
        }
        if has_null { Truth::Unknown } else { Truth::False }
    }

    fn like(value: &Value, pattern: &Value, case_insensitive: bool) -> Truth {
        match (value, pattern) {
            (Value::String(text), Value::String(pattern)) => {
                Truth::from_bool(Helpers::eval_like(text, pattern, case_insensitive))
            }
            _ => Truth::Unknown,
        }
    }

    // IS never yields UNKNOWN
    fn is(value: &Value, operand: &Value) -> Truth {
        match operand {
            Value::Bool(expected) => Truth::from_bool(value.as_bool() == Some(*expected)),
            _ => Truth::from_bool(value.is_null()),
        }
    }
}
