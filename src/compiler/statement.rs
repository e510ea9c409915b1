use std::{fmt::Display, sync::Arc};

use serde_json::Value;

use crate::compiler::{Dialect, SelectPlan};

/// Parameterized SQL ready for a connection, plus the plan it came from.
///
/// Values never appear in `text`; the n-th placeholder binds `params[n - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    params: Vec<Value>,
    dialect: Dialect,
    plan: Arc<SelectPlan>,
}

impl Statement {
    pub fn new(plan: SelectPlan, dialect: Dialect) -> Self {
        let (text, params) = plan.render(dialect);
        Self { text, params, dialect, plan: Arc::new(plan) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn plan(&self) -> &SelectPlan {
        &self.plan
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.params)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
