use crate::{
    compiler::{ColumnRef, JoinPlanner, SqlWriter},
    request::{NullsOrder, OrderInput, OrderSpec, SortDirection},
    QueryError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub column: ColumnRef,
    pub direction: SortDirection,
    pub nulls: NullsOrder,
}

impl OrderKey {
    /// `"t0_users"."age" DESC NULLS FIRST`
    pub fn render(&self, writer: &mut SqlWriter) {
        writer.push_column(&self.column);
        writer.push(" ");
        writer.push(self.direction.keyword());
        writer.push(" ");
        writer.push(self.nulls.keyword());
    }
}

pub struct OrderCompiler;

impl OrderCompiler {
    /// Resolve every order entry, keeping the request's sequence.
    ///
    /// A token that fails to parse or resolve is reported verbatim.
    pub fn compile(planner: &mut JoinPlanner, order: Option<&[OrderInput]>) -> Result<Vec<OrderKey>, QueryError> {
        let Some(order) = order else {
            return Ok(Vec::new());
        };

        order
            .iter()
            .map(|input| {
                let spec = OrderSpec::from_input(input)?;
                let resolved = planner.resolve_path(&spec.field).map_err(|err| match err {
                    QueryError::UnknownField(_) => QueryError::UnknownField(spec.token.clone()),
                    other => other,
                })?;
                Ok(OrderKey {
                    column: resolved.column().clone(),
                    direction: spec.direction,
                    nulls: spec.nulls,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::OrderCompiler;
    use crate::{
        compiler::{ColumnRef, Dialect, JoinPlanner, SqlWriter},
        definition::{create_query, field, QueryDefinition},
        request::{NullsOrder, OrderInput, SortDirection},
        QueryError,
    };

    fn products() -> QueryDefinition {
        let translations = create_query("translations", [
            ("entityId", field("entity_id")),
            ("value", field("value")),
        ]).unwrap();
        create_query("products", [
            ("id", field("id").into()),
            ("handle", field("handle").into()),
            ("translation", field("id").left_join(&translations, "entityId")),
        ]).unwrap()
    }

    fn compile(tokens: &[&str]) -> Result<Vec<super::OrderKey>, QueryError> {
        let mut planner = JoinPlanner::new(&products());
        let order = tokens.iter().map(|t| OrderInput::from(*t)).collect::<Vec<_>>();
        OrderCompiler::compile(&mut planner, Some(order.as_slice()))
    }

    #[test]
    fn keys_keep_request_sequence() {
        let keys = compile(&["handle:desc", "id:asc"]).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].column, ColumnRef::new("t0_products", "handle"));
        assert_eq!(keys[0].direction, SortDirection::Desc);
        assert_eq!(keys[0].nulls, NullsOrder::First);
        assert_eq!(keys[1].column, ColumnRef::new("t0_products", "id"));
        assert_eq!(keys[1].nulls, NullsOrder::Last);
    }

    #[test]
    fn render_always_spells_out_null_placement() {
        let keys = compile(&["handle:asc", "id:desc"]).unwrap();
        let mut writer = SqlWriter::new(Dialect::Sqlite);
        keys[0].render(&mut writer);
        writer.push(", ");
        keys[1].render(&mut writer);
        assert_eq!(
            writer.finish().0,
            "\"t0_products\".\"handle\" ASC NULLS LAST, \"t0_products\".\"id\" DESC NULLS FIRST"
        );
    }

    #[test]
    fn dotted_path_orders_by_joined_column() {
        let keys = compile(&["translation.value:desc"]).unwrap();
        assert_eq!(keys[0].column, ColumnRef::new("t1_translations", "value"));
    }

    #[test]
    fn ordering_through_a_join_registers_it() {
        let mut planner = JoinPlanner::new(&products());
        let order = vec![OrderInput::from("handle"), OrderInput::from("translation.value:desc")];
        OrderCompiler::compile(&mut planner, Some(order.as_slice())).unwrap();
        assert_eq!(planner.joins().len(), 1);
        assert_eq!(planner.joins()[0].path, "translation");
    }

    #[test]
    fn join_field_orders_by_local_column() {
        let keys = compile(&["translation"]).unwrap();
        assert_eq!(keys[0].column, ColumnRef::new("t0_products", "id"));
    }

    #[test]
    fn unknown_tokens_are_reported_verbatim() {
        assert_eq!(compile(&["ghost:asc"]).unwrap_err(), QueryError::UnknownField("ghost:asc".into()));
        assert_eq!(compile(&["handle:up"]).unwrap_err(), QueryError::UnknownField("handle:up".into()));
        assert_eq!(
            compile(&["handle:asc:desc"]).unwrap_err(),
            QueryError::UnknownField("handle:asc:desc".into())
        );
        assert_eq!(
            compile(&["translation.ghost:desc"]).unwrap_err(),
            QueryError::UnknownField("translation.ghost:desc".into())
        );
    }

    #[test]
    fn object_entries_override_null_placement() {
        let mut planner = JoinPlanner::new(&products());
        let order: Vec<OrderInput> = serde_json::from_value(json!([
            { "field": "handle", "direction": "asc", "nulls": "first" }
        ])).unwrap();
        let keys = OrderCompiler::compile(&mut planner, Some(order.as_slice())).unwrap();
        assert_eq!(keys[0].nulls, NullsOrder::First);
    }

    #[test]
    fn absent_order_is_empty() {
        let mut planner = JoinPlanner::new(&products());
        assert!(OrderCompiler::compile(&mut planner, None).unwrap().is_empty());
        assert!(planner.joins().is_empty());
    }
}
