use crate::definition::{JoinType, QueryDefinition};

/// Join from a column of the owning definition to a column of `target`.
///
/// `composite` holds extra `(local, target)` column pairs ANDed into the
/// `ON` clause after the primary pair.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub join_type: JoinType,
    pub local_column: String,
    pub target: QueryDefinition,
    pub target_column: String,
    pub composite: Vec<(String, String)>,
}

impl JoinSpec {
    /// Every `(local, target)` column pair of the `ON` clause, primary first.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((self.local_column.as_str(), self.target_column.as_str()))
            .chain(self.composite.iter().map(|(local, target)| (local.as_str(), target.as_str())))
    }
}

/// Column of `target` named by `name`: a scalar field's column, or `name` itself.
fn target_column(target: &QueryDefinition, name: &str) -> String {
    match target.fields().get(name) {
        Some(FieldSpec::Scalar { column }) => column.clone(),
        _ => name.to_string(),
    }
}

/// How an exposed field name resolves: a plain column or a join.
#[derive(Debug, Clone)]
pub enum FieldSpec {
    Scalar { column: String },
    Join(JoinSpec),
}

impl FieldSpec {
    pub fn scalar(column: &str) -> Self {
        Self::Scalar { column: column.to_string() }
    }

    /// Column on the owning table. For a join this is the local join key.
    pub fn column(&self) -> &str {
        match self {
            FieldSpec::Scalar { column } => column,
            FieldSpec::Join(join) => &join.local_column,
        }
    }

    pub fn as_join(&self) -> Option<&JoinSpec> {
        match self {
            FieldSpec::Join(join) => Some(join),
            FieldSpec::Scalar { .. } => None,
        }
    }

    pub fn is_join(&self) -> bool {
        matches!(self, FieldSpec::Join(_))
    }

    /// Add a composite key pair to a join: `local_column` of the owning table
    /// must also equal `target_column` (a field of the target, or a raw column).
    ///
    /// Has no effect on a scalar field.
    pub fn and_on(self, local_column: &str, target_column_name: &str) -> Self {
        match self {
            FieldSpec::Join(mut join) => {
                let target = target_column(&join.target, target_column_name);
                join.composite.push((local_column.to_string(), target));
                FieldSpec::Join(join)
            }
            scalar => scalar,
        }
    }
}

/// Builder returned by [`field`]; converts into a scalar [`FieldSpec`] or,
/// through one of the join methods, into a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBuilder {
    column: String,
}

/// Start a field declaration on `column` of the owning table.
pub fn field(column: &str) -> FieldBuilder {
    FieldBuilder { column: column.to_string() }
}

impl FieldBuilder {
    /// `target_column` may name a field of `target` (its column is used) or a raw column.
    pub fn join(self, join_type: JoinType, target: &QueryDefinition, target_column_name: &str) -> FieldSpec {
        FieldSpec::Join(JoinSpec {
            join_type,
            local_column: self.column,
            target: target.clone(),
            target_column: target_column(target, target_column_name),
            composite: Vec::new(),
        })
    }

    pub fn left_join(self, target: &QueryDefinition, target_column: &str) -> FieldSpec {
        self.join(JoinType::Left, target, target_column)
    }

    pub fn right_join(self, target: &QueryDefinition, target_column: &str) -> FieldSpec {
        self.join(JoinType::Right, target, target_column)
    }

    pub fn inner_join(self, target: &QueryDefinition, target_column: &str) -> FieldSpec {
        self.join(JoinType::Inner, target, target_column)
    }

    pub fn full_join(self, target: &QueryDefinition, target_column: &str) -> FieldSpec {
        self.join(JoinType::Full, target, target_column)
    }
}

impl From<FieldBuilder> for FieldSpec {
    fn from(value: FieldBuilder) -> Self {
        FieldSpec::Scalar { column: value.column }
    }
}

#[cfg(test)]
mod tests {
    use crate::definition::{create_query, field, FieldSpec, JoinType};

    #[test]
    fn builder_converts_to_scalar() {
        let spec: FieldSpec = field("is_active").into();
        assert!(!spec.is_join());
        assert_eq!(spec.column(), "is_active");
    }

    #[test]
    fn join_resolves_target_field_to_its_column() {
        let translations = create_query("translations", [
            ("entityId", field("entity_id")),
            ("value", field("value")),
        ]).unwrap();

        let spec = field("id").inner_join(&translations, "entityId");
        let join = spec.as_join().unwrap();
        assert_eq!(join.join_type, JoinType::Inner);
        assert_eq!(join.local_column, "id");
        assert_eq!(join.target_column, "entity_id");
        assert_eq!(spec.column(), "id");
    }

    #[test]
    fn join_keeps_raw_target_column_when_not_a_field() {
        let translations = create_query("translations", [("value", field("value"))]).unwrap();

        let spec = field("id").full_join(&translations, "entity_id");
        let join = spec.as_join().unwrap();
        assert_eq!(join.join_type, JoinType::Full);
        assert_eq!(join.target_column, "entity_id");
    }

    #[test]
    fn composite_pairs_follow_the_primary_pair() {
        let translations = create_query("translations", [
            ("entityId", field("entity_id")),
            ("kind", field("field")),
        ]).unwrap();

        let spec = field("id").left_join(&translations, "entityId").and_on("handle", "kind");
        let join = spec.as_join().unwrap();
        let pairs = join.conditions().collect::<Vec<_>>();
        assert_eq!(pairs, vec![("id", "entity_id"), ("handle", "field")]);

        let scalar = FieldSpec::scalar("name").and_on("a", "b");
        assert!(!scalar.is_join());
    }

    #[test]
    fn every_join_method_sets_its_kind() {
        let target = create_query("t", [("id", field("id"))]).unwrap();
        let kinds = [
            field("a").left_join(&target, "id"),
            field("a").right_join(&target, "id"),
            field("a").inner_join(&target, "id"),
            field("a").full_join(&target, "id"),
        ]
        .iter()
        .map(|spec| spec.as_join().unwrap().join_type)
        .collect::<Vec<_>>();

        assert_eq!(kinds, vec![JoinType::Left, JoinType::Right, JoinType::Inner, JoinType::Full]);
    }
}
