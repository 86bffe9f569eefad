//! Typed filter expressions for document searches.
//!
//! A [`Filter`] is a conjunction of `field / operator / value` conditions.
//! The same filter renders to a MongoDB query document for the Mongo backend
//! and evaluates directly against documents for the in-memory backend.

use std::cmp::Ordering;

use bson::{Bson, Document};

/// Comparison applied to one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Eq(Bson),
    Ne(Bson),
    Gt(Bson),
    Gte(Bson),
    Lt(Bson),
    Lte(Bson),
    In(Vec<Bson>),
    NotIn(Vec<Bson>),
    Exists(bool),
    /// String prefix match.
    StartsWith(String),
}

/// One `field / operator / value` triple. `field` may be a dotted path.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
}

/// All conditions must hold. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every document.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, op: Op) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op,
        });
        self
    }

    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Eq(value.into()))
    }

    #[must_use]
    pub fn ne(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Ne(value.into()))
    }

    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Gt(value.into()))
    }

    #[must_use]
    pub fn gte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Gte(value.into()))
    }

    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Lt(value.into()))
    }

    #[must_use]
    pub fn lte(self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.with(field, Op::Lte(value.into()))
    }

    #[must_use]
    pub fn any_of<V: Into<Bson>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with(field, Op::In(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn none_of<V: Into<Bson>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.with(field, Op::NotIn(values.into_iter().map(Into::into).collect()))
    }

    #[must_use]
    pub fn exists(self, field: impl Into<String>, present: bool) -> Self {
        self.with(field, Op::Exists(present))
    }

    #[must_use]
    pub fn starts_with(self, field: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.with(field, Op::StartsWith(prefix.into()))
    }

    /// Render as a MongoDB query document.
    ///
    /// Conditions on the same field share one operator document. If the same
    /// operator repeats on a field the whole filter falls back to `$and`.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut query = Document::new();
        for condition in &self.conditions {
            let (operator, value) = condition.op.to_operator();
            match query.get_mut(&condition.field) {
                Some(Bson::Document(ops)) if !ops.contains_key(operator) => {
                    ops.insert(operator, value);
                }
                Some(_) => return self.to_and_document(),
                None => {
                    let mut ops = Document::new();
                    ops.insert(operator, value);
                    query.insert(condition.field.clone(), ops);
                }
            }
        }
        query
    }

    fn to_and_document(&self) -> Document {
        let clauses: Vec<Bson> = self
            .conditions
            .iter()
            .map(|condition| {
                let (operator, value) = condition.op.to_operator();
                let mut ops = Document::new();
                ops.insert(operator, value);
                let mut clause = Document::new();
                clause.insert(condition.field.clone(), ops);
                Bson::Document(clause)
            })
            .collect();
        let mut query = Document::new();
        query.insert("$and", clauses);
        query
    }

    /// Evaluate the filter against a document in memory.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.op.matches(lookup(document, &condition.field)))
    }
}

impl Op {
    fn to_operator(&self) -> (&'static str, Bson) {
        match self {
            Self::Eq(value) => ("$eq", value.clone()),
            Self::Ne(value) => ("$ne", value.clone()),
            Self::Gt(value) => ("$gt", value.clone()),
            Self::Gte(value) => ("$gte", value.clone()),
            Self::Lt(value) => ("$lt", value.clone()),
            Self::Lte(value) => ("$lte", value.clone()),
            Self::In(values) => ("$in", Bson::Array(values.clone())),
            Self::NotIn(values) => ("$nin", Bson::Array(values.clone())),
            Self::Exists(present) => ("$exists", Bson::Boolean(*present)),
            Self::StartsWith(prefix) => ("$regex", Bson::String(format!("^{}", escape_regex(prefix)))),
        }
    }

    /// Missing fields follow MongoDB: they equal `null` and satisfy `$ne`/`$nin`
    /// for non-null values, and never satisfy range or prefix comparisons.
    fn matches(&self, value: Option<&Bson>) -> bool {
        match (self, value) {
            (Self::Exists(present), value) => value.is_some() == *present,
            (Self::Eq(target), value) => equals(value, target),
            (Self::Ne(target), value) => !equals(value, target),
            (Self::In(targets), value) => targets.iter().any(|target| equals(value, target)),
            (Self::NotIn(targets), value) => !targets.iter().any(|target| equals(value, target)),
            (Self::Gt(target), Some(value)) => compare(value, target) == Some(Ordering::Greater),
            (Self::Gte(target), Some(value)) => {
                matches!(compare(value, target), Some(Ordering::Greater | Ordering::Equal))
            }
            (Self::Lt(target), Some(value)) => compare(value, target) == Some(Ordering::Less),
            (Self::Lte(target), Some(value)) => {
                matches!(compare(value, target), Some(Ordering::Less | Ordering::Equal))
            }
            (Self::StartsWith(prefix), Some(Bson::String(value))) => value.starts_with(prefix.as_str()),
            _ => false,
        }
    }
}

fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

fn equals(value: Option<&Bson>, target: &Bson) -> bool {
    match value {
        None => matches!(target, Bson::Null),
        Some(value) => value == target || compare(value, target) == Some(Ordering::Equal),
    }
}

fn compare(left: &Bson, right: &Bson) -> Option<Ordering> {
    match (left, right) {
        (Bson::String(l), Bson::String(r)) => Some(l.cmp(r)),
        (Bson::Boolean(l), Bson::Boolean(r)) => Some(l.cmp(r)),
        (Bson::DateTime(l), Bson::DateTime(r)) => Some(l.cmp(r)),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

#[allow(clippy::cast_precision_loss)]
fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn escape_regex(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn account() -> Document {
        doc! {
            "_id": "acc-7",
            "public_key": "pk-alpha",
            "tier": 3,
            "profile": { "region": "eu" },
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(Filter::all().matches(&account()));
        assert!(Filter::all().matches(&Document::new()));
        assert_eq!(Filter::all().to_document(), Document::new());
    }

    #[test]
    fn eq_and_ne() {
        assert!(Filter::all().eq("public_key", "pk-alpha").matches(&account()));
        assert!(!Filter::all().eq("public_key", "pk-beta").matches(&account()));
        assert!(Filter::all().ne("public_key", "pk-beta").matches(&account()));
    }

    #[test]
    fn numbers_compare_across_widths() {
        assert!(Filter::all().eq("tier", 3_i64).matches(&account()));
        assert!(Filter::all().eq("tier", 3.0).matches(&account()));
        assert!(Filter::all().gt("tier", 2_i64).matches(&account()));
        assert!(Filter::all().lte("tier", 3).matches(&account()));
        assert!(!Filter::all().lt("tier", 3).matches(&account()));
    }

    #[test]
    fn mismatched_types_never_compare() {
        assert!(!Filter::all().gt("public_key", 1).matches(&account()));
        assert!(!Filter::all().eq("tier", "3").matches(&account()));
    }

    #[test]
    fn missing_field_semantics() {
        let doc = account();
        assert!(Filter::all().eq("missing", Bson::Null).matches(&doc));
        assert!(!Filter::all().eq("missing", "x").matches(&doc));
        assert!(Filter::all().ne("missing", "x").matches(&doc));
        assert!(!Filter::all().gt("missing", 0).matches(&doc));
        assert!(Filter::all().none_of("missing", ["a", "b"]).matches(&doc));
        assert!(Filter::all().exists("missing", false).matches(&doc));
        assert!(!Filter::all().exists("missing", true).matches(&doc));
    }

    #[test]
    fn dotted_paths_reach_nested_fields() {
        assert!(Filter::all().eq("profile.region", "eu").matches(&account()));
        assert!(!Filter::all().exists("tier.nested", true).matches(&account()));
    }

    #[test]
    fn in_and_prefix() {
        let doc = account();
        assert!(Filter::all().any_of("_id", ["acc-1", "acc-7"]).matches(&doc));
        assert!(!Filter::all().any_of("_id", ["acc-1"]).matches(&doc));
        assert!(Filter::all().starts_with("_id", "acc-").matches(&doc));
        assert!(!Filter::all().starts_with("tier", "3").matches(&doc));
    }

    #[test]
    fn conditions_are_conjunctive() {
        let filter = Filter::all().starts_with("_id", "acc").eq("tier", 4);
        assert!(!filter.matches(&account()));
    }

    #[test]
    fn renders_mongo_operators() {
        let filter = Filter::all()
            .eq("public_key", "pk")
            .gte("tier", 1)
            .lt("tier", 5)
            .exists("profile", true);
        assert_eq!(
            filter.to_document(),
            doc! {
                "public_key": { "$eq": "pk" },
                "tier": { "$gte": 1, "$lt": 5 },
                "profile": { "$exists": true },
            }
        );
    }

    #[test]
    fn renders_escaped_anchored_prefix() {
        let filter = Filter::all().starts_with("_id", "a.b*");
        assert_eq!(
            filter.to_document(),
            doc! { "_id": { "$regex": "^a\\.b\\*" } }
        );
    }

    #[test]
    fn repeated_operator_falls_back_to_and() {
        let filter = Filter::all().ne("_id", "a").ne("_id", "b");
        assert_eq!(
            filter.to_document(),
            doc! { "$and": [ { "_id": { "$ne": "a" } }, { "_id": { "$ne": "b" } } ] }
        );
        assert!(filter.matches(&doc! { "_id": "c" }));
        assert!(!filter.matches(&doc! { "_id": "b" }));
    }

    #[test]
    fn renders_in_lists() {
        let filter = Filter::all().any_of("_id", ["x", "y"]).none_of("tier", [1, 2]);
        assert_eq!(
            filter.to_document(),
            doc! { "_id": { "$in": ["x", "y"] }, "tier": { "$nin": [1, 2] } }
        );
    }
}
