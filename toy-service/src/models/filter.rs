//! Typed listing filters.
//!
//! Query parameters never reach the store as raw documents. They are turned
//! into a [`ListingFilter`], which only knows three kinds of condition, and
//! field names are checked so a caller cannot smuggle in query operators.

use mongodb::bson::{doc, Bson, Document};
use service_core::error::AppError;
use thiserror::Error;

pub const TOY_NAME_FIELD: &str = "toyName";
pub const TRENDING_FIELD: &str = "trending";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter field name must not be empty")]
    EmptyField,

    #[error("filter field '{0}' is not allowed")]
    DisallowedField(String),
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldCondition {
    /// Field equals this string exactly.
    Equals(String),
    /// Field contains this text, ignoring case.
    Contains(String),
    /// Field equals this boolean.
    Flag(bool),
}

impl FieldCondition {
    fn to_bson(&self) -> Bson {
        match self {
            FieldCondition::Equals(value) => Bson::String(value.clone()),
            FieldCondition::Contains(text) => Bson::Document(doc! {
                "$regex": regex::escape(text),
                "$options": "i",
            }),
            FieldCondition::Flag(flag) => Bson::Boolean(*flag),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    conditions: Vec<(String, FieldCondition)>,
}

impl ListingFilter {
    /// Matches every listing.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn name_contains(text: impl Into<String>) -> Self {
        Self {
            conditions: vec![(
                TOY_NAME_FIELD.to_string(),
                FieldCondition::Contains(text.into()),
            )],
        }
    }

    pub fn trending(flag: bool) -> Self {
        Self {
            conditions: vec![(TRENDING_FIELD.to_string(), FieldCondition::Flag(flag))],
        }
    }

    /// Every query parameter becomes an exact string match on the field of the
    /// same name. A repeated key keeps its first position and its last value.
    pub fn from_query_pairs<I>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filter = Self::default();
        for (field, value) in pairs {
            validate_field(&field)?;
            filter.set(field, FieldCondition::Equals(value));
        }
        Ok(filter)
    }

    pub fn conditions(&self) -> &[(String, FieldCondition)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn to_document(&self) -> Document {
        self.conditions
            .iter()
            .map(|(field, condition)| (field.clone(), condition.to_bson()))
            .collect()
    }

    fn set(&mut self, field: String, condition: FieldCondition) {
        match self.conditions.iter_mut().find(|(existing, _)| *existing == field) {
            Some((_, slot)) => *slot = condition,
            None => self.conditions.push((field, condition)),
        }
    }
}

/// Plain and dotted field paths are fine; empty segments and `$`-prefixed
/// segments (query operators) are not.
fn validate_field(field: &str) -> Result<(), FilterError> {
    if field.is_empty() {
        return Err(FilterError::EmptyField);
    }
    let disallowed = field
        .split('.')
        .any(|segment| segment.is_empty() || segment.starts_with('$') || segment.contains('\0'));
    if disallowed {
        return Err(FilterError::DisallowedField(field.to_string()));
    }
    Ok(())
}
