//! Collection queries: paging parameters and validated ordering
//!
//! The dispatcher coerces `offset`, `limit` and `order` from the query string
//! into [`QueryParams`]; [`QueryBuilder`] turns those into a [`Query`] whose
//! order clauses are all resolved against the queried type's properties.
//!
//! ```text
//! GET /books?offset=30&limit=10&order=title%20desc&order=id
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::core::entity::{EntityTypeDescriptor, PropertyDescriptor};
use crate::core::error::{HaloError, OrderError, RequestError};

/// Offset used when the request does not give one
pub const DEFAULT_OFFSET: usize = 0;

/// Limit used when the request does not give one
pub const DEFAULT_LIMIT: usize = 30;

/// Largest limit a request may ask for
pub const MAX_LIMIT: usize = 100;

/// Typed query-string parameters, as coerced by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub offset: usize,
    pub limit: usize,
    /// Raw order tokens, e.g. `"title desc"`
    pub order: Vec<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            order: Vec::new(),
        }
    }
}

/// Paging defaults and bounds the dispatcher applies while coercing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub default_offset: usize,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            default_offset: DEFAULT_OFFSET,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl QueryParams {
    /// Coerce raw query-string pairs
    ///
    /// `order` may repeat (also as `order[]`) and a single value may hold
    /// comma-separated tokens. Unknown keys are ignored. A `limit` above
    /// `paging.max_limit` is capped.
    pub fn from_pairs(pairs: &[(String, String)], paging: Paging) -> Result<Self, RequestError> {
        let mut params = Self {
            offset: paging.default_offset,
            limit: paging.default_limit,
            order: Vec::new(),
        };

        for (key, value) in pairs {
            match key.as_str() {
                "offset" => {
                    params.offset = value.trim().parse().map_err(|_| {
                        RequestError::InvalidParameter {
                            name: "offset".to_string(),
                            message: format!("'{}' is not a non-negative integer", value),
                        }
                    })?;
                }
                "limit" => {
                    let limit: usize = value.trim().parse().map_err(|_| {
                        RequestError::InvalidParameter {
                            name: "limit".to_string(),
                            message: format!("'{}' is not a positive integer", value),
                        }
                    })?;
                    if limit == 0 {
                        return Err(RequestError::InvalidParameter {
                            name: "limit".to_string(),
                            message: "must be positive".to_string(),
                        });
                    }
                    params.limit = limit.min(paging.max_limit.max(1));
                }
                "order" | "order[]" => params.order.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .map(str::to_string),
                ),
                _ => {}
            }
        }

        Ok(params)
    }
}

/// Sort direction of one order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Some(Direction::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Some(Direction::Desc)
        } else {
            None
        }
    }
}

/// One resolved sort key
#[derive(Debug, Clone)]
pub struct OrderClause {
    pub property: PropertyDescriptor,
    pub direction: Direction,
}

/// A validated, executable collection query
#[derive(Debug, Clone)]
pub struct Query {
    /// Singular name of the queried type
    pub entity_type: String,
    pub offset: usize,
    pub limit: usize,
    pub order: Vec<OrderClause>,
}

impl Query {
    /// The unordered first page of a type
    pub fn first_page(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            order: Vec::new(),
        }
    }
}

/// Builds [`Query`] values against a type descriptor
///
/// Stateless; the same builder serves the origin type of a request and the
/// target type of any relationship it traverses.
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build a query, resolving every order token against `descriptor`
    ///
    /// Fails on the first token that is malformed or names a property the
    /// type does not declare; no partial query is produced.
    pub fn build(
        descriptor: &EntityTypeDescriptor,
        offset: usize,
        limit: usize,
        tokens: &[String],
    ) -> Result<Query, HaloError> {
        let order = tokens
            .iter()
            .map(|token| Self::resolve_token(descriptor, token))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Query {
            entity_type: descriptor.name.clone(),
            offset,
            limit,
            order,
        })
    }

    /// Build from dispatcher-coerced parameters
    pub fn from_params(
        descriptor: &EntityTypeDescriptor,
        params: &QueryParams,
    ) -> Result<Query, HaloError> {
        Self::build(descriptor, params.offset, params.limit, &params.order)
    }

    /// Resolve `"<property> [asc|desc]"`
    fn resolve_token(
        descriptor: &EntityTypeDescriptor,
        token: &str,
    ) -> Result<OrderClause, OrderError> {
        let captures = order_token_regex()
            .captures(token)
            .ok_or_else(|| OrderError::malformed(token, "expected '<property> [asc|desc]'"))?;

        let name = &captures["property"];
        let direction = match captures.name("direction") {
            Some(raw) => Direction::parse(raw.as_str()).ok_or_else(|| {
                OrderError::malformed(token, format!("unknown direction '{}'", raw.as_str()))
            })?,
            None => Direction::Asc,
        };

        let property = descriptor
            .property(name)
            .ok_or_else(|| OrderError::unknown_property(token, &descriptor.name))?;

        Ok(OrderClause {
            property: property.clone(),
            direction,
        })
    }
}

fn order_token_regex() -> &'static Regex {
    static ORDER_TOKEN: OnceLock<Regex> = OnceLock::new();
    ORDER_TOKEN.get_or_init(|| {
        Regex::new(r"^\s*(?P<property>\S+)(?:\s+(?P<direction>\S+))?\s*$")
            .expect("order token pattern")
    })
}
