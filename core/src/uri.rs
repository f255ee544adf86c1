//! Query-string composition for service paths.
//!
//! # Design
//! Parameters live in an `IndexMap`, so rendering follows insertion order and
//! is a pure function of the map. Keys and values are form-urlencoded (space
//! becomes `+`). A value that is null, `false` or the empty string renders as
//! a bare key; `0` and `"0"` keep their `=0`. Nested maps only hold scalars,
//! so deeper nesting cannot be expressed.

use std::fmt;

use indexmap::IndexMap;

/// A single query value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// The encoded `=value` part is omitted for these.
    fn is_blank(&self) -> bool {
        match self {
            Self::Null | Self::Bool(false) => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Null | Self::Bool(false) => String::new(),
            Self::Bool(true) => "1".to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(x) => x.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// A top-level query parameter: a scalar, or a map rendered as `key[sub]=v`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(Scalar),
    Map(IndexMap<String, Scalar>),
}

impl ParamValue {
    /// Builds a map value from `(sub_key, value)` pairs, keeping their order.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Scalar>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A base path plus ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uri {
    base: String,
    params: IndexMap<String, ParamValue>,
}

impl Uri {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            params: IndexMap::new(),
        }
    }

    pub fn with_params(base: impl Into<String>, params: IndexMap<String, ParamValue>) -> Self {
        Self {
            base: base.into(),
            params,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn params(&self) -> &IndexMap<String, ParamValue> {
        &self.params
    }

    /// Adds or replaces a parameter. A replaced key keeps its position.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn set_params(&mut self, params: IndexMap<String, ParamValue>) {
        self.params = params;
    }

    /// Renders `base`, followed by `?` and the `&`-joined segments when any
    /// parameter produces one.
    pub fn render(&self) -> String {
        let mut segments = Vec::new();
        for (key, value) in &self.params {
            match value {
                ParamValue::Scalar(scalar) => segments.push(segment(encode(key), scalar)),
                ParamValue::Map(entries) => {
                    for (sub_key, scalar) in entries {
                        let name = format!("{}[{}]", encode(key), encode(sub_key));
                        segments.push(segment(name, scalar));
                    }
                }
            }
        }

        if segments.is_empty() {
            return self.base.clone();
        }
        format!("{}?{}", self.base, segments.join("&"))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn segment(name: String, value: &Scalar) -> String {
    if value.is_blank() {
        return name;
    }
    format!("{name}={}", encode(&value.render()))
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<IndexMap<String, Scalar>> for ParamValue {
    fn from(entries: IndexMap<String, Scalar>) -> Self {
        Self::Map(entries)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        Self::Scalar(value.into())
    }
}

macro_rules! scalar_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }
        )*
    };
}

scalar_param!(&str, String, bool, i64, i32, u32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(params: Vec<(&str, ParamValue)>) -> Uri {
        Uri::with_params(
            "users",
            params.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        )
    }

    #[test]
    fn no_params_renders_base_unchanged() {
        assert_eq!(Uri::new("users/5").render(), "users/5");
    }

    #[test]
    fn scalars_render_in_insertion_order() {
        let mut u = Uri::new("users");
        u.add_param("page", 2);
        u.add_param("sort", "name");
        assert_eq!(u.render(), "users?page=2&sort=name");
    }

    #[test]
    fn zero_keeps_its_value() {
        assert_eq!(uri(vec![("a", 0.into())]).render(), "users?a=0");
        assert_eq!(uri(vec![("a", "0".into())]).render(), "users?a=0");
    }

    #[test]
    fn blank_values_render_as_bare_keys() {
        assert_eq!(uri(vec![("a", "".into())]).render(), "users?a");
        assert_eq!(uri(vec![("a", Scalar::Null.into())]).render(), "users?a");
        assert_eq!(uri(vec![("a", false.into())]).render(), "users?a");
        assert_eq!(uri(vec![("a", None::<i64>.into())]).render(), "users?a");
    }

    #[test]
    fn true_renders_as_one() {
        assert_eq!(uri(vec![("active", true.into())]).render(), "users?active=1");
    }

    #[test]
    fn floats_render_without_trailing_zero() {
        assert_eq!(uri(vec![("x", 1.5.into()), ("y", 2.0.into())]).render(), "users?x=1.5&y=2");
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let u = uri(vec![("q&a", "x=y?z w".into())]);
        assert_eq!(u.render(), "users?q%26a=x%3Dy%3Fz+w");
    }

    #[test]
    fn map_values_render_bracketed_segments() {
        let u = uri(vec![
            (
                "filter",
                ParamValue::map([
                    ("role", Scalar::from("admin")),
                    ("deleted", Scalar::Bool(false)),
                ]),
            ),
            ("limit", 10.into()),
        ]);
        assert_eq!(u.render(), "users?filter[role]=admin&filter[deleted]&limit=10");
    }

    #[test]
    fn replaced_param_keeps_position() {
        let mut u = Uri::new("users");
        u.add_param("a", 1);
        u.add_param("b", 2);
        u.add_param("a", 3);
        assert_eq!(u.to_string(), "users?a=3&b=2");
    }

    #[test]
    fn set_params_replaces_everything() {
        let mut u = Uri::new("users");
        u.add_param("a", 1);
        u.set_params(IndexMap::new());
        assert_eq!(u.render(), "users");
    }

    #[test]
    fn empty_map_value_yields_no_segment() {
        let u = uri(vec![("filter", ParamValue::Map(IndexMap::new()))]);
        assert_eq!(u.render(), "users");
    }
}
