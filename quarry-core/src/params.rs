use crate::{
    Error, GenericSqlWriter, Result, SqlWriter, Value,
    writer::Context,
};
use std::{fmt::Write, ops::Range};

/// Ordered map of named parameters, names are stored without the leading `:`.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

/// Build [`Params`] from `name => value` pairs.
/// ```rust
/// use quarry_core::{params, Value};
/// let params = params! { "id" => 1, "name" => "quarry", "ids" => vec![1, 2, 3] };
/// assert_eq!(params.get("id"), Some(&Value::Int32(Some(1))));
/// ```
#[macro_export]
macro_rules! params {
    ($($name:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut params = $crate::Params::new();
        $(params.insert($name, $value);)*
        params
    }};
}

fn normalize(name: &str) -> &str {
    name.strip_prefix(':').unwrap_or(name)
}

impl Params {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set a parameter, returns the previous value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        let name = normalize(name.as_ref());
        let value = value.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(n, _)| n == name) {
            return Some(std::mem::replace(v, value));
        }
        self.entries.push((name.to_owned(), value));
        None
    }
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = normalize(name);
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let name = normalize(name);
        let i = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(i).1)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
    fn has_lists(&self) -> bool {
        self.entries.iter().any(|(_, v)| matches!(v, Value::List(..)))
    }
}

impl<N: AsRef<str>, V: Into<Value>> FromIterator<(N, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut result = Params::new();
        for (n, v) in iter {
            result.insert(n, v);
        }
        result
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A `:name` occurrence in a SQL text, `range` covers the colon and the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'s> {
    pub range: Range<usize>,
    pub name: &'s str,
}

fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_identifier_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Length of the `$tag$` opening a dollar quoted string at the start of `bytes`.
fn dollar_tag(bytes: &[u8]) -> Option<usize> {
    let mut end = 1;
    if bytes.get(end).copied().is_some_and(is_identifier_start) {
        while bytes.get(end).copied().is_some_and(is_identifier_char) {
            end += 1;
        }
    }
    (bytes.get(end) == Some(&b'$')).then_some(end + 1)
}

/// Find the placeholders in `sql`.
///
/// String literals, quoted identifiers, dollar quoted strings, comments and
/// `::` casts are skipped, a placeholder always extends to the end of the
/// identifier. Backslash escapes are not recognized.
pub fn placeholders(sql: &str) -> Vec<Placeholder<'_>> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut result = Vec::new();
    let mut i = 0;
    while i < len {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied();
        match c {
            b'\'' | b'"' | b'`' => {
                i += 1;
                while i < len {
                    if bytes[i] == c {
                        // Doubled delimiter is an escape
                        if bytes.get(i + 1) == Some(&c) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' if next == Some(b'-') => {
                while i < len && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if next == Some(b'*') => {
                i += 2;
                while i < len && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            b'$' if i == 0 || !is_identifier_char(bytes[i - 1]) => {
                match dollar_tag(&bytes[i..]) {
                    Some(tag) => {
                        let tag = &bytes[i..i + tag];
                        i += tag.len();
                        while i < len && !bytes[i..].starts_with(tag) {
                            i += 1;
                        }
                        i += tag.len();
                    }
                    None => i += 1,
                }
            }
            b':' if next == Some(b':') => i += 2,
            b':' if next.is_some_and(is_identifier_start) => {
                let start = i;
                i += 1;
                while i < len && is_identifier_char(bytes[i]) {
                    i += 1;
                }
                result.push(Placeholder {
                    range: start..i,
                    name: &sql[start + 1..i],
                });
            }
            _ => i += 1,
        }
    }
    result
}

/// Copy `sql` replacing every placeholder with the output of `f`.
pub fn rewrite_placeholders<F>(sql: &str, mut f: F) -> Result<String>
where
    F: FnMut(&mut String, &str) -> Result<()>,
{
    let mut out = String::with_capacity(sql.len() + 16);
    let mut position = 0;
    for placeholder in placeholders(sql) {
        out.push_str(&sql[position..placeholder.range.start]);
        f(&mut out, placeholder.name)?;
        position = placeholder.range.end;
    }
    out.push_str(&sql[position..]);
    Ok(out)
}

/// Expand the list parameters of `params`.
///
/// `:ids` bound to `[1, 2, 3]` becomes `(:ids0, :ids1, :ids2)`, the entry `ids`
/// is replaced by `ids0`, `ids1` and `ids2`. An empty list becomes a subquery
/// without rows, `IN` it is false and `NOT IN` it is true.
/// Returns `None` when there is nothing to expand.
pub fn expand_arrays(sql: &str, params: &Params) -> Result<Option<(String, Params)>> {
    expand_arrays_with(sql, params, |out, element| {
        GenericSqlWriter.write_empty_list(&Context::default(), out, element)
    })
}

/// Same as [`expand_arrays`], `empty` writes the set replacing an empty list
/// given the type of its items.
pub fn expand_arrays_with<F>(
    sql: &str,
    params: &Params,
    empty: F,
) -> Result<Option<(String, Params)>>
where
    F: Fn(&mut String, &Value),
{
    if !params.has_lists() {
        return Ok(None);
    }
    let mut expanded = Params::with_capacity(params.len() + 8);
    let mut lists = Vec::new();
    for (name, value) in params.iter() {
        if let Value::List(items, element) = value {
            lists.push((name, items.as_deref().unwrap_or_default(), &**element));
        } else {
            expanded.insert(name, value.clone());
        }
    }
    for (name, items, _) in &lists {
        for (i, item) in items.iter().enumerate() {
            let element = format!("{}{}", name, i);
            if expanded.insert(&element, item.clone()).is_some() {
                return Err(Error::Parameter(format!(
                    "The expansion of the array parameter `{}` clashes with the parameter `{}`",
                    name, element
                )));
            }
        }
    }
    let sql = rewrite_placeholders(sql, |out, name| {
        match lists.iter().find(|(n, ..)| *n == name) {
            Some(&(_, [], element)) => empty(out, element),
            Some(&(_, items, _)) => {
                out.push('(');
                for i in 0..items.len() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, ":{}{}", name, i);
                }
                out.push(')');
            }
            None => {
                out.push(':');
                out.push_str(name);
            }
        }
        Ok(())
    })?;
    Ok(Some((sql, expanded)))
}

/// Rewrite named placeholders into positional ones produced by `write`
/// (receiving the 1-based position). Returns the new SQL and the parameter
/// name bound at each position. When `share_repeated` is set a name used
/// more than once keeps its first position, otherwise every occurrence gets
/// its own.
pub fn to_positional<W>(sql: &str, share_repeated: bool, mut write: W) -> (String, Vec<String>)
where
    W: FnMut(&mut String, usize),
{
    let mut names: Vec<String> = Vec::new();
    let result = rewrite_placeholders(sql, |out, name| {
        let position = match names.iter().position(|n| n == name) {
            Some(i) if share_repeated => i + 1,
            _ => {
                names.push(name.to_owned());
                names.len()
            }
        };
        write(out, position);
        Ok(())
    });
    (result.unwrap_or_else(|_| sql.to_owned()), names)
}
