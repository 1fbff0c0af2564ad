use crate::{ParameterIndexHolder, QueryParameter};
use std::collections::HashMap;

/// Positional placeholder emitted for every named marker.
pub const PLACEHOLDER: char = '?';

pub fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// SQL text with positional placeholders only, plus the named parameters it
/// binds, in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSql {
    pub sql: String,
    parameters: Vec<QueryParameter>,
    by_name: HashMap<String, usize>,
    placeholders: usize,
}

impl ParsedSql {
    /// Scan `sql` replacing each `:name` marker with `?`.
    ///
    /// A marker starts at a `:` that is not preceded by another `:` and is
    /// followed by an identifier start character, so `a::int` passes through.
    /// Every placeholder, named or already positional, takes the next index
    /// (starting from 1). Scanning never fails.
    pub fn parse(sql: &str) -> Self {
        let mut result = Self {
            sql: String::with_capacity(sql.len()),
            ..Default::default()
        };
        let mut chars = sql.char_indices().peekable();
        let mut previous = None;
        while let Some((i, c)) = chars.next() {
            let next = chars.peek().map(|(_, c)| *c);
            let is_marker = c == ':'
                && previous != Some(':')
                && next.is_some_and(is_identifier_start);
            if is_marker {
                let start = i + c.len_utf8();
                let mut end = start;
                while let Some((j, n)) = chars.peek().copied() {
                    if !is_identifier_part(n) {
                        break;
                    }
                    end = j + n.len_utf8();
                    previous = Some(n);
                    chars.next();
                }
                result.push_named(&sql[start..end]);
                continue;
            }
            if c == PLACEHOLDER {
                result.placeholders += 1;
            }
            result.sql.push(c);
            previous = Some(c);
        }
        result
    }

    fn push_named(&mut self, name: &str) {
        self.placeholders += 1;
        let index = self.placeholders;
        match self.by_name.get(name) {
            Some(&i) => self.parameters[i].holder.push(index),
            None => {
                self.by_name.insert(name.to_owned(), self.parameters.len());
                self.parameters.push(QueryParameter::new(name, index));
            }
        }
        self.sql.push(PLACEHOLDER);
    }

    /// Total number of positional placeholders in `sql`.
    pub fn placeholder_count(&self) -> usize {
        self.placeholders
    }
    pub(crate) fn set_placeholder_count(&mut self, count: usize) {
        self.placeholders = count;
    }
    pub fn parameter(&self, name: &str) -> Option<&QueryParameter> {
        self.by_name.get(name).map(|&i| &self.parameters[i])
    }
    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut QueryParameter> {
        self.by_name.get(name).map(|&i| &mut self.parameters[i])
    }
    pub fn indices(&self, name: &str) -> Option<&ParameterIndexHolder> {
        self.parameter(name).map(|p| &p.holder)
    }
    pub fn parameters(&self) -> &[QueryParameter] {
        &self.parameters
    }
    pub(crate) fn parameters_mut(&mut self) -> &mut [QueryParameter] {
        &mut self.parameters
    }
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}
