//! Small tokenizers for the nested payload grammar.
//!
//! Every nesting level splits with one delimiter and exposes positional
//! access that never panics: a missing field reads as `None`.

use crate::config::delimiters::RECORD;

/// Positional view over one delimited level of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields<'a> {
    parts: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn split(text: &'a str, delimiter: &str) -> Self {
        Self {
            parts: text.split(delimiter).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.parts.get(index).copied()
    }

    /// Field text, or `""` when absent.
    pub fn text(&self, index: usize) -> &'a str {
        self.get(index).unwrap_or("")
    }

    /// Integer field; absent or non-numeric reads as `None`.
    pub fn int(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(|v| v.trim().parse().ok())
    }

    pub fn int_or_zero(&self, index: usize) -> i64 {
        self.int(index).unwrap_or(0)
    }

    pub fn float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.trim().parse().ok())
    }

    /// Fields from `start` on, re-joined with `delimiter`.
    pub fn join_from(&self, start: usize, delimiter: &str) -> String {
        self.parts
            .get(start..)
            .map(|rest| rest.join(delimiter))
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.parts.iter().copied()
    }
}

/// Split a double-space separated record list, trimming records and skipping empty ones.
pub fn split_records(value: &str) -> Vec<&str> {
    if value.trim().is_empty() {
        return Vec::new();
    }

    value
        .split(RECORD)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .collect()
}

/// Split `name(qty)` into name and quantity; quantity defaults to 1.
pub fn split_quantity(record: &str) -> (&str, i64) {
    if let (Some(open), Some(close)) = (record.rfind('('), record.rfind(')'))
        && open > 0
        && close > open
        && let Ok(qty) = record[open + 1..close].parse::<i64>()
    {
        return (&record[..open], qty);
    }
    (record, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_access() {
        let fields = Fields::split("1&Hero&120&&55", "&");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields.text(1), "Hero");
        assert_eq!(fields.int(2), Some(120));
        assert_eq!(fields.int(3), None);
        assert_eq!(fields.int_or_zero(3), 0);
        assert_eq!(fields.get(9), None);
        assert_eq!(fields.text(9), "");
    }

    #[test]
    fn test_multi_char_delimiter() {
        let fields = Fields::split("a[$]b[$][$]d", "[$]");
        assert_eq!(fields.iter().collect::<Vec<_>>(), vec!["a", "b", "", "d"]);
    }

    #[test]
    fn test_join_from() {
        let fields = Fields::split("code,5,x,y,Blue,Orb", ",");
        assert_eq!(fields.join_from(4, ","), "Blue,Orb");
        assert_eq!(fields.join_from(10, ","), "");
    }

    #[test]
    fn test_float_field() {
        let fields = Fields::split("a,b,c,1234.5", ",");
        assert_eq!(fields.float(3), Some(1234.5));
        assert_eq!(fields.float(0), None);
    }

    #[test]
    fn test_split_records() {
        assert_eq!(
            split_records(" Potion(3)  Bone   Rope  "),
            vec!["Potion(3)", "Bone", "Rope"]
        );
        assert!(split_records("   ").is_empty());
        assert!(split_records("").is_empty());
    }

    #[test]
    fn test_split_quantity() {
        assert_eq!(split_quantity("Potion(3)"), ("Potion", 3));
        assert_eq!(split_quantity("Bone"), ("Bone", 1));
        assert_eq!(split_quantity("Odd(x)"), ("Odd(x)", 1));
        assert_eq!(split_quantity("(4)"), ("(4)", 1));
        assert_eq!(split_quantity("Ring (old)(2)"), ("Ring (old)", 2));
    }
}
