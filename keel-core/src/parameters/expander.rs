use crate::{
    ArrayParameter, KeelError, ParameterIndexHolder, ParsedSql, QueryParameter, Result,
    PLACEHOLDER,
};

/// Rewrite `parsed` so every occurrence of a parameter bound to more than one
/// value gets one placeholder per element.
///
/// Returns `Ok(false)` leaving everything untouched when no parameter needs
/// expansion. When `allow_arrays` is false and one does, it fails with
/// [`KeelError::ArrayExpansionDisallowed`] before modifying anything.
///
/// The holder of an expanded parameter lists every element position of
/// every occurrence (`IN (:ids)` with three values becomes `[1, 2, 3]`),
/// while the other parameters are shifted by the placeholders inserted
/// before them.
pub fn expand_array_parameters(parsed: &mut ParsedSql, allow_arrays: bool) -> Result<bool> {
    let arrays = sorted_array_parameters(parsed.parameters(), allow_arrays)?;
    if arrays.is_empty() {
        return Ok(false);
    }
    let before = parsed.placeholder_count();
    for parameter in parsed.parameters_mut() {
        let count = parameter
            .binder
            .as_ref()
            .map(|b| b.element_count())
            .unwrap_or(1);
        let indices = parameter
            .holder
            .iter()
            .flat_map(|p| {
                let start = shifted_index(p, &arrays);
                start..(start + count)
            })
            .collect();
        if let Some(holder) = ParameterIndexHolder::from_indices(indices) {
            parameter.holder = holder;
        }
    }
    parsed.sql = rewrite_sql(&parsed.sql, &arrays);
    let added = arrays.iter().map(|a| a.count - 1).sum::<usize>();
    parsed.set_placeholder_count(before + added);
    log::debug!(
        "Expanded {} array parameter occurrence(s), placeholders {} -> {}",
        arrays.len(),
        before,
        before + added,
    );
    Ok(true)
}

/// Every occurrence of a parameter bound to more than one value, ascending by position.
pub fn sorted_array_parameters(
    parameters: &[QueryParameter],
    allow_arrays: bool,
) -> Result<Vec<ArrayParameter>> {
    let mut result = Vec::new();
    for parameter in parameters.iter().filter(|p| p.is_expanding()) {
        if !allow_arrays {
            return Err(KeelError::ArrayExpansionDisallowed.into());
        }
        let count = parameter
            .binder
            .as_ref()
            .map(|b| b.element_count())
            .unwrap_or(1);
        result.extend(
            parameter
                .holder
                .iter()
                .map(|position| ArrayParameter { position, count }),
        );
    }
    result.sort();
    Ok(result)
}

/// Final position of the placeholder originally at `index`.
pub fn shifted_index(index: usize, sorted: &[ArrayParameter]) -> usize {
    index
        + sorted
            .iter()
            .take_while(|a| a.position < index)
            .map(|a| a.count - 1)
            .sum::<usize>()
}

/// Replace the placeholder at each array position with `count` comma separated ones.
pub fn rewrite_sql(sql: &str, sorted: &[ArrayParameter]) -> String {
    let added = sorted.iter().map(|a| (a.count - 1) * 2).sum::<usize>();
    let mut out = String::with_capacity(sql.len() + added);
    let mut pending = sorted.iter().peekable();
    let mut current = 0;
    for c in sql.chars() {
        if c != PLACEHOLDER {
            out.push(c);
            continue;
        }
        current += 1;
        match pending.peek() {
            Some(array) if array.position == current => {
                out.push(PLACEHOLDER);
                for _ in 1..array.count {
                    out.push(',');
                    out.push(PLACEHOLDER);
                }
                pending.next();
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParameterBinder;

    fn bind(parsed: &mut ParsedSql, name: &str, binder: ParameterBinder) {
        parsed
            .parameter_mut(name)
            .expect("parameter in query")
            .binder = Some(binder);
    }

    #[test]
    fn expands_in_list() {
        let mut parsed = ParsedSql::parse("id IN (:ids) AND name=:name");
        bind(&mut parsed, "ids", ParameterBinder::array([1, 2, 3]));
        bind(&mut parsed, "name", ParameterBinder::single("x".to_string()));
        assert!(expand_array_parameters(&mut parsed, true).unwrap());
        assert_eq!(parsed.sql, "id IN (?,?,?) AND name=?");
        assert_eq!(
            parsed.indices("ids"),
            Some(&ParameterIndexHolder::Multi(vec![1, 2, 3]))
        );
        assert_eq!(parsed.indices("name"), Some(&ParameterIndexHolder::Single(4)));
        assert_eq!(parsed.placeholder_count(), 4);
    }

    #[test]
    fn disallowed_leaves_input_untouched() {
        let mut parsed = ParsedSql::parse("id IN (:ids) AND name=:name");
        bind(&mut parsed, "ids", ParameterBinder::array([1, 2, 3]));
        let before = parsed.clone();
        let error = expand_array_parameters(&mut parsed, false).unwrap_err();
        assert_eq!(
            error.downcast_ref::<KeelError>(),
            Some(&KeelError::ArrayExpansionDisallowed)
        );
        assert_eq!(parsed, before);
    }

    #[test]
    fn no_arrays_is_a_no_op() {
        let mut parsed = ParsedSql::parse("a = :a AND b IN (:b)");
        bind(&mut parsed, "b", ParameterBinder::array([7]));
        let before = parsed.clone();
        assert!(!expand_array_parameters(&mut parsed, false).unwrap());
        assert_eq!(parsed, before);
    }

    #[test]
    fn reused_array_and_positional() {
        let mut parsed = ParsedSql::parse("a IN (:ids) AND b = ? AND c IN (:ids) AND d = :d");
        bind(&mut parsed, "ids", ParameterBinder::array(["x", "y", "z"].map(String::from)));
        assert!(expand_array_parameters(&mut parsed, true).unwrap());
        assert_eq!(parsed.sql, "a IN (?,?,?) AND b = ? AND c IN (?,?,?) AND d = ?");
        assert_eq!(
            parsed.indices("ids"),
            Some(&ParameterIndexHolder::Multi(vec![1, 2, 3, 5, 6, 7]))
        );
        assert_eq!(parsed.indices("d"), Some(&ParameterIndexHolder::Single(8)));
        assert_eq!(parsed.placeholder_count(), 8);
    }

    #[test]
    fn two_arrays() {
        let mut parsed = ParsedSql::parse("x = :x AND a IN (:a) AND y = :y AND b IN (:b) AND z = :x");
        bind(&mut parsed, "a", ParameterBinder::array([1, 2]));
        bind(&mut parsed, "b", ParameterBinder::array([1, 2, 3, 4]));
        assert!(expand_array_parameters(&mut parsed, true).unwrap());
        assert_eq!(
            parsed.sql,
            "x = ? AND a IN (?,?) AND y = ? AND b IN (?,?,?,?) AND z = ?"
        );
        assert_eq!(
            parsed.indices("x"),
            Some(&ParameterIndexHolder::Multi(vec![1, 9]))
        );
        assert_eq!(
            parsed.indices("a"),
            Some(&ParameterIndexHolder::Multi(vec![2, 3]))
        );
        assert_eq!(parsed.indices("y"), Some(&ParameterIndexHolder::Single(4)));
        assert_eq!(
            parsed.indices("b"),
            Some(&ParameterIndexHolder::Multi(vec![5, 6, 7, 8]))
        );
        assert_eq!(parsed.placeholder_count(), 9);
        assert_eq!(parsed.sql.matches('?').count(), 9);
    }

    #[test]
    fn shifted() {
        let arrays = [
            ArrayParameter {
                position: 2,
                count: 3,
            },
            ArrayParameter {
                position: 4,
                count: 2,
            },
        ];
        assert_eq!(shifted_index(1, &arrays), 1);
        assert_eq!(shifted_index(2, &arrays), 2);
        assert_eq!(shifted_index(3, &arrays), 5);
        assert_eq!(shifted_index(4, &arrays), 6);
        assert_eq!(shifted_index(5, &arrays), 8);
    }
}
