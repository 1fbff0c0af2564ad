#[cfg(test)]
mod tests {
    use indoc::indoc;
    use keel::{
        KeelError, NamedQuery, ParameterBinder, ParameterIndexHolder, ParsedSql, Prepared, Result,
        Value, expand_array_parameters,
    };
    use std::fmt::{self, Display};
    use time::macros::date;

    #[derive(Default)]
    struct Statement {
        bound: Vec<(u64, Value)>,
    }

    impl Display for Statement {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Statement with {} bound values", self.bound.len())
        }
    }

    impl Prepared for Statement {
        fn clear_bindings(&mut self) -> Result<&mut Self> {
            self.bound.clear();
            Ok(self)
        }
        fn bind_index(&mut self, value: Value, index: u64) -> Result<&mut Self> {
            self.bound.push((index, value));
            Ok(self)
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn repeated_names() {
        let parsed = ParsedSql::parse("a=:x AND b=:x AND c=:y");
        assert_eq!(parsed.sql, "a=? AND b=? AND c=?");
        assert_eq!(parsed.placeholder_count(), 3);
        assert_eq!(
            parsed.indices("x"),
            Some(&ParameterIndexHolder::Multi(vec![1, 2]))
        );
        assert_eq!(parsed.indices("y"), Some(&ParameterIndexHolder::Single(3)));
        assert_eq!(parsed.parameter_names().collect::<Vec<_>>(), ["x", "y"]);
    }

    #[test]
    fn existing_placeholders_count() {
        let parsed = ParsedSql::parse("a = ? AND b = :b AND c = ? AND d = :d::text");
        assert_eq!(parsed.sql, "a = ? AND b = ? AND c = ? AND d = ?::text");
        assert_eq!(parsed.placeholder_count(), 4);
        assert_eq!(parsed.indices("b"), Some(&ParameterIndexHolder::Single(2)));
        assert_eq!(parsed.indices("d"), Some(&ParameterIndexHolder::Single(4)));
        assert_eq!(parsed.indices("text"), None);
    }

    #[test]
    fn array_expansion() {
        init_logs();
        let mut parsed = ParsedSql::parse("id IN (:ids) AND name=:name");
        parsed.parameter_mut("ids").unwrap().binder = Some(ParameterBinder::array([7, 8, 9]));
        parsed.parameter_mut("name").unwrap().binder =
            Some(ParameterBinder::single("ada".to_string()));
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
    fn array_expansion_disallowed() {
        let mut parsed = ParsedSql::parse("id IN (:ids) AND name=:name");
        parsed.parameter_mut("ids").unwrap().binder = Some(ParameterBinder::array([7, 8, 9]));
        let original = parsed.clone();
        let error = expand_array_parameters(&mut parsed, false).unwrap_err();
        assert_eq!(
            error.downcast_ref::<KeelError>(),
            Some(&KeelError::ArrayExpansionDisallowed)
        );
        assert_eq!(parsed, original);

        let mut query = NamedQuery::new("id IN (:ids) AND name=:name");
        query
            .set_batch_mode(true)
            .add_array_parameter("ids", [7, 8, 9])
            .unwrap();
        assert!(query.build().is_err());
        assert_eq!(query.parsed().sql, "id IN (?) AND name=?");
    }

    #[test]
    fn bind_report_query() {
        init_logs();
        let mut query = NamedQuery::new(indoc! {"
            SELECT o.id, o.total
            FROM orders o
            WHERE o.customer IN (:customers)
              AND o.placed >= :since
              AND o.status IN (:statuses)
              AND o.customer <> :excluded
            ORDER BY o.placed
        "});
        query
            .add_array_parameter("customers", [3i64, 5, 8])
            .unwrap()
            .add_parameter("since", date!(2025 - 01 - 01))
            .unwrap()
            .add_array_parameter("statuses", ["open".to_string(), "paid".to_string()])
            .unwrap()
            .add_parameter("excluded", 5i64)
            .unwrap();
        let mut statement = Statement::default();
        let expanded = query.bind(&mut statement).unwrap();
        assert_eq!(
            expanded.sql,
            indoc! {"
                SELECT o.id, o.total
                FROM orders o
                WHERE o.customer IN (?,?,?)
                  AND o.placed >= ?
                  AND o.status IN (?,?)
                  AND o.customer <> ?
                ORDER BY o.placed
            "}
        );
        statement.bound.sort_by_key(|(i, _)| *i);
        assert_eq!(
            statement.bound,
            [
                (1, Value::Int64(Some(3))),
                (2, Value::Int64(Some(5))),
                (3, Value::Int64(Some(8))),
                (4, Value::Date(Some(date!(2025 - 01 - 01)))),
                (5, Value::Varchar(Some("open".into()))),
                (6, Value::Varchar(Some("paid".into()))),
                (7, Value::Int64(Some(5))),
            ]
        );

        // Reusable with a different shape
        statement.clear_bindings().unwrap();
        query.add_array_parameter("customers", [1i64]).unwrap();
        let expanded = query.bind(&mut statement).unwrap();
        assert!(expanded.sql.contains("o.customer IN (?)\n"));
        assert_eq!(statement.bound.len(), 5);
    }

    #[test]
    fn reused_array() {
        let mut query = NamedQuery::new("a IN (:ids) OR b IN (:ids) OR c = :c");
        query
            .add_array_parameter("ids", [1, 2])
            .unwrap()
            .add_parameter("c", 0)
            .unwrap();
        let mut statement = Statement::default();
        let expanded = query.bind(&mut statement).unwrap();
        assert_eq!(expanded.sql, "a IN (?,?) OR b IN (?,?) OR c = ?");
        statement.bound.sort_by_key(|(i, _)| *i);
        assert_eq!(
            statement.bound,
            [
                (1, Value::Int32(Some(1))),
                (2, Value::Int32(Some(2))),
                (3, Value::Int32(Some(1))),
                (4, Value::Int32(Some(2))),
                (5, Value::Int32(Some(0))),
            ]
        );
    }
}
