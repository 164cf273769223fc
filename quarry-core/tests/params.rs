#[cfg(test)]
mod tests {
    use quarry_core::{
        Dialect, DialectKind, Error, Params, Value, expand_arrays, expand_arrays_with, params,
        placeholders, rewrite_placeholders, to_positional,
    };

    fn names(sql: &str) -> Vec<&str> {
        placeholders(sql).into_iter().map(|v| v.name).collect()
    }

    #[test]
    fn params_are_ordered_and_unprefixed() {
        let mut params = params! { ":b" => 2, "a" => "x" };
        assert_eq!(params.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(params.get(":b"), Some(&Value::Int32(Some(2))));
        assert_eq!(params.get("a"), Some(&Value::Varchar(Some("x".into()))));
        assert_eq!(params.insert("b", 3i64), Some(Value::Int32(Some(2))));
        assert_eq!(params.names().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(params.remove(":a"), Some(Value::Varchar(Some("x".into()))));
        assert_eq!(params.len(), 1);
        assert!(params! {}.is_empty());
    }

    #[test]
    fn scanner_finds_whole_identifiers() {
        assert_eq!(
            names("SELECT * FROM t WHERE id = :id AND ids IN :ids OR x = :_x1"),
            ["id", "ids", "_x1"]
        );
        let found = placeholders("a = :name;");
        assert_eq!(found[0].range, 4..9);
    }

    #[test]
    fn scanner_skips_literals_comments_and_casts() {
        let sql = "SELECT ':nope', \"a:b\", `c:d`, 'it''s :no' -- :comment\n\
                   , x::text /* :block */, :yes, arr[1:2]";
        assert_eq!(names(sql), ["yes"]);
    }

    #[test]
    fn expand_array() {
        let params = params! { "id" => 7, "ids" => vec![1, 2, 3] };
        let (sql, expanded) = expand_arrays("SELECT 1 WHERE id = :id OR id IN :ids", &params)
            .unwrap()
            .expect("Should expand");
        assert_eq!(sql, "SELECT 1 WHERE id = :id OR id IN (:ids0, :ids1, :ids2)");
        assert!(!expanded.contains("ids"));
        assert_eq!(expanded.get("id"), Some(&Value::Int32(Some(7))));
        assert_eq!(expanded.get("ids0"), Some(&Value::Int32(Some(1))));
        assert_eq!(expanded.get("ids1"), Some(&Value::Int32(Some(2))));
        assert_eq!(expanded.get("ids2"), Some(&Value::Int32(Some(3))));
        assert_eq!(expanded.len(), 4);
    }

    #[test]
    fn expand_array_does_not_touch_prefix_names() {
        let params = params! { "id" => vec![5, 6], "ids" => 1 };
        let (sql, _) = expand_arrays("WHERE a IN :id AND b = :ids AND c = ':id'", &params)
            .unwrap()
            .expect("Should expand");
        assert_eq!(sql, "WHERE a IN (:id0, :id1) AND b = :ids AND c = ':id'");
    }

    #[test]
    fn expand_empty_array() {
        let params = params! { "ids" => Vec::<i64>::new() };
        let (sql, expanded) = expand_arrays("WHERE id IN :ids", &params)
            .unwrap()
            .expect("Should expand");
        assert_eq!(sql, "WHERE id IN (SELECT NULL WHERE 1 = 0)");
        assert!(expanded.is_empty());
    }

    #[test]
    fn empty_array_per_dialect() {
        let params = params! { "ids" => Vec::<i64>::new(), "names" => Vec::<String>::new() };
        let expand = |kind: DialectKind| {
            let dialect = Dialect::new(kind);
            expand_arrays_with("a IN :ids AND b IN :names", &params, |out, element| {
                dialect.write_empty_list(out, element)
            })
            .unwrap()
            .expect("Should expand")
            .0
        };
        assert_eq!(
            expand(DialectKind::Sqlite),
            "a IN (SELECT NULL WHERE 1 = 0) AND b IN (SELECT NULL WHERE 1 = 0)"
        );
        assert_eq!(
            expand(DialectKind::MySql),
            "a IN (SELECT NULL FROM DUAL WHERE 1 = 0) AND b IN (SELECT NULL FROM DUAL WHERE 1 = 0)"
        );
        assert_eq!(
            expand(DialectKind::Postgres),
            "a IN (SELECT CAST(NULL AS BIGINT) WHERE 1 = 0) AND b IN (SELECT CAST(NULL AS TEXT) WHERE 1 = 0)"
        );
    }

    #[test]
    fn dollar_quoted_bodies_are_skipped() {
        let sql = "SELECT $$ :a $$, $body$ it's :b $body$, $1, :c";
        assert_eq!(names(sql), ["c"]);
    }

    #[test]
    fn nothing_to_expand() {
        let params = params! { "id" => 1 };
        assert!(expand_arrays("WHERE id = :id", &params).unwrap().is_none());
    }

    #[test]
    fn expansion_clash_is_an_error() {
        let params = params! { "ids" => vec![1, 2], "ids1" => 10 };
        assert!(matches!(
            expand_arrays("WHERE id IN :ids OR id = :ids1", &params),
            Err(Error::Parameter(..))
        ));
    }

    #[test]
    fn positional_rewrite() {
        let sql = "UPDATE t SET a = :a WHERE k = :k; INSERT SELECT :k, :a WHERE x::int = :k";
        let (numbered, names) = to_positional(sql, true, |out, i| out.push_str(&format!("${}", i)));
        assert_eq!(
            numbered,
            "UPDATE t SET a = $1 WHERE k = $2; INSERT SELECT $2, $1 WHERE x::int = $2"
        );
        assert_eq!(names, ["a", "k"]);
        let (marks, names) = to_positional(sql, false, |out, _| out.push('?'));
        assert_eq!(
            marks,
            "UPDATE t SET a = ? WHERE k = ?; INSERT SELECT ?, ? WHERE x::int = ?"
        );
        assert_eq!(names, ["a", "k", "k", "a", "k"]);
    }

    #[test]
    fn rewrite_keeps_text_around() {
        let result = rewrite_placeholders("a :x b", |out, name| {
            out.push_str(&name.to_uppercase());
            Ok(())
        })
        .unwrap();
        assert_eq!(result, "a X b");
    }

    #[test]
    fn collect_params() {
        let params: Params = [("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(
            params.into_iter().map(|(n, _)| n).collect::<Vec<_>>(),
            ["a", "b"]
        );
    }
}
