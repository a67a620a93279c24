use super::*;

fn text(s: &str) -> Value {
    Value::from(s)
}

// ── Identifier wrapping ──

#[test]
fn test_wrap_table_plain_and_prefixed() {
    let plain = GenericGrammar::new();
    assert_eq!(plain.wrap_table(&text("users")), r#""users""#);

    let prefixed = GenericGrammar::new().with_table_prefix("p_");
    assert_eq!(prefixed.wrap_table(&text("users")), r#""p_users""#);
    assert_eq!(
        prefixed.wrap_table(&text("users as u")),
        r#""p_users" as "u""#
    );
    assert_eq!(
        prefixed.wrap_table(&text("users   AS   u")),
        r#""p_users" as "u""#
    );
}

#[test]
fn test_wrap_table_raw_is_verbatim() {
    let grammar = GenericGrammar::new().with_table_prefix("p_");
    assert_eq!(
        grammar.wrap_table(&Value::raw("(select 1) as t")),
        "(select 1) as t"
    );
}

#[test]
fn test_wrap_qualified_column_prefixes_table_segment() {
    let grammar = GenericGrammar::new().with_table_prefix("p_");
    assert_eq!(grammar.wrap(&text("users.id"), false), r#""p_users"."id""#);
    // A bare column has no table segment to prefix.
    assert_eq!(grammar.wrap(&text("id"), false), r#""id""#);
}

#[test]
fn test_wrap_column_skips_prefix_for_aliases() {
    let grammar = GenericGrammar::new().with_table_prefix("p_");
    let aliases = vec!["u".to_string()];
    assert_eq!(grammar.wrap_column(&text("u.id"), &aliases), r#""u"."id""#);
    assert_eq!(
        grammar.wrap_column(&text("posts.id"), &aliases),
        r#""p_posts"."id""#
    );
    assert_eq!(
        grammar.wrap_column(&text("u.name as author"), &aliases),
        r#""u"."name" as "author""#
    );
    assert_eq!(grammar.wrap_column(&Value::raw("now()"), &aliases), "now()");
}

#[test]
fn test_wrap_column_alias() {
    let grammar = GenericGrammar::new();
    assert_eq!(grammar.wrap(&text("name AS n"), false), r#""name" as "n""#);
    assert_eq!(
        grammar.wrap(&text("users.name as author"), false),
        r#""users"."name" as "author""#
    );
}

#[test]
fn test_wrap_star() {
    let grammar = GenericGrammar::new();
    assert_eq!(grammar.wrap(&text("*"), false), "*");
    assert_eq!(grammar.wrap(&text("users.*"), false), r#""users".*"#);
}

#[test]
fn test_wrap_value_doubles_closing_quote() {
    let ansi = GenericGrammar::new();
    assert_eq!(ansi.wrap_value(r#"we"ird"#), r#""we""ird""#);

    let brackets = GenericGrammar::new().with_quote(IdentifierQuote::BRACKET);
    assert_eq!(brackets.wrap_value("a]b"), "[a]]b]");
    assert_eq!(brackets.wrap(&text("users.id"), false), "[users].[id]");

    let mysql = MySqlGrammar::new();
    assert_eq!(mysql.wrap_value("a`b"), "`a``b`");
}

#[test]
fn test_mysql_uses_backticks() {
    let grammar = MySqlGrammar::new().with_table_prefix("wp_");
    assert_eq!(grammar.wrap_table(&text("posts as p")), "`wp_posts` as `p`");
    assert_eq!(grammar.wrap(&text("posts.title"), false), "`wp_posts`.`title`");
}

#[test]
fn test_columnize_and_parameterize() {
    let grammar = GenericGrammar::new();
    let columns = [text("id"), text("users.name"), Value::raw("count(*) as c")];
    assert_eq!(
        grammar.columnize(&columns),
        r#""id", "users"."name", count(*) as c"#
    );
    let values = [Value::from(1), Value::raw("now()"), Value::Null];
    assert_eq!(grammar.parameterize(&values), "?, now(), ?");
    assert!(grammar.is_expression(&Value::raw("x")));
    assert!(!grammar.is_expression(&text("x")));
    assert_eq!(grammar.get_value(&Value::raw("now()")), "now()");
}

#[test]
fn test_split_alias() {
    assert_eq!(split_alias("users as u"), Some(("users", "u")));
    assert_eq!(split_alias("users AS u"), Some(("users", "u")));
    assert_eq!(split_alias("classes"), None);
    assert_eq!(split_alias("alias"), None);
}

// ── Dialect hooks ──

#[test]
fn test_date_based_per_dialect() {
    let column = r#""created_at""#;
    assert_eq!(
        GenericGrammar::new().date_based(DatePart::Year, column, "=", "?"),
        r#"year("created_at") = ?"#
    );
    assert_eq!(
        PostgresGrammar::new().date_based(DatePart::Date, column, "=", "?"),
        r#""created_at"::date = ?"#
    );
    assert_eq!(
        PostgresGrammar::new().date_based(DatePart::Month, column, ">", "?"),
        r#"extract(month from "created_at") > ?"#
    );
    assert_eq!(
        SqliteGrammar::new().date_based(DatePart::Day, column, "<=", "?"),
        r#"strftime('%d', "created_at") <= cast(? as text)"#
    );
}

#[test]
fn test_lock_per_dialect() {
    assert_eq!(GenericGrammar::new().compile_lock(&Lock::Exclusive), "for update");
    assert_eq!(GenericGrammar::new().compile_lock(&Lock::Shared), "for share");
    assert_eq!(
        MySqlGrammar::new().compile_lock(&Lock::Shared),
        "lock in share mode"
    );
    assert_eq!(SqliteGrammar::new().compile_lock(&Lock::Exclusive), "");
    assert_eq!(
        PostgresGrammar::new().compile_lock(&Lock::Raw("for no key update".into())),
        "for no key update"
    );
}

#[test]
fn test_random_order() {
    assert_eq!(PostgresGrammar::new().compile_random(""), "RANDOM()");
    assert_eq!(MySqlGrammar::new().compile_random("42"), "RAND(42)");
}

#[test]
fn test_insert_get_id_suffix() {
    assert_eq!(
        PostgresGrammar::new().compile_insert_get_id_suffix(None),
        r#" returning "id""#
    );
    assert_eq!(
        GenericGrammar::new().compile_insert_get_id_suffix(Some("user_id")),
        r#" returning "user_id""#
    );
    assert_eq!(MySqlGrammar::new().compile_insert_get_id_suffix(None), "");
    assert_eq!(SqliteGrammar::new().compile_insert_get_id_suffix(None), "");
}

#[test]
fn test_truncate_per_dialect() {
    assert_eq!(
        GenericGrammar::new().compile_truncate(&text("users")),
        vec![(r#"truncate table "users""#.to_string(), vec![])]
    );
    assert_eq!(
        PostgresGrammar::new().compile_truncate(&text("users")),
        vec![(r#"truncate "users" restart identity"#.to_string(), vec![])]
    );
    assert_eq!(
        SqliteGrammar::new()
            .with_table_prefix("p_")
            .compile_truncate(&text("users")),
        vec![
            (
                "delete from sqlite_sequence where name = ?".to_string(),
                vec![text("p_users")]
            ),
            (r#"delete from "p_users""#.to_string(), vec![]),
        ]
    );
}

#[test]
fn test_savepoints_and_unions() {
    let grammar = GenericGrammar::new();
    assert_eq!(grammar.compile_savepoint("trans2"), "SAVEPOINT trans2");
    assert_eq!(
        grammar.compile_savepoint_rollback("trans2"),
        "ROLLBACK TO SAVEPOINT trans2"
    );
    assert_eq!(grammar.wrap_union("select 1"), "select 1");
    assert_eq!(MySqlGrammar::new().wrap_union("select 1"), "(select 1)");
}

// ── Dialect ──

#[test]
fn test_dialect_builds_grammar() {
    let grammar = Dialect::Sqlite.grammar("x_");
    assert_eq!(grammar.dialect(), Dialect::Sqlite);
    assert_eq!(grammar.table_prefix(), "x_");
    assert_eq!(Dialect::MySql.grammar("").quote(), IdentifierQuote::BACKTICK);
    assert_eq!(Dialect::default(), Dialect::Generic);
}

#[test]
fn test_dialect_from_str() {
    assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert_eq!("pgsql".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert_eq!(" mysql ".parse::<Dialect>().unwrap(), Dialect::MySql);
    let err = "oracle".parse::<Dialect>().unwrap_err();
    assert!(err.is_invalid_input());
}

#[test]
fn test_dialect_serde_and_display() {
    assert_eq!(serde_json::to_string(&Dialect::MySql).unwrap(), r#""mysql""#);
    let parsed: Dialect = serde_json::from_str(r#""sqlite""#).unwrap();
    assert_eq!(parsed, Dialect::Sqlite);
    assert_eq!(Dialect::Postgres.to_string(), "postgres");
}

#[test]
fn test_set_table_prefix() {
    let mut grammar = PostgresGrammar::new();
    grammar.set_table_prefix("t_");
    assert_eq!(grammar.wrap_table(&text("logs")), r#""t_logs""#);
}
