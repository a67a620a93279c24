use super::compile;
use super::*;
use crate::error::QueryError;
use crate::grammar::{Dialect, IdentifierQuote};

fn users() -> Builder {
    table(Dialect::Generic, "users")
}

fn table(dialect: Dialect, name: &str) -> Builder {
    let mut q = Builder::new(dialect.grammar(""));
    q.from(name);
    q
}

fn v(value: impl Into<Value>) -> Value {
    value.into()
}

// ── Select basics ──

#[test]
fn test_select_basic() {
    let mut q = users();
    q.select(["*"])
        .where_("id", ">", 5)
        .unwrap()
        .order_by("id", "desc")
        .limit(10);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "id" > ? order by "id" desc limit 10"#
    );
    assert_eq!(q.get_bindings(), vec![v(5)]);
}

#[test]
fn test_select_columns_and_distinct() {
    let mut q = users();
    q.select(["id", "users.name as author"]).add_select(["email"]).distinct();
    assert_eq!(
        q.to_sql(),
        r#"select distinct "id", "users"."name" as "author", "email" from "users""#
    );
}

#[test]
fn test_to_sql_is_repeatable() {
    let mut q = users();
    q.where_("a", "=", 1).unwrap().where_in("b", [2, 3]);
    assert_eq!(q.to_sql(), q.to_sql());
    assert_eq!(q.get_bindings(), vec![v(1), v(2), v(3)]);
    assert_eq!(q.get_bindings(), q.get_bindings());
}

// ── Where clauses ──

#[test]
fn test_where_null_handling() {
    let mut q = users();
    q.where_eq("deleted_at", Value::Null)
        .where_("banned_at", "!=", Value::Null)
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "deleted_at" is null and "banned_at" is not null"#
    );
    assert!(q.get_bindings().is_empty());
}

#[test]
fn test_illegal_null_comparison_leaves_builder_untouched() {
    let mut q = users();
    let err = q.where_("age", ">", Value::Null).unwrap_err();
    assert!(matches!(err, QueryError::IllegalNullComparison(op) if op == ">"));
    assert!(q.wheres().is_empty());
    assert!(q.get_bindings().is_empty());
}

#[test]
fn test_invalid_operator_rejected() {
    let mut q = users();
    assert!(matches!(
        q.where_("a", "=>", 1),
        Err(QueryError::InvalidOperator(_))
    ));
    assert!(matches!(
        q.where_column("a", "===", "b"),
        Err(QueryError::InvalidOperator(_))
    ));
    assert!(q.wheres().is_empty());
}

#[test]
fn test_operator_normalized() {
    let mut q = users();
    q.where_("name", "LIKE", "a%").unwrap();
    assert_eq!(q.to_sql(), r#"select * from "users" where "name" like ?"#);
}

#[test]
fn test_nested_where() {
    let mut q = users();
    q.where_("active", "=", true)
        .unwrap()
        .where_nested(|q| {
            q.where_("a", "=", 1)?.or_where("b", "=", 2)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "active" = ? and ("a" = ? or "b" = ?)"#
    );
    assert_eq!(q.get_bindings(), vec![v(true), v(1), v(2)]);
}

#[test]
fn test_empty_nested_group_adds_nothing() {
    let mut q = users();
    q.where_nested(|_| Ok(())).unwrap();
    assert!(q.wheres().is_empty());
    assert_eq!(q.to_sql(), r#"select * from "users""#);
}

#[test]
fn test_failed_nested_callback_propagates() {
    let mut q = users();
    let result = q.or_where_nested(|q| {
        q.where_("a", "=", 1)?;
        q.where_("b", "<=>>", 2)?;
        Ok(())
    });
    assert!(result.is_err());
    assert!(q.wheres().is_empty());
    assert!(q.get_bindings().is_empty());
}

#[test]
fn test_where_all_groups_pairs() {
    let mut q = users();
    q.where_all([("a", 1), ("b", 2)]).or_where_all([("c", 3)]);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where ("a" = ? and "b" = ?) or ("c" = ?)"#
    );
    assert_eq!(q.get_bindings(), vec![v(1), v(2), v(3)]);
}

#[test]
fn test_dynamic_where() {
    let mut q = users();
    q.dynamic_where("where_first_name_and_last_name_or_email", [v("ada"), v("lovelace"), v("a@b.c")])
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "first_name" = ? and "last_name" = ? or "email" = ?"#
    );
    assert_eq!(q.get_bindings(), vec![v("ada"), v("lovelace"), v("a@b.c")]);

    let mut q = users();
    q.dynamic_where("where_brand_id", [Value::Null]).unwrap();
    assert_eq!(q.to_sql(), r#"select * from "users" where "brand_id" is null"#);
}

#[test]
fn test_dynamic_where_rejects_bad_finders() {
    let mut q = users();
    for (method, count) in [
        ("find_by_name", 1),
        ("where_", 0),
        ("where_name_and", 1),
        ("where_name_and_email", 1),
    ] {
        let err = q
            .dynamic_where(method, (0..count).map(Value::from))
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)), "{method}");
    }
    assert!(q.wheres().is_empty());
    assert!(q.get_bindings().is_empty());
}

#[test]
fn test_where_in_and_not_in() {
    let mut q = users();
    q.where_in("id", [1, 2, 3]).or_where_not_in("role", ["guest"]);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "id" in (?, ?, ?) or "role" not in (?)"#
    );
    assert_eq!(q.get_bindings(), vec![v(1), v(2), v(3), v("guest")]);
}

#[test]
fn test_where_in_empty_lists() {
    let mut q = users();
    q.where_in("id", Vec::<i64>::new());
    assert_eq!(q.to_sql(), r#"select * from "users" where 0 = 1"#);
    assert!(q.get_bindings().is_empty());

    let mut q = users();
    q.where_not_in("id", Vec::<i64>::new());
    assert_eq!(q.to_sql(), r#"select * from "users" where 1 = 1"#);
}

#[test]
fn test_where_in_sub() {
    let mut q = users();
    q.where_("active", "=", 1)
        .unwrap()
        .where_in_sub("id", |s| {
            s.from("posts")
                .select(["user_id"])
                .where_("published", "=", 1)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "active" = ? and "id" in (select "user_id" from "posts" where "published" = ?)"#
    );
    assert_eq!(q.get_bindings(), vec![v(1), v(1)]);
}

#[test]
fn test_where_exists_with_column_comparison() {
    let mut q = table(Dialect::Generic, "users as u");
    q.where_exists(|s| {
        s.from("posts as p").where_column("p.user_id", "=", "u.id")?;
        Ok(())
    })
    .unwrap()
    .where_not_exists(|s| {
        s.from("bans").where_column("bans.user_id", "=", "u.id")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        q.to_sql(),
        concat!(
            r#"select * from "users" as "u" where exists (select * from "posts" as "p" where "p"."user_id" = "u"."id")"#,
            r#" and not exists (select * from "bans" where "bans"."user_id" = "u"."id")"#
        )
    );
}

#[test]
fn test_where_between() {
    let mut q = users();
    q.where_between("age", 18, 65).or_where_not_between("score", 0, 10);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "age" between ? and ? or "score" not between ? and ?"#
    );
    assert_eq!(q.get_bindings(), vec![v(18), v(65), v(0), v(10)]);
}

#[test]
fn test_where_raw_and_raw_values() {
    let mut q = users();
    q.where_raw("lower(name) = ?", [v("ada")])
        .where_("created_at", "<", Value::raw("now()"))
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where lower(name) = ? and "created_at" < now()"#
    );
    assert_eq!(q.get_bindings(), vec![v("ada")]);
}

#[test]
fn test_where_sub_comparison() {
    let mut q = users();
    q.where_sub("score", ">", |s| {
        s.from("scores").select_raw("avg(score)", []);
        Ok(())
    })
    .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "score" > (select avg(score) from "scores")"#
    );
}

#[test]
fn test_date_parts() {
    let mut q = users();
    q.where_year("created_at", "=", 2024)
        .unwrap()
        .or_where_date("updated_at", ">=", "2024-01-01")
        .unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where year("created_at") = ? or date("updated_at") >= ?"#
    );

    let mut q = table(Dialect::Postgres, "events");
    q.where_month("at", "=", 6).unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "events" where extract(month from "at") = ?"#
    );

    let mut q = table(Dialect::Sqlite, "events");
    q.where_time("at", "<", "12:00:00").unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "events" where strftime('%H:%M:%S', "at") < cast(? as text)"#
    );
}

// ── Bindings ──

#[test]
fn test_bindings_follow_clause_order() {
    let mut q = users();
    // Added out of clause order on purpose.
    q.order_by_raw("field(id, ?)", [v("o")])
        .where_("id", "=", "w")
        .unwrap()
        .having("count", ">", "h")
        .unwrap()
        .group_by(["id"])
        .select_raw("? as marker", [v("s")])
        .join_where("posts", "posts.kind", "=", "j")
        .unwrap();
    assert_eq!(
        q.to_sql(),
        concat!(
            r#"select ? as marker from "users" inner join "posts" on "posts"."kind" = ?"#,
            r#" where "id" = ? group by "id" having "count" > ? order by field(id, ?)"#
        )
    );
    assert_eq!(q.get_bindings(), vec![v("s"), v("j"), v("w"), v("h"), v("o")]);
    assert_eq!(
        compile::count_placeholders(&q.to_sql(), q.grammar().quote()),
        q.get_bindings().len()
    );
}

#[test]
fn test_set_and_add_bindings() {
    let mut q = users();
    q.where_raw("a = ? and b = ?", [v(1), v(2)]);
    q.set_bindings(vec![v(7), Value::raw("x"), v(8)], BindingKind::Where);
    assert_eq!(q.get_bindings(), vec![v(7), v(8)]);

    q.add_binding(9, BindingKind::Select)
        .add_bindings([v(10)], BindingKind::Order);
    assert_eq!(q.get_bindings(), vec![v(9), v(7), v(8), v(10)]);
    assert_eq!(q.get_raw_bindings().get(BindingKind::Select), &[v(9)]);

    let mut other = users();
    other.where_("c", "=", 11).unwrap();
    q.merge_bindings(&other);
    assert_eq!(q.get_raw_bindings().get(BindingKind::Where), &[v(7), v(8), v(11)]);
}

#[test]
fn test_select_replaces_select_bindings() {
    let mut q = users();
    q.select_raw("? as a", [v(1)]);
    q.select(["id"]);
    assert!(q.get_bindings().is_empty());
    assert_eq!(q.to_sql(), r#"select "id" from "users""#);
}

// ── Joins ──

#[test]
fn test_join() {
    let mut q = users();
    q.join("contacts", "users.id", "=", "contacts.user_id").unwrap();
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" inner join "contacts" on "users"."id" = "contacts"."user_id""#
    );
}

#[test]
fn test_join_with_clause() {
    let mut q = users();
    q.left_join_with("contacts", |j| {
        j.on("users.id", "=", "contacts.user_id")?
            .where_("contacts.kind", "=", "email")?
            .where_nested(|j| {
                j.on("contacts.a", "=", "users.a")?
                    .or_on("contacts.b", "=", "users.b")?;
                Ok(())
            })?;
        Ok(())
    })
    .unwrap()
    .where_("users.id", "=", 3)
    .unwrap();
    assert_eq!(
        q.to_sql(),
        concat!(
            r#"select * from "users" left join "contacts" on "users"."id" = "contacts"."user_id""#,
            r#" and "contacts"."kind" = ? and ("contacts"."a" = "users"."a" or "contacts"."b" = "users"."b")"#,
            r#" where "users"."id" = ?"#
        )
    );
    assert_eq!(q.get_bindings(), vec![v("email"), v(3)]);
    assert_eq!(q.joins()[0].kind(), JoinKind::Left);
}

#[test]
fn test_right_and_cross_join() {
    let mut q = users();
    q.right_join("teams", "teams.id", "=", "users.team_id")
        .unwrap()
        .cross_join("roles");
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" right join "teams" on "teams"."id" = "users"."team_id" cross join "roles""#
    );
}

#[test]
fn test_invalid_join_operator() {
    let mut q = users();
    assert!(q.join("t", "a", "=>", "b").is_err());
    assert!(q.joins().is_empty());
}

#[test]
fn test_prefix_skips_aliases() {
    let mut q = Builder::new(Dialect::Generic.grammar("app_"));
    q.from("users as u")
        .select(["u.id", "p.title"])
        .join("posts as p", "p.user_id", "=", "u.id")
        .unwrap()
        .where_exists(|s| {
            s.from("bans as b").where_column("b.user_id", "=", "u.id")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(
        q.to_sql(),
        concat!(
            r#"select "u"."id", "p"."title" from "app_users" as "u""#,
            r#" inner join "app_posts" as "p" on "p"."user_id" = "u"."id""#,
            r#" where exists (select * from "app_bans" as "b" where "b"."user_id" = "u"."id")"#
        )
    );

    let mut q = Builder::new(Dialect::Generic.grammar("app_"));
    q.from("users").select(["users.id"]);
    assert_eq!(q.to_sql(), r#"select "app_users"."id" from "app_users""#);
}

// ── Grouping, ordering, paging ──

#[test]
fn test_group_by_and_having() {
    let mut q = users();
    q.select(["role"])
        .select_raw("count(*) as total", [])
        .group_by(["role"])
        .having("total", ">", 5)
        .unwrap()
        .or_having_raw("sum(score) < ?", [v(100)]);
    assert_eq!(
        q.to_sql(),
        r#"select "role", count(*) as total from "users" group by "role" having "total" > ? or sum(score) < ?"#
    );
    assert_eq!(q.get_bindings(), vec![v(5), v(100)]);
}

#[test]
fn test_ordering_helpers() {
    let mut q = users();
    q.latest("created_at").oldest("id").order_by_desc("name");
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" order by "created_at" desc, "id" asc, "name" desc"#
    );
}

#[test]
fn test_random_order_per_dialect() {
    let mut q = table(Dialect::Postgres, "users");
    q.in_random_order("");
    assert_eq!(q.to_sql(), r#"select * from "users" order by RANDOM()"#);

    let mut q = table(Dialect::MySql, "users");
    q.in_random_order("3");
    assert_eq!(q.to_sql(), "select * from `users` order by RAND(3)");
}

#[test]
fn test_limit_offset() {
    let mut q = users();
    q.take(10).skip(5);
    assert_eq!(q.to_sql(), r#"select * from "users" limit 10 offset 5"#);
    q.limit(-1).offset(-3);
    assert_eq!(q.get_limit(), None);
    assert_eq!(q.get_offset(), None);
    assert_eq!(q.to_sql(), r#"select * from "users""#);
}

#[test]
fn test_for_page() {
    let mut q = users();
    q.for_page(3, 10);
    assert_eq!(q.to_sql(), r#"select * from "users" limit 10 offset 20"#);
    q.for_page(1, 10);
    assert_eq!(q.to_sql(), r#"select * from "users" limit 10 offset 0"#);
}

#[test]
fn test_for_page_after_id() {
    let mut q = users();
    q.order_by("name", "asc")
        .order_by("id", "asc")
        .for_page_after_id(15, 30, "id");
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "id" > ? order by "name" asc, "id" desc limit 15"#
    );
    assert_eq!(q.get_bindings(), vec![v(30)]);

    let mut either = users();
    either
        .where_eq("role", "admin")
        .or_where_eq("role", "owner")
        .for_page_after_id(15, 30, "id");
    assert_eq!(
        either.to_sql(),
        r#"select * from "users" where ("role" = ? or "role" = ?) and "id" > ? order by "id" desc limit 15"#
    );
    assert_eq!(either.get_bindings(), vec![v("admin"), v("owner"), v(30)]);

    let mut first_page = users();
    first_page.for_page_after_id(15, Value::Null, "id");
    assert_eq!(
        first_page.to_sql(),
        r#"select * from "users" order by "id" desc limit 15"#
    );
}

// ── Unions and locks ──

#[test]
fn test_union_with_outer_order_and_limit() {
    let mut first = users();
    first.where_("id", "=", 1).unwrap();
    let mut second = users();
    second.where_("id", "=", 2).unwrap();
    first.union(second).order_by("id", "desc").limit(5);
    assert_eq!(
        first.to_sql(),
        r#"select * from "users" where "id" = ? union select * from "users" where "id" = ? order by "id" desc limit 5"#
    );
    assert_eq!(first.get_bindings(), vec![v(1), v(2)]);
    assert!(first.orders().is_empty());
    assert_eq!(first.union_orders().len(), 1);
    assert_eq!(first.get_limit(), None);
}

#[test]
fn test_union_all_mysql_parenthesized() {
    let mut q = table(Dialect::MySql, "users");
    q.where_("id", "=", 1).unwrap();
    q.union_with(
        |s| {
            s.from("users").where_("id", "=", 2)?;
            Ok(())
        },
        true,
    )
    .unwrap();
    assert_eq!(
        q.to_sql(),
        "(select * from `users` where `id` = ?) union all (select * from `users` where `id` = ?)"
    );
}

#[test]
fn test_lock_per_dialect() {
    let mut q = users();
    q.lock_for_update();
    assert_eq!(q.to_sql(), r#"select * from "users" for update"#);

    let mut q = table(Dialect::MySql, "users");
    q.shared_lock();
    assert_eq!(q.to_sql(), "select * from `users` lock in share mode");

    let mut q = table(Dialect::Sqlite, "users");
    q.lock_for_update();
    assert_eq!(q.to_sql(), r#"select * from "users""#);
    assert_eq!(q.get_lock(), Some(&Lock::Exclusive));
}

// ── Sub-selects, cloning, conditional chaining ──

#[test]
fn test_select_sub() {
    let mut sub = table(Dialect::Generic, "posts");
    sub.select_raw("count(*)", [])
        .where_("published", "=", 1)
        .unwrap();
    let mut q = users();
    q.where_("active", "=", 1).unwrap();
    q.select(["id"]).select_sub(sub, "post_count");
    assert_eq!(
        q.to_sql(),
        r#"select "id", (select count(*) from "posts" where "published" = ?) as "post_count" from "users" where "active" = ?"#
    );
    assert_eq!(q.get_bindings(), vec![v(1), v(1)]);
}

#[test]
fn test_select_sub_sees_outer_aliases() {
    let mut q = Builder::new(Dialect::Generic.grammar("app_"));
    q.from("users as u").select(["u.id"]);
    let mut sub = q.new_query();
    sub.from("posts")
        .select_raw("count(*)", [])
        .where_column("posts.user_id", "=", "u.id")
        .unwrap();
    q.select_sub(sub, "posts");
    assert_eq!(
        q.to_sql(),
        concat!(
            r#"select "u"."id", (select count(*) from "app_posts" where "app_posts"."user_id" = "u"."id") as "posts""#,
            r#" from "app_users" as "u""#
        )
    );
}

#[test]
fn test_from_raw() {
    let mut q = users();
    q.from_raw("generate_series(1, 3) as n");
    assert_eq!(q.to_sql(), "select * from generate_series(1, 3) as n");
}

#[test]
fn test_clone_without_is_independent() {
    let mut q = users();
    q.where_("id", ">", 1).unwrap().order_by("id", "asc").limit(3);
    let bare = q.clone_without(&[Component::Orders, Component::Limit]);
    assert_eq!(bare.to_sql(), r#"select * from "users" where "id" > ?"#);
    assert_eq!(bare.get_bindings(), vec![v(1)]);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "id" > ? order by "id" asc limit 3"#
    );

    let unfiltered = q.clone_without(&[Component::Wheres]);
    assert_eq!(
        unfiltered.to_sql(),
        r#"select * from "users" order by "id" asc limit 3"#
    );
    assert!(unfiltered.get_bindings().is_empty());

    let unbound = q.clone_without_bindings(&[BindingKind::Where]);
    assert!(unbound.get_bindings().is_empty());
    assert_eq!(q.get_bindings(), vec![v(1)]);
}

#[test]
fn test_when_and_tap() {
    let mut q = users();
    q.when(false, |q| {
        q.where_("a", "=", 1)?;
        Ok(())
    })
    .unwrap()
    .when(true, |q| {
        q.where_("b", "=", 2)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(q.to_sql(), r#"select * from "users" where "b" = ?"#);

    let result = q.tap(|q| {
        q.where_("c", "=", 3)?;
        q.where_("d", "~~~", 4)?;
        Ok(())
    });
    assert!(result.is_err());
    assert_eq!(q.wheres().len(), 1);
    assert_eq!(q.get_bindings(), vec![v(2)]);
}

#[test]
fn test_nested_instance_shares_table() {
    let q = users();
    let nested = q.nested_instance();
    assert_eq!(nested.from_table(), Some(&v("users")));
    assert!(nested.wheres().is_empty());
}

// ── Statement compilation ──

#[test]
fn test_compile_exists() {
    let mut q = users();
    q.where_("id", "=", 1).unwrap();
    assert_eq!(
        compile::compile_exists(&q),
        r#"select exists(select * from "users" where "id" = ?) as "exists""#
    );
}

#[test]
fn test_compile_aggregate() {
    let mut q = users();
    q.select(["email"]).distinct();
    q.aggregate = Some(Aggregate {
        function: "count".to_string(),
        columns: vec![v("email")],
    });
    assert_eq!(
        q.to_sql(),
        r#"select count(distinct "email") as aggregate from "users""#
    );

    let mut q = users();
    q.union(users());
    q.aggregate = Some(Aggregate {
        function: "count".to_string(),
        columns: Vec::new(),
    });
    assert_eq!(
        q.to_sql(),
        r#"select count(*) as aggregate from (select * from "users" union select * from "users") as "temp_table""#
    );
}

#[test]
fn test_compile_insert() {
    let q = users();
    let rows = vec![
        record([("name", v("ada")), ("age", v(36))]),
        record([("name", v("bob")), ("age", Value::raw("default"))]),
    ];
    let (sql, bindings) = compile::compile_insert(&q, &rows);
    assert_eq!(
        sql,
        r#"insert into "users" ("age", "name") values (?, ?), (default, ?)"#
    );
    assert_eq!(bindings, vec![v(36), v("ada"), v("bob")]);

    let (sql, bindings) = compile::compile_insert(&q, &[Record::new()]);
    assert_eq!(sql, r#"insert into "users" default values"#);
    assert!(bindings.is_empty());
}

#[test]
fn test_compile_insert_get_id() {
    let q = table(Dialect::Postgres, "users");
    let (sql, _) = compile::compile_insert_get_id(&q, &record([("name", "ada")]), None);
    assert_eq!(sql, r#"insert into "users" ("name") values (?) returning "id""#);

    let q = table(Dialect::MySql, "users");
    let (sql, _) = compile::compile_insert_get_id(&q, &record([("name", "ada")]), None);
    assert_eq!(sql, "insert into `users` (`name`) values (?)");
}

#[test]
fn test_compile_update_with_join() {
    let mut q = users();
    q.join_where("posts", "posts.user_id", "=", 4)
        .unwrap()
        .where_("users.id", "=", 9)
        .unwrap();
    let (sql, bindings) = compile::compile_update(
        &q,
        &record([("name", v("x")), ("visits", Value::raw(r#""visits" + 1"#))]),
    );
    assert_eq!(
        sql,
        r#"update "users" inner join "posts" on "posts"."user_id" = ? set "name" = ?, "visits" = "visits" + 1 where "users"."id" = ?"#
    );
    assert_eq!(bindings, vec![v(4), v("x"), v(9)]);
}

#[test]
fn test_compile_delete() {
    let mut q = users();
    q.where_("id", "=", 1).unwrap();
    let (sql, bindings) = compile::compile_delete(&q);
    assert_eq!(sql, r#"delete from "users" where "id" = ?"#);
    assert_eq!(bindings, vec![v(1)]);

    let mut q = users();
    q.join("bans", "bans.user_id", "=", "users.id").unwrap();
    let (sql, _) = compile::compile_delete(&q);
    assert_eq!(
        sql,
        r#"delete "users" from "users" inner join "bans" on "bans"."user_id" = "users"."id""#
    );
}

#[test]
fn test_count_placeholders_ignores_literals() {
    let quote = IdentifierQuote::DOUBLE;
    assert_eq!(
        compile::count_placeholders("select '?', ? from t where a = ?", quote),
        2
    );
    assert_eq!(compile::count_placeholders("select 1", quote), 0);
    assert_eq!(
        compile::count_placeholders("select 'it''s ?' from t where b = ?", quote),
        1
    );
}

#[test]
fn test_count_placeholders_skips_quoted_identifiers() {
    let mut q = users();
    q.where_eq("is_ok?", 1).where_eq("a\"?\"b", 2);
    assert_eq!(
        q.to_sql(),
        r#"select * from "users" where "is_ok?" = ? and "a""?""b" = ?"#
    );
    assert_eq!(
        compile::count_placeholders(&q.to_sql(), q.grammar().quote()),
        q.get_bindings().len()
    );

    let mut q = table(Dialect::MySql, "users");
    q.where_eq("why?", 1);
    assert_eq!(q.to_sql(), "select * from `users` where `why?` = ?");
    assert_eq!(compile::count_placeholders(&q.to_sql(), q.grammar().quote()), 1);

    let bracket = IdentifierQuote::BRACKET;
    assert_eq!(compile::count_placeholders("select [a]]?] from t where b = ?", bracket), 1);
}
