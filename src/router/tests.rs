use http::Method;
use serde_json::json;

use super::*;
use crate::dispatcher::Reply;
use crate::http::{Request, Response};

fn table() -> RouteTable {
    let mut table = RouteTable::new();
    table.get("/test", RawAction::closure(|_: &Request, _: &mut Response, _: &Arguments| Ok("123"))).unwrap();
    table
        .group(
            GroupAttributes::new().prefix("/").namespace("App\\Controller"),
            |t| {
                t.get("/", "IndexController@index")?;
                t.map(&[Method::GET, Method::POST], "/form", "FormController@handle")?;
                Ok(())
            },
        )
        .unwrap();
    table
}

fn identifier(m: &RouteMatch) -> String {
    m.route.action().to_string()
}

#[test]
fn test_root_path() {
    let m = table().match_route(&Method::GET, "/").unwrap();
    assert_eq!(identifier(&m), "App\\Controller\\IndexController@index");
    assert!(m.path_params.is_empty());
}

#[test]
fn trailing_slash_matches_canonical_route() {
    let table = table();
    assert!(table.match_route(&Method::GET, "/test/").is_some());
    assert!(table.match_route(&Method::GET, "//test").is_some());
}

#[test]
fn unknown_path_is_not_found() {
    assert!(matches!(table().lookup(&Method::GET, "/missing"), Lookup::NotFound));
}

#[test]
fn wrong_method_lists_allowed() {
    match table().lookup(&Method::DELETE, "/form") {
        Lookup::MethodNotAllowed(allowed) => assert_eq!(allowed, vec![Method::GET, Method::POST]),
        other => panic!("unexpected lookup: {other:?}"),
    }
}

#[test]
fn duplicate_registration_last_wins() {
    let mut table = RouteTable::new();
    table.get("/dup", "First@run").unwrap();
    table.get("/dup", "Second@run").unwrap();
    let m = table.match_route(&Method::GET, "/dup").unwrap();
    assert_eq!(identifier(&m), "Second@run");
    assert_eq!(table.len(), 2);
}

#[test]
fn exact_route_wins_over_pattern() {
    let mut table = RouteTable::new();
    table.get("/users/{id}", "User@show").unwrap();
    table.get("/users/new", "User@create").unwrap();
    let m = table.match_route(&Method::GET, "/users/new").unwrap();
    assert_eq!(identifier(&m), "User@create");
    let m = table.match_route(&Method::GET, "/users/7").unwrap();
    assert_eq!(m.get_path_param("id"), Some("7"));
}

#[test]
fn bind_overlays_params_on_defaults() {
    let mut table = RouteTable::new();
    table
        .get(
            "/posts/{slug}",
            ActionSpec::new()
                .uses("Post@show")
                .with_default("slug", "index")
                .with_default("format", "html"),
        )
        .unwrap();
    let route = table.match_route(&Method::GET, "/posts/hello").unwrap().bind();
    assert_eq!(route.argument("slug"), Some(&json!("hello")));
    assert_eq!(route.argument("format"), Some(&json!("html")));
}

#[test]
fn nested_groups_merge_attributes() {
    let mut table = RouteTable::new();
    table
        .group(GroupAttributes::new().prefix("api").middleware(["auth"]), |t| {
            t.group(
                GroupAttributes::new().prefix("v1").suffix(".json").middleware(["cors"]),
                |t| {
                    t.get("items", ActionSpec::new().uses("Item@list").middleware(["metrics"]))?;
                    Ok(())
                },
            )?;
            t.get("ping", "Ping@run")?;
            Ok(())
        })
        .unwrap();

    let m = table.match_route(&Method::GET, "/api/v1/items.json").unwrap();
    assert_eq!(m.route.middleware(), ["auth", "cors", "metrics"]);
    let m = table.match_route(&Method::GET, "/api/ping").unwrap();
    assert_eq!(m.route.middleware(), ["auth"]);
    assert_eq!(table.middleware_names(), vec!["auth", "cors", "metrics"]);
}

#[test]
fn group_stack_unwinds_on_error() {
    let mut table = RouteTable::new();
    let err = table.group(GroupAttributes::new().prefix("broken"), |t| {
        t.get("ok", "A@b")?;
        t.get("bad", ActionSpec::new())?;
        Ok(())
    });
    assert!(err.is_err());
    let route = table.get("after", "A@c").unwrap();
    assert_eq!(route.path(), "/after");
}

#[test]
fn closure_action_replies() {
    let m = table().match_route(&Method::GET, "/test").unwrap();
    let Action::Closure(h) = m.route.action() else {
        panic!("expected closure");
    };
    let req = Request::new(Method::GET, "/test");
    let mut res = Response::new();
    let reply = h(&req, &mut res, &Arguments::new()).unwrap();
    assert!(matches!(reply, Reply::Text(ref s) if s == "123"));
}

#[test]
fn dump_lists_routes() {
    let mut out = Vec::new();
    table().dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[routes] count=3"));
    assert!(text.contains("GET|POST /form -> App\\Controller\\FormController@handle"));
}
