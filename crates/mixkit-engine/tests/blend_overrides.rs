use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mixkit_core::{Error, FieldDef, Record, Scheme, SchemeCatalog, Value};
use mixkit_engine::{Filters, Mixer, Override, Overrides, Sequence};

fn blog() -> SchemeCatalog {
    SchemeCatalog::new()
        .with(
            Scheme::new("User")
                .field(FieldDef::new("id", "int").primary_key().auto())
                .field(FieldDef::new("name", "str").max_length(40))
                .field(FieldDef::new("email", "email").unique())
                .field(FieldDef::new("nickname", "str").nullable())
                .field(FieldDef::new("active", "bool").default_value(true))
                .field(FieldDef::new("role", "str").choices(["admin", "staff", "guest"]))
                .field(FieldDef::new("score", "positive_small_int")),
        )
        .with(
            Scheme::new("Post")
                .field(FieldDef::new("id", "int").primary_key().auto())
                .field(FieldDef::new("title", "str"))
                .field(FieldDef::new("slug", "str"))
                .field(FieldDef::to_one("author", "User"))
                .field(FieldDef::to_many("comments", "Comment", 2).back_ref("post")),
        )
        .with(
            Scheme::new("Comment")
                .field(FieldDef::new("id", "int").primary_key().auto())
                .field(FieldDef::to_one("post", "Post"))
                .field(FieldDef::new("body", "text")),
        )
}

fn blend(mixer: &Mixer, scheme: &str, overrides: Overrides) -> Record {
    mixer
        .blend(scheme, &overrides)
        .expect("blend")
        .expect("record")
}

#[test]
fn literal_overrides_are_used_as_is() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(
        &mixer,
        "User",
        Overrides::new().set("name", "ada").set("score", 7).set("nickname", Value::Null),
    );
    assert_eq!(user.get("name"), Some(&Value::from("ada")));
    assert_eq!(user.get("score"), Some(&Value::Int(7)));
    assert_eq!(user.get("nickname"), Some(&Value::Null));
}

#[test]
fn defaults_win_and_optional_fields_stay_unset() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(&mixer, "User", Overrides::new());
    assert_eq!(user.get("active"), Some(&Value::Bool(true)));
    assert!(!user.contains("nickname"));
    assert_eq!(user.get("id"), Some(&Value::Int(1)));
    let role = user.get("role").and_then(Value::as_str).expect("role");
    assert!(["admin", "staff", "guest"].contains(&role));

    let inactive = blend(&mixer, "User", Overrides::new().set("active", false));
    assert_eq!(inactive.get("active"), Some(&Value::Bool(false)));
}

#[test]
fn skip_leaves_the_field_absent() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(&mixer, "User", Overrides::new().set("score", Mixer::skip()));
    assert!(!user.contains("score"));
    assert!(user.contains("name"));
}

#[test]
fn skip_never_calls_the_producer() {
    let mixer = Mixer::from_catalog(blog());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    mixer
        .register(
            "User",
            "score",
            Override::call(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Value::Int(1)
            }),
        )
        .expect("register");

    let skipped = blend(&mixer, "User", Overrides::new().set("score", Mixer::skip()));
    assert!(!skipped.contains("score"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let produced = blend(&mixer, "User", Overrides::new());
    assert_eq!(produced.get("score"), Some(&Value::Int(1)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn nested_keys_reach_related_records() {
    let mixer = Mixer::from_catalog(blog());
    let post = blend(
        &mixer,
        "Post",
        Overrides::new().set("author__name", "ada").set("author__score", 3),
    );
    assert_eq!(post.lookup("author.name"), Some(&Value::from("ada")));
    assert_eq!(post.lookup("author.score"), Some(&Value::Int(3)));
    assert!(!post.contains("comments"));
}

#[test]
fn undeclared_keys_become_plain_values() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(
        &mixer,
        "User",
        Overrides::new().set("extra", 5).set("meta__source", "import"),
    );
    assert_eq!(user.get("extra"), Some(&Value::Int(5)));
    assert_eq!(user.lookup("meta.source"), Some(&Value::from("import")));
}

#[test]
fn value_and_nested_params_cannot_be_combined() {
    let mixer = Mixer::from_catalog(blog());
    let author = blend(&mixer, "User", Overrides::new());
    let result = mixer.blend(
        "Post",
        &Overrides::new().set("author", author).set("author__name", "ada"),
    );
    let err = result.expect_err("conflict");
    assert!(matches!(err.root(), Error::InvalidRelation { field, .. } if field == "author"));
}

#[test]
fn mix_copies_values_of_the_target() {
    let mixer = Mixer::from_catalog(blog());
    let post = blend(
        &mixer,
        "Post",
        Overrides::new()
            .set("slug", Mixer::mix("title"))
            .set("author__name", "ada")
            .set(
                "title",
                Mixer::mix("author.name").map(|name| Value::Text(format!("by {name}"))),
            ),
    );
    assert_eq!(post.get("title"), Some(&Value::from("by ada")));
    assert_eq!(post.get("slug"), post.get("title"));
}

#[test]
fn unresolved_mix_fails() {
    let mixer = Mixer::from_catalog(blog());
    let result = mixer.blend("Post", &Overrides::new().set("slug", Mixer::mix("missing")));
    let err = result.expect_err("unresolved");
    assert!(matches!(err.root(), Error::UnresolvedMix(path) if path == "missing"));
    assert!(matches!(err, Error::Blend { ref scheme, .. } if scheme == "Post"));
}

#[test]
fn callables_and_sequences_are_evaluated_per_blend() {
    let mixer = Mixer::from_catalog(blog());
    let overrides = Overrides::new()
        .set("name", Override::call(|| Value::from("called")))
        .set("score", Sequence::counter());
    let first = blend(&mixer, "User", overrides.clone());
    let second = blend(&mixer, "User", overrides);
    assert_eq!(first.get("name"), Some(&Value::from("called")));
    assert_eq!(first.get("score"), Some(&Value::Int(0)));
    assert_eq!(second.get("score"), Some(&Value::Int(1)));
}

#[test]
fn exhausted_sequence_fails_with_the_field_name() {
    let mixer = Mixer::from_catalog(blog());
    let overrides = Overrides::new().set("name", Sequence::from_iter(vec!["only"]));
    blend(&mixer, "User", overrides.clone());
    let err = mixer.blend("User", &overrides).expect_err("exhausted");
    assert!(matches!(err.root(), Error::GeneratorExhausted(field) if field == "name"));
}

#[test]
fn markers_pick_generation_mode_and_type() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(
        &mixer,
        "User",
        Overrides::new()
            .set("role", Mixer::random_from(["x", "y"]))
            .set("score", Mixer::random_as("bool"))
            .set("nickname", Mixer::fake_as("str"))
            .set("name", Mixer::random()),
    );
    let role = user.get("role").and_then(Value::as_str).expect("role");
    assert!(role == "x" || role == "y");
    assert!(matches!(user.get("score"), Some(Value::Bool(_))));
    assert!(matches!(user.get("nickname"), Some(Value::Text(_))));
    assert!(matches!(user.get("name"), Some(Value::Text(_))));
}

#[test]
fn markers_on_undeclared_fields_need_a_type() {
    let mixer = Mixer::from_catalog(blog());
    let err = mixer
        .blend("User", &Overrides::new().set("extra", Mixer::fake()))
        .expect_err("untyped");
    assert!(matches!(err.root(), Error::InvalidParams(_)));

    let user = blend(&mixer, "User", Overrides::new().set("extra", Mixer::random_as("uuid")));
    assert!(matches!(user.get("extra"), Some(Value::Uuid(_))));
}

#[test]
fn scalar_params_become_generator_params() {
    let mixer = Mixer::from_catalog(blog());
    let user = blend(&mixer, "User", Overrides::new().set("nickname__length", 3));
    let nickname = user.get("nickname").and_then(Value::as_str).expect("nickname");
    assert_eq!(nickname.chars().count(), 3);

    let post = blend(&mixer, "Post", Overrides::new().set("title__max_len", 4));
    let title = post.get("title").and_then(Value::as_str).expect("title");
    assert!(title.chars().count() <= 4);

    let err = mixer
        .blend("User", &Overrides::new().set("nickname__length", Sequence::counter()))
        .expect_err("non-literal param");
    assert!(matches!(err.root(), Error::InvalidRelation { field, .. } if field == "nickname"));

    let err = mixer
        .blend("User", &Overrides::new().set("nickname__bogus", 1))
        .expect_err("unknown param");
    assert!(matches!(err.root(), Error::InvalidParams(_)));
}

#[test]
fn to_many_relations_are_blended_after_the_owner() {
    let mixer = Mixer::from_catalog(blog());
    let post = blend(
        &mixer,
        "Post",
        Overrides::new().set("comments__body", "first!"),
    );
    let post_id = post.get("id").cloned().expect("post id");
    let comments = post.get("comments").and_then(Value::as_list).expect("comments");
    assert_eq!(comments.len(), 2);
    for comment in comments {
        let comment = comment.as_record().expect("comment record");
        assert_eq!(comment.get("post"), Some(&post_id));
        assert_eq!(comment.get("body"), Some(&Value::from("first!")));
    }
}

#[test]
fn fake_marker_builds_optional_relations() {
    let mixer = Mixer::from_catalog(blog());
    let post = blend(&mixer, "Post", Overrides::new().set("comments", Mixer::fake()));
    let comments = post.get("comments").and_then(Value::as_list).expect("comments");
    assert_eq!(comments.len(), 2);
}

#[test]
fn select_uses_stored_records() {
    let mixer = Mixer::from_catalog(blog());
    let ada = blend(&mixer, "User", Overrides::new().set("name", "ada"));
    let post = blend(
        &mixer,
        "Post",
        Overrides::new().set("author", Mixer::select(Filters::new().eq("name", "ada"))),
    );
    assert_eq!(post.get("author"), Some(&Value::from(ada)));

    let err = mixer
        .blend(
            "Post",
            &Overrides::new().set("author", Mixer::select(Filters::new().eq("name", "bob"))),
        )
        .expect_err("nothing to select");
    assert!(matches!(err.root(), Error::SelectNotFound(field) if field == "author"));
}

#[test]
fn select_spreads_over_all_matches() {
    let mixer = Mixer::from_catalog(blog());
    for _ in 0..5 {
        blend(&mixer, "User", Overrides::new().set("name", "red"));
    }
    blend(&mixer, "User", Overrides::new().set("name", "blue"));

    let overrides =
        Overrides::new().set("author", Mixer::select(Filters::new().eq("name", "red")));
    let authors: HashSet<String> = mixer
        .cycle(40)
        .blend("Post", &overrides)
        .expect("cycle")
        .iter()
        .map(|post| post.lookup("author.id").expect("author id").key())
        .collect();
    assert!(authors.len() > 1);
    assert!(authors.iter().all(|id| id != &Value::Int(6).key()));
}

#[test]
fn unknown_relation_targets_are_rejected() {
    let catalog = SchemeCatalog::new().with(
        Scheme::new("Orphan").field(FieldDef::to_one("owner", "Missing")),
    );
    let mixer = Mixer::from_catalog(catalog);
    let err = mixer.blend("Orphan", &Overrides::new()).expect_err("missing target");
    assert!(matches!(err.root(), Error::InvalidRelation { field, .. } if field == "owner"));
}

#[test]
fn self_references_hit_the_depth_limit() {
    let catalog = SchemeCatalog::new().with(
        Scheme::new("Node").field(FieldDef::to_one("parent", "Node")),
    );
    let mixer = Mixer::from_catalog(catalog);
    let err = mixer.blend("Node", &Overrides::new()).expect_err("depth");
    assert!(matches!(err.root(), Error::InvalidRelation { .. }));
}

#[test]
fn unknown_schemes_fail_to_resolve() {
    let mixer = Mixer::from_catalog(blog());
    let err = mixer.blend("Nope", &Overrides::new()).expect_err("unknown");
    assert!(matches!(err.root(), Error::SchemeResolution(_)));
}
