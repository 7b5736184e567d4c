//! Integration tests for the sofa-graphql crate.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use {
    async_graphql::{
        Value,
        dynamic::{
            Field, FieldFuture, FieldValue, Object, Schema, Subscription, SubscriptionField,
            SubscriptionFieldFuture, TypeRef,
        },
    },
    bytes::Bytes,
    futures::{StreamExt, stream},
    sofa_common::{
        ContextInit, ContextValue, ExecutionArgs, GetEnveloped, RawRequest, ServerContext,
    },
    sofa_graphql::{Error, RequestContext, SchemaHost},
};

// ── Fixtures ─────────────────────────────────────────────────────────────────

fn schema(greeting: &'static str) -> Schema {
    let query = Object::new("Query")
        .field(Field::new(
            "hello",
            TypeRef::named_nn(TypeRef::STRING),
            move |_| FieldFuture::new(async move { Ok(Some(Value::from(greeting.to_string()))) }),
        ))
        .field(Field::new(
            "whoami",
            TypeRef::named_nn(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let request = RequestContext::from_resolver(ctx.ctx)?;
                    let user = request.header("x-user").unwrap_or("anonymous");
                    Ok(Some(Value::from(format!("{user}@{}", request.path()))))
                })
            },
        ));
    Schema::build("Query", None, None)
        .register(query)
        .finish()
        .unwrap()
}

/// Query root plus a `ticks` subscription streaming `<path>#<n>` three times.
fn streaming_schema() -> Schema {
    let query = Object::new("Query").field(Field::new(
        "hello",
        TypeRef::named_nn(TypeRef::STRING),
        |_| FieldFuture::new(async { Ok(Some(Value::from("world".to_string()))) }),
    ));
    let subscription = Subscription::new("Subscription").field(SubscriptionField::new(
        "ticks",
        TypeRef::named_nn(TypeRef::STRING),
        |ctx| {
            SubscriptionFieldFuture::new(async move {
                let path = RequestContext::from_resolver(ctx.ctx)?.path().to_string();
                Ok(stream::iter(0..3)
                    .map(move |n| Ok(FieldValue::value(Value::from(format!("{path}#{n}"))))))
            })
        },
    ));
    Schema::build("Query", None, Some("Subscription"))
        .register(query)
        .register(subscription)
        .finish()
        .unwrap()
}

fn request(path: &str, user: Option<&str>) -> Arc<RawRequest> {
    let mut builder = http::Request::builder().uri(path);
    if let Some(user) = user {
        builder = builder.header("x-user", user);
    }
    Arc::new(builder.body(Bytes::new()).unwrap())
}

async fn context_for(host: &SchemaHost, id: u64, raw: Arc<RawRequest>) -> ContextValue {
    host.get_enveloped(&Arc::new(ServerContext::new(id)))
        .context_factory(ContextInit { request: raw })
        .await
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn executes_against_current_schema() {
    let host = SchemaHost::new();
    host.set_schema(schema("world"));

    let server_context = Arc::new(ServerContext::new(1));
    let envelope = host.get_enveloped(&server_context);
    let context_value = envelope
        .context_factory(ContextInit {
            request: request("/rest/hello", None),
        })
        .await
        .unwrap();

    let response = envelope
        .execute(ExecutionArgs::new("{ hello }", context_value))
        .await
        .unwrap();
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(
        response.data.into_json().unwrap(),
        serde_json::json!({ "hello": "world" })
    );
}

#[tokio::test]
async fn resolvers_see_the_inbound_request() {
    let host = SchemaHost::new();
    host.set_schema(schema("world"));

    let server_context = Arc::new(ServerContext::new(2));
    let envelope = host.get_enveloped(&server_context);
    let context_value = envelope
        .context_factory(ContextInit {
            request: request("/rest/whoami", Some("alice")),
        })
        .await
        .unwrap();
    let ctx = context_value.downcast_ref::<RequestContext>().unwrap();
    assert!(Arc::ptr_eq(&ctx.server_context, &server_context));

    let response = envelope
        .execute(ExecutionArgs::new("{ whoami }", context_value))
        .await
        .unwrap();
    assert_eq!(
        response.data.into_json().unwrap()["whoami"],
        "alice@/rest/whoami"
    );
}

#[tokio::test]
async fn envelope_keeps_schema_it_was_created_with() {
    let host = SchemaHost::new();
    host.set_schema(schema("old"));
    let envelope = host.get_enveloped(&Arc::new(ServerContext::new(3)));
    let context_value = envelope
        .context_factory(ContextInit {
            request: request("/", None),
        })
        .await
        .unwrap();

    host.set_schema(schema("new"));
    let response = envelope
        .execute(ExecutionArgs::new("{ hello }", context_value.clone()))
        .await
        .unwrap();
    assert_eq!(response.data.into_json().unwrap()["hello"], "old");

    let fresh = context_for(&host, 4, request("/", None)).await;
    let response = host
        .get_enveloped(&Arc::new(ServerContext::new(4)))
        .execute(ExecutionArgs::new("{ hello }", fresh))
        .await
        .unwrap();
    assert_eq!(response.data.into_json().unwrap()["hello"], "new");
}

#[tokio::test]
async fn subscribe_streams_responses() {
    let host = SchemaHost::new();
    host.set_schema(streaming_schema());
    let context_value = context_for(&host, 5, request("/rest/ticks", None)).await;

    let ticks: Vec<_> = host
        .get_enveloped(&Arc::new(ServerContext::new(5)))
        .subscribe(ExecutionArgs::new("subscription { ticks }", context_value))
        .await
        .unwrap()
        .map(|response| {
            assert!(response.errors.is_empty(), "{:?}", response.errors);
            response.data.into_json().unwrap()["ticks"].clone()
        })
        .collect()
        .await;
    assert_eq!(ticks, vec![
        serde_json::json!("/rest/ticks#0"),
        serde_json::json!("/rest/ticks#1"),
        serde_json::json!("/rest/ticks#2"),
    ]);
}

#[tokio::test]
async fn subscribe_without_subscription_root_reports_error() {
    let host = SchemaHost::new();
    host.set_schema(schema("world"));
    let context_value = context_for(&host, 8, request("/", None)).await;

    let responses: Vec<_> = host
        .get_enveloped(&Arc::new(ServerContext::new(8)))
        .subscribe(ExecutionArgs::new("{ hello }", context_value))
        .await
        .unwrap()
        .collect()
        .await;
    assert!(!responses.is_empty());
    assert!(
        responses[0]
            .errors
            .iter()
            .any(|e| e.message.contains("Subscription root not found")),
        "{:?}",
        responses[0].errors
    );
}

#[tokio::test]
async fn foreign_context_values_are_rejected() {
    let host = SchemaHost::new();
    host.set_schema(schema("world"));
    let err = host
        .get_enveloped(&Arc::new(ServerContext::new(6)))
        .execute(ExecutionArgs::new("{ hello }", ContextValue::new(42_u32)))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ForeignContext)));
}

#[tokio::test]
async fn execute_without_schema_fails() {
    let host = SchemaHost::new();
    let context_value = context_for(&host, 7, request("/", None)).await;
    let err = host
        .get_enveloped(&Arc::new(ServerContext::new(7)))
        .execute(ExecutionArgs::new("{ hello }", context_value))
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NoSchema)));
}

#[test]
fn schema_change_updates_host() {
    use sofa_common::Plugin;

    let host = SchemaHost::new();
    assert!(host.schema().is_none());
    host.on_schema_change(&Arc::new(schema("world"))).unwrap();
    assert!(host.schema().is_some());
}
