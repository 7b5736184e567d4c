//! Description layer: an OpenAPI document kept in step with the REST routes,
//! served together with a Swagger UI viewer.

use std::{
    collections::BTreeMap,
    marker::PhantomData,
    sync::{Arc, Mutex, RwLock},
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    http::{StatusCode, header::CONTENT_TYPE},
    serde_json::Value,
    sofa_common::{Plugin, PluginInit, RequestEvent, Response},
    sofa_config::{DOCUMENT_PATH, SwaggerConfig},
    tracing::{debug, info},
};

use crate::{
    document::{AddRouteOptions, ApiDocument, DocumentGenerator, DocumentOptions},
    engine::{RouteInfo, RouteObserver},
    error::{Context, Error, Result},
    openapi::OpenApiGenerator,
    sofa::SofaPlugin,
    swagger_ui::render_swagger_ui,
};

// ── Document controller ─────────────────────────────────────────────────────

/// Holds the published description document and the one being filled by
/// the rebuild in progress.
pub struct DocumentController<S, G: DocumentGenerator<S>> {
    generator: G,
    config: SwaggerConfig,
    custom_scalars: BTreeMap<String, Value>,
    route_options: AddRouteOptions,
    staged: Mutex<Option<G::Document>>,
    current: RwLock<Option<Arc<G::Document>>>,
    _schema: PhantomData<fn(&S)>,
}

impl<S, G: DocumentGenerator<S>> DocumentController<S, G> {
    pub fn new(
        generator: G,
        config: SwaggerConfig,
        custom_scalars: BTreeMap<String, Value>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            config,
            custom_scalars,
            route_options: AddRouteOptions {
                base_path: base_path.into(),
            },
            staged: Mutex::new(None),
            current: RwLock::new(None),
            _schema: PhantomData,
        }
    }

    /// Start a fresh document for `schema`. It stays unpublished until the
    /// next rebuild completes.
    pub fn stage(&self, schema: &Arc<S>) -> anyhow::Result<()> {
        let document = self.generator.generate(DocumentOptions {
            schema: Arc::clone(schema),
            info: self.config.info.clone(),
            servers: self.config.servers.clone(),
            components: self.config.components.clone(),
            security: self.config.security.clone(),
            tags: self.config.tags.clone(),
            custom_scalars: self.custom_scalars.clone(),
        })?;
        *self.staged.lock().unwrap_or_else(|e| e.into_inner()) = Some(document);
        debug!("api document staged");
        Ok(())
    }

    /// Make the staged document current. No-op when nothing is staged.
    pub fn publish(&self) -> bool {
        let Some(document) = self.staged.lock().unwrap_or_else(|e| e.into_inner()).take() else {
            return false;
        };
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(document));
        info!("api document published");
        true
    }

    pub fn current(&self) -> Result<Arc<G::Document>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(Error::not_ready("api document"))
    }
}

impl<S, G> RouteObserver for DocumentController<S, G>
where
    G: DocumentGenerator<S>,
{
    fn on_route(&self, route: &RouteInfo) -> anyhow::Result<()> {
        let mut staged = self.staged.lock().unwrap_or_else(|e| e.into_inner());
        let document = staged
            .as_mut()
            .ok_or(Error::not_ready("staged api document"))?;
        document.add_route(route, &self.route_options);
        Ok(())
    }

    fn on_rebuilt(&self) {
        self.publish();
    }
}

// ── Plugin ──────────────────────────────────────────────────────────────────

/// Wraps a [`SofaPlugin`] and serves its description.
///
/// Registers the REST plugin as a sub-plugin, so on every schema change the
/// document is staged first and then filled by the REST rebuild.
pub struct SwaggerPlugin<S, G: DocumentGenerator<S> = OpenApiGenerator> {
    sofa: Arc<SofaPlugin<S>>,
    documents: Arc<DocumentController<S, G>>,
    config: SwaggerConfig,
}

impl<S, G> SwaggerPlugin<S, G>
where
    S: Send + Sync + 'static,
    G: DocumentGenerator<S> + 'static,
{
    pub fn new(mut sofa: SofaPlugin<S>, generator: G, config: SwaggerConfig) -> Self {
        let documents = Arc::new(DocumentController::new(
            generator,
            config.clone(),
            sofa.config().custom_scalars.clone(),
            sofa.config().base_path.clone(),
        ));
        sofa.observe_first(Arc::clone(&documents) as Arc<dyn RouteObserver>);
        Self {
            sofa: Arc::new(sofa),
            documents,
            config,
        }
    }

    pub fn sofa(&self) -> &Arc<SofaPlugin<S>> {
        &self.sofa
    }

    pub fn documents(&self) -> &Arc<DocumentController<S, G>> {
        &self.documents
    }

    fn viewer(&self) -> Result<Response> {
        let document = self.documents.current()?;
        let html = render_swagger_ui(&document.get())?;
        respond("text/html", html)
    }

    fn document(&self) -> Result<Response> {
        let document = self.documents.current()?;
        let body = serde_json::to_vec(&document.get()).context("failed to serialize api document")?;
        respond("application/json", body)
    }
}

fn respond(content_type: &'static str, body: impl Into<Bytes>) -> Result<Response> {
    Ok(http::Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())?)
}

#[async_trait]
impl<S, G> Plugin<S> for SwaggerPlugin<S, G>
where
    S: Send + Sync + 'static,
    G: DocumentGenerator<S> + 'static,
{
    fn name(&self) -> &str {
        "sofa-swagger"
    }

    fn on_plugin_init(&self, init: &mut PluginInit<S>) {
        init.add_plugin(Arc::clone(&self.sofa) as Arc<dyn Plugin<S>>);
    }

    fn on_schema_change(&self, schema: &Arc<S>) -> anyhow::Result<()> {
        self.documents.stage(schema)
    }

    async fn on_request(&self, event: &mut RequestEvent) -> anyhow::Result<()> {
        let response = if event.path() == self.config.endpoint {
            self.viewer()?
        } else if event.path() == DOCUMENT_PATH {
            self.document()?
        } else {
            return Ok(());
        };
        event.end_response(response);
        Ok(())
    }
}

/// The plugin to register for `sofa`: wrapped in a [`SwaggerPlugin`] with
/// the default generator when the viewer is enabled.
pub fn bridge_plugin<S>(sofa: SofaPlugin<S>, swagger: &SwaggerConfig) -> Arc<dyn Plugin<S>>
where
    S: Send + Sync + 'static,
{
    if swagger.enabled {
        Arc::new(SwaggerPlugin::new(sofa, OpenApiGenerator, swagger.clone()))
    } else {
        Arc::new(sofa)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {http::Method, sofa_config::OpenApiInfo};

    use super::*;

    fn controller() -> DocumentController<(), OpenApiGenerator> {
        let config = SwaggerConfig {
            info: OpenApiInfo {
                title: "Test".into(),
                ..OpenApiInfo::default()
            },
            ..SwaggerConfig::default()
        };
        DocumentController::new(OpenApiGenerator, config, BTreeMap::new(), "/rest")
    }

    fn route(path: &str) -> RouteInfo {
        RouteInfo::new(Method::GET, path, "q", "{ q }")
    }

    #[test]
    fn nothing_published_before_first_rebuild() {
        let documents = controller();
        assert!(matches!(
            documents.current(),
            Err(Error::NotReady { component: "api document" })
        ));
        assert!(documents.on_route(&route("/a")).is_err());
        assert!(!documents.publish());
    }

    #[test]
    fn staged_document_is_published_on_rebuild() {
        let documents = controller();
        documents.stage(&Arc::new(())).unwrap();
        documents.on_route(&route("/a")).unwrap();
        assert!(documents.current().is_err());

        documents.on_rebuilt();
        let json = documents.current().unwrap().get();
        assert_eq!(json["info"]["title"], "Test");
        assert!(json["paths"].get("/rest/a").is_some());
    }

    #[test]
    fn restaging_replaces_routes() {
        let documents = controller();
        documents.stage(&Arc::new(())).unwrap();
        documents.on_route(&route("/old")).unwrap();
        documents.on_rebuilt();

        documents.stage(&Arc::new(())).unwrap();
        documents.on_route(&route("/new")).unwrap();
        // Still serving the previous document mid-rebuild.
        assert!(documents.current().unwrap().get()["paths"].get("/rest/old").is_some());

        documents.on_rebuilt();
        let paths = documents.current().unwrap().paths().map(str::to_owned).collect::<Vec<_>>();
        assert_eq!(paths, vec!["/rest/new"]);
    }
}
