//! Dev server command implementation.
//!
//! Pages are rendered on request from an in-memory repository. A file
//! watcher reloads the repository when content changes and swaps it in
//! atomically; requests in flight keep the snapshot they started with.

use crate::assets;
use anyhow::{Context, Result};
use apexguide_core::{Config, Section, TopicRepository};
use apexguide_render::{
    render_index_page, render_not_found_page, render_section_page, render_topic_route,
    RenderError, SiteContext, TopicPage,
};
use axum::{
    body::Body,
    extract::{Path as AxumPath, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    ctx: Arc<SiteContext>,
    repo: Arc<RwLock<Arc<TopicRepository>>>,
}

impl AppState {
    fn new(ctx: SiteContext, repo: TopicRepository) -> Self {
        Self {
            ctx: Arc::new(ctx),
            repo: Arc::new(RwLock::new(Arc::new(repo))),
        }
    }

    /// Snapshot of the current repository
    async fn current(&self) -> Arc<TopicRepository> {
        self.repo.read().await.clone()
    }
}

/// Start development server with file watching
pub async fn dev_server(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let port = port.unwrap_or(config.server.port);
    let content_dir = config.content_dir();

    let repo = TopicRepository::load(&content_dir).context("Failed to load content")?;
    if config.normalized_base_url() != "/" {
        tracing::info!(
            "Dev server serves from / (configured base_url {} applies to builds only)",
            config.normalized_base_url()
        );
    }
    let state = AppState::new(SiteContext::from_config(&config).with_base_url("/"), repo);

    // Set up file watching for live reloads
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut _watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize file watcher")?;

    _watcher
        .watch(&content_dir, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {:?}", content_dir))?;

    tokio::spawn({
        let state = state.clone();
        async move {
            while let Some(event) = rx.recv().await {
                match event {
                    Ok(_ev) => {
                        // Debounce a bit by draining pending events
                        while rx.try_recv().is_ok() {}
                        tracing::info!("Change detected, reloading content...");
                        reload(&state, content_dir.clone()).await;
                    }
                    Err(err) => tracing::warn!("Watcher error: {}", err),
                }
            }
        }
    });

    tracing::info!("Starting dev server on http://localhost:{}", port);
    println!("\nServing at http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn reload(state: &AppState, content_dir: PathBuf) {
    let res = tokio::task::spawn_blocking(move || TopicRepository::load(&content_dir)).await;
    match res {
        Ok(Ok(repo)) => {
            *state.repo.write().await = Arc::new(repo);
            tracing::info!("Reload complete");
        }
        Ok(Err(e)) => tracing::error!("Reload failed, keeping previous content: {}", e),
        Err(e) => tracing::error!("Reload task panicked: {}", e),
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/{*path}", get(serve_static))
        .route("/{section}", get(serve_section))
        .route("/{section}/", get(serve_section))
        .route("/{section}/{slug}", get(serve_topic))
        .route("/{section}/{slug}/", get(serve_topic))
        .fallback(serve_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_index(State(state): State<AppState>) -> Response {
    let repo = state.current().await;
    let ctx = state.ctx.clone();
    render_blocking(move || render_index_page(&ctx, &repo).map(|html| (StatusCode::OK, html)))
        .await
}

async fn serve_section(
    State(state): State<AppState>,
    AxumPath(section): AxumPath<String>,
) -> Response {
    let Ok(section) = section.parse::<Section>() else {
        return not_found(&state).await;
    };
    let repo = state.current().await;
    let ctx = state.ctx.clone();
    render_blocking(move || {
        render_section_page(&ctx, &repo, section).map(|html| (StatusCode::OK, html))
    })
    .await
}

async fn serve_topic(
    State(state): State<AppState>,
    AxumPath((section, slug)): AxumPath<(String, String)>,
) -> Response {
    let Ok(section) = section.parse::<Section>() else {
        return not_found(&state).await;
    };
    let repo = state.current().await;
    let ctx = state.ctx.clone();
    render_blocking(move || {
        render_topic_route(&ctx, &repo, section, &slug).map(|page| match page {
            TopicPage::Found(html) => (StatusCode::OK, html),
            TopicPage::Broken(html) => (StatusCode::INTERNAL_SERVER_ERROR, html),
            TopicPage::Missing(html) => (StatusCode::NOT_FOUND, html),
        })
    })
    .await
}

async fn serve_static(AxumPath(path): AxumPath<String>) -> Response {
    match assets::get(&path) {
        Some(contents) => (
            [(header::CONTENT_TYPE, assets::content_type_for_path(&path))],
            Body::from(contents),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_404(State(state): State<AppState>) -> Response {
    not_found(&state).await
}

async fn not_found(state: &AppState) -> Response {
    let repo = state.current().await;
    let ctx = state.ctx.clone();
    render_blocking(move || {
        render_not_found_page(&ctx, &repo).map(|html| (StatusCode::NOT_FOUND, html))
    })
    .await
}

/// Run a page render off the async executor; markdown rendering and
/// highlighting are CPU bound.
async fn render_blocking<F>(render: F) -> Response
where
    F: FnOnce() -> Result<(StatusCode, String), RenderError> + Send + 'static,
{
    match tokio::task::spawn_blocking(render).await {
        Ok(Ok((status, html))) => (status, Html(html)).into_response(),
        Ok(Err(err)) => {
            tracing::error!("Render failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Render failed: {}", err)).into_response()
        }
        Err(err) => {
            tracing::error!("Render task panicked: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render task failed").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apexguide_core::{ContentParseError, Difficulty, Frontmatter, Topic};
    use axum::body::to_bytes;
    use axum::http::Request;
    use std::fs;
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn ctx() -> SiteContext {
        SiteContext {
            title: "Test Guide".into(),
            author: "Tester".into(),
            description: "Desc".into(),
            base_url: "/".into(),
            related_limit: 3,
            year: 2024,
        }
    }

    fn topic(section: Section, slug: &str, title: &str, order: u32) -> Topic {
        Topic {
            slug: slug.into(),
            section,
            frontmatter: Frontmatter {
                title: title.into(),
                description: format!("About {title}"),
                overview: None,
                order,
                difficulty: Difficulty::Beginner,
                read_time: None,
                concepts: vec![],
                prerequisites: vec![],
                related_topics: vec![],
                last_updated: None,
                exam_weight: None,
                resources: vec![],
            },
            content: format!("## {title}\n\nBody.\n"),
            source_path: PathBuf::from(format!("{section}/{slug}.md")),
        }
    }

    fn sample_state() -> AppState {
        let repo = TopicRepository::from_topics(vec![
            topic(Section::Apex, "a", "Intro", 1),
            topic(Section::Apex, "b", "Loops", 2),
        ]);
        AppState::new(ctx(), repo)
    }

    async fn fetch(state: AppState, uri: &str) -> (StatusCode, String) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn topic_route_renders_page() {
        let (status, body) = fetch(sample_state(), "/apex/a").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Intro</h1>"));
        assert!(body.contains(r#"href="/apex/b""#));

        let (status, _) = fetch(sample_state(), "/apex/a/").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_topic_or_section_is_404_page() {
        for uri in ["/apex/missing", "/drafts/a", "/drafts", "/a/b/c"] {
            let (status, body) = fetch(sample_state(), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(body.contains("Page not found"), "{uri}");
        }
    }

    #[tokio::test]
    async fn broken_topic_is_500_error_page() {
        let dir = tempdir().unwrap();
        let apex = dir.path().join("apex");
        fs::create_dir_all(&apex).unwrap();
        fs::write(apex.join("broken.md"), "---\ntitle: [unclosed\n---\nBody\n").unwrap();
        let repo = TopicRepository::load(dir.path()).unwrap();
        let failure: &ContentParseError = repo.failure_for(Section::Apex, "broken").unwrap();
        let line = failure.line.unwrap();

        let (status, body) = fetch(AppState::new(ctx(), repo), "/apex/broken").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("apex/broken.md"));
        assert!(body.contains(&format!("<dd>{line}</dd>")));
    }

    #[tokio::test]
    async fn index_section_and_static_routes() {
        let (status, body) = fetch(sample_state(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/apex/a"));

        let (status, body) = fetch(sample_state(), "/apex").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.find("Intro").unwrap() < body.find("Loops").unwrap());

        let (status, body) = fetch(sample_state(), "/static/js/site.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("copy-button"));
    }

    #[tokio::test]
    async fn reload_swaps_repository() {
        let dir = tempdir().unwrap();
        let apex = dir.path().join("apex");
        fs::create_dir_all(&apex).unwrap();
        fs::write(
            apex.join("new.md"),
            "---\ntitle: Fresh\ndescription: d\norder: 1\ndifficulty: beginner\n---\nHi\n",
        )
        .unwrap();

        let state = sample_state();
        let before = state.current().await;
        reload(&state, dir.path().to_path_buf()).await;

        let (status, body) = fetch(state.clone(), "/apex/new").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>Fresh</h1>"));
        // Old snapshots stay valid for readers that still hold them
        assert!(before.get_topic_by_slug(Section::Apex, "a").is_some());
    }
}
