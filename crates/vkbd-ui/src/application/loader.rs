//! Loads the graph of linked layout pages.
//!
//! # The walk (for beginners)
//!
//! A keyboard starts from one *root* layout file.  Keys on that page may link
//! to other pages (shift, symbols), which may link further, and links may
//! form diamonds (two pages linking to the same third page) or cycles (shift
//! linking back to the root).  [`LayoutLoader::load_root`] walks this graph
//! depth-first with an explicit worklist:
//!
//! 1. Pop a page id; skip it if the [`VisitSet`] already holds it.
//! 2. Read and parse its file.  A failure only abandons this page; the
//!    walk carries on with the remaining work.
//! 3. Render and register the page.
//! 4. Push every non-`ROOT` link of the page.
//!
//! Links are pushed in reverse so pages are visited in the same order a
//! recursive pre-order walk would visit them.
//!
//! Parsed documents are cached by resolved path, so each file is parsed at
//! most once per loader.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, error, info};
use vkbd_core::{parse_layout, FormatError, LayoutDocument};

use super::page_registry::{PageRegistry, FALLBACK_PAGE_ID};
use super::renderer::PageRenderer;
use crate::infrastructure::storage::layout_source::{LayoutSource, SourceError};

/// Why one layout page could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("malformed layout {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

/// Page ids already visited by a walk, in visiting order.
#[derive(Debug, Default, Clone)]
pub struct VisitSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl VisitSet {
    /// Records `page_id`; returns `false` if it was already visited.
    pub fn insert(&mut self, page_id: &str) -> bool {
        if self.seen.contains(page_id) {
            return false;
        }
        self.seen.insert(page_id.to_string());
        self.order.push(page_id.to_string());
        true
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.seen.contains(page_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Visited ids in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// A link whose target page never got registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingLink {
    pub from_page: String,
    pub target: String,
}

/// Outcome of [`LayoutLoader::load_root`].
#[derive(Debug)]
pub struct LoadReport {
    pub root_page_id: String,
    /// `false` when the fallback page is shown instead of the root.
    pub root_loaded: bool,
    /// Registered page ids, in stack order.
    pub loaded: Vec<String>,
    pub failed: Vec<(String, LoadError)>,
    pub dangling_links: Vec<DanglingLink>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.root_loaded && self.failed.is_empty() && self.dangling_links.is_empty()
    }
}

/// Page id of the root layout: its file name.
pub fn root_page_id(root_path: &Path) -> String {
    root_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_path.display().to_string())
}

/// Reads, parses and caches layout documents.
pub struct LayoutLoader {
    source: Box<dyn LayoutSource>,
    cache: HashMap<PathBuf, Rc<LayoutDocument>>,
    parse_count: usize,
}

impl LayoutLoader {
    pub fn new(source: Box<dyn LayoutSource>) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            parse_count: 0,
        }
    }

    /// Number of documents actually parsed (cache misses that got that far).
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    pub fn cached_documents(&self) -> usize {
        self.cache.len()
    }

    /// The document at `path`, parsed on first request and cached after.
    ///
    /// # Errors
    ///
    /// [`LoadError::Source`] if the resource cannot be read and
    /// [`LoadError::Format`] if it is not a valid layout.  Failures are not
    /// cached.
    pub fn document(&mut self, path: &Path) -> Result<Rc<LayoutDocument>, LoadError> {
        if let Some(document) = self.cache.get(path) {
            debug!(path = %path.display(), "layout cache hit");
            return Ok(Rc::clone(document));
        }
        let text = self.source.read_to_string(path)?;
        self.parse_count += 1;
        let document = parse_layout(&text).map_err(|source| LoadError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            name = %document.name,
            rows = document.rows.len(),
            "parsed layout"
        );
        let document = Rc::new(document);
        self.cache.insert(path.to_path_buf(), Rc::clone(&document));
        Ok(document)
    }

    /// Loads `root_path` and every page reachable from it into `registry`.
    ///
    /// Always leaves at least one page registered and active: the root page
    /// if it loaded, otherwise a blank fallback page.
    pub fn load_root(
        &mut self,
        root_path: &Path,
        renderer: &PageRenderer,
        registry: &PageRegistry,
    ) -> LoadReport {
        let root_id = root_page_id(root_path);
        let layouts_dir = root_path.parent().unwrap_or_else(|| Path::new(""));
        let mut visited = VisitSet::default();
        let mut failed = Vec::new();
        let mut links = Vec::new();
        let mut worklist = vec![(root_id.clone(), root_path.to_path_buf())];

        while let Some((page_id, path)) = worklist.pop() {
            if !visited.insert(&page_id) {
                debug!(page = %page_id, "layout already visited");
                continue;
            }
            debug!(page = %page_id, path = %path.display(), "loading layout");
            let document = match self.document(&path) {
                Ok(document) => document,
                Err(err) => {
                    error!(page = %page_id, error = %err, "failed to load layout, skipping");
                    failed.push((page_id, err));
                    continue;
                }
            };

            let index = registry.register(renderer.render(&page_id, &document));
            debug!(page = %page_id, index, "built layout page");

            let targets: Vec<&str> = document.linked_pages().collect();
            for target in targets.iter().rev() {
                worklist.push((target.to_string(), layouts_dir.join(target)));
            }
            links.extend(targets.into_iter().map(|target| DanglingLink {
                from_page: page_id.clone(),
                target: target.to_string(),
            }));
        }

        let mut seen = HashSet::new();
        links.retain(|link| {
            !registry.contains(&link.target)
                && seen.insert((link.from_page.clone(), link.target.clone()))
        });
        for link in &links {
            error!(
                from = %link.from_page,
                target = %link.target,
                "layout link points to a page that was not loaded"
            );
        }

        let root_loaded = registry.contains(&root_id);
        if root_loaded {
            // Registered above, cannot fail.
            let _ = registry.switch_to(&root_id);
            info!(page = %root_id, pages = registry.len(), "initial layout set");
        } else {
            error!(page = %root_id, "root layout not loaded, showing an empty keyboard");
            registry.register(renderer.render_blank(FALLBACK_PAGE_ID));
            let _ = registry.switch_to(FALLBACK_PAGE_ID);
        }

        LoadReport {
            root_page_id: root_id,
            root_loaded,
            loaded: registry.page_ids(),
            failed,
            dangling_links: links,
        }
    }
}
