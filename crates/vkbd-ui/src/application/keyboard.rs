//! The virtual keyboard widget.
//!
//! [`VirtualKeyboard`] is what an application embeds: constructing it loads
//! the root layout and every linked page, renders them into a stack and
//! shows the root page.  It needs the key event bus from [`Services`], so it
//! can only be built after the bus is installed.

use std::path::PathBuf;
use std::rc::Rc;

use tracing::info;

use super::loader::{root_page_id, LayoutLoader, LoadReport};
use super::page_registry::{PageRegistry, RenderedPage, SwitchError};
use super::renderer::{KeyMetrics, PageRenderer};
use super::services::{ConfigurationError, Services};
use crate::infrastructure::storage::config::KeyboardConfig;
use crate::infrastructure::storage::layout_source::{FsLayoutSource, LayoutSource};
use crate::infrastructure::toolkit::{StackControl, Toolkit};

/// An on-screen keyboard made of linked layout pages.
pub struct VirtualKeyboard {
    stack: Rc<dyn StackControl>,
    registry: Rc<PageRegistry>,
    loader: LayoutLoader,
    report: LoadReport,
}

impl VirtualKeyboard {
    /// Builds the keyboard and loads every page reachable from `root_layout`.
    ///
    /// Layout problems never fail construction; they are logged and listed
    /// in [`report`](Self::report).
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::MissingService`] if no key event bus is
    /// installed in `services`.
    pub fn new(
        services: &Services,
        toolkit: Rc<dyn Toolkit>,
        source: Box<dyn LayoutSource>,
        root_layout: impl Into<PathBuf>,
        metrics: KeyMetrics,
    ) -> Result<Self, ConfigurationError> {
        let bus = services.key_bus()?;
        let root_layout = root_layout.into();
        let stack = toolkit.create_stack();
        let registry = PageRegistry::new(Rc::clone(&stack));
        let renderer = PageRenderer::new(
            toolkit,
            bus,
            &registry,
            root_page_id(&root_layout),
            metrics,
        );

        let mut loader = LayoutLoader::new(source);
        let report = loader.load_root(&root_layout, &renderer, &registry);
        info!(
            root = %root_layout.display(),
            pages = report.loaded.len(),
            failed = report.failed.len(),
            "virtual keyboard ready"
        );

        Ok(Self {
            stack,
            registry,
            loader,
            report,
        })
    }

    /// Builds the keyboard from configuration, reading layouts from disk.
    pub fn from_config(
        services: &Services,
        toolkit: Rc<dyn Toolkit>,
        config: &KeyboardConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            services,
            toolkit,
            Box::new(FsLayoutSource),
            config.root_layout.clone(),
            config.metrics(),
        )
    }

    pub fn root_page_id(&self) -> &str {
        &self.report.root_page_id
    }

    /// Shows the page `page_id`; unknown ids leave the current page shown.
    pub fn switch_to(&self, page_id: &str) -> Result<(), SwitchError> {
        self.registry.switch_to(page_id)
    }

    pub fn active_page_id(&self) -> Option<String> {
        self.registry.active_page_id()
    }

    pub fn active_page(&self) -> Option<Rc<RenderedPage>> {
        self.registry.active_page()
    }

    pub fn page(&self, page_id: &str) -> Option<Rc<RenderedPage>> {
        self.registry.page(page_id)
    }

    /// Page ids in stack order.
    pub fn page_ids(&self) -> Vec<String> {
        self.registry.page_ids()
    }

    /// Clicks the key labelled `symbol` on the visible page.
    ///
    /// Returns `false` when the visible page has no such key.
    pub fn press(&self, symbol: &str) -> bool {
        self.active_page().is_some_and(|page| page.press(symbol))
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Number of layout resources parsed while loading.
    pub fn parse_count(&self) -> usize {
        self.loader.parse_count()
    }

    /// The stacked container holding every page.
    pub fn view(&self) -> Rc<dyn StackControl> {
        Rc::clone(&self.stack)
    }
}
