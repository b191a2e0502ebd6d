//! Registry of rendered keyboard pages.
//!
//! Every loaded layout becomes one [`RenderedPage`], registered under its
//! page id and added to a stack control that shows one page at a time.
//! Page switches are requested by id; an unknown id is reported and leaves
//! the visible page unchanged.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, error, warn};
use vkbd_core::{KeyAction, KeyElement, Symbol};

use crate::infrastructure::toolkit::{ButtonControl, PageView, StackControl};

/// Page id of the blank page shown when the root layout cannot be loaded.
pub const FALLBACK_PAGE_ID: &str = "<empty>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("layout page '{0}' is not registered")]
    UnknownPage(String),
}

/// One key as built on a page.
pub struct RenderedKey {
    pub element: KeyElement,
    pub action: KeyAction,
    pub button: Rc<dyn ButtonControl>,
    /// Page id a link key switches to, with the root link already resolved.
    pub target_page: Option<String>,
}

impl RenderedKey {
    /// Text label or icon symbol as written in the layout.
    pub fn symbol(&self) -> &str {
        &self.element.symbol
    }
}

/// A built keyboard page.
pub struct RenderedPage {
    pub page_id: String,
    pub name: String,
    pub view: Rc<dyn PageView>,
    pub keys: Vec<RenderedKey>,
}

impl RenderedPage {
    /// First key whose layout symbol is `symbol`.
    pub fn key(&self, symbol: &str) -> Option<&RenderedKey> {
        self.keys.iter().find(|key| key.symbol() == symbol)
    }

    /// Clicks the key labelled `symbol`; returns `false` if there is none.
    pub fn press(&self, symbol: &str) -> bool {
        match self.key(symbol) {
            Some(key) => {
                key.button.click();
                true
            }
            None => false,
        }
    }

    /// Key labels in layout order, icons shown by glyph name.
    pub fn key_labels(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|key| match key.element.face() {
                Symbol::Icon(icon) => format!("[{}]", icon.glyph_name()),
                Symbol::Text(_) => key.element.symbol.clone(),
            })
            .collect()
    }
}

/// Rendered pages by id plus the stack they are shown in.
pub struct PageRegistry {
    stack: Rc<dyn StackControl>,
    pages: RefCell<HashMap<String, (usize, Rc<RenderedPage>)>>,
    order: RefCell<Vec<String>>,
    active: RefCell<Option<String>>,
}

impl PageRegistry {
    pub fn new(stack: Rc<dyn StackControl>) -> Rc<Self> {
        Rc::new(Self {
            stack,
            pages: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            active: RefCell::new(None),
        })
    }

    /// Adds `page` to the stack and returns its stack index.
    ///
    /// Re-registering an id replaces the lookup entry only; the loader never
    /// does so because it visits each page once.
    pub fn register(&self, page: RenderedPage) -> usize {
        let index = self.stack.add_page(Rc::clone(&page.view));
        let id = page.page_id.clone();
        debug!(page = %id, index, keys = page.keys.len(), "registered layout page");
        let previous = self
            .pages
            .borrow_mut()
            .insert(id.clone(), (index, Rc::new(page)));
        if previous.is_some() {
            warn!(page = %id, "layout page registered twice");
        } else {
            self.order.borrow_mut().push(id);
        }
        index
    }

    pub fn contains(&self, page_id: &str) -> bool {
        self.pages.borrow().contains_key(page_id)
    }

    /// Shows the page registered under `page_id`.
    ///
    /// # Errors
    ///
    /// [`SwitchError::UnknownPage`] when no such page exists; the current
    /// page stays visible.
    pub fn switch_to(&self, page_id: &str) -> Result<(), SwitchError> {
        let index = self.pages.borrow().get(page_id).map(|(index, _)| *index);
        let Some(index) = index else {
            error!(page = %page_id, "cannot switch to unregistered layout page");
            return Err(SwitchError::UnknownPage(page_id.to_string()));
        };
        self.stack.set_current_index(index);
        *self.active.borrow_mut() = Some(page_id.to_string());
        debug!(page = %page_id, index, "switched layout page");
        Ok(())
    }

    pub fn active_page_id(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    pub fn active_page(&self) -> Option<Rc<RenderedPage>> {
        let active = self.active.borrow();
        active.as_deref().and_then(|id| self.page(id))
    }

    pub fn page(&self, page_id: &str) -> Option<Rc<RenderedPage>> {
        self.pages
            .borrow()
            .get(page_id)
            .map(|(_, page)| Rc::clone(page))
    }

    /// Page ids in registration order.
    pub fn page_ids(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.order.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
