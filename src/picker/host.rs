use crate::error::{PickerError, Result};
use crate::picker::events::{ListenerKind, PickerEvent};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostKind {
    Input,
    Button,
    Other,
}

/// The element the picker is bound to.
pub trait HostElement {
    fn id(&self) -> String;
    fn kind(&self) -> HostKind;
    fn value(&self) -> String;
    fn set_value(&mut self, value: &str);
    fn dispatch(&mut self, event: PickerEvent);
    fn listen(&mut self, _kind: ListenerKind) {}
    fn unlisten(&mut self, _kind: ListenerKind) {}
}

/// Resolves selectors to elements.
pub trait HostDocument {
    fn element_by_id(&self, id: &str) -> Option<Box<dyn HostElement>>;
    fn query_selector(&self, selector: &str) -> Option<Box<dyn HostElement>>;
}

/// Where the panel opens relative to the host element.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Opens {
    Left,
    Right,
    #[default]
    Center,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Drops {
    Up,
    Down,
    #[default]
    Auto,
}

/// Places the panel on screen. Called from the reposition timer.
pub trait Positioner {
    fn position(&mut self, opens: Opens, drops: Drops);
}

pub enum HostTarget<'a> {
    Element(Box<dyn HostElement>),
    Selector {
        document: &'a dyn HostDocument,
        selector: String,
    },
}

impl<'a> HostTarget<'a> {
    pub fn selector(document: &'a dyn HostDocument, selector: &str) -> Self {
        HostTarget::Selector {
            document,
            selector: selector.to_string(),
        }
    }

    /// `#id` looks up by id; anything else tries the selector, then a bare id.
    pub fn resolve(self) -> Result<Box<dyn HostElement>> {
        match self {
            HostTarget::Element(element) => Ok(element),
            HostTarget::Selector { document, selector } => {
                let found = match selector.strip_prefix('#') {
                    Some(id) => document.element_by_id(id),
                    None => document
                        .query_selector(&selector)
                        .or_else(|| document.element_by_id(&selector)),
                };
                found.ok_or(PickerError::ElementNotFound { selector })
            }
        }
    }
}

#[derive(Debug, Default)]
struct ElementState {
    value: String,
    events: Vec<PickerEvent>,
    listening: Vec<ListenerKind>,
}

/// In-memory host element. Clones share state, so a caller can keep a
/// handle after giving one to the picker.
#[derive(Clone, Debug)]
pub struct MemoryElement {
    id: String,
    kind: HostKind,
    state: Rc<RefCell<ElementState>>,
}

impl MemoryElement {
    pub fn new(id: &str, kind: HostKind) -> Self {
        MemoryElement {
            id: id.to_string(),
            kind,
            state: Rc::new(RefCell::new(ElementState::default())),
        }
    }

    pub fn events(&self) -> Vec<PickerEvent> {
        self.state.borrow().events.clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.state.borrow().events.iter().map(PickerEvent::name).collect()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn listening(&self) -> usize {
        self.state.borrow().listening.len()
    }
}

impl HostElement for MemoryElement {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> HostKind {
        self.kind
    }

    fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.state.borrow_mut().value = value.to_string();
    }

    fn dispatch(&mut self, event: PickerEvent) {
        self.state.borrow_mut().events.push(event);
    }

    fn listen(&mut self, kind: ListenerKind) {
        self.state.borrow_mut().listening.push(kind);
    }

    fn unlisten(&mut self, kind: ListenerKind) {
        self.state.borrow_mut().listening.retain(|k| *k != kind);
    }
}

/// A flat list of elements; selectors match `input`, `button` or an id.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: Vec<MemoryElement>,
}

impl MemoryDocument {
    pub fn with(mut self, element: MemoryElement) -> Self {
        self.elements.push(element);
        self
    }
}

impl HostDocument for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<Box<dyn HostElement>> {
        self.elements
            .iter()
            .find(|e| e.id == id)
            .map(|e| Box::new(e.clone()) as Box<dyn HostElement>)
    }

    fn query_selector(&self, selector: &str) -> Option<Box<dyn HostElement>> {
        let kind = match selector {
            "input" => HostKind::Input,
            "button" => HostKind::Button,
            _ => return None,
        };
        self.elements
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| Box::new(e.clone()) as Box<dyn HostElement>)
    }
}
