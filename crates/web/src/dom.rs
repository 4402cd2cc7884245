//! DOM-backed [`ChatView`].

use chat::render::{MESSAGE_CLASS, TYPING_CLASS, TYPING_TEXT, role_class};
use chat::{Carousel, ChatView, GameCard, Renderer, SidebarEntry};
use proto::{Message, Role, StoreError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
};

use crate::layout::{card_from_parts, parse_gap, slider_offset};
use crate::log;

/// CSS class on the highlighted slider card.
pub const CURRENT_CARD_CLASS: &str = "current-image";
/// CSS class on the active sidebar entry.
pub const ACTIVE_ENTRY_CLASS: &str = "active";
/// Attribute carrying a session id on sidebar entries.
pub const SESSION_ID_ATTR: &str = "data-session-id";

/// Elements the widget attaches to.
pub struct DomElements {
    pub chat_box: Element,
    pub form: HtmlFormElement,
    pub input: HtmlInputElement,
    pub new_chat: Element,
    pub chat_list: Element,
    pub slider_track: HtmlElement,
    pub prev: HtmlButtonElement,
    pub next: HtmlButtonElement,
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("element #{id} has the wrong type")))
}

impl DomElements {
    /// Looks up every element by id.
    pub fn find(document: &Document) -> Result<Self, JsValue> {
        // Older pages only mark the track with a class.
        let slider_track = if document.get_element_by_id("slider-track").is_some() {
            by_id(document, "slider-track")?
        } else {
            document
                .query_selector(".slider-track")?
                .ok_or_else(|| JsValue::from_str("missing element #slider-track"))?
                .dyn_into::<HtmlElement>()
                .map_err(|_| JsValue::from_str(".slider-track has the wrong type"))?
        };
        Ok(Self {
            chat_box: by_id(document, "chat-box")?,
            form: by_id(document, "chat-form")?,
            input: by_id(document, "user-input")?,
            new_chat: by_id(document, "new-chat-btn")?,
            chat_list: by_id(document, "chat-list")?,
            slider_track,
            prev: by_id(document, "prevBtn")?,
            next: by_id(document, "nextBtn")?,
        })
    }

    /// Slider children, in order.
    pub fn card_elements(&self) -> Vec<Element> {
        let children = self.slider_track.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    /// Reads one [`GameCard`] per slider child.
    pub fn read_cards(&self) -> Vec<GameCard> {
        self.card_elements()
            .iter()
            .enumerate()
            .map(|(i, el)| {
                card_from_parts(
                    el.get_attribute("data-title"),
                    el.text_content(),
                    el.get_attribute("data-game"),
                    i,
                )
            })
            .collect()
    }
}

/// Renders controller updates into the page.
pub struct DomView {
    document: Document,
    elements: DomElements,
    renderer: Renderer,
}

impl DomView {
    pub fn new(document: Document, elements: DomElements, renderer: Renderer) -> Self {
        Self {
            document,
            elements,
            renderer,
        }
    }

    pub fn elements(&self) -> &DomElements {
        &self.elements
    }

    fn message_element(&self, message: &Message) -> Option<Element> {
        let rendered = self.renderer.render(message);
        let el = self.document.create_element("div").ok()?;
        el.set_class_name(&rendered.class_list());
        el.set_inner_html(&rendered.html);
        Some(el)
    }

    fn remove_typing(&self) {
        if let Ok(Some(el)) = self
            .elements
            .chat_box
            .query_selector(&format!(".{TYPING_CLASS}"))
        {
            el.remove();
        }
    }

    fn scroll_to_bottom(&self) {
        let chat_box = &self.elements.chat_box;
        chat_box.set_scroll_top(chat_box.scroll_height());
    }

    /// Centres card `index` in the slider viewport.
    pub fn position_track(&self, index: usize) {
        let track = &self.elements.slider_track;
        let container_width = track
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
            .map(|p| p.offset_width())
            .unwrap_or(0);
        let card_width = self
            .elements
            .card_elements()
            .first()
            .and_then(|c| c.clone().dyn_into::<HtmlElement>().ok())
            .map(|c| c.offset_width())
            .unwrap_or(0);
        let gap = web_sys::window()
            .and_then(|w| w.get_computed_style(track).ok().flatten())
            .and_then(|style| style.get_property_value("gap").ok())
            .map(|v| parse_gap(&v))
            .unwrap_or(0.0);

        let offset = slider_offset(
            f64::from(container_width),
            f64::from(card_width),
            gap,
            index,
        );
        let _ = track
            .style()
            .set_property("transform", &format!("translateX({offset}px)"));
    }
}

impl ChatView for DomView {
    fn append(&mut self, message: &Message) {
        self.remove_typing();
        if let Some(el) = self.message_element(message) {
            let _ = self.elements.chat_box.append_child(&el);
        }
        self.scroll_to_bottom();
    }

    fn redraw(&mut self, messages: &[Message]) {
        self.elements.chat_box.set_inner_html("");
        for message in messages {
            if let Some(el) = self.message_element(message) {
                let _ = self.elements.chat_box.append_child(&el);
            }
        }
        self.scroll_to_bottom();
    }

    fn set_typing(&mut self, visible: bool) {
        self.remove_typing();
        if !visible {
            return;
        }
        if let Ok(el) = self.document.create_element("div") {
            el.set_class_name(&format!(
                "{MESSAGE_CLASS} {} {TYPING_CLASS}",
                role_class(Role::Bot)
            ));
            el.set_text_content(Some(TYPING_TEXT));
            let _ = self.elements.chat_box.append_child(&el);
            self.scroll_to_bottom();
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.elements.input.set_disabled(!enabled);
        if let Ok(Some(button)) = self.elements.form.query_selector("button[type=submit]")
            && let Ok(button) = button.dyn_into::<HtmlButtonElement>()
        {
            button.set_disabled(!enabled);
        }
        if enabled {
            let _ = self.elements.input.focus();
        }
    }

    fn render_sidebar(&mut self, entries: &[SidebarEntry]) {
        let list = &self.elements.chat_list;
        list.set_inner_html("");
        for entry in entries {
            let Ok(li) = self.document.create_element("li") else {
                continue;
            };
            li.set_text_content(Some(&entry.title));
            let _ = li.set_attribute(SESSION_ID_ATTR, entry.id.as_str());
            if entry.active {
                li.set_class_name(ACTIVE_ENTRY_CLASS);
            }
            let _ = list.append_child(&li);
        }
    }

    fn render_carousel(&mut self, carousel: &Carousel) {
        for (i, card) in self.elements.card_elements().iter().enumerate() {
            let _ = card
                .class_list()
                .toggle_with_force(CURRENT_CARD_CLASS, i == carousel.index());
        }
        self.elements.prev.set_disabled(!carousel.can_previous());
        self.elements.next.set_disabled(!carousel.can_next());
        self.position_track(carousel.index());
        log(&format!("Chat context set to: {}", carousel.context()));
    }

    fn on_save_failed(&mut self, error: &StoreError) {
        log(&format!("Could not save chats: {error}"));
    }
}
