//! Event wiring between the page and the chat controller.

use std::cell::RefCell;
use std::rc::Rc;

use chat::{Action, Carousel, ChatController, ChatRegistry, Command, RelayClient, Renderer};
use proto::SessionId;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget};

use crate::dom::{DomElements, DomView, SESSION_ID_ATTR};
use crate::fetch::FetchRelayClient;
use crate::log;
use crate::storage::LocalStorage;

type Controller = ChatController<LocalStorage, DomView>;

/// Handle to a mounted chat widget.
#[wasm_bindgen]
pub struct Widget {
    controller: Rc<RefCell<Controller>>,
}

#[wasm_bindgen]
impl Widget {
    /// Context string currently sent with messages.
    pub fn context(&self) -> String {
        self.controller
            .borrow()
            .carousel()
            .context()
            .as_str()
            .to_string()
    }

    /// Number of stored sessions.
    #[wasm_bindgen(js_name = sessionCount)]
    pub fn session_count(&self) -> usize {
        self.controller.borrow().registry().len()
    }

    /// Whether a relay request is in flight.
    #[wasm_bindgen(js_name = isPending)]
    pub fn is_pending(&self) -> bool {
        self.controller.borrow().is_pending()
    }
}

/// Attaches the widget to the page and draws the stored state.
///
/// `relay_url` is where messages are POSTed; `markup` toggles markup
/// rendering of bot replies.
#[wasm_bindgen]
pub fn mount(relay_url: &str, markup: bool) -> Result<Widget, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let elements = DomElements::find(&document)?;
    let carousel = Carousel::new(elements.read_cards());
    let registry = ChatRegistry::load(LocalStorage::open());
    log(&format!(
        "Mounting chat: {} stored session(s), {} game(s)",
        registry.len(),
        carousel.cards().len()
    ));

    let view = DomView::new(document, elements, Renderer::new(markup));
    let controller = Rc::new(RefCell::new(ChatController::new(registry, carousel, view)));
    controller.borrow_mut().render_all();

    let client = Rc::new(FetchRelayClient::new(relay_url));
    attach(&controller, &client, &window)?;

    Ok(Widget { controller })
}

/// Applies `action`; when it asks for the relay, runs the request and
/// feeds the result back. Returns whether a request was started.
fn dispatch(
    controller: &Rc<RefCell<Controller>>,
    client: &Rc<FetchRelayClient>,
    action: Action,
) -> bool {
    let command = controller.borrow_mut().update(action);
    let Command::SendToRelay(request) = command else {
        return false;
    };
    let controller = Rc::clone(controller);
    let client = Rc::clone(client);
    spawn_local(async move {
        let result = client.send(&request).await;
        if let Err(e) = &result {
            log(&format!("Error getting AI response: {e}"));
        }
        controller.borrow_mut().update(Action::RelayCompleted(result));
    });
    true
}

/// Registers a listener for the life of the page.
fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn attach(
    controller: &Rc<RefCell<Controller>>,
    client: &Rc<FetchRelayClient>,
    window: &web_sys::Window,
) -> Result<(), JsValue> {
    let (form, input, new_chat, chat_list, prev, next, cards) = {
        let c = controller.borrow();
        let el = c.view().elements();
        (
            el.form.clone(),
            el.input.clone(),
            el.new_chat.clone(),
            el.chat_list.clone(),
            el.prev.clone(),
            el.next.clone(),
            el.card_elements(),
        )
    };

    {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&form, "submit", move |event| {
            event.prevent_default();
            let text = input.value();
            if dispatch(&controller, &client, Action::Submit(text)) {
                input.set_value("");
            }
        })?;
    }

    {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&new_chat, "click", move |_| {
            dispatch(&controller, &client, Action::NewSession);
        })?;
    }

    {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&chat_list, "click", move |event| {
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("[{SESSION_ID_ATTR}]")).ok().flatten())
                .and_then(|el| el.get_attribute(SESSION_ID_ATTR));
            if let Some(id) = id {
                dispatch(&controller, &client, Action::SelectSession(SessionId(id)));
            }
        })?;
    }

    {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&prev, "click", move |_| {
            dispatch(&controller, &client, Action::CarouselPrevious);
        })?;
    }

    {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&next, "click", move |_| {
            dispatch(&controller, &client, Action::CarouselNext);
        })?;
    }

    for (index, card) in cards.into_iter().enumerate() {
        let (controller, client) = (Rc::clone(controller), Rc::clone(client));
        listen(&card, "click", move |_| {
            dispatch(&controller, &client, Action::CarouselSelect(index));
        })?;
    }

    {
        let controller = Rc::clone(controller);
        listen(window, "resize", move |_| {
            let c = controller.borrow();
            c.view().position_track(c.carousel().index());
        })?;
    }

    Ok(())
}
