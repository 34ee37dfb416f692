//! Page integration for the web build.
//!
//! Menu links are found by CSS selector, measured once and wired up with
//! `click`, `mouseenter` and `mouseleave` listeners. Listeners only forward
//! events to the winit loop; the stage answers with `enter`/`leave` custom
//! events dispatched on the document.

use wasm_bindgen::{JsCast, prelude::*};
use web_sys::{CustomEvent, CustomEventInit, Document, HtmlElement};
use winit::event_loop::EventLoopProxy;

use crate::{
    config::MenuConfig,
    flow::FlowEvent,
    menu::{ElementRect, HitboxId, LabelStyle, MenuElement, MenuEvent, Viewport},
};

fn document() -> anyhow::Result<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| anyhow::anyhow!("no document"))
}

/// Size of the browser window in CSS pixels.
pub fn viewport() -> Option<Viewport> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(width as f32, height as f32))
}

fn listen(
    element: &HtmlElement,
    kind: &str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> anyhow::Result<()> {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    element
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(|e| anyhow::anyhow!("could not listen for {kind}: {e:?}"))?;
    // The page owns the listener from here on.
    closure.forget();
    Ok(())
}

/// Reads every menu link and forwards its pointer events to `proxy`.
///
/// Elements that are not attached to the page get no rect and therefore no
/// hitbox.
pub fn menu_elements(
    config: &MenuConfig,
    proxy: EventLoopProxy<FlowEvent>,
) -> anyhow::Result<Vec<MenuElement>> {
    let nodes = document()?
        .query_selector_all(&config.selector)
        .map_err(|e| anyhow::anyhow!("bad selector {:?}: {e:?}", config.selector))?;

    let mut elements = Vec::with_capacity(nodes.length() as usize);
    for idx in 0..nodes.length() {
        let Some(element) = nodes
            .get(idx)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        let id = HitboxId(idx);
        let rect = element.is_connected().then(|| {
            let rect = element.get_bounding_client_rect();
            ElementRect {
                left: rect.left() as f32,
                top: rect.top() as f32,
                width: rect.width() as f32,
                height: rect.height() as f32,
            }
        });
        let style = if element.id() == config.sub_id {
            LabelStyle::Sub
        } else {
            LabelStyle::Primary
        };

        let p = proxy.clone();
        listen(&element, "click", move |event| {
            event.prevent_default();
            let _ = p.send_event(FlowEvent::Click(id));
        })?;
        let p = proxy.clone();
        listen(&element, "mouseenter", move |_| {
            let _ = p.send_event(FlowEvent::Enter(id));
        })?;
        let p = proxy.clone();
        listen(&element, "mouseleave", move |_| {
            let _ = p.send_event(FlowEvent::Leave(id));
        })?;

        elements.push(MenuElement {
            id,
            label: element.inner_text(),
            style,
            rect,
        });
    }
    Ok(elements)
}

/// Announces a hitbox change to the page as a `CustomEvent` whose `detail` is
/// the hitbox id.
pub fn dispatch(event: MenuEvent) -> anyhow::Result<()> {
    let init = CustomEventInit::new();
    init.set_detail(&JsValue::from(event.id().0));
    let custom = CustomEvent::new_with_event_init_dict(event.name(), &init)
        .map_err(|e| anyhow::anyhow!("could not create {} event: {e:?}", event.name()))?;
    document()?
        .dispatch_event(&custom)
        .map_err(|e| anyhow::anyhow!("could not dispatch {}: {e:?}", event.name()))?;
    Ok(())
}
