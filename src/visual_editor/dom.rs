//! Browser lookups the virtual DOM does not expose. No-ops off the web.

#[cfg(target_arch = "wasm32")]
fn element(dom_id: &str) -> Option<web_sys::Element> {
    web_sys::window()?.document()?.get_element_by_id(dom_id)
}

/// Whether `client_y` lies in the lower half of the element, which means a
/// drop lands after it rather than before.
pub fn pointer_below_middle(dom_id: &str, client_y: f64) -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        element(dom_id)
            .map(|el| {
                let rect = el.get_bounding_client_rect();
                client_y > rect.top() + rect.height() / 2.0
            })
            .unwrap_or(false)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (dom_id, client_y);
        false
    }
}

/// Give keyboard focus to a block's chrome so Delete works right away.
pub fn focus(dom_id: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let Some(el) = element(dom_id).and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            tracing::debug!(dom_id, "focus target not mounted");
            return;
        };
        if let Err(err) = el.focus() {
            tracing::debug!(dom_id, ?err, "focus failed");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = dom_id;
    }
}
