//! Browser bindings for the animation engine.
//!
//! Frames and traces cross the boundary as JSON strings; the page script
//! parses them and applies styles and classes to the matching elements.

use wasm_bindgen::prelude::*;

use crate::animation::interactions::{Point, Rect, Ripple};
use crate::animation::trigger::Bounds;
use crate::animation::{BlogCardElement, Frame, ScrollEvent, ScrollOrchestrator};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn frame_json(frame: &Frame) -> Result<String, JsValue> {
    serde_json::to_string(frame).map_err(to_js)
}

#[wasm_bindgen]
pub struct ScrollAnimations {
    inner: ScrollOrchestrator,
}

#[wasm_bindgen]
impl ScrollAnimations {
    #[wasm_bindgen(constructor)]
    pub fn new(viewport_height: f64) -> ScrollAnimations {
        ScrollAnimations {
            inner: ScrollOrchestrator::new(viewport_height),
        }
    }

    /// Returns the id the card's frames are keyed on
    #[wasm_bindgen(js_name = addBlogCard)]
    pub fn add_blog_card(
        &mut self,
        id: Option<String>,
        top: f64,
        height: f64,
        has_image: bool,
        text_children: usize,
    ) -> String {
        self.inner.add_blog_card(BlogCardElement {
            id,
            bounds: Bounds::new(top, height),
            has_image,
            text_children,
        })
    }

    /// Returns the heading's replacement markup, or nothing for hero titles
    #[wasm_bindgen(js_name = addTextReveal)]
    pub fn add_text_reveal(
        &mut self,
        id: &str,
        text: &str,
        top: f64,
        height: f64,
        is_hero: bool,
    ) -> Option<String> {
        self.inner
            .add_text_reveal(id, text, Bounds::new(top, height), is_hero)
    }

    #[wasm_bindgen(js_name = addParallax)]
    pub fn add_parallax(
        &mut self,
        id: &str,
        top: f64,
        height: f64,
        speed: Option<f64>,
        in_hero: bool,
    ) -> bool {
        self.inner
            .add_parallax(id, Bounds::new(top, height), speed, in_hero)
    }

    #[wasm_bindgen(js_name = addNavigation)]
    pub fn add_navigation(&mut self, id: &str) {
        self.inner.add_navigation(id);
    }

    #[wasm_bindgen(js_name = addPageSection)]
    pub fn add_page_section(&mut self, id: &str, top: f64, height: f64) {
        self.inner.add_page_section(id, Bounds::new(top, height));
    }

    #[wasm_bindgen(js_name = initialFrame)]
    pub fn initial_frame(&self) -> Result<String, JsValue> {
        frame_json(&self.inner.initial_frame())
    }

    #[wasm_bindgen(js_name = onScroll)]
    pub fn on_scroll(&mut self, scroll_y: f64) -> Result<String, JsValue> {
        frame_json(&self.inner.on_scroll(scroll_y, js_sys::Date::now()))
    }

    /// Advance by `dt` seconds, typically from `requestAnimationFrame`
    pub fn tick(&mut self, dt: f64) -> Result<String, JsValue> {
        frame_json(&self.inner.tick(dt))
    }

    pub fn resize(&mut self, viewport_height: f64) {
        self.inner.resize(viewport_height);
    }

    pub fn hover(&mut self, card_id: &str, entering: bool) -> bool {
        self.inner.hover(card_id, entering)
    }

    /// Pull a section towards the pointer; `rect` is the element's viewport box
    #[allow(clippy::too_many_arguments)]
    pub fn magnet(
        &mut self,
        id: &str,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        pointer_x: f64,
        pointer_y: f64,
        strength: Option<f64>,
    ) -> bool {
        let rect = Rect {
            left,
            top,
            width,
            height,
        };
        let pointer = Point {
            x: pointer_x,
            y: pointer_y,
        };
        self.inner.magnet(id, &rect, pointer, strength)
    }

    #[wasm_bindgen(js_name = releaseMagnet)]
    pub fn release_magnet(&mut self, id: &str) -> bool {
        self.inner.release_magnet(id)
    }

    /// Inline style for a click ripple inside the clicked element
    pub fn ripple(
        &self,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
        click_x: f64,
        click_y: f64,
    ) -> String {
        let rect = Rect {
            left,
            top,
            width,
            height,
        };
        Ripple::at(&rect, Point { x: click_x, y: click_y }).to_css()
    }

    #[wasm_bindgen(js_name = startRecording)]
    pub fn start_recording(&mut self) {
        self.inner.start_recording(js_sys::Date::now());
    }

    /// Stop recording and return the captured events as JSON
    #[wasm_bindgen(js_name = stopRecording)]
    pub fn stop_recording(&mut self) -> Result<String, JsValue> {
        let events = self.inner.stop_recording();
        serde_json::to_string(&events).map_err(to_js)
    }

    #[wasm_bindgen(js_name = exportEvents)]
    pub fn export_events(&self) -> Result<String, JsValue> {
        self.inner.recorder().export_json().map_err(to_js)
    }

    /// Replace the recorded events; returns how many were imported
    #[wasm_bindgen(js_name = importEvents)]
    pub fn import_events(&mut self, json: &str) -> Result<usize, JsValue> {
        self.inner
            .recorder_mut()
            .import_json(json)
            .map(|events| events.len())
            .map_err(to_js)
    }

    /// Start replaying the recorded events; drive it with `tick`.
    /// Returns the schedule as JSON, or nothing when there is nothing to replay.
    pub fn replay(&mut self, speed: f64) -> Result<Option<String>, JsValue> {
        self.inner
            .replay(None, speed)
            .map(|schedule| serde_json::to_string(&schedule).map_err(to_js))
            .transpose()
    }

    /// Replay events exported elsewhere instead of the recorder's own
    #[wasm_bindgen(js_name = replayEvents)]
    pub fn replay_events(&mut self, json: &str, speed: f64) -> Result<Option<String>, JsValue> {
        let events: Vec<ScrollEvent> = serde_json::from_str(json).map_err(to_js)?;
        self.inner
            .replay(Some(&events), speed)
            .map(|schedule| serde_json::to_string(&schedule).map_err(to_js))
            .transpose()
    }

    /// Jump the running replay to `t` seconds
    #[wasm_bindgen(js_name = applyReplay)]
    pub fn apply_replay(&mut self, t: f64) -> Result<String, JsValue> {
        frame_json(&self.inner.apply_replay(t))
    }

    #[wasm_bindgen(js_name = isReplaying)]
    pub fn is_replaying(&self) -> bool {
        self.inner.is_replaying()
    }

    pub fn destroy(&mut self) {
        self.inner.destroy();
    }
}
