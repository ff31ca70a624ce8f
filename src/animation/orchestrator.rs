//! Binds scroll triggers to timelines for every animated part of a page.
//!
//! The orchestrator never touches a document. Callers register sections with
//! their page bounds, feed it scroll positions and clock ticks, and apply the
//! returned [`Frame`]s to whatever is rendering the page.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::easing::Ease;
use super::interactions::{self, Point, Rect};
use super::recorder::{Recorder, ReplaySchedule, ScrollEvent, replay_schedule};
use super::style::{Style, StyleProps};
use super::timeline::{Position, Timeline, TweenVars};
use super::trigger::{Bounds, Offset, ScrollTrigger, TriggerEnd, TriggerEvent, TriggerPoint};

pub const IN_VIEWPORT_CLASS: &str = "in-viewport";
pub const NAV_SCROLLED_CLASS: &str = "nav-scrolled";
pub const DEFAULT_PARALLAX_SPEED: f64 = 0.5;
const PARALLAX_CHASE: f64 = 0.3;
const NAV_END: f64 = 99999.0;

const fn point(element: f64, viewport: Offset) -> TriggerPoint {
    TriggerPoint {
        element: Offset::Fraction(element),
        viewport,
    }
}

const CARD_START: TriggerPoint = point(0.0, Offset::Fraction(0.85));
const CARD_END: TriggerPoint = point(1.0, Offset::Fraction(0.15));
const TEXT_START: TriggerPoint = point(0.0, Offset::Fraction(0.8));
const PARALLAX_START: TriggerPoint = point(0.0, Offset::Fraction(1.0));
const PARALLAX_END: TriggerPoint = point(1.0, Offset::Fraction(0.0));
const NAV_START: TriggerPoint = point(0.0, Offset::Pixels(-80.0));
const SECTION_START: TriggerPoint = point(0.0, Offset::Fraction(0.9));

/// A blog card as laid out on the page
#[derive(Debug, Clone, Default)]
pub struct BlogCardElement {
    /// DOM id; `blog-card-{index}` when absent
    pub id: Option<String>,
    pub bounds: Bounds,
    pub has_image: bool,
    /// Number of heading, paragraph and meta lines inside the card
    pub text_children: usize,
}

/// Key of the card's image in rendered frames
pub fn image_target(card_id: &str) -> String {
    format!("{}/img", card_id)
}

/// Key of the card's `index`th text line in rendered frames
pub fn text_target(card_id: &str, index: usize) -> String {
    format!("{}/text-{}", card_id, index)
}

/// Key of a revealed heading's `index`th word in rendered frames
pub fn word_target(heading_id: &str, index: usize) -> String {
    format!("{}/word-{}", heading_id, index)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap every word of a heading in the masking spans the reveal slides
pub fn split_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            format!(
                "<span class=\"inline-block overflow-hidden\"><span class=\"inline-block\">{}</span></span>",
                escape_html(word)
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassChange {
    pub target: String,
    pub class: String,
    pub present: bool,
}

impl ClassChange {
    fn new(target: &str, class: &str, present: bool) -> Self {
        ClassChange {
            target: target.to_string(),
            class: class.to_string(),
            present,
        }
    }
}

/// Everything that changed on the page after a scroll or a tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub styles: BTreeMap<String, Style>,
    pub class_changes: Vec<ClassChange>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionKind {
    BlogCard,
    TextReveal,
    Parallax { speed: f64 },
    Navigation,
    PageSection,
}

/// A pointer-driven tween layered over a section's own timeline
#[derive(Debug)]
struct Overlay {
    timeline: Timeline,
    mask: StyleProps,
    /// Drop the overlay once it finishes
    settle: bool,
}

#[derive(Debug)]
struct Section {
    id: String,
    kind: SectionKind,
    bounds: Bounds,
    trigger: ScrollTrigger,
    timeline: Timeline,
    overlay: Option<Overlay>,
}

impl Section {
    fn style_of(&self, target: &str) -> Style {
        let mut style = self.timeline.style_of(target);
        if let Some(overlay) = &self.overlay {
            if target == self.id {
                style.apply(&overlay.mask.sample(&overlay.timeline.style_of(target)));
            }
        }
        style
    }

    fn render_into(&self, styles: &mut BTreeMap<String, Style>) {
        for target in self.timeline.targets() {
            styles.insert(target.to_string(), self.style_of(target));
        }
        if self.overlay.is_some() {
            styles.insert(self.id.clone(), self.style_of(&self.id));
        }
    }

    fn tick(&mut self, dt: f64) {
        self.timeline.tick(dt);
        if let Some(overlay) = &mut self.overlay {
            if !overlay.timeline.tick(dt) && overlay.settle {
                self.overlay = None;
            }
        }
    }
}

#[derive(Debug)]
struct Playback {
    schedule: ReplaySchedule,
    initial: HashMap<String, f64>,
    elapsed: f64,
}

#[derive(Debug)]
pub struct ScrollOrchestrator {
    viewport_height: f64,
    scroll_y: f64,
    sections: Vec<Section>,
    cards: usize,
    page_sections: usize,
    recorder: Recorder,
    playback: Option<Playback>,
}

impl ScrollOrchestrator {
    pub fn new(viewport_height: f64) -> Self {
        ScrollOrchestrator {
            viewport_height,
            scroll_y: 0.0,
            sections: Vec::new(),
            cards: 0,
            page_sections: 0,
            recorder: Recorder::new(),
            playback: None,
        }
    }

    fn push(
        &mut self,
        id: String,
        kind: SectionKind,
        bounds: Bounds,
        trigger: ScrollTrigger,
        timeline: Timeline,
    ) {
        log::debug!("registered {:?} section {}", kind, id);
        self.sections.push(Section {
            id,
            kind,
            bounds,
            trigger,
            timeline,
            overlay: None,
        });
    }

    /// Scrubbed entrance for a blog card. Returns the card's section id.
    pub fn add_blog_card(&mut self, card: BlogCardElement) -> String {
        let id = card
            .id
            .unwrap_or_else(|| format!("blog-card-{}", self.cards));
        self.cards += 1;

        let mut timeline = Timeline::new();
        timeline
            .set(
                &id,
                StyleProps::default()
                    .opacity(0.0)
                    .y(100.0)
                    .scale(0.9)
                    .rotation_x(15.0),
            )
            .to(
                &[&id],
                TweenVars::new(
                    StyleProps::default()
                        .opacity(1.0)
                        .y(0.0)
                        .scale(1.0)
                        .rotation_x(0.0),
                    1.2,
                    Ease::BackOut(1.7),
                ),
                Position::End,
            );
        if card.has_image {
            timeline.to(
                &[image_target(&id)],
                TweenVars::new(StyleProps::default().scale(1.0), 1.5, Ease::Power2Out),
                Position::At(0.0),
            );
        }
        if card.text_children > 0 {
            let texts: Vec<String> = (0..card.text_children)
                .map(|i| text_target(&id, i))
                .collect();
            timeline.from(
                &texts,
                TweenVars::new(
                    StyleProps::default().y(30.0).opacity(0.0),
                    0.8,
                    Ease::Power3Out,
                )
                .stagger(0.1),
                Position::At(0.3),
            );
        }

        let trigger = ScrollTrigger::new(
            card.bounds,
            CARD_START,
            TriggerEnd::Point(CARD_END),
            self.viewport_height,
        );
        self.push(id.clone(), SectionKind::BlogCard, card.bounds, trigger, timeline);
        id
    }

    /// Word-by-word reveal for a heading. Returns the heading's new inner
    /// markup, or `None` for hero titles, which are left alone.
    pub fn add_text_reveal(
        &mut self,
        id: &str,
        text: &str,
        bounds: Bounds,
        is_hero: bool,
    ) -> Option<String> {
        if is_hero {
            return None;
        }
        let words: Vec<String> = (0..text.split_whitespace().count())
            .map(|i| word_target(id, i))
            .collect();

        let mut timeline = Timeline::new();
        for word in &words {
            timeline.set(word, StyleProps::default().y_percent(100.0));
        }
        timeline.to(
            &words,
            TweenVars::new(
                StyleProps::default().y_percent(0.0),
                0.8,
                Ease::Power3Out,
            )
            .stagger(0.05),
            Position::At(0.0),
        );

        let trigger = ScrollTrigger::new(
            bounds,
            TEXT_START,
            TriggerEnd::default(),
            self.viewport_height,
        );
        self.push(id.to_string(), SectionKind::TextReveal, bounds, trigger, timeline);
        Some(split_words(text))
    }

    /// Drift an image while it crosses the viewport. Images inside the hero
    /// are skipped; returns whether the image was registered.
    pub fn add_parallax(&mut self, id: &str, bounds: Bounds, speed: Option<f64>, in_hero: bool) -> bool {
        if in_hero {
            return false;
        }
        let speed = speed
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_PARALLAX_SPEED);
        let trigger = ScrollTrigger::new(
            bounds,
            PARALLAX_START,
            TriggerEnd::Point(PARALLAX_END),
            self.viewport_height,
        );
        self.push(
            id.to_string(),
            SectionKind::Parallax { speed },
            bounds,
            trigger,
            Timeline::new(),
        );
        true
    }

    /// Toggle the compact navigation style once the page scrolls past 80px
    pub fn add_navigation(&mut self, id: &str) {
        let bounds = Bounds::default();
        let trigger = ScrollTrigger::new(
            bounds,
            NAV_START,
            TriggerEnd::Absolute(NAV_END),
            self.viewport_height,
        );
        self.push(id.to_string(), SectionKind::Navigation, bounds, trigger, Timeline::new());
    }

    /// Fade a page section up the first time it scrolls into view
    pub fn add_page_section(&mut self, id: &str, bounds: Bounds) {
        let index = self.page_sections;
        self.page_sections += 1;

        let mut timeline = Timeline::new();
        timeline.from(
            &[id],
            TweenVars::new(
                StyleProps::default().opacity(0.0).y(50.0),
                1.0,
                Ease::Power3Out,
            )
            .delay(index as f64 * 0.1),
            Position::At(0.0),
        );
        let trigger = ScrollTrigger::new(
            bounds,
            SECTION_START,
            TriggerEnd::default(),
            self.viewport_height,
        )
        .once();
        self.push(id.to_string(), SectionKind::PageSection, bounds, trigger, timeline);
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.id.as_str())
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Styles of every registered target before any scrolling
    pub fn initial_frame(&self) -> Frame {
        Frame {
            styles: self.render(),
            class_changes: Vec::new(),
        }
    }

    fn render(&self) -> BTreeMap<String, Style> {
        let mut styles = BTreeMap::new();
        for section in &self.sections {
            section.render_into(&mut styles);
        }
        styles
    }

    /// Feed a new scroll position; `now` is the clock in milliseconds
    pub fn on_scroll(&mut self, scroll_y: f64, now: f64) -> Frame {
        self.scroll_y = scroll_y;
        let mut class_changes = Vec::new();

        for section in &mut self.sections {
            for event in section.trigger.update(scroll_y) {
                match (section.kind, event) {
                    (SectionKind::BlogCard, TriggerEvent::Update(progress)) => {
                        section.timeline.set_progress(progress);
                        let visibility =
                            section.bounds.visible_fraction(scroll_y, self.viewport_height);
                        self.recorder
                            .record(now, &section.id, scroll_y, progress, visibility);
                    }
                    (SectionKind::Parallax { speed }, TriggerEvent::Update(progress)) => {
                        let current = section.timeline.style_of(&section.id);
                        let timeline = &mut section.timeline;
                        timeline.kill();
                        timeline
                            .set(&section.id, StyleProps::default().y(current.y))
                            .to(
                                &[&section.id],
                                TweenVars::new(
                                    StyleProps::default().y(progress * 100.0 * speed),
                                    PARALLAX_CHASE,
                                    Ease::None,
                                ),
                                Position::At(0.0),
                            )
                            .play();
                    }
                    (SectionKind::TextReveal | SectionKind::PageSection, TriggerEvent::Enter) => {
                        section.timeline.play();
                    }
                    (kind, TriggerEvent::Enter | TriggerEvent::EnterBack) => {
                        if let Some(class) = toggled_class(kind) {
                            class_changes.push(ClassChange::new(&section.id, class, true));
                        }
                    }
                    (kind, TriggerEvent::Leave | TriggerEvent::LeaveBack) => {
                        if let Some(class) = toggled_class(kind) {
                            class_changes.push(ClassChange::new(&section.id, class, false));
                        }
                    }
                    _ => {}
                }
            }
        }

        Frame {
            styles: self.render(),
            class_changes,
        }
    }

    /// Advance played timelines, pointer tweens and any replay by `dt` seconds
    pub fn tick(&mut self, dt: f64) -> Frame {
        for section in &mut self.sections {
            section.tick(dt);
        }
        if let Some(playback) = &mut self.playback {
            playback.elapsed += dt;
        }
        self.scrub_playback();
        Frame {
            styles: self.render(),
            class_changes: Vec::new(),
        }
    }

    /// Recompute trigger ranges after the viewport changed size
    pub fn resize(&mut self, viewport_height: f64) {
        self.viewport_height = viewport_height;
        for section in &mut self.sections {
            section.trigger.refresh(viewport_height);
        }
    }

    fn pointer_tween(&mut self, id: &str, vars: TweenVars, settle: bool) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == id) else {
            return false;
        };
        let current = section.style_of(id);
        let mut timeline = Timeline::new();
        timeline
            .set(id, vars.props.sample(&current))
            .to(&[id], vars, Position::At(0.0))
            .play();
        section.overlay = Some(Overlay {
            timeline,
            mask: vars.props,
            settle,
        });
        true
    }

    /// Lift a blog card under the pointer, or settle it when `entering` is false
    pub fn hover(&mut self, card_id: &str, entering: bool) -> bool {
        let is_card = self
            .sections
            .iter()
            .any(|s| s.id == card_id && s.kind == SectionKind::BlogCard);
        if !is_card {
            return false;
        }
        if entering {
            self.pointer_tween(card_id, interactions::hover_enter(), false)
        } else {
            self.pointer_tween(card_id, interactions::hover_leave(), true)
        }
    }

    /// Pull a section towards the pointer
    pub fn magnet(&mut self, id: &str, rect: &Rect, pointer: Point, strength: Option<f64>) -> bool {
        let strength = strength.unwrap_or(interactions::MAGNETIC_STRENGTH);
        self.pointer_tween(id, interactions::magnetic_offset(rect, pointer, strength), false)
    }

    pub fn release_magnet(&mut self, id: &str) -> bool {
        self.pointer_tween(id, interactions::magnetic_release(), true)
    }

    pub fn start_recording(&mut self, now: f64) {
        self.recorder.start(now);
    }

    pub fn stop_recording(&mut self) -> Vec<ScrollEvent> {
        self.recorder.stop()
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    fn is_card(&self, id: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.id == id && s.kind == SectionKind::BlogCard)
    }

    /// Replay `events` (the current recording when `None`) by scrubbing
    /// card timelines from [`tick`](Self::tick) or
    /// [`apply_replay`](Self::apply_replay)
    pub fn replay(&mut self, events: Option<&[ScrollEvent]>, speed: f64) -> Option<ReplaySchedule> {
        let events = events.unwrap_or(self.recorder.events());
        let schedule = replay_schedule(events, speed, |id| self.is_card(id))?;
        let initial = self
            .sections
            .iter()
            .filter(|s| s.kind == SectionKind::BlogCard)
            .map(|s| (s.id.clone(), s.timeline.progress()))
            .collect();
        self.playback = Some(Playback {
            schedule: schedule.clone(),
            initial,
            elapsed: 0.0,
        });
        Some(schedule)
    }

    /// Jump the running replay to `t` seconds
    pub fn apply_replay(&mut self, t: f64) -> Frame {
        if let Some(playback) = &mut self.playback {
            playback.elapsed = t.max(0.0);
        }
        self.scrub_playback();
        Frame {
            styles: self.render(),
            class_changes: Vec::new(),
        }
    }

    pub fn is_replaying(&self) -> bool {
        self.playback.is_some()
    }

    fn scrub_playback(&mut self) {
        let Some(playback) = &self.playback else {
            return;
        };
        for section in &mut self.sections {
            let initial = playback.initial.get(&section.id).copied().unwrap_or(0.0);
            if let Some(p) = playback
                .schedule
                .progress_at(&section.id, playback.elapsed, initial)
            {
                section.timeline.set_progress(p);
            }
        }
        if playback.elapsed >= playback.schedule.duration() {
            self.playback = None;
        }
    }

    /// Kill every trigger and timeline and forget all recorded events
    pub fn destroy(&mut self) {
        for section in &mut self.sections {
            section.trigger.kill();
            section.timeline.kill();
        }
        self.sections.clear();
        self.cards = 0;
        self.page_sections = 0;
        self.recorder.clear();
        self.playback = None;
    }
}

fn toggled_class(kind: SectionKind) -> Option<&'static str> {
    match kind {
        SectionKind::BlogCard => Some(IN_VIEWPORT_CLASS),
        SectionKind::Navigation => Some(NAV_SCROLLED_CLASS),
        _ => None,
    }
}
