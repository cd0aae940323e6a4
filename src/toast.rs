//! Timed visibility lifecycle of the toasts present on a page.
//!
//! Every toast found at setup walks `Pending -> Shown -> Hiding -> Removed`.
//! The scheduler keeps one explicit state per toast and is advanced on a
//! virtual clock measured from the setup call, so the same machine drives
//! tokio timers, browser timeouts and tests.

use std::fmt::{self, Display};
use std::time::Duration;

use tracing::{debug, info};

use crate::page::{Document, Element};
use crate::types::PageSelectors;

pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);
pub const DEFAULT_HIDE_AFTER: Duration = Duration::from_millis(4_000);
pub const DEFAULT_REMOVAL_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ToastTiming {
    /// Onset offset per ordinal: toast `i` shows at `stagger * (i + 1)`.
    pub stagger: Duration,
    /// Hide mark, shared by every toast of one setup call.
    pub hide_after: Duration,
    /// Delay between hiding and detaching.
    pub removal_delay: Duration,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            stagger: DEFAULT_STAGGER,
            hide_after: DEFAULT_HIDE_AFTER,
            removal_delay: DEFAULT_REMOVAL_DELAY,
        }
    }
}

impl ToastTiming {
    #[must_use]
    pub fn show_at(&self, ordinal: usize) -> Duration {
        let factor = u32::try_from(ordinal.saturating_add(1)).unwrap_or(u32::MAX);
        self.stagger.saturating_mul(factor)
    }

    /// Never earlier than the onset, so a late toast is still shown before
    /// it hides.
    #[must_use]
    pub fn hide_at(&self, ordinal: usize) -> Duration {
        self.hide_after.max(self.show_at(ordinal))
    }

    #[must_use]
    pub fn remove_at(&self, ordinal: usize) -> Duration {
        self.hide_at(ordinal).saturating_add(self.removal_delay)
    }
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum ToastPhase {
    Pending,
    Shown,
    Hiding,
    Removed,
}

impl ToastPhase {
    const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Shown),
            Self::Shown => Some(Self::Hiding),
            Self::Hiding => Some(Self::Removed),
            Self::Removed => None,
        }
    }
}

impl Display for ToastPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Shown => "shown",
            Self::Hiding => "hiding",
            Self::Removed => "removed",
        })
    }
}

struct Track<E> {
    ordinal: usize,
    element: E,
    phase: ToastPhase,
    show_at: Duration,
    hide_at: Duration,
    remove_at: Duration,
}

impl<E> Track<E> {
    /// When the next transition is due, `None` once removed.
    const fn due(&self) -> Option<Duration> {
        match self.phase {
            ToastPhase::Pending => Some(self.show_at),
            ToastPhase::Shown => Some(self.hide_at),
            ToastPhase::Hiding => Some(self.remove_at),
            ToastPhase::Removed => None,
        }
    }
}

pub struct ToastScheduler<E> {
    tracks: Vec<Track<E>>,
    shown_class: String,
    elapsed: Duration,
}

impl<E: Element> ToastScheduler<E> {
    /// Schedules `elements` in the given order; the position in the slice is
    /// the toast's ordinal.
    pub fn new(elements: Vec<E>, shown_class: impl Into<String>, timing: ToastTiming) -> Self {
        let tracks = elements
            .into_iter()
            .enumerate()
            .map(|(ordinal, element)| Track {
                ordinal,
                element,
                phase: ToastPhase::Pending,
                show_at: timing.show_at(ordinal),
                hide_at: timing.hide_at(ordinal),
                remove_at: timing.remove_at(ordinal),
            })
            .collect();
        Self {
            tracks,
            shown_class: shown_class.into(),
            elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[must_use]
    pub fn phase(&self, ordinal: usize) -> Option<ToastPhase> {
        self.tracks.get(ordinal).map(|track| track.phase)
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.tracks.iter().all(|t| t.phase == ToastPhase::Removed)
    }

    /// Earliest pending transition, measured from the setup call.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tracks.iter().filter_map(Track::due).min()
    }

    /// Applies every transition due at or before `elapsed`, earliest first,
    /// lower ordinal first on ties. Returns how many were applied.
    pub fn advance_to(&mut self, elapsed: Duration) -> usize {
        self.elapsed = self.elapsed.max(elapsed);
        let mut applied = 0;
        while let Some(index) = self.next_due_index() {
            self.step(index);
            applied += 1;
        }
        applied
    }

    fn next_due_index(&self) -> Option<usize> {
        self.tracks
            .iter()
            .enumerate()
            .filter_map(|(index, track)| track.due().map(|due| (due, track.ordinal, index)))
            .filter(|(due, _, _)| *due <= self.elapsed)
            .min()
            .map(|(_, _, index)| index)
    }

    fn step(&mut self, index: usize) {
        let Some(track) = self.tracks.get_mut(index) else {
            return;
        };
        let Some(next) = track.phase.next() else {
            return;
        };
        match next {
            ToastPhase::Shown => track.element.add_class(&self.shown_class),
            ToastPhase::Hiding => track.element.remove_class(&self.shown_class),
            ToastPhase::Removed => {
                if track.element.has_parent() {
                    track.element.detach();
                } else {
                    debug!(toast = track.ordinal, "toast already detached");
                }
            }
            ToastPhase::Pending => {}
        }
        track.phase = next;
        info!(
            toast = track.ordinal,
            phase = %next,
            elapsed_ms = u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
            "toast transition"
        );
    }

    /// Drives the lifecycle on tokio timers until every toast is removed.
    #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
    pub async fn run(mut self) {
        let start = tokio::time::Instant::now();
        while let Some(deadline) = self.next_deadline() {
            let Some(at) = start.checked_add(deadline) else {
                debug!(
                    deadline_s = deadline.as_secs(),
                    "next toast transition lies beyond the clock range, never firing"
                );
                return std::future::pending().await;
            };
            tokio::time::sleep_until(at).await;
            self.advance_to(start.elapsed());
        }
        debug!(toasts = self.len(), "toast lifecycle complete");
    }
}

/// Discovers the page's toasts and schedules their lifecycle. Nothing is
/// scheduled when the page has none.
pub fn process_toast_notifications<D: Document>(
    document: &D,
    selectors: &PageSelectors,
    timing: ToastTiming,
) -> ToastScheduler<D::Element> {
    let toasts = document.elements_by_class(&selectors.toast_class);
    if !toasts.is_empty() {
        info!(
            toasts = toasts.len(),
            class = %selectors.toast_class,
            "scheduling toast lifecycle"
        );
    }
    ToastScheduler::new(toasts, selectors.shown_class.clone(), timing)
}

#[cfg(test)]
mod tests {
    use super::{ToastPhase, ToastScheduler, ToastTiming, process_toast_notifications};
    use crate::page::{Element, MemoryDocument};
    use crate::types::PageSelectors;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::time::Duration;

    /// Element double that journals every call with the virtual time.
    #[derive(Clone)]
    struct Recorder {
        name: &'static str,
        attached: Rc<Cell<bool>>,
        clock: Rc<Cell<Duration>>,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn note(&self, what: &str) {
            let at = humantime::format_duration(self.clock.get());
            self.journal
                .borrow_mut()
                .push(format!("{at} {} {what}", self.name));
        }
    }

    impl Element for Recorder {
        fn add_class(&self, class: &str) {
            self.note(&format!("add {class}"));
        }
        fn remove_class(&self, class: &str) {
            self.note(&format!("remove {class}"));
        }
        fn has_class(&self, _class: &str) -> bool {
            false
        }
        fn has_parent(&self) -> bool {
            self.attached.get()
        }
        fn detach(&self) {
            self.attached.set(false);
            self.note("detach");
        }
        fn set_text(&self, _text: &str) {}
        fn add_click_listener(&self, _listener: Box<dyn Fn()>) {}
    }

    struct Harness {
        clock: Rc<Cell<Duration>>,
        journal: Rc<RefCell<Vec<String>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: Rc::new(Cell::new(Duration::ZERO)),
                journal: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn toast(&self, name: &'static str, attached: bool) -> Recorder {
            Recorder {
                name,
                attached: Rc::new(Cell::new(attached)),
                clock: Rc::clone(&self.clock),
                journal: Rc::clone(&self.journal),
            }
        }

        fn drain(&self, scheduler: &mut ToastScheduler<Recorder>) -> String {
            while let Some(deadline) = scheduler.next_deadline() {
                self.clock.set(deadline);
                scheduler.advance_to(deadline);
            }
            self.journal.borrow().join("\n")
        }
    }

    #[test]
    fn two_toasts_stagger_onset_and_share_hide_mark() {
        let h = Harness::new();
        let mut scheduler = ToastScheduler::new(
            vec![h.toast("a", true), h.toast("b", true)],
            "show",
            ToastTiming::default(),
        );
        insta::assert_snapshot!(h.drain(&mut scheduler), @r"
        100ms a add show
        200ms b add show
        4s a remove show
        4s b remove show
        4s 500ms a detach
        4s 500ms b detach
        ");
        assert!(scheduler.is_finished());
    }

    #[test]
    fn detached_toast_skips_removal_call() {
        let h = Harness::new();
        let mut scheduler =
            ToastScheduler::new(vec![h.toast("orphan", false)], "show", ToastTiming::default());
        insta::assert_snapshot!(h.drain(&mut scheduler), @r"
        100ms orphan add show
        4s orphan remove show
        ");
        assert_eq!(scheduler.phase(0), Some(ToastPhase::Removed));
    }

    #[test]
    fn phases_follow_the_clock() {
        let h = Harness::new();
        let mut scheduler = ToastScheduler::new(
            vec![h.toast("a", true), h.toast("b", true), h.toast("c", true)],
            "show",
            ToastTiming::default(),
        );

        assert_eq!(scheduler.advance_to(Duration::from_millis(99)), 0);
        assert_eq!(scheduler.phase(0), Some(ToastPhase::Pending));

        assert_eq!(scheduler.advance_to(Duration::from_millis(300)), 3);
        assert_eq!(scheduler.phase(2), Some(ToastPhase::Shown));

        scheduler.advance_to(Duration::from_millis(3_999));
        assert_eq!(scheduler.phase(1), Some(ToastPhase::Shown));

        scheduler.advance_to(Duration::from_millis(4_000));
        assert_eq!(scheduler.phase(0), Some(ToastPhase::Hiding));
        assert_eq!(scheduler.phase(2), Some(ToastPhase::Hiding));
        assert_eq!(scheduler.next_deadline(), Some(Duration::from_millis(4_500)));

        scheduler.advance_to(Duration::from_millis(4_500));
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn jumping_past_every_deadline_keeps_phase_order() {
        let h = Harness::new();
        let mut scheduler =
            ToastScheduler::new(vec![h.toast("a", true)], "show", ToastTiming::default());
        assert_eq!(scheduler.advance_to(Duration::from_secs(60)), 3);
        insta::assert_snapshot!(h.journal.borrow().join("\n"), @r"
        0s a add show
        0s a remove show
        0s a detach
        ");
    }

    #[test]
    fn late_ordinals_are_shown_before_hiding() {
        let timing = ToastTiming::default();
        assert_eq!(timing.show_at(0), Duration::from_millis(100));
        assert_eq!(timing.hide_at(0), Duration::from_millis(4_000));
        assert_eq!(timing.remove_at(0), Duration::from_millis(4_500));
        assert_eq!(timing.hide_at(38), Duration::from_millis(4_000));
        assert_eq!(timing.show_at(49), Duration::from_millis(5_000));
        assert_eq!(timing.hide_at(49), Duration::from_millis(5_000));
        assert_eq!(timing.remove_at(49), Duration::from_millis(5_500));

        let h = Harness::new();
        let toasts: Vec<_> = (0..50).map(|_| h.toast("t", true)).collect();
        let mut scheduler = ToastScheduler::new(toasts, "show", timing);
        h.drain(&mut scheduler);
        let journal = h.journal.borrow();
        assert_eq!(journal.len(), 150);
        assert_eq!(journal.last().map(String::as_str), Some("5s 500ms t detach"));
    }

    #[test]
    fn empty_page_schedules_nothing() {
        let doc = MemoryDocument::new();
        let scheduler =
            process_toast_notifications(&doc, &PageSelectors::default(), ToastTiming::default());
        assert!(scheduler.is_empty());
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn memory_toasts_are_removed_from_the_page() {
        let doc = MemoryDocument::new();
        for _ in 0..2 {
            doc.body()
                .append_child(&doc.create_element(None, &["toast-notification"]));
        }
        let selectors = PageSelectors::default();
        let mut scheduler = process_toast_notifications(&doc, &selectors, ToastTiming::default());
        assert_eq!(scheduler.len(), 2);

        scheduler.advance_to(Duration::from_millis(300));
        assert!(doc.body().children().iter().all(|t| t.has_class("show")));

        scheduler.advance_to(Duration::from_millis(4_000));
        assert!(doc.body().children().iter().all(|t| !t.has_class("show")));
        assert_eq!(doc.body().children().len(), 2);

        scheduler.advance_to(Duration::from_millis(4_500));
        assert!(doc.body().children().is_empty());
    }
}
