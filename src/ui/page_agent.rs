use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::app::{BridgeClient, BridgeError, PendingRewrite};
use crate::domain::{BRIDGE_FAILURE_MESSAGE, RewriteKind, RewriteRequest, RewriteResult};
use crate::infra::settings_store::SettingsStore;

use super::element::ElementInfo;
use super::widget::{AssistantWidget, WidgetState, WidgetTransitionError};

pub const NO_INPUT_TEXT_MESSAGE: &str = "Please select some text or focus on a text field";
pub const NO_ACTIVE_FIELD_MESSAGE: &str = "No active text field found";

const MIN_SELECTION_CHARS: usize = 10;

/// Host page operations. `set_element_value` must also notify the page that
/// the value changed (an `input` event in a browser).
pub trait PageSurface {
    type Element: Clone;

    fn element_info(&self, element: &Self::Element) -> ElementInfo;

    fn selected_text(&self) -> String;

    fn element_value(&self, element: &Self::Element) -> String;

    fn replace_selection(&mut self, text: &str);

    fn set_element_value(&mut self, element: &Self::Element, text: &str);

    fn write_clipboard(&mut self, text: &str) -> Result<(), String>;
}

/// Where a page event landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTarget<E> {
    Widget,
    Element(E),
    Document,
}

struct InFlightCall {
    pending: PendingRewrite,
}

pub struct PageAgent<S: PageSurface> {
    surface: S,
    bridge: BridgeClient,
    settings: Arc<dyn SettingsStore>,
    widget: AssistantWidget,
    active_element: Option<S::Element>,
    current_call: Option<u64>,
    in_flight: Vec<InFlightCall>,
}

impl<S: PageSurface> PageAgent<S> {
    pub fn new(surface: S, bridge: BridgeClient, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            surface,
            bridge,
            settings,
            widget: AssistantWidget::new(),
            active_element: None,
            current_call: None,
            in_flight: Vec::new(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        self.widget.state()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn on_focus_in(&mut self, element: S::Element) {
        if self.surface.element_info(&element).is_text_input() {
            self.active_element = Some(element);
            self.activate();
        }
    }

    pub fn on_focus_out(&mut self, next_focus: EventTarget<S::Element>) {
        if !self.keeps_widget_open(&next_focus) {
            self.widget.hide();
        }
    }

    pub fn on_click(&mut self, target: EventTarget<S::Element>) {
        if !self.keeps_widget_open(&target) {
            self.widget.hide();
        }
    }

    pub fn on_mouse_up(&mut self, target: EventTarget<S::Element>) {
        if matches!(target, EventTarget::Widget) {
            return;
        }
        if self.surface.selected_text().trim().chars().count() > MIN_SELECTION_CHARS {
            self.activate();
        }
    }

    /// Starts one independent call over the bridge. Only valid from `Idle`.
    pub fn request_rewrite(&mut self, kind: RewriteKind) -> Result<(), WidgetTransitionError> {
        if self.widget.state() != &WidgetState::Idle {
            return Err(WidgetTransitionError {
                action: "start a rewrite",
                state: self.widget.state().name(),
            });
        }

        let request = match self
            .input_text()
            .and_then(|text| RewriteRequest::new(text, kind).ok())
        {
            Some(request) => request,
            None => return self.widget.show_error(NO_INPUT_TEXT_MESSAGE),
        };

        match self.bridge.send(request) {
            Ok(pending) => {
                self.widget.begin_loading()?;
                self.current_call = Some(pending.call_id());
                self.in_flight.push(InFlightCall { pending });
                Ok(())
            }
            Err(error) => {
                warn!("bridge send failed: {error}");
                self.widget.show_error(BRIDGE_FAILURE_MESSAGE)
            }
        }
    }

    /// Collects finished calls without blocking. Returns true when the widget
    /// changed state.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        let mut still_running = Vec::with_capacity(self.in_flight.len());

        for call in std::mem::take(&mut self.in_flight) {
            match call.pending.try_take() {
                None => still_running.push(call),
                Some(outcome) => {
                    changed |= self.apply_outcome(call.pending.call_id(), outcome);
                }
            }
        }

        self.in_flight = still_running;
        changed
    }

    /// Blocks until the call driving the current `Loading` state finishes or
    /// the timeout elapses, then polls.
    pub fn wait_for_current(&mut self, timeout: Duration) -> bool {
        let Some(call_id) = self.current_call else {
            return self.poll();
        };
        let Some(index) = self
            .in_flight
            .iter()
            .position(|call| call.pending.call_id() == call_id)
        else {
            return self.poll();
        };

        match self.in_flight[index].pending.wait_timeout(timeout) {
            Some(outcome) => {
                self.in_flight.remove(index);
                let changed = self.apply_outcome(call_id, outcome);
                self.poll() || changed
            }
            None => self.poll(),
        }
    }

    pub fn apply_suggestion(&mut self) -> Result<(), WidgetTransitionError> {
        let Some(suggestion) = self.widget.suggestion().map(str::to_string) else {
            return Err(WidgetTransitionError {
                action: "apply a suggestion",
                state: self.widget.state().name(),
            });
        };
        let Some(element) = self.active_element.clone() else {
            return self.widget.show_error(NO_ACTIVE_FIELD_MESSAGE);
        };

        if self.surface.selected_text().trim().is_empty() {
            self.surface.set_element_value(&element, &suggestion);
        } else {
            self.surface.replace_selection(&suggestion);
        }
        self.widget.hide();
        Ok(())
    }

    pub fn copy_suggestion(&mut self) -> Result<(), WidgetTransitionError> {
        let Some(suggestion) = self.widget.suggestion().map(str::to_string) else {
            return Err(WidgetTransitionError {
                action: "copy",
                state: self.widget.state().name(),
            });
        };

        match self.surface.write_clipboard(&suggestion) {
            Ok(()) => self.widget.mark_copied(),
            Err(error) => {
                warn!("failed to copy suggestion: {error}");
                Ok(())
            }
        }
    }

    pub fn close(&mut self) {
        self.widget.hide();
    }

    fn activate(&mut self) {
        match self.settings.load() {
            Ok(settings) if settings.enabled => {}
            Ok(_) => {
                debug!("assistant disabled, not activating");
                return;
            }
            Err(error) => {
                warn!("could not read settings, not activating: {error}");
                return;
            }
        }

        if let Err(error) = self.widget.show_controls() {
            debug!("activation ignored: {error}");
        }
    }

    fn keeps_widget_open(&self, target: &EventTarget<S::Element>) -> bool {
        match target {
            EventTarget::Widget => true,
            EventTarget::Element(element) => self.surface.element_info(element).is_text_input(),
            EventTarget::Document => false,
        }
    }

    fn input_text(&self) -> Option<String> {
        let selection = self.surface.selected_text();
        let selection = selection.trim();
        if !selection.is_empty() {
            return Some(selection.to_string());
        }

        self.active_element
            .as_ref()
            .map(|element| self.surface.element_value(element))
            .filter(|value| !value.trim().is_empty())
    }

    fn apply_outcome(
        &mut self,
        call_id: u64,
        outcome: Result<RewriteResult, BridgeError>,
    ) -> bool {
        let result = outcome.unwrap_or_else(|error| {
            warn!(call_id, "bridge call failed: {error}");
            RewriteResult::failure(BRIDGE_FAILURE_MESSAGE)
        });

        if self.current_call != Some(call_id) {
            debug!(call_id, "discarding superseded rewrite result");
            return false;
        }
        self.current_call = None;

        match self.widget.resolve(result) {
            Ok(()) => true,
            Err(error) => {
                debug!(call_id, "discarding rewrite result: {error}");
                false
            }
        }
    }
}
