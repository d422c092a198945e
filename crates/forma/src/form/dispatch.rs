//! The handler chain, return policies and the application queue.
//!
//! # Event flow
//!
//! [`Forms::handle_object`] is the single entry for delivering an event to
//! a widget:
//!
//! 1. Group markers, widgets without a handler and (for most events)
//!    detached widgets are rejected with [`ReturnFlags::NONE`].
//! 2. For a direct event the `returned` status of every enclosing
//!    composite is reset.
//! 3. Tooltip, push and multi-click bookkeeping runs for the event kind.
//! 4. The pre-handler runs and may preempt everything that follows.
//! 5. The class handler runs; its result is filtered with the return
//!    policy and stored.
//! 6. The post-handler runs.
//! 7. A non-empty result of an interaction event puts the widget on the
//!    application queue, or reports to its composite parent.
//!
//! A release that completes a double or triple click is delivered twice:
//! first as the plain RELEASE, then as DBLCLICK or TRPLCLICK.

use forma_core::logging::targets;
use forma_core::{Event, EventKind, FormsError, Result, ReturnFlags};

use super::{Forms, misuse};
use crate::interaction::ClickKind;
use crate::widget::{Callback, HandlerContext, HookResult, PostHandler, PreHandler, WidgetId};

/// Events that report state changes to a widget rather than interactions.
/// Their results are never queued.
fn is_notification(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Draw
            | EventKind::DrawLabel
            | EventKind::Attrib
            | EventKind::Resized
            | EventKind::MoveOrigin
            | EventKind::Free
    )
}

impl Forms {
    /// Deliver an event to a widget from the application.
    ///
    /// The widget is queued if its filtered result is not empty. Redraws
    /// requested while handling are done before this returns.
    pub fn send_event(&mut self, id: WidgetId, event: &Event) -> ReturnFlags {
        let ret = self.handle_object(id, event, false);
        self.flush_pending_redraws();
        ret
    }

    /// Tell a widget one of its attributes, its size or its origin changed.
    pub fn notify(&mut self, id: WidgetId, cause: EventKind) -> ReturnFlags {
        if !matches!(cause, EventKind::Attrib | EventKind::Resized | EventKind::MoveOrigin) {
            tracing::error!(target: targets::DISPATCH, ?id, ?cause, "invalid notification cause");
            return ReturnFlags::NONE;
        }
        let ret = self.handle_object(id, &Event::new(cause), true);
        self.flush_pending_redraws();
        ret
    }

    /// Run the handler chain of `id` for one event.
    ///
    /// `keep_ret` marks events the engine generates internally; they leave
    /// the `returned` state of enclosing composites alone.
    pub(crate) fn handle_object(&mut self, id: WidgetId, event: &Event, keep_ret: bool) -> ReturnFlags {
        let Some(w) = self.widgets.get(id) else {
            misuse(FormsError::WidgetNotFound);
            return ReturnFlags::NONE;
        };
        if w.class.is_group_marker() {
            misuse(FormsError::GroupMarker);
            return ReturnFlags::NONE;
        }
        if w.handler.is_none() {
            return ReturnFlags::NONE;
        }
        let form = w.form;
        if form.is_none() && !event.kind.allowed_detached() {
            tracing::error!(target: targets::DISPATCH, ?id, kind = ?event.kind, "event for a detached widget");
            return ReturnFlags::NONE;
        }
        tracing::trace!(target: targets::DISPATCH, ?id, kind = ?event.kind, x = event.x, y = event.y, "handle");

        if !keep_ret {
            let mut parent = w.parent;
            while let Some(p) = parent {
                let pw = &mut self.widgets[p];
                pw.returned = ReturnFlags::NONE;
                parent = pw.parent;
            }
        }

        match event.kind {
            EventKind::Enter => self.arm_tooltip(id),
            EventKind::Leave => self.leave_tooltip(id, event.x, event.y),
            EventKind::Push | EventKind::KeyPress => self.hide_tooltip_of(id),
            EventKind::Release => {
                let w = &mut self.widgets[id];
                if !w.radio {
                    w.pushed = false;
                }
                let timeout = w.click_timeout;
                let click = self.interaction.classify_release(
                    event.key,
                    event.x,
                    event.y,
                    event.time,
                    timeout,
                    self.config.click_tolerance,
                );
                if click != ClickKind::Single {
                    let ret = self.run_handlers(id, event, keep_ret);
                    self.enter_it(id, ret, EventKind::Release);
                    let kind = if click == ClickKind::Double {
                        EventKind::DblClick
                    } else {
                        EventKind::TrplClick
                    };
                    // Only the release result is queued.
                    self.run_handlers(id, &event.retagged(kind), true);
                    return ReturnFlags::NONE;
                }
            }
            EventKind::Focus => {
                if let Some(back) = self.interaction.refocus.take()
                    && back != id
                    && self.form_of(back) == form
                    && let Some(form) = form
                {
                    tracing::trace!(target: targets::DISPATCH, ?id, ?back, "focus redirected");
                    self.widgets[id].focus = false;
                    self.forms[form].focus = Some(back);
                    self.widgets[back].focus = true;
                    return self.handle_object(back, event, keep_ret);
                }
            }
            _ => {}
        }

        let ret = self.run_handlers(id, event, keep_ret);
        if !is_notification(event.kind) {
            self.enter_it(id, ret, event.kind);
        }
        ret
    }

    /// Pre-handler, class handler, post-handler. Returns the filtered result.
    fn run_handlers(&mut self, id: WidgetId, event: &Event, keep_ret: bool) -> ReturnFlags {
        if let Some(mut pre) = self.widgets[id].prehandler.take() {
            let verdict = pre.pre_handle(&self.widgets[id], event);
            if let Some(w) = self.widgets.get_mut(id)
                && w.prehandler.is_none()
            {
                w.prehandler = Some(pre);
            }
            if verdict == HookResult::Preempt {
                tracing::trace!(target: targets::DISPATCH, ?id, kind = ?event.kind, "preempted");
                return ReturnFlags::NONE;
            }
        }

        // A handler that re-enters itself finds its slot empty.
        let Some(mut handler) = self.widgets.get_mut(id).and_then(|w| w.handler.take()) else {
            return ReturnFlags::NONE;
        };
        self.interaction.dispatch_depth += 1;
        let raw = {
            let mut ctx = HandlerContext::new(self, id, event.kind);
            handler.handle(&mut ctx, event)
        };
        self.interaction.dispatch_depth -= 1;

        let Some(w) = self.widgets.get_mut(id) else {
            return ReturnFlags::NONE;
        };
        w.handler = Some(handler);

        let ret = raw.filter(w.how_return);
        // A push starts a new interaction; anything else only records results.
        if !ret.is_none() || (!keep_ret && event.kind == EventKind::Push) {
            w.returned = ret;
        }

        if let Some(mut post) = w.posthandler.take() {
            post.post_handle(&self.widgets[id], event);
            if let Some(w) = self.widgets.get_mut(id)
                && w.posthandler.is_none()
            {
                w.posthandler = Some(post);
            }
        }
        ret
    }

    /// Queue a widget whose interaction produced a result.
    ///
    /// Only widgets on a form with a window are queued. A composite child
    /// reports to its parent instead, and the parent's answer is queued in
    /// its place.
    fn enter_it(&mut self, id: WidgetId, flags: ReturnFlags, kind: EventKind) {
        if flags.is_none() {
            return;
        }
        let Some(w) = self.widgets.get(id) else {
            return;
        };
        let Some(form) = w.form else {
            return;
        };
        if self.forms[form].window.is_none() {
            return;
        }

        if let Some(parent) = w.parent {
            let Some(mut handler) = self.widgets.get_mut(parent).and_then(|p| p.handler.take()) else {
                return;
            };
            self.interaction.dispatch_depth += 1;
            let raw = {
                let mut ctx = HandlerContext::new(self, parent, kind);
                handler.child_returned(&mut ctx, id, flags)
            };
            self.interaction.dispatch_depth -= 1;
            let Some(p) = self.widgets.get_mut(parent) else {
                return;
            };
            p.handler = Some(handler);
            let ret = raw.filter(p.how_return);
            p.returned = ret;
            self.enter_it(parent, ret, kind);
            return;
        }

        tracing::trace!(target: targets::DISPATCH, ?id, ?flags, "queued");
        self.queue.push_back(id);
    }

    /// Take the next widget from the application queue.
    ///
    /// Widgets with a callback have it run here and are not returned; the
    /// first widget without one is. Returns `None` once the queue is empty.
    pub fn check_forms(&mut self) -> Option<WidgetId> {
        while let Some(id) = self.queue.pop_front() {
            let Some(w) = self.widgets.get_mut(id) else {
                continue;
            };
            let Some(mut callback) = w.callback.take() else {
                return Some(id);
            };
            callback(self, id);
            if let Some(w) = self.widgets.get_mut(id)
                && w.callback.is_none()
            {
                w.callback = Some(callback);
            }
            self.flush_pending_redraws();
        }
        None
    }

    /// Number of widgets waiting on the application queue.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Queue a widget as if it was interacted with. Its result reads
    /// [`ReturnFlags::TRIGGERED`].
    pub fn trigger(&mut self, id: WidgetId) -> Result<()> {
        let form = self.attached_form(id)?;
        let w = &mut self.widgets[id];
        if w.class.is_group_marker() {
            return Err(misuse(FormsError::GroupMarker));
        }
        if !w.visible || !w.active || self.forms[form].window.is_none() {
            return Ok(());
        }
        w.returned = ReturnFlags::TRIGGERED;
        self.queue.push_back(id);
        Ok(())
    }

    /// Choose which results queue the widget. Applies to all members when
    /// `id` begins a group.
    pub fn set_return_policy(&mut self, id: WidgetId, when: ReturnFlags) -> Result<()> {
        self.widget_ref(id)?;
        let policy = when.normalize_policy();
        for target in self.cascade_targets(id) {
            self.widgets[target].how_return = policy;
            let Some(mut handler) = self.widgets[target].handler.take() else {
                continue;
            };
            {
                let mut ctx = HandlerContext::new(self, target, EventKind::Attrib);
                handler.return_policy_changed(&mut ctx, policy);
            }
            if let Some(w) = self.widgets.get_mut(target) {
                w.handler = Some(handler);
            }
        }
        Ok(())
    }

    /// Install the callback run by [`check_forms`](Self::check_forms).
    pub fn set_callback(
        &mut self,
        id: WidgetId,
        callback: impl FnMut(&mut Forms, WidgetId) + 'static,
    ) -> Result<Option<Callback>> {
        let boxed: Callback = Box::new(callback);
        Ok(self.widget_entry(id)?.callback.replace(boxed))
    }

    pub fn clear_callback(&mut self, id: WidgetId) -> Result<Option<Callback>> {
        Ok(self.widget_entry(id)?.callback.take())
    }

    pub fn set_prehandler(&mut self, id: WidgetId, hook: impl PreHandler + 'static) -> Result<()> {
        self.widget_entry(id)?.prehandler = Some(Box::new(hook));
        Ok(())
    }

    pub fn set_posthandler(&mut self, id: WidgetId, hook: impl PostHandler + 'static) -> Result<()> {
        self.widget_entry(id)?.posthandler = Some(Box::new(hook));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use forma_core::FormsConfig;
    use forma_render::{RecordingSurface, WindowHandle};

    use super::*;
    use crate::form::FormId;
    use crate::widget::{Widget, WidgetClass, WidgetHandler};

    /// Records every event kind and answers with a fixed result for
    /// interaction events.
    struct Probe {
        seen: Rc<RefCell<Vec<EventKind>>>,
        answer: ReturnFlags,
    }

    impl WidgetHandler for Probe {
        fn handle(&mut self, _ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
            self.seen.borrow_mut().push(event.kind);
            match event.kind {
                EventKind::Push | EventKind::Release | EventKind::DblClick => self.answer,
                _ => ReturnFlags::NONE,
            }
        }
    }

    fn setup(answer: ReturnFlags) -> (Forms, FormId, WidgetId, Rc<RefCell<Vec<EventKind>>>) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(100, 100, "");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let probe = Probe {
            seen: seen.clone(),
            answer,
        };
        let id = forms
            .add_widget(form, WidgetClass::Custom(1), Some(Box::new(probe)), 0, 0, 50, 50, "")
            .unwrap();
        forms.show_form(form, WindowHandle(1)).unwrap();
        seen.borrow_mut().clear();
        (forms, form, id, seen)
    }

    #[test]
    fn test_result_is_queued_only_with_window() {
        let (mut forms, form, id, _) = setup(ReturnFlags::CHANGED);
        forms.send_event(id, &Event::new(EventKind::Push));
        assert_eq!(forms.check_forms(), Some(id));
        assert_eq!(forms.check_forms(), None);

        forms.close_form_window(form).unwrap();
        forms.send_event(id, &Event::new(EventKind::Push));
        assert_eq!(forms.check_forms(), None);
    }

    #[test]
    fn test_policy_filters_queue() {
        let (mut forms, _, id, _) = setup(ReturnFlags::CHANGED);
        forms.set_return_policy(id, ReturnFlags::END).unwrap();
        assert_eq!(forms.send_event(id, &Event::new(EventKind::Push)), ReturnFlags::NONE);
        assert_eq!(forms.check_forms(), None);
    }

    #[test]
    fn test_prehandler_preempts() {
        let (mut forms, _, id, seen) = setup(ReturnFlags::CHANGED);
        forms
            .set_prehandler(id, |_: &Widget, ev: &Event| {
                if ev.kind == EventKind::Push {
                    HookResult::Preempt
                } else {
                    HookResult::Continue
                }
            })
            .unwrap();
        assert_eq!(forms.send_event(id, &Event::new(EventKind::Push)), ReturnFlags::NONE);
        assert!(seen.borrow().is_empty());
        assert_eq!(forms.check_forms(), None);
    }

    #[test]
    fn test_posthandler_sees_event() {
        let (mut forms, _, id, _) = setup(ReturnFlags::CHANGED);
        let post_seen = Rc::new(RefCell::new(0));
        let counter = post_seen.clone();
        forms
            .set_posthandler(id, move |_: &Widget, _: &Event| *counter.borrow_mut() += 1)
            .unwrap();
        forms.send_event(id, &Event::new(EventKind::Push));
        assert_eq!(*post_seen.borrow(), 1);
    }

    #[test]
    fn test_callback_consumes_queue_entry() {
        let (mut forms, _, id, _) = setup(ReturnFlags::CHANGED);
        let calls = Rc::new(RefCell::new(Vec::new()));
        let log = calls.clone();
        forms.set_callback(id, move |_, w| log.borrow_mut().push(w)).unwrap();
        forms.send_event(id, &Event::new(EventKind::Push));
        assert_eq!(forms.check_forms(), None);
        assert_eq!(*calls.borrow(), vec![id]);
    }

    #[test]
    fn test_trigger() {
        let (mut forms, _, id, _) = setup(ReturnFlags::NONE);
        forms.trigger(id).unwrap();
        assert_eq!(forms.check_forms(), Some(id));
        assert!(forms.widget(id).unwrap().returned().is_triggered());
    }

    #[test]
    fn test_double_click_replays_release() {
        let (mut forms, _, id, seen) = setup(ReturnFlags::NONE);
        forms.set_click_timeout(id, Duration::from_millis(400)).unwrap();
        let t0 = Instant::now();
        let press = |t| Event::new(EventKind::Push).at(10, 10).with_key(1).with_time(t);
        let release = |t| Event::new(EventKind::Release).at(10, 10).with_key(1).with_time(t);

        forms.send_event(id, &press(t0));
        forms.send_event(id, &release(t0 + Duration::from_millis(50)));
        forms.send_event(id, &press(t0 + Duration::from_millis(100)));
        forms.send_event(id, &release(t0 + Duration::from_millis(150)));

        assert_eq!(
            *seen.borrow(),
            vec![
                EventKind::Push,
                EventKind::Release,
                EventKind::Push,
                EventKind::Release,
                EventKind::DblClick
            ]
        );
    }

    #[test]
    fn test_detached_widget_only_gets_notifications() {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let probe = Probe {
            seen: seen.clone(),
            answer: ReturnFlags::CHANGED,
        };
        let id = forms.create_widget(WidgetClass::Custom(1), Some(Box::new(probe)), 0, 0, 5, 5, "");
        assert_eq!(forms.send_event(id, &Event::new(EventKind::Push)), ReturnFlags::NONE);
        forms.notify(id, EventKind::Attrib);
        forms.notify(id, EventKind::Push);
        assert_eq!(*seen.borrow(), vec![EventKind::Attrib]);
    }
}
