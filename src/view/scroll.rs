//! Scroll synchronization, ensure-visible and the deferred tasks

use tracing::{debug, trace};

use super::{GridEvent, ViewState};
use crate::host::{Pane, RenderHost};

impl<H: RenderHost> ViewState<H> {
    /// Body scrolled; the header follows horizontally
    pub(super) fn handle_scroll(&mut self, x: u32, y: u32) {
        self.scroll_left = x;
        self.scroll_top = y;
        self.sync_scroll();
        self.emit(GridEvent::Scroll { left: x, top: y });
    }

    pub(super) fn sync_scroll(&mut self) {
        self.host.set_scroll_offset(Pane::Header, self.scroll_left, 0);
    }

    /// Pull the offsets back inside a body of `width` x `height`, the way the
    /// host clamps its own scroll position when the extent shrinks
    pub(super) fn clamp_scroll(&mut self, width: u32, height: u32) {
        let left = self.scroll_left.min(width.saturating_sub(self.viewport.width));
        let top = self.scroll_top.min(height.saturating_sub(self.viewport.height));
        if (left, top) == (self.scroll_left, self.scroll_top) {
            return;
        }
        debug!(from_left = self.scroll_left, from_top = self.scroll_top, left, top, "scroll clamped to body");
        self.host.set_scroll_offset(Pane::Body, left, top);
        self.handle_scroll(left, top);
    }

    pub(super) fn schedule_reflow(&mut self) {
        let now = self.now();
        let delay = self.config.reflow_delay();
        self.tasks.reflow.delay(now, delay, ());
    }

    pub(super) fn adjust_for_scroll(&mut self, immediate: bool) {
        if immediate {
            self.tasks.adjust_scroll.cancel();
            self.do_adjust_for_scroll();
        } else {
            let now = self.now();
            let delay = self.config.scroll_delay();
            self.tasks.adjust_scroll.delay(now, delay, ());
        }
    }

    /// Header pane spans the viewport; body spans the wider of columns and viewport
    fn do_adjust_for_scroll(&mut self) {
        self.viewport = self.host.measure_viewport();
        trace!(width = self.viewport.width, height = self.viewport.height, "adjusting for scroll");
        self.host.set_header_extent(self.viewport.width);
        self.update_body_height();
        self.sync_scroll();
    }

    pub(super) fn ensure_visible(&mut self, row: usize, immediate: bool) {
        if immediate {
            self.tasks.ensure_visible.cancel();
            self.ensure_visible_now(row);
        } else {
            // held by id so inserts and deletes before the deadline don't retarget it
            let Some(id) = self.rows.get(row).map(|slot| slot.id) else {
                return;
            };
            let now = self.now();
            let delay = self.config.ensure_visible_delay();
            self.tasks.ensure_visible.delay(now, delay, id);
        }
    }

    /// Scroll the least distance that shows the whole row; horizontal offset is kept
    fn ensure_visible_now(&mut self, row: usize) {
        if row >= self.rows.len() {
            return;
        }
        let row_height = self.row_height();
        let top = row as u32 * row_height;
        let bottom = top + row_height;

        self.viewport = self.host.measure_viewport();
        let visible_top = self.scroll_top;
        let visible_bottom = visible_top + self.viewport.height;

        let new_top = if top < visible_top {
            top
        } else if bottom > visible_bottom {
            bottom.saturating_sub(self.viewport.height)
        } else {
            return;
        };

        debug!(row, from = visible_top, to = new_top, "scrolling row into view");
        let left = self.scroll_left;
        self.host.set_scroll_offset(Pane::Body, left, new_top);
        self.handle_scroll(left, new_top);
    }

    pub(super) fn focus_row(&mut self, row: usize) {
        let Some(slot) = self.rows.get(row) else {
            return;
        };
        self.host.focus_row(&slot.handle);
        self.last_focused = Some(slot.id);
        self.ensure_visible(row, false);
    }

    pub(super) fn handle_resize(&mut self) {
        if !self.config.monitor_resize {
            return;
        }
        let now = self.now();
        let delay = self.config.resize_delay();
        self.tasks.relayout.delay(now, delay, ());
    }

    pub(super) fn run_pending(&mut self) -> bool {
        let now = self.now();
        let mut ran = false;
        if self.tasks.relayout.take_due(now).is_some() {
            debug!("relayout after resize");
            self.do_adjust_for_scroll();
            ran = true;
        }
        if self.tasks.adjust_scroll.take_due(now).is_some() {
            self.do_adjust_for_scroll();
            ran = true;
        }
        if let Some(id) = self.tasks.ensure_visible.take_due(now) {
            if let Some(row) = self.rows.iter().position(|slot| slot.id == id) {
                self.ensure_visible_now(row);
            }
            ran = true;
        }
        if self.tasks.reflow.take_due(now).is_some() {
            self.host.force_reflow();
            ran = true;
        }
        ran
    }
}
