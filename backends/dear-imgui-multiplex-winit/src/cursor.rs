//! Cursor shape translation and caching
//!
//! A surface answers [`Surface::cursor_query`](dear_imgui_multiplex::Surface::cursor_query)
//! with the shape the host should show, or `MouseCursor::None` when the GUI
//! draws its own cursor. [`CursorSettings`] applies that answer to a window
//! and skips the system call when nothing changed.

use dear_imgui_multiplex::MouseCursor;
use winit::window::{CursorIcon, Window};

/// Host cursor icon for a GUI cursor; `None` hides the host cursor
pub fn to_winit_cursor(cursor: MouseCursor) -> Option<CursorIcon> {
    let icon = match cursor {
        MouseCursor::None => return None,
        MouseCursor::Arrow => CursorIcon::Default,
        MouseCursor::TextInput => CursorIcon::Text,
        MouseCursor::ResizeAll => CursorIcon::Move,
        MouseCursor::ResizeNS => CursorIcon::NsResize,
        MouseCursor::ResizeEW => CursorIcon::EwResize,
        MouseCursor::ResizeNESW => CursorIcon::NeswResize,
        MouseCursor::ResizeNWSE => CursorIcon::NwseResize,
        MouseCursor::Hand => CursorIcon::Pointer,
        MouseCursor::NotAllowed => CursorIcon::NotAllowed,
    };
    Some(icon)
}

/// Last cursor applied to a window
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CursorSettings {
    cursor: Option<MouseCursor>,
}

impl CursorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor applied by the last call to [`apply`](Self::apply)
    pub fn current(&self) -> Option<MouseCursor> {
        self.cursor
    }

    /// Record `cursor`; returns whether it differs from the last one
    pub fn update(&mut self, cursor: MouseCursor) -> bool {
        if self.cursor == Some(cursor) {
            return false;
        }
        self.cursor = Some(cursor);
        true
    }

    /// Show `cursor` on `window` if it changed since the last call
    pub fn apply(&mut self, window: &Window, cursor: MouseCursor) {
        if !self.update(cursor) {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!("Host cursor set to {:?}", cursor);
        match to_winit_cursor(cursor) {
            Some(icon) => {
                window.set_cursor_visible(true);
                window.set_cursor(icon);
            }
            None => window.set_cursor_visible(false),
        }
    }
}
