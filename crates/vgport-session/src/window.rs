use std::collections::VecDeque;

use crate::input::InputEvent;

/// Attributes reported in reply to a stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub x: i32,
    pub y: i32,
    pub focused: bool,
    pub resizable: bool,
    pub iconified: bool,
    pub maximized: bool,
    pub visible: bool,
}

/// The windowing shell the session drives.
///
/// Control requests from the host are forwarded here as-is. Input and
/// reshape notifications come back through [`Window::poll_events`], in the
/// order the platform produced them.
pub trait Window {
    /// Logical window size.
    fn window_size(&self) -> (u32, u32);

    /// Framebuffer size in device pixels.
    fn framebuffer_size(&self) -> (u32, u32);

    /// Device pixels per logical unit.
    fn pixel_ratio(&self) -> f32 {
        let (width, _) = self.window_size();
        let (frame_width, _) = self.framebuffer_size();
        if width == 0 {
            1.0
        } else {
            frame_width as f32 / width as f32
        }
    }

    fn state(&self) -> WindowState;

    fn resize(&mut self, width: i32, height: i32);
    fn set_position(&mut self, x: i32, y: i32);
    fn focus(&mut self);
    fn iconify(&mut self);
    fn maximize(&mut self);
    fn restore(&mut self);
    fn show(&mut self);
    fn hide(&mut self);

    /// Collect pending input events.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Present the frame that was just drawn.
    fn swap_buffers(&mut self) {}
}

/// A window with no display, for tests and headless runs.
///
/// Control requests update its state directly. A resize queues the same
/// reshape event a desktop window would report, and tests can queue
/// arbitrary input with [`HeadlessWindow::push_event`].
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    scale: u32,
    state: WindowState,
    events: VecDeque<InputEvent>,
    frames: u64,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32, resizable: bool) -> Self {
        Self {
            width,
            height,
            scale: 1,
            state: WindowState {
                x: 0,
                y: 0,
                focused: true,
                resizable,
                iconified: false,
                maximized: false,
                visible: true,
            },
            events: VecDeque::new(),
            frames: 0,
        }
    }

    /// Report a framebuffer `scale` times the window size.
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Number of frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn reshaped(&mut self) {
        let (frame_width, frame_height) = self.framebuffer_size();
        self.events.push_back(InputEvent::Reshape {
            window_width: self.width,
            window_height: self.height,
            frame_width,
            frame_height,
        });
    }
}

impl Window for HeadlessWindow {
    fn window_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.width * self.scale, self.height * self.scale)
    }

    fn state(&self) -> WindowState {
        self.state
    }

    fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(1) as u32;
        let height = height.max(1) as u32;
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.reshaped();
        }
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.state.x = x;
        self.state.y = y;
    }

    fn focus(&mut self) {
        self.state.focused = true;
    }

    fn iconify(&mut self) {
        self.state.iconified = true;
        self.state.maximized = false;
    }

    fn maximize(&mut self) {
        self.state.maximized = true;
        self.state.iconified = false;
    }

    fn restore(&mut self) {
        self.state.iconified = false;
        self.state.maximized = false;
    }

    fn show(&mut self) {
        self.state.visible = true;
    }

    fn hide(&mut self) {
        self.state.visible = false;
        self.state.focused = false;
    }

    fn poll_events(&mut self) -> Vec<InputEvent> {
        self.events.drain(..).collect()
    }

    fn swap_buffers(&mut self) {
        self.frames += 1;
    }
}
