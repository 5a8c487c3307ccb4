use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use vgport_frame::FrameReader;
use vgport_script::VectorCanvas;
use vgport_transport::PollRead;

use crate::config::SessionConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, SessionError};
use crate::window::Window;

/// What one [`Session::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    /// Inbound frames dispatched.
    pub frames: usize,
    /// Window events looked at, forwarded or not.
    pub events: usize,
    pub rendered: bool,
}

/// One driver process worth of state, bound to a host stream.
pub struct Session<R, W, C, Win> {
    reader: FrameReader<R>,
    dispatcher: Dispatcher<W, C, Win>,
    poll_timeout: Duration,
}

impl<R, W, C, Win> Session<R, W, C, Win>
where
    R: PollRead,
    W: Write,
    C: VectorCanvas,
    Win: Window,
{
    pub fn new(input: R, output: W, canvas: C, window: Win, config: SessionConfig) -> Self {
        let dispatcher = Dispatcher::new(output, canvas, window, &config);
        Self {
            reader: FrameReader::with_config(input, config.frame.clone()),
            dispatcher,
            poll_timeout: config.frame.poll_timeout,
        }
    }

    /// Send the initial reshape and ready messages.
    pub fn announce(&mut self) -> Result<()> {
        self.dispatcher.announce()
    }

    /// True until the host quits or goes away.
    pub fn is_running(&mut self) -> bool {
        self.dispatcher.keep_going() && !self.reader.caller_down()
    }

    /// Dispatch frames until one poll interval passes without input.
    ///
    /// Returns the number of frames handled. A quit frame ends the pump
    /// immediately. Errors are fatal: the host stream is gone or the host
    /// asked for a crash.
    pub fn pump(&mut self) -> Result<usize> {
        let deadline = Instant::now() + self.poll_timeout;
        let mut frames = 0usize;

        while self.dispatcher.keep_going() {
            let budget = deadline.saturating_duration_since(Instant::now());
            let Some(len) = self.reader.read_frame_length(budget) else {
                break;
            };

            let mut body = self.reader.body(len);
            let result = self.dispatcher.dispatch(&mut body);
            frames += 1;

            match result {
                Ok(()) => {}
                Err(err) if err.is_fatal() => {
                    if matches!(err, SessionError::Frame(_)) {
                        self.reader.mark_closed();
                    }
                    return Err(err);
                }
                Err(err) => warn!(error = %err, "frame not handled"),
            }

            if Instant::now() >= deadline {
                break;
            }
        }

        Ok(frames)
    }

    /// One pass of the driver loop: read frames, forward input, redraw.
    ///
    /// The root is redrawn whenever a frame arrived or something marked the
    /// scene dirty.
    pub fn tick(&mut self) -> Result<Tick> {
        let frames = self.pump()?;

        let events = self.dispatcher.window_mut().poll_events();
        let event_count = events.len();
        for event in events {
            self.dispatcher.input(event)?;
        }

        let mut rendered = false;
        if self.dispatcher.keep_going() && (frames > 0 || self.dispatcher.needs_redraw()) {
            let summary = self.dispatcher.render()?;
            debug!(
                scripts = summary.scripts,
                instructions = summary.instructions,
                "frame rendered"
            );
            rendered = true;
        }

        Ok(Tick {
            frames,
            events: event_count,
            rendered,
        })
    }

    /// Tick until the host quits, hangs up, or `stop` returns true.
    pub fn run(&mut self, mut stop: impl FnMut() -> bool) -> Result<()> {
        while self.is_running() && !stop() {
            self.tick()?;
        }
        Ok(())
    }

    pub fn dispatcher(&self) -> &Dispatcher<W, C, Win> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<W, C, Win> {
        &mut self.dispatcher
    }

    pub fn reader(&self) -> &FrameReader<R> {
        &self.reader
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use vgport_frame::opcode::{inbound, outbound};
    use vgport_script::{CanvasCall, Color, Paint, RecordingCanvas, ScriptBuilder};

    use super::*;
    use crate::input::{InputEvent, CURSOR_POS_MASK, KEY_MASK, RESHAPE_MASK};
    use crate::test_support::{frame, keyed, messages};
    use crate::window::HeadlessWindow;

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>, RecordingCanvas, HeadlessWindow>;

    fn session(frames: &[Vec<u8>]) -> TestSession {
        Session::new(
            Cursor::new(frames.concat()),
            Vec::new(),
            RecordingCanvas::new(),
            HeadlessWindow::new(800, 600, true),
            SessionConfig::default(),
        )
    }

    fn sent(session: &TestSession) -> Vec<(u32, Vec<u8>)> {
        messages(session.dispatcher().writer().get_ref())
    }

    fn flags(mask: u32) -> Vec<u8> {
        frame(inbound::INPUT_FLAGS, &mask.to_be_bytes())
    }

    #[test]
    fn put_then_render_fills_red_rect() {
        let code = ScriptBuilder::new()
            .rect(10.0, 10.0, false, false)
            .fill_color(Color::rgba(255, 0, 0, 255))
            .fill()
            .finish();
        let mut s = session(&[
            frame(inbound::PUT_SCRIPT, &keyed(b"root", &code)),
            frame(inbound::RENDER, &keyed(b"root", &[])),
        ]);

        let tick = s.tick().unwrap();
        assert_eq!(tick.frames, 2);
        assert!(tick.rendered);

        let calls = s.dispatcher_mut().canvas_mut().take_calls();
        let fills: Vec<usize> = calls
            .iter()
            .enumerate()
            .filter(|(_, call)| **call == CanvasCall::Fill)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(fills.len(), 1);
        assert!(calls.contains(&CanvasCall::Rect(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(
            calls[fills[0] - 1],
            CanvasCall::FillPaint(Paint::Solid(Color::rgba(255, 0, 0, 255)))
        );
        assert_eq!(sent(&s), vec![(outbound::DRAW_READY, b"root".to_vec())]);
    }

    #[test]
    fn unknown_opcode_then_next_frame_is_clean() {
        let mut s = session(&[frame(0xEE, &[9, 9, 9, 9, 9]), flags(KEY_MASK)]);

        let tick = s.tick().unwrap();
        assert_eq!(tick.frames, 2);
        assert_eq!(s.dispatcher().input_flags(), KEY_MASK);
        assert_eq!(
            sent(&s),
            vec![
                (outbound::PUTS, b"unknown opcode 0xEE".to_vec()),
                (outbound::INSPECT, vec![9, 9, 9, 9, 9]),
            ]
        );
    }

    #[test]
    fn quit_stops_the_pump_before_later_frames() {
        let mut s = session(&[frame(inbound::QUIT, &[]), flags(KEY_MASK)]);

        assert_eq!(s.pump().unwrap(), 1);
        assert!(!s.is_running());
        assert_eq!(s.dispatcher().input_flags(), 0);
    }

    #[test]
    fn quit_skips_the_final_render() {
        let mut s = session(&[frame(inbound::QUIT, &[])]);
        let tick = s.tick().unwrap();
        assert!(!tick.rendered);
        assert!(s.dispatcher().canvas().calls.is_empty());
    }

    #[test]
    fn truncated_stream_is_fatal_and_marks_host_down() {
        let mut bytes = frame(inbound::PUT_SCRIPT, &keyed(b"root", &[0; 16]));
        bytes.truncate(12);
        let mut s = session(&[bytes]);

        let err = s.pump().unwrap_err();
        assert!(err.is_fatal());
        assert!(!s.is_running());
    }

    #[test]
    fn crash_is_returned_from_tick() {
        let mut s = session(&[frame(inbound::CRASH, &[]), flags(KEY_MASK)]);
        assert!(matches!(s.tick(), Err(SessionError::CrashRequested)));
        assert_eq!(s.dispatcher().input_flags(), 0);
    }

    #[test]
    fn run_stops_when_host_hangs_up() {
        let mut s = session(&[flags(KEY_MASK)]);
        s.run(|| false).unwrap();
        assert!(!s.is_running());
        assert_eq!(s.dispatcher().input_flags(), KEY_MASK);
    }

    #[test]
    fn run_honors_stop_request() {
        let mut s = session(&[flags(KEY_MASK)]);
        s.run(|| true).unwrap();
        assert_eq!(s.dispatcher().input_flags(), 0);
    }

    #[test]
    fn input_is_filtered_by_flags() {
        let mut s = session(&[flags(KEY_MASK | CURSOR_POS_MASK)]);
        {
            let window = s.dispatcher_mut().window_mut();
            window.push_event(InputEvent::Key {
                key: 32,
                scancode: 65,
                action: 1,
                mods: 0,
            });
            window.push_event(InputEvent::Scroll {
                x_offset: 0.0,
                y_offset: -1.0,
                x: 3.0,
                y: 4.0,
            });
            window.push_event(InputEvent::CursorPos { x: 3.0, y: 4.0 });
            window.push_event(InputEvent::CursorPos { x: 3.0, y: 4.0 });
            window.push_event(InputEvent::Close);
        }

        let tick = s.tick().unwrap();
        assert_eq!(tick.events, 5);

        let mut key = Vec::new();
        for value in [32i32, 65, 1, 0] {
            key.extend_from_slice(&value.to_be_bytes());
        }
        let mut cursor = 3.0f32.to_be_bytes().to_vec();
        cursor.extend_from_slice(&4.0f32.to_be_bytes());
        assert_eq!(
            sent(&s),
            vec![
                (outbound::KEY, key),
                (outbound::CURSOR_POS, cursor),
                (outbound::CLOSE, Vec::new()),
            ]
        );
    }

    #[test]
    fn reshape_request_reports_back_when_enabled() {
        let mut size = 1024i32.to_be_bytes().to_vec();
        size.extend_from_slice(&768i32.to_be_bytes());
        let mut s = session(&[flags(RESHAPE_MASK), frame(inbound::RESHAPE, &size)]);

        let tick = s.tick().unwrap();
        assert!(tick.rendered);

        let mut reshape = Vec::new();
        for value in [1024u32, 768, 1024, 768] {
            reshape.extend_from_slice(&value.to_be_bytes());
        }
        assert_eq!(sent(&s), vec![(outbound::RESHAPE, reshape)]);
        assert!(s
            .dispatcher()
            .canvas()
            .calls
            .contains(&CanvasCall::BeginFrame(1024.0, 768.0)));
    }

    #[test]
    fn idle_tick_renders_only_when_dirty() {
        let mut s = session(&[]);
        assert!(s.tick().unwrap().rendered);
        assert!(!s.tick().unwrap().rendered);
    }
}
