use std::io::{Read, Write};

use tracing::{debug, info, warn};
use vgport_frame::opcode::{inbound, is_known, opcode_name};
use vgport_frame::{FrameBody, FrameWriter, Outbound, StatsReport};
use vgport_registry::{FontPut, FontRegistry, ImagePut, ImageRegistry, ResourceKey, ScriptRegistry};
use vgport_script::{Color, Interpreter, Notice, Resources, RunSummary, VectorCanvas};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::input::{InputEvent, InputFilter};
use crate::window::Window;

/// Routes inbound frames to their handlers and owns the state they mutate.
///
/// The dispatcher never reads past a frame: handlers consume the body
/// through [`FrameBody`], and whatever they leave is drained and reported
/// before the next frame is looked at.
pub struct Dispatcher<W, C, Win> {
    writer: FrameWriter<W>,
    canvas: C,
    window: Win,
    scripts: ScriptRegistry,
    fonts: FontRegistry,
    images: ImageRegistry,
    interpreter: Interpreter,
    input: InputFilter,
    root: Option<ResourceKey>,
    clear_color: Color,
    max_payload: usize,
    keep_going: bool,
    redraw: bool,
}

impl<W, C, Win> Dispatcher<W, C, Win>
where
    W: Write,
    C: VectorCanvas,
    Win: Window,
{
    pub fn new(output: W, canvas: C, window: Win, config: &SessionConfig) -> Self {
        Self {
            writer: FrameWriter::new(output),
            canvas,
            window,
            scripts: ScriptRegistry::new(),
            fonts: FontRegistry::new(),
            images: ImageRegistry::new(),
            interpreter: Interpreter::new(config.interpreter.clone()),
            input: InputFilter::default(),
            root: None,
            clear_color: Color::BLACK,
            max_payload: config.frame.max_payload_size,
            keep_going: true,
            redraw: true,
        }
    }

    /// Handle one inbound frame.
    ///
    /// Only fatal errors are returned. Everything else is reported to the
    /// host as a diagnostic and the frame is drained. The payload of an
    /// unrecognized opcode is sent back as an inspect message.
    pub fn dispatch<R: Read + ?Sized>(&mut self, body: &mut FrameBody<'_, R>) -> Result<()> {
        let len = body.remaining();
        if len > self.max_payload {
            body.drain()?;
            return self.diagnostic(&format!(
                "dropped frame of {len} bytes, limit is {}",
                self.max_payload
            ));
        }

        let Some(opcode) = body.read_u32()? else {
            return self.diagnostic(&format!("frame of {len} bytes has no opcode"));
        };
        let name = opcode_name(opcode);
        debug!(opcode = name, len, "frame");

        match self.handle(opcode, body) {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => self.diagnostic(&err.to_string())?,
        }

        if !is_known(opcode) {
            return self.inspect_rest(body);
        }

        let excess = body.drain()?;
        if excess > 0 {
            self.diagnostic(&format!("{name}: {excess} excess bytes"))?;
        }
        Ok(())
    }

    fn handle<R: Read + ?Sized>(&mut self, opcode: u32, body: &mut FrameBody<'_, R>) -> Result<()> {
        let name = opcode_name(opcode);
        match opcode {
            inbound::PUT_SCRIPT => {
                let key_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                let bytecode = need(name, body.read_rest()?)?;
                let key = self.scripts.put(key, bytecode).key.clone();
                debug!(%key, "script stored");
                self.send(&Outbound::DrawReady(key.as_bytes()))
            }
            inbound::DELETE_SCRIPT => {
                let key_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                if !self.scripts.delete(key.as_bytes()) {
                    debug!(%key, "delete of unknown script");
                }
                Ok(())
            }
            inbound::RESET => {
                self.reset();
                Ok(())
            }
            inbound::RENDER => {
                let key_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                debug!(%key, "root script set");
                self.root = Some(key);
                self.redraw = true;
                Ok(())
            }
            inbound::CLEAR_COLOR => {
                let rgba = need(name, body.read_array::<4>()?)?;
                self.clear_color = Color::from(rgba);
                self.redraw = true;
                Ok(())
            }
            inbound::DELETE_IMAGE => {
                let key_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                if self.images.delete(key.as_bytes(), &mut self.canvas) {
                    self.redraw = true;
                }
                Ok(())
            }
            inbound::INPUT_FLAGS => {
                let flags = need(name, body.read_u32()?)?;
                self.input.set_flags(flags);
                Ok(())
            }
            inbound::QUIT => {
                info!("host requested quit");
                self.keep_going = false;
                Ok(())
            }
            inbound::QUERY_STATS => {
                let stats = self.stats();
                self.send(&Outbound::Stats(stats))
            }
            inbound::RESHAPE => {
                let width = need(name, body.read_i32()?)?;
                let height = need(name, body.read_i32()?)?;
                self.window.resize(width, height);
                Ok(())
            }
            inbound::POSITION => {
                let x = need(name, body.read_i32()?)?;
                let y = need(name, body.read_i32()?)?;
                self.window.set_position(x, y);
                Ok(())
            }
            inbound::FOCUS => {
                self.window.focus();
                Ok(())
            }
            inbound::ICONIFY => {
                self.window.iconify();
                Ok(())
            }
            inbound::MAXIMIZE => {
                self.window.maximize();
                Ok(())
            }
            inbound::RESTORE => {
                self.window.restore();
                Ok(())
            }
            inbound::SHOW => {
                self.window.show();
                Ok(())
            }
            inbound::HIDE => {
                self.window.hide();
                Ok(())
            }
            inbound::PUT_FONT => {
                let key_len = need(name, body.read_u32()?)?;
                let blob_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                let blob = need(name, body.read_vec(blob_len as usize)?)?;
                self.load_font(key, blob)
            }
            inbound::PUT_FONT_FILE => {
                let key_len = need(name, body.read_u32()?)?;
                let path_len = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                let path = need(name, body.read_vec(path_len as usize)?)?;
                let path = String::from_utf8_lossy(&path).into_owned();

                if self.fonts.handle(key.as_bytes()).is_some() {
                    debug!(%key, path = %path, "font already loaded, file not read");
                    return Ok(());
                }
                let blob = std::fs::read(&path).map_err(|source| SessionError::FontFile {
                    key: key.clone(),
                    path: path.clone(),
                    source,
                })?;
                debug!(%key, path = %path, bytes = blob.len(), "font file read");
                self.load_font(key, blob)
            }
            inbound::PUT_IMAGE => {
                let key_len = need(name, body.read_u32()?)?;
                let blob_len = need(name, body.read_u32()?)?;
                let width = need(name, body.read_u32()?)?;
                let height = need(name, body.read_u32()?)?;
                let format = need(name, body.read_u32()?)?;
                let key = read_key(name, body, key_len)?;
                let blob = need(name, body.read_vec(blob_len as usize)?)?;
                let put = self.images.put(
                    key.clone(),
                    width,
                    height,
                    format,
                    blob,
                    &mut self.canvas,
                )?;
                match put {
                    ImagePut::Created(texture) => {
                        debug!(%key, texture = texture.0, "image created")
                    }
                    ImagePut::Updated(texture) => {
                        debug!(%key, texture = texture.0, "image updated")
                    }
                    ImagePut::Replaced { old, new } => {
                        debug!(%key, old = old.0, new = new.0, "image replaced")
                    }
                }
                self.redraw = true;
                Ok(())
            }
            inbound::CRASH => {
                self.diagnostic("crash requested, exiting")?;
                Err(SessionError::CrashRequested)
            }
            _ => Err(SessionError::UnknownOpcode(opcode)),
        }
    }

    /// Register a font blob unless `key` already has one.
    fn load_font(&mut self, key: ResourceKey, blob: Vec<u8>) -> Result<()> {
        match self.fonts.put(key.clone(), blob, &mut self.canvas)? {
            FontPut::Loaded(font) => {
                debug!(%key, font = font.0, "font loaded");
                self.redraw = true;
            }
            FontPut::AlreadyPresent(_) => {}
        }
        Ok(())
    }

    /// Echo the unread rest of an unrecognized frame back to the host.
    fn inspect_rest<R: Read + ?Sized>(&mut self, body: &mut FrameBody<'_, R>) -> Result<()> {
        match body.read_rest() {
            Ok(Some(rest)) if !rest.is_empty() => self.send(&Outbound::Inspect(&rest)),
            Ok(_) => Ok(()),
            Err(err) if err.is_fatal() => Err(err.into()),
            Err(_) => {
                body.drain()?;
                Ok(())
            }
        }
    }

    /// Drop every script, font and image and forget the root.
    pub fn reset(&mut self) {
        info!(
            scripts = self.scripts.len(),
            fonts = self.fonts.len(),
            images = self.images.len(),
            "resetting registries"
        );
        self.scripts.reset();
        self.fonts.reset(&mut self.canvas);
        self.images.reset(&mut self.canvas);
        self.root = None;
        self.redraw = true;
    }

    /// Forward a window event to the host if it asked for that kind.
    pub fn input(&mut self, event: InputEvent) -> Result<()> {
        if matches!(event, InputEvent::Reshape { .. }) {
            self.redraw = true;
        }
        match self.input.admit(&event) {
            Some(message) => self.send(&message),
            None => Ok(()),
        }
    }

    /// Draw one frame: clear, run the root script if there is one, present.
    ///
    /// Misses and script diagnostics raised during the run are sent to the
    /// host afterwards.
    pub fn render(&mut self) -> Result<RunSummary> {
        let (width, height) = self.window.window_size();
        let ratio = self.window.pixel_ratio();

        self.canvas.clear(self.clear_color);
        self.canvas.begin_frame(width as f32, height as f32, ratio);

        let mut notices = Vec::new();
        let summary = match &self.root {
            Some(root) => {
                let resources = Resources {
                    scripts: &self.scripts,
                    fonts: &self.fonts,
                    images: &self.images,
                };
                self.interpreter
                    .render(root.as_bytes(), resources, &mut self.canvas, &mut notices)
            }
            None => RunSummary::default(),
        };

        self.canvas.end_frame();
        self.window.swap_buffers();
        self.redraw = false;

        for notice in &notices {
            self.notice(notice)?;
        }
        Ok(summary)
    }

    /// Tell the host the window exists and the driver is ready for frames.
    pub fn announce(&mut self) -> Result<()> {
        let (window_width, window_height) = self.window.window_size();
        let (frame_width, frame_height) = self.window.framebuffer_size();
        self.send(&Outbound::Reshape {
            window_width,
            window_height,
            frame_width,
            frame_height,
        })?;
        self.send(&Outbound::Ready)
    }

    /// Send one message to the host.
    pub fn send(&mut self, message: &Outbound<'_>) -> Result<()> {
        self.writer.send_message(message)?;
        Ok(())
    }

    fn notice(&mut self, notice: &Notice) -> Result<()> {
        match notice {
            Notice::ScriptMiss(key) => self.send(&Outbound::ScriptMiss(key.as_bytes())),
            Notice::ImageMiss(key) => self.send(&Outbound::ImageMiss(key.as_bytes())),
            Notice::FontMiss(key) => self.send(&Outbound::FontMiss(key.as_bytes())),
            Notice::Diagnostic(text) => self.send(&Outbound::Puts(text)),
        }
    }

    fn diagnostic(&mut self, text: &str) -> Result<()> {
        warn!("{text}");
        self.send(&Outbound::Puts(text))
    }

    fn stats(&self) -> StatsReport {
        let (width, height) = self.window.window_size();
        let state = self.window.state();
        StatsReport {
            input_flags: self.input.flags(),
            x: state.x,
            y: state.y,
            width: width as i32,
            height: height as i32,
            focused: state.focused,
            resizable: state.resizable,
            iconified: state.iconified,
            maximized: state.maximized,
            visible: state.visible,
        }
    }

    /// False once the host has sent quit.
    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// True when state changed since the last render.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub fn root(&self) -> Option<&ResourceKey> {
        self.root.as_ref()
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn input_flags(&self) -> u32 {
        self.input.flags()
    }

    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    pub fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    pub fn images(&self) -> &ImageRegistry {
        &self.images
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn window(&self) -> &Win {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Win {
        &mut self.window
    }

    pub fn writer(&self) -> &FrameWriter<W> {
        &self.writer
    }
}

fn need<T>(opcode: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or(SessionError::Truncated { opcode })
}

fn read_key<R: Read + ?Sized>(
    opcode: &'static str,
    body: &mut FrameBody<'_, R>,
    len: u32,
) -> Result<ResourceKey> {
    let bytes = need(opcode, body.read_vec(len as usize)?)?;
    Ok(ResourceKey::from(bytes))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use vgport_frame::opcode::outbound;
    use vgport_script::{CanvasCall, Paint, RecordingCanvas, ScriptBuilder};

    use super::*;
    use crate::test_support::{frame, keyed, messages, put_image};
    use crate::window::HeadlessWindow;

    type TestDispatcher = Dispatcher<Vec<u8>, RecordingCanvas, HeadlessWindow>;

    fn dispatcher() -> TestDispatcher {
        Dispatcher::new(
            Vec::new(),
            RecordingCanvas::new(),
            HeadlessWindow::new(640, 480, true),
            &SessionConfig::default(),
        )
    }

    /// Dispatch one encoded frame and return the bytes left unread in it.
    fn feed(dispatcher: &mut TestDispatcher, bytes: &[u8]) -> usize {
        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let mut src = Cursor::new(bytes[4..].to_vec());
        let mut body = FrameBody::new(&mut src, len);
        dispatcher.dispatch(&mut body).unwrap();
        body.remaining()
    }

    fn sent(dispatcher: &TestDispatcher) -> Vec<(u32, Vec<u8>)> {
        messages(dispatcher.writer().get_ref())
    }

    fn puts(dispatcher: &TestDispatcher) -> Vec<String> {
        sent(dispatcher)
            .into_iter()
            .filter(|(kind, _)| *kind == outbound::PUTS)
            .map(|(_, body)| String::from_utf8(body).unwrap())
            .collect()
    }

    #[test]
    fn every_frame_is_consumed_exactly() {
        let mut d = dispatcher();
        let cases = [
            frame(inbound::PUT_SCRIPT, &keyed(b"k", &[0, 0x20, 0, 0])),
            frame(inbound::DELETE_SCRIPT, &keyed(b"k", b"tail")),
            frame(inbound::RENDER, &keyed(b"missing-bytes", &[])[..6]),
            frame(inbound::CLEAR_COLOR, &[1, 2]),
            frame(inbound::INPUT_FLAGS, &[0, 0, 0, 1, 9, 9]),
            frame(0xEE, &[1, 2, 3, 4, 5]),
            frame(inbound::RESET, &[7; 11]),
        ];
        for case in &cases {
            assert_eq!(feed(&mut d, case), 0);
        }
    }

    #[test]
    fn put_script_stores_and_acknowledges() {
        let mut d = dispatcher();
        let code = ScriptBuilder::new().rect(4.0, 4.0, true, false).finish();
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"root", &code)));

        assert_eq!(&d.scripts().get(b"root").unwrap().bytecode[..], &code[..]);
        assert_eq!(sent(&d), vec![(outbound::DRAW_READY, b"root".to_vec())]);
    }

    #[test]
    fn put_script_replaces_previous_bytecode() {
        let mut d = dispatcher();
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"k", &[0, 0x20, 0, 0])));
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"k", &[0, 0x21, 0, 0])));

        assert_eq!(d.scripts().len(), 1);
        assert_eq!(&d.scripts().get(b"k").unwrap().bytecode[..], &[0, 0x21, 0, 0]);
    }

    #[test]
    fn unknown_opcode_reports_hex_value_once() {
        let mut d = dispatcher();
        assert_eq!(feed(&mut d, &frame(0xEE, &[1, 2, 3])), 0);
        assert_eq!(puts(&d), vec!["unknown opcode 0xEE".to_string()]);
    }

    #[test]
    fn unknown_opcode_payload_is_echoed_for_inspection() {
        let mut d = dispatcher();
        feed(&mut d, &frame(0xEE, &[1, 2, 3]));
        feed(&mut d, &frame(0xEF, &[]));

        assert_eq!(
            sent(&d),
            vec![
                (outbound::PUTS, b"unknown opcode 0xEE".to_vec()),
                (outbound::INSPECT, vec![1, 2, 3]),
                (outbound::PUTS, b"unknown opcode 0xEF".to_vec()),
            ]
        );
    }

    #[test]
    fn excess_bytes_are_reported() {
        let mut d = dispatcher();
        feed(&mut d, &frame(inbound::INPUT_FLAGS, &[0, 0, 0, 3, 0xAA, 0xBB]));

        assert_eq!(d.input_flags(), 3);
        assert_eq!(puts(&d), vec!["INPUT_FLAGS: 2 excess bytes".to_string()]);
    }

    #[test]
    fn truncated_payload_leaves_state_alone() {
        let mut d = dispatcher();
        let mut payload = 10u32.to_be_bytes().to_vec();
        payload.extend_from_slice(b"ro");
        feed(&mut d, &frame(inbound::RENDER, &payload));

        assert!(d.root().is_none());
        assert_eq!(puts(&d), vec!["RENDER: truncated payload".to_string()]);
    }

    #[test]
    fn frame_without_opcode_is_reported() {
        let mut d = dispatcher();
        let bytes = [0, 0, 0, 2, 0xAB, 0xCD];
        assert_eq!(feed(&mut d, &bytes), 0);
        assert_eq!(puts(&d), vec!["frame of 2 bytes has no opcode".to_string()]);
    }

    #[test]
    fn oversized_frame_is_drained_unread() {
        let mut config = SessionConfig::default();
        config.frame.max_payload_size = 8;
        let mut d: TestDispatcher = Dispatcher::new(
            Vec::new(),
            RecordingCanvas::new(),
            HeadlessWindow::new(10, 10, true),
            &config,
        );

        let bytes = frame(inbound::INPUT_FLAGS, &[0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(feed(&mut d, &bytes), 0);
        assert_eq!(d.input_flags(), 0);
        assert_eq!(puts(&d), vec!["dropped frame of 12 bytes, limit is 8".to_string()]);
    }

    #[test]
    fn quit_clears_keep_going() {
        let mut d = dispatcher();
        assert!(d.keep_going());
        feed(&mut d, &frame(inbound::QUIT, &[]));
        assert!(!d.keep_going());
    }

    #[test]
    fn crash_flushes_diagnostic_then_fails() {
        let mut d = dispatcher();
        let bytes = frame(inbound::CRASH, &[]);
        let mut src = Cursor::new(bytes[4..].to_vec());
        let mut body = FrameBody::new(&mut src, 4);

        let err = d.dispatch(&mut body).unwrap_err();
        assert!(matches!(err, SessionError::CrashRequested));
        assert_eq!(puts(&d), vec!["crash requested, exiting".to_string()]);
    }

    #[test]
    fn stream_loss_mid_frame_is_fatal() {
        let mut d = dispatcher();
        let mut src = Cursor::new(vec![0, 0, 0, inbound::PUT_SCRIPT as u8, 0, 0]);
        let mut body = FrameBody::new(&mut src, 40);

        let err = d.dispatch(&mut body).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn fonts_keep_first_blob() {
        let mut d = dispatcher();
        let put_font = |blob: &[u8]| {
            let mut payload = 4u32.to_be_bytes().to_vec();
            payload.extend_from_slice(&(blob.len() as u32).to_be_bytes());
            payload.extend_from_slice(b"sans");
            payload.extend_from_slice(blob);
            frame(inbound::PUT_FONT, &payload)
        };

        feed(&mut d, &put_font(b"first"));
        let handle = d.fonts().handle(b"sans").unwrap();
        feed(&mut d, &put_font(b"second"));

        assert_eq!(d.fonts().len(), 1);
        assert_eq!(d.fonts().handle(b"sans"), Some(handle));
        assert_eq!(d.fonts().get(b"sans").unwrap().blob, b"first".to_vec());
        assert!(puts(&d).is_empty());
    }

    fn put_font_file(key: &[u8], path: &str) -> Vec<u8> {
        let mut payload = (key.len() as u32).to_be_bytes().to_vec();
        payload.extend_from_slice(&(path.len() as u32).to_be_bytes());
        payload.extend_from_slice(key);
        payload.extend_from_slice(path.as_bytes());
        frame(inbound::PUT_FONT_FILE, &payload)
    }

    fn temp_font(tag: &str, contents: &[u8]) -> std::path::PathBuf {
        let path =
            std::env::temp_dir().join(format!("vgport-font-{tag}-{}.ttf", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn font_file_is_read_into_registry() {
        let mut d = dispatcher();
        let path = temp_font("load", b"from-disk");
        d.render().unwrap();

        assert_eq!(feed(&mut d, &put_font_file(b"sans", path.to_str().unwrap())), 0);
        let _ = std::fs::remove_file(&path);

        assert_eq!(d.fonts().get(b"sans").unwrap().blob, b"from-disk".to_vec());
        assert!(d.canvas().font(d.fonts().handle(b"sans").unwrap()).is_some());
        assert!(d.needs_redraw());
        assert!(puts(&d).is_empty());
    }

    #[test]
    fn font_file_keeps_first_blob() {
        let mut d = dispatcher();
        let path = temp_font("first", b"disk");
        feed(&mut d, &put_font_file(b"sans", path.to_str().unwrap()));
        let handle = d.fonts().handle(b"sans").unwrap();

        let mut payload = 4u32.to_be_bytes().to_vec();
        payload.extend_from_slice(&5u32.to_be_bytes());
        payload.extend_from_slice(b"sans");
        payload.extend_from_slice(b"later");
        feed(&mut d, &frame(inbound::PUT_FONT, &payload));
        let _ = std::fs::remove_file(&path);

        assert_eq!(d.fonts().handle(b"sans"), Some(handle));
        assert_eq!(d.fonts().get(b"sans").unwrap().blob, b"disk".to_vec());
    }

    #[test]
    fn loaded_font_skips_reading_the_file() {
        let mut d = dispatcher();
        let mut payload = 4u32.to_be_bytes().to_vec();
        payload.extend_from_slice(&4u32.to_be_bytes());
        payload.extend_from_slice(b"mono");
        payload.extend_from_slice(b"blob");
        feed(&mut d, &frame(inbound::PUT_FONT, &payload));

        feed(&mut d, &put_font_file(b"mono", "/nonexistent/vgport/mono.ttf"));
        assert_eq!(d.fonts().get(b"mono").unwrap().blob, b"blob".to_vec());
        assert!(puts(&d).is_empty());
    }

    #[test]
    fn unreadable_font_file_is_a_diagnostic() {
        let mut d = dispatcher();
        feed(&mut d, &put_font_file(b"mono", "/nonexistent/vgport/mono.ttf"));

        assert!(d.fonts().is_empty());
        let puts = puts(&d);
        assert_eq!(puts.len(), 1);
        assert!(
            puts[0].starts_with("font \"mono\": cannot read /nonexistent/vgport/mono.ttf: "),
            "{}",
            puts[0]
        );
    }

    #[test]
    fn rejected_font_is_a_diagnostic() {
        let mut d = dispatcher();
        let mut payload = 4u32.to_be_bytes().to_vec();
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(b"sans");
        feed(&mut d, &frame(inbound::PUT_FONT, &payload));

        assert!(d.fonts().is_empty());
        assert_eq!(puts(&d), vec!["backend rejected font \"sans\"".to_string()]);
    }

    #[test]
    fn images_update_in_place_or_rebuild() {
        let mut d = dispatcher();
        feed(&mut d, &put_image(b"img", 1, 1, 4, &[1, 2, 3, 4]));
        let first = d.images().get(b"img").unwrap().texture;

        feed(&mut d, &put_image(b"img", 1, 1, 4, &[5, 6, 7, 8]));
        let image = d.images().get(b"img").unwrap();
        assert_eq!(image.texture, first);
        assert_eq!(d.canvas().texture(first).unwrap().2, vec![5, 6, 7, 8]);

        feed(&mut d, &put_image(b"img", 2, 1, 4, &[0; 8]));
        let rebuilt = d.images().get(b"img").unwrap().texture;
        assert_ne!(rebuilt, first);
        assert!(d.canvas().texture(first).is_none());
    }

    #[test]
    fn bad_image_keeps_previous_pixels() {
        let mut d = dispatcher();
        feed(&mut d, &put_image(b"img", 1, 1, 3, &[9, 9, 9]));
        feed(&mut d, &put_image(b"img", 1, 1, 3, &[1, 2]));

        assert_eq!(d.images().get(b"img").unwrap().pixels, vec![9, 9, 9, 255]);
        assert_eq!(
            puts(&d),
            vec!["image \"img\": pixel data is 2 bytes, expected 3".to_string()]
        );
    }

    #[test]
    fn reset_forgets_everything() {
        let mut d = dispatcher();
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"a", &[])));
        feed(&mut d, &frame(inbound::RENDER, &keyed(b"a", &[])));
        feed(&mut d, &put_image(b"img", 1, 1, 1, &[7]));
        feed(&mut d, &frame(inbound::RESET, &[]));

        assert!(d.scripts().get(b"a").is_none());
        assert!(d.images().get(b"img").is_none());
        assert!(d.root().is_none());
        assert!(d.needs_redraw());
    }

    #[test]
    fn delete_image_releases_texture() {
        let mut d = dispatcher();
        feed(&mut d, &put_image(b"img", 1, 1, 1, &[7]));
        let texture = d.images().get(b"img").unwrap().texture;

        feed(&mut d, &frame(inbound::DELETE_IMAGE, &keyed(b"img", &[])));
        assert!(d.images().get(b"img").is_none());
        assert!(d.canvas().texture(texture).is_none());

        // deleting again is a quiet no-op
        feed(&mut d, &frame(inbound::DELETE_IMAGE, &keyed(b"img", &[])));
        assert!(puts(&d).is_empty());
    }

    #[test]
    fn query_stats_reports_window() {
        let mut d = dispatcher();
        feed(&mut d, &frame(inbound::INPUT_FLAGS, &0x21u32.to_be_bytes()));
        let mut position = 12i32.to_be_bytes().to_vec();
        position.extend_from_slice(&(-4i32).to_be_bytes());
        feed(&mut d, &frame(inbound::POSITION, &position));
        feed(&mut d, &frame(inbound::HIDE, &[]));
        feed(&mut d, &frame(inbound::QUERY_STATS, &[]));

        let mut expected = 0x21u32.to_be_bytes().to_vec();
        for value in [12i32, -4, 640, 480] {
            expected.extend_from_slice(&value.to_be_bytes());
        }
        expected.extend_from_slice(&[0, 1, 0, 0, 0]);
        assert_eq!(sent(&d), vec![(outbound::STATS, expected)]);
    }

    #[test]
    fn render_draws_root_between_frame_calls() {
        let mut d = dispatcher();
        let code = ScriptBuilder::new()
            .rect(10.0, 10.0, false, false)
            .fill_color(Color::rgba(255, 0, 0, 255))
            .fill()
            .finish();
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"root", &code)));
        feed(&mut d, &frame(inbound::CLEAR_COLOR, &[1, 2, 3, 4]));
        feed(&mut d, &frame(inbound::RENDER, &keyed(b"root", &[])));
        d.render().unwrap();

        assert_eq!(
            d.canvas_mut().take_calls(),
            vec![
                CanvasCall::Clear(Color::rgba(1, 2, 3, 4)),
                CanvasCall::BeginFrame(640.0, 480.0),
                CanvasCall::Reset,
                CanvasCall::BeginPath,
                CanvasCall::Rect(0.0, 0.0, 10.0, 10.0),
                CanvasCall::FillPaint(Paint::Solid(Color::rgba(255, 0, 0, 255))),
                CanvasCall::Fill,
                CanvasCall::EndFrame,
            ]
        );
        assert!(!d.needs_redraw());
        assert_eq!(d.window().frames(), 1);
    }

    #[test]
    fn render_without_root_still_presents() {
        let mut d = dispatcher();
        d.render().unwrap();
        assert_eq!(
            d.canvas_mut().take_calls(),
            vec![
                CanvasCall::Clear(Color::BLACK),
                CanvasCall::BeginFrame(640.0, 480.0),
                CanvasCall::EndFrame,
            ]
        );
    }

    #[test]
    fn misses_are_sent_after_render() {
        let mut d = dispatcher();
        let code = ScriptBuilder::new()
            .fill_image(b"logo")
            .rect(5.0, 5.0, true, false)
            .render_script(b"child")
            .font(b"mono")
            .finish();
        feed(&mut d, &frame(inbound::PUT_SCRIPT, &keyed(b"root", &code)));
        feed(&mut d, &frame(inbound::RENDER, &keyed(b"root", &[])));
        d.render().unwrap();

        let sent = sent(&d);
        assert_eq!(
            &sent[1..],
            &[
                (outbound::IMAGE_MISS, b"logo".to_vec()),
                (outbound::SCRIPT_MISS, b"child".to_vec()),
                (outbound::FONT_MISS, b"mono".to_vec()),
            ]
        );
        assert!(!d
            .canvas()
            .calls
            .iter()
            .any(|call| matches!(call, CanvasCall::FillPaint(Paint::Image { .. }))));
    }

    #[test]
    fn reshape_input_requests_redraw_even_when_masked() {
        let mut d = dispatcher();
        d.render().unwrap();
        d.input(InputEvent::Reshape {
            window_width: 1,
            window_height: 1,
            frame_width: 1,
            frame_height: 1,
        })
        .unwrap();

        assert!(d.needs_redraw());
        assert!(sent(&d).is_empty());
    }

    #[test]
    fn dropped_files_follow_input_flags() {
        use crate::input::DROP_PATHS_MASK;

        let mut d = dispatcher();
        let dropped = || InputEvent::DropPaths(vec!["/tmp/a.png".to_string(), "/b".to_string()]);
        d.input(dropped()).unwrap();
        assert!(sent(&d).is_empty());

        feed(&mut d, &frame(inbound::INPUT_FLAGS, &DROP_PATHS_MASK.to_be_bytes()));
        d.input(dropped()).unwrap();

        let mut body = 2u32.to_be_bytes().to_vec();
        body.extend_from_slice(&10u32.to_be_bytes());
        body.extend_from_slice(b"/tmp/a.png");
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(b"/b");
        assert_eq!(sent(&d), vec![(outbound::DROP_PATHS, body)]);
    }

    #[test]
    fn announce_sends_reshape_then_ready() {
        let mut d = Dispatcher::new(
            Vec::new(),
            RecordingCanvas::new(),
            HeadlessWindow::new(320, 200, false).with_scale(2),
            &SessionConfig::default(),
        );
        d.announce().unwrap();

        let mut reshape = Vec::new();
        for value in [320u32, 200, 640, 400] {
            reshape.extend_from_slice(&value.to_be_bytes());
        }
        assert_eq!(
            messages(d.writer().get_ref()),
            vec![(outbound::RESHAPE, reshape), (outbound::READY, Vec::new())]
        );
    }
}
