use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info};
use vgport_scene::{Scene, SceneCanvas};
use vgport_session::SessionError;

use crate::config::DriverConfig;
use crate::exit::{io_error, session_error, CliError, CliResult, INTERNAL, SUCCESS};

const BUILD_TARGET: &str = match option_env!("VGPORT_BUILD_TARGET") {
    Some(target) => target,
    None => "unknown",
};

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
    pub dump_scene: Option<PathBuf>,
}

#[cfg(unix)]
pub fn run(options: &DriverOptions, config: &DriverConfig) -> CliResult<i32> {
    use vgport_session::{HeadlessWindow, Session};
    use vgport_transport::{HostInput, HostOutput};

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let window = HeadlessWindow::new(options.width, options.height, options.resizable)
        .with_scale(config.pixel_scale);
    let mut session = Session::new(
        HostInput::stdin(),
        HostOutput::stdout(),
        SceneCanvas::new(),
        window,
        config.session(),
    );

    info!(
        title = %options.title,
        width = options.width,
        height = options.height,
        resizable = options.resizable,
        target = BUILD_TARGET,
        "driver started"
    );

    let result = session
        .announce()
        .and_then(|()| session.run(|| !running.load(Ordering::SeqCst)));

    let code = match result {
        Ok(()) => {
            info!(
                frames = session.dispatcher().canvas().frames(),
                "driver stopped"
            );
            Ok(SUCCESS)
        }
        Err(SessionError::Frame(err)) => {
            info!(error = %err, "host stream closed");
            Ok(SUCCESS)
        }
        Err(err) => {
            error!(error = %err, "driver aborted");
            Err(session_error("driver", err))
        }
    };

    if let Some(path) = &options.dump_scene {
        dump_scene(session.dispatcher().canvas().last_scene(), path)?;
    }

    code
}

#[cfg(not(unix))]
pub fn run(_options: &DriverOptions, _config: &DriverConfig) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::UNSUPPORTED,
        format!("host stdio polling is not available on {BUILD_TARGET}"),
    ))
}

/// Write the most recent frame as pretty JSON. Nothing rendered yet writes
/// an empty scene.
pub fn dump_scene(scene: Option<&Scene>, path: &std::path::Path) -> CliResult<()> {
    let empty = Scene::default();
    let scene = scene.unwrap_or(&empty);
    let json = serde_json::to_vec_pretty(scene)
        .map_err(|err| CliError::new(INTERNAL, format!("encoding scene: {err}")))?;
    std::fs::write(path, json)
        .map_err(|err| io_error(&format!("writing scene {}", path.display()), err))?;
    info!(path = %path.display(), ops = scene.ops.len(), "scene written");
    Ok(())
}

#[cfg_attr(not(unix), allow(dead_code))]
fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_without_frame_writes_empty_scene() {
        let path = std::env::temp_dir().join(format!("vgport-empty-{}.json", std::process::id()));
        dump_scene(None, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let scene: Scene = serde_json::from_str(&text).unwrap();
        assert!(scene.ops.is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn dump_to_missing_directory_fails() {
        let path = std::path::Path::new("/nonexistent/dir/scene.json");
        let err = dump_scene(None, path).unwrap_err();
        assert!(err.message.starts_with("writing scene"));
    }
}
