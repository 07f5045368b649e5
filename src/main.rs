use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use safe_scale::{Demo, DemoChanges, FitMode, WindowViewport, DEFAULT_DIMENSIONS};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let changes = match &options.changes {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read changes file {path}"))?;
            let changes = DemoChanges::from_json_str(&text)
                .with_context(|| format!("failed to parse changes file {path}"))?;
            Some(changes)
        }
        None => None,
    };

    println!(
        "Resolutions max={}x{} safe={}x{} fit={}",
        DEFAULT_DIMENSIONS.max_width,
        DEFAULT_DIMENSIONS.max_height,
        DEFAULT_DIMENSIONS.safe_width,
        DEFAULT_DIMENSIONS.safe_height,
        options.fit_mode.name()
    );

    if !options.interactive {
        return run_headless(&options, changes.as_ref());
    }
    match run_interactive(&options, changes.as_ref()) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to headless mode (set DISPLAY or install X11 libs to open a window)."
                );
                run_headless(&options, changes.as_ref())
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(options: &CliOptions, changes: Option<&DemoChanges>) -> Result<()> {
    let (width, height) = options.viewports[0];
    let window = Arc::new(WindowViewport::new(width, height));
    let mut demo = Demo::new(DEFAULT_DIMENSIONS, options.fit_mode, Arc::clone(&window));
    println!("{}", demo.report());

    for &(width, height) in &options.viewports[1..] {
        window.update(width, height);
        demo.on_resize();
        println!("{}", demo.report());
    }

    for line in apply_changes_file(&mut demo, changes, options.changes.as_deref()) {
        println!("{line}");
    }
    Ok(())
}

/// Applies `--changes` after the startup viewports have been reported, in
/// both headless and interactive mode.
fn apply_changes_file(
    demo: &mut Demo,
    changes: Option<&DemoChanges>,
    path: Option<&str>,
) -> Vec<String> {
    let (Some(changes), Some(path)) = (changes, path) else {
        return Vec::new();
    };
    demo.apply_changes(changes);
    vec![format!("Applied changes from {path}"), demo.report()]
}

fn run_interactive(options: &CliOptions, changes: Option<&DemoChanges>) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;

    let (width, height) = options.viewports[0];
    let window = WindowBuilder::new()
        .with_title("Safe Scale")
        .with_inner_size(LogicalSize::new(width as f64, height as f64))
        .build(&event_loop)
        .map_err(|err| WindowInitError::from_error("window", err))?;

    let size = window.inner_size();
    let viewport = Arc::new(WindowViewport::new(size.width, size.height));
    let mut demo = Demo::new(DEFAULT_DIMENSIONS, options.fit_mode, Arc::clone(&viewport));
    println!("{}", demo.report());
    for line in apply_changes_file(&mut demo, changes, options.changes.as_deref()) {
        println!("{line}");
    }

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Wait;
        let Event::WindowEvent { event, window_id } = event else {
            return;
        };
        if window_id != window.id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => control_flow.set_exit(),
            WindowEvent::Resized(size) => {
                viewport.update(size.width, size.height);
                demo.on_resize();
                println!("{}", demo.report());
                info!("{}", demo.resolution_text());
            }
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                viewport.update(new_inner_size.width, new_inner_size.height);
                demo.on_resize();
                println!("{}", demo.report());
            }
            _ => {}
        }
    });
    Ok(())
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

const USAGE: &str =
    "Usage: safe-scale [--viewport WxH]... [--changes FILE] [--fit contain|safe] [--interactive]";

struct CliOptions {
    viewports: Vec<(u32, u32)>,
    changes: Option<String>,
    fit_mode: FitMode,
    interactive: bool,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        Self::from_args(env::args().skip(1))
    }

    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut viewports = Vec::new();
        let mut changes = None;
        let mut fit_mode = FitMode::Contain;
        let mut interactive = false;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--viewport" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--viewport expects a WxH value. {USAGE}"))?;
                    viewports.push(parse_size(&value)?);
                }
                "--changes" => {
                    changes = Some(
                        args.next()
                            .ok_or_else(|| anyhow!("--changes expects a file path. {USAGE}"))?,
                    );
                }
                "--fit" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--fit expects contain or safe. {USAGE}"))?;
                    fit_mode = FitMode::from_name(&value).ok_or_else(|| {
                        anyhow!("Unknown fit mode: {value}. Expected contain or safe")
                    })?;
                }
                "--interactive" => interactive = true,
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        if viewports.is_empty() {
            viewports.push((1280, 800));
        }
        Ok(Self {
            viewports,
            changes,
            fit_mode,
            interactive,
        })
    }
}

fn parse_size(value: &str) -> Result<(u32, u32)> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow!("viewport size must look like 1280x800, got {value}"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .with_context(|| format!("invalid viewport width in {value}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .with_context(|| format!("invalid viewport height in {value}"))?;
    Ok((width, height))
}
