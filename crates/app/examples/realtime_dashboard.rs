//! Lambda Loop Dashboard
//!
//! Live view of the closed-loop mixture controller:
//! - disturbance window and PI tuning entered as text, applied on click
//! - pause / resume
//! - mixture status banner and a scrolling log of per-cycle status lines
//! - stacked plots over the trailing display window

use lambda_sim_app::{DISPLAY_WINDOW, Engine, MixtureState, Sample, SimConfig};
use simcore::{FixedStepClock, HistoryLog};

use egui::{Color32, RichText};
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

const LOG_CAPACITY: usize = 200;

const COLOR_STOICH: Color32 = Color32::from_rgb(0x4C, 0xAF, 0x50);
const COLOR_RICH: Color32 = Color32::from_rgb(0xFF, 0x98, 0x00);
const COLOR_LEAN: Color32 = Color32::from_rgb(0x21, 0x96, 0xF3);
const COLOR_IDLE: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 1000.0])
            .with_title("Lambda Probe Fuel Injection Control"),
        ..Default::default()
    };
    eframe::run_native(
        "Lambda Probe Fuel Injection Control",
        options,
        Box::new(|_cc| Ok(Box::new(App::new()))),
    )
}

type SharedLog = Rc<RefCell<VecDeque<String>>>;

fn push_line(log: &SharedLog, line: String) {
    let mut log = log.borrow_mut();
    log.push_back(line);
    while log.len() > LOG_CAPACITY {
        log.pop_front();
    }
}

struct Inputs {
    amplitude: String,
    start: String,
    duration: String,
    kp: String,
    ki: String,
    setpoint: String,
}

impl Inputs {
    fn from_config(config: &SimConfig) -> Self {
        Self {
            amplitude: config.disturbance_amplitude_gs.to_string(),
            start: config.disturbance_start_s.to_string(),
            duration: config.disturbance_duration_s.to_string(),
            kp: config.kp.to_string(),
            ki: config.ki.to_string(),
            setpoint: config.setpoint_v.to_string(),
        }
    }
}

fn parse3(a: &str, b: &str, c: &str) -> Option<(f64, f64, f64)> {
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?, c.trim().parse().ok()?))
}

struct App {
    engine: Engine,
    clock: FixedStepClock,
    paused: bool,
    last_frame: Instant,
    inputs: Inputs,
    log: SharedLog,
}

impl App {
    fn new() -> Self {
        let config = SimConfig::default();
        let log: SharedLog = Rc::new(RefCell::new(VecDeque::with_capacity(LOG_CAPACITY)));

        // Defaults always validate
        let mut engine = Engine::new(&config).expect("default configuration is valid");
        let sink = Rc::clone(&log);
        engine.set_log_sink(move |line| push_line(&sink, line.to_string()));

        Self {
            clock: FixedStepClock::new(engine.scan_interval()),
            engine,
            paused: false,
            last_frame: Instant::now(),
            inputs: Inputs::from_config(&config),
            log,
        }
    }

    fn apply_disturbance(&mut self) {
        let i = &self.inputs;
        let message = match parse3(&i.amplitude, &i.start, &i.duration) {
            Some((amplitude, start, duration)) => {
                match self.engine.set_disturbance(amplitude, start, duration) {
                    Ok(()) => format!(
                        ">>> Disturbance set: amplitude={amplitude}g/s, start={start}s, duration={duration}s <<<"
                    ),
                    Err(err) => format!("ERROR: {err}"),
                }
            }
            None => "ERROR: invalid disturbance parameters, check the values entered.".to_string(),
        };
        push_line(&self.log, message);
    }

    fn apply_controller(&mut self) {
        let i = &self.inputs;
        let message = match parse3(&i.kp, &i.ki, &i.setpoint) {
            Some((kp, ki, setpoint)) => match self.engine.set_controller(kp, ki, setpoint) {
                Ok(()) => format!(">>> Controller updated: Kp={kp}, Ki={ki}, setpoint={setpoint}V <<<"),
                Err(err) => format!("ERROR: {err}"),
            },
            None => "ERROR: invalid controller parameters, check the values entered.".to_string(),
        };
        push_line(&self.log, message);
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let message = if self.paused { ">>> Simulation PAUSED <<<" } else { ">>> Simulation RESUMED <<<" };
        push_line(&self.log, message.to_string());
    }

    fn banner(&self) -> (String, Color32) {
        match self.engine.mixture_state() {
            None => ("STATE: INITIALIZING".to_string(), COLOR_IDLE),
            Some(state) => {
                let color = match state {
                    MixtureState::Stoich => COLOR_STOICH,
                    MixtureState::Rich => COLOR_RICH,
                    MixtureState::Lean => COLOR_LEAN,
                };
                (format!("STATE: {}", state.description()), color)
            }
        }
    }
}

fn points(history: &HistoryLog, field: impl Fn(&Sample) -> f64) -> PlotPoints<'static> {
    PlotPoints::from(history.series(DISPLAY_WINDOW, field))
}

fn constant(samples: &[Sample], y: f64) -> PlotPoints<'static> {
    let (t0, t1) = match (samples.first(), samples.last()) {
        (Some(a), Some(b)) => (a.time, b.time),
        _ => (0.0, 0.0),
    };
    PlotPoints::from_iter([[t0, y], [t1, y]])
}

/// One strip of the stacked plot view. `y_range` pins the vertical bounds when given.
fn strip(
    ui: &mut egui::Ui,
    id: &str,
    height: f32,
    y_label: &str,
    y_range: Option<(f64, f64)>,
    samples: &[Sample],
    lines: Vec<Line<'static>>,
) {
    let (t0, t1) = match (samples.first(), samples.last()) {
        (Some(a), Some(b)) => (a.time, b.time.max(a.time + 1.0)),
        _ => (0.0, 1.0),
    };
    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .allow_scroll(false)
        .y_axis_min_width(48.0)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            if let Some((y_min, y_max)) = y_range {
                plot_ui.set_plot_bounds(PlotBounds::from_min_max([t0, y_min], [t1, y_max]));
            }
            for line in lines {
                plot_ui.line(line);
            }
        });
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // SIMULATION ADVANCE
        let now = Instant::now();
        if !self.paused {
            let elapsed = now.duration_since(self.last_frame).as_secs_f64();
            for _ in 0..self.clock.advance(elapsed) {
                self.engine.step();
            }
        }
        self.last_frame = now;

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.heading("Disturbance and Controller");
            ui.horizontal_wrapped(|ui| {
                let field = |ui: &mut egui::Ui, label: &str, value: &mut String| {
                    ui.label(label);
                    ui.add(egui::TextEdit::singleline(value).desired_width(60.0));
                };
                field(ui, "Amplitude (g/s):", &mut self.inputs.amplitude);
                field(ui, "Start (s):", &mut self.inputs.start);
                field(ui, "Duration (s):", &mut self.inputs.duration);
                ui.separator();
                field(ui, "Kp:", &mut self.inputs.kp);
                field(ui, "Ki:", &mut self.inputs.ki);
                field(ui, "Setpoint (V):", &mut self.inputs.setpoint);
            });
            ui.horizontal(|ui| {
                if ui.button("Apply Disturbance").clicked() {
                    self.apply_disturbance();
                }
                if ui.button(if self.paused { "▶ Resume Simulation" } else { "⏸ Pause Simulation" }).clicked() {
                    self.toggle_pause();
                }
                if ui.button("Apply Controller").clicked() {
                    self.apply_controller();
                }
            });

            let (text, color) = self.banner();
            egui::Frame::new().fill(color).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new(text).strong().size(16.0).color(Color32::WHITE));
                });
            });
        });

        egui::TopBottomPanel::bottom("log").resizable(true).show(ctx, |ui| {
            ui.label(RichText::new("System Log").strong());
            egui::ScrollArea::vertical()
                .max_height(110.0)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for line in self.log.borrow().iter() {
                        ui.monospace(line);
                    }
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let history = self.engine.history_log();
            let samples = self.engine.history(DISPLAY_WINDOW);
            let setpoint = self.engine.controller_parameters().setpoint_v;
            let base_pulse = self.engine.base_pulse_width();
            let height = (ui.available_height() / 7.0 - 4.0).max(60.0);

            strip(ui, "setpoint", height, "Voltage (V)", Some((0.0, 1.0)), samples, vec![
                Line::new("r(t) setpoint", points(history, |s| s.setpoint)).color(Color32::RED),
            ]);
            strip(ui, "lambda", height, "Lambda", Some((0.85, 1.15)), samples, vec![
                Line::new("y(t) lambda", points(history, |s| s.lambda)).color(Color32::from_rgb(128, 0, 128)),
                Line::new("λ = 1", constant(samples, 1.0)).color(Color32::BLACK),
            ]);
            strip(ui, "error", height, "Error (V)", None, samples, vec![
                Line::new("e(t) error", points(history, |s| s.error)).color(Color32::DARK_RED),
                Line::new("zero", constant(samples, 0.0)).color(Color32::GRAY),
            ]);
            strip(ui, "voltage", height, "Voltage (V)", Some((0.0, 1.0)), samples, vec![
                Line::new("f(t) sensor voltage", points(history, |s| s.measured_voltage)).color(Color32::BLUE),
                Line::new(format!("setpoint ({setpoint}V)"), constant(samples, setpoint)).color(Color32::RED),
            ]);
            strip(ui, "pulse", height, "Pulse (ms)", None, samples, vec![
                Line::new("u(t) pulse width", points(history, |s| s.pulse_width)).color(Color32::DARK_GREEN),
                Line::new(format!("base pulse ({base_pulse}ms)"), constant(samples, base_pulse)).color(Color32::GRAY),
            ]);
            strip(ui, "disturbance", height, "Pert. (g/s)", None, samples, vec![
                Line::new("d(t) air step", points(history, |s| s.disturbance_applied)).color(COLOR_RICH),
            ]);
            strip(ui, "o2", height, "%O2", Some((0.3, 0.8)), samples, vec![
                Line::new("%O2 exhaust", points(history, |s| s.o2_percent)).color(Color32::BROWN),
                Line::new("%O2 stoich (~0.5%)", constant(samples, 0.5)).color(Color32::BLACK),
            ]);
        });

        // Request another frame to keep the plots live
        ctx.request_repaint_after(Duration::from_millis(20));
    }
}
