use lambda_sim_app::{DISPLAY_WINDOW, Engine, SimConfig, WindowStats};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = env::var("LAMBDA_SIM_LOG")
        .ok()
        .and_then(|s| s.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;

    // Optional JSON config path; anything it omits keeps the default
    let config = match env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {path}");
            SimConfig::from_json_str(&fs::read_to_string(&path)?)?
        }
        None => SimConfig::default(),
    };
    let cycles = match env::var("LAMBDA_SIM_CYCLES") {
        Ok(s) => s.parse::<usize>()?,
        Err(_) => DISPLAY_WINDOW,
    };

    let mut engine = Engine::new(&config)?;
    engine.set_log_sink(|line| log::debug!("{line}"));

    log::info!(
        "running {cycles} cycles at {:.0} ms (Kp={}, Ki={}, setpoint={}V)",
        config.scan_interval_s * 1000.0,
        config.kp,
        config.ki,
        config.setpoint_v
    );
    engine.run(cycles);

    let tail = engine.history(DISPLAY_WINDOW);
    if let Some(stats) = WindowStats::from_samples(tail) {
        println!("t_end            {:.2} s", engine.state().current_time);
        println!("samples          {}", stats.samples);
        println!("mean V_sensor    {:.4} V", stats.mean_voltage);
        println!("V_sensor p-p     {:.4} V", stats.peak_to_peak_voltage());
        println!("mean lambda      {:.4}", stats.mean_lambda);
        println!("mean pulse       {:.3} ms", stats.mean_pulse_width);
    }
    if let Some(mixture) = engine.mixture_state() {
        println!("state            {}", mixture.description());
    }

    Ok(())
}
