use lambda_sim_app::{Engine, SimConfig};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;

/// Collects trace-level records emitted by the engine.
struct TraceCapture {
    lines: Mutex<Vec<String>>,
}

impl TraceCapture {
    fn status_lines(&self) -> usize {
        self.lines.lock().unwrap().iter().filter(|l| l.starts_with("T: ")).count()
    }
}

impl Log for TraceCapture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Trace && record.target().starts_with("lambda_sim_app") {
            self.lines.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: TraceCapture = TraceCapture { lines: Mutex::new(Vec::new()) };

// The logger is process-global, so everything runs in a single test
#[test]
fn test_status_line_emitted_once_per_cycle() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let sunk = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&sunk);

    let mut engine = Engine::new(&SimConfig::noiseless()).unwrap();
    engine.set_log_sink(move |_| *counter.borrow_mut() += 1);
    engine.run(3);

    assert_eq!(*sunk.borrow(), 3);
    assert_eq!(CAPTURE.status_lines(), 0);

    engine.clear_log_sink();
    engine.run(2);

    assert_eq!(*sunk.borrow(), 3);
    assert_eq!(CAPTURE.status_lines(), 2);
}
