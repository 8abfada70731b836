use instant::Instant;

use crate::prettyprint_usize;

fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
}

/// Hierarchical timing of named spans. Everything is reported through the `log` facade; the
/// summary of all spans, notes and warnings is logged when the Timer is dropped.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<TimerSpan>,
    outermost_name: String,

    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new(name: &str) -> Timer {
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.to_string(),
            notes: Vec::new(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    // TODO Shouldn't use this much.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    /// Log immediately, but also repeat at the end.
    pub fn note(&mut self, line: String) {
        info!("{}", line);
        self.notes.push(line);
    }

    /// Warnings are only summarized when the Timer is dropped.
    pub fn warn(&mut self, line: String) {
        debug!("{}", line);
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &Vec<String> {
        &self.warnings
    }

    pub fn notes(&self) -> &Vec<String> {
        &self.notes
    }

    // Used to end the scope of a timer early.
    pub fn done(self) {}

    pub fn start(&mut self, name: &str) {
        info!("{}...", name);
        self.stack.push(TimerSpan {
            name: name.to_string(),
            started_at: Instant::now(),
            nested_results: Vec::new(),
        });
    }

    pub fn stop(&mut self, name: &str) {
        let span = match self.stack.pop() {
            Some(span) => span,
            None => panic!("Timer::stop({}) with nothing started", name),
        };
        assert_eq!(span.name, name);
        let line = format!(
            "{} took {}",
            name,
            prettyprint_time(elapsed_seconds(span.started_at))
        );

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(parent) => {
                parent.nested_results.push(format!("{}- {}", padding, line));
                parent.nested_results.extend(span.nested_results);
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }

        info!("{}", line);
    }
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        let stop_name = self.outermost_name.clone();

        // If we're in the middle of unwinding a panic, don't further blow up.
        match self.stack.last() {
            Some(s) if s.name == stop_name && self.stack.len() == 1 => {}
            _ => {
                warn!("dropping Timer {} with unbalanced spans", stop_name);
                return;
            }
        }

        self.stop(&stop_name);
        for line in &self.results {
            info!("{}", line);
        }
        if !self.notes.is_empty() {
            info!("{} notes:", prettyprint_usize(self.notes.len()));
            for line in &self.notes {
                info!("{}", line);
            }
        }
        if !self.warnings.is_empty() {
            warn!("{} warnings:", prettyprint_usize(self.warnings.len()));
            for line in &self.warnings {
                warn!("{}", line);
            }
        }
    }
}
