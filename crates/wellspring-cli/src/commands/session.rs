use std::time::Duration;

use clap::Subcommand;
use tokio::sync::mpsc;
use wellspring_core::session::{self, Boundary, PhaseSequencer, Progress, ProgressProjector};
use wellspring_core::{Catalog, Config, Event, IntervalTicks, SessionClock, SessionEngine, SessionRecord};

use super::format_clock;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a session in real time (Ctrl-C stops and records it)
    Run {
        /// Pattern or routine id; defaults to display.default_pattern
        id: Option<String>,
        /// Milliseconds per logical second, overriding session.tick_interval_ms
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Print every event as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Print the phase timeline without waiting
    Preview {
        /// Pattern or routine id
        id: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run { id, tick_ms, json } => {
            let config = Config::load()?;
            let id = id.unwrap_or_else(|| config.display.default_pattern.clone());
            let interval = match tick_ms {
                Some(0) => return Err("--tick-ms must be at least 1".into()),
                Some(ms) => Duration::from_millis(ms),
                None => config.session.tick_interval(),
            };

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()?;
            let record = runtime.block_on(run_session(&config, &id, interval, json))?;

            // JSON mode already printed the final event, record included.
            if let (Some(record), false) = (record, json) {
                print_record(&record);
            }
        }
        SessionAction::Preview { id, json } => {
            let pattern = Catalog::builtin().resolve(&id)?;
            let timeline = session::preview(&pattern)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&timeline)?);
                return Ok(());
            }

            println!(
                "{} ({}), {} total",
                pattern.name,
                pattern.id,
                format_clock(pattern.total_duration_secs())
            );
            for entry in &timeline {
                println!(
                    "  {:>6}  cycle {:>2}/{}  {:<20} {:>4}s  {}",
                    format_clock(entry.at_secs),
                    entry.cycle_index + 1,
                    pattern.cycles,
                    entry.phase_name,
                    entry.duration_secs,
                    entry.cue.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

/// Drive one session to its end. Returns the record, if one was made.
async fn run_session(
    config: &Config,
    id: &str,
    interval: Duration,
    json: bool,
) -> Result<Option<SessionRecord>, Box<dyn std::error::Error>> {
    let pattern = Catalog::builtin().resolve(id)?;
    let sequencer = PhaseSequencer::new(&pattern)?;
    let projector = ProgressProjector::new(&pattern, &sequencer);
    let engine = SessionEngine::with_recorder(config.session.recorder());
    let clock = SessionClock::new(engine, IntervalTicks::new(interval));

    let (tx, mut rx) = mpsc::unbounded_channel();
    clock.subscribe(move |event| {
        let _ = tx.send(event.clone());
    });

    clock.start(&pattern)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut last_step = None;

    loop {
        tokio::select! {
            signal = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                signal?;
                tracing::info!("interrupted, stopping session");
                if clock.stop().is_none() {
                    clock.reset();
                }
            }
            event = rx.recv() => {
                let Some(event) = event else { return Ok(None) };
                if json {
                    println!("{}", serde_json::to_string(&event)?);
                }
                match &event {
                    Event::SessionCompleted { record, .. } | Event::SessionStopped { record, .. } => {
                        return Ok(Some(record.clone()));
                    }
                    Event::SessionAborted { reason, .. } => {
                        return Err(format!("session aborted: {reason}").into());
                    }
                    Event::SessionReset { .. } => return Ok(None),
                    _ if !json => {
                        if let Some((boundary, progress)) = event_progress(&projector, &event) {
                            if matches!(boundary, Some(Boundary::PhaseChanged | Boundary::CycleCompleted)) {
                                println!("{}", phase_line(&progress));
                            }
                            if config.display.show_script && progress.step_index != last_step {
                                last_step = progress.step_index;
                                if let Some(text) = &progress.step_text {
                                    println!("    {text}");
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Progress as of the state carried by `event`, with the boundary it crossed.
/// The first phase is announced on start.
fn event_progress(
    projector: &ProgressProjector<'_>,
    event: &Event,
) -> Option<(Option<Boundary>, Progress)> {
    match event {
        Event::SessionStarted { state, .. } => {
            Some((Some(Boundary::PhaseChanged), projector.project(state)))
        }
        Event::Ticked {
            state, boundary, ..
        } => Some((*boundary, projector.project(state))),
        _ => None,
    }
}

fn phase_line(progress: &Progress) -> String {
    format!(
        "[{}/{}] {:<12} {:>4}s  {:>5.1}%",
        progress.display_cycle,
        progress.cycles,
        progress.cue.as_deref().unwrap_or(&progress.phase_name),
        progress.remaining_secs,
        progress.percent_complete
    )
}

fn print_record(record: &SessionRecord) {
    println!(
        "{} {} after {} ({} cycles)",
        record.pattern_name,
        if record.completed { "completed" } else { "ended early" },
        format_clock(record.elapsed_secs),
        record.completed_cycles
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_comes_from_the_event_not_the_live_engine() {
        let pattern = Catalog::builtin().get("box").unwrap().clone();
        let sequencer = PhaseSequencer::new(&pattern).unwrap();
        let projector = ProgressProjector::new(&pattern, &sequencer);

        let mut engine = SessionEngine::new();
        engine.start(&pattern).unwrap();
        let mut fourth = None;
        for _ in 0..4 {
            fourth = engine.tick();
        }
        // The engine keeps moving before the buffered event is printed.
        engine.tick();
        engine.tick();

        let (boundary, progress) = event_progress(&projector, &fourth.unwrap()).unwrap();
        assert_eq!(boundary, Some(Boundary::PhaseChanged));
        assert_eq!(progress.phase_name, "hold");
        assert_eq!(progress.remaining_secs, 4);
        assert_eq!(progress.elapsed_secs, 4);
        assert_eq!(
            phase_line(&progress),
            "[1/8] Hold            4s    3.1%"
        );
        assert_eq!(engine.progress().unwrap().remaining_secs, 2);
    }

    #[test]
    fn lifecycle_only_events_have_no_progress_line() {
        let pattern = Catalog::builtin().get("box").unwrap().clone();
        let sequencer = PhaseSequencer::new(&pattern).unwrap();
        let projector = ProgressProjector::new(&pattern, &sequencer);

        let mut engine = SessionEngine::new();
        let started = engine.start(&pattern).unwrap();
        let (boundary, progress) = event_progress(&projector, &started).unwrap();
        assert_eq!(boundary, Some(Boundary::PhaseChanged));
        assert_eq!(progress.cue.as_deref(), Some("Breathe In"));

        let paused = engine.pause().unwrap();
        assert!(event_progress(&projector, &paused).is_none());
    }
}
