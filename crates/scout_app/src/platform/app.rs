use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use scout_core::{update, AppState, AppViewModel, Msg, Severity};
use scout_engine::{ensure_config_dir, Session, SessionStore};
use scout_logging::{scout_debug, scout_info};

use super::cli::Cli;
use super::config::AppConfig;
use super::effects::{EffectRunner, Inbound};
use super::logging;
use super::ui::render;

const EVENT_WAIT: Duration = Duration::from_millis(75);

/// Exit status after Ctrl-C.
const INTERRUPTED: u8 = 130;

pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    ensure_config_dir(&cli.config_dir)
        .with_context(|| format!("could not prepare {}", cli.config_dir.display()))?;
    logging::initialize(&cli.config_dir, cli.verbose);

    let config = AppConfig::resolve(&cli.config_dir, cli.backend_url, cli.poll_interval_ms);
    scout_info!(
        "Backend {} (poll every {:?})",
        config.backend_url,
        config.poll_interval
    );
    let plan = cli.command.plan()?;

    let session = Session::init(SessionStore::new(config.config_dir.clone()));
    let restored = session.user().cloned();
    let mut shell = Shell::new(EffectRunner::new(&config, session)?);
    shell.dispatch(Msg::SessionRestored(restored));

    for stage in plan.stages {
        for msg in stage {
            shell.dispatch(msg);
        }
        shell.settle();
        if shell.interrupted {
            break;
        }
    }

    if shell.interrupted {
        println!("Interrupted.");
        return Ok(ExitCode::from(INTERRUPTED));
    }

    let view = shell.state.view();
    for line in render::render_section(&view, plan.section) {
        println!("{line}");
    }
    scout_debug!("Session file {:?}", shell.runner.session().store().path());

    let failed = view
        .status
        .as_ref()
        .is_some_and(|status| status.severity == Severity::Error);
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Feeds messages through `update`, hands effects to the engine and prints
/// what changed.
struct Shell {
    state: AppState,
    runner: EffectRunner,
    last_view: AppViewModel,
    interrupted: bool,
}

impl Shell {
    fn new(runner: EffectRunner) -> Self {
        let state = AppState::new();
        Self {
            last_view: state.view(),
            state,
            runner,
            interrupted: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);

        if was_dirty {
            for line in render::render_updates(&self.last_view, &view) {
                println!("{line}");
            }
            self.last_view = view;
        }
    }

    /// Wait until no request is outstanding, or the user interrupts.
    fn settle(&mut self) {
        while self.state.is_busy() {
            match self.runner.next(EVENT_WAIT) {
                Some(Inbound::Msg(msg)) => self.dispatch(msg),
                Some(Inbound::Interrupted) => {
                    scout_info!("Interrupted, tearing down");
                    self.runner.teardown();
                    self.dispatch(Msg::Teardown);
                    self.interrupted = true;
                }
                None => {}
            }
        }
    }
}
