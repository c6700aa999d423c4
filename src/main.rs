//! statusline - build status line demo
//!
//! Replays a simulated parallel build through the status output so the renderer can be
//! watched on a real terminal, piped, or resized while it runs.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use parking_lot::Mutex;
use statusline::{
    new_status_output, Action, ActionResult, Counts, FixedWidth, MsgLevel, StatusConfig,
    StatusOutput, TtyProbe,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Bookkeeping shared by the simulated workers.
#[derive(Default)]
struct BuildProgress {
    counts: Counts,
    next_action: usize,
    failed: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging for development
    env_logger::init();

    let matches = Command::new("statusline")
        .version(statusline::VERSION)
        .about("Replay a simulated build through the terminal status line")
        .long_about(
            "statusline runs a fake parallel build and reports it the way a build tool \
             would: a single bold progress line on interactive terminals, plain lines \
             everywhere else. NINJA_STATUS sets the progress template.",
        )
        .arg(
            Arg::new("actions")
                .long("actions")
                .short('n')
                .help("Number of actions to simulate")
                .value_parser(value_parser!(usize))
                .default_value("40"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .help("Number of concurrent workers")
                .value_parser(value_parser!(usize))
                .default_value("4"),
        )
        .arg(
            Arg::new("fail-every")
                .long("fail-every")
                .help("Fail every Nth action (0 disables failures)")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            Arg::new("warn-every")
                .long("warn-every")
                .help("Give every Nth action some compiler output (0 disables)")
                .value_parser(value_parser!(usize))
                .default_value("7"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Progress template, overriding NINJA_STATUS"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .help("Pretend the terminal has this many columns")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only print failures and action output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stderr")
                .long("stderr")
                .help("Report progress on stderr instead of stdout")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dumb")
                .long("dumb")
                .help("Never use the in-place status line")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = base_config()?
        .apply_env()
        .context("invalid status configuration in environment")?;
    if let Some(format) = matches.get_one::<String>("format") {
        config.status_format = format.clone();
    }
    config.quiet |= matches.get_flag("quiet");
    config.force_dumb |= matches.get_flag("dumb");

    let width = matches.get_one::<usize>("width").copied();
    let output = if matches.get_flag("stderr") {
        open_output(std::io::stderr(), TtyProbe::stderr(), width, &config)?
    } else {
        open_output(std::io::stdout(), TtyProbe::stdout(), width, &config)?
    };

    let total = *matches.get_one::<usize>("actions").unwrap_or(&40);
    let jobs = (*matches.get_one::<usize>("jobs").unwrap_or(&4)).max(1);
    let fail_every = *matches.get_one::<usize>("fail-every").unwrap_or(&0);
    let warn_every = *matches.get_one::<usize>("warn-every").unwrap_or(&0);

    let progress = Arc::new(Mutex::new(BuildProgress {
        counts: Counts {
            total_actions: total,
            ..Counts::default()
        },
        ..BuildProgress::default()
    }));

    output.message(
        MsgLevel::Status,
        &format!("starting build with {} jobs", jobs),
    )?;

    let mut workers = Vec::with_capacity(jobs);
    for _ in 0..jobs {
        let output = Arc::clone(&output);
        let progress = Arc::clone(&progress);
        workers.push(tokio::spawn(async move {
            run_worker(output, progress, fail_every, warn_every).await
        }));
    }
    for worker in workers {
        worker.await.context("build worker panicked")??;
    }

    let failed = progress.lock().failed;
    if failed == 0 {
        output.message(MsgLevel::Print, "build completed successfully")?;
    } else {
        output.message(MsgLevel::Error, &format!("{} of {} actions", failed, total))?;
    }
    output.flush()?;

    if failed > 0 {
        anyhow::bail!("build failed");
    }
    Ok(())
}

/// Status output on `writer`; `width` replaces the terminal query when given.
fn open_output<W: Write + Send + 'static>(
    writer: W,
    tty: TtyProbe,
    width: Option<usize>,
    config: &StatusConfig,
) -> Result<Arc<dyn StatusOutput>> {
    let output = match width {
        Some(width) => new_status_output(writer, FixedWidth(Some(width)), config)?,
        None => new_status_output(writer, tty, config)?,
    };
    Ok(Arc::from(output))
}

#[cfg(feature = "config")]
fn base_config() -> Result<StatusConfig> {
    Ok(StatusConfig::load_default()?)
}

#[cfg(not(feature = "config"))]
fn base_config() -> Result<StatusConfig> {
    Ok(StatusConfig::default())
}

async fn run_worker(
    output: Arc<dyn StatusOutput>,
    progress: Arc<Mutex<BuildProgress>>,
    fail_every: usize,
    warn_every: usize,
) -> statusline::Result<()> {
    loop {
        let (index, counts) = {
            let mut progress = progress.lock();
            if progress.next_action >= progress.counts.total_actions {
                return Ok(());
            }
            let index = progress.next_action;
            progress.next_action += 1;
            progress.counts.started_actions += 1;
            progress.counts.running_actions += 1;
            (index, progress.counts)
        };

        let action = simulated_action(index);
        output.start_action(&action, counts)?;

        tokio::time::sleep(Duration::from_millis(30 + (index as u64 * 37) % 90)).await;

        let number = index + 1;
        let result = if fail_every > 0 && number % fail_every == 0 {
            ActionResult::failure(
                action,
                format!("src/unit_{}.c:12:5: error: use of undeclared identifier 'x'", index),
                "exit status 1",
            )
        } else if warn_every > 0 && number % warn_every == 0 {
            ActionResult::success(
                action,
                format!("src/unit_{}.c:3:9: warning: unused variable 'tmp'", index),
            )
        } else {
            ActionResult::success(action, "")
        };

        if index % 10 == 9 {
            output.message(MsgLevel::Print, &format!("checkpoint after {} actions", number))?;
        }

        let counts = {
            let mut progress = progress.lock();
            progress.counts.running_actions -= 1;
            progress.counts.finished_actions += 1;
            if result.is_failure() {
                progress.failed += 1;
            }
            progress.counts
        };
        output.finish_action(&result, counts)?;
    }
}

fn simulated_action(index: usize) -> Action {
    let source = format!("src/unit_{}.c", index);
    let object = format!("out/unit_{}.o", index);
    // Every fifth action has no description so the command is shown instead.
    let description = if index % 5 == 4 {
        String::new()
    } else {
        format!("compiling {}", source)
    };
    Action::new(description, format!("cc -O2 -c {} -o {}", source, object)).with_outputs([object])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        // Ensure version is accessible
        assert!(!statusline::VERSION.is_empty());
    }

    #[test]
    fn fixed_width_output_follows_config() {
        let config = StatusConfig {
            force_dumb: true,
            ..StatusConfig::default()
        };
        let output = open_output(std::io::sink(), TtyProbe::stderr(), Some(80), &config).unwrap();
        output.message(MsgLevel::Print, "to nowhere").unwrap();
        output.flush().unwrap();
    }

    #[test]
    fn simulated_actions_fall_back_to_command() {
        let described = simulated_action(0);
        assert_eq!(described.display_text(), "compiling src/unit_0.c");
        assert_eq!(described.outputs, vec!["out/unit_0.o".to_string()]);

        let bare = simulated_action(4);
        assert_eq!(
            bare.display_text(),
            "cc -O2 -c src/unit_4.c -o out/unit_4.o"
        );
    }
}
