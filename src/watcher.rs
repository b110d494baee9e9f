//! Watcher (C11): debounces filesystem events into incremental pushes with
//! a grace period to avoid feedback loops (§4.11).

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher as NotifyWatcherTrait};

use crate::error::EngineError;
use crate::ignore_engine::IgnoreRules;
use crate::meta::{MetaStore, terminate_previous_watcher};
use crate::ops::push::{PushParams, push};
use crate::remote::RemoteStore;
use crate::status::ItemStatusManager;
use crate::types::LastRun;

pub struct WatcherParams<'a> {
    pub target_dir: &'a Path,
    pub val_id: uuid::Uuid,
    pub branch_id: uuid::Uuid,
    pub ignore_rules: &'a IgnoreRules,
    pub debounce_delay_ms: u64,
    pub grace_period_ms: u64,
    pub concurrency: usize,
}

impl WatcherParams<'_> {
    fn push_params(&self, dry_run: bool) -> PushParams<'_> {
        PushParams {
            target_dir: self.target_dir,
            val_id: self.val_id,
            branch_id: self.branch_id,
            ignore_rules: self.ignore_rules,
            dry_run,
            concurrency: self.concurrency,
        }
    }
}

fn is_access_event(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Access(_))
}

/// Runs the watcher loop until a termination signal arrives. `callback` is
/// invoked once per push that actually applied changes.
pub fn watch(
    params: WatcherParams<'_>,
    remote: &dyn RemoteStore,
    meta_store: &MetaStore,
    mut callback: impl FnMut(&ItemStatusManager),
) -> Result<(), EngineError> {
    // Step 1: best-effort terminate a previously recorded watcher.
    let state = meta_store.load_state()?;
    terminate_previous_watcher(state.last_run.as_ref());

    // Step 2: one synchronous initial push.
    let initial = push(params.push_params(false), remote)?;
    if initial.changes() > 0 {
        callback(&initial);
    }

    meta_store.do_with_state(|s| {
        s.last_run = Some(LastRun {
            pid: std::process::id() as i64,
        });
        Ok(())
    })?;

    // Step 3: install termination handlers.
    let shutdown = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        let _ = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown));
        let _ = signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&shutdown));
    }

    // Step 4: open a recursive filesystem watch.
    let (tx, rx) = crossbeam_channel::unbounded::<Event>();
    let mut fs_watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })
    .map_err(|e| EngineError::transport(e.to_string()))?;
    fs_watcher
        .watch(params.target_dir, RecursiveMode::Recursive)
        .map_err(|e| EngineError::transport(e.to_string()))?;

    let grace_flag = Arc::new(AtomicBool::new(false));
    let run_result = event_loop(&params, remote, &rx, &shutdown, &grace_flag, &mut callback);

    meta_store.do_with_state(|s| {
        s.last_run = None;
        Ok(())
    })?;

    run_result
}

fn event_loop(
    params: &WatcherParams<'_>,
    remote: &dyn RemoteStore,
    rx: &crossbeam_channel::Receiver<Event>,
    shutdown: &AtomicBool,
    grace_flag: &AtomicBool,
    callback: &mut impl FnMut(&ItemStatusManager),
) -> Result<(), EngineError> {
    while !shutdown.load(Ordering::SeqCst) {
        let first = match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(event) => event,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        };

        if is_access_event(&first.kind) {
            continue;
        }

        // Debounce: drain further non-access events until quiescence.
        loop {
            match rx.recv_timeout(Duration::from_millis(params.debounce_delay_ms)) {
                Ok(_) => continue,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => break,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }

        // (a) If a grace-period flag is set, drop this trigger.
        if grace_flag.load(Ordering::SeqCst) {
            continue;
        }
        // (b) Set the grace flag.
        grace_flag.store(true, Ordering::SeqCst);

        // (c) Invoke Push; report if it applied changes.
        match push(params.push_params(false), remote) {
            Ok(changes) => {
                if changes.changes() > 0 {
                    callback(&changes);
                }
            }
            // (d) Swallow remote 404 / local NotFound races; everything
            // else propagates.
            Err(e) if e.is_watcher_recoverable() => {}
            Err(e) => return Err(e),
        }

        // (e) Sleep the grace period, then clear the flag.
        std::thread::sleep(Duration::from_millis(params.grace_period_ms));
        grace_flag.store(false, Ordering::SeqCst);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_events_are_ignored() {
        assert!(is_access_event(&EventKind::Access(notify::event::AccessKind::Any)));
        assert!(!is_access_event(&EventKind::Modify(notify::event::ModifyKind::Any)));
        assert!(!is_access_event(&EventKind::Create(notify::event::CreateKind::Any)));
    }
}
