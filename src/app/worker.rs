use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

pub(super) const ACTION_RESULT_POLL_INTERVAL: Duration = Duration::from_millis(24);

/// Runs `work` on a thread and hands its result to `on_result` on the main loop.
/// Results that arrive after `alive` goes false are dropped.
pub(super) fn spawn_worker_action<T, W, H>(alive: &Rc<Cell<bool>>, work: W, mut on_result: H)
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    H: FnMut(T) + 'static,
{
    let (tx, rx) = mpsc::channel::<T>();
    std::thread::spawn(move || {
        let result = work();
        let _ = tx.send(result);
    });

    let alive = alive.clone();
    gtk4::glib::timeout_add_local(ACTION_RESULT_POLL_INTERVAL, move || {
        if !alive.get() {
            tracing::debug!("window closed; dropping worker result");
            return gtk4::glib::ControlFlow::Break;
        }
        match rx.try_recv() {
            Ok(result) => {
                on_result(result);
                gtk4::glib::ControlFlow::Break
            }
            Err(mpsc::TryRecvError::Empty) => gtk4::glib::ControlFlow::Continue,
            Err(mpsc::TryRecvError::Disconnected) => gtk4::glib::ControlFlow::Break,
        }
    });
}
