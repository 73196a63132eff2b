//! Real-time scheduling helpers (Linux mlockall + SCHED_FIFO).

#[cfg(target_os = "linux")]
pub fn setup_rt_once(rt: bool, prio: Option<i32>) {
    use libc::{
        MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, mlockall, sched_get_priority_max,
        sched_get_priority_min, sched_param, sched_setscheduler,
    };
    use std::sync::OnceLock;
    static RT_ONCE: OnceLock<()> = OnceLock::new();

    if !rt {
        return;
    }

    fn try_lock_memory() -> eyre::Result<()> {
        let rc = unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        // retry with resident pages only
        if unsafe { mlockall(MCL_CURRENT) } == 0 {
            tracing::warn!(error = %err, "mlockall(current|future) failed; locked current pages only");
            return Ok(());
        }
        Err(eyre::eyre!(
            "mlockall failed: {err}; hint: needs CAP_IPC_LOCK (or root) and sufficient 'ulimit -l'"
        ))
    }

    fn try_fifo(prio: Option<i32>) -> eyre::Result<i32> {
        let (min, max) = unsafe {
            let min = sched_get_priority_min(SCHED_FIFO);
            let max = sched_get_priority_max(SCHED_FIFO);
            if min < 0 || max < 0 { (1, 99) } else { (min, max) }
        };
        let prio_val = prio.unwrap_or(max).clamp(min, max);
        let param = sched_param {
            sched_priority: prio_val,
        };
        let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
        if rc != 0 {
            return Err(eyre::eyre!(
                "{}; hint: needs CAP_SYS_NICE or root",
                std::io::Error::last_os_error()
            ));
        }
        Ok(prio_val)
    }

    RT_ONCE.get_or_init(|| {
        match try_lock_memory() {
            Ok(()) => tracing::info!("RT: memory locked"),
            Err(err) => tracing::warn!(error = %err, "RT: memory lock not applied"),
        }
        match try_fifo(prio) {
            Ok(p) => tracing::info!(prio = p, "RT: SCHED_FIFO applied"),
            Err(err) => tracing::warn!(error = %err, ?prio, "RT: sched_setscheduler(SCHED_FIFO) failed"),
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub fn setup_rt_once(rt: bool, _prio: Option<i32>) {
    if rt {
        tracing::warn!("RT: real-time mode is only supported on Linux; ignoring --rt");
    }
}
