use anyhow::Result;

/// Resolves on the first termination request from the OS.
#[cfg(unix)]
pub async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => tracing::debug!("shutdown: SIGTERM"),
        _ = sigint.recv() => tracing::debug!("shutdown: SIGINT"),
        _ = tokio::signal::ctrl_c() => tracing::debug!("shutdown: ctrl_c"),
    }
    Ok(())
}

/// Resolves on the first console control event.
#[cfg(windows)]
pub async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close, ctrl_shutdown};

    let mut c = ctrl_c()?;
    let mut br = ctrl_break()?;
    let mut cl = ctrl_close()?;
    let mut sh = ctrl_shutdown()?;
    tokio::select! {
        _ = c.recv() => {},
        _ = br.recv() => {},
        _ = cl.recv() => {},
        _ = sh.recv() => {},
    }
    Ok(())
}
