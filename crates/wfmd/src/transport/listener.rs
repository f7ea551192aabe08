//! Accept loop for the control port.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use wfm_config::ControlEndpoint;

use super::{ConnectionHandler, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const LISTENER_THREAD_NAME: &str = "scpi-control";

/// Listener bound to the control endpoint.
#[derive(Debug)]
pub struct ControlListener {
    endpoint: ControlEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl ControlListener {
    /// Resolves and binds the endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] when the host does not resolve or the
    /// port cannot be bound.
    pub fn bind(endpoint: &ControlEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
        })
    }

    /// Address actually bound, useful when the configured port is 0.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop on the `scpi-control` thread.
    ///
    /// Each connection is handed to `handler` on the listener thread itself;
    /// the next accept happens only after the handler returns.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] if the socket cannot be made non-blocking
    /// or the thread cannot be spawned.
    pub fn start(self, handler: Arc<dyn ConnectionHandler>) -> Result<ListenerHandle, ListenerError> {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let control = Arc::new(LoopControl::default());
        let loop_control = Arc::clone(&control);
        let handle = thread::Builder::new()
            .name(LISTENER_THREAD_NAME.to_owned())
            .spawn(move || run_accept_loop(&self, &loop_control, handler.as_ref()))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            control,
            handle: Some(handle),
        })
    }
}

/// State shared between the accept loop and its handle.
#[derive(Debug, Default)]
struct LoopControl {
    stopping: AtomicBool,
    /// Second handle on the connection being served, if any.
    active: Mutex<Option<TcpStream>>,
}

impl LoopControl {
    fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Ok(active) = self.active.lock()
            && let Some(stream) = active.as_ref()
        {
            close_stream(stream);
        }
    }

    /// Records the connection about to be served. If a stop raced the
    /// accept, the connection is closed straight away.
    fn track(&self, stream: &TcpStream) {
        match stream.try_clone() {
            Ok(clone) => {
                if let Ok(mut active) = self.active.lock() {
                    *active = Some(clone);
                }
            }
            Err(error) => warn!(
                target: LISTENER_TARGET,
                error = %error,
                "cannot track control connection for shutdown"
            ),
        }
        if self.is_stopping() {
            close_stream(stream);
        }
    }

    fn untrack(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }
}

fn close_stream(stream: &TcpStream) {
    // The peer may already have gone; nothing else to do then.
    let _ = stream.shutdown(Shutdown::Both);
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub struct ListenerHandle {
    control: Arc<LoopControl>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop.
    ///
    /// A connected client is disconnected; its session still resets the
    /// device and joins the streaming thread before the loop exits.
    pub fn shutdown(&self) {
        self.control.stop();
    }

    /// Waits for the listener thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(()) => Ok(()),
                Err(_) => Err(ListenerError::ThreadPanic),
            }
        } else {
            Ok(())
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.control.stop();
    }
}

fn run_accept_loop(
    listener: &ControlListener,
    control: &LoopControl,
    handler: &dyn ConnectionHandler,
) {
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        local_addr = %listener.local_addr,
        "control listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !control.is_stopping() {
        match accept_connection(&listener.listener) {
            Ok(Some(stream)) => {
                last_error = None;
                control.track(&stream);
                handler.handle(stream);
                control.untrack();
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "control accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    info!(target: LISTENER_TARGET, "control listener stopped");
}

fn accept_connection(listener: &TcpListener) -> Result<Option<TcpStream>, io::Error> {
    match listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            Ok(Some(stream))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_string(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_string(),
        port,
    })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}
