use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use gotham_protocol::{ReportPayload, ReportSink};

use crate::*;

/// Sends payloads through a [`Transport`], buffering whatever cannot be
/// delivered. Never reports a failure back to the caller.
pub struct BufferedReporter<T> {
    transport: T,
    request: SessionRequest,
    guard: Arc<SessionGuard>,
    session: Option<Session>,
    buffer: OfflineBuffer,
}

impl<T: Transport> BufferedReporter<T> {
    pub fn new(transport: T, request: SessionRequest) -> Self {
        Self {
            transport,
            request,
            guard: Arc::new(SessionGuard::default()),
            session: None,
            buffer: OfflineBuffer::default(),
        }
    }

    /// Shares session coalescing with other reporters.
    pub fn with_guard(mut self, guard: Arc<SessionGuard>) -> Self {
        self.guard = guard;
        self
    }

    /// Picks up records left over from an earlier run.
    pub fn with_buffer(mut self, buffer: OfflineBuffer) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn buffer(&self) -> &OfflineBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> OfflineBuffer {
        self.buffer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current session, opening one first if needed.
    pub fn session(&mut self) -> Session {
        if let Some(session) = &self.session {
            return session.clone();
        }

        let transport = &mut self.transport;
        let request = &self.request;
        let session = self.guard.get_or_init(&request.key(), || {
            match transport.open_session(request) {
                Ok(session) => session,
                Err(err) => {
                    log::warn!("Could not open a platform session, playing offline: {}", err);
                    Session::local(request, utc_now())
                }
            }
        });
        self.session = Some(session.clone());
        session
    }

    /// Drops the current session so the next report tries the platform again.
    pub fn reconnect(&mut self) {
        self.session = None;
        self.guard.forget(&self.request.key());
    }

    /// Retries buffered records, returns how many were delivered.
    pub fn flush(&mut self) -> usize {
        let session = self.session();
        if session.is_local() {
            return 0;
        }

        let mut delivered = 0;
        for record in self.buffer.drain() {
            match self.transport.deliver(&session, &record.payload) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    log::warn!("Retry of slot {} failed: {}", record.slot, err);
                    self.buffer.restore(record);
                }
            }
        }
        log::debug!("Flushed {} records, {} still buffered", delivered, self.buffer.len());
        delivered
    }
}

impl<T: Transport> ReportSink for BufferedReporter<T> {
    fn submit(&mut self, payload: ReportPayload) {
        let session = self.session();
        if session.is_local() {
            log::debug!("Local session, buffering slot {}", payload.slot());
            self.buffer.push(payload, utc_now());
            return;
        }

        if let Err(err) = self.transport.deliver(&session, &payload) {
            log::warn!("Delivery of slot {} failed, buffering: {}", payload.slot(), err);
            self.buffer.push(payload, utc_now());
        }
    }
}

/// Hands payloads to a background reporter without waiting on it.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: Sender<ReportPayload>,
}

impl ReportSink for ChannelSink {
    fn submit(&mut self, payload: ReportPayload) {
        if self.sender.send(payload).is_err() {
            log::warn!("Reporter thread is gone, payload dropped");
        }
    }
}

/// Moves `reporter` onto its own thread. The thread runs until every
/// [`ChannelSink`] is dropped and then gives the reporter back.
pub fn spawn_reporter<T>(mut reporter: BufferedReporter<T>) -> (ChannelSink, JoinHandle<BufferedReporter<T>>)
where
    T: Transport + Send + 'static,
{
    let (sender, receiver) = mpsc::channel::<ReportPayload>();
    let handle = thread::spawn(move || {
        for payload in receiver {
            reporter.submit(payload);
        }
        reporter
    });
    (ChannelSink { sender }, handle)
}
