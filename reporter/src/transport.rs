use gotham_protocol::ReportPayload;

use crate::*;

/// Connection to the platform that stores game data.
pub trait Transport {
    fn open_session(&mut self, request: &SessionRequest) -> Result<Session>;

    fn deliver(&mut self, session: &Session, payload: &ReportPayload) -> Result<()>;
}

/// Transport for playing without a platform, every call is unavailable.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn open_session(&mut self, _request: &SessionRequest) -> Result<Session> {
        Err(TransportError::Unavailable("offline".into()))
    }

    fn deliver(&mut self, _session: &Session, _payload: &ReportPayload) -> Result<()> {
        Err(TransportError::Unavailable("offline".into()))
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn open_session(&mut self, request: &SessionRequest) -> Result<Session> {
        (**self).open_session(request)
    }

    fn deliver(&mut self, session: &Session, payload: &ReportPayload) -> Result<()> {
        (**self).deliver(session, payload)
    }
}
