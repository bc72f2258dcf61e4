use crate::message::Outbound;
use crate::registry::InstanceId;
use serde::Serialize;
use std::cell::RefCell;
use std::io::{self, Write};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Info,
    Error,
}

// `post` never blocks and reports nothing back. A view that misses a message
// catches up on the next state change.
pub trait Host {
    fn post(&self, id: InstanceId, message: Outbound);

    fn notify(&self, level: Notice, text: &str) {
        match level {
            Notice::Info => log::info!("{text}"),
            Notice::Error => log::error!("{text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Post(InstanceId, Outbound),
    Notice(Notice, String),
}

#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: UnboundedSender<HostEvent>,
}

impl ChannelHost {
    pub fn new(tx: UnboundedSender<HostEvent>) -> Self {
        Self { tx }
    }
}

impl Host for ChannelHost {
    fn post(&self, id: InstanceId, message: Outbound) {
        if self.tx.send(HostEvent::Post(id, message)).is_err() {
            log::debug!("view loop gone; dropped message for {id}");
        }
    }

    fn notify(&self, level: Notice, text: &str) {
        let _ = self.tx.send(HostEvent::Notice(level, text.to_string()));
    }
}

#[derive(Serialize)]
struct PostedLine<'a> {
    instance: u64,
    message: &'a Outbound,
}

// One JSON object per line: `{"instance":1,"message":{"command":...}}`.
pub struct LineHost<W> {
    out: RefCell<W>,
}

impl<W: Write> LineHost<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }
}

impl<W: Write> Host for LineHost<W> {
    fn post(&self, id: InstanceId, message: Outbound) {
        let line = PostedLine {
            instance: id.get(),
            message: &message,
        };
        let mut out = self.out.borrow_mut();
        let written = serde_json::to_writer(&mut *out, &line)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());
        if let Err(err) = written {
            log::warn!("could not post to {id}: {err}");
        }
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingHost {
    posted: RefCell<Vec<(InstanceId, Outbound)>>,
}

#[cfg(test)]
impl RecordingHost {
    pub fn take(&self) -> Vec<(InstanceId, Outbound)> {
        self.posted.take()
    }

    pub fn sent_to(&self, id: InstanceId) -> Vec<Outbound> {
        self.posted
            .borrow()
            .iter()
            .filter(|(to, _)| *to == id)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.posted.borrow().is_empty()
    }
}

#[cfg(test)]
impl Host for RecordingHost {
    fn post(&self, id: InstanceId, message: Outbound) {
        self.posted.borrow_mut().push((id, message));
    }
}
