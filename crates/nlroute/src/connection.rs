//! Request/response dump orchestration over a netlink socket.

use crate::builder::MessageBuilder;
use crate::error::{Error, Result};
use crate::ifmap::IfMap;
use crate::message::{
    NLM_F_DUMP, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgError, NlMsgHdr, NlMsgType, nlmsg_align,
};
use crate::messages::link::LinkRecord;
use crate::socket::NetlinkSocket;
use crate::types::{IfInfoMsg, RtMsg, rta};

/// A NETLINK_ROUTE connection.
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    /// Open a new connection.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::open()?,
        })
    }

    /// Send a dump request and return the response stream.
    ///
    /// The request is stamped with a fresh sequence number and our
    /// port id; responses not matching that sequence are discarded.
    pub async fn dump(&self, mut request: MessageBuilder) -> Result<Dump<'_>> {
        let seq = self.socket.next_seq();
        request.set_seq(seq);
        request.set_pid(self.socket.pid());
        self.socket.send(&request.finish()).await?;
        Ok(Dump {
            socket: &self.socket,
            seq,
            buf: Vec::new(),
            offset: 0,
            done: false,
        })
    }

    /// Dump all links and build the interface index table.
    ///
    /// Undecodable link messages are skipped; the table just ends up
    /// without those interfaces.
    pub async fn link_map(&self) -> Result<IfMap> {
        let mut request = MessageBuilder::new(NlMsgType::RTM_GETLINK, NLM_F_REQUEST | NLM_F_DUMP);
        request.append(&IfInfoMsg::default());

        let mut dump = self.dump(request).await?;
        let mut map = IfMap::new();
        while let Some((msg_type, payload)) = dump.next_msg().await? {
            if msg_type != NlMsgType::RTM_NEWLINK {
                tracing::debug!(msg_type, "unexpected message type in link dump");
                continue;
            }
            match LinkRecord::decode(&payload) {
                Ok(link) => map.insert(&link),
                Err(e) if e.is_decode() => {
                    tracing::warn!(error = %e, "skipping undecodable link message");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(map)
    }

    /// Start a route dump for the given routing table (fib), with an
    /// address family hint. The kernel may ignore the hint, so callers
    /// filtering by family must still check the decoded records.
    pub async fn route_dump(&self, fib: u32, family: u8) -> Result<Dump<'_>> {
        let mut request = MessageBuilder::new(NlMsgType::RTM_GETROUTE, NLM_F_REQUEST | NLM_F_DUMP);
        request.append(&RtMsg {
            rtm_family: family,
            ..Default::default()
        });
        request.append_attr_u32(rta::TABLE, fib);
        self.dump(request).await
    }
}

/// One in-flight dump: a stream of response payloads ending at
/// NLMSG_DONE.
pub struct Dump<'a> {
    socket: &'a NetlinkSocket,
    seq: u32,
    buf: Vec<u8>,
    offset: usize,
    done: bool,
}

/// One consumed frame from a response buffer.
#[derive(Debug)]
enum Frame {
    /// A data message: (type, payload past the netlink header).
    Payload(u16, Vec<u8>),
    /// NLMSG_DONE: the dump is complete.
    Done,
    /// A zero-errno NLMSG_ERROR acknowledgement.
    Ack,
}

/// Walk one frame out of `buf` starting at `*offset`.
///
/// NOOP frames and frames with a foreign sequence number are consumed
/// and skipped here. `Ok(None)` means the buffer is exhausted and the
/// caller must receive the next datagram. A non-ack NLMSG_ERROR
/// matching our sequence is fatal: the kernel aborted the dump.
fn next_frame(buf: &[u8], offset: &mut usize, seq: u32) -> Result<Option<Frame>> {
    loop {
        if *offset + NLMSG_HDRLEN > buf.len() {
            return Ok(None);
        }
        let hdr = NlMsgHdr::from_bytes(&buf[*offset..])?;
        let len = hdr.nlmsg_len as usize;
        if len < NLMSG_HDRLEN || *offset + len > buf.len() {
            return Err(Error::InvalidMessage(format!(
                "frame of {} bytes in {}-byte buffer",
                len,
                buf.len() - *offset
            )));
        }
        let payload = &buf[*offset + NLMSG_HDRLEN..*offset + len];
        let (msg_type, msg_seq) = (hdr.nlmsg_type, hdr.nlmsg_seq);
        *offset += nlmsg_align(len);

        if msg_seq != seq {
            tracing::debug!(msg_seq, expected = seq, "discarding out-of-sequence message");
            continue;
        }
        match msg_type {
            NlMsgType::NOOP => continue,
            NlMsgType::DONE => return Ok(Some(Frame::Done)),
            NlMsgType::ERROR => {
                let err = NlMsgError::from_bytes(payload)?;
                if err.is_ack() {
                    return Ok(Some(Frame::Ack));
                }
                return Err(Error::from_errno(err.error));
            }
            t => return Ok(Some(Frame::Payload(t, payload.to_vec()))),
        }
    }
}

impl Dump<'_> {
    /// Receive the next data message, or `None` once the dump is done.
    pub async fn next_msg(&mut self) -> Result<Option<(u16, Vec<u8>)>> {
        loop {
            if self.done {
                return Ok(None);
            }
            match next_frame(&self.buf, &mut self.offset, self.seq)? {
                Some(Frame::Payload(msg_type, payload)) => return Ok(Some((msg_type, payload))),
                Some(Frame::Done) | Some(Frame::Ack) => {
                    self.done = true;
                    return Ok(None);
                }
                None => {
                    let buf = self.socket.recv_msg().await?;
                    if buf.is_empty() {
                        return Err(Error::InvalidMessage(
                            "empty datagram before end of dump".into(),
                        ));
                    }
                    self.buf = buf;
                    self.offset = 0;
                }
            }
        }
    }
}
