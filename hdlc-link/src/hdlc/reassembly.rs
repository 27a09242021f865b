//! Segmentation and reassembly of information fields
//!
//! A payload longer than the negotiated maximum information length travels
//! as a run of frames whose segmentation bit is set on every frame but the
//! last. Reassembly walks an ordered frame queue; ordering itself belongs to
//! the session layer.

use crate::hdlc::address::HdlcAddress;
use crate::hdlc::control::Control;
use crate::hdlc::frame::HdlcFrame;
use crate::hdlc::negotiation::MAX_INFO_LENGTH_RANGE;
use hdlc_core::{HdlcError, HdlcResult};
use std::collections::VecDeque;

/// Default upper bound for a reassembled payload
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 64 * 1024;

// Whether `next` continues the run anchored at `anchor`
fn continues(anchor: &Control, next: &Control) -> bool {
    if !next.is_information_bearing() {
        return false;
    }
    match (anchor.ns(), next.ns()) {
        (Some(a), Some(b)) => b == (a + 1) % 8,
        (None, None) => true,
        _ => false,
    }
}

/// Splice the next segmented run in `queue` into one payload
///
/// Leading frames that carry no information are dropped. Frames inside the
/// run that do not continue it are dropped once the run completes. When the
/// queue ends while the last accepted frame still has the segmentation bit
/// set, [`HdlcError::IncompleteSegmentation`] is returned and the run stays
/// queued, so the call can be repeated after more frames arrive.
pub fn reassemble(queue: &mut VecDeque<HdlcFrame>) -> HdlcResult<Vec<u8>> {
    reassemble_bounded(queue, usize::MAX)
}

fn reassemble_bounded(queue: &mut VecDeque<HdlcFrame>, max_size: usize) -> HdlcResult<Vec<u8>> {
    while let Some(front) = queue.front() {
        if front.control().is_information_bearing() {
            break;
        }
        log::info!("Discarding non-information frame before segmented run: {}", front);
        queue.pop_front();
    }

    let Some(first) = queue.front() else {
        return Err(HdlcError::IncompleteSegmentation { frames: 0 });
    };

    let mut accepted = vec![0usize];
    let mut size = first.information_field().len();
    if size > max_size {
        queue.pop_front();
        return Err(HdlcError::RangeError(format!(
            "Segmented payload exceeds {} bytes",
            max_size
        )));
    }
    // Frames that do not continue the run still occupy the queue
    let mut skipped = 0usize;
    let mut anchor = first;
    let mut index = 0;
    while anchor.is_segmented() {
        index += 1;
        let Some(next) = queue.get(index) else {
            return Err(HdlcError::IncompleteSegmentation {
                frames: accepted.len(),
            });
        };
        if continues(&anchor.control(), &next.control()) {
            size += next.information_field().len();
            accepted.push(index);
            anchor = next;
        } else {
            skipped += next.encoded_len();
        }
        if size.saturating_add(skipped) > max_size {
            queue.drain(..=index);
            return Err(HdlcError::RangeError(format!(
                "Segmented run buffers more than {} bytes",
                max_size
            )));
        }
    }

    let mut payload = Vec::with_capacity(size);
    let mut parts = accepted.into_iter().peekable();
    for (i, frame) in queue.drain(..=index).enumerate() {
        if parts.peek() == Some(&i) {
            parts.next();
            payload.extend_from_slice(frame.information_field());
        } else {
            log::info!("Discarding frame out of segment sequence: {}", frame);
        }
    }
    Ok(payload)
}

/// Split `payload` into information frames of at most `max_info_length` octets
///
/// The first frame uses `first_control`; each later one uses the
/// [`Control::next_send`] of its predecessor. An empty payload yields a
/// single frame without information field.
pub fn split_information(
    destination: HdlcAddress,
    source: HdlcAddress,
    first_control: Control,
    payload: &[u8],
    max_info_length: u16,
) -> HdlcResult<Vec<HdlcFrame>> {
    if !MAX_INFO_LENGTH_RANGE.contains(&max_info_length) {
        return Err(HdlcError::RangeError(format!(
            "Maximum information length {} outside {:?}",
            max_info_length, MAX_INFO_LENGTH_RANGE
        )));
    }
    if payload.is_empty() {
        return Ok(vec![HdlcFrame::new(
            destination,
            source,
            first_control,
            &[],
            false,
        )?]);
    }

    let chunks: Vec<&[u8]> = payload.chunks(usize::from(max_info_length)).collect();
    let last = chunks.len() - 1;
    let mut control = first_control;
    let mut frames = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.into_iter().enumerate() {
        frames.push(HdlcFrame::new(destination, source, control, chunk, i < last)?);
        control = control.next_send();
    }
    log::debug!(
        "Split {} octet payload into {} frame(s)",
        payload.len(),
        frames.len()
    );
    Ok(frames)
}

/// Incremental reassembler fed one frame at a time
///
/// The size bound covers the accepted payload plus the encoded size of
/// queued frames that do not continue the run, so duplicates of a segment
/// cannot grow the queue without limit.
#[derive(Debug)]
pub struct SegmentReassembler {
    queue: VecDeque<HdlcFrame>,
    max_payload_size: usize,
}

impl SegmentReassembler {
    /// Create a reassembler bounded at [`DEFAULT_MAX_PAYLOAD_SIZE`]
    pub fn new() -> Self {
        Self::with_max_payload_size(DEFAULT_MAX_PAYLOAD_SIZE)
    }

    pub fn with_max_payload_size(max_payload_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max_payload_size,
        }
    }

    /// Add a frame to the queue
    pub fn enqueue(&mut self, frame: HdlcFrame) {
        self.queue.push_back(frame);
    }

    /// Complete payload, or `None` while the run is still open
    pub fn try_reassemble(&mut self) -> HdlcResult<Option<Vec<u8>>> {
        match reassemble_bounded(&mut self.queue, self.max_payload_size) {
            Ok(payload) => Ok(Some(payload)),
            Err(HdlcError::IncompleteSegmentation { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get queue length
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Drop every queued frame
    pub fn reset(&mut self) {
        self.queue.clear();
    }
}

impl Default for SegmentReassembler {
    fn default() -> Self {
        Self::new()
    }
}
