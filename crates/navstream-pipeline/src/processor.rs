use navstream_frame::TelemetryFrame;

/// Downstream handler for parsed frames.
///
/// Called synchronously on the consumer thread, once per frame, in wire
/// order. A slow handler stalls the consumer (and eventually the reader,
/// under the blocking overflow policy); nothing is buffered on its behalf.
/// Handlers own their failures and should not panic.
pub trait FrameProcessor: Send {
    fn handle(&mut self, frame: TelemetryFrame);
}

impl<F> FrameProcessor for F
where
    F: FnMut(TelemetryFrame) + Send,
{
    fn handle(&mut self, frame: TelemetryFrame) {
        self(frame)
    }
}
