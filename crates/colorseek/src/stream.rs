//! Frame-at-a-time driver between a frame source and a result sink.
//!
//! The detector itself never touches a transport. A [`FrameSource`] hands
//! over one [`RawFrame`] at a time, [`run`] converts and processes it fully,
//! then passes the outcome to a [`DetectionSink`] before asking for the next
//! frame. There is no queue: if the source produces faster than frames are
//! processed, dropping or buffering is the source's business.

use std::collections::VecDeque;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use colorseek_core::Frame;
use colorseek_detect::io::FrameReport;
use colorseek_detect::{DetectionResult, DetectionTrace, Detector};

use crate::frame::{convert_frame, DecodeError, Encoding, RawFrame};

/// A raw frame plus a human-readable label (file name, sequence number...).
#[derive(Clone, Debug)]
pub struct SourceFrame {
    pub label: String,
    pub raw: RawFrame,
}

/// Producer of raw frames.
pub trait FrameSource {
    /// Next frame, or `None` once the stream has ended.
    fn next_frame(&mut self) -> Option<SourceFrame>;
}

/// Consumer of per-frame outcomes.
pub trait DetectionSink {
    /// Called once per successfully decoded frame.
    fn emit(&mut self, label: &str, frame: &Frame, result: &DetectionResult);

    /// Called instead of [`DetectionSink::emit`] when a frame fails to decode.
    fn skipped(&mut self, label: &str, err: &DecodeError) {
        let _ = (label, err);
    }

    /// Whether this sink needs the intermediate masks of each frame.
    fn wants_trace(&self) -> bool {
        false
    }

    /// Called instead of [`DetectionSink::emit`] when [`run`] produced a
    /// trace, which it does once any sink asks for one.
    fn emit_trace(&mut self, label: &str, frame: &Frame, trace: &DetectionTrace) {
        self.emit(label, frame, &trace.result);
    }
}

/// Counters for one [`run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub detected: usize,
    pub acquired: usize,
}

/// Convert and detect a single raw frame.
pub fn process_frame(detector: &Detector, raw: &RawFrame) -> Result<DetectionResult, DecodeError> {
    let frame = convert_frame(raw)?;
    Ok(detector.detect(&frame))
}

/// Drain `source` through `detector` into `sink`.
///
/// Frames that fail to decode are logged, reported through
/// [`DetectionSink::skipped`] and otherwise ignored; processing continues
/// with the next frame.
pub fn run<S, K>(detector: &Detector, source: &mut S, sink: &mut K) -> RunSummary
where
    S: FrameSource + ?Sized,
    K: DetectionSink + ?Sized,
{
    let mut summary = RunSummary::default();
    while let Some(SourceFrame { label, raw }) = source.next_frame() {
        let frame = match convert_frame(&raw) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("skipping frame {label}: {err}");
                summary.skipped += 1;
                sink.skipped(&label, &err);
                continue;
            }
        };
        let result = if sink.wants_trace() {
            let trace = detector.detect_with_trace(&frame);
            sink.emit_trace(&label, &frame, &trace);
            trace.result
        } else {
            let result = detector.detect(&frame);
            sink.emit(&label, &frame, &result);
            result
        };
        summary.processed += 1;
        summary.detected += usize::from(result.is_detected());
        summary.acquired += usize::from(result.acquired);
    }
    log::info!(
        "processed {} frame(s), skipped {}, acquired in {}",
        summary.processed,
        summary.skipped,
        summary.acquired
    );
    summary
}

/// In-memory source, mostly for tests and replay.
#[derive(Clone, Debug, Default)]
pub struct QueueSource {
    frames: VecDeque<SourceFrame>,
}

impl QueueSource {
    pub fn new(frames: impl IntoIterator<Item = SourceFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, raw: RawFrame) {
        self.frames.push_back(SourceFrame {
            label: label.into(),
            raw,
        });
    }
}

impl FrameSource for QueueSource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        self.frames.pop_front()
    }
}

/// Reads PNG/JPEG files one by one, in the order given.
///
/// Files that cannot be read are logged and skipped; files that read but do
/// not decode reach the sink as skipped frames.
#[derive(Clone, Debug)]
pub struct ImageFileSource {
    paths: VecDeque<PathBuf>,
}

impl ImageFileSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// All `.png`, `.jpg` and `.jpeg` files directly inside `dir`, sorted by
    /// name.
    pub fn from_dir(dir: impl AsRef<Path>) -> io::Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && encoding_for_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(Self::new(paths))
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push_back(path.into());
    }

    /// Move every pending path of `other` to the back of this source.
    pub fn append(&mut self, other: &mut Self) {
        self.paths.append(&mut other.paths);
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

/// Compressed encoding implied by a file extension.
pub fn encoding_for_path(path: &Path) -> Option<Encoding> {
    let ext = path.extension()?.to_str()?;
    match ext.parse::<Encoding>().ok()? {
        enc @ (Encoding::Png | Encoding::Jpeg) => Some(enc),
        _ => None,
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Option<SourceFrame> {
        while let Some(path) = self.paths.pop_front() {
            let label = path.display().to_string();
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(err) => {
                    log::warn!("cannot read {label}: {err}");
                    continue;
                }
            };
            let encoding = encoding_for_path(&path).unwrap_or(Encoding::Png);
            return Some(SourceFrame {
                label,
                raw: RawFrame::compressed(encoding, data),
            });
        }
        None
    }
}

/// Collects a [`FrameReport`] per frame.
#[derive(Clone, Debug, Default)]
pub struct ReportSink {
    pub frames: Vec<FrameReport>,
}

impl DetectionSink for ReportSink {
    fn emit(&mut self, label: &str, frame: &Frame, result: &DetectionResult) {
        let mut report = FrameReport::new(label);
        report.set_detection(frame.width(), frame.height(), *result);
        self.frames.push(report);
    }

    fn skipped(&mut self, label: &str, err: &DecodeError) {
        let mut report = FrameReport::new(label);
        report.set_error(err);
        self.frames.push(report);
    }
}

/// Writes one JSON [`FrameReport`] per line, e.g. to stdout for a publisher.
///
/// The first write error is kept and later frames are dropped; check it with
/// [`JsonLinesSink::finish`].
pub struct JsonLinesSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write(&mut self, report: &FrameReport) {
        if self.error.is_some() {
            return;
        }
        let res = serde_json::to_writer(&mut self.writer, report)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(err) = res {
            log::error!("result sink failed: {err}");
            self.error = Some(err);
        }
    }
}

impl<W: Write> DetectionSink for JsonLinesSink<W> {
    fn emit(&mut self, label: &str, frame: &Frame, result: &DetectionResult) {
        let mut report = FrameReport::new(label);
        report.set_detection(frame.width(), frame.height(), *result);
        self.write(&report);
    }

    fn skipped(&mut self, label: &str, err: &DecodeError) {
        let mut report = FrameReport::new(label);
        report.set_error(err);
        self.write(&report);
    }
}

impl<K: DetectionSink + ?Sized> DetectionSink for &mut K {
    fn emit(&mut self, label: &str, frame: &Frame, result: &DetectionResult) {
        (**self).emit(label, frame, result);
    }

    fn skipped(&mut self, label: &str, err: &DecodeError) {
        (**self).skipped(label, err);
    }

    fn wants_trace(&self) -> bool {
        (**self).wants_trace()
    }

    fn emit_trace(&mut self, label: &str, frame: &Frame, trace: &DetectionTrace) {
        (**self).emit_trace(label, frame, trace);
    }
}

/// Fans every event out to two sinks.
pub struct Tee<A, B>(pub A, pub B);

impl<A: DetectionSink, B: DetectionSink> DetectionSink for Tee<A, B> {
    fn emit(&mut self, label: &str, frame: &Frame, result: &DetectionResult) {
        self.0.emit(label, frame, result);
        self.1.emit(label, frame, result);
    }

    fn skipped(&mut self, label: &str, err: &DecodeError) {
        self.0.skipped(label, err);
        self.1.skipped(label, err);
    }

    fn wants_trace(&self) -> bool {
        self.0.wants_trace() || self.1.wants_trace()
    }

    fn emit_trace(&mut self, label: &str, frame: &Frame, trace: &DetectionTrace) {
        self.0.emit_trace(label, frame, trace);
        self.1.emit_trace(label, frame, trace);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorseek_detect::DetectorParams;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RawFrame {
        let data = rgb.repeat(width as usize * height as usize);
        RawFrame::packed(width, height, Encoding::Rgb8, data)
    }

    #[test]
    fn decode_failure_skips_only_that_frame() {
        let detector = Detector::new(DetectorParams::default()).expect("valid");
        let mut source = QueueSource::default();
        source.push("ok-1", solid(8, 8, [0, 200, 0]));
        source.push("broken", RawFrame::packed(8, 8, Encoding::Rgb8, vec![0; 10]));
        source.push("ok-2", solid(8, 8, [50, 50, 50]));

        let mut sink = ReportSink::default();
        let summary = run(&detector, &mut source, &mut sink);

        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                skipped: 1,
                detected: 1,
                acquired: 1,
            }
        );
        let labels: Vec<_> = sink.frames.iter().map(|f| f.frame.as_str()).collect();
        assert_eq!(labels, ["ok-1", "broken", "ok-2"]);
        assert!(sink.frames[1].detection.is_none());
        assert!(sink.frames[1].error.is_some());
        assert_eq!(sink.frames[2].width, Some(8));
    }

    #[test]
    fn json_lines_sink_writes_one_line_per_frame() {
        let detector = Detector::new(DetectorParams::default()).expect("valid");
        let mut source = QueueSource::default();
        source.push("a", solid(4, 4, [10, 10, 10]));
        source.push("b", RawFrame::compressed(Encoding::Jpeg, vec![0xff]));

        let mut sink = JsonLinesSink::new(Vec::new());
        run(&detector, &mut source, &mut sink);
        let out = String::from_utf8(sink.finish().expect("no write error")).expect("utf8");

        let lines: Vec<FrameReport> = out
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].detection, Some(DetectionResult { bbox: None, acquired: true }));
        assert!(lines[1].error.is_some());
    }

    #[test]
    fn tee_feeds_both_sinks() {
        let detector = Detector::new(DetectorParams::default()).expect("valid");
        let mut source = QueueSource::default();
        source.push("a", solid(4, 4, [10, 10, 10]));

        let mut left = ReportSink::default();
        let mut right = ReportSink::default();
        run(&detector, &mut source, &mut Tee(&mut left, &mut right));
        assert_eq!(left.frames, right.frames);
        assert_eq!(left.frames.len(), 1);
    }

    #[test]
    fn directory_source_lists_images_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.png", "a.png"] {
            Frame::from_pixel(3, 3, image::Rgb([10, 10, 10]))
                .save(dir.path().join(name))
                .expect("write png");
        }
        std::fs::write(dir.path().join("notes.txt"), "not an image").expect("write txt");

        let mut source = ImageFileSource::from_dir(dir.path()).expect("list dir");
        assert_eq!(source.remaining(), 2);
        source.push(dir.path().join("missing.png"));

        let detector = Detector::new(DetectorParams::default()).expect("valid");
        let mut sink = ReportSink::default();
        let summary = run(&detector, &mut source, &mut sink);

        // Unreadable files never reach the sink.
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 0);
        assert!(sink.frames[0].frame.ends_with("a.png"));
        assert!(sink.frames[1].frame.ends_with("b.png"));
    }

    #[derive(Default)]
    struct MaskSink {
        plain: usize,
        search_masks: Vec<(DetectionResult, colorseek_core::Mask)>,
    }

    impl DetectionSink for MaskSink {
        fn emit(&mut self, _label: &str, _frame: &Frame, _result: &DetectionResult) {
            self.plain += 1;
        }

        fn wants_trace(&self) -> bool {
            true
        }

        fn emit_trace(&mut self, _label: &str, _frame: &Frame, trace: &DetectionTrace) {
            self.search_masks
                .push((trace.result, trace.search_mask.clone()));
        }
    }

    #[test]
    fn traced_sink_gets_masks_of_the_emitted_result() {
        let detector = Detector::new(DetectorParams::default()).expect("valid");
        let mut frame = vec![10u8; 20 * 20 * 3];
        for y in 5..9 {
            for x in 12..16 {
                let at = (y * 20 + x) * 3;
                frame[at..at + 3].copy_from_slice(&[0, 200, 0]);
            }
        }
        let mut source = QueueSource::default();
        source.push("a", RawFrame::packed(20, 20, Encoding::Rgb8, frame));

        let mut reports = ReportSink::default();
        let mut masks = MaskSink::default();
        let summary = run(&detector, &mut source, &mut Tee(&mut reports, &mut masks));

        assert_eq!(summary.detected, 1);
        assert_eq!(masks.plain, 0);
        assert_eq!(masks.search_masks.len(), 1);
        let (result, mask) = &masks.search_masks[0];
        assert_eq!(reports.frames[0].detection, Some(*result));
        assert_eq!(mask.get_pixel(13, 6).0[0], 255);
        assert_eq!(mask.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn extension_picks_compressed_encoding() {
        assert_eq!(encoding_for_path(Path::new("a/b.PNG")), Some(Encoding::Png));
        assert_eq!(encoding_for_path(Path::new("x.jpeg")), Some(Encoding::Jpeg));
        assert_eq!(encoding_for_path(Path::new("x.bgr8")), None);
        assert_eq!(encoding_for_path(Path::new("noext")), None);
    }
}
